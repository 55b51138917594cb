use crate::core::state::SimulationState;
use glam::DVec3;

/// A geometric constraint that enforces non-penetration.
pub trait Constraint {
    fn name(&self) -> &str;

    /// Projects the state to satisfy the constraint.
    /// Modifies positions and velocities in place on a snapshot that has not
    /// been recorded yet.
    fn project(&self, state: &mut SimulationState);
}

/// A rigid half-space `x · normal >= offset`.
///
/// Penetrating bodies are moved back onto the surface and their inward
/// normal velocity is reflected with `restitution`.
pub struct SurfaceConstraint {
    pub normal: DVec3,
    pub offset: f64,
    pub restitution: f64,
    label: &'static str,
}

impl SurfaceConstraint {
    /// Horizontal ground at height `level`.
    pub fn ground(level: f64, restitution: f64) -> Self {
        Self {
            normal: DVec3::Y,
            offset: level,
            restitution: restitution.clamp(0.0, 1.0),
            label: "ground",
        }
    }

    /// Plane through the origin inclined by `angle` radians, descending
    /// towards +x.
    pub fn incline(angle: f64, restitution: f64) -> Self {
        Self {
            normal: DVec3::new(angle.sin(), angle.cos(), 0.0),
            offset: 0.0,
            restitution: restitution.clamp(0.0, 1.0),
            label: "incline",
        }
    }
}

impl Constraint for SurfaceConstraint {
    fn name(&self) -> &str {
        self.label
    }

    fn project(&self, state: &mut SimulationState) {
        let n = self.normal;
        for body in state.objects.values_mut() {
            let depth = body.position.dot(n) - self.offset;

            // Check penetration
            if depth < 0.0 {
                // Positional Projection
                body.position -= n * depth;

                // Velocity Reflection (Impulse)
                let vn = body.velocity.dot(n);
                if vn < 0.0 {
                    body.velocity -= n * ((1.0 + self.restitution) * vn);
                }
            }
        }
    }
}

/// Pairwise sphere contact between bodies with a positive `radius` property.
pub struct SphereConstraint {
    pub restitution: f64,
    /// Minimum separation used to avoid division by zero.
    pub min_separation: f64,
}

impl SphereConstraint {
    pub fn new(restitution: f64) -> Self {
        Self {
            restitution: restitution.clamp(0.0, 1.0),
            min_separation: DEFAULT_MIN_SEPARATION,
        }
    }
}

const DEFAULT_MIN_SEPARATION: f64 = 1e-6;

impl Constraint for SphereConstraint {
    fn name(&self) -> &str {
        "sphere_contact"
    }

    fn project(&self, state: &mut SimulationState) {
        let ids: Vec<String> = state
            .objects
            .iter()
            .filter(|(_, o)| o.radius() > 0.0)
            .map(|(id, _)| id.clone())
            .collect();
        let min_sep = self.min_separation.max(DEFAULT_MIN_SEPARATION);

        for i in 0..ids.len() {
            for j in (i + 1)..ids.len() {
                let (Some(a), Some(b)) = (
                    state.objects.get(&ids[i]).cloned(),
                    state.objects.get(&ids[j]).cloned(),
                ) else {
                    continue;
                };

                let diff = a.position - b.position;
                let r_sum = a.radius() + b.radius();
                let dist_sq = diff.length_squared();
                if dist_sq >= r_sum * r_sum {
                    continue;
                }

                let rel_vel = a.velocity - b.velocity;
                let (normal, dist) = if dist_sq < min_sep * min_sep {
                    // Fallback normal to avoid NaNs when bodies fully overlap.
                    let mut fallback = rel_vel.normalize_or_zero();
                    if fallback.length_squared() == 0.0 {
                        fallback = DVec3::X;
                    }
                    (fallback, min_sep)
                } else {
                    let dist = dist_sq.sqrt();
                    (diff / dist, dist)
                };

                let overlap = r_sum - dist;
                if overlap <= 0.0 {
                    continue;
                }

                let inv_mass_a = if a.mass > 0.0 { 1.0 / a.mass } else { 0.0 };
                let inv_mass_b = if b.mass > 0.0 { 1.0 / b.mass } else { 0.0 };
                let inv_sum = inv_mass_a + inv_mass_b;
                if inv_sum == 0.0 {
                    continue;
                }

                // 1. Positional correction, split by inverse mass so the
                // centre of mass does not move.
                let correction = normal * (overlap / inv_sum);
                let mut a = a;
                let mut b = b;
                a.position += correction * inv_mass_a;
                b.position -= correction * inv_mass_b;

                // 2. Velocity response
                let vel_along_normal = rel_vel.dot(normal);
                if vel_along_normal < 0.0 {
                    let impulse_mag = -(1.0 + self.restitution) * vel_along_normal / inv_sum;
                    let impulse = normal * impulse_mag;
                    a.velocity += impulse * inv_mass_a;
                    b.velocity -= impulse * inv_mass_b;
                }

                state.objects.insert(ids[i].clone(), a);
                state.objects.insert(ids[j].clone(), b);
            }
        }
    }
}
