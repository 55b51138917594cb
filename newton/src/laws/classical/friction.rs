use crate::core::state::ObjectState;
use crate::laws::registry::Law;
use glam::DVec3;

/// Coulomb friction for a body resting on a plane through the origin.
///
/// Only acts while the body is within `contact_tolerance` of the surface.
/// Sliding bodies feel `μN` against their tangential velocity; resting bodies
/// are held by static friction up to the same limit.
pub struct SlopeFriction {
    pub mu: f64,
    pub g: f64,
    /// Unit surface normal.
    pub normal: DVec3,
    pub contact_tolerance: f64,
}

const SLIDING_SPEED: f64 = 1e-9;

impl SlopeFriction {
    /// Plane inclined by `angle` radians, descending towards +x.
    pub fn incline(mu: f64, g: f64, angle: f64) -> Self {
        Self {
            mu,
            g,
            normal: DVec3::new(angle.sin(), angle.cos(), 0.0),
            contact_tolerance: 1e-6,
        }
    }

    fn in_contact(&self, body: &ObjectState) -> bool {
        body.position.dot(self.normal) <= self.contact_tolerance
    }
}

impl Law for SlopeFriction {
    fn name(&self) -> &str {
        "slope_friction"
    }

    fn force(&self, body: &ObjectState) -> DVec3 {
        if self.mu <= 0.0 || !self.in_contact(body) {
            return DVec3::ZERO;
        }

        let n = self.normal;
        let weight = DVec3::new(0.0, -body.mass * self.g, 0.0);
        let normal_load = -weight.dot(n);
        if normal_load <= 0.0 {
            return DVec3::ZERO;
        }
        let limit = self.mu * normal_load;

        let v_t = body.velocity - n * body.velocity.dot(n);
        if v_t.length() > SLIDING_SPEED {
            return -v_t.normalize() * limit;
        }

        let pull = weight - n * weight.dot(n);
        let pull_mag = pull.length();
        if pull_mag <= limit {
            -pull
        } else {
            -pull / pull_mag * limit
        }
    }

    fn is_conservative(&self) -> bool {
        self.mu <= 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_friction_holds_on_shallow_slope() {
        // tan(10°) < 0.5, so the block should stay put.
        let friction = SlopeFriction::incline(0.5, 9.8, 10f64.to_radians());
        let body = ObjectState::new(DVec3::ZERO, DVec3::ZERO, 1.0);
        let weight = DVec3::new(0.0, -9.8, 0.0);
        let n = friction.normal;
        let tangential_weight = weight - n * weight.dot(n);

        let f = friction.force(&body);
        assert!((f + tangential_weight).length() < 1e-12);
    }

    #[test]
    fn test_kinetic_friction_opposes_sliding() {
        let friction = SlopeFriction::incline(0.2, 9.8, 0.0);
        let body = ObjectState::new(DVec3::ZERO, DVec3::new(3.0, 0.0, 0.0), 2.0);

        let f = friction.force(&body);
        assert!((f.x + 0.2 * 2.0 * 9.8).abs() < 1e-12);
        assert_eq!(f.y, 0.0);
    }

    #[test]
    fn test_no_friction_in_flight() {
        let friction = SlopeFriction::incline(0.5, 9.8, 0.0);
        let body = ObjectState::new(DVec3::new(0.0, 2.0, 0.0), DVec3::X, 1.0);
        assert_eq!(friction.force(&body), DVec3::ZERO);
    }
}
