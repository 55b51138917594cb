use crate::core::math::ad::Dual;
use crate::core::state::ObjectState;
use crate::laws::registry::Law;

/// Uniform near-surface gravity along -y: V = m * g * y
pub struct UniformGravity {
    pub g: f64,
}

impl UniformGravity {
    pub fn new(g: f64) -> Self {
        Self { g }
    }
}

impl Law for UniformGravity {
    fn name(&self) -> &str {
        "uniform_gravity"
    }

    fn potential(&self, q: &[Dual; 3], body: &ObjectState) -> Dual {
        q[1] * (body.mass * self.g)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::laws::registry::LawRegistry;
    use glam::DVec3;

    #[test]
    fn test_gravity_pulls_down_with_weight() {
        let registry = LawRegistry::new().with(UniformGravity::new(9.8));
        let body = ObjectState::new(DVec3::new(0.0, 10.0, 0.0), DVec3::ZERO, 2.0);

        let force = registry.force(&body);
        assert!((force.y + 19.6).abs() < 1e-12);
        assert_eq!(force.x, 0.0);
        assert!((registry.potential_energy(&body) - 196.0).abs() < 1e-9);
    }
}
