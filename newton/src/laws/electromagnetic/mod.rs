use crate::core::math::ad::Dual;
use crate::core::state::ObjectState;
use crate::laws::registry::Law;
use glam::DVec3;

/// Lorentz force in uniform fields, F = q (E + v × B).
///
/// The electric part is conservative (V = -q E·x); the magnetic part does
/// no work and is applied as an explicit force.
pub struct Lorentz {
    pub electric: DVec3,
    pub magnetic: DVec3,
    /// Charge used when the body has no `charge` property.
    pub default_charge: f64,
}

impl Lorentz {
    pub fn new(electric: DVec3, magnetic: DVec3, default_charge: f64) -> Self {
        Self {
            electric,
            magnetic,
            default_charge,
        }
    }

    fn charge(&self, body: &ObjectState) -> f64 {
        body.property("charge").unwrap_or(self.default_charge)
    }
}

impl Law for Lorentz {
    fn name(&self) -> &str {
        "lorentz"
    }

    fn potential(&self, q: &[Dual; 3], body: &ObjectState) -> Dual {
        let e = self.electric.to_array();
        let mut dot = Dual::constant(0.0);
        for axis in 0..3 {
            dot = dot + q[axis] * e[axis];
        }
        -dot * self.charge(body)
    }

    fn force(&self, body: &ObjectState) -> DVec3 {
        body.velocity.cross(self.magnetic) * self.charge(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::laws::registry::LawRegistry;

    #[test]
    fn test_lorentz_components() {
        let registry = LawRegistry::new().with(Lorentz::new(DVec3::X * 2.0, DVec3::Z, 1.0));
        let mut body = ObjectState::new(DVec3::ZERO, DVec3::X, 1.0);
        body.properties.insert("charge".into(), -1.0);

        // q(E + v × B) = -1 * ((2,0,0) + (0,-1,0))
        assert_eq!(registry.force(&body), DVec3::new(-2.0, 1.0, 0.0));
    }
}
