use crate::core::state::ObjectState;
use crate::laws::registry::Law;
use glam::DVec3;

/// Linear viscous drag, F = -b * v.
pub struct LinearDrag {
    pub b: f64,
}

impl LinearDrag {
    pub fn new(b: f64) -> Self {
        Self { b }
    }
}

impl Law for LinearDrag {
    fn name(&self) -> &str {
        "linear_drag"
    }

    fn force(&self, body: &ObjectState) -> DVec3 {
        -body.velocity * self.b
    }

    fn is_conservative(&self) -> bool {
        self.b == 0.0
    }
}
