use crate::core::math::ad::Dual;
use crate::core::state::ObjectState;
use crate::laws::registry::Law;
use glam::DVec3;

/// Linear restoring law towards an anchor: V = 0.5 * k * |w ∘ (q - anchor)|^2
///
/// `axes` weights each coordinate, so a transverse oscillator only acts on y.
/// With `per_unit_mass`, `k` is read as ω² and scaled by the body's mass.
pub struct Spring {
    pub k: f64,
    pub anchor: DVec3,
    pub axes: DVec3,
    pub per_unit_mass: bool,
}

impl Spring {
    pub fn new(k: f64) -> Self {
        Self {
            k,
            anchor: DVec3::ZERO,
            axes: DVec3::ONE,
            per_unit_mass: false,
        }
    }

    /// Restoring law along y with angular frequency `omega` for any mass.
    pub fn transverse(omega: f64) -> Self {
        Self {
            k: omega * omega,
            anchor: DVec3::ZERO,
            axes: DVec3::Y,
            per_unit_mass: true,
        }
    }

    pub fn with_anchor(mut self, anchor: DVec3) -> Self {
        self.anchor = anchor;
        self
    }

    fn stiffness(&self, body: &ObjectState) -> f64 {
        if self.per_unit_mass {
            self.k * body.mass
        } else {
            self.k
        }
    }
}

impl Law for Spring {
    fn name(&self) -> &str {
        if self.per_unit_mass {
            "transverse_spring"
        } else {
            "spring"
        }
    }

    fn potential(&self, q: &[Dual; 3], body: &ObjectState) -> Dual {
        let anchor = self.anchor.to_array();
        let weights = self.axes.to_array();

        let mut stretch_sq = Dual::constant(0.0);
        for axis in 0..3 {
            if weights[axis] == 0.0 {
                continue;
            }
            let d = (q[axis] - Dual::constant(anchor[axis])) * weights[axis];
            stretch_sq = stretch_sq + d.square();
        }

        stretch_sq * (0.5 * self.stiffness(body))
    }
}
