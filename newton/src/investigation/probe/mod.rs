use crate::core::state::SimulationState;
use crate::laws::catalog::ConservationLaw;
use crate::laws::registry::LawRegistry;
use glam::DVec3;

/// Below this a reference magnitude counts as zero.
pub const REFERENCE_FLOOR: f64 = 1e-12;

/// A synchronous probe that extracts a conserved scalar from a snapshot.
pub trait Probe {
    fn name(&self) -> &str;

    fn measure(&self, state: &SimulationState, laws: &LawRegistry) -> f64;

    /// Natural magnitude of the quantity, used as a floor for relative
    /// deviations when the measured total happens to cancel out.
    fn scale(&self, state: &SimulationState, laws: &LawRegistry) -> f64;

    /// Change between two snapshots relative to the first, as a fraction.
    fn deviation(&self, first: &SimulationState, last: &SimulationState, laws: &LawRegistry) -> f64 {
        relative_deviation(self.measure(first, laws), self.measure(last, laws), self.scale(first, laws))
    }
}

/// Kinetic plus potential energy from the active laws.
pub struct EnergyProbe;

impl Probe for EnergyProbe {
    fn name(&self) -> &str {
        "energy"
    }

    fn measure(&self, state: &SimulationState, laws: &LawRegistry) -> f64 {
        state
            .objects
            .values()
            .map(|body| body.kinetic_energy() + laws.potential_energy(body))
            .sum()
    }

    fn scale(&self, state: &SimulationState, laws: &LawRegistry) -> f64 {
        state
            .objects
            .values()
            .map(|body| body.kinetic_energy() + laws.potential_energy(body).abs())
            .sum()
    }
}

/// Magnitude of the total linear momentum.
pub struct MomentumProbe;

impl Probe for MomentumProbe {
    fn name(&self) -> &str {
        "momentum"
    }

    fn measure(&self, state: &SimulationState, _laws: &LawRegistry) -> f64 {
        state.total_momentum().length()
    }

    fn scale(&self, state: &SimulationState, _laws: &LawRegistry) -> f64 {
        state.objects.values().map(|o| o.momentum().length()).sum()
    }

    fn deviation(&self, first: &SimulationState, last: &SimulationState, laws: &LawRegistry) -> f64 {
        vector_deviation(
            first.total_momentum(),
            last.total_momentum(),
            self.scale(first, laws),
        )
    }
}

/// Magnitude of the total angular momentum about the origin.
pub struct AngularMomentumProbe;

impl Probe for AngularMomentumProbe {
    fn name(&self) -> &str {
        "angular_momentum"
    }

    fn measure(&self, state: &SimulationState, _laws: &LawRegistry) -> f64 {
        state.total_angular_momentum().length()
    }

    fn scale(&self, state: &SimulationState, _laws: &LawRegistry) -> f64 {
        state
            .objects
            .values()
            .map(|o| o.angular_momentum().length())
            .sum()
    }

    fn deviation(&self, first: &SimulationState, last: &SimulationState, laws: &LawRegistry) -> f64 {
        vector_deviation(
            first.total_angular_momentum(),
            last.total_angular_momentum(),
            self.scale(first, laws),
        )
    }
}

pub struct MassProbe;

impl Probe for MassProbe {
    fn name(&self) -> &str {
        "mass"
    }

    fn measure(&self, state: &SimulationState, _laws: &LawRegistry) -> f64 {
        state.total_mass()
    }

    fn scale(&self, state: &SimulationState, _laws: &LawRegistry) -> f64 {
        state.objects.values().map(|o| o.mass.abs()).sum()
    }
}

pub fn probe_for(law: ConservationLaw) -> Box<dyn Probe> {
    match law {
        ConservationLaw::Energy => Box::new(EnergyProbe),
        ConservationLaw::Momentum => Box::new(MomentumProbe),
        ConservationLaw::AngularMomentum => Box::new(AngularMomentumProbe),
        ConservationLaw::Mass => Box::new(MassProbe),
    }
}

/// `|final - initial| / max(|initial|, scale)` as a fraction.
///
/// With no usable reference, any change is reported as a full deviation.
pub fn relative_deviation(initial: f64, last: f64, scale: f64) -> f64 {
    fraction((last - initial).abs(), initial.abs().max(scale))
}

/// Same as [`relative_deviation`], measured on the vector difference so a
/// reversal counts as change.
pub fn vector_deviation(initial: DVec3, last: DVec3, scale: f64) -> f64 {
    fraction((last - initial).length(), initial.length().max(scale))
}

fn fraction(delta: f64, reference: f64) -> f64 {
    if !delta.is_finite() || !reference.is_finite() {
        f64::INFINITY
    } else if reference > REFERENCE_FLOOR {
        delta / reference
    } else if delta > REFERENCE_FLOOR {
        1.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::state::ObjectState;
    use crate::laws::classical::{Spring, UniformGravity};

    #[test]
    fn test_energy_includes_potential() {
        let laws = LawRegistry::new().with(UniformGravity::new(10.0));
        let state = SimulationState::new(0.0).with_object(
            "ball",
            ObjectState::new(DVec3::new(0.0, 2.0, 0.0), DVec3::new(1.0, 0.0, 0.0), 3.0),
        );
        // ½·3·1 + 3·10·2
        assert!((EnergyProbe.measure(&state, &laws) - 61.5).abs() < 1e-9);
    }

    #[test]
    fn test_spring_energy() {
        let laws = LawRegistry::new().with(Spring::new(1.0));
        let state = SimulationState::new(0.0)
            .with_object("m", ObjectState::new(DVec3::X, DVec3::ZERO, 1.0));
        assert!((EnergyProbe.measure(&state, &laws) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_opposing_momenta_use_scale() {
        let laws = LawRegistry::new();
        let state = SimulationState::new(0.0)
            .with_object("a", ObjectState::new(DVec3::ZERO, DVec3::X, 1.0))
            .with_object("b", ObjectState::new(DVec3::ZERO, -DVec3::X, 1.0));
        assert_eq!(MomentumProbe.measure(&state, &laws), 0.0);
        assert_eq!(MomentumProbe.scale(&state, &laws), 2.0);
    }

    #[test]
    fn test_relative_deviation() {
        assert_eq!(relative_deviation(10.0, 11.0, 0.0), 0.1);
        assert_eq!(relative_deviation(0.0, 0.5, 2.0), 0.25);
        assert_eq!(relative_deviation(0.0, 0.0, 0.0), 0.0);
        assert_eq!(relative_deviation(0.0, 1.0, 0.0), 1.0);
        assert!(relative_deviation(1.0, f64::NAN, 1.0).is_infinite());
    }

    #[test]
    fn test_reversed_momentum_is_a_full_change() {
        let laws = LawRegistry::new();
        let moving = |vx: f64| {
            SimulationState::new(0.0)
                .with_object("p", ObjectState::new(DVec3::Y, DVec3::new(vx, 0.0, 0.0), 1.0))
        };
        let (before, after) = (moving(1.0), moving(-1.0));
        assert_eq!(MomentumProbe.measure(&before, &laws), MomentumProbe.measure(&after, &laws));
        assert_eq!(MomentumProbe.deviation(&before, &after, &laws), 2.0);
        // L = r × p flips with p
        assert_eq!(AngularMomentumProbe.deviation(&before, &after, &laws), 2.0);
        assert_eq!(MassProbe.deviation(&before, &after, &laws), 0.0);
    }
}
