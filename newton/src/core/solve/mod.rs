use crate::core::state::SimulationState;
use crate::laws::registry::LawRegistry;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod constraints;
use constraints::Constraint;

/// A step that could not produce a usable state.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NumericError {
    #[error("non-finite state for object `{object}` at t={time}")]
    NonFinite { object: String, time: f64 },
    #[error("invalid step size {0}")]
    InvalidStep(f64),
}

/// Advances a snapshot by one step, producing a new snapshot.
///
/// The input state is never modified; recorded snapshots stay immutable.
pub trait Integrator {
    fn name(&self) -> &str;

    fn step(
        &mut self,
        state: &SimulationState,
        laws: &LawRegistry,
        constraints: &[Box<dyn Constraint>],
        dt: f64,
    ) -> Result<SimulationState, NumericError>;
}

/// Integrator selection carried in the IR.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Solver {
    /// Explicit (symplectic) Euler sub-step: `v += a·Δt; x += v·Δt`.
    #[default]
    Euler,
    Verlet,
}

impl Solver {
    pub fn integrator(self) -> Box<dyn Integrator> {
        match self {
            Solver::Euler => Box::new(SymplecticEuler),
            Solver::Verlet => Box::new(VelocityVerlet),
        }
    }
}

pub struct SymplecticEuler;

impl Integrator for SymplecticEuler {
    fn name(&self) -> &str {
        "symplectic_euler"
    }

    fn step(
        &mut self,
        state: &SimulationState,
        laws: &LawRegistry,
        constraints: &[Box<dyn Constraint>],
        dt: f64,
    ) -> Result<SimulationState, NumericError> {
        check_step(dt)?;
        let mut next = state.clone();

        // 1. Accelerations from the current configuration
        for body in next.objects.values_mut() {
            body.acceleration = laws.acceleration(body);
        }

        // 2. Symplectic Euler Step
        for body in next.objects.values_mut() {
            body.velocity += body.acceleration * dt;
            body.position += body.velocity * dt;
        }

        // 3. Constraints
        for c in constraints {
            c.project(&mut next);
        }

        next.time = state.time + dt;
        check_finite(&next)?;
        Ok(next)
    }
}

pub struct VelocityVerlet;

impl Integrator for VelocityVerlet {
    fn name(&self) -> &str {
        "velocity_verlet"
    }

    fn step(
        &mut self,
        state: &SimulationState,
        laws: &LawRegistry,
        constraints: &[Box<dyn Constraint>],
        dt: f64,
    ) -> Result<SimulationState, NumericError> {
        check_step(dt)?;
        let mut next = state.clone();

        // 1. Half Kick v += 0.5 * a * dt, then Drift x += v * dt
        for body in next.objects.values_mut() {
            let a = laws.acceleration(body);
            body.velocity += a * (0.5 * dt);
            body.position += body.velocity * dt;
        }

        // --- Constraints Projection ---
        for c in constraints {
            c.project(&mut next);
        }

        // 2. Half Kick with forces at the new positions
        for body in next.objects.values_mut() {
            let a = laws.acceleration(body);
            body.velocity += a * (0.5 * dt);
            body.acceleration = a;
        }

        next.time = state.time + dt;
        check_finite(&next)?;
        Ok(next)
    }
}

fn check_step(dt: f64) -> Result<(), NumericError> {
    if dt.is_finite() && dt > 0.0 {
        Ok(())
    } else {
        Err(NumericError::InvalidStep(dt))
    }
}

fn check_finite(state: &SimulationState) -> Result<(), NumericError> {
    match state.first_non_finite() {
        Some(object) => Err(NumericError::NonFinite {
            object: object.to_string(),
            time: state.time,
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::state::ObjectState;
    use crate::laws::classical::UniformGravity;
    use glam::DVec3;

    #[test]
    fn test_euler_step_order() {
        let laws = LawRegistry::new().with(UniformGravity::new(10.0));
        let state = SimulationState::new(0.0)
            .with_object("p", ObjectState::new(DVec3::new(0.0, 5.0, 0.0), DVec3::ZERO, 1.0));

        let next = SymplecticEuler.step(&state, &laws, &[], 0.1).unwrap();
        let p = &next.objects["p"];
        // v = -1, then x = 5 + (-1)(0.1)
        assert!((p.velocity.y + 1.0).abs() < 1e-12);
        assert!((p.position.y - 4.9).abs() < 1e-12);
        assert!((next.time - 0.1).abs() < 1e-15);
        // input snapshot untouched
        assert_eq!(state.objects["p"].position.y, 5.0);
    }

    #[test]
    fn test_rejects_bad_step() {
        let laws = LawRegistry::new();
        let state = SimulationState::new(0.0);
        assert_eq!(
            SymplecticEuler.step(&state, &laws, &[], 0.0),
            Err(NumericError::InvalidStep(0.0))
        );
    }

    #[test]
    fn test_non_finite_is_reported() {
        let laws = LawRegistry::new().with(UniformGravity::new(f64::INFINITY));
        let state = SimulationState::new(0.0)
            .with_object("p", ObjectState::new(DVec3::ZERO, DVec3::ZERO, 1.0));
        let err = VelocityVerlet.step(&state, &laws, &[], 0.01).unwrap_err();
        assert!(matches!(err, NumericError::NonFinite { ref object, .. } if object == "p"));
    }
}
