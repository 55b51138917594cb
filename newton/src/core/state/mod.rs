use glam::DVec3;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Kinematic state of one simulated object.
///
/// Free-form scalar `properties` carry per-object data used by specific
/// laws, e.g. `radius` for collisions and `charge` for the Lorentz force.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObjectState {
    pub position: DVec3,
    pub velocity: DVec3,
    pub acceleration: DVec3,
    pub mass: f64,
    pub properties: BTreeMap<String, f64>,
}

impl Default for ObjectState {
    fn default() -> Self {
        Self {
            position: DVec3::ZERO,
            velocity: DVec3::ZERO,
            acceleration: DVec3::ZERO,
            mass: 1.0,
            properties: BTreeMap::new(),
        }
    }
}

impl ObjectState {
    pub fn new(position: DVec3, velocity: DVec3, mass: f64) -> Self {
        Self {
            position,
            velocity,
            mass,
            ..Default::default()
        }
    }

    pub fn property(&self, key: &str) -> Option<f64> {
        self.properties.get(key).copied().filter(|v| v.is_finite())
    }

    /// Collision radius; zero for point masses.
    pub fn radius(&self) -> f64 {
        self.property("radius").unwrap_or(0.0).max(0.0)
    }

    pub fn speed(&self) -> f64 {
        self.velocity.length()
    }

    pub fn kinetic_energy(&self) -> f64 {
        0.5 * self.mass * self.velocity.length_squared()
    }

    pub fn momentum(&self) -> DVec3 {
        self.velocity * self.mass
    }

    /// Angular momentum about the origin, `m (r × v)`.
    pub fn angular_momentum(&self) -> DVec3 {
        self.position.cross(self.velocity) * self.mass
    }

    pub fn is_finite(&self) -> bool {
        self.position.is_finite() && self.velocity.is_finite() && self.acceleration.is_finite()
    }
}

/// One snapshot of the whole system.
///
/// Objects are keyed by id in a `BTreeMap` so every pass over them has a
/// stable order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationState {
    pub time: f64,
    pub objects: BTreeMap<String, ObjectState>,
}

impl SimulationState {
    pub fn new(time: f64) -> Self {
        Self {
            time,
            objects: BTreeMap::new(),
        }
    }

    pub fn with_object(mut self, id: impl Into<String>, object: ObjectState) -> Self {
        self.objects.insert(id.into(), object);
        self
    }

    pub fn total_mass(&self) -> f64 {
        self.objects.values().map(|o| o.mass).sum()
    }

    pub fn total_momentum(&self) -> DVec3 {
        self.objects.values().map(ObjectState::momentum).sum()
    }

    pub fn total_angular_momentum(&self) -> DVec3 {
        self.objects.values().map(ObjectState::angular_momentum).sum()
    }

    pub fn kinetic_energy(&self) -> f64 {
        self.objects.values().map(ObjectState::kinetic_energy).sum()
    }

    pub fn max_speed(&self) -> f64 {
        self.objects.values().map(ObjectState::speed).fold(0.0, f64::max)
    }

    /// First object with a non-finite coordinate, if any.
    pub fn first_non_finite(&self) -> Option<&str> {
        self.objects
            .iter()
            .find(|(_, o)| !o.is_finite())
            .map(|(id, _)| id.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
#[error("snapshot at t={next} does not follow t={last}")]
pub struct TimeOrderError {
    pub last: f64,
    pub next: f64,
}

/// Append-only record of accepted snapshots, strictly increasing in time.
///
/// There is no mutable access to recorded snapshots; consumers only read.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TimeSeries {
    states: Vec<SimulationState>,
}

impl TimeSeries {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, state: SimulationState) -> Result<(), TimeOrderError> {
        if let Some(last) = self.states.last() {
            if !(state.time > last.time) {
                return Err(TimeOrderError {
                    last: last.time,
                    next: state.time,
                });
            }
        }
        self.states.push(state);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn first(&self) -> Option<&SimulationState> {
        self.states.first()
    }

    pub fn last(&self) -> Option<&SimulationState> {
        self.states.last()
    }

    pub fn get(&self, index: usize) -> Option<&SimulationState> {
        self.states.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SimulationState> {
        self.states.iter()
    }

    pub fn as_slice(&self) -> &[SimulationState] {
        &self.states
    }
}

impl<'a> IntoIterator for &'a TimeSeries {
    type Item = &'a SimulationState;
    type IntoIter = std::slice::Iter<'a, SimulationState>;

    fn into_iter(self) -> Self::IntoIter {
        self.states.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_series_rejects_non_increasing_time() {
        let mut series = TimeSeries::new();
        series.push(SimulationState::new(0.0)).unwrap();
        series.push(SimulationState::new(0.1)).unwrap();
        assert!(series.push(SimulationState::new(0.1)).is_err());
        assert!(series.push(SimulationState::new(0.05)).is_err());
        assert!(series.push(SimulationState::new(f64::NAN)).is_err());
        assert_eq!(series.len(), 2);
    }

    #[test]
    fn test_aggregate_quantities() {
        let state = SimulationState::new(0.0)
            .with_object("a", ObjectState::new(DVec3::X, DVec3::Y, 2.0))
            .with_object("b", ObjectState::new(-DVec3::X, -DVec3::Y, 2.0));

        assert_eq!(state.total_mass(), 4.0);
        assert_eq!(state.total_momentum(), DVec3::ZERO);
        // Both bodies circulate the same way about the origin.
        assert_eq!(state.total_angular_momentum(), DVec3::new(0.0, 0.0, 4.0));
        assert_eq!(state.kinetic_energy(), 2.0);
    }
}
