//! Discrete-event detection over consecutive accepted states.
//!
//! Detectors are pure observers: they read two snapshots and the IR being
//! run, and report what happened between them. Their output never feeds
//! back into the state.

use crate::core::state::SimulationState;
use crate::ir::Ir;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Collision,
    Boundary,
    Threshold,
    Equilibrium,
    Instability,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub time: f64,
    #[serde(rename = "type")]
    pub kind: EventKind,
    pub object_id: String,
    pub description: String,
    #[serde(default)]
    pub data: BTreeMap<String, f64>,
}

impl Event {
    pub fn new(time: f64, kind: EventKind, object_id: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            time,
            kind,
            object_id: object_id.into(),
            description: description.into(),
            data: BTreeMap::new(),
        }
    }

    pub fn with_data(mut self, key: &str, value: f64) -> Self {
        self.data.insert(key.to_string(), value);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DetectorError {
    #[error("object `{object}` has a non-finite state at t={time}")]
    NonFinite { object: String, time: f64 },
    #[error("{0}")]
    Failed(String),
}

/// Thresholds for the standard detector set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Distance from the origin treated as the edge of the world, m.
    pub boundary_radius: f64,
    /// m/s
    pub speed_limit: f64,
    /// Speed below which an object counts as at rest, m/s.
    pub equilibrium_epsilon: f64,
    /// m/s²
    pub acceleration_ceiling: f64,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            boundary_radius: 1000.0,
            speed_limit: 1000.0,
            equilibrium_epsilon: 1e-3,
            acceleration_ceiling: 1e5,
        }
    }
}

pub trait Detector {
    fn name(&self) -> &str;

    /// Events between `previous` and `current` while running `ir`.
    fn detect(
        &mut self,
        previous: &SimulationState,
        current: &SimulationState,
        ir: &Ir,
    ) -> Result<Vec<Event>, DetectorError>;
}

/// Relative slack on the contact distance; projected contacts sit exactly on
/// the sum of radii up to rounding.
const CONTACT_SLOP: f64 = 1e-9;

pub struct CollisionDetector;

impl Detector for CollisionDetector {
    fn name(&self) -> &str {
        "collision"
    }

    fn detect(
        &mut self,
        previous: &SimulationState,
        current: &SimulationState,
        ir: &Ir,
    ) -> Result<Vec<Event>, DetectorError> {
        let bodies: Vec<_> = current
            .objects
            .iter()
            .filter(|(_, o)| o.radius() > 0.0)
            .collect();

        let mut events = Vec::new();
        for (i, (id_a, a)) in bodies.iter().enumerate() {
            for (id_b, b) in &bodies[i + 1..] {
                let reach = (a.radius() + b.radius()) * (1.0 + CONTACT_SLOP);
                let distance = a.position.distance(b.position);
                if !distance.is_finite() {
                    return Err(DetectorError::NonFinite {
                        object: id_a.to_string(),
                        time: current.time,
                    });
                }
                if distance > reach {
                    continue;
                }
                // Only on entering contact.
                let was_touching = match (previous.objects.get(*id_a), previous.objects.get(*id_b)) {
                    (Some(pa), Some(pb)) => pa.position.distance(pb.position) <= reach,
                    _ => false,
                };
                if was_touching {
                    continue;
                }
                events.push(
                    Event::new(
                        current.time,
                        EventKind::Collision,
                        id_a.as_str(),
                        format!("`{id_a}` collided with `{id_b}`"),
                    )
                    .with_data("distance", distance)
                    .with_data("relative_speed", (a.velocity - b.velocity).length())
                    .with_data("restitution", ir.system.environment.collision_restitution),
                );
            }
        }
        Ok(events)
    }
}

pub struct BoundaryDetector {
    pub radius: f64,
}

impl Detector for BoundaryDetector {
    fn name(&self) -> &str {
        "boundary"
    }

    fn detect(
        &mut self,
        previous: &SimulationState,
        current: &SimulationState,
        _ir: &Ir,
    ) -> Result<Vec<Event>, DetectorError> {
        let mut events = Vec::new();
        for (id, body) in &current.objects {
            let r = body.position.length();
            if !r.is_finite() {
                return Err(DetectorError::NonFinite {
                    object: id.clone(),
                    time: current.time,
                });
            }
            let Some(before) = previous.objects.get(id) else {
                continue;
            };
            let was_inside = before.position.length() <= self.radius;
            let inside = r <= self.radius;
            if was_inside != inside {
                let direction = if inside { "entered" } else { "left" };
                events.push(
                    Event::new(
                        current.time,
                        EventKind::Boundary,
                        id.as_str(),
                        format!("`{id}` {direction} the {} m boundary", self.radius),
                    )
                    .with_data("distance", r),
                );
            }
        }
        Ok(events)
    }
}

pub struct SpeedThresholdDetector {
    pub limit: f64,
}

impl Detector for SpeedThresholdDetector {
    fn name(&self) -> &str {
        "threshold"
    }

    fn detect(
        &mut self,
        previous: &SimulationState,
        current: &SimulationState,
        _ir: &Ir,
    ) -> Result<Vec<Event>, DetectorError> {
        Ok(current
            .objects
            .iter()
            .filter(|(id, body)| {
                let before = previous.objects.get(*id).map_or(0.0, |o| o.speed());
                before <= self.limit && body.speed() > self.limit
            })
            .map(|(id, body)| {
                Event::new(
                    current.time,
                    EventKind::Threshold,
                    id.as_str(),
                    format!("`{id}` exceeded {} m/s", self.limit),
                )
                .with_data("speed", body.speed())
            })
            .collect())
    }
}

pub struct EquilibriumDetector {
    pub epsilon: f64,
}

impl Detector for EquilibriumDetector {
    fn name(&self) -> &str {
        "equilibrium"
    }

    fn detect(
        &mut self,
        previous: &SimulationState,
        current: &SimulationState,
        _ir: &Ir,
    ) -> Result<Vec<Event>, DetectorError> {
        Ok(current
            .objects
            .iter()
            .filter_map(|(id, body)| {
                let before = previous.objects.get(id)?;
                (before.speed() >= self.epsilon && body.speed() < self.epsilon).then(|| {
                    Event::new(
                        current.time,
                        EventKind::Equilibrium,
                        id.as_str(),
                        format!("`{id}` came to rest"),
                    )
                    .with_data("speed", body.speed())
                })
            })
            .collect())
    }
}

pub struct InstabilityDetector {
    pub ceiling: f64,
}

impl Detector for InstabilityDetector {
    fn name(&self) -> &str {
        "instability"
    }

    fn detect(
        &mut self,
        previous: &SimulationState,
        current: &SimulationState,
        _ir: &Ir,
    ) -> Result<Vec<Event>, DetectorError> {
        let mut events = Vec::new();
        for (id, body) in &current.objects {
            let a = body.acceleration.length();
            let before = previous
                .objects
                .get(id)
                .map_or(0.0, |o| o.acceleration.length());
            let unstable = !a.is_finite() || a > self.ceiling;
            if unstable && before <= self.ceiling {
                events.push(
                    Event::new(
                        current.time,
                        EventKind::Instability,
                        id.as_str(),
                        format!("`{id}` acceleration {a:.3e} m/s² exceeds {:.3e}", self.ceiling),
                    )
                    .with_data("acceleration", a),
                );
            }
        }
        Ok(events)
    }
}

/// A detector that returned an error for one pair of states.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectorFailure {
    pub detector: String,
    pub error: DetectorError,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DetectionBatch {
    /// Sorted by time.
    pub events: Vec<Event>,
    pub failures: Vec<DetectorFailure>,
}

/// Runs every registered detector; a failing detector is isolated so the
/// others still report.
#[derive(Default)]
pub struct EventDetector {
    detectors: Vec<Box<dyn Detector>>,
}

impl EventDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// The standard set: collision, boundary, threshold, equilibrium and
    /// instability.
    pub fn standard(config: &DetectorConfig) -> Self {
        Self::new()
            .with(CollisionDetector)
            .with(BoundaryDetector {
                radius: config.boundary_radius,
            })
            .with(SpeedThresholdDetector {
                limit: config.speed_limit,
            })
            .with(EquilibriumDetector {
                epsilon: config.equilibrium_epsilon,
            })
            .with(InstabilityDetector {
                ceiling: config.acceleration_ceiling,
            })
    }

    pub fn with(mut self, detector: impl Detector + 'static) -> Self {
        self.detectors.push(Box::new(detector));
        self
    }

    pub fn names(&self) -> Vec<&str> {
        self.detectors.iter().map(|d| d.name()).collect()
    }

    pub fn scan(
        &mut self,
        previous: &SimulationState,
        current: &SimulationState,
        ir: &Ir,
    ) -> DetectionBatch {
        let mut batch = DetectionBatch::default();
        for detector in &mut self.detectors {
            match detector.detect(previous, current, ir) {
                Ok(events) => batch.events.extend(events),
                Err(error) => {
                    tracing::warn!(
                        target: "events",
                        detector = detector.name(),
                        %error,
                        "detector failed"
                    );
                    batch.failures.push(DetectorFailure {
                        detector: detector.name().to_string(),
                        error,
                    });
                }
            }
        }
        batch.events.sort_by(|a, b| a.time.total_cmp(&b.time));
        batch
    }
}
