//! The stepping loop.
//!
//! `SimulationEngine::run` turns an IR into a time series. It never returns
//! an error: numerical trouble ends the run early with `success = false` and
//! whatever prefix of the series was recorded.

pub mod regime;

use crate::core::state::{ObjectState, SimulationState, TimeSeries};
use crate::investigation::events::{DetectorConfig, Event, EventDetector};
use crate::investigation::monitor::{MonitorConfig, StateMonitor};
use crate::ir::{DEFAULT_DURATION, DEFAULT_TIME_STEP, Ir, ObjectSpec};
use crate::laws::registry::LawRegistry;
use regime::RegimeSetup;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::time::Instant;
use thiserror::Error;

pub use regime::Regime;

/// Remaining time below which the run counts as finished.
pub const TIME_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Grow or shrink the step from a local error estimate.
    pub adaptive: bool,
    /// Local error tolerance; falls back to the IR's precision.
    pub tolerance: Option<f64>,
    pub min_step: f64,
    pub max_step: f64,
    /// Record every n-th accepted step. The final state is always recorded.
    pub output_every: usize,
    pub max_iterations: usize,
    pub growth: f64,
    pub shrink: f64,
    pub detectors: DetectorConfig,
    pub monitor: MonitorConfig,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            adaptive: false,
            tolerance: None,
            min_step: 1e-6,
            max_step: 0.1,
            output_every: 1,
            max_iterations: 1_000_000,
            growth: 1.2,
            shrink: 0.8,
            detectors: DetectorConfig::default(),
            monitor: MonitorConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimulationError {
    #[error("step size {step:e} fell below the minimum {min_step:e} at t={time}")]
    StepUnderflow { time: f64, step: f64, min_step: f64 },
    #[error("iteration limit of {limit} reached at t={time}")]
    IterationLimit { limit: usize, time: f64 },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    pub total_steps: usize,
    pub successful_steps: usize,
    pub failed_steps: usize,
    /// Wall-clock seconds.
    pub computation_time: f64,
    pub convergence_rate: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SimulationOutput {
    pub success: bool,
    pub time_series: TimeSeries,
    pub events: Vec<Event>,
    pub final_state: SimulationState,
    pub statistics: Statistics,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

/// Where the loop is; only used for tracing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Initializing,
    Stepping,
    Recording,
    Terminated,
}

#[derive(Debug, Clone, Default)]
pub struct SimulationEngine {
    config: SimulationConfig,
}

impl SimulationEngine {
    pub fn new(config: SimulationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn run(&self, ir: &Ir) -> SimulationOutput {
        let started = Instant::now();
        let config = &self.config;
        let mut out = SimulationOutput::default();
        let mut phase = Phase::Initializing;
        tracing::debug!(target: "simulation", ?phase, "starting run");

        let RegimeSetup {
            regime,
            laws,
            constraints,
            warnings,
        } = RegimeSetup::from_ir(ir);
        out.warnings.extend(warnings);

        let mut state = initial_state(ir, &mut out.warnings);
        for body in state.objects.values_mut() {
            body.acceleration = laws.acceleration(body);
        }

        let settings = &ir.simulation;
        let duration = positive_or(settings.duration, DEFAULT_DURATION, "duration", &mut out.warnings);
        let base_step = positive_or(settings.time_step, DEFAULT_TIME_STEP, "time step", &mut out.warnings);
        let min_step = config.min_step.max(f64::MIN_POSITIVE);
        let max_step = config.max_step.max(min_step);
        let tolerance = config
            .tolerance
            .filter(|t| t.is_finite() && *t > 0.0)
            .unwrap_or(settings.precision);
        let output_every = config.output_every.max(1);
        let end = state.time + duration;

        let mut dt = if config.adaptive {
            base_step.clamp(min_step, max_step)
        } else {
            base_step.max(min_step)
        };
        let mut integrator = settings.solver.integrator();
        let mut detector = EventDetector::standard(&config.detectors);
        let mut monitor = StateMonitor::new(config.monitor.clone());
        let mut failed_detectors = BTreeSet::new();

        tracing::info!(
            target: "simulation",
            regime = regime.name(),
            integrator = integrator.name(),
            objects = state.objects.len(),
            duration,
            dt,
            adaptive = config.adaptive,
            "simulation initialised"
        );

        record(&mut out, &mut monitor, &laws, &state);
        let mut recorded_time = state.time;
        let mut accepted = 0usize;
        let mut stats = Statistics::default();

        phase = Phase::Stepping;
        tracing::trace!(target: "simulation", ?phase);
        while end - state.time > TIME_EPSILON {
            if stats.total_steps >= config.max_iterations {
                let error = SimulationError::IterationLimit {
                    limit: config.max_iterations,
                    time: state.time,
                };
                tracing::error!(target: "simulation", %error);
                out.errors.push(error.to_string());
                break;
            }

            let h = dt.min(end - state.time);
            stats.total_steps += 1;

            let next = match integrator.step(&state, &laws, &constraints, h) {
                Ok(next) => next,
                Err(error) => {
                    stats.failed_steps += 1;
                    dt = h / 2.0;
                    tracing::debug!(target: "simulation", %error, time = state.time, retry = dt, "step rejected");
                    if dt < min_step {
                        let error = SimulationError::StepUnderflow {
                            time: state.time,
                            step: dt,
                            min_step,
                        };
                        tracing::error!(target: "simulation", %error);
                        out.errors.push(error.to_string());
                        break;
                    }
                    continue;
                }
            };
            stats.successful_steps += 1;
            accepted += 1;

            if config.adaptive {
                let estimate = local_error(&state, &next, h);
                if estimate < 0.5 * tolerance {
                    dt = (dt * config.growth).min(max_step);
                } else if estimate > 2.0 * tolerance {
                    dt = (dt * config.shrink).max(min_step);
                }
            }

            let batch = detector.scan(&state, &next, ir);
            out.events.extend(batch.events);
            for failure in batch.failures {
                if failed_detectors.insert(failure.detector.clone()) {
                    out.warnings
                        .push(format!("detector `{}` failed: {}", failure.detector, failure.error));
                }
            }

            state = next;
            let finished = end - state.time <= TIME_EPSILON;
            if accepted % output_every == 0 || finished {
                phase = Phase::Recording;
                tracing::trace!(target: "simulation", ?phase, time = state.time);
                record(&mut out, &mut monitor, &laws, &state);
                recorded_time = state.time;
            }
        }

        // An aborted run still ends its series on the last accepted state.
        if state.time > recorded_time {
            record(&mut out, &mut monitor, &laws, &state);
        }

        phase = Phase::Terminated;
        out.events.sort_by(|a, b| a.time.total_cmp(&b.time));
        stats.convergence_rate = if stats.total_steps > 0 {
            stats.successful_steps as f64 / stats.total_steps as f64
        } else {
            1.0
        };
        stats.computation_time = started.elapsed().as_secs_f64();
        out.statistics = stats;
        out.final_state = state;
        out.success = out.errors.is_empty();

        tracing::info!(
            target: "simulation",
            ?phase,
            success = out.success,
            steps = out.statistics.total_steps,
            recorded = out.time_series.len(),
            events = out.events.len(),
            "simulation finished"
        );
        out
    }
}

fn record(
    out: &mut SimulationOutput,
    monitor: &mut StateMonitor,
    laws: &LawRegistry,
    state: &SimulationState,
) {
    for anomaly in monitor.observe(state, laws) {
        out.warnings.push(format!("t={:.4}: {}", anomaly.time, anomaly.description));
    }
    if let Err(error) = out.time_series.push(state.clone()) {
        out.errors.push(error.to_string());
    }
}

/// `max ½·|Δv|·h` over all objects.
fn local_error(before: &SimulationState, after: &SimulationState, h: f64) -> f64 {
    after
        .objects
        .iter()
        .filter_map(|(id, body)| {
            let previous = before.objects.get(id)?;
            Some(0.5 * (body.velocity - previous.velocity).length() * h)
        })
        .fold(0.0, f64::max)
}

fn positive_or(value: f64, fallback: f64, what: &str, warnings: &mut Vec<String>) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        warnings.push(format!("invalid {what} {value}; using {fallback}"));
        fallback
    }
}

/// Snapshot at t = 0 from the IR objects, repairing what cannot be stepped.
fn initial_state(ir: &Ir, warnings: &mut Vec<String>) -> SimulationState {
    let mut specs = ir.system.objects.clone();
    if specs.is_empty() {
        warnings.push("no objects in the IR; simulating one default object".to_string());
        specs.push(ObjectSpec::new("object_1"));
    }

    let mut state = SimulationState::new(0.0);
    for (index, spec) in specs.iter().enumerate() {
        let mut id = spec.id.trim().to_string();
        if id.is_empty() || state.objects.contains_key(&id) {
            id = format!("object_{}", index + 1);
            while state.objects.contains_key(&id) {
                id.push('_');
            }
        }

        let mut body: ObjectState = spec.to_state();
        if !(body.mass.is_finite() && body.mass > 0.0) {
            warnings.push(format!("object `{id}` has invalid mass {}; using 1 kg", body.mass));
            body.mass = 1.0;
        }
        for (name, vector) in [
            ("position", &mut body.position),
            ("velocity", &mut body.velocity),
            ("acceleration", &mut body.acceleration),
        ] {
            if !vector.is_finite() {
                warnings.push(format!("object `{id}` has a non-finite {name}; using zero"));
                *vector = glam::DVec3::ZERO;
            }
        }
        state.objects.insert(id, body);
    }
    state
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::DVec3;

    fn falling(height: f64) -> Ir {
        let mut ir = Ir::default();
        let mut ball = ObjectSpec::new("ball");
        ball.position = DVec3::new(0.0, height, 0.0);
        ir.system.objects.push(ball);
        ir.simulation.duration = 1.0;
        ir
    }

    #[test]
    fn test_empty_ir_runs_default_object() {
        let out = SimulationEngine::default().run(&Ir::default());
        assert!(out.success);
        assert_eq!(out.final_state.objects.len(), 1);
        assert!(out.final_state.objects.contains_key("object_1"));
        assert_eq!(out.statistics.failed_steps, 0);
        assert_eq!(out.statistics.convergence_rate, 1.0);
        assert!((out.final_state.time - DEFAULT_DURATION).abs() < 1e-9);
        assert_eq!(out.time_series.len(), out.statistics.successful_steps + 1);
    }

    #[test]
    fn test_final_step_lands_on_end_time() {
        let mut ir = falling(100.0);
        ir.simulation.duration = 0.25;
        ir.simulation.time_step = 0.1;
        let out = SimulationEngine::default().run(&ir);
        let times: Vec<f64> = out.time_series.iter().map(|s| s.time).collect();
        assert_eq!(times.len(), 4);
        assert!((times[3] - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_output_every_keeps_final_state() {
        let mut ir = falling(100.0);
        ir.simulation.time_step = 0.1;
        let engine = SimulationEngine::new(SimulationConfig {
            output_every: 3,
            ..Default::default()
        });
        let out = engine.run(&ir);
        // t = 0, 0.3, 0.6, 0.9 and the final 1.0
        assert_eq!(out.time_series.len(), 5);
        assert!((out.time_series.last().unwrap().time - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_adaptive_step_grows_when_smooth() {
        let mut ir = falling(1000.0);
        ir.system.environment.gravity = 0.0;
        ir.simulation.time_step = 0.001;
        let engine = SimulationEngine::new(SimulationConfig {
            adaptive: true,
            ..Default::default()
        });
        let out = engine.run(&ir);
        assert!(out.success);
        assert!(out.statistics.successful_steps < 1000);
    }

    #[test]
    fn test_non_finite_forces_underflow() {
        let mut ir = falling(10.0);
        ir.system.environment.gravity = f64::INFINITY;
        let out = SimulationEngine::default().run(&ir);
        assert!(!out.success);
        assert!(out.errors[0].contains("fell below the minimum"));
        assert!(out.statistics.failed_steps > 0);
        assert_eq!(out.time_series.len(), 1);
    }

    #[test]
    fn test_iteration_limit() {
        let engine = SimulationEngine::new(SimulationConfig {
            max_iterations: 10,
            ..Default::default()
        });
        let out = engine.run(&falling(10.0));
        assert!(!out.success);
        assert_eq!(out.statistics.total_steps, 10);
        assert!((out.final_state.time - 0.1).abs() < 1e-9);
        assert_eq!(out.time_series.last().unwrap().time, out.final_state.time);
    }

    #[test]
    fn test_invalid_objects_are_repaired() {
        let mut ir = falling(1.0);
        let mut twin = ObjectSpec::new("ball");
        twin.mass = -2.0;
        twin.velocity = DVec3::new(f64::NAN, 0.0, 0.0);
        ir.system.objects.push(twin);

        let mut warnings = Vec::new();
        let state = initial_state(&ir, &mut warnings);
        assert_eq!(state.objects.len(), 2);
        let twin = &state.objects["object_2"];
        assert_eq!(twin.mass, 1.0);
        assert_eq!(twin.velocity, DVec3::ZERO);
        assert_eq!(warnings.len(), 2);
    }

    #[test]
    fn test_output_serialises_camel_case() {
        let out = SimulationEngine::default().run(&falling(1.0));
        let json = serde_json::to_value(&out).unwrap();
        assert!(json.get("timeSeries").is_some());
        assert!(json.get("finalState").is_some());
        assert!(json["statistics"].get("convergenceRate").is_some());
    }
}
