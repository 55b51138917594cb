//! Rolling health checks over recorded snapshots.

use super::probe::{EnergyProbe, Probe, relative_deviation};
use crate::core::state::SimulationState;
use crate::laws::registry::LawRegistry;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, VecDeque};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Samples kept in the rolling window.
    pub history: usize,
    /// Relative energy drift that counts as a leak in a conservative system.
    pub energy_leak_tolerance: f64,
    /// Relative energy drift that counts as divergence in any system.
    pub divergence_factor: f64,
    /// Share of sign flips in successive energy increments that counts as
    /// numerical oscillation.
    pub oscillation_ratio: f64,
    /// Increments needed before oscillation is judged.
    pub min_window: usize,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            history: 256,
            energy_leak_tolerance: 0.05,
            divergence_factor: 10.0,
            oscillation_ratio: 0.8,
            min_window: 8,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyKind {
    Divergence,
    EnergyLeak,
    Oscillation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Anomaly {
    pub kind: AnomalyKind,
    pub time: f64,
    pub description: String,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Sample {
    time: f64,
    energy: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonitorMetrics {
    pub samples: usize,
    pub mean_interval: f64,
    pub energy_drift: f64,
    pub peak_speed: f64,
    /// 1 for a clean run, lower for every anomaly kind raised.
    pub stability_score: f64,
}

/// Watches a run one snapshot at a time. Each anomaly kind is raised at most
/// once per run.
#[derive(Debug, Clone)]
pub struct StateMonitor {
    config: MonitorConfig,
    window: VecDeque<Sample>,
    reference: Option<(f64, f64)>,
    observed: usize,
    first_time: f64,
    last_time: f64,
    drift: f64,
    peak_speed: f64,
    raised: BTreeSet<AnomalyKind>,
    anomalies: Vec<Anomaly>,
}

impl StateMonitor {
    pub fn new(config: MonitorConfig) -> Self {
        Self {
            window: VecDeque::with_capacity(config.history.max(1)),
            config,
            reference: None,
            observed: 0,
            first_time: 0.0,
            last_time: 0.0,
            drift: 0.0,
            peak_speed: 0.0,
            raised: BTreeSet::new(),
            anomalies: Vec::new(),
        }
    }

    /// Feed one snapshot; returns anomalies raised by it.
    pub fn observe(&mut self, state: &SimulationState, laws: &LawRegistry) -> Vec<Anomaly> {
        let energy = EnergyProbe.measure(state, laws);
        let (initial, scale) = *self
            .reference
            .get_or_insert_with(|| (energy, EnergyProbe.scale(state, laws)));

        if self.observed == 0 {
            self.first_time = state.time;
        }
        self.observed += 1;
        self.last_time = state.time;
        self.peak_speed = self.peak_speed.max(state.max_speed());

        if self.window.len() == self.config.history.max(1) {
            self.window.pop_front();
        }
        self.window.push_back(Sample {
            time: state.time,
            energy,
        });

        let mut fresh = Vec::new();
        let drift = relative_deviation(initial, energy, scale);
        self.drift = drift;

        if let Some(id) = state.first_non_finite() {
            fresh.extend(self.raise(
                AnomalyKind::Divergence,
                state.time,
                format!("object `{id}` left the finite range"),
            ));
        } else if drift > self.config.divergence_factor {
            fresh.extend(self.raise(
                AnomalyKind::Divergence,
                state.time,
                format!("energy drifted by {:.1}%", drift * 100.0),
            ));
        }

        if laws.is_conservative() && drift > self.config.energy_leak_tolerance {
            fresh.extend(self.raise(
                AnomalyKind::EnergyLeak,
                state.time,
                format!("energy drifted by {:.2}% in a conservative system", drift * 100.0),
            ));
        }

        if self.oscillating(scale) {
            fresh.extend(self.raise(
                AnomalyKind::Oscillation,
                state.time,
                "energy alternates between successive samples".to_string(),
            ));
        }

        for anomaly in &fresh {
            tracing::warn!(
                target: "monitor",
                kind = ?anomaly.kind,
                time = anomaly.time,
                "{}",
                anomaly.description
            );
        }
        fresh
    }

    fn raise(&mut self, kind: AnomalyKind, time: f64, description: String) -> Option<Anomaly> {
        if !self.raised.insert(kind) {
            return None;
        }
        let anomaly = Anomaly {
            kind,
            time,
            description,
        };
        self.anomalies.push(anomaly.clone());
        Some(anomaly)
    }

    /// Sign flips between successive non-negligible energy increments.
    fn oscillating(&self, scale: f64) -> bool {
        let noise = 1e-9 * scale.max(1.0);
        let steps: Vec<f64> = self
            .window
            .iter()
            .zip(self.window.iter().skip(1))
            .map(|(a, b)| b.energy - a.energy)
            .filter(|d| d.abs() > noise)
            .collect();
        if steps.len() < self.config.min_window {
            return false;
        }
        let flips = steps
            .windows(2)
            .filter(|pair| pair[0].signum() != pair[1].signum())
            .count();
        flips as f64 >= self.config.oscillation_ratio * (steps.len() - 1) as f64
    }

    pub fn anomalies(&self) -> &[Anomaly] {
        &self.anomalies
    }

    pub fn metrics(&self) -> MonitorMetrics {
        let intervals = self.observed.saturating_sub(1);
        let mean_interval = if intervals > 0 {
            (self.last_time - self.first_time) / intervals as f64
        } else {
            0.0
        };
        MonitorMetrics {
            samples: self.observed,
            mean_interval,
            energy_drift: self.drift,
            peak_speed: self.peak_speed,
            stability_score: (1.0 - self.raised.len() as f64 / 3.0).max(0.0),
        }
    }

    /// Times of the samples still in the window.
    pub fn window_times(&self) -> impl Iterator<Item = f64> + '_ {
        self.window.iter().map(|s| s.time)
    }
}
