//! Post-hoc checks of a finished run.
//!
//! [`Validator::validate`] reads the IR and the recorded output and nothing
//! else; it never steps the system again.

use super::monitor::{Anomaly, AnomalyKind, MonitorConfig, StateMonitor};
use super::probe::probe_for;
use crate::core::state::SimulationState;
use crate::ir::Ir;
use crate::laws::catalog::ConservationLaw;
use crate::simulation::SimulationOutput;
use crate::simulation::regime::RegimeSetup;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// m/s
pub const SPEED_OF_LIGHT: f64 = 299_792_458.0;

const CONSTRAINT_PENALTY: f64 = 0.8;
const STABILITY_PENALTY: f64 = 0.9;
const CAUSALITY_PENALTY: f64 = 0.85;

/// Tolerances are percentages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    pub energy_tolerance: f64,
    pub momentum_tolerance: f64,
    pub angular_momentum_tolerance: f64,
    pub mass_tolerance: f64,
    pub speed_limit: f64,
    /// Absolute slack on the displacement bound, m.
    pub displacement_slack: f64,
    pub monitor: MonitorConfig,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            energy_tolerance: 1.0,
            momentum_tolerance: 1.0,
            angular_momentum_tolerance: 1.0,
            mass_tolerance: 0.1,
            speed_limit: SPEED_OF_LIGHT,
            displacement_slack: 1e-9,
            monitor: MonitorConfig::default(),
        }
    }
}

impl ValidationConfig {
    pub fn tolerance(&self, law: ConservationLaw) -> f64 {
        match law {
            ConservationLaw::Energy => self.energy_tolerance,
            ConservationLaw::Momentum => self.momentum_tolerance,
            ConservationLaw::AngularMomentum => self.angular_momentum_tolerance,
            ConservationLaw::Mass => self.mass_tolerance,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConservationCheck {
    pub law: ConservationLaw,
    pub initial_value: f64,
    pub final_value: f64,
    /// Percent.
    pub deviation: f64,
    pub tolerance: f64,
    pub passed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    Superluminal,
    NonFinite,
    TimeOrder,
    Displacement,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Violation {
    pub kind: ViolationKind,
    pub time: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object_id: Option<String>,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ValidationReport {
    pub success: bool,
    pub overall_score: f64,
    pub conservation_checks: Vec<ConservationCheck>,
    pub constraint_violations: Vec<Violation>,
    pub stability_issues: Vec<Anomaly>,
    pub causality_violations: Vec<Violation>,
    pub recommendations: Vec<String>,
}

/// Repeated violations of one kind by one object are reported once.
#[derive(Default)]
struct Findings {
    seen: BTreeSet<(ViolationKind, Option<String>)>,
    violations: Vec<Violation>,
}

impl Findings {
    fn report(&mut self, kind: ViolationKind, time: f64, object: Option<&str>, description: String) {
        let object_id = object.map(str::to_string);
        if self.seen.insert((kind, object_id.clone())) {
            self.violations.push(Violation {
                kind,
                time,
                object_id,
                description,
            });
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Validator {
    config: ValidationConfig,
}

impl Validator {
    pub fn new(config: ValidationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ValidationConfig {
        &self.config
    }

    pub fn validate(&self, ir: &Ir, output: &SimulationOutput) -> ValidationReport {
        let setup = RegimeSetup::from_ir(ir);
        let series = output.time_series.as_slice();

        let conservation_checks = match (series.first(), series.last()) {
            (Some(first), Some(last)) => self.conservation(ir, &setup, first, last),
            _ => Vec::new(),
        };
        let constraint_violations = self.constraints(series);
        let causality_violations = self.causality(series);

        let mut monitor = StateMonitor::new(self.config.monitor.clone());
        for state in series {
            monitor.observe(state, &setup.laws);
        }
        let stability_issues = monitor.anomalies().to_vec();

        let passed = conservation_checks.iter().filter(|c| c.passed).count();
        let pass_ratio = if conservation_checks.is_empty() {
            1.0
        } else {
            passed as f64 / conservation_checks.len() as f64
        };
        let overall_score = (pass_ratio
            * CONSTRAINT_PENALTY.powi(constraint_violations.len() as i32)
            * STABILITY_PENALTY.powi(stability_issues.len() as i32)
            * CAUSALITY_PENALTY.powi(causality_violations.len() as i32))
        .clamp(0.0, 1.0);

        let mut report = ValidationReport {
            success: output.success
                && !series.is_empty()
                && passed == conservation_checks.len()
                && constraint_violations.is_empty()
                && causality_violations.is_empty(),
            overall_score,
            conservation_checks,
            constraint_violations,
            stability_issues,
            causality_violations,
            recommendations: Vec::new(),
        };
        report.recommendations = recommendations(&report, output);

        tracing::info!(
            target: "validator",
            success = report.success,
            score = report.overall_score,
            checks = report.conservation_checks.len(),
            constraint = report.constraint_violations.len(),
            causality = report.causality_violations.len(),
            stability = report.stability_issues.len(),
            "validation finished"
        );
        report
    }

    fn conservation(
        &self,
        ir: &Ir,
        setup: &RegimeSetup,
        first: &SimulationState,
        last: &SimulationState,
    ) -> Vec<ConservationCheck> {
        let laws: BTreeSet<ConservationLaw> = ir.system.conservation_laws.iter().copied().collect();
        laws.into_iter()
            .map(|law| {
                let probe = probe_for(law);
                let initial_value = probe.measure(first, &setup.laws);
                let final_value = probe.measure(last, &setup.laws);
                let deviation = probe.deviation(first, last, &setup.laws) * 100.0;
                let tolerance = self.config.tolerance(law);
                let passed = deviation <= tolerance;
                if !passed {
                    tracing::debug!(target: "validator", %law, deviation, tolerance, "conservation check failed");
                }
                ConservationCheck {
                    law,
                    initial_value,
                    final_value,
                    deviation,
                    tolerance,
                    passed,
                }
            })
            .collect()
    }

    fn constraints(&self, series: &[SimulationState]) -> Vec<Violation> {
        let mut findings = Findings::default();
        for state in series {
            for (id, body) in &state.objects {
                if !(body.position.is_finite() && body.velocity.is_finite()) {
                    findings.report(
                        ViolationKind::NonFinite,
                        state.time,
                        Some(id.as_str()),
                        format!("`{id}` has non-finite coordinates"),
                    );
                } else if body.speed() > self.config.speed_limit {
                    findings.report(
                        ViolationKind::Superluminal,
                        state.time,
                        Some(id.as_str()),
                        format!("`{id}` moves at {:.3e} m/s, faster than light", body.speed()),
                    );
                }
            }
        }
        findings.violations
    }

    fn causality(&self, series: &[SimulationState]) -> Vec<Violation> {
        let mut findings = Findings::default();
        for pair in series.windows(2) {
            let (before, after) = (&pair[0], &pair[1]);
            let dt = after.time - before.time;
            if !(dt > 0.0) {
                findings.report(
                    ViolationKind::TimeOrder,
                    after.time,
                    None,
                    format!("sample at t={} does not follow t={}", after.time, before.time),
                );
                continue;
            }
            for (id, body) in &after.objects {
                let Some(previous) = before.objects.get(id) else {
                    continue;
                };
                let moved = body.position.distance(previous.position);
                let bound = 2.0 * body.speed().max(previous.speed()) * dt + self.config.displacement_slack;
                if moved > bound {
                    findings.report(
                        ViolationKind::Displacement,
                        after.time,
                        Some(id.as_str()),
                        format!("`{id}` moved {moved:.3e} m in {dt:.3e} s, more than {bound:.3e} m"),
                    );
                }
            }
        }
        findings.violations
    }
}

fn recommendations(report: &ValidationReport, output: &SimulationOutput) -> Vec<String> {
    let mut out = Vec::new();
    if !output.success {
        out.push(format!(
            "The run ended early ({}); results cover only part of the requested duration.",
            output.errors.join("; ")
        ));
    }
    if output.time_series.is_empty() {
        out.push("No states were recorded; nothing could be checked.".to_string());
    }

    for check in report.conservation_checks.iter().filter(|c| !c.passed) {
        out.push(match check.law {
            ConservationLaw::Energy => {
                "Energy drifted beyond tolerance: reduce the time step or use the verlet solver.".to_string()
            }
            ConservationLaw::Momentum => {
                "Momentum is not conserved: check external forces and collision restitution.".to_string()
            }
            ConservationLaw::AngularMomentum => {
                "Angular momentum is not conserved: check for torques from constraints or damping.".to_string()
            }
            ConservationLaw::Mass => "Total mass changed: check the object list for inconsistencies.".to_string(),
        });
    }

    let kinds: BTreeSet<ViolationKind> = report
        .constraint_violations
        .iter()
        .chain(&report.causality_violations)
        .map(|v| v.kind)
        .collect();
    for kind in kinds {
        out.push(
            match kind {
                ViolationKind::Superluminal => "Speeds exceed the speed of light; the classical model does not apply.",
                ViolationKind::NonFinite => "Coordinates became non-finite: reduce the time step or check parameter magnitudes.",
                ViolationKind::TimeOrder => "Samples are not in increasing time order; the series is corrupt.",
                ViolationKind::Displacement => {
                    "Objects jump further than their speeds allow: record more often or reduce the time step."
                }
            }
            .to_string(),
        );
    }

    let anomalies: BTreeSet<AnomalyKind> = report.stability_issues.iter().map(|a| a.kind).collect();
    for kind in anomalies {
        out.push(
            match kind {
                AnomalyKind::Divergence => "The run diverged: reduce the time step or enable adaptive stepping.",
                AnomalyKind::EnergyLeak => "Energy leaked in a conservative system: check constraint restitution.",
                AnomalyKind::Oscillation => "Energy alternates between samples: the time step is likely too large.",
            }
            .to_string(),
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::state::{ObjectState, TimeSeries};
    use glam::DVec3;

    fn series(states: Vec<SimulationState>) -> SimulationOutput {
        let mut time_series = TimeSeries::new();
        for s in states {
            time_series.push(s).unwrap();
        }
        SimulationOutput {
            success: true,
            final_state: time_series.last().cloned().unwrap_or_default(),
            time_series,
            ..Default::default()
        }
    }

    fn at(time: f64, x: f64, vx: f64) -> SimulationState {
        SimulationState::new(time).with_object(
            "p",
            ObjectState::new(DVec3::new(x, 1.0, 0.0), DVec3::new(vx, 0.0, 0.0), 1.0),
        )
    }

    fn weightless() -> Ir {
        let mut ir = Ir::default();
        ir.system.environment.gravity = 0.0;
        ir.system.conservation_laws = vec![ConservationLaw::Momentum, ConservationLaw::Mass];
        ir
    }

    #[test]
    fn test_uniform_motion_passes() {
        let output = series((0..10).map(|i| at(i as f64 * 0.1, i as f64 * 0.1, 1.0)).collect());
        let report = Validator::default().validate(&weightless(), &output);
        assert!(report.success);
        assert_eq!(report.overall_score, 1.0);
        assert_eq!(report.conservation_checks.len(), 2);
        assert!(report.recommendations.is_empty());
    }

    #[test]
    fn test_momentum_change_fails_check() {
        let output = series(vec![at(0.0, 0.0, 1.0), at(0.1, 0.15, 2.0)]);
        let report = Validator::default().validate(&weightless(), &output);
        let momentum = &report.conservation_checks[0];
        assert_eq!(momentum.law, ConservationLaw::Momentum);
        assert!((momentum.deviation - 100.0).abs() < 1e-9);
        assert!(!momentum.passed);
        assert!(!report.success);
        // the monitor replay also sees the kinetic energy quadruple
        assert_eq!(report.stability_issues.len(), 1);
        assert_eq!(report.stability_issues[0].kind, AnomalyKind::EnergyLeak);
        assert!((report.overall_score - 0.5 * STABILITY_PENALTY).abs() < 1e-12);
        assert_eq!(report.recommendations.len(), 2);
    }

    #[test]
    fn test_reversed_momentum_fails_check() {
        let output = series(vec![at(0.0, 0.0, 1.0), at(0.5, 0.25, 0.0), at(1.0, 0.25, -1.0)]);
        let report = Validator::default().validate(&weightless(), &output);
        let momentum = &report.conservation_checks[0];
        assert_eq!(momentum.law, ConservationLaw::Momentum);
        // magnitudes agree, the vectors do not
        assert_eq!(momentum.initial_value, momentum.final_value);
        assert!((momentum.deviation - 200.0).abs() < 1e-9);
        assert!(!momentum.passed);
        assert!(!report.success);
    }

    #[test]
    fn test_teleport_is_a_causality_violation() {
        let output = series(vec![at(0.0, 0.0, 1.0), at(0.1, 5.0, 1.0), at(0.2, 10.0, 1.0)]);
        let report = Validator::default().validate(&weightless(), &output);
        // reported once per object
        assert_eq!(report.causality_violations.len(), 1);
        assert_eq!(report.causality_violations[0].kind, ViolationKind::Displacement);
        assert!((report.overall_score - CAUSALITY_PENALTY).abs() < 1e-12);
    }

    #[test]
    fn test_unordered_samples_detected() {
        let mut output = series(vec![at(0.0, 0.0, 0.0)]);
        // bypasses the append-only check, as a deserialised series would
        output.time_series = serde_json::from_value(serde_json::json!([
            at(0.5, 0.0, 0.0),
            at(0.2, 0.0, 0.0),
        ]))
        .unwrap();
        let report = Validator::default().validate(&weightless(), &output);
        assert_eq!(report.causality_violations[0].kind, ViolationKind::TimeOrder);
    }

    #[test]
    fn test_superluminal_and_non_finite() {
        let output = series(vec![at(0.0, 0.0, 4e8), at(0.1, f64::NAN, 0.0)]);
        let report = Validator::default().validate(&weightless(), &output);
        let kinds: Vec<_> = report.constraint_violations.iter().map(|v| v.kind).collect();
        assert_eq!(kinds, [ViolationKind::Superluminal, ViolationKind::NonFinite]);
        assert!(!report.success);
    }

    #[test]
    fn test_report_serialises_camel_case() {
        let output = series(vec![at(0.0, 0.0, 1.0)]);
        let json = serde_json::to_value(Validator::default().validate(&weightless(), &output)).unwrap();
        for key in [
            "success",
            "overallScore",
            "conservationChecks",
            "constraintViolations",
            "stabilityIssues",
            "causalityViolations",
            "recommendations",
        ] {
            assert!(json.get(key).is_some(), "{key}");
        }
        assert!(json["conservationChecks"][0].get("initialValue").is_some());
    }
}
