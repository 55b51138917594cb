//! Precomputed constants.
//!
//! A fixed table of closed-form relations. Each pass evaluates every rule
//! whose output is still missing and whose inputs are known; passes repeat
//! until nothing new is derived.

use crate::core::quantity::{merge_parameters, Parameter, ParameterTable, Quantity, Role};
use std::f64::consts::TAU;

struct Derivation {
    output: &'static str,
    unit: &'static str,
    inputs: &'static [&'static str],
    description: &'static str,
    eval: fn(&ParameterTable<'_>) -> Option<f64>,
}

fn positive(x: f64) -> Option<f64> {
    (x > 0.0).then_some(x)
}

const DERIVATIONS: &[Derivation] = &[
    Derivation {
        output: "omega",
        unit: "rad/s",
        inputs: &["k", "m"],
        description: "natural angular frequency",
        eval: |t| Some((positive(t.value("k")?)? / positive(t.value("m")?)?).sqrt()),
    },
    Derivation {
        output: "T_period",
        unit: "s",
        inputs: &["omega"],
        description: "oscillation period",
        eval: |t| Some(TAU / positive(t.value("omega")?)?),
    },
    Derivation {
        output: "t_fall",
        unit: "s",
        inputs: &["h", "g"],
        description: "time to fall to the ground",
        eval: |t| {
            let h = t.value("h")?;
            (h >= 0.0).then_some(())?;
            Some((2.0 * h / positive(t.value("g")?)?).sqrt())
        },
    },
    Derivation {
        output: "v_impact",
        unit: "m/s",
        inputs: &["h", "g"],
        description: "speed at impact",
        eval: |t| {
            let h = t.value("h")?;
            (h >= 0.0).then_some(())?;
            Some((2.0 * positive(t.value("g")?)? * h).sqrt())
        },
    },
    Derivation {
        output: "F_weight",
        unit: "N",
        inputs: &["m", "g"],
        description: "weight",
        eval: |t| Some(t.value("m")? * t.value("g")?),
    },
    Derivation {
        output: "KE",
        unit: "J",
        inputs: &["m", "v"],
        description: "kinetic energy",
        eval: |t| {
            let v = t.value("v")?;
            Some(0.5 * t.value("m")? * v * v)
        },
    },
    Derivation {
        output: "PE",
        unit: "J",
        inputs: &["m", "g", "h"],
        description: "gravitational potential energy",
        eval: |t| Some(t.value("m")? * t.value("g")? * t.value("h")?),
    },
    Derivation {
        output: "E_total",
        unit: "J",
        inputs: &["KE", "PE"],
        description: "mechanical energy",
        eval: |t| Some(t.value("KE")? + t.value("PE")?),
    },
    Derivation {
        output: "PE_spring",
        unit: "J",
        inputs: &["k", "A"],
        description: "elastic energy at full amplitude",
        eval: |t| {
            let a = t.value("A")?;
            Some(0.5 * t.value("k")? * a * a)
        },
    },
    Derivation {
        output: "p",
        unit: "kg*m/s",
        inputs: &["m", "v"],
        description: "linear momentum",
        eval: |t| Some(t.value("m")? * t.value("v")?),
    },
    Derivation {
        output: "gamma",
        unit: "1/s",
        inputs: &["b", "m"],
        description: "damping rate",
        eval: |t| Some(t.value("b")? / (2.0 * positive(t.value("m")?)?)),
    },
    Derivation {
        output: "omega_d",
        unit: "rad/s",
        inputs: &["omega", "gamma"],
        description: "damped angular frequency",
        eval: |t| {
            let (w, g) = (t.value("omega")?, t.value("gamma")?);
            Some(positive(w * w - g * g)?.sqrt())
        },
    },
    Derivation {
        output: "v_wave",
        unit: "m/s",
        inputs: &["f", "lambda"],
        description: "wave speed",
        eval: |t| Some(t.value("f")? * t.value("lambda")?),
    },
    Derivation {
        output: "T_pendulum",
        unit: "s",
        inputs: &["l", "g"],
        description: "small-angle pendulum period",
        eval: |t| Some(TAU * (positive(t.value("l")?)? / positive(t.value("g")?)?).sqrt()),
    },
    Derivation {
        output: "a_c",
        unit: "m/s^2",
        inputs: &["v", "r"],
        description: "centripetal acceleration",
        eval: |t| {
            let v = t.value("v")?;
            Some(v * v / positive(t.value("r")?)?)
        },
    },
    Derivation {
        output: "t_flight",
        unit: "s",
        inputs: &["v0", "theta", "g"],
        description: "projectile flight time",
        eval: |t| Some(2.0 * t.value("v0")? * t.angle(&["theta"])?.sin() / positive(t.value("g")?)?),
    },
    Derivation {
        output: "R_range",
        unit: "m",
        inputs: &["v0", "theta", "g"],
        description: "projectile range",
        eval: |t| {
            let v0 = t.value("v0")?;
            Some(v0 * v0 * (2.0 * t.angle(&["theta"])?).sin() / positive(t.value("g")?)?)
        },
    },
    Derivation {
        output: "H_max",
        unit: "m",
        inputs: &["v0", "theta", "g"],
        description: "projectile apex height",
        eval: |t| {
            let vy = t.value("v0")? * t.angle(&["theta"])?.sin();
            Some(vy * vy / (2.0 * positive(t.value("g")?)?))
        },
    },
    Derivation {
        output: "N",
        unit: "N",
        inputs: &["m", "g", "theta"],
        description: "normal force on the incline",
        eval: |t| Some(t.value("m")? * t.value("g")? * t.angle(&["theta"])?.cos()),
    },
    Derivation {
        output: "a_incline",
        unit: "m/s^2",
        inputs: &["g", "theta", "mu"],
        description: "acceleration along the incline",
        eval: |t| {
            let theta = t.angle(&["theta"])?;
            let mu = t.value("mu").unwrap_or(0.0);
            Some(t.value("g")? * (theta.sin() - mu * theta.cos()))
        },
    },
    Derivation {
        output: "I",
        unit: "A",
        inputs: &["U", "R"],
        description: "current",
        eval: |t| Some(t.value("U")? / positive(t.value("R")?)?),
    },
    Derivation {
        output: "tau_rc",
        unit: "s",
        inputs: &["R", "C"],
        description: "RC time constant",
        eval: |t| Some(t.value("R")? * t.value("C")?),
    },
    Derivation {
        output: "v_orb",
        unit: "m/s",
        inputs: &["G", "M", "r"],
        description: "circular orbit speed",
        eval: |t| Some((t.value("G")? * t.value("M")? / positive(t.value("r")?)?).sqrt()),
    },
];

/// Fill in missing derived values in place. Returns the symbols derived, in
/// derivation order.
///
/// A rule only fires for symbols that are absent or held by an `unknown` or
/// `derived` record without a value; explicit problem data is never
/// overwritten.
pub(super) fn derive_constants(params: &mut Vec<Parameter>) -> Vec<String> {
    let mut derived = Vec::new();
    loop {
        let table = ParameterTable::new(params);
        let fresh: Vec<Parameter> = DERIVATIONS
            .iter()
            .filter(|d| match table.get(d.output) {
                None => true,
                Some(p) => p.value().is_none() && p.role <= Role::Derived,
            })
            .filter_map(|d| {
                let value = (d.eval)(&table).filter(|v| v.is_finite())?;
                Some(
                    Parameter::new(d.output, Quantity::known(value, d.unit), Role::Derived)
                        .with_dependencies(d.inputs.iter().copied())
                        .with_description(d.description),
                )
            })
            .collect();

        if fresh.is_empty() {
            return derived;
        }
        derived.extend(fresh.iter().map(|p| p.symbol.clone()));
        let current = std::mem::take(params);
        *params = merge_parameters(current.into_iter().chain(fresh));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn given(symbol: &str, value: f64, unit: &str) -> Parameter {
        Parameter::new(symbol, Quantity::known(value, unit), Role::Given)
    }

    #[test]
    fn test_chained_derivation_reaches_fixpoint() {
        let mut params = vec![given("k", 4.0, "N/m"), given("m", 1.0, "kg")];
        let derived = derive_constants(&mut params);

        let table = ParameterTable::new(&params);
        assert_eq!(table.value("omega"), Some(2.0));
        assert!((table.value("T_period").unwrap() - std::f64::consts::PI).abs() < 1e-12);
        assert_eq!(derived.first().map(String::as_str), Some("omega"));
        assert_eq!(table.get("T_period").unwrap().dependencies, ["omega"]);
    }

    #[test]
    fn test_given_values_are_not_overwritten() {
        let mut params = vec![
            given("k", 4.0, "N/m"),
            given("m", 1.0, "kg"),
            given("omega", 3.0, "rad/s"),
        ];
        derive_constants(&mut params);
        let table = ParameterTable::new(&params);
        assert_eq!(table.value("omega"), Some(3.0));
        assert_eq!(table.get("omega").unwrap().role, Role::Given);
    }

    #[test]
    fn test_free_fall_constants() {
        let mut params = vec![given("h", 19.6, "m"), given("g", 9.8, "m/s^2")];
        derive_constants(&mut params);
        let table = ParameterTable::new(&params);
        assert!((table.value("t_fall").unwrap() - 2.0).abs() < 1e-12);
        assert!((table.value("v_impact").unwrap() - 19.6).abs() < 1e-12);
    }

    #[test]
    fn test_invalid_inputs_derive_nothing() {
        let mut params = vec![given("k", 4.0, "N/m"), given("m", 0.0, "kg")];
        let derived = derive_constants(&mut params);
        assert!(derived.is_empty());
        assert_eq!(params.len(), 2);
    }
}
