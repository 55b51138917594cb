//! The input contract handed to the assembler.

use super::{ConstraintSpec, Environment, ObjectSpec};
use crate::core::quantity::Role;
use crate::core::solve::Solver;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemInput {
    /// Coarse label such as `"oscillation"` or `"projectile"`.
    pub system_type: String,
    /// Raw problem text; only a weak scoring signal.
    pub text: String,
    pub parameters: Vec<InputParameter>,
    pub objects: Vec<ObjectSpec>,
    pub constraints: Vec<ConstraintSpec>,
    pub environment: Environment,
    pub simulation: SimulationOverrides,
    /// Module ids chosen by an external resolver. When non-empty the
    /// pipeline skips scoring and orders exactly these.
    pub modules: Vec<String>,
}

impl SystemInput {
    pub fn new(system_type: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            system_type: system_type.into(),
            text: text.into(),
            ..Default::default()
        }
    }

    /// Add a given parameter.
    pub fn with_parameter(mut self, symbol: &str, value: f64, unit: &str) -> Self {
        self.parameters.push(InputParameter::given(symbol, value, unit));
        self
    }

    pub fn with_object(mut self, object: ObjectSpec) -> Self {
        self.objects.push(object);
        self
    }

    pub fn parameter(&self, symbol: &str) -> Option<&InputParameter> {
        self.parameters.iter().find(|p| p.symbol == symbol)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InputParameter {
    pub symbol: String,
    pub value: InputValue,
    /// Defaults to `given` when a value is present, `unknown` otherwise.
    pub role: Option<Role>,
    pub description: String,
}

impl InputParameter {
    pub fn given(symbol: &str, value: f64, unit: &str) -> Self {
        Self {
            symbol: symbol.to_string(),
            value: InputValue {
                value: Some(value),
                unit: unit.to_string(),
            },
            role: Some(Role::Given),
            description: String::new(),
        }
    }

    pub fn unknown(symbol: &str, unit: &str) -> Self {
        Self {
            symbol: symbol.to_string(),
            value: InputValue {
                value: None,
                unit: unit.to_string(),
            },
            role: None,
            description: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InputValue {
    pub value: Option<f64>,
    pub unit: String,
}

/// Per-problem simulation settings that override the assembler defaults.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationOverrides {
    pub duration: Option<f64>,
    pub time_step: Option<f64>,
    pub solver: Option<Solver>,
    pub precision: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_contract_from_json() {
        let input: SystemInput = serde_json::from_str(
            r#"{
                "system_type": "free_fall",
                "parameters": [
                    {"symbol": "h", "value": {"value": 20.0, "unit": "m"}},
                    {"symbol": "t_fall", "value": {"value": null, "unit": "s"}, "role": "unknown"}
                ],
                "environment": {"gravity": 9.81},
                "simulation": {"solver": "verlet"}
            }"#,
        )
        .unwrap();

        assert_eq!(input.parameter("h").unwrap().value.value, Some(20.0));
        assert_eq!(input.parameter("t_fall").unwrap().role, Some(Role::Unknown));
        assert_eq!(input.environment.gravity, 9.81);
        assert_eq!(input.environment.temperature, 20.0);
        assert_eq!(input.simulation.solver, Some(Solver::Verlet));
        assert!(input.objects.is_empty());
    }
}
