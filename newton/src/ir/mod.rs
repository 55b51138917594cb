//! The intermediate representation consumed by the simulation engine.
//!
//! Every record carries `#[serde(default)]`, so a partial or malformed IR
//! still deserialises into something the engine can run.

mod assemble;
mod derive;
pub mod input;

pub use assemble::IrAssembler;
pub use input::{InputParameter, InputValue, SimulationOverrides, SystemInput};

use crate::core::quantity::Parameter;
use crate::core::solve::Solver;
use crate::core::state::ObjectState;
use crate::laws::catalog::{ConservationLaw, ModuleKind};
use glam::DVec3;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const IR_VERSION: &str = "1.0";

pub const DEFAULT_DURATION: f64 = 10.0;
pub const DEFAULT_TIME_STEP: f64 = 0.01;
pub const DEFAULT_PRECISION: f64 = 1e-3;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Ir {
    pub metadata: Metadata,
    pub system: System,
    pub simulation: SimulationSettings,
    pub validation: IrValidation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Metadata {
    pub version: String,
    pub engine: String,
    pub system_type: String,
    pub used_fallback: bool,
}

impl Default for Metadata {
    fn default() -> Self {
        Self {
            version: IR_VERSION.to_string(),
            engine: format!("newton {}", env!("CARGO_PKG_VERSION")),
            system_type: String::new(),
            used_fallback: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct System {
    pub modules: Vec<IrModule>,
    pub parameters: Vec<Parameter>,
    pub conservation_laws: Vec<ConservationLaw>,
    pub objects: Vec<ObjectSpec>,
    pub environment: Environment,
    pub constraints: Vec<ConstraintSpec>,
}

impl System {
    pub fn kinds(&self) -> impl Iterator<Item = ModuleKind> + '_ {
        self.modules.iter().map(|m| m.kind)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Complexity {
    #[default]
    Simple,
    Moderate,
    Complex,
}

impl Complexity {
    /// Classified by how many parameters and formulas a module carries.
    pub fn classify(parameters: usize, formulas: usize) -> Self {
        match parameters + formulas {
            0..=4 => Complexity::Simple,
            5..=8 => Complexity::Moderate,
            _ => Complexity::Complex,
        }
    }
}

/// An atomic module instantiated for one problem.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IrModule {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ModuleKind,
    pub name: String,
    pub parameters: Vec<Parameter>,
    pub equations: Vec<String>,
    pub conservation_laws: Vec<ConservationLaw>,
    pub assumptions: Vec<String>,
    pub complexity: Complexity,
    /// Modules whose outputs this one consumes.
    pub dependencies: Vec<String>,
}

/// Initial conditions of one object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObjectSpec {
    pub id: String,
    pub position: DVec3,
    pub velocity: DVec3,
    pub acceleration: DVec3,
    pub mass: f64,
    pub properties: BTreeMap<String, f64>,
}

impl Default for ObjectSpec {
    fn default() -> Self {
        Self {
            id: String::new(),
            position: DVec3::ZERO,
            velocity: DVec3::ZERO,
            acceleration: DVec3::ZERO,
            mass: 1.0,
            properties: BTreeMap::new(),
        }
    }
}

impl ObjectSpec {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    pub fn to_state(&self) -> ObjectState {
        ObjectState {
            position: self.position,
            velocity: self.velocity,
            acceleration: self.acceleration,
            mass: self.mass,
            properties: self.properties.clone(),
        }
    }
}

/// Ambient conditions. Missing fields take the documented defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Environment {
    /// m/s²
    pub gravity: f64,
    /// °C
    pub temperature: f64,
    /// Linear drag coefficient, kg/s.
    pub air_resistance: f64,
    /// Height of the ground plane; `None` disables it.
    pub ground_level: Option<f64>,
    /// Coefficient of restitution against the ground or an incline.
    pub restitution: f64,
    /// Coefficient of restitution between objects.
    pub collision_restitution: f64,
}

impl Default for Environment {
    fn default() -> Self {
        Self {
            gravity: 9.8,
            temperature: 20.0,
            air_resistance: 0.0,
            ground_level: Some(0.0),
            restitution: 0.0,
            collision_restitution: 1.0,
        }
    }
}

/// Explicit geometric constraint from the input, e.g. `ground` with
/// `{level, restitution}` or `incline` with `{angle | angle_deg, restitution}`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConstraintSpec {
    #[serde(rename = "type")]
    pub kind: String,
    pub parameters: BTreeMap<String, f64>,
}

impl ConstraintSpec {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            parameters: BTreeMap::new(),
        }
    }

    pub fn with(mut self, key: &str, value: f64) -> Self {
        self.parameters.insert(key.to_string(), value);
        self
    }

    pub fn get(&self, key: &str) -> Option<f64> {
        self.parameters.get(key).copied().filter(|v| v.is_finite())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationSettings {
    pub duration: f64,
    pub time_step: f64,
    pub solver: Solver,
    /// Local error tolerance for adaptive stepping.
    pub precision: f64,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            duration: DEFAULT_DURATION,
            time_step: DEFAULT_TIME_STEP,
            solver: Solver::default(),
            precision: DEFAULT_PRECISION,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IrValidation {
    pub structure_valid: bool,
    pub physics_valid: bool,
    pub units_consistent: bool,
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
}

impl Default for IrValidation {
    fn default() -> Self {
        Self {
            structure_valid: true,
            physics_valid: true,
            units_consistent: true,
            warnings: Vec::new(),
            errors: Vec::new(),
        }
    }
}
