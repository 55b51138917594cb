//! The atomic-module catalog.
//!
//! Every entry describes one physical law in isolation: its parameters,
//! formulas, statically declared dependencies and output symbols. The
//! catalog is built once on first use and never mutated afterwards.
//!
//! Module kinds form a closed enum; all per-kind behaviour (domain priority,
//! conservation laws, assumptions) is an exhaustive `match`, so adding a kind
//! forces every consumer to decide how to treat it.

mod electromagnetism;
mod matter;
mod mechanics;
mod modern;
mod waves;

use crate::core::quantity::{Parameter, Quantity, Role};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;

/// Id of the module selected when nothing else clears its threshold.
pub const FALLBACK_MODULE: &str = "generic_mechanics";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModuleKind {
    Kinematics,
    Dynamics,
    Energy,
    Momentum,
    CircularMotion,
    Rotation,
    Gravitation,
    Oscillation,
    Waves,
    Acoustics,
    Optics,
    Fluids,
    Pressure,
    Thermodynamics,
    Electrostatics,
    Magnetism,
    Circuits,
    Relativity,
    Quantum,
    #[default]
    Generic,
}

/// Conserved quantities the validator knows how to measure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConservationLaw {
    Energy,
    Momentum,
    AngularMomentum,
    Mass,
}

impl ConservationLaw {
    pub fn name(self) -> &'static str {
        match self {
            ConservationLaw::Energy => "energy",
            ConservationLaw::Momentum => "momentum",
            ConservationLaw::AngularMomentum => "angular_momentum",
            ConservationLaw::Mass => "mass",
        }
    }
}

impl fmt::Display for ConservationLaw {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl ModuleKind {
    pub const ALL: [ModuleKind; 20] = [
        ModuleKind::Kinematics,
        ModuleKind::Dynamics,
        ModuleKind::Energy,
        ModuleKind::Momentum,
        ModuleKind::CircularMotion,
        ModuleKind::Rotation,
        ModuleKind::Gravitation,
        ModuleKind::Oscillation,
        ModuleKind::Waves,
        ModuleKind::Acoustics,
        ModuleKind::Optics,
        ModuleKind::Fluids,
        ModuleKind::Pressure,
        ModuleKind::Thermodynamics,
        ModuleKind::Electrostatics,
        ModuleKind::Magnetism,
        ModuleKind::Circuits,
        ModuleKind::Relativity,
        ModuleKind::Quantum,
        ModuleKind::Generic,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ModuleKind::Kinematics => "kinematics",
            ModuleKind::Dynamics => "dynamics",
            ModuleKind::Energy => "energy",
            ModuleKind::Momentum => "momentum",
            ModuleKind::CircularMotion => "circular_motion",
            ModuleKind::Rotation => "rotation",
            ModuleKind::Gravitation => "gravitation",
            ModuleKind::Oscillation => "oscillation",
            ModuleKind::Waves => "waves",
            ModuleKind::Acoustics => "acoustics",
            ModuleKind::Optics => "optics",
            ModuleKind::Fluids => "fluids",
            ModuleKind::Pressure => "pressure",
            ModuleKind::Thermodynamics => "thermodynamics",
            ModuleKind::Electrostatics => "electrostatics",
            ModuleKind::Magnetism => "magnetism",
            ModuleKind::Circuits => "circuits",
            ModuleKind::Relativity => "relativity",
            ModuleKind::Quantum => "quantum",
            ModuleKind::Generic => "generic",
        }
    }

    /// Domain-category order: foundational quantities come first so the
    /// domains that consume them are evaluated later.
    pub fn priority(self) -> u8 {
        match self {
            ModuleKind::Kinematics => 0,
            ModuleKind::Dynamics => 1,
            ModuleKind::Rotation | ModuleKind::CircularMotion | ModuleKind::Gravitation => 2,
            ModuleKind::Energy | ModuleKind::Momentum => 3,
            ModuleKind::Oscillation => 4,
            ModuleKind::Waves => 5,
            ModuleKind::Acoustics | ModuleKind::Optics => 6,
            ModuleKind::Fluids | ModuleKind::Pressure => 7,
            ModuleKind::Thermodynamics => 8,
            ModuleKind::Electrostatics => 9,
            ModuleKind::Magnetism | ModuleKind::Circuits => 10,
            ModuleKind::Relativity => 11,
            ModuleKind::Quantum => 12,
            ModuleKind::Generic => 13,
        }
    }

    pub fn conservation_laws(self) -> &'static [ConservationLaw] {
        use ConservationLaw::*;
        match self {
            ModuleKind::Energy | ModuleKind::Gravitation | ModuleKind::Waves => &[Energy],
            ModuleKind::Thermodynamics | ModuleKind::Magnetism => &[Energy],
            ModuleKind::Oscillation => &[Energy, AngularMomentum],
            ModuleKind::Momentum => &[Momentum],
            ModuleKind::Rotation => &[AngularMomentum],
            ModuleKind::Fluids => &[Mass],
            ModuleKind::Kinematics
            | ModuleKind::Dynamics
            | ModuleKind::CircularMotion
            | ModuleKind::Acoustics
            | ModuleKind::Optics
            | ModuleKind::Pressure
            | ModuleKind::Electrostatics
            | ModuleKind::Circuits
            | ModuleKind::Relativity
            | ModuleKind::Quantum
            | ModuleKind::Generic => &[],
        }
    }

    pub fn assumptions(self) -> &'static [&'static str] {
        match self {
            ModuleKind::Kinematics => &["point mass", "motion described without forces"],
            ModuleKind::Dynamics => &["Newtonian mechanics", "forces act on the centre of mass"],
            ModuleKind::Energy => &["mechanical energy bookkeeping", "no unmodelled losses"],
            ModuleKind::Momentum => &["isolated system", "instantaneous contact"],
            ModuleKind::CircularMotion => &["uniform circular motion"],
            ModuleKind::Rotation => &["rigid body", "fixed rotation axis"],
            ModuleKind::Gravitation => &["point masses", "Newtonian gravity"],
            ModuleKind::Oscillation => &["small amplitude", "linear restoring force"],
            ModuleKind::Waves => &["linear medium", "small transverse displacement"],
            ModuleKind::Acoustics => &["ideal medium", "point source"],
            ModuleKind::Optics => &["ray optics", "thin lens"],
            ModuleKind::Fluids => &["incompressible fluid", "steady flow"],
            ModuleKind::Pressure => &["static fluid", "uniform density"],
            ModuleKind::Thermodynamics => &["ideal gas", "quasi-static process"],
            ModuleKind::Electrostatics => &["point charges", "vacuum permittivity"],
            ModuleKind::Magnetism => &["uniform fields", "non-relativistic charges"],
            ModuleKind::Circuits => &["ideal components", "lumped elements"],
            ModuleKind::Relativity => &["placeholder law, not integrated"],
            ModuleKind::Quantum => &["placeholder law, not integrated"],
            ModuleKind::Generic => &["point mass under uniform gravity"],
        }
    }
}

impl fmt::Display for ModuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One physical law described in isolation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AtomicModule {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ModuleKind,
    pub name: String,
    pub description: String,
    pub parameters: Vec<Parameter>,
    pub formulas: Vec<String>,
    /// Statically declared by the module author; distinct from the graph
    /// computed at resolution time.
    pub dependencies: Vec<String>,
    pub output: Vec<String>,
}

impl AtomicModule {
    pub fn builder(
        id: impl Into<String>,
        kind: ModuleKind,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> ModuleBuilder {
        ModuleBuilder {
            module: AtomicModule {
                id: id.into(),
                kind,
                name: name.into(),
                description: description.into(),
                parameters: Vec::new(),
                formulas: Vec::new(),
                dependencies: Vec::new(),
                output: Vec::new(),
            },
        }
    }

    pub fn parameter(&self, symbol: &str) -> Option<&Parameter> {
        self.parameters.iter().find(|p| p.symbol == symbol)
    }

    pub fn has_parameter(&self, symbol: &str) -> bool {
        self.parameter(symbol).is_some()
    }
}

pub struct ModuleBuilder {
    module: AtomicModule,
}

impl ModuleBuilder {
    /// An input the module needs; unknown until the problem supplies it.
    pub fn param(mut self, symbol: &str, unit: &str, description: &str) -> Self {
        self.module.parameters.push(
            Parameter::new(symbol, Quantity::unknown(unit), Role::Unknown).with_description(description),
        );
        self
    }

    /// A physical constant with a fixed value.
    pub fn constant(mut self, symbol: &str, value: f64, unit: &str, description: &str) -> Self {
        self.module.parameters.push(
            Parameter::new(symbol, Quantity::known(value, unit), Role::Constant)
                .with_description(description),
        );
        self
    }

    pub fn formula(mut self, formula: &str) -> Self {
        self.module.formulas.push(formula.to_string());
        self
    }

    pub fn depends_on(mut self, module_id: &str) -> Self {
        self.module.dependencies.push(module_id.to_string());
        self
    }

    pub fn outputs(mut self, symbols: &[&str]) -> Self {
        self.module
            .output
            .extend(symbols.iter().map(|s| s.to_string()));
        self
    }

    pub fn build(self) -> AtomicModule {
        self.module
    }
}

/// Read-only collection of atomic modules in declaration order.
#[derive(Debug)]
pub struct Catalog {
    modules: Vec<AtomicModule>,
    index: BTreeMap<String, usize>,
}

impl Catalog {
    pub fn new(modules: Vec<AtomicModule>) -> Self {
        let index = modules
            .iter()
            .enumerate()
            .map(|(i, m)| (m.id.clone(), i))
            .collect();
        Self { modules, index }
    }

    pub fn get(&self, id: &str) -> Option<&AtomicModule> {
        self.index.get(id).map(|&i| &self.modules[i])
    }

    /// Declaration position, used as a deterministic tie-breaker.
    pub fn position(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, AtomicModule> {
        self.modules.iter()
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    pub fn of_kind(&self, kind: ModuleKind) -> impl Iterator<Item = &AtomicModule> {
        self.modules.iter().filter(move |m| m.kind == kind)
    }
}

static CATALOG: LazyLock<Catalog> = LazyLock::new(|| {
    let mut modules = Vec::new();
    modules.extend(mechanics::modules());
    modules.extend(waves::modules());
    modules.extend(matter::modules());
    modules.extend(electromagnetism::modules());
    modules.extend(modern::modules());
    tracing::debug!(target: "catalog", modules = modules.len(), "module catalog built");
    Catalog::new(modules)
});

/// The process-wide module library.
pub fn catalog() -> &'static Catalog {
    &CATALOG
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn test_catalog_ids_are_unique() {
        let ids: BTreeSet<_> = catalog().iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids.len(), catalog().len());
        assert!(catalog().len() >= 40);
    }

    #[test]
    fn test_every_kind_is_represented() {
        for kind in ModuleKind::ALL {
            assert!(
                catalog().of_kind(kind).next().is_some(),
                "no module of kind {kind}"
            );
        }
    }

    #[test]
    fn test_declared_dependencies_exist() {
        for module in catalog().iter() {
            for dep in &module.dependencies {
                assert!(catalog().get(dep).is_some(), "{} -> {dep}", module.id);
            }
        }
    }

    #[test]
    fn test_fallback_module_present() {
        let fallback = catalog().get(FALLBACK_MODULE).unwrap();
        assert_eq!(fallback.kind, ModuleKind::Generic);
    }

    #[test]
    fn test_parameter_units_are_known() {
        for module in catalog().iter() {
            for p in &module.parameters {
                assert!(
                    crate::core::dimension::dimension_of(&p.quantity.unit).is_some(),
                    "{}: unit `{}` of `{}`",
                    module.id,
                    p.quantity.unit,
                    p.symbol
                );
            }
        }
    }
}
