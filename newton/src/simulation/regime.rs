//! Per-run law sets.
//!
//! A regime is chosen once from the IR's module kinds and fixes which laws
//! and constraints drive the stepping loop for the whole run.

use crate::core::quantity::ParameterTable;
use crate::core::solve::constraints::{Constraint, SphereConstraint, SurfaceConstraint};
use crate::ir::{ConstraintSpec, Ir};
use crate::laws::catalog::ModuleKind;
use crate::laws::classical::{LinearDrag, SlopeFriction, Spring, UniformGravity};
use crate::laws::electromagnetic::Lorentz;
use crate::laws::registry::LawRegistry;
use glam::DVec3;
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Regime {
    #[default]
    General,
    ComplexKinematics,
    Oscillatory,
    Wave,
    Electromagnetic,
}

/// Which regime a module kind pulls towards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Family {
    Oscillatory,
    Wave,
    Electromagnetic,
    Mechanical,
    Neutral,
}

fn family(kind: ModuleKind) -> Family {
    match kind {
        ModuleKind::Oscillation => Family::Oscillatory,
        ModuleKind::Waves | ModuleKind::Acoustics | ModuleKind::Optics => Family::Wave,
        ModuleKind::Electrostatics | ModuleKind::Magnetism | ModuleKind::Circuits => {
            Family::Electromagnetic
        }
        ModuleKind::Dynamics | ModuleKind::Rotation | ModuleKind::CircularMotion => Family::Mechanical,
        ModuleKind::Kinematics
        | ModuleKind::Energy
        | ModuleKind::Momentum
        | ModuleKind::Gravitation
        | ModuleKind::Fluids
        | ModuleKind::Pressure
        | ModuleKind::Thermodynamics
        | ModuleKind::Relativity
        | ModuleKind::Quantum
        | ModuleKind::Generic => Family::Neutral,
    }
}

impl Regime {
    /// The specialised family with the most modules wins, ties resolved
    /// oscillatory, wave, electromagnetic. Without any, mechanical modules
    /// select complex kinematics; everything else runs the general regime.
    pub fn select(kinds: impl IntoIterator<Item = ModuleKind>) -> Self {
        let mut counts = [0usize; 3];
        let mut mechanical = false;
        for kind in kinds {
            match family(kind) {
                Family::Oscillatory => counts[0] += 1,
                Family::Wave => counts[1] += 1,
                Family::Electromagnetic => counts[2] += 1,
                Family::Mechanical => mechanical = true,
                Family::Neutral => {}
            }
        }

        let specialised = [Regime::Oscillatory, Regime::Wave, Regime::Electromagnetic];
        let best = counts
            .iter()
            .enumerate()
            .filter(|(_, n)| **n > 0)
            // max_by_key keeps the last maximum; reverse so the first wins ties
            .rev()
            .max_by_key(|(_, n)| **n)
            .map(|(i, _)| specialised[i]);

        match best {
            Some(regime) => regime,
            None if mechanical => Regime::ComplexKinematics,
            None => Regime::General,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Regime::General => "general",
            Regime::ComplexKinematics => "complex_kinematics",
            Regime::Oscillatory => "oscillatory",
            Regime::Wave => "wave",
            Regime::Electromagnetic => "electromagnetic",
        }
    }
}

/// Laws and constraints for one run.
pub struct RegimeSetup {
    pub regime: Regime,
    pub laws: LawRegistry,
    pub constraints: Vec<Box<dyn Constraint>>,
    pub warnings: Vec<String>,
}

impl std::fmt::Debug for RegimeSetup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegimeSetup")
            .field("regime", &self.regime)
            .field("laws", &self.laws)
            .field(
                "constraints",
                &self.constraints.iter().map(|c| c.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl RegimeSetup {
    pub fn from_ir(ir: &Ir) -> Self {
        let regime = Regime::select(ir.system.kinds());
        let table = ParameterTable::new(&ir.system.parameters);
        let env = &ir.system.environment;
        let g = table.value("g").unwrap_or(env.gravity);
        let damping = table.value("b").unwrap_or(env.air_resistance).max(0.0);

        let mut laws = LawRegistry::new();
        let mut constraints: Vec<Box<dyn Constraint>> = Vec::new();

        match regime {
            Regime::Oscillatory => {
                let k = table.value("k").unwrap_or_else(|| {
                    match (table.value("m"), table.value("omega")) {
                        (Some(m), Some(w)) => m * w * w,
                        _ => 1.0,
                    }
                });
                laws.add(Spring::new(k));
            }
            Regime::Wave => {
                let f = table.value("f").filter(|f| *f > 0.0).unwrap_or(1.0);
                laws.add(Spring::transverse(TAU * f));
            }
            Regime::Electromagnetic => {
                let electric = DVec3::X * table.value("E").unwrap_or(0.0);
                let magnetic = DVec3::Z * table.value("B").unwrap_or(0.0);
                let charge = table.value("q").unwrap_or(1.0);
                laws.add(Lorentz::new(electric, magnetic, charge));
            }
            Regime::ComplexKinematics => {
                laws.add(UniformGravity::new(g));
                let mu = table.value("mu").unwrap_or(0.0).max(0.0);
                match table.angle(&["theta"]).filter(|a| *a != 0.0) {
                    Some(angle) => {
                        laws.add(SlopeFriction::incline(mu, g, angle));
                        constraints.push(Box::new(SurfaceConstraint::incline(angle, env.restitution)));
                    }
                    None => {
                        laws.add(SlopeFriction::incline(mu, g, 0.0));
                        if let Some(level) = env.ground_level {
                            constraints.push(Box::new(SurfaceConstraint::ground(level, env.restitution)));
                        }
                    }
                }
            }
            Regime::General => {
                laws.add(UniformGravity::new(g));
                if let Some(level) = env.ground_level {
                    constraints.push(Box::new(SurfaceConstraint::ground(level, env.restitution)));
                }
            }
        }
        if damping > 0.0 {
            laws.add(LinearDrag::new(damping));
        }

        constraints.push(Box::new(SphereConstraint::new(env.collision_restitution)));

        let mut warnings = Vec::new();
        for spec in &ir.system.constraints {
            match explicit_constraint(spec, env.restitution) {
                Some(c) => constraints.push(c),
                None => warnings.push(format!("unsupported constraint type `{}` ignored", spec.kind)),
            }
        }

        tracing::debug!(
            target: "simulation",
            regime = regime.name(),
            laws = ?laws.names(),
            constraints = constraints.len(),
            "regime selected"
        );

        Self {
            regime,
            laws,
            constraints,
            warnings,
        }
    }
}

fn explicit_constraint(spec: &ConstraintSpec, default_restitution: f64) -> Option<Box<dyn Constraint>> {
    let restitution = spec.get("restitution").unwrap_or(default_restitution);
    match spec.kind.as_str() {
        "ground" | "floor" => Some(Box::new(SurfaceConstraint::ground(
            spec.get("level").unwrap_or(0.0),
            restitution,
        ))),
        "incline" | "inclined_plane" => {
            let angle = spec
                .get("angle")
                .or_else(|| spec.get("angle_deg").map(f64::to_radians))?;
            Some(Box::new(SurfaceConstraint::incline(angle, restitution)))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ModuleKind::*;

    #[test]
    fn test_regime_selection() {
        assert_eq!(Regime::select([]), Regime::General);
        assert_eq!(Regime::select([Kinematics, Energy]), Regime::General);
        assert_eq!(Regime::select([Kinematics, Dynamics]), Regime::ComplexKinematics);
        assert_eq!(Regime::select([Dynamics, Oscillation]), Regime::Oscillatory);
        assert_eq!(Regime::select([Magnetism, Circuits, Oscillation]), Regime::Electromagnetic);
        // ties: oscillatory before wave before electromagnetic
        assert_eq!(Regime::select([Waves, Oscillation]), Regime::Oscillatory);
        assert_eq!(Regime::select([Magnetism, Acoustics]), Regime::Wave);
    }

    #[test]
    fn test_empty_ir_gets_gravity_and_ground() {
        let setup = RegimeSetup::from_ir(&Ir::default());
        assert_eq!(setup.regime, Regime::General);
        assert_eq!(setup.laws.names(), ["uniform_gravity"]);
        let names: Vec<_> = setup.constraints.iter().map(|c| c.name()).collect();
        assert_eq!(names, ["ground", "sphere_contact"]);
    }

    #[test]
    fn test_unsupported_constraint_is_reported() {
        let mut ir = Ir::default();
        ir.system.constraints.push(ConstraintSpec::new("rope"));
        ir.system
            .constraints
            .push(ConstraintSpec::new("incline").with("angle_deg", 30.0));
        let setup = RegimeSetup::from_ir(&ir);
        assert_eq!(setup.constraints.len(), 3);
        assert_eq!(setup.warnings.len(), 1);
    }
}
