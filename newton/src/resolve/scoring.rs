//! Declarative relevance scoring.
//!
//! Every weight, threshold, alias and synonym the resolver uses lives in
//! [`ScoringConfig`]. The shipped default is `config/scoring.ron`, mirrored
//! exactly by `ScoringConfig::default()`.

use crate::core::quantity::Role;
use crate::laws::catalog::{AtomicModule, ModuleKind, FALLBACK_MODULE};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

pub const SCORING_VERSION: u32 = 1;

/// Function names and constants that never count as formula identifiers.
const FORMULA_BUILTINS: &[&str] = &[
    "sqrt", "sin", "cos", "tan", "asin", "acos", "atan", "exp", "log", "log10", "ln", "abs", "pi",
];

const STOPWORDS: &[&str] = &[
    "the", "and", "with", "from", "for", "into", "onto", "under", "over", "between", "through",
    "per", "its", "that", "this", "has", "was", "are", "what", "how", "when", "which", "find",
];

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreWeights {
    pub parameters: f64,
    pub system_type: f64,
    pub text: f64,
    pub formulas: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParameterMatch {
    pub exact: f64,
    pub fuzzy: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TypeMatch {
    pub exact: f64,
    pub alias: f64,
    pub substring: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub version: u32,
    pub weights: ScoreWeights,
    pub parameter_match: ParameterMatch,
    pub type_match: TypeMatch,
    /// Text hits beyond this count add nothing.
    pub text_saturation: usize,
    /// Selection threshold for kinds missing from `thresholds`.
    pub default_threshold: f64,
    /// Per-kind selection thresholds, keyed by kind name.
    pub thresholds: BTreeMap<String, f64>,
    /// Coarse system-type labels mapped to the kind they denote.
    pub type_aliases: BTreeMap<String, ModuleKind>,
    /// Extra problem-text vocabulary per kind name.
    pub synonyms: BTreeMap<String, Vec<String>>,
    /// Module selected when nothing clears its threshold.
    pub fallback: String,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        let thresholds = [
            ("kinematics", 0.8),
            ("dynamics", 0.8),
            ("energy", 0.7),
            ("momentum", 0.7),
            ("circular_motion", 0.7),
            ("rotation", 0.7),
            ("gravitation", 0.7),
            ("oscillation", 0.7),
            ("waves", 0.6),
            ("acoustics", 0.6),
            ("optics", 0.6),
            ("fluids", 0.6),
            ("pressure", 0.6),
            ("thermodynamics", 0.6),
            ("electrostatics", 0.6),
            ("magnetism", 0.6),
            ("circuits", 0.6),
            ("relativity", 0.6),
            ("quantum", 0.6),
        ];

        use ModuleKind::*;
        let aliases = [
            ("motion", Kinematics),
            ("linear_motion", Kinematics),
            ("free_fall", Kinematics),
            ("projectile", Kinematics),
            ("projectile_motion", Kinematics),
            ("force", Dynamics),
            ("forces", Dynamics),
            ("newtonian", Dynamics),
            ("friction", Dynamics),
            ("incline", Dynamics),
            ("inclined_plane", Dynamics),
            ("work", Energy),
            ("collision", Momentum),
            ("collisions", Momentum),
            ("impulse", Momentum),
            ("circular", CircularMotion),
            ("rotational", Rotation),
            ("rigid_body", Rotation),
            ("gravity", Gravitation),
            ("orbit", Gravitation),
            ("orbital", Gravitation),
            ("spring", Oscillation),
            ("harmonic", Oscillation),
            ("shm", Oscillation),
            ("pendulum", Oscillation),
            ("oscillator", Oscillation),
            ("wave", Waves),
            ("sound", Acoustics),
            ("light", Optics),
            ("fluid", Fluids),
            ("hydrodynamics", Fluids),
            ("hydrostatics", Pressure),
            ("heat", Thermodynamics),
            ("thermal", Thermodynamics),
            ("gas", Thermodynamics),
            ("electric", Electrostatics),
            ("electrostatic", Electrostatics),
            ("magnetic", Magnetism),
            ("electromagnetism", Magnetism),
            ("circuit", Circuits),
            ("electronics", Circuits),
            ("relativistic", Relativity),
            ("special_relativity", Relativity),
            ("quantum_mechanics", Quantum),
        ];

        let synonyms: [(&str, &[&str]); 19] = [
            (
                "kinematics",
                &[
                    "motion", "moves", "moving", "velocity", "speed", "displacement", "dropped",
                    "falls", "falling", "thrown", "launched", "trajectory", "projectile",
                ],
            ),
            (
                "dynamics",
                &[
                    "force", "forces", "push", "pull", "friction", "slides", "sliding", "incline",
                    "ramp", "slope", "tension", "drag",
                ],
            ),
            (
                "energy",
                &["energy", "work", "power", "kinetic", "potential", "joules", "conservation"],
            ),
            (
                "momentum",
                &["momentum", "collision", "collide", "collides", "impulse", "bounce", "elastic", "inelastic"],
            ),
            (
                "circular_motion",
                &["circular", "circle", "centripetal", "revolves", "around"],
            ),
            (
                "rotation",
                &["torque", "rotation", "rotates", "spin", "spins", "angular", "inertia", "wheel"],
            ),
            (
                "gravitation",
                &["gravitation", "gravitational", "orbit", "orbits", "planet", "satellite", "moon"],
            ),
            (
                "oscillation",
                &[
                    "oscillation", "oscillates", "oscillating", "oscillator", "spring", "harmonic",
                    "pendulum", "vibration", "periodic", "amplitude",
                ],
            ),
            (
                "waves",
                &["wave", "waves", "wavelength", "frequency", "string", "standing"],
            ),
            (
                "acoustics",
                &["sound", "acoustic", "doppler", "loudness", "decibel", "siren"],
            ),
            (
                "optics",
                &["light", "lens", "refraction", "mirror", "optical", "ray", "prism"],
            ),
            (
                "fluids",
                &["fluid", "buoyancy", "floats", "submerged", "flow", "pipe", "water"],
            ),
            (
                "pressure",
                &["pressure", "depth", "hydrostatic", "submarine", "dam"],
            ),
            (
                "thermodynamics",
                &["heat", "temperature", "gas", "thermal", "entropy", "piston"],
            ),
            (
                "electrostatics",
                &["charge", "charges", "electric", "coulomb", "field", "electron"],
            ),
            (
                "magnetism",
                &["magnetic", "lorentz", "cyclotron", "magnet", "tesla"],
            ),
            (
                "circuits",
                &["circuit", "resistor", "current", "voltage", "capacitor", "battery", "ohm"],
            ),
            (
                "relativity",
                &["relativistic", "relativity", "dilation", "einstein"],
            ),
            ("quantum", &["photon", "quantum", "planck", "broglie"]),
        ];

        Self {
            version: SCORING_VERSION,
            weights: ScoreWeights {
                parameters: 0.30,
                system_type: 0.25,
                text: 0.25,
                formulas: 0.20,
            },
            parameter_match: ParameterMatch {
                exact: 1.0,
                fuzzy: 0.5,
            },
            type_match: TypeMatch {
                exact: 1.0,
                alias: 0.9,
                substring: 0.6,
            },
            text_saturation: 3,
            default_threshold: 0.7,
            thresholds: thresholds
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
            type_aliases: aliases
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
            synonyms: synonyms
                .into_iter()
                .map(|(k, words)| (k.to_string(), words.iter().map(|w| w.to_string()).collect()))
                .collect(),
            fallback: FALLBACK_MODULE.to_string(),
        }
    }
}

/// Normalised view of a problem used for scoring.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Problem {
    pub symbols: Vec<String>,
    pub system_type: String,
    text_words: BTreeSet<String>,
    /// Text words plus lowercased parameter symbols.
    tokens: BTreeSet<String>,
}

impl Problem {
    pub fn new<S: AsRef<str>>(
        symbols: impl IntoIterator<Item = S>,
        system_type: &str,
        text: &str,
    ) -> Self {
        let symbols: Vec<String> = symbols.into_iter().map(|s| s.as_ref().to_string()).collect();
        let text_words: BTreeSet<String> = words(text).filter(|w| w.len() >= 2).collect();
        let tokens = text_words
            .iter()
            .cloned()
            .chain(symbols.iter().map(|s| s.to_lowercase()))
            .collect();
        Self {
            symbols,
            system_type: system_type.trim().to_lowercase(),
            text_words,
            tokens,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub parameters: f64,
    pub system_type: f64,
    pub text: f64,
    pub formulas: f64,
    pub total: f64,
}

impl ScoringConfig {
    pub fn threshold(&self, kind: ModuleKind) -> f64 {
        self.thresholds
            .get(kind.name())
            .copied()
            .unwrap_or(self.default_threshold)
    }

    pub fn score(&self, module: &AtomicModule, problem: &Problem) -> ScoreBreakdown {
        let parameters = self.parameter_score(module, problem);
        let system_type = self.type_score(module.kind, &problem.system_type);
        let text = self.text_score(module, problem);
        let formulas = formula_score(module, problem);

        let w = &self.weights;
        let total = w.parameters * parameters
            + w.system_type * system_type
            + w.text * text
            + w.formulas * formulas;

        ScoreBreakdown {
            parameters,
            system_type,
            text,
            formulas,
            total,
        }
    }

    /// Overlap between the module's inputs and the problem's symbols.
    /// Constants are supplied by the module itself and are not counted.
    fn parameter_score(&self, module: &AtomicModule, problem: &Problem) -> f64 {
        let inputs: Vec<&str> = module
            .parameters
            .iter()
            .filter(|p| p.role != Role::Constant)
            .map(|p| p.symbol.as_str())
            .collect();
        if inputs.is_empty() {
            return 0.0;
        }

        let sum: f64 = inputs
            .iter()
            .map(|&symbol| {
                if problem.symbols.iter().any(|s| s == symbol) {
                    return self.parameter_match.exact;
                }
                let lower = symbol.to_lowercase();
                let fuzzy = problem.symbols.iter().any(|s| {
                    let s = s.to_lowercase();
                    !s.is_empty() && (s.contains(&lower) || lower.contains(&s))
                });
                if fuzzy { self.parameter_match.fuzzy } else { 0.0 }
            })
            .sum();
        (sum / inputs.len() as f64).clamp(0.0, 1.0)
    }

    fn type_score(&self, kind: ModuleKind, system_type: &str) -> f64 {
        if system_type.is_empty() {
            return 0.0;
        }
        let name = kind.name();
        if system_type == name {
            self.type_match.exact
        } else if self.type_aliases.get(system_type) == Some(&kind) {
            self.type_match.alias
        } else if system_type.contains(name) || name.contains(system_type) {
            self.type_match.substring
        } else {
            0.0
        }
    }

    fn text_score(&self, module: &AtomicModule, problem: &Problem) -> f64 {
        if self.text_saturation == 0 {
            return 0.0;
        }
        let mut vocabulary: BTreeSet<String> = words(&module.name)
            .chain(words(&module.description))
            .filter(|w| w.len() >= 3 && !STOPWORDS.contains(&w.as_str()))
            .collect();
        if let Some(extra) = self.synonyms.get(module.kind.name()) {
            vocabulary.extend(extra.iter().map(|w| w.to_lowercase()));
        }

        let hits = problem.text_words.intersection(&vocabulary).count();
        hits.min(self.text_saturation) as f64 / self.text_saturation as f64
    }
}

fn formula_score(module: &AtomicModule, problem: &Problem) -> f64 {
    let identifiers: BTreeSet<String> = module
        .formulas
        .iter()
        .flat_map(|f| formula_identifiers(f))
        .collect();
    if identifiers.is_empty() {
        return 0.0;
    }
    let hits = identifiers.intersection(&problem.tokens).count();
    hits as f64 / identifiers.len() as f64
}

/// Lowercased identifiers of a formula, without builtin function names.
pub fn formula_identifiers(formula: &str) -> impl Iterator<Item = String> + '_ {
    formula
        .split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|t| t.chars().next().is_some_and(char::is_alphabetic))
        .map(str::to_lowercase)
        .filter(|t| !FORMULA_BUILTINS.contains(&t.as_str()))
}

fn words(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.chars().next().is_some_and(char::is_alphabetic))
        .map(str::to_lowercase)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::laws::catalog::catalog;

    fn spring_problem() -> Problem {
        Problem::new(["m", "k", "A"], "oscillation", "A mass on a spring oscillates")
    }

    #[test]
    fn test_shipped_config_matches_default() {
        let shipped: ScoringConfig =
            ron::from_str(include_str!("../../config/scoring.ron")).unwrap();
        assert_eq!(shipped, ScoringConfig::default());
    }

    #[test]
    fn test_weights_sum_to_one() {
        let w = ScoringConfig::default().weights;
        let sum = w.parameters + w.system_type + w.text + w.formulas;
        assert!((sum - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_spring_problem_scores_spring_mass_above_threshold() {
        let config = ScoringConfig::default();
        let module = catalog().get("oscillation_spring_mass").unwrap();
        let score = config.score(module, &spring_problem());

        assert_eq!(score.parameters, 1.0);
        assert_eq!(score.system_type, 1.0);
        assert_eq!(score.text, 1.0);
        assert!(score.total >= config.threshold(ModuleKind::Oscillation));
        assert!(score.total <= 1.0);
    }

    #[test]
    fn test_type_match_levels() {
        let config = ScoringConfig::default();
        assert_eq!(config.type_score(ModuleKind::Oscillation, "oscillation"), 1.0);
        assert_eq!(config.type_score(ModuleKind::Oscillation, "pendulum"), 0.9);
        assert_eq!(config.type_score(ModuleKind::CircularMotion, "circular_motion_problem"), 0.6);
        assert_eq!(config.type_score(ModuleKind::Optics, "oscillation"), 0.0);
        assert_eq!(config.type_score(ModuleKind::Optics, ""), 0.0);
    }

    #[test]
    fn test_fuzzy_parameter_match() {
        let config = ScoringConfig::default();
        let module = catalog().get("dynamics_newton_second").unwrap();
        // `F_net` contains `F`, `m` is exact
        let problem = Problem::new(["F_net", "m"], "", "");
        assert_eq!(config.parameter_score(module, &problem), 0.75);
    }

    #[test]
    fn test_formula_identifiers_skip_builtins() {
        let ids: Vec<_> = formula_identifiers("T_period = 2 * pi * sqrt(l / g)").collect();
        assert_eq!(ids, ["t_period", "l", "g"]);
    }
}
