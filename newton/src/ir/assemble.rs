use super::derive::derive_constants;
use super::input::SystemInput;
use super::{
    Complexity, Environment, Ir, IrModule, IrValidation, Metadata, ObjectSpec, SimulationSettings,
    System, DEFAULT_DURATION, DEFAULT_PRECISION, DEFAULT_TIME_STEP,
};
use crate::core::dimension::{dimension_of, Dimension};
use crate::core::quantity::{merge_parameters, Parameter, ParameterTable, Quantity, Role};
use crate::error::{Error, Result};
use crate::laws::catalog::{Catalog, ConservationLaw};
use crate::resolve::{ModuleResolver, Problem, Resolution, ScoringConfig};
use glam::DVec3;
use std::collections::BTreeSet;

/// Builds an [`Ir`] from the input contract.
pub struct IrAssembler<'c> {
    resolver: ModuleResolver<'c>,
}

impl IrAssembler<'static> {
    pub fn new(scoring: ScoringConfig) -> Self {
        Self::with_resolver(ModuleResolver::new(scoring))
    }
}

impl Default for IrAssembler<'static> {
    fn default() -> Self {
        Self::new(ScoringConfig::default())
    }
}

impl<'c> IrAssembler<'c> {
    pub fn with_resolver(resolver: ModuleResolver<'c>) -> Self {
        Self { resolver }
    }

    pub fn resolver(&self) -> &ModuleResolver<'c> {
        &self.resolver
    }

    /// The scoring view of an input.
    pub fn problem(input: &SystemInput) -> Problem {
        Problem::new(
            input.parameters.iter().map(|p| p.symbol.as_str()),
            &input.system_type,
            &input.text,
        )
    }

    /// Resolve modules for `input` and assemble the IR. Module ids listed in
    /// the input are used as given instead of scoring the catalog.
    pub fn assemble(&self, input: &SystemInput) -> Result<Ir> {
        let resolution = if input.modules.is_empty() {
            self.resolver.resolve(&Self::problem(input))?
        } else {
            self.resolver.resolve_ids(&input.modules)?
        };
        self.build(input, resolution)
    }

    /// Assemble with an explicit module list, skipping relevance scoring.
    pub fn assemble_with_modules<S: AsRef<str>>(
        &self,
        input: &SystemInput,
        module_ids: &[S],
    ) -> Result<Ir> {
        let resolution = self.resolver.resolve_ids(module_ids)?;
        self.build(input, resolution)
    }

    fn build(&self, input: &SystemInput, resolution: Resolution) -> Result<Ir> {
        let mut report = IrValidation::default();

        // 1. Problem parameters
        let problem = problem_parameters(input, &mut report)?;

        // 2. Modules in evaluation order
        let modules = self.instantiate(&resolution, &problem)?;

        // 3. Dimensional consistency of problem data against module templates
        check_units(self.resolver.catalog(), &problem, &modules, &mut report);

        // 4. Fold problem, template, output and environment parameters
        let outputs = modules
            .iter()
            .filter_map(|m| self.resolver.catalog().get(&m.id))
            .flat_map(|m| m.output.iter())
            .map(|symbol| Parameter::new(symbol.as_str(), Quantity::default(), Role::Unknown))
            .collect::<Vec<_>>();
        let mut parameters = merge_parameters(
            problem
                .iter()
                .cloned()
                .chain(modules.iter().flat_map(|m| m.parameters.iter().cloned()))
                .chain(outputs)
                .chain(environment_parameters(&input.environment)),
        );

        // 5. Precomputed constants
        let derived = derive_constants(&mut parameters);

        let table = ParameterTable::new(&parameters);
        let conservation_laws = conservation_laws(&modules, &table, &input.environment, &mut report);
        let objects = objects(input, &table, &mut report);
        let simulation = settings(input, &table, &mut report);

        for p in &parameters {
            if p.role == Role::Given && p.value().is_none() {
                report
                    .errors
                    .push(format!("given parameter `{}` has no value", p.symbol));
            }
        }
        report.structure_valid = !modules.is_empty() && report.errors.is_empty();

        tracing::info!(
            target: "assembler",
            modules = modules.len(),
            parameters = parameters.len(),
            derived = derived.len(),
            objects = objects.len(),
            warnings = report.warnings.len(),
            "assembled IR"
        );

        Ok(Ir {
            metadata: Metadata {
                system_type: input.system_type.clone(),
                used_fallback: resolution.used_fallback,
                ..Default::default()
            },
            system: System {
                modules,
                parameters,
                conservation_laws,
                objects,
                environment: input.environment.clone(),
                constraints: input.constraints.clone(),
            },
            simulation,
            validation: report,
        })
    }

    fn instantiate(&self, resolution: &Resolution, problem: &[Parameter]) -> Result<Vec<IrModule>> {
        let given = ParameterTable::new(problem);
        resolution
            .order
            .iter()
            .map(|id| {
                let module = self
                    .resolver
                    .catalog()
                    .get(id)
                    .ok_or_else(|| Error::UnknownModule(id.clone()))?;

                let parameters: Vec<Parameter> = module
                    .parameters
                    .iter()
                    .map(|template| match given.get(&template.symbol) {
                        Some(p) if p.description.is_empty() => {
                            p.clone().with_description(template.description.clone())
                        }
                        Some(p) => p.clone(),
                        None => template.clone(),
                    })
                    .collect();

                Ok(IrModule {
                    id: module.id.clone(),
                    kind: module.kind,
                    name: module.name.clone(),
                    complexity: Complexity::classify(parameters.len(), module.formulas.len()),
                    parameters,
                    equations: module.formulas.clone(),
                    conservation_laws: module.kind.conservation_laws().to_vec(),
                    assumptions: module
                        .kind
                        .assumptions()
                        .iter()
                        .map(|a| a.to_string())
                        .collect(),
                    dependencies: resolution
                        .graph
                        .predecessors(id)
                        .into_iter()
                        .map(String::from)
                        .collect(),
                })
            })
            .collect()
    }
}

fn warn(report: &mut IrValidation, message: String) {
    tracing::warn!(target: "assembler", "{message}");
    report.warnings.push(message);
}

fn problem_parameters(input: &SystemInput, report: &mut IrValidation) -> Result<Vec<Parameter>> {
    input
        .parameters
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let symbol = p.symbol.trim();
            if symbol.is_empty() {
                return Err(Error::MissingField(format!("parameters[{i}].symbol")));
            }

            let unit = p.value.unit.trim();
            if !unit.is_empty() && dimension_of(unit).is_none() {
                warn(report, format!("unknown unit `{unit}` for `{symbol}`"));
            }

            let value = match p.value.value {
                Some(v) if !v.is_finite() => {
                    warn(report, format!("non-finite value for `{symbol}` ignored"));
                    None
                }
                v => v,
            };
            let role = p.role.unwrap_or(if value.is_some() { Role::Given } else { Role::Unknown });

            Ok(Parameter::new(symbol, Quantity::new(value, unit), role)
                .with_description(p.description.clone()))
        })
        .collect()
}

/// Dimension of a parameter when its unit is both stated and registered.
fn stated_dimension(p: &Parameter) -> Option<Dimension> {
    let unit = p.quantity.unit.trim();
    if unit.is_empty() {
        return None;
    }
    dimension_of(unit)
}

fn check_units(catalog: &Catalog, problem: &[Parameter], modules: &[IrModule], report: &mut IrValidation) {
    for p in problem {
        let Some(given) = stated_dimension(p) else {
            continue;
        };
        for module in modules {
            let Some(template) = catalog
                .get(&module.id)
                .and_then(|m| m.parameter(&p.symbol))
            else {
                continue;
            };
            let Some(expected) = stated_dimension(template) else {
                continue;
            };
            if !given.consistent(&expected) {
                report.units_consistent = false;
                warn(
                    report,
                    format!(
                        "`{}` has dimension {given} but `{}` expects {expected}",
                        p.symbol, module.id
                    ),
                );
            }
        }
    }
}

fn environment_parameters(env: &Environment) -> Vec<Parameter> {
    vec![
        Parameter::new("g", Quantity::known(env.gravity, "m/s^2"), Role::Constant)
            .with_description("gravitational acceleration"),
    ]
}

fn conservation_laws(
    modules: &[IrModule],
    table: &ParameterTable<'_>,
    env: &Environment,
    report: &mut IrValidation,
) -> Vec<ConservationLaw> {
    let mut laws: Vec<ConservationLaw> = Vec::new();
    for law in modules.iter().flat_map(|m| m.conservation_laws.iter().copied()) {
        if !laws.contains(&law) {
            laws.push(law);
        }
    }
    if !laws.contains(&ConservationLaw::Mass) {
        laws.push(ConservationLaw::Mass);
    }

    let damping = table.value("b").unwrap_or(0.0).max(env.air_resistance);
    let friction = table.value("mu").unwrap_or(0.0);
    if laws.contains(&ConservationLaw::Energy) && (damping > 0.0 || friction > 0.0) {
        laws.retain(|l| *l != ConservationLaw::Energy);
        warn(
            report,
            format!(
                "energy is not conserved with damping b={damping} and friction mu={friction}; check dropped"
            ),
        );
    }
    laws
}

/// One object synthesised from problem parameters when the input has none.
fn synthesize_object(table: &ParameterTable<'_>) -> ObjectSpec {
    let mut object = ObjectSpec::new("object_1");
    if let Some(m) = table.value("m") {
        object.mass = m;
    }
    if let Some(a) = table.value("A") {
        object.position.x = a;
    }
    if let Some(h) = table.value("h") {
        object.position.y = h;
    }
    if let Some(v0) = table.value_any(&["v0", "v"]) {
        object.velocity = match table.angle(&["theta"]) {
            Some(theta) => DVec3::new(v0 * theta.cos(), v0 * theta.sin(), 0.0),
            None => DVec3::new(v0, 0.0, 0.0),
        };
    }
    if let Some(q) = table.value("q") {
        object.properties.insert("charge".into(), q);
    }
    if let Some(r) = table.value("r_obj") {
        object.properties.insert("radius".into(), r);
    }
    object
}

fn objects(input: &SystemInput, table: &ParameterTable<'_>, report: &mut IrValidation) -> Vec<ObjectSpec> {
    let specs = if input.objects.is_empty() {
        vec![synthesize_object(table)]
    } else {
        input.objects.clone()
    };

    let mut seen = BTreeSet::new();
    let mut objects = Vec::with_capacity(specs.len());
    for (i, mut object) in specs.into_iter().enumerate() {
        if object.id.trim().is_empty() {
            object.id = free_id(&seen, "object", i + 1);
        } else if seen.contains(&object.id) {
            let renamed = free_id(&seen, &object.id, i + 1);
            warn(report, format!("duplicate object id `{}` renamed to `{renamed}`", object.id));
            object.id = renamed;
        }
        seen.insert(object.id.clone());

        if !(object.mass.is_finite() && object.mass > 0.0) {
            warn(
                report,
                format!("object `{}` has invalid mass {}; using 1 kg", object.id, object.mass),
            );
            object.mass = 1.0;
            report.physics_valid = false;
        }
        for (name, vector) in [
            ("position", &mut object.position),
            ("velocity", &mut object.velocity),
            ("acceleration", &mut object.acceleration),
        ] {
            if !vector.is_finite() {
                *vector = DVec3::ZERO;
                report.physics_valid = false;
                tracing::warn!(target: "assembler", object = %object.id, "non-finite {name} reset to zero");
                report
                    .warnings
                    .push(format!("object `{}` has a non-finite {name}; reset to zero", object.id));
            }
        }
        objects.push(object);
    }
    objects
}

/// First `{base}_{n}` with `n >= start` not taken yet.
fn free_id(seen: &BTreeSet<String>, base: &str, start: usize) -> String {
    let mut n = start;
    loop {
        let id = format!("{base}_{n}");
        if !seen.contains(&id) {
            return id;
        }
        n += 1;
    }
}

fn settings(input: &SystemInput, table: &ParameterTable<'_>, report: &mut IrValidation) -> SimulationSettings {
    let overrides = &input.simulation;
    let mut positive_or = |name: &str, value: Option<f64>, default: f64| match value {
        Some(v) if v.is_finite() && v > 0.0 => v,
        Some(v) => {
            warn(report, format!("invalid {name} {v}; using {default}"));
            default
        }
        None => default,
    };

    let duration = positive_or(
        "duration",
        overrides.duration.or_else(|| table.value("t_total")),
        DEFAULT_DURATION,
    );
    let mut time_step = positive_or("time step", overrides.time_step, DEFAULT_TIME_STEP);
    let precision = positive_or("precision", overrides.precision, DEFAULT_PRECISION);

    if time_step > duration {
        warn(
            report,
            format!("time step {time_step} exceeds duration {duration}; clamped"),
        );
        time_step = duration;
    }

    SimulationSettings {
        duration,
        time_step,
        solver: overrides.solver.unwrap_or_default(),
        precision,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::input::InputParameter;

    fn free_fall() -> SystemInput {
        SystemInput::new("free_fall", "A ball is dropped from a height of 20 m")
            .with_parameter("h", 20.0, "m")
            .with_parameter("m", 0.5, "kg")
    }

    #[test]
    fn test_defaults_and_synthesised_object() {
        let ir = IrAssembler::default().assemble(&free_fall()).unwrap();

        assert!(!ir.system.modules.is_empty());
        assert_eq!(ir.system.objects.len(), 1);
        let object = &ir.system.objects[0];
        assert_eq!(object.position, DVec3::new(0.0, 20.0, 0.0));
        assert_eq!(object.mass, 0.5);

        assert_eq!(ir.system.environment.gravity, 9.8);
        assert!(ir.system.conservation_laws.contains(&ConservationLaw::Mass));
        assert_eq!(ir.simulation.duration, DEFAULT_DURATION);
        assert_eq!(ir.simulation.time_step, DEFAULT_TIME_STEP);

        let table = ParameterTable::new(&ir.system.parameters);
        assert_eq!(table.get("g").unwrap().role, Role::Constant);
        let t_fall = table.get("t_fall").unwrap();
        assert_eq!(t_fall.role, Role::Derived);
        assert!((t_fall.value().unwrap() - (40.0f64 / 9.8).sqrt()).abs() < 1e-12);

        assert!(ir.validation.structure_valid);
        assert!(ir.validation.physics_valid);
        assert!(ir.validation.units_consistent);
    }

    #[test]
    fn test_incommensurable_units_are_flagged() {
        let input = SystemInput::new("oscillation", "")
            .with_parameter("k", 10.0, "kg")
            .with_parameter("m", 1.0, "kg");
        let ir = IrAssembler::default()
            .assemble_with_modules(&input, &["oscillation_spring_mass"])
            .unwrap();

        assert!(!ir.validation.units_consistent);
        assert!(ir.validation.warnings.iter().any(|w| w.contains("`k`")));
    }

    #[test]
    fn test_unknown_unit_is_a_warning() {
        let input = SystemInput::new("", "").with_parameter("h", 3.0, "furlong");
        let ir = IrAssembler::default().assemble(&input).unwrap();
        assert!(ir.validation.warnings.iter().any(|w| w.contains("furlong")));
        assert!(ir.validation.units_consistent);
    }

    #[test]
    fn test_damping_drops_energy_conservation() {
        let input = SystemInput::new("oscillation", "")
            .with_parameter("m", 1.0, "kg")
            .with_parameter("k", 1.0, "N/m")
            .with_parameter("b", 0.2, "kg/s");
        let ir = IrAssembler::default()
            .assemble_with_modules(&input, &["oscillation_damped"])
            .unwrap();

        assert!(!ir.system.conservation_laws.contains(&ConservationLaw::Energy));
        assert!(ir.system.conservation_laws.contains(&ConservationLaw::AngularMomentum));
        assert_eq!(ir.system.modules[0].dependencies, Vec::<String>::new());
        let table = ParameterTable::new(&ir.system.parameters);
        assert!(table.value("omega_d").is_some());
    }

    #[test]
    fn test_invalid_object_is_corrected() {
        let mut object = ObjectSpec::new("");
        object.mass = -2.0;
        object.velocity = DVec3::new(f64::NAN, 0.0, 0.0);
        let input = SystemInput::new("", "").with_object(object);

        let ir = IrAssembler::default().assemble(&input).unwrap();
        let fixed = &ir.system.objects[0];
        assert_eq!(fixed.id, "object_1");
        assert_eq!(fixed.mass, 1.0);
        assert_eq!(fixed.velocity, DVec3::ZERO);
        assert!(!ir.validation.physics_valid);
    }

    #[test]
    fn test_renamed_ids_stay_unique() {
        for ids in [&["a_3", "a", "a"][..], &["", "object_1"], &["object_2", "", ""]] {
            let mut input = SystemInput::new("", "");
            for id in ids {
                input = input.with_object(ObjectSpec::new(*id));
            }
            let ir = IrAssembler::default().assemble(&input).unwrap();
            let unique: BTreeSet<&str> = ir.system.objects.iter().map(|o| o.id.as_str()).collect();
            assert_eq!(unique.len(), ids.len(), "{ids:?} -> {unique:?}");
        }
    }

    #[test]
    fn test_missing_symbol_is_structural() {
        let mut input = SystemInput::new("", "");
        input.parameters.push(InputParameter::given("", 1.0, "m"));
        let err = IrAssembler::default().assemble(&input).unwrap_err();
        assert!(matches!(err, Error::MissingField(_)));
    }

    #[test]
    fn test_overrides_and_clamping() {
        let mut input = free_fall();
        input.simulation.duration = Some(0.5);
        input.simulation.time_step = Some(1.0);
        let ir = IrAssembler::default().assemble(&input).unwrap();
        assert_eq!(ir.simulation.duration, 0.5);
        assert_eq!(ir.simulation.time_step, 0.5);
        assert!(!ir.validation.warnings.is_empty());
    }
}
