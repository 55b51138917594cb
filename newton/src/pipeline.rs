//! Enrichment, assembly, simulation and validation wired together.

use crate::config::NewtonConfig;
use crate::enrich::{self, Enricher};
use crate::error::Result;
use crate::investigation::validate::{ValidationReport, Validator};
use crate::ir::{Ir, IrAssembler, SystemInput};
use crate::simulation::{SimulationEngine, SimulationOutput};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineReport {
    pub ir: Ir,
    pub simulation: SimulationOutput,
    pub validation: ValidationReport,
}

pub struct Pipeline {
    assembler: IrAssembler<'static>,
    engine: SimulationEngine,
    validator: Validator,
    enrichers: Vec<Box<dyn Enricher>>,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new(NewtonConfig::default())
    }
}

impl Pipeline {
    pub fn new(config: NewtonConfig) -> Self {
        Self {
            assembler: IrAssembler::new(config.scoring),
            engine: SimulationEngine::new(config.simulation),
            validator: Validator::new(config.validation),
            enrichers: Vec::new(),
        }
    }

    pub fn with_enricher(mut self, enricher: impl Enricher + 'static) -> Self {
        self.enrichers.push(Box::new(enricher));
        self
    }

    /// Enrich and assemble without simulating.
    pub fn assemble(&self, mut input: SystemInput) -> Result<Ir> {
        enrich::apply(&self.enrichers, &mut input);
        let ir = self.assembler.assemble(&input)?;
        tracing::info!(
            modules = ?ir.system.modules.iter().map(|m| m.id.as_str()).collect::<Vec<_>>(),
            fallback = ir.metadata.used_fallback,
            warnings = ir.validation.warnings.len(),
            "IR assembled"
        );
        Ok(ir)
    }

    /// Structural errors abort the run; numerical and physical trouble is
    /// reported inside the returned report.
    pub fn run(&self, input: SystemInput) -> Result<PipelineReport> {
        let ir = self.assemble(input)?;
        Ok(self.simulate(ir))
    }

    /// Simulate and validate an already assembled IR.
    pub fn simulate(&self, ir: Ir) -> PipelineReport {
        let simulation = self.engine.run(&ir);
        let validation = self.validator.validate(&ir, &simulation);
        PipelineReport {
            ir,
            simulation,
            validation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enrich::EnrichError;
    use crate::error::Error;

    struct SpringConstant;

    impl Enricher for SpringConstant {
        fn name(&self) -> &str {
            "spring_constant"
        }

        fn enrich(&self, _: &SystemInput) -> std::result::Result<Option<SystemInput>, EnrichError> {
            Ok(Some(SystemInput::default().with_parameter("k", 4.0, "N/m")))
        }
    }

    #[test]
    fn test_spring_problem_end_to_end() {
        let mut input = SystemInput::new("oscillation", "A mass on a spring oscillates")
            .with_parameter("m", 1.0, "kg")
            .with_parameter("A", 0.5, "m");
        input.simulation.duration = Some(2.0);
        input.simulation.time_step = Some(0.001);

        let report = Pipeline::default().with_enricher(SpringConstant).run(input).unwrap();
        assert!(report.ir.system.modules.iter().any(|m| m.id == "oscillation_spring_mass"));
        assert!(report.simulation.success);
        assert!(report.validation.conservation_checks.iter().all(|c| c.passed));
    }

    #[test]
    fn test_simulate_minimal_ir() {
        let ir: Ir = serde_json::from_str(r#"{"system":{"modules":[],"objects":[]}}"#).unwrap();
        let report = Pipeline::default().simulate(ir);
        assert!(report.simulation.success);
        assert_eq!(report.simulation.final_state.objects.len(), 1);
    }

    #[test]
    fn test_unknown_module_aborts() {
        let mut input = SystemInput::default();
        input.modules.push("warp_drive".into());
        assert!(matches!(Pipeline::default().run(input), Err(Error::UnknownModule(_))));
    }
}
