pub mod core;
pub mod scenario;

use anyhow::{Context, Result};
use self::core::RunnerConfig;
use newton::ir::{Ir, SystemInput};
use newton::{NewtonConfig, Pipeline, PipelineReport};

pub struct RunnerApp {
    config: RunnerConfig,
}

impl RunnerApp {
    pub fn new(config: RunnerConfig) -> Self {
        Self { config }
    }

    pub fn run(&mut self) -> Result<()> {
        tracing::info!(target: "runner", input = %self.config.input.display(), "Runner starting");

        let report = self.report()?;
        let json = if self.config.compact {
            serde_json::to_string(&report)?
        } else {
            serde_json::to_string_pretty(&report)?
        };

        match &self.config.output {
            Some(path) => {
                std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
                tracing::info!(target: "runner", output = %path.display(), "report written");
            }
            None => println!("{json}"),
        }

        tracing::info!(
            target: "runner",
            simulation = report.simulation.success,
            validation = report.validation.success,
            score = report.validation.overall_score,
            "Runner finished"
        );
        Ok(())
    }

    fn report(&self) -> Result<PipelineReport> {
        let settings = match &self.config.config {
            Some(path) => NewtonConfig::load(path).with_context(|| format!("loading {}", path.display()))?,
            None => NewtonConfig::default(),
        };
        let pipeline = Pipeline::new(settings);

        if self.config.ir {
            let ir: Ir = scenario::load(&self.config.input)?;
            Ok(pipeline.simulate(ir))
        } else {
            let input: SystemInput = scenario::load(&self.config.input)?;
            pipeline.run(input).context("assembling the simulation")
        }
    }
}
