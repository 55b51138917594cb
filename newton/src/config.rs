use crate::error::Result;
use crate::investigation::validate::ValidationConfig;
use crate::resolve::ScoringConfig;
use crate::simulation::SimulationConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Every tunable of a pipeline run. Missing sections take their defaults.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NewtonConfig {
    pub scoring: ScoringConfig,
    pub simulation: SimulationConfig,
    pub validation: ValidationConfig,
}

impl NewtonConfig {
    pub fn from_ron(text: &str) -> Result<Self> {
        Ok(ron::from_str(text)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let config = Self::from_ron(&text)?;
        tracing::debug!(path = %path.as_ref().display(), "configuration loaded");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_partial_config() {
        let config = NewtonConfig::from_ron(
            "(simulation: (adaptive: true, output_every: 5), validation: (energy_tolerance: 2.5))",
        )
        .unwrap();
        assert!(config.simulation.adaptive);
        assert_eq!(config.simulation.output_every, 5);
        assert_eq!(config.simulation.min_step, 1e-6);
        assert_eq!(config.validation.energy_tolerance, 2.5);
        assert_eq!(config.validation.mass_tolerance, 0.1);
        assert_eq!(config.scoring, ScoringConfig::default());
    }

    #[test]
    fn test_empty_config_is_default() {
        assert_eq!(NewtonConfig::from_ron("()").unwrap(), NewtonConfig::default());
    }

    #[test]
    fn test_malformed_config() {
        assert!(matches!(
            NewtonConfig::from_ron("(simulation: (adaptive: 3))"),
            Err(Error::Config(_))
        ));
        assert!(matches!(NewtonConfig::load("/nonexistent/newton.ron"), Err(Error::Io(_))));
    }
}
