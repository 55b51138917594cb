//! Boundary to external sources of problem data.
//!
//! An enricher sees the raw input before assembly and may propose a richer
//! version of it. Proposals only ever add: explicit problem data always
//! outranks inferred data.

use crate::core::quantity::Role;
use crate::ir::SystemInput;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EnrichError {
    #[error("enricher unavailable: {0}")]
    Unavailable(String),
    #[error("malformed enrichment: {0}")]
    Malformed(String),
}

pub trait Enricher {
    fn name(&self) -> &str;

    /// `Ok(None)` when there is nothing to add.
    fn enrich(&self, input: &SystemInput) -> Result<Option<SystemInput>, EnrichError>;
}

/// Fold a proposal into `input`. Returns the symbols added.
///
/// Parameters fill only symbols the input lacks and are demoted to
/// `derived`; the system type and module list are taken only when the input
/// has none.
pub fn merge(input: &mut SystemInput, proposal: SystemInput) -> Vec<String> {
    if input.system_type.trim().is_empty() {
        input.system_type = proposal.system_type;
    }
    if input.modules.is_empty() {
        input.modules = proposal.modules;
    }

    let mut added = Vec::new();
    for mut parameter in proposal.parameters {
        if parameter.symbol.is_empty() || input.parameter(&parameter.symbol).is_some() {
            continue;
        }
        if parameter.value.value.is_some() {
            parameter.role = Some(Role::Derived);
        }
        added.push(parameter.symbol.clone());
        input.parameters.push(parameter);
    }
    added
}

/// Run every enricher in order; a failing enricher is logged and skipped.
pub fn apply(enrichers: &[Box<dyn Enricher>], input: &mut SystemInput) {
    for enricher in enrichers {
        match enricher.enrich(input) {
            Ok(Some(proposal)) => {
                let added = merge(input, proposal);
                tracing::debug!(target: "enrich", enricher = enricher.name(), ?added, "input enriched");
            }
            Ok(None) => {}
            Err(error) => {
                tracing::warn!(target: "enrich", enricher = enricher.name(), %error, "enricher failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::InputParameter;

    struct Fixed(SystemInput);

    impl Enricher for Fixed {
        fn name(&self) -> &str {
            "fixed"
        }

        fn enrich(&self, _: &SystemInput) -> Result<Option<SystemInput>, EnrichError> {
            Ok(Some(self.0.clone()))
        }
    }

    struct Offline;

    impl Enricher for Offline {
        fn name(&self) -> &str {
            "offline"
        }

        fn enrich(&self, _: &SystemInput) -> Result<Option<SystemInput>, EnrichError> {
            Err(EnrichError::Unavailable("no network".into()))
        }
    }

    #[test]
    fn test_merge_only_fills_gaps() {
        let mut input = SystemInput::new("", "").with_parameter("m", 2.0, "kg");
        let proposal = SystemInput::new("oscillation", "")
            .with_parameter("m", 5.0, "kg")
            .with_parameter("k", 8.0, "N/m");

        let added = merge(&mut input, proposal);
        assert_eq!(added, ["k"]);
        assert_eq!(input.system_type, "oscillation");
        assert_eq!(input.parameter("m").unwrap().value.value, Some(2.0));
        assert_eq!(input.parameter("k").unwrap().role, Some(Role::Derived));
    }

    #[test]
    fn test_unknowns_keep_their_role() {
        let mut input = SystemInput::default();
        let mut proposal = SystemInput::default();
        proposal.parameters.push(InputParameter::unknown("T_period", "s"));
        merge(&mut input, proposal);
        assert_eq!(input.parameter("T_period").unwrap().role, None);
    }

    #[test]
    fn test_failing_enricher_is_skipped() {
        let enrichers: Vec<Box<dyn Enricher>> = vec![
            Box::new(Offline),
            Box::new(Fixed(SystemInput::default().with_parameter("g", 9.81, "m/s^2"))),
        ];
        let mut input = SystemInput::new("free_fall", "");
        apply(&enrichers, &mut input);
        assert_eq!(input.parameter("g").unwrap().value.value, Some(9.81));
        assert_eq!(input.system_type, "free_fall");
    }
}
