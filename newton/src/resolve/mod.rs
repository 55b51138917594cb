//! Module resolution: weighted relevance scoring over the catalog, then a
//! dependency graph over the selected modules and its evaluation order.

pub mod graph;
pub mod scoring;

pub use graph::DependencyGraph;
pub use scoring::{Problem, ScoreBreakdown, ScoringConfig};

use crate::error::{Error, Result};
use crate::laws::catalog::{catalog, AtomicModule, Catalog, ModuleKind};
use serde::Serialize;

/// Score of one catalog module against a problem.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModuleScore {
    pub module: String,
    pub kind: ModuleKind,
    pub breakdown: ScoreBreakdown,
    pub threshold: f64,
    pub selected: bool,
}

/// Outcome of resolving a problem against the catalog.
#[derive(Debug, Clone)]
pub struct Resolution {
    /// Every scored module, in catalog order.
    pub scores: Vec<ModuleScore>,
    /// Selected module ids in evaluation order.
    pub order: Vec<String>,
    pub graph: DependencyGraph,
    pub used_fallback: bool,
}

impl Resolution {
    pub fn is_selected(&self, id: &str) -> bool {
        self.order.iter().any(|m| m == id)
    }
}

pub struct ModuleResolver<'c> {
    catalog: &'c Catalog,
    config: ScoringConfig,
}

impl ModuleResolver<'static> {
    pub fn new(config: ScoringConfig) -> Self {
        Self::with_catalog(catalog(), config)
    }
}

impl Default for ModuleResolver<'static> {
    fn default() -> Self {
        Self::new(ScoringConfig::default())
    }
}

impl<'c> ModuleResolver<'c> {
    pub fn with_catalog(catalog: &'c Catalog, config: ScoringConfig) -> Self {
        Self { catalog, config }
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    pub fn catalog(&self) -> &'c Catalog {
        self.catalog
    }

    /// Score every module, select those clearing their kind's threshold and
    /// order them. Generic modules are never scored; the fallback is used
    /// only when nothing else is selected.
    pub fn resolve(&self, problem: &Problem) -> Result<Resolution> {
        let scores: Vec<ModuleScore> = self
            .catalog
            .iter()
            .filter(|m| m.kind != ModuleKind::Generic)
            .map(|m| {
                let breakdown = self.config.score(m, problem);
                let threshold = self.config.threshold(m.kind);
                ModuleScore {
                    module: m.id.clone(),
                    kind: m.kind,
                    breakdown,
                    threshold,
                    selected: breakdown.total >= threshold,
                }
            })
            .collect();

        let selected: Vec<&str> = scores
            .iter()
            .filter(|s| s.selected)
            .map(|s| s.module.as_str())
            .collect();
        tracing::debug!(
            target: "resolver",
            candidates = scores.len(),
            selected = selected.len(),
            "scored module catalog"
        );

        let mut resolution = self.order(&selected)?;
        resolution.scores = scores;
        Ok(resolution)
    }

    /// Order an explicit module list, e.g. one resolved by an external
    /// caller. An empty list falls back like an unsuccessful resolution.
    pub fn resolve_ids<S: AsRef<str>>(&self, ids: &[S]) -> Result<Resolution> {
        let ids: Vec<&str> = ids.iter().map(|id| id.as_ref()).collect();
        self.order(&ids)
    }

    fn order(&self, ids: &[&str]) -> Result<Resolution> {
        let used_fallback = ids.is_empty();
        let ids: Vec<&str> = if used_fallback {
            tracing::info!(
                target: "resolver",
                fallback = %self.config.fallback,
                "no module selected, using fallback"
            );
            vec![self.config.fallback.as_str()]
        } else {
            ids.to_vec()
        };

        let mut modules: Vec<&AtomicModule> = ids
            .iter()
            .map(|id| {
                self.catalog
                    .get(id)
                    .ok_or_else(|| Error::UnknownModule(id.to_string()))
            })
            .collect::<Result<_>>()?;
        // Catalog order is the tie-breaker inside a domain category.
        modules.sort_by_key(|m| self.catalog.position(&m.id));
        modules.dedup_by(|a, b| a.id == b.id);

        let graph = DependencyGraph::build(&modules);
        let order = graph.topological_order()?;
        tracing::info!(
            target: "resolver",
            modules = ?order,
            edges = graph.edge_count(),
            "resolved module order"
        );

        Ok(Resolution {
            scores: Vec::new(),
            order,
            graph,
            used_fallback,
        })
    }
}
