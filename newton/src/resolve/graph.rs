//! Dependency graph over selected modules and its evaluation order.

use crate::error::{Error, Result};
use crate::laws::catalog::AtomicModule;
use std::collections::{BTreeMap, BTreeSet};

/// Directed graph with an edge `A -> B` whenever an output symbol of `A` is
/// a parameter of `B`.
///
/// Nodes are stored in evaluation-priority order (domain category first,
/// then the order the modules were supplied in), and predecessor sets are
/// indices into that order, so every traversal is deterministic.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DependencyGraph {
    nodes: Vec<String>,
    predecessors: BTreeMap<usize, BTreeSet<usize>>,
}

impl DependencyGraph {
    pub fn build(modules: &[&AtomicModule]) -> Self {
        let mut ranked: Vec<&AtomicModule> = modules.to_vec();
        // Stable: equal priorities keep the supplied order.
        ranked.sort_by_key(|m| m.kind.priority());

        let mut predecessors: BTreeMap<usize, BTreeSet<usize>> = BTreeMap::new();
        for (a, producer) in ranked.iter().enumerate() {
            for (b, consumer) in ranked.iter().enumerate() {
                if a == b {
                    continue;
                }
                let feeds = producer
                    .output
                    .iter()
                    .any(|symbol| consumer.has_parameter(symbol));
                if feeds {
                    predecessors.entry(b).or_default().insert(a);
                }
            }
        }

        Self {
            nodes: ranked.iter().map(|m| m.id.clone()).collect(),
            predecessors,
        }
    }

    pub fn nodes(&self) -> &[String] {
        &self.nodes
    }

    pub fn edge_count(&self) -> usize {
        self.predecessors.values().map(BTreeSet::len).sum()
    }

    /// All edges as `(from, to)` pairs.
    pub fn edges(&self) -> Vec<(String, String)> {
        self.predecessors
            .iter()
            .flat_map(|(&to, from)| {
                from.iter()
                    .map(move |&from| (self.nodes[from].clone(), self.nodes[to].clone()))
            })
            .collect()
    }

    /// Modules whose outputs `id` consumes.
    pub fn predecessors(&self, id: &str) -> Vec<&str> {
        let Some(index) = self.nodes.iter().position(|n| n == id) else {
            return Vec::new();
        };
        self.predecessors
            .get(&index)
            .map(|set| set.iter().map(|&i| self.nodes[i].as_str()).collect())
            .unwrap_or_default()
    }

    /// Depth-first topological order: every module appears after all of its
    /// predecessors. A back edge is reported as [`Error::DependencyCycle`];
    /// edges are never dropped to break a cycle.
    pub fn topological_order(&self) -> Result<Vec<String>> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut done = BTreeSet::new();
        let mut visiting = Vec::new();

        for node in 0..self.nodes.len() {
            self.visit(node, &mut visiting, &mut done, &mut order)?;
        }
        Ok(order.into_iter().map(|i| self.nodes[i].clone()).collect())
    }

    fn visit(
        &self,
        node: usize,
        visiting: &mut Vec<usize>,
        done: &mut BTreeSet<usize>,
        order: &mut Vec<usize>,
    ) -> Result<()> {
        if done.contains(&node) {
            return Ok(());
        }
        if let Some(start) = visiting.iter().position(|&v| v == node) {
            let path = visiting[start..]
                .iter()
                .chain(std::iter::once(&node))
                .map(|&i| self.nodes[i].clone())
                .collect();
            return Err(Error::DependencyCycle {
                module: self.nodes[node].clone(),
                path,
            });
        }

        visiting.push(node);
        if let Some(preds) = self.predecessors.get(&node) {
            for &pred in preds {
                self.visit(pred, visiting, done, order)?;
            }
        }
        visiting.pop();

        done.insert(node);
        order.push(node);
        Ok(())
    }
}
