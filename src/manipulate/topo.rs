// Wed Aug 5 2026 - Alex

use crate::graph::{GraphError, RootEntry, RootIndex, TypeGraph, TypeRef};
use crate::manipulate::Manipulator;
use ahash::{AHashMap, AHashSet};

/// Reorders the root index so every entity appears after the entities it
/// depends on. Cycles through pointer edges are legal and simply cut.
pub struct TopologicalSort;

impl Manipulator for TopologicalSort {
    fn name(&self) -> &str {
        "topological_sort"
    }

    fn apply(&self, graph: &TypeGraph) -> Result<TypeGraph, GraphError> {
        let mut by_index: AHashMap<u32, Vec<RootEntry>> = AHashMap::new();
        for entry in &graph.index().entries {
            by_index
                .entry(entry.node.index())
                .or_default()
                .push(entry.clone());
        }

        let mut sorter = Sorter {
            graph,
            visiting: AHashSet::new(),
            visited: AHashSet::new(),
            by_index,
            ordered: Vec::new(),
        };
        for entry in &graph.index().entries {
            sorter.visit(entry.node);
        }

        let mut index = RootIndex::default();
        for entry in sorter.ordered {
            index.insert(entry);
        }
        let mut out = graph.clone();
        *out.index_mut() = index;
        Ok(out)
    }
}

struct Sorter<'g> {
    graph: &'g TypeGraph,
    visiting: AHashSet<u32>,
    visited: AHashSet<u32>,
    by_index: AHashMap<u32, Vec<RootEntry>>,
    ordered: Vec<RootEntry>,
}

impl Sorter<'_> {
    fn visit(&mut self, r: TypeRef) {
        if self.visited.contains(&r.index()) || self.visiting.contains(&r.index()) {
            return;
        }
        self.visiting.insert(r.index());
        if let Ok(node) = self.graph.resolve(r) {
            for dep in node.references() {
                self.visit(dep);
            }
        }
        self.visiting.remove(&r.index());
        self.visited.insert(r.index());
        if let Some(entries) = self.by_index.remove(&r.index()) {
            self.ordered.extend(entries);
        }
    }
}
