// Wed Aug 5 2026 - Alex

use crate::graph::{GraphError, TypeGraph};
use crate::manipulate::{filter_index, Manipulator};
use ahash::AHashSet;

/// Keeps only entities reachable from the given root names through field,
/// typedef and constant dependencies.
pub struct ConnectedFilter {
    roots: Vec<String>,
}

impl ConnectedFilter {
    pub fn new(roots: Vec<String>) -> Self {
        Self { roots }
    }
}

impl Manipulator for ConnectedFilter {
    fn name(&self) -> &str {
        "connected_filter"
    }

    fn apply(&self, graph: &TypeGraph) -> Result<TypeGraph, GraphError> {
        let mut stack = Vec::new();
        for root in &self.roots {
            let r = graph.index().lookup(root).ok_or_else(|| {
                GraphError::InvalidManipulator(format!("unknown root '{}'", root))
            })?;
            stack.push(r);
        }

        let mut reachable: AHashSet<u32> = AHashSet::new();
        while let Some(r) = stack.pop() {
            if !reachable.insert(r.index()) {
                continue;
            }
            if let Ok(node) = graph.resolve(r) {
                stack.extend(node.references());
            }
        }

        let index = filter_index(graph, |entry| reachable.contains(&entry.node.index()));
        let mut out = graph.clone();
        *out.index_mut() = index;
        Ok(out)
    }
}
