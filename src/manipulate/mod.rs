// Wed Aug 5 2026 - Alex

pub mod connected;
pub mod flatten;
pub mod source_filter;
pub mod topo;

pub use connected::ConnectedFilter;
pub use flatten::NamespaceFlattener;
pub use source_filter::SourceFilter;
pub use topo::TopologicalSort;

use crate::graph::{GraphError, RootEntry, RootIndex, TypeGraph};

/// A transform over the finalized graph. Manipulators never run inside the
/// core build; they consume one immutable graph and produce another.
pub trait Manipulator {
    fn name(&self) -> &str;
    fn apply(&self, graph: &TypeGraph) -> Result<TypeGraph, GraphError>;
}

/// Ordered chain of manipulators applied front to back.
pub struct ManipulatorPipeline {
    stages: Vec<Box<dyn Manipulator>>,
}

impl ManipulatorPipeline {
    pub fn new() -> Self {
        Self { stages: Vec::new() }
    }

    pub fn add_stage<M: Manipulator + 'static>(&mut self, stage: M) {
        self.stages.push(Box::new(stage));
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    pub fn run(&self, graph: TypeGraph) -> Result<TypeGraph, GraphError> {
        let mut current = graph;
        for stage in &self.stages {
            log::debug!("applying manipulator '{}'", stage.name());
            current = stage.apply(&current)?;
        }
        Ok(current)
    }
}

impl Default for ManipulatorPipeline {
    fn default() -> Self {
        Self::new()
    }
}

/// Rebuild a root index keeping only the entries `keep` accepts.
pub(crate) fn filter_index(graph: &TypeGraph, keep: impl Fn(&RootEntry) -> bool) -> RootIndex {
    let mut index = RootIndex::default();
    for entry in &graph.index().entries {
        if keep(entry) {
            index.insert(entry.clone());
        }
    }
    index
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{RawNode, RawNodeKind, RawNodeSet};
    use crate::config::Config;
    use crate::process;

    /// `Holder { Leaf l; }` declared before `Leaf`, a system-header struct,
    /// and a namespaced struct, all in one file.
    fn fixture() -> TypeGraph {
        let set = RawNodeSet::new(
            Some("app.h".to_string()),
            vec![
                RawNode::new("_tu", RawNodeKind::TranslationUnit),
                RawNode::new("_int", RawNodeKind::FundamentalType)
                    .with_name("int")
                    .with_size_align(4, 4),
                RawNode::new("_fl", RawNodeKind::Field)
                    .with_name("l")
                    .with_type("_leaf"),
                RawNode::new("_holder", RawNodeKind::Struct)
                    .with_name("Holder")
                    .with_context("_tu")
                    .with_members(vec!["_fl".to_string()])
                    .with_source("app.h", 10),
                RawNode::new("_fx", RawNodeKind::Field)
                    .with_name("x")
                    .with_type("_int"),
                RawNode::new("_leaf", RawNodeKind::Struct)
                    .with_name("Leaf")
                    .with_context("_tu")
                    .with_members(vec!["_fx".to_string()])
                    .with_source("app.h", 4),
                RawNode::new("_fs", RawNodeKind::Field)
                    .with_name("x")
                    .with_type("_int"),
                RawNode::new("_sys", RawNodeKind::Struct)
                    .with_name("SysThing")
                    .with_context("_tu")
                    .with_members(vec!["_fs".to_string()])
                    .with_source("/usr/include/sys.h", 99),
                RawNode::new("_outer", RawNodeKind::Namespace)
                    .with_name("Outer")
                    .with_context("_tu"),
                RawNode::new("_inner", RawNodeKind::Namespace)
                    .with_name("Inner")
                    .with_context("_outer"),
                RawNode::new("_fy", RawNodeKind::Field)
                    .with_name("y")
                    .with_type("_int"),
                RawNode::new("_b", RawNodeKind::Struct)
                    .with_name("B")
                    .with_context("_inner")
                    .with_members(vec!["_fy".to_string()])
                    .with_source("app.h", 20),
            ],
        );
        process(&[set], &Config::default()).unwrap()
    }

    #[test]
    fn test_source_filter_drops_system_headers() {
        let graph = fixture();
        let filtered = SourceFilter::exclude_system().apply(&graph).unwrap();

        assert!(filtered.index().records.get("SysThing").is_none());
        assert!(filtered.index().records.get("Holder").is_some());
        assert!(filtered.index().records.get("Leaf").is_some());
        // Nodes stay in the arena; only enumeration changes.
        assert_eq!(filtered.node_count(), graph.node_count());
    }

    #[test]
    fn test_connected_filter_keeps_reachable() {
        let graph = fixture();
        let filtered = ConnectedFilter::new(vec!["Holder".to_string()])
            .apply(&graph)
            .unwrap();

        assert!(filtered.index().records.get("Holder").is_some());
        assert!(filtered.index().records.get("Leaf").is_some());
        assert!(filtered.index().records.get("SysThing").is_none());
        assert!(filtered.index().records.get("Outer::Inner::B").is_none());
    }

    #[test]
    fn test_connected_filter_unknown_root_errors() {
        let graph = fixture();
        let result = ConnectedFilter::new(vec!["Nope".to_string()]).apply(&graph);
        assert!(result.is_err());
    }

    #[test]
    fn test_topological_sort_orders_dependencies_first() {
        let graph = fixture();
        let sorted = TopologicalSort.apply(&graph).unwrap();

        let names: Vec<String> = sorted
            .index()
            .entries
            .iter()
            .map(|e| e.name.fullname())
            .collect();
        let leaf = names.iter().position(|n| n == "Leaf").unwrap();
        let holder = names.iter().position(|n| n == "Holder").unwrap();
        assert!(leaf < holder, "Leaf must come before Holder: {:?}", names);
    }

    #[test]
    fn test_namespace_flattener() {
        let graph = fixture();
        let flat = NamespaceFlattener.apply(&graph).unwrap();

        let r = flat.index().records.get("Outer__Inner__B").copied().unwrap();
        let rec = flat.resolve(r).unwrap().as_record().unwrap();
        assert_eq!(rec.name.as_ref().unwrap().fullname(), "Outer__Inner__B");
        assert!(flat.index().records.get("Outer::Inner::B").is_none());
    }

    #[test]
    fn test_pipeline_chains_stages() {
        let graph = fixture();
        let mut pipeline = ManipulatorPipeline::new();
        pipeline.add_stage(SourceFilter::exclude_system());
        pipeline.add_stage(TopologicalSort);
        assert_eq!(pipeline.len(), 2);

        let out = pipeline.run(graph).unwrap();
        assert!(out.index().records.get("SysThing").is_none());
        let names: Vec<String> = out
            .index()
            .entries
            .iter()
            .map(|e| e.name.fullname())
            .collect();
        let leaf = names.iter().position(|n| n == "Leaf").unwrap();
        let holder = names.iter().position(|n| n == "Holder").unwrap();
        assert!(leaf < holder);
    }
}
