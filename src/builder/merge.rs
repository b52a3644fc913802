// Wed Aug 5 2026 - Alex

use crate::ast::RawNodeSet;
use crate::builder::GraphBuilder;
use crate::config::Config;
use crate::graph::{GraphError, ScopeSegment, ScopedName, TypeNode, TypeRef, UnresolvedGraph};
use rayon::prelude::*;

/// Build every input file and merge the partial graphs into one.
///
/// Per-file builds are independent and run in parallel; merging is the
/// serialization point. Partials are absorbed strictly in input-file order,
/// so reference assignment and later duplicate-merge choices are
/// deterministic no matter how the worker tasks finished.
pub fn build_all(sets: &[RawNodeSet], config: &Config) -> Result<UnresolvedGraph, GraphError> {
    config.validate()?;
    match sets.len() {
        0 => Ok(UnresolvedGraph::new()),
        1 => GraphBuilder::build(&sets[0], config),
        _ => {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(config.max_threads)
                .build()
                .map_err(|e| GraphError::InvalidConfig(format!("thread pool: {}", e)))?;
            let partials: Vec<Result<UnresolvedGraph, GraphError>> = pool.install(|| {
                sets.par_iter()
                    .map(|set| GraphBuilder::build(set, config))
                    .collect()
            });

            let mut merger = GraphMerger::new();
            for (ordinal, partial) in partials.into_iter().enumerate() {
                merger.absorb(ordinal, partial?);
            }
            Ok(merger.finish())
        }
    }
}

/// Folds partial per-file graphs into one global graph under a single
/// ordering authority.
pub struct GraphMerger {
    global: UnresolvedGraph,
}

impl GraphMerger {
    pub fn new() -> Self {
        Self {
            global: UnresolvedGraph::new(),
        }
    }

    pub fn absorb(&mut self, ordinal: usize, partial: UnresolvedGraph) {
        let index_offset = self.global.slot_count() as u32;
        let site_offset = self.global.anon_site_count();
        let generation = self.global.generation();
        let local_generation = partial.generation();
        let (interner, nodes, roots, diagnostics, anon_sites) = partial.into_raw_parts();

        // Primary ids in arena order, so global indices line up with the
        // offset arithmetic below.
        for raw_id in interner.raw_ids_slice() {
            let global_ref = self.global.intern(&prefixed(ordinal, raw_id));
            debug_assert_eq!(global_ref.generation(), generation);
        }
        // Aliased ids (elaborated nodes, shared scalars) keep their targets.
        for (raw_id, local_ref) in interner.entries() {
            let remapped = TypeRef::new(local_ref.index() + index_offset, generation);
            self.global.alias(&prefixed(ordinal, raw_id), remapped);
        }

        for (i, slot) in nodes.into_iter().enumerate() {
            let Some(mut node) = slot else { continue };
            node.remap_references(&mut |r| {
                debug_assert_eq!(r.generation(), local_generation);
                TypeRef::new(r.index() + index_offset, generation)
            });
            offset_node_sites(&mut node, site_offset);
            self.global
                .assign(TypeRef::new(i as u32 + index_offset, generation), node);
        }

        for mut entry in roots {
            entry.node = TypeRef::new(entry.node.index() + index_offset, generation);
            offset_name_sites(&mut entry.name, site_offset);
            self.global.add_root(entry);
        }
        for diagnostic in diagnostics {
            self.global.push_diagnostic(diagnostic);
        }
        self.global.set_anon_site_count(site_offset + anon_sites);
    }

    pub fn finish(self) -> UnresolvedGraph {
        self.global
    }
}

impl Default for GraphMerger {
    fn default() -> Self {
        Self::new()
    }
}

fn prefixed(ordinal: usize, raw_id: &str) -> String {
    format!("f{}::{}", ordinal, raw_id)
}

/// Keep anonymous-namespace sentinel sites unique across merged files.
fn offset_name_sites(name: &mut ScopedName, site_offset: u64) {
    for segment in name.scope.segments_mut() {
        if let ScopeSegment::Anonymous(site) = segment {
            *site += site_offset;
        }
    }
}

fn offset_node_sites(node: &mut TypeNode, site_offset: u64) {
    if site_offset == 0 {
        return;
    }
    match node {
        TypeNode::Record(r) => {
            if let Some(name) = r.name.as_mut() {
                offset_name_sites(name, site_offset);
            }
        }
        TypeNode::Enum(e) => {
            if let Some(name) = e.name.as_mut() {
                offset_name_sites(name, site_offset);
            }
        }
        TypeNode::Typedef(t) => offset_name_sites(&mut t.name, site_offset),
        TypeNode::Constant(c) => offset_name_sites(&mut c.name, site_offset),
        _ => {}
    }
}
