// Mon Aug 3 2026 - Alex

pub mod ast;
pub mod builder;
pub mod config;
pub mod finalize;
pub mod graph;
pub mod layout;
pub mod logging;
pub mod manipulate;
pub mod output;

pub use ast::{RawNode, RawNodeFlags, RawNodeKind, RawNodeSet};
pub use builder::{build_all, GraphBuilder};
pub use config::Config;
pub use finalize::finalize;
pub use graph::{GraphError, TypeGraph, TypeNode, TypeRef, UnresolvedGraph};
pub use layout::{BitfieldMode, Endianness, LayoutEngine, TargetProfile};
pub use manipulate::{Manipulator, ManipulatorPipeline};
pub use output::{JsonExporter, TextReport};

/// Build, lay out and finalize one or more raw node sets in a single call.
pub fn process(sets: &[RawNodeSet], config: &Config) -> Result<TypeGraph, GraphError> {
    let mut graph = build_all(sets, config)?;
    let target = config.target_profile();
    LayoutEngine::new(&target).compute_all(&mut graph)?;
    finalize(graph, config, sets.len())
}
