// Wed Aug 5 2026 - Alex

pub mod builder;
pub mod fixed_width;
pub mod merge;
pub mod scope_resolver;

pub use builder::GraphBuilder;
pub use merge::{build_all, GraphMerger};
pub use scope_resolver::ScopeResolver;
