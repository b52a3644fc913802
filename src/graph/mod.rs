// Mon Aug 3 2026 - Alex

pub mod error;
pub mod field;
pub mod graph;
pub mod interner;
pub mod node;
pub mod scope;
pub mod type_ref;

pub use error::GraphError;
pub use field::Field;
pub use graph::{
    BuildSummary, Diagnostic, DiagnosticKind, RootCategory, RootEntry, RootIndex, TypeGraph,
    UnresolvedGraph,
};
pub use interner::NodeInterner;
pub use node::{
    ArrayType, ConstValue, ConstantType, EnumType, Enumerator, FunctionPointerType, PointerType,
    RecordKind, RecordStatus, RecordType, ScalarType, TypeNode, TypedefType,
};
pub use scope::{ScopePath, ScopeSegment, ScopedName};
pub use type_ref::TypeRef;
