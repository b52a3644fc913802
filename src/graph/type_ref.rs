// Mon Aug 3 2026 - Alex

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identity of a node inside one type graph.
///
/// A `TypeRef` is a lookup key (interned index + graph generation), never an
/// owning handle. The graph is the sole owner of all nodes; every inter-node
/// relationship is one of these, which is what lets self-referential and
/// mutually-referential types exist without infinite expansion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeRef {
    index: u32,
    generation: u32,
}

impl TypeRef {
    pub fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }

    pub fn with_index(self, index: u32) -> Self {
        Self { index, ..self }
    }

    pub fn with_generation(self, generation: u32) -> Self {
        Self { generation, ..self }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}@g{}", self.index, self.generation)
    }
}
