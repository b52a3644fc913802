// Mon Aug 3 2026 - Alex

pub mod node;

pub use node::{RawEnumerator, RawLiteral, RawNode, RawNodeFlags, RawNodeKind, RawNodeSet};
