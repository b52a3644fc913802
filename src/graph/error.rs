// Mon Aug 3 2026 - Alex

use crate::graph::TypeRef;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GraphError {
    #[error("Unknown type reference: {0}")]
    UnknownReference(TypeRef),
    #[error("Unresolved field type in record '{record}': field '{field}'")]
    UnresolvedFieldType { record: String, field: String },
    #[error("Record '{0}' directly contains itself and has no finite layout")]
    InvalidRecursiveLayout(String),
    #[error("Duplicate raw node id: {0}")]
    DuplicateRawId(String),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Invalid manipulator input: {0}")]
    InvalidManipulator(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
