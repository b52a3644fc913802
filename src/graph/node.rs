// Mon Aug 3 2026 - Alex

use crate::graph::{Field, ScopedName, TypeRef};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TypeNode {
    Scalar(ScalarType),
    Pointer(PointerType),
    Array(ArrayType),
    FunctionPointer(FunctionPointerType),
    Record(RecordType),
    Enum(EnumType),
    Typedef(TypedefType),
    Constant(ConstantType),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalarType {
    pub name: String,
    pub byte_size: u64,
    pub byte_align: u64,
    pub is_signed: bool,
    pub is_floating: bool,
    pub is_bool: bool,
    pub is_wide_char: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointerType {
    pub pointee: TypeRef,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArrayType {
    pub element: TypeRef,
    pub len: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionPointerType {
    pub return_type: TypeRef,
    pub params: Vec<TypeRef>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecordKind {
    Struct,
    Union,
}

/// Layout status of a record after the layout pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecordStatus {
    /// Layout not computed yet.
    Pending,
    Complete,
    /// One or more fields were dropped because their type never resolved.
    Partial,
    /// Direct non-pointer self-containment; no finite layout exists.
    InvalidRecursive,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordType {
    pub kind: RecordKind,
    pub name: Option<ScopedName>,
    pub fields: Vec<Field>,
    pub byte_size: u64,
    pub byte_align: u64,
    pub pack: Option<u64>,
    pub status: RecordStatus,
    pub source: Option<String>,
}

impl RecordType {
    pub fn new(kind: RecordKind, name: Option<ScopedName>) -> Self {
        Self {
            kind,
            name,
            fields: Vec::new(),
            byte_size: 0,
            byte_align: 0,
            pack: None,
            status: RecordStatus::Pending,
            source: None,
        }
    }

    pub fn is_union(&self) -> bool {
        self.kind == RecordKind::Union
    }

    pub fn is_anonymous(&self) -> bool {
        self.name.is_none()
    }

    pub fn get_field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name.as_deref() == Some(name))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enumerator {
    pub name: String,
    pub value: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnumType {
    pub name: Option<ScopedName>,
    pub underlying: TypeRef,
    pub is_scoped: bool,
    pub enumerators: Vec<Enumerator>,
    pub source: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypedefType {
    pub name: ScopedName,
    pub target: TypeRef,
    pub source: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConstValue {
    Int(i64),
    Float(f64),
    Str(String),
}

impl fmt::Display for ConstValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{}", v),
            Self::Float(v) => write!(f, "{}", v),
            Self::Str(v) => write!(f, "{:?}", v),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstantType {
    pub name: ScopedName,
    pub ty: TypeRef,
    pub value: ConstValue,
    pub source: Option<String>,
}

impl TypeNode {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Scalar(_) => "scalar",
            Self::Pointer(_) => "pointer",
            Self::Array(_) => "array",
            Self::FunctionPointer(_) => "function_pointer",
            Self::Record(r) => match r.kind {
                RecordKind::Struct => "struct",
                RecordKind::Union => "union",
            },
            Self::Enum(_) => "enum",
            Self::Typedef(_) => "typedef",
            Self::Constant(_) => "constant",
        }
    }

    pub fn is_scalar(&self) -> bool {
        matches!(self, Self::Scalar(_))
    }

    pub fn is_pointer(&self) -> bool {
        matches!(self, Self::Pointer(_))
    }

    pub fn is_record(&self) -> bool {
        matches!(self, Self::Record(_))
    }

    pub fn as_record(&self) -> Option<&RecordType> {
        match self {
            Self::Record(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_record_mut(&mut self) -> Option<&mut RecordType> {
        match self {
            Self::Record(r) => Some(r),
            _ => None,
        }
    }

    /// Named entities eligible for the root index.
    pub fn scoped_name(&self) -> Option<&ScopedName> {
        match self {
            Self::Record(r) => r.name.as_ref(),
            Self::Enum(e) => e.name.as_ref(),
            Self::Typedef(t) => Some(&t.name),
            Self::Constant(c) => Some(&c.name),
            _ => None,
        }
    }

    pub fn source(&self) -> Option<&str> {
        match self {
            Self::Record(r) => r.source.as_deref(),
            Self::Enum(e) => e.source.as_deref(),
            Self::Typedef(t) => t.source.as_deref(),
            Self::Constant(c) => c.source.as_deref(),
            _ => None,
        }
    }

    /// Every node this one references directly.
    pub fn references(&self) -> Vec<TypeRef> {
        match self {
            Self::Scalar(_) => Vec::new(),
            Self::Pointer(p) => vec![p.pointee],
            Self::Array(a) => vec![a.element],
            Self::FunctionPointer(fp) => {
                let mut refs = vec![fp.return_type];
                refs.extend(fp.params.iter().copied());
                refs
            }
            Self::Record(r) => r.fields.iter().map(|f| f.ty).collect(),
            Self::Enum(e) => vec![e.underlying],
            Self::Typedef(t) => vec![t.target],
            Self::Constant(c) => vec![c.ty],
        }
    }

    /// Rewrite every contained reference through `map`.
    pub fn remap_references(&mut self, map: &mut dyn FnMut(TypeRef) -> TypeRef) {
        match self {
            Self::Scalar(_) => {}
            Self::Pointer(p) => p.pointee = map(p.pointee),
            Self::Array(a) => a.element = map(a.element),
            Self::FunctionPointer(fp) => {
                fp.return_type = map(fp.return_type);
                for p in &mut fp.params {
                    *p = map(*p);
                }
            }
            Self::Record(r) => {
                for f in &mut r.fields {
                    f.ty = map(f.ty);
                }
            }
            Self::Enum(e) => e.underlying = map(e.underlying),
            Self::Typedef(t) => t.target = map(t.target),
            Self::Constant(c) => c.ty = map(c.ty),
        }
    }
}

impl fmt::Display for TypeNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(s) => write!(f, "{}", s.name),
            Self::Pointer(p) => write!(f, "*{}", p.pointee),
            Self::Array(a) => write!(f, "{}[{}]", a.element, a.len),
            Self::FunctionPointer(fp) => {
                write!(f, "{}(*)({} params)", fp.return_type, fp.params.len())
            }
            Self::Record(r) => match &r.name {
                Some(name) => write!(f, "{} {}", self.kind_name(), name),
                None => write!(f, "{} <anonymous>", self.kind_name()),
            },
            Self::Enum(e) => match &e.name {
                Some(name) => write!(f, "enum {}", name),
                None => write!(f, "enum <anonymous>"),
            },
            Self::Typedef(t) => write!(f, "typedef {}", t.name),
            Self::Constant(c) => write!(f, "constant {}", c.name),
        }
    }
}
