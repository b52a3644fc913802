// Mon Aug 3 2026 - Alex

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

/// Kind tag of a raw node as emitted by the parsing front end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RawNodeKind {
    Typedef,
    Struct,
    Class,
    Union,
    Enum,
    Variable,
    Field,
    FundamentalType,
    Pointer,
    Array,
    FunctionType,
    CvQualified,
    Elaborated,
    Namespace,
    TranslationUnit,
    File,
}

impl RawNodeKind {
    pub fn is_record(self) -> bool {
        matches!(self, Self::Struct | Self::Class | Self::Union)
    }

    /// Categories the builder walks directly; everything else is reached
    /// through type-reference fields.
    pub fn is_definition(self) -> bool {
        matches!(
            self,
            Self::Typedef | Self::Struct | Self::Class | Self::Union | Self::Enum | Self::Variable
        )
    }
}

bitflags! {
    /// Marker flags carried by raw nodes. Serde impls come from the
    /// bitflags `serde` feature (formatted-string representation).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
    pub struct RawNodeFlags: u32 {
        const INCOMPLETE  = 1 << 0;
        const HAS_VTABLE  = 1 << 1;
        const TEMPLATED   = 1 << 2;
        const HAS_BASES   = 1 << 3;
        const SCOPED_ENUM = 1 << 4;
    }
}

impl Default for RawNodeFlags {
    fn default() -> Self {
        Self::empty()
    }
}

impl RawNodeFlags {
    /// Non-POD indicators: the node is recognized and excluded, never built.
    pub fn is_non_pod(self) -> bool {
        self.intersects(Self::HAS_VTABLE | Self::TEMPLATED | Self::HAS_BASES)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawEnumerator {
    pub name: String,
    /// Unspecified values default left-to-right: first 0, then predecessor+1.
    #[serde(default)]
    pub value: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawLiteral {
    Int(i64),
    Float(f64),
    Str(String),
}

/// One raw AST node from the front end's JSON dump.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawNode {
    pub id: String,
    pub kind: RawNodeKind,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub context: Option<String>,
    /// Typedef target, pointer pointee, array element, cv-qualified base,
    /// variable/constant type, enum underlying type, function return type.
    #[serde(default, rename = "type")]
    pub type_ref: Option<String>,
    /// Elaborated/forward reference to the defining node.
    #[serde(default)]
    pub refers_to: Option<String>,
    /// Member node ids of a record, in declaration order.
    #[serde(default)]
    pub members: Vec<String>,
    /// Parameter type ids of a function type, in order.
    #[serde(default)]
    pub params: Vec<String>,
    #[serde(default)]
    pub flags: RawNodeFlags,
    /// Byte size/alignment of a fundamental type, per the front end.
    #[serde(default)]
    pub byte_size: Option<u64>,
    #[serde(default)]
    pub byte_align: Option<u64>,
    /// Declared bitfield width of a field node.
    #[serde(default)]
    pub bit_width: Option<u32>,
    /// Front-end-supplied bit offset; recomputed here, used only to
    /// cross-check.
    #[serde(default)]
    pub bit_offset: Option<u64>,
    /// Array dimension.
    #[serde(default)]
    pub dim: Option<u64>,
    /// Pack directive in effect at the record's declaration.
    #[serde(default)]
    pub pack: Option<u64>,
    #[serde(default)]
    pub enumerators: Vec<RawEnumerator>,
    /// Literal initializer of a constant.
    #[serde(default)]
    pub value: Option<RawLiteral>,
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default)]
    pub line: Option<u32>,
}

impl RawNode {
    pub fn new(id: impl Into<String>, kind: RawNodeKind) -> Self {
        Self {
            id: id.into(),
            kind,
            name: None,
            context: None,
            type_ref: None,
            refers_to: None,
            members: Vec::new(),
            params: Vec::new(),
            flags: RawNodeFlags::empty(),
            byte_size: None,
            byte_align: None,
            bit_width: None,
            bit_offset: None,
            dim: None,
            pack: None,
            enumerators: Vec::new(),
            value: None,
            file: None,
            line: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn with_type(mut self, type_ref: impl Into<String>) -> Self {
        self.type_ref = Some(type_ref.into());
        self
    }

    pub fn with_refers_to(mut self, target: impl Into<String>) -> Self {
        self.refers_to = Some(target.into());
        self
    }

    pub fn with_members(mut self, members: Vec<String>) -> Self {
        self.members = members;
        self
    }

    pub fn with_params(mut self, params: Vec<String>) -> Self {
        self.params = params;
        self
    }

    pub fn with_flags(mut self, flags: RawNodeFlags) -> Self {
        self.flags |= flags;
        self
    }

    pub fn with_size_align(mut self, byte_size: u64, byte_align: u64) -> Self {
        self.byte_size = Some(byte_size);
        self.byte_align = Some(byte_align);
        self
    }

    pub fn with_bit_width(mut self, width: u32) -> Self {
        self.bit_width = Some(width);
        self
    }

    pub fn with_dim(mut self, dim: u64) -> Self {
        self.dim = Some(dim);
        self
    }

    pub fn with_pack(mut self, pack: u64) -> Self {
        self.pack = Some(pack);
        self
    }

    pub fn with_enumerators(mut self, enumerators: Vec<RawEnumerator>) -> Self {
        self.enumerators = enumerators;
        self
    }

    pub fn with_value(mut self, value: RawLiteral) -> Self {
        self.value = Some(value);
        self
    }

    pub fn with_source(mut self, file: impl Into<String>, line: u32) -> Self {
        self.file = Some(file.into());
        self.line = Some(line);
        self
    }

    pub fn source(&self) -> Option<String> {
        self.file
            .as_ref()
            .map(|f| format!("{}:{}", f, self.line.unwrap_or(0)))
    }
}

/// The complete node set of one parsed translation unit.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawNodeSet {
    #[serde(default)]
    pub file: Option<String>,
    pub nodes: Vec<RawNode>,
}

impl RawNodeSet {
    pub fn new(file: Option<String>, nodes: Vec<RawNode>) -> Self {
        Self { file, nodes }
    }

    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
