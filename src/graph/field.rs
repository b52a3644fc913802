// Mon Aug 3 2026 - Alex

use crate::graph::TypeRef;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One member of a record.
///
/// `bit_width` set means the field is a bitfield; `bit_offset` is then the
/// position relative to the start of its storage unit, which is sized by the
/// field's declared base scalar type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub name: Option<String>,
    pub ty: TypeRef,
    pub byte_offset: u64,
    pub bit_offset: Option<u32>,
    pub bit_width: Option<u32>,
}

impl Field {
    pub fn new(name: Option<String>, ty: TypeRef) -> Self {
        Self {
            name,
            ty,
            byte_offset: 0,
            bit_offset: None,
            bit_width: None,
        }
    }

    pub fn with_bit_width(mut self, width: u32) -> Self {
        self.bit_width = Some(width);
        self
    }

    pub fn is_bitfield(&self) -> bool {
        self.bit_width.is_some()
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("<anonymous>")
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} @ 0x{:X}", self.display_name(), self.byte_offset)?;
        if let (Some(pos), Some(width)) = (self.bit_offset, self.bit_width) {
            write!(f, " : {} bits at {}", width, pos)?;
        }
        Ok(())
    }
}
