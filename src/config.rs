// Mon Aug 3 2026 - Alex

use crate::graph::GraphError;
use crate::layout::{BitfieldMode, Endianness, TargetProfile};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Target pointer width in bits (32 or 64).
    pub target_pointer_width: u32,
    pub target_endianness: Endianness,
    /// Global pack cap, like a compiler-wide /Zp switch. 0 = natural.
    pub default_alignment: u64,
    /// Promote any unresolved field type to a fatal run abort.
    pub strict_unresolved: bool,
    pub bitfield_mode: BitfieldMode,
    /// Keep `bool` as a distinct scalar instead of mapping it to uint8_t.
    pub use_bool: bool,
    pub max_threads: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            target_pointer_width: 64,
            target_endianness: Endianness::Little,
            default_alignment: 0,
            strict_unresolved: false,
            bitfield_mode: BitfieldMode::GccClang,
            use_bool: false,
            max_threads: num_cpus::get(),
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pointer_width(mut self, bits: u32) -> Self {
        self.target_pointer_width = bits;
        self
    }

    pub fn with_endianness(mut self, endianness: Endianness) -> Self {
        self.target_endianness = endianness;
        self
    }

    pub fn with_default_alignment(mut self, alignment: u64) -> Self {
        self.default_alignment = alignment;
        self
    }

    pub fn with_strict_unresolved(mut self, strict: bool) -> Self {
        self.strict_unresolved = strict;
        self
    }

    pub fn with_bitfield_mode(mut self, mode: BitfieldMode) -> Self {
        self.bitfield_mode = mode;
        self
    }

    pub fn with_use_bool(mut self, use_bool: bool) -> Self {
        self.use_bool = use_bool;
        self
    }

    pub fn with_max_threads(mut self, threads: usize) -> Self {
        self.max_threads = threads;
        self
    }

    pub fn validate(&self) -> Result<(), GraphError> {
        if self.target_pointer_width != 32 && self.target_pointer_width != 64 {
            return Err(GraphError::InvalidConfig(format!(
                "target_pointer_width must be 32 or 64, got {}",
                self.target_pointer_width
            )));
        }
        if self.default_alignment != 0 && !self.default_alignment.is_power_of_two() {
            return Err(GraphError::InvalidConfig(format!(
                "default_alignment must be a power of two, got {}",
                self.default_alignment
            )));
        }
        if self.max_threads == 0 {
            return Err(GraphError::InvalidConfig(
                "max_threads must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    pub fn target_profile(&self) -> TargetProfile {
        TargetProfile {
            pointer_width: self.target_pointer_width,
            endianness: self.target_endianness,
            default_alignment: self.default_alignment,
            bitfield_mode: self.bitfield_mode,
        }
    }
}
