// Tue Aug 4 2026 - Alex

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Endianness {
    Little,
    Big,
}

/// Which compiler's bitfield storage-unit rule to emulate.
///
/// `GccClang`: a new unit starts when the declared base scalar size differs
/// from the open unit's size, or the field no longer fits.
/// `Msvc`: any change of declared base type closes the unit, even between
/// same-size signed/unsigned pairs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BitfieldMode {
    GccClang,
    Msvc,
}

/// Layout rules of the configured target, independent of the running host.
///
/// Bit offsets are always numbered from the low end of the storage unit;
/// `endianness` is recorded for consumers that emit byte-order-dependent
/// accessors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetProfile {
    /// Pointer width in bits (32 or 64).
    pub pointer_width: u32,
    pub endianness: Endianness,
    /// Global pack cap (0 = natural alignment).
    pub default_alignment: u64,
    pub bitfield_mode: BitfieldMode,
}

impl TargetProfile {
    pub fn pointer_size(&self) -> u64 {
        u64::from(self.pointer_width) / 8
    }

    pub fn pointer_align(&self) -> u64 {
        self.pointer_size()
    }

    /// Effective pack for a record: an explicit directive wins, otherwise
    /// the profile-wide default cap applies (0 means none).
    pub fn effective_pack(&self, record_pack: Option<u64>) -> Option<u64> {
        record_pack.or(if self.default_alignment > 0 {
            Some(self.default_alignment)
        } else {
            None
        })
    }
}

impl Default for TargetProfile {
    fn default() -> Self {
        Self {
            pointer_width: 64,
            endianness: Endianness::Little,
            default_alignment: 0,
            bitfield_mode: BitfieldMode::GccClang,
        }
    }
}
