// Tue Aug 4 2026 - Alex

use crate::graph::TypeRef;
use crate::layout::{Alignment, BitfieldMode};

/// An open bitfield storage unit during a record walk.
#[derive(Debug, Clone, Copy)]
struct OpenUnit {
    byte_offset: u64,
    base: TypeRef,
    base_size: u64,
    bit_pos: u32,
}

/// Packs runs of contiguous bitfields into storage units sized by their
/// declared base scalar type.
#[derive(Debug)]
pub struct BitfieldCursor {
    mode: BitfieldMode,
    unit: Option<OpenUnit>,
}

impl BitfieldCursor {
    pub fn new(mode: BitfieldMode) -> Self {
        Self { mode, unit: None }
    }

    /// Close the current storage unit; the next bitfield starts a new one.
    pub fn close(&mut self) {
        self.unit = None;
    }

    pub fn is_open(&self) -> bool {
        self.unit.is_some()
    }

    fn shares_unit(&self, unit: &OpenUnit, base: TypeRef, base_size: u64, width: u32) -> bool {
        if u64::from(unit.bit_pos) + u64::from(width) > unit.base_size * 8 {
            return false;
        }
        match self.mode {
            BitfieldMode::GccClang => unit.base_size == base_size,
            BitfieldMode::Msvc => unit.base == base,
        }
    }

    /// Place a bitfield of `width` bits declared over `base`.
    ///
    /// `offset` is the record's running byte offset; it advances by one
    /// storage unit whenever a new unit opens. Returns the unit byte offset
    /// and the bit position within it.
    #[allow(clippy::too_many_arguments)]
    pub fn place(
        &mut self,
        base: TypeRef,
        base_size: u64,
        base_align: Alignment,
        width: u32,
        pack: Option<u64>,
        offset: &mut u64,
        record_align: &mut Alignment,
    ) -> (u64, u32) {
        let fits = self
            .unit
            .as_ref()
            .map(|unit| self.shares_unit(unit, base, base_size, width))
            .unwrap_or(false);

        if !fits {
            let effective = base_align.clipped(pack);
            let unit_offset = effective.align(*offset);
            *offset = unit_offset + base_size;
            *record_align = record_align.max(effective);
            self.unit = Some(OpenUnit {
                byte_offset: unit_offset,
                base,
                base_size,
                bit_pos: 0,
            });
        }

        let unit = self.unit.as_mut().expect("unit opened above");
        let placed = (unit.byte_offset, unit.bit_pos);
        unit.bit_pos += width;
        placed
    }
}
