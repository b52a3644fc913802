// Tue Aug 4 2026 - Alex

pub mod alignment;
pub mod bitfield;
pub mod engine;
pub mod size;
pub mod target;

pub use alignment::Alignment;
pub use bitfield::BitfieldCursor;
pub use engine::LayoutEngine;
pub use size::Size;
pub use target::{BitfieldMode, Endianness, TargetProfile};
