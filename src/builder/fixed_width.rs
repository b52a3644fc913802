// Wed Aug 5 2026 - Alex

use crate::graph::ScalarType;
use crate::layout::TargetProfile;
use ahash::AHashMap;
use once_cell::sync::Lazy;

/// One recognized fixed-width (or pointer-width) integer alias.
#[derive(Debug, Clone, Copy)]
pub struct FixedWidthAlias {
    pub canonical: &'static str,
    /// 0 means pointer-width, resolved against the target profile.
    pub bits: u32,
    pub signed: bool,
}

/// Known alias spellings, including the double-underscore compiler-internal
/// equivalents. Matching is table-driven on purpose: the underlying compiler
/// may present either spelling, so a textual-suffix check is not enough.
static ALIASES: Lazy<AHashMap<&'static str, FixedWidthAlias>> = Lazy::new(|| {
    let mut table = AHashMap::new();
    let fixed: [(&str, u32, bool); 10] = [
        ("int8_t", 8, true),
        ("int16_t", 16, true),
        ("int32_t", 32, true),
        ("int64_t", 64, true),
        ("uint8_t", 8, false),
        ("uint16_t", 16, false),
        ("uint32_t", 32, false),
        ("uint64_t", 64, false),
        ("intptr_t", 0, true),
        ("uintptr_t", 0, false),
    ];
    for (canonical, bits, signed) in fixed {
        let alias = FixedWidthAlias {
            canonical,
            bits,
            signed,
        };
        table.insert(canonical, alias);
        // __int8_t, __uint32_t, ...
        let internal: &'static str = Box::leak(format!("__{}", canonical).into_boxed_str());
        table.insert(internal, alias);
    }
    table.insert(
        "size_t",
        FixedWidthAlias {
            canonical: "size_t",
            bits: 0,
            signed: false,
        },
    );
    table.insert(
        "ssize_t",
        FixedWidthAlias {
            canonical: "ssize_t",
            bits: 0,
            signed: true,
        },
    );
    table.insert(
        "ptrdiff_t",
        FixedWidthAlias {
            canonical: "ptrdiff_t",
            bits: 0,
            signed: true,
        },
    );
    table
});

pub fn lookup(name: &str) -> Option<FixedWidthAlias> {
    ALIASES.get(name).copied()
}

/// Materialize a terminal scalar leaf for a recognized alias.
pub fn scalar_for(alias: FixedWidthAlias, target: &TargetProfile) -> ScalarType {
    let bits = if alias.bits == 0 {
        target.pointer_width
    } else {
        alias.bits
    };
    let bytes = u64::from(bits) / 8;
    ScalarType {
        name: alias.canonical.to_string(),
        byte_size: bytes,
        byte_align: bytes,
        is_signed: alias.signed,
        is_floating: false,
        is_bool: false,
        is_wide_char: false,
    }
}

/// Canonicalize a multi-word integral spelling to a fixed-width name.
///
/// `unsigned long long` (64 bits) -> `uint64_t`; floating and pointer
/// spellings pass through unchanged; `bool` maps to `uint8_t` unless the
/// run keeps bool as a distinct type.
pub fn normalize_integral(name: &str, size_in_bits: u64, use_bool: bool) -> String {
    let mut words: Vec<&str> = name.split_whitespace().collect();
    words.sort_unstable();
    let normalized = words.join(" ");

    let mut is_unsigned = normalized.contains("unsigned");

    if normalized.contains("double") || normalized.contains("float") {
        return name.to_string();
    }
    if normalized.contains("wchar_t") {
        return name.to_string();
    }
    if normalized.contains("bool") {
        if use_bool {
            return name.to_string();
        }
        is_unsigned = true;
    }
    let integral = ["char", "short", "long", "signed", "int", "bool"]
        .iter()
        .any(|w| normalized.contains(w));
    if integral {
        let base = match size_in_bits {
            8 => Some("int8_t"),
            16 => Some("int16_t"),
            32 => Some("int32_t"),
            64 => Some("int64_t"),
            128 => Some("int128_t"),
            _ => None,
        };
        if let Some(base) = base {
            return if is_unsigned {
                format!("u{}", base)
            } else {
                base.to_string()
            };
        }
    }

    name.to_string()
}
