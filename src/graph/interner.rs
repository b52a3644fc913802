// Mon Aug 3 2026 - Alex

use crate::graph::TypeRef;
use ahash::AHashMap;
use std::sync::atomic::{AtomicU32, Ordering};

static NEXT_GENERATION: AtomicU32 = AtomicU32::new(1);

/// Assigns canonical identity to raw AST node references.
///
/// `intern` is idempotent within one run: the same raw id always yields the
/// same `TypeRef`. Two raw ids may share one `TypeRef` via `alias` (forward
/// declarations resolved to their defining node).
#[derive(Debug)]
pub struct NodeInterner {
    generation: u32,
    map: AHashMap<String, TypeRef>,
    raw_ids: Vec<String>,
}

impl NodeInterner {
    pub fn new() -> Self {
        Self {
            generation: NEXT_GENERATION.fetch_add(1, Ordering::Relaxed),
            map: AHashMap::new(),
            raw_ids: Vec::new(),
        }
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }

    pub fn len(&self) -> usize {
        self.raw_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.raw_ids.is_empty()
    }

    pub fn intern(&mut self, raw_id: &str) -> TypeRef {
        if let Some(existing) = self.map.get(raw_id) {
            return *existing;
        }
        let index = self.raw_ids.len() as u32;
        let type_ref = TypeRef::new(index, self.generation);
        self.map.insert(raw_id.to_string(), type_ref);
        self.raw_ids.push(raw_id.to_string());
        type_ref
    }

    /// Map `raw_id` onto an already-interned reference. Later `intern` calls
    /// for `raw_id` return `target`.
    pub fn alias(&mut self, raw_id: &str, target: TypeRef) {
        self.map.insert(raw_id.to_string(), target);
    }

    pub fn lookup(&self, raw_id: &str) -> Option<TypeRef> {
        self.map.get(raw_id).copied()
    }

    pub(crate) fn raw_ids_slice(&self) -> &[String] {
        &self.raw_ids
    }

    pub(crate) fn entries(&self) -> impl Iterator<Item = (&str, TypeRef)> {
        self.map.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Surrogate name for a slot: the raw id it was interned under.
    pub fn raw_id(&self, type_ref: TypeRef) -> Option<&str> {
        if type_ref.generation() != self.generation {
            return None;
        }
        self.raw_ids.get(type_ref.index() as usize).map(String::as_str)
    }
}

impl Default for NodeInterner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intern_idempotent() {
        let mut interner = NodeInterner::new();
        let a = interner.intern("_1");
        let b = interner.intern("_1");
        assert_eq!(a, b);
        assert_eq!(interner.len(), 1);
    }

    #[test]
    fn test_distinct_ids_distinct_refs() {
        let mut interner = NodeInterner::new();
        let a = interner.intern("_1");
        let b = interner.intern("_2");
        assert_ne!(a, b);
    }

    #[test]
    fn test_alias_shares_ref() {
        let mut interner = NodeInterner::new();
        let def = interner.intern("_5");
        interner.alias("_9", def);
        assert_eq!(interner.intern("_9"), def);
        assert_eq!(interner.raw_id(def), Some("_5"));
    }

    #[test]
    fn test_generations_differ_between_runs() {
        let a = NodeInterner::new();
        let b = NodeInterner::new();
        assert_ne!(a.generation(), b.generation());
    }
}
