// Tue Aug 4 2026 - Alex

use crate::graph::{
    GraphError, NodeInterner, RecordStatus, ScopedName, TypeNode, TypeRef,
};
use crate::layout::TargetProfile;
use ahash::AHashSet;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RootCategory {
    Record,
    Enum,
    Typedef,
    Constant,
}

/// A top-level named entity, recorded in input order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RootEntry {
    pub name: ScopedName,
    pub category: RootCategory,
    pub node: TypeRef,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiagnosticKind {
    /// Non-POD construct, silently omitted.
    Excluded,
    /// Incomplete record/constant, silently dropped (product rule).
    IncompleteDropped,
    /// Field type never resolved; record degraded to partial.
    UnresolvedFieldType,
    /// Direct non-pointer self-containment; record excluded.
    InvalidRecursiveLayout,
    /// Anonymous structural duplicate merged away.
    Merged,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub subject: String,
    pub detail: String,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, subject: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            kind,
            subject: subject.into(),
            detail: detail.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:?}] {}: {}", self.kind, self.subject, self.detail)
    }
}

/// Mutable graph under construction: an arena of node slots owned by the
/// graph, addressed only through `TypeRef`s. Slots may be interned before
/// their node is built, which is how cross-references and self-references
/// resolve without embedded copies.
#[derive(Debug)]
pub struct UnresolvedGraph {
    interner: NodeInterner,
    nodes: Vec<Option<TypeNode>>,
    roots: Vec<RootEntry>,
    diagnostics: Vec<Diagnostic>,
    anon_sites: u64,
}

impl UnresolvedGraph {
    pub fn new() -> Self {
        Self {
            interner: NodeInterner::new(),
            nodes: Vec::new(),
            roots: Vec::new(),
            diagnostics: Vec::new(),
            anon_sites: 0,
        }
    }

    pub fn generation(&self) -> u32 {
        self.interner.generation()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn slot_count(&self) -> usize {
        self.nodes.len()
    }

    fn grow_to(&mut self, index: u32) {
        let needed = index as usize + 1;
        if self.nodes.len() < needed {
            self.nodes.resize_with(needed, || None);
        }
    }

    pub fn intern(&mut self, raw_id: &str) -> TypeRef {
        let type_ref = self.interner.intern(raw_id);
        self.grow_to(type_ref.index());
        type_ref
    }

    pub fn alias(&mut self, raw_id: &str, target: TypeRef) {
        self.interner.alias(raw_id, target);
    }

    pub fn lookup(&self, raw_id: &str) -> Option<TypeRef> {
        self.interner.lookup(raw_id)
    }

    pub fn assign(&mut self, type_ref: TypeRef, node: TypeNode) {
        self.grow_to(type_ref.index());
        self.nodes[type_ref.index() as usize] = Some(node);
    }

    pub fn is_assigned(&self, type_ref: TypeRef) -> bool {
        self.get(type_ref).is_some()
    }

    pub fn get(&self, type_ref: TypeRef) -> Option<&TypeNode> {
        if type_ref.generation() != self.generation() {
            return None;
        }
        self.nodes.get(type_ref.index() as usize)?.as_ref()
    }

    pub fn get_mut(&mut self, type_ref: TypeRef) -> Option<&mut TypeNode> {
        if type_ref.generation() != self.generation() {
            return None;
        }
        self.nodes.get_mut(type_ref.index() as usize)?.as_mut()
    }

    pub fn resolve(&self, type_ref: TypeRef) -> Result<&TypeNode, GraphError> {
        self.get(type_ref)
            .ok_or(GraphError::UnknownReference(type_ref))
    }

    /// All assigned refs, in arena (input) order.
    pub fn refs(&self) -> impl Iterator<Item = TypeRef> + '_ {
        let generation = self.generation();
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.is_some())
            .map(move |(i, _)| TypeRef::new(i as u32, generation))
    }

    /// Surrogate name for diagnostics: the display name if the node has one,
    /// otherwise the raw identifier the slot was interned under.
    pub fn surrogate_name(&self, type_ref: TypeRef) -> String {
        if let Some(node) = self.get(type_ref) {
            if let Some(name) = node.scoped_name() {
                return name.fullname();
            }
        }
        self.interner
            .raw_id(type_ref)
            .map(str::to_string)
            .unwrap_or_else(|| type_ref.to_string())
    }

    pub fn add_root(&mut self, entry: RootEntry) {
        self.roots.push(entry);
    }

    pub fn roots(&self) -> &[RootEntry] {
        &self.roots
    }

    pub fn push_diagnostic(&mut self, diagnostic: Diagnostic) {
        log::debug!("{}", diagnostic);
        self.diagnostics.push(diagnostic);
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn count_diagnostics(&self, kind: DiagnosticKind) -> usize {
        self.diagnostics.iter().filter(|d| d.kind == kind).count()
    }

    pub fn next_anon_site(&mut self) -> u64 {
        let site = self.anon_sites;
        self.anon_sites += 1;
        site
    }

    pub fn anon_site_count(&self) -> u64 {
        self.anon_sites
    }

    pub(crate) fn set_anon_site_count(&mut self, count: u64) {
        self.anon_sites = count;
    }

    pub(crate) fn into_raw_parts(
        self,
    ) -> (
        NodeInterner,
        Vec<Option<TypeNode>>,
        Vec<RootEntry>,
        Vec<Diagnostic>,
        u64,
    ) {
        (
            self.interner,
            self.nodes,
            self.roots,
            self.diagnostics,
            self.anon_sites,
        )
    }
}

impl Default for UnresolvedGraph {
    fn default() -> Self {
        Self::new()
    }
}

/// Insertion-ordered views over the finalized graph's named entities.
///
/// Duplicate names across input files keep all their nodes in `entries`;
/// the per-category lookup maps take the first occurrence in input order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RootIndex {
    pub records: IndexMap<String, TypeRef>,
    pub enums: IndexMap<String, TypeRef>,
    pub typedefs: IndexMap<String, TypeRef>,
    pub constants: IndexMap<String, TypeRef>,
    pub entries: Vec<RootEntry>,
}

impl RootIndex {
    pub fn insert(&mut self, entry: RootEntry) {
        let key = entry.name.fullname();
        let map = match entry.category {
            RootCategory::Record => &mut self.records,
            RootCategory::Enum => &mut self.enums,
            RootCategory::Typedef => &mut self.typedefs,
            RootCategory::Constant => &mut self.constants,
        };
        // First occurrence in input order wins the lookup key.
        map.entry(key).or_insert(entry.node);
        self.entries.push(entry);
    }

    pub fn lookup(&self, fullname: &str) -> Option<TypeRef> {
        self.records
            .get(fullname)
            .or_else(|| self.enums.get(fullname))
            .or_else(|| self.typedefs.get(fullname))
            .or_else(|| self.constants.get(fullname))
            .copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Counts reported at the end of a run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BuildSummary {
    pub input_files: usize,
    pub nodes: usize,
    pub records: usize,
    pub enums: usize,
    pub typedefs: usize,
    pub constants: usize,
    pub excluded: usize,
    pub dropped_incomplete: usize,
    pub partial: usize,
    pub invalid_recursive: usize,
    pub merged_duplicates: usize,
}

impl fmt::Display for BuildSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} nodes from {} file(s): {} records, {} enums, {} typedefs, {} constants",
            self.nodes, self.input_files, self.records, self.enums, self.typedefs, self.constants
        )?;
        write!(
            f,
            "excluded: {}, dropped incomplete: {}, partial: {}, invalid recursive: {}, merged duplicates: {}",
            self.excluded,
            self.dropped_incomplete,
            self.partial,
            self.invalid_recursive,
            self.merged_duplicates
        )
    }
}

/// The finalized, immutable type graph.
///
/// Safe to share read-only with any number of downstream consumers; every
/// `TypeRef` handed out by the index resolves to exactly one node.
#[derive(Debug, Clone)]
pub struct TypeGraph {
    generation: u32,
    nodes: Vec<TypeNode>,
    target: TargetProfile,
    index: RootIndex,
    summary: BuildSummary,
    diagnostics: Vec<Diagnostic>,
}

impl TypeGraph {
    pub(crate) fn from_parts(
        generation: u32,
        nodes: Vec<TypeNode>,
        target: TargetProfile,
        index: RootIndex,
        summary: BuildSummary,
        diagnostics: Vec<Diagnostic>,
    ) -> Self {
        Self {
            generation,
            nodes,
            target,
            index,
            summary,
            diagnostics,
        }
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }

    pub fn target(&self) -> &TargetProfile {
        &self.target
    }

    pub fn index(&self) -> &RootIndex {
        &self.index
    }

    pub fn index_mut(&mut self) -> &mut RootIndex {
        &mut self.index
    }

    pub fn summary(&self) -> &BuildSummary {
        &self.summary
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn resolve(&self, type_ref: TypeRef) -> Result<&TypeNode, GraphError> {
        if type_ref.generation() != self.generation {
            return Err(GraphError::UnknownReference(type_ref));
        }
        self.nodes
            .get(type_ref.index() as usize)
            .ok_or(GraphError::UnknownReference(type_ref))
    }

    pub fn node_mut(&mut self, type_ref: TypeRef) -> Result<&mut TypeNode, GraphError> {
        if type_ref.generation() != self.generation {
            return Err(GraphError::UnknownReference(type_ref));
        }
        self.nodes
            .get_mut(type_ref.index() as usize)
            .ok_or(GraphError::UnknownReference(type_ref))
    }

    pub fn iter(&self) -> impl Iterator<Item = (TypeRef, &TypeNode)> {
        let generation = self.generation;
        self.nodes
            .iter()
            .enumerate()
            .map(move |(i, node)| (TypeRef::new(i as u32, generation), node))
    }

    /// Size and alignment in bytes, resolving typedef chains transitively.
    /// Layout of an alias always equals the layout of its target.
    pub fn layout_of(&self, type_ref: TypeRef) -> Result<(u64, u64), GraphError> {
        let mut visited: AHashSet<u32> = AHashSet::new();
        self.layout_of_inner(type_ref, &mut visited)
    }

    fn layout_of_inner(
        &self,
        type_ref: TypeRef,
        visited: &mut AHashSet<u32>,
    ) -> Result<(u64, u64), GraphError> {
        if !visited.insert(type_ref.index()) {
            return Err(GraphError::InvalidRecursiveLayout(
                self.display_type(type_ref),
            ));
        }
        let result = match self.resolve(type_ref)? {
            TypeNode::Scalar(s) => Ok((s.byte_size, s.byte_align)),
            TypeNode::Pointer(_) | TypeNode::FunctionPointer(_) => {
                Ok((self.target.pointer_size(), self.target.pointer_align()))
            }
            TypeNode::Array(a) => {
                let (elem_size, elem_align) = self.layout_of_inner(a.element, visited)?;
                Ok((elem_size * a.len, elem_align))
            }
            TypeNode::Record(r) => Ok((r.byte_size, r.byte_align)),
            TypeNode::Enum(e) => self.layout_of_inner(e.underlying, visited),
            TypeNode::Typedef(t) => self.layout_of_inner(t.target, visited),
            TypeNode::Constant(c) => self.layout_of_inner(c.ty, visited),
        };
        visited.remove(&type_ref.index());
        result
    }

    /// Human-readable spelling of the type behind a reference.
    pub fn display_type(&self, type_ref: TypeRef) -> String {
        match self.resolve(type_ref) {
            Ok(TypeNode::Scalar(s)) => s.name.clone(),
            Ok(TypeNode::Pointer(p)) => format!("{}*", self.display_type(p.pointee)),
            Ok(TypeNode::Array(a)) => format!("{}[{}]", self.display_type(a.element), a.len),
            Ok(TypeNode::FunctionPointer(fp)) => {
                let params = fp
                    .params
                    .iter()
                    .map(|p| self.display_type(*p))
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("{} (*)({})", self.display_type(fp.return_type), params)
            }
            Ok(TypeNode::Record(r)) => match &r.name {
                Some(name) => name.fullname(),
                None => format!("{} <anonymous>", if r.is_union() { "union" } else { "struct" }),
            },
            Ok(TypeNode::Enum(e)) => match &e.name {
                Some(name) => name.fullname(),
                None => "enum <anonymous>".to_string(),
            },
            Ok(TypeNode::Typedef(t)) => t.name.fullname(),
            Ok(TypeNode::Constant(c)) => c.name.fullname(),
            Err(_) => format!("<unresolved {}>", type_ref),
        }
    }

    /// All named records that survived finalize with a usable layout.
    pub fn named_records(&self) -> impl Iterator<Item = (&str, TypeRef)> {
        self.index.records.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn partial_records(&self) -> usize {
        self.nodes
            .iter()
            .filter_map(TypeNode::as_record)
            .filter(|r| r.status == RecordStatus::Partial)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Field, RecordKind, RecordType, ScalarType};

    #[test]
    fn test_resolve_before_assign_is_unknown_reference() {
        let mut graph = UnresolvedGraph::new();
        let r = graph.intern("_pending");
        assert!(matches!(
            graph.resolve(r),
            Err(GraphError::UnknownReference(_))
        ));
        graph.assign(
            r,
            TypeNode::Scalar(ScalarType {
                name: "int32_t".to_string(),
                byte_size: 4,
                byte_align: 4,
                is_signed: true,
                is_floating: false,
                is_bool: false,
                is_wide_char: false,
            }),
        );
        assert!(graph.resolve(r).is_ok());
    }

    #[test]
    fn test_foreign_generation_is_unknown_reference() {
        let mut a = UnresolvedGraph::new();
        let mut b = UnresolvedGraph::new();
        let ra = a.intern("_x");
        a.assign(
            ra,
            TypeNode::Scalar(ScalarType {
                name: "int8_t".to_string(),
                byte_size: 1,
                byte_align: 1,
                is_signed: true,
                is_floating: false,
                is_bool: false,
                is_wide_char: false,
            }),
        );
        let rb = b.intern("_x");
        b.assign(
            rb,
            TypeNode::Scalar(ScalarType {
                name: "int8_t".to_string(),
                byte_size: 1,
                byte_align: 1,
                is_signed: true,
                is_floating: false,
                is_bool: false,
                is_wide_char: false,
            }),
        );
        assert!(matches!(
            a.resolve(rb),
            Err(GraphError::UnknownReference(_))
        ));
    }

    #[test]
    fn test_surrogate_name_falls_back_to_raw_id() {
        let mut graph = UnresolvedGraph::new();
        let r = graph.intern("_anon_7");
        let mut rec = RecordType::new(RecordKind::Struct, None);
        rec.fields.push(Field::new(None, r));
        graph.assign(r, TypeNode::Record(rec));
        assert_eq!(graph.surrogate_name(r), "_anon_7");
    }

    #[test]
    fn test_root_index_first_seen_wins() {
        let mut index = RootIndex::default();
        let first = TypeRef::new(0, 1);
        let second = TypeRef::new(1, 1);
        index.insert(RootEntry {
            name: ScopedName::global("T"),
            category: RootCategory::Record,
            node: first,
        });
        index.insert(RootEntry {
            name: ScopedName::global("T"),
            category: RootCategory::Record,
            node: second,
        });
        assert_eq!(index.records.get("T").copied(), Some(first));
        assert_eq!(index.entries.len(), 2);
    }
}
