// Wed Aug 5 2026 - Alex

use crate::graph::{
    Diagnostic, DiagnosticKind, RecordStatus, ScopedName, TypeNode, TypeRef, UnresolvedGraph,
};
use ahash::{AHashMap, AHashSet};
use itertools::Itertools;

/// Merge structurally identical duplicate candidates.
///
/// Only unnamed nodes and nodes scoped inside an anonymous namespace are
/// candidates; globally named nodes are never merged, since identity matters
/// for downstream naming. First occurrence in arena (input) order wins.
///
/// Returns the redirect map: merged-away index -> kept index.
pub fn merge_duplicates(graph: &mut UnresolvedGraph) -> AHashMap<u32, u32> {
    let mut groups: AHashMap<String, Vec<TypeRef>> = AHashMap::new();
    for r in graph.refs() {
        if let Some(key) = candidate_key(graph, r) {
            groups.entry(key).or_default().push(r);
        }
    }

    let mut redirect: AHashMap<u32, u32> = AHashMap::new();
    let mut merged: Vec<(String, TypeRef, TypeRef)> = Vec::new();
    for key in groups.keys().cloned().sorted() {
        let members = &groups[&key];
        if members.len() < 2 {
            continue;
        }
        let mut representatives: Vec<TypeRef> = Vec::new();
        for &member in members {
            let matched = representatives.iter().copied().find(|&rep| {
                let mut seen = AHashSet::new();
                structurally_equal(graph, rep, member, &mut seen)
            });
            match matched {
                Some(rep) => {
                    redirect.insert(member.index(), rep.index());
                    merged.push((graph.surrogate_name(member), member, rep));
                }
                None => representatives.push(member),
            }
        }
    }

    for (name, member, rep) in merged {
        let detail = format!(
            "structural duplicate of {}, merged ({} -> {})",
            graph.surrogate_name(rep),
            member,
            rep
        );
        graph.push_diagnostic(Diagnostic::new(DiagnosticKind::Merged, name, detail));
    }
    redirect
}

/// Shallow grouping key; full structural equality decides within a group.
fn candidate_key(graph: &UnresolvedGraph, r: TypeRef) -> Option<String> {
    match graph.get(r)? {
        TypeNode::Record(rec) => {
            if rec.status == RecordStatus::InvalidRecursive {
                return None;
            }
            if !is_mergeable_name(&rec.name) {
                return None;
            }
            Some(format!(
                "record:{:?}:{}:{}:{}:{}",
                rec.kind,
                canonical_name(&rec.name),
                rec.byte_size,
                rec.byte_align,
                rec.fields.len()
            ))
        }
        TypeNode::Enum(e) => {
            if !is_mergeable_name(&e.name) {
                return None;
            }
            Some(format!(
                "enum:{}:{}",
                canonical_name(&e.name),
                e.enumerators.len()
            ))
        }
        _ => None,
    }
}

fn is_mergeable_name(name: &Option<ScopedName>) -> bool {
    match name {
        None => true,
        Some(n) => n.scope.contains_anonymous(),
    }
}

fn canonical_name(name: &Option<ScopedName>) -> String {
    match name {
        None => "<anon>".to_string(),
        Some(n) => n.fullname(),
    }
}

/// Deep structural equality with a visited-pair set to break reference
/// cycles: a revisited pair is assumed equal, which is the coinductive
/// reading the arena representation needs.
pub fn structurally_equal(
    graph: &UnresolvedGraph,
    a: TypeRef,
    b: TypeRef,
    seen: &mut AHashSet<(u32, u32)>,
) -> bool {
    if a == b {
        return true;
    }
    if !seen.insert((a.index(), b.index())) {
        return true;
    }
    let (Some(na), Some(nb)) = (graph.get(a), graph.get(b)) else {
        return false;
    };
    match (na, nb) {
        (TypeNode::Scalar(x), TypeNode::Scalar(y)) => x == y,
        (TypeNode::Pointer(x), TypeNode::Pointer(y)) => {
            structurally_equal(graph, x.pointee, y.pointee, seen)
        }
        (TypeNode::Array(x), TypeNode::Array(y)) => {
            x.len == y.len && structurally_equal(graph, x.element, y.element, seen)
        }
        (TypeNode::FunctionPointer(x), TypeNode::FunctionPointer(y)) => {
            x.params.len() == y.params.len()
                && structurally_equal(graph, x.return_type, y.return_type, seen)
                && x.params
                    .iter()
                    .zip(&y.params)
                    .all(|(p, q)| structurally_equal(graph, *p, *q, seen))
        }
        (TypeNode::Record(x), TypeNode::Record(y)) => {
            x.kind == y.kind
                && names_structurally_eq(&x.name, &y.name)
                && x.pack == y.pack
                && x.byte_size == y.byte_size
                && x.byte_align == y.byte_align
                && x.status == y.status
                && x.fields.len() == y.fields.len()
                && x.fields.iter().zip(&y.fields).all(|(f, g)| {
                    f.name == g.name
                        && f.byte_offset == g.byte_offset
                        && f.bit_offset == g.bit_offset
                        && f.bit_width == g.bit_width
                        && structurally_equal(graph, f.ty, g.ty, seen)
                })
        }
        (TypeNode::Enum(x), TypeNode::Enum(y)) => {
            names_structurally_eq(&x.name, &y.name)
                && x.is_scoped == y.is_scoped
                && x.enumerators == y.enumerators
                && structurally_equal(graph, x.underlying, y.underlying, seen)
        }
        (TypeNode::Typedef(x), TypeNode::Typedef(y)) => {
            x.name.structurally_eq(&y.name) && structurally_equal(graph, x.target, y.target, seen)
        }
        (TypeNode::Constant(x), TypeNode::Constant(y)) => {
            x.name.structurally_eq(&y.name)
                && x.value == y.value
                && structurally_equal(graph, x.ty, y.ty, seen)
        }
        _ => false,
    }
}

fn names_structurally_eq(a: &Option<ScopedName>, b: &Option<ScopedName>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(x), Some(y)) => x.structurally_eq(y),
        _ => false,
    }
}
