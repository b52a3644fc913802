// Wed Aug 5 2026 - Alex

use crate::config::Config;
use crate::finalize::{cycle, structural};
use crate::graph::{
    BuildSummary, Diagnostic, DiagnosticKind, GraphError, RecordStatus, RootCategory, RootIndex,
    TypeGraph, TypeNode, TypeRef, UnresolvedGraph,
};
use ahash::{AHashMap, AHashSet};

/// Turn an unresolved graph into the finalized, immutable `TypeGraph`.
///
/// Performs, in order: strict-mode promotion, containment-cycle rejection,
/// structural merge of duplicate candidates, arena compaction with full
/// reference rewriting, and the final reference-integrity check.
pub fn finalize(
    mut graph: UnresolvedGraph,
    config: &Config,
    input_files: usize,
) -> Result<TypeGraph, GraphError> {
    if config.strict_unresolved {
        if let Some(d) = graph
            .diagnostics()
            .iter()
            .find(|d| d.kind == DiagnosticKind::UnresolvedFieldType)
        {
            return Err(GraphError::UnresolvedFieldType {
                record: d.subject.clone(),
                field: d.detail.clone(),
            });
        }
    }

    mark_invalid_cycles(&mut graph);
    let redirect = structural::merge_duplicates(&mut graph);
    compact(graph, config, input_files, redirect)
}

fn mark_invalid_cycles(graph: &mut UnresolvedGraph) {
    let invalid = cycle::detect_containment_cycles(graph);
    if invalid.is_empty() {
        return;
    }
    let generation = graph.generation();
    let mut indices: Vec<u32> = invalid.iter().copied().collect();
    indices.sort_unstable();

    for idx in &indices {
        let r = TypeRef::new(*idx, generation);
        let already = matches!(
            graph.get(r).and_then(TypeNode::as_record),
            Some(rec) if rec.status == RecordStatus::InvalidRecursive
        );
        let name = graph.surrogate_name(r);
        if let Some(rec) = graph.get_mut(r).and_then(TypeNode::as_record_mut) {
            rec.status = RecordStatus::InvalidRecursive;
        }
        if !already {
            graph.push_diagnostic(Diagnostic::new(
                DiagnosticKind::InvalidRecursiveLayout,
                name,
                "record contains itself through a non-pointer path",
            ));
        }
    }

    // A record outside the cycle that directly contains an invalid record
    // loses that field and degrades to partial, so the bad layout cannot
    // cascade.
    let records: Vec<TypeRef> = graph
        .refs()
        .filter(|r| graph.get(*r).map(TypeNode::is_record).unwrap_or(false))
        .collect();
    for r in records {
        let drops: Vec<(usize, String)> = {
            let Some(rec) = graph.get(r).and_then(TypeNode::as_record) else {
                continue;
            };
            if rec.status == RecordStatus::InvalidRecursive {
                continue;
            }
            rec.fields
                .iter()
                .enumerate()
                .filter(|(_, f)| targets_invalid(graph, f.ty, &invalid))
                .map(|(i, f)| (i, f.display_name().to_string()))
                .collect()
        };
        if drops.is_empty() {
            continue;
        }
        let owner = graph.surrogate_name(r);
        if let Some(rec) = graph.get_mut(r).and_then(TypeNode::as_record_mut) {
            for (i, _) in drops.iter().rev() {
                rec.fields.remove(*i);
            }
            rec.status = RecordStatus::Partial;
        }
        for (_, field_name) in drops {
            graph.push_diagnostic(Diagnostic::new(
                DiagnosticKind::UnresolvedFieldType,
                owner.clone(),
                format!("field '{}' dropped: type has no finite layout", field_name),
            ));
        }
    }
}

fn targets_invalid(graph: &UnresolvedGraph, mut r: TypeRef, invalid: &AHashSet<u32>) -> bool {
    let mut hops = 0;
    loop {
        match graph.get(r) {
            Some(TypeNode::Record(_)) => return invalid.contains(&r.index()),
            Some(TypeNode::Array(a)) => r = a.element,
            Some(TypeNode::Typedef(t)) => r = t.target,
            _ => return false,
        }
        hops += 1;
        if hops > 256 {
            return false;
        }
    }
}

fn compact(
    graph: UnresolvedGraph,
    config: &Config,
    input_files: usize,
    redirect: AHashMap<u32, u32>,
) -> Result<TypeGraph, GraphError> {
    let generation = graph.generation();
    let (_interner, slots, roots, diagnostics, _anon_sites) = graph.into_raw_parts();

    let mut new_index: Vec<Option<u32>> = vec![None; slots.len()];
    let mut next = 0u32;
    for (i, slot) in slots.iter().enumerate() {
        if slot.is_some() && !redirect.contains_key(&(i as u32)) {
            new_index[i] = Some(next);
            next += 1;
        }
    }

    let resolve_redirect = |mut idx: u32| -> u32 {
        let mut hops = 0;
        while let Some(target) = redirect.get(&idx) {
            idx = *target;
            hops += 1;
            if hops > redirect.len() {
                break;
            }
        }
        idx
    };
    let map_ref = |r: TypeRef| -> Result<TypeRef, GraphError> {
        if r.generation() != generation {
            return Err(GraphError::UnknownReference(r));
        }
        let idx = resolve_redirect(r.index());
        match new_index.get(idx as usize).copied().flatten() {
            Some(n) => Ok(TypeRef::new(n, generation)),
            None => Err(GraphError::UnknownReference(r)),
        }
    };

    let mut nodes: Vec<TypeNode> = Vec::with_capacity(next as usize);
    for (i, slot) in slots.into_iter().enumerate() {
        let Some(mut node) = slot else { continue };
        if redirect.contains_key(&(i as u32)) {
            continue;
        }
        let mut dangling: Option<TypeRef> = None;
        node.remap_references(&mut |r| match map_ref(r) {
            Ok(mapped) => mapped,
            Err(_) => {
                dangling.get_or_insert(r);
                r
            }
        });
        if let Some(bad) = dangling {
            return Err(GraphError::UnknownReference(bad));
        }
        nodes.push(node);
    }

    let mut index = RootIndex::default();
    let mut seen: AHashSet<(String, RootCategory, u32)> = AHashSet::new();
    for mut entry in roots {
        let mapped = map_ref(entry.node)?;
        entry.node = mapped;
        // Records without a finite layout are excluded from the output.
        if let Some(TypeNode::Record(rec)) = nodes.get(mapped.index() as usize) {
            if rec.status == RecordStatus::InvalidRecursive {
                continue;
            }
        }
        let key = (entry.name.fullname(), entry.category, mapped.index());
        if !seen.insert(key) {
            continue;
        }
        index.insert(entry);
    }

    let summary = summarize(&nodes, &index, &diagnostics, input_files);
    log::info!("finalized graph: {}", summary);

    Ok(TypeGraph::from_parts(
        generation,
        nodes,
        config.target_profile(),
        index,
        summary,
        diagnostics,
    ))
}

fn summarize(
    nodes: &[TypeNode],
    index: &RootIndex,
    diagnostics: &[Diagnostic],
    input_files: usize,
) -> BuildSummary {
    let count = |kind: DiagnosticKind| diagnostics.iter().filter(|d| d.kind == kind).count();
    let mut summary = BuildSummary {
        input_files,
        nodes: nodes.len(),
        excluded: count(DiagnosticKind::Excluded),
        dropped_incomplete: count(DiagnosticKind::IncompleteDropped),
        merged_duplicates: count(DiagnosticKind::Merged),
        ..BuildSummary::default()
    };
    for entry in &index.entries {
        match entry.category {
            RootCategory::Record => summary.records += 1,
            RootCategory::Enum => summary.enums += 1,
            RootCategory::Typedef => summary.typedefs += 1,
            RootCategory::Constant => summary.constants += 1,
        }
    }
    for node in nodes {
        if let Some(rec) = node.as_record() {
            match rec.status {
                RecordStatus::Partial => summary.partial += 1,
                RecordStatus::InvalidRecursive => summary.invalid_recursive += 1,
                _ => {}
            }
        }
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{RawNode, RawNodeKind, RawNodeSet};
    use crate::graph::{Field, RecordKind, RecordType, ScopedName};
    use crate::process;

    fn tu() -> RawNode {
        RawNode::new("_tu", RawNodeKind::TranslationUnit)
    }

    fn int_node() -> RawNode {
        RawNode::new("_int", RawNodeKind::FundamentalType)
            .with_name("int")
            .with_size_align(4, 4)
    }

    /// One file declaring `struct C { int x; }` inside an anonymous
    /// namespace.
    fn anon_namespace_file(name: &str) -> RawNodeSet {
        RawNodeSet::new(
            Some(format!("{}.h", name)),
            vec![
                tu(),
                RawNode::new("_ns", RawNodeKind::Namespace).with_context("_tu"),
                int_node(),
                RawNode::new("_fx", RawNodeKind::Field)
                    .with_name("x")
                    .with_type("_int"),
                RawNode::new("_c", RawNodeKind::Struct)
                    .with_name("C")
                    .with_context("_ns")
                    .with_members(vec!["_fx".to_string()]),
            ],
        )
    }

    /// One file declaring a globally named `struct D { int x; }`.
    fn named_file(name: &str) -> RawNodeSet {
        RawNodeSet::new(
            Some(format!("{}.h", name)),
            vec![
                tu(),
                int_node(),
                RawNode::new("_fx", RawNodeKind::Field)
                    .with_name("x")
                    .with_type("_int"),
                RawNode::new("_d", RawNodeKind::Struct)
                    .with_name("D")
                    .with_context("_tu")
                    .with_members(vec!["_fx".to_string()]),
            ],
        )
    }

    #[test]
    fn test_anonymous_namespace_structs_merge_across_files() {
        let sets = vec![anon_namespace_file("a"), anon_namespace_file("b")];
        let graph = process(&sets, &Config::default()).unwrap();

        assert_eq!(graph.summary().merged_duplicates, 1);
        assert_eq!(graph.summary().records, 1);
        let r = graph.index().records.get("::C").copied().unwrap();
        let rec = graph.resolve(r).unwrap().as_record().unwrap();
        assert_eq!(rec.byte_size, 4);
    }

    #[test]
    fn test_named_structs_stay_distinct_across_files() {
        let sets = vec![named_file("a"), named_file("b")];
        let graph = process(&sets, &Config::default()).unwrap();

        assert_eq!(graph.summary().merged_duplicates, 0);
        assert_eq!(graph.summary().records, 2);
        let entries: Vec<_> = graph
            .index()
            .entries
            .iter()
            .filter(|e| e.name.fullname() == "D")
            .collect();
        assert_eq!(entries.len(), 2);
        assert_ne!(entries[0].node, entries[1].node);
        // The lookup key takes the first occurrence in input order.
        assert_eq!(
            graph.index().records.get("D").copied(),
            Some(entries[0].node)
        );
    }

    #[test]
    fn test_direct_recursion_rejected_self_pointer_allowed() {
        let set = RawNodeSet::new(
            Some("rec.h".to_string()),
            vec![
                tu(),
                int_node(),
                RawNode::new("_fa", RawNodeKind::Field)
                    .with_name("a")
                    .with_type("_a"),
                RawNode::new("_a", RawNodeKind::Struct)
                    .with_name("A")
                    .with_context("_tu")
                    .with_members(vec!["_fa".to_string()]),
                RawNode::new("_pn", RawNodeKind::Pointer).with_type("_n"),
                RawNode::new("_fv", RawNodeKind::Field)
                    .with_name("value")
                    .with_type("_int"),
                RawNode::new("_fnext", RawNodeKind::Field)
                    .with_name("next")
                    .with_type("_pn"),
                RawNode::new("_n", RawNodeKind::Struct)
                    .with_name("Node")
                    .with_context("_tu")
                    .with_members(vec!["_fv".to_string(), "_fnext".to_string()]),
            ],
        );
        let graph = process(&[set], &Config::default()).unwrap();

        // The directly self-containing record is excluded from the output.
        assert!(graph.index().records.get("A").is_none());
        assert_eq!(graph.summary().invalid_recursive, 1);

        let node = graph.index().records.get("Node").copied().unwrap();
        let rec = graph.resolve(node).unwrap().as_record().unwrap();
        assert_eq!(rec.status, crate::graph::RecordStatus::Complete);
        assert_eq!(rec.fields[1].byte_offset, 8);
        let (ptr_size, _) = graph.layout_of(rec.fields[1].ty).unwrap();
        assert_eq!(ptr_size, 8);
    }

    #[test]
    fn test_typedef_chain_layout_equality() {
        let set = RawNodeSet::new(
            Some("td.h".to_string()),
            vec![
                tu(),
                int_node(),
                RawNode::new("_t1", RawNodeKind::Typedef)
                    .with_name("level1")
                    .with_context("_tu")
                    .with_type("_int"),
                RawNode::new("_t2", RawNodeKind::Typedef)
                    .with_name("level2")
                    .with_context("_tu")
                    .with_type("_t1"),
            ],
        );
        let graph = process(&[set], &Config::default()).unwrap();

        let t2 = graph.index().typedefs.get("level2").copied().unwrap();
        let t1 = graph.index().typedefs.get("level1").copied().unwrap();
        assert_eq!(graph.layout_of(t2).unwrap(), graph.layout_of(t1).unwrap());
        assert_eq!(graph.layout_of(t2).unwrap(), (4, 4));
    }

    #[test]
    fn test_strict_unresolved_aborts() {
        let set = RawNodeSet::new(
            Some("bad.h".to_string()),
            vec![
                tu(),
                RawNode::new("_f", RawNodeKind::Field)
                    .with_name("ghost")
                    .with_type("_nowhere"),
                RawNode::new("_s", RawNodeKind::Struct)
                    .with_name("S")
                    .with_context("_tu")
                    .with_members(vec!["_f".to_string()]),
            ],
        );

        let lenient = process(&[set.clone()], &Config::default()).unwrap();
        assert_eq!(lenient.summary().partial, 1);

        let strict = Config::default().with_strict_unresolved(true);
        let result = process(&[set], &strict);
        assert!(matches!(
            result,
            Err(GraphError::UnresolvedFieldType { .. })
        ));
    }

    #[test]
    fn test_dangling_reference_is_fatal() {
        let mut graph = UnresolvedGraph::new();
        let ghost = graph.intern("_ghost");
        let r = graph.intern("_s");
        let mut rec = RecordType::new(RecordKind::Struct, Some(ScopedName::global("S")));
        rec.fields = vec![Field::new(Some("f".to_string()), ghost)];
        graph.assign(r, TypeNode::Record(rec));
        graph.add_root(crate::graph::RootEntry {
            name: ScopedName::global("S"),
            category: RootCategory::Record,
            node: r,
        });

        let result = finalize(graph, &Config::default(), 1);
        assert!(matches!(result, Err(GraphError::UnknownReference(_))));
    }

    #[test]
    fn test_merged_reference_rewrite() {
        // Two files with an anonymous-namespace struct and a named struct
        // embedding it by value: after merge, the embedding field must
        // resolve to the single surviving node.
        fn file() -> RawNodeSet {
            RawNodeSet::new(
                Some("w.h".to_string()),
                vec![
                    tu(),
                    RawNode::new("_ns", RawNodeKind::Namespace).with_context("_tu"),
                    int_node(),
                    RawNode::new("_fx", RawNodeKind::Field)
                        .with_name("x")
                        .with_type("_int"),
                    RawNode::new("_c", RawNodeKind::Struct)
                        .with_name("C")
                        .with_context("_ns")
                        .with_members(vec!["_fx".to_string()]),
                ],
            )
        }
        let graph = process(&[file(), file()], &Config::default()).unwrap();
        let r = graph.index().records.get("::C").copied().unwrap();
        // Every reference must resolve post-merge.
        for (_, node) in graph.iter() {
            for dep in node.references() {
                assert!(graph.resolve(dep).is_ok());
            }
        }
        assert!(graph.resolve(r).is_ok());
    }

    #[test]
    fn test_unnamed_anonymous_records_merge_to_one_node() {
        // Two named holders each embedding an identical unnamed struct.
        fn holder(ordinal: u32) -> Vec<RawNode> {
            vec![
                RawNode::new(format!("_fx{}", ordinal), RawNodeKind::Field)
                    .with_name("x")
                    .with_type("_int"),
                RawNode::new(format!("_anon{}", ordinal), RawNodeKind::Struct)
                    .with_context("_tu")
                    .with_members(vec![format!("_fx{}", ordinal)]),
                RawNode::new(format!("_fi{}", ordinal), RawNodeKind::Field)
                    .with_name("inner")
                    .with_type(format!("_anon{}", ordinal)),
                RawNode::new(format!("_h{}", ordinal), RawNodeKind::Struct)
                    .with_name(format!("Holder{}", ordinal))
                    .with_context("_tu")
                    .with_members(vec![format!("_fi{}", ordinal)]),
            ]
        }
        let mut nodes = vec![tu(), int_node()];
        nodes.extend(holder(1));
        nodes.extend(holder(2));
        let set = RawNodeSet::new(Some("anon.h".to_string()), nodes);
        let graph = process(&[set], &Config::default()).unwrap();

        assert_eq!(graph.summary().merged_duplicates, 1);
        let h1 = graph.index().records.get("Holder1").copied().unwrap();
        let h2 = graph.index().records.get("Holder2").copied().unwrap();
        let r1 = graph.resolve(h1).unwrap().as_record().unwrap();
        let r2 = graph.resolve(h2).unwrap().as_record().unwrap();
        assert_eq!(r1.fields[0].ty, r2.fields[0].ty);
    }
}
