// Wed Aug 5 2026 - Alex

use crate::ast::{RawNode, RawNodeKind};
use crate::graph::{ScopePath, ScopeSegment, UnresolvedGraph};
use ahash::AHashMap;

/// Builds qualified scope paths by walking context-of-context links up to
/// the translation-unit root.
///
/// Anonymous namespaces get one sentinel site per declaration (raw node id),
/// allocated from the graph so sites stay unique across merged files.
#[derive(Debug, Default)]
pub struct ScopeResolver {
    anon_sites: AHashMap<String, u64>,
    cache: AHashMap<String, ScopePath>,
}

impl ScopeResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scope_of(
        &mut self,
        nodes: &AHashMap<&str, &RawNode>,
        graph: &mut UnresolvedGraph,
        node: &RawNode,
    ) -> ScopePath {
        let start = match &node.context {
            Some(ctx) => ctx.clone(),
            None => return ScopePath::root(),
        };
        if let Some(cached) = self.cache.get(&start) {
            return cached.clone();
        }

        let mut segments = Vec::new();
        let mut current = Some(start.clone());
        while let Some(ctx_id) = current {
            let Some(ctx) = nodes.get(ctx_id.as_str()) else {
                break;
            };
            match ctx.kind {
                RawNodeKind::TranslationUnit => break,
                RawNodeKind::Namespace => {
                    match ctx.name.as_deref() {
                        Some(name) if !name.is_empty() && name != "::" => {
                            segments.push(ScopeSegment::Named(name.to_string()));
                        }
                        _ => {
                            let site = self.anon_site(graph, &ctx.id);
                            segments.push(ScopeSegment::Anonymous(site));
                        }
                    }
                }
                kind if kind.is_record() || kind == RawNodeKind::Enum => {
                    // Nested types are scoped by their enclosing type; an
                    // unnamed enclosure takes its raw id as surrogate so the
                    // path stays addressable.
                    let name = ctx.name.clone().unwrap_or_else(|| ctx.id.clone());
                    segments.push(ScopeSegment::Named(name));
                }
                _ => {}
            }
            current = ctx.context.clone();
        }
        segments.reverse();

        let path = ScopePath::from_segments(segments);
        self.cache.insert(start, path.clone());
        path
    }

    fn anon_site(&mut self, graph: &mut UnresolvedGraph, namespace_id: &str) -> u64 {
        if let Some(site) = self.anon_sites.get(namespace_id) {
            return *site;
        }
        let site = graph.next_anon_site();
        self.anon_sites.insert(namespace_id.to_string(), site);
        site
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::RawNode;

    fn index(nodes: &[RawNode]) -> AHashMap<&str, &RawNode> {
        nodes.iter().map(|n| (n.id.as_str(), n)).collect()
    }

    #[test]
    fn test_nested_namespaces() {
        let nodes = vec![
            RawNode::new("_tu", RawNodeKind::TranslationUnit),
            RawNode::new("_outer", RawNodeKind::Namespace)
                .with_name("Outer")
                .with_context("_tu"),
            RawNode::new("_inner", RawNodeKind::Namespace)
                .with_name("Inner")
                .with_context("_outer"),
            RawNode::new("_s", RawNodeKind::Struct)
                .with_name("B")
                .with_context("_inner"),
        ];
        let map = index(&nodes);
        let mut graph = UnresolvedGraph::new();
        let mut resolver = ScopeResolver::new();
        let path = resolver.scope_of(&map, &mut graph, &nodes[3]);
        assert_eq!(path.display(), "Outer::Inner");
    }

    #[test]
    fn test_anonymous_namespace_sentinel() {
        let nodes = vec![
            RawNode::new("_tu", RawNodeKind::TranslationUnit),
            RawNode::new("_anon", RawNodeKind::Namespace).with_context("_tu"),
            RawNode::new("_s", RawNodeKind::Struct)
                .with_name("C")
                .with_context("_anon"),
        ];
        let map = index(&nodes);
        let mut graph = UnresolvedGraph::new();
        let mut resolver = ScopeResolver::new();
        let path = resolver.scope_of(&map, &mut graph, &nodes[2]);
        assert!(path.contains_anonymous());
        assert_eq!(path.display(), "");
    }

    #[test]
    fn test_same_site_reused_within_one_namespace() {
        let nodes = vec![
            RawNode::new("_tu", RawNodeKind::TranslationUnit),
            RawNode::new("_anon", RawNodeKind::Namespace).with_context("_tu"),
            RawNode::new("_a", RawNodeKind::Struct)
                .with_name("A")
                .with_context("_anon"),
            RawNode::new("_b", RawNodeKind::Struct)
                .with_name("B")
                .with_context("_anon"),
        ];
        let map = index(&nodes);
        let mut graph = UnresolvedGraph::new();
        let mut resolver = ScopeResolver::new();
        let a = resolver.scope_of(&map, &mut graph, &nodes[2]);
        let b = resolver.scope_of(&map, &mut graph, &nodes[3]);
        assert_eq!(a, b);
        assert_eq!(graph.anon_site_count(), 1);
    }
}
