// Wed Aug 5 2026 - Alex

use crate::graph::{TypeNode, TypeRef, UnresolvedGraph};
use ahash::{AHashMap, AHashSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Color {
    Gray,
    Black,
}

/// Finds records on a containment cycle: `Record -> Field -> TypeRef` edges
/// restricted to direct (non-pointer) containment. A cycle that passes
/// through a pointer edge is legal and is not reported; the reference
/// indirection already prevents infinite expansion.
pub fn detect_containment_cycles(graph: &UnresolvedGraph) -> AHashSet<u32> {
    let mut detector = CycleDetector {
        graph,
        color: AHashMap::new(),
        path: Vec::new(),
        invalid: AHashSet::new(),
    };
    let records: Vec<TypeRef> = graph
        .refs()
        .filter(|r| graph.get(*r).map(TypeNode::is_record).unwrap_or(false))
        .collect();
    for r in records {
        if !detector.color.contains_key(&r.index()) {
            detector.visit(r);
        }
    }
    detector.invalid
}

struct CycleDetector<'g> {
    graph: &'g UnresolvedGraph,
    color: AHashMap<u32, Color>,
    path: Vec<u32>,
    invalid: AHashSet<u32>,
}

impl CycleDetector<'_> {
    fn visit(&mut self, r: TypeRef) {
        self.color.insert(r.index(), Color::Gray);
        self.path.push(r.index());

        for edge in self.containment_edges(r) {
            match self.color.get(&edge.index()).copied() {
                None => self.visit(edge),
                Some(Color::Gray) => {
                    // Everything from the re-entered record to the top of
                    // the path is on the cycle.
                    let start = self
                        .path
                        .iter()
                        .position(|&idx| idx == edge.index())
                        .unwrap_or(0);
                    for &idx in &self.path[start..] {
                        self.invalid.insert(idx);
                    }
                }
                Some(Color::Black) => {}
            }
        }

        self.path.pop();
        self.color.insert(r.index(), Color::Black);
    }

    /// Record targets reachable from `r`'s fields without crossing a
    /// pointer edge.
    fn containment_edges(&self, r: TypeRef) -> Vec<TypeRef> {
        let Some(TypeNode::Record(record)) = self.graph.get(r) else {
            return Vec::new();
        };
        let mut edges = Vec::new();
        for field in &record.fields {
            if let Some(target) = self.containment_target(field.ty) {
                edges.push(target);
            }
        }
        edges
    }

    fn containment_target(&self, mut r: TypeRef) -> Option<TypeRef> {
        // Arrays and typedef chains contain; pointers do not.
        let mut hops = 0;
        loop {
            match self.graph.get(r)? {
                TypeNode::Record(_) => return Some(r),
                TypeNode::Array(a) => r = a.element,
                TypeNode::Typedef(t) => r = t.target,
                _ => return None,
            }
            hops += 1;
            if hops > 256 {
                return None;
            }
        }
    }
}
