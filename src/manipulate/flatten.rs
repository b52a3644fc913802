// Wed Aug 5 2026 - Alex

use crate::graph::{GraphError, RootIndex, ScopedName, TypeGraph, TypeNode, TypeRef};
use crate::manipulate::Manipulator;

/// Rewrites every qualified name `Outer::Inner::Name` into a flat global
/// `Outer__Inner__Name`. Anonymous namespace segments vanish entirely.
pub struct NamespaceFlattener;

impl Manipulator for NamespaceFlattener {
    fn name(&self) -> &str {
        "namespace_flattener"
    }

    fn apply(&self, graph: &TypeGraph) -> Result<TypeGraph, GraphError> {
        let mut out = graph.clone();
        let refs: Vec<TypeRef> = graph.iter().map(|(r, _)| r).collect();
        for r in refs {
            let node = out.node_mut(r)?;
            match node {
                TypeNode::Record(rec) => {
                    if let Some(name) = rec.name.take() {
                        rec.name = Some(ScopedName::global(name.flattened()));
                    }
                }
                TypeNode::Enum(e) => {
                    if let Some(name) = e.name.take() {
                        e.name = Some(ScopedName::global(name.flattened()));
                    }
                }
                TypeNode::Typedef(t) => {
                    t.name = ScopedName::global(t.name.flattened());
                }
                TypeNode::Constant(c) => {
                    c.name = ScopedName::global(c.name.flattened());
                }
                _ => {}
            }
        }

        let mut index = RootIndex::default();
        for entry in &graph.index().entries {
            let mut entry = entry.clone();
            entry.name = ScopedName::global(entry.name.flattened());
            index.insert(entry);
        }
        *out.index_mut() = index;
        Ok(out)
    }
}
