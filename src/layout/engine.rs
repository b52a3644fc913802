// Tue Aug 4 2026 - Alex

use crate::graph::{
    Diagnostic, DiagnosticKind, Field, GraphError, RecordKind, RecordStatus, TypeNode, TypeRef,
    UnresolvedGraph,
};
use crate::layout::{Alignment, BitfieldCursor, TargetProfile};
use ahash::AHashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LayoutState {
    InProgress,
    Done,
    Invalid,
}

/// Result of measuring one type during a record walk.
enum Measure {
    Known { size: u64, align: Alignment },
    Unresolved,
    Invalid,
}

/// Shallow copy of the data needed to measure a node without holding a
/// borrow across recursion.
enum Shape {
    Scalar(u64, u64),
    PointerLike,
    Array(TypeRef, u64),
    Record,
    Indirect(TypeRef),
}

/// Computes size, alignment and field offsets for every record in a graph,
/// honoring pack directives and the configured target profile.
///
/// Layout is attached in place; records that turn out to contain themselves
/// directly are flagged `InvalidRecursive` and left without a layout.
pub struct LayoutEngine<'t> {
    target: &'t TargetProfile,
    state: AHashMap<u32, LayoutState>,
}

struct WalkResult {
    fields: Vec<Field>,
    size: u64,
    align: Alignment,
    partial: bool,
}

impl<'t> LayoutEngine<'t> {
    pub fn new(target: &'t TargetProfile) -> Self {
        Self {
            target,
            state: AHashMap::new(),
        }
    }

    pub fn compute_all(&mut self, graph: &mut UnresolvedGraph) -> Result<(), GraphError> {
        let records: Vec<TypeRef> = graph
            .refs()
            .filter(|r| graph.get(*r).map(TypeNode::is_record).unwrap_or(false))
            .collect();
        log::debug!("computing layout for {} records", records.len());
        for r in records {
            self.ensure_record(graph, r)?;
        }
        Ok(())
    }

    fn ensure_record(
        &mut self,
        graph: &mut UnresolvedGraph,
        r: TypeRef,
    ) -> Result<LayoutState, GraphError> {
        match self.state.get(&r.index()).copied() {
            Some(LayoutState::Done) => return Ok(LayoutState::Done),
            Some(LayoutState::Invalid) => return Ok(LayoutState::Invalid),
            Some(LayoutState::InProgress) => {
                // Re-entered through direct containment: no finite size.
                self.state.insert(r.index(), LayoutState::Invalid);
                let name = graph.surrogate_name(r);
                graph.push_diagnostic(Diagnostic::new(
                    DiagnosticKind::InvalidRecursiveLayout,
                    name,
                    "record contains itself through a non-pointer path",
                ));
                if let Some(rec) = graph.get_mut(r).and_then(TypeNode::as_record_mut) {
                    rec.status = RecordStatus::InvalidRecursive;
                }
                return Ok(LayoutState::Invalid);
            }
            None => {}
        }
        self.state.insert(r.index(), LayoutState::InProgress);

        let (kind, fields, pack, was_partial) = match graph.resolve(r)? {
            TypeNode::Record(rec) => (
                rec.kind,
                rec.fields.clone(),
                rec.pack,
                rec.status == RecordStatus::Partial,
            ),
            _ => return Err(GraphError::UnknownReference(r)),
        };
        let pack = self.target.effective_pack(pack);
        let owner_name = graph.surrogate_name(r);

        let walk = match kind {
            RecordKind::Struct => self.walk_struct(graph, &owner_name, fields, pack)?,
            RecordKind::Union => self.walk_union(graph, &owner_name, fields, pack)?,
        };

        // Recursion through this record may have invalidated it mid-walk.
        if self.state.get(&r.index()) == Some(&LayoutState::Invalid) {
            return Ok(LayoutState::Invalid);
        }

        if let Some(rec) = graph.get_mut(r).and_then(TypeNode::as_record_mut) {
            rec.fields = walk.fields;
            rec.byte_size = walk.size;
            rec.byte_align = walk.align.as_u64();
            rec.status = if walk.partial || was_partial {
                RecordStatus::Partial
            } else {
                RecordStatus::Complete
            };
        }
        self.state.insert(r.index(), LayoutState::Done);
        Ok(LayoutState::Done)
    }

    fn walk_struct(
        &mut self,
        graph: &mut UnresolvedGraph,
        owner: &str,
        fields: Vec<Field>,
        pack: Option<u64>,
    ) -> Result<WalkResult, GraphError> {
        let mut out = Vec::with_capacity(fields.len());
        let mut offset = 0u64;
        let mut align = Alignment::ONE;
        let mut cursor = BitfieldCursor::new(self.target.bitfield_mode);
        let mut partial = false;

        for mut field in fields {
            if let Some(width) = field.bit_width {
                let (base_size, base_align) =
                    match self.measure(graph, field.ty)? {
                        Measure::Known { size, align } => (size, align),
                        Measure::Unresolved => {
                            partial = true;
                            self.report_dropped(graph, owner, &field);
                            continue;
                        }
                        Measure::Invalid => {
                            // The cycle itself is already diagnosed.
                            partial = true;
                            continue;
                        }
                    };
                if width == 0 {
                    // Placeholder: advance the bit cursor, emit nothing.
                    cursor.close();
                    offset = base_align.clipped(pack).align(offset);
                    continue;
                }
                let (unit_offset, bit_pos) = cursor.place(
                    field.ty,
                    base_size,
                    base_align,
                    width,
                    pack,
                    &mut offset,
                    &mut align,
                );
                field.byte_offset = unit_offset;
                field.bit_offset = Some(bit_pos);
                out.push(field);
            } else {
                cursor.close();
                let (field_size, field_align) =
                    match self.measure(graph, field.ty)? {
                        Measure::Known { size, align } => (size, align),
                        Measure::Unresolved => {
                            partial = true;
                            self.report_dropped(graph, owner, &field);
                            continue;
                        }
                        Measure::Invalid => {
                            partial = true;
                            continue;
                        }
                    };
                let effective = field_align.clipped(pack);
                offset = effective.align(offset);
                field.byte_offset = offset;
                field.bit_offset = None;
                offset += field_size;
                align = align.max(effective);
                out.push(field);
            }
        }

        Ok(WalkResult {
            fields: out,
            size: align.align(offset),
            align,
            partial,
        })
    }

    fn walk_union(
        &mut self,
        graph: &mut UnresolvedGraph,
        owner: &str,
        fields: Vec<Field>,
        pack: Option<u64>,
    ) -> Result<WalkResult, GraphError> {
        let mut out = Vec::with_capacity(fields.len());
        let mut size = 0u64;
        let mut align = Alignment::ONE;
        let mut partial = false;

        for mut field in fields {
            let (member_size, member_align) = match self.measure(graph, field.ty)? {
                Measure::Known { size, align } => (size, align),
                Measure::Unresolved => {
                    partial = true;
                    self.report_dropped(graph, owner, &field);
                    continue;
                }
                Measure::Invalid => {
                    partial = true;
                    continue;
                }
            };
            if field.bit_width == Some(0) {
                continue;
            }
            field.byte_offset = 0;
            if field.is_bitfield() {
                field.bit_offset = Some(0);
            }
            align = align.max(member_align.clipped(pack));
            size = size.max(member_size);
            out.push(field);
        }

        Ok(WalkResult {
            fields: out,
            size: align.align(size),
            align,
            partial,
        })
    }

    fn measure(
        &mut self,
        graph: &mut UnresolvedGraph,
        r: TypeRef,
    ) -> Result<Measure, GraphError> {
        let shape = match graph.get(r) {
            None => return Ok(Measure::Unresolved),
            Some(TypeNode::Scalar(s)) => Shape::Scalar(s.byte_size, s.byte_align),
            Some(TypeNode::Pointer(_)) | Some(TypeNode::FunctionPointer(_)) => Shape::PointerLike,
            Some(TypeNode::Array(a)) => Shape::Array(a.element, a.len),
            Some(TypeNode::Record(_)) => Shape::Record,
            Some(TypeNode::Enum(e)) => Shape::Indirect(e.underlying),
            Some(TypeNode::Typedef(t)) => Shape::Indirect(t.target),
            Some(TypeNode::Constant(c)) => Shape::Indirect(c.ty),
        };

        match shape {
            Shape::Scalar(size, align) => Ok(Measure::Known {
                size,
                align: Alignment::new(align.max(1)),
            }),
            Shape::PointerLike => Ok(Measure::Known {
                size: self.target.pointer_size(),
                align: Alignment::new(self.target.pointer_align()),
            }),
            Shape::Array(element, len) => match self.measure(graph, element)? {
                Measure::Known { size, align } => Ok(Measure::Known {
                    size: size * len,
                    align,
                }),
                other => Ok(other),
            },
            Shape::Record => match self.ensure_record(graph, r)? {
                LayoutState::Done => {
                    let rec = graph
                        .get(r)
                        .and_then(TypeNode::as_record)
                        .ok_or(GraphError::UnknownReference(r))?;
                    Ok(Measure::Known {
                        size: rec.byte_size,
                        align: Alignment::new(rec.byte_align.max(1)),
                    })
                }
                _ => Ok(Measure::Invalid),
            },
            Shape::Indirect(target) => self.measure(graph, target),
        }
    }

    fn report_dropped(&self, graph: &mut UnresolvedGraph, owner: &str, field: &Field) {
        graph.push_diagnostic(Diagnostic::new(
            DiagnosticKind::UnresolvedFieldType,
            owner.to_string(),
            format!("field '{}' dropped: type did not resolve", field.display_name()),
        ));
    }
}
