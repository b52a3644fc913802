// Thu Aug 6 2026 - Alex

use crate::graph::{Field, GraphError, RecordStatus, RootCategory, TypeGraph, TypeNode};
use crate::layout::Size;
use itertools::Itertools;
use std::fmt::Write as _;

/// Human-readable layout dump of every named record, with padding-gap
/// detection.
pub struct TextReport {
    show_gaps: bool,
    show_enums: bool,
    show_constants: bool,
}

impl TextReport {
    pub fn new() -> Self {
        Self {
            show_gaps: true,
            show_enums: true,
            show_constants: true,
        }
    }

    pub fn with_gaps(mut self, show: bool) -> Self {
        self.show_gaps = show;
        self
    }

    pub fn with_enums(mut self, show: bool) -> Self {
        self.show_enums = show;
        self
    }

    pub fn with_constants(mut self, show: bool) -> Self {
        self.show_constants = show;
        self
    }

    pub fn render(&self, graph: &TypeGraph) -> Result<String, GraphError> {
        let mut out = String::new();

        for entry in &graph.index().entries {
            match entry.category {
                RootCategory::Record => self.render_record(graph, &mut out, entry.name.fullname(), entry.node)?,
                RootCategory::Enum if self.show_enums => {
                    self.render_enum(graph, &mut out, entry.name.fullname(), entry.node)?
                }
                RootCategory::Constant if self.show_constants => {
                    self.render_constant(graph, &mut out, entry.name.fullname(), entry.node)?
                }
                _ => {}
            }
        }

        let _ = writeln!(out, "// {}", graph.summary());
        Ok(out)
    }

    fn render_record(
        &self,
        graph: &TypeGraph,
        out: &mut String,
        name: String,
        r: crate::graph::TypeRef,
    ) -> Result<(), GraphError> {
        let Some(rec) = graph.resolve(r)?.as_record() else {
            return Ok(());
        };
        let keyword = if rec.is_union() { "union" } else { "struct" };
        let _ = write!(out, "{} {} {{", keyword, name);
        let _ = write!(
            out,
            " // size={} align={}",
            Size::new(rec.byte_size),
            rec.byte_align
        );
        if let Some(pack) = rec.pack {
            let _ = write!(out, " pack({})", pack);
        }
        if rec.status == RecordStatus::Partial {
            let _ = write!(out, " [partial]");
        }
        let _ = writeln!(out);

        for field in &rec.fields {
            let type_name = graph.display_type(field.ty);
            match (field.bit_offset, field.bit_width) {
                (Some(bit), Some(width)) => {
                    let _ = writeln!(
                        out,
                        "    {} {} : {}; // unit at {}, bit {}",
                        type_name,
                        field.display_name(),
                        width,
                        field.byte_offset,
                        bit
                    );
                }
                _ => {
                    let _ = writeln!(
                        out,
                        "    {} {}; // offset {}",
                        type_name,
                        field.display_name(),
                        field.byte_offset
                    );
                }
            }
        }

        if self.show_gaps {
            for gap in find_gaps(graph, rec.byte_size, &rec.fields)? {
                let _ = writeln!(out, "    // {}", gap);
            }
        }
        let _ = writeln!(out, "}};");
        let _ = writeln!(out);
        Ok(())
    }

    fn render_enum(
        &self,
        graph: &TypeGraph,
        out: &mut String,
        name: String,
        r: crate::graph::TypeRef,
    ) -> Result<(), GraphError> {
        let TypeNode::Enum(e) = graph.resolve(r)? else {
            return Ok(());
        };
        let _ = writeln!(out, "enum {} {{ // underlying {}", name, graph.display_type(e.underlying));
        for v in &e.enumerators {
            let _ = writeln!(out, "    {} = {},", v.name, v.value);
        }
        let _ = writeln!(out, "}};");
        let _ = writeln!(out);
        Ok(())
    }

    fn render_constant(
        &self,
        graph: &TypeGraph,
        out: &mut String,
        name: String,
        r: crate::graph::TypeRef,
    ) -> Result<(), GraphError> {
        let TypeNode::Constant(c) = graph.resolve(r)? else {
            return Ok(());
        };
        let _ = writeln!(
            out,
            "const {} {} = {}; // {}",
            graph.display_type(c.ty),
            name,
            c.value,
            c.source.as_deref().unwrap_or("<unknown>")
        );
        Ok(())
    }
}

impl Default for TextReport {
    fn default() -> Self {
        Self::new()
    }
}

/// Bit-level holes between members and at the record tail.
pub fn find_gaps(
    graph: &TypeGraph,
    record_byte_size: u64,
    fields: &[Field],
) -> Result<Vec<String>, GraphError> {
    let mut spans: Vec<(u64, u64, &str)> = Vec::with_capacity(fields.len());
    for field in fields {
        let start = field.byte_offset * 8 + u64::from(field.bit_offset.unwrap_or(0));
        let bits = match field.bit_width {
            Some(width) => u64::from(width),
            None => graph.layout_of(field.ty)?.0 * 8,
        };
        spans.push((start, start + bits, field.display_name()));
    }

    let mut gaps = Vec::new();
    let mut cursor = 0u64;
    for (start, end, name) in spans.iter().sorted_by_key(|(start, _, _)| *start) {
        if *start > cursor {
            gaps.push(format!("gap of {} bits before {}", start - cursor, name));
        }
        cursor = cursor.max(*end);
    }
    let total_bits = record_byte_size * 8;
    if cursor < total_bits {
        gaps.push(format!("gap of {} bits at the end", total_bits - cursor));
    }
    Ok(gaps)
}
