// Thu Aug 6 2026 - Alex

use crate::graph::{ConstValue, GraphError, RootCategory, TypeGraph, TypeNode, TypeRef};
use serde_json::{json, to_string, to_string_pretty, Value};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Serializes a finalized graph as kind-tagged JSON.
pub struct JsonExporter {
    pretty_print: bool,
    sort_entries: bool,
    include_target: bool,
    include_summary: bool,
}

impl JsonExporter {
    pub fn new() -> Self {
        Self {
            pretty_print: true,
            sort_entries: true,
            include_target: true,
            include_summary: true,
        }
    }

    pub fn with_pretty_print(mut self, pretty: bool) -> Self {
        self.pretty_print = pretty;
        self
    }

    pub fn with_sorted_entries(mut self, sort: bool) -> Self {
        self.sort_entries = sort;
        self
    }

    pub fn with_target(mut self, include: bool) -> Self {
        self.include_target = include;
        self
    }

    pub fn with_summary(mut self, include: bool) -> Self {
        self.include_summary = include;
        self
    }

    pub fn export(&self, graph: &TypeGraph) -> Result<String, GraphError> {
        let value = self.build_value(graph)?;
        if self.pretty_print {
            Ok(to_string_pretty(&value)?)
        } else {
            Ok(to_string(&value)?)
        }
    }

    pub fn export_to_file<P: AsRef<Path>>(
        &self,
        graph: &TypeGraph,
        path: P,
    ) -> Result<(), GraphError> {
        let text = self.export(graph)?;
        let file = File::create(path.as_ref())?;
        let mut writer = BufWriter::new(file);
        writer.write_all(text.as_bytes())?;
        Ok(())
    }

    fn build_value(&self, graph: &TypeGraph) -> Result<Value, GraphError> {
        let mut root = serde_json::Map::new();

        if self.include_target {
            let target = graph.target();
            root.insert(
                "target".to_string(),
                json!({
                    "pointer_width": target.pointer_width,
                    "endianness": format!("{:?}", target.endianness).to_lowercase(),
                    "default_alignment": target.default_alignment,
                    "bitfield_mode": format!("{:?}", target.bitfield_mode).to_lowercase(),
                }),
            );
        }

        root.insert(
            "records".to_string(),
            self.category_values(graph, RootCategory::Record)?,
        );
        root.insert(
            "enums".to_string(),
            self.category_values(graph, RootCategory::Enum)?,
        );
        root.insert(
            "typedefs".to_string(),
            self.category_values(graph, RootCategory::Typedef)?,
        );
        root.insert(
            "constants".to_string(),
            self.category_values(graph, RootCategory::Constant)?,
        );

        if self.include_summary {
            root.insert("summary".to_string(), json!(graph.summary()));
        }

        Ok(Value::Object(root))
    }

    fn category_values(
        &self,
        graph: &TypeGraph,
        category: RootCategory,
    ) -> Result<Value, GraphError> {
        let mut entries: Vec<(String, TypeRef)> = graph
            .index()
            .entries
            .iter()
            .filter(|e| e.category == category)
            .map(|e| (e.name.fullname(), e.node))
            .collect();
        if self.sort_entries {
            entries.sort_by(|a, b| a.0.cmp(&b.0));
        }

        let mut values = Vec::with_capacity(entries.len());
        for (name, r) in entries {
            values.push(self.entry_value(graph, &name, r)?);
        }
        Ok(Value::Array(values))
    }

    fn entry_value(&self, graph: &TypeGraph, name: &str, r: TypeRef) -> Result<Value, GraphError> {
        match graph.resolve(r)? {
            TypeNode::Record(rec) => {
                let mut fields = Vec::with_capacity(rec.fields.len());
                for field in &rec.fields {
                    let mut value = serde_json::Map::new();
                    value.insert("name".to_string(), json!(field.name));
                    value.insert("type".to_string(), json!(graph.display_type(field.ty)));
                    value.insert("byte_offset".to_string(), json!(field.byte_offset));
                    if let Some(bit_offset) = field.bit_offset {
                        value.insert("bit_offset".to_string(), json!(bit_offset));
                    }
                    if let Some(bit_width) = field.bit_width {
                        value.insert("bit_width".to_string(), json!(bit_width));
                    }
                    fields.push(Value::Object(value));
                }
                Ok(json!({
                    "kind": if rec.is_union() { "union" } else { "struct" },
                    "name": name,
                    "byte_size": rec.byte_size,
                    "byte_align": rec.byte_align,
                    "pack": rec.pack,
                    "status": format!("{:?}", rec.status).to_lowercase(),
                    "source": rec.source,
                    "fields": fields,
                }))
            }
            TypeNode::Enum(e) => {
                let enumerators: Vec<Value> = e
                    .enumerators
                    .iter()
                    .map(|v| json!({"name": v.name, "value": v.value}))
                    .collect();
                let (byte_size, _) = graph.layout_of(r)?;
                Ok(json!({
                    "kind": "enum",
                    "name": name,
                    "underlying": graph.display_type(e.underlying),
                    "byte_size": byte_size,
                    "is_scoped": e.is_scoped,
                    "enumerators": enumerators,
                }))
            }
            TypeNode::Typedef(t) => Ok(json!({
                "kind": "typedef",
                "name": name,
                "type": graph.display_type(t.target),
            })),
            TypeNode::Constant(c) => {
                let value = match &c.value {
                    ConstValue::Int(v) => json!(v),
                    ConstValue::Float(v) => json!(v),
                    ConstValue::Str(v) => json!(v),
                };
                Ok(json!({
                    "kind": "constant",
                    "name": name,
                    "type": graph.display_type(c.ty),
                    "value": value,
                    "source": c.source,
                }))
            }
            other => Ok(json!({
                "kind": other.kind_name(),
                "name": name,
            })),
        }
    }
}

impl Default for JsonExporter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{RawNode, RawNodeKind, RawNodeSet};
    use crate::config::Config;
    use crate::process;

    fn sample_graph() -> TypeGraph {
        let set = RawNodeSet::new(
            Some("sample.h".to_string()),
            vec![
                RawNode::new("_tu", RawNodeKind::TranslationUnit),
                RawNode::new("_int", RawNodeKind::FundamentalType)
                    .with_name("int")
                    .with_size_align(4, 4),
                RawNode::new("_fa", RawNodeKind::Field)
                    .with_name("a")
                    .with_type("_int"),
                RawNode::new("_s", RawNodeKind::Struct)
                    .with_name("Sample")
                    .with_context("_tu")
                    .with_members(vec!["_fa".to_string()]),
            ],
        );
        process(&[set], &Config::default()).unwrap()
    }

    #[test]
    fn test_export_contains_record() {
        let graph = sample_graph();
        let text = JsonExporter::new().export(&graph).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();

        let records = value["records"].as_array().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["name"], "Sample");
        assert_eq!(records[0]["byte_size"], 4);
        assert_eq!(records[0]["fields"][0]["name"], "a");
        assert_eq!(records[0]["fields"][0]["type"], "int32_t");
        assert_eq!(value["target"]["pointer_width"], 64);
    }

    #[test]
    fn test_compact_output_round_trips() {
        let graph = sample_graph();
        let text = JsonExporter::new()
            .with_pretty_print(false)
            .with_summary(false)
            .export(&graph)
            .unwrap();
        assert!(!text.contains('\n'));
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert!(value.get("summary").is_none());
    }
}
