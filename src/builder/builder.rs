// Wed Aug 5 2026 - Alex

use crate::ast::{RawLiteral, RawNode, RawNodeFlags, RawNodeKind, RawNodeSet};
use crate::builder::fixed_width;
use crate::builder::ScopeResolver;
use crate::config::Config;
use crate::graph::{
    ConstValue, ConstantType, Diagnostic, DiagnosticKind, EnumType, Enumerator, Field,
    FunctionPointerType, GraphError, PointerType, RecordKind, RecordStatus, RecordType,
    RootCategory, RootEntry, ScalarType, ScopedName, TypeNode, TypeRef, UnresolvedGraph,
};
use crate::layout::TargetProfile;
use ahash::{AHashMap, AHashSet};

/// Outcome of building one raw node into the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BuildOutcome {
    Built(TypeRef),
    /// Non-POD construct, recognized and omitted.
    Excluded,
    /// Incomplete marker, silently dropped.
    Dropped,
    /// Raw id absent from the input or not a type.
    Missing,
}

/// Walks raw nodes and produces canonical `TypeNode` values, resolving
/// elaborated references through to their defining node.
///
/// A single unsupported type never aborts the run: non-POD nodes are
/// excluded, incomplete ones dropped, and a field whose type fails to
/// resolve degrades only its record.
pub struct GraphBuilder<'a> {
    config: &'a Config,
    target: TargetProfile,
    index: AHashMap<&'a str, &'a RawNode>,
    graph: UnresolvedGraph,
    scopes: ScopeResolver,
    excluded: AHashSet<String>,
    dropped: AHashSet<String>,
    in_flight: AHashSet<String>,
}

impl<'a> GraphBuilder<'a> {
    pub fn build(set: &'a RawNodeSet, config: &'a Config) -> Result<UnresolvedGraph, GraphError> {
        let mut index: AHashMap<&str, &RawNode> = AHashMap::with_capacity(set.nodes.len());
        for node in &set.nodes {
            if index.insert(node.id.as_str(), node).is_some() {
                return Err(GraphError::DuplicateRawId(node.id.clone()));
            }
        }

        let mut builder = Self {
            config,
            target: config.target_profile(),
            index,
            graph: UnresolvedGraph::new(),
            scopes: ScopeResolver::new(),
            excluded: AHashSet::new(),
            dropped: AHashSet::new(),
            in_flight: AHashSet::new(),
        };

        for node in &set.nodes {
            if node.kind.is_definition() {
                builder.build_type(&node.id)?;
            }
        }
        builder.collect_roots(set);

        log::debug!(
            "built {} nodes from {}",
            builder.graph.node_count(),
            set.file.as_deref().unwrap_or("<memory>")
        );
        Ok(builder.graph)
    }

    fn collect_roots(&mut self, set: &RawNodeSet) {
        for raw in &set.nodes {
            if !raw.kind.is_definition() {
                continue;
            }
            let Some(r) = self.graph.lookup(&raw.id) else {
                continue;
            };
            let entry = match self.graph.get(r) {
                Some(TypeNode::Record(rec)) => {
                    rec.name.clone().map(|n| (n, RootCategory::Record))
                }
                Some(TypeNode::Enum(e)) => e.name.clone().map(|n| (n, RootCategory::Enum)),
                Some(TypeNode::Typedef(t)) => Some((t.name.clone(), RootCategory::Typedef)),
                Some(TypeNode::Constant(c)) => Some((c.name.clone(), RootCategory::Constant)),
                // Fixed-width typedef leaves alias to shared scalars.
                _ => None,
            };
            if let Some((name, category)) = entry {
                self.graph.add_root(RootEntry {
                    name,
                    category,
                    node: r,
                });
            }
        }
    }

    fn build_type(&mut self, raw_id: &str) -> Result<BuildOutcome, GraphError> {
        if self.excluded.contains(raw_id) {
            return Ok(BuildOutcome::Excluded);
        }
        if self.dropped.contains(raw_id) {
            return Ok(BuildOutcome::Dropped);
        }
        if let Some(existing) = self.graph.lookup(raw_id) {
            // Already built, or a record currently being built whose slot
            // is interned; either way the reference is stable.
            return Ok(BuildOutcome::Built(existing));
        }
        let Some(node) = self.index.get(raw_id).copied() else {
            return Ok(BuildOutcome::Missing);
        };
        // Typedef/alias chains that loop back before a slot is interned
        // (malformed input) bottom out here instead of recursing forever.
        if !self.in_flight.insert(raw_id.to_string()) {
            return Ok(BuildOutcome::Missing);
        }

        let outcome = match node.kind {
            RawNodeKind::Elaborated => {
                let target = node.refers_to.as_deref().or(node.type_ref.as_deref());
                self.follow_alias(node, target)
            }
            RawNodeKind::CvQualified => self.follow_alias(node, node.type_ref.as_deref()),
            RawNodeKind::FundamentalType => self.build_scalar(node),
            RawNodeKind::Typedef => self.build_typedef(node),
            RawNodeKind::Pointer => self.build_pointer(node),
            RawNodeKind::Array => self.build_array(node),
            RawNodeKind::FunctionType => self.build_function(node),
            RawNodeKind::Struct | RawNodeKind::Class | RawNodeKind::Union => {
                self.build_record(node)
            }
            RawNodeKind::Enum => self.build_enum(node),
            RawNodeKind::Variable => self.build_constant(node),
            _ => Ok(BuildOutcome::Missing),
        };
        self.in_flight.remove(raw_id);
        outcome
    }

    /// Forward declarations and qualifiers resolve by following the link to
    /// the defining node, never by materializing a phantom definition.
    fn follow_alias(
        &mut self,
        node: &RawNode,
        target: Option<&str>,
    ) -> Result<BuildOutcome, GraphError> {
        let Some(target) = target else {
            return Ok(BuildOutcome::Missing);
        };
        let target = target.to_string();
        let outcome = self.build_type(&target)?;
        match outcome {
            BuildOutcome::Built(r) => {
                self.graph.alias(&node.id, r);
            }
            BuildOutcome::Excluded => {
                self.excluded.insert(node.id.clone());
            }
            BuildOutcome::Dropped => {
                self.dropped.insert(node.id.clone());
            }
            BuildOutcome::Missing => {}
        }
        Ok(outcome)
    }

    fn scalar_slot(&mut self, scalar: ScalarType) -> TypeRef {
        let key = format!("__scalar::{}", scalar.name);
        if let Some(existing) = self.graph.lookup(&key) {
            if self.graph.is_assigned(existing) {
                return existing;
            }
        }
        let r = self.graph.intern(&key);
        self.graph.assign(r, TypeNode::Scalar(scalar));
        r
    }

    fn void_ref(&mut self) -> TypeRef {
        self.scalar_slot(ScalarType {
            name: "void".to_string(),
            byte_size: 0,
            byte_align: 1,
            is_signed: false,
            is_floating: false,
            is_bool: false,
            is_wide_char: false,
        })
    }

    fn int_ref(&mut self) -> TypeRef {
        let alias = fixed_width::lookup("int32_t").expect("int32_t is always in the alias table");
        self.scalar_slot(fixed_width::scalar_for(alias, &self.target))
    }

    fn build_scalar(&mut self, node: &RawNode) -> Result<BuildOutcome, GraphError> {
        let raw_name = node.name.clone().unwrap_or_else(|| node.id.clone());
        let byte_size = node
            .byte_size
            .or_else(|| fixed_width::lookup(&raw_name).map(|a| u64::from(a.bits) / 8))
            .unwrap_or(if raw_name == "void" { 0 } else { 1 });
        let byte_align = node
            .byte_align
            .filter(|a| a.is_power_of_two())
            .unwrap_or_else(|| byte_size.max(1).next_power_of_two());

        let name = fixed_width::normalize_integral(&raw_name, byte_size * 8, self.config.use_bool);
        let is_floating = raw_name.contains("float") || raw_name.contains("double");
        let is_bool = raw_name.split_whitespace().any(|w| w == "bool" || w == "_Bool");
        let is_wide_char = raw_name.contains("wchar_t")
            || raw_name.contains("char16_t")
            || raw_name.contains("char32_t");
        let is_unsigned =
            raw_name.contains("unsigned") || (is_bool && !self.config.use_bool) || name.starts_with('u');
        let is_signed = !is_floating && !is_unsigned && !is_bool;

        let r = self.scalar_slot(ScalarType {
            name,
            byte_size,
            byte_align,
            is_signed,
            is_floating,
            is_bool: is_bool && self.config.use_bool,
            is_wide_char,
        });
        self.graph.alias(&node.id, r);
        Ok(BuildOutcome::Built(r))
    }

    fn build_typedef(&mut self, node: &RawNode) -> Result<BuildOutcome, GraphError> {
        let name = node.name.clone().unwrap_or_else(|| node.id.clone());

        // Fixed-width aliases are terminal scalar leaves, not expanded.
        if let Some(alias) = fixed_width::lookup(&name) {
            let r = self.scalar_slot(fixed_width::scalar_for(alias, &self.target));
            self.graph.alias(&node.id, r);
            return Ok(BuildOutcome::Built(r));
        }

        let Some(target_id) = node.type_ref.clone() else {
            return Ok(BuildOutcome::Missing);
        };
        match self.build_type(&target_id)? {
            BuildOutcome::Built(target) => {
                let scope = self.scopes.scope_of(&self.index, &mut self.graph, node);
                let r = self.graph.intern(&node.id);
                self.graph.assign(
                    r,
                    TypeNode::Typedef(crate::graph::TypedefType {
                        name: ScopedName::new(scope, name),
                        target,
                        source: node.source(),
                    }),
                );
                Ok(BuildOutcome::Built(r))
            }
            other => Ok(other),
        }
    }

    fn build_pointer(&mut self, node: &RawNode) -> Result<BuildOutcome, GraphError> {
        let outcome = match node.type_ref.clone() {
            Some(t) => self.build_type(&t)?,
            None => BuildOutcome::Missing,
        };
        let pointee = match outcome {
            BuildOutcome::Built(p) => {
                // A pointer over a function type IS the function pointer.
                if matches!(self.graph.get(p), Some(TypeNode::FunctionPointer(_))) {
                    self.graph.alias(&node.id, p);
                    return Ok(BuildOutcome::Built(p));
                }
                p
            }
            // Pointee unavailable: degrade to void*, keep the field usable.
            _ => self.void_ref(),
        };
        let r = self.graph.intern(&node.id);
        self.graph.assign(r, TypeNode::Pointer(PointerType { pointee }));
        Ok(BuildOutcome::Built(r))
    }

    fn build_array(&mut self, node: &RawNode) -> Result<BuildOutcome, GraphError> {
        let Some(element_id) = node.type_ref.clone() else {
            return Ok(BuildOutcome::Missing);
        };
        match self.build_type(&element_id)? {
            BuildOutcome::Built(element) => {
                let r = self.graph.intern(&node.id);
                self.graph.assign(
                    r,
                    TypeNode::Array(crate::graph::ArrayType {
                        element,
                        len: node.dim.unwrap_or(0),
                    }),
                );
                Ok(BuildOutcome::Built(r))
            }
            other => Ok(other),
        }
    }

    fn build_function(&mut self, node: &RawNode) -> Result<BuildOutcome, GraphError> {
        let return_type = match node.type_ref.clone() {
            Some(t) => match self.build_type(&t)? {
                BuildOutcome::Built(r) => r,
                _ => self.void_ref(),
            },
            None => self.void_ref(),
        };
        let mut params = Vec::with_capacity(node.params.len());
        for param_id in node.params.clone() {
            let param = match self.build_type(&param_id)? {
                BuildOutcome::Built(p) => p,
                _ => self.void_ref(),
            };
            params.push(param);
        }
        let r = self.graph.intern(&node.id);
        self.graph.assign(
            r,
            TypeNode::FunctionPointer(FunctionPointerType {
                return_type,
                params,
            }),
        );
        Ok(BuildOutcome::Built(r))
    }

    fn build_record(&mut self, node: &RawNode) -> Result<BuildOutcome, GraphError> {
        let display = node.name.clone().unwrap_or_else(|| node.id.clone());
        if node.flags.is_non_pod() {
            self.graph.push_diagnostic(Diagnostic::new(
                DiagnosticKind::Excluded,
                display,
                "non-POD construct (virtual dispatch, template or base classes)",
            ));
            self.excluded.insert(node.id.clone());
            return Ok(BuildOutcome::Excluded);
        }
        if node.flags.contains(RawNodeFlags::INCOMPLETE) {
            self.graph.push_diagnostic(Diagnostic::new(
                DiagnosticKind::IncompleteDropped,
                display,
                "incomplete record dropped",
            ));
            self.dropped.insert(node.id.clone());
            return Ok(BuildOutcome::Dropped);
        }

        let r = self.graph.intern(&node.id);
        if self.graph.is_assigned(r) {
            return Ok(BuildOutcome::Built(r));
        }

        let kind = if node.kind == RawNodeKind::Union {
            RecordKind::Union
        } else {
            RecordKind::Struct
        };
        let name = node.name.clone().map(|n| {
            let scope = self.scopes.scope_of(&self.index, &mut self.graph, node);
            ScopedName::new(scope, n)
        });

        let mut fields = Vec::new();
        let mut partial = false;
        for member_id in node.members.clone() {
            let Some(member) = self.index.get(member_id.as_str()).copied() else {
                continue;
            };
            if member.kind != RawNodeKind::Field {
                continue;
            }
            let outcome = match member.type_ref.clone() {
                Some(t) => self.build_type(&t)?,
                None => BuildOutcome::Missing,
            };
            match outcome {
                BuildOutcome::Built(ty) => {
                    let mut field = Field::new(member.name.clone(), ty);
                    field.bit_width = member.bit_width;
                    fields.push(field);
                }
                _ => {
                    partial = true;
                    self.graph.push_diagnostic(Diagnostic::new(
                        DiagnosticKind::UnresolvedFieldType,
                        display.clone(),
                        format!(
                            "field '{}' dropped: type did not resolve",
                            member.name.as_deref().unwrap_or("<anonymous>")
                        ),
                    ));
                }
            }
        }

        let mut record = RecordType::new(kind, name);
        record.fields = fields;
        record.pack = node.pack.filter(|p| p.is_power_of_two());
        record.source = node.source();
        if partial {
            record.status = RecordStatus::Partial;
        }
        self.graph.assign(r, TypeNode::Record(record));
        Ok(BuildOutcome::Built(r))
    }

    fn build_enum(&mut self, node: &RawNode) -> Result<BuildOutcome, GraphError> {
        let r = self.graph.intern(&node.id);
        if self.graph.is_assigned(r) {
            return Ok(BuildOutcome::Built(r));
        }

        let underlying = match node.type_ref.clone() {
            Some(t) => match self.build_type(&t)? {
                BuildOutcome::Built(u) => u,
                _ => self.int_ref(),
            },
            None => self.int_ref(),
        };

        // Values default left-to-right: first 0, then predecessor + 1.
        let mut enumerators = Vec::with_capacity(node.enumerators.len());
        let mut next = 0i64;
        for raw in &node.enumerators {
            let value = raw.value.unwrap_or(next);
            enumerators.push(Enumerator {
                name: raw.name.clone(),
                value,
            });
            next = value + 1;
        }

        let name = node.name.clone().map(|n| {
            let scope = self.scopes.scope_of(&self.index, &mut self.graph, node);
            ScopedName::new(scope, n)
        });
        self.graph.assign(
            r,
            TypeNode::Enum(EnumType {
                name,
                underlying,
                is_scoped: node.flags.contains(RawNodeFlags::SCOPED_ENUM),
                enumerators,
                source: node.source(),
            }),
        );
        Ok(BuildOutcome::Built(r))
    }

    fn build_constant(&mut self, node: &RawNode) -> Result<BuildOutcome, GraphError> {
        // Plain variables without a literal initializer are not constants.
        let Some(value) = node.value.clone() else {
            return Ok(BuildOutcome::Missing);
        };
        let display = node.name.clone().unwrap_or_else(|| node.id.clone());
        if node.flags.contains(RawNodeFlags::INCOMPLETE) {
            self.graph.push_diagnostic(Diagnostic::new(
                DiagnosticKind::IncompleteDropped,
                display,
                "incomplete constant dropped",
            ));
            self.dropped.insert(node.id.clone());
            return Ok(BuildOutcome::Dropped);
        }
        let outcome = match node.type_ref.clone() {
            Some(t) => self.build_type(&t)?,
            None => BuildOutcome::Missing,
        };
        let ty = match outcome {
            BuildOutcome::Built(t) => t,
            _ => {
                self.graph.push_diagnostic(Diagnostic::new(
                    DiagnosticKind::IncompleteDropped,
                    display,
                    "constant type did not resolve",
                ));
                self.dropped.insert(node.id.clone());
                return Ok(BuildOutcome::Dropped);
            }
        };

        let scope = self.scopes.scope_of(&self.index, &mut self.graph, node);
        let name = node.name.clone().unwrap_or_else(|| node.id.clone());
        let r = self.graph.intern(&node.id);
        self.graph.assign(
            r,
            TypeNode::Constant(ConstantType {
                name: ScopedName::new(scope, name),
                ty,
                value: match value {
                    RawLiteral::Int(v) => ConstValue::Int(v),
                    RawLiteral::Float(v) => ConstValue::Float(v),
                    RawLiteral::Str(v) => ConstValue::Str(v),
                },
                source: node.source(),
            }),
        );
        Ok(BuildOutcome::Built(r))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::RawEnumerator;

    fn tu() -> RawNode {
        RawNode::new("_tu", RawNodeKind::TranslationUnit)
    }

    fn int_node() -> RawNode {
        RawNode::new("_int", RawNodeKind::FundamentalType)
            .with_name("int")
            .with_size_align(4, 4)
    }

    fn set(nodes: Vec<RawNode>) -> RawNodeSet {
        RawNodeSet::new(Some("test.h".to_string()), nodes)
    }

    fn build(nodes: Vec<RawNode>) -> UnresolvedGraph {
        GraphBuilder::build(&set(nodes), &Config::default()).unwrap()
    }

    #[test]
    fn test_basic_struct() {
        let graph = build(vec![
            tu(),
            int_node(),
            RawNode::new("_f1", RawNodeKind::Field)
                .with_name("i")
                .with_type("_int"),
            RawNode::new("_a", RawNodeKind::Struct)
                .with_name("A")
                .with_context("_tu")
                .with_members(vec!["_f1".to_string()]),
        ]);
        let r = graph.lookup("_a").unwrap();
        let TypeNode::Record(rec) = graph.resolve(r).unwrap() else {
            panic!("expected record");
        };
        assert_eq!(rec.fields.len(), 1);
        assert_eq!(rec.fields[0].name.as_deref(), Some("i"));
        let TypeNode::Scalar(s) = graph.resolve(rec.fields[0].ty).unwrap() else {
            panic!("expected scalar field type");
        };
        assert_eq!(s.name, "int32_t");
        assert!(s.is_signed);
        assert_eq!(graph.roots().len(), 1);
    }

    #[test]
    fn test_unsigned_normalization() {
        let graph = build(vec![
            tu(),
            RawNode::new("_ull", RawNodeKind::FundamentalType)
                .with_name("unsigned long long")
                .with_size_align(8, 8),
            RawNode::new("_f", RawNodeKind::Field)
                .with_name("v")
                .with_type("_ull"),
            RawNode::new("_s", RawNodeKind::Struct)
                .with_name("S")
                .with_context("_tu")
                .with_members(vec!["_f".to_string()]),
        ]);
        let r = graph.lookup("_s").unwrap();
        let rec = graph.resolve(r).unwrap().as_record().unwrap();
        let TypeNode::Scalar(s) = graph.resolve(rec.fields[0].ty).unwrap() else {
            panic!("expected scalar");
        };
        assert_eq!(s.name, "uint64_t");
        assert!(!s.is_signed);
    }

    #[test]
    fn test_fixed_width_typedef_is_terminal_leaf() {
        let graph = build(vec![
            tu(),
            int_node(),
            RawNode::new("_td", RawNodeKind::Typedef)
                .with_name("__uint32_t")
                .with_context("_tu")
                .with_type("_int"),
        ]);
        let r = graph.lookup("_td").unwrap();
        let TypeNode::Scalar(s) = graph.resolve(r).unwrap() else {
            panic!("fixed-width alias should collapse to a scalar leaf");
        };
        assert_eq!(s.name, "uint32_t");
        // Terminal leaves are not re-emitted as typedef roots.
        assert!(graph.roots().is_empty());
    }

    #[test]
    fn test_elaborated_follows_definition() {
        let graph = build(vec![
            tu(),
            int_node(),
            RawNode::new("_fx", RawNodeKind::Field)
                .with_name("x")
                .with_type("_int"),
            RawNode::new("_def", RawNodeKind::Struct)
                .with_name("Fwd")
                .with_context("_tu")
                .with_members(vec!["_fx".to_string()]),
            RawNode::new("_elab", RawNodeKind::Elaborated).with_refers_to("_def"),
            RawNode::new("_fy", RawNodeKind::Field)
                .with_name("fwd")
                .with_type("_elab"),
            RawNode::new("_user", RawNodeKind::Struct)
                .with_name("User")
                .with_context("_tu")
                .with_members(vec!["_fy".to_string()]),
        ]);
        let def = graph.lookup("_def").unwrap();
        let via_elab = graph.lookup("_elab").unwrap();
        assert_eq!(def, via_elab, "elaborated id must alias the definition");
        let user = graph.lookup("_user").unwrap();
        let rec = graph.resolve(user).unwrap().as_record().unwrap();
        assert_eq!(rec.fields[0].ty, def);
    }

    #[test]
    fn test_non_pod_excluded_and_record_degrades() {
        let graph = build(vec![
            tu(),
            int_node(),
            RawNode::new("_virt", RawNodeKind::Class)
                .with_name("Virt")
                .with_context("_tu")
                .with_flags(RawNodeFlags::HAS_VTABLE),
            RawNode::new("_f", RawNodeKind::Field)
                .with_name("v")
                .with_type("_virt"),
            RawNode::new("_fi", RawNodeKind::Field)
                .with_name("i")
                .with_type("_int"),
            RawNode::new("_holder", RawNodeKind::Struct)
                .with_name("Holder")
                .with_context("_tu")
                .with_members(vec!["_f".to_string(), "_fi".to_string()]),
        ]);
        assert!(graph.lookup("_virt").is_none());
        assert_eq!(graph.count_diagnostics(DiagnosticKind::Excluded), 1);
        let holder = graph.lookup("_holder").unwrap();
        let rec = graph.resolve(holder).unwrap().as_record().unwrap();
        assert_eq!(rec.status, RecordStatus::Partial);
        assert_eq!(rec.fields.len(), 1);
        assert_eq!(rec.fields[0].name.as_deref(), Some("i"));
    }

    #[test]
    fn test_incomplete_record_dropped_silently() {
        let graph = build(vec![
            tu(),
            RawNode::new("_fwd", RawNodeKind::Struct)
                .with_name("OnlyDeclared")
                .with_context("_tu")
                .with_flags(RawNodeFlags::INCOMPLETE),
        ]);
        assert!(graph.lookup("_fwd").is_none());
        assert_eq!(graph.count_diagnostics(DiagnosticKind::IncompleteDropped), 1);
        assert!(graph.roots().is_empty());
    }

    #[test]
    fn test_enum_value_defaulting() {
        let graph = build(vec![
            tu(),
            int_node(),
            RawNode::new("_e", RawNodeKind::Enum)
                .with_name("Mode")
                .with_context("_tu")
                .with_type("_int")
                .with_enumerators(vec![
                    RawEnumerator {
                        name: "First".to_string(),
                        value: None,
                    },
                    RawEnumerator {
                        name: "Jump".to_string(),
                        value: Some(5),
                    },
                    RawEnumerator {
                        name: "Next".to_string(),
                        value: None,
                    },
                ]),
        ]);
        let r = graph.lookup("_e").unwrap();
        let TypeNode::Enum(e) = graph.resolve(r).unwrap() else {
            panic!("expected enum");
        };
        let values: Vec<i64> = e.enumerators.iter().map(|v| v.value).collect();
        assert_eq!(values, vec![0, 5, 6]);
    }

    #[test]
    fn test_constant_from_variable() {
        let graph = build(vec![
            tu(),
            int_node(),
            RawNode::new("_c", RawNodeKind::Variable)
                .with_name("MAX_SLOTS")
                .with_context("_tu")
                .with_type("_int")
                .with_value(RawLiteral::Int(64))
                .with_source("game.h", 12),
        ]);
        let r = graph.lookup("_c").unwrap();
        let TypeNode::Constant(c) = graph.resolve(r).unwrap() else {
            panic!("expected constant");
        };
        assert_eq!(c.name.fullname(), "MAX_SLOTS");
        assert_eq!(c.value, ConstValue::Int(64));
        assert_eq!(c.source.as_deref(), Some("game.h:12"));
        assert_eq!(graph.roots().len(), 1);
    }

    #[test]
    fn test_variable_without_literal_is_not_a_constant() {
        let graph = build(vec![
            tu(),
            int_node(),
            RawNode::new("_v", RawNodeKind::Variable)
                .with_name("global_state")
                .with_context("_tu")
                .with_type("_int"),
        ]);
        assert!(graph.lookup("_v").is_none());
        assert!(graph.roots().is_empty());
    }

    #[test]
    fn test_pointer_to_unknown_degrades_to_void() {
        let graph = build(vec![
            tu(),
            RawNode::new("_p", RawNodeKind::Pointer).with_type("_nowhere"),
            RawNode::new("_f", RawNodeKind::Field)
                .with_name("p")
                .with_type("_p"),
            RawNode::new("_s", RawNodeKind::Struct)
                .with_name("S")
                .with_context("_tu")
                .with_members(vec!["_f".to_string()]),
        ]);
        let s = graph.lookup("_s").unwrap();
        let rec = graph.resolve(s).unwrap().as_record().unwrap();
        let TypeNode::Pointer(p) = graph.resolve(rec.fields[0].ty).unwrap() else {
            panic!("expected pointer");
        };
        let TypeNode::Scalar(void) = graph.resolve(p.pointee).unwrap() else {
            panic!("expected void pointee");
        };
        assert_eq!(void.name, "void");
    }

    #[test]
    fn test_function_pointer_collapse() {
        let graph = build(vec![
            tu(),
            int_node(),
            RawNode::new("_fn", RawNodeKind::FunctionType)
                .with_type("_int")
                .with_params(vec!["_int".to_string(), "_int".to_string()]),
            RawNode::new("_pfn", RawNodeKind::Pointer).with_type("_fn"),
            RawNode::new("_f", RawNodeKind::Field)
                .with_name("callback")
                .with_type("_pfn"),
            RawNode::new("_s", RawNodeKind::Struct)
                .with_name("S")
                .with_context("_tu")
                .with_members(vec!["_f".to_string()]),
        ]);
        let s = graph.lookup("_s").unwrap();
        let rec = graph.resolve(s).unwrap().as_record().unwrap();
        let TypeNode::FunctionPointer(fp) = graph.resolve(rec.fields[0].ty).unwrap() else {
            panic!("pointer over a function type must collapse");
        };
        assert_eq!(fp.params.len(), 2);
    }

    #[test]
    fn test_duplicate_raw_id_rejected() {
        let result = GraphBuilder::build(
            &set(vec![tu(), int_node(), int_node()]),
            &Config::default(),
        );
        assert!(matches!(result, Err(GraphError::DuplicateRawId(_))));
    }

    #[test]
    fn test_anonymous_record_stays_distinct_node() {
        let graph = build(vec![
            tu(),
            int_node(),
            RawNode::new("_fx", RawNodeKind::Field)
                .with_name("x")
                .with_type("_int"),
            RawNode::new("_anon", RawNodeKind::Struct)
                .with_context("_tu")
                .with_members(vec!["_fx".to_string()]),
            RawNode::new("_fa", RawNodeKind::Field)
                .with_name("inner")
                .with_type("_anon"),
            RawNode::new("_outer", RawNodeKind::Struct)
                .with_name("Outer")
                .with_context("_tu")
                .with_members(vec!["_fa".to_string()]),
        ]);
        let anon = graph.lookup("_anon").unwrap();
        let rec = graph.resolve(anon).unwrap().as_record().unwrap();
        assert!(rec.is_anonymous());
        // Anonymous records never enter the root list.
        assert_eq!(graph.roots().len(), 1);
    }
}
