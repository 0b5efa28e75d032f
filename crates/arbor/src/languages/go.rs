//! Go language support.
//!
//! Exported identifiers (leading uppercase letter) are public; everything
//! else is package-internal.

use super::{
    put_text, CallRule, LanguageSupport, Metadata, NameRule, NodeContext, NodeRule, SymbolDraft,
};
use crate::types::{meta, Language, SymbolKind, Visibility};

static RULES: &[NodeRule] = &[
    NodeRule::new(
        "package_clause",
        SymbolKind::Module,
        NameRule::ChildKinds(&["package_identifier"]),
        "package",
    ),
    NodeRule::new(
        "import_spec",
        SymbolKind::Import,
        NameRule::ImportPath(Some("path")),
        "import",
    ),
    NodeRule::named("function_declaration", SymbolKind::Function, "func"),
    NodeRule::named("method_declaration", SymbolKind::Method, "func"),
    NodeRule::named("type_spec", SymbolKind::Class, "type"),
    NodeRule::named("type_alias", SymbolKind::Class, "type alias"),
    NodeRule::named("method_elem", SymbolKind::Function, "method"),
    NodeRule::named("method_spec", SymbolKind::Function, "method"),
    NodeRule::named("field_declaration", SymbolKind::Variable, "field"),
    NodeRule::named("const_spec", SymbolKind::Variable, "const"),
    NodeRule::named("var_spec", SymbolKind::Variable, "var"),
];

static CALLS: &[CallRule] = &[
    CallRule::call("call_expression", "function"),
    CallRule::construct("composite_literal", "type"),
];

/// Go language support implementation.
pub struct GoLanguage;

impl LanguageSupport for GoLanguage {
    fn language(&self) -> Language {
        Language::Go
    }

    fn tree_sitter_language(&self) -> tree_sitter::Language {
        tree_sitter_go::LANGUAGE.into()
    }

    fn rules(&self) -> &'static [NodeRule] {
        RULES
    }

    fn call_rules(&self) -> &'static [CallRule] {
        CALLS
    }

    fn refine(&self, cx: &NodeContext<'_>, draft: &mut SymbolDraft) {
        if cx.node.kind != "type_spec" {
            return;
        }
        match cx.node.child_by_field("type").map(|t| t.kind) {
            Some("struct_type") => draft.keyword = "struct",
            Some("interface_type") => draft.keyword = "interface",
            _ => {}
        }
    }

    fn visibility(&self, cx: &NodeContext<'_>, name: &str) -> Option<Visibility> {
        if cx.node.kind == "package_clause" {
            return None;
        }
        let exported = name.chars().next().is_some_and(char::is_uppercase);
        Some(if exported {
            Visibility::Public
        } else {
            Visibility::Internal
        })
    }

    fn parameters(&self, cx: &NodeContext<'_>) -> Vec<String> {
        // `a, b int` declares several names in one parameter_declaration.
        let Some(list) = cx.node.child_by_field("parameters") else {
            return Vec::new();
        };
        list.named_children()
            .flat_map(|decl| decl.children_by_field("name"))
            .map(|name| cx.text(name).to_string())
            .collect()
    }

    fn metadata(&self, cx: &NodeContext<'_>, draft: &SymbolDraft, meta: &mut Metadata) {
        if !draft.kind.is_callable() {
            return;
        }
        if let Some(result) = cx.field_text("result") {
            put_text(meta, meta::RETURN_TYPE, result);
        }
        let receiver_type = cx
            .node
            .child_by_field("receiver")
            .and_then(|r| r.named_children().next())
            .and_then(|decl| decl.child_by_field("type"));
        if let Some(ty) = receiver_type {
            put_text(meta, meta::RECEIVER, cx.text(ty).trim_start_matches('*'));
        }
    }
}
