//! C# language support.

use super::{
    has_word, put_flag, put_list, put_text, visibility_in, CallRule, LanguageSupport, Metadata,
    NameRule, NodeContext, NodeRule, SymbolDraft,
};
use crate::types::{meta, Language, SymbolKind, Visibility};

static RULES: &[NodeRule] = &[
    NodeRule::named("namespace_declaration", SymbolKind::Module, "namespace"),
    NodeRule::named("file_scoped_namespace_declaration", SymbolKind::Module, "namespace"),
    NodeRule::new(
        "using_directive",
        SymbolKind::Import,
        NameRule::ChildKinds(&["qualified_name", "identifier"]),
        "using",
    ),
    NodeRule::named("class_declaration", SymbolKind::Class, "class"),
    NodeRule::named("struct_declaration", SymbolKind::Class, "struct"),
    NodeRule::named("interface_declaration", SymbolKind::Class, "interface"),
    NodeRule::named("enum_declaration", SymbolKind::Class, "enum"),
    NodeRule::named("record_declaration", SymbolKind::Class, "record"),
    NodeRule::named("method_declaration", SymbolKind::Function, "method"),
    NodeRule::named("constructor_declaration", SymbolKind::Function, "constructor"),
    NodeRule::named("local_function_statement", SymbolKind::Function, "local function"),
    NodeRule::new(
        "field_declaration",
        SymbolKind::Variable,
        NameRule::KindPath(&["variable_declaration", "variable_declarator", "identifier"]),
        "field",
    ),
    NodeRule::named("property_declaration", SymbolKind::Variable, "property"),
    NodeRule::named("enum_member_declaration", SymbolKind::Variable, "enum member"),
];

static CALLS: &[CallRule] = &[
    CallRule::call("invocation_expression", "function"),
    CallRule::construct("object_creation_expression", "type"),
];

/// C# language support implementation.
pub struct CSharpLanguage;

impl LanguageSupport for CSharpLanguage {
    fn language(&self) -> Language {
        Language::CSharp
    }

    fn tree_sitter_language(&self) -> tree_sitter::Language {
        tree_sitter_c_sharp::LANGUAGE.into()
    }

    fn rules(&self) -> &'static [NodeRule] {
        RULES
    }

    fn call_rules(&self) -> &'static [CallRule] {
        CALLS
    }

    fn visibility(&self, cx: &NodeContext<'_>, _name: &str) -> Option<Visibility> {
        visibility_in(&modifiers(cx))
    }

    fn metadata(&self, cx: &NodeContext<'_>, draft: &SymbolDraft, meta: &mut Metadata) {
        let modifiers = modifiers(cx);
        put_flag(meta, meta::STATIC, has_word(&modifiers, "static"));
        put_flag(meta, meta::ASYNC, has_word(&modifiers, "async"));

        let attributes = cx
            .node
            .children
            .iter()
            .filter(|c| c.kind == "attribute_list")
            .map(|a| cx.text(a).trim_matches(['[', ']']).trim().to_string())
            .collect();
        put_list(meta, meta::DECORATORS, attributes);

        if draft.kind.is_callable() {
            if let Some(rt) = cx.field_text("returns").or_else(|| cx.field_text("type")) {
                put_text(meta, meta::RETURN_TYPE, rt);
            }
        }
    }
}

/// Space-joined text of the declaration's own `modifier` children.
fn modifiers(cx: &NodeContext<'_>) -> String {
    cx.node
        .children
        .iter()
        .filter(|c| c.kind == "modifier")
        .map(|m| cx.text(m))
        .collect::<Vec<_>>()
        .join(" ")
}
