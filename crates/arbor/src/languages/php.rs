//! PHP language support.
//!
//! Variable names are reported without the leading `$`. Class members without
//! a visibility modifier are public.

use super::{
    put_flag, put_text, visibility_keyword, CallRule, Callee, LanguageSupport, Metadata,
    NameRule, NodeContext, NodeRule, SymbolDraft,
};
use crate::types::{meta, Language, ReferenceKind, SymbolKind, Visibility};

static RULES: &[NodeRule] = &[
    NodeRule::named("namespace_definition", SymbolKind::Module, "namespace"),
    NodeRule::named("class_declaration", SymbolKind::Class, "class"),
    NodeRule::named("interface_declaration", SymbolKind::Class, "interface"),
    NodeRule::named("trait_declaration", SymbolKind::Class, "trait"),
    NodeRule::named("enum_declaration", SymbolKind::Class, "enum"),
    NodeRule::named("function_definition", SymbolKind::Function, "function"),
    NodeRule::named("method_declaration", SymbolKind::Function, "function"),
    NodeRule::new(
        "property_declaration",
        SymbolKind::Variable,
        NameRule::KindPath(&["property_element", "variable_name", "name"]),
        "property",
    ),
    NodeRule::new(
        "const_declaration",
        SymbolKind::Variable,
        NameRule::KindPath(&["const_element", "name"]),
        "const",
    ),
    NodeRule::named("enum_case", SymbolKind::Variable, "case"),
    NodeRule::new(
        "namespace_use_declaration",
        SymbolKind::Import,
        NameRule::ChildKinds(&["namespace_use_clause"]),
        "use",
    ),
    NodeRule::new("include_expression", SymbolKind::Import, NameRule::ImportPath(None), "include"),
    NodeRule::new(
        "include_once_expression",
        SymbolKind::Import,
        NameRule::ImportPath(None),
        "include_once",
    ),
    NodeRule::new("require_expression", SymbolKind::Import, NameRule::ImportPath(None), "require"),
    NodeRule::new(
        "require_once_expression",
        SymbolKind::Import,
        NameRule::ImportPath(None),
        "require_once",
    ),
];

static CALLS: &[CallRule] = &[
    CallRule::call("function_call_expression", "function"),
    CallRule::call("member_call_expression", "name"),
    CallRule::call("nullsafe_member_call_expression", "name"),
    CallRule::call("scoped_call_expression", "name"),
    CallRule {
        kind: "object_creation_expression",
        callee: Callee::FirstNamedChild,
        reference: ReferenceKind::Construct,
    },
];

/// PHP language support implementation.
pub struct PhpLanguage;

impl LanguageSupport for PhpLanguage {
    fn language(&self) -> Language {
        Language::Php
    }

    fn tree_sitter_language(&self) -> tree_sitter::Language {
        tree_sitter_php::LANGUAGE_PHP.into()
    }

    fn rules(&self) -> &'static [NodeRule] {
        RULES
    }

    fn call_rules(&self) -> &'static [CallRule] {
        CALLS
    }

    fn visibility(&self, cx: &NodeContext<'_>, _name: &str) -> Option<Visibility> {
        if let Some(modifier) = cx.node.child_of_kind(&["visibility_modifier"]) {
            return visibility_keyword(cx.text(modifier).trim());
        }
        cx.parent
            .is_some_and(|p| p.kind == "declaration_list")
            .then_some(Visibility::Public)
    }

    fn metadata(&self, cx: &NodeContext<'_>, draft: &SymbolDraft, meta: &mut Metadata) {
        put_flag(meta, meta::STATIC, cx.has_token("static_modifier"));
        if draft.kind.is_callable() {
            if let Some(rt) = cx.field_text("return_type") {
                put_text(meta, meta::RETURN_TYPE, rt.trim_start_matches(':').trim());
            }
        }
    }
}
