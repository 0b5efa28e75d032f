//! Kotlin language support.
//!
//! Name rules accept both `identifier` and the older `simple_identifier`
//! node kinds so that either generation of the grammar resolves names.

use super::{
    has_word, put_flag, put_list, put_text, visibility_keyword, CallRule, Callee,
    LanguageSupport, Metadata, NameRule, NodeContext, NodeRule, SymbolDraft,
};
use crate::types::{meta, Language, ReferenceKind, SymbolKind, Visibility};

const DECLARED_NAME: NameRule = NameRule::Any(&[
    NameRule::Field("name"),
    NameRule::ChildKinds(&["type_identifier", "identifier", "simple_identifier"]),
]);

const PROPERTY_NAME: NameRule = NameRule::Any(&[
    NameRule::KindPath(&["variable_declaration", "identifier"]),
    NameRule::KindPath(&["variable_declaration", "simple_identifier"]),
    NameRule::ChildKinds(&["multi_variable_declaration"]),
]);

static RULES: &[NodeRule] = &[
    NodeRule::new("package_header", SymbolKind::Module, NameRule::ImportPath(None), "package"),
    NodeRule::new("import", SymbolKind::Import, NameRule::ImportPath(None), "import"),
    NodeRule::new("import_header", SymbolKind::Import, NameRule::ImportPath(None), "import"),
    NodeRule::new("class_declaration", SymbolKind::Class, DECLARED_NAME, "class"),
    NodeRule::new("object_declaration", SymbolKind::Class, DECLARED_NAME, "object"),
    NodeRule::new("companion_object", SymbolKind::Class, DECLARED_NAME, "companion object")
        .or_named("Companion"),
    NodeRule::new("function_declaration", SymbolKind::Function, DECLARED_NAME, "fun"),
    NodeRule::new("secondary_constructor", SymbolKind::Function, DECLARED_NAME, "constructor")
        .or_named("constructor"),
    NodeRule::new("property_declaration", SymbolKind::Variable, PROPERTY_NAME, "val"),
    NodeRule::new("enum_entry", SymbolKind::Variable, DECLARED_NAME, "enum entry"),
];

static CALLS: &[CallRule] = &[CallRule {
    kind: "call_expression",
    callee: Callee::FirstNamedChild,
    reference: ReferenceKind::Call,
}];

/// Kotlin language support implementation.
pub struct KotlinLanguage;

impl LanguageSupport for KotlinLanguage {
    fn language(&self) -> Language {
        Language::Kotlin
    }

    fn tree_sitter_language(&self) -> tree_sitter::Language {
        tree_sitter_kotlin_ng::LANGUAGE.into()
    }

    fn rules(&self) -> &'static [NodeRule] {
        RULES
    }

    fn call_rules(&self) -> &'static [CallRule] {
        CALLS
    }

    fn refine(&self, cx: &NodeContext<'_>, draft: &mut SymbolDraft) {
        match cx.node.kind {
            "property_declaration" if cx.has_token("var") => draft.keyword = "var",
            "class_declaration" if cx.has_token("interface") => draft.keyword = "interface",
            "class_declaration" if has_word(&modifier_text(cx), "enum") => draft.keyword = "enum class",
            "class_declaration" if has_word(&modifier_text(cx), "data") => draft.keyword = "data class",
            _ => {}
        }
    }

    fn visibility(&self, cx: &NodeContext<'_>, _name: &str) -> Option<Visibility> {
        if matches!(cx.node.kind, "package_header" | "enum_entry") {
            return None;
        }
        let explicit = modifier_text(cx)
            .split_whitespace()
            .find_map(visibility_keyword);
        Some(explicit.unwrap_or(Visibility::Public))
    }

    fn metadata(&self, cx: &NodeContext<'_>, draft: &SymbolDraft, meta: &mut Metadata) {
        let modifiers = modifier_text(cx);
        put_flag(meta, meta::ASYNC, has_word(&modifiers, "suspend"));

        let annotations = cx
            .node
            .child_of_kind(&["modifiers"])
            .map(|m| {
                m.named_children()
                    .filter(|c| c.kind == "annotation")
                    .map(|a| cx.text(a).trim_start_matches('@').trim().to_string())
                    .collect()
            })
            .unwrap_or_default();
        put_list(meta, meta::DECORATORS, annotations);

        if draft.kind.is_callable() {
            // The return type is the type node after the parameter list.
            let after_params = cx
                .node
                .children
                .iter()
                .skip_while(|c| c.kind != "function_value_parameters")
                .skip(1)
                .find(|c| c.is_named && c.kind.ends_with("type"));
            if let Some(rt) = after_params {
                put_text(meta, meta::RETURN_TYPE, cx.text(rt));
            }
        }
    }
}

fn modifier_text(cx: &NodeContext<'_>) -> String {
    cx.node
        .child_of_kind(&["modifiers"])
        .map(|m| cx.text(m).to_string())
        .unwrap_or_default()
}
