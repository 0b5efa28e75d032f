//! Rust language support.
//!
//! `impl` blocks are class-like containers named after the implementing type
//! (generic arguments dropped), so their functions become methods. The
//! implemented trait, if any, is recorded as metadata.

use super::{
    has_word, put_flag, put_list, put_text, CallRule, LanguageSupport, Metadata, NameRule,
    NodeContext, NodeRule, SymbolDraft,
};
use crate::types::{meta, Language, SymbolKind, Visibility};

static RULES: &[NodeRule] = &[
    NodeRule::named("mod_item", SymbolKind::Module, "mod"),
    NodeRule::named("struct_item", SymbolKind::Class, "struct"),
    NodeRule::named("enum_item", SymbolKind::Class, "enum"),
    NodeRule::named("union_item", SymbolKind::Class, "union"),
    NodeRule::named("trait_item", SymbolKind::Class, "trait"),
    NodeRule::named("type_item", SymbolKind::Class, "type"),
    NodeRule::new("impl_item", SymbolKind::Class, NameRule::Field("type"), "impl"),
    NodeRule::named("function_item", SymbolKind::Function, "fn"),
    NodeRule::named("function_signature_item", SymbolKind::Function, "fn"),
    NodeRule::named("macro_definition", SymbolKind::Function, "macro_rules!"),
    NodeRule::named("field_declaration", SymbolKind::Variable, "field"),
    NodeRule::named("enum_variant", SymbolKind::Variable, "variant"),
    NodeRule::named("const_item", SymbolKind::Variable, "const"),
    NodeRule::named("static_item", SymbolKind::Variable, "static"),
    NodeRule::new(
        "use_declaration",
        SymbolKind::Import,
        NameRule::ImportPath(Some("argument")),
        "use",
    ),
    NodeRule::named("extern_crate_declaration", SymbolKind::Import, "extern crate"),
];

static CALLS: &[CallRule] = &[
    CallRule::call("call_expression", "function"),
    CallRule::call("macro_invocation", "macro"),
    CallRule::construct("struct_expression", "name"),
];

/// Kinds that carry no visibility of their own.
const INHERITED_VISIBILITY: &[&str] = &[
    "impl_item",
    "enum_variant",
    "function_signature_item",
    "macro_definition",
];

/// Rust language support implementation.
pub struct RustLanguage;

impl LanguageSupport for RustLanguage {
    fn language(&self) -> Language {
        Language::Rust
    }

    fn tree_sitter_language(&self) -> tree_sitter::Language {
        tree_sitter_rust::LANGUAGE.into()
    }

    fn rules(&self) -> &'static [NodeRule] {
        RULES
    }

    fn call_rules(&self) -> &'static [CallRule] {
        CALLS
    }

    fn refine(&self, cx: &NodeContext<'_>, draft: &mut SymbolDraft) {
        if cx.node.kind == "impl_item" {
            if let Some(base) = draft.name.split('<').next() {
                draft.name = base.trim().to_string();
            }
        }
    }

    fn visibility(&self, cx: &NodeContext<'_>, _name: &str) -> Option<Visibility> {
        if let Some(modifier) = cx.node.child_of_kind(&["visibility_modifier"]) {
            let text = cx.text(modifier);
            return Some(if text == "pub" {
                Visibility::Public
            } else {
                Visibility::Internal
            });
        }
        (!INHERITED_VISIBILITY.contains(&cx.node.kind)).then_some(Visibility::Private)
    }

    fn metadata(&self, cx: &NodeContext<'_>, draft: &SymbolDraft, meta: &mut Metadata) {
        if let Some(implemented) = cx.field_text("trait") {
            put_text(meta, meta::TRAIT, implemented);
        }
        if draft.kind.is_callable() {
            if let Some(rt) = cx.field_text("return_type") {
                put_text(meta, meta::RETURN_TYPE, rt);
            }
            let is_async = cx
                .node
                .child_of_kind(&["function_modifiers"])
                .is_some_and(|m| has_word(cx.text(m), "async"));
            put_flag(meta, meta::ASYNC, is_async);
        }
        put_list(meta, meta::DECORATORS, attributes(cx));
    }
}

/// `#[...]` attributes directly preceding the item, outermost first.
fn attributes(cx: &NodeContext<'_>) -> Vec<String> {
    let Some(parent) = cx.parent else {
        return Vec::new();
    };
    let preceding: Vec<_> = parent
        .children
        .iter()
        .take_while(|c| c.span.start_byte < cx.node.span.start_byte)
        .collect();
    let mut attrs: Vec<String> = preceding
        .iter()
        .rev()
        .take_while(|c| c.kind == "attribute_item")
        .map(|a| {
            cx.text(a)
                .trim_start_matches("#[")
                .trim_end_matches(']')
                .trim()
                .to_string()
        })
        .collect();
    attrs.reverse();
    attrs
}
