//! JavaScript language support.
//!
//! Also hosts the helpers TypeScript reuses: a `const f = () => {}` binding
//! is reported as a function, and `#name` members are private.

use super::{
    parameter_list, parameter_names, put_flag, put_list, CallRule, LanguageSupport, Metadata,
    NameRule, NodeContext, NodeRule, SymbolDraft,
};
use crate::syntax::SyntaxNode;
use crate::types::{meta, Language, SymbolKind, Visibility};

/// Value kinds that make a variable binding a function definition.
const FUNCTION_VALUES: &[&str] = &[
    "arrow_function",
    "function_expression",
    "function",
    "generator_function",
];

static RULES: &[NodeRule] = &[
    NodeRule::named("class_declaration", SymbolKind::Class, "class"),
    NodeRule::named("class", SymbolKind::Class, "class"),
    NodeRule::named("function_declaration", SymbolKind::Function, "function"),
    NodeRule::named("generator_function_declaration", SymbolKind::Function, "function*"),
    NodeRule::named("method_definition", SymbolKind::Function, "method"),
    NodeRule::new(
        "field_definition",
        SymbolKind::Variable,
        NameRule::Field("property"),
        "field",
    ),
    VARIABLE_DECLARATOR,
    IMPORT_STATEMENT,
];

pub(super) const VARIABLE_DECLARATOR: NodeRule = NodeRule::new(
    "variable_declarator",
    SymbolKind::Variable,
    NameRule::FieldOfKind("name", &["identifier"]),
    "var",
);

pub(super) const IMPORT_STATEMENT: NodeRule = NodeRule::new(
    "import_statement",
    SymbolKind::Import,
    NameRule::ImportPath(Some("source")),
    "import",
);

pub(super) static CALLS: &[CallRule] = &[
    CallRule::call("call_expression", "function"),
    CallRule::construct("new_expression", "constructor"),
];

/// JavaScript language support implementation.
pub struct JavaScriptLanguage;

impl LanguageSupport for JavaScriptLanguage {
    fn language(&self) -> Language {
        Language::JavaScript
    }

    fn tree_sitter_language(&self) -> tree_sitter::Language {
        tree_sitter_javascript::LANGUAGE.into()
    }

    fn rules(&self) -> &'static [NodeRule] {
        RULES
    }

    fn call_rules(&self) -> &'static [CallRule] {
        CALLS
    }

    fn refine(&self, cx: &NodeContext<'_>, draft: &mut SymbolDraft) {
        refine_binding(cx, draft);
    }

    fn visibility(&self, _cx: &NodeContext<'_>, name: &str) -> Option<Visibility> {
        name.starts_with('#').then_some(Visibility::Private)
    }

    fn parameters(&self, cx: &NodeContext<'_>) -> Vec<String> {
        binding_parameters(cx)
    }

    fn metadata(&self, cx: &NodeContext<'_>, _draft: &SymbolDraft, meta: &mut Metadata) {
        common_metadata(cx, meta);
    }
}

/// The function value bound by a variable declarator, if any.
pub(super) fn bound_function(node: &SyntaxNode) -> Option<&SyntaxNode> {
    if node.kind != "variable_declarator" {
        return None;
    }
    node.child_by_field("value")
        .filter(|v| FUNCTION_VALUES.contains(&v.kind))
}

/// Turn function-valued bindings into functions and record `const`/`let`/`var`.
pub(super) fn refine_binding(cx: &NodeContext<'_>, draft: &mut SymbolDraft) {
    if cx.node.kind != "variable_declarator" {
        return;
    }
    if let Some(keyword) = cx
        .parent
        .filter(|p| matches!(p.kind, "lexical_declaration" | "variable_declaration"))
        .and_then(|p| p.children.first())
    {
        draft.keyword = keyword.kind;
    }
    if bound_function(cx.node).is_some() {
        draft.kind = SymbolKind::Function;
    }
}

/// Parameters of a callable, looking through function-valued bindings.
pub(super) fn binding_parameters(cx: &NodeContext<'_>) -> Vec<String> {
    let callable = bound_function(cx.node).unwrap_or(cx.node);
    if let Some(list) = parameter_list(callable) {
        return parameter_names(list, cx.source);
    }
    // Single bare parameter: `x => x * 2`
    callable
        .child_by_field("parameter")
        .map(|p| vec![cx.text(p).to_string()])
        .unwrap_or_default()
}

/// `async`, `static`, and decorator metadata shared with TypeScript.
pub(super) fn common_metadata(cx: &NodeContext<'_>, meta: &mut Metadata) {
    let callable = bound_function(cx.node).unwrap_or(cx.node);
    put_flag(meta, meta::ASYNC, callable.has_child_kind("async"));
    put_flag(meta, meta::STATIC, cx.has_token("static"));

    let decorators = cx
        .node
        .children
        .iter()
        .filter(|c| c.kind == "decorator")
        .map(|d| cx.text(d).trim_start_matches('@').trim().to_string())
        .collect();
    put_list(meta, meta::DECORATORS, decorators);
}
