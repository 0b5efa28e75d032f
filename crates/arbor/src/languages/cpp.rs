//! C++ language support.
//!
//! Names live at the bottom of declarator chains (`int *(*f)(int)`), so most
//! rules use [`NameRule::Declarator`]. A declaration whose chain contains a
//! `function_declarator` is a prototype and is reported as a function; a
//! definition named `Outer::name` is a method of `Outer`.

use super::{
    parameter_names, put_flag, put_text, visibility_in, CallRule, LanguageSupport, Metadata,
    NameRule, NodeContext, NodeRule, SymbolDraft,
};
use crate::syntax::SyntaxNode;
use crate::types::{meta, Language, SymbolKind, Visibility};

static RULES: &[NodeRule] = &[
    NodeRule::named("namespace_definition", SymbolKind::Module, "namespace"),
    NodeRule::named("class_specifier", SymbolKind::Class, "class").requiring("body"),
    NodeRule::named("struct_specifier", SymbolKind::Class, "struct").requiring("body"),
    NodeRule::named("union_specifier", SymbolKind::Class, "union").requiring("body"),
    NodeRule::named("enum_specifier", SymbolKind::Class, "enum").requiring("body"),
    NodeRule::new("type_definition", SymbolKind::Class, NameRule::Declarator, "typedef"),
    NodeRule::named("alias_declaration", SymbolKind::Class, "using"),
    NodeRule::new("function_definition", SymbolKind::Function, NameRule::Declarator, "function"),
    NodeRule::new("declaration", SymbolKind::Variable, NameRule::Declarator, "declaration"),
    NodeRule::new("field_declaration", SymbolKind::Variable, NameRule::Declarator, "field"),
    NodeRule::named("enumerator", SymbolKind::Variable, "enumerator"),
    NodeRule::new(
        "preproc_include",
        SymbolKind::Import,
        NameRule::ImportPath(Some("path")),
        "#include",
    ),
    NodeRule::new(
        "using_declaration",
        SymbolKind::Import,
        NameRule::ChildKinds(&["qualified_identifier", "identifier"]),
        "using",
    ),
];

static CALLS: &[CallRule] = &[
    CallRule::call("call_expression", "function"),
    CallRule::construct("new_expression", "type"),
];

/// C++ language support implementation.
pub struct CppLanguage;

impl LanguageSupport for CppLanguage {
    fn language(&self) -> Language {
        Language::Cpp
    }

    fn tree_sitter_language(&self) -> tree_sitter::Language {
        tree_sitter_cpp::LANGUAGE.into()
    }

    fn rules(&self) -> &'static [NodeRule] {
        RULES
    }

    fn call_rules(&self) -> &'static [CallRule] {
        CALLS
    }

    fn refine(&self, cx: &NodeContext<'_>, draft: &mut SymbolDraft) {
        if !matches!(
            cx.node.kind,
            "function_definition" | "declaration" | "field_declaration"
        ) {
            return;
        }
        if draft.kind == SymbolKind::Variable && function_declarator(cx.node).is_some() {
            draft.kind = SymbolKind::Function;
            draft.keyword = "prototype";
        }
        if draft.kind == SymbolKind::Function && receiver(cx.node).is_some() {
            draft.kind = SymbolKind::Method;
        }
    }

    fn visibility(&self, cx: &NodeContext<'_>, _name: &str) -> Option<Visibility> {
        // Access labels are siblings that precede the member in the class body.
        let body = cx.parent.filter(|p| p.kind == "field_declaration_list")?;
        body.children
            .iter()
            .take_while(|c| c.span.end_byte <= cx.node.span.start_byte)
            .filter(|c| c.kind == "access_specifier")
            .last()
            .and_then(|label| visibility_in(cx.text(label)))
    }

    fn parameters(&self, cx: &NodeContext<'_>) -> Vec<String> {
        function_declarator(cx.node)
            .and_then(|f| f.child_by_field("parameters"))
            .map(|list| parameter_names(list, cx.source))
            .unwrap_or_default()
    }

    fn metadata(&self, cx: &NodeContext<'_>, draft: &SymbolDraft, meta: &mut Metadata) {
        let is_static = cx
            .node
            .children
            .iter()
            .any(|c| c.kind == "storage_class_specifier" && cx.text(c) == "static");
        put_flag(meta, meta::STATIC, is_static);

        if draft.kind.is_callable() {
            if let Some(rt) = cx.field_text("type") {
                put_text(meta, meta::RETURN_TYPE, rt);
            }
            if let Some(scope) = receiver(cx.node) {
                put_text(meta, meta::RECEIVER, cx.text(scope));
            }
        }
    }
}

/// Nodes along the `declarator` chain below `node`.
fn declarator_chain(node: &SyntaxNode) -> impl Iterator<Item = &SyntaxNode> {
    std::iter::successors(node.child_by_field("declarator"), |d| {
        d.child_by_field("declarator")
    })
    .take(32)
}

fn function_declarator(node: &SyntaxNode) -> Option<&SyntaxNode> {
    declarator_chain(node).find(|d| d.kind == "function_declarator")
}

/// The `Outer` in `Outer::name(...)`, for out-of-line member definitions.
fn receiver(node: &SyntaxNode) -> Option<&SyntaxNode> {
    function_declarator(node)?
        .child_by_field("declarator")
        .filter(|d| d.kind == "qualified_identifier")?
        .child_by_field("scope")
}
