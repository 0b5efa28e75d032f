//! TypeScript and TSX language support.
//!
//! Both grammars share one rule table. Interfaces, enums, and type aliases
//! are class-like symbols distinguished by their `keyword`.

use super::javascript::{
    binding_parameters, bound_function, common_metadata, refine_binding, CALLS,
    IMPORT_STATEMENT, VARIABLE_DECLARATOR,
};
use super::{
    put_text, visibility_keyword, CallRule, LanguageSupport, Metadata, NameRule, NodeContext,
    NodeRule, SymbolDraft,
};
use crate::types::{meta, Language, SymbolKind, Visibility};

static RULES: &[NodeRule] = &[
    NodeRule::named("class_declaration", SymbolKind::Class, "class"),
    NodeRule::named("abstract_class_declaration", SymbolKind::Class, "abstract class"),
    NodeRule::named("class", SymbolKind::Class, "class"),
    NodeRule::named("interface_declaration", SymbolKind::Class, "interface"),
    NodeRule::named("enum_declaration", SymbolKind::Class, "enum"),
    NodeRule::named("type_alias_declaration", SymbolKind::Class, "type"),
    NodeRule::named("internal_module", SymbolKind::Module, "namespace"),
    NodeRule::named("module", SymbolKind::Module, "module"),
    NodeRule::named("function_declaration", SymbolKind::Function, "function"),
    NodeRule::named("generator_function_declaration", SymbolKind::Function, "function*"),
    NodeRule::named("function_signature", SymbolKind::Function, "function"),
    NodeRule::named("method_definition", SymbolKind::Function, "method"),
    NodeRule::named("method_signature", SymbolKind::Function, "method"),
    NodeRule::named("abstract_method_signature", SymbolKind::Function, "abstract method"),
    NodeRule::named("public_field_definition", SymbolKind::Variable, "field"),
    NodeRule::new(
        "property_signature",
        SymbolKind::Variable,
        NameRule::Field("name"),
        "property",
    ),
    VARIABLE_DECLARATOR,
    IMPORT_STATEMENT,
];

/// TypeScript language support; one instance per grammar dialect.
pub struct TypeScriptLanguage {
    tsx: bool,
}

impl TypeScriptLanguage {
    /// Plain TypeScript (`.ts`).
    pub const TYPESCRIPT: Self = Self { tsx: false };

    /// TypeScript with JSX (`.tsx`).
    pub const TSX: Self = Self { tsx: true };
}

impl LanguageSupport for TypeScriptLanguage {
    fn language(&self) -> Language {
        if self.tsx {
            Language::Tsx
        } else {
            Language::TypeScript
        }
    }

    fn tree_sitter_language(&self) -> tree_sitter::Language {
        if self.tsx {
            tree_sitter_typescript::LANGUAGE_TSX.into()
        } else {
            tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into()
        }
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

    fn visibility(&self, cx: &NodeContext<'_>, name: &str) -> Option<Visibility> {
        if name.starts_with('#') {
            return Some(Visibility::Private);
        }
        cx.node
            .child_of_kind(&["accessibility_modifier"])
            .and_then(|m| visibility_keyword(cx.text(m).trim()))
    }

    fn parameters(&self, cx: &NodeContext<'_>) -> Vec<String> {
        binding_parameters(cx)
    }

    fn metadata(&self, cx: &NodeContext<'_>, draft: &SymbolDraft, meta: &mut Metadata) {
        common_metadata(cx, meta);
        if draft.kind.is_callable() {
            let callable = bound_function(cx.node).unwrap_or(cx.node);
            if let Some(rt) = callable.child_by_field("return_type") {
                put_text(meta, meta::RETURN_TYPE, cx.text(rt).trim_start_matches(':').trim());
            }
        }
    }
}
