//! Java language support.

use super::{
    has_word, put_flag, put_list, put_text, visibility_in, CallRule, LanguageSupport, Metadata,
    NameRule, NodeContext, NodeRule, SymbolDraft,
};
use crate::types::{meta, Language, SymbolKind, Visibility};

const QUALIFIED: NameRule = NameRule::ChildKinds(&["scoped_identifier", "identifier"]);

static RULES: &[NodeRule] = &[
    NodeRule::new("package_declaration", SymbolKind::Module, QUALIFIED, "package"),
    NodeRule::new("import_declaration", SymbolKind::Import, QUALIFIED, "import"),
    NodeRule::named("class_declaration", SymbolKind::Class, "class"),
    NodeRule::named("interface_declaration", SymbolKind::Class, "interface"),
    NodeRule::named("enum_declaration", SymbolKind::Class, "enum"),
    NodeRule::named("record_declaration", SymbolKind::Class, "record"),
    NodeRule::named("annotation_type_declaration", SymbolKind::Class, "@interface"),
    NodeRule::named("method_declaration", SymbolKind::Function, "method"),
    NodeRule::named("constructor_declaration", SymbolKind::Function, "constructor"),
    NodeRule::new(
        "field_declaration",
        SymbolKind::Variable,
        NameRule::FieldPath(&["declarator", "name"]),
        "field",
    ),
    NodeRule::new(
        "constant_declaration",
        SymbolKind::Variable,
        NameRule::FieldPath(&["declarator", "name"]),
        "constant",
    ),
    NodeRule::named("enum_constant", SymbolKind::Variable, "enum constant"),
];

static CALLS: &[CallRule] = &[
    CallRule::call("method_invocation", "name"),
    CallRule::construct("object_creation_expression", "type"),
];

/// Java language support implementation.
pub struct JavaLanguage;

impl LanguageSupport for JavaLanguage {
    fn language(&self) -> Language {
        Language::Java
    }

    fn tree_sitter_language(&self) -> tree_sitter::Language {
        tree_sitter_java::LANGUAGE.into()
    }

    fn rules(&self) -> &'static [NodeRule] {
        RULES
    }

    fn call_rules(&self) -> &'static [CallRule] {
        CALLS
    }

    fn visibility(&self, cx: &NodeContext<'_>, _name: &str) -> Option<Visibility> {
        cx.node
            .child_of_kind(&["modifiers"])
            .and_then(|m| visibility_in(cx.text(m)))
    }

    fn metadata(&self, cx: &NodeContext<'_>, draft: &SymbolDraft, meta: &mut Metadata) {
        if let Some(modifiers) = cx.node.child_of_kind(&["modifiers"]) {
            put_flag(meta, meta::STATIC, has_word(cx.text(modifiers), "static"));
            let annotations = modifiers
                .named_children()
                .filter(|c| matches!(c.kind, "marker_annotation" | "annotation"))
                .map(|a| cx.text(a).trim_start_matches('@').to_string())
                .collect();
            put_list(meta, meta::DECORATORS, annotations);
        }
        if draft.kind.is_callable() {
            if let Some(rt) = cx.field_text("type") {
                put_text(meta, meta::RETURN_TYPE, rt);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{find, outline, shape};
    use crate::types::{meta, Language, SymbolKind};

    const SOURCE: &str = r"package com.example.store;

import java.util.List;

@Service
public class OrderService {
    private static final int LIMIT = 10;
    private final Repository repo;

    public OrderService(Repository repo) {
        this.repo = repo;
    }

    public List<Order> findAll(String customer, int page) {
        int offset = page * LIMIT;
        return repo.query(customer, offset);
    }

    enum Status { OPEN, CLOSED }
}

interface Repository {
    List<Order> query(String customer, int offset);
}
";

    #[test]
    fn extracts_types_members_and_package() {
        let outline = outline(Language::Java, SOURCE);

        let expected = vec![
            ("com.example.store".to_string(), SymbolKind::Module),
            ("java.util.List".to_string(), SymbolKind::Import),
            ("OrderService".to_string(), SymbolKind::Class),
            ("LIMIT".to_string(), SymbolKind::Field),
            ("repo".to_string(), SymbolKind::Field),
            ("OrderService".to_string(), SymbolKind::Method),
            ("findAll".to_string(), SymbolKind::Method),
            ("Status".to_string(), SymbolKind::Class),
            ("OPEN".to_string(), SymbolKind::Field),
            ("CLOSED".to_string(), SymbolKind::Field),
            ("Repository".to_string(), SymbolKind::Class),
            ("query".to_string(), SymbolKind::Method),
        ];
        assert_eq!(shape(&outline), expected);
    }

    #[test]
    fn modifiers_become_metadata() {
        let outline = outline(Language::Java, SOURCE);

        let limit = find(&outline, "LIMIT");
        assert_eq!(limit.meta_text(meta::VISIBILITY), Some("private"));
        assert!(limit.meta_flag(meta::STATIC));
        assert_eq!(
            find(&outline, "OrderService").meta_list(meta::DECORATORS),
            ["Service"]
        );
    }

    #[test]
    fn methods_record_return_type_and_parameters() {
        let outline = outline(Language::Java, SOURCE);
        let find_all = find(&outline, "findAll");

        assert_eq!(find_all.meta_text(meta::RETURN_TYPE), Some("List<Order>"));
        assert_eq!(find_all.parameters(), ["customer", "page"]);
        assert_eq!(find_all.meta_text(meta::VISIBILITY), Some("public"));
    }

    #[test]
    fn method_invocations_are_references() {
        let outline = outline(Language::Java, SOURCE);
        let find_all = find(&outline, "findAll");

        let query = outline
            .references
            .iter()
            .find(|r| r.name == "query")
            .expect("should find repo.query call");
        assert_eq!(query.container, Some(find_all.id));
    }
}
