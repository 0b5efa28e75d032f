//! Ruby language support.
//!
//! `require`, `require_relative`, and `load` are plain method calls in the
//! grammar; they are promoted to imports by [`RubyLanguage::custom_symbol`].
//! Method visibility follows the last bare `private`/`protected`/`public`
//! call that precedes the definition in the class body.

use super::tree_sitter_utils::clean_import_path;
use super::{
    put_flag, visibility_keyword, CallRule, LanguageSupport, Metadata, NameRule, NodeContext,
    NodeRule, SymbolDraft,
};
use crate::types::{meta, Language, SymbolKind, Visibility};

static RULES: &[NodeRule] = &[
    NodeRule::named("module", SymbolKind::Module, "module"),
    NodeRule::named("class", SymbolKind::Class, "class"),
    NodeRule::new(
        "singleton_class",
        SymbolKind::Class,
        NameRule::Field("value"),
        "class <<",
    ),
    NodeRule::named("method", SymbolKind::Function, "def"),
    NodeRule::named("singleton_method", SymbolKind::Function, "def self"),
    NodeRule::new(
        "assignment",
        SymbolKind::Variable,
        NameRule::FieldOfKind("left", &["identifier", "constant"]),
        "assign",
    ),
];

static CALLS: &[CallRule] = &[CallRule::call("call", "method")];

/// Ruby language support implementation.
pub struct RubyLanguage;

impl LanguageSupport for RubyLanguage {
    fn language(&self) -> Language {
        Language::Ruby
    }

    fn tree_sitter_language(&self) -> tree_sitter::Language {
        tree_sitter_ruby::LANGUAGE.into()
    }

    fn rules(&self) -> &'static [NodeRule] {
        RULES
    }

    fn call_rules(&self) -> &'static [CallRule] {
        CALLS
    }

    fn custom_symbol(&self, cx: &NodeContext<'_>) -> Option<SymbolDraft> {
        if cx.node.kind != "call" || cx.node.child_by_field("receiver").is_some() {
            return None;
        }
        let keyword = match cx.field_text("method")?.as_str() {
            "require" => "require",
            "require_relative" => "require_relative",
            "load" => "load",
            _ => return None,
        };
        let target = cx
            .node
            .child_by_field("arguments")?
            .named_children()
            .find(|a| a.kind == "string")?;
        let name = clean_import_path(cx.text(target));
        (!name.is_empty()).then(|| SymbolDraft {
            name,
            kind: SymbolKind::Import,
            keyword,
            name_span: target.span,
        })
    }

    fn visibility(&self, cx: &NodeContext<'_>, _name: &str) -> Option<Visibility> {
        if !matches!(cx.node.kind, "method" | "singleton_method") {
            return None;
        }
        let label = cx.parent.and_then(|body| {
            body.children
                .iter()
                .take_while(|c| c.span.end_byte <= cx.node.span.start_byte)
                .filter(|c| c.kind == "identifier")
                .filter_map(|c| visibility_keyword(cx.text(c)))
                .last()
        });
        Some(label.unwrap_or(Visibility::Public))
    }

    fn metadata(&self, cx: &NodeContext<'_>, _draft: &SymbolDraft, meta: &mut Metadata) {
        put_flag(meta, meta::STATIC, cx.node.kind == "singleton_method");
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{find, outline, shape};
    use crate::types::{meta, Language, SymbolKind};

    const SOURCE: &str = r#"require "json"
require_relative "lib/store"

module Billing
  TAX_RATE = 0.2

  class Invoice < Base
    def initialize(items, discount: 0)
      @items = items
    end

    def self.load(path)
      new(JSON.parse(File.read(path)))
    end

    def total
      subtotal = @items.sum(&:price)
      subtotal * (1 + TAX_RATE)
    end

    private

    def audit!
      log("audit")
    end
  end
end
"#;

    #[test]
    fn extracts_modules_classes_and_requires() {
        let outline = outline(Language::Ruby, SOURCE);

        let expected = vec![
            ("json".to_string(), SymbolKind::Import),
            ("lib/store".to_string(), SymbolKind::Import),
            ("Billing".to_string(), SymbolKind::Module),
            ("TAX_RATE".to_string(), SymbolKind::Variable),
            ("Invoice".to_string(), SymbolKind::Class),
            ("initialize".to_string(), SymbolKind::Method),
            ("load".to_string(), SymbolKind::Method),
            ("total".to_string(), SymbolKind::Method),
            ("audit!".to_string(), SymbolKind::Method),
        ];
        assert_eq!(shape(&outline), expected);
    }

    #[test]
    fn require_keyword_is_recorded() {
        let outline = outline(Language::Ruby, SOURCE);
        assert_eq!(find(&outline, "lib/store").keyword(), Some("require_relative"));
    }

    #[test]
    fn bare_private_applies_to_following_methods() {
        let outline = outline(Language::Ruby, SOURCE);

        assert_eq!(find(&outline, "total").meta_text(meta::VISIBILITY), Some("public"));
        assert_eq!(find(&outline, "audit!").meta_text(meta::VISIBILITY), Some("private"));
    }

    #[test]
    fn singleton_methods_are_static() {
        let outline = outline(Language::Ruby, SOURCE);
        let load = find(&outline, "load");

        assert!(load.meta_flag(meta::STATIC));
        assert_eq!(load.parameters(), ["path"]);
        assert_eq!(find(&outline, "initialize").parameters(), ["items", "discount"]);
    }

    #[test]
    fn calls_inside_methods_are_references() {
        let outline = outline(Language::Ruby, SOURCE);
        let audit = find(&outline, "audit!");

        let log = outline
            .references
            .iter()
            .find(|r| r.name == "log")
            .expect("should find log call");
        assert_eq!(log.container, Some(audit.id));
    }
}
