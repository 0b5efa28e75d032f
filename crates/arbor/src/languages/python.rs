//! Python language support.
//!
//! Visibility follows the underscore convention: `_name` is internal,
//! `__name` (without a trailing `__`) is private, everything else is public.

use super::{
    put_flag, put_list, put_text, CallRule, LanguageSupport, Metadata, NameRule, NodeContext,
    NodeRule, SymbolDraft,
};
use crate::types::{meta, Language, SymbolKind, Visibility};

static RULES: &[NodeRule] = &[
    NodeRule::named("class_definition", SymbolKind::Class, "class"),
    NodeRule::named("function_definition", SymbolKind::Function, "def"),
    NodeRule::new(
        "assignment",
        SymbolKind::Variable,
        NameRule::FieldOfKind("left", &["identifier"]),
        "assign",
    ),
    NodeRule::new(
        "import_statement",
        SymbolKind::Import,
        NameRule::Any(&[NameRule::FieldPath(&["name", "name"]), NameRule::Field("name")]),
        "import",
    ),
    NodeRule::new(
        "import_from_statement",
        SymbolKind::Import,
        NameRule::Field("module_name"),
        "from",
    ),
];

static CALLS: &[CallRule] = &[CallRule::call("call", "function")];

/// Python language support implementation.
pub struct PythonLanguage;

impl LanguageSupport for PythonLanguage {
    fn language(&self) -> Language {
        Language::Python
    }

    fn tree_sitter_language(&self) -> tree_sitter::Language {
        tree_sitter_python::LANGUAGE.into()
    }

    fn rules(&self) -> &'static [NodeRule] {
        RULES
    }

    fn call_rules(&self) -> &'static [CallRule] {
        CALLS
    }

    fn visibility(&self, _cx: &NodeContext<'_>, name: &str) -> Option<Visibility> {
        if name.starts_with("__") && !name.ends_with("__") {
            Some(Visibility::Private)
        } else if name.starts_with('_') && !name.starts_with("__") {
            Some(Visibility::Internal)
        } else {
            Some(Visibility::Public)
        }
    }

    fn metadata(&self, cx: &NodeContext<'_>, draft: &SymbolDraft, meta: &mut Metadata) {
        if draft.kind == SymbolKind::Import {
            return;
        }
        if let Some(rt) = cx.field_text("return_type") {
            put_text(meta, meta::RETURN_TYPE, rt);
        }
        put_flag(meta, meta::ASYNC, cx.has_token("async"));

        let decorators = cx
            .parent
            .filter(|p| p.kind == "decorated_definition")
            .map(|p| {
                p.named_children()
                    .filter(|c| c.kind == "decorator")
                    .map(|d| cx.text(d).trim_start_matches('@').trim().to_string())
                    .collect()
            })
            .unwrap_or_default();
        put_list(meta, meta::DECORATORS, decorators);
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{find, outline, shape};
    use crate::types::{meta, Language, SymbolKind, Visibility};

    const MODULE: &str = r#"import os
from collections import OrderedDict

MAX_SIZE = 10

class Store:
    limit = 5

    def __init__(self, path):
        self.path = path

    @property
    def size(self) -> int:
        return len(self.items)

def helper(a, b=2, *args, **kwargs):
    local = 1
    return os.path.join(a, b)
"#;

    #[test]
    fn extracts_module_structure_in_source_order() {
        let outline = outline(Language::Python, MODULE);

        let expected = vec![
            ("os".to_string(), SymbolKind::Import),
            ("collections".to_string(), SymbolKind::Import),
            ("MAX_SIZE".to_string(), SymbolKind::Variable),
            ("Store".to_string(), SymbolKind::Class),
            ("limit".to_string(), SymbolKind::Field),
            ("__init__".to_string(), SymbolKind::Method),
            ("size".to_string(), SymbolKind::Method),
            ("helper".to_string(), SymbolKind::Function),
        ];
        assert_eq!(shape(&outline), expected);
    }

    #[test]
    fn locals_inside_functions_are_not_symbols() {
        let outline = outline(Language::Python, MODULE);
        assert!(outline.flatten().iter().all(|(s, _)| s.name != "local"));
    }

    #[test]
    fn collects_parameters_including_splats() {
        let outline = outline(Language::Python, MODULE);

        assert_eq!(find(&outline, "helper").parameters(), ["a", "b", "args", "kwargs"]);
        assert_eq!(find(&outline, "__init__").parameters(), ["self", "path"]);
    }

    #[test]
    fn records_decorators_and_return_type() {
        let outline = outline(Language::Python, MODULE);
        let size = find(&outline, "size");

        assert_eq!(size.meta_list(meta::DECORATORS), ["property"]);
        assert_eq!(size.meta_text(meta::RETURN_TYPE), Some("int"));
    }

    #[test]
    fn methods_point_back_to_their_class() {
        let outline = outline(Language::Python, MODULE);
        let class = find(&outline, "Store");

        assert_eq!(class.children.len(), 3);
        assert!(class.children.iter().all(|c| c.parent == Some(class.id)));
    }

    #[test]
    fn underscore_names_map_to_visibility() {
        let code = "def _internal():\n    pass\n\nclass A:\n    def __secret(self):\n        pass\n";
        let outline = outline(Language::Python, code);

        assert_eq!(
            find(&outline, "_internal").meta_text(meta::VISIBILITY),
            Some(Visibility::Internal.as_str())
        );
        assert_eq!(
            find(&outline, "__secret").meta_text(meta::VISIBILITY),
            Some(Visibility::Private.as_str())
        );
    }

    #[test]
    fn async_functions_are_flagged() {
        let outline = outline(Language::Python, "async def fetch(url):\n    pass\n");
        assert!(find(&outline, "fetch").meta_flag(meta::ASYNC));
    }

    #[test]
    fn calls_are_attributed_to_enclosing_function() {
        let outline = outline(Language::Python, MODULE);
        let helper = find(&outline, "helper");

        let join = outline
            .references
            .iter()
            .find(|r| r.name == "join")
            .expect("should find call to join");
        assert_eq!(join.container, Some(helper.id));
    }
}
