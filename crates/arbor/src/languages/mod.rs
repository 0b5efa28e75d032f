//! Language-specific structure rules.
//!
//! Each supported grammar implements [`LanguageSupport`]: a static table of
//! [`NodeRule`]s mapping grammar node kinds to normalized symbols, a table of
//! [`CallRule`]s for call references, and optional hooks for the cases a
//! table cannot express (C++ declarators, Ruby `require`, Go receivers).
//!
//! ## Adding a New Language
//!
//! 1. Add the variant to `Language` in `types.rs`
//! 2. Create a new module (e.g., `swift.rs`) with its rule tables
//! 3. Implement `LanguageSupport`
//! 4. Register in `get_language_support()`
//!
//! The generic walk in `extract.rs` applies the rules that hold for every
//! language: functions in classes become methods, variables in classes become
//! fields, and variables inside function bodies are not symbols.

pub mod cpp;
pub mod csharp;
pub mod go;
pub mod java;
pub mod javascript;
pub mod kotlin;
pub mod php;
pub mod python;
pub mod ruby;
pub mod rust;
pub mod tree_sitter_utils;
pub mod typescript;

use std::collections::BTreeMap;

use crate::syntax::SyntaxNode;
use crate::types::{Language, MetadataValue, ReferenceKind, Span, SymbolKind, Visibility};
use tree_sitter_utils::{clean_import_path, collapse_whitespace, is_identifier_kind};

/// Get the language support implementation for a grammar.
#[must_use]
pub fn get_language_support(lang: Language) -> &'static dyn LanguageSupport {
    match lang {
        Language::Python => &python::PythonLanguage,
        Language::JavaScript => &javascript::JavaScriptLanguage,
        Language::TypeScript => &typescript::TypeScriptLanguage::TYPESCRIPT,
        Language::Tsx => &typescript::TypeScriptLanguage::TSX,
        Language::Java => &java::JavaLanguage,
        Language::Cpp => &cpp::CppLanguage,
        Language::Ruby => &ruby::RubyLanguage,
        Language::Go => &go::GoLanguage,
        Language::Rust => &rust::RustLanguage,
        Language::Php => &php::PhpLanguage,
        Language::CSharp => &csharp::CSharpLanguage,
        Language::Kotlin => &kotlin::KotlinLanguage,
    }
}

/// Trait for language-specific structure extraction.
///
/// Only `language`, `tree_sitter_language`, `rules`, and `call_rules` are
/// required; the hooks default to doing nothing.
pub trait LanguageSupport: Send + Sync {
    /// The grammar this implementation serves.
    fn language(&self) -> Language;

    /// Get the tree-sitter language for parsing.
    fn tree_sitter_language(&self) -> tree_sitter::Language;

    /// Node kinds that produce symbols.
    fn rules(&self) -> &'static [NodeRule];

    /// Node kinds that produce call references.
    fn call_rules(&self) -> &'static [CallRule];

    /// Produce a symbol for a node the rule table does not cover.
    fn custom_symbol(&self, _cx: &NodeContext<'_>) -> Option<SymbolDraft> {
        None
    }

    /// Adjust a drafted symbol (kind, name, keyword) before scoping rules apply.
    fn refine(&self, _cx: &NodeContext<'_>, _draft: &mut SymbolDraft) {}

    /// Visibility of the symbol defined by `cx.node`, if the language has one.
    fn visibility(&self, _cx: &NodeContext<'_>, _name: &str) -> Option<Visibility> {
        None
    }

    /// Parameter names of a callable, in declaration order.
    fn parameters(&self, cx: &NodeContext<'_>) -> Vec<String> {
        parameter_list(cx.node).map_or_else(Vec::new, |list| parameter_names(list, cx.source))
    }

    /// Add language-specific metadata (return type, modifiers, decorators).
    fn metadata(&self, _cx: &NodeContext<'_>, _draft: &SymbolDraft, _meta: &mut Metadata) {}
}

/// Metadata map attached to a symbol.
pub type Metadata = BTreeMap<String, MetadataValue>;

/// Maps one grammar node kind to a symbol.
#[derive(Debug, Clone, Copy)]
pub struct NodeRule {
    /// Grammar node kind
    pub kind: &'static str,
    /// Normalized kind before scoping rules
    pub symbol: SymbolKind,
    /// How to find the name
    pub name: NameRule,
    /// Construct keyword recorded as metadata
    pub keyword: &'static str,
    /// Only match nodes that have this field (e.g. a `body`)
    pub requires_field: Option<&'static str>,
    /// Name to use when the name rule finds nothing; `None` skips the node
    pub default_name: Option<&'static str>,
}

impl NodeRule {
    /// A rule taking its name from the `name` field.
    #[must_use]
    pub const fn named(kind: &'static str, symbol: SymbolKind, keyword: &'static str) -> Self {
        Self::new(kind, symbol, NameRule::Field("name"), keyword)
    }

    /// A rule with an explicit name rule.
    #[must_use]
    pub const fn new(
        kind: &'static str,
        symbol: SymbolKind,
        name: NameRule,
        keyword: &'static str,
    ) -> Self {
        Self {
            kind,
            symbol,
            name,
            keyword,
            requires_field: None,
            default_name: None,
        }
    }

    /// Only match nodes that carry `field`.
    #[must_use]
    pub const fn requiring(mut self, field: &'static str) -> Self {
        self.requires_field = Some(field);
        self
    }

    /// Fall back to `name` when the name rule finds nothing.
    #[must_use]
    pub const fn or_named(mut self, name: &'static str) -> Self {
        self.default_name = Some(name);
        self
    }
}

/// How to locate a symbol's name below its defining node.
#[derive(Debug, Clone, Copy)]
pub enum NameRule {
    /// Text of the child in this field
    Field(&'static str),
    /// Follow fields in order
    FieldPath(&'static [&'static str]),
    /// Child in the field, only if its kind is one of the listed kinds
    FieldOfKind(&'static str, &'static [&'static str]),
    /// First named child with one of the kinds
    ChildKinds(&'static [&'static str]),
    /// Follow first named children of each kind in turn
    KindPath(&'static [&'static str]),
    /// First descendant with one of the kinds
    DescendantKinds(&'static [&'static str]),
    /// Innermost name through a chain of `declarator` fields (C/C++)
    Declarator,
    /// Import target in the field (or the first named child), delimiters stripped
    ImportPath(Option<&'static str>),
    /// Try each rule in order
    Any(&'static [NameRule]),
}

impl NameRule {
    /// Resolve the name and the span of the text it came from.
    #[must_use]
    pub fn resolve(&self, node: &SyntaxNode, source: &str) -> Option<(String, Span)> {
        match self {
            Self::ImportPath(field) => {
                let target = match field {
                    Some(f) => node.child_by_field(f)?,
                    None => node.named_children().find(|c| !c.kind.contains("comment"))?,
                };
                let path = clean_import_path(target.text(source));
                (!path.is_empty()).then_some((path, target.span))
            }
            Self::Any(rules) => rules.iter().find_map(|r| r.resolve(node, source)),
            _ => {
                let target = self.locate(node)?;
                let name = collapse_whitespace(target.text(source));
                (!name.is_empty()).then_some((name, target.span))
            }
        }
    }

    fn locate<'n>(&self, node: &'n SyntaxNode) -> Option<&'n SyntaxNode> {
        match self {
            Self::Field(f) => node.child_by_field(f),
            Self::FieldPath(path) => path
                .iter()
                .try_fold(node, |current, f| current.child_by_field(f)),
            Self::FieldOfKind(f, kinds) => node
                .child_by_field(f)
                .filter(|c| kinds.contains(&c.kind)),
            Self::ChildKinds(kinds) => node.child_of_kind(kinds),
            Self::KindPath(path) => path
                .iter()
                .try_fold(node, |current, k| current.child_of_kind(&[*k])),
            Self::DescendantKinds(kinds) => node.descendant_of_kind(kinds),
            Self::Declarator => declarator_name(node),
            Self::ImportPath(_) | Self::Any(_) => None,
        }
    }
}

/// Follow `declarator` fields to the innermost name node.
///
/// Handles pointer, reference, array, and function declarators, plus
/// qualified (`Outer::name`) and template names.
#[must_use]
pub fn declarator_name(node: &SyntaxNode) -> Option<&SyntaxNode> {
    const MAX_STEPS: usize = 32;
    const NAME_KINDS: &[&str] = &["destructor_name", "operator_name", "type_identifier"];

    let mut current = node.child_by_field("declarator")?;
    for _ in 0..MAX_STEPS {
        if is_identifier_kind(current.kind) || NAME_KINDS.contains(&current.kind) {
            return Some(current);
        }
        current = current
            .child_by_field("declarator")
            .or_else(|| current.child_by_field("name"))
            .or_else(|| current.named_children().last())?;
    }
    None
}

/// Maps one grammar node kind to a reference.
#[derive(Debug, Clone, Copy)]
pub struct CallRule {
    /// Grammar node kind
    pub kind: &'static str,
    /// Where the callee expression lives
    pub callee: Callee,
    /// Call or construction
    pub reference: ReferenceKind,
}

impl CallRule {
    /// A call whose callee is in `field`.
    #[must_use]
    pub const fn call(kind: &'static str, field: &'static str) -> Self {
        Self {
            kind,
            callee: Callee::Field(field),
            reference: ReferenceKind::Call,
        }
    }

    /// A constructor invocation whose type is in `field`.
    #[must_use]
    pub const fn construct(kind: &'static str, field: &'static str) -> Self {
        Self {
            kind,
            callee: Callee::Field(field),
            reference: ReferenceKind::Construct,
        }
    }

    /// Locate the callee expression of a matching node.
    #[must_use]
    pub fn callee<'n>(&self, node: &'n SyntaxNode) -> Option<&'n SyntaxNode> {
        match self.callee {
            Callee::Field(f) => node.child_by_field(f),
            Callee::FirstNamedChild => node.named_children().next(),
        }
    }
}

/// Location of a callee expression inside a call node.
#[derive(Debug, Clone, Copy)]
pub enum Callee {
    /// Child in this field
    Field(&'static str),
    /// First named child (grammars without a callee field)
    FirstNamedChild,
}

/// A symbol before ids, scoping, and metadata are applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolDraft {
    /// Simple name
    pub name: String,
    /// Normalized kind before scoping rules
    pub kind: SymbolKind,
    /// Construct keyword
    pub keyword: &'static str,
    /// Span of the name text
    pub name_span: Span,
}

/// A node under inspection, with the context hooks need.
#[derive(Debug, Clone, Copy)]
pub struct NodeContext<'a> {
    /// The node being inspected
    pub node: &'a SyntaxNode,
    /// Its parent, if any
    pub parent: Option<&'a SyntaxNode>,
    /// Full document text
    pub source: &'a str,
}

impl<'a> NodeContext<'a> {
    /// Text of `node`.
    #[must_use]
    pub fn text(&self, node: &SyntaxNode) -> &'a str {
        node.text(self.source)
    }

    /// Whitespace-collapsed text of the child in `field`.
    #[must_use]
    pub fn field_text(&self, field: &str) -> Option<String> {
        self.node
            .child_by_field(field)
            .map(|c| collapse_whitespace(c.text(self.source)))
    }

    /// Whether the node has a direct child token of `kind`.
    #[must_use]
    pub fn has_token(&self, kind: &str) -> bool {
        self.node.has_child_kind(kind)
    }
}

// ============================================================================
// Shared helpers for language modules
// ============================================================================

const PARAMETER_LIST_KINDS: &[&str] = &[
    "parameters",
    "formal_parameters",
    "parameter_list",
    "method_parameters",
    "function_value_parameters",
    "lambda_parameters",
];

/// Find the parameter list of a callable node.
#[must_use]
pub fn parameter_list(node: &SyntaxNode) -> Option<&SyntaxNode> {
    node.child_by_field("parameters")
        .or_else(|| node.child_of_kind(PARAMETER_LIST_KINDS))
}

/// Names of the parameters in a parameter list node.
#[must_use]
pub fn parameter_names(list: &SyntaxNode, source: &str) -> Vec<String> {
    list.named_children()
        .filter(|p| !p.kind.contains("comment"))
        .filter_map(|p| parameter_name(p, source, 0))
        .filter(|name| name != "void")
        .collect()
}

fn parameter_name(node: &SyntaxNode, source: &str, depth: usize) -> Option<String> {
    const MAX_DEPTH: usize = 4;
    const NAME_FIELDS: &[&str] = &["name", "pattern", "declarator", "left"];
    const SKIPPED_FIELDS: &[&str] = &["type", "value", "default_value", "default"];
    const DESTRUCTURING_KINDS: &[&str] = &[
        "object_pattern",
        "array_pattern",
        "tuple_pattern",
        "list_pattern",
        "slice_pattern",
        "struct_pattern",
    ];

    if is_identifier_kind(node.kind) {
        return Some(node.text(source).trim_start_matches('$').to_string());
    }
    // Destructuring patterns are reported as written.
    if DESTRUCTURING_KINDS.contains(&node.kind) {
        return Some(collapse_whitespace(node.text(source)));
    }
    if depth < MAX_DEPTH {
        if let Some(found) = NAME_FIELDS
            .iter()
            .find_map(|f| node.child_by_field(f))
            .and_then(|c| parameter_name(c, source, depth + 1))
        {
            return Some(found);
        }
        if let Some(found) = node
            .named_children()
            .filter(|c| c.field.is_none_or(|f| !SKIPPED_FIELDS.contains(&f)))
            .find_map(|c| parameter_name(c, source, depth + 1))
        {
            return Some(found);
        }
    }
    let text = collapse_whitespace(node.text(source));
    (!text.is_empty() && node.children.iter().all(|c| !c.is_named)).then_some(text)
}

/// Map a modifier keyword to a visibility.
#[must_use]
pub fn visibility_keyword(word: &str) -> Option<Visibility> {
    match word {
        "public" | "open" => Some(Visibility::Public),
        "protected" => Some(Visibility::Protected),
        "internal" => Some(Visibility::Internal),
        "private" | "fileprivate" => Some(Visibility::Private),
        _ => None,
    }
}

/// Visibility from the first modifier word found in `text`.
///
/// `protected internal` resolves to `Protected`, the wider of the two for
/// subclasses.
#[must_use]
pub fn visibility_in(text: &str) -> Option<Visibility> {
    text.split(|c: char| !c.is_alphanumeric())
        .find_map(visibility_keyword)
}

/// Whether a modifiers text contains `word` as a whole word.
#[must_use]
pub fn has_word(text: &str, word: &str) -> bool {
    text.split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .any(|w| w == word)
}

/// Insert a text metadata entry.
pub fn put_text(meta: &mut Metadata, key: &str, value: impl Into<String>) {
    meta.insert(key.to_string(), MetadataValue::Text(value.into()));
}

/// Insert a boolean metadata entry when `flag` is set.
pub fn put_flag(meta: &mut Metadata, key: &str, flag: bool) {
    if flag {
        meta.insert(key.to_string(), MetadataValue::Flag(true));
    }
}

/// Insert a list metadata entry when `items` is non-empty.
pub fn put_list(meta: &mut Metadata, key: &str, items: Vec<String>) {
    if !items.is_empty() {
        meta.insert(key.to_string(), MetadataValue::List(items));
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    //! Helpers for language tests: parse and extract in one call.

    use crate::config::Budget;
    use crate::types::{Language, Outline, Symbol, SymbolKind};

    /// Parse `code` and extract its outline with the default budget.
    pub fn outline(language: Language, code: &str) -> Outline {
        let parsed = crate::parser::parse(code, language, &Budget::default())
            .expect("parsing test code should succeed");
        crate::extract::extract(&parsed.root, code, language, &Budget::default())
    }

    /// Find a symbol anywhere in the outline by name.
    pub fn find<'a>(outline: &'a Outline, name: &str) -> &'a Symbol {
        outline
            .flatten()
            .into_iter()
            .map(|(s, _)| s)
            .find(|s| s.name == name)
            .unwrap_or_else(|| panic!("should find symbol {name} in {:#?}", outline.symbols))
    }

    /// `(name, kind)` pairs in pre-order.
    pub fn shape(outline: &Outline) -> Vec<(String, SymbolKind)> {
        outline
            .flatten()
            .into_iter()
            .map(|(s, _)| (s.name.clone(), s.kind))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn every_language_has_support_for_its_own_variant() {
        for lang in Language::ALL {
            let support = get_language_support(lang);
            assert_eq!(support.language(), lang);
            assert!(!support.rules().is_empty(), "{lang} has no rules");
            assert!(!support.call_rules().is_empty(), "{lang} has no call rules");
        }
    }

    #[test]
    fn every_grammar_loads_into_a_parser() {
        for lang in Language::ALL {
            let mut parser = tree_sitter::Parser::new();
            parser
                .set_language(&get_language_support(lang).tree_sitter_language())
                .unwrap_or_else(|e| panic!("{lang} grammar should load: {e}"));
        }
    }

    #[rstest]
    #[case::public("public static", Some(Visibility::Public))]
    #[case::protected_internal("protected internal", Some(Visibility::Protected))]
    #[case::private("private final", Some(Visibility::Private))]
    #[case::none("static final", None)]
    fn visibility_in_reads_first_modifier(#[case] text: &str, #[case] expected: Option<Visibility>) {
        assert_eq!(visibility_in(text), expected);
    }

    #[test]
    fn has_word_matches_whole_words_only() {
        assert!(has_word("public static void", "static"));
        assert!(!has_word("staticky", "static"));
    }
}
