//! Domain types for Arbor structural analysis.
//!
//! These types form the language-agnostic model every grammar is normalized into:
//! - **Identity**: `Language`, `SymbolId`
//! - **Positions**: `Span`
//! - **Outline**: `Symbol`, `Reference`, `Outline`
//! - **Diagnostics**: `SyntaxError`, `Truncation`
//!
//! ## Design Decisions
//!
//! | Decision | Choice | Rationale |
//! |----------|--------|-----------|
//! | Symbol kinds | Seven normalized kinds | Grammar detail lives in the `keyword` metadata |
//! | Parent link | `SymbolId` back-reference | Children are owned; parents are looked up, never shared |
//! | Metadata | Open `BTreeMap` | Languages differ; sorted keys keep output deterministic |
//! | Span | Bytes plus 1-indexed lines | Byte offsets for slicing, lines/columns for editors |

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

// ============================================================================
// Identity
// ============================================================================

/// Position of a symbol in its outline's pre-order traversal.
///
/// Ids are dense and start at zero, so `outline.get(id)` is a cheap lookup and
/// ids sort in source order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SymbolId(pub u32);

impl SymbolId {
    /// Extract the raw index.
    #[must_use]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Supported grammars.
///
/// TypeScript and TSX are one language served by two grammars, so eleven
/// languages map onto twelve variants. Adding a variant requires a
/// `LanguageSupport` implementation in `languages/`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// Python (`.py`, `.pyi`, `.pyw`)
    Python,
    /// JavaScript (`.js`, `.jsx`, `.mjs`, `.cjs`)
    JavaScript,
    /// TypeScript (`.ts`, `.mts`, `.cts`)
    TypeScript,
    /// TypeScript with JSX (`.tsx`)
    Tsx,
    /// Java (`.java`)
    Java,
    /// C++ (`.cpp`, `.hpp`, `.cc`, `.h`, ...)
    Cpp,
    /// Ruby (`.rb`, `.rake`, `.gemspec`)
    Ruby,
    /// Go (`.go`)
    Go,
    /// Rust (`.rs`)
    Rust,
    /// PHP (`.php`, `.phtml`)
    Php,
    /// C# (`.cs`)
    CSharp,
    /// Kotlin (`.kt`, `.kts`)
    Kotlin,
}

impl Language {
    /// Every supported grammar, in declaration order.
    pub const ALL: [Language; 12] = [
        Self::Python,
        Self::JavaScript,
        Self::TypeScript,
        Self::Tsx,
        Self::Java,
        Self::Cpp,
        Self::Ruby,
        Self::Go,
        Self::Rust,
        Self::Php,
        Self::CSharp,
        Self::Kotlin,
    ];

    /// File extensions handled by this grammar (lowercase, without the dot).
    #[must_use]
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            Self::Python => &["py", "pyi", "pyw"],
            Self::JavaScript => &["js", "jsx", "mjs", "cjs"],
            Self::TypeScript => &["ts", "mts", "cts"],
            Self::Tsx => &["tsx"],
            Self::Java => &["java"],
            Self::Cpp => &["cpp", "hpp", "cc", "hh", "cxx", "hxx", "c++", "h++", "h"],
            Self::Ruby => &["rb", "rake", "gemspec"],
            Self::Go => &["go"],
            Self::Rust => &["rs"],
            Self::Php => &["php", "phtml"],
            Self::CSharp => &["cs"],
            Self::Kotlin => &["kt", "kts"],
        }
    }

    /// Detect language from a file extension (case-insensitive, no dot).
    ///
    /// # Returns
    ///
    /// `None` if the extension is not recognized.
    #[must_use]
    pub fn from_extension(ext: &str) -> Option<Self> {
        let ext = ext.to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|lang| lang.extensions().contains(&ext.as_str()))
    }

    /// Parse a user-supplied language name, accepting common aliases.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "python" | "py" => Some(Self::Python),
            "javascript" | "js" | "jsx" | "node" => Some(Self::JavaScript),
            "typescript" | "ts" => Some(Self::TypeScript),
            "tsx" => Some(Self::Tsx),
            "java" => Some(Self::Java),
            "cpp" | "c++" | "cxx" => Some(Self::Cpp),
            "ruby" | "rb" => Some(Self::Ruby),
            "go" | "golang" => Some(Self::Go),
            "rust" | "rs" => Some(Self::Rust),
            "php" => Some(Self::Php),
            "csharp" | "c#" | "cs" => Some(Self::CSharp),
            "kotlin" | "kt" => Some(Self::Kotlin),
            _ => None,
        }
    }

    /// Stable identifier used in serialized output.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Python => "python",
            Self::JavaScript => "javascript",
            Self::TypeScript => "typescript",
            Self::Tsx => "tsx",
            Self::Java => "java",
            Self::Cpp => "cpp",
            Self::Ruby => "ruby",
            Self::Go => "go",
            Self::Rust => "rust",
            Self::Php => "php",
            Self::CSharp => "csharp",
            Self::Kotlin => "kotlin",
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Symbols
// ============================================================================

/// Symbol kinds, normalized across languages.
///
/// The grammar construct that produced a symbol (struct, trait, interface,
/// impl block, ...) is kept in the symbol's `keyword` metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymbolKind {
    /// Module, namespace, or package
    Module,
    /// Class-like type: class, struct, interface, trait, enum, impl block
    Class,
    /// Free function
    Function,
    /// Function nested in a class-like symbol
    Method,
    /// Variable nested in a class-like symbol
    Field,
    /// Import, include, or use declaration
    Import,
    /// Module-level variable or constant
    Variable,
}

impl SymbolKind {
    /// Stable identifier used in serialized output.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Module => "module",
            Self::Class => "class",
            Self::Function => "function",
            Self::Method => "method",
            Self::Field => "field",
            Self::Import => "import",
            Self::Variable => "variable",
        }
    }

    /// Parse a user-supplied kind name, accepting common aliases.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "module" | "mod" | "namespace" | "package" => Some(Self::Module),
            "class" | "struct" | "interface" | "trait" | "enum" | "type" => Some(Self::Class),
            "function" | "fn" | "func" => Some(Self::Function),
            "method" => Some(Self::Method),
            "field" | "property" => Some(Self::Field),
            "import" | "use" | "include" => Some(Self::Import),
            "variable" | "var" | "const" => Some(Self::Variable),
            _ => None,
        }
    }

    /// Whether symbols of this kind scope the functions and variables below them.
    #[must_use]
    pub fn is_type_scope(&self) -> bool {
        matches!(self, Self::Class)
    }

    /// Whether symbols of this kind are callable.
    #[must_use]
    pub fn is_callable(&self) -> bool {
        matches!(self, Self::Function | Self::Method)
    }
}

/// Visibility levels, normalized across languages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    /// Visible everywhere (`pub`, `public`, capitalized Go names)
    Public,
    /// Visible to subclasses (`protected`)
    Protected,
    /// Visible within the crate/assembly/module (`pub(crate)`, `internal`)
    Internal,
    /// Visible only within the defining scope
    Private,
}

impl Visibility {
    /// Stable identifier used in serialized output.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Protected => "protected",
            Self::Internal => "internal",
            Self::Private => "private",
        }
    }
}

/// A metadata value attached to a symbol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetadataValue {
    /// Single string value (`keyword`, `visibility`, `return_type`, ...)
    Text(String),
    /// Ordered list (`parameters`, `decorators`)
    List(Vec<String>),
    /// Boolean marker (`async`, `static`)
    Flag(bool),
}

impl From<&str> for MetadataValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for MetadataValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<Vec<String>> for MetadataValue {
    fn from(items: Vec<String>) -> Self {
        Self::List(items)
    }
}

impl From<bool> for MetadataValue {
    fn from(flag: bool) -> Self {
        Self::Flag(flag)
    }
}

/// Well-known metadata keys.
pub mod meta {
    /// The grammar construct (`struct`, `interface`, `impl`, `def`, ...)
    pub const KEYWORD: &str = "keyword";
    /// Parameter names in declaration order
    pub const PARAMETERS: &str = "parameters";
    /// Normalized visibility
    pub const VISIBILITY: &str = "visibility";
    /// Declared return type, as written
    pub const RETURN_TYPE: &str = "return_type";
    /// Type a method is defined on outside its body (Go receivers, `Outer::name`)
    pub const RECEIVER: &str = "receiver";
    /// Function is declared `async`
    pub const ASYNC: &str = "async";
    /// Member is `static`
    pub const STATIC: &str = "static";
    /// Decorators / annotations / attributes, as written
    pub const DECORATORS: &str = "decorators";
    /// Import target, as written without delimiters
    pub const SOURCE: &str = "source";
    /// Trait implemented by a Rust `impl` block
    pub const TRAIT: &str = "trait";
}

/// A structural symbol in an outline.
///
/// Symbols nest: a class owns its methods through `children`. The `parent`
/// field points back up by id without owning anything.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Symbol {
    /// Pre-order index within the outline
    pub id: SymbolId,
    /// Simple name (e.g. "save")
    pub name: String,
    /// Normalized kind
    pub kind: SymbolKind,
    /// Full extent of the defining node
    pub span: Span,
    /// Extent of the name token (equals `span` when there is no name node)
    pub name_span: Span,
    /// Enclosing symbol, if nested
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<SymbolId>,
    /// Open, language-specific detail (see [`meta`])
    #[serde(skip_serializing_if = "BTreeMap::is_empty", default)]
    pub metadata: BTreeMap<String, MetadataValue>,
    /// Nested symbols, in source order
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub children: Vec<Symbol>,
}

impl Symbol {
    /// Text metadata value for `key`, if present.
    #[must_use]
    pub fn meta_text(&self, key: &str) -> Option<&str> {
        match self.metadata.get(key) {
            Some(MetadataValue::Text(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    /// List metadata value for `key`, or an empty slice.
    #[must_use]
    pub fn meta_list(&self, key: &str) -> &[String] {
        match self.metadata.get(key) {
            Some(MetadataValue::List(items)) => items,
            _ => &[],
        }
    }

    /// Whether boolean metadata `key` is set.
    #[must_use]
    pub fn meta_flag(&self, key: &str) -> bool {
        matches!(self.metadata.get(key), Some(MetadataValue::Flag(true)))
    }

    /// The grammar construct keyword, if recorded.
    #[must_use]
    pub fn keyword(&self) -> Option<&str> {
        self.meta_text(meta::KEYWORD)
    }

    /// Parameter names, for callables.
    #[must_use]
    pub fn parameters(&self) -> &[String] {
        self.meta_list(meta::PARAMETERS)
    }

    /// A copy of this symbol without its nested children.
    #[must_use]
    pub fn detached(&self) -> Self {
        Self {
            children: Vec::new(),
            ..self.clone()
        }
    }
}

/// How a reference site uses the referenced name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceKind {
    /// Function or method call
    Call,
    /// Constructor invocation (`new Foo()`, struct literal)
    Construct,
}

impl ReferenceKind {
    /// Stable identifier used in serialized output.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Call => "call",
            Self::Construct => "construct",
        }
    }
}

/// A name used at a call site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    /// Callee name as written at the site, without receiver or path
    pub name: String,
    /// How the name is used
    pub kind: ReferenceKind,
    /// Extent of the whole call expression
    pub span: Span,
    /// Innermost enclosing symbol
    #[serde(skip_serializing_if = "Option::is_none")]
    pub container: Option<SymbolId>,
}

/// Structural outline of one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outline {
    /// Grammar the outline was extracted with
    pub language: Language,
    /// Top-level symbols; nested symbols hang off `children`
    pub symbols: Vec<Symbol>,
    /// Call edges in source order
    pub references: Vec<Reference>,
    /// Budgets exceeded while extracting (empty for a complete outline)
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub truncated: Vec<Truncation>,
}

impl Outline {
    /// An outline with no symbols.
    #[must_use]
    pub fn empty(language: Language) -> Self {
        Self {
            language,
            symbols: Vec::new(),
            references: Vec::new(),
            truncated: Vec::new(),
        }
    }

    /// All symbols in pre-order (source order), paired with their nesting depth.
    #[must_use]
    pub fn flatten(&self) -> Vec<(&Symbol, usize)> {
        let mut out = Vec::new();
        let mut stack: Vec<(&Symbol, usize)> =
            self.symbols.iter().rev().map(|s| (s, 0)).collect();
        while let Some((symbol, depth)) = stack.pop() {
            out.push((symbol, depth));
            stack.extend(symbol.children.iter().rev().map(|c| (c, depth + 1)));
        }
        out
    }

    /// Total number of symbols at every depth.
    #[must_use]
    pub fn symbol_count(&self) -> usize {
        fn count(symbols: &[Symbol]) -> usize {
            symbols.iter().map(|s| 1 + count(&s.children)).sum()
        }
        count(&self.symbols)
    }

    /// Number of symbols of `kind` at every depth.
    #[must_use]
    pub fn count_kind(&self, kind: SymbolKind) -> usize {
        self.flatten().iter().filter(|(s, _)| s.kind == kind).count()
    }

    /// Look up a symbol by id.
    #[must_use]
    pub fn get(&self, id: SymbolId) -> Option<&Symbol> {
        self.flatten()
            .into_iter()
            .map(|(s, _)| s)
            .find(|s| s.id == id)
    }

    /// Names of the enclosing symbols of `id`, outermost first, followed by its own name.
    #[must_use]
    pub fn qualified_name(&self, id: SymbolId) -> Option<String> {
        let mut parts = Vec::new();
        let mut current = self.get(id);
        while let Some(symbol) = current {
            parts.push(symbol.name.as_str());
            current = symbol.parent.and_then(|p| self.get(p));
        }
        if parts.is_empty() {
            return None;
        }
        parts.reverse();
        Some(parts.join("."))
    }
}

// ============================================================================
// Positions and diagnostics
// ============================================================================

/// A source region.
///
/// Byte offsets are half-open. Lines and columns are 1-indexed to match editor
/// conventions; columns count bytes and the end column is exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    /// Starting byte offset (inclusive)
    pub start_byte: usize,
    /// Ending byte offset (exclusive)
    pub end_byte: usize,
    /// Starting line (1-indexed)
    pub start_line: u32,
    /// Starting column (1-indexed)
    pub start_column: u32,
    /// Ending line (1-indexed, inclusive)
    pub end_line: u32,
    /// Ending column (1-indexed, exclusive)
    pub end_column: u32,
}

impl Span {
    /// Create a new span with validation.
    ///
    /// Returns `None` if the end is before the start, in bytes or in lines.
    #[must_use]
    pub fn new(
        start_byte: usize,
        end_byte: usize,
        start_line: u32,
        start_column: u32,
        end_line: u32,
        end_column: u32,
    ) -> Option<Self> {
        if end_byte < start_byte
            || end_line < start_line
            || (end_line == start_line && end_column < start_column)
        {
            return None;
        }
        Some(Self {
            start_byte,
            end_byte,
            start_line,
            start_column,
            end_line,
            end_column,
        })
    }

    /// Length in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.end_byte - self.start_byte
    }

    /// Whether the span covers no bytes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.start_byte == self.end_byte
    }

    /// Whether `offset` falls inside the half-open byte range.
    #[must_use]
    pub fn contains(&self, offset: usize) -> bool {
        self.start_byte <= offset && offset < self.end_byte
    }

    /// Whether `other` lies entirely inside this span.
    #[must_use]
    pub fn encloses(&self, other: &Span) -> bool {
        self.start_byte <= other.start_byte && other.end_byte <= self.end_byte
    }

    /// Whether the line ranges of the two spans intersect.
    #[must_use]
    pub fn overlaps_lines(&self, other: &Span) -> bool {
        self.start_line <= other.end_line && other.start_line <= self.end_line
    }
}

/// Kind of syntax defect found by the grammar's error recovery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyntaxErrorKind {
    /// Tokens the grammar could not fit anywhere (an ERROR node)
    Unexpected,
    /// A required token was absent and inserted by recovery (a MISSING node)
    Missing,
}

/// A syntax defect in a parsed document.
///
/// Advisory: a tree and outline are always produced alongside.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyntaxError {
    /// Defect category
    pub kind: SyntaxErrorKind,
    /// Region of the defect
    pub span: Span,
    /// Human-readable description
    pub message: String,
}

/// A resource budget that was exceeded; results carrying it are partial.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "budget", rename_all = "snake_case")]
pub enum Truncation {
    /// Only the first `limit` bytes of the source were parsed
    SourceTruncated {
        /// Byte limit that applied
        limit: usize,
    },
    /// The parser gave up after `timeout_ms`
    ParseTimeout {
        /// Timeout that applied, in milliseconds
        timeout_ms: u64,
    },
    /// Subtrees deeper than `limit` were cut
    DepthLimit {
        /// Depth limit that applied
        limit: usize,
    },
    /// The syntax tree was cut at `limit` nodes
    NodeLimit {
        /// Node limit that applied
        limit: usize,
    },
    /// Extraction stopped after `limit` symbols
    SymbolLimit {
        /// Symbol limit that applied
        limit: usize,
    },
}

impl std::fmt::Display for Truncation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SourceTruncated { limit } => write!(f, "source truncated at {limit} bytes"),
            Self::ParseTimeout { timeout_ms } => write!(f, "parse timed out after {timeout_ms}ms"),
            Self::DepthLimit { limit } => write!(f, "tree depth limited to {limit}"),
            Self::NodeLimit { limit } => write!(f, "tree limited to {limit} nodes"),
            Self::SymbolLimit { limit } => write!(f, "outline limited to {limit} symbols"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span(start: usize, end: usize, line: u32) -> Span {
        Span::new(start, end, line, 1, line, 1 + (end - start) as u32).unwrap()
    }

    fn symbol(id: u32, name: &str, kind: SymbolKind, parent: Option<u32>) -> Symbol {
        Symbol {
            id: SymbolId(id),
            name: name.to_string(),
            kind,
            span: span(0, 1, 1),
            name_span: span(0, 1, 1),
            parent: parent.map(SymbolId),
            metadata: BTreeMap::new(),
            children: Vec::new(),
        }
    }

    fn nested_outline() -> Outline {
        let mut class = symbol(0, "Store", SymbolKind::Class, None);
        class.children = vec![
            symbol(1, "load", SymbolKind::Method, Some(0)),
            symbol(2, "save", SymbolKind::Method, Some(0)),
        ];
        Outline {
            language: Language::Python,
            symbols: vec![class, symbol(3, "main", SymbolKind::Function, None)],
            references: Vec::new(),
            truncated: Vec::new(),
        }
    }

    #[test]
    fn language_from_extension_is_case_insensitive() {
        assert_eq!(Language::from_extension("rs"), Some(Language::Rust));
        assert_eq!(Language::from_extension("PY"), Some(Language::Python));
        assert_eq!(Language::from_extension("Tsx"), Some(Language::Tsx));
    }

    #[test]
    fn language_from_extension_returns_none_for_unknown() {
        assert_eq!(Language::from_extension("txt"), None);
        assert_eq!(Language::from_extension("md"), None);
        assert_eq!(Language::from_extension(""), None);
    }

    #[test]
    fn every_extension_maps_back_to_its_language() {
        for lang in Language::ALL {
            for ext in lang.extensions() {
                assert_eq!(Language::from_extension(ext), Some(lang), "extension {ext}");
            }
        }
    }

    #[test]
    fn language_names_round_trip_through_as_str() {
        for lang in Language::ALL {
            assert_eq!(Language::from_name(lang.as_str()), Some(lang));
        }
        assert_eq!(Language::from_name("C#"), Some(Language::CSharp));
        assert_eq!(Language::from_name("cobol"), None);
    }

    #[test]
    fn language_serializes_lowercase() {
        let json = serde_json::to_string(&Language::CSharp).unwrap();
        assert_eq!(json, "\"csharp\"");
    }

    #[test]
    fn span_new_rejects_reversed_ranges() {
        assert!(Span::new(5, 4, 1, 1, 1, 2).is_none());
        assert!(Span::new(0, 4, 2, 1, 1, 5).is_none());
        assert!(Span::new(0, 4, 1, 5, 1, 3).is_none());
        assert!(Span::new(0, 0, 1, 1, 1, 1).is_some());
    }

    #[test]
    fn span_contains_is_half_open() {
        let s = span(2, 6, 1);
        assert!(!s.contains(1));
        assert!(s.contains(2));
        assert!(s.contains(5));
        assert!(!s.contains(6));
    }

    #[test]
    fn flatten_is_preorder_with_depth() {
        let outline = nested_outline();

        let names: Vec<_> = outline
            .flatten()
            .iter()
            .map(|(s, d)| (s.name.as_str(), *d))
            .collect();
        assert_eq!(
            names,
            vec![("Store", 0), ("load", 1), ("save", 1), ("main", 0)]
        );
        assert_eq!(outline.symbol_count(), 4);
        assert_eq!(outline.count_kind(SymbolKind::Method), 2);
    }

    #[test]
    fn qualified_name_follows_parent_links() {
        let outline = nested_outline();

        assert_eq!(
            outline.qualified_name(SymbolId(2)).as_deref(),
            Some("Store.save")
        );
        assert_eq!(outline.qualified_name(SymbolId(3)).as_deref(), Some("main"));
        assert_eq!(outline.qualified_name(SymbolId(99)), None);
    }

    #[test]
    fn metadata_accessors_match_value_shapes() {
        let mut sym = symbol(0, "run", SymbolKind::Function, None);
        sym.metadata
            .insert(meta::KEYWORD.to_string(), MetadataValue::from("def"));
        sym.metadata.insert(
            meta::PARAMETERS.to_string(),
            MetadataValue::from(vec!["a".to_string(), "b".to_string()]),
        );
        sym.metadata
            .insert(meta::ASYNC.to_string(), MetadataValue::from(true));

        assert_eq!(sym.keyword(), Some("def"));
        assert_eq!(sym.parameters(), ["a", "b"]);
        assert!(sym.meta_flag(meta::ASYNC));
        assert!(!sym.meta_flag(meta::STATIC));
        assert_eq!(sym.meta_text(meta::PARAMETERS), None);
    }

    #[test]
    fn detached_drops_children_only() {
        let outline = nested_outline();
        let class = &outline.symbols[0];

        let detached = class.detached();
        assert!(detached.children.is_empty());
        assert_eq!(detached.name, "Store");
        assert_eq!(detached.id, class.id);
    }

    #[test]
    fn truncation_display_names_the_budget() {
        let t = Truncation::NodeLimit { limit: 10 };
        assert_eq!(t.to_string(), "tree limited to 10 nodes");
    }
}
