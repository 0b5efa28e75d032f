//! Query layer: requests, positions, and typed results.
//!
//! Every query names a document by path and carries its text. The
//! [`crate::Analyzer`] resolves the language, fetches the cached parse and
//! answers from it; nothing here touches the file system.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::syntax::SyntaxNode;
use crate::text_search::{TextSearchResult, DEFAULT_MAX_TEXT_MATCHES};
use crate::types::{Language, Outline, Reference, Span, Symbol, SyntaxError, Truncation};

/// Longest node text, in characters, copied into a [`NodeInfo`].
pub const MAX_EXCERPT_CHARS: usize = 200;

/// A document to query: its path, its full text, and an optional language override.
#[derive(Debug, Clone, Copy)]
pub struct SourceRequest<'a> {
    /// Path the document is cached under
    pub path: &'a Path,
    /// Complete document text
    pub text: &'a str,
    /// Grammar to use instead of resolving one from the path
    pub language: Option<Language>,
}

impl<'a> SourceRequest<'a> {
    /// Request for `text` stored at `path`, language resolved automatically.
    #[must_use]
    pub fn new(path: &'a Path, text: &'a str) -> Self {
        Self {
            path,
            text,
            language: None,
        }
    }

    /// Force a grammar instead of resolving one.
    #[must_use]
    pub fn with_language(mut self, language: Option<Language>) -> Self {
        self.language = language;
        self
    }
}

/// A location in a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Position {
    /// Byte offset from the start of the text
    Offset(usize),
    /// 1-indexed line and byte column
    LineColumn {
        /// Line number, starting at 1
        line: u32,
        /// Byte column, starting at 1
        column: u32,
    },
}

impl Position {
    /// Byte offset of this position in `text`.
    ///
    /// Offsets up to and including `text.len()` are valid. A column may point
    /// one past the last character of its line.
    ///
    /// # Errors
    ///
    /// Returns `Error::OutOfRange` if the position lies outside `text`.
    pub fn resolve(&self, text: &str) -> Result<usize> {
        let offset = match *self {
            Self::Offset(offset) => (offset <= text.len()).then_some(offset),
            Self::LineColumn { line, column } => line_column_offset(text, line, column),
        };
        offset.ok_or_else(|| Error::OutOfRange {
            position: self.to_string(),
            length: text.len(),
        })
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Offset(offset) => write!(f, "offset {offset}"),
            Self::LineColumn { line, column } => write!(f, "{line}:{column}"),
        }
    }
}

fn line_column_offset(text: &str, line: u32, column: u32) -> Option<usize> {
    if line == 0 || column == 0 {
        return None;
    }
    let mut start = 0;
    for _ in 1..line {
        start += text[start..].find('\n')? + 1;
    }
    let line_len = text[start..].find('\n').unwrap_or(text.len() - start);
    let column = usize::try_from(column - 1).ok()?;
    (column <= line_len).then_some(start + column)
}

/// Outline of one document with its diagnostics.
#[derive(Debug, Clone, Serialize)]
pub struct OutlineResult {
    /// Path the document is cached under
    pub path: PathBuf,
    /// Grammar used
    pub language: Language,
    /// Content fingerprint of the analyzed text
    pub fingerprint: u64,
    /// Whether the parse came from the cache
    pub cache_hit: bool,
    /// Extracted symbols and references
    pub outline: Outline,
    /// Syntax errors, in source order
    pub errors: Vec<SyntaxError>,
    /// Budgets exceeded while parsing or extracting
    pub truncated: Vec<Truncation>,
}

/// A symbol found by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SymbolMatch {
    /// The symbol, without its nested children
    pub symbol: Symbol,
    /// Enclosing symbol names and its own, joined by `.`
    pub qualified_name: String,
    /// Nesting depth (0 for top level)
    pub depth: usize,
}

/// A syntax node, detached from its tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeInfo {
    /// Grammar node kind
    pub kind: String,
    /// Field name under which the parent holds this node
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    /// Extent of the node
    pub span: Span,
    /// Named (as opposed to anonymous punctuation or keyword)
    pub is_named: bool,
    /// An ERROR node from error recovery
    pub is_error: bool,
    /// A MISSING node inserted by error recovery
    pub is_missing: bool,
    /// Source text, cut to [`MAX_EXCERPT_CHARS`] with a trailing `...`
    pub text: String,
}

impl NodeInfo {
    /// Describe `node`, whose text lives in `source`.
    #[must_use]
    pub fn from_node(node: &SyntaxNode, source: &str) -> Self {
        Self {
            kind: node.kind.to_string(),
            field: node.field.map(str::to_string),
            span: node.span,
            is_named: node.is_named,
            is_error: node.is_error,
            is_missing: node.is_missing,
            text: excerpt(node.text(source)),
        }
    }
}

pub(crate) fn excerpt(text: &str) -> String {
    match text.char_indices().nth(MAX_EXCERPT_CHARS) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

/// The node at a position and the kinds of its ancestors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeAtResult {
    /// Smallest node containing the position
    pub node: NodeInfo,
    /// Ancestor kinds from the root down to the node's parent
    pub ancestors: Vec<String>,
}

/// A query against one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Query {
    /// Structural outline
    Outline,
    /// Symbols whose name matches a substring or glob
    FindSymbol {
        /// Case-insensitive substring, or glob when it contains `*`, `?` or `[`
        pattern: String,
    },
    /// Node at a position
    NodeAt {
        /// Where to look
        position: Position,
    },
    /// Nodes matching a structural pattern
    Search {
        /// S-expression pattern (see [`crate::pattern`])
        pattern: String,
    },
    /// Call sites of a name
    FindReferences {
        /// Callee name, compared exactly
        name: String,
    },
    /// Lines matching a regular expression
    SearchText {
        /// Regular expression, matched within single lines
        pattern: String,
        /// Match letter case exactly
        #[serde(default)]
        case_sensitive: bool,
        /// Most matching lines returned
        #[serde(default = "default_max_text_matches")]
        max_results: usize,
    },
}

fn default_max_text_matches() -> usize {
    DEFAULT_MAX_TEXT_MATCHES
}

/// Result of [`crate::Analyzer::execute`], one variant per [`Query`].
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", content = "result", rename_all = "snake_case")]
pub enum QueryResponse {
    /// Answer to [`Query::Outline`]
    Outline(OutlineResult),
    /// Answer to [`Query::FindSymbol`]
    Symbols(Vec<SymbolMatch>),
    /// Answer to [`Query::NodeAt`]
    Node(NodeAtResult),
    /// Answer to [`Query::Search`]
    Matches(Vec<NodeInfo>),
    /// Answer to [`Query::FindReferences`]
    References(Vec<Reference>),
    /// Answer to [`Query::SearchText`]
    Text(TextSearchResult),
}

/// Symbol name filter used by `find_symbol`.
#[derive(Debug, Clone)]
pub(crate) enum NameMatcher {
    /// Lowercased needle
    Substring(String),
    Glob(glob::Pattern),
}

impl NameMatcher {
    const GLOB_OPTIONS: glob::MatchOptions = glob::MatchOptions {
        case_sensitive: false,
        require_literal_separator: false,
        require_literal_leading_dot: false,
    };

    /// Compile `pattern`; it is a glob when it contains `*`, `?` or `[`.
    pub(crate) fn new(pattern: &str) -> Result<Self> {
        if !pattern.contains(['*', '?', '[']) {
            return Ok(Self::Substring(pattern.to_lowercase()));
        }
        glob::Pattern::new(pattern)
            .map(Self::Glob)
            .map_err(|e| Error::malformed(e.pos, e.msg))
    }

    pub(crate) fn matches(&self, name: &str) -> bool {
        match self {
            Self::Substring(needle) => name.to_lowercase().contains(needle.as_str()),
            Self::Glob(pattern) => pattern.matches_with(name, Self::GLOB_OPTIONS),
        }
    }
}

/// Symbols of `outline` whose names pass `matcher`, in pre-order.
pub(crate) fn matching_symbols(outline: &Outline, matcher: &NameMatcher) -> Vec<SymbolMatch> {
    let mut matches = Vec::new();
    let mut stack: Vec<(&Symbol, Vec<&str>)> = outline
        .symbols
        .iter()
        .rev()
        .map(|s| (s, Vec::new()))
        .collect();
    while let Some((symbol, mut path)) = stack.pop() {
        let depth = path.len();
        path.push(symbol.name.as_str());
        if matcher.matches(&symbol.name) {
            matches.push(SymbolMatch {
                symbol: symbol.detached(),
                qualified_name: path.join("."),
                depth,
            });
        }
        stack.extend(symbol.children.iter().rev().map(|c| (c, path.clone())));
    }
    matches
}
