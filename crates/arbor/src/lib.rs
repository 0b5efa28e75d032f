//! # Arbor: Multi-Language Structural Code Analysis
//!
//! Arbor parses source files with tree-sitter grammars, normalizes every
//! language into one outline model, and answers structural queries against
//! cached parses. It is designed for programmatic use by CLI tools, MCP
//! servers, and AI agents.
//!
//! ## Design Philosophy
//!
//! - **Structure, not semantics** - Outlines and call sites come from syntax alone
//! - **Broken code is normal** - Syntax errors are data next to a best-effort outline
//! - **Bounded work** - Every parse runs under a byte, time, depth, and node budget
//! - **Library first** - The CLI and MCP server are thin layers over [`Analyzer`]
//!
//! ## Quick Start
//!
//! ```no_run
//! use arbor::{Analyzer, AnalyzerConfig, Position, SourceRequest};
//! use std::path::Path;
//!
//! let analyzer = Analyzer::new(AnalyzerConfig::default());
//! let text = std::fs::read_to_string("src/store.py")?;
//! let request = SourceRequest::new(Path::new("src/store.py"), &text);
//!
//! let outline = analyzer.get_outline(request)?;
//! println!("{} symbols, {} syntax errors", outline.outline.symbol_count(), outline.errors.len());
//!
//! for found in analyzer.find_symbol(request, "save*")? {
//!     println!("{} at line {}", found.qualified_name, found.symbol.span.start_line);
//! }
//!
//! let node = analyzer.node_at(request, Position::LineColumn { line: 3, column: 5 })?;
//! println!("{} inside {:?}", node.node.kind, node.ancestors);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod cache;
pub mod config;
mod error;
pub mod extract;
pub mod languages;
pub mod map;
pub mod parser;
pub mod pattern;
pub mod query;
pub mod registry;
pub mod render;
pub mod syntax;
pub mod text_search;
mod types;

pub use cache::{CacheEntry, CacheLookup, CacheStats, EvictionPolicy, ParseCache};
pub use config::{AnalyzerConfig, Budget, CacheConfig};
pub use error::{Error, FileError, FileErrorKind, Result};
pub use map::{CodebaseMap, FileSummary, MapStats};
pub use pattern::Pattern;
pub use query::{
    NodeAtResult, NodeInfo, OutlineResult, Position, Query, QueryResponse, SourceRequest,
    SymbolMatch,
};
pub use registry::GrammarRegistry;
pub use syntax::SyntaxNode;
pub use text_search::{TextMatch, TextPattern, TextSearchOptions, TextSearchResult};
pub use types::{
    meta, Language, MetadataValue, Outline, Reference, ReferenceKind, Span, Symbol, SymbolId,
    SymbolKind, SyntaxError, SyntaxErrorKind, Truncation, Visibility,
};

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, warn};

use query::{matching_symbols, NameMatcher};

/// Structural analysis over cached parses.
///
/// `Analyzer` is the entry point for every query. It holds the grammar
/// registry and the parse cache explicitly; clones share the same cache.
/// All methods take `&self` and are safe to call from many threads.
#[derive(Debug, Clone)]
pub struct Analyzer {
    registry: &'static GrammarRegistry,
    cache: Arc<ParseCache>,
}

impl Analyzer {
    /// Create an analyzer with a fresh cache sized by `config`.
    #[must_use]
    pub fn new(config: AnalyzerConfig) -> Self {
        let cache = ParseCache::new(config.cache, config.budget);
        Self::with_parts(GrammarRegistry::global(), Arc::new(cache))
    }

    /// Create an analyzer over an existing registry and cache.
    #[must_use]
    pub fn with_parts(registry: &'static GrammarRegistry, cache: Arc<ParseCache>) -> Self {
        Self { registry, cache }
    }

    /// The grammar registry.
    #[must_use]
    pub fn registry(&self) -> &GrammarRegistry {
        self.registry
    }

    /// The parse cache.
    #[must_use]
    pub fn cache(&self) -> &ParseCache {
        &self.cache
    }

    /// Grammar for `request`: the override if given, otherwise resolved.
    ///
    /// # Errors
    ///
    /// Returns `Error::Unsupported` if no grammar applies.
    pub fn resolve_language(&self, request: SourceRequest<'_>) -> Result<Language> {
        request
            .language
            .or_else(|| {
                self.registry
                    .resolve_language(request.path, Some(request.text))
            })
            .ok_or_else(|| Error::Unsupported {
                path: request.path.to_path_buf(),
            })
    }

    /// Cached parse of `request`, parsing on a miss.
    fn load(&self, request: SourceRequest<'_>) -> Result<CacheLookup> {
        let language = self.resolve_language(request)?;
        self.cache
            .get_or_create(request.path, request.text, language)
    }

    // === Queries ===

    /// Outline, syntax errors, and truncations for a document.
    ///
    /// # Errors
    ///
    /// Returns `Error::Unsupported` if no grammar applies, or
    /// `Error::Grammar` if the grammar cannot be loaded.
    pub fn get_outline(&self, request: SourceRequest<'_>) -> Result<OutlineResult> {
        let CacheLookup { entry, hit } = self.load(request)?;
        Ok(OutlineResult {
            path: entry.path().to_path_buf(),
            language: entry.language(),
            fingerprint: entry.fingerprint(),
            cache_hit: hit,
            outline: entry.outline().clone(),
            errors: entry.errors().to_vec(),
            truncated: entry.truncated().to_vec(),
        })
    }

    /// Symbols whose names match `name_pattern`, in source order.
    ///
    /// The pattern is a case-insensitive substring, or a glob when it contains
    /// `*`, `?` or `[`.
    ///
    /// # Errors
    ///
    /// Returns `Error::MalformedPattern` for an invalid glob, plus the errors
    /// of [`Analyzer::get_outline`].
    pub fn find_symbol(
        &self,
        request: SourceRequest<'_>,
        name_pattern: &str,
    ) -> Result<Vec<SymbolMatch>> {
        let matcher = NameMatcher::new(name_pattern)?;
        let lookup = self.load(request)?;
        let matches = matching_symbols(lookup.entry.outline(), &matcher);
        debug!(pattern = name_pattern, matches = matches.len(), "Symbol search");
        Ok(matches)
    }

    /// Smallest node containing `position`, with its ancestor kinds.
    ///
    /// An offset equal to the text length resolves to the root. One in
    /// trailing whitespace, such as the final newline, resolves to the last
    /// leaf before it.
    ///
    /// # Errors
    ///
    /// Returns `Error::OutOfRange` if the position lies outside the text,
    /// plus the errors of [`Analyzer::get_outline`].
    pub fn node_at(&self, request: SourceRequest<'_>, position: Position) -> Result<NodeAtResult> {
        let offset = position.resolve(request.text)?;
        let lookup = self.load(request)?;
        let root = lookup.entry.root();

        // The text length, offsets before the root's first token and offsets
        // past a clipped source all land on the root.
        let path = if offset == request.text.len() {
            Vec::new()
        } else {
            root.path_to_offset(offset)
        };
        let (node, ancestors) = match path.split_last() {
            Some((node, ancestors)) => (*node, ancestors),
            None => (root, &[][..]),
        };
        Ok(NodeAtResult {
            node: NodeInfo::from_node(node, lookup.entry.source()),
            ancestors: ancestors.iter().map(|n| n.kind.to_string()).collect(),
        })
    }

    /// Nodes matching a structural pattern, in pre-order.
    ///
    /// # Errors
    ///
    /// Returns `Error::MalformedPattern` if the pattern does not compile,
    /// plus the errors of [`Analyzer::get_outline`].
    pub fn search(&self, request: SourceRequest<'_>, pattern: &str) -> Result<Vec<NodeInfo>> {
        let pattern = Pattern::parse(pattern)?;
        let lookup = self.load(request)?;
        let source = lookup.entry.source();
        Ok(pattern
            .find_all(lookup.entry.root(), source)
            .into_iter()
            .map(|node| NodeInfo::from_node(node, source))
            .collect())
    }

    /// Call sites whose callee name is exactly `name`, in source order.
    ///
    /// # Errors
    ///
    /// Same as [`Analyzer::get_outline`].
    pub fn find_references(&self, request: SourceRequest<'_>, name: &str) -> Result<Vec<Reference>> {
        let lookup = self.load(request)?;
        Ok(lookup
            .entry
            .outline()
            .references
            .iter()
            .filter(|r| r.name == name)
            .cloned()
            .collect())
    }

    /// Run a typed query.
    ///
    /// # Errors
    ///
    /// Returns whatever the dispatched operation returns.
    pub fn execute(&self, request: SourceRequest<'_>, query: &Query) -> Result<QueryResponse> {
        Ok(match query {
            Query::Outline => QueryResponse::Outline(self.get_outline(request)?),
            Query::FindSymbol { pattern } => {
                QueryResponse::Symbols(self.find_symbol(request, pattern)?)
            }
            Query::NodeAt { position } => QueryResponse::Node(self.node_at(request, *position)?),
            Query::Search { pattern } => QueryResponse::Matches(self.search(request, pattern)?),
            Query::FindReferences { name } => {
                QueryResponse::References(self.find_references(request, name)?)
            }
            Query::SearchText {
                pattern,
                case_sensitive,
                max_results,
            } => {
                let options = TextSearchOptions {
                    case_sensitive: *case_sensitive,
                    max_results: *max_results,
                    ..TextSearchOptions::default()
                };
                QueryResponse::Text(text_search::search_text(request, pattern, &options)?)
            }
        })
    }

    // === Directories ===

    /// Outline every supported file under `root`.
    ///
    /// Files are chosen by extension and well-known file name. Unreadable or
    /// non-UTF-8 files, grammar failures, and files with syntax errors are
    /// reported in [`CodebaseMap::errors`]; files with syntax errors still
    /// appear in [`CodebaseMap::files`].
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if `root` is not a readable directory.
    pub fn map_directory(&self, root: &Path) -> Result<CodebaseMap> {
        let started = Instant::now();
        map::require_dir(root)?;

        let (paths, mut errors) = map::discover_files(root, false);
        let mut files = Vec::new();
        for path in paths {
            let Some(language) = self.registry.resolve_language(&path, None) else {
                continue;
            };
            let relative = path.strip_prefix(root).unwrap_or(&path).to_path_buf();

            let text = match std::fs::read(&path) {
                Ok(bytes) => match String::from_utf8(bytes) {
                    Ok(text) => text,
                    Err(_) => {
                        errors.push(FileError::encoding_error(relative));
                        continue;
                    }
                },
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Cannot read file, skipping");
                    errors.push(FileError::io_error(relative, &e));
                    continue;
                }
            };

            let entry = match self.cache.get_or_create(&path, &text, language) {
                Ok(lookup) => lookup.entry,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Cannot analyze file, skipping");
                    errors.push(FileError::new(relative, FileErrorKind::GrammarError, e.to_string()));
                    continue;
                }
            };
            if let Some(first) = entry.errors().first() {
                errors.push(FileError::syntax(
                    relative.clone(),
                    entry.errors().len(),
                    first.span.start_line,
                ));
            }
            files.push(FileSummary {
                path: relative,
                language,
                outline: entry.outline().clone(),
                syntax_errors: entry.errors().len(),
                truncated: entry.truncated().to_vec(),
            });
        }

        info!(
            root = %root.display(),
            files = files.len(),
            errors = errors.len(),
            elapsed_ms = started.elapsed().as_millis(),
            "Mapped directory"
        );
        Ok(CodebaseMap {
            root: root.to_path_buf(),
            files,
            errors,
        })
    }

    /// Regular expression search over the files under `root`.
    ///
    /// Discovery follows [`Analyzer::map_directory`], except that hidden
    /// entries are searched when `options.include_hidden` is set. Any UTF-8
    /// file qualifies unless `options.language` narrows the search to files
    /// that grammar would be chosen for. Match paths are relative to `root`.
    ///
    /// # Errors
    ///
    /// Returns `Error::MalformedPattern` for an invalid pattern or glob, and
    /// `Error::Io` if `root` is not a readable directory.
    pub fn search_directory(
        &self,
        root: &Path,
        pattern: &str,
        options: &TextSearchOptions,
    ) -> Result<TextSearchResult> {
        let started = Instant::now();
        let compiled = TextPattern::new(pattern, options.case_sensitive)?;
        let filter = text_search::FileFilter::new(options)?;
        map::require_dir(root)?;

        let (paths, mut errors) = map::discover_files(root, options.include_hidden);
        let mut result =
            text_search::search_files(root, paths, &compiled, options.max_results, |path, relative| {
                filter.accepts(relative)
                    && options.language.is_none_or(|language| {
                        self.registry.resolve_language(path, None) == Some(language)
                    })
            });
        errors.append(&mut result.errors);
        result.errors = errors;

        info!(
            root = %root.display(),
            pattern,
            files = result.files_searched,
            matches = result.matches.len(),
            truncated = result.truncated,
            elapsed_ms = started.elapsed().as_millis(),
            "Searched directory"
        );
        Ok(result)
    }
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::new(AnalyzerConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    const STORE_PY: &str = "import os\n\nclass Store:\n    def load(self, key):\n        return self.read(key)\n\n    def save(self, key, value):\n        self.write(key, value)\n        self.read(key)\n\ndef main():\n    Store().save('a', 1)\n";

    fn request<'a>(path: &'a Path, text: &'a str) -> SourceRequest<'a> {
        SourceRequest::new(path, text)
    }

    #[test]
    fn outline_reports_language_and_cache_hit() {
        let analyzer = Analyzer::default();
        let path = PathBuf::from("store.py");

        let first = analyzer.get_outline(request(&path, STORE_PY)).expect("outline");
        let second = analyzer.get_outline(request(&path, STORE_PY)).expect("outline");

        assert_eq!(first.language, Language::Python);
        assert!(!first.cache_hit);
        assert!(second.cache_hit);
        assert_eq!(first.fingerprint, second.fingerprint);
        assert_eq!(first.outline, second.outline);
        assert_eq!(analyzer.cache().stats().parses, 1);
    }

    #[test]
    fn unsupported_file_is_a_typed_error() {
        let analyzer = Analyzer::default();
        let err = analyzer
            .get_outline(request(Path::new("notes.txt"), "plain words\n"))
            .unwrap_err();

        assert!(matches!(err, Error::Unsupported { .. }));
        assert!(analyzer.cache().is_empty());
    }

    #[test]
    fn language_override_beats_resolution() {
        let analyzer = Analyzer::default();
        let path = Path::new("script");
        let req = request(path, "def f():\n    pass\n").with_language(Some(Language::Python));

        let result = analyzer.get_outline(req).expect("outline");

        assert_eq!(result.outline.symbols[0].name, "f");
    }

    #[test]
    fn find_symbol_returns_qualified_names_in_source_order() {
        let analyzer = Analyzer::default();
        let path = PathBuf::from("store.py");

        let found = analyzer.find_symbol(request(&path, STORE_PY), "*a*").expect("search");

        let names: Vec<&str> = found.iter().map(|m| m.qualified_name.as_str()).collect();
        assert_eq!(names, ["Store.load", "Store.save", "main"]);
    }

    #[test]
    fn node_at_finds_the_smallest_node() {
        let analyzer = Analyzer::default();
        let path = PathBuf::from("store.py");
        let offset = STORE_PY.find("Store:").expect("class name");

        let found = analyzer
            .node_at(request(&path, STORE_PY), Position::Offset(offset))
            .expect("node");

        assert_eq!(found.node.kind, "identifier");
        assert_eq!(found.node.text, "Store");
        assert_eq!(found.node.field.as_deref(), Some("name"));
        assert_eq!(found.ancestors, ["module", "class_definition"]);
    }

    #[test]
    fn node_at_end_of_text_is_root_and_past_it_is_out_of_range() {
        let analyzer = Analyzer::default();
        let path = PathBuf::from("store.py");
        let len = STORE_PY.len();

        let at_end = analyzer
            .node_at(request(&path, STORE_PY), Position::Offset(len))
            .expect("end of text");
        assert_eq!(at_end.node.kind, "module");
        assert!(at_end.ancestors.is_empty());

        let past = analyzer
            .node_at(request(&path, STORE_PY), Position::Offset(len + 1))
            .unwrap_err();
        assert!(matches!(past, Error::OutOfRange { length, .. } if length == len));
    }

    #[test]
    fn search_reports_matching_nodes() {
        let analyzer = Analyzer::default();
        let path = PathBuf::from("store.py");

        let matches = analyzer
            .search(request(&path, STORE_PY), "(function_definition name: (identifier \"save\"))")
            .expect("search");

        assert_eq!(matches.len(), 1);
        assert!(matches[0].text.starts_with("def save"));
        assert_eq!(matches[0].span.start_line, 7);
    }

    #[test]
    fn malformed_pattern_leaves_cache_untouched() {
        let analyzer = Analyzer::default();
        let path = PathBuf::from("store.py");

        let err = analyzer.search(request(&path, STORE_PY), "(block").unwrap_err();

        assert!(matches!(err, Error::MalformedPattern { offset: 0, .. }));
        assert!(analyzer.cache().is_empty());
    }

    #[test]
    fn find_references_matches_exact_callee_names() {
        let analyzer = Analyzer::default();
        let path = PathBuf::from("store.py");

        let reads = analyzer.find_references(request(&path, STORE_PY), "read").expect("refs");
        let lines: Vec<u32> = reads.iter().map(|r| r.span.start_line).collect();

        assert_eq!(lines, [5, 9]);
        assert!(analyzer
            .find_references(request(&path, STORE_PY), "rea")
            .expect("refs")
            .is_empty());
    }

    #[test]
    fn execute_dispatches_each_query() {
        let analyzer = Analyzer::default();
        let path = PathBuf::from("store.py");
        let req = request(&path, STORE_PY);

        let response = analyzer
            .execute(req, &Query::FindReferences { name: "save".into() })
            .expect("query");
        assert!(matches!(response, QueryResponse::References(ref refs) if refs.len() == 1));

        let response = analyzer.execute(req, &Query::Outline).expect("query");
        assert!(matches!(response, QueryResponse::Outline(ref o) if o.cache_hit));
    }
}
