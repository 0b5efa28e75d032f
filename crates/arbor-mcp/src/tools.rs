//! MCP tool implementations.
//!
//! Each tool resolves its path inside the workspace, loads the text (inline
//! content wins over the file on disk), and runs the analyzer on tokio's
//! blocking pool. Parsing is CPU-bound and must not stall the stdio loop.

use crate::error::{Error, Result};
use crate::models::{
    CacheStatsResponse, CodebaseMapParams, FindReferencesParams, FindSymbolParams, KIND_NAMES,
    LANGUAGE_NAMES, NodeAtParams, OutlineParams, SearchParams, SearchTextParams,
};
use crate::workspace::Workspace;
use arbor::text_search::{self, DEFAULT_MAX_TEXT_MATCHES};
use arbor::{
    Analyzer, CodebaseMap, Language, NodeAtResult, NodeInfo, OutlineResult, Reference,
    SourceRequest, SymbolKind, SymbolMatch, TextSearchOptions, TextSearchResult,
};
use std::path::PathBuf;
use tracing::debug;

/// Source text ready to hand to the analyzer.
struct LoadedSource {
    path: PathBuf,
    text: String,
    language: Option<Language>,
}

/// Tool implementations for the arbor MCP server.
pub struct Tools {
    workspace: Workspace,
    analyzer: Analyzer,
}

impl Tools {
    /// Create a tool set confined to `workspace`.
    #[must_use]
    pub fn new(workspace: Workspace, analyzer: Analyzer) -> Self {
        Self {
            workspace,
            analyzer,
        }
    }

    /// The allowed root.
    #[must_use]
    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    /// The shared analyzer.
    #[must_use]
    pub fn analyzer(&self) -> &Analyzer {
        &self.analyzer
    }

    /// Outline a file.
    ///
    /// # Errors
    ///
    /// Returns an error if the path is outside the root, the file cannot be
    /// read, or the language is unsupported.
    pub async fn get_outline(&self, params: OutlineParams) -> Result<OutlineResult> {
        let source = self
            .load(&params.path, params.content, params.language.as_deref())
            .await?;
        self.analyze(source, |analyzer, request| analyzer.get_outline(request))
            .await
    }

    /// Find symbols whose names match a pattern, optionally of one kind.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidArgument` for an unknown kind, and analysis
    /// errors (including `MalformedPattern`) otherwise.
    pub async fn find_symbol(&self, params: FindSymbolParams) -> Result<Vec<SymbolMatch>> {
        let kind = params
            .kind
            .as_deref()
            .map(|name| {
                SymbolKind::from_name(name).ok_or_else(|| Error::InvalidArgument {
                    field: "kind",
                    value: name.to_string(),
                    valid_values: KIND_NAMES,
                })
            })
            .transpose()?;
        let source = self
            .load(&params.path, params.content, params.language.as_deref())
            .await?;
        let pattern = params.pattern;

        let mut matches = self
            .analyze(source, move |analyzer, request| {
                analyzer.find_symbol(request, &pattern)
            })
            .await?;
        if let Some(kind) = kind {
            matches.retain(|m| m.symbol.kind == kind);
        }
        Ok(matches)
    }

    /// Describe the innermost node at a position.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidArgument` unless exactly one of `offset` or
    /// `line` + `column` is given, and `OutOfRange` for positions outside the text.
    pub async fn node_at(&self, params: NodeAtParams) -> Result<NodeAtResult> {
        let position = params.position().ok_or_else(|| Error::InvalidArgument {
            field: "position",
            value: format!(
                "offset={:?}, line={:?}, column={:?}",
                params.offset, params.line, params.column
            ),
            valid_values: "either offset, or both line and column",
        })?;
        let source = self
            .load(&params.path, params.content, params.language.as_deref())
            .await?;
        self.analyze(source, move |analyzer, request| {
            analyzer.node_at(request, position)
        })
        .await
    }

    /// Run a structural pattern over a file.
    ///
    /// # Errors
    ///
    /// Returns `MalformedPattern` for an invalid pattern, and the usual
    /// path and language errors.
    pub async fn search_structure(&self, params: SearchParams) -> Result<Vec<NodeInfo>> {
        let source = self
            .load(&params.path, params.content, params.language.as_deref())
            .await?;
        let pattern = params.pattern;
        self.analyze(source, move |analyzer, request| {
            analyzer.search(request, &pattern)
        })
        .await
    }

    /// Find identifier occurrences of a name.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be loaded or analyzed.
    pub async fn find_references(&self, params: FindReferencesParams) -> Result<Vec<Reference>> {
        let source = self
            .load(&params.path, params.content, params.language.as_deref())
            .await?;
        let name = params.name;
        self.analyze(source, move |analyzer, request| {
            analyzer.find_references(request, &name)
        })
        .await
    }

    /// Regular expression search over a file, a directory, or inline content.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidArgument` for a zero `max_results` or an unknown
    /// language, `MalformedPattern` for an invalid pattern or glob, and the
    /// usual path errors.
    pub async fn search_text(&self, params: SearchTextParams) -> Result<TextSearchResult> {
        let max_results = params.max_results.unwrap_or(DEFAULT_MAX_TEXT_MATCHES);
        if max_results == 0 {
            return Err(Error::InvalidArgument {
                field: "max_results",
                value: "0".to_string(),
                valid_values: "a positive integer",
            });
        }
        let options = TextSearchOptions {
            case_sensitive: params.case_sensitive,
            max_results,
            include: params.include,
            exclude: params.exclude,
            include_hidden: params.include_hidden,
            language: params.language.as_deref().map(parse_language).transpose()?,
        };
        let pattern = params.pattern;

        let target = match params.path.as_deref() {
            Some(path) => self.workspace.resolve(path)?,
            None => self.workspace.root().to_path_buf(),
        };
        if params.content.is_none() && tokio::fs::metadata(&target).await?.is_dir() {
            debug!(dir = %target.display(), "Searching directory");
            let analyzer = self.analyzer.clone();
            let result = tokio::task::spawn_blocking(move || {
                analyzer.search_directory(&target, &pattern, &options)
            })
            .await??;
            return Ok(result);
        }

        let source = read_source(target, params.content, options.language).await?;
        self.analyze(source, move |_, request| {
            text_search::search_text(request, &pattern, &options)
        })
        .await
    }

    /// Outline every supported file under a directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory is outside the root or unreadable.
    pub async fn codebase_map(&self, params: &CodebaseMapParams) -> Result<CodebaseMap> {
        let dir = match params.path.as_deref() {
            Some(path) => self.workspace.resolve(path)?,
            None => self.workspace.root().to_path_buf(),
        };
        debug!(dir = %dir.display(), "Mapping directory");

        let analyzer = self.analyzer.clone();
        let map = tokio::task::spawn_blocking(move || analyzer.map_directory(&dir)).await??;
        Ok(map)
    }

    /// Report parse cache counters.
    #[must_use]
    pub fn cache_stats(&self) -> CacheStatsResponse {
        CacheStatsResponse {
            root: self.workspace.root().display().to_string(),
            stats: self.analyzer.cache().stats(),
        }
    }

    async fn load(
        &self,
        path: &str,
        content: Option<String>,
        language: Option<&str>,
    ) -> Result<LoadedSource> {
        let language = language.map(parse_language).transpose()?;
        let path = self.workspace.resolve(path)?;
        read_source(path, content, language).await
    }

    async fn analyze<T, F>(&self, source: LoadedSource, op: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&Analyzer, SourceRequest<'_>) -> arbor::Result<T> + Send + 'static,
    {
        let analyzer = self.analyzer.clone();
        let result = tokio::task::spawn_blocking(move || {
            let request =
                SourceRequest::new(&source.path, &source.text).with_language(source.language);
            op(&analyzer, request)
        })
        .await??;
        Ok(result)
    }
}

/// Inline content wins over the file at `path`.
async fn read_source(
    path: PathBuf,
    content: Option<String>,
    language: Option<Language>,
) -> Result<LoadedSource> {
    let text = match content {
        Some(text) => text,
        None => tokio::fs::read_to_string(&path).await?,
    };
    debug!(path = %path.display(), bytes = text.len(), "Loaded source");
    Ok(LoadedSource {
        path,
        text,
        language,
    })
}

fn parse_language(name: &str) -> Result<Language> {
    Language::from_name(name).ok_or_else(|| Error::InvalidArgument {
        field: "language",
        value: name.to_string(),
        valid_values: LANGUAGE_NAMES,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::python("python", Language::Python)]
    #[case::uppercase("Rust", Language::Rust)]
    #[case::alias("c#", Language::CSharp)]
    #[case::tsx("tsx", Language::Tsx)]
    fn test_parse_language(#[case] input: &str, #[case] expected: Language) {
        assert_eq!(parse_language(input).expect("known language"), expected);
    }

    #[test]
    fn test_parse_language_rejects_unknown() {
        let err = parse_language("cobol").unwrap_err();
        assert!(matches!(err, Error::InvalidArgument { field: "language", .. }));
        assert!(err.to_string().contains("kotlin"));
    }
}
