//! MCP parameter and response models.
//!
//! Parameters derive `JsonSchema` so rmcp can advertise tool input schemas.
//! Analysis results are serialized straight from the arbor types.

use arbor::{CacheStats, CodebaseMap, MapStats, Position};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Accepted spellings for the `language` parameter.
pub const LANGUAGE_NAMES: &str =
    "python, javascript, typescript, tsx, java, cpp, ruby, go, rust, php, csharp, kotlin";

/// Accepted values for the `kind` filter.
pub const KIND_NAMES: &str = "class, function, method, field, variable, module, import";

/// Parameters for the `get_outline` tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct OutlineParams {
    /// File path, relative to the server root or absolute inside it.
    pub path: String,

    /// Source text to analyze instead of reading the file.
    #[serde(default)]
    pub content: Option<String>,

    /// Language override (e.g., "python", "rust", "tsx").
    #[serde(default)]
    pub language: Option<String>,
}

/// Parameters for the `find_symbol` tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct FindSymbolParams {
    /// File path, relative to the server root or absolute inside it.
    pub path: String,

    /// Case-insensitive name pattern. Glob syntax (`*`, `?`, `[...]`) or a plain substring.
    pub pattern: String,

    /// Only return symbols of this kind (class, function, method, field, variable, module, import).
    #[serde(default)]
    pub kind: Option<String>,

    /// Source text to analyze instead of reading the file.
    #[serde(default)]
    pub content: Option<String>,

    /// Language override.
    #[serde(default)]
    pub language: Option<String>,
}

/// Parameters for the `node_at` tool.
///
/// Give either `offset` or both `line` and `column`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct NodeAtParams {
    /// File path, relative to the server root or absolute inside it.
    pub path: String,

    /// Byte offset from the start of the file.
    #[serde(default)]
    pub offset: Option<usize>,

    /// Line number, starting at 1.
    #[serde(default)]
    pub line: Option<u32>,

    /// Byte column, starting at 1.
    #[serde(default)]
    pub column: Option<u32>,

    /// Source text to analyze instead of reading the file.
    #[serde(default)]
    pub content: Option<String>,

    /// Language override.
    #[serde(default)]
    pub language: Option<String>,
}

impl NodeAtParams {
    /// The requested position, if exactly one form was given.
    #[must_use]
    pub fn position(&self) -> Option<Position> {
        match (self.offset, self.line, self.column) {
            (Some(offset), None, None) => Some(Position::Offset(offset)),
            (None, Some(line), Some(column)) => Some(Position::LineColumn { line, column }),
            _ => None,
        }
    }
}

/// Parameters for the `search_structure` tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SearchParams {
    /// File path, relative to the server root or absolute inside it.
    pub path: String,

    /// S-expression pattern, e.g. `(call function: (attribute))`.
    pub pattern: String,

    /// Source text to analyze instead of reading the file.
    #[serde(default)]
    pub content: Option<String>,

    /// Language override.
    #[serde(default)]
    pub language: Option<String>,
}

/// Parameters for the `find_references` tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct FindReferencesParams {
    /// File path, relative to the server root or absolute inside it.
    pub path: String,

    /// Exact identifier to look for.
    pub name: String,

    /// Source text to analyze instead of reading the file.
    #[serde(default)]
    pub content: Option<String>,

    /// Language override.
    #[serde(default)]
    pub language: Option<String>,
}

/// Parameters for the `search_text` tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SearchTextParams {
    /// Regular expression, matched within single lines (e.g. `fn\s+\w+`).
    pub pattern: String,

    /// File or directory to search. Defaults to the server root.
    #[serde(default)]
    pub path: Option<String>,

    /// Text to search instead of reading `path`, which then names the document.
    #[serde(default)]
    pub content: Option<String>,

    /// Match letter case exactly. Default is case-insensitive.
    #[serde(default)]
    pub case_sensitive: bool,

    /// Only files whose name or relative path matches this glob (e.g. `*.py`, `src/**/*.rs`).
    #[serde(default)]
    pub include: Option<String>,

    /// Skip files whose name or relative path matches this glob (e.g. `*.min.js`).
    #[serde(default)]
    pub exclude: Option<String>,

    /// Most matching lines returned. Default is 100.
    #[serde(default)]
    pub max_results: Option<usize>,

    /// Also search hidden files and directories.
    #[serde(default)]
    pub include_hidden: bool,

    /// Only files of this language.
    #[serde(default)]
    pub language: Option<String>,
}

/// Parameters for the `codebase_map` tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct CodebaseMapParams {
    /// Directory to map. Defaults to the server root.
    #[serde(default)]
    pub path: Option<String>,

    /// Return the rendered text report instead of JSON.
    #[serde(default)]
    pub text: bool,
}

/// Response from the `cache_stats` tool.
#[derive(Debug, Clone, Serialize)]
pub struct CacheStatsResponse {
    /// The server's root directory.
    pub root: String,

    /// Parse cache counters.
    #[serde(flatten)]
    pub stats: CacheStats,
}

/// Response from the `codebase_map` tool in JSON mode.
#[derive(Debug, Clone, Serialize)]
pub struct CodebaseMapResponse {
    /// Aggregate counts.
    pub stats: MapStats,

    /// The full map.
    #[serde(flatten)]
    pub map: CodebaseMap,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn node_at(offset: Option<usize>, line: Option<u32>, column: Option<u32>) -> NodeAtParams {
        NodeAtParams {
            path: "a.py".to_string(),
            offset,
            line,
            column,
            content: None,
            language: None,
        }
    }

    #[rstest]
    #[case::offset(Some(4), None, None, Some(Position::Offset(4)))]
    #[case::line_column(None, Some(2), Some(3), Some(Position::LineColumn { line: 2, column: 3 }))]
    #[case::nothing(None, None, None, None)]
    #[case::line_only(None, Some(2), None, None)]
    #[case::both_forms(Some(1), Some(2), Some(3), None)]
    fn test_node_at_position(
        #[case] offset: Option<usize>,
        #[case] line: Option<u32>,
        #[case] column: Option<u32>,
        #[case] expected: Option<Position>,
    ) {
        assert_eq!(node_at(offset, line, column).position(), expected);
    }

    #[test]
    fn test_optional_fields_default() {
        let params: OutlineParams =
            serde_json::from_str(r#"{"path": "src/app.py"}"#).expect("valid params");
        assert_eq!(params.path, "src/app.py");
        assert!(params.content.is_none());
        assert!(params.language.is_none());

        let params: CodebaseMapParams = serde_json::from_str("{}").expect("valid params");
        assert!(params.path.is_none());
        assert!(!params.text);

        let params: SearchTextParams =
            serde_json::from_str(r#"{"pattern": "TODO"}"#).expect("valid params");
        assert!(params.path.is_none());
        assert!(!params.case_sensitive);
        assert!(!params.include_hidden);
        assert!(params.max_results.is_none());
    }
}
