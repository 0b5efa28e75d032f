//! Textual search: regular expressions over raw text, one line at a time.
//!
//! Unlike [`crate::pattern`], nothing here needs a grammar, so any UTF-8
//! file can be searched. A directory search walks the same tree as a
//! codebase map and narrows it with include and exclude globs.
//!
//! Each matching line is reported once, with the span of its first match.

use std::path::{Path, PathBuf};

use regex::{Regex, RegexBuilder};
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{Error, FileError, Result};
use crate::query::{excerpt, SourceRequest};
use crate::types::{Language, Span};

/// Default most matching lines returned by one search.
pub const DEFAULT_MAX_TEXT_MATCHES: usize = 100;

/// Largest compiled program a search pattern may produce, in bytes.
const REGEX_SIZE_LIMIT: usize = 1 << 20;

const GLOB_OPTIONS: glob::MatchOptions = glob::MatchOptions {
    case_sensitive: true,
    require_literal_separator: false,
    require_literal_leading_dot: false,
};

/// How to run a textual search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextSearchOptions {
    /// Match letter case exactly
    pub case_sensitive: bool,
    /// Most matching lines returned
    pub max_results: usize,
    /// Only files whose name or relative path matches this glob
    pub include: Option<String>,
    /// Skip files whose name or relative path matches this glob
    pub exclude: Option<String>,
    /// Also search hidden files and directories
    pub include_hidden: bool,
    /// Only files this grammar would be chosen for
    pub language: Option<Language>,
}

impl Default for TextSearchOptions {
    fn default() -> Self {
        Self {
            case_sensitive: false,
            max_results: DEFAULT_MAX_TEXT_MATCHES,
            include: None,
            exclude: None,
            include_hidden: false,
            language: None,
        }
    }
}

/// A line containing a match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextMatch {
    /// Document path; relative to the searched root in a directory search
    pub path: PathBuf,
    /// Extent of the first match on the line
    pub span: Span,
    /// The matched text
    pub text: String,
    /// The whole line without its terminator, cut like node excerpts
    pub line_text: String,
}

/// Result of a textual search.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TextSearchResult {
    /// Matching lines, ordered by path and then by line
    pub matches: Vec<TextMatch>,
    /// Files whose text was searched
    pub files_searched: usize,
    /// The search stopped at `max_results`; more lines may match
    pub truncated: bool,
    /// Files that could not be read
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<FileError>,
}

/// A compiled search pattern.
#[derive(Debug, Clone)]
pub struct TextPattern {
    regex: Regex,
}

impl TextPattern {
    /// Compile `pattern` with regular expression syntax.
    ///
    /// # Errors
    ///
    /// Returns `Error::MalformedPattern` if the expression is invalid or
    /// compiles to more than the size limit.
    pub fn new(pattern: &str, case_sensitive: bool) -> Result<Self> {
        RegexBuilder::new(pattern)
            .case_insensitive(!case_sensitive)
            .size_limit(REGEX_SIZE_LIMIT)
            .build()
            .map(|regex| Self { regex })
            .map_err(|e| Error::malformed(0, e.to_string()))
    }

    /// Matching lines of `text`, at most `limit` of them, in line order.
    #[must_use]
    pub fn find_lines(&self, path: &Path, text: &str, limit: usize) -> Vec<TextMatch> {
        let mut found = Vec::new();
        let mut line_start = 0;
        for (index, raw) in text.split_inclusive('\n').enumerate() {
            if found.len() >= limit {
                break;
            }
            let line = raw.trim_end_matches(['\n', '\r']);
            if let Some(m) = self.regex.find(line) {
                let line_no = to_u32(index + 1);
                found.push(TextMatch {
                    path: path.to_path_buf(),
                    span: Span {
                        start_byte: line_start + m.start(),
                        end_byte: line_start + m.end(),
                        start_line: line_no,
                        start_column: to_u32(m.start() + 1),
                        end_line: line_no,
                        end_column: to_u32(m.end() + 1),
                    },
                    text: excerpt(m.as_str()),
                    line_text: excerpt(line),
                });
            }
            line_start += raw.len();
        }
        found
    }

    /// Search one line budget's worth of `text`, flagging overflow.
    fn search(&self, path: &Path, text: &str, limit: usize) -> (Vec<TextMatch>, bool) {
        let mut found = self.find_lines(path, text, limit.saturating_add(1));
        let truncated = found.len() > limit;
        found.truncate(limit);
        (found, truncated)
    }
}

/// Search one document's text.
///
/// The include, exclude, hidden and language filters only apply to
/// directory searches.
///
/// # Errors
///
/// Returns `Error::MalformedPattern` if `pattern` does not compile.
pub fn search_text(
    request: SourceRequest<'_>,
    pattern: &str,
    options: &TextSearchOptions,
) -> Result<TextSearchResult> {
    let compiled = TextPattern::new(pattern, options.case_sensitive)?;
    let (matches, truncated) = compiled.search(request.path, request.text, options.max_results);
    debug!(pattern, matches = matches.len(), truncated, "Text search");
    Ok(TextSearchResult {
        matches,
        files_searched: 1,
        truncated,
        errors: Vec::new(),
    })
}

/// File filter built from the include and exclude globs.
pub(crate) struct FileFilter {
    include: Option<glob::Pattern>,
    exclude: Option<glob::Pattern>,
}

impl FileFilter {
    /// Compile the globs in `options`.
    pub(crate) fn new(options: &TextSearchOptions) -> Result<Self> {
        Ok(Self {
            include: compile_glob("include", options.include.as_deref())?,
            exclude: compile_glob("exclude", options.exclude.as_deref())?,
        })
    }

    /// Whether `relative` (a path under the searched root) passes the globs.
    pub(crate) fn accepts(&self, relative: &Path) -> bool {
        let hit = |pattern: &glob::Pattern| {
            pattern.matches_path_with(relative, GLOB_OPTIONS)
                || relative
                    .file_name()
                    .and_then(|name| name.to_str())
                    .is_some_and(|name| pattern.matches_with(name, GLOB_OPTIONS))
        };
        self.include.as_ref().is_none_or(hit) && !self.exclude.as_ref().is_some_and(hit)
    }
}

fn compile_glob(which: &str, pattern: Option<&str>) -> Result<Option<glob::Pattern>> {
    pattern
        .filter(|p| !p.is_empty())
        .map(|p| {
            glob::Pattern::new(p)
                .map_err(|e| Error::malformed(e.pos, format!("{which} glob: {}", e.msg)))
        })
        .transpose()
}

/// Search the files under `root` that `accepts` lets through.
///
/// Files are visited in sorted path order. Files that are not valid UTF-8
/// or contain NUL bytes are treated as binary and skipped silently.
pub(crate) fn search_files(
    root: &Path,
    paths: Vec<PathBuf>,
    pattern: &TextPattern,
    max_results: usize,
    accepts: impl Fn(&Path, &Path) -> bool,
) -> TextSearchResult {
    let mut result = TextSearchResult::default();
    for path in paths {
        let relative = path.strip_prefix(root).unwrap_or(&path).to_path_buf();
        if !accepts(&path, &relative) {
            continue;
        }
        let remaining = max_results - result.matches.len();
        if remaining == 0 {
            result.truncated = true;
            break;
        }

        let text = match std::fs::read(&path) {
            Ok(bytes) => match String::from_utf8(bytes) {
                Ok(text) if !text.contains('\0') => text,
                _ => {
                    debug!(path = %path.display(), "Binary file, skipping");
                    continue;
                }
            },
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Cannot read file, skipping");
                result.errors.push(FileError::io_error(relative, &e));
                continue;
            }
        };

        result.files_searched += 1;
        let (found, truncated) = pattern.search(&relative, &text, remaining);
        result.matches.extend(found);
        if truncated {
            result.truncated = true;
            break;
        }
    }
    result
}

fn to_u32(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn search(text: &str, pattern: &str, options: &TextSearchOptions) -> TextSearchResult {
        search_text(SourceRequest::new(Path::new("app.py"), text), pattern, options)
            .expect("pattern should compile")
    }

    #[test]
    fn reports_line_column_and_span() {
        let text = "import os\n\ndef load(key):\n    return os.getenv(key)\n";

        let result = search(text, r"os\.\w+", &TextSearchOptions::default());

        assert_eq!(result.matches.len(), 1);
        let found = &result.matches[0];
        assert_eq!(found.text, "os.getenv");
        assert_eq!(found.line_text, "    return os.getenv(key)");
        assert_eq!(found.span.start_line, 4);
        assert_eq!(found.span.start_column, 12);
        assert_eq!(&text[found.span.start_byte..found.span.end_byte], "os.getenv");
        assert!(!result.truncated);
    }

    #[rstest]
    #[case::insensitive_by_default(false, 2)]
    #[case::sensitive(true, 1)]
    fn case_sensitivity(#[case] case_sensitive: bool, #[case] expected: usize) {
        let options = TextSearchOptions {
            case_sensitive,
            ..TextSearchOptions::default()
        };

        let result = search("Error = 1\nerror = 2\n", "Error", &options);

        assert_eq!(result.matches.len(), expected);
    }

    #[test]
    fn one_entry_per_line() {
        let result = search("a = a + a\n", "a", &TextSearchOptions::default());

        assert_eq!(result.matches.len(), 1);
        assert_eq!(result.matches[0].span.start_column, 1);
    }

    #[test]
    fn max_results_truncates() {
        let options = TextSearchOptions {
            max_results: 2,
            ..TextSearchOptions::default()
        };

        let result = search("x\nx\nx\n", "x", &options);

        assert_eq!(result.matches.len(), 2);
        assert!(result.truncated);
        assert_eq!(result.matches[1].span.start_line, 2);
    }

    #[test]
    fn exact_limit_is_not_truncated() {
        let options = TextSearchOptions {
            max_results: 2,
            ..TextSearchOptions::default()
        };

        let result = search("x\ny\nx\n", "x", &options);

        assert_eq!(result.matches.len(), 2);
        assert!(!result.truncated);
    }

    #[test]
    fn crlf_lines_drop_the_carriage_return() {
        let result = search("a = 1\r\nb = 2\r\n", r"\d$", &TextSearchOptions::default());

        assert_eq!(result.matches.len(), 2);
        assert_eq!(result.matches[1].line_text, "b = 2");
        assert_eq!(result.matches[1].span.start_byte, 11);
    }

    #[test]
    fn invalid_regex_is_malformed_pattern() {
        let err = TextPattern::new("(unclosed", false).unwrap_err();
        assert!(matches!(err, Error::MalformedPattern { .. }));
        assert!(err.is_input_error());
    }

    #[test]
    fn oversized_regex_is_malformed_pattern() {
        let err = TextPattern::new(r"(?:\w{1000}){1000}", true).unwrap_err();
        assert!(matches!(err, Error::MalformedPattern { .. }));
    }

    #[rstest]
    #[case::no_globs(None, None, "src/app.py", true)]
    #[case::include_by_name(Some("*.py"), None, "src/app.py", true)]
    #[case::include_misses(Some("*.rs"), None, "src/app.py", false)]
    #[case::include_by_path(Some("src/**/*.py"), None, "src/deep/app.py", true)]
    #[case::exclude_by_name(None, Some("*.min.js"), "web/app.min.js", false)]
    #[case::exclude_by_dir(None, Some("vendored/*"), "vendored/lib.py", false)]
    #[case::exclude_wins(Some("*.py"), Some("test_*"), "test_app.py", false)]
    fn file_filter(
        #[case] include: Option<&str>,
        #[case] exclude: Option<&str>,
        #[case] path: &str,
        #[case] expected: bool,
    ) {
        let options = TextSearchOptions {
            include: include.map(str::to_string),
            exclude: exclude.map(str::to_string),
            ..TextSearchOptions::default()
        };

        let filter = FileFilter::new(&options).expect("globs should compile");

        assert_eq!(filter.accepts(Path::new(path)), expected);
    }

    #[test]
    fn invalid_glob_names_the_option() {
        let options = TextSearchOptions {
            exclude: Some("[unclosed".to_string()),
            ..TextSearchOptions::default()
        };

        let Err(Error::MalformedPattern { message, .. }) = FileFilter::new(&options) else {
            panic!("expected a malformed pattern");
        };
        assert!(message.starts_with("exclude glob"));
    }
}
