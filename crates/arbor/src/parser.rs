//! Tree-sitter parsing under a resource budget.
//!
//! ## Responsibilities
//!
//! - Drive a grammar over source text with tree-sitter's error recovery
//! - Convert the result into an owned [`SyntaxNode`] tree
//! - Report syntax errors and budget truncations as data
//!
//! ## Design
//!
//! Every call builds its own `tree_sitter::Parser`. Parsers are cheap to
//! create and hold mutable state, so a fresh one per call keeps `parse`
//! side-effect free and safe to run from many threads at once.

use std::time::Instant;

use tracing::{debug, warn};

use crate::config::Budget;
use crate::error::{Error, Result};
use crate::languages::get_language_support;
use crate::syntax::{collect_errors, convert, SyntaxNode};
use crate::types::{Language, Span, SyntaxError, Truncation};

/// A parsed document: tree, syntax errors, and budgets that were hit.
#[derive(Debug, Clone)]
pub struct ParsedTree {
    /// Root of the owned syntax tree
    pub root: SyntaxNode,
    /// Advisory syntax errors, in source order
    pub errors: Vec<SyntaxError>,
    /// Budgets exceeded while parsing (empty for a complete tree)
    pub truncated: Vec<Truncation>,
}

/// Parse `text` as `language`.
///
/// Malformed input never fails: unparsable regions become ERROR nodes and are
/// listed in [`ParsedTree::errors`]. Exceeding the budget yields a partial
/// tree plus a [`Truncation`] marker.
///
/// # Errors
///
/// Returns `Error::Grammar` if the grammar cannot be loaded into a parser
/// (an ABI mismatch between tree-sitter and the grammar crate).
pub fn parse(text: &str, language: Language, budget: &Budget) -> Result<ParsedTree> {
    let started = Instant::now();
    let mut parser = tree_sitter::Parser::new();
    parser
        .set_language(&get_language_support(language).tree_sitter_language())
        .map_err(|e| Error::Grammar(format!("{language}: {e}")))?;

    let mut truncated = Vec::new();
    let source = clip_source(text, budget.max_source_bytes);
    if source.len() < text.len() {
        warn!(
            %language,
            bytes = text.len(),
            limit = budget.max_source_bytes,
            "Source exceeds byte budget, parsing prefix only"
        );
        truncated.push(Truncation::SourceTruncated {
            limit: budget.max_source_bytes,
        });
    }

    if let Some(timeout) = budget.parse_timeout() {
        parser.set_timeout_micros(u64::try_from(timeout.as_micros()).unwrap_or(u64::MAX));
    }

    let Some(tree) = parser.parse(source, None) else {
        parser.reset();
        warn!(
            %language,
            timeout_ms = budget.parse_timeout_ms,
            "Parse timed out, returning degraded tree"
        );
        truncated.push(Truncation::ParseTimeout {
            timeout_ms: budget.parse_timeout_ms,
        });
        return Ok(ParsedTree {
            root: SyntaxNode::degraded(whole_span(source)),
            errors: Vec::new(),
            truncated,
        });
    };

    let converted = convert(&tree, budget);
    if !converted.truncated.is_empty() {
        warn!(%language, truncated = ?converted.truncated, "Syntax tree cut by budget");
    }
    truncated.extend(converted.truncated);

    let errors = collect_errors(&converted.root, source);
    debug!(
        %language,
        bytes = source.len(),
        errors = errors.len(),
        elapsed_ms = started.elapsed().as_millis(),
        "Parsed document"
    );

    Ok(ParsedTree {
        root: converted.root,
        errors,
        truncated,
    })
}

/// The longest prefix of `text` within `limit` bytes that ends on a char boundary.
fn clip_source(text: &str, limit: usize) -> &str {
    if text.len() <= limit {
        return text;
    }
    let mut end = limit;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

/// A span covering all of `text`.
#[allow(clippy::cast_possible_truncation)]
fn whole_span(text: &str) -> Span {
    let lines = text.split('\n').count() as u32;
    let last_line = text.rsplit('\n').next().unwrap_or_default();
    Span {
        start_byte: 0,
        end_byte: text.len(),
        start_line: 1,
        start_column: 1,
        end_line: lines.max(1),
        end_column: last_line.len() as u32 + 1,
    }
}
