//! Shared tree and text utilities for language support modules.
//!
//! Converts tree-sitter positions into [`Span`]s and normalizes the text
//! fragments (names, import paths, callee expressions) that every language
//! module extracts.

// Tree-sitter returns usize for rows and columns, but we store u32 for compactness.
// This is safe for practical source files (no file has 4 billion lines).
#![allow(clippy::cast_possible_truncation)]

use crate::types::Span;

/// Convert tree-sitter positions to our Span type.
///
/// Tree-sitter uses 0-indexed rows and columns; Span uses 1-indexed.
/// Falls back to an empty span at the start position if the node produces
/// an inverted range.
pub fn node_span(node: &tree_sitter::Node) -> Span {
    let start = node.start_position();
    let end = node.end_position();
    let start_line = start.row as u32 + 1;
    let start_col = start.column as u32 + 1;
    let end_line = end.row as u32 + 1;
    let end_col = end.column as u32 + 1;

    Span::new(
        node.start_byte(),
        node.end_byte(),
        start_line,
        start_col,
        end_line,
        end_col,
    )
    .unwrap_or_else(|| {
        tracing::warn!(
            start_line,
            start_col,
            end_line,
            end_col,
            node_kind = %node.kind(),
            "Tree-sitter produced invalid span, using fallback"
        );
        Span {
            start_byte: node.start_byte(),
            end_byte: node.start_byte(),
            start_line,
            start_column: start_col,
            end_line: start_line,
            end_column: start_col,
        }
    })
}

/// Collapse every whitespace run to a single space and trim the ends.
#[must_use]
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Normalize an import target: drop quotes, angle brackets, and a trailing `;`.
#[must_use]
pub fn clean_import_path(text: &str) -> String {
    let collapsed = collapse_whitespace(text);
    collapsed
        .trim_end_matches(';')
        .trim_matches(|c| matches!(c, '"' | '\'' | '`' | '<' | '>'))
        .trim()
        .to_string()
}

/// Whether a node kind names an identifier token in any supported grammar.
///
/// Type identifiers are excluded so that parameter types are never mistaken
/// for parameter names. Qualified paths (`Outer::name`) are not identifiers
/// either: callers descend into them to reach the final segment.
#[must_use]
pub fn is_identifier_kind(kind: &str) -> bool {
    (kind == "identifier" || kind.ends_with("_identifier") || kind == "name" || kind == "constant")
        && !matches!(
            kind,
            "type_identifier" | "qualified_identifier" | "scoped_identifier" | "scoped_type_identifier"
        )
}

/// Reduce a callee expression to the name being called.
///
/// `self.store.save` → `save`, `Foo::bar::<T>` → `bar`, `$this->load` →
/// `load`, `std::make_unique<Widget>` → `make_unique`, `Store().save` →
/// `save`. Ruby-style `?`/`!` suffixes are kept.
#[must_use]
pub fn callee_name(text: &str) -> Option<String> {
    // Drop bracketed parts: arguments, generics, indexing.
    let mut depth = 0usize;
    let mut head = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '(' | '<' | '{' | '[' => depth += 1,
            ')' | '}' | ']' => depth = depth.saturating_sub(1),
            '>' if depth > 0 => depth -= 1,
            _ if depth == 0 => head.push(c),
            _ => {}
        }
    }
    let head = head.trim_end().trim_end_matches(':').trim_end();
    let segment = head
        .rsplit(|c: char| !(c.is_alphanumeric() || matches!(c, '_' | '?' | '!')))
        .next()?;
    let segment = segment.trim_start_matches(['?', '!']);
    if segment.is_empty() || segment.chars().all(|c| matches!(c, '?' | '!')) {
        return None;
    }
    Some(segment.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::plain("print", Some("print"))]
    #[case::attribute("self.store.save", Some("save"))]
    #[case::scoped("Vec::new", Some("new"))]
    #[case::turbofish("iter.collect::<Vec<_>>", Some("collect"))]
    #[case::template("std::make_unique<Widget>", Some("make_unique"))]
    #[case::php_arrow("$this->load", Some("load"))]
    #[case::safe_call("user?.name", Some("name"))]
    #[case::ruby_bang("save!", Some("save!"))]
    #[case::chained("Store().save", Some("save"))]
    #[case::indexed("handlers[0].run", Some("run"))]
    #[case::empty("", None)]
    #[case::punctuation("()", None)]
    fn callee_name_extracts_last_segment(#[case] text: &str, #[case] expected: Option<&str>) {
        assert_eq!(callee_name(text).as_deref(), expected);
    }

    #[rstest]
    #[case::double_quotes("\"net/http\"", "net/http")]
    #[case::single_quotes("'./util'", "./util")]
    #[case::system_header("<vector>", "vector")]
    #[case::semicolon("std::io;", "std::io")]
    #[case::multiline("a\n   .b", "a .b")]
    fn clean_import_path_strips_delimiters(#[case] text: &str, #[case] expected: &str) {
        assert_eq!(clean_import_path(text), expected);
    }

    #[test]
    fn identifier_kinds_exclude_type_identifiers() {
        assert!(is_identifier_kind("identifier"));
        assert!(is_identifier_kind("field_identifier"));
        assert!(is_identifier_kind("simple_identifier"));
        assert!(is_identifier_kind("name"));
        assert!(!is_identifier_kind("type_identifier"));
        assert!(!is_identifier_kind("qualified_identifier"));
        assert!(!is_identifier_kind("string"));
    }

    #[test]
    fn collapse_whitespace_joins_runs() {
        assert_eq!(collapse_whitespace("  a \n\t b  "), "a b");
    }
}
