//! Structural patterns: S-expressions matched against syntax trees.
//!
//! ```text
//! pattern  := '(' head item* ')' | '_'
//! head     := KIND | '_'
//! item     := FIELD ':' pattern | pattern | STRING
//! ```
//!
//! - `(kind)` matches a named node of that kind; `(_)` and `_` match any named node
//! - `field: (p)` requires the child in `field` to match `p`
//! - bare child patterns match distinct named children, in order, with gaps allowed
//! - `"text"` requires the node's source text to equal the string
//! - `;` starts a comment that runs to the end of the line
//!
//! ```text
//! (function_definition name: (identifier "main"))
//! (class_definition body: (block (function_definition) (function_definition)))
//! ```

use crate::error::{Error, Result};
use crate::syntax::SyntaxNode;

/// Deepest `(...)` nesting a pattern may use.
///
/// Parsing and matching both recurse once per level.
pub const MAX_PATTERN_DEPTH: usize = 256;

/// A compiled structural pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    root: PatternNode,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum PatternNode {
    /// Bare `_`
    Any,
    Node {
        /// `None` for `(_)`
        kind: Option<String>,
        fields: Vec<(String, PatternNode)>,
        children: Vec<PatternNode>,
        text: Option<String>,
    },
}

impl Pattern {
    /// Compile a pattern.
    ///
    /// # Errors
    ///
    /// Returns `Error::MalformedPattern` with the byte offset of the first
    /// problem: unbalanced parentheses, an empty pattern, a field without a
    /// pattern, an unterminated string, or input after the pattern.
    pub fn parse(source: &str) -> Result<Self> {
        let mut parser = Parser {
            source,
            pos: 0,
            depth: 0,
        };
        parser.skip_trivia();
        if parser.at_end() {
            return Err(Error::malformed(parser.pos, "empty pattern"));
        }
        let root = parser.pattern()?;
        parser.skip_trivia();
        if !parser.at_end() {
            return Err(Error::malformed(parser.pos, "unexpected input after pattern"));
        }
        Ok(Self { root })
    }

    /// Whether `node` matches the pattern.
    #[must_use]
    pub fn matches(&self, node: &SyntaxNode, source: &str) -> bool {
        self.root.matches(node, source)
    }

    /// Every matching node under (and including) `root`, in pre-order.
    #[must_use]
    pub fn find_all<'t>(&self, root: &'t SyntaxNode, source: &str) -> Vec<&'t SyntaxNode> {
        root.preorder()
            .into_iter()
            .filter(|node| self.matches(node, source))
            .collect()
    }
}

impl std::str::FromStr for Pattern {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl PatternNode {
    fn matches(&self, node: &SyntaxNode, source: &str) -> bool {
        if !node.is_named {
            return false;
        }
        let Self::Node {
            kind,
            fields,
            children,
            text,
        } = self
        else {
            return true;
        };

        if kind.as_deref().is_some_and(|k| k != node.kind) {
            return false;
        }
        if text.as_deref().is_some_and(|t| t != node.text(source)) {
            return false;
        }
        let fields_match = fields.iter().all(|(field, pattern)| {
            node.children_by_field(field)
                .any(|child| pattern.matches(child, source))
        });
        if !fields_match {
            return false;
        }

        // Greedy earliest assignment decides whether an ordered subsequence exists.
        let mut named = node.named_children();
        children
            .iter()
            .all(|pattern| named.any(|child| pattern.matches(child, source)))
    }
}

struct Parser<'a> {
    source: &'a str,
    pos: usize,
    depth: usize,
}

impl<'a> Parser<'a> {
    fn rest(&self) -> &'a str {
        &self.source[self.pos..]
    }

    fn at_end(&self) -> bool {
        self.pos >= self.source.len()
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn bump(&mut self) {
        if let Some(c) = self.peek() {
            self.pos += c.len_utf8();
        }
    }

    fn skip_trivia(&mut self) {
        loop {
            let trimmed = self.rest().trim_start();
            self.pos = self.source.len() - trimmed.len();
            if !trimmed.starts_with(';') {
                return;
            }
            let line_end = trimmed.find('\n').map_or(trimmed.len(), |i| i + 1);
            self.pos += line_end;
        }
    }

    fn pattern(&mut self) -> Result<PatternNode> {
        match self.peek() {
            Some('(') => self.node(),
            Some('_') if !self.rest()[1..].starts_with(is_ident_char) => {
                self.bump();
                Ok(PatternNode::Any)
            }
            Some(')') => Err(Error::malformed(self.pos, "unexpected `)`")),
            None => Err(Error::malformed(self.pos, "expected a pattern")),
            Some(_) => Err(Error::malformed(self.pos, "expected `(` or `_`")),
        }
    }

    fn node(&mut self) -> Result<PatternNode> {
        if self.depth >= MAX_PATTERN_DEPTH {
            return Err(Error::malformed(self.pos, "pattern nested too deeply"));
        }
        self.depth += 1;
        let node = self.node_body();
        self.depth -= 1;
        node
    }

    fn node_body(&mut self) -> Result<PatternNode> {
        let open = self.pos;
        self.bump();
        self.skip_trivia();

        let head_at = self.pos;
        let head = self.identifier();
        if head.is_empty() {
            return Err(Error::malformed(head_at, "expected a node kind after `(`"));
        }
        let kind = (head != "_").then(|| head.to_string());

        let mut fields = Vec::new();
        let mut children = Vec::new();
        let mut text = None;
        loop {
            self.skip_trivia();
            match self.peek() {
                None => return Err(Error::malformed(open, "unclosed `(`")),
                Some(')') => {
                    self.bump();
                    break;
                }
                Some('"') => {
                    let at = self.pos;
                    if text.replace(self.string()?).is_some() {
                        return Err(Error::malformed(at, "only one text constraint per node"));
                    }
                }
                Some('(') => children.push(self.node()?),
                Some(c) if is_ident_char(c) => {
                    let at = self.pos;
                    let word = self.identifier();
                    self.skip_trivia();
                    if self.peek() == Some(':') {
                        self.bump();
                        self.skip_trivia();
                        if !matches!(self.peek(), Some('(' | '_')) {
                            return Err(Error::malformed(
                                self.pos,
                                format!("expected a pattern after `{word}:`"),
                            ));
                        }
                        fields.push((word.to_string(), self.pattern()?));
                    } else if word == "_" {
                        children.push(PatternNode::Any);
                    } else {
                        return Err(Error::malformed(
                            at,
                            format!("bare word `{word}`; expected `field:`, `(`, `_`, or a string"),
                        ));
                    }
                }
                Some(c) => {
                    return Err(Error::malformed(self.pos, format!("unexpected `{c}`")));
                }
            }
        }

        Ok(PatternNode::Node {
            kind,
            fields,
            children,
            text,
        })
    }

    fn identifier(&mut self) -> &'a str {
        let start = self.pos;
        while self.peek().is_some_and(is_ident_char) {
            self.bump();
        }
        &self.source[start..self.pos]
    }

    fn string(&mut self) -> Result<String> {
        let open = self.pos;
        self.bump();
        let mut value = String::new();
        loop {
            match self.peek() {
                None => return Err(Error::malformed(open, "unterminated string")),
                Some('"') => {
                    self.bump();
                    return Ok(value);
                }
                Some('\\') => {
                    self.bump();
                    match self.peek() {
                        Some('n') => value.push('\n'),
                        Some('t') => value.push('\t'),
                        Some(c) => value.push(c),
                        None => return Err(Error::malformed(open, "unterminated string")),
                    }
                    self.bump();
                }
                Some(c) => {
                    value.push(c);
                    self.bump();
                }
            }
        }
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Budget;
    use crate::parser::parse;
    use crate::types::Language;
    use rstest::rstest;

    const CODE: &str = "class Store:\n    def load(self):\n        pass\n\n    def save(self):\n        pass\n\ndef main():\n    pass\n";

    fn kinds_and_text(pattern: &str) -> Vec<String> {
        let tree = parse(CODE, Language::Python, &Budget::default()).expect("should parse");
        let pattern = Pattern::parse(pattern).expect("pattern should compile");
        pattern
            .find_all(&tree.root, CODE)
            .into_iter()
            .map(|n| n.child_by_field("name").map_or(n.kind, |c| c.text(CODE)).to_string())
            .collect()
    }

    #[test]
    fn kind_pattern_matches_in_pre_order() {
        assert_eq!(
            kinds_and_text("(function_definition)"),
            ["load", "save", "main"]
        );
    }

    #[test]
    fn field_and_text_constraints_narrow_matches() {
        assert_eq!(
            kinds_and_text(r#"(function_definition name: (identifier "save"))"#),
            ["save"]
        );
    }

    #[test]
    fn child_patterns_match_an_ordered_subsequence() {
        let two_methods = "(class_definition body: (block (function_definition) (function_definition)))";
        assert_eq!(kinds_and_text(two_methods), ["Store"]);

        let three_methods =
            "(class_definition body: (block (function_definition) (function_definition) (function_definition)))";
        assert!(kinds_and_text(three_methods).is_empty());
    }

    #[test]
    fn wildcards_match_any_named_node() {
        let matches = kinds_and_text("(_ name: (identifier \"Store\") _)");
        assert_eq!(matches, ["Store"]);
    }

    #[test]
    fn comments_are_ignored() {
        let pattern = "; all functions\n(function_definition ; any name\n)";
        assert_eq!(kinds_and_text(pattern).len(), 3);
    }

    #[rstest]
    #[case::empty("", 0)]
    #[case::only_comment("; nothing\n", 10)]
    #[case::unclosed("(function_definition", 0)]
    #[case::stray_close(")", 0)]
    #[case::missing_head("()", 1)]
    #[case::field_without_pattern("(call function:)", 15)]
    #[case::unterminated_string("(identifier \"main)", 12)]
    #[case::trailing_input("(block) (block)", 8)]
    #[case::bare_word("(call foo)", 6)]
    #[case::too_deep(&"(a ".repeat(MAX_PATTERN_DEPTH + 1), 3 * MAX_PATTERN_DEPTH)]
    fn malformed_patterns_report_offset(#[case] source: &str, #[case] offset: usize) {
        let err = Pattern::parse(source).unwrap_err();
        match err {
            Error::MalformedPattern { offset: at, .. } => assert_eq!(at, offset, "{source}"),
            other => panic!("expected MalformedPattern, got {other:?}"),
        }
    }

    #[test]
    fn nesting_limit_is_inclusive() {
        let nested = |depth: usize| "(a ".repeat(depth) + &")".repeat(depth);
        assert!(Pattern::parse(&nested(MAX_PATTERN_DEPTH)).is_ok());

        let err = Pattern::parse(&nested(20_000)).unwrap_err();
        assert!(
            matches!(err, Error::MalformedPattern { ref message, .. } if message.contains("nested too deeply")),
            "{err:?}"
        );
    }
}
