//! Owned concrete syntax trees.
//!
//! A [`SyntaxNode`] tree is a detached copy of a tree-sitter tree. Each node
//! exclusively owns its children, so a tree can be cached, shared behind an
//! `Arc`, and queried from any thread without touching the parser.

use serde::Serialize;

use crate::config::{Budget, MAX_TREE_DEPTH_LIMIT};
use crate::languages::tree_sitter_utils::node_span;
use crate::types::{Span, SyntaxError, SyntaxErrorKind, Truncation};

/// Kind tag tree-sitter uses for unparsable regions.
pub const ERROR_KIND: &str = "ERROR";

/// Longest source excerpt quoted in an error message.
const ERROR_EXCERPT_CHARS: usize = 40;

/// One node of a concrete syntax tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyntaxNode {
    /// Grammar-specific kind tag (e.g. `function_definition`, `;`)
    pub kind: &'static str,
    /// Field name under the parent, if the grammar assigns one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<&'static str>,
    /// Region of the source covered by this node
    pub span: Span,
    /// Named nodes are grammar rules; anonymous nodes are literal tokens
    pub is_named: bool,
    /// Node is an unparsable region
    pub is_error: bool,
    /// Node was inserted by error recovery and covers no text
    pub is_missing: bool,
    /// Ordered children
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<SyntaxNode>,
}

impl SyntaxNode {
    /// A childless error node covering `span`, used when parsing produced nothing.
    #[must_use]
    pub fn degraded(span: Span) -> Self {
        Self {
            kind: ERROR_KIND,
            field: None,
            span,
            is_named: true,
            is_error: true,
            is_missing: false,
            children: Vec::new(),
        }
    }

    /// Source text covered by this node.
    ///
    /// Returns an empty string if the span does not fall on character
    /// boundaries of `source` (which only happens with a mismatched source).
    #[must_use]
    pub fn text<'s>(&self, source: &'s str) -> &'s str {
        source
            .get(self.span.start_byte..self.span.end_byte)
            .unwrap_or_default()
    }

    /// First child stored under `field`.
    #[must_use]
    pub fn child_by_field(&self, field: &str) -> Option<&SyntaxNode> {
        self.children.iter().find(|c| c.field == Some(field))
    }

    /// Every child stored under `field`, in order.
    pub fn children_by_field<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a SyntaxNode> {
        self.children.iter().filter(move |c| c.field == Some(field))
    }

    /// Named children, in order.
    pub fn named_children(&self) -> impl Iterator<Item = &SyntaxNode> {
        self.children.iter().filter(|c| c.is_named)
    }

    /// First named child whose kind is one of `kinds`.
    #[must_use]
    pub fn child_of_kind(&self, kinds: &[&str]) -> Option<&SyntaxNode> {
        self.named_children().find(|c| kinds.contains(&c.kind))
    }

    /// Whether any direct child (named or anonymous) has kind `kind`.
    ///
    /// Used for keyword tokens such as `async` or `static`.
    #[must_use]
    pub fn has_child_kind(&self, kind: &str) -> bool {
        self.children.iter().any(|c| c.kind == kind)
    }

    /// First descendant (pre-order, excluding `self`) whose kind is one of `kinds`.
    #[must_use]
    pub fn descendant_of_kind(&self, kinds: &[&str]) -> Option<&SyntaxNode> {
        let mut stack: Vec<&SyntaxNode> = self.children.iter().rev().collect();
        while let Some(node) = stack.pop() {
            if kinds.contains(&node.kind) {
                return Some(node);
            }
            stack.extend(node.children.iter().rev());
        }
        None
    }

    /// Every node of the tree in pre-order, starting with `self`.
    #[must_use]
    pub fn preorder(&self) -> Vec<&SyntaxNode> {
        let mut out = Vec::new();
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            out.push(node);
            stack.extend(node.children.iter().rev());
        }
        out
    }

    /// Total node count, including `self`.
    #[must_use]
    pub fn node_count(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            count += 1;
            stack.extend(node.children.iter());
        }
        count
    }

    /// Path from `self` down to the smallest node containing `offset`.
    ///
    /// Containment is half-open. An offset in trivia after a node's children
    /// (the trailing newline of a file, or `self.span.end_byte` itself)
    /// resolves to the last leaf before it. Returns an empty path when
    /// `offset` lies outside `self` entirely.
    #[must_use]
    pub fn path_to_offset(&self, offset: usize) -> Vec<&SyntaxNode> {
        if offset > self.span.end_byte || offset < self.span.start_byte {
            return Vec::new();
        }
        let mut path = vec![self];
        let mut current = self;
        // Zero-width (missing) children never contain an offset.
        while let Some(child) = current
            .children
            .iter()
            .find(|c| c.span.contains(offset))
        {
            path.push(child);
            current = child;
        }
        let mut preceding = current
            .children
            .iter()
            .rev()
            .find(|c| c.span.end_byte <= offset);
        while let Some(child) = preceding {
            path.push(child);
            preceding = child.children.last();
        }
        path
    }
}

impl Drop for SyntaxNode {
    // The derived drop recurses once per level.
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.children);
        while let Some(mut node) = pending.pop() {
            pending.append(&mut node.children);
        }
    }
}

/// Result of converting a tree-sitter tree.
pub(crate) struct Converted {
    pub root: SyntaxNode,
    pub truncated: Vec<Truncation>,
}

/// Copy a tree-sitter tree into an owned [`SyntaxNode`] tree under `budget`.
///
/// The walk is iterative, so deep trees cannot overflow the stack. Subtrees
/// below `max_tree_depth` (never more than [`MAX_TREE_DEPTH_LIMIT`]) and nodes
/// past `max_nodes` are dropped and recorded as truncations.
pub(crate) fn convert(tree: &tree_sitter::Tree, budget: &Budget) -> Converted {
    let max_depth = budget.max_tree_depth.min(MAX_TREE_DEPTH_LIMIT);
    let mut cursor = tree.walk();
    let mut stack = vec![leaf(&cursor.node(), None)];
    let mut count = 1usize;
    let mut depth_cut = false;
    let mut nodes_cut = false;

    loop {
        let depth = stack.len() - 1;
        let node = cursor.node();
        let may_descend = depth < max_depth && count < budget.max_nodes;

        if may_descend && cursor.goto_first_child() {
            count += 1;
            stack.push(leaf(&cursor.node(), cursor.field_name()));
            continue;
        }
        if node.child_count() > 0 && !may_descend {
            if depth >= max_depth {
                depth_cut = true;
            } else {
                nodes_cut = true;
            }
        }

        // Close finished nodes until one has a next sibling to visit.
        loop {
            if stack.len() == 1 {
                let mut truncated = Vec::new();
                if depth_cut {
                    truncated.push(Truncation::DepthLimit { limit: max_depth });
                }
                if nodes_cut {
                    truncated.push(Truncation::NodeLimit {
                        limit: budget.max_nodes,
                    });
                }
                let root = stack.pop().unwrap_or_else(|| leaf(&tree.root_node(), None));
                return Converted { root, truncated };
            }

            let finished = stack.pop();
            if let (Some(done), Some(parent)) = (finished, stack.last_mut()) {
                parent.children.push(done);
            }

            if count < budget.max_nodes {
                if cursor.goto_next_sibling() {
                    count += 1;
                    stack.push(leaf(&cursor.node(), cursor.field_name()));
                    break;
                }
            } else if cursor.node().next_sibling().is_some() {
                nodes_cut = true;
            }
            cursor.goto_parent();
        }
    }
}

fn leaf(node: &tree_sitter::Node, field: Option<&'static str>) -> SyntaxNode {
    SyntaxNode {
        kind: node.kind(),
        field,
        span: node_span(node),
        is_named: node.is_named(),
        is_error: node.is_error(),
        is_missing: node.is_missing(),
        children: Vec::new(),
    }
}

/// Collect syntax errors from a converted tree.
///
/// Each outermost ERROR node is reported once; MISSING nodes are reported
/// wherever they occur, including inside ERROR nodes.
#[must_use]
pub fn collect_errors(root: &SyntaxNode, source: &str) -> Vec<SyntaxError> {
    let mut errors = Vec::new();
    let mut stack = vec![(root, false)];
    while let Some((node, inside_error)) = stack.pop() {
        if node.is_missing {
            errors.push(SyntaxError {
                kind: SyntaxErrorKind::Missing,
                span: node.span,
                message: format!("missing `{}`", node.kind),
            });
        } else if node.is_error && !inside_error && node.kind == ERROR_KIND {
            errors.push(SyntaxError {
                kind: SyntaxErrorKind::Unexpected,
                span: node.span,
                message: unexpected_message(node.text(source)),
            });
        }
        let inside = inside_error || node.is_error;
        stack.extend(node.children.iter().rev().map(|c| (c, inside)));
    }
    errors
}

fn unexpected_message(text: &str) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        return "unexpected input".to_string();
    }
    let mut excerpt: String = collapsed.chars().take(ERROR_EXCERPT_CHARS).collect();
    if collapsed.chars().count() > ERROR_EXCERPT_CHARS {
        excerpt.push_str("...");
    }
    format!("unexpected `{excerpt}`")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Budget, MAX_TREE_DEPTH_LIMIT};

    fn parse_python(code: &str) -> tree_sitter::Tree {
        let mut parser = tree_sitter::Parser::new();
        parser
            .set_language(&tree_sitter_python::LANGUAGE.into())
            .expect("tree-sitter-python language should be valid");
        parser
            .parse(code, None)
            .expect("parsing test code should succeed")
    }

    #[test]
    fn conversion_preserves_node_count_and_fields() {
        let code = "def greet(name):\n    return name\n";
        let tree = parse_python(code);

        let converted = convert(&tree, &Budget::default());

        assert!(converted.truncated.is_empty());
        assert_eq!(converted.root.kind, "module");
        assert_eq!(converted.root.node_count(), tree.root_node().descendant_count());
        let func = &converted.root.children[0];
        assert_eq!(func.kind, "function_definition");
        assert_eq!(func.child_by_field("name").unwrap().text(code), "greet");
    }

    #[test]
    fn depth_budget_cuts_deep_subtrees() {
        let code = "x = ((((((((1))))))))\n";
        let tree = parse_python(code);
        let budget = Budget {
            max_tree_depth: 3,
            ..Budget::default()
        };

        let converted = convert(&tree, &budget);

        assert_eq!(
            converted.truncated,
            vec![Truncation::DepthLimit { limit: 3 }]
        );
        let max_depth = max_depth(&converted.root);
        assert_eq!(max_depth, 3);
    }

    #[test]
    fn depth_budget_never_exceeds_the_limit() {
        let nesting = MAX_TREE_DEPTH_LIMIT + 100;
        let code = format!("x = {}1{}\n", "(".repeat(nesting), ")".repeat(nesting));
        let tree = parse_python(&code);
        let budget = Budget {
            max_tree_depth: usize::MAX,
            ..Budget::default()
        };

        let converted = convert(&tree, &budget);

        assert_eq!(
            converted.truncated,
            vec![Truncation::DepthLimit {
                limit: MAX_TREE_DEPTH_LIMIT
            }]
        );
        assert_eq!(max_depth(&converted.root), MAX_TREE_DEPTH_LIMIT);
    }

    #[test]
    fn node_budget_caps_total_nodes() {
        let code = "a = 1\nb = 2\nc = 3\nd = 4\n";
        let tree = parse_python(code);
        let budget = Budget {
            max_nodes: 5,
            ..Budget::default()
        };

        let converted = convert(&tree, &budget);

        assert_eq!(converted.root.node_count(), 5);
        assert!(
            converted
                .truncated
                .contains(&Truncation::NodeLimit { limit: 5 })
        );
    }

    #[test]
    fn path_to_offset_finds_smallest_node() {
        let code = "x = 42\n";
        let tree = parse_python(code);
        let root = convert(&tree, &Budget::default()).root;

        let path = root.path_to_offset(5);
        let leaf = path.last().unwrap();
        assert_eq!(leaf.kind, "integer");
        assert_eq!(leaf.text(code), "42");
        assert_eq!(path[0].kind, "module");
    }

    #[test]
    fn path_to_offset_in_trailing_trivia_is_last_leaf() {
        let code = "x = 42\n";
        let tree = parse_python(code);
        let root = convert(&tree, &Budget::default()).root;

        let path = root.path_to_offset(code.len() - 1);
        let leaf = path.last().unwrap();
        assert_eq!(leaf.kind, "integer");
        assert!(leaf.children.is_empty());
        assert_eq!(path[0].kind, "module");
    }

    #[test]
    fn path_to_offset_before_first_token_is_root() {
        let code = "\n\nx = 42\n";
        let tree = parse_python(code);
        let root = convert(&tree, &Budget::default()).root;

        // Either the root alone or nothing, which callers treat as the root.
        let path = root.path_to_offset(0);
        assert!(path.len() <= 1);
    }

    #[test]
    fn path_to_offset_at_end_is_last_leaf() {
        let code = "x = 42";
        let tree = parse_python(code);
        let root = convert(&tree, &Budget::default()).root;

        let path = root.path_to_offset(code.len());
        assert_eq!(path.last().unwrap().text(code), "42");
        assert!(root.path_to_offset(code.len() + 1).is_empty());
    }

    #[test]
    fn collect_errors_reports_missing_tokens() {
        let code = "def f(:\n    pass\n";
        let tree = parse_python(code);
        let root = convert(&tree, &Budget::default()).root;

        let errors = collect_errors(&root, code);

        assert!(!errors.is_empty());
        assert!(errors.iter().all(|e| e.span.start_line == 1));
    }

    #[test]
    fn clean_source_has_no_errors() {
        let code = "def f(a, b):\n    return a + b\n";
        let tree = parse_python(code);
        let root = convert(&tree, &Budget::default()).root;

        assert!(collect_errors(&root, code).is_empty());
    }

    #[test]
    fn unexpected_message_truncates_long_excerpts() {
        let text = "x ".repeat(100);
        let message = unexpected_message(&text);
        assert!(message.ends_with("...`"));
        assert!(message.len() < 60);
    }

    fn max_depth(root: &SyntaxNode) -> usize {
        let mut deepest = 0;
        let mut stack = vec![(root, 0)];
        while let Some((node, depth)) = stack.pop() {
            deepest = deepest.max(depth);
            stack.extend(node.children.iter().map(|c| (c, depth + 1)));
        }
        deepest
    }
}
