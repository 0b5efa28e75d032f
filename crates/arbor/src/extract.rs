//! Structural extraction: syntax tree to outline.
//!
//! One generic walk serves every language. The per-language [`LanguageSupport`]
//! tables decide which nodes become symbols; the walk applies the scoping rules
//! that hold everywhere:
//!
//! - a function directly inside a class-like symbol is a method
//! - a variable directly inside a class-like symbol is a field
//! - variables inside function bodies are locals and never emitted
//! - ERROR nodes emit nothing but their children are still searched
//!
//! Symbol ids are assigned in pre-order, so they also sort in source order.

use tracing::{trace, warn};

use crate::config::Budget;
use crate::languages::tree_sitter_utils::callee_name;
use crate::languages::{get_language_support, LanguageSupport, Metadata, NodeContext, SymbolDraft};
use crate::languages::{put_list, put_text};
use crate::syntax::SyntaxNode;
use crate::types::{meta, Language, Outline, Reference, Symbol, SymbolId, SymbolKind, Truncation};

/// Extract the outline of a parsed document.
///
/// Never fails: a broken tree yields whatever symbols lie outside the broken
/// regions. Extraction stops emitting symbols after `budget.max_symbols`, but
/// references are still collected for the whole tree.
#[must_use]
pub fn extract(root: &SyntaxNode, source: &str, language: Language, budget: &Budget) -> Outline {
    let mut walker = Walker {
        support: get_language_support(language),
        source,
        max_symbols: budget.max_symbols,
        next_id: 0,
        limit_hit: false,
        references: Vec::new(),
    };
    let scope = Scope {
        symbol: None,
        kind: None,
        in_function: false,
    };
    let symbols = walker.walk(root, scope);

    let mut truncated = Vec::new();
    if walker.limit_hit {
        warn!(%language, limit = budget.max_symbols, "Outline cut by symbol budget");
        truncated.push(Truncation::SymbolLimit {
            limit: budget.max_symbols,
        });
    }
    Outline {
        language,
        symbols,
        references: walker.references,
        truncated,
    }
}

/// Where the walk currently is, in symbol terms.
#[derive(Debug, Clone, Copy)]
struct Scope {
    /// Innermost enclosing symbol
    symbol: Option<SymbolId>,
    /// Its kind
    kind: Option<SymbolKind>,
    /// Inside any function or method body
    in_function: bool,
}

struct Walker<'a> {
    support: &'static dyn LanguageSupport,
    source: &'a str,
    max_symbols: usize,
    next_id: u32,
    limit_hit: bool,
    references: Vec<Reference>,
}

/// A node being walked, with the symbols found below it so far.
struct Frame<'n> {
    node: &'n SyntaxNode,
    /// Scope handed to the children
    scope: Scope,
    next_child: usize,
    /// The symbol `node` defines, filled with `found` once the node closes
    symbol: Option<Symbol>,
    found: Vec<Symbol>,
}

impl Frame<'_> {
    fn close(self) -> Vec<Symbol> {
        match self.symbol {
            Some(mut symbol) => {
                symbol.children = self.found;
                vec![symbol]
            }
            None => self.found,
        }
    }
}

impl Walker<'_> {
    /// Walk `root`'s subtree, returning its top-level symbols.
    ///
    /// The walk keeps its own stack, so tree depth never reaches the call stack.
    fn walk(&mut self, root: &SyntaxNode, scope: Scope) -> Vec<Symbol> {
        let Some(first) = self.enter(root, None, scope) else {
            return Vec::new();
        };
        let mut stack = vec![first];
        loop {
            let Some(frame) = stack.last_mut() else {
                return Vec::new();
            };
            let node = frame.node;
            if let Some(child) = node.children.get(frame.next_child) {
                frame.next_child += 1;
                let scope = frame.scope;
                if let Some(entered) = self.enter(child, Some(node), scope) {
                    stack.push(entered);
                }
                continue;
            }

            let Some(done) = stack.pop() else {
                return Vec::new();
            };
            let symbols = done.close();
            match stack.last_mut() {
                Some(parent) => parent.found.extend(symbols),
                None => return symbols,
            }
        }
    }

    /// Visit `node` on the way down. Missing nodes are skipped entirely.
    fn enter<'n>(
        &mut self,
        node: &'n SyntaxNode,
        parent: Option<&SyntaxNode>,
        scope: Scope,
    ) -> Option<Frame<'n>> {
        if node.is_missing {
            return None;
        }
        let cx = NodeContext {
            node,
            parent,
            source: self.source,
        };
        self.collect_reference(&cx, scope);

        let passthrough = Frame {
            node,
            scope,
            next_child: 0,
            symbol: None,
            found: Vec::new(),
        };
        let draft = if node.is_error { None } else { self.draft(&cx, scope) };
        let Some(draft) = draft else {
            return Some(passthrough);
        };
        if self.next_id as usize >= self.max_symbols {
            self.limit_hit = true;
            return Some(passthrough);
        }

        let id = SymbolId(self.next_id);
        self.next_id += 1;
        let metadata = self.metadata(&cx, &draft);
        trace!(name = %draft.name, kind = %draft.kind.as_str(), node_kind = node.kind, "Symbol");

        Some(Frame {
            node,
            scope: Scope {
                symbol: Some(id),
                kind: Some(draft.kind),
                in_function: scope.in_function || draft.kind.is_callable(),
            },
            next_child: 0,
            symbol: Some(Symbol {
                id,
                name: draft.name,
                kind: draft.kind,
                span: node.span,
                name_span: draft.name_span,
                parent: scope.symbol,
                metadata,
                children: Vec::new(),
            }),
            found: Vec::new(),
        })
    }

    /// Decide whether `cx.node` defines a symbol, with scoping applied.
    fn draft(&self, cx: &NodeContext<'_>, scope: Scope) -> Option<SymbolDraft> {
        let mut draft = self.support.custom_symbol(cx).or_else(|| {
            // Keyword tokens share kind names with rules (`class`, `module`).
            if !cx.node.is_named {
                return None;
            }
            let rule = self.support.rules().iter().find(|r| {
                r.kind == cx.node.kind
                    && r.requires_field
                        .is_none_or(|f| cx.node.child_by_field(f).is_some())
            })?;
            let (name, name_span) = rule.name.resolve(cx.node, self.source).or_else(|| {
                rule.default_name
                    .map(|name| (name.to_string(), cx.node.span))
            })?;
            Some(SymbolDraft {
                name,
                kind: rule.symbol,
                keyword: rule.keyword,
                name_span,
            })
        })?;
        self.support.refine(cx, &mut draft);

        let in_type = scope.kind.is_some_and(|k| k.is_type_scope());
        match draft.kind {
            SymbolKind::Function if in_type => draft.kind = SymbolKind::Method,
            SymbolKind::Variable if in_type => draft.kind = SymbolKind::Field,
            SymbolKind::Variable | SymbolKind::Field if scope.in_function => return None,
            _ => {}
        }
        Some(draft)
    }

    fn metadata(&self, cx: &NodeContext<'_>, draft: &SymbolDraft) -> Metadata {
        let mut meta = Metadata::new();
        if !draft.keyword.is_empty() {
            put_text(&mut meta, meta::KEYWORD, draft.keyword);
        }
        if draft.kind == SymbolKind::Import {
            put_text(&mut meta, meta::SOURCE, draft.name.as_str());
        } else if let Some(visibility) = self.support.visibility(cx, &draft.name) {
            put_text(&mut meta, meta::VISIBILITY, visibility.as_str());
        }
        if draft.kind.is_callable() {
            put_list(&mut meta, meta::PARAMETERS, self.support.parameters(cx));
        }
        self.support.metadata(cx, draft, &mut meta);
        meta
    }

    fn collect_reference(&mut self, cx: &NodeContext<'_>, scope: Scope) {
        if !cx.node.is_named || cx.node.is_error {
            return;
        }
        let Some(rule) = self.support.call_rules().iter().find(|r| r.kind == cx.node.kind) else {
            return;
        };
        let Some(name) = rule.callee(cx.node).and_then(|c| callee_name(cx.text(c))) else {
            return;
        };
        self.references.push(Reference {
            name,
            kind: rule.reference,
            span: cx.node.span,
            container: scope.symbol,
        });
    }
}
