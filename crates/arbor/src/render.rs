//! Plain-text rendering of outlines and codebase maps.
//!
//! ```text
//! ├── import os
//! ├── class Store
//! │   ├── load(self, key)
//! │   └── save(self, key, value)
//! └── main()
//! ```

use std::fmt;

use crate::map::CodebaseMap;
use crate::types::{Outline, Symbol, SymbolKind};

/// One-line label for a symbol: `class Store`, `save(self, key)`, `import os`.
#[must_use]
pub fn symbol_label(symbol: &Symbol) -> String {
    match symbol.kind {
        SymbolKind::Class => format!("{} {}", symbol.keyword().unwrap_or("class"), symbol.name),
        SymbolKind::Module => format!("{} {}", symbol.keyword().unwrap_or("module"), symbol.name),
        SymbolKind::Function | SymbolKind::Method => {
            format!("{}({})", symbol.name, symbol.parameters().join(", "))
        }
        SymbolKind::Import => format!("import {}", symbol.name),
        SymbolKind::Field | SymbolKind::Variable => symbol.name.clone(),
    }
}

/// An outline drawn as a tree, one symbol per line.
pub struct OutlineTree<'a>(pub &'a Outline);

impl fmt::Display for OutlineTree<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_tree(f, &self.0.symbols, "", &|_| true)
    }
}

/// A codebase map report: statistics, errors, then each file's structure.
///
/// Imports are left out of the structure section.
pub struct MapReport<'a>(pub &'a CodebaseMap);

impl fmt::Display for MapReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let map = self.0;
        let stats = map.stats();
        writeln!(f, "=== Analysis Statistics ===")?;
        writeln!(f, "Files analyzed: {}", stats.files_analyzed)?;
        writeln!(f, "Errors: {}", stats.errors)?;
        writeln!(f, "Classes: {}", stats.classes)?;
        writeln!(f, "Functions: {}", stats.functions)?;
        writeln!(f, "Decorated functions: {}", stats.decorated_functions)?;

        if !map.errors.is_empty() {
            writeln!(f, "\n=== Errors ===")?;
            for error in &map.errors {
                writeln!(f, "{}: {}", error.path.display(), error.message)?;
            }
        }

        writeln!(f, "\n=== Repository Structure ===")?;
        let structural = |s: &Symbol| s.kind != SymbolKind::Import;
        let mut any = false;
        for file in &map.files {
            if !file.outline.symbols.iter().any(structural) {
                continue;
            }
            any = true;
            writeln!(f, "\n{}", file.path.display())?;
            write_tree(f, &file.outline.symbols, "", &structural)?;
        }
        if !any {
            writeln!(f, "No significant code structure found.")?;
        }
        Ok(())
    }
}

/// Draw `outline` as a tree, one symbol per line.
#[must_use]
pub fn render_outline(outline: &Outline) -> String {
    OutlineTree(outline).to_string()
}

/// Draw a codebase map. See [`MapReport`].
#[must_use]
pub fn render_map(map: &CodebaseMap) -> String {
    MapReport(map).to_string()
}

fn write_tree(
    f: &mut fmt::Formatter<'_>,
    symbols: &[Symbol],
    prefix: &str,
    keep: &dyn Fn(&Symbol) -> bool,
) -> fmt::Result {
    let kept: Vec<&Symbol> = symbols.iter().filter(|s| keep(s)).collect();
    for (i, symbol) in kept.iter().enumerate() {
        let last = i + 1 == kept.len();
        let branch = if last { "└── " } else { "├── " };
        writeln!(f, "{prefix}{branch}{}", symbol_label(symbol))?;
        let child_prefix = format!("{prefix}{}", if last { "    " } else { "│   " });
        write_tree(f, &symbol.children, &child_prefix, keep)?;
    }
    Ok(())
}
