//! `arbor symbols` command implementation.

use std::path::Path;

use arbor::render::symbol_label;
use arbor::{Analyzer, SymbolKind};
use colored::Colorize;

use super::display::{location, print_json};
use super::{LoadedFile, OutputArgs};

/// Run the symbols command.
pub fn run(
    analyzer: &Analyzer,
    file: &Path,
    pattern: &str,
    kind_filter: Option<&str>,
    output: &OutputArgs,
) -> arbor::Result<()> {
    let kind = kind_filter
        .map(|name| {
            SymbolKind::from_name(name).ok_or_else(|| {
                arbor::Error::Config(format!(
                    "unknown symbol kind '{name}'. Valid kinds: module, class, function, method, field, import, variable"
                ))
            })
        })
        .transpose()?;

    let loaded = LoadedFile::read(file, output)?;
    let mut matches = analyzer.find_symbol(loaded.request(file), pattern)?;
    if let Some(kind) = kind {
        matches.retain(|m| m.symbol.kind == kind);
    }

    if output.json {
        return print_json(&matches);
    }
    if matches.is_empty() {
        println!("No symbols found matching \"{pattern}\"");
        return Ok(());
    }

    println!(
        "Found {} symbols matching \"{}\":",
        matches.len().to_string().green().bold(),
        pattern.cyan()
    );
    println!();
    for found in &matches {
        println!(
            "  {} {} {}",
            found.qualified_name.white().bold(),
            format!("({})", found.symbol.kind.as_str()).dimmed(),
            format!("- {}:{}", file.display(), location(&found.symbol.span)).dimmed()
        );
        println!("    {}", symbol_label(&found.symbol).dimmed());
    }
    Ok(())
}
