//! `arbor search` command implementation.

use std::path::Path;

use arbor::Analyzer;
use colored::Colorize;

use super::display::{location, print_json};
use super::{LoadedFile, OutputArgs};

/// Lines of node text shown per match.
const PREVIEW_LINES: usize = 3;

/// Run the search command.
pub fn run(analyzer: &Analyzer, file: &Path, pattern: &str, output: &OutputArgs) -> arbor::Result<()> {
    let loaded = LoadedFile::read(file, output)?;
    let matches = analyzer.search(loaded.request(file), pattern)?;

    if output.json {
        return print_json(&matches);
    }
    if matches.is_empty() {
        println!("No nodes match {}", pattern.cyan());
        return Ok(());
    }

    println!(
        "Found {} matches:",
        matches.len().to_string().green().bold()
    );
    for node in &matches {
        println!();
        println!(
            "  {} {}",
            format!("{}:{}", file.display(), location(&node.span)).white().bold(),
            format!("({})", node.kind).dimmed()
        );
        for line in node.text.lines().take(PREVIEW_LINES) {
            println!("    {line}");
        }
        if node.text.lines().count() > PREVIEW_LINES {
            println!("    {}", "...".dimmed());
        }
    }
    Ok(())
}
