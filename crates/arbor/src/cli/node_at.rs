//! `arbor node-at` command implementation.

use std::path::Path;

use arbor::{Analyzer, Position};
use colored::Colorize;

use super::display::{location, print_json};
use super::{LoadedFile, OutputArgs};

/// Run the node-at command.
pub fn run(
    analyzer: &Analyzer,
    file: &Path,
    offset: Option<usize>,
    line_column: Option<(u32, u32)>,
    output: &OutputArgs,
) -> arbor::Result<()> {
    let position = match (offset, line_column) {
        (Some(offset), _) => Position::Offset(offset),
        (None, Some((line, column))) => Position::LineColumn { line, column },
        (None, None) => {
            return Err(arbor::Error::Config(
                "either --offset or --line with --column is required".to_string(),
            ));
        }
    };

    let loaded = LoadedFile::read(file, output)?;
    let result = analyzer.node_at(loaded.request(file), position)?;

    if output.json {
        return print_json(&result);
    }

    let node = &result.node;
    let mut flags = Vec::new();
    if let Some(field) = &node.field {
        flags.push(format!("field: {field}"));
    }
    if node.is_error {
        flags.push("ERROR".to_string());
    }
    if node.is_missing {
        flags.push("MISSING".to_string());
    }
    println!(
        "{} {} {}",
        node.kind.white().bold(),
        format!("at {}", location(&node.span)).dimmed(),
        if flags.is_empty() {
            String::new()
        } else {
            format!("[{}]", flags.join(", ")).yellow().to_string()
        }
    );
    if !result.ancestors.is_empty() {
        println!("  {} {}", "in".dimmed(), result.ancestors.join(" > "));
    }
    println!();
    println!("{}", node.text);
    Ok(())
}
