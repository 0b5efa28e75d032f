//! `arbor refs` command implementation.

use std::path::Path;

use arbor::Analyzer;
use colored::Colorize;

use super::display::{location, print_json};
use super::{LoadedFile, OutputArgs};

/// Run the refs command.
pub fn run(analyzer: &Analyzer, file: &Path, name: &str, output: &OutputArgs) -> arbor::Result<()> {
    let loaded = LoadedFile::read(file, output)?;
    let request = loaded.request(file);
    let references = analyzer.find_references(request, name)?;

    if output.json {
        return print_json(&references);
    }
    if references.is_empty() {
        println!("No call sites of \"{name}\"");
        return Ok(());
    }

    let outline = analyzer.get_outline(request)?.outline;
    println!(
        "Found {} call sites of \"{}\":",
        references.len().to_string().green().bold(),
        name.cyan()
    );
    println!();
    for reference in &references {
        let container = reference
            .container
            .and_then(|id| outline.qualified_name(id))
            .unwrap_or_else(|| "<top level>".to_string());
        println!(
            "  {} {} {}",
            format!("{}:{}", file.display(), location(&reference.span)).white().bold(),
            format!("({})", reference.kind.as_str()).dimmed(),
            format!("in {container}").dimmed()
        );
    }
    Ok(())
}
