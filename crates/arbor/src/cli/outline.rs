//! `arbor outline` command implementation.

use std::path::Path;

use arbor::render::render_outline;
use arbor::Analyzer;
use colored::Colorize;

use super::display::{print_diagnostics, print_json};
use super::{LoadedFile, OutputArgs};

/// Run the outline command.
pub fn run(analyzer: &Analyzer, file: &Path, output: &OutputArgs) -> arbor::Result<()> {
    let loaded = LoadedFile::read(file, output)?;
    let result = analyzer.get_outline(loaded.request(file))?;

    if output.json {
        return print_json(&result);
    }

    println!(
        "{} {}",
        file.display().to_string().white().bold(),
        format!("({})", result.language).dimmed()
    );
    if result.outline.symbols.is_empty() {
        println!("{}", "No symbols found".dimmed());
    } else {
        print!("{}", render_outline(&result.outline));
    }
    print_diagnostics(&result.errors, &result.truncated);
    Ok(())
}
