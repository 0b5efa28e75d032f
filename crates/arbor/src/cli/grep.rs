//! `arbor grep` command implementation.

use std::path::Path;

use arbor::{Analyzer, SourceRequest, TextSearchOptions, TextSearchResult};
use colored::Colorize;

use super::display::{location, print_json};

/// Run the grep command over a file or a directory.
pub fn run(
    analyzer: &Analyzer,
    path: &Path,
    pattern: &str,
    options: &TextSearchOptions,
    json: bool,
) -> arbor::Result<()> {
    let is_dir = std::fs::metadata(path)?.is_dir();
    let result = if is_dir {
        analyzer.search_directory(path, pattern, options)?
    } else {
        let text = std::fs::read_to_string(path)?;
        arbor::text_search::search_text(SourceRequest::new(path, &text), pattern, options)?
    };

    if json {
        return print_json(&result);
    }
    // Directory matches carry paths relative to the searched root.
    let base = is_dir.then_some(path);
    print_matches(base, &result);
    Ok(())
}

fn print_matches(base: Option<&Path>, result: &TextSearchResult) {
    for found in &result.matches {
        let shown = match base {
            Some(base) => base.join(&found.path),
            None => found.path.clone(),
        };
        println!(
            "{}:{}: {}",
            shown.display().to_string().white().bold(),
            location(&found.span).dimmed(),
            found.line_text
        );
    }
    for error in &result.errors {
        eprintln!("{}: {error}", "skipped".yellow());
    }
    if result.matches.is_empty() {
        println!("No lines match");
    } else if result.truncated {
        println!(
            "{}: stopped after {} matches",
            "partial result".yellow(),
            result.matches.len()
        );
    }
}
