//! Common display utilities for CLI commands.

use colored::Colorize;
use serde::Serialize;

use arbor::{Span, SyntaxError, Truncation};

/// Print `value` as pretty JSON on stdout.
pub fn print_json<T: Serialize>(value: &T) -> arbor::Result<()> {
    let json = serde_json::to_string_pretty(value).map_err(std::io::Error::from)?;
    println!("{json}");
    Ok(())
}

/// `line:column` of a span start.
pub fn location(span: &Span) -> String {
    format!("{}:{}", span.start_line, span.start_column)
}

/// Print syntax errors and truncation markers after a result.
pub fn print_diagnostics(errors: &[SyntaxError], truncated: &[Truncation]) {
    if !errors.is_empty() {
        println!();
        println!(
            "{} {}",
            errors.len().to_string().yellow().bold(),
            "syntax error(s):".yellow()
        );
        for error in errors {
            println!("  {} {}", location(&error.span).dimmed(), error.message);
        }
    }
    for marker in truncated {
        println!("{}: {marker}", "partial result".yellow());
    }
}
