//! Grammar registry: which grammar serves a file.
//!
//! Resolution order for [`GrammarRegistry::resolve_language`]:
//!
//! 1. Extension table (case-insensitive)
//! 2. Well-known file names (`Rakefile`, `Gemfile`, ...)
//! 3. Content sniffing: shebang, editor modeline, `<?php`, then a few
//!    conservative syntax markers
//!
//! `.ts` files starting with an XML prolog are Qt translation files and
//! resolve to nothing. The registry performs no I/O; callers pass whatever
//! content they already have as a hint.

use std::collections::HashMap;
use std::path::Path;
use std::sync::LazyLock;

use tracing::trace;

use crate::languages::{get_language_support, LanguageSupport};
use crate::types::Language;

/// File names that are Ruby regardless of extension.
const RUBY_FILE_NAMES: &[&str] = &[
    "Rakefile",
    "Gemfile",
    "Guardfile",
    "Podfile",
    "Vagrantfile",
    "Brewfile",
];

/// Lines examined at each end of a file when looking for modelines.
const MODELINE_LINES: usize = 5;

/// Lines examined for syntax markers.
const MARKER_LINES: usize = 50;

/// Conservative line-prefix markers, checked in order.
///
/// Each marker is distinctive enough that one trimmed line starting with it
/// decides the language.
const LINE_MARKERS: &[(Language, &[&str])] = &[
    (Language::Cpp, &["#include <", "#include \""]),
    (Language::Rust, &["use std::", "fn main()", "#![", "pub fn ", "impl<"]),
    (Language::CSharp, &["using System", "namespace System"]),
    (Language::Java, &["import java.", "public class ", "public interface "]),
    (Language::JavaScript, &["module.exports", "export default "]),
    (Language::Ruby, &["require '", "require \"", "require_relative "]),
];

static GLOBAL: LazyLock<GrammarRegistry> = LazyLock::new(GrammarRegistry::new);

/// Immutable lookup tables from files to grammars.
#[derive(Debug, Clone)]
pub struct GrammarRegistry {
    extensions: HashMap<&'static str, Language>,
    file_names: HashMap<&'static str, Language>,
}

impl Default for GrammarRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl GrammarRegistry {
    /// Build the registry from the static grammar tables.
    #[must_use]
    pub fn new() -> Self {
        let extensions = Language::ALL
            .into_iter()
            .flat_map(|lang| lang.extensions().iter().map(move |ext| (*ext, lang)))
            .collect();
        let file_names = RUBY_FILE_NAMES
            .iter()
            .map(|name| (*name, Language::Ruby))
            .collect();
        Self {
            extensions,
            file_names,
        }
    }

    /// The process-wide registry, built on first use.
    #[must_use]
    pub fn global() -> &'static Self {
        &GLOBAL
    }

    /// Every supported grammar.
    #[must_use]
    pub fn languages(&self) -> &'static [Language] {
        &Language::ALL
    }

    /// Structure rules for `language`.
    #[must_use]
    pub fn support(&self, language: Language) -> &'static dyn LanguageSupport {
        get_language_support(language)
    }

    /// Pick the grammar for `path`, using `content_hint` for ambiguous cases.
    ///
    /// Returns `None` when no grammar applies (the Unsupported outcome).
    #[must_use]
    pub fn resolve_language(&self, path: &Path, content_hint: Option<&str>) -> Option<Language> {
        let content = content_hint.map(|c| c.trim_start_matches('\u{feff}'));

        if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
            let ext = ext.to_ascii_lowercase();
            if let Some(&lang) = self.extensions.get(ext.as_str()) {
                if ext == "ts" && content.is_some_and(is_xml) {
                    trace!(path = %path.display(), "XML content in .ts file, not TypeScript");
                    return None;
                }
                return Some(lang);
            }
        }

        if let Some(&lang) = path
            .file_name()
            .and_then(|n| n.to_str())
            .and_then(|n| self.file_names.get(n))
        {
            return Some(lang);
        }

        let sniffed = content.and_then(sniff);
        trace!(path = %path.display(), language = ?sniffed, "Resolved by content");
        sniffed
    }
}

fn is_xml(content: &str) -> bool {
    content.trim_start().starts_with("<?xml")
}

/// Guess a language from file content alone.
#[must_use]
pub fn sniff(content: &str) -> Option<Language> {
    let first_line = content.lines().next().unwrap_or_default();
    if let Some(lang) = first_line.strip_prefix("#!").and_then(interpreter_language) {
        return Some(lang);
    }
    if let Some(lang) = modeline_language(content) {
        return Some(lang);
    }
    if content.trim_start().starts_with("<?php") {
        return Some(Language::Php);
    }
    marker_language(content)
}

/// Map a shebang command line (after `#!`) to a language.
fn interpreter_language(command: &str) -> Option<Language> {
    let mut words = command.split_whitespace();
    let mut program = basename(words.next()?);
    if program == "env" {
        program = basename(words.find(|w| !w.starts_with('-') && !w.contains('='))?);
    }

    match program {
        p if p.starts_with("python") => Some(Language::Python),
        "node" | "nodejs" => Some(Language::JavaScript),
        "deno" | "ts-node" => Some(Language::TypeScript),
        p if p.starts_with("ruby") => Some(Language::Ruby),
        p if p.starts_with("php") => Some(Language::Php),
        "kotlin" | "kscript" => Some(Language::Kotlin),
        "rust-script" => Some(Language::Rust),
        _ => None,
    }
}

fn basename(program: &str) -> &str {
    program.rsplit('/').next().unwrap_or(program)
}

/// Emacs (`-*- mode: ruby -*-`) and vim (`vim: set ft=python:`) modelines.
fn modeline_language(content: &str) -> Option<Language> {
    let lines: Vec<&str> = content.lines().collect();
    let tail = lines.len().saturating_sub(MODELINE_LINES).max(MODELINE_LINES);
    lines
        .iter()
        .take(MODELINE_LINES)
        .chain(lines.iter().skip(tail))
        .find_map(|line| emacs_mode(line).or_else(|| vim_filetype(line)))
        .and_then(|name| Language::from_name(name.trim_end_matches("-mode")))
}

fn emacs_mode(line: &str) -> Option<&str> {
    let start = line.find("-*-")? + 3;
    let end = start + line[start..].find("-*-")?;
    let body = line[start..end].trim();
    if !body.contains(':') {
        return Some(body);
    }
    body.split(';').find_map(|setting| {
        let (key, value) = setting.split_once(':')?;
        key.trim().eq_ignore_ascii_case("mode").then(|| value.trim())
    })
}

fn vim_filetype(line: &str) -> Option<&str> {
    let start = line.find("vim:").or_else(|| line.find("vi:"))?;
    line[start..]
        .split(|c: char| c.is_whitespace() || c == ':')
        .find_map(|setting| {
            setting
                .strip_prefix("ft=")
                .or_else(|| setting.strip_prefix("filetype="))
        })
}

fn marker_language(content: &str) -> Option<Language> {
    let lines: Vec<&str> = content
        .lines()
        .take(MARKER_LINES)
        .map(str::trim_start)
        .collect();

    // Go needs both a package clause and a func declaration.
    let go_package = lines
        .iter()
        .any(|l| l.starts_with("package ") && !l.ends_with(';'));
    if go_package && lines.iter().any(|l| l.starts_with("func ")) {
        return Some(Language::Go);
    }
    // Python: a `def name(...):` or a `from x import y` line.
    if lines.iter().any(|l| {
        (l.starts_with("def ") && l.trim_end().ends_with(':'))
            || (l.starts_with("from ") && l.contains(" import "))
    }) {
        return Some(Language::Python);
    }

    LINE_MARKERS
        .iter()
        .find(|(_, markers)| {
            lines
                .iter()
                .any(|l| markers.iter().any(|m| l.starts_with(m)))
        })
        .map(|(lang, _)| *lang)
}
