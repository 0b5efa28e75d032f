//! CLI command implementations.

mod display;

pub mod grep;
pub mod map;
pub mod node_at;
pub mod outline;
pub mod refs;
pub mod search;
pub mod symbols;

use std::path::Path;

use arbor::{Language, SourceRequest};

/// Options shared by every single-file command.
#[derive(clap::Args, Debug)]
pub struct OutputArgs {
    /// Language override (python, rust, ts, c++, ...)
    #[arg(short, long)]
    pub lang: Option<String>,

    /// Print JSON instead of text
    #[arg(long)]
    pub json: bool,
}

/// A source file read from disk.
pub struct LoadedFile {
    text: String,
    language: Option<Language>,
}

impl LoadedFile {
    /// Read `path` as UTF-8 and resolve the `--lang` override.
    pub fn read(path: &Path, args: &OutputArgs) -> arbor::Result<Self> {
        let language = parse_language(args.lang.as_deref())?;
        let bytes = std::fs::read(path)?;
        let text = String::from_utf8(bytes).map_err(|_| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("{} is not valid UTF-8", path.display()),
            )
        })?;
        Ok(Self { text, language })
    }

    /// Query request for this file.
    pub fn request<'a>(&'a self, path: &'a Path) -> SourceRequest<'a> {
        SourceRequest::new(path, &self.text).with_language(self.language)
    }
}

/// Resolve a `--lang` value.
pub fn parse_language(name: Option<&str>) -> arbor::Result<Option<Language>> {
    name.map(|name| {
        Language::from_name(name)
            .ok_or_else(|| arbor::Error::Config(format!("unknown language '{name}'")))
    })
    .transpose()
}
