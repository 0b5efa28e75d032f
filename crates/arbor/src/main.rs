//! Arbor CLI - structural code analysis from the command line.
//!
//! Arbor parses a file with the matching tree-sitter grammar and prints its
//! outline, symbol matches, the node at a position, structural search hits,
//! or call sites. `arbor map` outlines a whole directory and `arbor grep`
//! searches file contents with a regular expression.

use std::path::PathBuf;
use std::process::ExitCode;

use arbor::{Analyzer, AnalyzerConfig, TextSearchOptions};
use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing_subscriber::EnvFilter;

mod cli;

/// Arbor: multi-language structural code analysis.
#[derive(Parser)]
#[command(name = "arbor")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// YAML configuration file (cache size and parse budgets)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Verbose output (can be repeated: -v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the structural outline of a file
    Outline {
        /// Source file
        file: PathBuf,

        #[command(flatten)]
        output: cli::OutputArgs,
    },

    /// Find symbols by name (substring, or glob with `*`, `?`, `[`)
    Symbols {
        /// Source file
        file: PathBuf,

        /// Name pattern
        pattern: String,

        /// Only symbols of this kind (module, class, function, method, field, import, variable)
        #[arg(short, long)]
        kind: Option<String>,

        #[command(flatten)]
        output: cli::OutputArgs,
    },

    /// Show the syntax node at a position
    NodeAt {
        /// Source file
        file: PathBuf,

        /// Byte offset
        #[arg(long, conflicts_with_all = ["line", "column"])]
        offset: Option<usize>,

        /// Line number (1-indexed)
        #[arg(long, requires = "column")]
        line: Option<u32>,

        /// Byte column (1-indexed)
        #[arg(long, requires = "line")]
        column: Option<u32>,

        #[command(flatten)]
        output: cli::OutputArgs,
    },

    /// Search with a structural S-expression pattern
    Search {
        /// Source file
        file: PathBuf,

        /// Pattern, e.g. '(function_definition name: (identifier "main"))'
        pattern: String,

        #[command(flatten)]
        output: cli::OutputArgs,
    },

    /// List call sites of a name
    Refs {
        /// Source file
        file: PathBuf,

        /// Callee name (exact)
        name: String,

        #[command(flatten)]
        output: cli::OutputArgs,
    },

    /// Search file contents with a regular expression
    Grep {
        /// Regular expression, matched within single lines
        pattern: String,

        /// File or directory to search (defaults to current directory)
        path: Option<PathBuf>,

        /// Match letter case exactly
        #[arg(short = 's', long)]
        case_sensitive: bool,

        /// Most matching lines to print
        #[arg(short = 'm', long, default_value_t = arbor::text_search::DEFAULT_MAX_TEXT_MATCHES)]
        max_results: usize,

        /// Only files whose name or relative path matches this glob
        #[arg(long)]
        include: Option<String>,

        /// Skip files whose name or relative path matches this glob
        #[arg(long)]
        exclude: Option<String>,

        /// Also search hidden files and directories
        #[arg(long)]
        hidden: bool,

        #[command(flatten)]
        output: cli::OutputArgs,
    },

    /// Outline every supported file under a directory
    Map {
        /// Directory to map (defaults to current directory)
        dir: Option<PathBuf>,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let result = load_config(cli.config.as_deref()).and_then(|config| {
        let analyzer = Analyzer::new(config);
        run(&analyzer, cli.command)
    });

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}: {e}", "error".red().bold());
            let mut source = std::error::Error::source(&e);
            while let Some(cause) = source {
                eprintln!("  {}: {cause}", "caused by".dimmed());
                source = std::error::Error::source(cause);
            }
            ExitCode::FAILURE
        }
    }
}

fn load_config(path: Option<&std::path::Path>) -> arbor::Result<AnalyzerConfig> {
    match path {
        Some(path) => AnalyzerConfig::load(path),
        None => Ok(AnalyzerConfig::default()),
    }
}

fn run(analyzer: &Analyzer, command: Commands) -> arbor::Result<()> {
    match command {
        Commands::Outline { file, output } => cli::outline::run(analyzer, &file, &output),
        Commands::Symbols {
            file,
            pattern,
            kind,
            output,
        } => cli::symbols::run(analyzer, &file, &pattern, kind.as_deref(), &output),
        Commands::NodeAt {
            file,
            offset,
            line,
            column,
            output,
        } => cli::node_at::run(analyzer, &file, offset, line.zip(column), &output),
        Commands::Search {
            file,
            pattern,
            output,
        } => cli::search::run(analyzer, &file, &pattern, &output),
        Commands::Refs { file, name, output } => cli::refs::run(analyzer, &file, &name, &output),
        Commands::Grep {
            pattern,
            path,
            case_sensitive,
            max_results,
            include,
            exclude,
            hidden,
            output,
        } => {
            let path = match path {
                Some(path) => path,
                None => std::env::current_dir()?,
            };
            let options = TextSearchOptions {
                case_sensitive,
                max_results,
                include,
                exclude,
                include_hidden: hidden,
                language: cli::parse_language(output.lang.as_deref())?,
            };
            cli::grep::run(analyzer, &path, &pattern, &options, output.json)
        }
        Commands::Map { dir, json } => {
            let dir = match dir {
                Some(dir) => dir,
                None => std::env::current_dir()?,
            };
            cli::map::run(analyzer, &dir, json)
        }
    }
}
