//! Arbor MCP server binary.
//!
//! This binary runs the MCP server using stdio transport.

use std::path::PathBuf;

use arbor_mcp::ArborMcpServer;
use clap::Parser;
use tracing_subscriber::EnvFilter;

/// Serve arbor code analysis over MCP (stdio).
#[derive(Parser, Debug)]
#[command(name = "arbor-mcp", version, about)]
struct Args {
    /// Directory the server may read (defaults to the current directory)
    #[arg(long, default_value = ".")]
    root: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // stdout carries the protocol; logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    tracing::info!(root = %args.root.display(), "Starting arbor-mcp server");

    let server = ArborMcpServer::new(&args.root)?;
    server.run().await?;

    Ok(())
}
