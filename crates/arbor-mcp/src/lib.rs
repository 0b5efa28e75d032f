//! MCP server for arbor structural code analysis.
//!
//! This crate provides an MCP (Model Context Protocol) server that exposes
//! arbor's outline, symbol search, and structural query operations to AI
//! assistants.
//!
//! # Architecture
//!
//! The server uses the `rmcp` crate for MCP protocol handling and wraps one
//! shared [`arbor::Analyzer`], so repeated questions about the same file are
//! answered from the parse cache. Every path is confined to the root
//! directory given at startup.
//!
//! # Tools
//!
//! ## Single file
//! - `get_outline` - Classes, functions, and their nesting
//! - `find_symbol` - Symbols by name pattern and kind
//! - `node_at` - Syntax node at a position
//! - `search_structure` - S-expression structural search
//! - `find_references` - Call sites of a name
//!
//! ## Workspace
//! - `codebase_map` - Outline every file under a directory
//! - `cache_stats` - Parse cache counters

pub mod error;
pub mod models;
pub mod server;
pub mod tools;
pub mod workspace;

pub use error::{Error, Result};
pub use server::ArborMcpServer;
