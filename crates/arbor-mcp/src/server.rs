//! MCP server implementation.
//!
//! This module contains the main server setup using rmcp.

use crate::models::{
    CodebaseMapParams, CodebaseMapResponse, FindReferencesParams, FindSymbolParams, NodeAtParams,
    OutlineParams, SearchParams, SearchTextParams,
};
use crate::tools::Tools;
use crate::workspace::Workspace;
use arbor::Analyzer;
use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{
    CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo,
};
use rmcp::transport::stdio;
use rmcp::{
    ErrorData as McpError, ServiceExt, handler::server::ServerHandler, tool, tool_handler,
    tool_router,
};
use std::path::Path;
use std::sync::Arc;

/// The arbor MCP server.
///
/// Provides MCP protocol handling over stdio transport.
#[derive(Clone)]
pub struct ArborMcpServer {
    /// Tool implementations.
    tools: Arc<Tools>,
    /// Tool router for MCP dispatch.
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl ArborMcpServer {
    /// Outline a source file.
    #[tool(
        description = "Get the structural outline of a source file: classes, functions, methods, fields and imports with their spans, plus any syntax errors. Pass `content` to analyze unsaved text."
    )]
    async fn get_outline(
        &self,
        Parameters(params): Parameters<OutlineParams>,
    ) -> Result<CallToolResult, McpError> {
        match self.tools.get_outline(params).await {
            Ok(outline) => Ok(CallToolResult::success(vec![Content::json(outline)?])),
            Err(e) => Err(McpError::internal_error(e.to_string(), None)),
        }
    }

    /// Find symbols by name.
    #[tool(
        description = "Find symbols in a file whose names match a case-insensitive glob or substring. Optionally filter by kind (class, function, method, field, variable, module, import)."
    )]
    async fn find_symbol(
        &self,
        Parameters(params): Parameters<FindSymbolParams>,
    ) -> Result<CallToolResult, McpError> {
        match self.tools.find_symbol(params).await {
            Ok(matches) => Ok(CallToolResult::success(vec![Content::json(matches)?])),
            Err(e) => Err(McpError::internal_error(e.to_string(), None)),
        }
    }

    /// Describe the node at a position.
    #[tool(
        description = "Show the innermost syntax node at a byte offset or a 1-based line and column, with its ancestor kinds."
    )]
    async fn node_at(
        &self,
        Parameters(params): Parameters<NodeAtParams>,
    ) -> Result<CallToolResult, McpError> {
        match self.tools.node_at(params).await {
            Ok(node) => Ok(CallToolResult::success(vec![Content::json(node)?])),
            Err(e) => Err(McpError::internal_error(e.to_string(), None)),
        }
    }

    /// Structural search.
    #[tool(
        description = "Search a file with an S-expression pattern such as `(call function: (attribute))` or `(function_definition name: (identifier \"main\"))`. Matches are returned in source order."
    )]
    async fn search_structure(
        &self,
        Parameters(params): Parameters<SearchParams>,
    ) -> Result<CallToolResult, McpError> {
        match self.tools.search_structure(params).await {
            Ok(matches) => Ok(CallToolResult::success(vec![Content::json(matches)?])),
            Err(e) => Err(McpError::internal_error(e.to_string(), None)),
        }
    }

    /// Regular expression search.
    #[tool(
        description = "Search file contents with a regular expression, line by line. `path` may be a file or a directory (default: the server root). Directory searches skip hidden and build directories and accept `include`/`exclude` globs. Case-insensitive unless `case_sensitive` is set; at most `max_results` lines (default 100)."
    )]
    async fn search_text(
        &self,
        Parameters(params): Parameters<SearchTextParams>,
    ) -> Result<CallToolResult, McpError> {
        match self.tools.search_text(params).await {
            Ok(result) => Ok(CallToolResult::success(vec![Content::json(result)?])),
            Err(e) => Err(McpError::internal_error(e.to_string(), None)),
        }
    }

    /// Find call sites and references.
    #[tool(
        description = "Find calls, constructions and imports of an exact name within a file, with the enclosing symbol of each."
    )]
    async fn find_references(
        &self,
        Parameters(params): Parameters<FindReferencesParams>,
    ) -> Result<CallToolResult, McpError> {
        match self.tools.find_references(params).await {
            Ok(references) => Ok(CallToolResult::success(vec![Content::json(references)?])),
            Err(e) => Err(McpError::internal_error(e.to_string(), None)),
        }
    }

    /// Map a directory.
    #[tool(
        description = "Outline every supported source file under a directory (default: the server root), skipping hidden and build directories. Returns statistics, per-file outlines and errors."
    )]
    async fn codebase_map(
        &self,
        Parameters(params): Parameters<CodebaseMapParams>,
    ) -> Result<CallToolResult, McpError> {
        match self.tools.codebase_map(&params).await {
            Ok(map) if params.text => Ok(CallToolResult::success(vec![Content::text(
                arbor::render::render_map(&map),
            )])),
            Ok(map) => {
                let response = CodebaseMapResponse {
                    stats: map.stats(),
                    map,
                };
                Ok(CallToolResult::success(vec![Content::json(response)?]))
            }
            Err(e) => Err(McpError::internal_error(e.to_string(), None)),
        }
    }

    /// Parse cache counters.
    #[tool(description = "Show parse cache statistics: entries, hits, misses, parses and evictions.")]
    async fn cache_stats(&self) -> Result<CallToolResult, McpError> {
        Ok(CallToolResult::success(vec![Content::json(
            self.tools.cache_stats(),
        )?]))
    }
}

impl ArborMcpServer {
    /// Create a server confined to `root`, with a default analyzer.
    ///
    /// # Errors
    ///
    /// Returns an error if `root` is not an existing directory.
    pub fn new(root: &Path) -> crate::Result<Self> {
        Self::with_analyzer(root, Analyzer::default())
    }

    /// Create a server confined to `root`, sharing `analyzer`'s cache.
    ///
    /// # Errors
    ///
    /// Returns an error if `root` is not an existing directory.
    pub fn with_analyzer(root: &Path, analyzer: Analyzer) -> crate::Result<Self> {
        let workspace = Workspace::new(root)?;
        Ok(Self {
            tools: Arc::new(Tools::new(workspace, analyzer)),
            tool_router: Self::tool_router(),
        })
    }

    /// Get a reference to the tool implementations.
    #[must_use]
    pub fn tools(&self) -> &Tools {
        &self.tools
    }

    /// Serve MCP over stdin/stdout until the client disconnects.
    ///
    /// # Errors
    ///
    /// Returns an error if the transport fails to start or shuts down abnormally.
    pub async fn run(self) -> anyhow::Result<()> {
        let service = self.serve(stdio()).await?;
        service.waiting().await?;
        Ok(())
    }
}

#[tool_handler]
impl ServerHandler for ArborMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "arbor-mcp".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                title: None,
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Arbor structural code analysis. Paths are relative to the server root; pass `content` to analyze unsaved text."
                    .into(),
            ),
        }
    }
}
