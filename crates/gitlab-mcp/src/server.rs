//! MCP Server implementation
//!
//! Reads newline-delimited JSON-RPC from stdin and writes responses to
//! stdout. Each request runs on its own task, so a slow GitLab call does not
//! hold up the ones behind it; a single writer task keeps output lines whole.

use std::sync::Arc;

use serde_json::{Value, json};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinSet;

use crate::dispatcher::Dispatcher;
use crate::protocol::{
    INVALID_PARAMS, INVALID_REQUEST, InitializeResult, JsonRpcRequest, JsonRpcResponse,
    METHOD_NOT_FOUND, PARSE_ERROR, PROTOCOL_VERSION, ServerCapabilities, ServerInfo,
    ToolCallParams, ToolsCapability,
};
use crate::tools::ToolResult;
use crate::{Error, Result};

/// Name reported in `initialize`.
pub const SERVER_NAME: &str = "gitlab-zero-leak-mcp-server";

/// MCP Server for GitLab
///
/// # Example
///
/// ```ignore
/// use gitlab_mcp::{Dispatcher, GitLabMcpServer};
///
/// let server = GitLabMcpServer::new(dispatcher);
/// server.run_stdio().await?;
/// ```
#[derive(Debug, Clone)]
pub struct GitLabMcpServer {
    dispatcher: Arc<Dispatcher>,
}

impl GitLabMcpServer {
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self {
            dispatcher: Arc::new(dispatcher),
        }
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Serve stdin/stdout until stdin closes.
    pub async fn run_stdio(&self) -> Result<()> {
        self.run(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
            .await
    }

    /// Serve one message per line from `reader`, writing responses to
    /// `writer`. Returns once the input ends and every in-flight request has
    /// answered.
    pub async fn run<R, W>(&self, reader: R, writer: W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let (tx, rx) = mpsc::unbounded_channel::<String>();
        let writer_task = tokio::spawn(write_lines(rx, writer));
        let mut in_flight = JoinSet::new();

        tracing::info!("MCP server ready, listening on stdio");

        let mut lines = reader.lines();
        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }
            tracing::debug!(request = %line, "Received message");

            let server = self.clone();
            let tx = tx.clone();
            in_flight.spawn(async move {
                let response = server.handle_line(&line).await;
                if !response.is_empty() {
                    // The writer only stops once every sender is gone.
                    let _ = tx.send(response);
                }
            });

            while in_flight.try_join_next().is_some() {}
        }

        while in_flight.join_next().await.is_some() {}
        drop(tx);

        writer_task
            .await
            .map_err(|e| Error::Io(std::io::Error::other(e)))??;
        Ok(())
    }

    /// Handle a raw line, turning any failure into a JSON-RPC error response.
    async fn handle_line(&self, line: &str) -> String {
        match self.handle_message(line).await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(error = %e, "Rejected malformed message");
                let response =
                    JsonRpcResponse::error(None, PARSE_ERROR, format!("Parse error: {e}"));
                serde_json::to_string(&response).unwrap_or_default()
            }
        }
    }

    /// Handle a single MCP message
    ///
    /// Returns the JSON-RPC response as a string, or an empty string for
    /// notifications.
    pub async fn handle_message(&self, message: &str) -> Result<String> {
        let request: JsonRpcRequest = serde_json::from_str(message)?;

        if request.jsonrpc != "2.0" {
            let response = JsonRpcResponse::error(
                request.id,
                INVALID_REQUEST,
                format!("Invalid Request: unsupported jsonrpc version {:?}", request.jsonrpc),
            );
            return serde_json::to_string(&response).map_err(Error::from);
        }

        let response = match request.method.as_str() {
            "initialize" => self.handle_initialize(request.id)?,
            "initialized" | "notifications/initialized" => return Ok(String::new()),
            "tools/list" => self.handle_tools_list(request.id)?,
            "tools/call" => self.handle_tools_call(request.id, request.params).await?,
            // Notifications never get a reply, even for methods we don't know.
            _ if request.id.is_none() => {
                tracing::debug!(method = %request.method, "Ignoring unknown notification");
                return Ok(String::new());
            }
            _ => JsonRpcResponse::error(
                request.id,
                METHOD_NOT_FOUND,
                format!("Method not found: {}", request.method),
            ),
        };

        serde_json::to_string(&response).map_err(Error::from)
    }

    fn handle_initialize(&self, id: Option<Value>) -> Result<JsonRpcResponse> {
        let result = InitializeResult {
            protocol_version: PROTOCOL_VERSION.to_string(),
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability {
                    list_changed: Some(false),
                }),
            },
            server_info: ServerInfo {
                name: SERVER_NAME.to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
        };

        Ok(JsonRpcResponse::success(id, serde_json::to_value(result)?))
    }

    fn handle_tools_list(&self, id: Option<Value>) -> Result<JsonRpcResponse> {
        let tools = self.dispatcher.list_tools();
        Ok(JsonRpcResponse::success(id, json!({ "tools": tools })))
    }

    /// Every tool failure surfaces here as a JSON-RPC error.
    async fn handle_tools_call(
        &self,
        id: Option<Value>,
        params: Value,
    ) -> Result<JsonRpcResponse> {
        let params: ToolCallParams = match serde_json::from_value(params) {
            Ok(params) => params,
            Err(e) => {
                return Ok(JsonRpcResponse::error(
                    id,
                    INVALID_PARAMS,
                    format!("Invalid params: {e}"),
                ));
            }
        };

        match self.dispatcher.dispatch(&params.name, params.arguments).await {
            Ok(result) => {
                let tool_result = ToolResult::text(serde_json::to_string_pretty(&result)?);
                Ok(JsonRpcResponse::success(id, serde_json::to_value(tool_result)?))
            }
            Err(e) => {
                match &e {
                    Error::MissingArguments
                    | Error::InvalidArguments { .. }
                    | Error::PolicyDenied { .. }
                    | Error::UnknownTool(_) => {
                        tracing::warn!(tool = %params.name, error = %e, "Tool call rejected");
                    }
                    _ => tracing::error!(tool = %params.name, error = %e, "Tool call failed"),
                }
                Ok(JsonRpcResponse::error(id, e.code(), e.to_string()))
            }
        }
    }
}

async fn write_lines<W>(mut rx: mpsc::UnboundedReceiver<String>, mut writer: W) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    while let Some(line) = rx.recv().await {
        writer.write_all(line.as_bytes()).await?;
        writer.write_all(b"\n").await?;
        writer.flush().await?;
    }
    Ok(())
}
