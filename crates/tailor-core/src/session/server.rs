//! Stdio session server.
//!
//! Speaks newline-delimited JSON-RPC 2.0 in the shape MCP clients expect from
//! a stdio server: `initialize`, `tools/list`, `tools/call` and `ping`. One
//! message is read, handled to completion and answered before the next is
//! read. The server stops when the client closes its end of the channel.

use super::tools::ToolRegistry;
use crate::context::SessionContext;
use crate::prompt;
use serde::Serialize;
use serde_json::{Value, json};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info, warn};

/// Protocol version reported when the client does not propose one.
pub const DEFAULT_PROTOCOL_VERSION: &str = "2024-11-05";

const SERVER_NAME: &str = "tailor";

const PARSE_ERROR: i64 = -32700;
const INVALID_REQUEST: i64 = -32600;
const METHOD_NOT_FOUND: i64 = -32601;
const INVALID_PARAMS: i64 = -32602;

/// Lifecycle of a [`SessionServer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Constructed, not yet serving.
    Idle,
    /// Reading and answering requests.
    Serving,
    /// Channel closed; no further requests are accepted.
    Closed,
}

#[derive(Debug, Serialize)]
struct Response {
    jsonrpc: &'static str,
    id: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<RpcError>,
}

#[derive(Debug, Serialize)]
struct RpcError {
    code: i64,
    message: String,
}

impl Response {
    fn result(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            result: Some(result),
            error: None,
        }
    }

    fn error(id: Value, code: i64, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            result: None,
            error: Some(RpcError {
                code,
                message: message.into(),
            }),
        }
    }
}

/// Serves the write tool for one decoded [`SessionContext`].
#[derive(Debug)]
pub struct SessionServer {
    context: SessionContext,
    tools: ToolRegistry,
    state: SessionState,
}

impl SessionServer {
    pub fn new(context: SessionContext) -> Self {
        let tools = ToolRegistry::for_application(context.app_dir.clone());
        Self {
            context,
            tools,
            state: SessionState::Idle,
        }
    }

    pub fn context(&self) -> &SessionContext {
        &self.context
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Serves on the process's stdin and stdout.
    pub async fn serve_stdio(&mut self) -> Result<(), SessionError> {
        let stdin = tokio::io::BufReader::new(tokio::io::stdin());
        let stdout = tokio::io::stdout();
        self.serve(stdin, stdout).await
    }

    /// Serves until `reader` reaches end of input.
    ///
    /// Only channel I/O failures are returned as errors; bad requests and
    /// failed tool calls are answered on the channel.
    pub async fn serve<R, W>(&mut self, mut reader: R, mut writer: W) -> Result<(), SessionError>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        if self.state == SessionState::Closed {
            return Err(SessionError::Closed);
        }
        self.state = SessionState::Serving;
        info!(app_dir = %self.context.app_dir.display(), "Session server started");

        let mut buf = Vec::new();
        let mut handled = 0usize;
        let outcome = loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf).await {
                Ok(0) => break Ok(()),
                Ok(_) => {}
                Err(e) => break Err(SessionError::Io(e)),
            }

            let response = match std::str::from_utf8(&buf) {
                Ok(line) if line.trim().is_empty() => continue,
                Ok(line) => self.handle_message(line),
                Err(e) => {
                    warn!(error = %e, "Message is not valid UTF-8");
                    Some(to_value(Response::error(
                        Value::Null,
                        PARSE_ERROR,
                        format!("Parse error: {e}"),
                    )))
                }
            };

            handled += 1;
            if let Some(response) = response
                && let Err(e) = write_message(&mut writer, &response).await
            {
                break Err(e);
            }
        };

        self.state = SessionState::Closed;
        info!(messages = handled, "Session server closed");
        outcome
    }

    /// Handles one raw message. Returns the response to send, if any.
    ///
    /// Notifications (messages without an `id`) never get a response. Batches
    /// are not supported and are rejected like any other non-object message.
    pub fn handle_message(&self, line: &str) -> Option<Value> {
        let message: Value = match serde_json::from_str(line) {
            Ok(value) => value,
            Err(e) => {
                warn!(error = %e, "Unparsable message");
                return Some(to_value(Response::error(
                    Value::Null,
                    PARSE_ERROR,
                    format!("Parse error: {e}"),
                )));
            }
        };

        if !message.is_object() {
            warn!("Message is not a JSON object");
            return Some(to_value(Response::error(
                Value::Null,
                INVALID_REQUEST,
                "Invalid request: expected a JSON object",
            )));
        }

        let id = message.get("id").cloned();
        let Some(method) = message.get("method").and_then(Value::as_str) else {
            return id.map(|id| {
                to_value(Response::error(
                    id,
                    INVALID_REQUEST,
                    "Invalid request: missing 'method'",
                ))
            });
        };

        let Some(id) = id else {
            debug!(method, "Notification received");
            return None;
        };

        let params = message.get("params");
        debug!(method, "Request received");
        let response = match method {
            "initialize" => Response::result(id, self.initialize_result(params)),
            "ping" => Response::result(id, json!({})),
            "tools/list" => Response::result(id, json!({ "tools": self.tools.descriptors() })),
            "tools/call" => self.call_tool(id, params),
            other => Response::error(
                id,
                METHOD_NOT_FOUND,
                format!("Method not found: {other}"),
            ),
        };
        Some(to_value(response))
    }

    fn initialize_result(&self, params: Option<&Value>) -> Value {
        let protocol_version = params
            .and_then(|p| p.get("protocolVersion"))
            .and_then(Value::as_str)
            .unwrap_or(DEFAULT_PROTOCOL_VERSION);

        json!({
            "protocolVersion": protocol_version,
            "capabilities": { "tools": { "listChanged": false } },
            "serverInfo": {
                "name": SERVER_NAME,
                "version": env!("CARGO_PKG_VERSION"),
            },
            "instructions": prompt::session_instructions(&self.context),
        })
    }

    fn call_tool(&self, id: Value, params: Option<&Value>) -> Response {
        let Some(name) = params
            .and_then(|p| p.get("name"))
            .and_then(Value::as_str)
        else {
            return Response::error(id, INVALID_PARAMS, "Invalid params: missing tool 'name'");
        };

        let arguments = params.and_then(|p| p.get("arguments"));
        let output = self.tools.dispatch(name, arguments);
        Response::result(id, output.to_json())
    }
}

fn to_value(response: Response) -> Value {
    // Response only holds JSON values and strings.
    serde_json::to_value(response).unwrap_or(Value::Null)
}

async fn write_message<W>(writer: &mut W, message: &Value) -> Result<(), SessionError>
where
    W: AsyncWrite + Unpin,
{
    let mut line = serde_json::to_string(message)?;
    line.push('\n');
    writer.write_all(line.as_bytes()).await?;
    writer.flush().await?;
    Ok(())
}

/// Process-level session failures.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Session channel I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize response: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Session already closed")]
    Closed,
}
