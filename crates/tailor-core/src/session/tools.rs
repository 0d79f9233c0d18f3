//! Tools exposed to the remote session.
//!
//! The registry is fixed at construction: a session can call exactly the
//! tools registered here, looked up by name. Failures never escape as Rust
//! errors; they come back as error-flagged [`ToolOutput`]s so the remote side
//! can correct its input and try again.

use crate::versions::{self, VersionError};
use serde_json::{Map, Value, json};
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// Name of the revision-persisting tool.
pub const SAVE_RESUME_TOOL: &str = "save_resume";

/// Result of one tool call, as reported back to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolOutput {
    pub is_error: bool,
    pub text: String,
}

impl ToolOutput {
    pub fn ok(text: impl Into<String>) -> Self {
        Self {
            is_error: false,
            text: text.into(),
        }
    }

    pub fn fail(text: impl Into<String>) -> Self {
        Self {
            is_error: true,
            text: text.into(),
        }
    }

    /// MCP `CallToolResult` shape.
    pub fn to_json(&self) -> Value {
        json!({
            "content": [{ "type": "text", "text": self.text }],
            "isError": self.is_error,
        })
    }
}

/// A single callable operation.
pub trait SessionTool: Send + Sync {
    fn name(&self) -> &'static str;

    fn description(&self) -> &'static str;

    /// JSON schema of the `arguments` object.
    fn input_schema(&self) -> Value;

    fn call(&self, arguments: &Map<String, Value>) -> Result<String, ToolError>;
}

/// Persists the caller's draft as the next numbered revision.
#[derive(Debug, Clone)]
pub struct SaveResumeTool {
    app_dir: PathBuf,
}

impl SaveResumeTool {
    pub fn new(app_dir: impl Into<PathBuf>) -> Self {
        Self {
            app_dir: app_dir.into(),
        }
    }
}

impl SessionTool for SaveResumeTool {
    fn name(&self) -> &'static str {
        SAVE_RESUME_TOOL
    }

    fn description(&self) -> &'static str {
        "Save the current resume draft as the next numbered revision in the application \
folder. Pass the complete Markdown resume as `content`. Returns the path of the new file."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "content": {
                    "type": "string",
                    "description": "Complete resume in Markdown"
                }
            },
            "required": ["content"]
        })
    }

    fn call(&self, arguments: &Map<String, Value>) -> Result<String, ToolError> {
        let content = match arguments.get("content") {
            Some(Value::String(s)) => s,
            Some(other) => {
                return Err(ToolError::InvalidArgument(format!(
                    "'content' must be a string, got {}",
                    json_type_name(other)
                )));
            }
            None => {
                return Err(ToolError::InvalidArgument(
                    "missing required argument 'content'".to_string(),
                ));
            }
        };

        let path = versions::write_revision(&self.app_dir, content)?;
        info!(path = %path.display(), "Saved revision from session");
        Ok(path.display().to_string())
    }
}

/// Fixed set of tools keyed by name.
pub struct ToolRegistry {
    tools: Vec<Box<dyn SessionTool>>,
}

impl ToolRegistry {
    /// Registry holding only the `save_resume` tool bound to `app_dir`.
    pub fn for_application(app_dir: impl Into<PathBuf>) -> Self {
        Self {
            tools: vec![Box::new(SaveResumeTool::new(app_dir))],
        }
    }

    pub fn get(&self, name: &str) -> Option<&dyn SessionTool> {
        self.tools
            .iter()
            .find(|t| t.name() == name)
            .map(|t| t.as_ref())
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    /// Tool descriptors for `tools/list`.
    pub fn descriptors(&self) -> Vec<Value> {
        self.tools
            .iter()
            .map(|t| {
                json!({
                    "name": t.name(),
                    "description": t.description(),
                    "inputSchema": t.input_schema(),
                })
            })
            .collect()
    }

    /// Runs the named tool, folding every failure into the output.
    ///
    /// Missing or non-object `arguments` are treated as an empty object.
    pub fn dispatch(&self, name: &str, arguments: Option<&Value>) -> ToolOutput {
        let Some(tool) = self.get(name) else {
            warn!(tool = name, "Unknown tool requested");
            return ToolOutput::fail(ToolError::UnknownTool(name.to_string()).to_string());
        };

        let empty = Map::new();
        let arguments = arguments.and_then(Value::as_object).unwrap_or(&empty);

        match tool.call(arguments) {
            Ok(text) => ToolOutput::ok(text),
            Err(e) => {
                debug!(tool = name, error = %e, "Tool call failed");
                ToolOutput::fail(e.to_string())
            }
        }
    }
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.names())
            .finish()
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Tool call failures. Reported to the remote session, never raised.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Failed to save revision: {0}")]
    Revision(#[from] VersionError),
}
