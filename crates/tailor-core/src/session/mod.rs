//! Interactive session support.
//!
//! An interactive optimization pass runs the agent as a subprocess and wires
//! it to `tailor serve`, which decodes the [`SessionContext`] and exposes a
//! single `save_resume` tool. Every call writes the next numbered revision
//! into the application folder.
//!
//! [`SessionContext`]: crate::context::SessionContext

mod server;
mod tools;

pub use server::{DEFAULT_PROTOCOL_VERSION, SessionError, SessionServer, SessionState};
pub use tools::{
    SAVE_RESUME_TOOL, SaveResumeTool, SessionTool, ToolError, ToolOutput, ToolRegistry,
};
