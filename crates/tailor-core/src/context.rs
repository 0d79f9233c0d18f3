//! Self-contained inputs for an interactive session subprocess.
//!
//! The launcher encodes a [`SessionContext`] into a single command-line safe
//! token; `tailor serve --context <token>` decodes it on the other side. The
//! token is compact JSON wrapped in URL-safe base64 without padding, so it
//! only ever contains `A-Z a-z 0-9 - _`.
//!
//! ```
//! use tailor_core::SessionContext;
//!
//! let ctx = SessionContext {
//!     app_dir: "/project/applications/acme".into(),
//!     resume: "# Jane Doe".to_string(),
//!     job: "Rust engineer".to_string(),
//!     ats: true,
//!     model: None,
//! };
//! let token = ctx.encode()?;
//! assert_eq!(SessionContext::decode(&token)?, ctx);
//! # Ok::<(), tailor_core::ContextError>(())
//! ```

use crate::application::{Application, ApplicationError};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Everything an interactive session needs, carried by value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionContext {
    /// Application folder the session writes revisions into.
    pub app_dir: PathBuf,

    /// Full text of the base resume.
    pub resume: String,

    /// Full text of the job description.
    pub job: String,

    /// Optimize for applicant tracking systems.
    pub ats: bool,

    /// Model override for the agent.
    pub model: Option<String>,
}

impl SessionContext {
    /// Builds a context from an application folder and the base resume text.
    pub fn for_application(
        app: &Application,
        resume: String,
        ats: bool,
        model: Option<String>,
    ) -> Result<Self, ApplicationError> {
        Ok(Self {
            app_dir: app.dir().to_path_buf(),
            resume,
            job: app.job_text()?,
            ats,
            model,
        })
    }

    /// Encodes the context into a transport-safe token.
    pub fn encode(&self) -> Result<String, ContextError> {
        let json = serde_json::to_vec(self).map_err(ContextError::Format)?;
        Ok(URL_SAFE_NO_PAD.encode(json))
    }

    /// Decodes a token produced by [`SessionContext::encode`].
    pub fn decode(token: &str) -> Result<Self, ContextError> {
        let bytes = URL_SAFE_NO_PAD.decode(token.trim())?;
        serde_json::from_slice(&bytes).map_err(ContextError::Format)
    }
}

/// Failures turning a token back into a [`SessionContext`].
///
/// Either way the session cannot start; neither is worth retrying.
#[derive(Debug, thiserror::Error)]
pub enum ContextError {
    #[error("Session context is not valid base64: {0}")]
    Decode(#[from] base64::DecodeError),

    #[error("Session context is malformed: {0}")]
    Format(#[source] serde_json::Error),
}
