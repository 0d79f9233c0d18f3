//! # tailor-core
//!
//! Core functionality for Tailor, a file-based workflow for producing
//! job-specific resume revisions.
//!
//! This crate provides:
//! - Project configuration loading, saving and walk-up discovery
//! - Application folders seeded with a job description
//! - Numbered resume revisions and next-revision allocation
//! - The encoded context handed to interactive session subprocesses
//! - The stdio session server exposing the `save_resume` tool
//!
//! The filesystem is the only persistence layer; nothing is cached.

pub mod application;
pub mod config;
pub mod context;
pub mod fs;
pub mod prompt;
pub mod session;
pub mod versions;

pub use application::{
    APPLICATIONS_DIR, Application, ApplicationError, JOB_FILE_NAME, Project, folder_name_for,
    sanitize_folder_name,
};
pub use config::{
    AgentConfig, CONFIG_ENV_VAR, CONFIG_FILE_NAME, Config, ConfigError, find_config,
    find_with_overrides, resolve_config_path,
};
pub use context::{ContextError, SessionContext};
pub use session::{
    SAVE_RESUME_TOOL, SessionError, SessionServer, SessionState, ToolError, ToolOutput,
    ToolRegistry,
};
pub use versions::{
    Revision, VersionError, Versions, latest_version_path, list_versions, next_version_path,
    write_revision,
};
