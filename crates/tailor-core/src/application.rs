//! Application folders under `<project>/applications/`.
//!
//! Each job application gets its own directory holding the job description
//! as it was given and every resume revision produced for it. Nothing here
//! deletes or rewrites existing files.

use crate::fs::{self as tfs, DEFAULT_DIR_MODE};
use crate::versions::{self, Revision, VersionError};
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Directory under the project root that holds application folders.
pub const APPLICATIONS_DIR: &str = "applications";

/// File name of the job description copy inside an application folder.
pub const JOB_FILE_NAME: &str = "job.txt";

/// Longest folder name produced by [`sanitize_folder_name`].
pub const MAX_FOLDER_NAME_LEN: usize = 64;

/// Name used when sanitization leaves nothing.
pub const FALLBACK_FOLDER_NAME: &str = "application";

/// Turns arbitrary text into a single safe path segment.
///
/// Lower-cases, maps whitespace and `_` to `-`, drops everything that is not
/// an ASCII alphanumeric or `-`, collapses runs of `-`, trims them from both
/// ends and caps the length. Separators, `.` and `..` can never survive.
pub fn sanitize_folder_name(raw: &str) -> String {
    let mut result = String::with_capacity(raw.len());
    let mut prev_hyphen = true;

    for c in raw.chars() {
        let c = if c.is_whitespace() || c == '_' { '-' } else { c };
        if c == '-' {
            if !prev_hyphen {
                result.push('-');
            }
            prev_hyphen = true;
        } else if c.is_ascii_alphanumeric() {
            result.push(c.to_ascii_lowercase());
            prev_hyphen = false;
        }
    }

    result.truncate(MAX_FOLDER_NAME_LEN);
    let trimmed = result.trim_matches('-');

    if trimmed.is_empty() {
        FALLBACK_FOLDER_NAME.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Folder name for a company and role, e.g. `acme-staff-engineer`.
pub fn folder_name_for(company: &str, role: &str) -> String {
    sanitize_folder_name(&format!("{company} {role}"))
}

/// A project root and the applications inside it.
#[derive(Debug, Clone)]
pub struct Project {
    root: PathBuf,
}

impl Project {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Returns the project for a config file path (its parent directory).
    pub fn from_config_path(config_path: &Path) -> Self {
        let root = config_path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        Self::new(root)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn applications_dir(&self) -> PathBuf {
        self.root.join(APPLICATIONS_DIR)
    }

    /// Path of the folder `name` would use, sanitized.
    pub fn application_dir(&self, name: &str) -> PathBuf {
        self.applications_dir().join(sanitize_folder_name(name))
    }

    /// Creates a new application folder and copies the job description in.
    ///
    /// Fails if the folder already exists or the job file is missing. A crash
    /// after the folder is created leaves an empty but valid folder.
    pub fn create_application(
        &self,
        name: &str,
        job_source: &Path,
    ) -> Result<Application, ApplicationError> {
        let folder = sanitize_folder_name(name);
        let dir = self.applications_dir().join(&folder);

        if !job_source.is_file() {
            return Err(ApplicationError::MissingJob(job_source.to_path_buf()));
        }
        if tfs::exists(&dir) {
            return Err(ApplicationError::AlreadyExists(folder));
        }

        tfs::create_dir_all(&dir, DEFAULT_DIR_MODE)?;
        tfs::copy_file(job_source, &dir.join(JOB_FILE_NAME))?;

        info!(application = %folder, dir = %dir.display(), "Created application");
        Ok(Application { name: folder, dir })
    }

    /// Opens an existing application folder.
    pub fn open_application(&self, name: &str) -> Result<Application, ApplicationError> {
        let folder = sanitize_folder_name(name);
        let dir = self.applications_dir().join(&folder);
        if !dir.is_dir() {
            return Err(ApplicationError::NotFound(folder));
        }
        Ok(Application { name: folder, dir })
    }

    /// Lists application folders sorted by name.
    ///
    /// A project without an `applications/` directory has no applications.
    pub fn list_applications(&self) -> Result<Vec<Application>, ApplicationError> {
        let apps_dir = self.applications_dir();
        if !apps_dir.is_dir() {
            debug!(dir = %apps_dir.display(), "No applications directory");
            return Ok(Vec::new());
        }

        let mut apps = Vec::new();
        for entry in std::fs::read_dir(&apps_dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            apps.push(Application {
                name,
                dir: entry.path(),
            });
        }
        apps.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(apps)
    }
}

/// One application folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Application {
    name: String,
    dir: PathBuf,
}

impl Application {
    /// Wraps an existing directory without checking it.
    pub fn at(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        let name = dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self { name, dir }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn job_path(&self) -> PathBuf {
        self.dir.join(JOB_FILE_NAME)
    }

    /// Reads the job description copy.
    pub fn job_text(&self) -> Result<String, ApplicationError> {
        let path = self.job_path();
        std::fs::read_to_string(&path).map_err(|e| {
            if e.kind() == io::ErrorKind::NotFound {
                ApplicationError::MissingJob(path)
            } else {
                ApplicationError::Io(e)
            }
        })
    }

    pub fn revisions(&self) -> Result<Vec<Revision>, VersionError> {
        Ok(versions::list_versions(&self.dir)?.collect())
    }

    pub fn revision_count(&self) -> Result<usize, VersionError> {
        Ok(versions::list_versions(&self.dir)?.len())
    }

    pub fn latest_revision(&self) -> Result<Revision, VersionError> {
        versions::latest_version(&self.dir)
    }

    pub fn next_revision_path(&self) -> Result<PathBuf, VersionError> {
        versions::next_version_path(&self.dir)
    }

    /// Stores `content` as the next revision.
    pub fn write_revision(&self, content: &str) -> Result<PathBuf, VersionError> {
        versions::write_revision(&self.dir, content)
    }
}

/// Errors for application folder operations.
#[derive(Debug, thiserror::Error)]
pub enum ApplicationError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Application '{0}' already exists")]
    AlreadyExists(String),

    #[error("Application '{0}' not found")]
    NotFound(String),

    #[error("Job description not found: {}", .0.display())]
    MissingJob(PathBuf),
}
