//! Numbered resume revisions inside an application folder.
//!
//! Revisions are plain files named `resume_v<N>.md` with `N` a positive
//! integer. The directory listing is the only source of truth: every query
//! re-reads it, so there is nothing to invalidate.
//!
//! ```text
//! applications/acme-platform-engineer/
//! ├── job.txt
//! ├── resume_v1.md
//! ├── resume_v2.md
//! └── resume_v4.md      # gaps are fine; next is resume_v5.md
//! ```

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Filename prefix shared by every revision.
pub const REVISION_PREFIX: &str = "resume_v";

/// Filename extension shared by every revision.
pub const REVISION_EXTENSION: &str = ".md";

/// One revision file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Revision {
    pub number: u32,
    pub path: PathBuf,
}

/// Revisions of one folder in increasing order.
///
/// Consumed once; call [`list_versions`] again for a fresh view.
#[derive(Debug)]
pub struct Versions {
    inner: std::vec::IntoIter<Revision>,
}

impl Iterator for Versions {
    type Item = Revision;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl DoubleEndedIterator for Versions {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back()
    }
}

impl ExactSizeIterator for Versions {}

/// Returns the file name for revision `number`.
pub fn revision_file_name(number: u32) -> String {
    format!("{REVISION_PREFIX}{number}{REVISION_EXTENSION}")
}

/// Extracts the revision number from a file name.
///
/// Returns `None` for anything that is not `resume_v<digits>.md` with a
/// positive value.
pub fn parse_revision_number(file_name: &str) -> Option<u32> {
    let digits = file_name
        .strip_prefix(REVISION_PREFIX)?
        .strip_suffix(REVISION_EXTENSION)?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse::<u32>().ok().filter(|n| *n > 0)
}

/// Lists the revisions in `app_dir`, lowest number first.
pub fn list_versions(app_dir: &Path) -> Result<Versions, VersionError> {
    let mut revisions = Vec::new();

    for entry in fs::read_dir(app_dir)? {
        let entry = entry?;
        let file_name = entry.file_name();
        let Some(name) = file_name.to_str() else {
            continue;
        };
        let Some(number) = parse_revision_number(name) else {
            continue;
        };
        if !entry.file_type()?.is_file() {
            continue;
        }
        revisions.push(Revision {
            number,
            path: entry.path(),
        });
    }

    revisions.sort_by_key(|r| r.number);
    Ok(Versions {
        inner: revisions.into_iter(),
    })
}

/// Returns the highest-numbered revision in `app_dir`.
pub fn latest_version(app_dir: &Path) -> Result<Revision, VersionError> {
    list_versions(app_dir)?
        .next_back()
        .ok_or_else(|| VersionError::NoVersions(app_dir.to_path_buf()))
}

/// Returns the path of the highest-numbered revision in `app_dir`.
pub fn latest_version_path(app_dir: &Path) -> Result<PathBuf, VersionError> {
    latest_version(app_dir).map(|r| r.path)
}

/// Returns the number the next revision should take.
pub fn next_version_number(app_dir: &Path) -> Result<u32, VersionError> {
    let max = list_versions(app_dir)?
        .next_back()
        .map_or(0, |r| r.number);
    max.checked_add(1)
        .ok_or_else(|| VersionError::Exhausted(app_dir.to_path_buf()))
}

/// Returns the path for the next revision in `app_dir`.
///
/// Only file names are inspected. Whether the path is still free at write
/// time is the writer's concern.
pub fn next_version_path(app_dir: &Path) -> Result<PathBuf, VersionError> {
    let number = next_version_number(app_dir)?;
    Ok(app_dir.join(revision_file_name(number)))
}

/// Writes `content` as the next revision and returns its path.
///
/// The text goes to a temporary file in the same directory first and is then
/// linked into place without replacing an existing file, so the revision
/// either appears complete or not at all.
pub fn write_revision(app_dir: &Path, content: &str) -> Result<PathBuf, VersionError> {
    let path = next_version_path(app_dir)?;

    let mut tmp = tempfile::Builder::new()
        .prefix(".revision-")
        .suffix(".tmp")
        .tempfile_in(app_dir)?;
    tmp.write_all(content.as_bytes())?;
    tmp.as_file().sync_all()?;
    tmp.persist_noclobber(&path).map_err(|e| VersionError::Io(e.error))?;

    debug!(path = %path.display(), bytes = content.len(), "Wrote revision");
    Ok(path)
}

/// Errors raised by revision queries.
#[derive(Debug, thiserror::Error)]
pub enum VersionError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("No revisions found in {}", .0.display())]
    NoVersions(PathBuf),

    #[error("Revision numbers exhausted in {}", .0.display())]
    Exhausted(PathBuf),
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(dir: &Path, name: &str) {
        fs::write(dir.join(name), name).unwrap();
    }

    #[test]
    fn test_parse_revision_number() {
        assert_eq!(parse_revision_number("resume_v1.md"), Some(1));
        assert_eq!(parse_revision_number("resume_v42.md"), Some(42));
        assert_eq!(parse_revision_number("resume_v007.md"), Some(7));

        assert_eq!(parse_revision_number("resume_v0.md"), None);
        assert_eq!(parse_revision_number("resume_v.md"), None);
        assert_eq!(parse_revision_number("resume_vabc.md"), None);
        assert_eq!(parse_revision_number("resume_v-1.md"), None);
        assert_eq!(parse_revision_number("resume_v+1.md"), None);
        assert_eq!(parse_revision_number("resume_v1.txt"), None);
        assert_eq!(parse_revision_number("resume_v1.md.bak"), None);
        assert_eq!(parse_revision_number("job.txt"), None);
        assert_eq!(parse_revision_number("resume_v99999999999.md"), None);
    }

    #[test]
    fn test_list_versions_sorted_and_filtered() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path();
        touch(dir, "resume_v10.md");
        touch(dir, "resume_v2.md");
        touch(dir, "resume_v1.md");
        touch(dir, "resume_vdraft.md");
        touch(dir, "job.txt");
        touch(dir, "resume.json");
        fs::create_dir(dir.join("resume_v3.md")).unwrap();

        let numbers: Vec<u32> = list_versions(dir).unwrap().map(|r| r.number).collect();
        assert_eq!(numbers, vec![1, 2, 10]);
    }

    #[test]
    fn test_list_versions_is_recomputed() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "resume_v1.md");
        assert_eq!(list_versions(temp.path()).unwrap().len(), 1);

        touch(temp.path(), "resume_v2.md");
        assert_eq!(list_versions(temp.path()).unwrap().len(), 2);
    }

    #[test]
    fn test_latest_and_next_with_gap() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path();
        touch(dir, "resume_v1.md");
        touch(dir, "resume_v2.md");
        touch(dir, "resume_v4.md");

        assert_eq!(latest_version_path(dir).unwrap(), dir.join("resume_v4.md"));
        assert_eq!(next_version_path(dir).unwrap(), dir.join("resume_v5.md"));
    }

    #[test]
    fn test_empty_folder() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path();
        touch(dir, "job.txt");

        assert_eq!(next_version_path(dir).unwrap(), dir.join("resume_v1.md"));
        assert!(matches!(
            latest_version_path(dir),
            Err(VersionError::NoVersions(_))
        ));
    }

    #[test]
    fn test_missing_folder_is_io_error() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("missing");

        assert!(matches!(list_versions(&missing), Err(VersionError::Io(_))));
        assert!(matches!(
            latest_version_path(&missing),
            Err(VersionError::Io(_))
        ));
        assert!(matches!(
            next_version_path(&missing),
            Err(VersionError::Io(_))
        ));
    }

    #[test]
    fn test_write_revision_appends() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path();
        touch(dir, "resume_v3.md");

        let first = write_revision(dir, "# Draft A\n").unwrap();
        let second = write_revision(dir, "# Draft B\n").unwrap();

        assert_eq!(first, dir.join("resume_v4.md"));
        assert_eq!(second, dir.join("resume_v5.md"));
        assert_eq!(fs::read_to_string(&first).unwrap(), "# Draft A\n");
        assert_eq!(fs::read_to_string(&second).unwrap(), "# Draft B\n");

        // No temporary files left behind
        let leftovers: Vec<_> = fs::read_dir(dir)
            .unwrap()
            .filter_map(Result::ok)
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn test_write_revision_missing_folder() {
        let temp = TempDir::new().unwrap();
        let result = write_revision(&temp.path().join("missing"), "text");
        assert!(matches!(result, Err(VersionError::Io(_))));
    }
}
