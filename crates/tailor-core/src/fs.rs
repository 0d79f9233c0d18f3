//! Filesystem primitives shared by the config, application and revision code.

use std::fs::{self, DirBuilder, File};
use std::io;
use std::path::Path;

/// Default permission bits for directories created by Tailor.
pub const DEFAULT_DIR_MODE: u32 = 0o755;

/// Creates `path` and any missing parents.
///
/// Succeeds silently when the directory already exists. `mode` is applied on
/// unix and ignored elsewhere.
pub fn create_dir_all(path: &Path, mode: u32) -> io::Result<()> {
    let mut builder = DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(mode);
    }
    #[cfg(not(unix))]
    let _ = mode;
    builder.create(path)
}

/// Streams `src` into `dst` and flushes the destination to disk.
///
/// Fails if `src` does not exist or if the parent directory of `dst` is
/// missing. An existing `dst` is truncated.
pub fn copy_file(src: &Path, dst: &Path) -> io::Result<u64> {
    let mut reader = File::open(src)?;
    let mut writer = File::create(dst)?;
    let copied = io::copy(&mut reader, &mut writer)?;
    writer.sync_all()?;
    tracing::debug!(src = %src.display(), dst = %dst.display(), bytes = copied, "Copied file");
    Ok(copied)
}

/// Returns true if `path` is an existing file or directory.
pub fn exists(path: &Path) -> bool {
    fs::metadata(path).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_create_dir_all_nested_and_idempotent() {
        let temp = TempDir::new().unwrap();
        let nested = temp.path().join("a/b/c");

        create_dir_all(&nested, DEFAULT_DIR_MODE).unwrap();
        assert!(nested.is_dir());

        // Second call is a no-op
        create_dir_all(&nested, DEFAULT_DIR_MODE).unwrap();
        assert!(nested.is_dir());
    }

    #[test]
    fn test_copy_file_copies_bytes() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("job.txt");
        let dst = temp.path().join("copy.txt");
        fs::write(&src, "Senior Rust Engineer\n\nünïcödé").unwrap();

        let copied = copy_file(&src, &dst).unwrap();

        assert_eq!(copied, fs::metadata(&src).unwrap().len());
        assert_eq!(
            fs::read_to_string(&dst).unwrap(),
            "Senior Rust Engineer\n\nünïcödé"
        );
    }

    #[test]
    fn test_copy_file_missing_source() {
        let temp = TempDir::new().unwrap();
        let err = copy_file(&temp.path().join("nope.txt"), &temp.path().join("dst.txt"))
            .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
        assert!(!temp.path().join("dst.txt").exists());
    }

    #[test]
    fn test_copy_file_missing_destination_parent() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("job.txt");
        fs::write(&src, "text").unwrap();

        let result = copy_file(&src, &temp.path().join("missing/dst.txt"));
        assert!(result.is_err());
    }

    #[test]
    fn test_exists() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("f.txt");
        fs::write(&file, "").unwrap();

        assert!(exists(temp.path()));
        assert!(exists(&file));
        assert!(!exists(&temp.path().join("missing")));
    }
}
