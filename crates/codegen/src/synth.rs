//! # File Synthesis & Idempotency Guard
//!
//! Writes one rendered artifact at a time. An existing file is never replaced
//! unless overwriting was allowed; the check is made per file, so earlier
//! writes of the same run are not affected by a later collision.

use lvgen_core::{GenError, GenResult, ResultExt};
use std::path::{Path, PathBuf};

/// Outcome of one successful write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenFile {
    pub path: PathBuf,
    /// Bytes the file held before this write, `None` if it was created
    pub previous: Option<Vec<u8>>,
}

impl WrittenFile {
    pub fn was_created(&self) -> bool {
        self.previous.is_none()
    }
}

/// Writes artifacts to disk under the overwrite policy of one run.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileSynthesizer {
    overwrite_allowed: bool,
}

impl FileSynthesizer {
    pub fn new(overwrite_allowed: bool) -> Self {
        Self { overwrite_allowed }
    }

    pub fn overwrite_allowed(&self) -> bool {
        self.overwrite_allowed
    }

    /// Write `content` to `path`, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// - `GenError::Exists` if the file exists and overwriting is off; the
    ///   file is left untouched.
    /// - `GenError::DirectoryCreate` / `FileRead` / `FileWrite` on IO failure.
    pub fn write(&self, path: &Path, content: &str) -> GenResult<WrittenFile> {
        let previous = if path.exists() {
            if !self.overwrite_allowed {
                return Err(GenError::Exists(path.to_path_buf()));
            }
            Some(std::fs::read(path).read_context(path)?)
        } else {
            None
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).create_context(parent)?;
        }

        std::fs::write(path, content).write_context(path)?;

        tracing::debug!(
            path = %path.display(),
            bytes = content.len(),
            replaced = previous.is_some(),
            "artifact written",
        );
        Ok(WrittenFile {
            path: path.to_path_buf(),
            previous,
        })
    }

    /// Undo a write: restore the previous content or remove the created file.
    pub fn restore(written: &WrittenFile) -> GenResult<()> {
        match &written.previous {
            Some(content) => std::fs::write(&written.path, content).write_context(&written.path),
            None => match std::fs::remove_file(&written.path) {
                Ok(()) => Ok(()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
                Err(e) => Err(e).write_context(&written.path),
            },
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_creates_missing_directories() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("src/views/blog/post/index.vue");

        let written = FileSynthesizer::new(false).write(&path, "<template />").unwrap();
        assert!(written.was_created());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "<template />");
    }

    #[test]
    fn test_existing_file_is_kept_without_overwrite() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("post.go");
        std::fs::write(&path, "hand edited").unwrap();

        let err = FileSynthesizer::new(false).write(&path, "fresh").unwrap_err();
        assert!(err.is_exists());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "hand edited");
    }

    #[test]
    fn test_overwrite_replaces_and_remembers_previous() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("post.go");
        std::fs::write(&path, "old").unwrap();

        let written = FileSynthesizer::new(true).write(&path, "fresh").unwrap();
        assert_eq!(written.previous.as_deref(), Some(b"old".as_slice()));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "fresh");

        FileSynthesizer::restore(&written).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "old");
    }

    #[test]
    fn test_overwrites_non_utf8_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("src/views/blog/article/index.vue");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, [0xff, 0xfe, 0x00, 0x41]).unwrap();

        let written = FileSynthesizer::new(true).write(&path, "fresh").unwrap();
        assert!(!written.was_created());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "fresh");

        FileSynthesizer::restore(&written).unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), [0xff, 0xfe, 0x00, 0x41]);
    }

    #[test]
    fn test_restore_removes_created_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a/b.ts");
        let written = FileSynthesizer::new(false).write(&path, "x").unwrap();

        FileSynthesizer::restore(&written).unwrap();
        assert!(!path.exists());
        // Already gone is fine.
        FileSynthesizer::restore(&written).unwrap();
    }

    #[test]
    fn test_directory_creation_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let synth = FileSynthesizer::new(false);
        synth.write(&dir.path().join("api/blog/a.ts"), "a").unwrap();
        synth.write(&dir.path().join("api/blog/b.ts"), "b").unwrap();
        assert!(dir.path().join("api/blog/b.ts").exists());
    }
}
