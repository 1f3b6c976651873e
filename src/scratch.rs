//! Per-run scratch directory with scoped teardown.
//!
//! All intermediate artifacts for one pipeline run live under a single
//! directory created here. Dropping the handle removes the tree, so a
//! cancelled or failed run leaves nothing behind.

use std::fs;
use std::path::{Path, PathBuf};
use std::process;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::errors::{MediaError, MediaResult};

static RUN_COUNTER: AtomicU64 = AtomicU64::new(0);

/// A scratch directory owned by one pipeline run.
///
/// The directory name encodes a timestamp and the process id so
/// concurrent processes sharing a temp root never collide.
#[derive(Debug)]
pub struct ScratchDir {
    path: PathBuf,
    keep: bool,
}

impl ScratchDir {
    /// Create a fresh scratch directory under `temp_root`.
    pub fn create(temp_root: impl AsRef<Path>) -> MediaResult<Self> {
        let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
        let seq = RUN_COUNTER.fetch_add(1, Ordering::Relaxed);
        let name = format!("run_{}_{}_{}", stamp, process::id(), seq);
        let path = temp_root.as_ref().join(name);

        fs::create_dir_all(&path)
            .map_err(|e| MediaError::io(format!("create scratch dir {}", path.display()), e))?;

        tracing::debug!("Created scratch dir: {}", path.display());

        Ok(Self { path, keep: false })
    }

    /// Path of the scratch directory.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Build a path for a file inside the scratch directory.
    pub fn file(&self, name: impl AsRef<Path>) -> PathBuf {
        self.path.join(name)
    }

    /// Disable teardown on drop, e.g. for post-mortem inspection.
    pub fn keep(&mut self) {
        self.keep = true;
    }
}

impl Drop for ScratchDir {
    fn drop(&mut self) {
        if self.keep {
            return;
        }
        if let Err(e) = fs::remove_dir_all(&self.path) {
            // Teardown is best-effort; the next run uses a new directory.
            tracing::warn!("Failed to remove scratch dir {}: {}", self.path.display(), e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn create_and_teardown() {
        let root = tempdir().unwrap();
        let path;
        {
            let scratch = ScratchDir::create(root.path()).unwrap();
            path = scratch.path().to_path_buf();
            assert!(path.exists());
            fs::write(scratch.file("video_stream.mp4"), b"x").unwrap();
        }
        assert!(!path.exists());
    }

    #[test]
    fn keep_disables_teardown() {
        let root = tempdir().unwrap();
        let path;
        {
            let mut scratch = ScratchDir::create(root.path()).unwrap();
            scratch.keep();
            path = scratch.path().to_path_buf();
        }
        assert!(path.exists());
    }

    #[test]
    fn concurrent_runs_get_distinct_dirs() {
        let root = tempdir().unwrap();
        let a = ScratchDir::create(root.path()).unwrap();
        let b = ScratchDir::create(root.path()).unwrap();
        assert_ne!(a.path(), b.path());
    }
}
