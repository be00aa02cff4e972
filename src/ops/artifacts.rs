//! Scoped ownership of temporary files and directories.

use std::path::{Path, PathBuf};

use crate::util::fs;

/// Paths owned for the duration of one run.
///
/// Every registered path is removed when the set is dropped, whichever way
/// the run ends. Removal is best-effort: failures are logged and ignored,
/// and paths that were never created are skipped.
#[derive(Debug, Default)]
pub struct TempArtifacts {
    paths: Vec<PathBuf>,
}

impl TempArtifacts {
    pub fn new() -> Self {
        TempArtifacts::default()
    }

    /// Take ownership of `path`. Register before creating it, so a
    /// half-created artifact is still removed.
    pub fn track(&mut self, path: impl Into<PathBuf>) -> PathBuf {
        let path = path.into();
        self.paths.push(path.clone());
        path
    }

    /// Remove everything now.
    pub fn cleanup(mut self) {
        self.remove_all();
    }

    /// Give up ownership without removing anything.
    pub fn keep(mut self) -> Vec<PathBuf> {
        std::mem::take(&mut self.paths)
    }

    fn remove_all(&mut self) {
        for path in self.paths.drain(..).rev() {
            remove_quietly(&path);
        }
    }
}

impl Drop for TempArtifacts {
    fn drop(&mut self) {
        self.remove_all();
    }
}

fn remove_quietly(path: &Path) {
    match fs::remove_path_if_exists(path) {
        Ok(()) => tracing::debug!("removed {}", path.display()),
        Err(e) => tracing::debug!("could not remove {}: {}", path.display(), e),
    }
}
