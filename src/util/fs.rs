//! Filesystem utilities.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::core::errors::BridgeError;

type Result<T> = std::result::Result<T, BridgeError>;

/// Recursively copy a file or directory tree.
pub fn copy_all(src: &Path, dst: &Path) -> Result<()> {
    if src.is_file() {
        fs::copy(src, dst).map_err(|e| BridgeError::io(src, e))?;
        return Ok(());
    }

    for entry in WalkDir::new(src) {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(src).to_path_buf();
            BridgeError::io(path, e.into())
        })?;
        let rel = entry
            .path()
            .strip_prefix(src)
            .unwrap_or_else(|_| entry.path());
        let target = dst.join(rel);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target).map_err(|e| BridgeError::io(&target, e))?;
        } else {
            fs::copy(entry.path(), &target).map_err(|e| BridgeError::io(entry.path(), e))?;
        }
    }
    Ok(())
}

/// Remove a file or directory tree. A missing path is not an error.
pub fn remove_path_if_exists(path: &Path) -> Result<()> {
    let meta = match fs::symlink_metadata(path) {
        Ok(meta) => meta,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(BridgeError::io(path, e)),
    };

    let removed = if meta.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    };
    removed.map_err(|e| BridgeError::io(path, e))
}

/// Ensure a directory exists, creating it if necessary.
pub fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path).map_err(|e| BridgeError::io(path, e))?;
    }
    Ok(())
}

/// Read a file to string.
pub fn read_to_string(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| BridgeError::io(path, e))
}

/// Write a string to a file, creating parent directories if needed.
pub fn write_string(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        ensure_dir(parent)?;
    }
    fs::write(path, contents).map_err(|e| BridgeError::io(path, e))
}

/// Write a string to a file by renaming a fully written sibling into place.
pub fn write_string_atomic(path: &Path, contents: &str) -> Result<()> {
    let dir = match path.parent().filter(|p| !p.as_os_str().is_empty()) {
        Some(parent) => {
            ensure_dir(parent)?;
            parent.to_path_buf()
        }
        None => PathBuf::from("."),
    };

    let mut tmp = tempfile::NamedTempFile::new_in(&dir).map_err(|e| BridgeError::io(&dir, e))?;
    tmp.write_all(contents.as_bytes())
        .map_err(|e| BridgeError::io(tmp.path(), e))?;
    tmp.persist(path).map_err(|e| BridgeError::io(path, e.error))?;
    Ok(())
}

/// Canonicalize a path, but don't fail if it doesn't exist yet.
/// Returns the path as-is if canonicalization fails.
pub fn normalize_path(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}

/// Get the relative path from `base` to `path`.
pub fn relative_path(base: &Path, path: &Path) -> PathBuf {
    pathdiff::diff_paths(path, base).unwrap_or_else(|| path.to_path_buf())
}

/// Make a path absolute against the current directory without touching the filesystem.
pub fn absolute(path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    }
}
