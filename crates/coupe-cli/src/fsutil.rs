//! Small filesystem helpers shared by the scaffolding and build-prep steps.

use std::path::Path;

use coupe_common::error::{CoupeError, Result};

fn io_error(path: &Path, source: std::io::Error) -> CoupeError {
    CoupeError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Removes `dir` if present and recreates it empty.
pub fn clean_dir(dir: &Path) -> Result<()> {
    if dir.exists() {
        std::fs::remove_dir_all(dir).map_err(|e| io_error(dir, e))?;
    }
    std::fs::create_dir_all(dir).map_err(|e| io_error(dir, e))
}

/// Creates `dir` and any missing parents.
pub fn ensure_dir(dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir).map_err(|e| io_error(dir, e))
}

/// Recursively copies the contents of `src` into `dst`.
pub fn copy_dir(src: &Path, dst: &Path) -> Result<()> {
    ensure_dir(dst)?;
    for entry in std::fs::read_dir(src).map_err(|e| io_error(src, e))? {
        let entry = entry.map_err(|e| io_error(src, e))?;
        let target = dst.join(entry.file_name());
        let file_type = entry.file_type().map_err(|e| io_error(&entry.path(), e))?;
        if file_type.is_dir() {
            copy_dir(&entry.path(), &target)?;
        } else {
            let _ = std::fs::copy(entry.path(), &target)
                .map_err(|e| io_error(&entry.path(), e))?;
        }
    }
    Ok(())
}

/// Lists the names of the immediate subdirectories of `dir`.
pub fn subdirectories(dir: &Path) -> Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(|e| io_error(dir, e))? {
        let entry = entry.map_err(|e| io_error(dir, e))?;
        if entry.file_type().map_err(|e| io_error(&entry.path(), e))?.is_dir() {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    names.sort();
    Ok(names)
}

/// Writes `content` to `path`, creating parent directories as needed.
pub fn write_file(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    std::fs::write(path, content).map_err(|e| io_error(path, e))
}
