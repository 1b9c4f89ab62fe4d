//! Path utilities for output and debug artifacts

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::CaptionResult;

/// `<input>.mov` next to the input
pub fn default_output_path(input: &Path) -> PathBuf {
    input.with_extension("mov")
}

/// ASS copy kept next to the output
pub fn kept_ass_path(output: &Path) -> PathBuf {
    output.with_extension("ass")
}

/// `<output_dir>/<output_stem>_debug`
pub fn debug_dir_for(output: &Path) -> PathBuf {
    let stem = output
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "overlay".to_string());
    output
        .parent()
        .unwrap_or_else(|| Path::new(""))
        .join(format!("{}_debug", stem))
}

/// Create the parent directory of `path` if needed
pub fn ensure_parent_dir(path: &Path) -> CaptionResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

/// Copy a directory tree, replacing `dst` if it exists
pub fn replace_dir_with_copy(src: &Path, dst: &Path) -> CaptionResult<()> {
    if dst.exists() {
        std::fs::remove_dir_all(dst)?;
    }
    for entry in WalkDir::new(src).into_iter().filter_map(|e| e.ok()) {
        let relative = match entry.path().strip_prefix(src) {
            Ok(rel) => rel,
            Err(_) => continue,
        };
        let target = dst.join(relative);
        if entry.file_type().is_dir() {
            std::fs::create_dir_all(&target)?;
        } else if entry.file_type().is_file() {
            ensure_parent_dir(&target)?;
            std::fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}

/// Format file size for display
pub fn format_file_size(size: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    let mut size = size as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    if unit_index == 0 {
        format!("{} {}", size as u64, UNITS[unit_index])
    } else {
        format!("{:.2} {}", size, UNITS[unit_index])
    }
}
