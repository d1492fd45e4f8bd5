//! Hardened file reading
//!
//! Rule files and manifests come from the repository being linted, so every
//! read goes through `symlink_metadata()`: symlinks are refused outright,
//! anything that is not a regular file (directories, FIFOs, devices) is
//! refused, and oversized files are refused before any bytes are read.
//!
//! There is a TOCTOU window between the metadata check and the read. Closing
//! it needs platform-specific open flags and is out of scope for a linter.

use crate::diagnostics::{LintError, LintResult};
use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;

/// Default maximum file size (1 MiB)
pub const DEFAULT_MAX_FILE_SIZE: u64 = 1_048_576;

/// Read a file with the default size limit.
///
/// # Errors
///
/// - `LintError::FileSymlink` if the path is a symlink
/// - `LintError::FileNotRegular` if the path is not a regular file
/// - `LintError::FileTooBig` if the file exceeds [`DEFAULT_MAX_FILE_SIZE`]
/// - `LintError::FileRead` for other I/O errors
pub fn safe_read_file(path: &Path) -> LintResult<String> {
    safe_read_file_with_limit(path, DEFAULT_MAX_FILE_SIZE)
}

/// Read a file, rejecting anything larger than `max_size` bytes.
///
/// Files at exactly `max_size` bytes are accepted.
pub fn safe_read_file_with_limit(path: &Path, max_size: u64) -> LintResult<String> {
    let metadata = fs::symlink_metadata(path).map_err(|e| LintError::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    if metadata.file_type().is_symlink() {
        return Err(LintError::FileSymlink {
            path: path.to_path_buf(),
        });
    }

    if !metadata.is_file() {
        return Err(LintError::FileNotRegular {
            path: path.to_path_buf(),
        });
    }

    let size = metadata.len();
    if size > max_size {
        return Err(LintError::FileTooBig {
            path: path.to_path_buf(),
            size,
            limit: max_size,
        });
    }

    fs::read_to_string(path).map_err(|e| LintError::FileRead {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Read and deserialize a JSON document with the default size limit.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> LintResult<T> {
    let content = safe_read_file(path)?;
    serde_json::from_str(&content).map_err(|source| LintError::JsonParse {
        path: path.to_path_buf(),
        source,
    })
}
