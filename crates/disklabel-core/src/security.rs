//! Security validation constants and helpers
//!
//! On-disk values are untrusted; every address computed from them goes
//! through the checked helpers here.

use crate::Error;
use std::path::{Path, PathBuf};

/// Maximum file size for memory mapping (16 GB - practical limit for most systems)
pub const MAX_MMAP_SIZE: u64 = 16 * 1024 * 1024 * 1024;

/// Safely multiply two u64 values with overflow checking
pub fn checked_multiply_u64(a: u64, b: u64, context: &str) -> crate::Result<u64> {
    a.checked_mul(b)
        .ok_or_else(|| Error::overflow(format!("{}: multiplication overflow", context)))
}

/// Safely add two u64 values with overflow checking
pub fn checked_add_u64(a: u64, b: u64, context: &str) -> crate::Result<u64> {
    a.checked_add(b)
        .ok_or_else(|| Error::overflow(format!("{}: addition overflow", context)))
}

/// Sanitize and validate an image path before opening it
///
/// # Returns
/// Canonical absolute path if valid, error otherwise
pub fn validate_file_path(path: &str) -> crate::Result<PathBuf> {
    if path.is_empty() {
        return Err(Error::not_found("Empty path"));
    }

    if path.contains('\0') {
        return Err(Error::invalid_path("Path contains null byte"));
    }

    if path.chars().any(|c| c.is_control() && c != '\t') {
        return Err(Error::invalid_path(
            "Path contains invalid control characters",
        ));
    }

    let canonical = Path::new(path).canonicalize().map_err(|e| {
        Error::not_found(format!("Path does not exist or is inaccessible: {}", e))
    })?;

    // Block devices are fine to read; directories are not
    if canonical.is_dir() {
        return Err(Error::invalid_path(format!(
            "Path is a directory: {}",
            canonical.display()
        )));
    }

    Ok(canonical)
}
