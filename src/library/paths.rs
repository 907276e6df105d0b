//! Canonical item paths.
//!
//! A canonical path is the one key under which an item is known to every
//! component: forward slashes only, no `.` or `..` segments, no repeated
//! separators, always absolute. Canonicalization is lexical and never touches
//! the filesystem, so paths of files that no longer exist still map to their
//! old key.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Normalized absolute path used as a cross-component identity key
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CanonicalPath(String);

impl CanonicalPath {
    /// Canonicalize a raw path string.
    ///
    /// Relative paths are resolved against the current working directory.
    pub fn new(raw: &str) -> Self {
        let unified = raw.replace('\\', "/");

        if is_absolute(&unified) {
            Self(normalize(&unified))
        } else {
            let base = std::env::current_dir()
                .map(|p| p.to_string_lossy().replace('\\', "/"))
                .unwrap_or_default();
            Self(normalize(&format!("{}/{}", base, unified)))
        }
    }

    /// Canonicalize a filesystem path
    pub fn from_path(path: &Path) -> Self {
        Self::new(&path.to_string_lossy())
    }

    /// Get the raw string value
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Convert back into a filesystem path
    pub fn to_path_buf(&self) -> PathBuf {
        PathBuf::from(&self.0)
    }
}

impl fmt::Display for CanonicalPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// `/...` or a drive prefix such as `C:/...`
fn is_absolute(path: &str) -> bool {
    path.starts_with('/') || path.get(..2).is_some_and(is_drive)
}

fn is_drive(segment: &str) -> bool {
    let bytes = segment.as_bytes();
    bytes.len() == 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}

fn normalize(path: &str) -> String {
    let (prefix, rest) = match path.split_once('/') {
        // "C:/x" keeps its drive, "/x" has an empty first segment
        Some((first, rest)) if first.is_empty() || is_drive(first) => (first, rest),
        None if is_drive(path) => (path, ""),
        _ => ("", path),
    };

    let mut segments: Vec<&str> = Vec::new();
    for segment in rest.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                // ".." at the root stays at the root
                segments.pop();
            }
            s => segments.push(s),
        }
    }

    format!("{}/{}", prefix, segments.join("/"))
}
