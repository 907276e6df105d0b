//! File and directory names used by coursetrack.
//!
//! Single source of truth - import this instead of hardcoding names.
//!
//! ## Layout
//!
//! | Location | Purpose |
//! |----------|---------|
//! | `<home>/catalog.json` | Course catalog snapshot |
//! | `<home>/progress.json` | Playback progress snapshot |
//! | `<home>/icons/` | Default icon directory |
//! | `.coursetrack/config.yaml` | Project config, searched upwards from the cwd |

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Catalog snapshot file name
pub const CATALOG_FILE: &str = "catalog.json";

/// Progress snapshot file name
pub const PROGRESS_FILE: &str = "progress.json";

/// Default icon directory name inside the home directory
pub const ICONS_DIR: &str = "icons";

/// Directory that holds a project config file
pub const CONFIG_DIR: &str = ".coursetrack";

/// Config file name inside [`CONFIG_DIR`]
pub const CONFIG_FILE: &str = "config.yaml";

/// Default home directory (~/.coursetrack)
pub fn default_home() -> Result<PathBuf> {
    Ok(dirs::home_dir()
        .context("Failed to determine home directory")?
        .join(CONFIG_DIR))
}

/// Catalog snapshot inside a home directory
pub fn catalog_file(home: &Path) -> PathBuf {
    home.join(CATALOG_FILE)
}

/// Progress snapshot inside a home directory
pub fn progress_file(home: &Path) -> PathBuf {
    home.join(PROGRESS_FILE)
}
