//! Configuration for coursetrack.
//!
//! Configuration sources (highest priority first):
//! 1. Command line (`--home`)
//! 2. Environment variables (COURSETRACK_HOME, COURSETRACK_COURSES, COURSETRACK_ICONS)
//! 3. Config file (.coursetrack/config.yaml)
//! 4. Defaults (~/.coursetrack, icons in <home>/icons)
//!
//! Config file discovery:
//! - Searches current directory and parents for .coursetrack/config.yaml
//! - `paths.home` is relative to the .coursetrack/ directory, other paths
//!   to the project root (the directory containing .coursetrack/)

pub mod paths;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::library::{ScanOptions, DEFAULT_ICON};

/// Default rasterization size of course icons (pixels)
pub const DEFAULT_ICON_SIZE: u32 = 50;

/// Raw config file schema (matches YAML structure)
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigFile {
    pub version: String,
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub catalog: Option<CatalogConfig>,
    #[serde(default)]
    pub icons: Option<IconsConfig>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PathsConfig {
    /// State directory (relative to .coursetrack/)
    pub home: Option<String>,
    /// Folder whose subdirectories are courses (relative to project root)
    pub courses: Option<String>,
    /// Icon directory (relative to project root)
    pub icons: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogConfig {
    pub default_icon: Option<String>,
    /// Glob patterns excluded from scans
    #[serde(default)]
    pub ignore: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IconsConfig {
    pub size: Option<u32>,
}

/// Resolved configuration with absolute paths
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// State directory holding the snapshots
    pub home: PathBuf,
    /// Folder imported by `import` when no folder is given
    pub courses: Option<PathBuf>,
    /// Icon directory
    pub icons: PathBuf,
    /// Icon of newly scanned courses
    pub default_icon: String,
    /// Glob patterns excluded from scans
    pub ignore: Vec<String>,
    /// Icon rasterization size
    pub icon_size: u32,
    /// Path to config file (if found)
    pub config_file: Option<PathBuf>,
}

impl ResolvedConfig {
    /// Catalog snapshot path
    pub fn catalog_path(&self) -> PathBuf {
        paths::catalog_file(&self.home)
    }

    /// Progress snapshot path
    pub fn progress_path(&self) -> PathBuf {
        paths::progress_file(&self.home)
    }

    /// Scan settings for the catalog
    pub fn scan_options(&self) -> Result<ScanOptions> {
        ScanOptions::new(self.default_icon.clone(), &self.ignore)
            .context("Invalid ignore pattern in config")
    }
}

/// Find config file by searching current directory and parents
fn find_config_file() -> Option<PathBuf> {
    let mut current = std::env::current_dir().ok()?;

    loop {
        let config_path = current.join(paths::CONFIG_DIR).join(paths::CONFIG_FILE);
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            break;
        }
    }

    None
}

/// Load and parse config file
fn load_config_file(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Resolve a path that may be relative to the config file's parent
fn resolve_path(base: &Path, path_str: &str) -> PathBuf {
    let path = PathBuf::from(path_str);
    if path.is_absolute() {
        path
    } else {
        base.join(path)
            .canonicalize()
            .unwrap_or_else(|_| base.join(path_str))
    }
}

fn env_path(name: &str) -> Option<PathBuf> {
    std::env::var_os(name).filter(|v| !v.is_empty()).map(PathBuf::from)
}

/// Combine a parsed config file (if any) with overrides and defaults
fn resolve(
    file: Option<(&Path, ConfigFile)>,
    home_override: Option<PathBuf>,
    default_home: PathBuf,
) -> ResolvedConfig {
    let env_home = env_path("COURSETRACK_HOME");
    let env_courses = env_path("COURSETRACK_COURSES");
    let env_icons = env_path("COURSETRACK_ICONS");

    let Some((config_path, config)) = file else {
        let home = home_override.or(env_home).unwrap_or(default_home);
        return ResolvedConfig {
            icons: env_icons.unwrap_or_else(|| home.join(paths::ICONS_DIR)),
            courses: env_courses,
            home,
            default_icon: DEFAULT_ICON.to_string(),
            ignore: Vec::new(),
            icon_size: DEFAULT_ICON_SIZE,
            config_file: None,
        };
    };

    let config_dir = config_path.parent().unwrap_or(Path::new("."));
    let base_dir = config_dir.parent().unwrap_or(Path::new("."));

    let home = home_override.or(env_home).unwrap_or_else(|| {
        config
            .paths
            .home
            .as_deref()
            .map(|h| resolve_path(config_dir, h))
            .unwrap_or(default_home)
    });

    let courses = env_courses.or_else(|| {
        config
            .paths
            .courses
            .as_deref()
            .map(|c| resolve_path(base_dir, c))
    });

    let icons = env_icons
        .or_else(|| config.paths.icons.as_deref().map(|i| resolve_path(base_dir, i)))
        .unwrap_or_else(|| home.join(paths::ICONS_DIR));

    let (default_icon, ignore) = match config.catalog {
        Some(catalog) => (
            catalog.default_icon.unwrap_or_else(|| DEFAULT_ICON.to_string()),
            catalog.ignore,
        ),
        None => (DEFAULT_ICON.to_string(), Vec::new()),
    };

    let icon_size = config
        .icons
        .and_then(|i| i.size)
        .unwrap_or(DEFAULT_ICON_SIZE);

    ResolvedConfig {
        home,
        courses,
        icons,
        default_icon,
        ignore,
        icon_size,
        config_file: Some(config_path.to_path_buf()),
    }
}

/// Load configuration from all sources
pub fn load_config(home_override: Option<PathBuf>) -> Result<ResolvedConfig> {
    let default_home = paths::default_home()?;

    match find_config_file() {
        Some(config_path) => {
            let config = load_config_file(&config_path)?;
            Ok(resolve(Some((&config_path, config)), home_override, default_home))
        }
        None => Ok(resolve(None, home_override, default_home)),
    }
}
