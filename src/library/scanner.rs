//! Folder scanner: turns a course directory into a [`Course`] tree.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Component, Path};

use chrono::Utc;
use glob::Pattern;
use walkdir::WalkDir;

use super::catalog::CatalogError;
use super::natural_order;
use crate::domain::{Course, Item, ItemKind, Section, PRINCIPAL_SECTION};

/// Icon assigned to newly scanned courses unless configured otherwise
pub const DEFAULT_ICON: &str = "SiNextdotjs";

/// Settings applied to every scan
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Logical icon name for new courses
    pub default_icon: String,

    /// Glob patterns matched against paths relative to the course root
    pub ignore: Vec<Pattern>,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            default_icon: DEFAULT_ICON.to_string(),
            ignore: Vec::new(),
        }
    }
}

impl ScanOptions {
    /// Build options from raw glob strings
    pub fn new(
        default_icon: impl Into<String>,
        ignore: &[String],
    ) -> Result<Self, glob::PatternError> {
        let ignore = ignore
            .iter()
            .map(|p| Pattern::new(p))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            default_icon: default_icon.into(),
            ignore,
        })
    }

    fn is_ignored(&self, relative: &Path) -> bool {
        self.ignore.iter().any(|p| p.matches_path(relative))
    }
}

/// Course id for a folder: its final path component
pub fn course_id_for(root: &Path) -> Option<String> {
    root.file_name().map(|n| n.to_string_lossy().into_owned())
}

/// Section name of a file, from its path relative to the course root
fn section_name(relative: &Path) -> String {
    let parts: Vec<String> = relative
        .parent()
        .map(|dir| {
            dir.components()
                .filter_map(|c| match c {
                    Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
                    _ => None,
                })
                .collect()
        })
        .unwrap_or_default();

    if parts.is_empty() {
        return PRINCIPAL_SECTION.to_string();
    }

    let name = parts.join("/");
    if name == PRINCIPAL_SECTION {
        // A real subdirectory called "Principal" must not merge with the root
        format!("./{}", name)
    } else {
        name
    }
}

/// Walk `root` recursively and build a course from its video and document files.
///
/// Sections and the items inside them are sorted in natural order, so scanning
/// an unchanged folder always yields the same tree.
pub fn scan_root(root: &Path, options: &ScanOptions) -> Result<Course, CatalogError> {
    match fs::metadata(root) {
        Ok(meta) if meta.is_dir() => {}
        _ => return Err(CatalogError::RootNotFound(root.to_path_buf())),
    }

    let root_path = fs::canonicalize(root)?;
    let id = course_id_for(&root_path)
        .ok_or_else(|| CatalogError::RootNotFound(root.to_path_buf()))?;

    let mut grouped: BTreeMap<String, Vec<Item>> = BTreeMap::new();

    for entry in WalkDir::new(&root_path).min_depth(1) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!("Skipping unreadable entry under {}: {}", root_path.display(), e);
                continue;
            }
        };

        let path = entry.path();
        if !path.is_file() {
            continue;
        }

        let relative = path.strip_prefix(&root_path).unwrap_or(path);
        if options.is_ignored(relative) {
            tracing::debug!("Ignoring {}", relative.display());
            continue;
        }

        let kind = ItemKind::from_path(path);
        if kind == ItemKind::Unsupported {
            continue;
        }

        let section = section_name(relative);
        grouped.entry(section.clone()).or_default().push(Item {
            name: entry.file_name().to_string_lossy().into_owned(),
            kind,
            section_name: section,
            watched: false,
        });
    }

    let mut sections: Vec<Section> = grouped
        .into_iter()
        .map(|(name, mut items)| {
            natural_order::sort_by_name(&mut items, |i| i.name.as_str());
            Section { name, items }
        })
        .collect();
    natural_order::sort_by_name(&mut sections, |s| s.name.as_str());

    let total_items = sections.iter().map(|s| s.items.len()).sum();

    tracing::debug!(course = %id, sections = sections.len(), total_items, "Scanned course");

    Ok(Course {
        name: id.clone(),
        id,
        root_path,
        icon: options.default_icon.clone(),
        sections,
        total_items,
        watched_count: 0,
        added_at: Utc::now(),
    })
}
