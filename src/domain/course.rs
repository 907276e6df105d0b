//! Course, section and item types.
//!
//! A course is a scanned folder. Its sections are the directories that hold
//! content, and its items are the video and document files inside them.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::library::paths::CanonicalPath;

/// Section name used for files that sit directly in the course root
pub const PRINCIPAL_SECTION: &str = "Principal";

/// Kind of content file, decided by extension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    /// mp4, avi, mov
    Video,

    /// html
    Document,

    /// Anything else (never stored in a course tree)
    Unsupported,
}

impl ItemKind {
    /// Classify a file by its extension (case-insensitive)
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());

        match ext.as_deref() {
            Some("mp4" | "avi" | "mov") => ItemKind::Video,
            Some("html") => ItemKind::Document,
            _ => ItemKind::Unsupported,
        }
    }

    /// Whether playback progress applies to this kind
    pub fn tracks_playback(self) -> bool {
        match self {
            ItemKind::Video => true,
            ItemKind::Document | ItemKind::Unsupported => false,
        }
    }
}

impl std::fmt::Display for ItemKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ItemKind::Video => write!(f, "video"),
            ItemKind::Document => write!(f, "document"),
            ItemKind::Unsupported => write!(f, "unsupported"),
        }
    }
}

/// Identity of an item inside its course
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ItemKey {
    pub section: String,
    pub name: String,
}

impl ItemKey {
    pub fn new(section: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            section: section.into(),
            name: name.into(),
        }
    }
}

impl std::fmt::Display for ItemKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.section, self.name)
    }
}

/// A single content file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// File name
    pub name: String,

    pub kind: ItemKind,

    /// Name of the owning section
    pub section_name: String,

    pub watched: bool,
}

impl Item {
    pub fn key(&self) -> ItemKey {
        ItemKey::new(&self.section_name, &self.name)
    }
}

/// Named group of items (one directory of the course)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    /// Path relative to the course root, or `Principal`
    pub name: String,

    pub items: Vec<Item>,
}

/// A scanned course folder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    /// Stable identifier (the folder name)
    pub id: String,

    /// Display name
    pub name: String,

    /// Absolute path of the scanned folder
    pub root_path: PathBuf,

    /// Logical icon name
    pub icon: String,

    pub sections: Vec<Section>,

    /// Number of items found by the last full scan
    pub total_items: usize,

    /// Number of items with `watched == true`
    pub watched_count: usize,

    /// When the course was first scanned
    pub added_at: DateTime<Utc>,
}

impl Course {
    /// Canonical path of a file of this course
    pub fn item_path(&self, section: &str, name: &str) -> CanonicalPath {
        let dir = if section == PRINCIPAL_SECTION {
            self.root_path.clone()
        } else {
            self.root_path.join(section)
        };
        CanonicalPath::from_path(&dir.join(name))
    }

    /// Find an item by its identity
    pub fn item(&self, key: &ItemKey) -> Option<&Item> {
        self.sections
            .iter()
            .find(|s| s.name == key.section)
            .and_then(|s| s.items.iter().find(|i| i.name == key.name))
    }

    /// Find an item by canonical path
    pub fn find_by_path(&self, path: &CanonicalPath) -> Option<&Item> {
        self.items()
            .find(|item| &self.item_path(&item.section_name, &item.name) == path)
    }

    /// All items in section order
    pub fn items(&self) -> impl Iterator<Item = &Item> {
        self.sections.iter().flat_map(|s| s.items.iter())
    }

    /// Percentage of watched items, 0 for an empty course
    pub fn completion_percentage(&self) -> f64 {
        if self.total_items == 0 {
            return 0.0;
        }
        self.watched_count as f64 / self.total_items as f64 * 100.0
    }

    /// Set an item's watched flag and move the counter by one.
    ///
    /// Returns `None` when the item does not exist and `Some(false)` when the
    /// flag already had the requested value.
    pub(crate) fn apply_watched(&mut self, key: &ItemKey, watched: bool) -> Option<bool> {
        let item = self
            .sections
            .iter_mut()
            .find(|s| s.name == key.section)
            .and_then(|s| s.items.iter_mut().find(|i| i.name == key.name))?;

        if item.watched == watched {
            return Some(false);
        }
        item.watched = watched;

        if watched {
            self.watched_count += 1;
        } else {
            self.watched_count = self.watched_count.saturating_sub(1);
        }
        Some(true)
    }

    /// Recount watched items from the tree
    pub(crate) fn recount(&mut self) {
        self.total_items = self.sections.iter().map(|s| s.items.len()).sum();
        self.watched_count = self.items().filter(|i| i.watched).count();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn course() -> Course {
        let item = |section: &str, name: &str, kind| Item {
            name: name.to_string(),
            kind,
            section_name: section.to_string(),
            watched: false,
        };
        Course {
            id: "rust".to_string(),
            name: "rust".to_string(),
            root_path: PathBuf::from("/courses/rust"),
            icon: "SiRust".to_string(),
            sections: vec![
                Section {
                    name: "01 Basics".to_string(),
                    items: vec![item("01 Basics", "1 Hello.mp4", ItemKind::Video)],
                },
                Section {
                    name: PRINCIPAL_SECTION.to_string(),
                    items: vec![item(PRINCIPAL_SECTION, "notes.html", ItemKind::Document)],
                },
            ],
            total_items: 2,
            watched_count: 0,
            added_at: Utc::now(),
        }
    }

    #[test]
    fn test_item_kind_classification() {
        assert_eq!(ItemKind::from_path(Path::new("a/1 Intro.MP4")), ItemKind::Video);
        assert_eq!(ItemKind::from_path(Path::new("clip.avi")), ItemKind::Video);
        assert_eq!(ItemKind::from_path(Path::new("clip.mov")), ItemKind::Video);
        assert_eq!(ItemKind::from_path(Path::new("notes.html")), ItemKind::Document);
        assert_eq!(ItemKind::from_path(Path::new("notes.htm")), ItemKind::Unsupported);
        assert_eq!(ItemKind::from_path(Path::new("README")), ItemKind::Unsupported);
        assert!(ItemKind::Video.tracks_playback());
        assert!(!ItemKind::Document.tracks_playback());
    }

    #[test]
    fn test_item_path_for_principal_and_subsections() {
        let c = course();
        assert_eq!(
            c.item_path(PRINCIPAL_SECTION, "notes.html").as_str(),
            "/courses/rust/notes.html"
        );
        assert_eq!(
            c.item_path("01 Basics", "1 Hello.mp4").as_str(),
            "/courses/rust/01 Basics/1 Hello.mp4"
        );
    }

    #[test]
    fn test_find_by_path() {
        let c = course();
        let path = CanonicalPath::new("/courses/rust/01 Basics/./1 Hello.mp4");
        let item = c.find_by_path(&path).unwrap();
        assert_eq!(item.key(), ItemKey::new("01 Basics", "1 Hello.mp4"));

        assert!(c.find_by_path(&CanonicalPath::new("/courses/rust/missing.mp4")).is_none());
    }

    #[test]
    fn test_apply_watched_moves_counter_once() {
        let mut c = course();
        let key = ItemKey::new("01 Basics", "1 Hello.mp4");

        assert_eq!(c.apply_watched(&key, true), Some(true));
        assert_eq!(c.apply_watched(&key, true), Some(false));
        assert_eq!(c.watched_count, 1);

        assert_eq!(c.apply_watched(&key, false), Some(true));
        assert_eq!(c.watched_count, 0);

        assert_eq!(c.apply_watched(&ItemKey::new("x", "y"), true), None);
    }

    #[test]
    fn test_completion_percentage_of_empty_course() {
        let mut c = course();
        c.sections.clear();
        c.recount();
        assert_eq!(c.total_items, 0);
        assert_eq!(c.completion_percentage(), 0.0);
    }
}
