//! Course catalog: the durable set of scanned courses.
//!
//! The catalog is held in memory and written back to a single JSON snapshot
//! after every mutation. The snapshot is always rewritten in full.

use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::paths::CanonicalPath;
use super::scanner::{course_id_for, scan_root, ScanOptions};
use crate::core::snapshot;
use crate::domain::{Course, ItemKey};

/// Current snapshot format version
pub const CATALOG_VERSION: u32 = 1;

/// Errors that can occur with the catalog
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Course already exists: {0}")]
    DuplicateCourse(String),

    #[error("Course not found: {0}")]
    CourseNotFound(String),

    #[error("Item not found in course {course}: {path}")]
    ItemNotFound { course: String, path: String },

    #[error("Course folder does not exist or is not a directory: {0}")]
    RootNotFound(PathBuf),

    #[error("Catalog snapshot is corrupt ({path}): {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// On-disk layout of the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogSnapshot {
    /// Catalog format version
    pub version: u32,

    /// Course id -> course
    pub courses: BTreeMap<String, Course>,
}

impl Default for CatalogSnapshot {
    fn default() -> Self {
        Self {
            version: CATALOG_VERSION,
            courses: BTreeMap::new(),
        }
    }
}

/// Outcome of importing a folder of courses
#[derive(Debug, Clone, Default)]
pub struct ImportResult {
    /// Ids of newly added courses
    pub added: Vec<String>,

    /// Ids that were already in the catalog
    pub skipped: Vec<String>,

    /// Folders that could not be scanned
    pub errors: Vec<(PathBuf, String)>,
}

/// In-memory catalog bound to its snapshot file
#[derive(Debug)]
pub struct CourseCatalog {
    path: PathBuf,
    options: ScanOptions,
    courses: BTreeMap<String, Course>,
}

impl CourseCatalog {
    /// Create an empty catalog that will persist to `path`
    pub fn new(path: PathBuf, options: ScanOptions) -> Self {
        Self {
            path,
            options,
            courses: BTreeMap::new(),
        }
    }

    /// Load the catalog snapshot.
    ///
    /// A missing file is the first-run case and yields an empty catalog.
    pub fn load(path: PathBuf, options: ScanOptions) -> Result<Self, CatalogError> {
        let snapshot: CatalogSnapshot = match snapshot::read_json(&path)? {
            None => CatalogSnapshot::default(),
            Some(Ok(snapshot)) => snapshot,
            Some(Err(source)) => return Err(CatalogError::Corrupt { path, source }),
        };

        Ok(Self {
            path,
            options,
            courses: snapshot.courses,
        })
    }

    /// Load the catalog, falling back to an empty one if the snapshot is unusable
    pub fn load_or_empty(path: PathBuf, options: ScanOptions) -> Self {
        match Self::load(path.clone(), options.clone()) {
            Ok(catalog) => catalog,
            Err(e) => {
                tracing::warn!("Starting with an empty catalog: {}", e);
                Self::new(path, options)
            }
        }
    }

    /// Path of the snapshot file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the whole catalog to its snapshot
    pub fn persist(&self) -> Result<(), CatalogError> {
        let snapshot = CatalogSnapshot {
            version: CATALOG_VERSION,
            courses: self.courses.clone(),
        };
        snapshot::write_json(&self.path, &snapshot)?;
        tracing::debug!(courses = self.courses.len(), "Catalog persisted");
        Ok(())
    }

    /// Scan a folder into a course without adding it
    pub fn scan_root(&self, root: &Path) -> Result<Course, CatalogError> {
        scan_root(root, &self.options)
    }

    /// Scan a folder and add it as a new course
    pub fn add_course(&mut self, root: &Path) -> Result<&Course, CatalogError> {
        if let Some(id) = course_id_for(root) {
            if self.courses.contains_key(&id) {
                return Err(CatalogError::DuplicateCourse(id));
            }
        }

        let course = self.scan_root(root)?;
        let id = course.id.clone();
        // The canonical folder name can differ from the one given
        if self.courses.contains_key(&id) {
            return Err(CatalogError::DuplicateCourse(id));
        }

        self.courses.insert(id.clone(), course);
        self.persist_or_restore(&id, None)?;
        tracing::info!(course = %id, "Course added");

        self.get_or_err(&id)
    }

    /// Add every immediate subdirectory of `courses_root` as a course.
    ///
    /// Courses that already exist are skipped. The catalog is persisted once.
    pub fn import_root(&mut self, courses_root: &Path) -> Result<ImportResult, CatalogError> {
        let mut dirs: Vec<PathBuf> = std::fs::read_dir(courses_root)
            .map_err(|_| CatalogError::RootNotFound(courses_root.to_path_buf()))?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_dir())
            .collect();
        dirs.sort();

        let mut result = ImportResult::default();

        for dir in dirs {
            let course = match self.scan_root(&dir) {
                Ok(course) => course,
                Err(e) => {
                    tracing::warn!("Failed to scan {}: {}", dir.display(), e);
                    result.errors.push((dir, e.to_string()));
                    continue;
                }
            };

            if self.courses.contains_key(&course.id) {
                tracing::debug!(course = %course.id, "Already in catalog, skipping");
                result.skipped.push(course.id);
                continue;
            }

            result.added.push(course.id.clone());
            self.courses.insert(course.id.clone(), course);
        }

        if !result.added.is_empty() {
            if let Err(e) = self.persist() {
                for id in &result.added {
                    self.courses.remove(id);
                }
                return Err(e);
            }
            tracing::info!(added = result.added.len(), "Imported courses");
        }

        Ok(result)
    }

    /// Re-scan an existing course from disk.
    ///
    /// Item totals are recomputed. Watched flags survive for items whose
    /// section and name are unchanged; the icon and creation time are kept.
    pub fn rescan_course(&mut self, id: &str) -> Result<&Course, CatalogError> {
        let old = self.get_or_err(id)?.clone();
        let mut fresh = self.scan_root(&old.root_path)?;

        fresh.id = old.id.clone();
        fresh.name = old.name.clone();
        fresh.icon = old.icon.clone();
        fresh.added_at = old.added_at;

        for section in &mut fresh.sections {
            for item in &mut section.items {
                item.watched = old.item(&item.key()).is_some_and(|i| i.watched);
            }
        }
        fresh.recount();

        tracing::info!(
            course = %id,
            before = old.total_items,
            after = fresh.total_items,
            "Course rescanned"
        );
        self.courses.insert(id.to_string(), fresh);
        self.persist_or_restore(id, Some(old))?;

        self.get_or_err(id)
    }

    /// Remove a course, leaving all other courses untouched
    pub fn remove_course(&mut self, id: &str) -> Result<Course, CatalogError> {
        let course = self
            .courses
            .remove(id)
            .ok_or_else(|| CatalogError::CourseNotFound(id.to_string()))?;

        self.persist_or_restore(id, Some(course.clone()))?;
        tracing::info!(course = %id, "Course removed");
        Ok(course)
    }

    /// Change the icon of a course
    pub fn set_icon(&mut self, id: &str, logical_name: &str) -> Result<(), CatalogError> {
        let course = self
            .courses
            .get_mut(id)
            .ok_or_else(|| CatalogError::CourseNotFound(id.to_string()))?;

        let previous = course.clone();
        course.icon = logical_name.to_string();
        self.persist_or_restore(id, Some(previous))
    }

    /// Persist, putting `previous` back under `id` if the snapshot cannot be written
    fn persist_or_restore(&mut self, id: &str, previous: Option<Course>) -> Result<(), CatalogError> {
        let Err(e) = self.persist() else {
            return Ok(());
        };

        tracing::warn!(course = %id, "Catalog not saved, change reverted: {}", e);
        match previous {
            Some(course) => {
                self.courses.insert(id.to_string(), course);
            }
            None => {
                self.courses.remove(id);
            }
        }
        Err(e)
    }

    /// Get a course by id
    pub fn get(&self, id: &str) -> Option<&Course> {
        self.courses.get(id)
    }

    pub fn get_or_err(&self, id: &str) -> Result<&Course, CatalogError> {
        self.get(id)
            .ok_or_else(|| CatalogError::CourseNotFound(id.to_string()))
    }

    /// Mutable access for the progress aggregator only
    pub(crate) fn get_mut(&mut self, id: &str) -> Result<&mut Course, CatalogError> {
        self.courses
            .get_mut(id)
            .ok_or_else(|| CatalogError::CourseNotFound(id.to_string()))
    }

    /// Resolve a canonical path to an item of a course
    pub fn locate(&self, id: &str, path: &CanonicalPath) -> Result<ItemKey, CatalogError> {
        let course = self.get_or_err(id)?;
        course
            .find_by_path(path)
            .map(|item| item.key())
            .ok_or_else(|| CatalogError::ItemNotFound {
                course: id.to_string(),
                path: path.to_string(),
            })
    }

    /// All courses, keyed by id
    pub fn courses(&self) -> &BTreeMap<String, Course> {
        &self.courses
    }

    /// Get the number of courses
    pub fn len(&self) -> usize {
        self.courses.len()
    }

    /// Check if the catalog is empty
    pub fn is_empty(&self) -> bool {
        self.courses.is_empty()
    }
}
