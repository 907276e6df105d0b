//! Presentation-facing command and query surface.
//!
//! `Tracker` owns the catalog, the progress store and the aggregator. All
//! mutations go through it, and subscribed observers are told about each one
//! after it has been persisted.

use std::path::{Path, PathBuf};

use thiserror::Error;

use super::aggregator::{ProgressAggregator, ToggleOutcome};
use super::notify::{CatalogChange, CatalogObserver, Observers};
use super::progress_store::{ProgressStore, ProgressStoreError};
use crate::domain::{Course, ItemKey, ProgressRecord};
use crate::library::{natural_order, CanonicalPath, CatalogError, CourseCatalog, ImportResult, ScanOptions};

/// Errors surfaced to callers of the tracker
#[derive(Debug, Error)]
pub enum TrackerError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Progress(#[from] ProgressStoreError),
}

/// Owned catalog and progress services
#[derive(Debug)]
pub struct Tracker {
    catalog: CourseCatalog,
    progress: ProgressStore,
    aggregator: ProgressAggregator,
    observers: Observers,
}

impl Tracker {
    /// Build a tracker from already loaded stores
    pub fn new(catalog: CourseCatalog, progress: ProgressStore) -> Self {
        Self {
            catalog,
            progress,
            aggregator: ProgressAggregator::new(),
            observers: Observers::default(),
        }
    }

    /// Load both snapshots. Unreadable snapshots are replaced by empty stores.
    pub fn open(catalog_path: PathBuf, progress_path: PathBuf, options: ScanOptions) -> Self {
        let catalog = CourseCatalog::load_or_empty(catalog_path, options);
        let progress = ProgressStore::load_or_empty(progress_path);
        tracing::debug!(courses = catalog.len(), "Tracker opened");
        Self::new(catalog, progress)
    }

    pub fn catalog(&self) -> &CourseCatalog {
        &self.catalog
    }

    pub fn progress(&self) -> &ProgressStore {
        &self.progress
    }

    /// Register a change observer
    pub fn subscribe(&mut self, observer: Box<dyn CatalogObserver>) {
        self.observers.subscribe(observer);
    }

    /// All courses in natural order of their names
    pub fn list_courses(&self) -> Vec<&Course> {
        let mut courses: Vec<&Course> = self.catalog.courses().values().collect();
        natural_order::sort_by_name(&mut courses, |c| c.name.as_str());
        courses
    }

    pub fn open_course(&self, course_id: &str) -> Result<&Course, TrackerError> {
        Ok(self.catalog.get_or_err(course_id)?)
    }

    pub fn add_course(&mut self, root: &Path) -> Result<&Course, TrackerError> {
        let course_id = self.catalog.add_course(root)?.id.clone();
        self.observers.catalog_changed(&CatalogChange::CourseAdded {
            course_id: course_id.clone(),
        });
        self.open_course(&course_id)
    }

    /// Add every course folder under `courses_root`
    pub fn import_root(&mut self, courses_root: &Path) -> Result<ImportResult, TrackerError> {
        let result = self.catalog.import_root(courses_root)?;
        for course_id in &result.added {
            self.observers.catalog_changed(&CatalogChange::CourseAdded {
                course_id: course_id.clone(),
            });
        }
        Ok(result)
    }

    pub fn rescan_course(&mut self, course_id: &str) -> Result<&Course, TrackerError> {
        self.catalog.rescan_course(course_id)?;
        self.observers.catalog_changed(&CatalogChange::CourseRescanned {
            course_id: course_id.to_string(),
        });
        self.open_course(course_id)
    }

    /// Remove a course together with its playback records
    pub fn remove_course(&mut self, course_id: &str) -> Result<Course, TrackerError> {
        let course = self.catalog.remove_course(course_id)?;
        let purged = self.progress.remove_course(course_id)?;
        tracing::debug!(course = %course_id, purged, "Purged progress records");

        self.observers.catalog_changed(&CatalogChange::CourseRemoved {
            course_id: course_id.to_string(),
        });
        Ok(course)
    }

    pub fn toggle_item(
        &mut self,
        course_id: &str,
        item: &ItemKey,
        watched: bool,
    ) -> Result<ToggleOutcome, TrackerError> {
        let outcome = self
            .aggregator
            .toggle_item(&mut self.catalog, course_id, item, watched)?;
        self.notify_toggle(course_id, item, watched, outcome);
        Ok(outcome)
    }

    pub fn set_course_icon(&mut self, course_id: &str, logical_name: &str) -> Result<(), TrackerError> {
        self.catalog.set_icon(course_id, logical_name)?;
        self.observers.catalog_changed(&CatalogChange::IconChanged {
            course_id: course_id.to_string(),
            icon: logical_name.to_string(),
        });
        Ok(())
    }

    /// Saved playback position of a file
    pub fn get_progress(&self, course_id: &str, raw_path: &str) -> Option<ProgressRecord> {
        self.progress.get(course_id, raw_path)
    }

    /// Persist the playback position of a file
    pub fn record_progress(
        &mut self,
        course_id: &str,
        raw_path: &str,
        record: ProgressRecord,
    ) -> Result<CanonicalPath, TrackerError> {
        let path = self.progress.put(course_id, raw_path, record)?;
        self.observers.progress_changed(course_id, &path, &record);
        Ok(path)
    }

    /// Playback of `path` reached its end: mark the item watched
    pub fn on_playback_completed(
        &mut self,
        course_id: &str,
        path: &CanonicalPath,
    ) -> Result<ToggleOutcome, TrackerError> {
        let item = self.catalog.locate(course_id, path)?;
        let outcome = self
            .aggregator
            .on_playback_completed(&mut self.catalog, course_id, path)?;
        self.notify_toggle(course_id, &item, true, outcome);
        Ok(outcome)
    }

    pub fn completion_percentage(&self, course_id: &str) -> Result<f64, TrackerError> {
        let course = self.open_course(course_id)?;
        Ok(self.aggregator.completion_percentage(course))
    }

    fn notify_toggle(&self, course_id: &str, item: &ItemKey, watched: bool, outcome: ToggleOutcome) {
        if let ToggleOutcome::Changed { watched_count } = outcome {
            self.observers.catalog_changed(&CatalogChange::ItemWatched {
                course_id: course_id.to_string(),
                item: item.clone(),
                watched,
                watched_count,
            });
        }
    }
}
