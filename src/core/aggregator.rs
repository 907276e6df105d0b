//! Watched-state bookkeeping.
//!
//! The aggregator is the only code path that changes `Item::watched`, so the
//! `Course::watched_count` counter always equals the number of watched items.

use crate::domain::{Course, ItemKey};
use crate::library::{CanonicalPath, CatalogError, CourseCatalog};

/// Result of a watched-state change request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// The flag changed and the catalog was persisted
    Changed { watched_count: usize },

    /// The item already had the requested state
    Unchanged,
}

impl ToggleOutcome {
    pub fn changed(&self) -> bool {
        matches!(self, Self::Changed { .. })
    }
}

/// Keeps per-course watched counters consistent with item flags
#[derive(Debug, Default, Clone, Copy)]
pub struct ProgressAggregator;

impl ProgressAggregator {
    pub fn new() -> Self {
        Self
    }

    /// Set the watched flag of an item.
    ///
    /// Setting the current value is a no-op. Otherwise the course counter
    /// moves by exactly one and the catalog is persisted. A failed write
    /// restores the previous flag.
    pub fn toggle_item(
        &self,
        catalog: &mut CourseCatalog,
        course_id: &str,
        item: &ItemKey,
        watched: bool,
    ) -> Result<ToggleOutcome, CatalogError> {
        let course = catalog.get_mut(course_id)?;

        let changed = course
            .apply_watched(item, watched)
            .ok_or_else(|| CatalogError::ItemNotFound {
                course: course_id.to_string(),
                path: item.to_string(),
            })?;

        if !changed {
            tracing::debug!(course = %course_id, item = %item, watched, "Watched state unchanged");
            return Ok(ToggleOutcome::Unchanged);
        }

        let watched_count = course.watched_count;
        if let Err(e) = catalog.persist() {
            if let Ok(course) = catalog.get_mut(course_id) {
                course.apply_watched(item, !watched);
            }
            tracing::warn!(course = %course_id, item = %item, "Watched state not saved, reverted: {}", e);
            return Err(e);
        }
        tracing::info!(
            course = %course_id,
            item = %item,
            watched,
            watched_count,
            "Watched state changed"
        );

        Ok(ToggleOutcome::Changed { watched_count })
    }

    /// Mark the item at `path` watched after its playback reached the end.
    ///
    /// Repeated completions of an item that is already watched do nothing.
    pub fn on_playback_completed(
        &self,
        catalog: &mut CourseCatalog,
        course_id: &str,
        path: &CanonicalPath,
    ) -> Result<ToggleOutcome, CatalogError> {
        let key = catalog.locate(course_id, path)?;
        self.toggle_item(catalog, course_id, &key, true)
    }

    /// Watched share of a course in percent, 0 for an empty course
    pub fn completion_percentage(&self, course: &Course) -> f64 {
        course.completion_percentage()
    }
}
