//! Change notifications for the presentation layer.
//!
//! Observers are called synchronously, after a mutation has been persisted.

use crate::domain::{ItemKey, ProgressRecord};
use crate::library::CanonicalPath;

/// What changed in the catalog
#[derive(Debug, Clone, PartialEq)]
pub enum CatalogChange {
    CourseAdded { course_id: String },
    CourseRescanned { course_id: String },
    CourseRemoved { course_id: String },
    IconChanged { course_id: String, icon: String },
    ItemWatched {
        course_id: String,
        item: ItemKey,
        watched: bool,
        watched_count: usize,
    },
}

impl CatalogChange {
    /// Id of the affected course
    pub fn course_id(&self) -> &str {
        match self {
            Self::CourseAdded { course_id }
            | Self::CourseRescanned { course_id }
            | Self::CourseRemoved { course_id }
            | Self::IconChanged { course_id, .. }
            | Self::ItemWatched { course_id, .. } => course_id,
        }
    }
}

/// Subscriber interface. Both methods default to doing nothing.
pub trait CatalogObserver {
    fn on_catalog_changed(&self, _change: &CatalogChange) {}

    fn on_progress_changed(&self, _course_id: &str, _path: &CanonicalPath, _record: &ProgressRecord) {}
}

/// Ordered list of subscribers
#[derive(Default)]
pub struct Observers {
    observers: Vec<Box<dyn CatalogObserver>>,
}

impl Observers {
    pub fn subscribe(&mut self, observer: Box<dyn CatalogObserver>) {
        self.observers.push(observer);
    }

    pub fn catalog_changed(&self, change: &CatalogChange) {
        for observer in &self.observers {
            observer.on_catalog_changed(change);
        }
    }

    pub fn progress_changed(&self, course_id: &str, path: &CanonicalPath, record: &ProgressRecord) {
        for observer in &self.observers {
            observer.on_progress_changed(course_id, path, record);
        }
    }
}

impl std::fmt::Debug for Observers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Observers")
            .field("count", &self.observers.len())
            .finish()
    }
}
