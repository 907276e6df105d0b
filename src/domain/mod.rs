//! Domain types for coursetrack.
//!
//! This module contains the core data structures:
//! - Course: a scanned folder with its sections and items
//! - ProgressRecord: last known playback position of a video

pub mod course;
pub mod progress;

// Re-export commonly used types
pub use course::{Course, Item, ItemKey, ItemKind, Section, PRINCIPAL_SECTION};
pub use progress::ProgressRecord;
