//! coursetrack - resumable progress for local video courses
//!
//! Scans course folders into a catalog of sections and items, remembers
//! where each video was left off and which items were watched, and keeps
//! both on disk as JSON snapshots that survive crashes.
//!
//! # Architecture
//!
//! All state changes go through a single [`Tracker`]:
//! - The catalog holds the course tree and watched flags
//! - The progress store holds playback positions keyed by canonical path
//! - Every accepted change is persisted before observers are notified
//! - A [`PlaybackSession`] turns player events into progress writes
//!
//! # Modules
//!
//! - `adapters`: Player and document renderer interfaces
//! - `core`: Progress store, aggregator, tracker, playback session
//! - `domain`: Data structures (Course, Section, Item, ProgressRecord)
//! - `library`: Folder scanning, natural order, canonical paths, catalog
//! - `icons`: Logical icon names to images
//! - `cli`: Command-line interface
//!
//! # Usage
//!
//! ```bash
//! # Add a course folder
//! coursetrack add ~/cursos/rust
//!
//! # See what is left
//! coursetrack show rust
//!
//! # Mark something watched
//! coursetrack toggle rust "1 Intro" a.mp4
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod icons;
pub mod library;

// Re-export main types at crate root for convenience
pub use crate::core::{PlaybackSession, ProgressAggregator, ProgressStore, Tracker, TrackerError};
pub use adapters::{DocumentRenderer, Player, PlayerEvent};
pub use domain::{Course, Item, ItemKey, ItemKind, ProgressRecord, Section};
pub use icons::IconResolver;
pub use library::{CanonicalPath, CatalogError, CourseCatalog};
