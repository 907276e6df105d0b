//! Core progress engine.
//!
//! This module contains:
//! - Snapshot: atomic whole-file JSON persistence
//! - ProgressStore: playback positions per course and path
//! - ProgressAggregator: watched flags and counters
//! - Tracker: the command/query surface with change notifications
//! - Session: playback cadence between the player and the stores

pub mod aggregator;
pub mod notify;
pub mod progress_store;
pub mod session;
pub mod snapshot;
pub mod tracker;

// Re-export commonly used types
pub use aggregator::{ProgressAggregator, ToggleOutcome};
pub use notify::{CatalogChange, CatalogObserver};
pub use progress_store::{ProgressStore, ProgressStoreError};
pub use session::{drive, DriveSummary, Opened, PlaybackSession, SessionCommand, SKIP_STEP_MS};
pub use tracker::{Tracker, TrackerError};
