//! Interfaces of the external collaborators.
//!
//! The media player and the document renderer live outside this crate. The
//! core issues commands through these traits and receives player events as
//! [`PlayerEvent`] values.

pub mod console;

use std::path::Path;

use serde::{Deserialize, Serialize};

pub use console::{ConsolePlayer, ConsoleRenderer};

/// Notification from the media player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum PlayerEvent {
    /// Playback position moved (ms)
    PositionChanged { ms: u64 },

    /// Duration of the current source became known (ms)
    DurationChanged { ms: u64 },

    Paused,

    Stopped,

    /// Reached the end of the current source
    EndOfMedia,
}

/// Commands accepted by the media player
pub trait Player {
    /// Load a new source. Position and duration events for it follow.
    fn set_source(&mut self, path: &Path);

    fn play(&mut self);

    fn pause(&mut self);

    fn seek(&mut self, position_ms: u64);
}

/// Embedded renderer for document items
pub trait DocumentRenderer {
    fn load(&mut self, path: &Path);
}
