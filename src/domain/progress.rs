//! Playback progress of a single video.

use serde::{Deserialize, Serialize};

/// Last persisted position of a video, in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProgressRecord {
    pub position: u64,

    /// 0 while the duration is unknown
    pub duration: u64,
}

impl ProgressRecord {
    /// Create a record, clamping the position to a known duration
    pub fn new(position: u64, duration: u64) -> Self {
        let position = if duration > 0 {
            position.min(duration)
        } else {
            position
        };
        Self { position, duration }
    }

    /// Whether the duration has been reported yet
    pub fn has_duration(&self) -> bool {
        self.duration > 0
    }

    /// Progress bar value in percent (0 while the duration is unknown)
    pub fn percent(&self) -> f64 {
        if !self.has_duration() {
            return 0.0;
        }
        self.position as f64 / self.duration as f64 * 100.0
    }
}
