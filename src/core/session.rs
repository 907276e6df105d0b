//! Playback session: connects the media player to the progress store.
//!
//! Two cadences are kept apart. Position and duration ticks only update the
//! in-memory state of the current source. Progress is persisted on pause,
//! stop, end of media, source switch and close. When switching sources the
//! previous record is written before the player is told to load the next one.

use tokio::sync::mpsc;

use super::tracker::{Tracker, TrackerError};
use crate::adapters::{DocumentRenderer, Player, PlayerEvent};
use crate::domain::{ItemKey, ItemKind, ProgressRecord};
use crate::library::{CanonicalPath, CatalogError};

/// Distance covered by one rewind or forward step (ms)
pub const SKIP_STEP_MS: u64 = 5_000;

/// Source currently loaded in the player
#[derive(Debug, Clone)]
struct NowPlaying {
    course_id: String,
    path: CanonicalPath,
    position: u64,
    duration: u64,
    /// Unpersisted changes since the last write
    dirty: bool,
    /// End of media already processed for this load
    end_handled: bool,
}

/// What `open_item` did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Opened {
    /// Loaded into the player, resuming at `resume_at` ms
    Video { resume_at: u64 },

    /// Handed to the document renderer
    Document,

    /// Nothing to show
    Unsupported,
}

/// Input to [`drive`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    Open { course_id: String, item: ItemKey },
    /// Jump to an absolute position (ms)
    Seek { ms: u64 },
    Rewind,
    Forward,
    Player(PlayerEvent),
}

/// Counts reported by [`drive`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DriveSummary {
    pub handled: usize,
    pub failed: usize,
}

/// Playback state machine over a player and a document renderer
#[derive(Debug)]
pub struct PlaybackSession<P, D> {
    player: P,
    renderer: D,
    current: Option<NowPlaying>,
}

impl<P: Player, D: DocumentRenderer> PlaybackSession<P, D> {
    pub fn new(player: P, renderer: D) -> Self {
        Self {
            player,
            renderer,
            current: None,
        }
    }

    pub fn player(&self) -> &P {
        &self.player
    }

    pub fn renderer(&self) -> &D {
        &self.renderer
    }

    /// Canonical path of the loaded video
    pub fn current_path(&self) -> Option<&CanonicalPath> {
        self.current.as_ref().map(|now| &now.path)
    }

    /// In-memory position of the loaded video
    pub fn last_position(&self) -> Option<u64> {
        self.current.as_ref().map(|now| now.position)
    }

    /// Open an item of a course.
    ///
    /// Any pending progress of the previous video is persisted first.
    pub fn open_item(
        &mut self,
        tracker: &mut Tracker,
        course_id: &str,
        key: &ItemKey,
    ) -> Result<Opened, TrackerError> {
        let course = tracker.open_course(course_id)?;
        let kind = course
            .item(key)
            .map(|item| item.kind)
            .ok_or_else(|| CatalogError::ItemNotFound {
                course: course_id.to_string(),
                path: key.to_string(),
            })?;
        let path = course.item_path(&key.section, &key.name);

        match kind {
            ItemKind::Video => {
                self.persist_current(tracker)?;

                let saved = tracker.progress().get_canonical(course_id, &path);
                let resume_at = saved.map(|r| r.position).unwrap_or(0);

                self.player.set_source(&path.to_path_buf());
                if resume_at > 0 {
                    self.player.seek(resume_at);
                }
                self.player.play();

                tracing::debug!(course = %course_id, path = %path, resume_at, "Video opened");
                self.current = Some(NowPlaying {
                    course_id: course_id.to_string(),
                    path,
                    position: resume_at,
                    duration: saved.map(|r| r.duration).unwrap_or(0),
                    dirty: false,
                    end_handled: false,
                });
                Ok(Opened::Video { resume_at })
            }
            ItemKind::Document => {
                self.close(tracker)?;
                self.player.pause();
                self.renderer.load(&path.to_path_buf());
                Ok(Opened::Document)
            }
            ItemKind::Unsupported => Ok(Opened::Unsupported),
        }
    }

    /// Move the loaded video to `ms`, clamped to a known duration.
    ///
    /// Only the in-memory position changes; it is persisted with the next
    /// pause, stop, switch or close. Returns the new position, or `None`
    /// when no video is loaded.
    pub fn seek(&mut self, ms: u64) -> Option<u64> {
        let now = self.current.as_mut()?;
        let target = if now.duration > 0 { ms.min(now.duration) } else { ms };

        now.position = target;
        now.dirty = true;
        self.player.seek(target);
        Some(target)
    }

    /// Step back [`SKIP_STEP_MS`], stopping at the start
    pub fn rewind(&mut self) -> Option<u64> {
        let position = self.last_position()?;
        self.seek(position.saturating_sub(SKIP_STEP_MS))
    }

    /// Step forward [`SKIP_STEP_MS`], stopping at the end
    pub fn forward(&mut self) -> Option<u64> {
        let position = self.last_position()?;
        self.seek(position.saturating_add(SKIP_STEP_MS))
    }

    /// Apply one player event
    pub fn handle(&mut self, tracker: &mut Tracker, event: PlayerEvent) -> Result<(), TrackerError> {
        let Some(now) = self.current.as_mut() else {
            tracing::debug!(?event, "Player event without a loaded video");
            return Ok(());
        };

        match event {
            PlayerEvent::PositionChanged { ms } => {
                now.position = ms;
                now.dirty = true;
            }
            PlayerEvent::DurationChanged { ms } => {
                now.duration = ms;
                now.dirty = true;
            }
            PlayerEvent::Paused | PlayerEvent::Stopped => {
                self.persist_current(tracker)?;
            }
            PlayerEvent::EndOfMedia => {
                if now.end_handled {
                    return Ok(());
                }
                now.end_handled = true;
                if now.duration > 0 {
                    now.position = now.duration;
                }
                now.dirty = true;

                let course_id = now.course_id.clone();
                let path = now.path.clone();
                self.persist_current(tracker)?;
                tracker.on_playback_completed(&course_id, &path)?;
            }
        }
        Ok(())
    }

    /// Persist pending progress and unload the current video
    pub fn close(&mut self, tracker: &mut Tracker) -> Result<(), TrackerError> {
        self.persist_current(tracker)?;
        self.current = None;
        Ok(())
    }

    fn persist_current(&mut self, tracker: &mut Tracker) -> Result<(), TrackerError> {
        let Some(now) = self.current.as_mut() else {
            return Ok(());
        };
        if !now.dirty {
            return Ok(());
        }

        let record = ProgressRecord::new(now.position, now.duration);
        tracker.record_progress(&now.course_id, now.path.as_str(), record)?;
        now.dirty = false;

        tracing::debug!(path = %now.path, position = record.position, "Progress saved");
        Ok(())
    }
}

/// Feed commands from a channel into a session until the channel closes.
///
/// Commands are applied one at a time on the calling task. Failed commands
/// are logged and skipped. The session is closed at the end, which persists
/// any pending progress.
pub async fn drive<P: Player, D: DocumentRenderer>(
    session: &mut PlaybackSession<P, D>,
    tracker: &mut Tracker,
    mut rx: mpsc::Receiver<SessionCommand>,
) -> Result<DriveSummary, TrackerError> {
    let mut summary = DriveSummary::default();

    while let Some(command) = rx.recv().await {
        let result = match &command {
            SessionCommand::Open { course_id, item } => {
                session.open_item(tracker, course_id, item).map(|_| ())
            }
            SessionCommand::Seek { ms } => {
                session.seek(*ms);
                Ok(())
            }
            SessionCommand::Rewind => {
                session.rewind();
                Ok(())
            }
            SessionCommand::Forward => {
                session.forward();
                Ok(())
            }
            SessionCommand::Player(event) => session.handle(tracker, *event),
        };

        match result {
            Ok(()) => summary.handled += 1,
            Err(e) => {
                tracing::warn!(?command, "Playback command failed: {}", e);
                summary.failed += 1;
            }
        }
    }

    session.close(tracker)?;
    Ok(summary)
}
