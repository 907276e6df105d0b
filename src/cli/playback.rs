//! Replay of recorded playback sessions.
//!
//! A script is a JSON-lines file. Each line is one step:
//!
//! ```text
//! {"step": "open", "section": "1 Intro", "name": "a.mp4"}
//! {"step": "duration", "ms": 60000}
//! {"step": "position", "ms": 15000}
//! {"step": "rewind"}
//! {"step": "seek", "ms": 30000}
//! {"step": "pause"}
//! {"step": "end"}
//! ```
//!
//! Blank lines and lines starting with `#` are ignored.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use super::open_tracker;
use crate::adapters::{ConsolePlayer, ConsoleRenderer, PlayerEvent};
use crate::config::ResolvedConfig;
use crate::core::{drive, PlaybackSession, SessionCommand};
use crate::domain::ItemKey;

/// One line of a playback script
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum ScriptStep {
    Open { section: String, name: String },
    Position { ms: u64 },
    Duration { ms: u64 },
    Seek { ms: u64 },
    Rewind,
    Forward,
    Pause,
    Stop,
    End,
}

impl ScriptStep {
    pub fn into_command(self, course_id: &str) -> SessionCommand {
        match self {
            ScriptStep::Open { section, name } => SessionCommand::Open {
                course_id: course_id.to_string(),
                item: ItemKey::new(section, name),
            },
            ScriptStep::Position { ms } => SessionCommand::Player(PlayerEvent::PositionChanged { ms }),
            ScriptStep::Duration { ms } => SessionCommand::Player(PlayerEvent::DurationChanged { ms }),
            ScriptStep::Seek { ms } => SessionCommand::Seek { ms },
            ScriptStep::Rewind => SessionCommand::Rewind,
            ScriptStep::Forward => SessionCommand::Forward,
            ScriptStep::Pause => SessionCommand::Player(PlayerEvent::Paused),
            ScriptStep::Stop => SessionCommand::Player(PlayerEvent::Stopped),
            ScriptStep::End => SessionCommand::Player(PlayerEvent::EndOfMedia),
        }
    }
}

/// Parse one script line. `Ok(None)` for blank and comment lines.
pub fn parse_step(line: &str) -> Result<Option<ScriptStep>, serde_json::Error> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }
    serde_json::from_str(line).map(Some)
}

/// Read the script and send its steps. Returns the number of lines skipped.
async fn feed(script: PathBuf, course_id: String, tx: mpsc::Sender<SessionCommand>) -> Result<usize> {
    let file = File::open(&script)
        .await
        .with_context(|| format!("Failed to open script: {}", script.display()))?;
    let mut lines = BufReader::new(file).lines();
    let mut skipped = 0;
    let mut line_no = 0;

    while let Some(line) = lines.next_line().await? {
        line_no += 1;
        match parse_step(&line) {
            Ok(Some(step)) => {
                if tx.send(step.into_command(&course_id)).await.is_err() {
                    break;
                }
            }
            Ok(None) => {}
            Err(e) => {
                tracing::warn!("{}:{}: invalid step: {}", script.display(), line_no, e);
                skipped += 1;
            }
        }
    }

    Ok(skipped)
}

pub async fn execute(config: &ResolvedConfig, course_id: &str, script: &Path) -> Result<()> {
    let mut tracker = open_tracker(config)?;
    tracker.open_course(course_id)?;

    let mut session = PlaybackSession::new(ConsolePlayer::default(), ConsoleRenderer::default());
    let (tx, rx) = mpsc::channel(64);

    let (fed, driven) = tokio::join!(
        feed(script.to_path_buf(), course_id.to_string(), tx),
        drive(&mut session, &mut tracker, rx),
    );
    let summary = driven?;
    let skipped = fed?;

    println!(
        "Replayed {} steps ({} failed, {} unparsable)",
        summary.handled + summary.failed,
        summary.failed,
        skipped
    );
    println!(
        "{} is {:.2}% complete",
        course_id,
        tracker.completion_percentage(course_id)?
    );
    Ok(())
}
