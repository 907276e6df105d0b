//! Stand-in collaborators for headless use.
//!
//! They log every command instead of rendering anything. The CLI uses them
//! to replay recorded playback sessions.

use std::path::{Path, PathBuf};

use super::{DocumentRenderer, Player};

/// Player that logs commands and remembers its state
#[derive(Debug, Default)]
pub struct ConsolePlayer {
    /// Currently loaded source
    pub source: Option<PathBuf>,

    pub playing: bool,

    /// Last seek target (ms)
    pub position_ms: u64,
}

impl Player for ConsolePlayer {
    fn set_source(&mut self, path: &Path) {
        tracing::info!("player: load {}", path.display());
        self.source = Some(path.to_path_buf());
        self.playing = false;
        self.position_ms = 0;
    }

    fn play(&mut self) {
        tracing::info!("player: play");
        self.playing = true;
    }

    fn pause(&mut self) {
        tracing::info!("player: pause");
        self.playing = false;
    }

    fn seek(&mut self, position_ms: u64) {
        tracing::info!("player: seek to {} ms", position_ms);
        self.position_ms = position_ms;
    }
}

/// Document renderer that only logs what it would show
#[derive(Debug, Default)]
pub struct ConsoleRenderer {
    pub current: Option<PathBuf>,
}

impl DocumentRenderer for ConsoleRenderer {
    fn load(&mut self, path: &Path) {
        tracing::info!("document: load {}", path.display());
        self.current = Some(path.to_path_buf());
    }
}
