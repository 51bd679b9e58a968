//! Audible cue played after each graded attempt.
//!
//! Playback is fire-and-forget: the cue runs on a detached thread, nothing
//! waits for it and a failure never reaches the user.

use crate::config::Config;
use std::io;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cue {
    Success,
    Failure,
}

impl Cue {
    pub fn for_accuracy(accuracy: f64) -> Self {
        if crate::streak::keeps_streak(accuracy) {
            Cue::Success
        } else {
            Cue::Failure
        }
    }
}

pub trait SoundPlayer: Send + Sync + 'static {
    fn play(&self, cue: Cue) -> io::Result<()>;
}

/// Plays nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct Silent;

impl SoundPlayer for Silent {
    fn play(&self, _cue: Cue) -> io::Result<()> {
        Ok(())
    }
}

/// Rings the terminal bell on success only.
///
/// The cue thread never touches the terminal itself: it raises a flag that
/// the render loop picks up with [`TerminalBell::take_pending`] and writes
/// through the same backend that draws the frames.
#[derive(Debug, Clone, Default)]
pub struct TerminalBell {
    pending: Arc<AtomicBool>,
}

impl TerminalBell {
    pub fn new() -> Self {
        Self::default()
    }

    /// True once for every ring requested since the last call
    pub fn take_pending(&self) -> bool {
        self.pending.swap(false, Ordering::AcqRel)
    }
}

impl SoundPlayer for TerminalBell {
    fn play(&self, cue: Cue) -> io::Result<()> {
        if cue == Cue::Success {
            self.pending.store(true, Ordering::Release);
        }
        Ok(())
    }
}

/// Hands a sound file to an external player program
#[derive(Debug, Clone)]
pub struct CommandPlayer {
    pub program: String,
    pub success_file: Option<PathBuf>,
    pub failure_file: Option<PathBuf>,
}

impl SoundPlayer for CommandPlayer {
    fn play(&self, cue: Cue) -> io::Result<()> {
        let file = match cue {
            Cue::Success => &self.success_file,
            Cue::Failure => &self.failure_file,
        };
        let Some(file) = file else {
            return Ok(());
        };

        let status = Command::new(&self.program)
            .arg(file)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()?;

        if status.success() {
            Ok(())
        } else {
            Err(io::Error::other(format!("{} exited with {status}", self.program)))
        }
    }
}

/// Build the player described by the configuration. `bell` is used when no
/// external player is configured.
pub fn player_from_config(cfg: &Config, bell: TerminalBell) -> Arc<dyn SoundPlayer> {
    if !cfg.sound {
        return Arc::new(Silent);
    }
    match &cfg.sound_command {
        Some(program) => Arc::new(CommandPlayer {
            program: program.clone(),
            success_file: cfg.success_sound.clone(),
            failure_file: cfg.failure_sound.clone(),
        }),
        None => Arc::new(bell),
    }
}

/// Play `cue` on a detached thread. Errors are logged at debug level and
/// otherwise dropped.
pub fn play_detached(player: Arc<dyn SoundPlayer>, cue: Cue) {
    let spawned = std::thread::Builder::new()
        .name("accutype-cue".into())
        .spawn(move || {
            if let Err(e) = player.play(cue) {
                tracing::debug!(?cue, error = %e, "sound cue failed");
            }
        });

    if let Err(e) = spawned {
        tracing::debug!(?cue, error = %e, "unable to spawn sound thread");
    }
}
