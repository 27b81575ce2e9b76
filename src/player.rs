//! Player surface
//!
//! Playback is delegated to an external player process. A
//! [`PlaybackSession`] owns the player for as long as a stream is on screen
//! and releases it when dropped, however the screen is left.

use crate::config::PlayerSettings;
use crate::navigation::PlayRequest;
use std::io;
use std::process::{Child, Command, Stdio};
use thiserror::Error;

/// Errors that can occur while driving the player
#[derive(Debug, Error)]
pub enum PlayerError {
    /// The player executable could not be started
    #[error("Failed to start player '{command}': {source}")]
    SpawnFailed { command: String, source: io::Error },

    /// Waiting for the player failed
    #[error("Failed to wait for player: {0}")]
    WaitFailed(io::Error),

    /// The player exited unsuccessfully
    #[error("Player exited with status {0:?}")]
    Exited(Option<i32>),

    /// Nothing has been loaded
    #[error("No media loaded")]
    NotLoaded,
}

/// Opaque media playback capability.
pub trait Player {
    /// Starts playing `url` at `start_offset_ms`, replacing anything loaded.
    fn load(&mut self, url: &str, start_offset_ms: u64) -> Result<(), PlayerError>;

    /// Blocks until the viewer closes the loaded media.
    fn wait(&mut self) -> Result<(), PlayerError>;

    /// Stops playback and frees the player. Safe to call repeatedly.
    fn release(&mut self);
}

/// Player backed by an external executable such as `mpv`.
#[derive(Debug)]
pub struct ExternalPlayer {
    command: String,
    args: Vec<String>,
    start_arg: String,
    child: Option<Child>,
}

impl ExternalPlayer {
    pub fn new(settings: &PlayerSettings) -> Self {
        Self {
            command: settings.command.clone(),
            args: settings.args.clone(),
            start_arg: settings.start_arg.clone(),
            child: None,
        }
    }

    /// Arguments for one invocation: configured args, the seek argument when
    /// the offset is positive, then the URL.
    pub fn command_args(&self, url: &str, start_offset_ms: u64) -> Vec<String> {
        let mut args = self.args.clone();
        if start_offset_ms > 0 && !self.start_arg.is_empty() {
            let seconds = format!("{:.3}", start_offset_ms as f64 / 1000.0);
            args.push(self.start_arg.replace("{seconds}", &seconds));
        }
        args.push(url.to_string());
        args
    }

    pub fn is_running(&mut self) -> bool {
        self.child
            .as_mut()
            .is_some_and(|child| matches!(child.try_wait(), Ok(None)))
    }
}

impl Player for ExternalPlayer {
    fn load(&mut self, url: &str, start_offset_ms: u64) -> Result<(), PlayerError> {
        self.release();

        tracing::info!(command = %self.command, start_offset_ms, "starting player");
        let child = Command::new(&self.command)
            .args(self.command_args(url, start_offset_ms))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| PlayerError::SpawnFailed {
                command: self.command.clone(),
                source: e,
            })?;

        self.child = Some(child);
        Ok(())
    }

    fn wait(&mut self) -> Result<(), PlayerError> {
        let child = self.child.as_mut().ok_or(PlayerError::NotLoaded)?;
        let status = child.wait().map_err(PlayerError::WaitFailed)?;
        self.child = None;

        if status.success() {
            Ok(())
        } else {
            Err(PlayerError::Exited(status.code()))
        }
    }

    fn release(&mut self) {
        if let Some(mut child) = self.child.take() {
            if !matches!(child.try_wait(), Ok(Some(_))) {
                tracing::debug!(pid = child.id(), "stopping player");
                // Errors mean the process is already gone
                let _ = child.kill();
                let _ = child.wait();
            }
        }
    }
}

impl Drop for ExternalPlayer {
    fn drop(&mut self) {
        self.release();
    }
}

/// A stream on screen. Dropping the session releases the player.
pub struct PlaybackSession<'a, P: Player + ?Sized> {
    player: &'a mut P,
    request: PlayRequest,
}

impl<'a, P: Player + ?Sized> PlaybackSession<'a, P> {
    /// Loads `request` into `player`.
    pub fn start(player: &'a mut P, request: PlayRequest) -> Result<Self, PlayerError> {
        player.load(&request.url, request.start_offset_ms)?;
        Ok(Self { player, request })
    }

    pub fn request(&self) -> &PlayRequest {
        &self.request
    }

    /// Blocks until the viewer closes the stream.
    pub fn wait(&mut self) -> Result<(), PlayerError> {
        self.player.wait()
    }
}

impl<P: Player + ?Sized> Drop for PlaybackSession<'_, P> {
    fn drop(&mut self) {
        self.player.release();
        tracing::debug!("playback session released");
    }
}
