//! Bell and music playback
//!
//! The engine never plays audio itself. It emits bell cues, and the sound cue
//! task turns those (and status changes) into calls on a [`SoundNotifier`].
//! [`SoundService`] is the production notifier: it keeps the music settings
//! and hands actual playback to an [`AudioPlayer`], either external player
//! commands or a silent logger.

use std::process::Stdio;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::{
    process::{Child, Command},
    sync::watch,
};
use tracing::{debug, info, warn};

use crate::error::SoundError;

/// Receiver of the engine's audible side effects
pub trait SoundNotifier: Send + Sync {
    fn play_bell(&self) -> Result<(), SoundError>;
    fn play_music(&self) -> Result<(), SoundError>;
    fn pause_music(&self) -> Result<(), SoundError>;
    fn stop_music(&self) -> Result<(), SoundError>;
}

/// Low-level playback backend used by [`SoundService`]
pub trait AudioPlayer: Send + Sync {
    fn ring_bell(&self) -> Result<(), SoundError>;
    /// Start `url`, or resume it if it is the suspended track
    fn start_track(&self, url: &str) -> Result<(), SoundError>;
    fn suspend_track(&self) -> Result<(), SoundError>;
    fn halt_track(&self) -> Result<(), SoundError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MusicSource {
    #[default]
    Local,
    /// Played by an embedded video client; only the playing flag is tracked here
    Youtube,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MusicState {
    pub enabled: bool,
    pub source: MusicSource,
    pub url: String,
    pub is_playing: bool,
}

/// Partial music settings update
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MusicPatch {
    #[serde(default)]
    pub enabled: Option<bool>,
    #[serde(default)]
    pub source: Option<MusicSource>,
    #[serde(default)]
    pub url: Option<String>,
}

/// Music settings plus a playback backend
pub struct SoundService {
    player: Box<dyn AudioPlayer>,
    music: watch::Sender<MusicState>,
}

impl std::fmt::Debug for SoundService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SoundService")
            .field("music", &*self.music.borrow())
            .finish_non_exhaustive()
    }
}

impl SoundService {
    pub fn new(player: Box<dyn AudioPlayer>) -> Self {
        let (music, _) = watch::channel(MusicState::default());
        Self { player, music }
    }

    /// Service that only logs cues
    pub fn silent() -> Self {
        Self::new(Box::new(SilentPlayer))
    }

    pub fn music_state(&self) -> MusicState {
        self.music.borrow().clone()
    }

    /// Watch music state changes
    pub fn subscribe_music(&self) -> watch::Receiver<MusicState> {
        self.music.subscribe()
    }

    /// Enable or disable music; disabling stops anything playing
    pub fn toggle_music(&self, enabled: bool) {
        if !enabled && self.music_state().is_playing {
            self.stop_quietly();
        }
        self.music.send_if_modified(|state| {
            let changed = state.enabled != enabled;
            state.enabled = enabled;
            changed
        });
    }

    /// Switch the music source; switching while playing stops playback
    pub fn set_music_source(&self, source: MusicSource) {
        let current = self.music_state();
        if current.source != source && current.is_playing {
            self.stop_quietly();
        }
        self.music.send_if_modified(|state| {
            let changed = state.source != source;
            state.source = source;
            changed
        });
    }

    /// Change the track; changing it while playing stops playback
    pub fn set_music_url(&self, url: &str) {
        let current = self.music_state();
        if current.url != url && current.is_playing {
            self.stop_quietly();
        }
        self.music.send_if_modified(|state| {
            let changed = state.url != url;
            state.url = url.to_string();
            changed
        });
    }

    /// Apply every field present in `patch`
    pub fn update_music(&self, patch: &MusicPatch) -> MusicState {
        if let Some(source) = patch.source {
            self.set_music_source(source);
        }
        if let Some(url) = &patch.url {
            self.set_music_url(url);
        }
        if let Some(enabled) = patch.enabled {
            self.toggle_music(enabled);
        }
        self.music_state()
    }

    fn stop_quietly(&self) {
        if let Err(e) = self.stop_music() {
            warn!("Failed to stop music: {}", e);
        }
    }

    fn set_playing(&self, playing: bool) {
        self.music.send_if_modified(|state| {
            let changed = state.is_playing != playing;
            state.is_playing = playing;
            changed
        });
    }
}

impl SoundNotifier for SoundService {
    fn play_bell(&self) -> Result<(), SoundError> {
        self.player.ring_bell()
    }

    fn play_music(&self) -> Result<(), SoundError> {
        let state = self.music_state();
        if !state.enabled || state.url.is_empty() {
            return Ok(());
        }

        if state.source == MusicSource::Local {
            self.player.start_track(&state.url)?;
        }
        self.set_playing(true);
        info!("Playing music from {:?}: {}", state.source, state.url);
        Ok(())
    }

    fn pause_music(&self) -> Result<(), SoundError> {
        let state = self.music_state();
        if !state.enabled || !state.is_playing {
            return Ok(());
        }

        if state.source == MusicSource::Local {
            self.player.suspend_track()?;
        }
        self.set_playing(false);
        info!("Music paused");
        Ok(())
    }

    fn stop_music(&self) -> Result<(), SoundError> {
        let state = self.music_state();
        if state.source == MusicSource::Local {
            self.player.halt_track()?;
        }
        self.set_playing(false);
        debug!("Music stopped");
        Ok(())
    }
}

/// Player that only logs what it would have played
#[derive(Debug, Default)]
pub struct SilentPlayer;

impl AudioPlayer for SilentPlayer {
    fn ring_bell(&self) -> Result<(), SoundError> {
        info!("Bell");
        Ok(())
    }

    fn start_track(&self, url: &str) -> Result<(), SoundError> {
        debug!("Would play {}", url);
        Ok(())
    }

    fn suspend_track(&self) -> Result<(), SoundError> {
        Ok(())
    }

    fn halt_track(&self) -> Result<(), SoundError> {
        Ok(())
    }
}

struct Track {
    url: String,
    child: Child,
    suspended: bool,
}

/// Player that shells out to external commands.
///
/// The bell command runs to completion in the background for every cue. The
/// music command is started with the track appended (or substituted for a
/// `{url}` placeholder) and is suspended and resumed with `kill -STOP/-CONT`.
pub struct CommandPlayer {
    bell: Vec<String>,
    music: Option<Vec<String>>,
    track: Mutex<Option<Track>>,
}

impl CommandPlayer {
    /// Build from whitespace-separated command lines
    pub fn new(bell_command: &str, music_command: Option<&str>) -> Result<Self, SoundError> {
        let bell = split_command(bell_command)?;
        let music = music_command.map(split_command).transpose()?;
        Ok(Self {
            bell,
            music,
            track: Mutex::new(None),
        })
    }

    fn signal_track(&self, signal: &str) -> Result<(), SoundError> {
        let track = self.track.lock();
        let Some(pid) = track.as_ref().and_then(|t| t.child.id()) else {
            return Ok(());
        };
        let args = vec![
            "kill".to_string(),
            format!("-{}", signal),
            pid.to_string(),
        ];
        let child = spawn(&args)?;
        tokio::spawn(reap(child, "kill"));
        Ok(())
    }
}

impl AudioPlayer for CommandPlayer {
    fn ring_bell(&self) -> Result<(), SoundError> {
        let child = spawn(&self.bell)?;
        tokio::spawn(reap(child, "bell"));
        Ok(())
    }

    fn start_track(&self, url: &str) -> Result<(), SoundError> {
        let Some(template) = &self.music else {
            debug!("No music command configured, skipping {}", url);
            return Ok(());
        };

        {
            let mut track = self.track.lock();
            if let Some(current) = track.as_mut() {
                if current.url == url && current.suspended {
                    current.suspended = false;
                    drop(track);
                    return self.signal_track("CONT");
                }
                let _ = current.child.start_kill();
            }
            *track = None;
        }

        let child = spawn(&with_url(template, url))?;
        *self.track.lock() = Some(Track {
            url: url.to_string(),
            child,
            suspended: false,
        });
        Ok(())
    }

    fn suspend_track(&self) -> Result<(), SoundError> {
        {
            let mut track = self.track.lock();
            match track.as_mut() {
                Some(current) if !current.suspended => current.suspended = true,
                _ => return Ok(()),
            }
        }
        self.signal_track("STOP")
    }

    fn halt_track(&self) -> Result<(), SoundError> {
        if let Some(mut track) = self.track.lock().take() {
            track
                .child
                .start_kill()
                .map_err(|e| SoundError::PlayerFailed(format!("failed to kill music player: {}", e)))?;
        }
        Ok(())
    }
}

fn split_command(line: &str) -> Result<Vec<String>, SoundError> {
    let parts: Vec<String> = line.split_whitespace().map(str::to_string).collect();
    if parts.is_empty() {
        return Err(SoundError::EmptyCommand);
    }
    Ok(parts)
}

fn with_url(template: &[String], url: &str) -> Vec<String> {
    if template.iter().any(|arg| arg.contains("{url}")) {
        template.iter().map(|arg| arg.replace("{url}", url)).collect()
    } else {
        let mut args = template.to_vec();
        args.push(url.to_string());
        args
    }
}

fn spawn(args: &[String]) -> Result<Child, SoundError> {
    let (program, rest) = args.split_first().ok_or(SoundError::EmptyCommand)?;
    Command::new(program)
        .args(rest)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .kill_on_drop(true)
        .spawn()
        .map_err(|source| SoundError::Spawn {
            command: program.clone(),
            source,
        })
}

async fn reap(mut child: Child, what: &'static str) {
    match child.wait().await {
        Ok(status) if status.success() => {}
        Ok(status) => warn!("{} player exited with {}", what, status),
        Err(e) => warn!("Failed to wait for {} player: {}", what, e),
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    /// Records backend calls for assertions
    #[derive(Debug, Default)]
    pub struct RecordingPlayer {
        pub calls: Mutex<Vec<String>>,
    }

    impl RecordingPlayer {
        pub fn take(&self) -> Vec<String> {
            std::mem::take(&mut *self.calls.lock())
        }
    }

    impl AudioPlayer for std::sync::Arc<RecordingPlayer> {
        fn ring_bell(&self) -> Result<(), SoundError> {
            self.calls.lock().push("bell".to_string());
            Ok(())
        }

        fn start_track(&self, url: &str) -> Result<(), SoundError> {
            self.calls.lock().push(format!("start {}", url));
            Ok(())
        }

        fn suspend_track(&self) -> Result<(), SoundError> {
            self.calls.lock().push("suspend".to_string());
            Ok(())
        }

        fn halt_track(&self) -> Result<(), SoundError> {
            self.calls.lock().push("halt".to_string());
            Ok(())
        }
    }
}
