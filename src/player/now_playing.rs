// Now-playing sync - mirrors the session onto the OS media controls
// Remote buttons come back in as RemoteCommands and are turned into PlayerEvents

use super::controller::{PlaybackSession, PlayerState};
use super::events::PlayerEvent;
use crate::config::PlayerConfig;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceState {
    Playing,
    Paused,
}

/// Metadata shown by the platform media session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NowPlaying {
    pub title: String,
    pub artist: String,
    pub album: String,
    pub artwork: String,
    pub state: SurfaceState,
}

/// Buttons the platform can press on our behalf.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteCommand {
    Play,
    Pause,
    PreviousTrack,
    NextTrack,
}

/// The platform media session (lock screen, headset keys, ...).
pub trait NowPlayingSurface: Send {
    fn publish(&mut self, info: &NowPlaying);
    fn clear(&mut self);
    /// Remote commands are sent on `commands` from now on.
    fn register(&mut self, commands: UnboundedSender<RemoteCommand>);
}

/// Pushes session changes to a surface, skipping unchanged snapshots.
#[derive(Debug, Clone)]
pub struct NowPlayingSync {
    album: String,
    default_artwork: String,
    last: Option<NowPlaying>,
}

impl NowPlayingSync {
    pub fn new(config: &PlayerConfig) -> Self {
        Self {
            album: config.album_name.clone(),
            default_artwork: config.default_artwork.clone(),
            last: None,
        }
    }

    pub fn attach<S: NowPlayingSurface + ?Sized>(
        &self,
        surface: &mut S,
        commands: UnboundedSender<RemoteCommand>,
    ) {
        surface.register(commands);
    }

    /// What the surface should show for `session`; `None` when idle.
    pub fn snapshot(&self, session: &PlaybackSession) -> Option<NowPlaying> {
        let song = session.current()?;
        let state = match session.state() {
            PlayerState::Playing => SurfaceState::Playing,
            _ => SurfaceState::Paused,
        };

        Some(NowPlaying {
            title: song.display_title().to_string(),
            artist: song.display_artist().to_string(),
            album: self.album.clone(),
            artwork: song
                .cover_art_url
                .clone()
                .unwrap_or_else(|| self.default_artwork.clone()),
            state,
        })
    }

    pub fn observe<S: NowPlayingSurface + ?Sized>(
        &mut self,
        session: &PlaybackSession,
        surface: &mut S,
    ) {
        match self.snapshot(session) {
            Some(info) if self.last.as_ref() != Some(&info) => {
                debug!("Now playing: {} - {} ({:?})", info.artist, info.title, info.state);
                surface.publish(&info);
                self.last = Some(info);
            }
            Some(_) => {}
            None => {
                if self.last.take().is_some() {
                    surface.clear();
                }
            }
        }
    }

    pub fn translate(command: RemoteCommand, position: Duration) -> PlayerEvent {
        match command {
            RemoteCommand::Play => PlayerEvent::Resume,
            RemoteCommand::Pause => PlayerEvent::Pause,
            RemoteCommand::PreviousTrack => PlayerEvent::Previous { position },
            RemoteCommand::NextTrack => PlayerEvent::Next,
        }
    }
}
