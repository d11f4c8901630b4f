// Player runtime - drives the controller from a single event loop
// Owns the catalog snapshot, the audio backend, the media session and the visualizer

use super::controller::{PlaybackController, PlaybackSession};
use super::events::{Effect, PlayerEvent};
use super::now_playing::{NowPlayingSurface, NowPlayingSync, RemoteCommand};
use super::visualizer::{palette_for, CoverSampler, GradientFrame, NoSampler, Visualizer};
use crate::catalog::Song;
use crate::config::PlayerConfig;
use anyhow::Result;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

/// Whatever actually produces sound.
pub trait AudioBackend: Send {
    fn load(&mut self, song: &Song) -> Result<()>;
    fn resume(&mut self) -> Result<()>;
    fn pause(&mut self) -> Result<()>;
    fn seek(&mut self, position: Duration) -> Result<()>;
    fn stop(&mut self) -> Result<()>;
    /// Playback position of the loaded song.
    fn position(&self) -> Duration;
    /// Hand a link-only song to the browser/OS.
    fn open_external(&mut self, url: &str) -> Result<()>;
}

#[derive(Debug, Clone)]
pub enum PlayerInput {
    Event(PlayerEvent),
    /// Previous, with the position read from the backend at handling time.
    Previous,
    /// New catalog snapshot after an upload or delete.
    SetCatalog(Vec<Song>),
    Shutdown,
}

/// Cheap, cloneable way to talk to a running [`PlayerRuntime`].
#[derive(Debug, Clone)]
pub struct PlayerHandle {
    inputs: mpsc::UnboundedSender<PlayerInput>,
}

impl PlayerHandle {
    /// Returns false once the runtime has stopped.
    pub fn send(&self, input: PlayerInput) -> bool {
        self.inputs.send(input).is_ok()
    }

    pub fn play(&self, song: Song) -> bool {
        self.send(PlayerInput::Event(PlayerEvent::Play(song)))
    }

    pub fn toggle(&self) -> bool {
        self.send(PlayerInput::Event(PlayerEvent::Toggle))
    }

    pub fn next(&self) -> bool {
        self.send(PlayerInput::Event(PlayerEvent::Next))
    }

    pub fn previous(&self) -> bool {
        self.send(PlayerInput::Previous)
    }

    pub fn track_ended(&self) -> bool {
        self.send(PlayerInput::Event(PlayerEvent::TrackEnded))
    }

    pub fn set_catalog(&self, songs: Vec<Song>) -> bool {
        self.send(PlayerInput::SetCatalog(songs))
    }

    pub fn shutdown(&self) -> bool {
        self.send(PlayerInput::Shutdown)
    }
}

pub struct PlayerRuntime<B: AudioBackend, S: NowPlayingSurface> {
    controller: PlaybackController,
    catalog: Vec<Song>,
    backend: B,
    surface: S,
    sync: NowPlayingSync,
    visualizer: Visualizer,
    sampler: Box<dyn CoverSampler>,
    inputs: mpsc::UnboundedReceiver<PlayerInput>,
    remote: mpsc::UnboundedReceiver<RemoteCommand>,
}

impl<B: AudioBackend, S: NowPlayingSurface> PlayerRuntime<B, S> {
    pub fn new(config: &PlayerConfig, catalog: Vec<Song>, backend: B, mut surface: S) -> (Self, PlayerHandle) {
        let (input_tx, inputs) = mpsc::unbounded_channel();
        let (remote_tx, remote) = mpsc::unbounded_channel();

        let sync = NowPlayingSync::new(config);
        sync.attach(&mut surface, remote_tx);

        let runtime = Self {
            controller: PlaybackController::new(config.restart_threshold()),
            catalog,
            backend,
            surface,
            sync,
            visualizer: Visualizer::new(config.frame_interval()),
            sampler: Box::new(NoSampler),
            inputs,
            remote,
        };
        (runtime, PlayerHandle { inputs: input_tx })
    }

    pub fn with_sampler(mut self, sampler: impl CoverSampler + 'static) -> Self {
        self.sampler = Box::new(sampler);
        self
    }

    pub fn session(&self) -> &PlaybackSession {
        self.controller.session()
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn frames(&self) -> watch::Receiver<Option<GradientFrame>> {
        self.visualizer.subscribe()
    }

    /// Run one event to completion: transition, side effects, media session.
    pub fn apply(&mut self, event: PlayerEvent) {
        let effects = self.controller.handle(event, &self.catalog);
        for effect in effects {
            self.perform(effect);
        }
        self.sync.observe(self.controller.session(), &mut self.surface);
    }

    /// Process inputs until `Shutdown` or every handle is dropped.
    pub async fn run(mut self) {
        info!("Player runtime started with {} songs", self.catalog.len());

        loop {
            tokio::select! {
                input = self.inputs.recv() => match input {
                    Some(PlayerInput::Shutdown) | None => break,
                    Some(input) => self.process(input),
                },
                Some(command) = self.remote.recv() => {
                    debug!("Remote command {:?}", command);
                    let event = NowPlayingSync::translate(command, self.backend.position());
                    self.apply(event);
                }
            }
        }

        self.visualizer.stop();
        if let Err(e) = self.backend.stop() {
            warn!("Audio backend failed to stop: {}", e);
        }
        self.surface.clear();
        info!("Player runtime stopped");
    }

    fn process(&mut self, input: PlayerInput) {
        match input {
            PlayerInput::Event(event) => self.apply(event),
            PlayerInput::Previous => {
                let position = self.backend.position();
                self.apply(PlayerEvent::Previous { position });
            }
            PlayerInput::SetCatalog(songs) => {
                self.catalog = songs;
                self.apply(PlayerEvent::CatalogChanged);
            }
            PlayerInput::Shutdown => {}
        }
    }

    fn perform(&mut self, effect: Effect) {
        let result = match effect {
            Effect::Load { song } => {
                info!("Playing '{}' by {}", song.display_title(), song.display_artist());
                self.backend.load(&song)
            }
            Effect::Resume => self.backend.resume(),
            Effect::Pause => self.backend.pause(),
            Effect::Seek(position) => self.backend.seek(position),
            Effect::Stop => self.backend.stop(),
            Effect::OpenExternal { url } => self.backend.open_external(&url),
            Effect::StartVisualizer { cover } => {
                let palette = palette_for(self.sampler.as_ref(), cover.as_deref());
                self.visualizer.start(palette);
                Ok(())
            }
            Effect::StopVisualizer => {
                self.visualizer.stop();
                Ok(())
            }
        };

        if let Err(e) = result {
            warn!("Audio backend error: {:#}", e);
        }
    }
}
