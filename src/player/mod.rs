// Player module - playback queue, media session sync and background animation
// The controller is a pure state machine; the runtime feeds it and carries out its effects

pub mod controller;     // session state + transitions
pub mod events;         // what goes in, what comes out
pub mod now_playing;    // OS media controls
pub mod runtime;        // event loop around the controller
pub mod visualizer;     // rotating gradient

pub use controller::{derive_playlist, transition, Cursor, PlaybackController, PlaybackSession, PlayerState, RepeatMode};
pub use events::{Effect, PlayerEvent};
pub use now_playing::{NowPlaying, NowPlayingSurface, NowPlayingSync, RemoteCommand, SurfaceState};
pub use runtime::{AudioBackend, PlayerHandle, PlayerInput, PlayerRuntime};
pub use visualizer::{palette_for, CoverSampler, GradientFrame, NoSampler, Palette, Visualizer};
