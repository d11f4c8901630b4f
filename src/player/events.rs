use crate::catalog::Song;
use std::time::Duration;

/// Everything the playback controller reacts to.
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerEvent {
    // Transport
    Play(Song),
    Toggle,
    Resume,
    Pause,
    Next,
    Previous { position: Duration },

    // Fired by the audio element when the track runs out
    TrackEnded,

    // Modes
    SetShuffle(bool),
    CycleRepeat,

    // Catalog snapshot was replaced (upload/delete elsewhere)
    CatalogChanged,

    // Player view
    ViewOpened,
    ViewClosed,
}

/// What the controller asks the outside world to do after a transition.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Point the audio element at this song and start it.
    Load { song: Song },
    Resume,
    Pause,
    Seek(Duration),
    Stop,
    /// Link-only songs are handed to the browser/OS instead.
    OpenExternal { url: String },
    /// (Re)start the background animation; `None` means the default palette.
    StartVisualizer { cover: Option<String> },
    StopVisualizer,
}
