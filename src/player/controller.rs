use super::events::{Effect, PlayerEvent};
use crate::catalog::{Owner, Song};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepeatMode {
    #[default]
    Off,
    All,
    One,
}

impl RepeatMode {
    /// off -> all -> one -> off
    pub fn cycle(self) -> Self {
        match self {
            RepeatMode::Off => RepeatMode::All,
            RepeatMode::All => RepeatMode::One,
            RepeatMode::One => RepeatMode::Off,
        }
    }
}

/// Where the current song sits in the playlist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cursor {
    At(usize),
    /// The current song was deleted from the catalog while loaded. It keeps
    /// playing; `next` is the index of the song that used to follow it.
    Removed { next: Option<usize> },
}

impl Default for Cursor {
    fn default() -> Self {
        Cursor::At(0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerState {
    Idle,
    Playing,
    Paused,
}

/// Ephemeral playback state. Never persisted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlaybackSession {
    current: Option<Song>,
    playlist: Vec<Song>,
    cursor: Cursor,
    shuffle: bool,
    repeat: RepeatMode,
    playing: bool,
}

impl PlaybackSession {
    pub fn current(&self) -> Option<&Song> {
        self.current.as_ref()
    }

    pub fn playlist(&self) -> &[Song] {
        &self.playlist
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    /// Index of the current song, if it is still part of the playlist.
    pub fn index(&self) -> Option<usize> {
        match (self.current.is_some(), self.cursor) {
            (true, Cursor::At(i)) => Some(i),
            _ => None,
        }
    }

    pub fn shuffle(&self) -> bool {
        self.shuffle
    }

    pub fn repeat(&self) -> RepeatMode {
        self.repeat
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn state(&self) -> PlayerState {
        match (&self.current, self.playing) {
            (None, _) => PlayerState::Idle,
            (Some(_), true) => PlayerState::Playing,
            (Some(_), false) => PlayerState::Paused,
        }
    }

    fn play(&mut self, song: Song, catalog: &[Song], effects: &mut Vec<Effect>) {
        if !song.is_playable() {
            if let Some(url) = song.url {
                debug!("'{}' is link-only, handing off {}", song.title, url);
                effects.push(Effect::OpenExternal { url });
            }
            return;
        }

        let playlist = derive_playlist(catalog, song.owner);
        let Some(index) = playlist.iter().position(|s| s.id == song.id) else {
            debug!("'{}' is not in the catalog, ignoring play", song.title);
            return;
        };

        self.playlist = playlist;
        self.start_at(index, effects);
    }

    fn start_at(&mut self, index: usize, effects: &mut Vec<Effect>) {
        let song = self.playlist[index].clone();
        self.cursor = Cursor::At(index);
        self.playing = true;

        effects.push(Effect::Load { song: song.clone() });
        effects.push(Effect::StartVisualizer {
            cover: song.cover_art_url.clone(),
        });
        self.current = Some(song);
    }

    /// Re-derive the playlist from the catalog. Returns false when there is
    /// nothing left to navigate (the session is idle afterwards).
    fn refresh(&mut self, catalog: &[Song], effects: &mut Vec<Effect>) -> bool {
        let Some((current_id, owner)) = self.current.as_ref().map(|s| (s.id, s.owner)) else {
            return false;
        };

        let playlist = derive_playlist(catalog, owner);
        if playlist.is_empty() {
            debug!("Playlist for {} is empty, going idle", owner);
            *self = PlaybackSession {
                shuffle: self.shuffle,
                repeat: self.repeat,
                ..PlaybackSession::default()
            };
            effects.push(Effect::Stop);
            effects.push(Effect::StopVisualizer);
            return false;
        }

        let cursor = match playlist.iter().position(|s| s.id == current_id) {
            Some(i) => Cursor::At(i),
            None => {
                // first surviving song after the current one in the old order
                let start = match self.cursor {
                    Cursor::At(i) => i + 1,
                    Cursor::Removed { next: Some(i) } => i,
                    Cursor::Removed { next: None } => self.playlist.len(),
                };
                let next = self
                    .playlist
                    .iter()
                    .skip(start)
                    .find_map(|old| playlist.iter().position(|s| s.id == old.id));
                Cursor::Removed { next }
            }
        };

        self.playlist = playlist;
        self.cursor = cursor;
        true
    }

    fn next<R: Rng + ?Sized>(&mut self, catalog: &[Song], rng: &mut R, effects: &mut Vec<Effect>) {
        if !self.refresh(catalog, effects) {
            return;
        }

        let len = self.playlist.len();
        let index = if self.shuffle {
            // may pick the current song again
            rng.gen_range(0..len)
        } else {
            match self.cursor {
                Cursor::At(i) => (i + 1) % len,
                Cursor::Removed { next: Some(i) } => i,
                Cursor::Removed { next: None } => 0,
            }
        };
        self.start_at(index, effects);
    }

    fn previous(
        &mut self,
        position: Duration,
        restart_threshold: Duration,
        catalog: &[Song],
        effects: &mut Vec<Effect>,
    ) {
        if self.current.is_none() {
            return;
        }
        if position > restart_threshold {
            effects.push(Effect::Seek(Duration::ZERO));
            return;
        }
        if !self.refresh(catalog, effects) {
            return;
        }

        let len = self.playlist.len();
        let index = match self.cursor {
            Cursor::At(i) | Cursor::Removed { next: Some(i) } => (i + len - 1) % len,
            Cursor::Removed { next: None } => len - 1,
        };
        self.start_at(index, effects);
    }

    fn track_ended<R: Rng + ?Sized>(&mut self, catalog: &[Song], rng: &mut R, effects: &mut Vec<Effect>) {
        if self.current.is_none() {
            return;
        }
        if self.repeat == RepeatMode::One {
            self.playing = true;
            effects.push(Effect::Seek(Duration::ZERO));
            effects.push(Effect::Resume);
            return;
        }
        if !self.refresh(catalog, effects) {
            return;
        }

        let has_follower = match self.cursor {
            Cursor::At(i) => i + 1 < self.playlist.len(),
            Cursor::Removed { next } => next.is_some(),
        };
        if self.repeat == RepeatMode::All || has_follower {
            self.next(catalog, rng, effects);
        } else {
            // stay on the last song, paused at its end
            self.playing = false;
        }
    }
}

/// Playable songs of one owner, in catalog order.
pub fn derive_playlist(catalog: &[Song], owner: Owner) -> Vec<Song> {
    catalog
        .iter()
        .filter(|song| song.owner == owner && song.is_playable())
        .cloned()
        .collect()
}

/// The whole state machine: `(session, event) -> (session, effects)`.
///
/// Pure apart from the injected randomness used by shuffle.
pub fn transition<R: Rng + ?Sized>(
    mut session: PlaybackSession,
    event: PlayerEvent,
    catalog: &[Song],
    restart_threshold: Duration,
    rng: &mut R,
) -> (PlaybackSession, Vec<Effect>) {
    let mut effects = Vec::new();

    match event {
        PlayerEvent::Play(song) => session.play(song, catalog, &mut effects),
        PlayerEvent::Toggle => {
            if session.current.is_some() {
                session.playing = !session.playing;
                effects.push(if session.playing {
                    Effect::Resume
                } else {
                    Effect::Pause
                });
            }
        }
        PlayerEvent::Resume => {
            if session.current.is_some() && !session.playing {
                session.playing = true;
                effects.push(Effect::Resume);
            }
        }
        PlayerEvent::Pause => {
            if session.current.is_some() && session.playing {
                session.playing = false;
                effects.push(Effect::Pause);
            }
        }
        PlayerEvent::Next => session.next(catalog, rng, &mut effects),
        PlayerEvent::Previous { position } => {
            session.previous(position, restart_threshold, catalog, &mut effects)
        }
        PlayerEvent::TrackEnded => session.track_ended(catalog, rng, &mut effects),
        PlayerEvent::SetShuffle(on) => session.shuffle = on,
        PlayerEvent::CycleRepeat => session.repeat = session.repeat.cycle(),
        PlayerEvent::CatalogChanged => {
            session.refresh(catalog, &mut effects);
        }
        PlayerEvent::ViewOpened => {
            if let Some(song) = &session.current {
                effects.push(Effect::StartVisualizer {
                    cover: song.cover_art_url.clone(),
                });
            }
        }
        PlayerEvent::ViewClosed => effects.push(Effect::StopVisualizer),
    }

    (session, effects)
}

/// Owns a session and the randomness behind shuffle.
pub struct PlaybackController<R = StdRng> {
    session: PlaybackSession,
    restart_threshold: Duration,
    rng: R,
}

impl PlaybackController<StdRng> {
    pub fn new(restart_threshold: Duration) -> Self {
        Self::with_rng(restart_threshold, StdRng::from_entropy())
    }
}

impl<R: Rng> PlaybackController<R> {
    pub fn with_rng(restart_threshold: Duration, rng: R) -> Self {
        Self {
            session: PlaybackSession::default(),
            restart_threshold,
            rng,
        }
    }

    pub fn session(&self) -> &PlaybackSession {
        &self.session
    }

    pub fn handle(&mut self, event: PlayerEvent, catalog: &[Song]) -> Vec<Effect> {
        let session = std::mem::take(&mut self.session);
        let (session, effects) =
            transition(session, event, catalog, self.restart_threshold, &mut self.rng);
        debug!(
            "Player now {:?} on {:?} ({} effects)",
            session.state(),
            session.current().map(|s| s.title.as_str()),
            effects.len()
        );
        self.session = session;
        effects
    }

    pub fn play(&mut self, song: Song, catalog: &[Song]) -> Vec<Effect> {
        self.handle(PlayerEvent::Play(song), catalog)
    }

    pub fn toggle(&mut self, catalog: &[Song]) -> Vec<Effect> {
        self.handle(PlayerEvent::Toggle, catalog)
    }

    pub fn next(&mut self, catalog: &[Song]) -> Vec<Effect> {
        self.handle(PlayerEvent::Next, catalog)
    }

    pub fn previous(&mut self, position: Duration, catalog: &[Song]) -> Vec<Effect> {
        self.handle(PlayerEvent::Previous { position }, catalog)
    }

    pub fn on_track_end(&mut self, catalog: &[Song]) -> Vec<Effect> {
        self.handle(PlayerEvent::TrackEnded, catalog)
    }

    pub fn set_shuffle(&mut self, on: bool, catalog: &[Song]) -> Vec<Effect> {
        self.handle(PlayerEvent::SetShuffle(on), catalog)
    }

    pub fn cycle_repeat(&mut self, catalog: &[Song]) -> Vec<Effect> {
        self.handle(PlayerEvent::CycleRepeat, catalog)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn song(title: &str, owner: Owner, playable: bool) -> Song {
        Song {
            id: Uuid::new_v4(),
            title: title.to_string(),
            artist: String::new(),
            owner,
            url: (!playable).then(|| format!("https://example.com/{}", title)),
            file_url: playable.then(|| format!("/uploads/music/{}.mp3", title)),
            cover_art_url: None,
            created_at: Utc::now(),
        }
    }

    fn controller() -> PlaybackController<StdRng> {
        PlaybackController::with_rng(Duration::from_secs(3), StdRng::seed_from_u64(7))
    }

    fn titles(session: &PlaybackSession) -> Vec<&str> {
        session.playlist().iter().map(|s| s.title.as_str()).collect()
    }

    fn current_title(player: &PlaybackController<StdRng>) -> &str {
        player.session().current().map(|s| s.title.as_str()).unwrap_or("")
    }

    /// A (playable), B (link-only), C (playable), all Tuyen's.
    fn abc() -> Vec<Song> {
        vec![
            song("A", Owner::Tuyen, true),
            song("B", Owner::Tuyen, false),
            song("C", Owner::Tuyen, true),
        ]
    }

    #[test]
    fn test_playlist_skips_link_only_and_wraps() {
        let catalog = abc();
        let mut player = controller();

        let effects = player.play(catalog[0].clone(), &catalog);
        assert_eq!(titles(player.session()), ["A", "C"]);
        assert_eq!(player.session().index(), Some(0));
        assert_eq!(player.session().state(), PlayerState::Playing);
        assert!(matches!(&effects[0], Effect::Load { song } if song.title == "A"));
        assert_eq!(effects[1], Effect::StartVisualizer { cover: None });

        player.next(&catalog);
        assert_eq!(current_title(&player), "C");
        assert_eq!(player.session().index(), Some(1));

        player.next(&catalog);
        assert_eq!(current_title(&player), "A");
        assert_eq!(player.session().index(), Some(0));
    }

    #[test]
    fn test_playlist_only_has_owners_songs() {
        let catalog = vec![
            song("A", Owner::Tuyen, true),
            song("X", Owner::Trang, true),
            song("C", Owner::Tuyen, true),
        ];
        let mut player = controller();
        player.play(catalog[1].clone(), &catalog);
        assert_eq!(titles(player.session()), ["X"]);
    }

    #[test]
    fn test_link_only_play_leaves_state_alone() {
        let catalog = abc();
        let mut player = controller();

        let effects = player.play(catalog[1].clone(), &catalog);
        assert_eq!(player.session(), &PlaybackSession::default());
        assert_eq!(
            effects,
            vec![Effect::OpenExternal {
                url: "https://example.com/B".to_string()
            }]
        );

        player.play(catalog[0].clone(), &catalog);
        let before = player.session().clone();
        player.play(catalog[1].clone(), &catalog);
        assert_eq!(player.session(), &before);
    }

    #[test]
    fn test_song_missing_from_catalog_is_ignored() {
        let catalog = abc();
        let mut player = controller();
        let stranger = song("Z", Owner::Tuyen, true);

        assert!(player.play(stranger, &catalog).is_empty());
        assert_eq!(player.session().state(), PlayerState::Idle);
    }

    #[test]
    fn test_toggle_only_when_loaded() {
        let catalog = abc();
        let mut player = controller();
        assert!(player.toggle(&catalog).is_empty());
        assert_eq!(player.session().state(), PlayerState::Idle);

        player.play(catalog[0].clone(), &catalog);
        assert_eq!(player.toggle(&catalog), vec![Effect::Pause]);
        assert_eq!(player.session().state(), PlayerState::Paused);
        assert_eq!(player.toggle(&catalog), vec![Effect::Resume]);
        assert_eq!(player.session().state(), PlayerState::Playing);
    }

    #[test]
    fn test_resume_and_pause_are_not_toggles() {
        let catalog = abc();
        let mut player = controller();
        player.play(catalog[0].clone(), &catalog);

        assert!(player.handle(PlayerEvent::Resume, &catalog).is_empty());
        assert_eq!(player.handle(PlayerEvent::Pause, &catalog), vec![Effect::Pause]);
        assert!(player.handle(PlayerEvent::Pause, &catalog).is_empty());
        assert!(!player.session().is_playing());
    }

    #[test]
    fn test_repeat_one_restarts_same_song() {
        let catalog = abc();
        let mut player = controller();
        player.play(catalog[0].clone(), &catalog);
        player.cycle_repeat(&catalog);
        player.cycle_repeat(&catalog);
        assert_eq!(player.session().repeat(), RepeatMode::One);

        let effects = player.on_track_end(&catalog);
        assert_eq!(effects, vec![Effect::Seek(Duration::ZERO), Effect::Resume]);
        assert_eq!(player.session().current().unwrap().id, catalog[0].id);
        assert!(player.session().is_playing());
    }

    #[test]
    fn test_repeat_off_stops_at_last_song() {
        let catalog = abc();
        let mut player = controller();
        player.play(catalog[2].clone(), &catalog);

        let effects = player.on_track_end(&catalog);
        assert!(effects.is_empty());
        assert!(!player.session().is_playing());
        assert_eq!(player.session().state(), PlayerState::Paused);
        assert_eq!(player.session().current().unwrap().id, catalog[2].id);
    }

    #[test]
    fn test_track_end_advances_or_wraps() {
        let catalog = abc();
        let mut player = controller();
        player.play(catalog[0].clone(), &catalog);

        player.on_track_end(&catalog);
        assert_eq!(current_title(&player), "C");

        player.cycle_repeat(&catalog);
        assert_eq!(player.session().repeat(), RepeatMode::All);
        player.on_track_end(&catalog);
        assert_eq!(current_title(&player), "A");
        assert!(player.session().is_playing());
    }

    #[test]
    fn test_previous_restarts_after_threshold() {
        let catalog = abc();
        let mut player = controller();
        player.play(catalog[2].clone(), &catalog);

        let effects = player.previous(Duration::from_secs(5), &catalog);
        assert_eq!(effects, vec![Effect::Seek(Duration::ZERO)]);
        assert_eq!(current_title(&player), "C");

        player.previous(Duration::from_secs(1), &catalog);
        assert_eq!(current_title(&player), "A");

        // and wraps backwards
        player.previous(Duration::ZERO, &catalog);
        assert_eq!(current_title(&player), "C");
    }

    #[test]
    fn test_shuffle_stays_in_playlist() {
        let catalog: Vec<Song> = (0..6)
            .map(|i| song(&format!("S{}", i), Owner::Trang, i % 3 != 0))
            .collect();
        let mut player = controller();
        player.play(catalog[1].clone(), &catalog);
        player.set_shuffle(true, &catalog);
        assert!(player.session().shuffle());

        for _ in 0..50 {
            player.next(&catalog);
            let current = player.session().current().unwrap();
            assert!(current.is_playable());
            let index = player.session().index().unwrap();
            assert!(index < player.session().playlist().len());
            assert_eq!(player.session().playlist()[index].id, current.id);
        }
    }

    #[test]
    fn test_mode_changes_have_no_side_effects() {
        let catalog = abc();
        let mut player = controller();
        player.play(catalog[0].clone(), &catalog);

        assert!(player.set_shuffle(true, &catalog).is_empty());
        assert!(player.cycle_repeat(&catalog).is_empty());
        assert_eq!(current_title(&player), "A");
        assert_eq!(RepeatMode::One.cycle(), RepeatMode::Off);
    }

    #[test]
    fn test_removed_song_keeps_playing_then_moves_to_follower() {
        let mut catalog = vec![
            song("A", Owner::Tuyen, true),
            song("C", Owner::Tuyen, true),
            song("D", Owner::Tuyen, true),
        ];
        let mut player = controller();
        player.play(catalog[1].clone(), &catalog);

        catalog.remove(1);
        let effects = player.handle(PlayerEvent::CatalogChanged, &catalog);
        assert!(effects.is_empty());
        assert_eq!(current_title(&player), "C");
        assert!(player.session().is_playing());
        assert_eq!(player.session().index(), None);
        assert_eq!(player.session().cursor(), Cursor::Removed { next: Some(1) });
        assert_eq!(titles(player.session()), ["A", "D"]);

        player.next(&catalog);
        assert_eq!(current_title(&player), "D");
        assert_eq!(player.session().index(), Some(1));
    }

    #[test]
    fn test_removed_last_song_ends_without_wrapping() {
        let mut catalog = vec![song("A", Owner::Tuyen, true), song("C", Owner::Tuyen, true)];
        let mut player = controller();
        player.play(catalog[1].clone(), &catalog);
        catalog.pop();

        // no CatalogChanged in between: track end recomputes by itself
        player.on_track_end(&catalog);
        assert_eq!(current_title(&player), "C");
        assert!(!player.session().is_playing());

        player.previous(Duration::ZERO, &catalog);
        assert_eq!(current_title(&player), "A");
    }

    #[test]
    fn test_emptied_playlist_goes_idle() {
        let catalog = vec![song("A", Owner::Tuyen, true)];
        let mut player = controller();
        player.play(catalog[0].clone(), &catalog);
        player.set_shuffle(true, &catalog);

        let effects = player.next(&[]);
        assert_eq!(effects, vec![Effect::Stop, Effect::StopVisualizer]);
        assert_eq!(player.session().state(), PlayerState::Idle);
        assert!(player.session().playlist().is_empty());
        assert!(player.session().shuffle());
    }

    #[test]
    fn test_next_in_idle_is_noop() {
        let catalog = abc();
        let mut player = controller();
        assert!(player.next(&catalog).is_empty());
        assert!(player.previous(Duration::ZERO, &catalog).is_empty());
        assert!(player.on_track_end(&catalog).is_empty());
        assert_eq!(player.session(), &PlaybackSession::default());
    }

    #[test]
    fn test_view_lifecycle_drives_visualizer() {
        let mut catalog = abc();
        catalog[0].cover_art_url = Some("/uploads/covers/a.jpg".to_string());
        let mut player = controller();

        assert!(player.handle(PlayerEvent::ViewOpened, &catalog).is_empty());
        player.play(catalog[0].clone(), &catalog);
        assert_eq!(
            player.handle(PlayerEvent::ViewOpened, &catalog),
            vec![Effect::StartVisualizer {
                cover: Some("/uploads/covers/a.jpg".to_string())
            }]
        );
        assert_eq!(
            player.handle(PlayerEvent::ViewClosed, &catalog),
            vec![Effect::StopVisualizer]
        );
    }

    #[test]
    fn test_transition_is_pure_over_session() {
        let catalog = abc();
        let start = PlaybackSession::default();
        let mut rng = StdRng::seed_from_u64(1);

        let (after, _) = transition(
            start.clone(),
            PlayerEvent::Play(catalog[0].clone()),
            &catalog,
            Duration::from_secs(3),
            &mut rng,
        );
        assert_eq!(start, PlaybackSession::default());
        assert_eq!(after.index(), Some(0));
    }
}
