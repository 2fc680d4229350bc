//! Playback session
//!
//! A client has exactly one audio handle. Any number of player components
//! may be mounted at once (a release page, the now playing bar), but only
//! the active player is bound to the handle. This module keeps that binding,
//! the handle state, the play queue and the listen policy together.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::listens::ListenPolicy;
use super::queue::{AdvanceReason, PlayQueue, QueueError};
use crate::config::{UserConfig, QUEUE_PLAYER_ID};
use crate::models::QueueTrack;
use crate::utils::player::player_id;
use crate::utils::time::{clamp_position, format_time};
use crate::utils::titles::strip_track_number;

/// State of the single shared audio element
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioHandle {
    source: Option<String>,
    paused: bool,
    current_time: f64,
    duration: f64,
}

impl AudioHandle {
    fn new() -> Self {
        Self {
            paused: true,
            ..Default::default()
        }
    }

    fn load(&mut self, src: &str) {
        self.source = Some(src.to_string());
        self.current_time = 0.0;
        self.duration = 0.0;
    }

    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    /// Playing something other than `src` with real progress
    fn is_busy_with_other(&self, src: &str) -> bool {
        !self.paused
            && self.current_time > 0.0
            && self.source.as_deref().is_some_and(|s| s != src)
    }
}

/// What a mounted player component presents about itself
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerView {
    /// Explicit identity; derived from the track id or source when absent
    #[serde(default)]
    pub player_id: Option<String>,
    pub src: String,
    pub title: String,
    pub artist: String,
    #[serde(default)]
    pub track_id: Option<String>,
    #[serde(default)]
    pub release_id: Option<String>,
    #[serde(default)]
    pub track_index: Option<usize>,
}

impl PlayerView {
    pub fn id(&self) -> String {
        self.player_id
            .clone()
            .unwrap_or_else(|| player_id(self.track_id.as_deref(), &self.src))
    }

    fn from_queue_track(track: &QueueTrack, index: usize) -> Self {
        Self {
            player_id: Some(QUEUE_PLAYER_ID.to_string()),
            src: track.file_url.clone(),
            title: track.numbered_title(),
            artist: track.artist.clone(),
            track_id: Some(track.id.clone()),
            release_id: Some(track.release_id.clone()),
            track_index: Some(index),
        }
    }
}

/// The track bound to the audio handle
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveTrack {
    pub src: String,
    pub title: String,
    pub artist: String,
    pub release_id: String,
    pub track_index: usize,
    pub player_id: String,
}

impl ActiveTrack {
    fn from_view(view: &PlayerView) -> Self {
        Self {
            src: view.src.clone(),
            title: view.title.clone(),
            artist: view.artist.clone(),
            release_id: view
                .release_id
                .clone()
                .unwrap_or_else(|| "unknown".to_string()),
            track_index: view.track_index.unwrap_or(0),
            player_id: view.id(),
        }
    }
}

/// Result of a play/pause toggle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ToggleOutcome {
    Playing,
    Paused,
}

/// Serializable now playing state
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NowPlaying {
    pub active_player: Option<String>,
    pub track: Option<NowPlayingTrack>,
    pub is_playing: bool,
    pub current_time: f64,
    pub duration: f64,
    pub elapsed: String,
    pub total: String,
    pub progress: f64,
    pub has_next: bool,
    pub has_previous: bool,
    pub listen_recorded: bool,
    pub queue: Option<PlayQueue>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NowPlayingTrack {
    pub track_id: Option<String>,
    pub title: String,
    pub artist: String,
    pub src: String,
    pub release_id: String,
    pub track_index: usize,
}

/// Playback state for one client
#[derive(Debug)]
pub struct PlaybackSession {
    audio: AudioHandle,
    active_player: Option<String>,
    active_track: Option<ActiveTrack>,
    current_track_id: Option<String>,
    queue: Option<PlayQueue>,
    listens: ListenPolicy,
    restart_threshold: f64,
}

impl PlaybackSession {
    pub fn new(config: &UserConfig) -> Self {
        Self {
            audio: AudioHandle::new(),
            active_player: None,
            active_track: None,
            current_track_id: None,
            queue: None,
            listens: ListenPolicy::from_config(config),
            restart_threshold: config.restart_threshold_secs,
        }
    }

    pub fn queue(&self) -> Option<&PlayQueue> {
        self.queue.as_ref()
    }

    pub fn queue_mut(&mut self) -> Option<&mut PlayQueue> {
        self.queue.as_mut()
    }

    pub fn is_active(&self, player_id: &str) -> bool {
        self.active_player.as_deref() == Some(player_id)
    }

    /// True while the handle is playing a loaded source
    pub fn is_playing(&self) -> bool {
        self.audio.source.is_some() && !self.audio.paused
    }

    /// Bind a player to the handle, loading its source when it differs
    fn set_active(&mut self, view: &PlayerView) {
        let track = ActiveTrack::from_view(view);

        if self.audio.source() != Some(view.src.as_str()) {
            debug!("Loading source {} for {}", view.src, track.player_id);
            self.audio.load(&view.src);
            self.listens.reset(view.track_id.clone());
        }

        self.active_player = Some(track.player_id.clone());
        self.active_track = Some(track);
        self.current_track_id = view.track_id.clone();
    }

    /// A player was mounted or its props changed.
    ///
    /// A player showing the track that is already loaded takes over the
    /// active identity without interrupting playback. Returns true when it
    /// did.
    pub fn register(&mut self, view: &PlayerView) -> bool {
        if self.audio.is_busy_with_other(&view.src) {
            debug!("Handle busy with another source, not taking over");
            return false;
        }

        let id = view.id();
        let same_track = self
            .active_track
            .as_ref()
            .is_some_and(|t| t.src == view.src);

        if same_track && !self.is_active(&id) {
            debug!("Registering matching track as active player: {}", id);
            self.set_active(view);
            return true;
        }

        false
    }

    /// Play/pause button of a player
    pub fn toggle(&mut self, view: &PlayerView) -> ToggleOutcome {
        if self.is_active(&view.id()) && self.is_playing() {
            self.audio.paused = true;
            return ToggleOutcome::Paused;
        }

        self.set_active(view);
        self.audio.paused = false;
        ToggleOutcome::Playing
    }

    /// Seek from a player. An inactive player switches to its own track instead.
    pub fn seek(&mut self, view: &PlayerView, time: f64) {
        if !self.is_active(&view.id()) {
            self.toggle(view);
            return;
        }
        self.seek_to(time);
    }

    /// Progress bar click, `fraction` of the bar width
    pub fn seek_fraction(&mut self, view: &PlayerView, fraction: f64) {
        if !self.is_active(&view.id()) {
            self.toggle(view);
            return;
        }
        let fraction = if fraction.is_finite() {
            fraction.clamp(0.0, 1.0)
        } else {
            0.0
        };
        self.seek_to(fraction * self.audio.duration);
    }

    fn seek_to(&mut self, time: f64) {
        if !(self.audio.duration > 0.0) {
            return;
        }
        self.audio.current_time = clamp_position(time, self.audio.duration);
    }

    pub fn restart(&mut self) {
        self.audio.current_time = 0.0;
    }

    /// Progress reported by the client for `src`. Reports for a source that
    /// is no longer loaded are dropped. Returns the track id when a listen
    /// should be recorded.
    pub fn progress(&mut self, src: &str, current_time: f64, duration: f64) -> Option<String> {
        if self.audio.source() != Some(src) {
            debug!("Ignoring stale progress for {}", src);
            return None;
        }
        self.time_update(current_time, duration)
    }

    fn time_update(&mut self, current_time: f64, duration: f64) -> Option<String> {
        if self.audio.source.is_none() {
            return None;
        }

        self.audio.current_time = clamp_position(current_time, duration);
        if duration.is_finite() && duration >= 0.0 {
            self.audio.duration = duration;
        }

        if !self.is_playing() {
            return None;
        }
        self.listens
            .observe(self.audio.current_time, self.audio.duration)
    }

    /// The client refused to start playback
    pub fn playback_rejected(&mut self) {
        debug!("Playback rejected by client");
        self.audio.paused = true;
    }

    /// Replace the queue and start playing its current track
    pub fn play_queue(&mut self, queue: PlayQueue) {
        let index = queue.current_index();
        let view = PlayerView::from_queue_track(queue.current(), index);
        info!(
            "Playing queue {} ({} tracks, {:?}) from {}",
            queue.id(),
            queue.len(),
            queue.source(),
            index
        );

        self.queue = Some(queue);
        self.set_active(&view);
        self.audio.paused = false;
    }

    /// The current track finished
    pub fn ended(&mut self) -> Option<QueueTrack> {
        let next = self
            .queue
            .as_mut()
            .and_then(|q| q.advance(AdvanceReason::Ended).cloned());

        match next {
            Some(track) => {
                if self.audio.source() == Some(track.file_url.as_str()) {
                    // repeat one: same source again, count it again
                    self.audio.current_time = 0.0;
                    self.listens.reset(Some(track.id.clone()));
                } else {
                    self.load_queue_current();
                }
                self.audio.paused = false;
                Some(track)
            }
            None => {
                self.audio.paused = true;
                self.audio.current_time = 0.0;
                None
            }
        }
    }

    /// Next button
    pub fn next(&mut self) -> Option<QueueTrack> {
        let next = self
            .queue
            .as_mut()
            .and_then(|q| q.advance(AdvanceReason::Skip).cloned())?;
        self.load_queue_current();
        Some(next)
    }

    /// Previous button. Restarts the current track when it has played for a while.
    pub fn previous(&mut self) -> Option<QueueTrack> {
        if self.audio.current_time > self.restart_threshold {
            self.restart();
            return self.queue.as_ref().map(|q| q.current().clone());
        }

        let Some(prev) = self.queue.as_mut().and_then(|q| q.previous().cloned()) else {
            self.restart();
            return None;
        };
        self.load_queue_current();
        Some(prev)
    }

    pub fn go_to(&mut self, index: usize) -> Result<QueueTrack, QueueError> {
        let queue = self.queue.as_mut().ok_or(QueueError::Empty)?;
        let track = queue.go_to(index)?.clone();
        self.load_queue_current();
        self.audio.paused = false;
        Ok(track)
    }

    /// Remove a queue entry, loading the following track when the current one goes
    pub fn remove_from_queue(&mut self, index: usize) -> Result<(), QueueError> {
        let queue = self.queue.as_mut().ok_or(QueueError::Empty)?;
        if queue.remove(index)? {
            self.load_queue_current();
        } else {
            self.sync_track_index();
        }
        Ok(())
    }

    pub fn move_in_queue(&mut self, from: usize, to: usize) -> Result<bool, QueueError> {
        let queue = self.queue.as_mut().ok_or(QueueError::Empty)?;
        let moved = queue.move_track(from, to)?;
        self.sync_track_index();
        Ok(moved)
    }

    /// Bind the queue player to the queue's current track, keeping play state
    fn load_queue_current(&mut self) {
        let Some(queue) = self.queue.as_ref() else {
            return;
        };
        let view = PlayerView::from_queue_track(queue.current(), queue.current_index());
        self.set_active(&view);
    }

    /// Queue order changed without changing the track; refresh the displayed position
    pub fn sync_track_index(&mut self) {
        let Some(queue) = self.queue.as_ref() else {
            return;
        };
        if let Some(track) = self.active_track.as_mut() {
            if track.player_id == QUEUE_PLAYER_ID {
                track.track_index = queue.current_index();
            }
        }
    }

    pub fn snapshot(&self) -> NowPlaying {
        let track = self.active_track.as_ref().map(|t| NowPlayingTrack {
            track_id: self.current_track_id.clone(),
            title: strip_track_number(&t.title).to_string(),
            artist: t.artist.clone(),
            src: t.src.clone(),
            release_id: t.release_id.clone(),
            track_index: t.track_index,
        });

        let duration = self.audio.duration;
        let progress = if duration > 0.0 {
            self.audio.current_time / duration * 100.0
        } else {
            0.0
        };

        NowPlaying {
            active_player: self.active_player.clone(),
            track,
            is_playing: self.is_playing(),
            current_time: self.audio.current_time,
            duration,
            elapsed: format_time(self.audio.current_time),
            total: format_time(duration),
            progress,
            has_next: self.queue.as_ref().is_some_and(|q| q.has_next()),
            has_previous: self.queue.as_ref().is_some_and(|q| q.has_previous()),
            listen_recorded: self.listens.is_recorded(),
            queue: self.queue.clone(),
        }
    }
}
