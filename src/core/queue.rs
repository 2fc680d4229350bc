//! Play queue
//!
//! An ordered list of tracks with a cursor, repeat mode and shuffle state.
//! Every mutation keeps `current_index` pointing at a valid track, so a
//! queue is never empty once built.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;
use thiserror::Error;

use crate::models::{DropPosition, QueueSource, QueueTrack, RepeatMode};

/// Queue operation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueueError {
    #[error("Queue index {index} is out of range (queue has {len} tracks)")]
    OutOfRange { index: usize, len: usize },

    #[error("Cannot remove the last track in the queue")]
    LastTrack,

    #[error("Cannot build a queue without tracks")]
    Empty,
}

/// Why the queue is asked to move forward
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvanceReason {
    /// The current track finished playing
    Ended,
    /// The user pressed next
    Skip,
}

/// A play queue
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayQueue {
    id: String,
    tracks: Vec<QueueTrack>,
    current_index: usize,
    repeat_mode: RepeatMode,
    shuffle: bool,
    original_source: Option<QueueSource>,
    /// Order to restore when shuffle is switched off
    #[serde(skip)]
    unshuffled: Option<Vec<QueueTrack>>,
}

impl PlayQueue {
    fn new(
        mut tracks: Vec<QueueTrack>,
        current_index: usize,
        source: Option<QueueSource>,
    ) -> Result<Self, QueueError> {
        stamp_entries(&mut tracks);
        if tracks.is_empty() {
            return Err(QueueError::Empty);
        }

        let current_index = current_index.min(tracks.len() - 1);

        Ok(Self {
            id: uuid::Uuid::new_v4().to_string(),
            tracks,
            current_index,
            repeat_mode: RepeatMode::Off,
            shuffle: false,
            original_source: source,
            unshuffled: None,
        })
    }

    /// Queue a release's tracks, starting at `start_index`
    pub fn from_release(
        release_id: &str,
        mut tracks: Vec<QueueTrack>,
        start_index: usize,
    ) -> Result<Self, QueueError> {
        tracks.sort_by_key(|t| t.track_number);
        Self::new(
            tracks,
            start_index,
            Some(QueueSource::Release {
                id: release_id.to_string(),
            }),
        )
    }

    /// Queue the given tracks in random order
    pub fn shuffled<R: Rng + ?Sized>(
        mut tracks: Vec<QueueTrack>,
        rng: &mut R,
    ) -> Result<Self, QueueError> {
        tracks.shuffle(rng);
        Self::new(tracks, 0, Some(QueueSource::ShuffleAll))
    }

    /// Queue an arbitrary list of tracks in the given order
    pub fn from_tracks(tracks: Vec<QueueTrack>, start_index: usize) -> Result<Self, QueueError> {
        Self::new(tracks, start_index, None)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn is_shuffled(&self) -> bool {
        self.shuffle
    }

    pub fn source(&self) -> Option<&QueueSource> {
        self.original_source.as_ref()
    }

    /// The track under the cursor
    pub fn current(&self) -> &QueueTrack {
        &self.tracks[self.current_index]
    }

    pub fn has_next(&self) -> bool {
        self.current_index + 1 < self.tracks.len() || self.repeat_mode == RepeatMode::Queue
    }

    pub fn has_previous(&self) -> bool {
        self.current_index > 0 || self.repeat_mode == RepeatMode::Queue
    }

    /// Move forward. Returns `None` when the end is reached and nothing repeats.
    pub fn advance(&mut self, reason: AdvanceReason) -> Option<&QueueTrack> {
        if reason == AdvanceReason::Ended && self.repeat_mode == RepeatMode::One {
            return Some(self.current());
        }

        if self.current_index + 1 < self.tracks.len() {
            self.current_index += 1;
        } else if self.repeat_mode == RepeatMode::Queue {
            self.current_index = 0;
        } else {
            return None;
        }

        Some(self.current())
    }

    /// Move backward. Returns `None` at the start unless the queue repeats.
    pub fn previous(&mut self) -> Option<&QueueTrack> {
        if self.current_index > 0 {
            self.current_index -= 1;
        } else if self.repeat_mode == RepeatMode::Queue {
            self.current_index = self.tracks.len() - 1;
        } else {
            return None;
        }

        Some(self.current())
    }

    /// Jump to a position
    pub fn go_to(&mut self, index: usize) -> Result<&QueueTrack, QueueError> {
        self.check_index(index)?;
        self.current_index = index;
        Ok(self.current())
    }

    /// Remove the track at `index`.
    ///
    /// Returns true when the removed track was the current one, in which case
    /// the cursor now points at the track that followed it (or the new last
    /// track).
    pub fn remove(&mut self, index: usize) -> Result<bool, QueueError> {
        self.check_index(index)?;
        if self.tracks.len() == 1 {
            return Err(QueueError::LastTrack);
        }

        let removed = self.tracks.remove(index);
        if let Some(original) = self.unshuffled.as_mut() {
            if let Some(pos) = original.iter().position(|t| t.entry_id == removed.entry_id) {
                original.remove(pos);
            }
        }

        let was_current = index == self.current_index;
        if index < self.current_index {
            self.current_index -= 1;
        } else if was_current {
            self.current_index = self.current_index.min(self.tracks.len() - 1);
        }

        Ok(was_current)
    }

    /// Move the track at `from` so it ends up at `to`. The cursor follows
    /// the track it pointed at. Returns false when nothing moved.
    pub fn move_track(&mut self, from: usize, to: usize) -> Result<bool, QueueError> {
        self.check_index(from)?;
        self.check_index(to)?;
        if from == to {
            return Ok(false);
        }

        let track = self.tracks.remove(from);
        self.tracks.insert(to, track);

        let current = self.current_index;
        self.current_index = if from == current {
            to
        } else if from < current && to >= current {
            current - 1
        } else if from > current && to <= current {
            current + 1
        } else {
            current
        };

        Ok(true)
    }

    /// Append tracks to the end of the queue
    pub fn append(&mut self, mut tracks: Vec<QueueTrack>) {
        stamp_entries(&mut tracks);
        if let Some(original) = self.unshuffled.as_mut() {
            original.extend(tracks.iter().cloned());
        }
        self.tracks.extend(tracks);
    }

    /// Insert tracks right after the current one
    pub fn insert_next(&mut self, mut tracks: Vec<QueueTrack>) {
        stamp_entries(&mut tracks);
        if let Some(original) = self.unshuffled.as_mut() {
            original.extend(tracks.iter().cloned());
        }
        let at = self.current_index + 1;
        self.tracks.splice(at..at, tracks);
    }

    pub fn set_repeat(&mut self, mode: RepeatMode) {
        self.repeat_mode = mode;
    }

    /// Step to the next repeat mode and return it
    pub fn cycle_repeat(&mut self) -> RepeatMode {
        self.repeat_mode = self.repeat_mode.cycle();
        self.repeat_mode
    }

    /// Switch shuffle on or off.
    ///
    /// Switching on moves the current track to the front and shuffles the
    /// rest. Switching off restores the order the queue had before, with the
    /// cursor on the same track.
    pub fn set_shuffle<R: Rng + ?Sized>(&mut self, enabled: bool, rng: &mut R) {
        if enabled == self.shuffle {
            return;
        }

        if enabled {
            self.unshuffled = Some(self.tracks.clone());

            let current = self.tracks.remove(self.current_index);
            self.tracks.shuffle(rng);
            self.tracks.insert(0, current);
            self.current_index = 0;
        } else if let Some(original) = self.unshuffled.take() {
            let current_entry = self.current().entry_id.clone();
            self.tracks = original;
            self.current_index = self
                .tracks
                .iter()
                .position(|t| t.entry_id == current_entry)
                .unwrap_or(0);
        }

        self.shuffle = enabled;
    }

    fn check_index(&self, index: usize) -> Result<(), QueueError> {
        if index >= self.tracks.len() {
            return Err(QueueError::OutOfRange {
                index,
                len: self.tracks.len(),
            });
        }
        Ok(())
    }
}

fn stamp_entries(tracks: &mut [QueueTrack]) {
    for track in tracks {
        track.entry_id = uuid::Uuid::new_v4().to_string();
    }
}

/// Turn a drop on a row into the destination index for [`PlayQueue::move_track`].
///
/// Dropping after a row targets the slot below it. When dragging downwards
/// the dragged row is removed first, so everything below shifts up by one.
/// Dropping a row onto itself does nothing.
pub fn drop_target(dragged: usize, target: usize, position: DropPosition) -> Option<usize> {
    if dragged == target {
        return None;
    }

    let mut index = target;
    if position == DropPosition::After {
        index += 1;
    }
    if dragged < index {
        index -= 1;
    }

    Some(index)
}
