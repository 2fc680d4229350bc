//! Play queue models

use serde::{Deserialize, Serialize};

use super::Track;

/// A track as carried in a play queue
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueTrack {
    /// Identity of this queue entry; the same track may be queued twice
    #[serde(default)]
    pub entry_id: String,
    pub id: String,
    pub title: String,
    pub artist: String,
    pub release_id: String,
    pub track_number: i32,
    pub file_url: String,
    #[serde(default)]
    pub duration: i32,
}

impl QueueTrack {
    /// Title prefixed with the track number
    pub fn numbered_title(&self) -> String {
        format!("{}. {}", self.track_number, self.title)
    }
}

impl From<Track> for QueueTrack {
    fn from(track: Track) -> Self {
        Self {
            entry_id: String::new(),
            id: track.id,
            title: track.title,
            artist: track.artist,
            release_id: track.release_id,
            track_number: track.track_number,
            file_url: track.file_url,
            duration: track.duration,
        }
    }
}

/// Repeat behaviour of a queue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepeatMode {
    #[default]
    Off,
    /// Replay the current track when it ends
    One,
    /// Wrap around at both ends of the queue
    Queue,
}

impl RepeatMode {
    /// Next mode in the off, queue, one cycle
    pub fn cycle(self) -> Self {
        match self {
            RepeatMode::Off => RepeatMode::Queue,
            RepeatMode::Queue => RepeatMode::One,
            RepeatMode::One => RepeatMode::Off,
        }
    }
}

/// What a queue was built from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum QueueSource {
    Release { id: String },
    ShuffleAll,
}

/// Which side of a row a dragged track was dropped on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DropPosition {
    Before,
    After,
}
