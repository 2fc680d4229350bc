//! Release model

use serde::{Deserialize, Serialize};

use super::{NewTrack, Track};

/// A release (album, EP, single) published by a user
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Release {
    /// Database ID
    pub id: String,
    /// Release title
    pub title: String,
    /// Publishing user
    pub artist_id: String,
    /// Publishing user's username
    #[serde(default)]
    pub artist: String,
    /// Cover image URL
    #[serde(default)]
    pub cover_url: Option<String>,
    /// Free text description
    #[serde(default)]
    pub description: Option<String>,
    /// Creation timestamp
    #[serde(default)]
    pub created_at: i64,

    // Attached on detail lookups
    /// Tag names, sorted
    #[serde(default)]
    pub tags: Vec<String>,
    /// Tracks in track number order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tracks: Vec<Track>,
}

/// Body accepted when publishing a release
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRelease {
    pub title: String,
    pub artist: String,
    #[serde(default)]
    pub cover_url: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub tracks: Vec<NewTrack>,
}

impl NewRelease {
    /// Check the body before anything touches the database
    pub fn validate(&self) -> Result<(), String> {
        if self.title.trim().is_empty() {
            return Err("Release title is required".to_string());
        }
        if self.artist.trim().is_empty() {
            return Err("Artist is required".to_string());
        }
        if self.tracks.is_empty() {
            return Err("A release needs at least one track".to_string());
        }

        let mut numbers = std::collections::HashSet::new();
        for (i, track) in self.tracks.iter().enumerate() {
            if track.title.trim().is_empty() {
                return Err(format!("Track {} has no title", i + 1));
            }
            if track.file_url.trim().is_empty() {
                return Err(format!("Track {} has no file URL", i + 1));
            }
            let number = track.track_number.unwrap_or(i as i32 + 1);
            if number < 1 {
                return Err(format!("Track {} has an invalid track number", i + 1));
            }
            if !numbers.insert(number) {
                return Err(format!("Duplicate track number {}", number));
            }
        }

        Ok(())
    }
}
