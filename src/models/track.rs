//! Track model

use serde::{Deserialize, Serialize};

/// A track belonging to a release
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    /// Database ID
    pub id: String,
    /// Owning release
    pub release_id: String,
    /// Track title
    pub title: String,
    /// Position on the release, starting at 1
    pub track_number: i32,
    /// Duration in seconds, 0 when unknown
    #[serde(default)]
    pub duration: i32,
    /// URL the audio is served from
    pub file_url: String,
    /// Number of recorded listens
    #[serde(default)]
    pub listen_count: i64,

    // Joined fields
    /// Username of the release's artist
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub artist: String,
}

impl PartialEq for Track {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Track {}

/// Track data supplied when creating a release
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTrack {
    pub title: String,
    #[serde(default)]
    pub track_number: Option<i32>,
    #[serde(default)]
    pub duration: i32,
    pub file_url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(id: &str) -> Track {
        Track {
            id: id.to_string(),
            release_id: "r1".to_string(),
            title: "Signal".to_string(),
            track_number: 4,
            duration: 200,
            file_url: "/media/signal.mp3".to_string(),
            listen_count: 0,
            artist: String::new(),
        }
    }

    #[test]
    fn test_serializes_camel_case_without_empty_artist() {
        let json = serde_json::to_value(track("t1")).unwrap();
        assert_eq!(json["fileUrl"], "/media/signal.mp3");
        assert_eq!(json["trackNumber"], 4);
        assert!(json.get("artist").is_none());
    }

    #[test]
    fn test_equality_by_id() {
        let mut other = track("t1");
        other.title = "Different".to_string();
        assert_eq!(track("t1"), other);
        assert_ne!(track("t1"), track("t2"));
    }
}
