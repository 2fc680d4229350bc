//! Listen model

use serde::{Deserialize, Serialize};

/// Where a listen was reported from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListenSource {
    /// A client posted to the listen endpoint directly
    Direct,
    /// Progress reported through a playback session crossed the threshold
    Session,
}

impl ListenSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ListenSource::Direct => "direct",
            ListenSource::Session => "session",
        }
    }
}

/// A recorded listen of a track
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Listen {
    /// Database ID
    pub id: i64,
    /// Listened track
    pub track_id: String,
    /// Unix timestamp of the listen
    pub timestamp: i64,
    /// Source of the listen
    pub source: String,
}
