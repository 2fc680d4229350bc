//! Data models for dithertone
//!
//! This module contains the catalog records and the play queue types.

mod listen;
mod queue;
mod release;
mod track;
mod user;

pub use listen::{Listen, ListenSource};
pub use queue::{DropPosition, QueueSource, QueueTrack, RepeatMode};
pub use release::{NewRelease, Release};
pub use track::{NewTrack, Track};
pub use user::User;

/// A tag attached to releases
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Tag {
    pub id: i64,
    pub name: String,
}
