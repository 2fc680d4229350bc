//! Core library functions for dithertone

pub mod crons;
pub mod listens;
pub mod playback;
pub mod queue;

pub use playback::{PlaybackSession, PlayerView, ToggleOutcome};
pub use queue::{drop_target, PlayQueue, QueueError};
