//! Configuration module for dithertone
//!
//! This module contains the application configuration structures and path management.

mod paths;
mod user_config;

pub use paths::Paths;
pub use user_config::UserConfig;

/// Player identity used when playback is driven by the queue
pub const QUEUE_PLAYER_ID: &str = "queue-player";
