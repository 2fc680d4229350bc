//! Utility modules for dithertone

pub mod player;
pub mod slug;
pub mod time;
pub mod titles;
