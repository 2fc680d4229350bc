//! In-memory stores

mod session_store;

pub use session_store::SessionStore;
