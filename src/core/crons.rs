//! Cron jobs for periodic tasks

use std::sync::Arc;
use std::time::Duration;
use tokio::time;

use crate::stores::SessionStore;

/// How often idle sessions are looked for
const PURGE_INTERVAL: Duration = Duration::from_secs(60);

/// Start all cron jobs
pub fn start_cron_jobs(sessions: Arc<SessionStore>) {
    let ttl = session_ttl(sessions.config().session_ttl_minutes);

    // Drop playback sessions nobody has touched for a while
    tokio::spawn(async move {
        let mut interval = time::interval(PURGE_INTERVAL);
        loop {
            interval.tick().await;
            purge_sessions(&sessions, ttl);
        }
    });
}

fn session_ttl(minutes: u64) -> Duration {
    Duration::from_secs(minutes.saturating_mul(60))
}

fn purge_sessions(sessions: &SessionStore, ttl: Duration) -> usize {
    if sessions.is_empty() {
        return 0;
    }

    let purged = sessions.purge_idle(ttl);
    if purged > 0 {
        tracing::info!(
            "Purged {} idle playback sessions ({} left)",
            purged,
            sessions.len()
        );
    }
    purged
}
