//! Listen table operations

use anyhow::Result;
use sqlx::{FromRow, SqlitePool};

use crate::models::Listen;

/// Database row for listens table
#[derive(Debug, FromRow)]
struct ListenRow {
    id: i64,
    track_id: String,
    timestamp: i64,
    source: String,
}

impl ListenRow {
    fn into_listen(self) -> Listen {
        Listen {
            id: self.id,
            track_id: self.track_id,
            timestamp: self.timestamp,
            source: self.source,
        }
    }
}

/// Listen table operations
pub struct ListenTable;

impl ListenTable {
    /// Number of listens logged for a track
    pub async fn count_for_track(pool: &SqlitePool, track_id: &str) -> Result<i64> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM listens WHERE track_id = ?")
            .bind(track_id)
            .fetch_one(pool)
            .await?;

        Ok(row.0)
    }

    /// Most recent listens first
    pub async fn recent(pool: &SqlitePool, limit: u32) -> Result<Vec<Listen>> {
        let rows: Vec<ListenRow> =
            sqlx::query_as("SELECT * FROM listens ORDER BY timestamp DESC, id DESC LIMIT ?")
                .bind(limit)
                .fetch_all(pool)
                .await?;

        Ok(rows.into_iter().map(|r| r.into_listen()).collect())
    }
}
