//! Track table operations

use anyhow::Result;
use sqlx::{FromRow, SqliteConnection, SqlitePool};

use crate::models::{ListenSource, NewTrack, Track};

/// Columns selected for every track query, joined with the artist's username
const TRACK_COLUMNS: &str = r#"
    t.id, t.release_id, t.title, t.track_number, t.duration, t.file_url, t.listen_count,
    u.username AS artist
    FROM tracks t
    JOIN releases r ON r.id = t.release_id
    JOIN users u ON u.id = r.artist_id
"#;

/// Database row for tracks table
#[derive(Debug, FromRow)]
struct TrackRow {
    id: String,
    release_id: String,
    title: String,
    track_number: i32,
    duration: i32,
    file_url: String,
    listen_count: i64,
    artist: String,
}

impl TrackRow {
    fn into_track(self) -> Track {
        Track {
            id: self.id,
            release_id: self.release_id,
            title: self.title,
            track_number: self.track_number,
            duration: self.duration,
            file_url: self.file_url,
            listen_count: self.listen_count,
            artist: self.artist,
        }
    }
}

/// Track table operations
pub struct TrackTable;

impl TrackTable {
    /// Get track by ID
    pub async fn get(pool: &SqlitePool, id: &str) -> Result<Option<Track>> {
        let row: Option<TrackRow> =
            sqlx::query_as(&format!("SELECT {} WHERE t.id = ?", TRACK_COLUMNS))
                .bind(id)
                .fetch_optional(pool)
                .await?;

        Ok(row.map(|r| r.into_track()))
    }

    /// Tracks of a release in track number order
    pub async fn for_release(pool: &SqlitePool, release_id: &str) -> Result<Vec<Track>> {
        let rows: Vec<TrackRow> = sqlx::query_as(&format!(
            "SELECT {} WHERE t.release_id = ? ORDER BY t.track_number ASC",
            TRACK_COLUMNS
        ))
        .bind(release_id)
        .fetch_all(pool)
        .await?;

        Ok(rows.into_iter().map(|r| r.into_track()).collect())
    }

    /// Newest tracks first, up to `limit`
    pub async fn all(pool: &SqlitePool, limit: u32) -> Result<Vec<Track>> {
        let rows: Vec<TrackRow> = sqlx::query_as(&format!(
            "SELECT {} ORDER BY r.created_at DESC, r.id, t.track_number ASC LIMIT ?",
            TRACK_COLUMNS
        ))
        .bind(limit)
        .fetch_all(pool)
        .await?;

        Ok(rows.into_iter().map(|r| r.into_track()).collect())
    }

    /// Count all tracks
    pub async fn count(pool: &SqlitePool) -> Result<i64> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM tracks")
            .fetch_one(pool)
            .await?;

        Ok(row.0)
    }

    /// Insert a track of a release
    pub async fn insert(
        conn: &mut SqliteConnection,
        release_id: &str,
        track: &NewTrack,
        track_number: i32,
    ) -> Result<String> {
        let id = uuid::Uuid::new_v4().to_string();

        sqlx::query(
            "INSERT INTO tracks (id, release_id, title, track_number, duration, file_url) VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(release_id)
        .bind(track.title.trim())
        .bind(track_number)
        .bind(track.duration.max(0))
        .bind(track.file_url.trim())
        .execute(&mut *conn)
        .await?;

        Ok(id)
    }

    /// Record one listen and bump the track's counter in one transaction.
    ///
    /// Returns the new listen count, or `None` when the track does not exist.
    pub async fn record_listen(
        pool: &SqlitePool,
        track_id: &str,
        source: ListenSource,
    ) -> Result<Option<i64>> {
        let mut tx = pool.begin().await?;

        let updated = sqlx::query("UPDATE tracks SET listen_count = listen_count + 1 WHERE id = ?")
            .bind(track_id)
            .execute(&mut *tx)
            .await?;

        if updated.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(None);
        }

        sqlx::query("INSERT INTO listens (track_id, timestamp, source) VALUES (?, ?, ?)")
            .bind(track_id)
            .bind(chrono::Utc::now().timestamp())
            .bind(source.as_str())
            .execute(&mut *tx)
            .await?;

        let count: i64 = sqlx::query_scalar("SELECT listen_count FROM tracks WHERE id = ?")
            .bind(track_id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(Some(count))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::tables::{seed_release, ListenTable};
    use crate::db::DbEngine;

    #[tokio::test]
    async fn test_for_release_is_ordered() {
        let db = DbEngine::memory().await.unwrap();
        let release = seed_release(db.pool(), "mono", "Low Tide", &[], 3).await;

        let tracks = TrackTable::for_release(db.pool(), &release.id).await.unwrap();
        let numbers: Vec<_> = tracks.iter().map(|t| t.track_number).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
        assert!(tracks.iter().all(|t| t.artist == "mono"));
    }

    #[tokio::test]
    async fn test_record_listen_counts() {
        let db = DbEngine::memory().await.unwrap();
        let release = seed_release(db.pool(), "mono", "Low Tide", &[], 1).await;
        let track_id = &release.tracks[0].id;

        let first = TrackTable::record_listen(db.pool(), track_id, ListenSource::Direct)
            .await
            .unwrap();
        let second = TrackTable::record_listen(db.pool(), track_id, ListenSource::Session)
            .await
            .unwrap();
        assert_eq!(first, Some(1));
        assert_eq!(second, Some(2));

        let track = TrackTable::get(db.pool(), track_id).await.unwrap().unwrap();
        assert_eq!(track.listen_count, 2);
        assert_eq!(
            ListenTable::count_for_track(db.pool(), track_id).await.unwrap(),
            2
        );
    }

    #[tokio::test]
    async fn test_record_listen_unknown_track() {
        let db = DbEngine::memory().await.unwrap();
        let result = TrackTable::record_listen(db.pool(), "nope", ListenSource::Direct)
            .await
            .unwrap();
        assert_eq!(result, None);
        assert_eq!(ListenTable::recent(db.pool(), 10).await.unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_all_respects_limit() {
        let db = DbEngine::memory().await.unwrap();
        seed_release(db.pool(), "mono", "A", &[], 3).await;
        seed_release(db.pool(), "duo", "B", &[], 2).await;

        assert_eq!(TrackTable::count(db.pool()).await.unwrap(), 5);
        assert_eq!(TrackTable::all(db.pool(), 4).await.unwrap().len(), 4);
    }
}
