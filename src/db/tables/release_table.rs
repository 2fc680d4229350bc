//! Release table operations

use anyhow::Result;
use sqlx::{FromRow, SqlitePool};

use super::{TagTable, TrackTable, UserTable};
use crate::models::{NewRelease, Release};

/// Tag names are folded into one column with this separator
const TAG_SEPARATOR: char = '\u{1f}';

const RELEASE_COLUMNS: &str = r#"
    r.id, r.title, r.artist_id, u.username AS artist, r.cover_url, r.description, r.created_at,
    (SELECT group_concat(t.name, char(31)) FROM release_tags rt
        JOIN tags t ON t.id = rt.tag_id
        WHERE rt.release_id = r.id) AS tag_names
    FROM releases r
    JOIN users u ON u.id = r.artist_id
"#;

/// Database row for releases table
#[derive(Debug, FromRow)]
struct ReleaseRow {
    id: String,
    title: String,
    artist_id: String,
    artist: String,
    cover_url: Option<String>,
    description: Option<String>,
    created_at: i64,
    tag_names: Option<String>,
}

impl ReleaseRow {
    fn into_release(self) -> Release {
        let mut tags: Vec<String> = self
            .tag_names
            .map(|names| {
                names
                    .split(TAG_SEPARATOR)
                    .filter(|n| !n.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();
        tags.sort();

        Release {
            id: self.id,
            title: self.title,
            artist_id: self.artist_id,
            artist: self.artist,
            cover_url: self.cover_url,
            description: self.description,
            created_at: self.created_at,
            tags,
            tracks: Vec::new(),
        }
    }
}

/// Release table operations
pub struct ReleaseTable;

impl ReleaseTable {
    /// Publish a release with its tracks and tags. The artist is created on
    /// first use. Everything happens in one transaction.
    pub async fn create(pool: &SqlitePool, new: &NewRelease) -> Result<String> {
        let mut tx = pool.begin().await?;

        let artist = UserTable::get_or_create(&mut tx, new.artist.trim()).await?;
        let id = uuid::Uuid::new_v4().to_string();

        sqlx::query(
            "INSERT INTO releases (id, title, artist_id, cover_url, description, created_at) VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(new.title.trim())
        .bind(&artist.id)
        .bind(&new.cover_url)
        .bind(&new.description)
        .bind(chrono::Utc::now().timestamp())
        .execute(&mut *tx)
        .await?;

        for (i, track) in new.tracks.iter().enumerate() {
            let number = track.track_number.unwrap_or(i as i32 + 1);
            TrackTable::insert(&mut tx, &id, track, number).await?;
        }

        TagTable::attach(&mut tx, &id, &new.tags).await?;

        tx.commit().await?;

        Ok(id)
    }

    /// Release with its tags and tracks
    pub async fn get(pool: &SqlitePool, id: &str) -> Result<Option<Release>> {
        let row: Option<ReleaseRow> =
            sqlx::query_as(&format!("SELECT {} WHERE r.id = ?", RELEASE_COLUMNS))
                .bind(id)
                .fetch_optional(pool)
                .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let mut release = row.into_release();
        release.tags = TagTable::for_release(pool, id).await?;
        release.tracks = TrackTable::for_release(pool, id).await?;

        Ok(Some(release))
    }

    /// Newest releases first, optionally limited to one tag
    pub async fn list(
        pool: &SqlitePool,
        tag_id: Option<i64>,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<Release>> {
        let rows: Vec<ReleaseRow> = match tag_id {
            Some(tag_id) => {
                sqlx::query_as(&format!(
                    "SELECT {} WHERE EXISTS (SELECT 1 FROM release_tags x WHERE x.release_id = r.id AND x.tag_id = ?)
                     ORDER BY r.created_at DESC, r.id LIMIT ? OFFSET ?",
                    RELEASE_COLUMNS
                ))
                .bind(tag_id)
                .bind(limit)
                .bind(offset)
                .fetch_all(pool)
                .await?
            }
            None => {
                sqlx::query_as(&format!(
                    "SELECT {} ORDER BY r.created_at DESC, r.id LIMIT ? OFFSET ?",
                    RELEASE_COLUMNS
                ))
                .bind(limit)
                .bind(offset)
                .fetch_all(pool)
                .await?
            }
        };

        Ok(rows.into_iter().map(|r| r.into_release()).collect())
    }

    /// Releases published by a user, newest first
    pub async fn for_artist(pool: &SqlitePool, artist_id: &str) -> Result<Vec<Release>> {
        let rows: Vec<ReleaseRow> = sqlx::query_as(&format!(
            "SELECT {} WHERE r.artist_id = ? ORDER BY r.created_at DESC, r.id",
            RELEASE_COLUMNS
        ))
        .bind(artist_id)
        .fetch_all(pool)
        .await?;

        Ok(rows.into_iter().map(|r| r.into_release()).collect())
    }

    /// Delete a release and, through cascades, its tracks and listens
    pub async fn delete(pool: &SqlitePool, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM releases WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::tables::seed_release;
    use crate::db::DbEngine;
    use crate::models::NewTrack;

    #[tokio::test]
    async fn test_get_includes_tracks_and_tags() {
        let db = DbEngine::memory().await.unwrap();
        let seeded = seed_release(db.pool(), "mono", "Low Tide", &["dub", "ambient"], 2).await;

        let release = ReleaseTable::get(db.pool(), &seeded.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(release.title, "Low Tide");
        assert_eq!(release.artist, "mono");
        assert_eq!(release.tags, vec!["ambient", "dub"]);
        assert_eq!(release.tracks.len(), 2);
    }

    #[tokio::test]
    async fn test_list_filters_by_tag() {
        let db = DbEngine::memory().await.unwrap();
        seed_release(db.pool(), "mono", "A", &["dub"], 1).await;
        seed_release(db.pool(), "mono", "B", &["techno"], 1).await;

        let all = ReleaseTable::list(db.pool(), None, 50, 0).await.unwrap();
        assert_eq!(all.len(), 2);

        let dub = TagTable::find(db.pool(), "dub").await.unwrap().unwrap();
        let filtered = ReleaseTable::list(db.pool(), Some(dub.id), 50, 0)
            .await
            .unwrap();
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].title, "A");
    }

    #[tokio::test]
    async fn test_create_is_atomic() {
        let db = DbEngine::memory().await.unwrap();
        let track = |n: i32| NewTrack {
            title: "t".to_string(),
            track_number: Some(n),
            duration: 10,
            file_url: "/media/t.mp3".to_string(),
        };
        // duplicate track numbers violate the unique index halfway through
        let new = NewRelease {
            title: "Broken".to_string(),
            artist: "mono".to_string(),
            cover_url: None,
            description: None,
            tags: vec!["dub".to_string()],
            tracks: vec![track(1), track(1)],
        };

        assert!(ReleaseTable::create(db.pool(), &new).await.is_err());
        assert!(ReleaseTable::list(db.pool(), None, 50, 0)
            .await
            .unwrap()
            .is_empty());
        assert!(TagTable::names(db.pool()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_cascades() {
        let db = DbEngine::memory().await.unwrap();
        let seeded = seed_release(db.pool(), "mono", "A", &[], 2).await;

        assert!(ReleaseTable::delete(db.pool(), &seeded.id).await.unwrap());
        assert_eq!(TrackTable::count(db.pool()).await.unwrap(), 0);
        assert!(!ReleaseTable::delete(db.pool(), &seeded.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_for_artist() {
        let db = DbEngine::memory().await.unwrap();
        let a = seed_release(db.pool(), "mono", "A", &[], 1).await;
        seed_release(db.pool(), "duo", "B", &[], 1).await;

        let releases = ReleaseTable::for_artist(db.pool(), &a.artist_id).await.unwrap();
        assert_eq!(releases.len(), 1);
        assert_eq!(releases[0].title, "A");
    }
}
