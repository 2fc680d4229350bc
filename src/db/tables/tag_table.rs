//! Tag table operations

use anyhow::Result;
use sqlx::{SqliteConnection, SqlitePool};

use crate::models::Tag;
use crate::utils::slug::{normalize_tag, tag_slug};

/// Tag table operations
pub struct TagTable;

impl TagTable {
    /// All distinct tag names, alphabetically
    pub async fn names(pool: &SqlitePool) -> Result<Vec<String>> {
        let names: Vec<String> = sqlx::query_scalar("SELECT DISTINCT name FROM tags ORDER BY name ASC")
            .fetch_all(pool)
            .await?;

        Ok(names)
    }

    /// Tag names attached to a release, alphabetically
    pub async fn for_release(pool: &SqlitePool, release_id: &str) -> Result<Vec<String>> {
        let names: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT t.name FROM tags t
            JOIN release_tags rt ON rt.tag_id = t.id
            WHERE rt.release_id = ?
            ORDER BY t.name ASC
            "#,
        )
        .bind(release_id)
        .fetch_all(pool)
        .await?;

        Ok(names)
    }

    /// Look up a tag by name or slug
    pub async fn find(pool: &SqlitePool, name: &str) -> Result<Option<Tag>> {
        let slug = tag_slug(name);
        let tag: Option<(i64, String)> = sqlx::query_as("SELECT id, name FROM tags WHERE slug = ?")
            .bind(&slug)
            .fetch_optional(pool)
            .await?;

        Ok(tag.map(|(id, name)| Tag { id, name }))
    }

    /// Get a tag, creating it when needed. Names without any letters or
    /// digits are not tags and yield `None`.
    pub async fn ensure(conn: &mut SqliteConnection, name: &str) -> Result<Option<Tag>> {
        let name = normalize_tag(name);
        let slug = tag_slug(&name);
        if slug.is_empty() {
            return Ok(None);
        }

        sqlx::query("INSERT OR IGNORE INTO tags (name, slug) VALUES (?, ?)")
            .bind(&name)
            .bind(&slug)
            .execute(&mut *conn)
            .await?;

        let (id, name): (i64, String) = sqlx::query_as("SELECT id, name FROM tags WHERE slug = ?")
            .bind(&slug)
            .fetch_one(&mut *conn)
            .await?;

        Ok(Some(Tag { id, name }))
    }

    /// Attach tags to a release, creating missing ones
    pub async fn attach(
        conn: &mut SqliteConnection,
        release_id: &str,
        names: &[String],
    ) -> Result<Vec<Tag>> {
        let mut attached = Vec::new();

        for name in names {
            let Some(tag) = Self::ensure(conn, name).await? else {
                continue;
            };

            sqlx::query("INSERT OR IGNORE INTO release_tags (release_id, tag_id) VALUES (?, ?)")
                .bind(release_id)
                .bind(tag.id)
                .execute(&mut *conn)
                .await?;

            if !attached.contains(&tag) {
                attached.push(tag);
            }
        }

        Ok(attached)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::tables::seed_release;
    use crate::db::DbEngine;

    #[tokio::test]
    async fn test_names_sorted_and_distinct() {
        let db = DbEngine::memory().await.unwrap();
        seed_release(db.pool(), "mono", "A", &["Techno", "ambient"], 1).await;
        seed_release(db.pool(), "mono", "B", &["techno", "Dub", "  AMBIENT "], 1).await;

        let names = TagTable::names(db.pool()).await.unwrap();
        assert_eq!(names, vec!["ambient", "dub", "techno"]);
    }

    #[tokio::test]
    async fn test_names_empty() {
        let db = DbEngine::memory().await.unwrap();
        assert!(TagTable::names(db.pool()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_ensure_merges_by_slug_and_skips_blank() {
        let db = DbEngine::memory().await.unwrap();
        let mut conn = db.pool().acquire().await.unwrap();

        let a = TagTable::ensure(&mut conn, "Électro").await.unwrap().unwrap();
        let b = TagTable::ensure(&mut conn, "electro").await.unwrap().unwrap();
        assert_eq!(a, b);
        assert_eq!(a.name, "électro");

        assert!(TagTable::ensure(&mut conn, " ?! ").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_for_release_and_find() {
        let db = DbEngine::memory().await.unwrap();
        let release = seed_release(db.pool(), "mono", "A", &["dub", "ambient"], 1).await;

        let tags = TagTable::for_release(db.pool(), &release.id).await.unwrap();
        assert_eq!(tags, vec!["ambient", "dub"]);

        assert!(TagTable::find(db.pool(), "DUB").await.unwrap().is_some());
        assert!(TagTable::find(db.pool(), "jazz").await.unwrap().is_none());
    }
}
