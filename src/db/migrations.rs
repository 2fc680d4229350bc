//! Database migrations

use anyhow::Result;
use sqlx::SqlitePool;
use tracing::info;

/// Current migration version
const CURRENT_VERSION: i32 = 2;

/// Run database migrations
pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    let current_version = get_migration_version(pool).await?;

    if current_version >= CURRENT_VERSION {
        info!("Database is up to date (version {})", current_version);
        return Ok(());
    }

    info!(
        "Running migrations from version {} to {}",
        current_version, CURRENT_VERSION
    );

    for version in (current_version + 1)..=CURRENT_VERSION {
        run_migration(pool, version).await?;

        sqlx::query("UPDATE dbmigration SET version = ? WHERE id = 1")
            .bind(version)
            .execute(pool)
            .await?;

        info!("Applied migration {}", version);
    }

    Ok(())
}

async fn run_migration(pool: &SqlitePool, version: i32) -> Result<()> {
    match version {
        1 => {
            // Initial schema is created in create_tables
        }
        2 => {
            // listen counter on tracks, rebuilt from the listen log
            let has_column: i64 = sqlx::query_scalar(
                "SELECT COUNT(*) FROM pragma_table_info('tracks') WHERE name = 'listen_count'",
            )
            .fetch_one(pool)
            .await?;

            if has_column == 0 {
                sqlx::query(
                    "ALTER TABLE tracks ADD COLUMN listen_count INTEGER NOT NULL DEFAULT 0",
                )
                .execute(pool)
                .await?;
            }

            sqlx::query(
                "UPDATE tracks SET listen_count = (SELECT COUNT(*) FROM listens WHERE listens.track_id = tracks.id)",
            )
            .execute(pool)
            .await?;
        }
        _ => {
            tracing::warn!("Unknown migration version: {}", version);
        }
    }

    Ok(())
}

/// Get the current migration version
pub async fn get_migration_version(pool: &SqlitePool) -> Result<i32> {
    let row: (i32,) = sqlx::query_as("SELECT version FROM dbmigration WHERE id = 1")
        .fetch_one(pool)
        .await?;

    Ok(row.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbEngine;
    use sqlx::sqlite::SqlitePoolOptions;

    #[tokio::test]
    async fn test_listen_count_added_and_backfilled() {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();

        // schema as it was at version 1
        sqlx::query(
            r#"
            CREATE TABLE tracks (
                id TEXT PRIMARY KEY,
                release_id TEXT NOT NULL,
                title TEXT NOT NULL,
                track_number INTEGER NOT NULL,
                duration INTEGER NOT NULL DEFAULT 0,
                file_url TEXT NOT NULL
            );
            CREATE TABLE listens (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                track_id TEXT NOT NULL,
                timestamp INTEGER NOT NULL,
                source TEXT NOT NULL
            );
            CREATE TABLE dbmigration (id INTEGER PRIMARY KEY, version INTEGER NOT NULL DEFAULT 0);
            INSERT INTO dbmigration (id, version) VALUES (1, 1);
            INSERT INTO tracks (id, release_id, title, track_number, file_url)
                VALUES ('a', 'r', 'A', 1, '/media/a.mp3'), ('b', 'r', 'B', 2, '/media/b.mp3');
            INSERT INTO listens (track_id, timestamp, source)
                VALUES ('a', 1, 'direct'), ('a', 2, 'session'), ('b', 3, 'direct');
            "#,
        )
        .execute(&pool)
        .await
        .unwrap();

        run_migrations(&pool).await.unwrap();

        let counts: Vec<(String, i64)> =
            sqlx::query_as("SELECT id, listen_count FROM tracks ORDER BY id")
                .fetch_all(&pool)
                .await
                .unwrap();
        assert_eq!(counts, vec![("a".to_string(), 2), ("b".to_string(), 1)]);
        assert_eq!(get_migration_version(&pool).await.unwrap(), CURRENT_VERSION);
    }

    #[tokio::test]
    async fn test_migrations_reach_current_version() {
        let db = DbEngine::memory().await.unwrap();
        assert_eq!(
            get_migration_version(db.pool()).await.unwrap(),
            CURRENT_VERSION
        );

        // running again is a no-op
        run_migrations(db.pool()).await.unwrap();
        assert_eq!(
            get_migration_version(db.pool()).await.unwrap(),
            CURRENT_VERSION
        );
    }
}
