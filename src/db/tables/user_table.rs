//! User table operations

use anyhow::Result;
use sqlx::{FromRow, SqliteConnection, SqlitePool};

use crate::models::User;

/// Database row for users table
#[derive(Debug, FromRow)]
struct UserRow {
    id: String,
    username: String,
    display_name: Option<String>,
    created_at: i64,
}

impl UserRow {
    fn into_user(self) -> User {
        User {
            id: self.id,
            username: self.username,
            display_name: self.display_name,
            created_at: self.created_at,
        }
    }
}

/// User table operations
pub struct UserTable;

impl UserTable {
    /// Create a user; fails when the username is taken
    pub async fn create(
        pool: &SqlitePool,
        username: &str,
        display_name: Option<&str>,
    ) -> Result<User> {
        let mut conn = pool.acquire().await?;
        Self::insert(&mut conn, username, display_name).await
    }

    async fn insert(
        conn: &mut SqliteConnection,
        username: &str,
        display_name: Option<&str>,
    ) -> Result<User> {
        let id = uuid::Uuid::new_v4().to_string();
        let created_at = chrono::Utc::now().timestamp();

        sqlx::query(
            "INSERT INTO users (id, username, display_name, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(username)
        .bind(display_name)
        .bind(created_at)
        .execute(&mut *conn)
        .await?;

        Ok(User {
            id,
            username: username.to_string(),
            display_name: display_name.map(String::from),
            created_at,
        })
    }

    /// Get user by ID
    pub async fn get(pool: &SqlitePool, id: &str) -> Result<Option<User>> {
        let row: Option<UserRow> = sqlx::query_as("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(pool)
            .await?;

        Ok(row.map(|r| r.into_user()))
    }

    /// Get user by username
    pub async fn get_by_username(pool: &SqlitePool, username: &str) -> Result<Option<User>> {
        let mut conn = pool.acquire().await?;
        Self::find_by_username(&mut conn, username).await
    }

    async fn find_by_username(
        conn: &mut SqliteConnection,
        username: &str,
    ) -> Result<Option<User>> {
        let row: Option<UserRow> = sqlx::query_as("SELECT * FROM users WHERE username = ?")
            .bind(username)
            .fetch_optional(&mut *conn)
            .await?;

        Ok(row.map(|r| r.into_user()))
    }

    /// Find the user publishing under `username`, creating it on first use
    pub async fn get_or_create(conn: &mut SqliteConnection, username: &str) -> Result<User> {
        if let Some(user) = Self::find_by_username(conn, username).await? {
            return Ok(user);
        }
        Self::insert(conn, username, None).await
    }
}
