//! User API routes

use actix_web::{get, post, web, HttpResponse, Responder};
use serde::Deserialize;
use sqlx::SqlitePool;

use crate::db::tables::{ReleaseTable, UserTable};
use crate::models::User;

/// Body for creating a user
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub username: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

/// Find a user by username, falling back to the user id
async fn find_user(pool: &SqlitePool, key: &str) -> anyhow::Result<Option<User>> {
    match UserTable::get_by_username(pool, key).await? {
        Some(user) => Ok(Some(user)),
        None => UserTable::get(pool, key).await,
    }
}

/// Artist page: the user and their releases
#[get("/{username}")]
pub async fn get_user(pool: web::Data<SqlitePool>, path: web::Path<String>) -> impl Responder {
    let username = path.into_inner();

    let user = match find_user(&pool, &username).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            return HttpResponse::NotFound().json(serde_json::json!({
                "error": "User not found"
            }))
        }
        Err(e) => {
            tracing::error!("Error fetching user {}: {:#}", username, e);
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Failed to fetch user"
            }));
        }
    };

    match ReleaseTable::for_artist(&pool, &user.id).await {
        Ok(releases) => HttpResponse::Ok().json(serde_json::json!({
            "user": user,
            "displayName": user.name(),
            "releases": releases,
        })),
        Err(e) => {
            tracing::error!("Error fetching releases for {}: {:#}", username, e);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Failed to fetch user"
            }))
        }
    }
}

/// Create a user
#[post("")]
pub async fn create_user(
    pool: web::Data<SqlitePool>,
    body: web::Json<CreateUserRequest>,
) -> impl Responder {
    let username = body.username.trim();
    if username.is_empty() {
        return HttpResponse::BadRequest().json(serde_json::json!({
            "error": "Username is required"
        }));
    }

    match UserTable::get_by_username(&pool, username).await {
        Ok(Some(_)) => {
            return HttpResponse::Conflict().json(serde_json::json!({
                "error": "Username already taken"
            }))
        }
        Ok(None) => {}
        Err(e) => {
            tracing::error!("Error checking username {}: {:#}", username, e);
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Failed to create user"
            }));
        }
    }

    let display_name = body
        .display_name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty());

    match UserTable::create(&pool, username, display_name).await {
        Ok(user) => {
            tracing::info!("Created user {}", user.username);
            HttpResponse::Created().json(user)
        }
        Err(e) => {
            tracing::error!("Error creating user {}: {:#}", username, e);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Failed to create user"
            }))
        }
    }
}

/// Configure user routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(get_user).service(create_user);
}
