//! Release API routes

use actix_web::{delete, get, post, web, HttpResponse, Responder};
use serde::Deserialize;
use sqlx::SqlitePool;

use crate::db::tables::{ReleaseTable, TagTable};
use crate::models::NewRelease;

/// Query parameters for release listing
#[derive(Debug, Deserialize)]
pub struct ReleasesQuery {
    pub tag: Option<String>,
    #[serde(default = "default_limit")]
    pub limit: u32,
    #[serde(default)]
    pub start: u32,
}

fn default_limit() -> u32 {
    50
}

/// Newest releases, optionally for one tag
#[get("")]
pub async fn list_releases(
    pool: web::Data<SqlitePool>,
    query: web::Query<ReleasesQuery>,
) -> impl Responder {
    let limit = query.limit.clamp(1, 200);

    let tag_id = match query.tag.as_deref().filter(|t| !t.trim().is_empty()) {
        Some(name) => match TagTable::find(&pool, name).await {
            Ok(Some(tag)) => Some(tag.id),
            // unknown tag: nothing is tagged with it
            Ok(None) => return HttpResponse::Ok().json(serde_json::json!({ "releases": [] })),
            Err(e) => {
                tracing::error!("Error looking up tag {}: {:#}", name, e);
                return HttpResponse::InternalServerError().json(serde_json::json!({
                    "error": "Failed to fetch releases"
                }));
            }
        },
        None => None,
    };

    match ReleaseTable::list(&pool, tag_id, limit, query.start).await {
        Ok(releases) => HttpResponse::Ok().json(serde_json::json!({ "releases": releases })),
        Err(e) => {
            tracing::error!("Error fetching releases: {:#}", e);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Failed to fetch releases"
            }))
        }
    }
}

/// Release with tracks and tags
#[get("/{id}")]
pub async fn get_release(pool: web::Data<SqlitePool>, path: web::Path<String>) -> impl Responder {
    let id = path.into_inner();

    match ReleaseTable::get(&pool, &id).await {
        Ok(Some(release)) => HttpResponse::Ok().json(release),
        Ok(None) => HttpResponse::NotFound().json(serde_json::json!({
            "error": "Release not found"
        })),
        Err(e) => {
            tracing::error!("Error fetching release {}: {:#}", id, e);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Failed to fetch release"
            }))
        }
    }
}

/// Publish a release
#[post("")]
pub async fn create_release(
    pool: web::Data<SqlitePool>,
    body: web::Json<NewRelease>,
) -> impl Responder {
    let new = body.into_inner();

    if let Err(message) = new.validate() {
        return HttpResponse::BadRequest().json(serde_json::json!({ "error": message }));
    }

    let created = match ReleaseTable::create(&pool, &new).await {
        Ok(id) => ReleaseTable::get(&pool, &id).await,
        Err(e) => Err(e),
    };

    match created {
        Ok(Some(release)) => {
            tracing::info!(
                "Published release {} by {} ({} tracks)",
                release.title,
                release.artist,
                release.tracks.len()
            );
            HttpResponse::Created().json(release)
        }
        Ok(None) => HttpResponse::InternalServerError().json(serde_json::json!({
            "error": "Failed to create release"
        })),
        Err(e) => {
            tracing::error!("Error creating release: {:#}", e);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Failed to create release"
            }))
        }
    }
}

/// Delete a release with its tracks and listens
#[delete("/{id}")]
pub async fn delete_release(
    pool: web::Data<SqlitePool>,
    path: web::Path<String>,
) -> impl Responder {
    let id = path.into_inner();

    match ReleaseTable::delete(&pool, &id).await {
        Ok(true) => HttpResponse::Ok().json(serde_json::json!({ "success": true })),
        Ok(false) => HttpResponse::NotFound().json(serde_json::json!({
            "error": "Release not found"
        })),
        Err(e) => {
            tracing::error!("Error deleting release {}: {:#}", id, e);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Failed to delete release"
            }))
        }
    }
}

/// Configure release routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(list_releases)
        .service(get_release)
        .service(create_release)
        .service(delete_release);
}
