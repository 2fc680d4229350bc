//! Track API routes

use actix_web::{get, post, web, HttpResponse, Responder};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::db::tables::{ListenTable, TrackTable};
use crate::models::ListenSource;

/// Query parameters for track listing
#[derive(Debug, Deserialize)]
pub struct TracksQuery {
    pub limit: Option<u32>,
}

/// Listen response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListenResponse {
    pub success: bool,
    pub listen_count: i64,
}

/// Newest tracks
#[get("")]
pub async fn list_tracks(
    pool: web::Data<SqlitePool>,
    query: web::Query<TracksQuery>,
) -> impl Responder {
    let limit = query.limit.unwrap_or(100).min(1000);

    match TrackTable::all(&pool, limit).await {
        Ok(tracks) => HttpResponse::Ok().json(serde_json::json!({ "tracks": tracks })),
        Err(e) => {
            tracing::error!("Error fetching tracks: {:#}", e);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Failed to fetch tracks"
            }))
        }
    }
}

/// Get track by id
#[get("/{id}")]
pub async fn get_track(pool: web::Data<SqlitePool>, path: web::Path<String>) -> impl Responder {
    let id = path.into_inner();

    match TrackTable::get(&pool, &id).await {
        Ok(Some(track)) => HttpResponse::Ok().json(track),
        Ok(None) => HttpResponse::NotFound().json(serde_json::json!({
            "error": "Track not found"
        })),
        Err(e) => {
            tracing::error!("Error fetching track {}: {:#}", id, e);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Failed to fetch track"
            }))
        }
    }
}

/// Listen count for a track, from the listen log
#[get("/{id}/listens")]
pub async fn get_listens(pool: web::Data<SqlitePool>, path: web::Path<String>) -> impl Responder {
    let id = path.into_inner();

    match ListenTable::count_for_track(&pool, &id).await {
        Ok(count) => HttpResponse::Ok().json(serde_json::json!({
            "trackId": id,
            "listenCount": count,
        })),
        Err(e) => {
            tracing::error!("Error counting listens for {}: {:#}", id, e);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Failed to fetch listens"
            }))
        }
    }
}

/// Record a listen for a track
#[post("/{id}/listen")]
pub async fn record_listen(
    pool: web::Data<SqlitePool>,
    path: web::Path<String>,
) -> impl Responder {
    let id = path.into_inner();

    match TrackTable::record_listen(&pool, &id, ListenSource::Direct).await {
        Ok(Some(listen_count)) => {
            tracing::debug!("Listen tracked for track: {}", id);
            HttpResponse::Ok().json(ListenResponse {
                success: true,
                listen_count,
            })
        }
        Ok(None) => HttpResponse::NotFound().json(serde_json::json!({
            "error": "Track not found"
        })),
        Err(e) => {
            tracing::error!("Error tracking listen for {}: {:#}", id, e);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Failed to track listen"
            }))
        }
    }
}

/// Configure track routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(list_tracks)
        .service(get_track)
        .service(get_listens)
        .service(record_listen);
}
