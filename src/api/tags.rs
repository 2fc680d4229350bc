//! Tag API routes

use actix_web::{get, web, HttpResponse, Responder};
use serde::Serialize;
use sqlx::SqlitePool;

use crate::db::tables::TagTable;

/// Tag list response
#[derive(Debug, Serialize)]
pub struct TagsResponse {
    pub tags: Vec<String>,
}

/// All tag names, alphabetically
#[get("")]
pub async fn list_tags(pool: web::Data<SqlitePool>) -> impl Responder {
    match TagTable::names(&pool).await {
        Ok(tags) => HttpResponse::Ok().json(TagsResponse { tags }),
        Err(e) => {
            tracing::error!("Error fetching tags: {:#}", e);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Failed to fetch tags"
            }))
        }
    }
}

/// Configure tag routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(list_tags);
}
