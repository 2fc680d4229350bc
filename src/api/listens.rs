//! Listen log routes

use actix_web::{get, web, HttpResponse, Responder};
use serde::Deserialize;
use sqlx::SqlitePool;

use crate::db::tables::ListenTable;

#[derive(Debug, Deserialize)]
pub struct RecentQuery {
    pub limit: Option<u32>,
}

/// Most recent listens
#[get("")]
pub async fn recent_listens(
    pool: web::Data<SqlitePool>,
    query: web::Query<RecentQuery>,
) -> impl Responder {
    let limit = query.limit.unwrap_or(50).min(500);

    match ListenTable::recent(&pool, limit).await {
        Ok(listens) => HttpResponse::Ok().json(serde_json::json!({ "listens": listens })),
        Err(e) => {
            tracing::error!("Error fetching listens: {:#}", e);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Failed to fetch listens"
            }))
        }
    }
}

/// Configure listen routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(recent_listens);
}
