//! Playback session routes

use std::sync::Arc;

use actix_web::{delete, get, post, web, HttpResponse};
use parking_lot::Mutex;
use serde::Serialize;

use super::error::{ApiError, ApiResult};
use crate::core::PlaybackSession;
use crate::stores::SessionStore;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionCreated {
    pub session_id: String,
}

/// Resolve a session id from the path
pub(crate) fn lookup(store: &SessionStore, sid: &str) -> ApiResult<Arc<Mutex<PlaybackSession>>> {
    store
        .get(sid)
        .ok_or_else(|| ApiError::NotFound("Session not found".to_string()))
}

/// Open a playback session
#[post("")]
pub async fn create_session(store: web::Data<SessionStore>) -> HttpResponse {
    let session_id = store.create();
    HttpResponse::Created().json(SessionCreated { session_id })
}

/// Now playing state of a session
#[get("/{sid}")]
pub async fn get_session(
    store: web::Data<SessionStore>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let session = lookup(&store, &path)?;
    let snapshot = session.lock().snapshot();
    Ok(HttpResponse::Ok().json(snapshot))
}

/// Close a session
#[delete("/{sid}")]
pub async fn delete_session(
    store: web::Data<SessionStore>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    if !store.remove(&path) {
        return Err(ApiError::NotFound("Session not found".to_string()));
    }
    tracing::debug!("Closed playback session {}", path.as_str());
    Ok(HttpResponse::NoContent().finish())
}

/// Configure session routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(create_session)
        .service(get_session)
        .service(delete_session);
}
