//! Play queue routes

use actix_web::{delete, get, post, put, web, HttpResponse};
use serde::Deserialize;
use sqlx::SqlitePool;

use super::error::{ApiError, ApiResult};
use super::sessions::lookup;
use crate::core::{drop_target, PlayQueue};
use crate::db::tables::{ReleaseTable, TrackTable};
use crate::models::{DropPosition, QueueTrack, RepeatMode};
use crate::stores::SessionStore;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayReleaseRequest {
    #[serde(default)]
    pub start_index: usize,
}

/// Either explicit indices or a drop on a row
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum MoveRequest {
    Indices {
        from: usize,
        to: usize,
    },
    Drop {
        dragged: usize,
        target: usize,
        position: DropPosition,
    },
}

#[derive(Debug, Deserialize)]
pub struct RepeatRequest {
    /// Cycles to the next mode when absent
    #[serde(default)]
    pub mode: Option<RepeatMode>,
}

#[derive(Debug, Deserialize)]
pub struct ShuffleRequest {
    /// Toggles when absent
    #[serde(default)]
    pub enabled: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddTracksRequest {
    pub track_ids: Vec<String>,
    #[serde(default)]
    pub play_next: bool,
}

/// Queue a release and start playing it
#[post("/{sid}/queue/release/{release_id}")]
pub async fn play_release(
    pool: web::Data<SqlitePool>,
    store: web::Data<SessionStore>,
    path: web::Path<(String, String)>,
    body: Option<web::Json<PlayReleaseRequest>>,
) -> ApiResult<HttpResponse> {
    let (sid, release_id) = path.into_inner();
    let session = lookup(&store, &sid)?;
    let start_index = body.map(|b| b.start_index).unwrap_or_default();

    let release = ReleaseTable::get(&pool, &release_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Release not found".to_string()))?;

    let tracks: Vec<QueueTrack> = release.tracks.into_iter().map(QueueTrack::from).collect();
    let queue = PlayQueue::from_release(&release.id, tracks, start_index)?;

    let mut session = session.lock();
    session.play_queue(queue);
    Ok(HttpResponse::Ok().json(session.snapshot()))
}

/// Queue every track in random order
#[post("/{sid}/queue/shuffle-all")]
pub async fn shuffle_all(
    pool: web::Data<SqlitePool>,
    store: web::Data<SessionStore>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let session = lookup(&store, &path)?;
    let limit = store.config().shuffle_all_limit;

    let tracks: Vec<QueueTrack> = TrackTable::all(&pool, limit)
        .await?
        .into_iter()
        .map(QueueTrack::from)
        .collect();
    if tracks.is_empty() {
        return Err(ApiError::NotFound("No tracks to shuffle".to_string()));
    }

    let queue = PlayQueue::shuffled(tracks, &mut rand::thread_rng())?;

    let mut session = session.lock();
    session.play_queue(queue);
    Ok(HttpResponse::Ok().json(session.snapshot()))
}

#[get("/{sid}/queue")]
pub async fn get_queue(
    store: web::Data<SessionStore>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let session = lookup(&store, &path)?;
    let session = session.lock();
    let queue = session
        .queue()
        .ok_or_else(|| ApiError::NotFound("Nothing queued".to_string()))?;
    Ok(HttpResponse::Ok().json(queue))
}

#[post("/{sid}/queue/next")]
pub async fn next(
    store: web::Data<SessionStore>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let session = lookup(&store, &path)?;
    let mut session = session.lock();
    if session.next().is_none() {
        tracing::debug!("Already at the end of the queue");
    }
    Ok(HttpResponse::Ok().json(session.snapshot()))
}

#[post("/{sid}/queue/previous")]
pub async fn previous(
    store: web::Data<SessionStore>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let session = lookup(&store, &path)?;
    let mut session = session.lock();
    session.previous();
    Ok(HttpResponse::Ok().json(session.snapshot()))
}

#[post("/{sid}/queue/goto/{index}")]
pub async fn go_to(
    store: web::Data<SessionStore>,
    path: web::Path<(String, usize)>,
) -> ApiResult<HttpResponse> {
    let (sid, index) = path.into_inner();
    let session = lookup(&store, &sid)?;
    let mut session = session.lock();
    session.go_to(index)?;
    Ok(HttpResponse::Ok().json(session.snapshot()))
}

#[delete("/{sid}/queue/{index}")]
pub async fn remove(
    store: web::Data<SessionStore>,
    path: web::Path<(String, usize)>,
) -> ApiResult<HttpResponse> {
    let (sid, index) = path.into_inner();
    let session = lookup(&store, &sid)?;
    let mut session = session.lock();
    session.remove_from_queue(index)?;
    Ok(HttpResponse::Ok().json(session.snapshot()))
}

/// Reorder the queue, by indices or by drag and drop
#[post("/{sid}/queue/move")]
pub async fn move_track(
    store: web::Data<SessionStore>,
    path: web::Path<String>,
    body: web::Json<MoveRequest>,
) -> ApiResult<HttpResponse> {
    let (from, to) = match body.into_inner() {
        MoveRequest::Indices { from, to } => (from, Some(to)),
        MoveRequest::Drop {
            dragged,
            target,
            position,
        } => (dragged, drop_target(dragged, target, position)),
    };

    let session = lookup(&store, &path)?;
    let mut session = session.lock();
    if let Some(to) = to {
        session.move_in_queue(from, to)?;
    }
    Ok(HttpResponse::Ok().json(session.snapshot()))
}

#[put("/{sid}/queue/repeat")]
pub async fn set_repeat(
    store: web::Data<SessionStore>,
    path: web::Path<String>,
    body: web::Json<RepeatRequest>,
) -> ApiResult<HttpResponse> {
    let session = lookup(&store, &path)?;
    let mut session = session.lock();
    let queue = session
        .queue_mut()
        .ok_or_else(|| ApiError::NotFound("Nothing queued".to_string()))?;

    match body.mode {
        Some(mode) => queue.set_repeat(mode),
        None => {
            queue.cycle_repeat();
        }
    }
    Ok(HttpResponse::Ok().json(session.snapshot()))
}

#[put("/{sid}/queue/shuffle")]
pub async fn set_shuffle(
    store: web::Data<SessionStore>,
    path: web::Path<String>,
    body: web::Json<ShuffleRequest>,
) -> ApiResult<HttpResponse> {
    let session = lookup(&store, &path)?;
    let mut session = session.lock();
    let queue = session
        .queue_mut()
        .ok_or_else(|| ApiError::NotFound("Nothing queued".to_string()))?;

    let enabled = body.enabled.unwrap_or(!queue.is_shuffled());
    queue.set_shuffle(enabled, &mut rand::thread_rng());
    session.sync_track_index();
    Ok(HttpResponse::Ok().json(session.snapshot()))
}

/// Add tracks at the end of the queue, or right after the current track
#[post("/{sid}/queue/tracks")]
pub async fn add_tracks(
    pool: web::Data<SqlitePool>,
    store: web::Data<SessionStore>,
    path: web::Path<String>,
    body: web::Json<AddTracksRequest>,
) -> ApiResult<HttpResponse> {
    let session = lookup(&store, &path)?;
    if body.track_ids.is_empty() {
        return Err(ApiError::BadRequest("No tracks given".to_string()));
    }

    let mut tracks = Vec::with_capacity(body.track_ids.len());
    for id in &body.track_ids {
        let track = TrackTable::get(&pool, id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("Track {} not found", id)))?;
        tracks.push(QueueTrack::from(track));
    }

    let mut session = session.lock();
    if let Some(queue) = session.queue_mut() {
        if body.play_next {
            queue.insert_next(tracks);
        } else {
            queue.append(tracks);
        }
    } else {
        session.play_queue(PlayQueue::from_tracks(tracks, 0)?);
    }
    Ok(HttpResponse::Ok().json(session.snapshot()))
}

/// Configure queue routes, nested under a session
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(play_release)
        .service(shuffle_all)
        .service(get_queue)
        .service(next)
        .service(previous)
        .service(go_to)
        .service(move_track)
        .service(set_repeat)
        .service(set_shuffle)
        .service(add_tracks)
        .service(remove);
}
