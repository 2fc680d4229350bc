//! Player routes
//!
//! Mounted player components report what they show and what the user did.
//! The session decides which one owns the audio handle.

use actix_web::{post, web, HttpResponse};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use super::error::{ApiError, ApiResult};
use super::sessions::lookup;
use crate::core::playback::NowPlaying;
use crate::core::{PlayerView, ToggleOutcome};
use crate::db::tables::TrackTable;
use crate::models::ListenSource;
use crate::stores::SessionStore;

#[derive(Debug, Deserialize)]
pub struct SeekRequest {
    pub player: PlayerView,
    /// Absolute position in seconds
    #[serde(default)]
    pub time: Option<f64>,
    /// Position as a fraction of the progress bar
    #[serde(default)]
    pub fraction: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressRequest {
    /// Source the report is about
    pub src: String,
    pub current_time: f64,
    pub duration: f64,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub registered: bool,
    #[serde(flatten)]
    pub now_playing: NowPlaying,
}

#[derive(Debug, Serialize)]
pub struct ToggleResponse {
    pub outcome: ToggleOutcome,
    #[serde(flatten)]
    pub now_playing: NowPlaying,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub listen_count: Option<i64>,
    #[serde(flatten)]
    pub now_playing: NowPlaying,
}

/// A player mounted or changed its track
#[post("/{sid}/player/register")]
pub async fn register(
    store: web::Data<SessionStore>,
    path: web::Path<String>,
    body: web::Json<PlayerView>,
) -> ApiResult<HttpResponse> {
    let session = lookup(&store, &path)?;
    let mut session = session.lock();
    let registered = session.register(&body);
    Ok(HttpResponse::Ok().json(RegisterResponse {
        registered,
        now_playing: session.snapshot(),
    }))
}

/// Play/pause button
#[post("/{sid}/player/toggle")]
pub async fn toggle(
    store: web::Data<SessionStore>,
    path: web::Path<String>,
    body: web::Json<PlayerView>,
) -> ApiResult<HttpResponse> {
    let session = lookup(&store, &path)?;
    let mut session = session.lock();
    let outcome = session.toggle(&body);
    tracing::debug!("Player {} toggled: {:?}", body.id(), outcome);
    Ok(HttpResponse::Ok().json(ToggleResponse {
        outcome,
        now_playing: session.snapshot(),
    }))
}

#[post("/{sid}/player/seek")]
pub async fn seek(
    store: web::Data<SessionStore>,
    path: web::Path<String>,
    body: web::Json<SeekRequest>,
) -> ApiResult<HttpResponse> {
    let session = lookup(&store, &path)?;
    let mut session = session.lock();

    match (body.time, body.fraction) {
        (Some(time), _) => session.seek(&body.player, time),
        (None, Some(fraction)) => session.seek_fraction(&body.player, fraction),
        (None, None) => {
            return Err(ApiError::BadRequest(
                "Either time or fraction is required".to_string(),
            ))
        }
    }
    Ok(HttpResponse::Ok().json(session.snapshot()))
}

#[post("/{sid}/player/restart")]
pub async fn restart(
    store: web::Data<SessionStore>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let session = lookup(&store, &path)?;
    let mut session = session.lock();
    session.restart();
    Ok(HttpResponse::Ok().json(session.snapshot()))
}

/// Media progress; records a listen once the track has played long enough
#[post("/{sid}/player/progress")]
pub async fn progress(
    pool: web::Data<SqlitePool>,
    store: web::Data<SessionStore>,
    path: web::Path<String>,
    body: web::Json<ProgressRequest>,
) -> ApiResult<HttpResponse> {
    let session = lookup(&store, &path)?;

    // the lock is released before touching the database
    let (listen, now_playing) = {
        let mut session = session.lock();
        let listen = session.progress(&body.src, body.current_time, body.duration);
        (listen, session.snapshot())
    };

    let mut listen_count = None;
    if let Some(track_id) = listen {
        match TrackTable::record_listen(&pool, &track_id, ListenSource::Session).await {
            Ok(Some(count)) => {
                tracing::debug!("Listen tracked for track: {}", track_id);
                listen_count = Some(count);
            }
            Ok(None) => tracing::warn!("Listen for unknown track {}", track_id),
            Err(e) => tracing::error!("Error tracking listen for {}: {:#}", track_id, e),
        }
    }

    Ok(HttpResponse::Ok().json(ProgressResponse {
        listen_count,
        now_playing,
    }))
}

/// The current track finished
#[post("/{sid}/player/ended")]
pub async fn ended(
    store: web::Data<SessionStore>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let session = lookup(&store, &path)?;
    let mut session = session.lock();
    if session.ended().is_none() {
        tracing::debug!("Queue finished");
    }
    Ok(HttpResponse::Ok().json(session.snapshot()))
}

/// The client could not start playback (autoplay policy and the like)
#[post("/{sid}/player/rejected")]
pub async fn rejected(
    store: web::Data<SessionStore>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let session = lookup(&store, &path)?;
    let mut session = session.lock();
    session.playback_rejected();
    Ok(HttpResponse::Ok().json(session.snapshot()))
}

/// Configure player routes, nested under a session
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(register)
        .service(toggle)
        .service(seek)
        .service(restart)
        .service(progress)
        .service(ended)
        .service(rejected);
}

#[cfg(test)]
mod tests {
    use actix_web::{test, web, App};
    use serde_json::{json, Value};

    use crate::api;
    use crate::config::UserConfig;
    use crate::db::tables::{seed_release, ListenTable, TrackTable};
    use crate::db::DbEngine;
    use crate::stores::SessionStore;

    macro_rules! app {
        ($db:expr) => {
            test::init_service(
                App::new()
                    .app_data(web::Data::new($db.pool().clone()))
                    .app_data(web::Data::new(SessionStore::new(UserConfig::default())))
                    .service(web::scope("/api").configure(api::configure)),
            )
            .await
        };
    }

    macro_rules! call {
        ($app:expr, $uri:expr, $body:expr) => {{
            let req = test::TestRequest::post()
                .uri(&$uri)
                .set_json($body)
                .to_request();
            let body: Value = test::call_and_read_body_json(&$app, req).await;
            body
        }};
    }

    macro_rules! open_session {
        ($app:expr) => {{
            let req = test::TestRequest::post().uri("/api/sessions").to_request();
            let body: Value = test::call_and_read_body_json(&$app, req).await;
            body["sessionId"].as_str().unwrap().to_string()
        }};
    }

    fn player(track: &str) -> Value {
        json!({
            "src": format!("/media/{}.mp3", track),
            "title": format!("1. Song {}", track),
            "artist": "mono",
            "trackId": track,
            "releaseId": "r1",
            "trackIndex": 0
        })
    }

    #[actix_web::test]
    async fn test_toggle_twice_pauses() {
        let db = DbEngine::memory().await.unwrap();
        let app = app!(db);
        let sid = open_session!(app);
        let uri = format!("/api/sessions/{}/player/toggle", sid);

        let state = call!(app, uri, player("t1"));
        assert_eq!(state["outcome"], "playing");
        assert_eq!(state["activePlayer"], "player-t1");
        assert_eq!(state["track"]["title"], "Song t1");

        let state = call!(app, uri, player("t1"));
        assert_eq!(state["outcome"], "paused");
        assert_eq!(state["isPlaying"], false);
        assert_eq!(state["activePlayer"], "player-t1");
    }

    #[actix_web::test]
    async fn test_register_matching_player_takes_over() {
        let db = DbEngine::memory().await.unwrap();
        let app = app!(db);
        let sid = open_session!(app);

        call!(app, format!("/api/sessions/{}/player/toggle", sid), player("t1"));

        let mut bar = player("t1");
        bar["playerId"] = json!("now-playing-bar");
        let state = call!(app, format!("/api/sessions/{}/player/register", sid), bar);
        assert_eq!(state["registered"], true);
        assert_eq!(state["activePlayer"], "now-playing-bar");
        assert_eq!(state["isPlaying"], true);

        // a different track does not steal the handle
        let state = call!(
            app,
            format!("/api/sessions/{}/player/register", sid),
            player("t2")
        );
        assert_eq!(state["registered"], false);
        assert_eq!(state["activePlayer"], "now-playing-bar");
    }

    #[actix_web::test]
    async fn test_seek_and_restart() {
        let db = DbEngine::memory().await.unwrap();
        let app = app!(db);
        let sid = open_session!(app);

        call!(app, format!("/api/sessions/{}/player/toggle", sid), player("t1"));
        call!(
            app,
            format!("/api/sessions/{}/player/progress", sid),
            json!({"src": "/media/t1.mp3", "currentTime": 1.0, "duration": 200.0})
        );

        let state = call!(
            app,
            format!("/api/sessions/{}/player/seek", sid),
            json!({"player": player("t1"), "fraction": 0.5})
        );
        assert_eq!(state["currentTime"], 100.0);
        assert_eq!(state["elapsed"], "1:40");
        assert_eq!(state["total"], "3:20");

        let state = call!(
            app,
            format!("/api/sessions/{}/player/seek", sid),
            json!({"player": player("t1"), "time": 500.0})
        );
        assert_eq!(state["currentTime"], 200.0);

        let req = test::TestRequest::post()
            .uri(&format!("/api/sessions/{}/player/restart", sid))
            .to_request();
        let state: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(state["currentTime"], 0.0);

        let req = test::TestRequest::post()
            .uri(&format!("/api/sessions/{}/player/seek", sid))
            .set_json(json!({"player": player("t1")}))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 400);
    }

    #[actix_web::test]
    async fn test_progress_records_listen_once() {
        let db = DbEngine::memory().await.unwrap();
        let release = seed_release(db.pool(), "mono", "Tide", &[], 2).await;
        let track_id = release.tracks[0].id.clone();
        let src = release.tracks[0].file_url.clone();
        let app = app!(db);
        let sid = open_session!(app);

        let req = test::TestRequest::post()
            .uri(&format!("/api/sessions/{}/queue/release/{}", sid, release.id))
            .to_request();
        test::call_service(&app, req).await;

        let uri = format!("/api/sessions/{}/player/progress", sid);
        let state = call!(app, uri, json!({"src": src, "currentTime": 10.0, "duration": 200.0}));
        assert!(state.get("listenCount").is_none());
        assert_eq!(state["listenRecorded"], false);

        let state = call!(app, uri, json!({"src": src, "currentTime": 31.0, "duration": 200.0}));
        assert_eq!(state["listenCount"], 1);
        assert_eq!(state["listenRecorded"], true);

        let state = call!(app, uri, json!({"src": src, "currentTime": 60.0, "duration": 200.0}));
        assert!(state.get("listenCount").is_none());

        assert_eq!(
            ListenTable::count_for_track(db.pool(), &track_id).await.unwrap(),
            1
        );
        let track = TrackTable::get(db.pool(), &track_id).await.unwrap().unwrap();
        assert_eq!(track.listen_count, 1);
    }

    #[actix_web::test]
    async fn test_late_progress_for_previous_track() {
        let db = DbEngine::memory().await.unwrap();
        let release = seed_release(db.pool(), "mono", "Tide", &[], 2).await;
        let first_src = release.tracks[0].file_url.clone();
        let second_id = release.tracks[1].id.clone();
        let app = app!(db);
        let sid = open_session!(app);

        let req = test::TestRequest::post()
            .uri(&format!("/api/sessions/{}/queue/release/{}", sid, release.id))
            .to_request();
        test::call_service(&app, req).await;

        let uri = format!("/api/sessions/{}/player/progress", sid);
        call!(app, uri, json!({"src": first_src, "currentTime": 20.0, "duration": 200.0}));

        let req = test::TestRequest::post()
            .uri(&format!("/api/sessions/{}/queue/next", sid))
            .to_request();
        test::call_service(&app, req).await;

        let state = call!(app, uri, json!({"src": first_src, "currentTime": 45.0, "duration": 200.0}));
        assert!(state.get("listenCount").is_none());
        assert_eq!(state["currentTime"], 0.0);
        assert_eq!(state["listenRecorded"], false);

        let track = TrackTable::get(db.pool(), &second_id).await.unwrap().unwrap();
        assert_eq!(track.listen_count, 0);
    }

    #[actix_web::test]
    async fn test_ended_advances_and_stops() {
        let db = DbEngine::memory().await.unwrap();
        let release = seed_release(db.pool(), "mono", "Tide", &[], 2).await;
        let app = app!(db);
        let sid = open_session!(app);

        let req = test::TestRequest::post()
            .uri(&format!("/api/sessions/{}/queue/release/{}", sid, release.id))
            .to_request();
        test::call_service(&app, req).await;

        let uri = format!("/api/sessions/{}/player/ended", sid);
        let req = test::TestRequest::post().uri(&uri).to_request();
        let state: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(state["track"]["title"], "Tide 2");
        assert_eq!(state["isPlaying"], true);

        let req = test::TestRequest::post().uri(&uri).to_request();
        let state: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(state["track"]["title"], "Tide 2");
        assert_eq!(state["isPlaying"], false);
    }

    #[actix_web::test]
    async fn test_rejected_pauses() {
        let db = DbEngine::memory().await.unwrap();
        let app = app!(db);
        let sid = open_session!(app);

        call!(app, format!("/api/sessions/{}/player/toggle", sid), player("t1"));
        let req = test::TestRequest::post()
            .uri(&format!("/api/sessions/{}/player/rejected", sid))
            .to_request();
        let state: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(state["isPlaying"], false);
        assert_eq!(state["activePlayer"], "player-t1");
    }
}
