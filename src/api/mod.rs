//! REST API routes for dithertone

pub mod error;
pub mod listens;
pub mod player;
pub mod queue;
pub mod releases;
pub mod sessions;
pub mod tags;
pub mod tracks;
pub mod users;

use actix_web::web;

/// Configure all API routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        // Tag routes
        .service(web::scope("/tags").configure(tags::configure))
        // Track routes
        .service(web::scope("/tracks").configure(tracks::configure))
        // Listen log routes
        .service(web::scope("/listens").configure(listens::configure))
        // Release routes
        .service(web::scope("/releases").configure(releases::configure))
        // User (artist) routes
        .service(web::scope("/users").configure(users::configure))
        // Playback sessions, with their queue and player routes
        .service(
            web::scope("/sessions")
                .configure(sessions::configure)
                .configure(queue::configure)
                .configure(player::configure),
        );
}
