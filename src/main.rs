//! dithertone - share releases, tag them, and listen together
//!
//! Catalog and playback API server.

mod api;
mod config;
mod core;
mod db;
mod models;
mod stores;
mod utils;

use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

/// dithertone - music sharing server
#[derive(Parser, Debug)]
#[command(name = "dithertone")]
#[command(version)]
#[command(about = "Share releases, browse tags and keep a play queue in sync")]
struct Args {
    /// Host address to bind to
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// Port to listen on
    #[arg(long, default_value_t = 3300)]
    port: u16,

    /// Enable debug mode
    #[arg(long)]
    debug: bool,

    /// Path to config directory
    #[arg(long)]
    config: Option<PathBuf>,

    /// Path to web client
    #[arg(long)]
    client: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = if args.debug { "debug" } else { "info" };

    // sqlx logs every statement at info
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(format!("{},sqlx=warn", log_level)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .init();

    info!("dithertone v{} starting...", env!("CARGO_PKG_VERSION"));

    // Initialize paths
    let paths = config::Paths::init(args.config, args.client)?;
    info!("Config directory: {:?}", paths.config_dir());

    start_dithertone(args.host, args.port).await
}

async fn start_dithertone(host: String, port: u16) -> Result<()> {
    let paths = config::Paths::get()?;
    let user_config = config::UserConfig::load()?;

    // Setup database
    info!("Opening database...");
    let db = db::DbEngine::connect(&paths.app_db_path()).await?;
    let track_count = db::tables::TrackTable::count(db.pool()).await?;
    info!("Catalog has {} tracks", track_count);

    // Start background tasks
    info!("Starting background tasks...");
    let sessions = Arc::new(stores::SessionStore::new(user_config));
    core::crons::start_cron_jobs(Arc::clone(&sessions));

    let pool = web::Data::new(db.pool().clone());
    let sessions = web::Data::from(sessions);
    let client_path = paths.client_path().to_path_buf();
    let media_dir = paths.media_dir();

    // Start the server
    let addr = format!("{}:{}", host, port);
    info!("Server listening on http://{}", addr);

    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header()
            .max_age(3600);

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .app_data(pool.clone())
            .app_data(sessions.clone())
            .service(web::scope("/api").configure(api::configure))
            .service(actix_files::Files::new("/media", media_dir.clone()))
            .service(actix_files::Files::new("/", client_path.clone()).index_file("index.html"))
    })
    .bind(&addr)
    .with_context(|| format!("Failed to bind {}", addr))?
    .run()
    .await?;

    Ok(())
}
