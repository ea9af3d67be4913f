//! Mixtape - a self-hosted music catalog and collaborative playlist server

use anyhow::Result;
use clap::Parser;
use tracing::info;

use mixtape::api;
use mixtape::config::AppConfig;
use mixtape::core::albums::AlbumService;
use mixtape::core::cache::CacheService;
use mixtape::core::collabs::CollaborationService;
use mixtape::core::exporter::ExportProducer;
use mixtape::core::likes::LikeService;
use mixtape::core::playlists::PlaylistService;
use mixtape::core::songs::SongService;
use mixtape::core::storage::StorageService;
use mixtape::core::users::{AuthenticationService, UserService};
use mixtape::db::DbEngine;

/// Mixtape - music catalog and playlist server
#[derive(Parser, Debug)]
#[command(name = "mixtape")]
#[command(version = "0.1.0")]
#[command(about = "A self-hosted music catalog and collaborative playlist server")]
struct Args {
    /// Host address to bind to (overrides HOST)
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on (overrides PORT)
    #[arg(long)]
    port: Option<u16>,

    /// Enable debug mode
    #[arg(long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    // initialize logging with filters to suppress noisy dependency warnings
    let log_level = if args.debug { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::new(format!("{},sqlx=warn,lapin=warn", log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .init();

    let mut config = AppConfig::from_env();
    if let Some(host) = args.host {
        config.host = host;
    }
    if let Some(port) = args.port {
        config.port = port;
    }

    info!("Mixtape v0.1.0 starting...");

    // Source of truth
    let db = DbEngine::connect(&config.database_url).await?;
    db.create_tables().await?;

    // Cache accessor: redis when configured, in-process otherwise
    let cache = match &config.redis_url {
        Some(url) => {
            let pool = deadpool_redis::Config::from_url(url.as_str())
                .create_pool(Some(deadpool_redis::Runtime::Tokio1))?;
            info!("Using redis cache at {}", url);
            CacheService::new_redis(pool)
        }
        None => {
            info!("REDIS_SERVER not set; using in-process cache");
            CacheService::new_local()
        }
    };

    let storage = StorageService::new(&config.upload_dir)?;
    let producer = ExportProducer::new(config.amqp_url.clone());

    let albums = AlbumService::new(db.clone(), cache.clone());
    let songs = SongService::new(db.clone(), cache.clone());
    let likes = LikeService::new(db.clone(), cache.clone());
    let collabs = CollaborationService::new(db.clone(), cache.clone());
    let playlists = PlaylistService::new(db.clone(), cache.clone(), collabs.clone());
    let users = UserService::new(db.clone(), config.password_salt.clone());
    let authentications = AuthenticationService::new(db.clone());

    let addr = format!("{}:{}", config.host, config.port);
    info!("Server listening on http://{}", addr);

    let upload_dir = config.upload_dir.clone();
    let app_config = config.clone();

    use actix_cors::Cors;
    use actix_web::{middleware, web, App, HttpServer};

    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header()
            .max_age(3600);

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(web::Data::new(app_config.clone()))
            .app_data(web::Data::new(albums.clone()))
            .app_data(web::Data::new(songs.clone()))
            .app_data(web::Data::new(likes.clone()))
            .app_data(web::Data::new(collabs.clone()))
            .app_data(web::Data::new(playlists.clone()))
            .app_data(web::Data::new(users.clone()))
            .app_data(web::Data::new(authentications.clone()))
            .app_data(web::Data::new(storage.clone()))
            .app_data(web::Data::new(producer.clone()))
            .configure(api::configure)
            .service(actix_files::Files::new("/upload/images", upload_dir.clone()))
    })
    .bind(addr)?
    .run()
    .await?;

    Ok(())
}
