//! Mixtape export consumer
//!
//! Runs as an independent process: consumes export jobs from the queue,
//! rebuilds the playlist view straight from PostgreSQL (this process holds
//! no cache handle) and emails the rendered JSON artifact. Jobs are acked
//! whether or not delivery succeeds; the export contract is
//! fire-and-forget.

use anyhow::{Context, Result};
use clap::Parser;
use futures::StreamExt;
use lapin::options::{BasicAckOptions, BasicConsumeOptions, QueueDeclareOptions};
use lapin::types::FieldTable;
use lapin::{Connection, ConnectionProperties};
use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, Message};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{SmtpTransport, Transport};
use serde::Serialize;
use tracing::{error, info};

use mixtape::config::{AppConfig, SmtpConfig};
use mixtape::core::exporter::{ExportJob, EXPORT_QUEUE};
use mixtape::db::DbEngine;
use mixtape::models::SongSummary;

/// Mixtape export consumer
#[derive(Parser, Debug)]
#[command(name = "mixtape-consumer")]
#[command(version = "0.1.0")]
#[command(about = "Consumes playlist export jobs and emails the rendered artifact")]
struct Args {
    /// Enable debug mode
    #[arg(long)]
    debug: bool,
}

#[derive(Debug, Serialize)]
struct ExportedPlaylist {
    id: String,
    name: String,
    songs: Vec<SongSummary>,
}

#[derive(Debug, Serialize)]
struct ExportArtifact {
    playlist: ExportedPlaylist,
}

/// Rebuild the playlist view for export, straight from the store.
async fn fetch_playlist(db: &DbEngine, playlist_id: &str) -> Result<Option<ExportedPlaylist>> {
    let head: Option<(String, String)> =
        sqlx::query_as("SELECT id, name FROM playlists WHERE id = $1")
            .bind(playlist_id)
            .fetch_optional(db.pool())
            .await?;

    let Some((id, name)) = head else {
        return Ok(None);
    };

    let songs: Vec<SongSummary> = sqlx::query_as(
        "SELECT s.id, s.title, s.performer FROM songs AS s \
         INNER JOIN playlist_songs AS ps ON ps.song_id = s.id \
         WHERE ps.playlist_id = $1",
    )
    .bind(playlist_id)
    .fetch_all(db.pool())
    .await?;

    Ok(Some(ExportedPlaylist { id, name, songs }))
}

#[derive(Clone)]
struct Mailer {
    transport: SmtpTransport,
    sender: Mailbox,
}

impl Mailer {
    fn from_config(config: &SmtpConfig) -> Result<Self> {
        let mut builder = SmtpTransport::builder_dangerous(config.host.as_str()).port(config.port);
        if let (Some(user), Some(password)) = (&config.username, &config.password) {
            builder = builder.credentials(Credentials::new(user.clone(), password.clone()));
        }

        Ok(Self {
            transport: builder.build(),
            sender: config
                .sender
                .parse()
                .with_context(|| format!("invalid SMTP_SENDER '{}'", config.sender))?,
        })
    }

    fn send_playlist(&self, to: &str, artifact: String) -> Result<()> {
        let message = Message::builder()
            .from(self.sender.clone())
            .to(to.parse().context("invalid target email")?)
            .subject("Your playlist export")
            .singlepart(
                Attachment::new("playlist.json".to_string())
                    .body(artifact, ContentType::parse("application/json")?),
            )?;

        self.transport.send(&message)?;
        Ok(())
    }
}

async fn handle_job(db: &DbEngine, mailer: &Mailer, payload: &[u8]) -> Result<()> {
    let job: ExportJob = serde_json::from_slice(payload).context("undecodable export job")?;
    info!(playlist = %job.playlist_id, "processing export job");

    let playlist = fetch_playlist(db, &job.playlist_id)
        .await?
        .with_context(|| format!("playlist {} no longer exists", job.playlist_id))?;

    let artifact = serde_json::to_string_pretty(&ExportArtifact { playlist })?;

    let mailer = mailer.clone();
    let target = job.target_email.clone();
    tokio::task::spawn_blocking(move || mailer.send_playlist(&target, artifact)).await??;

    info!(email = %job.target_email, "export delivered");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let log_level = if args.debug { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::new(format!("{},lapin=warn", log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();

    let config = AppConfig::from_env();

    info!("Mixtape export consumer starting...");

    // the API process owns the schema; this one only reads it
    let db = DbEngine::connect(&config.database_url).await?;
    let mailer = Mailer::from_config(&config.smtp)?;

    let conn = Connection::connect(&config.amqp_url, ConnectionProperties::default())
        .await
        .context("failed to connect to message broker")?;
    let channel = conn.create_channel().await?;

    channel
        .queue_declare(
            EXPORT_QUEUE,
            QueueDeclareOptions {
                durable: true,
                ..Default::default()
            },
            FieldTable::default(),
        )
        .await?;

    let mut consumer = channel
        .basic_consume(
            EXPORT_QUEUE,
            "mixtape-consumer",
            BasicConsumeOptions::default(),
            FieldTable::default(),
        )
        .await?;

    info!("Waiting for export jobs on '{}'", EXPORT_QUEUE);

    while let Some(delivery) = consumer.next().await {
        let delivery = match delivery {
            Ok(delivery) => delivery,
            Err(e) => {
                error!("consume error: {e}");
                continue;
            }
        };

        if let Err(e) = handle_job(&db, &mailer, &delivery.data).await {
            error!("export job failed: {e:#}");
        }

        // ack regardless of outcome: failed jobs are not redelivered
        if let Err(e) = delivery.ack(BasicAckOptions::default()).await {
            error!("ack failed: {e}");
        }
    }

    Ok(())
}
