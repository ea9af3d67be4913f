//! Playlist export route
//!
//! Access is verified before the job is queued; from then on the export is
//! the consumer's problem.

use actix_web::{post, web, HttpResponse};
use serde::Deserialize;
use serde_json::json;

use crate::api::auth::AuthUser;
use crate::core::exporter::{ExportJob, ExportProducer, EXPORT_QUEUE};
use crate::core::playlists::PlaylistService;
use crate::errors::ServiceError;

#[derive(Debug, Deserialize)]
pub struct ExportPayload {
    #[serde(rename = "targetEmail")]
    pub target_email: String,
}

#[post("/export/playlists/{id}")]
pub async fn post_export_playlist(
    playlists: web::Data<PlaylistService>,
    producer: web::Data<ExportProducer>,
    auth: AuthUser,
    path: web::Path<String>,
    body: web::Json<ExportPayload>,
) -> Result<HttpResponse, ServiceError> {
    let playlist_id = path.into_inner();

    playlists
        .verify_playlist_access(&playlist_id, &auth.user_id)
        .await?;

    let job = ExportJob {
        playlist_id,
        target_email: body.target_email.clone(),
    };
    producer
        .send_message(EXPORT_QUEUE, &serde_json::to_vec(&job)?)
        .await?;

    Ok(HttpResponse::Created().json(json!({
        "status": "success",
        "message": "your export request is queued",
    })))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(post_export_playlist);
}
