//! Collaboration routes: only the playlist owner may add or remove
//! collaborators.

use actix_web::{delete, post, web, HttpResponse};
use serde::Deserialize;
use serde_json::json;

use crate::api::auth::AuthUser;
use crate::core::collabs::CollaborationService;
use crate::core::playlists::PlaylistService;
use crate::core::users::UserService;
use crate::errors::ServiceError;

#[derive(Debug, Deserialize)]
pub struct CollaborationPayload {
    #[serde(rename = "playlistId")]
    pub playlist_id: String,
    #[serde(rename = "userId")]
    pub user_id: String,
}

#[post("/collaborations")]
pub async fn post_collaboration(
    collabs: web::Data<CollaborationService>,
    playlists: web::Data<PlaylistService>,
    users: web::Data<UserService>,
    auth: AuthUser,
    body: web::Json<CollaborationPayload>,
) -> Result<HttpResponse, ServiceError> {
    playlists
        .verify_playlist_owner(&body.playlist_id, &auth.user_id)
        .await?;
    users.get_user_by_id(&body.user_id).await?;

    let collaboration_id = collabs
        .add_collaboration(&body.playlist_id, &body.user_id)
        .await?;

    Ok(HttpResponse::Created().json(json!({
        "status": "success",
        "message": "collaboration added",
        "data": { "collaborationId": collaboration_id },
    })))
}

#[delete("/collaborations")]
pub async fn delete_collaboration(
    collabs: web::Data<CollaborationService>,
    playlists: web::Data<PlaylistService>,
    auth: AuthUser,
    body: web::Json<CollaborationPayload>,
) -> Result<HttpResponse, ServiceError> {
    playlists
        .verify_playlist_owner(&body.playlist_id, &auth.user_id)
        .await?;

    collabs
        .delete_collaboration(&body.playlist_id, &body.user_id)
        .await?;

    Ok(HttpResponse::Ok().json(json!({
        "status": "success",
        "message": "collaboration deleted",
    })))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(post_collaboration).service(delete_collaboration);
}
