//! Playlist routes
//!
//! Membership mutations append to the activity log right after the
//! membership write succeeds; the two writes are sequenced here rather
//! than wrapped in a transaction.

use actix_web::{delete, get, post, web, HttpResponse};
use serde::Deserialize;
use serde_json::json;

use crate::api::auth::AuthUser;
use crate::api::DATA_SOURCE_HEADER;
use crate::core::playlists::PlaylistService;
use crate::core::songs::SongService;
use crate::errors::ServiceError;
use crate::models::ActivityAction;

#[derive(Debug, Deserialize)]
pub struct PlaylistPayload {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct PlaylistSongPayload {
    #[serde(rename = "songId")]
    pub song_id: String,
}

#[post("/playlists")]
pub async fn post_playlist(
    playlists: web::Data<PlaylistService>,
    auth: AuthUser,
    body: web::Json<PlaylistPayload>,
) -> Result<HttpResponse, ServiceError> {
    let playlist_id = playlists.add_playlist(&body.name, &auth.user_id).await?;

    Ok(HttpResponse::Created().json(json!({
        "status": "success",
        "message": "playlist added",
        "data": { "playlistId": playlist_id },
    })))
}

#[get("/playlists")]
pub async fn get_playlists(
    playlists: web::Data<PlaylistService>,
    auth: AuthUser,
) -> Result<HttpResponse, ServiceError> {
    let listing = playlists.get_playlists(&auth.user_id).await?;

    let mut response = HttpResponse::Ok();
    if listing.from_cache {
        response.insert_header(DATA_SOURCE_HEADER);
    }

    Ok(response.json(json!({
        "status": "success",
        "data": { "playlists": listing.value },
    })))
}

#[delete("/playlists/{id}")]
pub async fn delete_playlist_by_id(
    playlists: web::Data<PlaylistService>,
    auth: AuthUser,
    path: web::Path<String>,
) -> Result<HttpResponse, ServiceError> {
    let id = path.into_inner();

    playlists.verify_playlist_owner(&id, &auth.user_id).await?;
    playlists.delete_playlist_by_id(&id).await?;

    Ok(HttpResponse::Ok().json(json!({
        "status": "success",
        "message": "playlist deleted",
    })))
}

#[post("/playlists/{id}/songs")]
pub async fn post_playlist_song(
    playlists: web::Data<PlaylistService>,
    songs: web::Data<SongService>,
    auth: AuthUser,
    path: web::Path<String>,
    body: web::Json<PlaylistSongPayload>,
) -> Result<HttpResponse, ServiceError> {
    let playlist_id = path.into_inner();

    songs.get_song_by_id(&body.song_id).await?;
    playlists
        .verify_playlist_access(&playlist_id, &auth.user_id)
        .await?;

    playlists
        .add_song_to_playlist(&playlist_id, &body.song_id)
        .await?;
    playlists
        .add_activity(
            &playlist_id,
            &body.song_id,
            &auth.user_id,
            ActivityAction::Add,
        )
        .await?;

    Ok(HttpResponse::Created().json(json!({
        "status": "success",
        "message": "song added to playlist",
    })))
}

#[get("/playlists/{id}/songs")]
pub async fn get_playlist_songs_by_id(
    playlists: web::Data<PlaylistService>,
    auth: AuthUser,
    path: web::Path<String>,
) -> Result<HttpResponse, ServiceError> {
    let playlist = playlists
        .get_playlist_songs_by_id(&path.into_inner(), &auth.user_id)
        .await?;

    let mut response = HttpResponse::Ok();
    if playlist.from_cache {
        response.insert_header(DATA_SOURCE_HEADER);
    }

    Ok(response.json(json!({
        "status": "success",
        "data": { "playlist": playlist.value },
    })))
}

#[delete("/playlists/{id}/songs")]
pub async fn delete_playlist_song(
    playlists: web::Data<PlaylistService>,
    auth: AuthUser,
    path: web::Path<String>,
    body: web::Json<PlaylistSongPayload>,
) -> Result<HttpResponse, ServiceError> {
    let playlist_id = path.into_inner();

    playlists
        .verify_playlist_access(&playlist_id, &auth.user_id)
        .await?;

    playlists
        .delete_song_from_playlist(&playlist_id, &body.song_id)
        .await?;
    playlists
        .add_activity(
            &playlist_id,
            &body.song_id,
            &auth.user_id,
            ActivityAction::Delete,
        )
        .await?;

    Ok(HttpResponse::Ok().json(json!({
        "status": "success",
        "message": "song removed from playlist",
    })))
}

/// The service only gates activities on playlist existence; restricting
/// them to owner and collaborators is enforced here at the route.
#[get("/playlists/{id}/activities")]
pub async fn get_playlist_activities_by_id(
    playlists: web::Data<PlaylistService>,
    auth: AuthUser,
    path: web::Path<String>,
) -> Result<HttpResponse, ServiceError> {
    let playlist_id = path.into_inner();

    playlists
        .verify_playlist_access(&playlist_id, &auth.user_id)
        .await?;

    let activities = playlists
        .get_playlist_activities_by_id(&playlist_id)
        .await?;

    let mut response = HttpResponse::Ok();
    if activities.from_cache {
        response.insert_header(DATA_SOURCE_HEADER);
    }

    Ok(response.json(json!({
        "status": "success",
        "data": {
            "playlistId": playlist_id,
            "activities": activities.value,
        },
    })))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(post_playlist)
        .service(get_playlists)
        .service(delete_playlist_by_id)
        .service(post_playlist_song)
        .service(get_playlist_songs_by_id)
        .service(delete_playlist_song)
        .service(get_playlist_activities_by_id);
}
