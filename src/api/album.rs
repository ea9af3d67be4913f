//! Album catalog routes

use actix_web::{delete, get, post, put, web, HttpResponse};
use serde::Deserialize;
use serde_json::json;

use crate::api::DATA_SOURCE_HEADER;
use crate::core::albums::AlbumService;
use crate::core::songs::SongService;
use crate::errors::ServiceError;

#[derive(Debug, Deserialize)]
pub struct AlbumPayload {
    pub name: String,
    pub year: i32,
}

#[post("/albums")]
pub async fn post_album(
    albums: web::Data<AlbumService>,
    body: web::Json<AlbumPayload>,
) -> Result<HttpResponse, ServiceError> {
    let album_id = albums.add_album(&body.name, body.year).await?;

    Ok(HttpResponse::Created().json(json!({
        "status": "success",
        "message": "album added",
        "data": { "albumId": album_id },
    })))
}

/// Album detail with its songs embedded. The song list is always a live
/// store query; only the album row itself is cache-backed.
#[get("/albums/{id}")]
pub async fn get_album_by_id(
    albums: web::Data<AlbumService>,
    songs: web::Data<SongService>,
    path: web::Path<String>,
) -> Result<HttpResponse, ServiceError> {
    let id = path.into_inner();

    let album = albums.get_album_by_id(&id).await?;
    let album_songs = songs.get_songs_by_album_id(&id).await?;

    let mut album_json = serde_json::to_value(&album.value)?;
    album_json["songs"] = serde_json::to_value(&album_songs)?;

    let mut response = HttpResponse::Ok();
    if album.from_cache {
        response.insert_header(DATA_SOURCE_HEADER);
    }

    Ok(response.json(json!({
        "status": "success",
        "data": { "album": album_json },
    })))
}

#[put("/albums/{id}")]
pub async fn put_album_by_id(
    albums: web::Data<AlbumService>,
    path: web::Path<String>,
    body: web::Json<AlbumPayload>,
) -> Result<HttpResponse, ServiceError> {
    albums
        .edit_album_by_id(&path.into_inner(), &body.name, body.year)
        .await?;

    Ok(HttpResponse::Ok().json(json!({
        "status": "success",
        "message": "album updated",
    })))
}

#[delete("/albums/{id}")]
pub async fn delete_album_by_id(
    albums: web::Data<AlbumService>,
    path: web::Path<String>,
) -> Result<HttpResponse, ServiceError> {
    albums.delete_album_by_id(&path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(json!({
        "status": "success",
        "message": "album deleted",
    })))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(post_album)
        .service(get_album_by_id)
        .service(put_album_by_id)
        .service(delete_album_by_id);
}
