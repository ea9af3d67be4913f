//! Album like routes
//!
//! Each handler resolves the album first, so liking an unknown album is a
//! not-found rather than a dangling like.

use actix_web::{delete, get, post, web, HttpResponse};
use serde_json::json;

use crate::api::auth::AuthUser;
use crate::api::DATA_SOURCE_HEADER;
use crate::core::albums::AlbumService;
use crate::core::likes::LikeService;
use crate::errors::ServiceError;

#[post("/albums/{id}/likes")]
pub async fn post_album_like(
    albums: web::Data<AlbumService>,
    likes: web::Data<LikeService>,
    auth: AuthUser,
    path: web::Path<String>,
) -> Result<HttpResponse, ServiceError> {
    let album_id = path.into_inner();

    albums.get_album_by_id(&album_id).await?;
    likes.add_like(&auth.user_id, &album_id).await?;

    Ok(HttpResponse::Created().json(json!({
        "status": "success",
        "message": "album liked",
    })))
}

#[get("/albums/{id}/likes")]
pub async fn get_album_likes(
    albums: web::Data<AlbumService>,
    likes: web::Data<LikeService>,
    path: web::Path<String>,
) -> Result<HttpResponse, ServiceError> {
    let album_id = path.into_inner();

    albums.get_album_by_id(&album_id).await?;
    let count = likes.get_likes(&album_id).await?;

    let mut response = HttpResponse::Ok();
    if count.from_cache {
        response.insert_header(DATA_SOURCE_HEADER);
    }

    Ok(response.json(json!({
        "status": "success",
        "data": { "likes": count.value },
    })))
}

#[delete("/albums/{id}/likes")]
pub async fn delete_album_like(
    albums: web::Data<AlbumService>,
    likes: web::Data<LikeService>,
    auth: AuthUser,
    path: web::Path<String>,
) -> Result<HttpResponse, ServiceError> {
    let album_id = path.into_inner();

    albums.get_album_by_id(&album_id).await?;
    likes.delete_like(&auth.user_id, &album_id).await?;

    Ok(HttpResponse::Ok().json(json!({
        "status": "success",
        "message": "album like removed",
    })))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(post_album_like)
        .service(get_album_likes)
        .service(delete_album_like);
}
