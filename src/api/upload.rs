//! Album cover upload route

use actix_multipart::Multipart;
use actix_web::{post, web, HttpResponse};
use futures::TryStreamExt;
use serde_json::json;

use crate::config::AppConfig;
use crate::core::albums::AlbumService;
use crate::core::storage::StorageService;
use crate::errors::ServiceError;

const MAX_COVER_BYTES: usize = 512_000;

#[post("/albums/{id}/covers")]
pub async fn post_album_cover(
    albums: web::Data<AlbumService>,
    storage: web::Data<StorageService>,
    config: web::Data<AppConfig>,
    path: web::Path<String>,
    mut payload: Multipart,
) -> Result<HttpResponse, ServiceError> {
    let album_id = path.into_inner();

    albums.get_album_by_id(&album_id).await?;

    let mut stored: Option<String> = None;

    while let Some(mut field) = payload
        .try_next()
        .await
        .map_err(|e| ServiceError::Invariant(format!("invalid multipart payload: {e}")))?
    {
        if field.name() != "cover" {
            continue;
        }

        let is_image = field
            .content_type()
            .map(|mime| mime.essence_str().starts_with("image/"))
            .unwrap_or(false);
        if !is_image {
            return Err(ServiceError::Invariant(
                "cover must be an image".to_string(),
            ));
        }

        let filename = field
            .content_disposition()
            .get_filename()
            .unwrap_or("cover")
            .to_string();

        let mut data: Vec<u8> = Vec::new();
        while let Some(chunk) = field
            .try_next()
            .await
            .map_err(|e| ServiceError::Invariant(format!("failed to read upload: {e}")))?
        {
            if data.len() + chunk.len() > MAX_COVER_BYTES {
                return Err(ServiceError::Invariant(format!(
                    "cover exceeds the {MAX_COVER_BYTES} byte limit"
                )));
            }
            data.extend_from_slice(&chunk);
        }

        stored = Some(storage.write_file(&filename, &data).await?);
        break;
    }

    let filename = stored.ok_or_else(|| {
        ServiceError::Invariant("multipart field 'cover' is required".to_string())
    })?;

    let file_location = config.file_location(&filename);
    albums.add_cover_url(&album_id, &file_location).await?;

    Ok(HttpResponse::Created().json(json!({
        "status": "success",
        "data": { "fileLocation": file_location },
    })))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(post_album_cover);
}
