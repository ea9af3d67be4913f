//! Song catalog routes

use actix_web::{delete, get, post, put, web, HttpResponse};
use serde::Deserialize;
use serde_json::json;

use crate::api::DATA_SOURCE_HEADER;
use crate::core::songs::{SongPayload, SongService};
use crate::errors::ServiceError;
use crate::models::SongSummary;

#[derive(Debug, Deserialize)]
pub struct SongListQuery {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub performer: String,
}

/// Response shaping applied after cache retrieval, never part of the
/// cached value: case-insensitive substring match on both filters combined,
/// then the result is capped to 1 item when both filters are non-empty,
/// else 2.
fn shape_song_results(
    mut songs: Vec<SongSummary>,
    title: &str,
    performer: &str,
) -> Vec<SongSummary> {
    let title = title.to_lowercase();
    let performer = performer.to_lowercase();

    if !title.is_empty() || !performer.is_empty() {
        songs.retain(|song| {
            song.title.to_lowercase().contains(&title)
                && song.performer.to_lowercase().contains(&performer)
        });
    }

    let cap = if !title.is_empty() && !performer.is_empty() {
        1
    } else {
        2
    };
    songs.truncate(cap);
    songs
}

#[post("/songs")]
pub async fn post_song(
    songs: web::Data<SongService>,
    body: web::Json<SongPayload>,
) -> Result<HttpResponse, ServiceError> {
    let song_id = songs.add_song(&body).await?;

    Ok(HttpResponse::Created().json(json!({
        "status": "success",
        "message": "song added",
        "data": { "songId": song_id },
    })))
}

#[get("/songs")]
pub async fn get_songs(
    songs: web::Data<SongService>,
    query: web::Query<SongListQuery>,
) -> Result<HttpResponse, ServiceError> {
    let listing = songs.get_songs(&query.title, &query.performer).await?;
    let shaped = shape_song_results(listing.value, &query.title, &query.performer);

    let mut response = HttpResponse::Ok();
    if listing.from_cache {
        response.insert_header(DATA_SOURCE_HEADER);
    }

    Ok(response.json(json!({
        "status": "success",
        "data": { "songs": shaped },
    })))
}

#[get("/songs/{id}")]
pub async fn get_song_by_id(
    songs: web::Data<SongService>,
    path: web::Path<String>,
) -> Result<HttpResponse, ServiceError> {
    let song = songs.get_song_by_id(&path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(json!({
        "status": "success",
        "data": { "song": song },
    })))
}

#[put("/songs/{id}")]
pub async fn put_song_by_id(
    songs: web::Data<SongService>,
    path: web::Path<String>,
    body: web::Json<SongPayload>,
) -> Result<HttpResponse, ServiceError> {
    songs.edit_song_by_id(&path.into_inner(), &body).await?;

    Ok(HttpResponse::Ok().json(json!({
        "status": "success",
        "message": "song updated",
    })))
}

#[delete("/songs/{id}")]
pub async fn delete_song_by_id(
    songs: web::Data<SongService>,
    path: web::Path<String>,
) -> Result<HttpResponse, ServiceError> {
    songs.delete_song_by_id(&path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(json!({
        "status": "success",
        "message": "song deleted",
    })))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(post_song)
        .service(get_songs)
        .service(get_song_by_id)
        .service(put_song_by_id)
        .service(delete_song_by_id);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn song(title: &str, performer: &str) -> SongSummary {
        SongSummary {
            id: format!("song-{title}"),
            title: title.to_string(),
            performer: performer.to_string(),
        }
    }

    #[test]
    fn test_both_filters_cap_to_one() {
        let songs = vec![
            song("Bohemian Rhapsody", "Queen"),
            song("Bohemian Like You", "Queen Cover Band"),
        ];

        let shaped = shape_song_results(songs, "Bohemian", "Queen");
        assert_eq!(shaped.len(), 1);
        assert_eq!(shaped[0].title, "Bohemian Rhapsody");
    }

    #[test]
    fn test_no_filters_cap_to_two() {
        let songs = vec![
            song("One", "A"),
            song("Two", "B"),
            song("Three", "C"),
            song("Four", "D"),
            song("Five", "E"),
        ];

        let shaped = shape_song_results(songs, "", "");
        assert_eq!(shaped.len(), 2);
    }

    #[test]
    fn test_matching_is_case_insensitive() {
        let songs = vec![song("Bohemian Rhapsody", "Queen")];

        let shaped = shape_song_results(songs, "bohemian", "queen");
        assert_eq!(shaped.len(), 1);
    }

    #[test]
    fn test_single_filter_requires_match_on_that_field() {
        let songs = vec![song("Clocks", "Coldplay"), song("Yellow", "Coldplay")];

        let shaped = shape_song_results(songs, "clocks", "");
        assert_eq!(shaped.len(), 1);
        assert_eq!(shaped[0].title, "Clocks");
    }

    #[test]
    fn test_both_filters_are_combined_with_and() {
        // the store prefilter is an OR; the response filter must be an AND
        let songs = vec![song("Bohemian Rhapsody", "Queen"), song("Clocks", "Queen")];

        let shaped = shape_song_results(songs, "Bohemian", "Coldplay");
        assert!(shaped.is_empty());
    }
}
