//! Core services: cache, catalog, likes, playlists, collaboration, users,
//! export and upload storage

pub mod albums;
pub mod cache;
pub mod collabs;
pub mod exporter;
pub mod likes;
pub mod playlists;
pub mod songs;
pub mod storage;
pub mod users;

/// A read-through result carrying its origin so the HTTP layer can emit
/// the `X-Data-Source: cache` header.
#[derive(Debug, Clone)]
pub struct Cached<T> {
    pub value: T,
    pub from_cache: bool,
}
