//! REST API routes
//!
//! Every success response carries `{"status": "success", data?, message?}`;
//! failures are mapped by the `ResponseError` impl on `ServiceError`.
//! Read-through handlers add `X-Data-Source: cache` when the service
//! reports a cache hit.

pub mod album;
pub mod auth;
pub mod collab;
pub mod export;
pub mod like;
pub mod playlist;
pub mod song;
pub mod upload;

use actix_web::web;

/// Header signalling that a read was served from cache.
pub const DATA_SOURCE_HEADER: (&str, &str) = ("X-Data-Source", "cache");

/// Configure all API routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.configure(album::configure)
        .configure(song::configure)
        .configure(auth::configure)
        .configure(playlist::configure)
        .configure(collab::configure)
        .configure(like::configure)
        .configure(export::configure)
        .configure(upload::configure);
}
