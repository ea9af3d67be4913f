//! Database connection management

mod engine;

pub use engine::DbEngine;
