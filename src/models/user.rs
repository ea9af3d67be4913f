//! User model

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A user without credential material.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct User {
    pub id: String,
    pub username: String,
    pub fullname: String,
}
