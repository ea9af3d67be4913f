//! User registration and authentication routes

use std::future::{ready, Ready};

use actix_web::dev::Payload;
use actix_web::http::header;
use actix_web::{delete, post, put, web, FromRequest, HttpRequest, HttpResponse};
use serde::Deserialize;
use serde_json::json;

use crate::config::AppConfig;
use crate::core::users::{AuthenticationService, UserService};
use crate::errors::ServiceError;
use crate::utils::auth::{create_jwt, verify_jwt, TOKEN_TYPE_ACCESS, TOKEN_TYPE_REFRESH};

/// The authenticated caller, extracted from the `Authorization: Bearer`
/// header of a verified access token.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: String,
}

fn extract_user(req: &HttpRequest) -> Result<AuthUser, ServiceError> {
    let config = req
        .app_data::<web::Data<AppConfig>>()
        .ok_or_else(|| ServiceError::Internal(anyhow::anyhow!("app config not registered")))?;

    let header_value = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ServiceError::Authentication("missing access token".to_string()))?;

    let token = header_value
        .strip_prefix("Bearer ")
        .ok_or_else(|| ServiceError::Authentication("invalid authorization header".to_string()))?;

    let claims = verify_jwt(token, &config.access_token_key, Some(TOKEN_TYPE_ACCESS))
        .map_err(|_| ServiceError::Authentication("invalid or expired access token".to_string()))?;

    Ok(AuthUser {
        user_id: claims.sub,
    })
}

impl FromRequest for AuthUser {
    type Error = ServiceError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(extract_user(req))
    }
}

#[derive(Debug, Deserialize)]
pub struct RegisterPayload {
    pub username: String,
    pub password: String,
    pub fullname: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginPayload {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshPayload {
    #[serde(rename = "refreshToken")]
    pub refresh_token: String,
}

#[post("/users")]
pub async fn post_user(
    users: web::Data<UserService>,
    body: web::Json<RegisterPayload>,
) -> Result<HttpResponse, ServiceError> {
    let user_id = users
        .add_user(&body.username, &body.password, &body.fullname)
        .await?;

    Ok(HttpResponse::Created().json(json!({
        "status": "success",
        "message": "user added",
        "data": { "userId": user_id },
    })))
}

#[post("/authentications")]
pub async fn post_authentication(
    users: web::Data<UserService>,
    authentications: web::Data<AuthenticationService>,
    config: web::Data<AppConfig>,
    body: web::Json<LoginPayload>,
) -> Result<HttpResponse, ServiceError> {
    let user_id = users
        .verify_user_credential(&body.username, &body.password)
        .await?;

    let access_token = create_jwt(
        &user_id,
        &config.access_token_key,
        TOKEN_TYPE_ACCESS,
        config.access_token_age,
    )?;
    let refresh_token = create_jwt(
        &user_id,
        &config.refresh_token_key,
        TOKEN_TYPE_REFRESH,
        config.refresh_token_age,
    )?;

    authentications.add_refresh_token(&refresh_token).await?;

    Ok(HttpResponse::Created().json(json!({
        "status": "success",
        "message": "authentication added",
        "data": {
            "accessToken": access_token,
            "refreshToken": refresh_token,
        },
    })))
}

#[put("/authentications")]
pub async fn put_authentication(
    authentications: web::Data<AuthenticationService>,
    config: web::Data<AppConfig>,
    body: web::Json<RefreshPayload>,
) -> Result<HttpResponse, ServiceError> {
    authentications
        .verify_refresh_token(&body.refresh_token)
        .await?;

    let claims = verify_jwt(
        &body.refresh_token,
        &config.refresh_token_key,
        Some(TOKEN_TYPE_REFRESH),
    )
    .map_err(|_| ServiceError::Invariant("refresh token is not valid".to_string()))?;

    let access_token = create_jwt(
        &claims.sub,
        &config.access_token_key,
        TOKEN_TYPE_ACCESS,
        config.access_token_age,
    )?;

    Ok(HttpResponse::Ok().json(json!({
        "status": "success",
        "message": "access token renewed",
        "data": { "accessToken": access_token },
    })))
}

#[delete("/authentications")]
pub async fn delete_authentication(
    authentications: web::Data<AuthenticationService>,
    body: web::Json<RefreshPayload>,
) -> Result<HttpResponse, ServiceError> {
    authentications
        .verify_refresh_token(&body.refresh_token)
        .await?;
    authentications
        .delete_refresh_token(&body.refresh_token)
        .await?;

    Ok(HttpResponse::Ok().json(json!({
        "status": "success",
        "message": "refresh token deleted",
    })))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(post_user)
        .service(post_authentication)
        .service(put_authentication)
        .service(delete_authentication);
}
