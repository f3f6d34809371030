//! Token endpoints: obtain, refresh and verify JWTs.

use actix_web::{HttpResponse, web};
use yatube_core::error::ValidationErrors;
use yatube_core::ports::{AuthError, TokenKind};
use yatube_core::services::{BLANK_MESSAGE, REQUIRED_MESSAGE};
use yatube_shared::dto::{
    AccessTokenResponse, TokenObtainRequest, TokenPairResponse, TokenRefreshRequest,
    TokenVerifyRequest,
};

use crate::middleware::error::AppResult;
use crate::state::AppState;

fn required(errors: &mut ValidationErrors, field: &str, value: Option<String>) -> String {
    match value {
        None => {
            errors.add(field, REQUIRED_MESSAGE);
            String::new()
        }
        Some(value) if value.trim().is_empty() => {
            errors.add(field, BLANK_MESSAGE);
            String::new()
        }
        Some(value) => value,
    }
}

/// POST /v1/jwt/create
pub async fn create(
    state: web::Data<AppState>,
    body: web::Json<TokenObtainRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    let mut errors = ValidationErrors::new();
    let username = required(&mut errors, "username", req.username);
    let password = required(&mut errors, "password", req.password);
    errors.into_result()?;

    let user = state
        .users
        .find_by_username(&username)
        .await?
        .ok_or(AuthError::InvalidCredentials)?;

    if !state.passwords.verify(&password, &user.password_hash)? {
        tracing::info!(username = %username, "Rejected token request");
        return Err(AuthError::InvalidCredentials.into());
    }

    let refresh = state.tokens.issue(user.id, &user.username, TokenKind::Refresh)?;
    let access = state.tokens.issue(user.id, &user.username, TokenKind::Access)?;
    tracing::info!(user_id = user.id, "Token pair issued");

    Ok(HttpResponse::Ok().json(TokenPairResponse { refresh, access }))
}

/// POST /v1/jwt/refresh
pub async fn refresh(
    state: web::Data<AppState>,
    body: web::Json<TokenRefreshRequest>,
) -> AppResult<HttpResponse> {
    let mut errors = ValidationErrors::new();
    let refresh = required(&mut errors, "refresh", body.into_inner().refresh);
    errors.into_result()?;

    let claims = state.tokens.validate(&refresh, TokenKind::Refresh)?;
    let access = state
        .tokens
        .issue(claims.user_id, &claims.username, TokenKind::Access)?;

    Ok(HttpResponse::Ok().json(AccessTokenResponse { access }))
}

/// POST /v1/jwt/verify
///
/// Accepts access and refresh tokens alike.
pub async fn verify(
    state: web::Data<AppState>,
    body: web::Json<TokenVerifyRequest>,
) -> AppResult<HttpResponse> {
    let mut errors = ValidationErrors::new();
    let token = required(&mut errors, "token", body.into_inner().token);
    errors.into_result()?;

    match state.tokens.validate(&token, TokenKind::Access) {
        Err(AuthError::WrongTokenType(_)) => {
            state.tokens.validate(&token, TokenKind::Refresh)?;
        }
        other => {
            other?;
        }
    }

    Ok(HttpResponse::Ok().json(serde_json::json!({})))
}
