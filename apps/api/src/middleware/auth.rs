//! Authentication extractor.

use std::future::Future;
use std::pin::Pin;

use actix_web::{FromRequest, HttpRequest, dev::Payload, http::header, web};
use yatube_core::context::Requester;
use yatube_core::ports::TokenKind;

use crate::middleware::error::AppError;
use crate::state::AppState;

/// The requester behind an HTTP request.
///
/// A missing `Authorization` header yields an anonymous caller. A header that
/// is present but malformed, expired, not an access token or bound to a user
/// that no longer exists is rejected with 401, on reads too.
///
/// ```ignore
/// async fn handler(caller: Caller) -> impl Responder {
///     format!("authenticated: {}", caller.requester().is_authenticated())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Caller(pub Requester);

impl Caller {
    pub fn requester(&self) -> &Requester {
        &self.0
    }
}

fn bearer_token(req: &HttpRequest) -> Result<Option<String>, AppError> {
    let Some(value) = req.headers().get(header::AUTHORIZATION) else {
        return Ok(None);
    };

    let value = value
        .to_str()
        .map_err(|_| AppError::Unauthorized("Invalid authorization header".to_string()))?;

    match value.split_once(' ') {
        Some((scheme, token)) if scheme.eq_ignore_ascii_case("Bearer") && !token.trim().is_empty() => {
            Ok(Some(token.trim().to_string()))
        }
        _ => Err(AppError::Unauthorized(
            "Authorization header must contain two space-delimited values: Bearer <token>"
                .to_string(),
        )),
    }
}

impl FromRequest for Caller {
    type Error = AppError;
    type Future = Pin<Box<dyn Future<Output = Result<Self, Self::Error>>>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let token = bearer_token(req);
        let state = req.app_data::<web::Data<AppState>>().cloned();

        Box::pin(async move {
            let Some(token) = token? else {
                return Ok(Caller(Requester::Anonymous));
            };
            let state = state.ok_or_else(|| {
                AppError::Internal("AppState not found in app data".to_string())
            })?;

            let claims = state.tokens.validate(&token, TokenKind::Access)?;
            let user = state
                .users
                .find_by_id(claims.user_id)
                .await?
                .ok_or_else(|| AppError::Unauthorized("User not found".to_string()))?;

            tracing::debug!(user_id = user.id, "Request authenticated");
            Ok(Caller(Requester::user(user.id, user.username)))
        })
    }
}
