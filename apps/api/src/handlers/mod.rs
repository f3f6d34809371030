//! HTTP handlers and route configuration.

mod comments;
mod follow;
mod groups;
mod health;
mod jwt;
pub mod pagination;
mod posts;

use std::sync::Arc;

use actix_web::web;
use serde::de::DeserializeOwned;
use yatube_core::ports::RateLimiter;
use yatube_core::services::Payload;

use crate::middleware::error::AppError;
use crate::middleware::rate_limit::RateLimitMiddleware;

/// Configure all application routes.
///
/// Paths are registered without a trailing slash; the app normalizes
/// incoming paths before routing.
pub fn configure_routes(cfg: &mut web::ServiceConfig, auth_rate_limiter: Arc<dyn RateLimiter>) {
    cfg.route("/health", web::get().to(health::health_check))
        .service(
            web::scope("/v1")
                .service(
                    web::scope("/jwt")
                        .wrap(RateLimitMiddleware::new(auth_rate_limiter))
                        .service(web::resource("/create").route(web::post().to(jwt::create)))
                        .service(web::resource("/refresh").route(web::post().to(jwt::refresh)))
                        .service(web::resource("/verify").route(web::post().to(jwt::verify))),
                )
                .service(
                    web::resource("/posts")
                        .route(web::get().to(posts::list))
                        .route(web::post().to(posts::create)),
                )
                .service(
                    web::resource("/posts/{id}")
                        .route(web::get().to(posts::retrieve))
                        .route(web::put().to(posts::update))
                        .route(web::patch().to(posts::partial_update))
                        .route(web::delete().to(posts::destroy)),
                )
                .service(
                    web::resource("/posts/{post_id}/comments")
                        .route(web::get().to(comments::list))
                        .route(web::post().to(comments::create)),
                )
                .service(
                    web::resource("/posts/{post_id}/comments/{id}")
                        .route(web::get().to(comments::retrieve))
                        .route(web::put().to(comments::update))
                        .route(web::patch().to(comments::partial_update))
                        .route(web::delete().to(comments::destroy)),
                )
                .service(web::resource("/groups").route(web::get().to(groups::list)))
                .service(web::resource("/groups/{id}").route(web::get().to(groups::retrieve)))
                .service(
                    web::resource("/follow")
                        .route(web::get().to(follow::list))
                        .route(web::post().to(follow::create)),
                ),
        );
}

/// Malformed JSON bodies of the token endpoints become 400 problem responses.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        tracing::debug!(error = %err, "Rejected request body");
        AppError::BadRequest(format!("JSON parse error - {err}")).into()
    })
}

/// Decode the JSON body of a resource write.
///
/// Decoding failures are carried in the payload rather than rejected here, so
/// authentication and permission errors take precedence. An empty body
/// decodes as an empty object.
pub(crate) fn payload<T: DeserializeOwned + Default>(body: &[u8]) -> Payload<T> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Payload::Decoded(T::default());
    }
    match serde_json::from_slice(body) {
        Ok(input) => Payload::Decoded(input),
        Err(err) => {
            tracing::debug!(error = %err, "Rejected request body");
            Payload::Malformed(format!("JSON parse error - {err}"))
        }
    }
}

/// Path segments that are not valid ids are treated as unknown resources.
pub fn path_config() -> web::PathConfig {
    web::PathConfig::default()
        .error_handler(|_err, _req| AppError::NotFound("Not found.".to_string()).into())
}
