//! # Yatube API
//!
//! Actix-web application: configuration, telemetry, middleware and the
//! HTTP surface over the `yatube-core` resource handlers.

pub mod config;
pub mod handlers;
pub mod middleware;
pub mod observability;
pub mod state;
pub mod telemetry;

use actix_web::web;

use state::AppState;

/// Register shared state, extractor configuration and every route.
///
/// The caller is expected to wrap the app in `NormalizePath::trim()` so that
/// trailing slashes are optional.
pub fn configure_app(state: AppState) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg: &mut web::ServiceConfig| {
        let auth_rate_limiter = state.auth_rate_limiter.clone();
        cfg.app_data(web::Data::new(state))
            .app_data(handlers::json_config())
            .app_data(handlers::path_config())
            .configure(|cfg| handlers::configure_routes(cfg, auth_rate_limiter));
    }
}
