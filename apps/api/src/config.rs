//! Application configuration loaded from environment variables.

use std::env;
use std::str::FromStr;

#[cfg(feature = "postgres")]
use yatube_infra::DatabaseConfig;
use yatube_infra::{JwtConfig, RateLimitConfig};

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    #[cfg(feature = "postgres")]
    pub database: Option<DatabaseConfig>,
    /// Apply pending migrations on startup.
    pub auto_migrate: bool,
    pub jwt: JwtConfig,
    /// Per-client limit on the token endpoints.
    pub auth_rate_limit: RateLimitConfig,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        #[cfg(feature = "postgres")]
        let database = env::var("DATABASE_URL").ok().map(|url| DatabaseConfig {
            url,
            max_connections: parse_var("DB_MAX_CONNECTIONS", 20),
            min_connections: parse_var("DB_MIN_CONNECTIONS", 2),
        });

        Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: parse_var("PORT", 8080),
            #[cfg(feature = "postgres")]
            database,
            auto_migrate: env::var("DB_AUTO_MIGRATE")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(false),
            jwt: JwtConfig::from_env(),
            auth_rate_limit: RateLimitConfig::from_env("AUTH_"),
        }
    }
}

fn parse_var<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}
