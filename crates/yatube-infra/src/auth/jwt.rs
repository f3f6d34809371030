//! JWT token service implementation.

use chrono::{TimeDelta, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use yatube_core::ports::{AuthError, TokenClaims, TokenKind, TokenService};

const DEFAULT_SECRET: &str = "change-me-in-production";

/// JWT token service configuration.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub access_lifetime: TimeDelta,
    pub refresh_lifetime: TimeDelta,
    pub issuer: String,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: DEFAULT_SECRET.to_string(),
            access_lifetime: TimeDelta::days(1),
            refresh_lifetime: TimeDelta::days(7),
            issuer: "yatube-api".to_string(),
        }
    }
}

impl JwtConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let secret = std::env::var("JWT_SECRET").unwrap_or_else(|_| DEFAULT_SECRET.to_string());

        // Warn if using default secret in production
        if secret == DEFAULT_SECRET {
            let is_production = std::env::var("RUST_ENV")
                .map(|v| v == "production" || v == "prod")
                .unwrap_or(false);

            if is_production {
                tracing::error!(
                    "SECURITY: Using default JWT secret in production! Set JWT_SECRET environment variable."
                );
            } else {
                tracing::warn!("Using default JWT secret. Set JWT_SECRET for production use.");
            }
        }

        Self {
            secret,
            access_lifetime: std::env::var("JWT_ACCESS_MINUTES")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(TimeDelta::minutes)
                .unwrap_or(defaults.access_lifetime),
            refresh_lifetime: std::env::var("JWT_REFRESH_DAYS")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(TimeDelta::days)
                .unwrap_or(defaults.refresh_lifetime),
            issuer: std::env::var("JWT_ISSUER").unwrap_or(defaults.issuer),
        }
    }
}

/// Internal JWT claims structure for serialization.
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String, // user_id
    username: String,
    token_type: String,
    jti: String,
    exp: i64,    // expiration timestamp
    iat: i64,    // issued at
    iss: String, // issuer
}

/// JWT-based token service issuing access/refresh pairs.
pub struct JwtTokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    config: JwtConfig,
}

impl JwtTokenService {
    pub fn new(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        Self {
            encoding_key,
            decoding_key,
            config,
        }
    }

    pub fn from_env() -> Self {
        Self::new(JwtConfig::from_env())
    }

    fn lifetime(&self, kind: TokenKind) -> TimeDelta {
        match kind {
            TokenKind::Access => self.config.access_lifetime,
            TokenKind::Refresh => self.config.refresh_lifetime,
        }
    }
}

impl TokenService for JwtTokenService {
    fn issue(&self, user_id: i32, username: &str, kind: TokenKind) -> Result<String, AuthError> {
        let now = Utc::now();
        let exp = now + self.lifetime(kind);

        let claims = Claims {
            sub: user_id.to_string(),
            username: username.to_string(),
            token_type: kind.as_str().to_string(),
            jti: Uuid::new_v4().simple().to_string(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
            iss: self.config.issuer.clone(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))
    }

    fn validate(&self, token: &str, kind: TokenKind) -> Result<TokenClaims, AuthError> {
        let mut validation = Validation::default();
        validation.set_issuer(&[&self.config.issuer]);

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => AuthError::InvalidToken(e.to_string()),
            }
        })?;

        if token_data.claims.token_type != kind.as_str() {
            return Err(AuthError::WrongTokenType(kind));
        }

        let user_id = token_data
            .claims
            .sub
            .parse::<i32>()
            .map_err(|e| AuthError::InvalidToken(e.to_string()))?;

        Ok(TokenClaims {
            user_id,
            username: token_data.claims.username,
            kind,
            exp: token_data.claims.exp,
        })
    }

    fn lifetime_seconds(&self, kind: TokenKind) -> i64 {
        self.lifetime(kind).num_seconds()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> JwtConfig {
        JwtConfig {
            secret: "test-secret-key".to_string(),
            access_lifetime: TimeDelta::hours(1),
            refresh_lifetime: TimeDelta::days(1),
            issuer: "test-issuer".to_string(),
        }
    }

    #[test]
    fn test_issue_and_validate_access_token() {
        let service = JwtTokenService::new(test_config());

        let token = service.issue(42, "alice", TokenKind::Access).unwrap();
        let claims = service.validate(&token, TokenKind::Access).unwrap();

        assert_eq!(claims.user_id, 42);
        assert_eq!(claims.username, "alice");
        assert_eq!(claims.kind, TokenKind::Access);
    }

    #[test]
    fn test_refresh_token_cannot_authenticate() {
        let service = JwtTokenService::new(test_config());

        let refresh = service.issue(1, "alice", TokenKind::Refresh).unwrap();

        assert!(matches!(
            service.validate(&refresh, TokenKind::Access),
            Err(AuthError::WrongTokenType(TokenKind::Access))
        ));
        assert!(service.validate(&refresh, TokenKind::Refresh).is_ok());
    }

    #[test]
    fn test_validate_invalid_token() {
        let service = JwtTokenService::new(test_config());

        let result = service.validate("invalid-token", TokenKind::Access);

        assert!(matches!(result, Err(AuthError::InvalidToken(_))));
    }

    #[test]
    fn test_validate_wrong_issuer_token() {
        let service1 = JwtTokenService::new(JwtConfig {
            issuer: "issuer1".to_string(),
            ..test_config()
        });
        let service2 = JwtTokenService::new(JwtConfig {
            issuer: "issuer2".to_string(),
            ..test_config()
        });

        let token = service1.issue(1, "alice", TokenKind::Access).unwrap();

        assert!(service2.validate(&token, TokenKind::Access).is_err());
    }

    #[test]
    fn test_expired_token_is_reported_as_expired() {
        let service = JwtTokenService::new(JwtConfig {
            access_lifetime: TimeDelta::minutes(-10),
            ..test_config()
        });

        let token = service.issue(1, "alice", TokenKind::Access).unwrap();

        assert!(matches!(
            service.validate(&token, TokenKind::Access),
            Err(AuthError::TokenExpired)
        ));
    }

    #[test]
    fn test_lifetime_seconds() {
        let service = JwtTokenService::new(test_config());

        assert_eq!(service.lifetime_seconds(TokenKind::Access), 3600);
        assert_eq!(service.lifetime_seconds(TokenKind::Refresh), 86400);
    }
}
