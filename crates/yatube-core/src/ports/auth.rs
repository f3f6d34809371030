//! Authentication ports.

use std::fmt;

/// The two kinds of JWT handed out by `/jwt/create`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Short-lived token that authenticates API requests.
    Access,
    /// Long-lived token that can only be exchanged for a new access token.
    Refresh,
}

impl TokenKind {
    pub fn as_str(self) -> &'static str {
        match self {
            TokenKind::Access => "access",
            TokenKind::Refresh => "refresh",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Claims stored in JWT tokens.
#[derive(Debug, Clone)]
pub struct TokenClaims {
    pub user_id: i32,
    pub username: String,
    pub kind: TokenKind,
    pub exp: i64,
}

/// Token service trait for JWT operations.
pub trait TokenService: Send + Sync {
    /// Issue a token of the given kind for a user.
    fn issue(&self, user_id: i32, username: &str, kind: TokenKind) -> Result<String, AuthError>;

    /// Validate and decode a token, rejecting tokens of any other kind.
    fn validate(&self, token: &str, kind: TokenKind) -> Result<TokenClaims, AuthError>;

    /// Lifetime of freshly issued tokens of the given kind.
    fn lifetime_seconds(&self, kind: TokenKind) -> i64;
}

/// Password hashing service.
pub trait PasswordService: Send + Sync {
    /// Hash a plain text password.
    fn hash(&self, password: &str) -> Result<String, AuthError>;

    /// Verify a password against a hash.
    fn verify(&self, password: &str, hash: &str) -> Result<bool, AuthError>;
}

/// Authentication errors.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("No active account found with the given credentials")]
    InvalidCredentials,

    #[error("Token is expired")]
    TokenExpired,

    #[error("Token is invalid: {0}")]
    InvalidToken(String),

    #[error("Token has wrong type, expected {0}")]
    WrongTokenType(TokenKind),

    #[error("Hashing error: {0}")]
    HashingError(String),
}
