use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// User entity - an identity that can author posts and comments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i32,
    pub username: String,
    pub password_hash: String,
    pub date_joined: DateTime<Utc>,
}

impl User {
    /// Create a user that has not been persisted yet.
    pub fn new(username: String, password_hash: String) -> Self {
        Self {
            id: 0,
            username,
            password_hash,
            date_joined: Utc::now(),
        }
    }
}
