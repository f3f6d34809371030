use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Comment entity - lives under exactly one post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: i32,
    pub post_id: i32,
    pub author_id: i32,
    pub text: String,
    pub created: DateTime<Utc>,
}

impl Comment {
    pub fn new(post_id: i32, author_id: i32, text: String) -> Self {
        Self {
            id: 0,
            post_id,
            author_id,
            text,
            created: Utc::now(),
        }
    }
}
