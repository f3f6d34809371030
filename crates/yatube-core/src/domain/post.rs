use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Post entity - a blog entry written by one author.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: i32,
    pub text: String,
    pub created: DateTime<Utc>,
    pub author_id: i32,
    pub image: Option<String>,
    pub group_id: Option<i32>,
}

impl Post {
    /// Create a new post. `created` is fixed here and never changes afterwards.
    pub fn new(
        author_id: i32,
        text: String,
        image: Option<String>,
        group_id: Option<i32>,
    ) -> Self {
        Self {
            id: 0,
            text,
            created: Utc::now(),
            author_id,
            image,
            group_id,
        }
    }
}
