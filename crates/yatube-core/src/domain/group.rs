use serde::{Deserialize, Serialize};

/// Group entity - a themed community posts can be filed under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: i32,
    pub title: String,
    pub slug: String,
    pub description: String,
}

impl Group {
    pub fn new(title: String, slug: String, description: String) -> Self {
        Self {
            id: 0,
            title,
            slug,
            description,
        }
    }
}
