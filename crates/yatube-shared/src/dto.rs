//! Data Transfer Objects - request/response types for the API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Distinguishes an absent field (`None`) from an explicit `null` (`Some(None)`).
fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Post as rendered by the API. `author` is the author's username.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostRepr {
    pub id: i32,
    pub author: String,
    pub text: String,
    pub created: DateTime<Utc>,
    pub image: Option<String>,
    pub group: Option<i32>,
}

/// Body accepted by create, full update and partial update of a post.
///
/// Every field is optional at the wire level so that missing fields surface
/// as field validation errors instead of deserialization failures.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PostInput {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub image: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub group: Option<Option<i32>>,
}

/// Group as rendered by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupRepr {
    pub id: i32,
    pub title: String,
    pub slug: String,
    pub description: String,
}

/// Comment as rendered by the API. `post` and `author` are always server-derived.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentRepr {
    pub id: i32,
    pub author: String,
    pub text: String,
    pub created: DateTime<Utc>,
    pub post: i32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CommentInput {
    #[serde(default)]
    pub text: Option<String>,
}

/// Follow relationship, both sides rendered as usernames.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FollowRepr {
    pub user: String,
    pub following: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FollowInput {
    #[serde(default)]
    pub following: Option<String>,
}

/// Query parameters understood by list endpoints.
///
/// Kept as raw strings: malformed numbers are ignored rather than rejected.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListParams {
    pub limit: Option<String>,
    pub offset: Option<String>,
    pub search: Option<String>,
}

/// POST /v1/jwt/create
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenObtainRequest {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

/// Response of POST /v1/jwt/create
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPairResponse {
    pub refresh: String,
    pub access: String,
}

/// POST /v1/jwt/refresh
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenRefreshRequest {
    #[serde(default)]
    pub refresh: Option<String>,
}

/// Response of POST /v1/jwt/refresh
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessTokenResponse {
    pub access: String,
}

/// POST /v1/jwt/verify
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenVerifyRequest {
    #[serde(default)]
    pub token: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_post_input_distinguishes_null_from_absent() {
        let absent: PostInput = serde_json::from_str(r#"{"text": "hi"}"#).unwrap();
        assert_eq!(absent.group, None);
        assert_eq!(absent.image, None);

        let cleared: PostInput =
            serde_json::from_str(r#"{"text": "hi", "group": null, "image": null}"#).unwrap();
        assert_eq!(cleared.group, Some(None));
        assert_eq!(cleared.image, Some(None));

        let set: PostInput = serde_json::from_str(r#"{"group": 3}"#).unwrap();
        assert_eq!(set.group, Some(Some(3)));
        assert_eq!(set.text, None);
    }

    #[test]
    fn test_unknown_fields_are_ignored() {
        let input: CommentInput =
            serde_json::from_str(r#"{"text": "nice", "post": 42, "author": "mallory"}"#).unwrap();
        assert_eq!(input.text.as_deref(), Some("nice"));
    }
}
