//! Resource handlers.
//!
//! Each resource composes only the operations it exposes out of the
//! [`ListResource`], [`RetrieveResource`], [`CreateResource`],
//! [`UpdateResource`] and [`DestroyResource`] traits. Handlers take the
//! requester explicitly and return wire representations.

mod comment;
mod follow;
mod group;
mod post;

use std::collections::HashMap;

use async_trait::async_trait;

use crate::context::{Identity, Requester};
use crate::error::{DomainError, DomainResult, ValidationErrors};
use crate::ports::{Page, UserRepository, Window};

pub use comment::CommentService;
pub use follow::{DUPLICATE_FOLLOW_MESSAGE, FollowService, SELF_FOLLOW_MESSAGE};
pub use group::GroupService;
pub use post::PostService;

pub const REQUIRED_MESSAGE: &str = "This field is required.";
pub const BLANK_MESSAGE: &str = "This field may not be blank.";

/// Listing options shared by every list operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListQuery {
    pub window: Option<Window>,
    /// Search terms; resources without search ignore them.
    pub search: Vec<String>,
}

impl ListQuery {
    /// Split a raw `search` parameter into terms on whitespace and commas.
    pub fn with_search(mut self, raw: Option<&str>) -> Self {
        self.search = raw
            .map(|raw| {
                raw.split(|c: char| c.is_whitespace() || c == ',')
                    .filter(|term| !term.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();
        self
    }
}

/// A request body as it arrived: decoded, or the reason decoding failed.
///
/// Write operations unwrap it only after the requester has passed every
/// permission check for the action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload<T> {
    Decoded(T),
    Malformed(String),
}

impl<T> Payload<T> {
    pub fn into_input(self) -> DomainResult<T> {
        match self {
            Payload::Decoded(input) => Ok(input),
            Payload::Malformed(reason) => Err(DomainError::MalformedBody(reason)),
        }
    }
}

impl<T> From<T> for Payload<T> {
    fn from(input: T) -> Self {
        Payload::Decoded(input)
    }
}

/// Types shared by all operations of one resource.
pub trait Resource: Send + Sync {
    /// Wire representation.
    type Repr: Send;
    /// Inbound body for create and update.
    type Input: Send;
    /// What the URL path pins down above the resource itself (e.g. the parent post).
    type Scope: Send + Sync;
}

#[async_trait]
pub trait ListResource: Resource {
    async fn list(
        &self,
        requester: &Requester,
        scope: &Self::Scope,
        query: ListQuery,
    ) -> DomainResult<Page<Self::Repr>>;
}

#[async_trait]
pub trait RetrieveResource: Resource {
    async fn retrieve(
        &self,
        requester: &Requester,
        scope: &Self::Scope,
        id: i32,
    ) -> DomainResult<Self::Repr>;
}

#[async_trait]
pub trait CreateResource: Resource {
    async fn create(
        &self,
        requester: &Requester,
        scope: &Self::Scope,
        input: Payload<Self::Input>,
    ) -> DomainResult<Self::Repr>;
}

#[async_trait]
pub trait UpdateResource: Resource {
    /// Full update when `partial` is false, PATCH semantics otherwise.
    async fn update(
        &self,
        requester: &Requester,
        scope: &Self::Scope,
        id: i32,
        input: Payload<Self::Input>,
        partial: bool,
    ) -> DomainResult<Self::Repr>;
}

#[async_trait]
pub trait DestroyResource: Resource {
    async fn destroy(&self, requester: &Requester, scope: &Self::Scope, id: i32)
    -> DomainResult<()>;
}

/// Validate a text field. Returns the trimmed value when it is present and
/// not blank.
pub(crate) fn text_field(
    errors: &mut ValidationErrors,
    field: &str,
    value: Option<String>,
    required: bool,
) -> Option<String> {
    match value {
        None => {
            if required {
                errors.add(field, REQUIRED_MESSAGE);
            }
            None
        }
        Some(value) => {
            let value = value.trim();
            if value.is_empty() {
                errors.add(field, BLANK_MESSAGE);
                None
            } else {
                Some(value.to_string())
            }
        }
    }
}

/// Resolve user ids to usernames in one round trip.
pub(crate) struct Usernames(HashMap<i32, String>);

impl Usernames {
    pub(crate) async fn load(
        users: &dyn UserRepository,
        ids: impl IntoIterator<Item = i32>,
    ) -> DomainResult<Self> {
        let mut ids: Vec<i32> = ids.into_iter().collect();
        ids.sort_unstable();
        ids.dedup();

        let found = users.find_by_ids(&ids).await?;
        Ok(Self(
            found.into_iter().map(|user| (user.id, user.username)).collect(),
        ))
    }

    /// Names known without a lookup: the requester's own.
    pub(crate) fn of(identity: &Identity) -> Self {
        Self(HashMap::from([(identity.user_id, identity.username.clone())]))
    }

    pub(crate) fn get(&self, id: i32) -> DomainResult<String> {
        self.0
            .get(&id)
            .cloned()
            .ok_or_else(|| DomainError::Internal(format!("user {id} referenced but missing")))
    }
}

/// Convert every item of a page, failing on the first error.
pub(crate) fn map_page<T, U>(
    page: Page<T>,
    mut f: impl FnMut(T) -> DomainResult<U>,
) -> DomainResult<Page<U>> {
    let items = page
        .items
        .into_iter()
        .map(&mut f)
        .collect::<DomainResult<Vec<_>>>()?;
    Ok(Page {
        items,
        total: page.total,
    })
}
