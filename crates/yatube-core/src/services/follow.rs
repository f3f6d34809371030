//! Follows: list and create, both restricted to authenticated users and
//! always scoped to the requester's own outgoing edges.

use std::sync::Arc;

use async_trait::async_trait;
use yatube_shared::dto::{FollowInput, FollowRepr};

use super::{
    CreateResource, ListQuery, ListResource, Payload, Resource, Usernames, map_page, text_field,
};
use crate::context::{Action, Identity, RequestContext, Requester};
use crate::domain::Follow;
use crate::error::{DomainError, DomainResult, RepoError, ValidationErrors};
use crate::permissions::{IsAuthenticated, authorize};
use crate::ports::{FollowRepository, Page, UserRepository};

pub const SELF_FOLLOW_MESSAGE: &str = "You cannot follow yourself.";
pub const DUPLICATE_FOLLOW_MESSAGE: &str = "You are already following this author.";

pub struct FollowService {
    follows: Arc<dyn FollowRepository>,
    users: Arc<dyn UserRepository>,
    permission: IsAuthenticated,
}

impl FollowService {
    pub fn new(follows: Arc<dyn FollowRepository>, users: Arc<dyn UserRepository>) -> Self {
        Self {
            follows,
            users,
            permission: IsAuthenticated,
        }
    }

    fn identity<'a>(&self, requester: &'a Requester, action: Action) -> DomainResult<&'a Identity> {
        authorize(&self.permission, &RequestContext::new(requester, action))?
            .ok_or(DomainError::Unauthenticated)
    }
}

impl Resource for FollowService {
    type Repr = FollowRepr;
    type Input = FollowInput;
    type Scope = ();
}

#[async_trait]
impl ListResource for FollowService {
    async fn list(
        &self,
        requester: &Requester,
        _scope: &(),
        query: ListQuery,
    ) -> DomainResult<Page<FollowRepr>> {
        let identity = self.identity(requester, Action::List)?;

        let page = self
            .follows
            .list_for_user(identity.user_id, &query.search, query.window)
            .await?;
        let names = Usernames::load(
            self.users.as_ref(),
            page.items
                .iter()
                .flat_map(|f| [f.user_id, f.following_id]),
        )
        .await?;

        map_page(page, |follow| {
            Ok(FollowRepr {
                user: names.get(follow.user_id)?,
                following: names.get(follow.following_id)?,
            })
        })
    }
}

#[async_trait]
impl CreateResource for FollowService {
    async fn create(
        &self,
        requester: &Requester,
        _scope: &(),
        input: Payload<FollowInput>,
    ) -> DomainResult<FollowRepr> {
        let identity = self.identity(requester, Action::Create)?;
        let input = input.into_input()?;

        // Field-level checks first: the target must name an existing user.
        let mut errors = ValidationErrors::new();
        let username = text_field(&mut errors, "following", input.following, true);
        errors.into_result()?;
        let username = username.unwrap_or_default();

        let following = self
            .users
            .find_by_username(&username)
            .await?
            .ok_or_else(|| unknown_user(&username))?;

        // Then the (user, following) uniqueness, then the self-loop check.
        if self.follows.exists(identity.user_id, following.id).await? {
            return Err(duplicate());
        }

        let follow = Follow::new(identity.user_id, following.id);
        if follow.is_self_follow() {
            return Err(DomainError::Validation(ValidationErrors::non_field(
                SELF_FOLLOW_MESSAGE,
            )));
        }

        // Concurrent requests may have inserted the same pair or removed the
        // target since the checks above.
        let saved = match self.follows.save(follow).await {
            Ok(saved) => saved,
            Err(RepoError::Duplicate(_)) => return Err(duplicate()),
            Err(RepoError::Constraint(_)) => return Err(unknown_user(&username)),
            Err(e) => return Err(e.into()),
        };
        tracing::info!(
            follow_id = saved.id,
            user = %identity.username,
            following = %following.username,
            "Follow created"
        );

        Ok(FollowRepr {
            user: identity.username.clone(),
            following: following.username,
        })
    }
}

fn unknown_user(username: &str) -> DomainError {
    DomainError::Validation(ValidationErrors::field(
        "following",
        format!("Object with username={username} does not exist."),
    ))
}

fn duplicate() -> DomainError {
    DomainError::Validation(ValidationErrors::non_field(DUPLICATE_FOLLOW_MESSAGE))
}
