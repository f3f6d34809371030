//! Access control.
//!
//! A permission is checked twice per request: once before anything is loaded
//! (`has_permission`) and once against the loaded resource
//! (`has_object_permission`). Both are pure.

use crate::context::{Identity, RequestContext};
use crate::domain::Authored;
use crate::error::{DomainError, DomainResult};

pub trait Permission: Send + Sync {
    fn has_permission(&self, _ctx: &RequestContext<'_>) -> DomainResult<()> {
        Ok(())
    }

    fn has_object_permission(
        &self,
        _ctx: &RequestContext<'_>,
        _resource: &dyn Authored,
    ) -> DomainResult<()> {
        Ok(())
    }
}

/// Reads are open to everyone; writes need an identity, and mutating an
/// existing resource needs the identity of its author.
#[derive(Debug, Clone, Copy, Default)]
pub struct IsAuthorOrReadOnly;

impl Permission for IsAuthorOrReadOnly {
    fn has_permission(&self, ctx: &RequestContext<'_>) -> DomainResult<()> {
        if ctx.action.is_safe() || ctx.requester.is_authenticated() {
            Ok(())
        } else {
            Err(DomainError::Unauthenticated)
        }
    }

    fn has_object_permission(
        &self,
        ctx: &RequestContext<'_>,
        resource: &dyn Authored,
    ) -> DomainResult<()> {
        if ctx.action.is_safe() {
            return Ok(());
        }
        match ctx.requester.identity() {
            Some(identity) if identity.user_id == resource.author_id() => Ok(()),
            Some(_) => Err(DomainError::PermissionDenied),
            None => Err(DomainError::Unauthenticated),
        }
    }
}

/// Every action requires an identity.
#[derive(Debug, Clone, Copy, Default)]
pub struct IsAuthenticated;

impl Permission for IsAuthenticated {
    fn has_permission(&self, ctx: &RequestContext<'_>) -> DomainResult<()> {
        if ctx.requester.is_authenticated() {
            Ok(())
        } else {
            Err(DomainError::Unauthenticated)
        }
    }
}

/// Run `has_permission` and hand back the caller's identity, which every
/// write path needs.
pub(crate) fn authorize<'a>(
    permission: &dyn Permission,
    ctx: &RequestContext<'a>,
) -> DomainResult<Option<&'a Identity>> {
    permission.has_permission(ctx)?;
    Ok(ctx.requester.identity())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{Action, Requester};
    use crate::domain::Post;

    fn post_by(author_id: i32) -> Post {
        Post::new(author_id, "text".into(), None, None)
    }

    #[test]
    fn test_reads_are_always_allowed() {
        let anonymous = Requester::Anonymous;
        for action in [Action::List, Action::Retrieve] {
            let ctx = RequestContext::new(&anonymous, action);
            assert!(IsAuthorOrReadOnly.has_permission(&ctx).is_ok());
            assert!(
                IsAuthorOrReadOnly
                    .has_object_permission(&ctx, &post_by(1))
                    .is_ok()
            );
        }
    }

    #[test]
    fn test_anonymous_writes_are_unauthenticated() {
        let anonymous = Requester::Anonymous;
        for action in [
            Action::Create,
            Action::Update,
            Action::PartialUpdate,
            Action::Destroy,
        ] {
            let ctx = RequestContext::new(&anonymous, action);
            assert!(matches!(
                IsAuthorOrReadOnly.has_permission(&ctx),
                Err(DomainError::Unauthenticated)
            ));
        }
    }

    #[test]
    fn test_only_author_may_mutate() {
        let author = Requester::user(1, "alice");
        let stranger = Requester::user(2, "bob");
        let post = post_by(1);

        let ctx = RequestContext::new(&author, Action::PartialUpdate);
        assert!(IsAuthorOrReadOnly.has_object_permission(&ctx, &post).is_ok());

        let ctx = RequestContext::new(&stranger, Action::Destroy);
        assert!(IsAuthorOrReadOnly.has_permission(&ctx).is_ok());
        assert!(matches!(
            IsAuthorOrReadOnly.has_object_permission(&ctx, &post),
            Err(DomainError::PermissionDenied)
        ));
    }

    #[test]
    fn test_is_authenticated_rejects_anonymous_reads() {
        let anonymous = Requester::Anonymous;
        let ctx = RequestContext::new(&anonymous, Action::List);
        assert!(matches!(
            IsAuthenticated.has_permission(&ctx),
            Err(DomainError::Unauthenticated)
        ));

        let user = Requester::user(5, "carol");
        let ctx = RequestContext::new(&user, Action::Create);
        assert_eq!(
            authorize(&IsAuthenticated, &ctx).unwrap().map(|i| i.user_id),
            Some(5)
        );
    }
}
