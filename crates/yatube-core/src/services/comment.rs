//! Comments: full CRUD under a parent post, writes restricted to the author.
//!
//! The parent post comes from the URL. It must exist for every action, and
//! it always wins over anything the body says.

use std::sync::Arc;

use async_trait::async_trait;
use yatube_shared::dto::{CommentInput, CommentRepr};

use super::{
    CreateResource, DestroyResource, ListQuery, ListResource, Resource, RetrieveResource,
    Payload, UpdateResource, Usernames, map_page, text_field,
};
use crate::context::{Action, RequestContext, Requester};
use crate::domain::{Comment, Post};
use crate::error::{DomainError, DomainResult, ValidationErrors};
use crate::permissions::{IsAuthorOrReadOnly, Permission, authorize};
use crate::ports::{CommentRepository, Page, PostRepository, UserRepository};

pub struct CommentService {
    comments: Arc<dyn CommentRepository>,
    posts: Arc<dyn PostRepository>,
    users: Arc<dyn UserRepository>,
    permission: IsAuthorOrReadOnly,
}

impl CommentService {
    pub fn new(
        comments: Arc<dyn CommentRepository>,
        posts: Arc<dyn PostRepository>,
        users: Arc<dyn UserRepository>,
    ) -> Self {
        Self {
            comments,
            posts,
            users,
            permission: IsAuthorOrReadOnly,
        }
    }

    async fn post(&self, post_id: i32) -> DomainResult<Post> {
        self.posts
            .find_by_id(post_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Post", post_id))
    }

    async fn load(&self, post_id: i32, id: i32) -> DomainResult<Comment> {
        self.post(post_id).await?;
        self.comments
            .find_for_post(post_id, id)
            .await?
            .ok_or_else(|| DomainError::not_found("Comment", id))
    }

    async fn represent(&self, comment: Comment) -> DomainResult<CommentRepr> {
        let names = Usernames::load(self.users.as_ref(), [comment.author_id]).await?;
        to_repr(comment, &names)
    }
}

fn to_repr(comment: Comment, names: &Usernames) -> DomainResult<CommentRepr> {
    Ok(CommentRepr {
        id: comment.id,
        author: names.get(comment.author_id)?,
        text: comment.text,
        created: comment.created,
        post: comment.post_id,
    })
}

fn validate(input: CommentInput, require_text: bool) -> DomainResult<Option<String>> {
    let mut errors = ValidationErrors::new();
    let text = text_field(&mut errors, "text", input.text, require_text);
    errors.into_result()?;
    Ok(text)
}

impl Resource for CommentService {
    type Repr = CommentRepr;
    type Input = CommentInput;
    /// Id of the parent post.
    type Scope = i32;
}

#[async_trait]
impl ListResource for CommentService {
    async fn list(
        &self,
        requester: &Requester,
        post_id: &i32,
        query: ListQuery,
    ) -> DomainResult<Page<CommentRepr>> {
        self.permission
            .has_permission(&RequestContext::new(requester, Action::List))?;
        self.post(*post_id).await?;

        let page = self.comments.list_for_post(*post_id, query.window).await?;
        let names =
            Usernames::load(self.users.as_ref(), page.items.iter().map(|c| c.author_id)).await?;
        map_page(page, |comment| to_repr(comment, &names))
    }
}

#[async_trait]
impl RetrieveResource for CommentService {
    async fn retrieve(
        &self,
        requester: &Requester,
        post_id: &i32,
        id: i32,
    ) -> DomainResult<CommentRepr> {
        let ctx = RequestContext::new(requester, Action::Retrieve);
        self.permission.has_permission(&ctx)?;

        let comment = self.load(*post_id, id).await?;
        self.permission.has_object_permission(&ctx, &comment)?;
        self.represent(comment).await
    }
}

#[async_trait]
impl CreateResource for CommentService {
    async fn create(
        &self,
        requester: &Requester,
        post_id: &i32,
        input: Payload<CommentInput>,
    ) -> DomainResult<CommentRepr> {
        let ctx = RequestContext::new(requester, Action::Create);
        let identity = authorize(&self.permission, &ctx)?.ok_or(DomainError::Unauthenticated)?;

        let post = self.post(*post_id).await?;
        let text = validate(input.into_input()?, true)?.unwrap_or_default();

        let saved = self
            .comments
            .save(Comment::new(post.id, identity.user_id, text))
            .await?;
        tracing::info!(
            comment_id = saved.id,
            post_id = post.id,
            author = %identity.username,
            "Comment created"
        );

        to_repr(saved, &Usernames::of(identity))
    }
}

#[async_trait]
impl UpdateResource for CommentService {
    async fn update(
        &self,
        requester: &Requester,
        post_id: &i32,
        id: i32,
        input: Payload<CommentInput>,
        partial: bool,
    ) -> DomainResult<CommentRepr> {
        let action = if partial {
            Action::PartialUpdate
        } else {
            Action::Update
        };
        let ctx = RequestContext::new(requester, action);
        self.permission.has_permission(&ctx)?;

        let mut comment = self.load(*post_id, id).await?;
        self.permission.has_object_permission(&ctx, &comment)?;

        if let Some(text) = validate(input.into_input()?, !partial)? {
            comment.text = text;
        }

        let saved = self.comments.save(comment).await?;
        self.represent(saved).await
    }
}

#[async_trait]
impl DestroyResource for CommentService {
    async fn destroy(&self, requester: &Requester, post_id: &i32, id: i32) -> DomainResult<()> {
        let ctx = RequestContext::new(requester, Action::Destroy);
        self.permission.has_permission(&ctx)?;

        let comment = self.load(*post_id, id).await?;
        self.permission.has_object_permission(&ctx, &comment)?;

        self.comments.delete(comment.id).await?;
        tracing::info!(comment_id = id, post_id = *post_id, "Comment deleted");
        Ok(())
    }
}
