//! Posts: full CRUD, writes restricted to the author.

use std::sync::Arc;

use async_trait::async_trait;
use yatube_shared::dto::{PostInput, PostRepr};

use super::{
    CreateResource, DestroyResource, ListQuery, ListResource, Resource, RetrieveResource,
    Payload, UpdateResource, Usernames, map_page, text_field,
};
use crate::context::{Action, Requester, RequestContext};
use crate::domain::Post;
use crate::error::{DomainError, DomainResult, ValidationErrors};
use crate::permissions::{IsAuthorOrReadOnly, Permission, authorize};
use crate::ports::{GroupRepository, Page, PostRepository, UserRepository};

pub const IMAGE_MAX_LENGTH: usize = 255;

pub struct PostService {
    posts: Arc<dyn PostRepository>,
    groups: Arc<dyn GroupRepository>,
    users: Arc<dyn UserRepository>,
    permission: IsAuthorOrReadOnly,
}

/// Fields of a post input that passed validation. `None` means "leave as is".
struct PostChanges {
    text: Option<String>,
    image: Option<Option<String>>,
    group: Option<Option<i32>>,
}

impl PostService {
    pub fn new(
        posts: Arc<dyn PostRepository>,
        groups: Arc<dyn GroupRepository>,
        users: Arc<dyn UserRepository>,
    ) -> Self {
        Self {
            posts,
            groups,
            users,
            permission: IsAuthorOrReadOnly,
        }
    }

    async fn load(&self, id: i32) -> DomainResult<Post> {
        self.posts
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Post", id))
    }

    async fn validate(&self, input: PostInput, require_text: bool) -> DomainResult<PostChanges> {
        let mut errors = ValidationErrors::new();

        let text = text_field(&mut errors, "text", input.text, require_text);

        if let Some(Some(image)) = &input.image {
            if image.chars().count() > IMAGE_MAX_LENGTH {
                errors.add(
                    "image",
                    format!("Ensure this field has no more than {IMAGE_MAX_LENGTH} characters."),
                );
            }
        }

        if let Some(Some(group_id)) = input.group {
            if self.groups.find_by_id(group_id).await?.is_none() {
                errors.add(
                    "group",
                    format!("Invalid pk \"{group_id}\" - object does not exist."),
                );
            }
        }

        errors.into_result()?;
        Ok(PostChanges {
            text,
            image: input.image,
            group: input.group,
        })
    }

    async fn represent(&self, post: Post) -> DomainResult<PostRepr> {
        let names = Usernames::load(self.users.as_ref(), [post.author_id]).await?;
        to_repr(post, &names)
    }
}

fn to_repr(post: Post, names: &Usernames) -> DomainResult<PostRepr> {
    Ok(PostRepr {
        id: post.id,
        author: names.get(post.author_id)?,
        text: post.text,
        created: post.created,
        image: post.image,
        group: post.group_id,
    })
}

impl Resource for PostService {
    type Repr = PostRepr;
    type Input = PostInput;
    type Scope = ();
}

#[async_trait]
impl ListResource for PostService {
    async fn list(
        &self,
        requester: &Requester,
        _scope: &(),
        query: ListQuery,
    ) -> DomainResult<Page<PostRepr>> {
        self.permission
            .has_permission(&RequestContext::new(requester, Action::List))?;

        let page = self.posts.list(query.window).await?;
        let names =
            Usernames::load(self.users.as_ref(), page.items.iter().map(|p| p.author_id)).await?;
        map_page(page, |post| to_repr(post, &names))
    }
}

#[async_trait]
impl RetrieveResource for PostService {
    async fn retrieve(&self, requester: &Requester, _scope: &(), id: i32) -> DomainResult<PostRepr> {
        let ctx = RequestContext::new(requester, Action::Retrieve);
        self.permission.has_permission(&ctx)?;

        let post = self.load(id).await?;
        self.permission.has_object_permission(&ctx, &post)?;
        self.represent(post).await
    }
}

#[async_trait]
impl CreateResource for PostService {
    async fn create(
        &self,
        requester: &Requester,
        _scope: &(),
        input: Payload<PostInput>,
    ) -> DomainResult<PostRepr> {
        let ctx = RequestContext::new(requester, Action::Create);
        let identity = authorize(&self.permission, &ctx)?.ok_or(DomainError::Unauthenticated)?;

        let changes = self.validate(input.into_input()?, true).await?;
        let post = Post::new(
            identity.user_id,
            changes.text.unwrap_or_default(),
            changes.image.flatten(),
            changes.group.flatten(),
        );

        let saved = self.posts.save(post).await?;
        tracing::info!(post_id = saved.id, author = %identity.username, "Post created");

        to_repr(saved, &Usernames::of(identity))
    }
}

#[async_trait]
impl UpdateResource for PostService {
    async fn update(
        &self,
        requester: &Requester,
        _scope: &(),
        id: i32,
        input: Payload<PostInput>,
        partial: bool,
    ) -> DomainResult<PostRepr> {
        let action = if partial {
            Action::PartialUpdate
        } else {
            Action::Update
        };
        let ctx = RequestContext::new(requester, action);
        self.permission.has_permission(&ctx)?;

        let mut post = self.load(id).await?;
        self.permission.has_object_permission(&ctx, &post)?;

        let changes = self.validate(input.into_input()?, !partial).await?;
        if let Some(text) = changes.text {
            post.text = text;
        }
        if let Some(image) = changes.image {
            post.image = image;
        }
        if let Some(group) = changes.group {
            post.group_id = group;
        }

        let saved = self.posts.save(post).await?;
        tracing::debug!(post_id = saved.id, partial, "Post updated");
        self.represent(saved).await
    }
}

#[async_trait]
impl DestroyResource for PostService {
    async fn destroy(&self, requester: &Requester, _scope: &(), id: i32) -> DomainResult<()> {
        let ctx = RequestContext::new(requester, Action::Destroy);
        self.permission.has_permission(&ctx)?;

        let post = self.load(id).await?;
        self.permission.has_object_permission(&ctx, &post)?;

        self.posts.delete(post.id).await?;
        tracing::info!(post_id = id, "Post deleted");
        Ok(())
    }
}
