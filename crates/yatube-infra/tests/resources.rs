//! Resource handlers exercised end to end against the in-memory store.

use std::sync::Arc;

use async_trait::async_trait;
use yatube_core::context::Requester;
use yatube_core::domain::{Follow, Group, User};
use yatube_core::error::{DomainError, NON_FIELD_ERRORS, RepoError};
use yatube_core::ports::{BaseRepository, FollowRepository, Page, Window};
use yatube_core::services::{
    CommentService, CreateResource, DUPLICATE_FOLLOW_MESSAGE, DestroyResource, FollowService,
    GroupService, ListQuery, ListResource, Payload, PostService, REQUIRED_MESSAGE,
    RetrieveResource, SELF_FOLLOW_MESSAGE, UpdateResource,
};
use yatube_infra::MemoryStore;
use yatube_infra::memory::InMemoryFollowRepository;
use yatube_shared::dto::{CommentInput, FollowInput, PostInput};

struct Fixture {
    store: MemoryStore,
    posts: PostService,
    comments: CommentService,
    groups: GroupService,
    follows: FollowService,
}

impl Fixture {
    fn new() -> Self {
        let store = MemoryStore::new();
        Self {
            posts: PostService::new(
                Arc::new(store.posts()),
                Arc::new(store.groups()),
                Arc::new(store.users()),
            ),
            comments: CommentService::new(
                Arc::new(store.comments()),
                Arc::new(store.posts()),
                Arc::new(store.users()),
            ),
            groups: GroupService::new(Arc::new(store.groups())),
            follows: FollowService::new(Arc::new(store.follows()), Arc::new(store.users())),
            store,
        }
    }

    async fn user(&self, username: &str) -> Requester {
        let user = self
            .store
            .users()
            .save(User::new(username.to_string(), "hash".into()))
            .await
            .unwrap();
        Requester::user(user.id, user.username)
    }

    async fn post(&self, author: &Requester, text: &str) -> i32 {
        self.posts
            .create(author, &(), post_input(text))
            .await
            .unwrap()
            .id
    }
}

fn post_input(text: &str) -> Payload<PostInput> {
    PostInput {
        text: Some(text.to_string()),
        ..Default::default()
    }
    .into()
}

fn comment_input(text: &str) -> Payload<CommentInput> {
    CommentInput {
        text: Some(text.to_string()),
    }
    .into()
}

fn follow_input(username: &str) -> Payload<FollowInput> {
    FollowInput {
        following: Some(username.to_string()),
    }
    .into()
}

fn non_field_messages(err: DomainError) -> Vec<String> {
    match err {
        DomainError::Validation(errors) => errors.messages(NON_FIELD_ERRORS).to_vec(),
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_anonymous_can_read_but_not_write_posts() {
    let fx = Fixture::new();
    let alice = fx.user("alice").await;
    fx.post(&alice, "hello").await;

    let page = fx
        .posts
        .list(&Requester::Anonymous, &(), ListQuery::default())
        .await
        .unwrap();
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].author, "alice");

    let err = fx
        .posts
        .create(&Requester::Anonymous, &(), post_input("nope"))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Unauthenticated));
}

#[tokio::test]
async fn test_post_author_is_requester() {
    let fx = Fixture::new();
    let alice = fx.user("alice").await;

    let post = fx.posts.create(&alice, &(), post_input("mine")).await.unwrap();

    assert_eq!(post.author, "alice");
    assert_eq!(post.group, None);
    assert_eq!(post.image, None);
}

#[tokio::test]
async fn test_post_create_validates_text_and_group() {
    let fx = Fixture::new();
    let alice = fx.user("alice").await;

    let err = fx
        .posts
        .create(
            &alice,
            &(),
            PostInput {
                text: None,
                image: None,
                group: Some(Some(404)),
            }
            .into(),
        )
        .await
        .unwrap_err();

    match err {
        DomainError::Validation(errors) => {
            assert_eq!(errors.messages("text"), [REQUIRED_MESSAGE]);
            assert_eq!(
                errors.messages("group"),
                ["Invalid pk \"404\" - object does not exist."]
            );
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_only_author_updates_and_deletes_post() {
    let fx = Fixture::new();
    let alice = fx.user("alice").await;
    let bob = fx.user("bob").await;
    let id = fx.post(&alice, "original").await;

    let err = fx
        .posts
        .update(&bob, &(), id, post_input("hijacked"), true)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::PermissionDenied));

    let err = fx
        .posts
        .update(&Requester::Anonymous, &(), id, post_input("anon"), true)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Unauthenticated));

    let err = fx.posts.destroy(&bob, &(), id).await.unwrap_err();
    assert!(matches!(err, DomainError::PermissionDenied));

    let updated = fx
        .posts
        .update(&alice, &(), id, post_input("edited"), true)
        .await
        .unwrap();
    assert_eq!(updated.text, "edited");
    assert_eq!(updated.author, "alice");

    fx.posts.destroy(&alice, &(), id).await.unwrap();
    let err = fx
        .posts
        .retrieve(&Requester::Anonymous, &(), id)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        DomainError::NotFound {
            entity_type: "Post",
            ..
        }
    ));
}

#[tokio::test]
async fn test_full_update_requires_text_but_patch_does_not() {
    let fx = Fixture::new();
    let alice = fx.user("alice").await;
    let group = fx
        .store
        .groups()
        .save(Group::new("Cats".into(), "cats".into(), "All about cats".into()))
        .await
        .unwrap();
    let id = fx.post(&alice, "text").await;

    let patch = PostInput {
        group: Some(Some(group.id)),
        ..Default::default()
    };
    let patched = fx.posts.update(&alice, &(), id, patch.clone().into(), true).await.unwrap();
    assert_eq!(patched.group, Some(group.id));
    assert_eq!(patched.text, "text");

    let err = fx.posts.update(&alice, &(), id, patch.into(), false).await.unwrap_err();
    assert!(matches!(err, DomainError::Validation(_)));

    let cleared = fx
        .posts
        .update(
            &alice,
            &(),
            id,
            PostInput {
                group: Some(None),
                ..Default::default()
            }
            .into(),
            true,
        )
        .await
        .unwrap();
    assert_eq!(cleared.group, None);
}

#[tokio::test]
async fn test_comment_post_comes_from_path() {
    let fx = Fixture::new();
    let alice = fx.user("alice").await;
    let bob = fx.user("bob").await;
    let first = fx.post(&alice, "first").await;
    let second = fx.post(&alice, "second").await;

    let comment = fx
        .comments
        .create(&bob, &second, comment_input("nice"))
        .await
        .unwrap();
    assert_eq!(comment.post, second);
    assert_eq!(comment.author, "bob");

    let listed = fx
        .comments
        .list(&Requester::Anonymous, &first, ListQuery::default())
        .await
        .unwrap();
    assert!(listed.items.is_empty());

    // Looking the comment up under another post does not find it.
    let err = fx
        .comments
        .retrieve(&Requester::Anonymous, &first, comment.id)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        DomainError::NotFound {
            entity_type: "Comment",
            ..
        }
    ));
}

#[tokio::test]
async fn test_comments_of_missing_post_are_not_found() {
    let fx = Fixture::new();
    let alice = fx.user("alice").await;

    let err = fx
        .comments
        .list(&Requester::Anonymous, &999, ListQuery::default())
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::NotFound { id: 999, .. }));

    let err = fx
        .comments
        .create(&alice, &999, comment_input("hello?"))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::NotFound { id: 999, .. }));

    // Authentication is checked before the post lookup.
    let err = fx
        .comments
        .create(&Requester::Anonymous, &999, comment_input("hello?"))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Unauthenticated));
}

#[tokio::test]
async fn test_only_comment_author_mutates_comment() {
    let fx = Fixture::new();
    let alice = fx.user("alice").await;
    let bob = fx.user("bob").await;
    let post = fx.post(&alice, "post").await;
    let comment = fx
        .comments
        .create(&bob, &post, comment_input("bob says"))
        .await
        .unwrap();

    // Post ownership grants nothing over comments.
    let err = fx
        .comments
        .update(&alice, &post, comment.id, comment_input("alice edits"), false)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::PermissionDenied));

    let edited = fx
        .comments
        .update(&bob, &post, comment.id, comment_input("bob edits"), false)
        .await
        .unwrap();
    assert_eq!(edited.text, "bob edits");
    assert_eq!(edited.post, post);

    fx.comments.destroy(&bob, &post, comment.id).await.unwrap();
    let page = fx
        .comments
        .list(&Requester::Anonymous, &post, ListQuery::default())
        .await
        .unwrap();
    assert_eq!(page.total, 0);
}

#[tokio::test]
async fn test_groups_are_listed_and_retrieved() {
    let fx = Fixture::new();
    for slug in ["cats", "dogs"] {
        fx.store
            .groups()
            .save(Group::new(slug.to_uppercase(), slug.into(), String::new()))
            .await
            .unwrap();
    }

    let page = fx
        .groups
        .list(&Requester::Anonymous, &(), ListQuery::default())
        .await
        .unwrap();
    assert_eq!(
        page.items.iter().map(|g| g.slug.as_str()).collect::<Vec<_>>(),
        ["cats", "dogs"]
    );

    let dogs = fx
        .groups
        .retrieve(&Requester::Anonymous, &(), page.items[1].id)
        .await
        .unwrap();
    assert_eq!(dogs.title, "DOGS");

    assert!(matches!(
        fx.groups.retrieve(&Requester::Anonymous, &(), 77).await,
        Err(DomainError::NotFound { .. })
    ));
}

#[tokio::test]
async fn test_self_follow_is_rejected() {
    let fx = Fixture::new();
    let alice = fx.user("alice").await;

    let err = fx
        .follows
        .create(&alice, &(), follow_input("alice"))
        .await
        .unwrap_err();

    assert_eq!(non_field_messages(err), [SELF_FOLLOW_MESSAGE]);
}

#[tokio::test]
async fn test_duplicate_follow_is_rejected() {
    let fx = Fixture::new();
    let alice = fx.user("alice").await;
    fx.user("bob").await;

    let follow = fx
        .follows
        .create(&alice, &(), follow_input("bob"))
        .await
        .unwrap();
    assert_eq!(follow.user, "alice");
    assert_eq!(follow.following, "bob");

    let err = fx
        .follows
        .create(&alice, &(), follow_input("bob"))
        .await
        .unwrap_err();
    assert_eq!(non_field_messages(err), [DUPLICATE_FOLLOW_MESSAGE]);
}

#[tokio::test]
async fn test_follow_unknown_user_is_field_error() {
    let fx = Fixture::new();
    let alice = fx.user("alice").await;

    let err = fx
        .follows
        .create(&alice, &(), follow_input("ghost"))
        .await
        .unwrap_err();

    match err {
        DomainError::Validation(errors) => assert_eq!(
            errors.messages("following"),
            ["Object with username=ghost does not exist."]
        ),
        other => panic!("unexpected error: {other:?}"),
    }

    let err = fx
        .follows
        .create(&alice, &(), FollowInput::default().into())
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Validation(_)));
}

#[tokio::test]
async fn test_follow_requires_identity() {
    let fx = Fixture::new();
    fx.user("bob").await;

    assert!(matches!(
        fx.follows
            .list(&Requester::Anonymous, &(), ListQuery::default())
            .await,
        Err(DomainError::Unauthenticated)
    ));
    assert!(matches!(
        fx.follows
            .create(&Requester::Anonymous, &(), follow_input("bob"))
            .await,
        Err(DomainError::Unauthenticated)
    ));
}

#[tokio::test]
async fn test_follow_list_is_scoped_and_searchable() {
    let fx = Fixture::new();
    let alice = fx.user("alice").await;
    let carol = fx.user("carol").await;
    fx.user("Bobby").await;
    fx.user("robert").await;

    for target in ["Bobby", "robert", "carol"] {
        fx.follows
            .create(&alice, &(), follow_input(target))
            .await
            .unwrap();
    }
    fx.follows
        .create(&carol, &(), follow_input("Bobby"))
        .await
        .unwrap();

    let all = fx
        .follows
        .list(&alice, &(), ListQuery::default())
        .await
        .unwrap();
    assert_eq!(all.total, 3);
    assert!(all.items.iter().all(|f| f.user == "alice"));

    let searched = fx
        .follows
        .list(&alice, &(), ListQuery::default().with_search(Some("BOB")))
        .await
        .unwrap();
    assert_eq!(searched.items.len(), 1);
    assert_eq!(searched.items[0].following, "Bobby");
}

#[tokio::test]
async fn test_post_listing_window() {
    let fx = Fixture::new();
    let alice = fx.user("alice").await;
    for i in 0..5 {
        fx.post(&alice, &format!("post {i}")).await;
    }

    let page = fx
        .posts
        .list(
            &Requester::Anonymous,
            &(),
            ListQuery {
                window: Some(Window {
                    limit: 2,
                    offset: 1,
                }),
                search: Vec::new(),
            },
        )
        .await
        .unwrap();

    assert_eq!(page.total, 5);
    assert_eq!(
        page.items.iter().map(|p| p.text.as_str()).collect::<Vec<_>>(),
        ["post 1", "post 2"]
    );
}

#[tokio::test]
async fn test_text_is_stored_trimmed() {
    let fx = Fixture::new();
    let alice = fx.user("alice").await;

    let post = fx
        .posts
        .create(&alice, &(), post_input("  hello  \n"))
        .await
        .unwrap();
    assert_eq!(post.text, "hello");

    let comment = fx
        .comments
        .create(&alice, &post.id, comment_input("\tnice "))
        .await
        .unwrap();
    assert_eq!(comment.text, "nice");
}

fn malformed<T>() -> Payload<T> {
    Payload::Malformed("JSON parse error - expected value".to_string())
}

#[tokio::test]
async fn test_malformed_body_is_reported_after_permission_checks() {
    let fx = Fixture::new();
    let alice = fx.user("alice").await;
    let bob = fx.user("bob").await;
    let id = fx.post(&alice, "text").await;

    let err = fx
        .posts
        .create(&Requester::Anonymous, &(), malformed())
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Unauthenticated));

    let err = fx
        .posts
        .update(&bob, &(), id, malformed(), true)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::PermissionDenied));

    let err = fx
        .comments
        .create(&bob, &999, malformed())
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::NotFound { .. }));

    let err = fx
        .follows
        .create(&Requester::Anonymous, &(), malformed())
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Unauthenticated));

    let err = fx
        .posts
        .update(&alice, &(), id, malformed(), true)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::MalformedBody(_)));
}

/// Follow store whose inserts fail as if the target user was deleted
/// between the lookup and the insert.
struct VanishingTarget(InMemoryFollowRepository);

#[async_trait]
impl BaseRepository<Follow, i32> for VanishingTarget {
    async fn find_by_id(&self, id: i32) -> Result<Option<Follow>, RepoError> {
        self.0.find_by_id(id).await
    }

    async fn save(&self, _follow: Follow) -> Result<Follow, RepoError> {
        Err(RepoError::Constraint(
            "violates foreign key constraint \"fk_follows_following\"".into(),
        ))
    }

    async fn delete(&self, id: i32) -> Result<(), RepoError> {
        self.0.delete(id).await
    }
}

#[async_trait]
impl FollowRepository for VanishingTarget {
    async fn list_for_user(
        &self,
        user_id: i32,
        search: &[String],
        window: Option<Window>,
    ) -> Result<Page<Follow>, RepoError> {
        self.0.list_for_user(user_id, search, window).await
    }

    async fn exists(&self, user_id: i32, following_id: i32) -> Result<bool, RepoError> {
        self.0.exists(user_id, following_id).await
    }
}

#[tokio::test]
async fn test_follow_target_removed_during_insert_is_not_duplicate() {
    let fx = Fixture::new();
    let alice = fx.user("alice").await;
    fx.user("bob").await;
    let follows = FollowService::new(
        Arc::new(VanishingTarget(fx.store.follows())),
        Arc::new(fx.store.users()),
    );

    let err = follows
        .create(&alice, &(), follow_input("bob"))
        .await
        .unwrap_err();

    match err {
        DomainError::Validation(errors) => {
            assert!(errors.messages(NON_FIELD_ERRORS).is_empty());
            assert_eq!(
                errors.messages("following"),
                ["Object with username=bob does not exist."]
            );
        }
        other => panic!("unexpected error: {other:?}"),
    }
}
