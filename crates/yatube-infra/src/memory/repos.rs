use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use yatube_core::domain::{Comment, Follow, Group, Post, User};
use yatube_core::error::RepoError;
use yatube_core::ports::{
    BaseRepository, CommentRepository, FollowRepository, GroupRepository, Page, PostRepository,
    UserRepository, Window,
};

use super::Tables;

macro_rules! memory_repository {
    ($name:ident, $doc:literal) => {
        #[doc = $doc]
        #[derive(Clone)]
        pub struct $name {
            tables: Arc<RwLock<Tables>>,
        }

        impl $name {
            pub(super) fn new(tables: Arc<RwLock<Tables>>) -> Self {
                Self { tables }
            }
        }
    };
}

memory_repository!(InMemoryUserRepository, "In-memory user repository.");
memory_repository!(InMemoryGroupRepository, "In-memory group repository.");
memory_repository!(InMemoryPostRepository, "In-memory post repository.");
memory_repository!(InMemoryCommentRepository, "In-memory comment repository.");
memory_repository!(InMemoryFollowRepository, "In-memory follow repository.");

#[async_trait]
impl BaseRepository<User, i32> for InMemoryUserRepository {
    async fn find_by_id(&self, id: i32) -> Result<Option<User>, RepoError> {
        Ok(self.tables.read().await.users.get(id))
    }

    async fn save(&self, user: User) -> Result<User, RepoError> {
        let mut tables = self.tables.write().await;
        let taken = tables
            .users
            .rows
            .values()
            .any(|u| u.username == user.username && u.id != user.id);
        if taken {
            return Err(RepoError::Duplicate(format!(
                "username {} already exists",
                user.username
            )));
        }
        tables.users.upsert(user)
    }

    async fn delete(&self, id: i32) -> Result<(), RepoError> {
        self.tables.write().await.delete_user(id)
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .rows
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn find_by_ids(&self, ids: &[i32]) -> Result<Vec<User>, RepoError> {
        let tables = self.tables.read().await;
        Ok(ids.iter().filter_map(|id| tables.users.get(*id)).collect())
    }
}

#[async_trait]
impl BaseRepository<Group, i32> for InMemoryGroupRepository {
    async fn find_by_id(&self, id: i32) -> Result<Option<Group>, RepoError> {
        Ok(self.tables.read().await.groups.get(id))
    }

    async fn save(&self, group: Group) -> Result<Group, RepoError> {
        let mut tables = self.tables.write().await;
        let taken = tables
            .groups
            .rows
            .values()
            .any(|g| g.slug == group.slug && g.id != group.id);
        if taken {
            return Err(RepoError::Duplicate(format!(
                "slug {} already exists",
                group.slug
            )));
        }
        tables.groups.upsert(group)
    }

    async fn delete(&self, id: i32) -> Result<(), RepoError> {
        self.tables.write().await.delete_group(id)
    }
}

#[async_trait]
impl GroupRepository for InMemoryGroupRepository {
    async fn list(&self, window: Option<Window>) -> Result<Page<Group>, RepoError> {
        Ok(self.tables.read().await.groups.page(window, |_| true))
    }
}

#[async_trait]
impl BaseRepository<Post, i32> for InMemoryPostRepository {
    async fn find_by_id(&self, id: i32) -> Result<Option<Post>, RepoError> {
        Ok(self.tables.read().await.posts.get(id))
    }

    async fn save(&self, post: Post) -> Result<Post, RepoError> {
        let mut tables = self.tables.write().await;
        tables.require_user(post.author_id)?;
        if let Some(group_id) = post.group_id {
            if !tables.groups.rows.contains_key(&group_id) {
                return Err(RepoError::Constraint(format!(
                    "group {group_id} does not exist"
                )));
            }
        }
        tables.posts.upsert(post)
    }

    async fn delete(&self, id: i32) -> Result<(), RepoError> {
        self.tables.write().await.delete_post(id)
    }
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn list(&self, window: Option<Window>) -> Result<Page<Post>, RepoError> {
        Ok(self.tables.read().await.posts.page(window, |_| true))
    }
}

#[async_trait]
impl BaseRepository<Comment, i32> for InMemoryCommentRepository {
    async fn find_by_id(&self, id: i32) -> Result<Option<Comment>, RepoError> {
        Ok(self.tables.read().await.comments.get(id))
    }

    async fn save(&self, comment: Comment) -> Result<Comment, RepoError> {
        let mut tables = self.tables.write().await;
        tables.require_user(comment.author_id)?;
        if !tables.posts.rows.contains_key(&comment.post_id) {
            return Err(RepoError::Constraint(format!(
                "post {} does not exist",
                comment.post_id
            )));
        }
        tables.comments.upsert(comment)
    }

    async fn delete(&self, id: i32) -> Result<(), RepoError> {
        self.tables.write().await.comments.remove(id).map(drop)
    }
}

#[async_trait]
impl CommentRepository for InMemoryCommentRepository {
    async fn list_for_post(
        &self,
        post_id: i32,
        window: Option<Window>,
    ) -> Result<Page<Comment>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.comments.page(window, |c| c.post_id == post_id))
    }

    async fn find_for_post(&self, post_id: i32, id: i32) -> Result<Option<Comment>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.comments.get(id).filter(|c| c.post_id == post_id))
    }
}

#[async_trait]
impl BaseRepository<Follow, i32> for InMemoryFollowRepository {
    async fn find_by_id(&self, id: i32) -> Result<Option<Follow>, RepoError> {
        Ok(self.tables.read().await.follows.get(id))
    }

    async fn save(&self, follow: Follow) -> Result<Follow, RepoError> {
        let mut tables = self.tables.write().await;
        if follow.is_self_follow() {
            return Err(RepoError::Constraint("user cannot follow themselves".into()));
        }
        tables.require_user(follow.user_id)?;
        tables.require_user(follow.following_id)?;
        let duplicate = tables.follows.rows.values().any(|f| {
            f.user_id == follow.user_id && f.following_id == follow.following_id && f.id != follow.id
        });
        if duplicate {
            return Err(RepoError::Duplicate("follow already exists".into()));
        }
        tables.follows.upsert(follow)
    }

    async fn delete(&self, id: i32) -> Result<(), RepoError> {
        self.tables.write().await.follows.remove(id).map(drop)
    }
}

#[async_trait]
impl FollowRepository for InMemoryFollowRepository {
    async fn list_for_user(
        &self,
        user_id: i32,
        search: &[String],
        window: Option<Window>,
    ) -> Result<Page<Follow>, RepoError> {
        let tables = self.tables.read().await;
        let terms: Vec<String> = search.iter().map(|t| t.to_lowercase()).collect();

        Ok(tables.follows.page(window, |f| {
            if f.user_id != user_id {
                return false;
            }
            let Some(following) = tables.users.rows.get(&f.following_id) else {
                return false;
            };
            let username = following.username.to_lowercase();
            terms.iter().all(|term| username.contains(term.as_str()))
        }))
    }

    async fn exists(&self, user_id: i32, following_id: i32) -> Result<bool, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables
            .follows
            .rows
            .values()
            .any(|f| f.user_id == user_id && f.following_id == following_id))
    }
}

#[cfg(test)]
mod tests {
    use super::super::MemoryStore;
    use super::*;

    async fn seed_users(store: &MemoryStore, names: &[&str]) -> Vec<User> {
        let users = store.users();
        let mut saved = Vec::new();
        for name in names {
            saved.push(
                users
                    .save(User::new(name.to_string(), "hash".into()))
                    .await
                    .unwrap(),
            );
        }
        saved
    }

    #[tokio::test]
    async fn test_ids_are_assigned_in_order() {
        let store = MemoryStore::new();
        let users = seed_users(&store, &["alice", "bob"]).await;
        assert_eq!(users[0].id, 1);
        assert_eq!(users[1].id, 2);
    }

    #[tokio::test]
    async fn test_username_is_unique() {
        let store = MemoryStore::new();
        seed_users(&store, &["alice"]).await;

        let result = store
            .users()
            .save(User::new("alice".into(), "other".into()))
            .await;
        assert!(matches!(result, Err(RepoError::Duplicate(_))));
    }

    #[tokio::test]
    async fn test_follow_constraints() {
        let store = MemoryStore::new();
        let users = seed_users(&store, &["alice", "bob"]).await;
        let follows = store.follows();

        follows
            .save(Follow::new(users[0].id, users[1].id))
            .await
            .unwrap();
        assert!(follows.exists(users[0].id, users[1].id).await.unwrap());
        assert!(!follows.exists(users[1].id, users[0].id).await.unwrap());

        let duplicate = follows.save(Follow::new(users[0].id, users[1].id)).await;
        assert!(matches!(duplicate, Err(RepoError::Duplicate(_))));

        let self_follow = follows.save(Follow::new(users[0].id, users[0].id)).await;
        assert!(matches!(self_follow, Err(RepoError::Constraint(_))));
    }

    #[tokio::test]
    async fn test_follow_search_is_case_insensitive_and_scoped() {
        let store = MemoryStore::new();
        let users = seed_users(&store, &["alice", "BobSmith", "bobby", "carol"]).await;
        let follows = store.follows();
        for target in &users[1..] {
            follows
                .save(Follow::new(users[0].id, target.id))
                .await
                .unwrap();
        }
        follows
            .save(Follow::new(users[3].id, users[1].id))
            .await
            .unwrap();

        let page = follows
            .list_for_user(users[0].id, &["BOB".to_string()], None)
            .await
            .unwrap();
        assert_eq!(page.total, 2);
        assert!(page.items.iter().all(|f| f.user_id == users[0].id));

        let page = follows
            .list_for_user(users[0].id, &["bob".to_string(), "smith".to_string()], None)
            .await
            .unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].following_id, users[1].id);
    }

    #[tokio::test]
    async fn test_deleting_post_cascades_to_comments() {
        let store = MemoryStore::new();
        let users = seed_users(&store, &["alice"]).await;
        let post = store
            .posts()
            .save(Post::new(users[0].id, "hello".into(), None, None))
            .await
            .unwrap();
        let comment = store
            .comments()
            .save(Comment::new(post.id, users[0].id, "first".into()))
            .await
            .unwrap();

        store.posts().delete(post.id).await.unwrap();

        assert!(store.comments().find_by_id(comment.id).await.unwrap().is_none());
        assert!(matches!(
            store.posts().delete(post.id).await,
            Err(RepoError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_comment_lookup_is_scoped_to_post() {
        let store = MemoryStore::new();
        let users = seed_users(&store, &["alice"]).await;
        let first = store
            .posts()
            .save(Post::new(users[0].id, "one".into(), None, None))
            .await
            .unwrap();
        let second = store
            .posts()
            .save(Post::new(users[0].id, "two".into(), None, None))
            .await
            .unwrap();
        let comment = store
            .comments()
            .save(Comment::new(first.id, users[0].id, "hi".into()))
            .await
            .unwrap();

        let comments = store.comments();
        assert!(comments.find_for_post(first.id, comment.id).await.unwrap().is_some());
        assert!(comments.find_for_post(second.id, comment.id).await.unwrap().is_none());
        assert_eq!(comments.list_for_post(second.id, None).await.unwrap().total, 0);
    }

    #[tokio::test]
    async fn test_deleting_group_detaches_posts() {
        let store = MemoryStore::new();
        let users = seed_users(&store, &["alice"]).await;
        let group = store
            .groups()
            .save(Group::new("Cats".into(), "cats".into(), "".into()))
            .await
            .unwrap();
        let post = store
            .posts()
            .save(Post::new(users[0].id, "meow".into(), None, Some(group.id)))
            .await
            .unwrap();

        store.groups().delete(group.id).await.unwrap();

        let post = store.posts().find_by_id(post.id).await.unwrap().unwrap();
        assert_eq!(post.group_id, None);
    }
}
