use async_trait::async_trait;

use crate::domain::{Comment, Follow, Group, Post, User};
use crate::error::RepoError;

/// Limit/offset slice of a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub limit: u64,
    pub offset: u64,
}

/// One slice of a listing plus the size of the whole listing.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
}

impl<T> Page<T> {
    /// Slice an already materialized, ordered listing.
    pub fn from_vec(mut items: Vec<T>, window: Option<Window>) -> Self {
        let total = items.len() as u64;
        if let Some(window) = window {
            let start = usize::try_from(window.offset)
                .unwrap_or(usize::MAX)
                .min(items.len());
            items.drain(..start);
            items.truncate(usize::try_from(window.limit).unwrap_or(usize::MAX));
        }
        Self { items, total }
    }
}

/// Generic repository trait defining standard CRUD operations.
///
/// Entities with an id `<= 0` have not been persisted yet; `save` inserts
/// them and returns the stored row with its assigned id.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// Save an entity (create or update).
    async fn save(&self, entity: T) -> Result<T, RepoError>;

    /// Delete an entity by its ID.
    async fn delete(&self, id: ID) -> Result<(), RepoError>;
}

/// User repository - the id <-> username lookup used at the representation boundary.
#[async_trait]
pub trait UserRepository: BaseRepository<User, i32> {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError>;

    /// Users for the given ids, in no particular order. Unknown ids are skipped.
    async fn find_by_ids(&self, ids: &[i32]) -> Result<Vec<User>, RepoError>;
}

#[async_trait]
pub trait GroupRepository: BaseRepository<Group, i32> {
    /// Groups ordered by id.
    async fn list(&self, window: Option<Window>) -> Result<Page<Group>, RepoError>;
}

#[async_trait]
pub trait PostRepository: BaseRepository<Post, i32> {
    /// Posts ordered by id.
    async fn list(&self, window: Option<Window>) -> Result<Page<Post>, RepoError>;
}

#[async_trait]
pub trait CommentRepository: BaseRepository<Comment, i32> {
    /// Comments of one post ordered by id.
    async fn list_for_post(
        &self,
        post_id: i32,
        window: Option<Window>,
    ) -> Result<Page<Comment>, RepoError>;

    /// A comment, only if it belongs to `post_id`.
    async fn find_for_post(&self, post_id: i32, id: i32) -> Result<Option<Comment>, RepoError>;
}

#[async_trait]
pub trait FollowRepository: BaseRepository<Follow, i32> {
    /// Follows created by `user_id`, ordered by id. Every search term must
    /// occur, case-insensitively, in the followed user's username.
    async fn list_for_user(
        &self,
        user_id: i32,
        search: &[String],
        window: Option<Window>,
    ) -> Result<Page<Follow>, RepoError>;

    async fn exists(&self, user_id: i32, following_id: i32) -> Result<bool, RepoError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_from_vec_slices_and_counts() {
        let page = Page::from_vec((1..=10).collect::<Vec<_>>(), Some(Window { limit: 3, offset: 4 }));
        assert_eq!(page.items, vec![5, 6, 7]);
        assert_eq!(page.total, 10);

        let past_end = Page::from_vec(vec![1, 2], Some(Window { limit: 3, offset: 9 }));
        assert!(past_end.items.is_empty());
        assert_eq!(past_end.total, 2);

        let all = Page::from_vec(vec![1, 2], None);
        assert_eq!(all.items, vec![1, 2]);
    }
}
