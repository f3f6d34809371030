//! In-memory repositories - used when no database is configured and in tests.
//!
//! All repositories handed out by one [`MemoryStore`] share the same tables
//! behind a single async `RwLock`, so every write (including its constraint
//! checks) is atomic. The store enforces the same constraints as the SQL
//! schema: unique usernames, slugs and follow pairs, no self-follows,
//! existing foreign keys, and the schema's delete cascades.
//! Note: Data is lost on process restart.

mod repos;

use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use yatube_core::domain::{Comment, Follow, Group, Post, User};
use yatube_core::error::RepoError;
use yatube_core::ports::{Page, Window};

pub use repos::{
    InMemoryCommentRepository, InMemoryFollowRepository, InMemoryGroupRepository,
    InMemoryPostRepository, InMemoryUserRepository,
};

/// A stored row with an auto-increment id.
trait Row: Clone {
    fn id(&self) -> i32;
    fn set_id(&mut self, id: i32);
}

macro_rules! impl_row {
    ($($ty:ty),*) => {
        $(impl Row for $ty {
            fn id(&self) -> i32 {
                self.id
            }

            fn set_id(&mut self, id: i32) {
                self.id = id;
            }
        })*
    };
}

impl_row!(User, Group, Post, Comment, Follow);

struct Table<T> {
    rows: BTreeMap<i32, T>,
    last_id: i32,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            rows: BTreeMap::new(),
            last_id: 0,
        }
    }
}

impl<T: Row> Table<T> {
    fn get(&self, id: i32) -> Option<T> {
        self.rows.get(&id).cloned()
    }

    /// Insert when the row has no id yet, overwrite the stored row otherwise.
    fn upsert(&mut self, mut row: T) -> Result<T, RepoError> {
        if row.id() <= 0 {
            self.last_id += 1;
            row.set_id(self.last_id);
        } else if !self.rows.contains_key(&row.id()) {
            return Err(RepoError::NotFound);
        }
        self.rows.insert(row.id(), row.clone());
        Ok(row)
    }

    fn remove(&mut self, id: i32) -> Result<T, RepoError> {
        self.rows.remove(&id).ok_or(RepoError::NotFound)
    }

    /// Rows matching `keep`, ordered by id, sliced to `window`.
    fn page(&self, window: Option<Window>, keep: impl Fn(&T) -> bool) -> Page<T> {
        let rows = self.rows.values().filter(|row| keep(*row)).cloned().collect();
        Page::from_vec(rows, window)
    }
}

#[derive(Default)]
struct Tables {
    users: Table<User>,
    groups: Table<Group>,
    posts: Table<Post>,
    comments: Table<Comment>,
    follows: Table<Follow>,
}

impl Tables {
    fn require_user(&self, id: i32) -> Result<(), RepoError> {
        if self.users.rows.contains_key(&id) {
            Ok(())
        } else {
            Err(RepoError::Constraint(format!("user {id} does not exist")))
        }
    }

    fn delete_user(&mut self, id: i32) -> Result<(), RepoError> {
        self.users.remove(id)?;
        let posts: Vec<i32> = self
            .posts
            .rows
            .values()
            .filter(|p| p.author_id == id)
            .map(|p| p.id)
            .collect();
        for post_id in posts {
            self.delete_post(post_id)?;
        }
        self.comments.rows.retain(|_, c| c.author_id != id);
        self.follows
            .rows
            .retain(|_, f| f.user_id != id && f.following_id != id);
        Ok(())
    }

    fn delete_post(&mut self, id: i32) -> Result<(), RepoError> {
        self.posts.remove(id)?;
        self.comments.rows.retain(|_, c| c.post_id != id);
        Ok(())
    }

    fn delete_group(&mut self, id: i32) -> Result<(), RepoError> {
        self.groups.remove(id)?;
        for post in self.posts.rows.values_mut() {
            if post.group_id == Some(id) {
                post.group_id = None;
            }
        }
        Ok(())
    }
}

/// Shared in-memory tables. Cloning shares the same data.
#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn users(&self) -> InMemoryUserRepository {
        InMemoryUserRepository::new(self.tables.clone())
    }

    pub fn groups(&self) -> InMemoryGroupRepository {
        InMemoryGroupRepository::new(self.tables.clone())
    }

    pub fn posts(&self) -> InMemoryPostRepository {
        InMemoryPostRepository::new(self.tables.clone())
    }

    pub fn comments(&self) -> InMemoryCommentRepository {
        InMemoryCommentRepository::new(self.tables.clone())
    }

    pub fn follows(&self) -> InMemoryFollowRepository {
        InMemoryFollowRepository::new(self.tables.clone())
    }
}
