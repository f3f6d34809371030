//! Domain entities - the core business objects.

mod comment;
mod follow;
mod group;
mod post;
mod user;

pub use comment::Comment;
pub use follow::Follow;
pub use group::Group;
pub use post::Post;
pub use user::User;

/// Entities owned by a single user, the only one allowed to mutate them.
pub trait Authored {
    fn author_id(&self) -> i32;
}

impl Authored for Post {
    fn author_id(&self) -> i32 {
        self.author_id
    }
}

impl Authored for Comment {
    fn author_id(&self) -> i32 {
        self.author_id
    }
}
