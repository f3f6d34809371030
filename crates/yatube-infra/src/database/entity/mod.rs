//! SeaORM entities, one per table.

pub mod comment;
pub mod follow;
pub mod group;
pub mod post;
pub mod user;

use sea_orm::ActiveValue::{self, NotSet, Unchanged};

/// Primary key for an ActiveModel built from a domain entity: left unset for
/// rows that have not been inserted so the database assigns it.
pub(crate) fn new_id(id: i32) -> ActiveValue<i32> {
    if id <= 0 { NotSet } else { Unchanged(id) }
}
