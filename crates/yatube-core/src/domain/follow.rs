use serde::{Deserialize, Serialize};

/// Follow entity - a directed edge from `user_id` (the follower) to `following_id`.
///
/// Invariants, enforced by the follow service and by the storage layer:
/// no self-loops, at most one edge per (user, following) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Follow {
    pub id: i32,
    pub user_id: i32,
    pub following_id: i32,
}

impl Follow {
    pub fn new(user_id: i32, following_id: i32) -> Self {
        Self {
            id: 0,
            user_id,
            following_id,
        }
    }

    pub fn is_self_follow(&self) -> bool {
        self.user_id == self.following_id
    }
}
