//! Follow entity for SeaORM.
//!
//! The table carries a unique index on (user_id, following_id) and a
//! `user_id <> following_id` check; see the migration.

use sea_orm::Set;
use sea_orm::entity::prelude::*;

use super::new_id;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "follows")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub user_id: i32,
    pub following_id: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    User,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::FollowingId",
        to = "super::user::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Following,
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for yatube_core::domain::Follow {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            following_id: model.following_id,
        }
    }
}

impl From<yatube_core::domain::Follow> for ActiveModel {
    fn from(follow: yatube_core::domain::Follow) -> Self {
        Self {
            id: new_id(follow.id),
            user_id: Set(follow.user_id),
            following_id: Set(follow.following_id),
        }
    }
}
