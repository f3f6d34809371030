//! User entity for SeaORM.

use sea_orm::Set;
use sea_orm::entity::prelude::*;

use super::new_id;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub username: String,
    pub password_hash: String,
    pub date_joined: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Conversion from SeaORM Model to Domain User.
impl From<Model> for yatube_core::domain::User {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            username: model.username,
            password_hash: model.password_hash,
            date_joined: model.date_joined.into(),
        }
    }
}

/// Conversion from Domain User to SeaORM ActiveModel.
impl From<yatube_core::domain::User> for ActiveModel {
    fn from(user: yatube_core::domain::User) -> Self {
        Self {
            id: new_id(user.id),
            username: Set(user.username),
            password_hash: Set(user.password_hash),
            date_joined: Set(user.date_joined.into()),
        }
    }
}
