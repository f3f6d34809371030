//! PostgreSQL repository implementations.

use async_trait::async_trait;
use sea_orm::sea_query::{Expr, extension::postgres::PgExpr};
use sea_orm::{
    ColumnTrait, EntityTrait, JoinType, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
    RelationTrait, Select,
};

use yatube_core::domain::{Comment, Follow, Group, Post, User};
use yatube_core::error::RepoError;
use yatube_core::ports::{
    CommentRepository, FollowRepository, GroupRepository, Page, PostRepository, UserRepository,
    Window,
};

use super::entity::comment::{self, Entity as CommentEntity};
use super::entity::follow::{self, Entity as FollowEntity};
use super::entity::group::{self, Entity as GroupEntity};
use super::entity::post::{self, Entity as PostEntity};
use super::entity::user::{self, Entity as UserEntity};
use super::postgres_base::{PostgresBaseRepository, repo_error};

/// PostgreSQL user repository.
pub type PostgresUserRepository = PostgresBaseRepository<UserEntity>;

/// PostgreSQL group repository.
pub type PostgresGroupRepository = PostgresBaseRepository<GroupEntity>;

/// PostgreSQL post repository.
pub type PostgresPostRepository = PostgresBaseRepository<PostEntity>;

/// PostgreSQL comment repository.
pub type PostgresCommentRepository = PostgresBaseRepository<CommentEntity>;

/// PostgreSQL follow repository.
pub type PostgresFollowRepository = PostgresBaseRepository<FollowEntity>;

/// Run `select` as a counted, optionally windowed listing.
async fn fetch_page<E, T>(
    db: &sea_orm::DbConn,
    select: Select<E>,
    window: Option<Window>,
) -> Result<Page<T>, RepoError>
where
    E: EntityTrait,
    E::Model: Send + Sync,
    T: From<E::Model>,
{
    let total = select.clone().count(db).await.map_err(repo_error)?;
    let select = match window {
        Some(window) => select.limit(window.limit).offset(window.offset),
        None => select,
    };
    let items = select.all(db).await.map_err(repo_error)?;

    Ok(Page {
        items: items.into_iter().map(Into::into).collect(),
        total,
    })
}

/// Escape LIKE wildcards so a search term only matches literally.
fn like_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        tracing::debug!(%username, "Finding user by username");

        let result = UserEntity::find()
            .filter(user::Column::Username.eq(username))
            .one(&self.db)
            .await
            .map_err(repo_error)?;

        Ok(result.map(Into::into))
    }

    async fn find_by_ids(&self, ids: &[i32]) -> Result<Vec<User>, RepoError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let result = UserEntity::find()
            .filter(user::Column::Id.is_in(ids.iter().copied()))
            .all(&self.db)
            .await
            .map_err(repo_error)?;

        Ok(result.into_iter().map(Into::into).collect())
    }
}

#[async_trait]
impl GroupRepository for PostgresGroupRepository {
    async fn list(&self, window: Option<Window>) -> Result<Page<Group>, RepoError> {
        let select = GroupEntity::find().order_by_asc(group::Column::Id);
        fetch_page(&self.db, select, window).await
    }
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn list(&self, window: Option<Window>) -> Result<Page<Post>, RepoError> {
        let select = PostEntity::find().order_by_asc(post::Column::Id);
        fetch_page(&self.db, select, window).await
    }
}

#[async_trait]
impl CommentRepository for PostgresCommentRepository {
    async fn list_for_post(
        &self,
        post_id: i32,
        window: Option<Window>,
    ) -> Result<Page<Comment>, RepoError> {
        let select = CommentEntity::find()
            .filter(comment::Column::PostId.eq(post_id))
            .order_by_asc(comment::Column::Id);
        fetch_page(&self.db, select, window).await
    }

    async fn find_for_post(&self, post_id: i32, id: i32) -> Result<Option<Comment>, RepoError> {
        let result = CommentEntity::find_by_id(id)
            .filter(comment::Column::PostId.eq(post_id))
            .one(&self.db)
            .await
            .map_err(repo_error)?;

        Ok(result.map(Into::into))
    }
}

#[async_trait]
impl FollowRepository for PostgresFollowRepository {
    async fn list_for_user(
        &self,
        user_id: i32,
        search: &[String],
        window: Option<Window>,
    ) -> Result<Page<Follow>, RepoError> {
        let mut select = FollowEntity::find()
            .join(JoinType::InnerJoin, follow::Relation::Following.def())
            .filter(follow::Column::UserId.eq(user_id))
            .order_by_asc(follow::Column::Id);

        for term in search {
            select = select.filter(
                Expr::col((UserEntity, user::Column::Username)).ilike(like_pattern(term)),
            );
        }

        fetch_page(&self.db, select, window).await
    }

    async fn exists(&self, user_id: i32, following_id: i32) -> Result<bool, RepoError> {
        let count = FollowEntity::find()
            .filter(follow::Column::UserId.eq(user_id))
            .filter(follow::Column::FollowingId.eq(following_id))
            .count(&self.db)
            .await
            .map_err(repo_error)?;

        Ok(count > 0)
    }
}
