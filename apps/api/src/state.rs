//! Application state - shared across all handlers.

use std::sync::Arc;

use yatube_core::ports::{
    CommentRepository, FollowRepository, GroupRepository, PasswordService, PostRepository,
    RateLimitError, RateLimiter, TokenService, UserRepository,
};
use yatube_core::services::{CommentService, FollowService, GroupService, PostService};
use yatube_infra::{
    Argon2PasswordService, InMemoryRateLimiter, JwtConfig, JwtTokenService, MemoryStore,
    RateLimitConfig,
};

#[cfg(feature = "postgres")]
use yatube_infra::DatabaseConnections;
#[cfg(feature = "postgres")]
use yatube_infra::database::{
    PostgresCommentRepository, PostgresFollowRepository, PostgresGroupRepository,
    PostgresPostRepository, PostgresUserRepository,
};

use crate::config::AppConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub posts: Arc<PostService>,
    pub comments: Arc<CommentService>,
    pub groups: Arc<GroupService>,
    pub follows: Arc<FollowService>,
    pub users: Arc<dyn UserRepository>,
    pub tokens: Arc<dyn TokenService>,
    pub passwords: Arc<dyn PasswordService>,
    pub auth_rate_limiter: Arc<dyn RateLimiter>,
}

/// One repository handle per entity, from whichever backend is configured.
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub groups: Arc<dyn GroupRepository>,
    pub posts: Arc<dyn PostRepository>,
    pub comments: Arc<dyn CommentRepository>,
    pub follows: Arc<dyn FollowRepository>,
}

impl Repositories {
    pub fn in_memory(store: &MemoryStore) -> Self {
        Self {
            users: Arc::new(store.users()),
            groups: Arc::new(store.groups()),
            posts: Arc::new(store.posts()),
            comments: Arc::new(store.comments()),
            follows: Arc::new(store.follows()),
        }
    }

    #[cfg(feature = "postgres")]
    pub fn postgres(connections: &DatabaseConnections) -> Self {
        let conn = &connections.main;
        Self {
            users: Arc::new(PostgresUserRepository::new(conn.clone())),
            groups: Arc::new(PostgresGroupRepository::new(conn.clone())),
            posts: Arc::new(PostgresPostRepository::new(conn.clone())),
            comments: Arc::new(PostgresCommentRepository::new(conn.clone())),
            follows: Arc::new(PostgresFollowRepository::new(conn.clone())),
        }
    }
}

impl AppState {
    /// Wire the resource handlers over `repos`.
    pub fn new(
        repos: Repositories,
        tokens: Arc<dyn TokenService>,
        passwords: Arc<dyn PasswordService>,
        auth_rate_limiter: Arc<dyn RateLimiter>,
    ) -> Self {
        Self {
            posts: Arc::new(PostService::new(
                repos.posts.clone(),
                repos.groups.clone(),
                repos.users.clone(),
            )),
            comments: Arc::new(CommentService::new(
                repos.comments.clone(),
                repos.posts.clone(),
                repos.users.clone(),
            )),
            groups: Arc::new(GroupService::new(repos.groups.clone())),
            follows: Arc::new(FollowService::new(repos.follows, repos.users.clone())),
            users: repos.users,
            tokens,
            passwords,
            auth_rate_limiter,
        }
    }

    /// Build the state from configuration, using default auth services.
    pub fn from_config(repos: Repositories, config: &AppConfig) -> Result<Self, RateLimitError> {
        let limiter = InMemoryRateLimiter::new(config.auth_rate_limit.clone())?;
        tracing::info!(
            max_requests = config.auth_rate_limit.max_requests,
            window_secs = config.auth_rate_limit.window.as_secs(),
            "Token endpoint rate limiter initialized"
        );

        Ok(Self::new(
            repos,
            Arc::new(JwtTokenService::new(config.jwt.clone())),
            Arc::new(Argon2PasswordService::new()),
            Arc::new(limiter),
        ))
    }

    /// Self-contained state over a fresh in-memory store.
    pub fn in_memory(
        store: &MemoryStore,
        jwt: JwtConfig,
        passwords: Arc<dyn PasswordService>,
        rate_limit: RateLimitConfig,
    ) -> Result<Self, RateLimitError> {
        Ok(Self::new(
            Repositories::in_memory(store),
            Arc::new(JwtTokenService::new(jwt)),
            passwords,
            Arc::new(InMemoryRateLimiter::new(rate_limit)?),
        ))
    }
}
