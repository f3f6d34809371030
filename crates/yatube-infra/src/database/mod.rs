//! Database connection management and SeaORM-backed repositories.

mod connections;
mod postgres_base;
mod postgres_repo;

pub mod entity;

pub use connections::{DatabaseConfig, DatabaseConnections};
pub use postgres_base::PostgresBaseRepository;
pub use postgres_repo::{
    PostgresCommentRepository, PostgresFollowRepository, PostgresGroupRepository,
    PostgresPostRepository, PostgresUserRepository,
};

#[cfg(test)]
mod tests;
