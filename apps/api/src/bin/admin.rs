//! Provisioning CLI: users and groups have no HTTP write surface.

use std::env;

use anyhow::{Context, bail};
use yatube_core::domain::{Group, User};
use yatube_core::ports::{BaseRepository, PasswordService, UserRepository};
use yatube_infra::database::{PostgresGroupRepository, PostgresUserRepository};
use yatube_infra::{Argon2PasswordService, DatabaseConfig, DatabaseConnections};

const USAGE: &str = "Usage:
  yatube-admin create-user <username> <password>
  yatube-admin create-group <slug> <title> [description]

DATABASE_URL must point at a migrated database.";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt().with_env_filter("warn").init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("{USAGE}");
        std::process::exit(1);
    }

    let database_url = env::var("DATABASE_URL").context("DATABASE_URL is not set")?;
    let connections = DatabaseConnections::init(&DatabaseConfig {
        url: database_url,
        max_connections: 1,
        min_connections: 1,
    })
    .await
    .context("failed to connect to the database")?;

    match (args[1].as_str(), &args[2..]) {
        ("create-user", [username, password]) => {
            let users = PostgresUserRepository::new(connections.main.clone());
            if users.find_by_username(username).await?.is_some() {
                bail!("user {username} already exists");
            }

            let hash = Argon2PasswordService::new().hash(password)?;
            let user = users.save(User::new(username.clone(), hash)).await?;
            println!("Created user {} (id {})", user.username, user.id);
        }
        ("create-group", [slug, title, description @ ..]) if description.len() <= 1 => {
            let groups = PostgresGroupRepository::new(connections.main.clone());
            let description = description.first().cloned().unwrap_or_default();
            let group = groups
                .save(Group::new(title.clone(), slug.clone(), description))
                .await
                .with_context(|| format!("failed to create group {slug}"))?;
            println!("Created group {} (id {})", group.slug, group.id);
        }
        _ => {
            eprintln!("Invalid arguments\n\n{USAGE}");
            std::process::exit(1);
        }
    }

    Ok(())
}
