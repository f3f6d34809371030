//! Schema migration CLI (`up`, `down`, `status`, `fresh`, ...).
//!
//! Reads `DATABASE_URL` from the environment or `.env`. Logging is set up by
//! the migrator CLI itself.

use sea_orm_migration::prelude::*;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    cli::run_cli(migration::Migrator).await;
}
