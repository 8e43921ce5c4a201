use std::str::FromStr;

use sqlx::SqlitePool;
use sqlx::migrate::Migrator;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};

use crate::auth::password;
use crate::auth::session::ALL_PERMISSIONS;
use crate::errors::AppError;
use crate::models::admin_user::{self, NewAdminUser};

pub type DbPool = SqlitePool;

pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

pub async fn init_pool(database_url: &str) -> Result<DbPool, AppError> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(8)
        .connect_with(options)
        .await?;
    Ok(pool)
}

pub async fn run_migrations(pool: &DbPool) -> Result<(), AppError> {
    MIGRATOR.run(pool).await?;
    log::info!("Database migrations complete");
    Ok(())
}

/// Create the configured administrator if no administrator exists yet.
pub async fn seed_admin(pool: &DbPool, username: &str, plain_password: &str) -> Result<(), AppError> {
    let count = admin_user::count(pool).await?;
    if count > 0 {
        log::info!("Administrator already present ({count} accounts), skipping seed");
        return Ok(());
    }

    let password_hash = password::hash_password(plain_password).map_err(AppError::Hash)?;
    let new = NewAdminUser {
        username: username.to_string(),
        password_hash,
        permissions: ALL_PERMISSIONS.join(","),
    };
    let id = admin_user::create(pool, &new).await?;
    log::info!("Seeded administrator '{username}' (id {id})");
    Ok(())
}
