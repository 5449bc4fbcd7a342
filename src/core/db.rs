use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use sea_orm_migration::MigratorTrait;

use crate::migration::Migrator;

/// Opens the database and brings the schema up to date.
///
/// With `fresh` every table is dropped and all migrations re-applied, which also
/// re-seeds the admin account.
pub async fn connect(database_url: &str, fresh: bool) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(database_url);
    options.sqlx_logging(false);
    // Each in-memory SQLite connection is its own database.
    if database_url.contains(":memory:") {
        options.max_connections(1).min_connections(1);
    }

    let db = Database::connect(options).await?;

    if fresh {
        log::warn!("dropping all tables and re-running migrations");
        Migrator::fresh(&db).await?;
    } else {
        Migrator::up(&db, None).await?;
    }

    Ok(db)
}

/// Fresh in-memory database with every migration applied.
pub async fn connect_in_memory() -> Result<DatabaseConnection, DbErr> {
    connect("sqlite::memory:", false).await
}
