//! Database configuration module for the chemical inventory.
//!
//! This module handles the database connection and table creation using `SeaORM`.
//! Tables are generated from the entity definitions with
//! `Schema::create_table_from_entity`, so the schema always matches the Rust structs.
//! `SQLite` is the default backend; a Postgres `DATABASE_URL` works as well.

use crate::entities::{Chemical, User};
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Schema};
use std::path::Path;
use tracing::{debug, info, instrument};

/// Default location of the local `SQLite` database file.
pub const DEFAULT_DATABASE_URL: &str = "sqlite://data/chemicals.sqlite?mode=rwc";

/// Gets the database URL from environment variable or returns default `SQLite` path.
#[must_use]
pub fn get_database_url() -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string())
}

/// Establishes a connection to the database named by `DATABASE_URL`.
///
/// Falls back to a local `SQLite` file if no environment variable is set.
pub async fn create_connection() -> Result<DatabaseConnection> {
    let database_url = get_database_url();
    if let Some(parent) = sqlite_file_path(&database_url).and_then(Path::parent) {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    debug!("Connecting to database");
    Database::connect(&database_url).await.map_err(Into::into)
}

/// File path of a `sqlite://` URL, without the query string.
fn sqlite_file_path(database_url: &str) -> Option<&Path> {
    let rest = database_url.strip_prefix("sqlite://")?;
    let file = rest.split('?').next().unwrap_or_default();
    (!file.is_empty() && !file.starts_with(':')).then(|| Path::new(file))
}

/// Creates the `chemicals` and `users` tables plus the `po_number` index, if missing.
///
/// Purchase-order edits look up every row of one PO, so the PO number column
/// is indexed instead of scanning the whole table.
#[instrument(skip(db))]
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let mut chemical_table = schema.create_table_from_entity(Chemical);
    chemical_table.if_not_exists();
    let mut user_table = schema.create_table_from_entity(User);
    user_table.if_not_exists();

    db.execute(builder.build(&chemical_table)).await?;
    db.execute(builder.build(&user_table)).await?;

    for mut index in schema.create_index_from_entity(Chemical) {
        index.if_not_exists();
        db.execute(builder.build(&index)).await?;
    }

    info!("Database tables ensured");
    Ok(())
}
