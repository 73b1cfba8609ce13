//! Database configuration module for Horizons Solar.
//!
//! This module handles `SQLite` database connection and table creation using `SeaORM`.
//! Tables are generated from the entity definitions with `Schema::create_table_from_entity`,
//! so the foreign keys (`ON DELETE CASCADE` towards `users`) and single-column unique
//! constraints come straight from the entity attributes. The composite uniqueness of
//! monthly records on `(user_id, month, year)` is not expressible as an entity attribute
//! and is created here as an explicit unique index.

use crate::entities::{EnergyData, MonthlyConsumption, MonthlyConsumptionColumn, User};
use crate::errors::Result;
use sea_orm::sea_query::Index;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Schema};
use std::path::Path;
use tracing::{debug, info, instrument};

/// Default database location, created on first run.
pub const DEFAULT_DATABASE_URL: &str = "sqlite://data/horizons.sqlite?mode=rwc";

const MONTHLY_UNIQUE_INDEX: &str = "idx_monthly_consumption_user_month_year";

/// Establishes a connection to the database at `database_url`.
///
/// For file-backed `SQLite` URLs the parent directory is created if it is missing.
#[instrument]
pub async fn connect(database_url: &str) -> Result<DatabaseConnection> {
    if let Some(parent) = sqlite_file_path(database_url).and_then(Path::parent) {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let mut options = ConnectOptions::new(database_url.to_string());
    options.sqlx_logging(false);
    if database_url.contains(":memory:") {
        // Every pooled connection to an in-memory database would see its own empty schema.
        options.max_connections(1).min_connections(1);
    }

    debug!("Connecting to database");
    Database::connect(options).await.map_err(Into::into)
}

/// Connects and makes sure the schema exists.
pub async fn init_db(database_url: &str) -> Result<DatabaseConnection> {
    let db = connect(database_url).await?;
    create_tables(&db).await?;
    info!("Database tables ensured.");
    Ok(db)
}

/// Creates all tables and indexes if they do not exist yet.
///
/// Order matters: `users` must exist before the tables that reference it.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let mut user_table = schema.create_table_from_entity(User);
    user_table.if_not_exists();
    let mut energy_table = schema.create_table_from_entity(EnergyData);
    energy_table.if_not_exists();
    let mut monthly_table = schema.create_table_from_entity(MonthlyConsumption);
    monthly_table.if_not_exists();

    db.execute(builder.build(&user_table)).await?;
    db.execute(builder.build(&energy_table)).await?;
    db.execute(builder.build(&monthly_table)).await?;

    let monthly_unique = Index::create()
        .name(MONTHLY_UNIQUE_INDEX)
        .table(MonthlyConsumption)
        .col(MonthlyConsumptionColumn::UserId)
        .col(MonthlyConsumptionColumn::Month)
        .col(MonthlyConsumptionColumn::Year)
        .unique()
        .if_not_exists()
        .to_owned();
    db.execute(builder.build(&monthly_unique)).await?;

    Ok(())
}

/// Extracts the file path from a `sqlite://` URL, ignoring query parameters.
fn sqlite_file_path(database_url: &str) -> Option<&Path> {
    let rest = database_url.strip_prefix("sqlite://")?;
    let path = rest.split('?').next()?;
    if path.is_empty() || path.contains(":memory:") {
        return None;
    }
    Some(Path::new(path))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::panic)]
    use super::*;
    use crate::entities::{EnergyDataModel, MonthlyConsumptionModel, UserModel};
    use crate::errors::Error;
    use crate::test_utils::{create_test_user, insert_test_record, setup_test_db};
    use sea_orm::{EntityTrait, QuerySelect, SqlErr};

    #[tokio::test]
    async fn test_create_tables() -> Result<()> {
        let db = connect("sqlite::memory:").await?;
        create_tables(&db).await?;

        // Test that tables exist by querying them
        let _: Vec<UserModel> = User::find().limit(1).all(&db).await?;
        let _: Vec<EnergyDataModel> = EnergyData::find().limit(1).all(&db).await?;
        let _: Vec<MonthlyConsumptionModel> =
            MonthlyConsumption::find().limit(1).all(&db).await?;

        Ok(())
    }

    #[tokio::test]
    async fn test_create_tables_is_idempotent() -> Result<()> {
        let db = connect("sqlite::memory:").await?;
        create_tables(&db).await?;
        create_tables(&db).await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_monthly_records_unique_per_user_and_period() -> Result<()> {
        let db = setup_test_db().await?;
        let alice = create_test_user(&db, "alice").await?;
        let bob = create_test_user(&db, "bob").await?;
        insert_test_record(&db, alice.id, 3, 2024, 10.0).await?;

        let duplicate = insert_test_record(&db, alice.id, 3, 2024, 20.0).await;
        match duplicate {
            Err(Error::Database(err)) => assert!(matches!(
                err.sql_err(),
                Some(SqlErr::UniqueConstraintViolation(_))
            )),
            other => panic!("expected unique violation, got {other:?}"),
        }

        // Same period for another user, or another period for the same user, is fine.
        insert_test_record(&db, bob.id, 3, 2024, 10.0).await?;
        insert_test_record(&db, alice.id, 3, 2025, 10.0).await?;
        insert_test_record(&db, alice.id, 4, 2024, 10.0).await?;

        Ok(())
    }

    #[test]
    fn test_sqlite_file_path() {
        assert_eq!(
            sqlite_file_path("sqlite://data/horizons.sqlite?mode=rwc"),
            Some(Path::new("data/horizons.sqlite"))
        );
        assert_eq!(sqlite_file_path("sqlite::memory:"), None);
        assert_eq!(sqlite_file_path("postgres://localhost/db"), None);
    }
}
