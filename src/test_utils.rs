//! Shared test utilities for Horizons Solar.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test entities with sensible defaults.

use crate::{
    config::database,
    core::user::{NewUser, register_user},
    entities::{EnergyData, energy_data, monthly_consumption, user},
    errors::Result,
};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use sea_orm::sea_query::Expr;

/// Lowest cost bcrypt accepts; keeps hashing fast in tests.
pub const TEST_BCRYPT_COST: u32 = 4;

/// Password of every user made by [`create_test_user`].
pub const TEST_PASSWORD: &str = "correct horse";

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    init_test_tracing();
    let db = database::connect("sqlite::memory:").await?;
    database::create_tables(&db).await?;
    Ok(db)
}

/// Routes `tracing` output through the test harness. Safe to call repeatedly.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("horizons_solar=debug")
        .with_test_writer()
        .try_init();
}

/// Registers a user named `username` with email `<username>@example.com`.
///
/// # Defaults
/// * `password`: [`TEST_PASSWORD`]
/// * `role`: user
pub async fn create_test_user(db: &DatabaseConnection, username: &str) -> Result<user::Model> {
    register_user(
        db,
        NewUser {
            username: username.to_string(),
            email: format!("{username}@example.com"),
            password: TEST_PASSWORD.to_string(),
            ..Default::default()
        },
        TEST_BCRYPT_COST,
    )
    .await
}

/// Overwrites `total_produced` of a user's summary row without touching anything else.
pub async fn set_produced(db: &DatabaseConnection, user_id: i64, total_produced: f64) -> Result<()> {
    EnergyData::update_many()
        .col_expr(energy_data::Column::TotalProduced, Expr::value(total_produced))
        .filter(energy_data::Column::UserId.eq(user_id))
        .exec(db)
        .await?;
    Ok(())
}

/// Inserts a monthly record directly, skipping the recalculation.
pub async fn insert_test_record(
    db: &DatabaseConnection,
    user_id: i64,
    month: i32,
    year: i32,
    monthly_consumption: f64,
) -> Result<monthly_consumption::Model> {
    let now = Utc::now().naive_utc();
    let record = monthly_consumption::ActiveModel {
        user_id: Set(user_id),
        month: Set(month),
        year: Set(year),
        monthly_consumption: Set(monthly_consumption),
        recorded_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?;
    Ok(record)
}
