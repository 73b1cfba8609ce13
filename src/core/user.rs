//! User business logic - registration, login, listing and deletion.
//!
//! Registration also creates the zeroed `energy_data` row so every user has a summary
//! from the start. Deleting a user removes the summary and every monthly record.

use crate::{
    core::energy::{EnergySummary, create_zeroed_energy_data},
    entities::{EnergyData, MonthlyConsumption, Role, User, energy_data, monthly_consumption, user},
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{Condition, QueryOrder, Set, SqlErr, TransactionTrait, prelude::*};
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

/// Input for [`register_user`].
#[derive(Debug, Clone, Default)]
pub struct NewUser {
    /// Login name
    pub username: String,
    /// Contact email
    pub email: String,
    /// Plain-text password, hashed before storage
    pub password: String,
    /// Account role
    pub role: Role,
    /// Street name
    pub address: Option<String>,
    /// House number
    pub number: Option<String>,
    /// Address complement
    pub complement: Option<String>,
    /// Neighborhood
    pub neighborhood: Option<String>,
    /// City
    pub city: Option<String>,
    /// State
    pub state: Option<String>,
    /// Postal code
    pub cep: Option<String>,
}

/// A user together with their energy summary, as shown in the admin listing.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserWithEnergy {
    /// The user, password hash omitted on serialization
    #[serde(flatten)]
    pub user: user::Model,
    /// Summary figures, zeros when the user has no summary row
    pub energy_data: EnergySummary,
}

/// Creates a user and their zeroed energy summary in one transaction.
///
/// # Errors
/// * [`Error::Validation`] - username, email or password blank
/// * [`Error::Conflict`] - username or email already registered
#[instrument(skip(db, new_user), fields(username = %new_user.username))]
pub async fn register_user(
    db: &DatabaseConnection,
    new_user: NewUser,
    bcrypt_cost: u32,
) -> Result<user::Model> {
    let username = new_user.username.trim().to_string();
    let email = new_user.email.trim().to_string();
    if username.is_empty() || email.is_empty() || new_user.password.is_empty() {
        return Err(Error::validation(
            "username, email and password are required",
        ));
    }

    let taken = User::find()
        .filter(
            Condition::any()
                .add(user::Column::Email.eq(email.as_str()))
                .add(user::Column::Username.eq(username.as_str())),
        )
        .one(db)
        .await?;
    if taken.is_some() {
        return Err(Error::conflict("email or username already registered"));
    }

    let password_hash = hash_password(new_user.password, bcrypt_cost).await?;

    let txn = db.begin().await?;
    let created = user::ActiveModel {
        username: Set(username),
        email: Set(email),
        password_hash: Set(password_hash),
        role: Set(new_user.role),
        address: Set(new_user.address),
        number: Set(new_user.number),
        complement: Set(new_user.complement),
        neighborhood: Set(new_user.neighborhood),
        city: Set(new_user.city),
        state: Set(new_user.state),
        cep: Set(new_user.cep),
        created_at: Set(Utc::now().naive_utc()),
        ..Default::default()
    }
    .insert(&txn)
    .await
    .map_err(map_unique_violation)?;
    create_zeroed_energy_data(&txn, created.id).await?;
    txn.commit().await?;

    info!(user_id = created.id, role = ?created.role, "User registered");
    Ok(created)
}

/// Checks a username/password pair.
///
/// Unknown usernames and wrong passwords produce the same [`Error::InvalidCredentials`].
#[instrument(skip(db, password))]
pub async fn authenticate(
    db: &DatabaseConnection,
    username: &str,
    password: &str,
) -> Result<user::Model> {
    if username.trim().is_empty() || password.is_empty() {
        return Err(Error::validation("username and password are required"));
    }

    let Some(found) = User::find()
        .filter(user::Column::Username.eq(username.trim()))
        .one(db)
        .await?
    else {
        warn!("Login rejected");
        return Err(Error::InvalidCredentials);
    };

    if verify_password(password.to_string(), found.password_hash.clone()).await? {
        info!(user_id = found.id, "User logged in");
        Ok(found)
    } else {
        warn!("Login rejected");
        Err(Error::InvalidCredentials)
    }
}

/// Finds a user by ID.
pub async fn get_user(db: &DatabaseConnection, user_id: i64) -> Result<user::Model> {
    User::find_by_id(user_id)
        .one(db)
        .await?
        .ok_or(Error::UserNotFound { user_id })
}

/// Fails with [`Error::UserNotFound`] unless the user exists.
pub async fn ensure_user_exists<C>(conn: &C, user_id: i64) -> Result<()>
where
    C: ConnectionTrait,
{
    let count = User::find()
        .filter(user::Column::Id.eq(user_id))
        .count(conn)
        .await?;
    if count == 0 {
        debug!(user_id, "User lookup missed");
        return Err(Error::UserNotFound { user_id });
    }
    Ok(())
}

/// Lists all users, newest first, each with their energy summary.
pub async fn list_users_with_energy(db: &DatabaseConnection) -> Result<Vec<UserWithEnergy>> {
    let rows = User::find()
        .find_also_related(EnergyData)
        .order_by_desc(user::Column::CreatedAt)
        .order_by_desc(user::Column::Id)
        .all(db)
        .await?;

    Ok(rows
        .into_iter()
        .map(|(user, energy)| UserWithEnergy {
            user,
            energy_data: energy.as_ref().map(EnergySummary::from).unwrap_or_default(),
        })
        .collect())
}

/// Deletes a user together with their summary and monthly records.
///
/// The foreign keys cascade as well; the explicit child deletes keep the result the
/// same on connections where `SQLite` foreign key enforcement is off.
///
/// # Errors
/// * [`Error::UserNotFound`] - nothing was deleted
#[instrument(skip(db))]
pub async fn delete_user(db: &DatabaseConnection, user_id: i64) -> Result<()> {
    let txn = db.begin().await?;
    MonthlyConsumption::delete_many()
        .filter(monthly_consumption::Column::UserId.eq(user_id))
        .exec(&txn)
        .await?;
    EnergyData::delete_many()
        .filter(energy_data::Column::UserId.eq(user_id))
        .exec(&txn)
        .await?;
    let deleted = User::delete_by_id(user_id).exec(&txn).await?;
    if deleted.rows_affected == 0 {
        txn.rollback().await?;
        return Err(Error::UserNotFound { user_id });
    }
    txn.commit().await?;

    info!(user_id, "User deleted");
    Ok(())
}

/// bcrypt is CPU-bound, so both helpers run on the blocking pool.
async fn hash_password(password: String, cost: u32) -> Result<String> {
    let hash = tokio::task::spawn_blocking(move || bcrypt::hash(password, cost)).await??;
    Ok(hash)
}

async fn verify_password(password: String, hash: String) -> Result<bool> {
    let matches = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash)).await??;
    Ok(matches)
}

fn map_unique_violation(err: DbErr) -> Error {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            Error::conflict("email or username already registered")
        }
        _ => Error::Database(err),
    }
}
