//! User entity - Account holders of the solar tracker.
//!
//! Each user has a unique username and email, a bcrypt password hash, a role and an
//! optional postal address. A user owns exactly one `energy_data` summary row and any
//! number of monthly consumption records; both are removed when the user is deleted.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Account role
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Regular account holder
    #[default]
    #[sea_orm(string_value = "user")]
    User,
    /// Administrator, manages baselines and accounts
    #[sea_orm(string_value = "admin")]
    Admin,
}

/// User database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    /// Unique identifier for the user
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Login name
    #[sea_orm(unique)]
    pub username: String,
    /// Contact email
    #[sea_orm(unique)]
    pub email: String,
    /// bcrypt hash of the password, never serialized
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    /// Account role
    pub role: Role,
    /// Street name
    pub address: Option<String>,
    /// House number
    pub number: Option<String>,
    /// Address complement (apartment, block)
    pub complement: Option<String>,
    /// Neighborhood
    pub neighborhood: Option<String>,
    /// City
    pub city: Option<String>,
    /// State
    pub state: Option<String>,
    /// Postal code
    pub cep: Option<String>,
    /// When the account was created
    pub created_at: DateTime,
}

/// Defines relationships between User and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One user has one energy summary
    #[sea_orm(has_one = "super::energy_data::Entity")]
    EnergyData,
    /// One user has many monthly consumption records
    #[sea_orm(has_many = "super::monthly_consumption::Entity")]
    MonthlyConsumption,
}

impl Related<super::energy_data::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::EnergyData.def()
    }
}

impl Related<super::monthly_consumption::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MonthlyConsumption.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
