//! Monthly consumption entity - One calendar-month consumption observation per user.
//!
//! `(user_id, month, year)` is unique; see `config::database::create_tables` for the
//! composite index. Re-submitting a month overwrites `monthly_consumption` in place.
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Monthly consumption record database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "monthly_consumption_records")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    /// Unique identifier for the record
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owning user
    pub user_id: i64,
    /// Calendar month, 1-12
    pub month: i32,
    /// Calendar year
    pub year: i32,
    /// Energy consumed that month in kWh
    pub monthly_consumption: f64,
    /// When the month was first recorded
    pub recorded_at: DateTime,
    /// When the value was last overwritten
    pub updated_at: DateTime,
}

/// Defines relationships between `MonthlyConsumption` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each record belongs to one user and goes away with it
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    User,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
