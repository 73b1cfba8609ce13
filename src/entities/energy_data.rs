//! Energy data entity - Denormalized per-user summary of production and savings.
//!
//! `total_consumed` and the three savings figures are derived values: they are
//! recomputed from the monthly consumption records and `total_produced` whenever a
//! record changes, or written directly by the admin baseline operation.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Energy summary database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "energy_data")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    /// Unique identifier for the summary row
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owning user, at most one row per user
    #[sea_orm(unique)]
    pub user_id: i64,
    /// Number of panels installed
    pub panels_installed: i32,
    /// Total energy produced in kWh (admin controlled)
    pub total_produced: f64,
    /// Total energy consumed in kWh
    pub total_consumed: f64,
    /// Net energy saved in kWh
    pub total_saved: f64,
    /// Money saved from the net energy
    pub money_saved: f64,
    /// Trees saved, derived from production
    pub trees_saved: f64,
    /// When the summary was last written
    pub updated_at: DateTime,
}

/// Defines relationships between `EnergyData` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each summary belongs to one user and goes away with it
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
