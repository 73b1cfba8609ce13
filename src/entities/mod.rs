//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod energy_data;
pub mod monthly_consumption;
pub mod user;

// Re-export specific types to avoid conflicts
pub use energy_data::{
    Column as EnergyDataColumn, Entity as EnergyData, Model as EnergyDataModel,
};
pub use monthly_consumption::{
    Column as MonthlyConsumptionColumn, Entity as MonthlyConsumption,
    Model as MonthlyConsumptionModel,
};
pub use user::{Column as UserColumn, Entity as User, Model as UserModel, Role};
