//! Business logic, independent of the HTTP layer.

pub mod consumption;
pub mod energy;
pub mod estimator;
pub mod locks;
pub mod metrics;
pub mod user;
