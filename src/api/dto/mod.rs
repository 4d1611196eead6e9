//! Data Transfer Objects for REST request/response serialization.

pub mod alert_dto;
pub mod auth_dto;
pub mod dispenser_dto;
pub mod measurement_dto;

pub use alert_dto::*;
pub use auth_dto::*;
pub use dispenser_dto::*;
pub use measurement_dto::*;
