//! Domain layer: entity types, identifiers, and the threshold evaluator.
//!
//! This module contains the server-side domain model: typed ids, the
//! persisted entities (dispensers, measurements, alerts, interventions,
//! users), the role/capability authorization model, and the pure threshold
//! evaluation core.

pub mod alert;
pub mod capability;
pub mod dispenser;
pub mod evaluator;
pub mod ids;
pub mod measurement;
pub mod user;

pub use alert::{Alert, AlertCandidate, AlertKind, AlertStatus, Intervention, InterventionKind};
pub use capability::Capability;
pub use dispenser::{Dispenser, Site};
pub use evaluator::{CRITICAL_FLOOR, Thresholds, evaluate};
pub use ids::{AlertId, DispenserId, InterventionId, MeasurementId, SiteId, UserId};
pub use measurement::{Measurement, Reading};
pub use user::{NewUser, Role, User};
