//! Service layer: business logic orchestration.
//!
//! [`IngestService`] drives the ingestion pipeline (resolve device →
//! persist measurement → evaluate thresholds); [`AlertService`] manages
//! the alert lifecycle (dedup on creation, resolution with intervention,
//! assignment).

pub mod alerts;
pub mod ingest;

pub use alerts::AlertService;
pub use ingest::{IngestOutcome, IngestService};
