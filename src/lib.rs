//! # borne-monitor
//!
//! Monitoring backend for a fleet of networked hand-sanitizer dispensers.
//!
//! On-board controllers report gel and battery levels after each use; the
//! service stores every measurement, evaluates it against per-dispenser
//! thresholds, and drives the resulting alerts through their lifecycle up
//! to the maintenance intervention that closes them.
//!
//! ## Architecture
//!
//! ```text
//! Devices (HTTP)          Staff clients (HTTP)
//!     │                        │
//!     └── REST Handlers (api/) ┘
//!             │
//!             ├── IngestService / AlertService (service/)
//!             ├── Threshold evaluator (domain/)
//!             ├── Auth: tokens + capabilities (auth/)
//!             │
//!             └── Store → PostgreSQL (persistence/)
//! ```

pub mod api;
pub mod app_state;
pub mod auth;
pub mod config;
pub mod domain;
pub mod error;
pub mod persistence;
pub mod service;
