//! User accounts and roles.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::ids::UserId;

/// Role held by a user account.
///
/// Determines authorization scope on every other entity, via
/// [`Role::permits`](crate::domain::capability) — there is no per-endpoint
/// role branching.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema,
)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "user_role", rename_all = "snake_case")]
pub enum Role {
    /// The supplier operating the fleet; administrative scope.
    Supplier,
    /// Technical manager responsible for sites.
    TechnicalManager,
    /// Manager dispatching field agents.
    AgentManager,
    /// Field agent performing maintenance.
    Agent,
}

/// A persisted user account.
///
/// The password hash never leaves the persistence and auth layers; it is
/// skipped on serialization.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct User {
    /// Row identifier.
    pub id: UserId,
    /// Login email, unique.
    pub email: String,
    /// Argon2id password hash.
    #[serde(skip_serializing)]
    #[schema(ignore)]
    pub password_hash: String,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Authorization role.
    pub role: Role,
    /// Account creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Soft-deactivation flag; inactive accounts cannot log in.
    pub is_active: bool,
}

impl User {
    /// Full display name, `"First Last"`.
    #[must_use]
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Fields required to create a new user account.
#[derive(Debug, Clone)]
pub struct NewUser {
    /// Login email.
    pub email: String,
    /// Argon2id password hash (already hashed by the auth layer).
    pub password_hash: String,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Authorization role.
    pub role: Role,
}
