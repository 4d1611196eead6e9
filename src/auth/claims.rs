//! JWT claims embedded in access tokens.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::domain::Role;

/// Claims payload of an access token.
///
/// The subject is the user's email, matching the login identifier; the
/// role claim drives every capability check without a database round trip.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject — the user's login email.
    pub sub: String,
    /// Role at the time of token issuance.
    pub role: Role,
    /// Issued-at timestamp (seconds since epoch).
    pub iat: i64,
    /// Expiration timestamp (seconds since epoch).
    pub exp: i64,
}

impl Claims {
    /// Checks whether this token has expired.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }
}
