//! Authentication DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::Role;

/// Request body for `POST /auth/login`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    /// Login email.
    pub email: String,
    /// Plaintext password.
    pub password: String,
}

/// Response body for `POST /auth/login`.
#[derive(Debug, Serialize, ToSchema)]
pub struct TokenResponse {
    /// Signed access token.
    pub access_token: String,
    /// Always `"bearer"`.
    pub token_type: String,
    /// Token expiration timestamp.
    pub expires_at: DateTime<Utc>,
}

/// Request body for `POST /auth/register`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterRequest {
    /// Login email, unique.
    pub email: String,
    /// Plaintext password (min 6 characters).
    pub password: String,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Role granted to the account.
    pub role: Role,
}
