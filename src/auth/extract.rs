//! Axum extractor for the authenticated caller.

use axum::extract::FromRequestParts;
use axum::http::header;
use axum::http::request::Parts;

use crate::app_state::AppState;
use crate::domain::{Capability, User};
use crate::error::MonitorError;

use super::claims::Claims;

/// Authenticated caller, extracted from the `Authorization: Bearer` header.
///
/// Carries only the verified claims; handlers that need the full account
/// row load it with [`AuthUser::load_user`].
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// Verified token claims.
    pub claims: Claims,
}

impl AuthUser {
    /// Fails with `Forbidden` unless the caller's role permits `capability`.
    ///
    /// # Errors
    ///
    /// Returns [`MonitorError::Forbidden`] when the capability check fails.
    pub fn require(&self, capability: Capability) -> Result<(), MonitorError> {
        if self.claims.role.permits(capability) {
            Ok(())
        } else {
            Err(MonitorError::Forbidden(format!(
                "role {:?} may not perform this operation",
                self.claims.role
            )))
        }
    }

    /// Loads the caller's account row from the store.
    ///
    /// # Errors
    ///
    /// Returns [`MonitorError::Unauthorized`] if the account no longer
    /// exists or has been deactivated since the token was issued.
    pub async fn load_user(&self, state: &AppState) -> Result<User, MonitorError> {
        let user = state
            .store
            .find_user_by_email(&self.claims.sub)
            .await?
            .ok_or_else(|| MonitorError::Unauthorized("account no longer exists".to_string()))?;

        if !user.is_active {
            return Err(MonitorError::Unauthorized(
                "account is deactivated".to_string(),
            ));
        }
        Ok(user)
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = MonitorError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header_value = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                MonitorError::Unauthorized("missing Authorization header".to_string())
            })?;

        let token = header_value.strip_prefix("Bearer ").ok_or_else(|| {
            MonitorError::Unauthorized("expected a bearer credential".to_string())
        })?;

        let claims = state.tokens.verify(token)?;
        Ok(Self { claims })
    }
}
