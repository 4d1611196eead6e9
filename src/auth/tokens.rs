//! Access token creation and validation (HS256).

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};

use crate::domain::User;
use crate::error::MonitorError;

use super::claims::Claims;

/// Signs and verifies access tokens with a shared HMAC secret.
#[derive(Clone)]
pub struct TokenKeys {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl_minutes: i64,
}

impl std::fmt::Debug for TokenKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenKeys")
            .field("ttl_minutes", &self.ttl_minutes)
            .finish()
    }
}

impl TokenKeys {
    /// Creates token keys from the shared secret and token lifetime.
    #[must_use]
    pub fn new(secret: &str, ttl_minutes: i64) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 5; // seconds, for clock skew

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl_minutes,
        }
    }

    /// Issues a signed access token for the given user.
    ///
    /// # Errors
    ///
    /// Returns [`MonitorError::Internal`] if token encoding fails.
    pub fn issue(&self, user: &User) -> Result<(String, DateTime<Utc>), MonitorError> {
        let now = Utc::now();
        let expires_at = now + chrono::Duration::minutes(self.ttl_minutes);

        let claims = Claims {
            sub: user.email.clone(),
            role: user.role,
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };

        let token = encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| MonitorError::Internal(format!("failed to encode token: {e}")))?;

        Ok((token, expires_at))
    }

    /// Decodes and validates an access token string.
    ///
    /// # Errors
    ///
    /// Returns [`MonitorError::Unauthorized`] if the signature is invalid
    /// or the token has expired.
    pub fn verify(&self, token: &str) -> Result<Claims, MonitorError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| MonitorError::Unauthorized(format!("invalid token: {e}")))
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::{Role, UserId};

    fn make_user(role: Role) -> User {
        User {
            id: UserId::new(1),
            email: "agent@example.org".to_string(),
            password_hash: String::new(),
            first_name: "Ana".to_string(),
            last_name: "Martin".to_string(),
            role,
            created_at: Utc::now(),
            is_active: true,
        }
    }

    #[test]
    fn issue_then_verify_round_trip() {
        let keys = TokenKeys::new("unit-test-secret", 30);
        let Ok((token, expires_at)) = keys.issue(&make_user(Role::Agent)) else {
            panic!("token issuance failed");
        };
        assert!(expires_at > Utc::now());

        let Ok(claims) = keys.verify(&token) else {
            panic!("verification failed");
        };
        assert_eq!(claims.sub, "agent@example.org");
        assert_eq!(claims.role, Role::Agent);
        assert!(!claims.is_expired());
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let keys = TokenKeys::new("secret-a", 30);
        let Ok((token, _)) = keys.issue(&make_user(Role::Supplier)) else {
            panic!("token issuance failed");
        };

        let other = TokenKeys::new("secret-b", 30);
        assert!(matches!(
            other.verify(&token),
            Err(MonitorError::Unauthorized(_))
        ));
    }

    #[test]
    fn garbage_token_is_rejected() {
        let keys = TokenKeys::new("unit-test-secret", 30);
        assert!(matches!(
            keys.verify("not-a-jwt"),
            Err(MonitorError::Unauthorized(_))
        ));
    }
}
