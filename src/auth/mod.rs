//! Authentication: JWT access tokens, password hashing, and the
//! authenticated-caller extractor.
//!
//! The credential is an opaque bearer token with subject (email) and role
//! claims. Authorization itself lives in the domain layer as a capability
//! check ([`crate::domain::Capability`]).

pub mod claims;
pub mod extract;
pub mod password;
pub mod tokens;

pub use claims::Claims;
pub use extract::AuthUser;
pub use tokens::TokenKeys;
