//! Type-safe entity identifiers.
//!
//! Every persisted entity is keyed by a database-generated `BIGSERIAL`.
//! Newtype wrappers keep the different id spaces from being confused with
//! each other (an [`AlertId`] can never be passed where a [`DispenserId`]
//! is expected).

use std::fmt;

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            serde::Serialize,
            serde::Deserialize,
            sqlx::Type,
            utoipa::ToSchema,
        )]
        #[serde(transparent)]
        #[sqlx(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Wraps a raw database identifier.
            #[must_use]
            pub const fn new(raw: i64) -> Self {
                Self(raw)
            }

            /// Returns the raw database identifier.
            #[must_use]
            pub const fn as_i64(self) -> i64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(raw: i64) -> Self {
                Self(raw)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

entity_id!(
    /// Identifier of a dispensing station ("borne").
    DispenserId
);

entity_id!(
    /// Identifier of a telemetry measurement row.
    MeasurementId
);

entity_id!(
    /// Identifier of an alert row.
    AlertId
);

entity_id!(
    /// Identifier of a maintenance intervention row.
    InterventionId
);

entity_id!(
    /// Identifier of a user account.
    UserId
);

entity_id!(
    /// Identifier of a site hosting dispensers.
    SiteId
);
