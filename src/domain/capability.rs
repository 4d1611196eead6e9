//! Role → capability mapping.
//!
//! Authorization is a single capability check keyed on the caller's role,
//! consulted uniformly by every entry point. Handlers never branch on role
//! strings directly.

use super::user::Role;

/// An operation a caller may or may not be permitted to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// View every dispenser in the fleet (agents see only their own).
    ViewAllDispensers,
    /// Assign a maintenance agent to a dispenser.
    AssignDispenser,
    /// Update a dispenser's alert thresholds.
    UpdateThresholds,
    /// Resolve an alert, recording an intervention.
    ResolveAlert,
    /// Assign an agent to an alert.
    AssignAlert,
    /// List and manage user accounts.
    ManageUsers,
}

impl Role {
    /// Returns `true` if this role is permitted the given capability.
    ///
    /// The supplier is administrative and permitted everything.
    #[must_use]
    pub const fn permits(self, capability: Capability) -> bool {
        match self {
            Self::Supplier => true,
            Self::TechnicalManager | Self::AgentManager => matches!(
                capability,
                Capability::ViewAllDispensers
                    | Capability::AssignDispenser
                    | Capability::UpdateThresholds
                    | Capability::ResolveAlert
                    | Capability::AssignAlert
            ),
            Self::Agent => matches!(capability, Capability::ResolveAlert),
        }
    }
}
