//! Session gate contract used by the login screen.
//!
//! # Responsibility
//! - Decide whether a username/password pair may enter the catalog.
//!
//! # Invariants
//! - No session state is persisted.
//! - The product repository never depends on this module.

/// Credential check performed before the catalog is shown.
pub trait SessionGate: Send + Sync {
    fn authenticate(&self, username: &str, password: &str) -> bool;
}

/// Accepts any non-blank username and password.
#[derive(Debug, Default, Clone, Copy)]
pub struct CredentialPresenceGate;

impl SessionGate for CredentialPresenceGate {
    fn authenticate(&self, username: &str, password: &str) -> bool {
        !username.trim().is_empty() && !password.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::{CredentialPresenceGate, SessionGate};

    #[test]
    fn presence_gate_requires_both_fields() {
        let gate = CredentialPresenceGate;
        assert!(gate.authenticate("admin", "secret"));
        assert!(!gate.authenticate("admin", "  "));
        assert!(!gate.authenticate("", "secret"));
    }
}
