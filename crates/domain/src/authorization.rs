//! Authorization vocabulary for the positioning facade.

use serde::{Deserialize, Serialize};

/// Application-facing authorization state.
///
/// Produced by translating the platform's native status at the adapter
/// boundary. The platform's "restricted" state collapses into [`Denied`]:
/// from the application's point of view both mean readings will not arrive.
///
/// [`Denied`]: AuthorizationStatus::Denied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthorizationStatus {
    /// Location may be read at any time, including in the background
    AuthorizedAlways,
    /// Location may be read while the application is in use
    AuthorizedWhenInUse,
    /// The user has not been asked yet
    NotDetermined,
    /// The user refused, or platform policy forbids access
    Denied,
}

impl AuthorizationStatus {
    /// Whether readings can be expected to arrive in this state.
    pub fn is_authorized(&self) -> bool {
        matches!(
            self,
            AuthorizationStatus::AuthorizedAlways | AuthorizationStatus::AuthorizedWhenInUse
        )
    }
}

/// Which permission class to ask the platform for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestType {
    /// Permission to read location while the application is in use
    WhenInUseAuth,
    /// Permission to read location at any time
    AlwaysAuth,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_authorized() {
        assert!(AuthorizationStatus::AuthorizedAlways.is_authorized());
        assert!(AuthorizationStatus::AuthorizedWhenInUse.is_authorized());
        assert!(!AuthorizationStatus::NotDetermined.is_authorized());
        assert!(!AuthorizationStatus::Denied.is_authorized());
    }
}
