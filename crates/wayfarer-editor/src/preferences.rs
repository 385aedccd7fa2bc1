//! Per-module preference records, loaded and saved by an external store.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Preferences attached to a single module.
///
/// Persisted separately from the profile itself and treated as
/// best-effort data: a failure to load or save preferences never fails
/// the surrounding session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModulePreferences {
    /// Remote endpoints the user excluded from connection attempts.
    #[serde(default)]
    pub excluded_endpoints: BTreeSet<String>,
}

impl ModulePreferences {
    /// Whether the record carries no data worth persisting.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.excluded_endpoints.is_empty()
    }

    /// Whether an endpoint is excluded from connection attempts.
    #[must_use]
    pub fn is_excluded(&self, endpoint: &str) -> bool {
        self.excluded_endpoints.contains(endpoint)
    }

    /// Mark or unmark an endpoint as excluded.
    pub fn set_excluded(&mut self, endpoint: &str, excluded: bool) {
        if excluded {
            self.excluded_endpoints.insert(endpoint.to_string());
        } else {
            self.excluded_endpoints.remove(endpoint);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exclusions_toggle_and_round_trip() {
        let mut preferences = ModulePreferences::default();
        assert!(preferences.is_empty());

        preferences.set_excluded("vpn1.example.com:1194", true);
        assert!(preferences.is_excluded("vpn1.example.com:1194"));
        assert!(!preferences.is_empty());

        let json = serde_json::to_string(&preferences).expect("preferences should serialize");
        let restored: ModulePreferences =
            serde_json::from_str(&json).expect("preferences should deserialize");
        assert_eq!(restored, preferences);

        preferences.set_excluded("vpn1.example.com:1194", false);
        assert!(preferences.is_empty());
    }
}
