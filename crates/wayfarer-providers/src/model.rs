//! Provider-server domain records and filter facets.

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

/// A single provider server row from the bulk dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VpnServer {
    pub server_id: String,
    pub provider_id: String,
    pub hostname: Option<String>,
    pub country_code: String,
    pub category_name: String,
    pub area: Option<String>,
    /// Preset identifiers this server supports; empty when the dataset
    /// did not populate them.
    #[serde(default)]
    pub supported_preset_ids: Vec<String>,
}

/// A connection preset offered by a provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VpnPreset {
    pub provider_id: String,
    pub preset_id: String,
    pub description: String,
}

/// Facet catalog computed once per provider from the bulk dataset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VpnFilterOptions {
    pub category_names: BTreeSet<String>,
    pub country_codes: BTreeSet<String>,
    /// Country codes reachable under each category.
    pub countries_by_category: HashMap<String, BTreeSet<String>>,
    pub presets: Vec<VpnPreset>,
}

impl VpnFilterOptions {
    /// Derive the facet catalog from a bulk server list and the preset
    /// catalog.
    #[must_use]
    pub fn from_servers(servers: &[VpnServer], presets: Vec<VpnPreset>) -> Self {
        let mut category_names = BTreeSet::new();
        let mut country_codes = BTreeSet::new();
        let mut countries_by_category: HashMap<String, BTreeSet<String>> = HashMap::new();
        for server in servers {
            category_names.insert(server.category_name.clone());
            country_codes.insert(server.country_code.clone());
            countries_by_category
                .entry(server.category_name.clone())
                .or_default()
                .insert(server.country_code.clone());
        }
        Self {
            category_names,
            country_codes,
            countries_by_category,
            presets,
        }
    }
}

/// Live facet selection narrowing the provider's server list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VpnFilters {
    pub category_name: Option<String>,
    pub country_code: Option<String>,
    pub area: Option<String>,
    pub preset_id: Option<String>,
}

impl VpnFilters {
    /// Whether no facet is selected.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.category_name.is_none()
            && self.country_code.is_none()
            && self.area.is_none()
            && self.preset_id.is_none()
    }

    /// Whether a server row satisfies every selected facet.
    #[must_use]
    pub fn matches(&self, server: &VpnServer) -> bool {
        if let Some(category) = &self.category_name {
            if &server.category_name != category {
                return false;
            }
        }
        if let Some(country) = &self.country_code {
            if &server.country_code != country {
                return false;
            }
        }
        if let Some(area) = &self.area {
            if server.area.as_ref() != Some(area) {
                return false;
            }
        }
        if let Some(preset) = &self.preset_id {
            if !server.supported_preset_ids.iter().any(|id| id == preset) {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn server(id: &str, category: &str, country: &str) -> VpnServer {
        VpnServer {
            server_id: id.to_string(),
            provider_id: "acme".to_string(),
            hostname: Some(format!("{id}.acme.example.com")),
            country_code: country.to_string(),
            category_name: category.to_string(),
            area: None,
            supported_preset_ids: vec!["default".to_string()],
        }
    }

    #[test]
    fn options_derive_the_category_mapping() {
        let servers = vec![
            server("s1", "speed", "US"),
            server("s2", "speed", "DE"),
            server("s3", "privacy", "FR"),
        ];
        let options = VpnFilterOptions::from_servers(&servers, Vec::new());

        assert_eq!(options.category_names.len(), 2);
        assert_eq!(options.country_codes.len(), 3);
        let speed = &options.countries_by_category["speed"];
        assert!(speed.contains("US") && speed.contains("DE") && !speed.contains("FR"));
    }

    #[test]
    fn server_rows_round_trip_through_serde() {
        let row = server("s1", "speed", "US");
        let json = serde_json::to_string(&row).expect("server should serialize");
        let restored: VpnServer = serde_json::from_str(&json).expect("server should deserialize");
        assert_eq!(restored, row);
    }

    #[test]
    fn filters_match_on_every_selected_facet() {
        let row = server("s1", "speed", "US");

        assert!(VpnFilters::default().matches(&row));
        assert!(
            VpnFilters {
                category_name: Some("speed".to_string()),
                country_code: Some("US".to_string()),
                preset_id: Some("default".to_string()),
                ..VpnFilters::default()
            }
            .matches(&row)
        );
        assert!(
            !VpnFilters {
                country_code: Some("DE".to_string()),
                ..VpnFilters::default()
            }
            .matches(&row)
        );
        assert!(
            !VpnFilters {
                preset_id: Some("dedicated".to_string()),
                ..VpnFilters::default()
            }
            .matches(&row)
        );
    }
}
