//! Query seam to the provider-server dataset.

use async_trait::async_trait;

use crate::model::{VpnFilterOptions, VpnFilters, VpnPreset, VpnServer};

/// Sort keys accepted by [`VpnProviderRepository::filtered_servers`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VpnServerSorting {
    Country,
    Hostname,
    Area,
}

/// Filter and sort specification for a server query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VpnServerParameters {
    pub filters: VpnFilters,
    pub sorting: Vec<VpnServerSorting>,
}

/// Read access to one provider's server and preset dataset.
///
/// The backing store owns query execution and its consistency
/// guarantees; this seam only describes what the filter layer consumes.
#[async_trait]
pub trait VpnProviderRepository: Send + Sync {
    /// Provider this repository serves.
    fn provider_id(&self) -> &str;

    /// Compute the facet catalog for the provider.
    async fn available_options(&self) -> anyhow::Result<VpnFilterOptions>;

    /// Fetch the servers matching the given parameters, or every server
    /// of the provider when no parameters are supplied.
    async fn filtered_servers(
        &self,
        parameters: Option<&VpnServerParameters>,
    ) -> anyhow::Result<Vec<VpnServer>>;
}

/// In-memory repository over a bulk dataset snapshot.
#[derive(Debug, Clone)]
pub struct BulkProviderRepository {
    provider_id: String,
    servers: Vec<VpnServer>,
    presets: Vec<VpnPreset>,
}

impl BulkProviderRepository {
    #[must_use]
    pub fn new(
        provider_id: impl Into<String>,
        servers: Vec<VpnServer>,
        presets: Vec<VpnPreset>,
    ) -> Self {
        Self {
            provider_id: provider_id.into(),
            servers,
            presets,
        }
    }
}

#[async_trait]
impl VpnProviderRepository for BulkProviderRepository {
    fn provider_id(&self) -> &str {
        &self.provider_id
    }

    async fn available_options(&self) -> anyhow::Result<VpnFilterOptions> {
        let servers: Vec<VpnServer> = self
            .servers
            .iter()
            .filter(|server| server.provider_id == self.provider_id)
            .cloned()
            .collect();
        let presets: Vec<VpnPreset> = self
            .presets
            .iter()
            .filter(|preset| preset.provider_id == self.provider_id)
            .cloned()
            .collect();
        Ok(VpnFilterOptions::from_servers(&servers, presets))
    }

    async fn filtered_servers(
        &self,
        parameters: Option<&VpnServerParameters>,
    ) -> anyhow::Result<Vec<VpnServer>> {
        let mut servers: Vec<VpnServer> = self
            .servers
            .iter()
            .filter(|server| server.provider_id == self.provider_id)
            .filter(|server| parameters.is_none_or(|p| p.filters.matches(server)))
            .cloned()
            .collect();

        if let Some(parameters) = parameters {
            // Stable sorts applied in reverse key priority.
            for key in parameters.sorting.iter().rev() {
                match key {
                    VpnServerSorting::Country => {
                        servers.sort_by(|a, b| a.country_code.cmp(&b.country_code));
                    }
                    VpnServerSorting::Hostname => {
                        servers.sort_by(|a, b| a.hostname.cmp(&b.hostname));
                    }
                    VpnServerSorting::Area => {
                        servers.sort_by(|a, b| a.area.cmp(&b.area));
                    }
                }
            }
        }
        Ok(servers)
    }
}
