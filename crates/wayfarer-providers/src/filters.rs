//! Incremental facet narrowing over the provider-server dataset.

use std::collections::HashSet;

use tokio::sync::watch;
use tracing::debug;

use crate::country::country_description;
use crate::model::{VpnFilterOptions, VpnFilters, VpnPreset, VpnServer};

/// A country facet entry: raw code plus display description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountryDisplay {
    pub code: String,
    pub description: String,
}

/// Recomputes the reachable facet subsets as the selection changes.
///
/// The engine is confined to a single owner. The surrounding
/// presentation layer reads the published facet lists through the
/// accessors and observes selection edits through
/// [`filters_changed`](Self::filters_changed); one external subscriber
/// at a time is supported.
#[derive(Debug)]
pub struct ServerFilterEngine {
    options: VpnFilterOptions,
    categories: Vec<String>,
    countries: Vec<CountryDisplay>,
    presets: Vec<VpnPreset>,
    filters: VpnFilters,
    filters_tx: watch::Sender<VpnFilters>,
}

impl ServerFilterEngine {
    /// Engine with an empty catalog; call [`load`](Self::load) before use.
    #[must_use]
    pub fn new() -> Self {
        let (filters_tx, _) = watch::channel(VpnFilters::default());
        Self {
            options: VpnFilterOptions::default(),
            categories: Vec::new(),
            countries: Vec::new(),
            presets: Vec::new(),
            filters: VpnFilters::default(),
            filters_tx,
        }
    }

    /// Seed the engine with a provider's facet catalog, optionally
    /// restoring a previous selection.
    pub fn load(&mut self, options: VpnFilterOptions, initial_filters: Option<VpnFilters>) {
        self.options = options;
        let categories: Vec<String> = self.options.countries_by_category.keys().cloned().collect();
        self.set_categories(categories);
        let codes: Vec<String> = self.options.country_codes.iter().cloned().collect();
        self.set_countries(codes);
        let presets = self.options.presets.clone();
        self.set_presets(presets);

        if let Some(filters) = initial_filters {
            self.set_filters(filters);
        }
        debug!(
            categories = self.categories.len(),
            countries = self.countries.len(),
            presets = self.presets.len(),
            "loaded filter options"
        );
    }

    /// Recompute the reachable facets against the currently matched
    /// server list.
    ///
    /// Countries narrow to the selected category's known set: all known
    /// codes when no category is selected, none when the selection is
    /// absent from the catalog. Presets narrow to the identifiers
    /// referenced by the matched servers; when the servers reference no
    /// preset ids at all the full catalog is kept, because an empty
    /// referenced set is ambiguous between "truly none" and records that
    /// did not populate their preset ids.
    pub fn narrow(&mut self, servers: &[VpnServer]) {
        let known_country_codes: Vec<String> = match &self.filters.category_name {
            Some(category) => self
                .options
                .countries_by_category
                .get(category)
                .map(|codes| codes.iter().cloned().collect())
                .unwrap_or_default(),
            None => self.options.country_codes.iter().cloned().collect(),
        };

        let referenced_preset_ids: HashSet<&str> = servers
            .iter()
            .flat_map(|server| server.supported_preset_ids.iter())
            .map(String::as_str)
            .collect();
        let mut known_presets = self.options.presets.clone();
        if !referenced_preset_ids.is_empty() {
            known_presets
                .retain(|preset| referenced_preset_ids.contains(preset.preset_id.as_str()));
        }

        self.set_countries(known_country_codes);
        self.set_presets(known_presets);
        debug!(
            countries = self.countries.len(),
            presets = self.presets.len(),
            matched_servers = servers.len(),
            "narrowed filter facets"
        );
    }

    /// Replace the live selection and notify the subscriber.
    pub fn set_filters(&mut self, filters: VpnFilters) {
        self.filters = filters.clone();
        let _ = self.filters_tx.send_replace(filters);
    }

    /// Select or clear the category facet.
    pub fn select_category(&mut self, category_name: Option<String>) {
        let mut filters = self.filters.clone();
        filters.category_name = category_name;
        self.set_filters(filters);
    }

    /// Select or clear the country facet.
    pub fn select_country(&mut self, country_code: Option<String>) {
        let mut filters = self.filters.clone();
        filters.country_code = country_code;
        self.set_filters(filters);
    }

    /// Select or clear the preset facet.
    pub fn select_preset(&mut self, preset_id: Option<String>) {
        let mut filters = self.filters.clone();
        filters.preset_id = preset_id;
        self.set_filters(filters);
    }

    /// Category facet values, sorted by raw name.
    #[must_use]
    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    /// Country facet values, sorted by description.
    #[must_use]
    pub fn countries(&self) -> &[CountryDisplay] {
        &self.countries
    }

    /// Preset facet values, sorted by description.
    #[must_use]
    pub fn presets(&self) -> &[VpnPreset] {
        &self.presets
    }

    /// Current selection.
    #[must_use]
    pub const fn filters(&self) -> &VpnFilters {
        &self.filters
    }

    /// Subscribe to selection changes; one external subscriber at a time
    /// is supported.
    #[must_use]
    pub fn filters_changed(&self) -> watch::Receiver<VpnFilters> {
        self.filters_tx.subscribe()
    }

    fn set_categories(&mut self, names: Vec<String>) {
        let mut categories = names;
        categories.sort();
        categories.dedup();
        self.categories = categories;
    }

    fn set_countries(&mut self, codes: Vec<String>) {
        let mut countries: Vec<CountryDisplay> = codes
            .into_iter()
            .map(|code| {
                let description = country_description(&code);
                CountryDisplay { code, description }
            })
            .collect();
        countries.sort_by(|a, b| a.description.cmp(&b.description));
        countries.dedup();
        self.countries = countries;
    }

    fn set_presets(&mut self, mut presets: Vec<VpnPreset>) {
        presets.sort_by(|a, b| a.description.cmp(&b.description));
        presets.dedup();
        self.presets = presets;
    }
}

impl Default for ServerFilterEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn preset(id: &str, description: &str) -> VpnPreset {
        VpnPreset {
            provider_id: "acme".to_string(),
            preset_id: id.to_string(),
            description: description.to_string(),
        }
    }

    fn server(id: &str, category: &str, country: &str, preset_ids: &[&str]) -> VpnServer {
        VpnServer {
            server_id: id.to_string(),
            provider_id: "acme".to_string(),
            hostname: None,
            country_code: country.to_string(),
            category_name: category.to_string(),
            area: None,
            supported_preset_ids: preset_ids.iter().map(ToString::to_string).collect(),
        }
    }

    fn sample_options() -> VpnFilterOptions {
        VpnFilterOptions::from_servers(
            &[
                server("s1", "speed", "US", &["default"]),
                server("s2", "speed", "DE", &["default", "dedicated"]),
                server("s3", "privacy", "FR", &["default"]),
            ],
            vec![preset("default", "Default"), preset("dedicated", "Dedicated IP")],
        )
    }

    #[test]
    fn load_seeds_sorted_facets() {
        let mut engine = ServerFilterEngine::new();
        engine.load(sample_options(), None);

        assert_eq!(engine.categories(), &["privacy", "speed"]);
        let descriptions: Vec<&str> = engine
            .countries()
            .iter()
            .map(|country| country.description.as_str())
            .collect();
        assert_eq!(descriptions, vec!["France", "Germany", "United States"]);
        assert_eq!(engine.presets().len(), 2);
        assert_eq!(engine.presets()[0].description, "Default");
    }

    #[test]
    fn selecting_a_category_narrows_countries_to_its_known_set() {
        let mut engine = ServerFilterEngine::new();
        engine.load(
            sample_options(),
            Some(VpnFilters {
                category_name: Some("speed".to_string()),
                ..VpnFilters::default()
            }),
        );

        engine.narrow(&[
            server("s1", "speed", "US", &["default"]),
            server("s2", "speed", "DE", &["default"]),
        ]);

        let codes: Vec<&str> = engine
            .countries()
            .iter()
            .map(|country| country.code.as_str())
            .collect();
        assert_eq!(codes, vec!["DE", "US"]);

        let known = &engine.options.countries_by_category["speed"];
        for country in engine.countries() {
            assert!(known.contains(&country.code));
        }
    }

    #[test]
    fn unknown_category_yields_no_countries() {
        let mut engine = ServerFilterEngine::new();
        engine.load(
            sample_options(),
            Some(VpnFilters {
                category_name: Some("gaming".to_string()),
                ..VpnFilters::default()
            }),
        );

        engine.narrow(&[]);
        assert!(engine.countries().is_empty());
    }

    #[test]
    fn narrowing_presets_respects_referenced_ids() {
        let mut engine = ServerFilterEngine::new();
        engine.load(sample_options(), None);

        engine.narrow(&[server("s2", "speed", "DE", &["dedicated"])]);
        assert_eq!(engine.presets().len(), 1);
        assert_eq!(engine.presets()[0].preset_id, "dedicated");

        let referenced: BTreeSet<&str> = ["dedicated"].into_iter().collect();
        for preset in engine.presets() {
            assert!(referenced.contains(preset.preset_id.as_str()));
        }
    }

    #[test]
    fn empty_referenced_preset_set_keeps_the_full_catalog() {
        let mut engine = ServerFilterEngine::new();
        engine.load(sample_options(), None);

        engine.narrow(&[server("s1", "speed", "US", &[])]);
        assert_eq!(engine.presets().len(), 2);
    }

    #[test]
    fn selection_edits_notify_the_subscriber() {
        let mut engine = ServerFilterEngine::new();
        engine.load(sample_options(), None);
        let receiver = engine.filters_changed();

        engine.select_category(Some("speed".to_string()));
        assert_eq!(
            receiver.borrow().category_name.as_deref(),
            Some("speed")
        );

        engine.select_country(Some("DE".to_string()));
        assert_eq!(receiver.borrow().country_code.as_deref(), Some("DE"));
    }
}
