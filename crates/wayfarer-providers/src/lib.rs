//! Provider-server dataset domain: the facet catalog, incremental filter
//! narrowing, and the query seam to the bulk dataset.
//!
//! The filter engine follows the same shape as the profile build
//! pipeline: compose constraints freely, then resolve a consistent
//! result set from them.

pub mod country;
pub mod filters;
pub mod model;
pub mod repository;

pub use country::country_description;
pub use filters::{CountryDisplay, ServerFilterEngine};
pub use model::{VpnFilterOptions, VpnFilters, VpnPreset, VpnServer};
pub use repository::{
    BulkProviderRepository, VpnProviderRepository, VpnServerParameters, VpnServerSorting,
};
