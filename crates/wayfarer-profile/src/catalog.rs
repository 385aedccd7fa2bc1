//! Module kind universe and the add-availability policy.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Closed set of module kinds a profile may be composed of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModuleKind {
    /// OpenVPN tunnel protocol.
    OpenVpn,
    /// WireGuard tunnel protocol.
    WireGuard,
    /// DNS resolver overrides.
    Dns,
    /// HTTP proxy settings.
    HttpProxy,
    /// Static IP routing rules.
    IpRouting,
    /// On-demand activation rules.
    OnDemand,
}

// TODO: offer WireGuard for manual addition once its module editor lands.
const MANUAL_ADD_EXCLUSIONS: &[ModuleKind] = &[ModuleKind::WireGuard];

impl ModuleKind {
    /// The closed universe of module kinds in canonical order.
    #[must_use]
    pub const fn all() -> [Self; 6] {
        [
            Self::OpenVpn,
            Self::WireGuard,
            Self::Dns,
            Self::HttpProxy,
            Self::IpRouting,
            Self::OnDemand,
        ]
    }

    /// Human-readable name, also the ordering key for the add menu.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::OpenVpn => "OpenVPN",
            Self::WireGuard => "WireGuard",
            Self::Dns => "DNS",
            Self::HttpProxy => "HTTP Proxy",
            Self::IpRouting => "IP Routing",
            Self::OnDemand => "On-Demand Rules",
        }
    }

    /// Whether at most one module of this kind may be active in a profile.
    #[must_use]
    pub const fn is_singleton(self) -> bool {
        matches!(self, Self::OpenVpn | Self::WireGuard)
    }
}

impl fmt::Display for ModuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Kinds currently offered for manual addition, given the kinds already
/// present in the edited profile.
///
/// Kinds pending editor support and kinds already present are excluded;
/// the result is sorted case-insensitively by display name.
#[must_use]
pub fn available_kinds(current: &[ModuleKind]) -> Vec<ModuleKind> {
    let mut kinds: Vec<ModuleKind> = ModuleKind::all()
        .into_iter()
        .filter(|kind| !MANUAL_ADD_EXCLUSIONS.contains(kind))
        .filter(|kind| !current.contains(kind))
        .collect();
    kinds.sort_by_key(|kind| kind.display_name().to_lowercase());
    kinds
}
