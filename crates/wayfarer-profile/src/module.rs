//! Module sum type and the per-kind settings it carries.
//!
//! # Design
//! - One closed enum over the known kinds; exhaustive matching replaces
//!   dynamic dispatch at every validation site.
//! - A module's identifier and kind are fixed at construction; editing
//!   replaces field values, never the variant.

use std::collections::BTreeSet;
use std::net::IpAddr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::catalog::ModuleKind;
use crate::error::{BuildError, BuildResult};

/// A single configuration unit contributing to a profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Module {
    id: Uuid,
    settings: ModuleSettings,
}

impl Module {
    /// Create a module with a freshly generated identifier.
    #[must_use]
    pub fn new(settings: ModuleSettings) -> Self {
        Self {
            id: Uuid::new_v4(),
            settings,
        }
    }

    /// Reconstruct a module with a known identifier.
    #[must_use]
    pub const fn with_id(id: Uuid, settings: ModuleSettings) -> Self {
        Self { id, settings }
    }

    /// Stable identifier, immutable once assigned.
    #[must_use]
    pub const fn id(&self) -> Uuid {
        self.id
    }

    /// Kind discriminant derived from the settings variant.
    #[must_use]
    pub const fn kind(&self) -> ModuleKind {
        self.settings.kind()
    }

    /// Kind-specific settings.
    #[must_use]
    pub const fn settings(&self) -> &ModuleSettings {
        &self.settings
    }

    /// Mutable access to the kind-specific settings. The variant must not
    /// be replaced; a module is never retyped.
    pub fn settings_mut(&mut self) -> &mut ModuleSettings {
        &mut self.settings
    }

    /// Run the kind-specific invariant checks for this module.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::ModuleField`] naming the first offending
    /// field.
    pub fn validate(&self) -> BuildResult<()> {
        self.settings.validate(self.id)
    }
}

/// Kind-specific settings carried by a [`Module`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModuleSettings {
    /// OpenVPN tunnel settings.
    OpenVpn(OpenVpnSettings),
    /// WireGuard tunnel settings.
    WireGuard(WireGuardSettings),
    /// DNS resolver settings.
    Dns(DnsSettings),
    /// HTTP proxy settings.
    HttpProxy(HttpProxySettings),
    /// Static IP routing settings.
    IpRouting(IpRoutingSettings),
    /// On-demand activation rules.
    OnDemand(OnDemandSettings),
}

impl ModuleSettings {
    /// Kind discriminant for this settings variant.
    #[must_use]
    pub const fn kind(&self) -> ModuleKind {
        match self {
            Self::OpenVpn(_) => ModuleKind::OpenVpn,
            Self::WireGuard(_) => ModuleKind::WireGuard,
            Self::Dns(_) => ModuleKind::Dns,
            Self::HttpProxy(_) => ModuleKind::HttpProxy,
            Self::IpRouting(_) => ModuleKind::IpRouting,
            Self::OnDemand(_) => ModuleKind::OnDemand,
        }
    }

    fn validate(&self, module_id: Uuid) -> BuildResult<()> {
        match self {
            Self::OpenVpn(settings) => settings.validate(module_id),
            Self::WireGuard(settings) => settings.validate(module_id),
            Self::Dns(settings) => settings.validate(module_id),
            Self::HttpProxy(settings) => settings.validate(module_id),
            Self::IpRouting(settings) => settings.validate(module_id),
            Self::OnDemand(_) => Ok(()),
        }
    }
}

impl From<OpenVpnSettings> for ModuleSettings {
    fn from(settings: OpenVpnSettings) -> Self {
        Self::OpenVpn(settings)
    }
}

impl From<WireGuardSettings> for ModuleSettings {
    fn from(settings: WireGuardSettings) -> Self {
        Self::WireGuard(settings)
    }
}

impl From<DnsSettings> for ModuleSettings {
    fn from(settings: DnsSettings) -> Self {
        Self::Dns(settings)
    }
}

impl From<HttpProxySettings> for ModuleSettings {
    fn from(settings: HttpProxySettings) -> Self {
        Self::HttpProxy(settings)
    }
}

impl From<IpRoutingSettings> for ModuleSettings {
    fn from(settings: IpRoutingSettings) -> Self {
        Self::IpRouting(settings)
    }
}

impl From<OnDemandSettings> for ModuleSettings {
    fn from(settings: OnDemandSettings) -> Self {
        Self::OnDemand(settings)
    }
}

/// Transport used to reach the configured DNS servers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DnsProtocol {
    /// Plain DNS over port 53.
    #[default]
    Cleartext,
    /// DNS over HTTPS.
    OverHttps,
    /// DNS over TLS.
    OverTls,
}

/// DNS resolver overrides applied while the profile is active.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DnsSettings {
    /// Transport protocol for the resolvers.
    #[serde(default)]
    pub protocol: DnsProtocol,
    /// Resolver addresses, one IP literal per entry.
    #[serde(default)]
    pub servers: Vec<String>,
    /// Search domains appended to unqualified names.
    #[serde(default)]
    pub search_domains: Vec<String>,
    /// Query URL when the protocol is DNS over HTTPS.
    #[serde(default)]
    pub doh_url: String,
    /// Server name when the protocol is DNS over TLS.
    #[serde(default)]
    pub dot_hostname: String,
    /// Domain name advertised to the system resolver.
    pub domain_name: Option<String>,
}

impl DnsSettings {
    fn validate(&self, module_id: Uuid) -> BuildResult<()> {
        match self.protocol {
            DnsProtocol::OverHttps if self.doh_url.trim().is_empty() => {
                return Err(BuildError::ModuleField {
                    module_id,
                    field: "doh_url",
                    reason: "required when protocol is DNS over HTTPS",
                });
            }
            DnsProtocol::OverTls if self.dot_hostname.trim().is_empty() => {
                return Err(BuildError::ModuleField {
                    module_id,
                    field: "dot_hostname",
                    reason: "required when protocol is DNS over TLS",
                });
            }
            _ => {}
        }
        for server in &self.servers {
            if server.parse::<IpAddr>().is_err() {
                return Err(BuildError::ModuleField {
                    module_id,
                    field: "servers",
                    reason: "entries must be IP address literals",
                });
            }
        }
        Ok(())
    }
}

/// HTTP proxy applied to traffic while the profile is active.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpProxySettings {
    /// Proxy host for plain HTTP traffic.
    #[serde(default)]
    pub address: String,
    /// Proxy port for plain HTTP traffic.
    #[serde(default)]
    pub port: u16,
    /// Proxy host for HTTPS traffic.
    #[serde(default)]
    pub secure_address: String,
    /// Proxy port for HTTPS traffic.
    #[serde(default)]
    pub secure_port: u16,
    /// Proxy auto-configuration URL, used instead of static hosts when set.
    #[serde(default)]
    pub pac_url: String,
    /// Domains that bypass the proxy.
    #[serde(default)]
    pub bypass_domains: Vec<String>,
}

impl HttpProxySettings {
    fn validate(&self, module_id: Uuid) -> BuildResult<()> {
        if !self.pac_url.trim().is_empty() {
            return Ok(());
        }
        if self.address.trim().is_empty() {
            return Err(BuildError::ModuleField {
                module_id,
                field: "address",
                reason: "required unless a PAC URL is set",
            });
        }
        if self.port == 0 {
            return Err(BuildError::ModuleField {
                module_id,
                field: "port",
                reason: "must be non-zero",
            });
        }
        Ok(())
    }
}

/// A single static route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    /// Destination, either `default` or `address/prefix` notation.
    pub destination: String,
    /// Optional gateway address for the route.
    pub gateway: Option<String>,
}

/// Static routes installed while the profile is active.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IpRoutingSettings {
    /// Routes pulled into the tunnel.
    #[serde(default)]
    pub included_routes: Vec<Route>,
    /// Routes kept outside the tunnel.
    #[serde(default)]
    pub excluded_routes: Vec<Route>,
    /// Optional interface MTU override.
    pub mtu: Option<u16>,
}

impl IpRoutingSettings {
    fn validate(&self, module_id: Uuid) -> BuildResult<()> {
        for route in self.included_routes.iter().chain(&self.excluded_routes) {
            if !is_valid_destination(&route.destination) {
                return Err(BuildError::ModuleField {
                    module_id,
                    field: "destination",
                    reason: "must be 'default' or address/prefix notation",
                });
            }
            if let Some(gateway) = &route.gateway {
                if gateway.parse::<IpAddr>().is_err() {
                    return Err(BuildError::ModuleField {
                        module_id,
                        field: "gateway",
                        reason: "must be an IP address literal",
                    });
                }
            }
        }
        Ok(())
    }
}

fn is_valid_destination(destination: &str) -> bool {
    if destination == "default" {
        return true;
    }
    let Some((address, prefix)) = destination.split_once('/') else {
        return false;
    };
    let Ok(address) = address.parse::<IpAddr>() else {
        return false;
    };
    let max_prefix = if address.is_ipv4() { 32 } else { 128 };
    prefix.parse::<u8>().is_ok_and(|bits| bits <= max_prefix)
}

/// Policy controlling when on-demand rules apply.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OnDemandPolicy {
    /// Engage on any network.
    #[default]
    Any,
    /// Engage only on the listed networks.
    Including,
    /// Engage on all but the listed networks.
    Excluding,
}

/// Rules deciding when the tunnel should engage automatically.
///
/// Always valid; an empty rule set under a restrictive policy simply
/// never matches.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnDemandSettings {
    /// Matching policy for the rules below.
    #[serde(default)]
    pub policy: OnDemandPolicy,
    /// Wi-Fi network names the policy applies to.
    #[serde(default)]
    pub ssids: BTreeSet<String>,
    /// Whether the policy covers mobile data networks.
    #[serde(default)]
    pub with_mobile_network: bool,
    /// Whether the policy covers wired networks.
    #[serde(default)]
    pub with_ethernet_network: bool,
}

/// Transport used by an OpenVPN remote.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SocketKind {
    /// UDP transport.
    #[default]
    Udp,
    /// TCP transport.
    Tcp,
}

/// A remote endpoint an OpenVPN module may connect to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    /// Host name or IP address of the remote.
    pub address: String,
    /// Remote port.
    pub port: u16,
    /// Transport protocol.
    #[serde(default)]
    pub socket: SocketKind,
}

/// OpenVPN tunnel settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenVpnSettings {
    /// Candidate remotes tried in order.
    #[serde(default)]
    pub remotes: Vec<Endpoint>,
    /// Optional username for authenticated servers.
    pub username: Option<String>,
}

impl OpenVpnSettings {
    fn validate(&self, module_id: Uuid) -> BuildResult<()> {
        if self.remotes.is_empty() {
            return Err(BuildError::ModuleField {
                module_id,
                field: "remotes",
                reason: "at least one remote is required",
            });
        }
        for remote in &self.remotes {
            if remote.address.trim().is_empty() {
                return Err(BuildError::ModuleField {
                    module_id,
                    field: "remotes",
                    reason: "remote address must not be empty",
                });
            }
            if remote.port == 0 {
                return Err(BuildError::ModuleField {
                    module_id,
                    field: "remotes",
                    reason: "remote port must be non-zero",
                });
            }
        }
        Ok(())
    }
}

/// A WireGuard peer entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireGuardPeer {
    /// Base64 public key of the peer.
    pub public_key: String,
    /// Optional `host:port` endpoint of the peer.
    pub endpoint: Option<String>,
    /// Subnets routed through this peer.
    #[serde(default)]
    pub allowed_ips: Vec<String>,
}

/// WireGuard tunnel settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireGuardSettings {
    /// Base64 private key of the local interface.
    #[serde(default)]
    pub private_key: String,
    /// Addresses assigned to the local interface.
    #[serde(default)]
    pub addresses: Vec<String>,
    /// Peer list, at least one entry.
    #[serde(default)]
    pub peers: Vec<WireGuardPeer>,
}

impl WireGuardSettings {
    fn validate(&self, module_id: Uuid) -> BuildResult<()> {
        if self.private_key.trim().is_empty() {
            return Err(BuildError::ModuleField {
                module_id,
                field: "private_key",
                reason: "must not be empty",
            });
        }
        if self.peers.is_empty() {
            return Err(BuildError::ModuleField {
                module_id,
                field: "peers",
                reason: "at least one peer is required",
            });
        }
        for peer in &self.peers {
            if peer.public_key.trim().is_empty() {
                return Err(BuildError::ModuleField {
                    module_id,
                    field: "peers",
                    reason: "peer public key must not be empty",
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dns_over_https_requires_url() {
        let module = Module::new(
            DnsSettings {
                protocol: DnsProtocol::OverHttps,
                ..DnsSettings::default()
            }
            .into(),
        );
        let err = module.validate().unwrap_err();
        assert_eq!(
            err,
            BuildError::ModuleField {
                module_id: module.id(),
                field: "doh_url",
                reason: "required when protocol is DNS over HTTPS",
            }
        );
    }

    #[test]
    fn dns_over_tls_requires_hostname() {
        let module = Module::new(
            DnsSettings {
                protocol: DnsProtocol::OverTls,
                dot_hostname: "  ".to_string(),
                ..DnsSettings::default()
            }
            .into(),
        );
        let err = module.validate().unwrap_err();
        assert!(matches!(
            err,
            BuildError::ModuleField {
                field: "dot_hostname",
                ..
            }
        ));
    }

    #[test]
    fn dns_servers_must_be_ip_literals() {
        let valid = Module::new(
            DnsSettings {
                servers: vec!["1.1.1.1".to_string(), "2606:4700::1111".to_string()],
                ..DnsSettings::default()
            }
            .into(),
        );
        assert!(valid.validate().is_ok());

        let invalid = Module::new(
            DnsSettings {
                servers: vec!["dns.example.com".to_string()],
                ..DnsSettings::default()
            }
            .into(),
        );
        assert!(matches!(
            invalid.validate().unwrap_err(),
            BuildError::ModuleField {
                field: "servers",
                ..
            }
        ));
    }

    #[test]
    fn http_proxy_accepts_pac_url_without_address() {
        let module = Module::new(
            HttpProxySettings {
                pac_url: "http://proxy.example.com/proxy.pac".to_string(),
                ..HttpProxySettings::default()
            }
            .into(),
        );
        assert!(module.validate().is_ok());
    }

    #[test]
    fn http_proxy_requires_address_and_port() {
        let missing_address = Module::new(HttpProxySettings::default().into());
        assert!(matches!(
            missing_address.validate().unwrap_err(),
            BuildError::ModuleField {
                field: "address",
                ..
            }
        ));

        let missing_port = Module::new(
            HttpProxySettings {
                address: "10.0.0.1".to_string(),
                ..HttpProxySettings::default()
            }
            .into(),
        );
        assert!(matches!(
            missing_port.validate().unwrap_err(),
            BuildError::ModuleField { field: "port", .. }
        ));
    }

    #[test]
    fn route_destinations_are_checked() {
        assert!(is_valid_destination("default"));
        assert!(is_valid_destination("10.0.0.0/8"));
        assert!(is_valid_destination("fd00::/64"));
        assert!(!is_valid_destination("10.0.0.0"));
        assert!(!is_valid_destination("10.0.0.0/33"));
        assert!(!is_valid_destination("everything"));
    }

    #[test]
    fn open_vpn_requires_remotes() {
        let module = Module::new(OpenVpnSettings::default().into());
        assert!(matches!(
            module.validate().unwrap_err(),
            BuildError::ModuleField {
                field: "remotes",
                ..
            }
        ));
    }

    #[test]
    fn wire_guard_requires_key_and_peers() {
        let module = Module::new(WireGuardSettings::default().into());
        assert!(matches!(
            module.validate().unwrap_err(),
            BuildError::ModuleField {
                field: "private_key",
                ..
            }
        ));

        let keyed = Module::new(
            WireGuardSettings {
                private_key: "aGVsbG8=".to_string(),
                ..WireGuardSettings::default()
            }
            .into(),
        );
        assert!(matches!(
            keyed.validate().unwrap_err(),
            BuildError::ModuleField { field: "peers", .. }
        ));
    }

    #[test]
    fn on_demand_is_always_valid() {
        let module = Module::new(
            OnDemandSettings {
                policy: OnDemandPolicy::Including,
                ..OnDemandSettings::default()
            }
            .into(),
        );
        assert!(module.validate().is_ok());
    }

    #[test]
    fn kind_follows_settings_variant() {
        let module = Module::new(DnsSettings::default().into());
        assert_eq!(module.kind(), ModuleKind::Dns);

        let module = Module::new(OnDemandSettings::default().into());
        assert_eq!(module.kind(), ModuleKind::OnDemand);
    }

    #[test]
    fn module_serde_round_trip_preserves_identity() {
        let module = Module::new(
            DnsSettings {
                servers: vec!["9.9.9.9".to_string()],
                ..DnsSettings::default()
            }
            .into(),
        );
        let json = serde_json::to_string(&module).expect("module should serialize");
        let restored: Module = serde_json::from_str(&json).expect("module should deserialize");
        assert_eq!(restored, module);
    }
}
