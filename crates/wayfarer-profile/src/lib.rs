#![forbid(unsafe_code)]
#![deny(
    warnings,
    dead_code,
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]

//! Profile composition model: pluggable modules, the mutable editing
//! aggregate, and the build pipeline that collapses it into an immutable,
//! validated profile.
//!
//! Layout: `catalog.rs` (module kind universe and add-availability policy),
//! `module.rs` (module sum type and per-kind validation), `profile.rs`
//! (editable/built aggregates), `build.rs` (validation pipeline).

pub mod build;
pub mod catalog;
pub mod error;
pub mod module;
pub mod profile;

pub use build::build;
pub use catalog::{ModuleKind, available_kinds};
pub use error::{BuildError, BuildResult};
pub use module::{
    DnsProtocol, DnsSettings, Endpoint, HttpProxySettings, IpRoutingSettings, Module,
    ModuleSettings, OnDemandPolicy, OnDemandSettings, OpenVpnSettings, Route, SocketKind,
    WireGuardPeer, WireGuardSettings,
};
pub use profile::{EditableProfile, Profile, ProfileAttributes};
