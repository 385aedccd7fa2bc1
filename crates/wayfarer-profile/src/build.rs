//! Build pipeline collapsing an editable profile into an immutable one.

use std::collections::{HashMap, HashSet};

use uuid::Uuid;

use crate::catalog::ModuleKind;
use crate::error::{BuildError, BuildResult};
use crate::profile::{EditableProfile, Profile};

/// Validate an editable profile and produce the immutable artifact.
///
/// Checks run in order: structural (non-empty name, unique module ids),
/// singleton-kind among active modules, then each module's own invariants
/// in list order with the first failure short-circuiting. Module order
/// and the active-id set are carried into the artifact exactly as found;
/// no partial profile is ever produced.
///
/// # Errors
///
/// Returns the first [`BuildError`] encountered. A failing build never
/// mutates the editable profile.
pub fn build(profile: &EditableProfile) -> BuildResult<Profile> {
    if profile.attributes.name.trim().is_empty() {
        return Err(BuildError::MissingProfileName);
    }

    let mut seen = HashSet::with_capacity(profile.modules().len());
    for module in profile.modules() {
        if !seen.insert(module.id()) {
            return Err(BuildError::DuplicateModuleId {
                module_id: module.id(),
            });
        }
    }

    check_singletons(profile)?;

    for module in profile.modules() {
        module.validate()?;
    }

    Ok(Profile::from_validated(
        profile.attributes.clone(),
        profile.modules().to_vec(),
        profile.active_modules_ids().clone(),
    ))
}

fn check_singletons(profile: &EditableProfile) -> BuildResult<()> {
    let mut first_by_kind: HashMap<ModuleKind, Uuid> = HashMap::new();
    for module in profile.modules() {
        if !module.kind().is_singleton() || !profile.is_active(module.id()) {
            continue;
        }
        if let Some(&first_id) = first_by_kind.get(&module.kind()) {
            return Err(BuildError::SingletonConflict {
                kind: module.kind(),
                first_id,
                second_id: module.id(),
            });
        }
        first_by_kind.insert(module.kind(), module.id());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::{DnsSettings, Endpoint, Module, OpenVpnSettings, WireGuardSettings};
    use crate::profile::ProfileAttributes;

    fn open_vpn_module() -> Module {
        Module::new(
            OpenVpnSettings {
                remotes: vec![Endpoint {
                    address: "vpn.example.com".to_string(),
                    port: 1194,
                    socket: crate::module::SocketKind::Udp,
                }],
                username: None,
            }
            .into(),
        )
    }

    fn wire_guard_module() -> Module {
        Module::new(
            WireGuardSettings {
                private_key: "cHJpdmF0ZQ==".to_string(),
                addresses: vec!["10.8.0.2/24".to_string()],
                peers: vec![crate::module::WireGuardPeer {
                    public_key: "cHVibGlj".to_string(),
                    endpoint: Some("vpn.example.com:51820".to_string()),
                    allowed_ips: vec!["0.0.0.0/0".to_string()],
                }],
            }
            .into(),
        )
    }

    #[test]
    fn build_rejects_empty_name() {
        let profile = EditableProfile::new(ProfileAttributes::named("  "));
        assert_eq!(build(&profile).unwrap_err(), BuildError::MissingProfileName);
    }

    #[test]
    fn build_rejects_duplicate_module_ids() {
        let module = Module::new(DnsSettings::default().into());
        let duplicate = module.clone();
        let profile = EditableProfile::with_modules(
            ProfileAttributes::named("home"),
            vec![module.clone(), duplicate],
        );
        assert_eq!(
            build(&profile).unwrap_err(),
            BuildError::DuplicateModuleId {
                module_id: module.id()
            }
        );
    }

    #[test]
    fn build_rejects_two_active_modules_of_a_singleton_kind() {
        let first = open_vpn_module();
        let second = open_vpn_module();
        let profile = EditableProfile::with_modules(
            ProfileAttributes::named("home"),
            vec![first.clone(), second.clone()],
        );

        assert_eq!(
            build(&profile).unwrap_err(),
            BuildError::SingletonConflict {
                kind: ModuleKind::OpenVpn,
                first_id: first.id(),
                second_id: second.id(),
            }
        );
    }

    #[test]
    fn build_allows_inactive_duplicates_of_a_singleton_kind() {
        let active = open_vpn_module();
        let spare = open_vpn_module();
        let mut profile = EditableProfile::with_modules(
            ProfileAttributes::named("home"),
            vec![active, spare.clone()],
        );
        profile.set_inactive(spare.id());

        assert!(build(&profile).is_ok());
    }

    #[test]
    fn build_allows_one_active_module_per_singleton_kind() {
        let profile = EditableProfile::with_modules(
            ProfileAttributes::named("home"),
            vec![open_vpn_module(), wire_guard_module()],
        );
        assert!(build(&profile).is_ok());
    }

    #[test]
    fn build_short_circuits_on_first_invalid_module() {
        let first_invalid = Module::new(OpenVpnSettings::default().into());
        let second_invalid = Module::new(WireGuardSettings::default().into());
        let profile = EditableProfile::with_modules(
            ProfileAttributes::named("home"),
            vec![first_invalid.clone(), second_invalid],
        );

        let err = build(&profile).unwrap_err();
        assert!(matches!(
            err,
            BuildError::ModuleField { module_id, field: "remotes", .. } if module_id == first_invalid.id()
        ));
    }

    #[test]
    fn build_preserves_order_and_active_set() {
        let modules = vec![
            Module::new(DnsSettings::default().into()),
            open_vpn_module(),
        ];
        let mut profile =
            EditableProfile::with_modules(ProfileAttributes::named("home"), modules.clone());
        profile.set_inactive(modules[0].id());

        let built = build(&profile).expect("profile should build");
        assert_eq!(built.modules(), profile.modules());
        assert_eq!(built.active_modules_ids(), profile.active_modules_ids());
        assert_eq!(built.active_modules().len(), 1);
    }

    #[test]
    fn rebuilding_a_built_profile_is_idempotent() {
        let profile = EditableProfile::with_modules(
            ProfileAttributes::named("home"),
            vec![Module::new(DnsSettings::default().into()), open_vpn_module()],
        );

        let first = build(&profile).expect("first build should succeed");
        let second = build(&first.editable()).expect("rebuild should succeed");
        assert_eq!(first, second);
    }
}
