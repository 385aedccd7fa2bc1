//! Session-scoped profile editing controller.

use std::collections::HashMap;

use tokio::sync::watch;
use tracing::error;
use uuid::Uuid;
use wayfarer_profile::{
    BuildError, EditableProfile, Module, ModuleKind, Profile, ProfileAttributes, available_kinds,
};

use crate::error::EditorError;
use crate::preferences::ModulePreferences;
use crate::stores::{PreferencesMap, PreferencesStore, ProfileStore};

/// Session-scoped controller wrapping one [`EditableProfile`].
///
/// Mutation operations never fail; all failure is concentrated in
/// [`build`](Self::build) and [`save`](Self::save), so the UI-adjacent
/// caller can mutate freely without handling errors on every keystroke.
/// Removed modules are tombstoned until the next successful build or
/// load, keeping their last edited value recoverable for undo.
///
/// The editor is confined to a single logical owner; it holds no internal
/// locks and expects its caller to serialize mutations.
pub struct ProfileEditor {
    profile: EditableProfile,
    is_shared: bool,
    preferences: PreferencesMap,
    removed_modules: HashMap<Uuid, Module>,
    revision: watch::Sender<u64>,
}

impl ProfileEditor {
    /// Editor over an empty profile.
    #[must_use]
    pub fn new(attributes: ProfileAttributes) -> Self {
        Self::with_profile(EditableProfile::new(attributes))
    }

    /// Editor seeded from a module list; every module starts active.
    #[must_use]
    pub fn with_modules(attributes: ProfileAttributes, modules: Vec<Module>) -> Self {
        Self::with_profile(EditableProfile::with_modules(attributes, modules))
    }

    /// Editor over a working copy of a built profile.
    #[must_use]
    pub fn from_profile(profile: &Profile) -> Self {
        Self::with_profile(profile.editable())
    }

    fn with_profile(profile: EditableProfile) -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            profile,
            is_shared: false,
            preferences: PreferencesMap::new(),
            removed_modules: HashMap::new(),
            revision,
        }
    }

    /// Current editable state.
    #[must_use]
    pub const fn profile(&self) -> &EditableProfile {
        &self.profile
    }

    /// Whether the profile is flagged for remote sharing. Independent of
    /// module contents.
    #[must_use]
    pub const fn is_shared(&self) -> bool {
        self.is_shared
    }

    /// Flag or unflag the profile for remote sharing.
    pub fn set_shared(&mut self, is_shared: bool) {
        self.is_shared = is_shared;
        self.mark_changed();
    }

    /// Whether the profile is offered on TV devices.
    #[must_use]
    pub const fn is_available_for_tv(&self) -> bool {
        self.profile.attributes.is_available_for_tv
    }

    /// Toggle the TV-availability attribute.
    pub fn set_available_for_tv(&mut self, available: bool) {
        self.profile.attributes.is_available_for_tv = available;
        self.mark_changed();
    }

    /// Rename the profile.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.profile.attributes.name = name.into();
        self.mark_changed();
    }

    /// Preference records keyed by module id.
    #[must_use]
    pub const fn preferences(&self) -> &PreferencesMap {
        &self.preferences
    }

    /// Mutable preference record for a module, created on first access.
    pub fn module_preferences_mut(&mut self, module_id: Uuid) -> &mut ModulePreferences {
        self.preferences.entry(module_id).or_default()
    }

    /// Kinds of the modules currently in the profile, in order.
    #[must_use]
    pub fn module_kinds(&self) -> Vec<ModuleKind> {
        self.profile.module_kinds()
    }

    /// Kinds currently offered for manual addition.
    #[must_use]
    pub fn available_module_kinds(&self) -> Vec<ModuleKind> {
        available_kinds(&self.profile.module_kinds())
    }

    /// Modules in user-significant order.
    #[must_use]
    pub fn modules(&self) -> &[Module] {
        self.profile.modules()
    }

    /// Enabled modules in order.
    #[must_use]
    pub fn active_modules(&self) -> Vec<&Module> {
        self.profile
            .modules()
            .iter()
            .filter(|module| self.profile.is_active(module.id()))
            .collect()
    }

    /// Look up a module by id, falling back to the tombstone store so a
    /// just-removed module stays inspectable (e.g. for an undo
    /// affordance) until the next successful build or load.
    #[must_use]
    pub fn module(&self, module_id: Uuid) -> Option<&Module> {
        self.profile
            .modules()
            .iter()
            .find(|module| module.id() == module_id)
            .or_else(|| self.removed_modules.get(&module_id))
    }

    /// Whether a module id is currently enabled.
    #[must_use]
    pub fn is_active(&self, module_id: Uuid) -> bool {
        self.profile.is_active(module_id)
    }

    /// Tombstoned modules awaiting the next successful build or load.
    #[must_use]
    pub const fn removed_modules(&self) -> &HashMap<Uuid, Module> {
        &self.removed_modules
    }

    /// Subscribe to state-change notifications.
    ///
    /// The receiver observes a monotonically increasing revision bumped
    /// on every mutation; the core supports one external subscriber at a
    /// time.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    /// Toggle a module's active flag. No-op when the id is unknown to
    /// both the live modules and the tombstone store.
    pub fn toggle_module(&mut self, module_id: Uuid) {
        if self.module(module_id).is_none() {
            return;
        }
        if self.profile.is_active(module_id) {
            self.profile.set_inactive(module_id);
        } else {
            self.profile.set_active(module_id);
        }
        self.mark_changed();
    }

    /// Reorder modules; delegates to the editable profile, no validation.
    pub fn move_modules(&mut self, from: &[usize], to: usize) {
        self.profile.move_modules(from, to);
        self.mark_changed();
    }

    /// Remove the modules at the given offsets, tombstoning each before
    /// it leaves the list so its last edited value stays recoverable.
    ///
    /// Offsets are processed in descending order so earlier removals do
    /// not shift later targets.
    pub fn remove_modules(&mut self, offsets: &[usize]) {
        let mut offsets: Vec<usize> = offsets.to_vec();
        offsets.sort_unstable();
        offsets.dedup();
        for &offset in offsets.iter().rev() {
            if let Some(module) = self.profile.modules().get(offset) {
                self.removed_modules.insert(module.id(), module.clone());
            }
            self.profile.remove_module_at(offset);
        }
        self.mark_changed();
    }

    /// Remove the module with the given id; no-op when absent.
    pub fn remove_module(&mut self, module_id: Uuid) {
        let Some(module) = self
            .profile
            .modules()
            .iter()
            .find(|module| module.id() == module_id)
            .cloned()
        else {
            return;
        };
        self.removed_modules.insert(module.id(), module);
        self.profile.remove_module(module_id);
        self.mark_changed();
    }

    /// Write back a module edited in a sub-editor: replace in place by id
    /// preserving position, or append. Optionally activates it. This is
    /// the sole entry point for module edits.
    pub fn save_module(&mut self, module: Module, activating: bool) {
        self.profile.insert_or_replace(module, activating);
        self.mark_changed();
    }

    /// Validate the edited state and produce the immutable artifact.
    ///
    /// On success the editable state is re-synchronized from the built
    /// profile and the tombstone store is cleared. On failure nothing is
    /// touched, so the user keeps the invalid edit to fix.
    ///
    /// # Errors
    ///
    /// Propagates the first [`BuildError`] unchanged.
    pub fn build(&mut self) -> Result<Profile, BuildError> {
        let built = wayfarer_profile::build(&self.profile)?;

        self.profile = built.editable();
        self.removed_modules.clear();
        self.mark_changed();

        Ok(built)
    }

    /// Build and persist the profile, then best-effort persist the
    /// session's preferences.
    ///
    /// The in-memory build completes before any persistence call begins,
    /// so cancelling the returned future never leaves the editable state
    /// half-updated. A preferences save failure after a successful
    /// profile save is logged and absorbed; the profile store is
    /// authoritative.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::Build`] when validation fails (no
    /// persistence is attempted) and [`EditorError::Persistence`] when
    /// the profile store rejects the artifact.
    pub async fn save(
        &mut self,
        profiles: &dyn ProfileStore,
        preferences: &dyn PreferencesStore,
    ) -> Result<Profile, EditorError> {
        let built = match self.build() {
            Ok(built) => built,
            Err(err) => {
                error!(error = %err, "unable to save edited profile");
                return Err(err.into());
            }
        };

        profiles
            .save_profile(&built, true, self.is_shared)
            .await
            .map_err(|err| {
                error!(profile_id = %built.id(), error = ?err, "unable to save edited profile");
                EditorError::Persistence(err)
            })?;

        if let Err(err) = preferences
            .save_preferences(built.id(), &self.preferences)
            .await
        {
            error!(profile_id = %built.id(), error = ?err, "unable to save preferences for profile");
        }

        Ok(built)
    }

    /// Wholesale session reset: replace the edited target, reload its
    /// preferences, and drop all tombstones.
    ///
    /// A preferences load failure is absorbed: the session continues with
    /// an empty mapping and the error is logged.
    pub async fn load(
        &mut self,
        profile: EditableProfile,
        is_shared: bool,
        preferences: &dyn PreferencesStore,
    ) {
        let profile_id = profile.attributes.id;
        self.profile = profile;
        self.is_shared = is_shared;
        self.preferences = match preferences.load_preferences(profile_id).await {
            Ok(records) => records,
            Err(err) => {
                error!(profile_id = %profile_id, error = ?err, "unable to load preferences for profile");
                PreferencesMap::new()
            }
        };
        self.removed_modules.clear();
        self.mark_changed();
    }

    /// Intentionally a no-op: a session is discarded by dropping the
    /// editor. Documented so callers know no cleanup side effects exist.
    pub fn discard(&self) {}

    fn mark_changed(&self) {
        self.revision.send_modify(|revision| *revision += 1);
    }
}
