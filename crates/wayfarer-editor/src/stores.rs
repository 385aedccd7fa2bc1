//! Collaborator seams for profile and preferences persistence.
//!
//! The editor only sequences calls to these stores; it does not attempt
//! cross-store transactions. The in-memory implementations back the
//! integration tests and serve as defaults for embedding callers.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use uuid::Uuid;
use wayfarer_profile::Profile;

use crate::preferences::ModulePreferences;

/// Mapping from module identifier to its preference record.
pub type PreferencesMap = HashMap<Uuid, ModulePreferences>;

/// Persistence seam for built profiles.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Persist a built profile, tagged with its origin and sharing flag.
    async fn save_profile(
        &self,
        profile: &Profile,
        is_local: bool,
        remotely_shared: bool,
    ) -> anyhow::Result<()>;
}

/// Persistence seam for per-module preferences.
#[async_trait]
pub trait PreferencesStore: Send + Sync {
    /// Load the preference records for a profile.
    async fn load_preferences(&self, profile_id: Uuid) -> anyhow::Result<PreferencesMap>;

    /// Persist the preference records for a profile.
    async fn save_preferences(
        &self,
        profile_id: Uuid,
        preferences: &PreferencesMap,
    ) -> anyhow::Result<()>;
}

/// A profile captured by [`MemoryProfileStore`].
#[derive(Debug, Clone)]
pub struct SavedProfile {
    /// The persisted artifact.
    pub profile: Profile,
    /// Whether the profile was tagged as locally originated.
    pub is_local: bool,
    /// Whether the profile was flagged for remote sharing.
    pub remotely_shared: bool,
}

/// In-memory profile store.
#[derive(Debug, Default)]
pub struct MemoryProfileStore {
    saved: Mutex<Vec<SavedProfile>>,
}

impl MemoryProfileStore {
    /// Profiles captured so far, in save order.
    ///
    /// # Panics
    ///
    /// Panics if the store mutex has been poisoned.
    #[must_use]
    pub fn saved(&self) -> Vec<SavedProfile> {
        self.saved.lock().expect("profile store mutex poisoned").clone()
    }
}

#[async_trait]
impl ProfileStore for MemoryProfileStore {
    async fn save_profile(
        &self,
        profile: &Profile,
        is_local: bool,
        remotely_shared: bool,
    ) -> anyhow::Result<()> {
        self.saved
            .lock()
            .expect("profile store mutex poisoned")
            .push(SavedProfile {
                profile: profile.clone(),
                is_local,
                remotely_shared,
            });
        Ok(())
    }
}

/// In-memory preferences store keyed by profile id.
#[derive(Debug, Default)]
pub struct MemoryPreferencesStore {
    records: Mutex<HashMap<Uuid, PreferencesMap>>,
}

impl MemoryPreferencesStore {
    /// Seed the store with records for a profile.
    ///
    /// # Panics
    ///
    /// Panics if the store mutex has been poisoned.
    pub fn insert(&self, profile_id: Uuid, preferences: PreferencesMap) {
        self.records
            .lock()
            .expect("preferences store mutex poisoned")
            .insert(profile_id, preferences);
    }
}

#[async_trait]
impl PreferencesStore for MemoryPreferencesStore {
    async fn load_preferences(&self, profile_id: Uuid) -> anyhow::Result<PreferencesMap> {
        Ok(self
            .records
            .lock()
            .expect("preferences store mutex poisoned")
            .get(&profile_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn save_preferences(
        &self,
        profile_id: Uuid,
        preferences: &PreferencesMap,
    ) -> anyhow::Result<()> {
        self.records
            .lock()
            .expect("preferences store mutex poisoned")
            .insert(profile_id, preferences.clone());
        Ok(())
    }
}
