//! Editable and built profile aggregates.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::catalog::ModuleKind;
use crate::module::Module;

/// Profile-level attributes shared by the editable and built forms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileAttributes {
    /// Stable profile identifier.
    pub id: Uuid,
    /// Display name shown in profile lists.
    pub name: String,
    /// Whether the profile is offered on TV devices.
    #[serde(default)]
    pub is_available_for_tv: bool,
}

impl ProfileAttributes {
    /// Attributes for a new profile with a fresh identifier.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            is_available_for_tv: false,
        }
    }
}

/// The mutable, possibly transiently invalid working state of a profile.
///
/// All mutation methods are total. Invariants such as unique module
/// identifiers and the singleton-kind rule are enforced only when the
/// profile is built, so the editing flow never has to handle errors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditableProfile {
    /// Profile-level attributes.
    pub attributes: ProfileAttributes,
    modules: Vec<Module>,
    active_modules_ids: HashSet<Uuid>,
}

impl EditableProfile {
    /// Empty profile with the given attributes.
    #[must_use]
    pub fn new(attributes: ProfileAttributes) -> Self {
        Self {
            attributes,
            modules: Vec::new(),
            active_modules_ids: HashSet::new(),
        }
    }

    /// Profile seeded from a module list; every module starts active.
    #[must_use]
    pub fn with_modules(attributes: ProfileAttributes, modules: Vec<Module>) -> Self {
        let active_modules_ids = modules.iter().map(Module::id).collect();
        Self {
            attributes,
            modules,
            active_modules_ids,
        }
    }

    pub(crate) const fn from_parts(
        attributes: ProfileAttributes,
        modules: Vec<Module>,
        active_modules_ids: HashSet<Uuid>,
    ) -> Self {
        Self {
            attributes,
            modules,
            active_modules_ids,
        }
    }

    /// Modules in user-significant order.
    #[must_use]
    pub fn modules(&self) -> &[Module] {
        &self.modules
    }

    /// Identifiers of currently enabled modules.
    #[must_use]
    pub const fn active_modules_ids(&self) -> &HashSet<Uuid> {
        &self.active_modules_ids
    }

    /// Kinds of the contained modules, in order.
    #[must_use]
    pub fn module_kinds(&self) -> Vec<ModuleKind> {
        self.modules.iter().map(Module::kind).collect()
    }

    /// Whether the module id is currently enabled.
    #[must_use]
    pub fn is_active(&self, module_id: Uuid) -> bool {
        self.active_modules_ids.contains(&module_id)
    }

    /// Enable a module id. Does not enforce the singleton-kind invariant;
    /// that is the build pipeline's job.
    pub fn set_active(&mut self, module_id: Uuid) {
        self.active_modules_ids.insert(module_id);
    }

    /// Disable a module id.
    pub fn set_inactive(&mut self, module_id: Uuid) {
        self.active_modules_ids.remove(&module_id);
    }

    /// Reorder modules, moving the rows at `from` so that the first lands
    /// at offset `to` counted against the original list.
    ///
    /// Preserves the module set exactly; duplicate and out-of-range
    /// offsets are ignored.
    pub fn move_modules(&mut self, from: &[usize], to: usize) {
        let mut offsets: Vec<usize> = from
            .iter()
            .copied()
            .filter(|&offset| offset < self.modules.len())
            .collect();
        offsets.sort_unstable();
        offsets.dedup();
        if offsets.is_empty() {
            return;
        }

        let mut moved = Vec::with_capacity(offsets.len());
        for &offset in offsets.iter().rev() {
            moved.push(self.modules.remove(offset));
        }
        moved.reverse();

        let shift = offsets.iter().filter(|&&offset| offset < to).count();
        let target = to.saturating_sub(shift).min(self.modules.len());
        for (slot, module) in moved.into_iter().enumerate() {
            self.modules.insert(target + slot, module);
        }
    }

    /// Remove the module at `index`, clearing its active flag.
    ///
    /// Returns the removed module so the caller can tombstone it, or
    /// `None` when the index is out of range.
    pub fn remove_module_at(&mut self, index: usize) -> Option<Module> {
        if index >= self.modules.len() {
            return None;
        }
        let module = self.modules.remove(index);
        self.active_modules_ids.remove(&module.id());
        Some(module)
    }

    /// Remove the module with the given id, clearing its active flag.
    ///
    /// Returns the removed module so the caller can tombstone it, or
    /// `None` when the id is not present.
    pub fn remove_module(&mut self, module_id: Uuid) -> Option<Module> {
        let index = self
            .modules
            .iter()
            .position(|module| module.id() == module_id)?;
        self.remove_module_at(index)
    }

    /// Insert a module, replacing any existing module with the same id in
    /// place (preserving its position); new modules are appended. When
    /// `activate` is set, the module id is additionally enabled.
    pub fn insert_or_replace(&mut self, module: Module, activate: bool) {
        let module_id = module.id();
        if let Some(slot) = self
            .modules
            .iter_mut()
            .find(|existing| existing.id() == module_id)
        {
            *slot = module;
        } else {
            self.modules.push(module);
        }
        if activate {
            self.active_modules_ids.insert(module_id);
        }
    }
}

/// The immutable, validated build artifact.
///
/// Created only by [`build`](crate::build::build); it carries no mutation
/// surface and deliberately does not implement `Deserialize`, so every
/// instance in the process has passed validation. Subsequent edits derive
/// a fresh [`EditableProfile`] via [`Profile::editable`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Profile {
    attributes: ProfileAttributes,
    modules: Vec<Module>,
    active_modules_ids: HashSet<Uuid>,
}

impl Profile {
    pub(crate) const fn from_validated(
        attributes: ProfileAttributes,
        modules: Vec<Module>,
        active_modules_ids: HashSet<Uuid>,
    ) -> Self {
        Self {
            attributes,
            modules,
            active_modules_ids,
        }
    }

    /// Stable profile identifier.
    #[must_use]
    pub const fn id(&self) -> Uuid {
        self.attributes.id
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.attributes.name
    }

    /// Profile-level attributes.
    #[must_use]
    pub const fn attributes(&self) -> &ProfileAttributes {
        &self.attributes
    }

    /// Modules in build order.
    #[must_use]
    pub fn modules(&self) -> &[Module] {
        &self.modules
    }

    /// Identifiers of enabled modules.
    #[must_use]
    pub const fn active_modules_ids(&self) -> &HashSet<Uuid> {
        &self.active_modules_ids
    }

    /// Enabled modules in build order.
    #[must_use]
    pub fn active_modules(&self) -> Vec<&Module> {
        self.modules
            .iter()
            .filter(|module| self.active_modules_ids.contains(&module.id()))
            .collect()
    }

    /// Derive a mutable working copy for a new edit session.
    #[must_use]
    pub fn editable(&self) -> EditableProfile {
        EditableProfile::from_parts(
            self.attributes.clone(),
            self.modules.clone(),
            self.active_modules_ids.clone(),
        )
    }
}
