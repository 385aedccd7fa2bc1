//! Error types for profile validation and building.

use thiserror::Error;
use uuid::Uuid;

use crate::catalog::ModuleKind;

/// Structured errors emitted while building an editable profile into an
/// immutable [`Profile`](crate::Profile).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BuildError {
    /// The profile name was empty after trimming.
    #[error("profile name must not be empty")]
    MissingProfileName,

    /// Two modules shared the same identifier.
    #[error("duplicate module id {module_id}")]
    DuplicateModuleId {
        /// Identifier present more than once in the module list.
        module_id: Uuid,
    },

    /// Two modules of an exclusive kind were active at the same time.
    #[error("multiple active {kind} modules: {first_id} and {second_id}")]
    SingletonConflict {
        /// Kind that admits at most one active module.
        kind: ModuleKind,
        /// Identifier of the module encountered first in profile order.
        first_id: Uuid,
        /// Identifier of the conflicting module.
        second_id: Uuid,
    },

    /// A module field failed its kind-specific validation.
    #[error("invalid value for '{field}' in module {module_id}: {reason}")]
    ModuleField {
        /// Identifier of the offending module.
        module_id: Uuid,
        /// Field that failed validation.
        field: &'static str,
        /// Machine-readable reason for the failure.
        reason: &'static str,
    },
}

/// Convenience alias for build results.
pub type BuildResult<T> = Result<T, BuildError>;
