//! Error types for editor sessions.

use thiserror::Error;
use wayfarer_profile::BuildError;

/// Errors surfaced by [`ProfileEditor::save`](crate::ProfileEditor::save).
///
/// Validation failures and store failures are kept distinct so callers
/// can route the former back into the edit flow and the latter to retry
/// policy of their own.
#[derive(Debug, Error)]
pub enum EditorError {
    /// The edited profile failed validation; nothing was persisted.
    #[error("profile failed to build")]
    Build(#[from] BuildError),

    /// The profile store rejected the built profile.
    #[error("profile persistence failed")]
    Persistence(#[source] anyhow::Error),
}
