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

//! Session-scoped profile editing: the editor controller with tombstone
//! recovery, per-module preference records, and the persistence seams it
//! drives.
//!
//! Layout: `editor.rs` (the `ProfileEditor` controller), `preferences.rs`
//! (per-module preference records), `stores.rs` (collaborator traits plus
//! in-memory implementations), `error.rs` (session error taxonomy).

pub mod editor;
pub mod error;
pub mod preferences;
pub mod stores;

pub use editor::ProfileEditor;
pub use error::EditorError;
pub use preferences::ModulePreferences;
pub use stores::{
    MemoryPreferencesStore, MemoryProfileStore, PreferencesMap, PreferencesStore, ProfileStore,
    SavedProfile,
};
