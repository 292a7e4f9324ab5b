//! Caller-visible failure conditions.
//!
//! Every component-related variant carries the component name and kind so the
//! invoking layer can report a single labeled condition. Plumbing failures
//! (I/O, YAML/JSON parsing, subprocess spawning) stay as `anyhow` context
//! chains; these variants are what callers match on via `downcast_ref`.

use std::path::PathBuf;
use thiserror::Error;

use crate::component::kind::ComponentKind;

#[derive(Error, Debug)]
pub enum ComponentError {
    /// Local mode requested but the index has no entries for the active registry.
    #[error("No {kind} installed from '{remote}'")]
    NotInstalledFromRegistry { kind: ComponentKind, remote: String },

    /// Neither the local nor the remote loader produced a descriptor.
    #[error("Could not find {} '{name}'", .kind.singular())]
    ComponentNotFound { kind: ComponentKind, name: String },

    /// The component has no `tests/main.nf.test`.
    #[error("Test file 'main.nf.test' not found for {} '{name}' ({})", .kind.singular(), .path.display())]
    TestFileNotFound {
        kind: ComponentKind,
        name: String,
        path: PathBuf,
    },

    /// The component directory itself does not exist.
    #[error("Cannot find directory '{}'. Should be TOOL/SUBTOOL or TOOL", .path.display())]
    ComponentDirNotFound {
        kind: ComponentKind,
        name: String,
        path: PathBuf,
    },

    /// The first nf-test run failed.
    #[error("nf-test failed for {} '{name}'", .kind.singular())]
    TestRunFailed { kind: ComponentKind, name: String },

    /// The re-run disagreed with the freshly written snapshot.
    #[error("nf-test snapshot is not stable for {} '{name}'", .kind.singular())]
    UnstableSnapshot { kind: ComponentKind, name: String },

    /// An update run left every recorded timestamp untouched.
    #[error("Snapshot of {} '{name}' was not updated ({})", .kind.singular(), .path.display())]
    SnapshotNotUpdated {
        kind: ComponentKind,
        name: String,
        path: PathBuf,
    },

    /// The snapshot file is missing or not the expected JSON shape.
    #[error("Invalid snapshot file {}: {reason}", .path.display())]
    InvalidSnapshot { path: PathBuf, reason: String },

    /// Module snapshots must record the `versions` channel.
    #[error("Snapshot of module '{name}' has no 'versions' content ({})", .path.display())]
    MissingVersions { name: String, path: PathBuf },

    /// No nf-test profile could be determined.
    #[error("No nf-test profile given; use --profile or set the PROFILE environment variable")]
    ProfileNotSet,

    /// The working directory is neither a pipeline nor a modules repository.
    #[error("Could not determine repository type of '{}': {reason}", .path.display())]
    RepoType { path: PathBuf, reason: String },
}
