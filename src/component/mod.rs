//! Component metadata lookup.
//!
//! resolve  - make sure a concrete component name is available (prompting if not)
//! lookup   - local and remote descriptor loaders plus the orchestrator
//! render   - descriptor + resolution -> display blocks
//!
//! Every lookup runs against one `LookupContext`: the active repository (if
//! any), its installed-component index (pipelines only) and the registry.

pub mod descriptor;
pub mod kind;
pub mod lookup;
pub mod render;
pub mod resolve;

use serde::Serialize;
use std::path::PathBuf;

use crate::registry::{Registry, RegistryRef};
use crate::repo::index::InstalledIndex;
use crate::repo::{RepoContext, RepoType};
use descriptor::ComponentDescriptor;
use kind::ComponentKind;

/// Everything a lookup needs to know about where it runs.
pub struct LookupContext<'a> {
    pub kind: ComponentKind,
    pub repo: Option<&'a RepoContext>,
    pub index: Option<&'a InstalledIndex>,
    pub registry: &'a dyn Registry,
}

impl<'a> LookupContext<'a> {
    pub fn repo_type(&self) -> Option<RepoType> {
        self.repo.map(|r| r.repo_type)
    }

    pub fn remote(&self) -> &RegistryRef {
        self.registry.reference()
    }
}

/// Where a descriptor was found. Exactly one of the two on success.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Location {
    LocalPath(PathBuf),
    RemoteLocation(String),
}

/// A descriptor together with its resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedComponent {
    pub kind: ComponentKind,
    pub name: String,
    pub descriptor: ComponentDescriptor,
    pub location: Location,
}

impl LoadedComponent {
    pub fn local_path(&self) -> Option<&PathBuf> {
        match &self.location {
            Location::LocalPath(p) => Some(p),
            Location::RemoteLocation(_) => None,
        }
    }

    pub fn remote_location(&self) -> Option<&str> {
        match &self.location {
            Location::RemoteLocation(u) => Some(u),
            Location::LocalPath(_) => None,
        }
    }
}
