//! Registry backed by a shallow git clone kept in the user cache directory.

use anyhow::{Context, Result, anyhow, bail};
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

use super::{CheckoutRegistry, Registry, RegistryRef};
use crate::component::kind::ComponentKind;
use crate::utils::process::{CommandSpec, run_command};

#[derive(Debug)]
pub struct GitRegistry {
    checkout: CheckoutRegistry,
}

impl GitRegistry {
    /// Clone `reference` into the cache (or refresh an existing clone unless
    /// `no_pull`) and read from the working tree.
    pub fn open(reference: &RegistryRef, no_pull: bool) -> Result<Self> {
        let dir = cache_root()?.join(reference.cache_key());
        Self::open_in(reference, &dir, no_pull)
    }

    /// Same as `open` with an explicit clone directory.
    pub fn open_in(reference: &RegistryRef, dir: &Path, no_pull: bool) -> Result<Self> {
        if dir.join(".git").is_dir() {
            if no_pull {
                tracing::debug!(path = %dir.display(), "using existing clone (--no-pull)");
            } else {
                pull(reference, dir)?;
            }
        } else {
            clone(reference, dir)?;
        }
        let checkout = CheckoutRegistry::open(dir.to_path_buf(), reference.clone())?;
        Ok(Self { checkout })
    }

    pub fn root(&self) -> &Path {
        self.checkout.root()
    }
}

impl Registry for GitRegistry {
    fn reference(&self) -> &RegistryRef {
        self.checkout.reference()
    }

    fn list_available(&self, kind: ComponentKind) -> Result<Vec<String>> {
        self.checkout.list_available(kind)
    }

    fn fetch_metadata_text(&self, kind: ComponentKind, name: &str) -> Result<Option<String>> {
        self.checkout.fetch_metadata_text(kind, name)
    }
}

fn cache_root() -> Result<PathBuf> {
    let dirs = ProjectDirs::from("", "nf-core", "nfc-info")
        .ok_or_else(|| anyhow!("could not determine a cache directory (no home directory?)"))?;
    Ok(dirs.cache_dir().join("registries"))
}

fn clone(reference: &RegistryRef, dir: &Path) -> Result<()> {
    let parent = dir
        .parent()
        .ok_or_else(|| anyhow!("clone target {} has no parent", dir.display()))?;
    std::fs::create_dir_all(parent)
        .with_context(|| format!("failed to create {}", parent.display()))?;

    let mut spec = CommandSpec::new("git", parent).args(["clone", "--depth", "1"]);
    if let Some(branch) = &reference.branch {
        spec = spec.args(["--branch", branch.as_str()]);
    }
    let spec = spec.arg(reference.url.as_str()).arg(dir.to_string_lossy());

    tracing::info!(remote = %reference, "cloning registry");
    let out = run_command(&spec)?;
    if !out.success {
        bail!(
            "git clone of '{}' failed: {}",
            reference.url,
            out.stderr.trim()
        );
    }
    Ok(())
}

fn pull(reference: &RegistryRef, dir: &Path) -> Result<()> {
    let mut spec = CommandSpec::new("git", dir).args(["pull", "--ff-only", "origin"]);
    if let Some(branch) = &reference.branch {
        spec = spec.arg(branch.as_str());
    }
    let out = run_command(&spec)?;
    if !out.success {
        // A stale clone is still readable; keep going with what is on disk.
        tracing::warn!(
            remote = %reference,
            "git pull failed, using cached clone: {}",
            out.stderr.trim()
        );
    }
    Ok(())
}
