//! Registry backed by a working tree on disk.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use super::{Registry, RegistryRef};
use crate::component::kind::ComponentKind;
use crate::repo::config::RepoConfig;
use crate::repo::{components_in_tree, join_component};

#[derive(Debug, Clone)]
pub struct CheckoutRegistry {
    root: PathBuf,
    org_path: String,
    reference: RegistryRef,
}

impl CheckoutRegistry {
    /// Open the checkout at `root`; the org directory comes from its `.nf-core.yml`.
    pub fn open(root: PathBuf, reference: RegistryRef) -> Result<Self> {
        let cfg = RepoConfig::load(&root)
            .with_context(|| format!("failed to read registry config in {}", root.display()))?
            .unwrap_or_default();
        Ok(Self {
            org_path: cfg.org_path().to_string(),
            root,
            reference,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn org_dir(&self, kind: ComponentKind) -> PathBuf {
        self.root.join(kind.dir_name()).join(&self.org_path)
    }
}

impl Registry for CheckoutRegistry {
    fn reference(&self) -> &RegistryRef {
        &self.reference
    }

    fn list_available(&self, kind: ComponentKind) -> Result<Vec<String>> {
        components_in_tree(&self.org_dir(kind))
    }

    fn fetch_metadata_text(&self, kind: ComponentKind, name: &str) -> Result<Option<String>> {
        let meta = join_component(&self.org_dir(kind), name).join("meta.yml");
        if !meta.is_file() {
            tracing::debug!(path = %meta.display(), "meta.yml missing in registry checkout");
            return Ok(None);
        }
        let text = std::fs::read_to_string(&meta)
            .with_context(|| format!("failed to read {}", meta.display()))?;
        Ok(Some(text))
    }
}
