/*!
shared.rs - state shared by the subcommands.

Focus:
  - Workspace: working directory, registry reference, pull policy, log level
  - detect_repo / require_repo: repository detection, quiet or strict
  - load_index: `modules.json` for pipelines
  - open_registry: local checkout or cached clone
*/

use anyhow::Result;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::registry::{self, NF_CORE_MODULES_REMOTE, Registry, RegistryRef, parse_remote};
use crate::repo::index::{InstalledIndex, MODULES_JSON};
use crate::repo::{self as repo_detect, RepoContext, RepoType};
use crate::utils::LogLevel;

/// Global options resolved once in `main` and handed to every subcommand.
#[derive(Debug, Clone)]
pub struct Workspace {
    pub dir: PathBuf,
    pub remote: RegistryRef,
    pub no_pull: bool,
    pub level: LogLevel,
}

impl Workspace {
    pub fn new(
        dir: &Path,
        git_remote: Option<&str>,
        branch: Option<String>,
        no_pull: bool,
        level: LogLevel,
    ) -> Result<Self> {
        let remote = match git_remote.map(str::trim).filter(|r| !r.is_empty()) {
            Some(raw) => parse_remote(raw, branch)?,
            None => RegistryRef::new(NF_CORE_MODULES_REMOTE, branch),
        };
        Ok(Self {
            dir: dir.to_path_buf(),
            remote,
            no_pull,
            level,
        })
    }

    /// Repository the working directory belongs to, if any.
    pub fn detect_repo(&self) -> Option<RepoContext> {
        match repo_detect::detect(&self.dir) {
            Ok(ctx) => {
                debug!(root = %ctx.root.display(), repo_type = %ctx.repo_type, org = %ctx.org_path, "repository detected");
                Some(ctx)
            }
            Err(e) => {
                debug!("no repository at {}: {e:#}", self.dir.display());
                None
            }
        }
    }

    /// Repository the working directory belongs to; an error when there is none.
    pub fn require_repo(&self) -> Result<RepoContext> {
        repo_detect::detect(&self.dir)
    }

    /// Installed-component index; only pipelines carry one. A pipeline
    /// without `modules.json` yields `None`, which lookups report as not
    /// installed from the registry.
    pub fn load_index(&self, repo: Option<&RepoContext>) -> Result<Option<InstalledIndex>> {
        match repo {
            Some(r)
                if r.repo_type == RepoType::Pipeline && r.root.join(MODULES_JSON).is_file() =>
            {
                let index = InstalledIndex::load(&r.root)?;
                debug!(remotes = ?index.remotes().collect::<Vec<_>>(), "loaded {MODULES_JSON}");
                Ok(Some(index))
            }
            _ => Ok(None),
        }
    }

    pub fn open_registry(&self) -> Result<Box<dyn Registry>> {
        debug!(remote = %self.remote, default = self.remote.is_default(), no_pull = self.no_pull, "opening registry");
        registry::open(&self.remote, self.no_pull)
    }
}
