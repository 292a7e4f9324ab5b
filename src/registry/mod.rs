//! Remote component registry.
//!
//! parse_remote -> RegistryRef { url, branch } classified by RemoteKind
//! Registry trait: list_available / fetch_metadata_text
//! Implementations: CheckoutRegistry (directory on disk), GitRegistry (cached clone).
//!
use anyhow::{Result, bail};
use std::fmt;
use std::path::{Path, PathBuf};
use url::Url;

use crate::component::kind::ComponentKind;

pub mod checkout;
pub mod git;

pub use checkout::CheckoutRegistry;
pub use git::GitRegistry;

/// Canonical registry every install command defaults to.
pub const NF_CORE_MODULES_REMOTE: &str = "https://github.com/nf-core/modules.git";

/// Classification of a remote reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteKind {
    /// http(s) URL; rendered as a hyperlink.
    Http,
    /// ssh://, git:// or scp-like `git@host:org/repo.git`.
    Ssh,
    /// A directory on disk (file:// URL or plain path).
    LocalPath,
}

/// Remote registry reference: URL plus optional branch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryRef {
    pub url: String,
    pub branch: Option<String>,
}

impl Default for RegistryRef {
    fn default() -> Self {
        Self {
            url: NF_CORE_MODULES_REMOTE.to_string(),
            branch: None,
        }
    }
}

impl RegistryRef {
    pub fn new(url: impl Into<String>, branch: Option<String>) -> Self {
        Self {
            url: url.into(),
            branch: branch.filter(|b| !b.trim().is_empty()),
        }
    }

    /// Whether this is the canonical registry.
    pub fn is_default(&self) -> bool {
        self.url == NF_CORE_MODULES_REMOTE
    }

    pub fn kind(&self) -> RemoteKind {
        classify(&self.url)
    }

    /// http(s) remotes are rendered as hyperlinks.
    pub fn is_http(&self) -> bool {
        matches!(self.kind(), RemoteKind::Http)
    }

    /// Directory on disk when the remote is local.
    pub fn local_path(&self) -> Option<PathBuf> {
        if !matches!(self.kind(), RemoteKind::LocalPath) {
            return None;
        }
        match Url::parse(&self.url) {
            Ok(u) if u.scheme() == "file" => u.to_file_path().ok(),
            _ => Some(PathBuf::from(&self.url)),
        }
    }

    /// Filesystem-safe key identifying this remote + branch (cache directory name).
    pub fn cache_key(&self) -> String {
        let base = self
            .url
            .trim_end_matches('/')
            .trim_end_matches(".git")
            .split("://")
            .last()
            .unwrap_or(&self.url)
            .to_string();
        let mut key: String = base
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
            .collect();
        if let Some(b) = &self.branch {
            key.push('@');
            key.extend(b.chars().map(|c| if c.is_ascii_alphanumeric() { c } else { '_' }));
        }
        key
    }
}

impl fmt::Display for RegistryRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.branch {
            Some(b) => write!(f, "{} ({})", self.url, b),
            None => f.write_str(&self.url),
        }
    }
}

fn classify(raw: &str) -> RemoteKind {
    if let Ok(url) = Url::parse(raw) {
        match url.scheme() {
            "http" | "https" => return RemoteKind::Http,
            "ssh" | "git" => return RemoteKind::Ssh,
            "file" => return RemoteKind::LocalPath,
            // Single-letter schemes are Windows drive letters.
            s if s.len() == 1 => return RemoteKind::LocalPath,
            _ => {}
        }
    }
    if is_scp_like(raw) {
        RemoteKind::Ssh
    } else {
        RemoteKind::LocalPath
    }
}

/// `user@host:path` without a scheme.
fn is_scp_like(raw: &str) -> bool {
    match raw.split_once(':') {
        Some((head, tail)) => head.contains('@') && !head.contains('/') && !tail.is_empty(),
        None => false,
    }
}

/// Parse a `--git-remote` value into a `RegistryRef`.
///
/// Accepted forms:
/// - "https://github.com/nf-core/modules.git" -> Http
/// - "git@github.com:nf-core/modules.git"     -> Ssh
/// - "/srv/mirrors/modules" or "file:///..."  -> LocalPath
pub fn parse_remote(raw: &str, branch: Option<String>) -> Result<RegistryRef> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        bail!("Registry remote is empty");
    }
    if let Ok(url) = Url::parse(trimmed)
        && matches!(url.scheme(), "http" | "https" | "ssh" | "git")
        && url.host_str().is_none()
    {
        bail!("Registry remote '{trimmed}' has no host");
    }
    Ok(RegistryRef::new(trimmed, branch))
}

/// Query surface of a component registry.
pub trait Registry {
    /// Reference this registry was opened from (recorded as `remote_location`).
    fn reference(&self) -> &RegistryRef;

    /// Names of every available component of `kind`.
    fn list_available(&self, kind: ComponentKind) -> Result<Vec<String>>;

    /// Raw `meta.yml` text of a component, `None` when the file is missing.
    fn fetch_metadata_text(&self, kind: ComponentKind, name: &str) -> Result<Option<String>>;
}

/// Open the registry for `reference`: local directories are read in place,
/// anything else goes through a cached git clone.
pub fn open(reference: &RegistryRef, no_pull: bool) -> Result<Box<dyn Registry>> {
    if let Some(path) = reference.local_path()
        && path.is_dir()
        && !is_git_only(&path)
    {
        return Ok(Box::new(CheckoutRegistry::open(
            path,
            reference.clone(),
        )?));
    }
    let git = GitRegistry::open(reference, no_pull)?;
    tracing::debug!(path = %git.root().display(), "registry clone ready");
    Ok(Box::new(git))
}

/// A bare git repository has no working tree to read from.
fn is_git_only(path: &Path) -> bool {
    path.join("HEAD").is_file() && path.join("objects").is_dir()
}
