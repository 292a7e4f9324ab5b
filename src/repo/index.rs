//! Installed-component index read from a pipeline's `modules.json`.
//!
//! Layout:
//! ```json
//! { "repos": { "<remote url>": { "modules": { "<install dir>": { "<name>": { "git_sha": "..." } } } } } }
//! ```
//! The index is a read-only snapshot taken when the command starts.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

use crate::component::kind::ComponentKind;

pub const MODULES_JSON: &str = "modules.json";

type InstallTree = BTreeMap<String, BTreeMap<String, InstallRecord>>;

#[derive(Debug, Clone, Default, Deserialize)]
struct ModulesJson {
    #[serde(default)]
    repos: BTreeMap<String, RepoEntry>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct RepoEntry {
    #[serde(default)]
    modules: InstallTree,
    #[serde(default)]
    subworkflows: InstallTree,
}

impl RepoEntry {
    fn tree(&self, kind: ComponentKind) -> &InstallTree {
        match kind {
            ComponentKind::Modules => &self.modules,
            ComponentKind::Subworkflows => &self.subworkflows,
        }
    }
}

/// Per-component install record; only informational fields are kept.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct InstallRecord {
    #[serde(default)]
    pub branch: Option<String>,
    #[serde(default)]
    pub git_sha: Option<String>,
    #[serde(default)]
    pub installed_by: Vec<String>,
}

/// One installed component: the subdirectory it lives in plus its name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstalledComponent {
    pub install_dir: String,
    pub name: String,
}

impl InstalledComponent {
    /// Name offered for selection: bare when installed under the default org
    /// directory, `<install_dir>/<name>` otherwise.
    pub fn display_name(&self, default_dir: &str) -> String {
        if self.install_dir == default_dir {
            self.name.clone()
        } else {
            format!("{}/{}", self.install_dir, self.name)
        }
    }

    /// Whether a user-supplied name designates this component.
    pub fn matches(&self, requested: &str, default_dir: &str) -> bool {
        self.name == requested || self.display_name(default_dir) == requested
    }
}

#[derive(Debug, Clone, Default)]
pub struct InstalledIndex {
    repos: BTreeMap<String, RepoEntry>,
}

impl InstalledIndex {
    /// Read `<pipeline_dir>/modules.json`.
    pub fn load(pipeline_dir: &Path) -> Result<Self> {
        let path = pipeline_dir.join(MODULES_JSON);
        let raw = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::from_json_str(&raw).with_context(|| format!("failed to parse {}", path.display()))
    }

    pub fn from_json_str(raw: &str) -> Result<Self> {
        let parsed: ModulesJson = serde_json::from_str(raw)?;
        Ok(Self {
            repos: parsed.repos,
        })
    }

    /// Components of `kind` installed from `remote_url`, ordered by install
    /// directory then name. `None` when the index has no entry for the remote.
    pub fn installed(
        &self,
        kind: ComponentKind,
        remote_url: &str,
    ) -> Option<Vec<InstalledComponent>> {
        let entry = self.repos.get(remote_url)?;
        let list = entry
            .tree(kind)
            .iter()
            .flat_map(|(dir, components)| {
                components.keys().map(move |name| InstalledComponent {
                    install_dir: dir.clone(),
                    name: name.clone(),
                })
            })
            .collect();
        Some(list)
    }

    /// Install record for a single component, if present.
    pub fn record(
        &self,
        kind: ComponentKind,
        remote_url: &str,
        component: &InstalledComponent,
    ) -> Option<&InstallRecord> {
        self.repos
            .get(remote_url)?
            .tree(kind)
            .get(&component.install_dir)?
            .get(&component.name)
    }

    /// Remote URLs present in the index.
    pub fn remotes(&self) -> impl Iterator<Item = &str> {
        self.repos.keys().map(|k| k.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "name": "nf-core/demo",
        "repos": {
            "https://github.com/nf-core/modules.git": {
                "modules": {
                    "nf-core": {
                        "fastqc": {"branch": "master", "git_sha": "abc", "installed_by": ["modules"]}
                    }
                },
                "subworkflows": {
                    "nf-core": {
                        "bam_sort_stats_samtools": {"branch": "master", "git_sha": "def", "installed_by": ["subworkflows"]}
                    },
                    "myorg": {
                        "custom_qc": {"branch": "main", "git_sha": "123", "installed_by": ["subworkflows"]}
                    }
                }
            }
        }
    }"#;

    #[test]
    fn installed_lists_components_with_dirs() {
        let idx = InstalledIndex::from_json_str(SAMPLE).unwrap();
        let list = idx
            .installed(
                ComponentKind::Subworkflows,
                "https://github.com/nf-core/modules.git",
            )
            .unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].install_dir, "myorg");
        assert_eq!(list[0].display_name("nf-core"), "myorg/custom_qc");
        assert_eq!(list[1].display_name("nf-core"), "bam_sort_stats_samtools");
    }

    #[test]
    fn unknown_remote_is_none() {
        let idx = InstalledIndex::from_json_str(SAMPLE).unwrap();
        assert!(
            idx.installed(ComponentKind::Modules, "https://example.org/x.git")
                .is_none()
        );
        assert_eq!(idx.remotes().count(), 1);
    }

    #[test]
    fn matches_bare_and_prefixed_names() {
        let c = InstalledComponent {
            install_dir: "myorg".into(),
            name: "custom_qc".into(),
        };
        assert!(c.matches("custom_qc", "nf-core"));
        assert!(c.matches("myorg/custom_qc", "nf-core"));
        assert!(!c.matches("nf-core/custom_qc", "nf-core"));
    }

    #[test]
    fn record_lookup() {
        let idx = InstalledIndex::from_json_str(SAMPLE).unwrap();
        let c = InstalledComponent {
            install_dir: "nf-core".into(),
            name: "fastqc".into(),
        };
        let rec = idx
            .record(
                ComponentKind::Modules,
                "https://github.com/nf-core/modules.git",
                &c,
            )
            .unwrap();
        assert_eq!(rec.git_sha.as_deref(), Some("abc"));
    }
}
