//! Repository detection (pipeline instance vs. modules collection) and
//! on-disk component discovery.
//!
//! detect -> RepoContext { root, repo_type, org_path }
//! components_in_tree -> names of every directory holding a `main.nf`

pub mod config;
pub mod index;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::component::kind::ComponentKind;
use crate::error::ComponentError;
use config::RepoConfig;
use index::InstalledComponent;

/// Kind of repository the working directory belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepoType {
    /// A pipeline instance with a `modules.json` index.
    Pipeline,
    /// A bare components collection (a clone of the modules registry).
    Modules,
}

impl fmt::Display for RepoType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RepoType::Pipeline => f.write_str("pipeline"),
            RepoType::Modules => f.write_str("modules"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoContext {
    pub root: PathBuf,
    pub repo_type: RepoType,
    pub org_path: String,
}

impl RepoContext {
    /// `<root>/<kind>`: where a pipeline keeps its install directories.
    pub fn kind_dir(&self, kind: ComponentKind) -> PathBuf {
        self.root.join(kind.dir_name())
    }

    /// `<root>/<kind>/<org_path>`: where a modules collection keeps components.
    pub fn org_dir(&self, kind: ComponentKind) -> PathBuf {
        self.kind_dir(kind).join(&self.org_path)
    }

    /// Directory of a (possibly nested) component under the org directory.
    pub fn component_dir(&self, kind: ComponentKind, name: &str) -> PathBuf {
        join_component(&self.org_dir(kind), name)
    }

    /// `<root>/<kind>/<install_dir>/<name>` for a component from `modules.json`.
    pub fn installed_dir(&self, kind: ComponentKind, component: &InstalledComponent) -> PathBuf {
        join_component(&self.kind_dir(kind).join(&component.install_dir), &component.name)
    }
}

/// Determine the repository type of `dir`.
///
/// `.nf-core.yml` wins when it names a type; otherwise the layout decides:
/// `modules.json` means pipeline, a `modules/` or `subworkflows/` tree without
/// a top-level `main.nf` means modules collection.
pub fn detect(dir: &Path) -> Result<RepoContext> {
    if !dir.is_dir() {
        return Err(ComponentError::RepoType {
            path: dir.to_path_buf(),
            reason: "directory does not exist".into(),
        }
        .into());
    }
    let cfg = RepoConfig::load(dir)?.unwrap_or_default();
    let repo_type = match cfg.repository_type {
        Some(t) => t,
        None => infer_type(dir).ok_or_else(|| ComponentError::RepoType {
            path: dir.to_path_buf(),
            reason: "no .nf-core.yml and no recognisable layout".into(),
        })?,
    };
    Ok(RepoContext {
        root: dir.to_path_buf(),
        repo_type,
        org_path: cfg.org_path().to_string(),
    })
}

fn infer_type(dir: &Path) -> Option<RepoType> {
    if dir.join(index::MODULES_JSON).is_file() {
        return Some(RepoType::Pipeline);
    }
    let has_tree = ComponentKind::variants()
        .iter()
        .any(|k| dir.join(k.dir_name()).is_dir());
    if has_tree && !dir.join("main.nf").is_file() {
        return Some(RepoType::Modules);
    }
    None
}

/// Append a `/`-separated component name to `base`.
pub fn join_component(base: &Path, name: &str) -> PathBuf {
    name.split('/')
        .filter(|seg| !seg.is_empty())
        .fold(base.to_path_buf(), |acc, seg| acc.join(seg))
}

/// Every directory under `base` that contains a `main.nf`, as `/`-joined paths
/// relative to `base`, sorted. A missing `base` yields an empty list.
pub fn components_in_tree(base: &Path) -> Result<Vec<String>> {
    if !base.is_dir() {
        return Ok(Vec::new());
    }
    let mut names = Vec::new();
    for entry in WalkDir::new(base).min_depth(1) {
        let entry = entry.with_context(|| format!("failed to walk {}", base.display()))?;
        if !entry.file_type().is_file() || entry.file_name() != "main.nf" {
            continue;
        }
        let Some(parent) = entry.path().parent() else {
            continue;
        };
        let Ok(rel) = parent.strip_prefix(base) else {
            continue;
        };
        let name = rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join("/");
        if !name.is_empty() {
            names.push(name);
        }
    }
    names.sort();
    names.dedup();
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(path: &Path) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, "").unwrap();
    }

    #[test]
    fn detect_from_config() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(".nf-core.yml"),
            "repository_type: pipeline\n",
        )
        .unwrap();
        let ctx = detect(dir.path()).unwrap();
        assert_eq!(ctx.repo_type, RepoType::Pipeline);
        assert_eq!(ctx.org_path, "nf-core");
    }

    #[test]
    fn detect_infers_modules_layout() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("modules/nf-core/fastqc/main.nf"));
        let ctx = detect(dir.path()).unwrap();
        assert_eq!(ctx.repo_type, RepoType::Modules);
        assert_eq!(
            ctx.component_dir(ComponentKind::Modules, "fastqc"),
            dir.path().join("modules/nf-core/fastqc")
        );
    }

    #[test]
    fn detect_infers_pipeline_from_index() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("modules.json"), "{}").unwrap();
        touch(&dir.path().join("main.nf"));
        assert_eq!(detect(dir.path()).unwrap().repo_type, RepoType::Pipeline);
    }

    #[test]
    fn detect_fails_on_plain_dir() {
        let dir = tempfile::tempdir().unwrap();
        let err = detect(dir.path()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ComponentError>(),
            Some(ComponentError::RepoType { .. })
        ));
    }

    #[test]
    fn components_in_tree_finds_nested() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("modules/nf-core");
        touch(&base.join("fastqc/main.nf"));
        touch(&base.join("bwa/mem/main.nf"));
        touch(&base.join("bwa/mem/tests/main.nf.test"));
        touch(&base.join("bwa/index/meta.yml"));
        let names = components_in_tree(&base).unwrap();
        assert_eq!(names, vec!["bwa/mem".to_string(), "fastqc".to_string()]);
    }

    #[test]
    fn components_in_missing_tree_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(
            components_in_tree(&dir.path().join("nope"))
                .unwrap()
                .is_empty()
        );
    }

    #[test]
    fn join_component_splits_on_slash() {
        let p = join_component(Path::new("/a"), "bwa/mem");
        assert_eq!(p, PathBuf::from("/a/bwa/mem"));
    }

    #[test]
    fn installed_dir_uses_install_dir_not_org_path() {
        let ctx = RepoContext {
            root: PathBuf::from("/pipe"),
            repo_type: RepoType::Pipeline,
            org_path: "nf-core".into(),
        };
        let c = InstalledComponent {
            install_dir: "myorg".into(),
            name: "bwa/mem".into(),
        };
        assert_eq!(
            ctx.installed_dir(ComponentKind::Modules, &c),
            PathBuf::from("/pipe/modules/myorg/bwa/mem")
        );
    }
}
