//! Descriptor loaders and the lookup orchestrator.
//!
//! load_local  - `meta.yml` from the working repository
//! load_remote - `meta.yml` from the registry
//! lookup      - local first when declared local, otherwise remote only
//!
//! Loaders report `Lookup::NotFound` for a missing component; `Err` is
//! reserved for hard failures (unreadable files, registry errors, an index
//! without entries for the active registry).

use anyhow::Result;
use std::path::PathBuf;
use tracing::{debug, instrument};

use super::descriptor::ComponentDescriptor;
use super::{LoadedComponent, Location, LookupContext};
use crate::error::ComponentError;
use crate::repo::RepoType;

/// Outcome of one loader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup<T> {
    Found(T),
    NotFound,
}

impl<T> Lookup<T> {
    pub fn found(self) -> Option<T> {
        match self {
            Lookup::Found(v) => Some(v),
            Lookup::NotFound => None,
        }
    }
}

/// Look for the component's `meta.yml` in the working repository.
#[instrument(skip(ctx), fields(kind = %ctx.kind))]
pub fn load_local(
    ctx: &LookupContext<'_>,
    name: &str,
) -> Result<Lookup<(ComponentDescriptor, PathBuf)>> {
    let Some(repo) = ctx.repo else {
        debug!("no local repository; skipping local lookup");
        return Ok(Lookup::NotFound);
    };

    let component_dir = match repo.repo_type {
        RepoType::Pipeline => {
            let remote = ctx.remote();
            let installed = ctx
                .index
                .and_then(|idx| idx.installed(ctx.kind, &remote.url))
                .ok_or_else(|| ComponentError::NotInstalledFromRegistry {
                    kind: ctx.kind,
                    remote: remote.url.clone(),
                })?;
            match installed.iter().find(|c| c.matches(name, &repo.org_path)) {
                Some(c) => repo.installed_dir(ctx.kind, c),
                None => {
                    debug!("'{name}' is not in the installed index");
                    return Ok(Lookup::NotFound);
                }
            }
        }
        RepoType::Modules => repo.component_dir(ctx.kind, name),
    };

    let meta = component_dir.join("meta.yml");
    if !meta.is_file() {
        debug!("{} '{name}' meta.yml not found locally", ctx.kind.title());
        return Ok(Lookup::NotFound);
    }
    debug!(path = %meta.display(), "found local file");
    let descriptor = ComponentDescriptor::from_path(&meta)?;
    Ok(Lookup::Found((descriptor, component_dir)))
}

/// Fetch the component's `meta.yml` from the registry.
///
/// `NotFound` when the registry does not list the component or has no
/// metadata file for it.
#[instrument(skip(ctx), fields(kind = %ctx.kind, remote = %ctx.remote()))]
pub fn load_remote(
    ctx: &LookupContext<'_>,
    name: &str,
) -> Result<Lookup<(ComponentDescriptor, String)>> {
    let available = ctx.registry.list_available(ctx.kind)?;
    if !available.iter().any(|a| a == name) {
        debug!("'{name}' not listed by the registry");
        return Ok(Lookup::NotFound);
    }
    let Some(text) = ctx.registry.fetch_metadata_text(ctx.kind, name)? else {
        debug!("registry has no meta.yml for '{name}'");
        return Ok(Lookup::NotFound);
    };
    let descriptor = ComponentDescriptor::from_yaml_str(&text)?;
    Ok(Lookup::Found((descriptor, ctx.remote().url.clone())))
}

/// Local loader first when `local`, then the remote loader; fails with
/// `ComponentNotFound` when neither produced a descriptor.
#[instrument(skip(ctx), fields(kind = %ctx.kind))]
pub fn lookup(ctx: &LookupContext<'_>, name: &str, local: bool) -> Result<LoadedComponent> {
    if local && let Some((descriptor, path)) = load_local(ctx, name)?.found() {
        return Ok(LoadedComponent {
            kind: ctx.kind,
            name: name.to_string(),
            descriptor,
            location: Location::LocalPath(path),
        });
    }

    match load_remote(ctx, name)? {
        Lookup::Found((descriptor, url)) => Ok(LoadedComponent {
            kind: ctx.kind,
            name: name.to_string(),
            descriptor,
            location: Location::RemoteLocation(url),
        }),
        Lookup::NotFound => Err(ComponentError::ComponentNotFound {
            kind: ctx.kind,
            name: name.to_string(),
        }
        .into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::kind::ComponentKind;
    use crate::registry::{Registry, RegistryRef};
    use crate::repo::RepoContext;
    use crate::repo::index::InstalledIndex;
    use std::collections::BTreeMap;
    use std::path::Path;

    /// In-memory registry: name -> optional meta.yml text.
    struct MemoryRegistry {
        reference: RegistryRef,
        entries: BTreeMap<String, Option<String>>,
    }

    impl MemoryRegistry {
        fn new(url: &str) -> Self {
            Self {
                reference: RegistryRef::new(url, None),
                entries: BTreeMap::new(),
            }
        }
        fn with(mut self, name: &str, meta: Option<&str>) -> Self {
            self.entries
                .insert(name.to_string(), meta.map(|m| m.to_string()));
            self
        }
    }

    impl Registry for MemoryRegistry {
        fn reference(&self) -> &RegistryRef {
            &self.reference
        }
        fn list_available(&self, _kind: ComponentKind) -> Result<Vec<String>> {
            Ok(self.entries.keys().cloned().collect())
        }
        fn fetch_metadata_text(&self, _kind: ComponentKind, name: &str) -> Result<Option<String>> {
            Ok(self.entries.get(name).cloned().flatten())
        }
    }

    const DEFAULT_URL: &str = "https://github.com/nf-core/modules.git";

    fn write(path: &Path, body: &str) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, body).unwrap();
    }

    fn pipeline_fixture() -> (tempfile::TempDir, RepoContext, InstalledIndex) {
        let dir = tempfile::tempdir().unwrap();
        write(
            &dir.path().join("subworkflows/nf-core/bam_stats/meta.yml"),
            "description: local stats\n",
        );
        write(
            &dir.path().join("subworkflows/myorg/custom_qc/meta.yml"),
            "description: custom qc\n",
        );
        let repo = RepoContext {
            root: dir.path().to_path_buf(),
            repo_type: RepoType::Pipeline,
            org_path: "nf-core".into(),
        };
        let index = InstalledIndex::from_json_str(&format!(
            r#"{{"repos":{{"{DEFAULT_URL}":{{"subworkflows":{{
                "nf-core":{{"bam_stats":{{}},"ghost":{{}}}},
                "myorg":{{"custom_qc":{{}}}}}}}}}}}}"#
        ))
        .unwrap();
        (dir, repo, index)
    }

    #[test]
    fn local_lookup_path_follows_install_dir() {
        let (_dir, repo, index) = pipeline_fixture();
        let reg = MemoryRegistry::new(DEFAULT_URL);
        let ctx = LookupContext {
            kind: ComponentKind::Subworkflows,
            repo: Some(&repo),
            index: Some(&index),
            registry: &reg,
        };
        for installed in index.installed(ctx.kind, DEFAULT_URL).unwrap() {
            if installed.name == "ghost" {
                continue;
            }
            let (_, path) = load_local(&ctx, &installed.name).unwrap().found().unwrap();
            assert_eq!(
                path,
                repo.kind_dir(ctx.kind)
                    .join(&installed.install_dir)
                    .join(&installed.name)
            );
        }
    }

    #[test]
    fn local_lookup_missing_meta_is_not_found() {
        let (_dir, repo, index) = pipeline_fixture();
        let reg = MemoryRegistry::new(DEFAULT_URL);
        let ctx = LookupContext {
            kind: ComponentKind::Subworkflows,
            repo: Some(&repo),
            index: Some(&index),
            registry: &reg,
        };
        assert_eq!(load_local(&ctx, "ghost").unwrap(), Lookup::NotFound);
        assert_eq!(load_local(&ctx, "never_installed").unwrap(), Lookup::NotFound);
    }

    #[test]
    fn local_lookup_without_registry_entries_is_hard_error() {
        let (_dir, repo, index) = pipeline_fixture();
        let reg = MemoryRegistry::new("https://example.org/other.git");
        let ctx = LookupContext {
            kind: ComponentKind::Subworkflows,
            repo: Some(&repo),
            index: Some(&index),
            registry: &reg,
        };
        let err = load_local(&ctx, "bam_stats").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ComponentError>(),
            Some(ComponentError::NotInstalledFromRegistry { .. })
        ));
    }

    #[test]
    fn modules_clone_lookup_by_name() {
        let dir = tempfile::tempdir().unwrap();
        write(
            &dir.path().join("modules/nf-core/bwa/mem/meta.yml"),
            "description: align\n",
        );
        let repo = RepoContext {
            root: dir.path().to_path_buf(),
            repo_type: RepoType::Modules,
            org_path: "nf-core".into(),
        };
        let reg = MemoryRegistry::new(DEFAULT_URL);
        let ctx = LookupContext {
            kind: ComponentKind::Modules,
            repo: Some(&repo),
            index: None,
            registry: &reg,
        };
        let loaded = lookup(&ctx, "bwa/mem", true).unwrap();
        assert_eq!(
            loaded.local_path(),
            Some(&dir.path().join("modules/nf-core/bwa/mem"))
        );
        assert!(loaded.remote_location().is_none());
    }

    #[test]
    fn remote_lookup_records_registry_url() {
        let reg = MemoryRegistry::new("https://gitlab.com/nf-core/modules-test.git")
            .with("fastqc", Some("description: qc\n"));
        let ctx = LookupContext {
            kind: ComponentKind::Subworkflows,
            repo: None,
            index: None,
            registry: &reg,
        };
        let loaded = lookup(&ctx, "fastqc", false).unwrap();
        assert_eq!(
            loaded.location,
            Location::RemoteLocation("https://gitlab.com/nf-core/modules-test.git".into())
        );
        assert_eq!(loaded.descriptor.description.as_deref(), Some("qc"));
    }

    #[test]
    fn remote_listed_without_meta_is_not_found() {
        let reg = MemoryRegistry::new(DEFAULT_URL).with("fastqc", None);
        let ctx = LookupContext {
            kind: ComponentKind::Modules,
            repo: None,
            index: None,
            registry: &reg,
        };
        assert_eq!(load_remote(&ctx, "fastqc").unwrap(), Lookup::NotFound);
    }

    #[test]
    fn local_miss_falls_through_to_remote() {
        let (_dir, repo, index) = pipeline_fixture();
        let reg = MemoryRegistry::new(DEFAULT_URL).with("ghost", Some("description: remote\n"));
        let ctx = LookupContext {
            kind: ComponentKind::Subworkflows,
            repo: Some(&repo),
            index: Some(&index),
            registry: &reg,
        };
        let loaded = lookup(&ctx, "ghost", true).unwrap();
        assert_eq!(loaded.remote_location(), Some(DEFAULT_URL));
    }

    #[test]
    fn not_declared_local_skips_local_tree() {
        let (_dir, repo, index) = pipeline_fixture();
        let reg = MemoryRegistry::new(DEFAULT_URL);
        let ctx = LookupContext {
            kind: ComponentKind::Subworkflows,
            repo: Some(&repo),
            index: Some(&index),
            registry: &reg,
        };
        let err = lookup(&ctx, "bam_stats", false).unwrap_err();
        match err.downcast_ref::<ComponentError>() {
            Some(ComponentError::ComponentNotFound { name, kind }) => {
                assert_eq!(name, "bam_stats");
                assert_eq!(*kind, ComponentKind::Subworkflows);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn absent_everywhere_names_requested_component() {
        let reg = MemoryRegistry::new(DEFAULT_URL).with("fastqc", Some(""));
        let ctx = LookupContext {
            kind: ComponentKind::Modules,
            repo: None,
            index: None,
            registry: &reg,
        };
        let err = lookup(&ctx, "fastp", true).unwrap_err();
        assert_eq!(err.to_string(), "Could not find module 'fastp'");
    }
}
