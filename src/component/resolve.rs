//! Name resolution: ensure a concrete component name before any lookup.

use anyhow::Result;

use super::LookupContext;
use super::kind::ComponentKind;
use crate::error::ComponentError;
use crate::prompt::{Prompter, select_valid};
use crate::registry::RegistryRef;
use crate::repo::index::InstalledIndex;
use crate::repo::{RepoContext, RepoType, components_in_tree};

/// What the caller supplied.
#[derive(Debug, Clone, Default)]
pub struct NameRequest {
    pub name: Option<String>,
    /// `Some(true)` when the caller declared the component locally installed.
    pub local: Option<bool>,
}

/// A concrete name plus whether local lookup should be attempted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedName {
    pub name: String,
    pub local: bool,
}

/// Resolve `request` into a concrete name, prompting when no name was given.
pub fn resolve_name(
    ctx: &LookupContext<'_>,
    request: NameRequest,
    prompter: &mut dyn Prompter,
) -> Result<ResolvedName> {
    if let Some(name) = request.name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty()) {
        return Ok(ResolvedName {
            name,
            local: request.local.unwrap_or(false),
        });
    }

    let label = ctx.kind.singular();
    let local = match request.local {
        Some(l) => l,
        None => prompter.confirm(&format!("Is the {label} locally installed?"), false)?,
    };

    let candidates = if local {
        local_candidates(ctx.kind, ctx.repo, ctx.index, ctx.remote())?
    } else {
        ctx.registry.list_available(ctx.kind)?
    };
    tracing::debug!(count = candidates.len(), local, "selection candidates");

    let name = select_valid(
        prompter,
        label,
        &format!("Please select a {label}"),
        &format!("Please select a new {label}"),
        &candidates,
    )?;
    Ok(ResolvedName { name, local })
}

/// Component names installed in (pipeline) or present in (modules clone) the
/// working repository.
pub fn local_candidates(
    kind: ComponentKind,
    repo: Option<&RepoContext>,
    index: Option<&InstalledIndex>,
    remote: &RegistryRef,
) -> Result<Vec<String>> {
    let Some(repo) = repo else {
        return Err(ComponentError::RepoType {
            path: std::path::PathBuf::from("."),
            reason: "not inside a pipeline or modules repository".into(),
        }
        .into());
    };
    match repo.repo_type {
        RepoType::Modules => components_in_tree(&repo.org_dir(kind)),
        RepoType::Pipeline => {
            let installed = index
                .and_then(|idx| idx.installed(kind, &remote.url))
                .ok_or_else(|| ComponentError::NotInstalledFromRegistry {
                    kind,
                    remote: remote.url.clone(),
                })?;
            Ok(installed
                .iter()
                .map(|c| c.display_name(&repo.org_path))
                .collect())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::ScriptedPrompter;
    use crate::registry::{CheckoutRegistry, Registry};
    use std::path::Path;

    struct ListingRegistry {
        reference: RegistryRef,
        names: Vec<String>,
    }

    impl Registry for ListingRegistry {
        fn reference(&self) -> &RegistryRef {
            &self.reference
        }
        fn list_available(&self, _kind: ComponentKind) -> Result<Vec<String>> {
            Ok(self.names.clone())
        }
        fn fetch_metadata_text(&self, _k: ComponentKind, _n: &str) -> Result<Option<String>> {
            Ok(None)
        }
    }

    fn listing(names: &[&str]) -> ListingRegistry {
        ListingRegistry {
            reference: RegistryRef::default(),
            names: names.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn pipeline(root: &Path) -> RepoContext {
        RepoContext {
            root: root.to_path_buf(),
            repo_type: RepoType::Pipeline,
            org_path: "nf-core".into(),
        }
    }

    #[test]
    fn explicit_name_needs_no_prompt() {
        let reg = listing(&[]);
        let ctx = LookupContext {
            kind: ComponentKind::Subworkflows,
            repo: None,
            index: None,
            registry: &reg,
        };
        let mut p = ScriptedPrompter::new();
        let r = resolve_name(
            &ctx,
            NameRequest {
                name: Some(" fastqc ".into()),
                local: None,
            },
            &mut p,
        )
        .unwrap();
        assert_eq!(
            r,
            ResolvedName {
                name: "fastqc".into(),
                local: false
            }
        );
        assert!(p.asked.is_empty());
    }

    #[test]
    fn remote_selection_uses_registry_listing() {
        let reg = listing(&["fastqc", "fastp"]);
        let ctx = LookupContext {
            kind: ComponentKind::Subworkflows,
            repo: None,
            index: None,
            registry: &reg,
        };
        let mut p = ScriptedPrompter::new()
            .confirm_with(false)
            .answer_with("fastqx")
            .answer_with("fastp");
        let r = resolve_name(&ctx, NameRequest::default(), &mut p).unwrap();
        assert_eq!(r.name, "fastp");
        assert!(!r.local);
        assert_eq!(p.asked[0], "Is the subworkflow locally installed?");
        assert_eq!(p.asked[2], "Please select a new subworkflow");
    }

    #[test]
    fn local_pipeline_selection_uses_index_names() {
        let dir = tempfile::tempdir().unwrap();
        let repo = pipeline(dir.path());
        let index = InstalledIndex::from_json_str(
            r#"{"repos":{"https://github.com/nf-core/modules.git":{"subworkflows":{
                "nf-core":{"bam_stats":{}},"myorg":{"custom":{}}}}}}"#,
        )
        .unwrap();
        let reg = listing(&[]);
        let ctx = LookupContext {
            kind: ComponentKind::Subworkflows,
            repo: Some(&repo),
            index: Some(&index),
            registry: &reg,
        };
        let mut p = ScriptedPrompter::new().confirm_with(true).answer_with("myorg/custom");
        let r = resolve_name(&ctx, NameRequest::default(), &mut p).unwrap();
        assert_eq!(r.name, "myorg/custom");
        assert!(r.local);
    }

    #[test]
    fn local_pipeline_without_registry_entries_fails() {
        let dir = tempfile::tempdir().unwrap();
        let repo = pipeline(dir.path());
        let index = InstalledIndex::from_json_str(r#"{"repos":{}}"#).unwrap();
        let err = local_candidates(
            ComponentKind::Subworkflows,
            Some(&repo),
            Some(&index),
            &RegistryRef::default(),
        )
        .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ComponentError>(),
            Some(ComponentError::NotInstalledFromRegistry { .. })
        ));
    }

    #[test]
    fn local_modules_clone_walks_tree() {
        let dir = tempfile::tempdir().unwrap();
        let main = dir.path().join("subworkflows/nf-core/bam_stats/main.nf");
        std::fs::create_dir_all(main.parent().unwrap()).unwrap();
        std::fs::write(&main, "").unwrap();
        let repo = RepoContext {
            root: dir.path().to_path_buf(),
            repo_type: RepoType::Modules,
            org_path: "nf-core".into(),
        };
        let reg = CheckoutRegistry::open(dir.path().to_path_buf(), RegistryRef::default()).unwrap();
        let ctx = LookupContext {
            kind: ComponentKind::Subworkflows,
            repo: Some(&repo),
            index: None,
            registry: &reg,
        };
        let mut p = ScriptedPrompter::new().answer_with("bam_stats");
        let r = resolve_name(
            &ctx,
            NameRequest {
                name: None,
                local: Some(true),
            },
            &mut p,
        )
        .unwrap();
        assert_eq!(r.name, "bam_stats");
        assert_eq!(p.asked, vec!["Please select a subworkflow"]);
    }
}
