//! nf-test snapshot generation for a component's test suite.
//!
//! Flow (SnapshotGenerator::run):
//!   1. resolve the component name (prompting unless --no-prompts)
//!   2. locate `<kind>/<org>/<name>/tests/main.nf.test`
//!   3. pick the nf-test profile (flag / PROFILE env / prompt)
//!   4. run nf-test (updating when asked), then run again to check stability
//!   5. offer to clean obsolete snapshots
//!   6. validate the resulting `main.nf.test.snap`

pub mod file;
pub mod runner;

use anyhow::{Context, Result, bail};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument, warn};

use crate::component::kind::ComponentKind;
use crate::component::resolve::local_candidates;
use crate::error::ComponentError;
use crate::prompt::{Prompter, select_valid};
use crate::registry::RegistryRef;
use crate::repo::index::InstalledIndex;
use crate::repo::{RepoContext, RepoType};
use file::{SNAPSHOT_FILE, SnapshotFile};
use runner::{Invocation, RunReport, TestRunner};

pub const TEST_FILE: &str = "main.nf.test";
pub const PROFILES: &[&str] = &["docker", "singularity", "conda"];

#[derive(Debug, Clone)]
pub struct SnapshotOptions {
    pub kind: ComponentKind,
    pub name: Option<String>,
    pub update: bool,
    pub no_prompts: bool,
    pub profile: Option<String>,
    pub verbose: bool,
}

#[derive(Debug, Clone)]
pub struct SnapshotOutcome {
    pub name: String,
    pub path: PathBuf,
    pub snapshot: SnapshotFile,
    pub previous: Option<SnapshotFile>,
    pub stability_checked: bool,
    pub obsolete_cleaned: bool,
}

pub struct SnapshotGenerator<'a> {
    repo: &'a RepoContext,
    index: Option<&'a InstalledIndex>,
    remote: &'a RegistryRef,
    runner: &'a mut dyn TestRunner,
    prompter: &'a mut dyn Prompter,
}

impl<'a> SnapshotGenerator<'a> {
    pub fn new(
        repo: &'a RepoContext,
        index: Option<&'a InstalledIndex>,
        remote: &'a RegistryRef,
        runner: &'a mut dyn TestRunner,
        prompter: &'a mut dyn Prompter,
    ) -> Self {
        Self {
            repo,
            index,
            remote,
            runner,
            prompter,
        }
    }

    #[instrument(skip(self), fields(kind = %opts.kind))]
    pub fn run(&mut self, opts: &SnapshotOptions) -> Result<SnapshotOutcome> {
        let kind = opts.kind;
        let name = self.resolve_name(opts)?;

        let (component_dir, test_name) = self.locate(kind, &name);
        if !component_dir.is_dir() {
            return Err(ComponentError::ComponentDirNotFound {
                kind,
                name,
                path: component_dir,
            }
            .into());
        }
        let tests_dir = component_dir.join("tests");
        let test_file = tests_dir.join(TEST_FILE);
        if !test_file.is_file() {
            return Err(ComponentError::TestFileNotFound {
                kind,
                name,
                path: test_file,
            }
            .into());
        }

        let profile = self.resolve_profile(opts)?;
        let snap_path = tests_dir.join(SNAPSHOT_FILE);
        let previous = SnapshotFile::load_if_exists(&snap_path)?;
        let original = read_if_exists(&snap_path)?;

        let mut invocation = Invocation {
            workdir: self.repo.root.clone(),
            tag: kind.test_tag(&test_name),
            profile,
            update: opts.update,
            clean: false,
            verbose: opts.verbose,
        };

        info!("Generating nf-test snapshot");
        let first = self.runner.run(&invocation)?;
        log_report(&first);
        check_run(&first, kind, &name, &test_file, false)?;
        let mut obsolete = first.obsolete_snapshots().unwrap_or(0);

        // The re-run must reproduce the snapshot without rewriting it.
        invocation.update = false;
        let stability_checked = opts.no_prompts
            || self.prompter.confirm(
                "nf-test snapshot is generated. Do you want to run it again to check stability?",
                true,
            )?;
        if stability_checked {
            info!("Generating nf-test snapshot again to check stability");
            let second = self.runner.run(&invocation).and_then(|second| {
                log_report(&second);
                check_run(&second, kind, &name, &test_file, true)?;
                Ok(second)
            });
            let second = match second {
                Ok(second) => second,
                Err(e) => {
                    if let Err(restore_err) = restore_snapshot(&snap_path, original.as_deref()) {
                        warn!("could not restore {}: {restore_err:#}", snap_path.display());
                    }
                    return Err(e);
                }
            };
            obsolete = obsolete.max(second.obsolete_snapshots().unwrap_or(0));
        } else {
            info!("Snapshot not checked for stability.");
        }

        let mut obsolete_cleaned = false;
        if obsolete > 0 {
            let remove = opts.no_prompts
                || self.prompter.confirm(
                    "nf-test found obsolete snapshots. Do you want to remove them?",
                    true,
                )?;
            if remove {
                info!(obsolete, "Removing obsolete snapshots");
                invocation.clean = true;
                let cleaned = self.runner.run(&invocation)?;
                log_report(&cleaned);
                obsolete_cleaned = cleaned.exit_ok;
            } else {
                debug!("Obsolete snapshots not removed");
            }
        }

        let snapshot = SnapshotFile::load_if_exists(&snap_path)?.ok_or_else(|| {
            ComponentError::InvalidSnapshot {
                path: snap_path.clone(),
                reason: "nf-test did not write a snapshot".into(),
            }
        })?;
        if kind == ComponentKind::Modules && !snapshot.has_versions_content() {
            return Err(ComponentError::MissingVersions {
                name,
                path: snap_path,
            }
            .into());
        }
        if opts.update
            && let Some(prev) = &previous
            && !snapshot.timestamps_changed_since(prev)
        {
            return Err(ComponentError::SnapshotNotUpdated {
                kind,
                name,
                path: snap_path,
            }
            .into());
        }

        if let Some(prev) = &previous
            && snapshot.same_content(prev)
        {
            debug!("snapshot content unchanged");
        }

        info!("All tests passed!");
        Ok(SnapshotOutcome {
            name,
            path: snap_path,
            snapshot,
            previous,
            stability_checked,
            obsolete_cleaned,
        })
    }

    /// Component directory plus the name its tests are tagged with. Pipelines
    /// resolve through the installed index, so `<install_dir>/<name>` picks
    /// the right install directory.
    fn locate(&self, kind: ComponentKind, name: &str) -> (PathBuf, String) {
        if self.repo.repo_type == RepoType::Pipeline
            && let Some(installed) = self
                .index
                .and_then(|idx| idx.installed(kind, &self.remote.url))
            && let Some(c) = installed
                .iter()
                .find(|c| c.matches(name, &self.repo.org_path))
        {
            debug!(install_dir = %c.install_dir, "'{name}' found in the installed index");
            return (self.repo.installed_dir(kind, c), c.name.clone());
        }
        (self.repo.component_dir(kind, name), name.to_string())
    }

    fn resolve_name(&mut self, opts: &SnapshotOptions) -> Result<String> {
        if let Some(name) = opts
            .name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
        {
            return Ok(name.to_string());
        }
        if opts.no_prompts {
            bail!(
                "a {} name is required when prompts are disabled",
                opts.kind.singular()
            );
        }
        let candidates = local_candidates(opts.kind, Some(self.repo), self.index, self.remote)?;
        let label = opts.kind.singular();
        select_valid(
            &mut *self.prompter,
            label,
            &format!("Tool name ({label}):"),
            &format!("Please select a new {label}"),
            &candidates,
        )
    }

    fn resolve_profile(&mut self, opts: &SnapshotOptions) -> Result<String> {
        if let Some(p) = opts
            .profile
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
        {
            if !PROFILES.contains(&p) {
                warn!("profile '{p}' is not one of {}", PROFILES.join(", "));
            }
            return Ok(p.to_string());
        }
        if opts.no_prompts {
            return Err(ComponentError::ProfileNotSet.into());
        }
        let options: Vec<String> = PROFILES.iter().map(|p| p.to_string()).collect();
        select_valid(
            &mut *self.prompter,
            "profile",
            "Choose software profile",
            "Please choose a valid profile",
            &options,
        )
    }
}

fn read_if_exists(path: &Path) -> Result<Option<Vec<u8>>> {
    match fs::read(path) {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e).with_context(|| format!("failed to read {}", path.display())),
    }
}

/// Put the snapshot back the way it was before nf-test ran; remove it when
/// there was none.
fn restore_snapshot(path: &Path, original: Option<&[u8]>) -> Result<()> {
    match original {
        Some(bytes) => fs::write(path, bytes)
            .with_context(|| format!("failed to write {}", path.display()))?,
        None if path.exists() => fs::remove_file(path)
            .with_context(|| format!("failed to remove {}", path.display()))?,
        None => {}
    }
    debug!("restored {}", path.display());
    Ok(())
}

fn log_report(report: &RunReport) {
    for line in report.stdout.lines() {
        debug!(target: "nf-test", "{line}");
    }
    if !report.stderr.trim().is_empty() {
        debug!(target: "nf-test", stderr = %report.stderr.trim());
    }
}

/// Map a run report to the matching failure condition.
fn check_run(
    report: &RunReport,
    kind: ComponentKind,
    name: &str,
    test_file: &Path,
    stability_run: bool,
) -> Result<()> {
    if report.no_tests_found() {
        return Err(ComponentError::TestFileNotFound {
            kind,
            name: name.to_string(),
            path: test_file.to_path_buf(),
        }
        .into());
    }
    if report.succeeded() {
        return Ok(());
    }
    let name = name.to_string();
    if stability_run {
        Err(ComponentError::UnstableSnapshot { kind, name }.into())
    } else {
        Err(ComponentError::TestRunFailed { kind, name }.into())
    }
}
