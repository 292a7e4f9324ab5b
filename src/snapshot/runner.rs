//! nf-test invocation and output analysis.

use anyhow::Result;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use crate::utils::process::{CommandSpec, run_command, split_command_line};

/// Environment variable overriding the nf-test command line.
pub const NFTEST_ENV: &str = "NFC_NFTEST";
const DEFAULT_NFTEST: &str = "nf-test";

/// Arguments for one `nf-test test` run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub workdir: PathBuf,
    pub tag: String,
    pub profile: String,
    pub update: bool,
    pub clean: bool,
    pub verbose: bool,
}

impl Invocation {
    pub fn args(&self) -> Vec<String> {
        let mut args = vec![
            "test".to_string(),
            "--tag".to_string(),
            self.tag.clone(),
            "--profile".to_string(),
            self.profile.clone(),
        ];
        if self.verbose {
            args.push("--verbose".into());
            args.push("--debug".into());
        }
        if self.update {
            args.push("--update-snapshot".into());
        }
        if self.clean {
            args.push("--clean-snapshot".into());
        }
        args
    }
}

/// Captured output of one run.
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    pub exit_ok: bool,
    pub stdout: String,
    pub stderr: String,
}

impl RunReport {
    pub fn assertion_failed(&self) -> bool {
        self.stdout.contains("Assertion failed:")
    }

    pub fn no_tests_found(&self) -> bool {
        self.stdout.contains("no valid tests found.")
    }

    /// Number of obsolete snapshots reported in the snapshot summary.
    pub fn obsolete_snapshots(&self) -> Option<usize> {
        static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
        let re = PATTERN
            .get_or_init(|| Regex::new(r"(?s)Snapshot Summary:.*?(\d+)\s+obsolete").ok())
            .as_ref()?;
        re.captures(&self.stdout)
            .and_then(|c| c.get(1))
            .and_then(|m| m.as_str().parse().ok())
    }

    pub fn succeeded(&self) -> bool {
        self.exit_ok && !self.assertion_failed() && !self.no_tests_found()
    }
}

/// Executes nf-test; swapped for a fake in tests.
pub trait TestRunner {
    fn run(&mut self, invocation: &Invocation) -> Result<RunReport>;
}

/// Runs the real nf-test binary.
#[derive(Debug, Clone)]
pub struct NfTestRunner {
    program: String,
    leading_args: Vec<String>,
}

impl NfTestRunner {
    /// Command line from `NFC_NFTEST`, falling back to `nf-test` on PATH.
    pub fn from_env() -> Result<Self> {
        let raw = std::env::var(NFTEST_ENV)
            .ok()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_NFTEST.to_string());
        Self::from_command_line(&raw)
    }

    pub fn from_command_line(raw: &str) -> Result<Self> {
        let (program, leading_args) = split_command_line(raw)?;
        Ok(Self {
            program,
            leading_args,
        })
    }

    fn spec<'a>(&'a self, invocation: &Invocation, cwd: &'a Path) -> CommandSpec<'a> {
        CommandSpec::new(&self.program, cwd)
            .args(self.leading_args.iter().cloned())
            .args(invocation.args())
            .env("NFT_DIFF", "pdiff")
            .env("NFT_DIFF_ARGS", "--line-numbers --expand-tabs=2")
    }
}

impl TestRunner for NfTestRunner {
    fn run(&mut self, invocation: &Invocation) -> Result<RunReport> {
        let spec = self.spec(invocation, &invocation.workdir);
        let out = run_command(&spec)?;
        tracing::debug!(elapsed_ms = out.elapsed_ms, code = ?out.code, "nf-test finished");
        Ok(RunReport {
            exit_ok: out.success,
            stdout: out.stdout,
            stderr: out.stderr,
        })
    }
}
