//! External command execution (git, nf-test).
//!
//! run_command: synchronous wrapper creating a temporary Tokio runtime
//! run_command_async: spawn + capture stdout/stderr
//! split_command_line: shell-style splitting for user-configurable commands

use anyhow::{Context, Result, bail};
use shell_words::split as shell_split;
use std::path::Path;
use std::time::Instant;

/// Captured result of one external command.
#[derive(Debug, Clone, Default)]
pub struct CommandOutput {
    pub success: bool,
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    pub elapsed_ms: u128,
}

/// A program plus arguments to run in a working directory.
#[derive(Debug, Clone)]
pub struct CommandSpec<'a> {
    pub program: &'a str,
    pub args: Vec<String>,
    pub cwd: &'a Path,
    pub envs: Vec<(String, String)>,
}

impl<'a> CommandSpec<'a> {
    pub fn new(program: &'a str, cwd: &'a Path) -> Self {
        Self {
            program,
            args: Vec::new(),
            cwd,
            envs: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.envs.push((key.into(), value.into()));
        self
    }

    /// Command line for logs.
    pub fn display(&self) -> String {
        if self.args.is_empty() {
            self.program.to_string()
        } else {
            format!("{} {}", self.program, self.args.join(" "))
        }
    }
}

/// Synchronous convenience wrapper:
///   - Creates a temporary Tokio runtime
///   - Spawns the command with piped stdout/stderr
///   - Waits for it to exit (no timeout)
pub fn run_command(spec: &CommandSpec<'_>) -> Result<CommandOutput> {
    let rt = tokio::runtime::Runtime::new().context("Failed to create Tokio runtime")?;
    rt.block_on(run_command_async(spec))
}

pub async fn run_command_async(spec: &CommandSpec<'_>) -> Result<CommandOutput> {
    use tokio::process::Command;

    let started = Instant::now();
    tracing::debug!(command = %spec.display(), cwd = %spec.cwd.display(), "running");

    let output = Command::new(spec.program)
        .args(&spec.args)
        .current_dir(spec.cwd)
        .envs(spec.envs.iter().map(|(k, v)| (k.as_str(), v.as_str())))
        .stdin(std::process::Stdio::null())
        .output()
        .await
        .with_context(|| format!("Failed to spawn '{}'", spec.program))?;

    Ok(CommandOutput {
        success: output.status.success(),
        code: output.status.code(),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        elapsed_ms: started.elapsed().as_millis(),
    })
}

/// Split a user-supplied command line into program + leading arguments.
///
/// - "nf-test" -> ("nf-test", [])
/// - "java -jar \"/opt/nf test/nf-test.jar\"" -> ("java", ["-jar", "/opt/nf test/nf-test.jar"])
pub fn split_command_line(raw: &str) -> Result<(String, Vec<String>)> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        bail!("Command line is empty");
    }
    let parts = shell_split(trimmed).context("Failed to parse command line (shell splitting)")?;
    let Some((program, rest)) = parts.split_first() else {
        bail!("No tokens produced when parsing command line");
    };
    if program.is_empty() {
        bail!("Empty program name in command line");
    }
    Ok((program.clone(), rest.to_vec()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_simple() {
        let (p, a) = split_command_line("nf-test").unwrap();
        assert_eq!(p, "nf-test");
        assert!(a.is_empty());
    }

    #[test]
    fn split_quoted() {
        let (p, a) = split_command_line(r#"java -jar "/opt/nf test/nf-test.jar""#).unwrap();
        assert_eq!(p, "java");
        assert_eq!(a, vec!["-jar", "/opt/nf test/nf-test.jar"]);
    }

    #[test]
    fn split_empty_rejected() {
        let err = split_command_line("   ").unwrap_err();
        assert!(err.to_string().contains("empty"));
    }

    #[test]
    fn spec_display_joins_args() {
        let cwd = Path::new(".");
        let spec = CommandSpec::new("git", cwd).args(["pull", "--ff-only"]);
        assert_eq!(spec.display(), "git pull --ff-only");
    }

    #[cfg(unix)]
    #[test]
    fn run_captures_stdout_and_status() {
        let dir = tempfile::tempdir().unwrap();
        let spec = CommandSpec::new("sh", dir.path())
            .args(["-c", "echo \"$GREETING\"; exit 3"])
            .env("GREETING", "hello");
        let out = run_command(&spec).unwrap();
        assert!(!out.success);
        assert_eq!(out.code, Some(3));
        assert_eq!(out.stdout.trim(), "hello");
    }
}
