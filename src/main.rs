use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod cmd;
mod component;
mod error;
mod prompt;
mod registry;
mod repo;
mod snapshot;
mod utils;

use cmd::{InfoArgs, ListArgs, SnapshotArgs, Workspace};

/// nfc-info - inspect nf-core components and generate their nf-test snapshots.
///
/// Command layout:
///   nfc-info info     <modules|subworkflows> [NAME] [--local] [--json]
///   nfc-info list     <modules|subworkflows> [--local] [--json]
///   nfc-info snapshot <modules|subworkflows> [NAME] [--update] [--no-prompts] [--profile P]
///
/// Global flags / env:
///   -v / -vv           Increase verbosity (nf-test runs with --verbose --debug from -v)
///   -q / --quiet       Errors only
///   -g / --git-remote  Component registry (or NFC_GIT_REMOTE env)
///   -b / --branch      Registry branch
///   -N / --no-pull     Do not update the cached registry clone
///   -d / --dir         Working directory (pipeline or modules repository)
///
/// Examples:
///   nfc-info info modules fastqc
///   nfc-info info subworkflows --local
///   nfc-info -g git@gitlab.com:me/modules.git -b dev list modules
///   nfc-info snapshot modules bwa/mem --update --profile docker
#[derive(Parser, Debug)]
#[command(
    name = "nfc-info",
    version,
    author,
    about = "Inspect nf-core modules/subworkflows and generate nf-test snapshots",
    propagate_version = true,
    disable_help_subcommand = true
)]
pub struct Cli {
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Silence all non-error output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Remote registry to look components up in
    #[arg(
        short = 'g',
        long = "git-remote",
        env = "NFC_GIT_REMOTE",
        global = true,
        value_name = "URL"
    )]
    git_remote: Option<String>,

    /// Registry branch
    #[arg(short = 'b', long, global = true, value_name = "BRANCH")]
    branch: Option<String>,

    /// Reuse the cached registry clone without pulling
    #[arg(short = 'N', long = "no-pull", global = true)]
    no_pull: bool,

    /// Pipeline or modules repository to work in
    #[arg(short = 'd', long, global = true, value_name = "PATH", default_value = ".")]
    dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the metadata of one component
    Info(InfoArgs),

    /// List available or installed components
    List(ListArgs),

    /// Generate or update the nf-test snapshot of a component
    Snapshot(SnapshotArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = utils::derive_level(cli.verbose, cli.quiet);
    utils::init_logging(level)?;

    let ws = Workspace::new(
        &cli.dir,
        cli.git_remote.as_deref(),
        cli.branch.clone(),
        cli.no_pull,
        level,
    )?;

    match cli.command {
        Commands::Info(args) => cmd::execute_info(args, &ws),
        Commands::List(args) => cmd::execute_list(args, &ws),
        Commands::Snapshot(args) => cmd::execute_snapshot(args, &ws),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "nfc-info",
            "info",
            "modules",
            "fastqc",
            "-g",
            "https://gitlab.com/me/modules.git",
            "-b",
            "dev",
            "-N",
            "-vv",
        ])
        .unwrap();
        assert_eq!(
            cli.git_remote.as_deref(),
            Some("https://gitlab.com/me/modules.git")
        );
        assert_eq!(cli.branch.as_deref(), Some("dev"));
        assert!(cli.no_pull);
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.dir, PathBuf::from("."));
        assert!(matches!(cli.command, Commands::Info(_)));
    }

    #[test]
    fn snapshot_subcommand_parses() {
        let cli = Cli::try_parse_from([
            "nfc-info",
            "-d",
            "/tmp/modules",
            "snapshot",
            "subworkflows",
            "--no-prompts",
        ])
        .unwrap();
        assert_eq!(cli.dir, PathBuf::from("/tmp/modules"));
        let Commands::Snapshot(args) = cli.command else {
            panic!("expected snapshot");
        };
        assert!(args.no_prompts);
        assert!(args.name.is_none());
    }
}
