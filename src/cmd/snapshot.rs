/*!
`snapshot.rs`

Implements `nfc-info snapshot <modules|subworkflows> [NAME]`: generate (or
update) the nf-test snapshot of one component and check that it is stable.

Flags:
  --update        rewrite an existing snapshot (`--update-snapshot`)
  --no-prompts    never ask; re-runs and obsolete cleanup happen automatically
  --profile P     nf-test profile (docker|singularity|conda), env PROFILE

The nf-test command line can be overridden with NFC_NFTEST, e.g.
`NFC_NFTEST="java -jar /opt/nf-test.jar"`.
*/

use anyhow::Result;
use clap::Args;

use crate::cmd::format::{
    Role, StyleOptions, TableOpts, box_header, color, emoji_prefix, table,
};
use crate::cmd::shared::Workspace;
use crate::component::kind::ComponentKind;
use crate::prompt::InquirePrompter;
use crate::snapshot::runner::NfTestRunner;
use crate::snapshot::{SnapshotGenerator, SnapshotOptions, SnapshotOutcome};

#[derive(Args, Debug)]
pub struct SnapshotArgs {
    /// Component kind (modules|subworkflows)
    pub kind: ComponentKind,

    /// Component name, e.g. `fastqc` or `bwa/mem`. Prompted for when omitted.
    #[arg(value_name = "NAME")]
    pub name: Option<String>,

    /// Update an existing snapshot
    #[arg(short = 'u', long)]
    pub update: bool,

    /// Run without interactive prompts
    #[arg(long)]
    pub no_prompts: bool,

    /// nf-test profile to run with
    #[arg(short = 'p', long, env = "PROFILE", value_name = "PROFILE")]
    pub profile: Option<String>,
}

pub fn execute_snapshot(args: SnapshotArgs, ws: &Workspace) -> Result<()> {
    let repo = ws.require_repo()?;
    let index = ws.load_index(Some(&repo))?;
    let mut runner = NfTestRunner::from_env()?;
    let mut prompter = InquirePrompter;

    let opts = SnapshotOptions {
        kind: args.kind,
        name: args.name,
        update: args.update,
        no_prompts: args.no_prompts,
        profile: args.profile,
        verbose: ws.level.is_debug(),
    };
    let outcome = SnapshotGenerator::new(
        &repo,
        index.as_ref(),
        &ws.remote,
        &mut runner,
        &mut prompter,
    )
    .run(&opts)?;

    let style = StyleOptions::detect();
    println!("{}", format_outcome(args.kind, &outcome, &style));
    Ok(())
}

fn format_outcome(kind: ComponentKind, outcome: &SnapshotOutcome, style: &StyleOptions) -> String {
    let verb = if outcome.previous.is_some() {
        "updated"
    } else {
        "created"
    };
    let mut out = box_header(
        format!(
            "{}{} {}: snapshot {verb}",
            emoji_prefix("success", style),
            kind.title(),
            outcome.name
        ),
        Some(outcome.path.display().to_string()),
        style,
    );
    out.push('\n');

    let rows: Vec<Vec<String>> = outcome
        .snapshot
        .entries
        .iter()
        .map(|(test, entry)| {
            vec![
                test.clone(),
                entry.content.len().to_string(),
                entry.timestamp.clone().unwrap_or_else(|| "-".into()),
            ]
        })
        .collect();
    out.push_str(&table(
        &["TEST", "ITEMS", "TIMESTAMP"],
        &rows,
        TableOpts::default(),
        style,
    ));
    out.push_str("\n\n");

    let stability = if outcome.stability_checked {
        color(Role::Success, "stable across two runs", style)
    } else {
        color(Role::Warning, "stability not checked", style)
    };
    out.push_str(&format!("{}{stability}", emoji_prefix("clock", style)));
    if outcome.obsolete_cleaned {
        out.push_str(&format!(
            "\n{}{}",
            emoji_prefix("info", style),
            color(Role::Dim, "obsolete snapshots removed", style)
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::file::{SnapshotEntry, SnapshotFile};
    use clap::Parser;
    use std::collections::BTreeMap;
    use std::path::PathBuf;

    #[derive(Parser, Debug)]
    struct TestCli {
        #[command(subcommand)]
        cmd: TestSub,
    }

    #[derive(clap::Subcommand, Debug)]
    enum TestSub {
        Snapshot(SnapshotArgs),
    }

    #[test]
    fn clap_parses_snapshot_flags() {
        let cli = TestCli::try_parse_from([
            "t",
            "snapshot",
            "modules",
            "bwa/mem",
            "--update",
            "--no-prompts",
            "--profile",
            "conda",
        ])
        .unwrap();
        let TestSub::Snapshot(a) = cli.cmd;
        assert_eq!(a.kind, ComponentKind::Modules);
        assert_eq!(a.name.as_deref(), Some("bwa/mem"));
        assert!(a.update && a.no_prompts);
        assert_eq!(a.profile.as_deref(), Some("conda"));
    }

    fn outcome(previous: bool) -> SnapshotOutcome {
        let mut entries = BTreeMap::new();
        entries.insert(
            "versions".to_string(),
            SnapshotEntry {
                content: vec![serde_json::json!(["versions.yml:md5,e1cc25ca"])],
                meta: None,
                timestamp: Some("2024-05-01T00:00:01.000000000".into()),
            },
        );
        let snapshot = SnapshotFile { entries };
        SnapshotOutcome {
            name: "fastqc".into(),
            path: PathBuf::from("modules/nf-core/fastqc/tests/main.nf.test.snap"),
            previous: previous.then(|| snapshot.clone()),
            snapshot,
            stability_checked: true,
            obsolete_cleaned: previous,
        }
    }

    #[test]
    fn created_summary() {
        let out = format_outcome(ComponentKind::Modules, &outcome(false), &StyleOptions::plain(120));
        assert!(out.contains("Module fastqc: snapshot created"));
        assert!(out.contains("main.nf.test.snap"));
        assert!(out.contains("2024-05-01T00:00:01.000000000"));
        assert!(out.contains("stable across two runs"));
        assert!(!out.contains("obsolete"));
    }

    #[test]
    fn updated_summary_mentions_cleanup() {
        let out = format_outcome(ComponentKind::Modules, &outcome(true), &StyleOptions::plain(120));
        assert!(out.contains("snapshot updated"));
        assert!(out.contains("obsolete snapshots removed"));
    }
}
