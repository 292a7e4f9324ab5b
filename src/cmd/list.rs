/*!
`list.rs`

Implements `nfc-info list <modules|subworkflows> [--local]`.

Sources:
  - default : every component the registry offers
  - --local : components installed in the pipeline (`modules.json`) or
              present in the modules clone

JSON Output Shape:
{
  "status": "ok",
  "kind": "modules",
  "source": "remote" | "local",
  "remote": "https://github.com/nf-core/modules.git",
  "count": 2,
  "components": ["bwa/mem", "fastqc"]
}
*/

use anyhow::Result;
use clap::Args;
use serde_json::json;

use crate::cmd::format::{
    Role, StyleOptions, TableOpts, box_header, color, emoji_prefix, table,
};
use crate::cmd::shared::Workspace;
use crate::component::kind::ComponentKind;
use crate::component::render::install_command_for;
use crate::component::resolve::local_candidates;
use crate::registry::RegistryRef;

/// CLI arguments for `nfc-info list <kind>`
#[derive(Args, Debug)]
pub struct ListArgs {
    /// Component kind (modules|subworkflows)
    pub kind: ComponentKind,

    /// List components of the working repository instead of the registry
    #[arg(short = 'l', long)]
    pub local: bool,

    /// Output JSON instead of human-readable text
    #[arg(long)]
    pub json: bool,
}

pub fn execute_list(args: ListArgs, ws: &Workspace) -> Result<()> {
    let names = if args.local {
        let repo = ws.detect_repo();
        let index = ws.load_index(repo.as_ref())?;
        local_candidates(args.kind, repo.as_ref(), index.as_ref(), &ws.remote)?
    } else {
        ws.open_registry()?.list_available(args.kind)?
    };

    if args.json {
        println!(
            "{}",
            json!({
                "status": "ok",
                "kind": args.kind,
                "source": if args.local { "local" } else { "remote" },
                "remote": ws.remote.url,
                "count": names.len(),
                "components": names,
            })
        );
        return Ok(());
    }

    let style = StyleOptions::detect();
    println!(
        "{}",
        format_listing(args.kind, &names, args.local, &ws.remote, &style)
    );
    Ok(())
}

fn format_listing(
    kind: ComponentKind,
    names: &[String],
    local: bool,
    remote: &RegistryRef,
    style: &StyleOptions,
) -> String {
    let source = if local {
        "installed locally".to_string()
    } else {
        format!("remote={remote}")
    };
    let mut out = box_header(
        format!(
            "{}{} ({})",
            emoji_prefix("list", style),
            kind_heading(kind),
            names.len()
        ),
        Some(source),
        style,
    );
    out.push('\n');

    if names.is_empty() {
        out.push_str(&color(
            Role::Dim,
            format!("{}(none)", emoji_prefix("info", style)),
            style,
        ));
        return out;
    }

    let rows: Vec<Vec<String>> = names
        .iter()
        .enumerate()
        .map(|(i, n)| vec![(i + 1).to_string(), n.clone()])
        .collect();
    out.push_str(&table(&["#", "NAME"], &rows, TableOpts::default(), style));

    out.push_str(&format!(
        "\n\n{}{}",
        emoji_prefix("info", style),
        color(
            Role::Dim,
            format!("Use `nfc-info info {kind} <name>` for details on a single {}", kind.singular()),
            style
        )
    ));
    if !local {
        out.push_str(&format!(
            "\n{}{}",
            emoji_prefix("wrench", style),
            color(
                Role::Dim,
                format!("Install with `{}`", install_command_for(kind, "<name>", remote)),
                style
            )
        ));
    }
    out
}

fn kind_heading(kind: ComponentKind) -> String {
    format!("{}s", kind.title())
}
