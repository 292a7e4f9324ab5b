/*!
`info.rs`

Implements `nfc-info info <modules|subworkflows> [NAME]`.

Flow:
  1. resolve the component name (prompt when NAME is omitted)
  2. look up `meta.yml`: locally when declared local, otherwise in the registry
  3. render to display blocks and write them to the terminal (or JSON)

JSON Output Shape:
{
  "status": "ok",
  "kind": "modules",
  "name": "fastqc",
  "local_path": "/path/to/modules/nf-core/fastqc",      (local hits)
  "remote_location": "https://github.com/nf-core/modules.git",  (remote hits)
  "install_command": "nf-core modules install fastqc",  (remote hits)
  "installed": { "install_dir": "nf-core", "git_sha": "...", ... }, (pipelines)
  "descriptor": { "description": "...", "tools": [...], "inputs": [...], "outputs": [...] }
}
*/

use anyhow::Result;
use clap::Args;
use serde_json::{Value, json};

use crate::cmd::format::{
    Align, Role, StyleOptions, TableOpts, color, emoji_prefix, hyperlink, inline_markdown, panel,
    table,
};
use crate::cmd::shared::Workspace;
use crate::component::kind::ComponentKind;
use crate::component::lookup::lookup;
use crate::component::render::{
    Block, Direction, Document, FieldTable, Intro, LocationLine, install_command, render,
};
use crate::component::resolve::{NameRequest, resolve_name};
use crate::component::{LoadedComponent, LookupContext};
use crate::prompt::{InquirePrompter, Prompter};
use crate::repo::RepoContext;
use crate::repo::index::InstalledIndex;

/// CLI arguments for `nfc-info info <kind> [NAME]`
#[derive(Args, Debug)]
pub struct InfoArgs {
    /// Component kind (modules|subworkflows)
    pub kind: ComponentKind,

    /// Component name, e.g. `fastqc` or `bwa/mem`. Prompted for when omitted.
    #[arg(value_name = "NAME")]
    pub name: Option<String>,

    /// The component is installed in the working repository; read it from disk
    #[arg(short = 'l', long)]
    pub local: bool,

    /// Output JSON instead of the styled document
    #[arg(long)]
    pub json: bool,
}

pub fn execute_info(args: InfoArgs, ws: &Workspace) -> Result<()> {
    let repo = ws.detect_repo();
    let index = ws.load_index(repo.as_ref())?;
    let registry = ws.open_registry()?;
    let ctx = LookupContext {
        kind: args.kind,
        repo: repo.as_ref(),
        index: index.as_ref(),
        registry: registry.as_ref(),
    };

    let mut prompter = InquirePrompter;
    let component = load_component(&ctx, args.name, args.local, &mut prompter)?;

    if args.json {
        let value = info_json(&component, repo.as_ref(), index.as_ref(), &ctx);
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    let style = StyleOptions::detect();
    println!("{}", format_document(&render(&component), &style));
    Ok(())
}

/// Resolve the name then run the lookup.
fn load_component(
    ctx: &LookupContext<'_>,
    name: Option<String>,
    local: bool,
    prompter: &mut dyn Prompter,
) -> Result<LoadedComponent> {
    let request = NameRequest {
        name,
        local: local.then_some(true),
    };
    let resolved = resolve_name(ctx, request, prompter)?;
    tracing::debug!(name = %resolved.name, local = resolved.local, "resolved component name");
    lookup(ctx, &resolved.name, resolved.local)
}

fn info_json(
    component: &LoadedComponent,
    repo: Option<&RepoContext>,
    index: Option<&InstalledIndex>,
    ctx: &LookupContext<'_>,
) -> Value {
    let mut out = json!({
        "status": "ok",
        "kind": component.kind,
        "name": component.name,
        "descriptor": component.descriptor,
    });
    if let Some(path) = component.local_path() {
        out["local_path"] = json!(path.display().to_string());
    }
    if let Some(url) = component.remote_location() {
        out["remote_location"] = json!(url);
        out["install_command"] = json!(install_command(component.kind, &component.name, url));
    }
    if let (Some(repo), Some(index)) = (repo, index)
        && let Some(installed) = index.installed(component.kind, &ctx.remote().url)
        && let Some(hit) = installed
            .iter()
            .find(|c| c.matches(&component.name, &repo.org_path))
    {
        let record = index.record(component.kind, &ctx.remote().url, hit);
        out["installed"] = json!({
            "install_dir": hit.install_dir,
            "branch": record.and_then(|r| r.branch.clone()),
            "git_sha": record.and_then(|r| r.git_sha.clone()),
            "installed_by": record.map(|r| r.installed_by.clone()).unwrap_or_default(),
        });
    }
    out
}

/* -------------------------------------------------------------------------- */
/* Terminal writer                                                            */
/* -------------------------------------------------------------------------- */

/// Turn display blocks into styled terminal text.
pub fn format_document(doc: &Document, style: &StyleOptions) -> String {
    let mut sections: Vec<String> = Vec::with_capacity(doc.blocks.len());
    for block in &doc.blocks {
        sections.push(match block {
            Block::Intro(intro) => format_intro(intro, style),
            Block::Fields(t) => format_fields(t, style),
            Block::InstallCommand(cmd) => format!(
                "{}{}\n  {} {}",
                emoji_prefix("wrench", style),
                color(Role::Bold, "Install", style),
                color(Role::Dim, "$", style),
                color(Role::Accent, cmd, style)
            ),
        });
    }
    sections.join("\n\n")
}

fn format_intro(intro: &Intro, style: &StyleOptions) -> String {
    let mut lines: Vec<String> = Vec::new();
    match &intro.location {
        Some(LocationLine::Path(p)) => lines.push(format!(
            "{}{} {}",
            emoji_prefix("computer", style),
            color(Role::Bold, "Location:", style),
            p.display()
        )),
        Some(LocationLine::Repository { location, link }) => {
            let shown = if *link {
                hyperlink(location, location, style)
            } else {
                location.clone()
            };
            lines.push(format!(
                "{}{} {shown}",
                emoji_prefix("globe", style),
                color(Role::Bold, "Repository:", style)
            ));
        }
        None => {}
    }
    if !intro.tools.is_empty() {
        let tools = intro
            .tools
            .iter()
            .map(|t| match &t.homepage {
                Some(url) => hyperlink(url, &t.name, style),
                None => t.name.clone(),
            })
            .collect::<Vec<_>>()
            .join(", ");
        lines.push(format!(
            "{}{} {tools}",
            emoji_prefix("tool", style),
            color(Role::Bold, "Tools:", style)
        ));
    }
    if let Some(desc) = &intro.description {
        if !lines.is_empty() {
            lines.push(String::new());
        }
        lines.extend(
            desc.lines()
                .map(|l| inline_markdown(l.trim_end(), style)),
        );
    }
    panel(&intro.title, &lines, style)
}

fn format_fields(t: &FieldTable, style: &StyleOptions) -> String {
    let (tag, label) = match t.direction {
        Direction::Inputs => ("inbox", "Inputs"),
        Direction::Outputs => ("outbox", "Outputs"),
    };
    let rows: Vec<Vec<String>> = t
        .rows
        .iter()
        .map(|r| {
            vec![
                color(Role::Primary, &r.name, style),
                color(Role::Dim, format!("({})", r.kind), style),
                inline_markdown(&r.description, style),
                r.pattern.clone(),
            ]
        })
        .collect();
    let tbl = table(
        &["NAME", "TYPE", "DESCRIPTION", "PATTERN"],
        &rows,
        TableOpts {
            wrap: true,
            row_sep: true,
            align: vec![Align::Left, Align::Left, Align::Left, Align::Right],
            ..TableOpts::default()
        },
        style,
    );
    format!(
        "{}{} ({})\n{tbl}",
        emoji_prefix(tag, style),
        color(Role::Bold, label, style),
        t.rows.len()
    )
}
