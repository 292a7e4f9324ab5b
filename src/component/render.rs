//! Descriptor rendering: a loaded component becomes a sequence of display
//! blocks. No I/O happens here; the terminal writer lives in `cmd::info`.

use std::path::PathBuf;

use super::descriptor::Field;
use super::kind::ComponentKind;
use super::{LoadedComponent, Location};
use crate::registry::{NF_CORE_MODULES_REMOTE, RegistryRef};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub blocks: Vec<Block>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Intro(Intro),
    Fields(FieldTable),
    InstallCommand(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Intro {
    pub title: String,
    pub location: Option<LocationLine>,
    pub tools: Vec<ToolRef>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocationLine {
    Path(PathBuf),
    Repository { location: String, link: bool },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolRef {
    pub name: String,
    pub homepage: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Inputs,
    Outputs,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldTable {
    pub direction: Direction,
    pub rows: Vec<FieldRow>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldRow {
    pub name: String,
    pub kind: String,
    pub description: String,
    pub pattern: String,
}

pub fn render(component: &LoadedComponent) -> Document {
    let d = &component.descriptor;
    let mut blocks = Vec::with_capacity(4);

    let location = match &component.location {
        Location::LocalPath(p) => Some(LocationLine::Path(p.clone())),
        Location::RemoteLocation(url) => Some(LocationLine::Repository {
            location: url.clone(),
            link: RegistryRef::new(url.as_str(), None).is_http(),
        }),
    };
    blocks.push(Block::Intro(Intro {
        title: format!("{}: {}", component.kind.title(), component.name),
        location,
        tools: d
            .tools
            .iter()
            .map(|t| ToolRef {
                name: t.name.clone(),
                homepage: t.homepage.clone(),
            })
            .collect(),
        description: d.description.clone(),
    }));

    if !d.inputs.is_empty() {
        blocks.push(Block::Fields(field_table(Direction::Inputs, &d.inputs)));
    }
    if !d.outputs.is_empty() {
        blocks.push(Block::Fields(field_table(Direction::Outputs, &d.outputs)));
    }

    if let Location::RemoteLocation(url) = &component.location {
        blocks.push(Block::InstallCommand(install_command(
            component.kind,
            &component.name,
            url,
        )));
    }

    Document { blocks }
}

fn field_table(direction: Direction, fields: &[Field]) -> FieldTable {
    FieldTable {
        direction,
        rows: fields
            .iter()
            .map(|f| FieldRow {
                name: f.name.clone(),
                kind: f.kind.clone(),
                description: f.description.clone().unwrap_or_default(),
                pattern: f.pattern.clone().unwrap_or_default(),
            })
            .collect(),
    }
}

/// `nf-core <kind> [--git-remote <url>] install <name>`; the remote qualifier
/// is only added for non-default registries.
pub fn install_command(kind: ComponentKind, name: &str, remote_location: &str) -> String {
    if remote_location == NF_CORE_MODULES_REMOTE {
        format!("nf-core {kind} install {name}")
    } else {
        format!("nf-core {kind} --git-remote {remote_location} install {name}")
    }
}

/// Convenience for callers holding a `RegistryRef`.
pub fn install_command_for(kind: ComponentKind, name: &str, remote: &RegistryRef) -> String {
    install_command(kind, name, &remote.url)
}
