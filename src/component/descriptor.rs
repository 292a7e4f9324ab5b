//! `meta.yml` component descriptor.
//!
//! Recognised top-level keys: `name`, `description`, `keywords`, `tools`,
//! `input`, `output`. `tools`/`input`/`output` are ordered sequences of
//! single-key mappings. Module descriptors may nest inputs per channel
//! (a list of lists) or key outputs by channel name; both are flattened
//! into one ordered field list.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ComponentDescriptor {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub keywords: Vec<String>,
    pub tools: Vec<Tool>,
    pub inputs: Vec<Field>,
    pub outputs: Vec<Field>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tool {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub homepage: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Field {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
}

/* ---- Raw YAML shapes ---- */

#[derive(Debug, Default, Deserialize)]
struct RawMeta {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    keywords: Option<Vec<String>>,
    #[serde(default)]
    tools: Option<Vec<BTreeMap<String, Option<RawTool>>>>,
    #[serde(default)]
    input: Option<RawSection>,
    #[serde(default)]
    output: Option<RawSection>,
}

#[derive(Debug, Default, Deserialize)]
struct RawTool {
    #[serde(default)]
    homepage: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawField {
    #[serde(default, rename = "type")]
    kind: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    pattern: Option<String>,
}

type FieldMap = BTreeMap<String, Option<RawField>>;

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawEntry {
    One(FieldMap),
    Channel(Vec<FieldMap>),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawSection {
    List(Vec<RawEntry>),
    ByChannel(BTreeMap<String, Vec<RawEntry>>),
}

impl RawSection {
    fn flatten(self) -> Vec<Field> {
        let entries: Vec<RawEntry> = match self {
            RawSection::List(list) => list,
            RawSection::ByChannel(map) => map.into_values().flatten().collect(),
        };
        let mut out = Vec::new();
        for entry in entries {
            let maps = match entry {
                RawEntry::One(m) => vec![m],
                RawEntry::Channel(ms) => ms,
            };
            for map in maps {
                for (name, info) in map {
                    let info = info.unwrap_or_default();
                    out.push(Field {
                        name,
                        kind: info.kind.unwrap_or_default(),
                        description: non_empty(info.description),
                        pattern: non_empty(info.pattern),
                    });
                }
            }
        }
        out
    }
}

fn non_empty(s: Option<String>) -> Option<String> {
    s.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

impl ComponentDescriptor {
    /// Parse `meta.yml` text.
    pub fn from_yaml_str(raw: &str) -> Result<Self> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        let meta: RawMeta = serde_yaml::from_str(raw).context("failed to parse meta.yml")?;
        let tools = meta
            .tools
            .unwrap_or_default()
            .into_iter()
            .flat_map(|m| m.into_iter())
            .map(|(name, info)| Tool {
                name,
                homepage: non_empty(info.and_then(|i| i.homepage)),
            })
            .collect();
        Ok(Self {
            name: non_empty(meta.name),
            description: non_empty(meta.description),
            keywords: meta.keywords.unwrap_or_default(),
            tools,
            inputs: meta.input.map(RawSection::flatten).unwrap_or_default(),
            outputs: meta.output.map(RawSection::flatten).unwrap_or_default(),
        })
    }

    /// Read and parse a `meta.yml` file.
    pub fn from_path(path: &std::path::Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::from_yaml_str(&raw).with_context(|| format!("invalid descriptor {}", path.display()))
    }
}
