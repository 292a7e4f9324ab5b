//! `.nf-core.yml` repository configuration.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

use super::RepoType;

/// Default organisation directory under `modules/` and `subworkflows/`.
pub const DEFAULT_ORG_PATH: &str = "nf-core";

const CONFIG_FILE_NAMES: &[&str] = &[".nf-core.yml", ".nf-core.yaml"];

/// Subset of `.nf-core.yml` this tool reads; unknown keys are ignored.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct RepoConfig {
    #[serde(default)]
    pub repository_type: Option<RepoType>,
    #[serde(default)]
    pub org_path: Option<String>,
}

impl RepoConfig {
    /// Load the config from `dir`, `Ok(None)` when neither file name exists.
    pub fn load(dir: &Path) -> Result<Option<Self>> {
        for file_name in CONFIG_FILE_NAMES {
            let path = dir.join(file_name);
            if !path.is_file() {
                continue;
            }
            let raw = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            // An empty file deserializes to unit; treat it as an empty config.
            if raw.trim().is_empty() {
                return Ok(Some(RepoConfig::default()));
            }
            let cfg: RepoConfig = serde_yaml::from_str(&raw)
                .with_context(|| format!("failed to parse {}", path.display()))?;
            return Ok(Some(cfg));
        }
        Ok(None)
    }

    pub fn org_path(&self) -> &str {
        self.org_path
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(DEFAULT_ORG_PATH)
    }
}
