//! nf-test snapshot file (`tests/main.nf.test.snap`).
//!
//! Top-level keys are test names, each mapping to
//! `{ "content": [...], "meta": {...}, "timestamp": "2023-10-18T11:02:55.420631681" }`.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;

use crate::error::ComponentError;

pub const SNAPSHOT_FILE: &str = "main.nf.test.snap";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotEntry {
    #[serde(default)]
    pub content: Vec<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SnapshotFile {
    pub entries: BTreeMap<String, SnapshotEntry>,
}

impl SnapshotFile {
    pub fn load(path: &Path) -> Result<Self, ComponentError> {
        let invalid = |reason: String| ComponentError::InvalidSnapshot {
            path: path.to_path_buf(),
            reason,
        };
        let raw = std::fs::read_to_string(path).map_err(|e| invalid(e.to_string()))?;
        serde_json::from_str(&raw).map_err(|e| invalid(e.to_string()))
    }

    /// Load when the file exists, `Ok(None)` otherwise.
    pub fn load_if_exists(path: &Path) -> Result<Option<Self>, ComponentError> {
        if path.is_file() {
            Self::load(path).map(Some)
        } else {
            Ok(None)
        }
    }

    /// Test name -> recorded timestamp.
    pub fn timestamps(&self) -> BTreeMap<&str, &str> {
        self.entries
            .iter()
            .filter_map(|(k, e)| e.timestamp.as_deref().map(|t| (k.as_str(), t)))
            .collect()
    }

    /// Whether any timestamp differs from `before` (new tests count as changed).
    pub fn timestamps_changed_since(&self, before: &SnapshotFile) -> bool {
        let old = before.timestamps();
        self.timestamps()
            .iter()
            .any(|(name, ts)| old.get(name) != Some(ts))
    }

    /// Module snapshots must record a `versions` entry with content.
    pub fn has_versions_content(&self) -> bool {
        self.entries
            .get("versions")
            .is_some_and(|e| !e.content.is_empty())
    }

    /// Equality ignoring timestamps.
    pub fn same_content(&self, other: &SnapshotFile) -> bool {
        self.entries.len() == other.entries.len()
            && self.entries.iter().all(|(name, e)| {
                other
                    .entries
                    .get(name)
                    .is_some_and(|o| o.content == e.content && o.meta == e.meta)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SNAP: &str = r#"{
    "versions": {
        "content": [["versions.yml:md5,e1cc25ca8af856014824abd842e93978"]],
        "meta": {"nf-test": "0.8.4", "nextflow": "23.10.1"},
        "timestamp": "2023-10-18T11:02:55.420631681"
    },
    "Single-End": {
        "content": [{"0": [[{"id": "test"}, "test.bam:md5,abc"]]}],
        "timestamp": "2023-10-18T11:02:55.420631681"
    }
}"#;

    fn write_snap(body: &str) -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SNAPSHOT_FILE);
        std::fs::write(&path, body).unwrap();
        (dir, path)
    }

    #[test]
    fn parses_entries_and_versions() {
        let (_d, path) = write_snap(SNAP);
        let snap = SnapshotFile::load(&path).unwrap();
        assert!(snap.has_versions_content());
        assert_eq!(snap.entries.len(), 2);
        assert_eq!(
            snap.timestamps().get("Single-End"),
            Some(&"2023-10-18T11:02:55.420631681")
        );
        let versions = &snap.entries["versions"].content[0][0];
        assert!(
            versions
                .as_str()
                .unwrap()
                .contains("versions.yml:md5,e1cc25ca8af856014824abd842e93978")
        );
    }

    #[test]
    fn timestamp_change_detection() {
        let (_d, path) = write_snap(SNAP);
        let before = SnapshotFile::load(&path).unwrap();
        let mut after = before.clone();
        assert!(!after.timestamps_changed_since(&before));
        after.entries.get_mut("Single-End").unwrap().timestamp =
            Some("2024-01-02T10:00:00.000000000".into());
        assert!(after.timestamps_changed_since(&before));
        assert!(after.same_content(&before));
    }

    #[test]
    fn content_difference_detected() {
        let (_d, path) = write_snap(SNAP);
        let before = SnapshotFile::load(&path).unwrap();
        let mut after = before.clone();
        after.entries.get_mut("versions").unwrap().content = vec![];
        assert!(!after.same_content(&before));
        assert!(!after.has_versions_content());
    }

    #[test]
    fn invalid_json_is_invalid_snapshot() {
        let (_d, path) = write_snap("[1, 2");
        assert!(matches!(
            SnapshotFile::load(&path),
            Err(ComponentError::InvalidSnapshot { .. })
        ));
    }

    #[test]
    fn missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(
            SnapshotFile::load_if_exists(&dir.path().join(SNAPSHOT_FILE))
                .unwrap()
                .is_none()
        );
    }
}
