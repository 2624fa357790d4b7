//! Local index of analyzed atas (`atas.json` in the output directory).
//! Stands in for the original app's hosted persistence: append on
//! analysis, list, delete by id.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

pub const INDEX_FILE_NAME: &str = "atas.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AtaRecord {
    pub id: u64,
    pub category: String,
    pub summary: String,
    pub file_name: String,
    pub mime_type: String,
    pub created_utc: String,
    pub html_path: PathBuf,
    pub json_path: PathBuf,
}

#[derive(Debug, Serialize, Deserialize)]
struct IndexFile {
    version: u32,
    #[serde(default)]
    atas: Vec<AtaRecord>,
    #[serde(default)]
    created_utc: Option<String>,
    #[serde(default)]
    updated_utc: Option<String>,
}

impl Default for IndexFile {
    fn default() -> Self {
        Self {
            version: 1,
            atas: Vec::new(),
            created_utc: None,
            updated_utc: None,
        }
    }
}

pub struct AtaIndex {
    path: PathBuf,
    file: IndexFile,
}

impl AtaIndex {
    /// Tolerant load: a missing or unreadable index starts empty rather
    /// than failing the run.
    pub fn load(path: &Path) -> Self {
        let file = fs::read_to_string(path)
            .ok()
            .and_then(|text| serde_json::from_str(&text).ok())
            .unwrap_or_default();
        Self {
            path: path.to_path_buf(),
            file,
        }
    }

    pub fn next_id() -> u64 {
        (OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as u64
    }

    pub fn append(&mut self, record: AtaRecord) {
        self.file.atas.insert(0, record);
    }

    pub fn records(&self) -> &[AtaRecord] {
        &self.file.atas
    }

    pub fn delete(&mut self, id: u64) -> bool {
        let before = self.file.atas.len();
        self.file.atas.retain(|record| record.id != id);
        self.file.atas.len() != before
    }

    pub fn save(&mut self) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let now = OffsetDateTime::now_utc().format(&Rfc3339)?;
        if self.file.created_utc.is_none() {
            self.file.created_utc = Some(now.clone());
        }
        self.file.updated_utc = Some(now);
        fs::write(&self.path, serde_json::to_string_pretty(&self.file)?)
            .with_context(|| format!("writing {}", self.path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: u64, category: &str) -> AtaRecord {
        AtaRecord {
            id,
            category: category.into(),
            summary: "Sync".into(),
            file_name: "reuniao.txt".into(),
            mime_type: "text/plain".into(),
            created_utc: "2026-08-27T10:00:00Z".into(),
            html_path: PathBuf::from("daily/daily.html"),
            json_path: PathBuf::from("daily/daily.json"),
        }
    }

    #[test]
    fn append_save_reload_preserves_newest_first_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(INDEX_FILE_NAME);

        let mut index = AtaIndex::load(&path);
        index.append(record(1, "Daily"));
        index.append(record(2, "Planning"));
        index.save().unwrap();

        let reloaded = AtaIndex::load(&path);
        let categories: Vec<&str> = reloaded
            .records()
            .iter()
            .map(|r| r.category.as_str())
            .collect();
        assert_eq!(categories, ["Planning", "Daily"]);
    }

    #[test]
    fn delete_removes_only_the_matching_id() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(INDEX_FILE_NAME);

        let mut index = AtaIndex::load(&path);
        index.append(record(1, "Daily"));
        index.append(record(2, "Planning"));
        assert!(index.delete(1));
        assert!(!index.delete(1));
        assert_eq!(index.records().len(), 1);
        assert_eq!(index.records()[0].id, 2);
    }

    #[test]
    fn corrupt_index_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(INDEX_FILE_NAME);
        fs::write(&path, "not json").unwrap();

        let index = AtaIndex::load(&path);
        assert!(index.records().is_empty());
    }
}
