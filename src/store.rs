use crate::table;
use anyhow::{anyhow, Context};
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use uuid::Uuid;

pub const TABLE_FILE: &str = "exam_centers.csv";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    pub center_code: String,
    pub center_name: String,
    pub district: String,
    pub state: String,
    pub student_roll_no: String,
    pub class_level: String,
}

impl Record {
    fn to_fields(&self) -> [&str; 6] {
        [
            self.center_code.as_str(),
            self.center_name.as_str(),
            self.district.as_str(),
            self.state.as_str(),
            self.student_roll_no.as_str(),
            self.class_level.as_str(),
        ]
    }

    fn from_fields(mut fields: Vec<String>) -> Self {
        fields.resize(6, String::new());
        let mut it = fields.into_iter();
        let mut next = || it.next().unwrap_or_default();
        Record {
            center_code: next(),
            center_name: next(),
            district: next(),
            state: next(),
            student_roll_no: next(),
            class_level: next(),
        }
    }

    pub fn has_key(&self, center_code: &str, student_roll_no: &str) -> bool {
        self.center_code == center_code && self.student_roll_no == student_roll_no
    }
}

/// Value fields written by `RecordStore::update`; the composite key is never touched.
#[derive(Debug, Clone)]
pub struct CenterDetails {
    pub center_name: String,
    pub district: String,
    pub state: String,
    pub class_level: String,
}

/// The exam-center table on disk. One instance per workspace, passed to callers
/// explicitly.
#[derive(Debug, Clone)]
pub struct RecordStore {
    path: PathBuf,
}

impl RecordStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn in_workspace(workspace: &Path) -> Self {
        Self::new(workspace.join(TABLE_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Creates the table with only the header when it is absent or empty.
    pub fn init(&self) -> anyhow::Result<()> {
        if self.path.exists() && self.len()? > 0 {
            return Ok(());
        }
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("failed to create directory {}", parent.to_string_lossy())
                })?;
            }
        }
        std::fs::write(&self.path, table::header_row()).with_context(|| {
            format!("failed to create table {}", self.path.to_string_lossy())
        })?;
        info!(path = %self.path.display(), "created empty table");
        Ok(())
    }

    fn len(&self) -> anyhow::Result<u64> {
        let meta = std::fs::metadata(&self.path)
            .with_context(|| format!("failed to stat table {}", self.path.to_string_lossy()))?;
        Ok(meta.len())
    }

    pub fn read_all(&self) -> anyhow::Result<Vec<Record>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let bytes = std::fs::read(&self.path)
            .with_context(|| format!("failed to read table {}", self.path.to_string_lossy()))?;
        let text = String::from_utf8(bytes)
            .with_context(|| format!("table {} is not UTF-8", self.path.to_string_lossy()))?;
        let rows = table::parse_rows(text.trim_start_matches('\u{feff}'));
        Ok(rows.into_iter().skip(1).map(Record::from_fields).collect())
    }

    pub fn append(&self, record: &Record) -> anyhow::Result<()> {
        self.append_all(std::slice::from_ref(record))
    }

    /// Appends rows at the end of the table with a single open. Existing rows are
    /// not rewritten. A missing or empty table gets its header first.
    pub fn append_all(&self, records: &[Record]) -> anyhow::Result<()> {
        let mut file = OpenOptions::new()
            .append(true)
            .create(true)
            .open(&self.path)
            .with_context(|| format!("failed to open table {}", self.path.to_string_lossy()))?;
        let existing = file
            .metadata()
            .with_context(|| format!("failed to stat table {}", self.path.to_string_lossy()))?
            .len();
        let mut out = if existing == 0 {
            table::header_row()
        } else {
            String::new()
        };
        for r in records {
            out.push_str(&table::format_row(&r.to_fields()));
        }
        file.write_all(out.as_bytes())
            .with_context(|| format!("failed to append to {}", self.path.to_string_lossy()))?;
        debug!(rows = records.len(), "appended rows");
        Ok(())
    }

    /// Replaces the value fields of every row matching the composite key. Returns
    /// how many rows matched; repeated range adds can leave more than one. The
    /// table is rewritten either way.
    pub fn update(
        &self,
        center_code: &str,
        student_roll_no: &str,
        details: &CenterDetails,
    ) -> anyhow::Result<usize> {
        let mut rows = self.read_all()?;
        let mut updated = 0usize;
        for row in rows.iter_mut() {
            if row.has_key(center_code, student_roll_no) {
                row.center_name = details.center_name.clone();
                row.district = details.district.clone();
                row.state = details.state.clone();
                row.class_level = details.class_level.clone();
                updated += 1;
            }
        }
        self.rewrite(&rows)?;
        info!(center_code, student_roll_no, updated, "update");
        Ok(updated)
    }

    /// Removes every row registered under `center_code`, i.e. the whole roster of
    /// that center. Returns the number of rows removed.
    pub fn delete(&self, center_code: &str) -> anyhow::Result<usize> {
        let rows = self.read_all()?;
        let before = rows.len();
        let kept: Vec<Record> = rows
            .into_iter()
            .filter(|r| r.center_code != center_code)
            .collect();
        let removed = before - kept.len();
        self.rewrite(&kept)?;
        info!(center_code, removed, "delete");
        Ok(removed)
    }

    /// Writes header + rows to a temp file beside the table, then renames it over
    /// the table.
    fn rewrite(&self, rows: &[Record]) -> anyhow::Result<()> {
        let mut out = table::header_row();
        for r in rows {
            out.push_str(&table::format_row(&r.to_fields()));
        }
        replace_file(&self.path, out.as_bytes())
    }
}

pub fn replace_file(path: &Path, contents: &[u8]) -> anyhow::Result<()> {
    let file_name = path
        .file_name()
        .and_then(|s| s.to_str())
        .ok_or_else(|| anyhow!("invalid table path {}", path.to_string_lossy()))?;
    let tmp = path.with_file_name(format!(".{}.{}.tmp", file_name, Uuid::new_v4()));
    let write = || -> anyhow::Result<()> {
        let mut f = File::create(&tmp)
            .with_context(|| format!("failed to create temp file {}", tmp.to_string_lossy()))?;
        f.write_all(contents)
            .with_context(|| format!("failed to write temp file {}", tmp.to_string_lossy()))?;
        f.sync_all()
            .with_context(|| format!("failed to flush temp file {}", tmp.to_string_lossy()))?;
        std::fs::rename(&tmp, path)
            .with_context(|| format!("failed to move temp file to {}", path.to_string_lossy()))?;
        Ok(())
    };
    let res = write();
    if res.is_err() && tmp.exists() {
        let _ = std::fs::remove_file(&tmp);
    }
    res
}
