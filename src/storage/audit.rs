//! Append-only audit trail of stamped documents

use crate::error::{Error, Result};
use crate::model::AuditRecord;
use parking_lot::Mutex;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Destination for audit records. Nothing in the service reads them back.
pub trait AuditSink: Send + Sync {
    fn append(&self, record: &AuditRecord) -> Result<()>;
}

/// Audit log stored as JSON lines, one record per line
pub struct JsonlAuditLog {
    path: PathBuf,
    // Serializes appends so concurrent requests never interleave lines
    lock: Mutex<()>,
}

impl JsonlAuditLog {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every record back, oldest first
    pub fn read_all(&self) -> Result<Vec<AuditRecord>> {
        let _guard = self.lock.lock();
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let content = std::fs::read_to_string(&self.path)?;
        content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| serde_json::from_str(line).map_err(Error::from))
            .collect()
    }
}

impl AuditSink for JsonlAuditLog {
    fn append(&self, record: &AuditRecord) -> Result<()> {
        let mut line = serde_json::to_string(record)?;
        line.push('\n');

        let _guard = self.lock.lock();
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| Error::Audit {
                reason: format!("cannot create {}: {}", parent.display(), e),
            })?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| Error::Audit {
                reason: format!("cannot open {}: {}", self.path.display(), e),
            })?;
        file.write_all(line.as_bytes()).map_err(|e| Error::Audit {
            reason: format!("cannot write {}: {}", self.path.display(), e),
        })?;
        Ok(())
    }
}

/// In-process audit trail
#[derive(Default)]
pub struct MemoryAuditLog {
    records: Mutex<Vec<AuditRecord>>,
}

impl MemoryAuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the records appended so far
    pub fn records(&self) -> Vec<AuditRecord> {
        self.records.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }
}

impl AuditSink for MemoryAuditLog {
    fn append(&self, record: &AuditRecord) -> Result<()> {
        self.records.lock().push(record.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use pretty_assertions::assert_eq;

    fn record(signed_hash: &str) -> AuditRecord {
        AuditRecord {
            pdf_id: "sample.pdf".to_string(),
            original_hash: "aa".to_string(),
            signed_hash: signed_hash.to_string(),
            fields: vec![serde_json::json!({
                "id": "f1",
                "type": "text",
                "value": "Jane Doe",
                "xRatio": 0.1,
                "yRatio": 0.1,
                "widthRatio": 0.2,
                "heightRatio": 0.05
            })],
            signed_at: Utc::now(),
        }
    }

    #[test]
    fn test_jsonl_appends_one_line_per_record() {
        let dir = tempfile::tempdir().unwrap();
        let log = JsonlAuditLog::new(dir.path().join("logs").join("audit.jsonl"));

        log.append(&record("bb")).unwrap();
        log.append(&record("cc")).unwrap();

        let content = std::fs::read_to_string(log.path()).unwrap();
        assert_eq!(content.lines().count(), 2);

        let records = log.read_all().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].signed_hash, "bb");
        assert_eq!(records[1].signed_hash, "cc");
        assert_eq!(records[0].fields, record("bb").fields);
    }

    #[test]
    fn test_jsonl_read_all_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let log = JsonlAuditLog::new(dir.path().join("audit.jsonl"));
        assert!(log.read_all().unwrap().is_empty());
    }

    #[test]
    fn test_jsonl_append_fails_when_path_is_directory() {
        let dir = tempfile::tempdir().unwrap();
        let log = JsonlAuditLog::new(dir.path());
        assert!(matches!(
            log.append(&record("bb")),
            Err(Error::Audit { .. })
        ));
    }

    #[test]
    fn test_memory_log() {
        let log = MemoryAuditLog::new();
        assert!(log.is_empty());
        log.append(&record("bb")).unwrap();
        assert_eq!(log.len(), 1);
        assert_eq!(log.records()[0].pdf_id, "sample.pdf");
    }
}
