//! Audit trail of planned paths.

use crate::messages::Path;
use crate::traits::AuditLog;
use chrono::{DateTime, Local};
use parking_lot::Mutex;
use rover_core::RoverResult;
use serde::Serialize;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

/// `path_<YYYYmmdd_HHMMSS_mmm>` for the given instant
pub fn audit_file_stem(now: DateTime<Local>) -> String {
    format!("path_{}", now.format("%Y%m%d_%H%M%S_%3f"))
}

#[derive(Serialize)]
struct AuditRecord<'a> {
    recorded_at: String,
    length: f64,
    path: &'a Path,
}

/// Writes every path as pretty JSON to `<dir>/<file_stem>.json`
#[derive(Debug, Clone)]
pub struct JsonAuditLog {
    dir: PathBuf,
}

impl JsonAuditLog {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &std::path::Path {
        &self.dir
    }
}

impl AuditLog for JsonAuditLog {
    fn record(&mut self, path: &Path, file_stem: &str) -> RoverResult<()> {
        fs::create_dir_all(&self.dir)?;
        let record = AuditRecord {
            recorded_at: Local::now().to_rfc3339(),
            length: path.length(),
            path,
        };
        let file = self.dir.join(format!("{}.json", file_stem));
        fs::write(&file, serde_json::to_string_pretty(&record)?)?;
        log::debug!(target: "rover::audit", "Wrote {}", file.display());
        Ok(())
    }
}

/// Keeps recorded paths in memory; clones share the same record list
#[derive(Debug, Clone, Default)]
pub struct MemoryAuditLog {
    records: Arc<Mutex<Vec<(String, Path)>>>,
}

impl MemoryAuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<(String, Path)> {
        self.records.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl AuditLog for MemoryAuditLog {
    fn record(&mut self, path: &Path, file_stem: &str) -> RoverResult<()> {
        self.records.lock().push((file_stem.to_string(), path.clone()));
        Ok(())
    }
}

/// Discards everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NullAuditLog;

impl AuditLog for NullAuditLog {
    fn record(&mut self, _path: &Path, _file_stem: &str) -> RoverResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages::{Point2, Waypoint};
    use chrono::TimeZone;

    fn sample_path() -> Path {
        Path::new(vec![
            Waypoint {
                id: 0,
                position: Point2::new(0.0, 0.0),
            },
            Waypoint {
                id: 1,
                position: Point2::new(1.0, 0.0),
            },
        ])
    }

    #[test]
    fn test_file_stem_format() {
        let at = Local.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap()
            + chrono::Duration::milliseconds(42);
        assert_eq!(audit_file_stem(at), "path_20240309_140507_042");
    }

    #[test]
    fn test_json_audit_log_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut audit = JsonAuditLog::new(dir.path().join("paths"));
        audit.record(&sample_path(), "path_test").unwrap();

        let text = fs::read_to_string(dir.path().join("paths/path_test.json")).unwrap();
        let json: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(json["path"]["waypoints"][1]["id"], 1);
        assert_eq!(json["length"], 1.0);
    }

    #[test]
    fn test_memory_audit_log_is_shared() {
        let log = MemoryAuditLog::new();
        let mut writer = log.clone();
        writer.record(&sample_path(), "a").unwrap();
        assert_eq!(log.len(), 1);
        assert_eq!(log.records()[0].0, "a");
    }
}
