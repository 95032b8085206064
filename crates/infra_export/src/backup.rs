//! Backup directory
//!
//! Layout under the configured root:
//!
//! ```text
//! {root}/exports/excel/*.xlsx
//! {root}/exports/csv/*.csv
//! {root}/exports/pdf/*.pdf
//! {root}/exports/last_backup.txt   RFC 3339 time of the last weekly backup
//! ```

use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use serde::Serialize;
use tokio::fs;
use tracing::{debug, warn};

use crate::error::BackupError;
use crate::format::ExportFormat;

pub const MARKER_FILE: &str = "last_backup.txt";
pub const WEEKLY_PREFIX: &str = "weekly_backup_";
pub const RECENT_WEEKLY_LIMIT: usize = 10;

/// Time between scheduled backups
pub fn weekly_interval() -> Duration {
    Duration::days(7)
}

/// `B` below 1024 bytes, else one decimal of `KB`, `MB` or `GB`
pub fn format_file_size(bytes: u64) -> String {
    const KB: f64 = 1024.0;
    let size = bytes as f64;
    if size < KB {
        format!("{} B", bytes)
    } else if size < KB * KB {
        format!("{:.1} KB", size / KB)
    } else if size < KB * KB * KB {
        format!("{:.1} MB", size / (KB * KB))
    } else {
        format!("{:.1} GB", size / (KB * KB * KB))
    }
}

/// A stored backup file
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BackupFile {
    pub name: String,
    pub format: ExportFormat,
    pub size: u64,
    pub size_display: String,
    pub modified: DateTime<Utc>,
}

/// Stored files per format, newest first
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BackupListing {
    pub excel: Vec<BackupFile>,
    pub csv: Vec<BackupFile>,
    pub pdf: Vec<BackupFile>,
}

impl BackupListing {
    pub fn total(&self) -> usize {
        self.excel.len() + self.csv.len() + self.pdf.len()
    }
}

/// Weekly backup schedule as seen from `now`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeeklyStatus {
    pub last_backup: Option<DateTime<Utc>>,
    pub next_backup: DateTime<Utc>,
    /// Negative when overdue
    pub days_until: i64,
    /// Hours past the whole days, negative when overdue
    pub hours_until: i64,
    pub overdue: bool,
    pub recent_backups: Vec<BackupFile>,
    pub total_claims: u64,
    pub scheduler_running: bool,
}

impl WeeklyStatus {
    /// Schedule fields only; the caller fills backups, totals and the task state
    pub fn compute(last_backup: Option<DateTime<Utc>>, now: DateTime<Utc>) -> Self {
        let mut status = WeeklyStatus {
            last_backup,
            next_backup: now,
            days_until: 0,
            hours_until: 0,
            overdue: true,
            recent_backups: Vec::new(),
            total_claims: 0,
            scheduler_running: false,
        };

        if let Some(last) = last_backup {
            let next = last + weekly_interval();
            let remaining = next - now;
            status.next_backup = next;
            if remaining > Duration::zero() {
                status.overdue = false;
                status.days_until = remaining.num_days();
                status.hours_until = remaining.num_hours() % 24;
            } else {
                let late = now - next;
                status.days_until = -late.num_days();
                status.hours_until = -(late.num_hours() % 24);
            }
        }
        status
    }
}

/// Whether a scheduled backup should run at `now`
pub fn is_due(last_backup: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
    match last_backup {
        Some(last) => now - last >= weekly_interval(),
        None => true,
    }
}

/// Reads a marker written as RFC 3339, or as a naive ISO-8601 UTC time
pub fn parse_marker(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    DateTime::parse_from_rfc3339(text)
        .map(|at| at.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f")
                .ok()
                .map(|at| at.and_utc())
        })
}

/// Rejects empty names, path separators and parent references
fn validate_name(name: &str) -> Result<(), BackupError> {
    if name.is_empty() || name.contains(['/', '\\']) || name.contains("..") {
        return Err(BackupError::InvalidName(name.to_string()));
    }
    Ok(())
}

/// The on-disk backup tree
#[derive(Debug, Clone)]
pub struct BackupDirectory {
    root: PathBuf,
}

impl BackupDirectory {
    /// Backups live under `{backup_root}/exports`
    pub fn new(backup_root: impl AsRef<Path>) -> Self {
        Self {
            root: backup_root.as_ref().join("exports"),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn format_dir(&self, format: ExportFormat) -> PathBuf {
        self.root.join(format.as_str())
    }

    pub fn marker_path(&self) -> PathBuf {
        self.root.join(MARKER_FILE)
    }

    /// Creates the format subdirectories
    pub async fn ensure(&self) -> Result<(), BackupError> {
        for format in ExportFormat::ALL {
            let dir = self.format_dir(format);
            fs::create_dir_all(&dir)
                .await
                .map_err(|e| BackupError::io(&dir, e))?;
        }
        Ok(())
    }

    /// Writes `{stem}.{ext}` into the format subdirectory
    pub async fn save(&self, format: ExportFormat, stem: &str, bytes: &[u8]) -> Result<PathBuf, BackupError> {
        let file_name = format.file_name(stem);
        validate_name(&file_name)?;

        let dir = self.format_dir(format);
        fs::create_dir_all(&dir)
            .await
            .map_err(|e| BackupError::io(&dir, e))?;

        let path = dir.join(file_name);
        fs::write(&path, bytes)
            .await
            .map_err(|e| BackupError::io(&path, e))?;
        debug!(path = %path.display(), bytes = bytes.len(), "Backup file written");
        Ok(path)
    }

    /// Files of one format, newest first; a missing directory lists nothing
    pub async fn list(&self, format: ExportFormat) -> Result<Vec<BackupFile>, BackupError> {
        let dir = self.format_dir(format);
        let mut read_dir = match fs::read_dir(&dir).await {
            Ok(read_dir) => read_dir,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(BackupError::io(&dir, e)),
        };

        let mut files = Vec::new();
        while let Some(entry) = read_dir
            .next_entry()
            .await
            .map_err(|e| BackupError::io(&dir, e))?
        {
            let metadata = entry
                .metadata()
                .await
                .map_err(|e| BackupError::io(entry.path(), e))?;
            if !metadata.is_file() {
                continue;
            }
            let modified = metadata
                .modified()
                .map(DateTime::<Utc>::from)
                .unwrap_or_else(|_| Utc::now());
            files.push(BackupFile {
                name: entry.file_name().to_string_lossy().to_string(),
                format,
                size: metadata.len(),
                size_display: format_file_size(metadata.len()),
                modified,
            });
        }

        files.sort_by(|a, b| b.modified.cmp(&a.modified).then_with(|| b.name.cmp(&a.name)));
        Ok(files)
    }

    pub async fn list_all(&self) -> Result<BackupListing, BackupError> {
        Ok(BackupListing {
            excel: self.list(ExportFormat::Excel).await?,
            csv: self.list(ExportFormat::Csv).await?,
            pdf: self.list(ExportFormat::Pdf).await?,
        })
    }

    /// Path of a stored file, `None` when it does not exist
    ///
    /// Names with separators or `..` are rejected, and the resolved path
    /// must stay inside the format directory.
    pub async fn resolve(&self, format: ExportFormat, name: &str) -> Result<Option<PathBuf>, BackupError> {
        validate_name(name)?;

        let dir = self.format_dir(format);
        let Ok(canonical) = fs::canonicalize(dir.join(name)).await else {
            return Ok(None);
        };
        let Ok(base) = fs::canonicalize(&dir).await else {
            return Ok(None);
        };
        if !canonical.starts_with(&base) {
            return Err(BackupError::InvalidName(name.to_string()));
        }

        match fs::metadata(&canonical).await {
            Ok(metadata) if metadata.is_file() => Ok(Some(canonical)),
            _ => Ok(None),
        }
    }

    /// Reads a stored file, `None` when it does not exist
    pub async fn read(&self, format: ExportFormat, name: &str) -> Result<Option<Vec<u8>>, BackupError> {
        match self.resolve(format, name).await? {
            Some(path) => fs::read(&path)
                .await
                .map(Some)
                .map_err(|e| BackupError::io(&path, e)),
            None => Ok(None),
        }
    }

    /// Last weekly backup time; missing or unreadable markers read as `None`
    pub async fn read_marker(&self) -> Option<DateTime<Utc>> {
        let path = self.marker_path();
        let text = fs::read_to_string(&path).await.ok()?;
        let parsed = parse_marker(&text);
        if parsed.is_none() {
            warn!(path = %path.display(), "Ignoring unreadable backup marker");
        }
        parsed
    }

    pub async fn write_marker(&self, at: DateTime<Utc>) -> Result<(), BackupError> {
        fs::create_dir_all(&self.root)
            .await
            .map_err(|e| BackupError::io(&self.root, e))?;
        let path = self.marker_path();
        fs::write(&path, at.to_rfc3339())
            .await
            .map_err(|e| BackupError::io(&path, e))
    }

    /// Latest scheduled excel backups, at most `limit`
    pub async fn recent_weekly(&self, limit: usize) -> Result<Vec<BackupFile>, BackupError> {
        Ok(self
            .list(ExportFormat::Excel)
            .await?
            .into_iter()
            .filter(|f| f.name.starts_with(WEEKLY_PREFIX) && f.name.ends_with(".xlsx"))
            .take(limit)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, day, hour, 0, 0).unwrap()
    }

    #[test]
    fn test_format_file_size() {
        assert_eq!(format_file_size(512), "512 B");
        assert_eq!(format_file_size(1536), "1.5 KB");
        assert_eq!(format_file_size(5 * 1024 * 1024), "5.0 MB");
        assert_eq!(format_file_size(3 * 1024 * 1024 * 1024), "3.0 GB");
    }

    #[test]
    fn test_due_after_seven_days() {
        assert!(is_due(None, at(1, 0)));
        assert!(!is_due(Some(at(1, 0)), at(7, 23)));
        assert!(is_due(Some(at(1, 0)), at(8, 0)));
    }

    #[test]
    fn test_status_counts_down() {
        let status = WeeklyStatus::compute(Some(at(1, 0)), at(3, 6));
        assert!(!status.overdue);
        assert_eq!(status.next_backup, at(8, 0));
        assert_eq!(status.days_until, 4);
        assert_eq!(status.hours_until, 18);
    }

    #[test]
    fn test_status_reports_overdue() {
        let status = WeeklyStatus::compute(Some(at(1, 0)), at(10, 5));
        assert!(status.overdue);
        assert_eq!(status.days_until, -2);
        assert_eq!(status.hours_until, -5);

        let never = WeeklyStatus::compute(None, at(10, 5));
        assert!(never.overdue);
        assert_eq!(never.next_backup, at(10, 5));
    }

    #[test]
    fn test_parse_marker_formats() {
        assert_eq!(parse_marker("2025-06-01T00:00:00+00:00"), Some(at(1, 0)));
        assert_eq!(parse_marker("2025-06-01T00:00:00.123456").map(|d| d.date_naive()), Some(at(1, 0).date_naive()));
        assert_eq!(parse_marker("last tuesday"), None);
    }
}
