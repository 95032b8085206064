//! Export and backup orchestration

use std::path::PathBuf;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use tracing::{info, instrument, warn};

use core_kernel::temporal::compact;
use domain_claims::filter::ClientSelector;
use domain_claims::{ClaimError, ClaimFilter, ClaimRecord, ClaimService};

use crate::backup::{is_due, BackupDirectory, WeeklyStatus, RECENT_WEEKLY_LIMIT, WEEKLY_PREFIX};
use crate::columns::{export_file_stem, timestamp};
use crate::error::ExportError;
use crate::format::ExportFormat;
use crate::{delimited, pdf, xlsx};

/// A rendered export ready to send
#[derive(Debug, Clone)]
pub struct ExportedFile {
    pub file_name: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
    pub records: usize,
    /// Backup copy, when writing it succeeded
    pub backup_path: Option<PathBuf>,
}

/// Files written by one backup run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BackupRun {
    pub stem: String,
    pub files: Vec<String>,
    pub records: usize,
    pub completed_at: DateTime<Utc>,
}

/// Renders records in one format
pub fn render(format: ExportFormat, records: &[ClaimRecord], today: NaiveDate) -> Result<Vec<u8>, ExportError> {
    match format {
        ExportFormat::Excel => xlsx::write_workbook(records),
        ExportFormat::Csv => delimited::write_csv(records),
        ExportFormat::Pdf => pdf::write_report(records, today),
    }
}

/// Produces exports and backups from the claims service
#[derive(Clone)]
pub struct Exporter {
    service: ClaimService,
    backups: BackupDirectory,
}

impl Exporter {
    pub fn new(service: ClaimService, backups: BackupDirectory) -> Self {
        Self { service, backups }
    }

    pub fn service(&self) -> &ClaimService {
        &self.service
    }

    pub fn backups(&self) -> &BackupDirectory {
        &self.backups
    }

    fn now(&self) -> DateTime<Utc> {
        self.service.clock().now()
    }

    /// Name of the client selected by id, if any
    async fn selected_client_name(&self, filter: &ClaimFilter) -> Result<Option<String>, ExportError> {
        match filter.client_selector() {
            Some(ClientSelector::Id(id)) => match self.service.get_client(id).await {
                Ok(client) => Ok(Some(client.name)),
                Err(ClaimError::ClientNotFound(_)) => Ok(None),
                Err(e) => Err(e.into()),
            },
            _ => Ok(None),
        }
    }

    /// Exports the filtered claim list and keeps a copy in the backups
    ///
    /// A failed backup copy is logged; the export itself still succeeds.
    #[instrument(skip(self, filter))]
    pub async fn export(&self, format: ExportFormat, filter: &ClaimFilter) -> Result<ExportedFile, ExportError> {
        let records = self.service.list_claims(filter).await?;
        let client_name = self.selected_client_name(filter).await?;
        let stem = export_file_stem(client_name.as_deref(), self.now());
        let bytes = render(format, &records, self.service.clock().today())?;

        let backup_path = match self.backups.save(format, &stem, &bytes).await {
            Ok(path) => Some(path),
            Err(error) => {
                warn!(error = %error, "Could not keep a backup copy of the export");
                None
            }
        };

        info!(records = records.len(), file = %format.file_name(&stem), "Export generated");
        Ok(ExportedFile {
            file_name: format.file_name(&stem),
            content_type: format.content_type(),
            bytes,
            records: records.len(),
            backup_path,
        })
    }

    async fn write_backup(&self, stem: String, formats: &[ExportFormat]) -> Result<BackupRun, ExportError> {
        let records = self.service.list_claims(&ClaimFilter::default()).await?;
        let today = self.service.clock().today();

        let mut files = Vec::with_capacity(formats.len());
        for format in formats {
            let bytes = render(*format, &records, today)?;
            self.backups.save(*format, &stem, &bytes).await?;
            files.push(format.file_name(&stem));
        }

        info!(stem = %stem, records = records.len(), "Backup written");
        Ok(BackupRun {
            stem,
            files,
            records: records.len(),
            completed_at: self.now(),
        })
    }

    /// All claims in every format as `manual_backup_{YYYYMMDD_HHMMSS}`
    pub async fn manual_backup(&self) -> Result<BackupRun, ExportError> {
        let stem = format!("manual_backup_{}", timestamp(self.now()));
        self.write_backup(stem, &ExportFormat::ALL).await
    }

    /// Scheduled backup in every format, then the marker moves to now
    pub async fn weekly_backup(&self) -> Result<BackupRun, ExportError> {
        let stem = format!("{}{}", WEEKLY_PREFIX, compact(self.service.clock().today()));
        let run = self.write_backup(stem, &ExportFormat::ALL).await?;
        self.backups.write_marker(run.completed_at).await?;
        Ok(run)
    }

    /// Runs the scheduled backup when seven days have passed since the marker
    pub async fn run_weekly_if_due(&self) -> Result<Option<BackupRun>, ExportError> {
        let last = self.backups.read_marker().await;
        if !is_due(last, self.now()) {
            return Ok(None);
        }
        self.weekly_backup().await.map(Some)
    }

    /// Out-of-schedule weekly backup, excel only; resets the schedule
    pub async fn trigger_weekly(&self) -> Result<BackupRun, ExportError> {
        let stem = format!("manual_weekly_backup_{}", timestamp(self.now()));
        let run = self.write_backup(stem, &[ExportFormat::Excel]).await?;
        self.backups.write_marker(run.completed_at).await?;
        Ok(run)
    }

    pub async fn weekly_status(&self, scheduler_running: bool) -> Result<WeeklyStatus, ExportError> {
        let mut status = WeeklyStatus::compute(self.backups.read_marker().await, self.now());
        status.recent_backups = self.backups.recent_weekly(RECENT_WEEKLY_LIMIT).await?;
        status.total_claims = self.service.count_claims().await?;
        status.scheduler_running = scheduler_running;
        Ok(status)
    }
}
