//! Export, re-import and backup tests against the in-memory store

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use rust_decimal_macros::dec;
use tempfile::TempDir;

use core_kernel::{Clock, FixedClock};
use domain_claims::{ClaimFilter, ClaimForm, ClaimService, ClaimStore, InMemoryClaimStore};

use infra_export::backup::{MARKER_FILE, RECENT_WEEKLY_LIMIT};
use infra_export::{
    read_rows, BackupDirectory, BackupError, BackupScheduler, ExportFormat, Exporter, SchedulerConfig,
};

fn june_first() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
}

fn exporter(dir: &TempDir) -> Exporter {
    let store: Arc<dyn ClaimStore> = Arc::new(InMemoryClaimStore::new());
    let clock: Arc<dyn Clock> = Arc::new(FixedClock::on(june_first()));
    Exporter::new(ClaimService::new(store, clock), BackupDirectory::new(dir.path()))
}

fn form(claim_no: &str, client: &str) -> ClaimForm {
    ClaimForm {
        claim_no: claim_no.to_string(),
        client_name: client.to_string(),
        branch: Some("ATL".to_string()),
        intent_date: Some(june_first()),
        claimed_amount: Some(dec!(1000)),
        paid_by_carrier: Some(dec!(250)),
        ..Default::default()
    }
}

async fn seed(exporter: &Exporter) {
    let service = exporter.service();
    for (claim_no, client) in [("S1001", "Acme Corp"), ("S1002", "Beta LLC"), ("S1003", "Acme Corp")] {
        service.create_claim(form(claim_no, client)).await.unwrap();
    }
}

// ============================================================================
// Exports
// ============================================================================

mod export_tests {
    use super::*;

    #[tokio::test]
    async fn test_csv_export_is_named_and_copied_to_backups() {
        let dir = tempfile::tempdir().expect("tempdir");
        let exporter = exporter(&dir);
        seed(&exporter).await;

        let file = exporter
            .export(ExportFormat::Csv, &ClaimFilter::default())
            .await
            .unwrap();
        assert_eq!(file.file_name, "claims_all_clients_20250601_120000.csv");
        assert_eq!(file.content_type, "text/csv");
        assert_eq!(file.records, 3);

        let text = String::from_utf8(file.bytes.clone()).unwrap();
        assert_eq!(text.lines().count(), 4);
        assert!(text.contains("S1002,-,-,CLM000002,Beta LLC,No,06/01/25"));

        let copy = file.backup_path.unwrap();
        assert!(copy.ends_with("exports/csv/claims_all_clients_20250601_120000.csv"));
        assert_eq!(std::fs::read(copy).unwrap(), file.bytes);
    }

    #[tokio::test]
    async fn test_client_filter_names_the_file_and_limits_rows() {
        let dir = tempfile::tempdir().expect("tempdir");
        let exporter = exporter(&dir);
        seed(&exporter).await;
        let acme = exporter
            .service()
            .list_clients()
            .await
            .unwrap()
            .into_iter()
            .find(|c| c.name == "Acme Corp")
            .unwrap();

        let filter = ClaimFilter {
            client: Some(acme.id.to_string()),
            ..Default::default()
        };
        let file = exporter.export(ExportFormat::Excel, &filter).await.unwrap();
        assert_eq!(file.file_name, "claims_Acme_Corp_20250601_120000.xlsx");
        assert_eq!(file.records, 2);
    }

    #[tokio::test]
    async fn test_pdf_export() {
        let dir = tempfile::tempdir().expect("tempdir");
        let exporter = exporter(&dir);
        seed(&exporter).await;

        let file = exporter
            .export(ExportFormat::Pdf, &ClaimFilter::default())
            .await
            .unwrap();
        assert_eq!(file.content_type, "application/pdf");
        assert!(file.bytes.starts_with(b"%PDF"));
    }
}

// ============================================================================
// Re-import
// ============================================================================

mod reimport_tests {
    use super::*;

    async fn reimport(format: ExportFormat) {
        let dir = tempfile::tempdir().expect("tempdir");
        let exporter = exporter(&dir);
        seed(&exporter).await;

        let file = exporter
            .export(format, &ClaimFilter::default())
            .await
            .unwrap();
        let rows = read_rows(&file.bytes, &file.file_name).unwrap();
        assert_eq!(rows.len(), 3);

        let report = exporter.service().import_rows(rows).await;
        assert_eq!(report.created_count(), 0);
        assert_eq!(report.skipped_count(), 3);
        assert_eq!(report.error_count(), 0);
        assert_eq!(exporter.service().count_claims().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_workbook_export_reimports_without_duplicates() {
        reimport(ExportFormat::Excel).await;
    }

    #[tokio::test]
    async fn test_csv_export_reimports_without_duplicates() {
        reimport(ExportFormat::Csv).await;
    }
}

// ============================================================================
// Backups
// ============================================================================

mod backup_tests {
    use super::*;

    #[tokio::test]
    async fn test_manual_backup_writes_every_format() {
        let dir = tempfile::tempdir().expect("tempdir");
        let exporter = exporter(&dir);
        seed(&exporter).await;

        let run = exporter.manual_backup().await.unwrap();
        assert_eq!(run.stem, "manual_backup_20250601_120000");
        assert_eq!(run.records, 3);
        assert_eq!(
            run.files,
            [
                "manual_backup_20250601_120000.xlsx",
                "manual_backup_20250601_120000.csv",
                "manual_backup_20250601_120000.pdf"
            ]
        );

        let listing = exporter.backups().list_all().await.unwrap();
        assert_eq!(listing.total(), 3);
        assert_eq!(listing.csv[0].name, "manual_backup_20250601_120000.csv");
        assert!(listing.csv[0].size > 0);
    }

    #[tokio::test]
    async fn test_listing_an_empty_directory() {
        let dir = tempfile::tempdir().expect("tempdir");
        let exporter = exporter(&dir);
        assert_eq!(exporter.backups().list_all().await.unwrap().total(), 0);
    }

    #[tokio::test]
    async fn test_download_names_are_guarded() {
        let dir = tempfile::tempdir().expect("tempdir");
        let exporter = exporter(&dir);
        exporter.manual_backup().await.unwrap();
        let backups = exporter.backups();

        let found = backups
            .read(ExportFormat::Csv, "manual_backup_20250601_120000.csv")
            .await
            .unwrap();
        assert!(found.is_some());

        assert!(backups.read(ExportFormat::Csv, "missing.csv").await.unwrap().is_none());
        for name in ["../last_backup.txt", "..", "csv/x.csv", ""] {
            let err = backups.read(ExportFormat::Csv, name).await.unwrap_err();
            assert!(matches!(err, BackupError::InvalidName(_)), "{name}");
        }
    }

    #[tokio::test]
    async fn test_weekly_backup_moves_the_schedule() {
        let dir = tempfile::tempdir().expect("tempdir");
        let exporter = exporter(&dir);
        seed(&exporter).await;

        let run = exporter.run_weekly_if_due().await.unwrap().unwrap();
        assert_eq!(run.stem, "weekly_backup_20250601");
        assert_eq!(run.files.len(), 3);
        assert!(exporter.run_weekly_if_due().await.unwrap().is_none());

        let status = exporter.weekly_status(false).await.unwrap();
        assert!(!status.overdue);
        assert_eq!(status.days_until, 7);
        assert_eq!(status.total_claims, 3);
        assert_eq!(status.recent_backups.len(), 1);
        assert!(status.recent_backups.len() <= RECENT_WEEKLY_LIMIT);
    }

    #[tokio::test]
    async fn test_unreadable_marker_means_due() {
        let dir = tempfile::tempdir().expect("tempdir");
        let exporter = exporter(&dir);
        let root = exporter.backups().root().to_path_buf();
        std::fs::create_dir_all(&root).unwrap();
        std::fs::write(root.join(MARKER_FILE), "not a date").unwrap();

        let status = exporter.weekly_status(false).await.unwrap();
        assert!(status.overdue);
        assert!(status.last_backup.is_none());
        assert!(exporter.run_weekly_if_due().await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_triggered_weekly_backup_is_excel_only() {
        let dir = tempfile::tempdir().expect("tempdir");
        let exporter = exporter(&dir);

        let run = exporter.trigger_weekly().await.unwrap();
        assert_eq!(run.files, ["manual_weekly_backup_20250601_120000.xlsx"]);
        assert!(exporter.backups().read_marker().await.is_some());

        let listing = exporter.backups().list_all().await.unwrap();
        assert_eq!(listing.excel.len(), 1);
        assert!(listing.csv.is_empty());
        assert!(listing.pdf.is_empty());
    }
}

// ============================================================================
// Scheduler
// ============================================================================

mod scheduler_tests {
    use super::*;

    #[tokio::test]
    async fn test_scheduler_runs_once_and_starts_once() {
        let dir = tempfile::tempdir().expect("tempdir");
        let exporter = exporter(&dir);
        let marker = exporter.backups().marker_path();
        let scheduler = BackupScheduler::new(exporter, SchedulerConfig::default());

        assert!(scheduler.start().await);
        assert!(!scheduler.start().await);
        assert!(scheduler.is_running().await);

        for _ in 0..250 {
            if marker.exists() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        assert!(marker.exists());

        scheduler.stop().await;
        assert!(!scheduler.is_running().await);
        assert!(scheduler.start().await);
        scheduler.stop().await;
    }
}
