//! Claims Export and Backup Infrastructure
//!
//! Turns claim lists into files and files back into import rows:
//!
//! - [`xlsx`], [`delimited`] and [`pdf`] render the fixed export column set
//! - [`readers`] reads an uploaded workbook or CSV into sheet cells
//! - [`backup`] owns the on-disk backup directory and the weekly marker
//! - [`Exporter`] ties the claims service to the writers and the backups
//! - [`BackupScheduler`] runs the weekly backup as one owned tokio task

pub mod backup;
pub mod columns;
pub mod delimited;
pub mod error;
pub mod exporter;
pub mod format;
pub mod pdf;
pub mod readers;
pub mod scheduler;
pub mod xlsx;

pub use backup::{format_file_size, BackupDirectory, BackupFile, BackupListing, WeeklyStatus};
pub use error::{BackupError, ExportError};
pub use exporter::{BackupRun, ExportedFile, Exporter};
pub use format::ExportFormat;
pub use readers::read_rows;
pub use scheduler::{BackupScheduler, SchedulerConfig};
