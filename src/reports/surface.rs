//! Export surface
//!
//! Where finished exports go: CSV downloads are saved, print documents are
//! rendered to a file and then handed to the printer.

use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDateTime;
use tokio::task::JoinHandle;

use super::csv::render_csv;
use super::error::ReportResult;
use super::model::ReportModel;

pub trait ExportSurface: Send + Sync {
    /// Save a downloadable file, returning where it landed
    fn save_download(&self, filename: &str, bytes: &[u8]) -> ReportResult<PathBuf>;

    /// Materialise a print-ready document
    fn render_document(&self, filename: &str, pdf: &[u8]) -> ReportResult<PathBuf>;

    /// Send a rendered document to the printer
    fn print(&self, document: &Path) -> ReportResult<()>;
}

/// Writes exports into a directory and prints through an optional external command
#[derive(Debug, Clone)]
pub struct FileExportSurface {
    output_dir: PathBuf,
    print_command: Option<String>,
}

impl FileExportSurface {
    pub fn new(output_dir: PathBuf, print_command: Option<String>) -> Self {
        Self {
            output_dir,
            print_command,
        }
    }

    fn write(&self, filename: &str, bytes: &[u8]) -> ReportResult<PathBuf> {
        std::fs::create_dir_all(&self.output_dir)?;
        let path = self.output_dir.join(filename);
        std::fs::write(&path, bytes)?;
        Ok(path)
    }
}

impl ExportSurface for FileExportSurface {
    fn save_download(&self, filename: &str, bytes: &[u8]) -> ReportResult<PathBuf> {
        self.write(filename, bytes)
    }

    fn render_document(&self, filename: &str, pdf: &[u8]) -> ReportResult<PathBuf> {
        self.write(filename, pdf)
    }

    fn print(&self, document: &Path) -> ReportResult<()> {
        let Some(command) = &self.print_command else {
            tracing::info!(path = %document.display(), "No print command configured; document left for manual printing");
            return Ok(());
        };

        let status = Command::new(command).arg(document).status()?;
        if !status.success() {
            tracing::warn!(command = %command, %status, "Print command exited unsuccessfully");
        }
        Ok(())
    }
}

/// Render the model to CSV and save it as a download
pub fn export_csv(
    model: &ReportModel,
    generated_at: NaiveDateTime,
    surface: &dyn ExportSurface,
) -> ReportResult<PathBuf> {
    let export = render_csv(model, generated_at);
    let path = surface.save_download(&export.filename, export.as_bytes())?;
    tracing::info!(path = %path.display(), "CSV export saved");
    Ok(path)
}

/// Issue the print call once `delay` has passed.
///
/// Fire-and-forget: failures are logged, never returned. The handle is only
/// useful to callers that want to wait for the attempt.
pub fn schedule_print(
    surface: Arc<dyn ExportSurface>,
    document: PathBuf,
    delay: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        let result = tokio::task::spawn_blocking(move || surface.print(&document)).await;
        match result {
            Ok(Ok(())) => {}
            Ok(Err(e)) => tracing::warn!(error = %e, "Print call failed"),
            Err(e) => tracing::warn!(error = %e, "Print task failed"),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use crate::reports::period::ReportPeriod;
    use chrono::NaiveDate;

    #[derive(Default)]
    struct RecordingSurface {
        printed: Mutex<Vec<PathBuf>>,
    }

    impl ExportSurface for RecordingSurface {
        fn save_download(&self, filename: &str, _bytes: &[u8]) -> ReportResult<PathBuf> {
            Ok(PathBuf::from(filename))
        }

        fn render_document(&self, filename: &str, _pdf: &[u8]) -> ReportResult<PathBuf> {
            Ok(PathBuf::from(filename))
        }

        fn print(&self, document: &Path) -> ReportResult<()> {
            self.printed.lock().unwrap().push(document.to_path_buf());
            Ok(())
        }
    }

    #[test]
    fn test_export_csv_writes_named_file() {
        let dir = tempfile::tempdir().unwrap();
        let surface = FileExportSurface::new(dir.path().join("exports"), None);
        let model = ReportModel::build(
            ReportPeriod::new(2, 2025).unwrap(),
            &[],
            &[],
            NaiveDate::from_ymd_opt(2025, 3, 31).unwrap(),
        );
        let generated_at = NaiveDate::from_ymd_opt(2025, 3, 31)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap();

        let path = export_csv(&model, generated_at, &surface).unwrap();

        assert!(path.ends_with("Medical_Reports_March_2025.csv"));
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("Medical Reports for the Month of March 2025\r\n"));
    }

    #[tokio::test]
    async fn test_schedule_print_calls_surface_after_delay() {
        let surface = Arc::new(RecordingSurface::default());

        let handle = schedule_print(
            surface.clone(),
            PathBuf::from("report.pdf"),
            Duration::from_millis(10),
        );
        assert!(surface.printed.lock().unwrap().is_empty());

        handle.await.unwrap();
        assert_eq!(*surface.printed.lock().unwrap(), vec![PathBuf::from("report.pdf")]);
    }

    #[test]
    fn test_print_without_command_is_a_no_op() {
        let surface = FileExportSurface::new(PathBuf::from("unused"), None);
        surface.print(Path::new("report.pdf")).unwrap();
    }
}
