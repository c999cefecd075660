//! Runtime configuration
//!
//! All settings come from environment variables, with defaults rooted at the
//! project directory (the parent of `target/` when running a cargo build).

use std::path::PathBuf;
use std::time::Duration;

/// Delay between handing a document to the print surface and issuing the print call
pub const DEFAULT_PRINT_DELAY_MS: u64 = 500;

#[derive(Debug, Clone)]
pub struct ReportsConfig {
    pub database_path: PathBuf,
    pub logo_path: PathBuf,
    pub output_dir: PathBuf,
    /// External command that receives the rendered PDF path (e.g. `lp`)
    pub print_command: Option<String>,
    pub print_delay: Duration,
}

impl ReportsConfig {
    /// Resolve configuration from the environment
    pub fn from_env() -> Self {
        let root = project_root();

        let database_path = env_path("CLINIC_REPORTS_DATABASE_PATH")
            .unwrap_or_else(|| root.join("data").join("clinic.db"));
        let logo_path = env_path("CLINIC_REPORTS_LOGO_PATH")
            .unwrap_or_else(|| root.join("assets").join("logo.png"));
        let output_dir = env_path("CLINIC_REPORTS_OUTPUT_DIR")
            .unwrap_or_else(|| root.join("reports"));

        let print_command = std::env::var("CLINIC_REPORTS_PRINT_COMMAND")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        let print_delay_ms = std::env::var("CLINIC_REPORTS_PRINT_DELAY_MS")
            .ok()
            .and_then(|s| s.trim().parse::<u64>().ok())
            .unwrap_or(DEFAULT_PRINT_DELAY_MS);

        Self {
            database_path,
            logo_path,
            output_dir,
            print_command,
            print_delay: Duration::from_millis(print_delay_ms),
        }
    }
}

fn env_path(key: &str) -> Option<PathBuf> {
    std::env::var(key).ok().filter(|s| !s.is_empty()).map(PathBuf::from)
}

/// Directory of the running executable, walked up out of `target/{debug,release}`
pub fn project_root() -> PathBuf {
    let mut path = std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(|p| p.to_path_buf()))
        .unwrap_or_else(|| PathBuf::from("."));

    // Go up from target/release or target/debug to project root
    if path.ends_with("release") || path.ends_with("debug") {
        if let Some(parent) = path.parent() {
            if let Some(grandparent) = parent.parent() {
                path = grandparent.to_path_buf();
            }
        }
    }

    path
}
