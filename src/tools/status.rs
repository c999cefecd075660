//! Clinic Reports Status Tool
//!
//! Provides runtime status information about the reports service.

use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;
use sysinfo::{Pid, ProcessesToUpdate, System};

use crate::build_info::BuildInfo;
use crate::config::ReportsConfig;

/// Report workflow instructions for AI assistants
pub const REPORT_INSTRUCTIONS: &str = r#"
# Clinic Reports Instructions

This guide explains how to produce the monthly medical report with the Clinic Reports tools.

## Overview

A report covers one calendar month. It is built from two record sets:
1. **Medicine requests** - dispensed medicines with the visit's complaint and the patient's gender, filtered to the selected month
2. **Employee profiles** - every profile, classified into age brackets as of today

---

## Workflow

1. Call `list_report_periods` to see the month names and the selectable years
2. Call `load_report` with `month` (0 = January ... 11 = December) and `year`
3. Read the returned summary: totals, medicine table, complaints by gender, age brackets by gender
4. Export with `export_report_csv` or `print_report`

Loading another period replaces the current report. If a load is still running when a newer
one starts, the older result is discarded.

---

## When Loading Fails

If either record query fails the report enters the **failed** state with the message
"Failed to load data. Please try again." Nothing is partially shown.

- `retry_report` re-runs the failed load for the same month and reference date
- `refresh_report` reloads the selected month as of today
- `get_report_state` shows whether the report is idle, loading, ready or failed

---

## Exports

**CSV** (`export_report_csv`)
- Saved as `Medical_Reports_<Month>_<Year>.csv` in the output directory
- Sections: MEDICINE DISTRIBUTION, HEALTH COMPLAINTS BY GENDER, AGE DISTRIBUTION BY GENDER, SUMMARY
- Values are not quoted; a comma inside a medicine or complaint name shifts its row

**Print** (`print_report`)
- Renders a PDF with the clinic letterhead, an executive summary and all tables
- Requires the letterhead logo; if it cannot be loaded nothing is printed
- The print call is issued shortly after the document is written; its result is not reported

---

## Counting Rules

- Medicines are counted per request; complaints only when gender is exactly "Male" or "Female"
- Tables are sorted by count, highest first; ties keep the order first seen
- Age brackets: 18-25, 26-35, 36-45, 46-55, 55+
- Profiles under 18, without a date of birth, or without a recognised gender are left out
- Every exclusion is tallied in the `excluded` section of the summary
"#;

/// Runtime status of the reports service
#[derive(Debug, Clone, Serialize)]
pub struct ReportsStatus {
    /// Build information
    pub build_number: u64,
    pub build_timestamp: &'static str,
    pub version: &'static str,

    /// Database information
    pub database_path: String,
    pub database_size_bytes: Option<u64>,

    /// Export configuration
    pub logo_path: String,
    pub logo_present: bool,
    pub output_dir: String,
    pub print_command: Option<String>,

    /// Report state
    pub report_state: &'static str,
    pub report_period: Option<String>,

    /// Process information
    pub uptime_seconds: u64,
    pub process_id: u32,
    pub memory_usage_bytes: u64,
}

/// Status tracker for collecting runtime information
pub struct StatusTracker {
    start_time: Instant,
    database_path: PathBuf,
    logo_path: PathBuf,
    output_dir: PathBuf,
    print_command: Option<String>,
}

impl StatusTracker {
    pub fn new(config: &ReportsConfig) -> Self {
        Self {
            start_time: Instant::now(),
            database_path: config.database_path.clone(),
            logo_path: config.logo_path.clone(),
            output_dir: config.output_dir.clone(),
            print_command: config.print_command.clone(),
        }
    }

    /// Get the current status alongside the report engine's state
    pub fn get_status(&self, report_state: &'static str, report_period: Option<String>) -> ReportsStatus {
        let build_info = BuildInfo::current();

        let database_size_bytes = std::fs::metadata(&self.database_path)
            .ok()
            .map(|m| m.len());

        let pid = std::process::id();
        let mut sys = System::new();
        sys.refresh_processes(ProcessesToUpdate::Some(&[Pid::from_u32(pid)]));

        let memory_usage_bytes = sys
            .process(Pid::from_u32(pid))
            .map(|p| p.memory())
            .unwrap_or(0);

        ReportsStatus {
            build_number: build_info.build_number,
            build_timestamp: build_info.build_timestamp,
            version: build_info.version,
            database_path: self.database_path.display().to_string(),
            database_size_bytes,
            logo_path: self.logo_path.display().to_string(),
            logo_present: self.logo_path.is_file(),
            output_dir: self.output_dir.display().to_string(),
            print_command: self.print_command.clone(),
            report_state,
            report_period,
            uptime_seconds: self.start_time.elapsed().as_secs(),
            process_id: pid,
            memory_usage_bytes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_status_reports_database_and_logo() {
        let dir = tempfile::tempdir().unwrap();
        let database_path = dir.path().join("clinic.db");
        std::fs::write(&database_path, b"0123456789").unwrap();

        let config = ReportsConfig {
            database_path,
            logo_path: dir.path().join("missing-logo.png"),
            output_dir: dir.path().join("reports"),
            print_command: None,
            print_delay: Duration::from_millis(500),
        };
        let tracker = StatusTracker::new(&config);
        let status = tracker.get_status("ready", Some("June 2024".to_string()));

        assert_eq!(status.database_size_bytes, Some(10));
        assert!(!status.logo_present);
        assert_eq!(status.report_state, "ready");
        assert_eq!(status.process_id, std::process::id());
    }
}
