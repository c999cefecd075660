//! Clinic Reports MCP Server Implementation
//!
//! Exposes report loading and export as MCP tools.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chrono::Local;
use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{
    CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo,
};
use rmcp::{schemars, tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::config::ReportsConfig;
use crate::reports::{
    self, ExportSurface, ReportEngine, ReportError, ReportPeriod, ReportState, MONTH_NAMES,
};
use crate::tools::status::StatusTracker;

/// Clinic Reports MCP Service
#[derive(Clone)]
pub struct ReportsService {
    status_tracker: Arc<Mutex<StatusTracker>>,
    engine: Arc<ReportEngine>,
    surface: Arc<dyn ExportSurface>,
    logo_path: PathBuf,
    print_delay: Duration,
    tool_router: ToolRouter<ReportsService>,
}

impl ReportsService {
    pub fn new(config: &ReportsConfig, engine: Arc<ReportEngine>, surface: Arc<dyn ExportSurface>) -> Self {
        Self {
            status_tracker: Arc::new(Mutex::new(StatusTracker::new(config))),
            engine,
            surface,
            logo_path: config.logo_path.clone(),
            print_delay: config.print_delay,
            tool_router: Self::tool_router(),
        }
    }
}

// ============================================================================
// Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct LoadReportParams {
    /// Zero-based month index (0 = January, 11 = December)
    pub month: u32,
    /// Four-digit year
    pub year: i32,
}

// ============================================================================
// Response Structs
// ============================================================================

#[derive(Debug, Serialize)]
struct MonthOption {
    index: u32,
    name: &'static str,
}

#[derive(Debug, Serialize)]
struct ReportPeriodsResponse {
    months: Vec<MonthOption>,
    years: Vec<i32>,
    default_month: u32,
    default_year: i32,
}

#[derive(Debug, Serialize)]
struct CsvExportResponse {
    success: bool,
    filename: String,
    path: String,
    message: String,
}

// ============================================================================
// Helpers
// ============================================================================

fn report_error(e: ReportError) -> McpError {
    match e {
        ReportError::InvalidPeriod { .. } | ReportError::NotReady | ReportError::NothingToRetry => {
            McpError::invalid_params(e.to_string(), None)
        }
        _ => McpError::internal_error(e.to_string(), None),
    }
}

fn json_result<T: Serialize>(value: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| McpError::internal_error(format!("Serialization error: {}", e), None))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

fn state_view(state: &ReportState) -> serde_json::Value {
    match state {
        ReportState::Idle => serde_json::json!({ "state": state.name() }),
        ReportState::Loading { request } => serde_json::json!({
            "state": state.name(),
            "period": request.period.label(),
        }),
        ReportState::Ready(model) => serde_json::json!({
            "state": state.name(),
            "report": model.summary(),
        }),
        ReportState::Failed { request, message } => serde_json::json!({
            "state": state.name(),
            "period": request.period.label(),
            "reference_date": request.reference_date,
            "message": message,
            "can_retry": true,
        }),
    }
}

// ============================================================================
// Tool Router
// ============================================================================

#[tool_router]
impl ReportsService {
    // --- Status ---

    #[tool(description = "Get the current status of the Clinic Reports service including build info, database, export settings, report state and process information")]
    async fn report_status(&self) -> Result<CallToolResult, McpError> {
        let state = self.engine.state();
        let period = state.period().map(|p| p.label());
        let tracker = self.status_tracker.lock().await;
        let status = tracker.get_status(state.name(), period);
        json_result(&status)
    }

    #[tool(description = "Get step-by-step instructions for producing and exporting the monthly medical report. Call this when unsure how to use the report tools.")]
    fn report_instructions(&self) -> Result<CallToolResult, McpError> {
        use crate::tools::status::REPORT_INSTRUCTIONS;
        Ok(CallToolResult::success(vec![Content::text(REPORT_INSTRUCTIONS)]))
    }

    // --- Loading ---

    #[tool(description = "List selectable report periods: month names with their zero-based index, and the years offered (current year -2 to +2)")]
    fn list_report_periods(&self) -> Result<CallToolResult, McpError> {
        let today = Local::now().date_naive();
        let current = ReportPeriod::containing(today);
        let response = ReportPeriodsResponse {
            months: MONTH_NAMES
                .into_iter()
                .zip(0u32..)
                .map(|(name, index)| MonthOption { index, name })
                .collect(),
            years: reports::year_options(today),
            default_month: current.month(),
            default_year: current.year(),
        };
        json_result(&response)
    }

    #[tool(description = "Load the medical report for a month. Fetches that month's medicine requests and all profiles, then returns totals, medicine distribution, complaints by gender and age brackets by gender.")]
    async fn load_report(&self, Parameters(p): Parameters<LoadReportParams>) -> Result<CallToolResult, McpError> {
        let period = ReportPeriod::new(p.month, p.year).map_err(report_error)?;
        let today = Local::now().date_naive();
        let model = self.engine.load(period, today).await.map_err(report_error)?;
        json_result(&model.summary())
    }

    #[tool(description = "Reload the currently selected month with fresh data")]
    async fn refresh_report(&self) -> Result<CallToolResult, McpError> {
        let today = Local::now().date_naive();
        let model = self.engine.refresh(today).await.map_err(report_error)?;
        json_result(&model.summary())
    }

    #[tool(description = "Retry a report load that failed. Only valid when get_report_state shows 'failed'.")]
    async fn retry_report(&self) -> Result<CallToolResult, McpError> {
        let model = self.engine.retry().await.map_err(report_error)?;
        json_result(&model.summary())
    }

    #[tool(description = "Get the report state: idle, loading, ready (with the report) or failed (with the error message)")]
    fn get_report_state(&self) -> Result<CallToolResult, McpError> {
        json_result(&state_view(&self.engine.state()))
    }

    // --- Export ---

    #[tool(description = "Export the loaded report as CSV (Medical_Reports_<Month>_<Year>.csv) into the output directory")]
    async fn export_report_csv(&self) -> Result<CallToolResult, McpError> {
        let model = self.engine.current().map_err(report_error)?;
        let generated_at = Local::now().naive_local();
        let surface = self.surface.clone();

        let path = tokio::task::spawn_blocking(move || {
            reports::export_csv(&model, generated_at, surface.as_ref())
        })
        .await
        .map_err(|e| McpError::internal_error(e.to_string(), None))?
        .map_err(report_error)?;

        let filename = path
            .file_name()
            .map(|f| f.to_string_lossy().into_owned())
            .unwrap_or_default();
        json_result(&CsvExportResponse {
            success: true,
            message: format!("Saved {}", filename),
            filename,
            path: path.display().to_string(),
        })
    }

    #[tool(description = "Render the loaded report as a printable PDF with the clinic letterhead and send it to the printer. Fails without printing if the letterhead logo cannot be loaded.")]
    async fn print_report(&self) -> Result<CallToolResult, McpError> {
        let model = self.engine.current().map_err(report_error)?;
        let generated_at = Local::now().naive_local();
        let outcome = reports::print_report(
            &model,
            &self.logo_path,
            generated_at,
            self.surface.clone(),
            self.print_delay,
        )
        .await
        .map_err(report_error)?;
        json_result(&outcome)
    }
}

// ============================================================================
// Server Handler
// ============================================================================

#[tool_handler]
impl ServerHandler for ReportsService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "clinic-reports".into(),
                version: crate::build_info::VERSION.into(),
                title: Some("Clinic Reports".into()),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Clinic Reports - monthly medicine, complaint and age-bracket reports. \
                 IMPORTANT: Call report_instructions before the first report. \
                 Periods: list_report_periods. \
                 Loading: load_report (month 0-11, year), refresh_report, retry_report, get_report_state. \
                 Export: export_report_csv, print_report (both need a loaded report). \
                 Status: report_status."
                    .into(),
            ),
        }
    }
}
