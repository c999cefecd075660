//! Clinic Reports
//!
//! An MCP server for the clinic's monthly medical reports.

use std::sync::Arc;

use clinic_reports::build_info;
use clinic_reports::config::ReportsConfig;
use clinic_reports::db::{self, Database};
use clinic_reports::mcp::ReportsService;
use clinic_reports::reports::{ExportSurface, FileExportSurface, ReportEngine, SqliteRecordStore};
use rmcp::ServiceExt;
use tokio::io::{stdin, stdout};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging (output to stderr to not interfere with MCP stdio)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("clinic_reports=info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    // Print startup banner to stderr
    build_info::print_startup_banner();
    eprintln!("Starting MCP server on stdio...");

    let config = ReportsConfig::from_env();
    eprintln!("Database path: {}", config.database_path.display());
    eprintln!("Logo path: {}", config.logo_path.display());
    eprintln!("Output directory: {}", config.output_dir.display());

    // Initialize database (creates the data directory and runs migrations)
    eprintln!("Initializing database...");
    let database = Database::open(&config.database_path)?;
    let version = database.with_conn(db::migrations::get_schema_version)?;
    eprintln!("Database schema version: {}", version);

    let engine = Arc::new(ReportEngine::new(Arc::new(SqliteRecordStore::new(database))));
    let surface: Arc<dyn ExportSurface> = Arc::new(FileExportSurface::new(
        config.output_dir.clone(),
        config.print_command.clone(),
    ));

    // Create the reports service
    let service = ReportsService::new(&config, engine, surface);

    // Create stdio transport
    let transport = (stdin(), stdout());

    // Start the MCP server
    let server = service.serve(transport).await?;

    // Wait for the server to complete
    server.waiting().await?;

    Ok(())
}
