use anyhow::Result;
use mirror_core::ReportFormatter;
use tracing::info;

/// Runs one full mirror: cancel, close orphans, adjust, report.
pub async fn run(config_path: &str) -> Result<()> {
    info!("Starting mirror run with config: {}", config_path);

    let engine = super::build_engine(config_path)?;
    let report = engine.run().await?;

    println!("{}", ReportFormatter::format_report(&report));
    Ok(())
}
