use anyhow::Result;
use mirror_core::ReportFormatter;
use tracing::info;

/// Fetches snapshots and prints the plan. Nothing is cancelled or submitted.
pub async fn run(config_path: &str, json: bool) -> Result<()> {
    info!("Computing mirror plan with config: {}", config_path);

    let engine = super::build_engine(config_path)?;
    let plan = engine.plan().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&plan)?);
    } else {
        println!("{}", ReportFormatter::format_plan(&plan));
    }
    Ok(())
}
