use anyhow::Result;
use chrono::Utc;
use tracing::info;

use fleet_report::{logging, Config, ReportRunner};

fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let config = Config::load()?;

    logging::init_logging(&config.logging)?;

    info!("Starting fleet report v{}", env!("CARGO_PKG_VERSION"));
    info!(snapshot = %config.input.snapshot_path, "Reading snapshot");

    let mut runner = ReportRunner::new(config)?;
    let output = runner.run(Utc::now())?;

    for file in &output.files {
        info!(path = %file.display(), "Wrote");
    }

    Ok(())
}
