#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{error, info};

use dining_menu_scraper::application::{CycleOutcome, PipelineConfig, ScrapePipeline};
use dining_menu_scraper::domain::SystemClock;
use dining_menu_scraper::infrastructure::{
    ConfigManager, HttpMenuSource, MenuParser, SnapshotStore, init_logging_with_config, log_system_info,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Optional first argument: explicit config file
    let config_manager = match std::env::args().nth(1) {
        Some(path) => ConfigManager::with_path(path),
        None => ConfigManager::new()?,
    };
    let (config, origin) = config_manager.load_config_with_origin().await?;

    init_logging_with_config(config.logging.clone()).context("Failed to initialize logging")?;
    log_system_info();
    origin.log(config_manager.config_path());

    let extra_keys = config.extraction.extra_keys();
    let parser = MenuParser::with_config(config.extraction).context("Invalid extraction configuration")?;
    let source = HttpMenuSource::from_scraper_config(&config.scraper).context("Failed to create HTTP client")?;
    let store = SnapshotStore::new(&config.output).with_extra_keys(extra_keys);

    let pipeline = ScrapePipeline::new(
        Arc::new(source),
        Arc::new(parser),
        store,
        PipelineConfig::from_scraper_config(&config.scraper),
    );

    match pipeline.run(&SystemClock).await {
        Ok(CycleOutcome::UpToDate) => info!("Data is up to date, no need to scrape"),
        Ok(CycleOutcome::NothingScraped) => info!("No data was scraped; previous snapshot left in place"),
        Ok(CycleOutcome::Written { records, sinks }) => {
            info!("Scraping complete: {} records written to {:?}", records, sinks);
        }
        Err(e) => {
            error!("❌ Failed to save snapshot: {}", e);
            return Err(e).context("Scrape cycle failed");
        }
    }

    Ok(())
}
