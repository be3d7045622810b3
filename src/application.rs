//! Application layer module
//!
//! This module contains the scrape cycle that orchestrates the domain logic
//! over the infrastructure adapters.

pub mod scrape_pipeline;

pub use scrape_pipeline::{CycleOutcome, DocumentSource, PipelineConfig, ScrapePipeline};
