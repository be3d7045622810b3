//! Dining Menu Scraper - daily nutrition snapshot of campus dining menus
//!
//! Fetches each dining location's menu page, extracts one nutrition record
//! per menu item and persists the day's snapshot, refetching at most once per
//! calendar day.

// Module declarations
pub mod application;
pub mod domain;
pub mod infrastructure;

pub use application::{CycleOutcome, DocumentSource, ScrapePipeline};
pub use domain::{DiningLocation, FoodRecord, Freshness, MealType, Snapshot, should_refetch};
pub use infrastructure::{AppConfig, MenuParser, SnapshotStore};
