//! Domain module - Core scraping entities and policies
//!
//! This module contains the food record model, the snapshot that a scrape
//! cycle produces, and the freshness policy deciding when to scrape again.
//!
//! Modern Rust module organization (Rust 2018+ style):
//! - Each module is its own file in the domain/ directory
//! - Public exports are defined here for convenience

pub mod clock;
pub mod food;
pub mod freshness;
pub mod location;
pub mod snapshot;

pub use clock::{Clock, FixedClock, SystemClock};
pub use food::{FoodField, FoodRecord, MealType, NutritionFacts, UnitSuffix, coerce_numeric};
pub use freshness::{Freshness, should_refetch};
pub use location::DiningLocation;
pub use snapshot::{Snapshot, SnapshotDocument};
