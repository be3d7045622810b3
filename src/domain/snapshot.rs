//! Persisted result of one full scrape cycle

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::food::FoodRecord;

/// `timestamp` layout written to the structured sink (ISO-8601, local time)
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// All records of one cycle plus the moment they were captured
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub captured_at: NaiveDateTime,
    pub foods: Vec<FoodRecord>,
}

/// On-disk shape of the structured sink
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotDocument {
    pub timestamp: String,
    pub date: String,
    pub foods: Vec<FoodRecord>,
}

impl Snapshot {
    pub const fn capture(foods: Vec<FoodRecord>, captured_at: NaiveDateTime) -> Self {
        Self { captured_at, foods }
    }

    pub fn capture_date(&self) -> NaiveDate {
        self.captured_at.date()
    }

    pub fn len(&self) -> usize {
        self.foods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.foods.is_empty()
    }

    pub fn to_document(&self) -> SnapshotDocument {
        SnapshotDocument {
            timestamp: self.captured_at.format(TIMESTAMP_FORMAT).to_string(),
            date: self.captured_at.format(DATE_FORMAT).to_string(),
            foods: self.foods.clone(),
        }
    }
}
