//! Snapshot persistence
//!
//! Writes a cycle's records to every configured sink and reads the structured
//! sink back for the daily freshness check.

use chrono::NaiveDateTime;
use serde::Deserialize;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;
use tracing::{debug, info, warn};

use crate::domain::food::{FoodField, FoodRecord, NutritionFacts};
use crate::domain::freshness::{self, Freshness};
use crate::domain::snapshot::Snapshot;
use crate::infrastructure::config::{OutputConfig, SinkConfig, SinkKind};

/// Failure writing a sink
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Failed to write snapshot {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to serialize snapshot: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failure reading a snapshot back
#[derive(Error, Debug)]
pub enum SnapshotReadError {
    #[error("Snapshot {0:?} does not exist")]
    NotFound(PathBuf),

    #[error("Failed to read snapshot {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Snapshot {path:?} is not valid JSON: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Accepted on-disk shapes of the structured sink
#[derive(Deserialize)]
#[serde(untagged)]
enum StoredFoods {
    Document { foods: Vec<FoodRecord> },
    Bare(Vec<FoodRecord>),
}

#[derive(Debug, Clone)]
pub struct SnapshotStore {
    sinks: Vec<SinkConfig>,
    extra_keys: Vec<String>,
}

impl SnapshotStore {
    pub fn new(output: &OutputConfig) -> Self {
        Self {
            sinks: output.sinks.clone(),
            extra_keys: Vec::new(),
        }
    }

    /// Extra columns appended to tabular sinks, in order
    pub fn with_extra_keys(mut self, keys: Vec<String>) -> Self {
        self.extra_keys = keys;
        self
    }

    /// Structured sink consulted by the freshness check
    pub fn freshness_source(&self) -> Option<&Path> {
        self.sinks
            .iter()
            .find(|sink| sink.kind == SinkKind::Json)
            .map(|sink| sink.path.as_path())
    }

    /// Classify the persisted snapshot against `now`. Read problems are
    /// reported as `Unreadable`, never raised.
    pub async fn freshness(&self, now: NaiveDateTime) -> Freshness {
        let Some(path) = self.freshness_source() else {
            debug!("No structured sink configured; treating snapshot as missing");
            return Freshness::Missing;
        };

        match self.read_raw(path).await {
            Ok(content) => freshness::assess(Some(&content), now),
            Err(SnapshotReadError::NotFound(_)) => Freshness::Missing,
            Err(e) => Freshness::Unreadable(e.to_string()),
        }
    }

    /// Overwrite every sink with `snapshot`; returns the paths written
    pub async fn write_all(&self, snapshot: &Snapshot) -> Result<Vec<PathBuf>, StoreError> {
        let mut written = Vec::with_capacity(self.sinks.len());

        for sink in &self.sinks {
            let bytes = match sink.kind {
                SinkKind::Json => serde_json::to_vec_pretty(&snapshot.to_document())?,
                SinkKind::Csv => self.render_csv(&snapshot.foods).map_err(|source| StoreError::Io {
                    path: sink.path.clone(),
                    source,
                })?,
            };

            write_file(&sink.path, &bytes).await?;
            info!("💾 Wrote {} records to {:?}", snapshot.len(), sink.path);
            written.push(sink.path.clone());
        }

        Ok(written)
    }

    /// Records of the structured sink, `[]` when it is missing or unreadable
    pub async fn load_foods(&self) -> Vec<FoodRecord> {
        let Some(path) = self.freshness_source() else {
            return Vec::new();
        };

        match self.try_load_foods(path).await {
            Ok(foods) => foods,
            Err(SnapshotReadError::NotFound(_)) => Vec::new(),
            Err(e) => {
                warn!("⚠️  Could not load stored foods: {}", e);
                Vec::new()
            }
        }
    }

    /// Records stored at `path`, either inside a `{ foods }` document or as
    /// a bare array
    pub async fn try_load_foods(&self, path: &Path) -> Result<Vec<FoodRecord>, SnapshotReadError> {
        let content = self.read_raw(path).await?;
        let stored: StoredFoods = serde_json::from_str(&content).map_err(|source| SnapshotReadError::Json {
            path: path.to_path_buf(),
            source,
        })?;

        Ok(match stored {
            StoredFoods::Document { foods } | StoredFoods::Bare(foods) => foods,
        })
    }

    async fn read_raw(&self, path: &Path) -> Result<String, SnapshotReadError> {
        fs::read_to_string(path).await.map_err(|source| {
            if source.kind() == io::ErrorKind::NotFound {
                SnapshotReadError::NotFound(path.to_path_buf())
            } else {
                SnapshotReadError::Io {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })
    }

    fn csv_header(&self) -> Vec<String> {
        let mut header = vec!["location".to_string()];
        header.extend(FoodField::ALL.iter().map(|f| f.key().to_string()));
        header.push("meal_type".to_string());
        header.push("category".to_string());
        header.extend(self.extra_keys.iter().cloned());
        header
    }

    fn csv_row(&self, record: &FoodRecord) -> Vec<String> {
        let facts = NutritionFacts::from_record(record);
        let mut row = vec![record.location.to_string()];
        row.extend(FoodField::ALL.iter().map(|&field| {
            if field.is_numeric() {
                facts.value(field).map(|v| v.to_string()).unwrap_or_default()
            } else {
                record.get(field).to_string()
            }
        }));
        row.push(record.meal_type.as_str().to_string());
        row.push(record.category.clone().unwrap_or_default());
        row.extend(
            self.extra_keys
                .iter()
                .map(|key| record.extra.get(key).cloned().unwrap_or_default()),
        );
        row
    }

    fn render_csv(&self, foods: &[FoodRecord]) -> io::Result<Vec<u8>> {
        let mut out = Vec::new();
        write_row(&mut out, &self.csv_header(), ',')?;
        for record in foods {
            write_row(&mut out, &self.csv_row(record), ',')?;
        }
        Ok(out)
    }
}

async fn write_file(path: &Path, bytes: &[u8]) -> Result<(), StoreError> {
    let io_err = |source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).await.map_err(io_err)?;
    }
    fs::write(path, bytes).await.map_err(io_err)
}

fn needs_quotes(field: &str, sep: char) -> bool {
    field.contains(sep) || field.contains('"') || field.contains('\n') || field.contains('\r')
}

/// Write one CSV row terminated by `\n`
fn write_row<W: Write>(mut w: W, row: &[String], sep: char) -> io::Result<()> {
    for (i, cell) in row.iter().enumerate() {
        if i > 0 {
            write!(w, "{}", sep)?;
        }
        if needs_quotes(cell, sep) {
            write!(w, "\"{}\"", cell.replace('"', "\"\""))?;
        } else {
            write!(w, "{}", cell)?;
        }
    }
    writeln!(w)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::food::MealType;
    use crate::domain::location::DiningLocation;
    use tempfile::TempDir;

    fn at(s: &str) -> NaiveDateTime {
        s.parse().unwrap()
    }

    fn record(location: DiningLocation, name: &str, calories: &str) -> FoodRecord {
        let mut record = FoodRecord::new(location);
        record.name = name.to_string();
        record.calories = calories.to_string();
        record.meal_type = MealType::Lunch;
        record
    }

    fn json_store(dir: &TempDir) -> SnapshotStore {
        SnapshotStore::new(&OutputConfig {
            sinks: vec![SinkConfig::json(dir.path().join("data/foodData.json"))],
        })
    }

    #[tokio::test]
    async fn test_missing_snapshot_is_missing() {
        let dir = tempfile::tempdir().unwrap();
        let store = json_store(&dir);
        assert_eq!(store.freshness(at("2024-01-01T08:00:00")).await, Freshness::Missing);
        assert!(store.load_foods().await.is_empty());
    }

    #[tokio::test]
    async fn test_written_snapshot_is_current_same_day() {
        let dir = tempfile::tempdir().unwrap();
        let store = json_store(&dir);
        let snapshot = Snapshot::capture(
            vec![record(DiningLocation::Worcester, "Soup", "120")],
            at("2024-01-01T09:30:00"),
        );

        let written = store.write_all(&snapshot).await.unwrap();
        assert_eq!(written.len(), 1);

        assert!(!store.freshness(at("2024-01-01T23:59:00")).await.requires_refetch());
        assert!(store.freshness(at("2024-01-02T00:00:01")).await.requires_refetch());

        let foods = store.load_foods().await;
        assert_eq!(foods, snapshot.foods);
    }

    #[tokio::test]
    async fn test_legacy_bare_array_loads() {
        let dir = tempfile::tempdir().unwrap();
        let store = json_store(&dir);
        let path = store.freshness_source().unwrap().to_path_buf();
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, r#"[{"location": "franklin", "name": "Rice", "meal_type": "dinner"}]"#).unwrap();

        let foods = store.load_foods().await;
        assert_eq!(foods.len(), 1);
        assert_eq!(foods[0].location, DiningLocation::Franklin);
        assert_eq!(foods[0].meal_type, MealType::Dinner);
        assert_eq!(foods[0].calories, "");

        // A bare array has no timestamp
        assert!(matches!(
            store.freshness(at("2024-01-01T08:00:00")).await,
            Freshness::Unreadable(_)
        ));
    }

    #[tokio::test]
    async fn test_corrupt_snapshot_loads_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let store = json_store(&dir);
        let path = store.freshness_source().unwrap().to_path_buf();
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "{ truncated").unwrap();

        assert!(store.load_foods().await.is_empty());
        assert!(matches!(
            store.try_load_foods(&path).await,
            Err(SnapshotReadError::Json { .. })
        ));
    }

    #[tokio::test]
    async fn test_without_structured_sink_gate_reports_missing() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(&OutputConfig {
            sinks: vec![SinkConfig::csv(dir.path().join("foods.csv"))],
        });
        assert_eq!(store.freshness(at("2024-01-01T08:00:00")).await, Freshness::Missing);
    }

    #[tokio::test]
    async fn test_csv_sink_coerces_numeric_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("foods.csv");
        let store = SnapshotStore::new(&OutputConfig {
            sinks: vec![SinkConfig::csv(&path)],
        })
        .with_extra_keys(vec!["healthfulness".to_string()]);

        let mut quoted = record(DiningLocation::Hampshire, "Mac, Cheese", "n/a");
        quoted.category = Some("Entrees".to_string());
        quoted.extra.insert("healthfulness".to_string(), "42".to_string());
        let snapshot = Snapshot::capture(
            vec![quoted, record(DiningLocation::Berkshire, "Tofu", "210")],
            at("2024-01-01T09:30:00"),
        );
        store.write_all(&snapshot).await.unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("location,name,serving_size,calories,"));
        assert!(lines[0].ends_with(",meal_type,category,healthfulness"));
        assert!(!lines[0].contains("timestamp"));
        assert!(lines[1].starts_with("hampshire,\"Mac, Cheese\",,,"));
        assert!(lines[1].ends_with(",lunch,Entrees,42"));
        assert!(lines[2].starts_with("berkshire,Tofu,,210,"));
        assert!(lines[2].ends_with(",lunch,,"));
    }

    #[test]
    fn test_write_row_escapes_quotes() {
        let mut out = Vec::new();
        write_row(&mut out, &["say \"hi\"".to_string(), "plain".to_string()], ',').unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "\"say \"\"hi\"\"\",plain\n");
    }
}
