//! Scrape cycle orchestration
//!
//! Checks the persisted snapshot, fetches every configured location in order,
//! extracts food records and hands the concatenation to the snapshot store.

use async_trait::async_trait;
use scraper::Html;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::domain::clock::Clock;
use crate::domain::food::{FoodRecord, MealType};
use crate::domain::location::DiningLocation;
use crate::domain::snapshot::Snapshot;
use crate::infrastructure::config::ScraperConfig;
use crate::infrastructure::parsing::{ContextualParser, MenuContext, MenuParser};
use crate::infrastructure::simple_http_client::FetchError;
use crate::infrastructure::snapshot_store::{SnapshotStore, StoreError};

/// Supplier of one menu page per location
#[async_trait]
pub trait DocumentSource: Send + Sync {
    /// Raw HTML of the location's menu page
    async fn fetch(&self, location: DiningLocation) -> Result<String, FetchError>;

    /// Where the location's page comes from, for logging
    fn source_url(&self, _location: DiningLocation) -> Option<String> {
        None
    }
}

/// What a cycle did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Today's snapshot already exists; nothing was fetched
    UpToDate,
    /// Every location came back empty; the previous snapshot is kept
    NothingScraped,
    /// A new snapshot replaced every sink
    Written { records: usize, sinks: Vec<PathBuf> },
}

/// Settings of the fetch loop
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub locations: Vec<DiningLocation>,
    /// Pause between two consecutive locations
    pub request_delay: Duration,
}

impl PipelineConfig {
    pub fn from_scraper_config(scraper: &ScraperConfig) -> Self {
        Self {
            locations: scraper.locations.clone(),
            request_delay: Duration::from_millis(scraper.request_delay_ms),
        }
    }
}

pub struct ScrapePipeline {
    source: Arc<dyn DocumentSource>,
    parser: Arc<MenuParser>,
    store: SnapshotStore,
    config: PipelineConfig,
}

impl ScrapePipeline {
    pub fn new(
        source: Arc<dyn DocumentSource>,
        parser: Arc<MenuParser>,
        store: SnapshotStore,
        config: PipelineConfig,
    ) -> Self {
        Self {
            source,
            parser,
            store,
            config,
        }
    }

    pub const fn store(&self) -> &SnapshotStore {
        &self.store
    }

    /// Run one cycle: gate, fetch, extract, persist
    pub async fn run(&self, clock: &dyn Clock) -> Result<CycleOutcome, StoreError> {
        let status = self.store.freshness(clock.now()).await;
        if !status.requires_refetch() {
            info!("✅ Snapshot is current ({:?}); skipping fetch", status);
            return Ok(CycleOutcome::UpToDate);
        }
        info!("🔄 Snapshot needs refresh: {:?}", status);

        let foods = self.collect_all().await;
        if foods.is_empty() {
            warn!("⚠️  No records scraped from any location; keeping previous snapshot");
            return Ok(CycleOutcome::NothingScraped);
        }

        let snapshot = Snapshot::capture(foods, clock.now());
        let sinks = self.store.write_all(&snapshot).await?;
        info!("✅ Saved {} records captured at {}", snapshot.len(), snapshot.captured_at);

        Ok(CycleOutcome::Written {
            records: snapshot.len(),
            sinks,
        })
    }

    /// Records of every configured location in location order; a location
    /// whose fetch fails contributes nothing
    pub async fn collect_all(&self) -> Vec<FoodRecord> {
        let mut all = Vec::new();

        for (index, &location) in self.config.locations.iter().enumerate() {
            if index > 0 && !self.config.request_delay.is_zero() {
                debug!("Waiting {:?} before next location", self.config.request_delay);
                tokio::time::sleep(self.config.request_delay).await;
            }

            let records = self.scrape_location(location).await;
            log_location_summary(location, &records);
            all.extend(records);
        }

        info!(
            "📊 Collected {} records from {} locations",
            all.len(),
            self.config.locations.len()
        );
        all
    }

    /// Records of one location, `[]` on transport failure
    pub async fn scrape_location(&self, location: DiningLocation) -> Vec<FoodRecord> {
        info!("🍽️  Scraping {}", location);

        let html = match self.source.fetch(location).await {
            Ok(html) => html,
            Err(e) => {
                warn!("⚠️  Failed to fetch menu for {}: {}", location, e);
                return Vec::new();
            }
        };

        // Html is not Send; it must not live across an await point
        let document = Html::parse_document(&html);
        let context = match self.source.source_url(location) {
            Some(url) => MenuContext::new(location).with_source_url(&url),
            None => MenuContext::new(location),
        };
        match self.parser.parse_with_context(&document, &context) {
            Ok(records) => records,
            Err(e) => {
                warn!("⚠️  Failed to parse menu for {}: {}", location, e);
                Vec::new()
            }
        }
    }
}

fn log_location_summary(location: DiningLocation, records: &[FoodRecord]) {
    let lunch = records.iter().filter(|r| r.meal_type == MealType::Lunch).count();
    let dinner = records.iter().filter(|r| r.meal_type == MealType::Dinner).count();
    info!(
        "{}: {} records ({} lunch, {} dinner, {} unknown)",
        location,
        records.len(),
        lunch,
        dinner,
        records.len() - lunch - dinner
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::clock::FixedClock;
    use crate::infrastructure::config::{OutputConfig, SinkConfig};
    use std::collections::HashMap;
    use std::sync::Mutex;

    struct StubSource {
        pages: HashMap<DiningLocation, String>,
        calls: Mutex<Vec<DiningLocation>>,
    }

    impl StubSource {
        fn new(pages: &[(DiningLocation, &str)]) -> Self {
            Self {
                pages: pages.iter().map(|(l, p)| (*l, p.to_string())).collect(),
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl DocumentSource for StubSource {
        async fn fetch(&self, location: DiningLocation) -> Result<String, FetchError> {
            self.calls.lock().unwrap().push(location);
            self.pages.get(&location).cloned().ok_or_else(|| FetchError::Status {
                url: format!("stub://{location}"),
                status: 503,
            })
        }
    }

    const PAGE: &str = r#"
        <div id="lunch_menu">
          <h2 class="menu_category_name">Soups</h2>
          <ul><li class="lightbox-nutrition"><a data-dish-name="Chowder" data-total-fat="4g">Chowder</a></li></ul>
        </div>"#;

    fn pipeline(dir: &tempfile::TempDir, source: Arc<StubSource>, locations: Vec<DiningLocation>) -> ScrapePipeline {
        let store = SnapshotStore::new(&OutputConfig {
            sinks: vec![SinkConfig::json(dir.path().join("foodData.json"))],
        });
        ScrapePipeline::new(
            source,
            Arc::new(MenuParser::new().unwrap()),
            store,
            PipelineConfig {
                locations,
                request_delay: Duration::ZERO,
            },
        )
    }

    fn clock(s: &str) -> FixedClock {
        FixedClock(s.parse().unwrap())
    }

    #[tokio::test]
    async fn test_failed_location_contributes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let source = Arc::new(StubSource::new(&[(DiningLocation::Worcester, PAGE)]));
        let pipeline = pipeline(
            &dir,
            source.clone(),
            vec![DiningLocation::Hampshire, DiningLocation::Worcester],
        );

        let records = pipeline.collect_all().await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].location, DiningLocation::Worcester);
        assert_eq!(records[0].total_fat_g, "4");
        assert_eq!(records[0].meal_type, MealType::Lunch);
        assert_eq!(records[0].category.as_deref(), Some("Soups"));
        assert_eq!(
            *source.calls.lock().unwrap(),
            vec![DiningLocation::Hampshire, DiningLocation::Worcester]
        );
    }

    #[tokio::test]
    async fn test_current_snapshot_skips_fetching() {
        let dir = tempfile::tempdir().unwrap();
        let source = Arc::new(StubSource::new(&[(DiningLocation::Franklin, PAGE)]));
        let pipeline = pipeline(&dir, source.clone(), vec![DiningLocation::Franklin]);

        let first = pipeline.run(&clock("2024-01-01T09:00:00")).await.unwrap();
        assert!(matches!(first, CycleOutcome::Written { records: 1, .. }));

        let second = pipeline.run(&clock("2024-01-01T18:00:00")).await.unwrap();
        assert_eq!(second, CycleOutcome::UpToDate);
        assert_eq!(source.calls.lock().unwrap().len(), 1);

        let next_day = pipeline.run(&clock("2024-01-02T00:05:00")).await.unwrap();
        assert!(matches!(next_day, CycleOutcome::Written { .. }));
        assert_eq!(source.calls.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_empty_cycle_keeps_previous_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let source = Arc::new(StubSource::new(&[]));
        let pipeline = pipeline(&dir, source, DiningLocation::ALL.to_vec());

        let outcome = pipeline.run(&clock("2024-01-01T09:00:00")).await.unwrap();
        assert_eq!(outcome, CycleOutcome::NothingScraped);
        assert!(!dir.path().join("foodData.json").exists());
    }
}
