//! Parsing context for menu extraction

use crate::domain::location::DiningLocation;

/// Context information for parsing one menu page
#[derive(Debug, Clone)]
pub struct MenuContext {
    /// Location the page belongs to; stamped on every record
    pub location: DiningLocation,

    /// URL the page was fetched from, for logging
    pub source_url: Option<String>,
}

impl MenuContext {
    pub const fn new(location: DiningLocation) -> Self {
        Self {
            location,
            source_url: None,
        }
    }

    pub fn with_source_url(mut self, url: &str) -> Self {
        self.source_url = Some(url.to_string());
        self
    }
}
