//! Dining locations served by the menu site

use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the fixed dining commons that publish a nutrition menu
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiningLocation {
    Hampshire,
    Worcester,
    Franklin,
    Berkshire,
}

impl DiningLocation {
    /// All known locations, in the order they are scraped by default
    pub const ALL: [Self; 4] = [
        Self::Hampshire,
        Self::Worcester,
        Self::Franklin,
        Self::Berkshire,
    ];

    /// Path segment used in menu URLs and in serialized records
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Hampshire => "hampshire",
            Self::Worcester => "worcester",
            Self::Franklin => "franklin",
            Self::Berkshire => "berkshire",
        }
    }
}

impl fmt::Display for DiningLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_serializes_lowercase() {
        let json = serde_json::to_string(&DiningLocation::Worcester).unwrap();
        assert_eq!(json, "\"worcester\"");
    }
}
