//! Extraction configuration for menu pages
//!
//! Centralized description of which nodes hold menu entries and which anchor
//! attributes map onto which record fields.

use serde::{Deserialize, Serialize};

use super::tree::NodeMarker;
use crate::domain::food::{FoodField, UnitSuffix};

/// Main extraction configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Marker of one nutrition entry
    pub entry_marker: NodeMarker,

    /// Tag of the node inside an entry that carries the data attributes
    pub anchor_tag: String,

    /// Tag of the enclosing section whose identifier names the meal
    pub section_tag: String,

    /// Identifier attribute on the enclosing section
    pub section_id_attribute: String,

    /// Marker of the category headings
    pub category_marker: NodeMarker,

    /// Anchor attribute for each record field
    pub fields: Vec<FieldMapping>,

    /// Additional attributes copied into `FoodRecord::extra`
    pub extra_fields: Vec<ExtraField>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldMapping {
    pub field: FoodField,
    pub attribute: String,
    #[serde(default)]
    pub unit: Option<UnitSuffix>,
}

impl FieldMapping {
    /// Mapping as published by the dining site
    pub fn standard(field: FoodField) -> Self {
        Self {
            field,
            attribute: field.default_attribute().to_string(),
            unit: field.unit(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtraField {
    /// Output key / column name
    pub key: String,
    pub attribute: String,
    #[serde(default)]
    pub unit: Option<UnitSuffix>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            entry_marker: NodeMarker::new("li", "lightbox-nutrition"),
            anchor_tag: "a".to_string(),
            section_tag: "div".to_string(),
            section_id_attribute: "id".to_string(),
            category_marker: NodeMarker::new("h2", "menu_category_name"),
            fields: FoodField::ALL.into_iter().map(FieldMapping::standard).collect(),
            extra_fields: Vec::new(),
        }
    }
}

impl ExtractionConfig {
    /// Add an extra attribute column (e.g. a healthfulness score)
    pub fn with_extra_field(mut self, key: &str, attribute: &str) -> Self {
        self.extra_fields.push(ExtraField {
            key: key.to_string(),
            attribute: attribute.to_string(),
            unit: None,
        });
        self
    }

    /// Extra column names in configuration order
    pub fn extra_keys(&self) -> Vec<String> {
        self.extra_fields.iter().map(|f| f.key.clone()).collect()
    }
}
