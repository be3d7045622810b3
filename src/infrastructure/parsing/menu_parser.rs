//! Menu page parser
//!
//! Turns a parsed menu page into [`FoodRecord`]s. Content problems never fail
//! the parse: a page without entries yields nothing, an entry without an
//! anchor is skipped, missing attributes read as empty strings.

use scraper::{Html, Selector};
use tracing::{debug, trace};

use super::config::ExtractionConfig;
use super::tree::{DocumentTree, NodeMarker};
use super::{ContextualParser, MenuContext, ParsingError, ParsingResult};
use crate::domain::food::{FoodField, FoodRecord, MealType};
use crate::domain::location::DiningLocation;

/// Parser for extracting food records from a location's menu page
#[derive(Debug, Clone)]
pub struct MenuParser {
    config: ExtractionConfig,
}

impl MenuParser {
    /// Create a new menu parser with the dining site's layout
    pub fn new() -> ParsingResult<Self> {
        Self::with_config(ExtractionConfig::default())
    }

    /// Create parser with custom extraction configuration
    pub fn with_config(config: ExtractionConfig) -> ParsingResult<Self> {
        Self::validate_selector(&config.entry_marker.css())?;
        Self::validate_selector(&config.category_marker.css())?;
        Self::validate_selector(&config.anchor_tag)?;
        Self::validate_selector(&config.section_tag)?;

        if config.section_id_attribute.trim().is_empty() {
            return Err(ParsingError::configuration(
                "section_id_attribute",
                "section identifier attribute must not be empty",
            ));
        }

        for extra in &config.extra_fields {
            let clashes = extra.key == "location"
                || extra.key == "meal_type"
                || extra.key == "category"
                || FoodField::ALL.iter().any(|f| f.key() == extra.key);
            if clashes || extra.key.trim().is_empty() {
                return Err(ParsingError::configuration(
                    "extra_fields",
                    &format!("extra field key '{}' is empty or shadows a record field", extra.key),
                ));
            }
        }

        Ok(Self { config })
    }

    fn validate_selector(css: &str) -> ParsingResult<()> {
        Selector::parse(css)
            .map(|_| ())
            .map_err(|e| ParsingError::invalid_selector(css, &e.to_string()))
    }

    /// Extract every food record on the page, in document order
    pub fn extract<D: DocumentTree>(&self, document: &D, location: DiningLocation) -> Vec<FoodRecord> {
        let entries = document.find_marked(&self.config.entry_marker);

        if entries.is_empty() {
            debug!("No nutrition entries found for {}", location);
            return Vec::new();
        }

        debug!("Found {} nutrition entries for {}", entries.len(), location);

        let mut records = Vec::with_capacity(entries.len());
        for (index, entry) in entries.into_iter().enumerate() {
            match self.extract_entry(document, entry, location) {
                Some(record) => records.push(record),
                None => trace!("Skipping entry {} on {}: no anchor", index, location),
            }
        }
        records
    }

    /// Parse raw page HTML and extract its records
    pub fn extract_html(&self, html: &str, location: DiningLocation) -> Vec<FoodRecord> {
        let document = Html::parse_document(html);
        self.extract(&document, location)
    }

    fn extract_entry<'a, D: DocumentTree>(
        &self,
        document: &'a D,
        entry: D::Node<'a>,
        location: DiningLocation,
    ) -> Option<FoodRecord> {
        let anchor = document.first_descendant(entry, &self.config.anchor_tag)?;

        let mut record = FoodRecord::new(location);
        for mapping in &self.config.fields {
            let raw = document.attribute(anchor, &mapping.attribute).unwrap_or_default();
            let value = mapping.unit.map_or_else(|| raw.to_string(), |unit| unit.strip(raw));
            record.set(mapping.field, value);
        }
        for extra in &self.config.extra_fields {
            let raw = document.attribute(anchor, &extra.attribute).unwrap_or_default();
            let value = extra.unit.map_or_else(|| raw.to_string(), |unit| unit.strip(raw));
            record.extra.insert(extra.key.clone(), value);
        }

        record.meal_type = self.infer_meal_type(document, entry);
        record.category = self.infer_category(document, entry);
        Some(record)
    }

    /// Only the closest section with an identifier is consulted, even when
    /// its identifier names neither meal.
    fn infer_meal_type<'a, D: DocumentTree>(&self, document: &'a D, entry: D::Node<'a>) -> MealType {
        let section_attr = self.config.section_id_attribute.as_str();
        let section_marker = NodeMarker::tag(&self.config.section_tag);

        document
            .nearest_ancestor(entry, |node| {
                document.is_marked(node, &section_marker) && document.attribute(node, section_attr).is_some()
            })
            .and_then(|section| document.attribute(section, section_attr))
            .map_or(MealType::Unknown, MealType::from_section_id)
    }

    fn infer_category<'a, D: DocumentTree>(&self, document: &'a D, entry: D::Node<'a>) -> Option<String> {
        document
            .nearest_preceding(entry, |node| document.is_marked(node, &self.config.category_marker))
            .map(|heading| document.text(heading).trim().to_string())
    }
}

impl ContextualParser for MenuParser {
    type Output = Vec<FoodRecord>;
    type Context = MenuContext;

    fn parse_with_context(&self, html: &Html, context: &Self::Context) -> ParsingResult<Self::Output> {
        let records = self.extract(html, context.location);
        debug!(
            "Extracted {} records for {} from {}",
            records.len(),
            context.location,
            context.source_url.as_deref().unwrap_or("<inline>")
        );
        Ok(records)
    }
}
