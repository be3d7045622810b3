//! HTML parsing infrastructure for dining menu pages
//!
//! This module provides the trait-based parsing architecture: a tree-query
//! capability ([`DocumentTree`]), the extraction configuration, and the
//! [`MenuParser`] that turns a menu page into food records.

pub mod config;
pub mod context;
pub mod error;
pub mod menu_parser;
pub mod tree;

// Re-export public types
pub use config::{ExtraField, ExtractionConfig, FieldMapping};
pub use context::MenuContext;
pub use error::{ParsingError, ParsingResult};
pub use menu_parser::MenuParser;
pub use tree::{DocumentTree, NodeMarker};

use scraper::Html;

/// Parser trait with context support
pub trait ContextualParser {
    type Output;
    type Context;

    /// Parse HTML with contextual information
    fn parse_with_context(&self, html: &Html, context: &Self::Context) -> ParsingResult<Self::Output>;
}
