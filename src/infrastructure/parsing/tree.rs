//! Tree-query capability the menu extractor is written against
//!
//! The extractor only needs a handful of traversals: find marked nodes, find
//! a descendant by tag, read attributes, walk up to an ancestor and walk back
//! through document order. [`DocumentTree`] names exactly those, and
//! `scraper::Html` provides them.

use scraper::node::Element;
use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Tag plus optional class identifying a kind of node, e.g. `li.lightbox-nutrition`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeMarker {
    pub tag: String,
    #[serde(default)]
    pub class: Option<String>,
}

impl NodeMarker {
    pub fn new(tag: &str, class: &str) -> Self {
        Self {
            tag: tag.to_string(),
            class: Some(class.to_string()),
        }
    }

    pub fn tag(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            class: None,
        }
    }

    /// CSS form of the marker
    pub fn css(&self) -> String {
        match &self.class {
            Some(class) => format!("{}.{}", self.tag, class),
            None => self.tag.clone(),
        }
    }

    pub fn matches_element(&self, element: &Element) -> bool {
        if !element.name().eq_ignore_ascii_case(&self.tag) {
            return false;
        }
        match &self.class {
            Some(class) => element.classes().any(|c| c == class),
            None => true,
        }
    }
}

/// Read-only traversals over a parsed document
pub trait DocumentTree {
    type Node<'a>: Copy
    where
        Self: 'a;

    /// All nodes carrying `marker`, in document order
    fn find_marked(&self, marker: &NodeMarker) -> Vec<Self::Node<'_>>;

    fn is_marked<'a>(&'a self, node: Self::Node<'a>, marker: &NodeMarker) -> bool;

    /// First descendant (excluding `node` itself) with the given tag
    fn first_descendant<'a>(&'a self, node: Self::Node<'a>, tag: &str) -> Option<Self::Node<'a>>;

    fn attribute<'a>(&'a self, node: Self::Node<'a>, name: &str) -> Option<&'a str>;

    /// Closest ancestor satisfying `predicate`
    fn nearest_ancestor<'a, P>(&'a self, node: Self::Node<'a>, predicate: P) -> Option<Self::Node<'a>>
    where
        P: FnMut(Self::Node<'a>) -> bool;

    /// Closest node before `node` in document order satisfying `predicate`.
    /// Ancestors count as preceding, since their start tags come first.
    fn nearest_preceding<'a, P>(&'a self, node: Self::Node<'a>, predicate: P) -> Option<Self::Node<'a>>
    where
        P: FnMut(Self::Node<'a>) -> bool;

    /// Concatenated text content, untrimmed
    fn text<'a>(&'a self, node: Self::Node<'a>) -> String;
}

impl DocumentTree for Html {
    type Node<'a> = ElementRef<'a>;

    fn find_marked(&self, marker: &NodeMarker) -> Vec<ElementRef<'_>> {
        let css = marker.css();
        match Selector::parse(&css) {
            Ok(selector) => self.select(&selector).collect(),
            Err(e) => {
                warn!("Failed to compile marker selector '{}': {}", css, e);
                Vec::new()
            }
        }
    }

    fn is_marked<'a>(&'a self, node: ElementRef<'a>, marker: &NodeMarker) -> bool {
        marker.matches_element(node.value())
    }

    fn first_descendant<'a>(&'a self, node: ElementRef<'a>, tag: &str) -> Option<ElementRef<'a>> {
        node.descendants()
            .skip(1)
            .filter_map(ElementRef::wrap)
            .find(|element| element.value().name().eq_ignore_ascii_case(tag))
    }

    fn attribute<'a>(&'a self, node: ElementRef<'a>, name: &str) -> Option<&'a str> {
        node.value().attr(name)
    }

    fn nearest_ancestor<'a, P>(&'a self, node: ElementRef<'a>, mut predicate: P) -> Option<ElementRef<'a>>
    where
        P: FnMut(ElementRef<'a>) -> bool,
    {
        node.ancestors()
            .filter_map(ElementRef::wrap)
            .find(|element| predicate(*element))
    }

    fn nearest_preceding<'a, P>(&'a self, node: ElementRef<'a>, mut predicate: P) -> Option<ElementRef<'a>>
    where
        P: FnMut(ElementRef<'a>) -> bool,
    {
        preceding_elements(node).find(|element| predicate(*element))
    }

    fn text<'a>(&'a self, node: ElementRef<'a>) -> String {
        node.text().collect()
    }
}

/// Elements before `start` in reverse document order
fn preceding_elements(start: ElementRef<'_>) -> impl Iterator<Item = ElementRef<'_>> {
    std::iter::successors(Some(*start), |node| match node.prev_sibling() {
        Some(sibling) => {
            let mut deepest = sibling;
            while let Some(child) = deepest.last_child() {
                deepest = child;
            }
            Some(deepest)
        }
        None => node.parent(),
    })
    .skip(1)
    .filter_map(ElementRef::wrap)
}
