//! Availability rules applied to rendered page markup.
//!
//! The rule is chosen per deployment. [`PurchaseButtonRule`] ties the
//! signal to the purchase control itself and is the default;
//! [`TextMarkerRule`] looks for a phrase in the visible text.

use scraper::{ElementRef, Html, Selector};

use restock_core::{AppConfig, DetectionRule};

use crate::error::ScraperError;

/// Raw outcome of inspecting a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    Available,
    Unavailable,
    /// The element the rule looks for is missing entirely (error page,
    /// changed markup). Treated as unavailable.
    Absent,
}

pub trait AvailabilityRule: Send + Sync {
    /// Short human-readable description for logs.
    fn describe(&self) -> String;

    /// Only [`Signal::Available`] counts as purchasable.
    fn inspect(&self, html: &str) -> Signal;
}

/// Available when an element matching the selector is present and not
/// disabled.
#[derive(Debug)]
pub struct PurchaseButtonRule {
    raw_selector: String,
    selector: Selector,
}

impl PurchaseButtonRule {
    /// # Errors
    ///
    /// Returns [`ScraperError::InvalidSelector`] if `selector` is not valid CSS.
    pub fn new(selector: &str) -> Result<Self, ScraperError> {
        let parsed = Selector::parse(selector).map_err(|e| ScraperError::InvalidSelector {
            selector: selector.to_string(),
            reason: format!("{e:?}"),
        })?;
        Ok(Self {
            raw_selector: selector.to_string(),
            selector: parsed,
        })
    }
}

fn is_disabled(el: ElementRef<'_>) -> bool {
    let element = el.value();
    element.attr("disabled").is_some()
        || element
            .attr("aria-disabled")
            .is_some_and(|v| v.eq_ignore_ascii_case("true"))
        || element
            .classes()
            .any(|class| class.eq_ignore_ascii_case("disabled") || class.eq_ignore_ascii_case("inactive"))
}

impl AvailabilityRule for PurchaseButtonRule {
    fn describe(&self) -> String {
        format!("purchase control \"{}\"", self.raw_selector)
    }

    fn inspect(&self, html: &str) -> Signal {
        let document = Html::parse_document(html);
        let mut seen = false;
        for el in document.select(&self.selector) {
            seen = true;
            if !is_disabled(el) {
                return Signal::Available;
            }
        }
        if seen {
            Signal::Unavailable
        } else {
            Signal::Absent
        }
    }
}

/// Available when the marker phrase appears in the visible text.
#[derive(Debug)]
pub struct TextMarkerRule {
    marker: String,
    normalized: String,
}

impl TextMarkerRule {
    #[must_use]
    pub fn new(marker: &str) -> Self {
        Self {
            marker: marker.to_string(),
            normalized: collapse_whitespace(marker),
        }
    }
}

const INVISIBLE_ELEMENTS: &[&str] = &["script", "style", "noscript", "template", "head"];

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Text content of the document, excluding non-rendered elements, with
/// whitespace runs collapsed to single spaces.
fn visible_text(document: &Html) -> String {
    let mut parts: Vec<&str> = Vec::new();
    for node in document.root_element().descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        let hidden = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .is_some_and(|e| INVISIBLE_ELEMENTS.contains(&e.name()))
        });
        if !hidden {
            parts.push(text);
        }
    }
    collapse_whitespace(&parts.join(" "))
}

impl AvailabilityRule for TextMarkerRule {
    fn describe(&self) -> String {
        format!("text marker \"{}\"", self.marker)
    }

    fn inspect(&self, html: &str) -> Signal {
        if self.normalized.is_empty() {
            return Signal::Absent;
        }
        let document = Html::parse_document(html);
        if visible_text(&document).contains(&self.normalized) {
            Signal::Available
        } else {
            Signal::Unavailable
        }
    }
}

/// Build the configured availability rule.
///
/// # Errors
///
/// Returns [`ScraperError::InvalidSelector`] for an unparsable purchase selector.
pub fn rule_from_config(config: &AppConfig) -> Result<Box<dyn AvailabilityRule>, ScraperError> {
    match &config.detection {
        DetectionRule::Structural { purchase_selector } => {
            Ok(Box::new(PurchaseButtonRule::new(purchase_selector)?))
        }
        DetectionRule::TextMarker { marker } => Ok(Box::new(TextMarkerRule::new(marker))),
    }
}

#[cfg(test)]
#[path = "extract_test.rs"]
mod tests;
