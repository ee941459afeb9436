//! Fetch → resolve → extract for a single product.

use std::sync::Arc;

use restock_core::{AppConfig, Product};

use crate::browser::{ChromiumRenderer, Renderer};
use crate::diagnostics::{sink_from_config, DiagnosticSink};
use crate::error::ScraperError;
use crate::extract::{rule_from_config, AvailabilityRule, Signal};
use crate::fetcher::PageFetcher;
use crate::location::LocationResolver;

pub struct StockChecker {
    fetcher: PageFetcher,
    rule: Box<dyn AvailabilityRule>,
}

impl StockChecker {
    pub fn new(fetcher: PageFetcher, rule: Box<dyn AvailabilityRule>) -> Self {
        Self { fetcher, rule }
    }

    /// Headless Chromium checker wired from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::InvalidSelector`] if the configured purchase
    /// selector does not parse.
    pub fn from_config(config: &AppConfig) -> Result<Self, ScraperError> {
        let renderer: Arc<dyn Renderer> = Arc::new(ChromiumRenderer::from_config(config));
        Self::with_renderer(config, renderer, sink_from_config(config))
    }

    /// Like [`Self::from_config`] with an explicit renderer and sink.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::InvalidSelector`] if the configured purchase
    /// selector does not parse.
    pub fn with_renderer(
        config: &AppConfig,
        renderer: Arc<dyn Renderer>,
        diagnostics: Arc<dyn DiagnosticSink>,
    ) -> Result<Self, ScraperError> {
        let rule = rule_from_config(config)?;
        let fetcher = PageFetcher::new(renderer, LocationResolver::from_config(config), diagnostics);
        Ok(Self::new(fetcher, rule))
    }

    /// `true` if the product page currently offers the item for purchase.
    ///
    /// A page where the rule's element is missing altogether is reported as
    /// unavailable.
    ///
    /// # Errors
    ///
    /// Propagates fetch failures from [`PageFetcher::fetch`].
    pub async fn check(&self, product: &Product) -> Result<bool, ScraperError> {
        let page = self.fetcher.fetch(product).await?;
        let signal = self.rule.inspect(&page.html);
        match signal {
            Signal::Available => {
                tracing::info!(product = %product.name, "in stock");
            }
            Signal::Unavailable => {
                tracing::info!(product = %product.name, "out of stock");
            }
            Signal::Absent => {
                tracing::warn!(
                    product = %product.name,
                    rule = %self.rule.describe(),
                    "availability signal not found on page — treating as out of stock"
                );
            }
        }
        Ok(signal == Signal::Available)
    }
}
