//! Rendered-page retrieval: one engine instance per product, always torn
//! down before returning.

use std::sync::Arc;

use restock_core::Product;

use crate::browser::{PageSession, Renderer};
use crate::diagnostics::DiagnosticSink;
use crate::error::ScraperError;
use crate::location::{LocationOutcome, LocationResolver};

/// Post-script DOM of a product page plus how the location prompt went.
#[derive(Debug, Clone)]
pub struct RenderedPage {
    pub html: String,
    pub location: LocationOutcome,
}

pub struct PageFetcher {
    renderer: Arc<dyn Renderer>,
    resolver: LocationResolver,
    diagnostics: Arc<dyn DiagnosticSink>,
}

impl PageFetcher {
    pub fn new(
        renderer: Arc<dyn Renderer>,
        resolver: LocationResolver,
        diagnostics: Arc<dyn DiagnosticSink>,
    ) -> Self {
        Self {
            renderer,
            resolver,
            diagnostics,
        }
    }

    /// Open an engine, load the product page, satisfy the location prompt,
    /// and return the rendered markup.
    ///
    /// The session is closed on every path, including when navigation or
    /// content retrieval fails.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError`] if the engine cannot be launched, navigation
    /// fails or times out, or the DOM cannot be read.
    pub async fn fetch(&self, product: &Product) -> Result<RenderedPage, ScraperError> {
        let session = self.renderer.open().await?;
        let result = self.render(&*session, product).await;
        if let Err(e) = session.close().await {
            tracing::warn!(product = %product.name, error = %e, "failed to close browser session");
        }
        result
    }

    async fn render(
        &self,
        session: &dyn PageSession,
        product: &Product,
    ) -> Result<RenderedPage, ScraperError> {
        tracing::debug!(product = %product.name, url = %product.url, "loading product page");
        session.goto(&product.url).await?;

        let location = self.resolver.resolve(session).await;
        if let LocationOutcome::Degraded(reason) = &location {
            tracing::warn!(
                product = %product.name,
                reason = %reason,
                "location prompt could not be satisfied — checking current page as-is"
            );
            self.capture_evidence(session, product).await;
        }

        let html = session.content().await?;
        Ok(RenderedPage { html, location })
    }

    async fn capture_evidence(&self, session: &dyn PageSession, product: &Product) {
        let screenshot = session
            .screenshot()
            .await
            .map_err(|e| tracing::debug!(error = %e, "screenshot capture failed"))
            .ok();
        let html = session
            .content()
            .await
            .map_err(|e| tracing::debug!(error = %e, "page source capture failed"))
            .ok();
        self.diagnostics
            .capture(&product.name, screenshot.as_deref(), html.as_deref())
            .await;
    }
}
