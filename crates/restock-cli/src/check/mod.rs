//! `restock check`: one full check cycle with persisted dedup state.

mod cycle;

use std::collections::HashSet;

use anyhow::Context;
use async_trait::async_trait;

use restock_core::{AppConfig, Product};
use restock_notify::{NotifyError, TelegramNotifier};
use restock_scraper::{ScraperError, StockChecker};
use restock_store::StateFile;

pub(crate) use cycle::{run_cycle, CycleReport};

pub(crate) const START_MARKER: &str = "--- Starting Scheduled Stock Check ---";
pub(crate) const COMPLETE_MARKER: &str = "--- Stock Check Complete ---";

/// Answers whether a product can currently be bought.
#[async_trait]
pub(crate) trait AvailabilityProbe: Send + Sync {
    async fn probe(&self, product: &Product) -> Result<bool, ScraperError>;
}

#[async_trait]
impl AvailabilityProbe for StockChecker {
    async fn probe(&self, product: &Product) -> Result<bool, ScraperError> {
        self.check(product).await
    }
}

/// Delivers a restock alert for a product.
#[async_trait]
pub(crate) trait AlertSink: Send + Sync {
    async fn alert(&self, product: &Product) -> Result<(), NotifyError>;
}

#[async_trait]
impl AlertSink for TelegramNotifier {
    async fn alert(&self, product: &Product) -> Result<(), NotifyError> {
        self.send_restock_alert(product).await
    }
}

/// Used when Telegram credentials are not configured. Every alert fails with
/// [`NotifyError::MissingCredentials`], which the cycle logs and moves past.
pub(crate) struct Unconfigured;

#[async_trait]
impl AlertSink for Unconfigured {
    async fn alert(&self, _product: &Product) -> Result<(), NotifyError> {
        Err(NotifyError::MissingCredentials)
    }
}

/// Used under `--dry-run`: logs the alert that would have been sent.
pub(crate) struct DryRun;

#[async_trait]
impl AlertSink for DryRun {
    async fn alert(&self, product: &Product) -> Result<(), NotifyError> {
        tracing::info!(product = %product.name, url = %product.url, "dry-run: would send restock notification");
        Ok(())
    }
}

/// Build the alert sink for this configuration.
///
/// # Errors
///
/// Returns an error if the Telegram client cannot be constructed.
pub(crate) fn alert_sink_from_config(config: &AppConfig) -> anyhow::Result<Box<dyn AlertSink>> {
    match TelegramNotifier::from_config(config).context("failed to build Telegram notifier")? {
        Some(notifier) => Ok(Box::new(notifier)),
        None => {
            tracing::warn!("TELEGRAM_BOT_TOKEN or TELEGRAM_CHAT_ID not set — notifications disabled");
            Ok(Box::new(Unconfigured))
        }
    }
}

/// Products to check: the explicit `--product` URLs when given, otherwise
/// the configured list.
///
/// # Errors
///
/// Returns an error if a URL is invalid or no products are configured.
pub(crate) fn select_products(
    config: &AppConfig,
    selection: &[String],
) -> anyhow::Result<Vec<Product>> {
    if selection.is_empty() {
        return restock_core::products_from_config(config).context("failed to load product list");
    }

    let mut seen = HashSet::new();
    let mut products = Vec::with_capacity(selection.len());
    for url in selection {
        let product = Product::from_url(url)?;
        if seen.insert(product.url.clone()) {
            products.push(product);
        }
    }
    Ok(products)
}

/// Run one check cycle and persist the resulting unavailable-set.
///
/// The completion marker is printed even when persisting fails; the
/// persistence error is returned afterwards. With `dry_run` no notification
/// is sent and the state file is read but never written.
///
/// # Errors
///
/// Returns an error if the product list, state file, or browser
/// configuration cannot be loaded, or if the new state cannot be saved.
pub(crate) async fn run_check(
    config: &AppConfig,
    selection: &[String],
    dry_run: bool,
) -> anyhow::Result<CycleReport> {
    let probe = StockChecker::from_config(config).context("invalid detection configuration")?;
    let alerts: Box<dyn AlertSink> = if dry_run {
        Box::new(DryRun)
    } else {
        alert_sink_from_config(config)?
    };
    let store = StateFile::new(&config.state_path);
    run_check_with(config, selection, dry_run, &probe, alerts.as_ref(), &store).await
}

/// [`run_check`] with injected collaborators.
pub(crate) async fn run_check_with(
    config: &AppConfig,
    selection: &[String],
    dry_run: bool,
    probe: &dyn AvailabilityProbe,
    alerts: &dyn AlertSink,
    store: &StateFile,
) -> anyhow::Result<CycleReport> {
    println!("{START_MARKER}");

    let products = select_products(config, selection)?;
    let snapshot = store
        .load()
        .with_context(|| format!("failed to read state file {}", store.path().display()))?;

    tracing::info!(
        products = products.len(),
        unavailable = snapshot.set.len(),
        first_run = snapshot.first_run,
        max_concurrent = config.max_concurrent_checks,
        "starting check cycle"
    );

    let mut report = run_cycle(
        &products,
        probe,
        alerts,
        &snapshot,
        config.max_concurrent_checks,
    )
    .await;

    for result in &report.results {
        tracing::debug!(
            product = %result.product.name,
            available = result.available,
            error = ?result.error,
            checked_at = %result.checked_at.to_rfc3339(),
            "check result"
        );
    }

    // A narrowed run only knows about the selected products; keep the
    // recorded state of everything else.
    if !selection.is_empty() {
        let checked: HashSet<&str> = products.iter().map(|p| p.url.as_str()).collect();
        let retained: Vec<String> = if snapshot.first_run {
            unchecked_configured(config, &checked)
        } else {
            snapshot
                .set
                .iter()
                .filter(|url| !checked.contains(url))
                .map(str::to_string)
                .collect()
        };
        report.next.extend(retained);
    }

    let persisted = if dry_run {
        tracing::info!(
            unavailable = report.next.len(),
            "dry-run: state file not updated"
        );
        Ok(())
    } else {
        store.save(&report.next)
    };

    tracing::info!(
        checked = report.results.len(),
        available = report.available(),
        errors = report.errors(),
        notified = report.notified.len(),
        undelivered = report.undelivered.len(),
        "check cycle finished"
    );
    println!("{COMPLETE_MARKER}");

    persisted.with_context(|| format!("failed to write state file {}", store.path().display()))?;
    Ok(report)
}

/// Configured products a narrowed first run did not check. They have never
/// been announced, so they are recorded as unavailable and the next check
/// that finds them in stock sends the alert.
fn unchecked_configured(config: &AppConfig, checked: &HashSet<&str>) -> Vec<String> {
    match restock_core::products_from_config(config) {
        Ok(configured) => configured
            .into_iter()
            .map(|p| p.url)
            .filter(|url| !checked.contains(url.as_str()))
            .collect(),
        Err(e) => {
            tracing::warn!(error = %e, "configured product list unavailable — only checked products are recorded");
            Vec::new()
        }
    }
}

#[cfg(test)]
#[path = "check_test.rs"]
mod tests;
