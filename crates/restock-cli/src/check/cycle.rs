//! One check cycle over the configured products.
//!
//! Every product is probed, compared against the unavailable-set read at
//! cycle start, announced on an unavailable → available transition, and
//! recorded in the next unavailable-set. A failure or panic in one product
//! becomes an unavailable outcome for that product only.

use std::future::Future;
use std::panic::AssertUnwindSafe;

use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use futures::FutureExt;

use restock_core::Product;
use restock_store::{Snapshot, UnavailableSet};

use super::{AlertSink, AvailabilityProbe};

/// Result of checking one product.
#[derive(Debug, Clone)]
pub(crate) struct CheckResult {
    pub product: Product,
    /// `false` for unavailable and for errored checks.
    pub available: bool,
    pub error: Option<String>,
    pub checked_at: DateTime<Utc>,
}

/// What an announced transition did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Alert {
    None,
    Delivered,
    Failed,
}

#[derive(Debug, Clone)]
pub(crate) struct CycleReport {
    /// One entry per product, in input order.
    pub results: Vec<CheckResult>,
    /// Products whose restock alert was delivered.
    pub notified: Vec<Product>,
    /// Products whose restock alert was due but could not be delivered.
    pub undelivered: Vec<Product>,
    /// Unavailable-set to persist for the next cycle.
    pub next: UnavailableSet,
}

impl CycleReport {
    pub(crate) fn errors(&self) -> usize {
        self.results.iter().filter(|r| r.error.is_some()).count()
    }

    pub(crate) fn available(&self) -> usize {
        self.results.iter().filter(|r| r.available).count()
    }
}

/// Run one cycle with at most `max_concurrent` product checks in flight.
///
/// Results keep the input order regardless of concurrency. The returned
/// `next` set holds exactly the checked products that were unavailable or
/// errored.
pub(crate) async fn run_cycle(
    products: &[Product],
    probe: &dyn AvailabilityProbe,
    alerts: &dyn AlertSink,
    snapshot: &Snapshot,
    max_concurrent: usize,
) -> CycleReport {
    // Built up front: a closure inside the stream adaptor makes the cycle
    // future fail the `Send` bound the scheduler requires.
    let checks: Vec<_> = products
        .iter()
        .map(|product| check_one(product, probe, alerts, snapshot))
        .collect();
    let outcomes: Vec<(CheckResult, Alert)> = stream::iter(checks)
        .buffered(max_concurrent.max(1))
        .collect()
        .await;

    let mut report = CycleReport {
        results: Vec::with_capacity(outcomes.len()),
        notified: Vec::new(),
        undelivered: Vec::new(),
        next: UnavailableSet::new(),
    };

    for (result, alert) in outcomes {
        if !result.available {
            report.next.insert(result.product.url.clone());
        }
        match alert {
            Alert::Delivered => report.notified.push(result.product.clone()),
            Alert::Failed => report.undelivered.push(result.product.clone()),
            Alert::None => {}
        }
        report.results.push(result);
    }

    report
}

async fn check_one(
    product: &Product,
    probe: &dyn AvailabilityProbe,
    alerts: &dyn AlertSink,
    snapshot: &Snapshot,
) -> (CheckResult, Alert) {
    tracing::info!(product = %product.name, url = %product.url, "checking product");

    let (available, error) = match guarded(probe.probe(product)).await {
        Ok(Ok(available)) => (available, None),
        Ok(Err(e)) => {
            tracing::error!(product = %product.name, error = %e, "check failed — recording as unavailable");
            (false, Some(e.to_string()))
        }
        Err(panic) => {
            tracing::error!(product = %product.name, panic = %panic, "check panicked — recording as unavailable");
            (false, Some(format!("check panicked: {panic}")))
        }
    };

    let result = CheckResult {
        product: product.clone(),
        available,
        error,
        checked_at: Utc::now(),
    };

    if !available {
        return (result, Alert::None);
    }

    let was_unavailable = snapshot.first_run || snapshot.set.contains(&product.url);
    if !was_unavailable {
        tracing::info!(product = %product.name, "still in stock — already announced");
        return (result, Alert::None);
    }

    tracing::info!(product = %product.name, "back in stock — sending notification");
    let alert = match guarded(alerts.alert(product)).await {
        Ok(Ok(())) => Alert::Delivered,
        Ok(Err(e)) => {
            tracing::warn!(product = %product.name, error = %e, "restock notification not delivered");
            Alert::Failed
        }
        Err(panic) => {
            tracing::error!(product = %product.name, panic = %panic, "notification panicked");
            Alert::Failed
        }
    };

    (result, alert)
}

/// Await `fut`, turning a panic into its message.
async fn guarded<F: Future>(fut: F) -> Result<F::Output, String> {
    AssertUnwindSafe(fut).catch_unwind().await.map_err(|payload| {
        payload
            .downcast_ref::<&str>()
            .map(|s| (*s).to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic".to_string())
    })
}

#[cfg(test)]
#[path = "cycle_test.rs"]
mod tests;
