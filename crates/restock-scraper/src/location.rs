//! Delivery-location prompt handling.
//!
//! Some product pages only render location-specific availability once a
//! delivery code has been entered. The prompt is optional: when it does not
//! show up within the probe bound the location is assumed to be set already,
//! which is the normal steady state and not an error.

use std::time::Duration;

use restock_core::LocationPromptConfig;

use crate::browser::{PageSession, Scope};
use crate::wait::{wait_until, DEFAULT_POLL_INTERVAL};

/// What happened to the location prompt on one page load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocationOutcome {
    /// No prompt within the probe bound.
    NotRequired,
    /// The code was entered and confirmed.
    Applied,
    /// The prompt was shown but could not be satisfied; extraction continues
    /// against whatever is currently rendered.
    Degraded(String),
}

/// Strategy used to confirm an entered location code.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Confirm {
    /// Click an explicit Apply control.
    Apply(String),
    /// Wait for a suggestion entry whose text equals the code and click it.
    Suggestion(String),
}

#[derive(Debug, Clone)]
pub struct LocationResolver {
    code: Option<String>,
    scope: Scope,
    input_selector: String,
    confirm: Confirm,
    probe_timeout: Duration,
    settle_timeout: Duration,
    poll_interval: Duration,
}

impl LocationResolver {
    #[must_use]
    pub fn new(code: Option<String>, prompt: &LocationPromptConfig) -> Self {
        let confirm = match &prompt.apply_selector {
            Some(apply) => Confirm::Apply(apply.clone()),
            None => Confirm::Suggestion(prompt.suggestion_selector.clone()),
        };
        Self {
            code,
            scope: Scope::from_frame_selector(prompt.frame_selector.as_deref()),
            input_selector: prompt.input_selector.clone(),
            confirm,
            probe_timeout: Duration::from_secs(prompt.probe_timeout_secs),
            settle_timeout: Duration::from_secs(prompt.settle_secs),
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    #[must_use]
    pub fn from_config(config: &restock_core::AppConfig) -> Self {
        Self::new(config.location_code.clone(), &config.location_prompt)
    }

    #[must_use]
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Detect and satisfy the location prompt on the current page.
    ///
    /// Never fails: interaction problems are reported as
    /// [`LocationOutcome::Degraded`] so the caller can still extract.
    pub async fn resolve(&self, session: &dyn PageSession) -> LocationOutcome {
        let probe = wait_until(self.probe_timeout, self.poll_interval, || async {
            session
                .exists(&self.scope, &self.input_selector)
                .await
                .unwrap_or(false)
        })
        .await;

        if !probe.is_ready() {
            tracing::debug!(
                scope = %self.scope,
                "location prompt not shown — assuming location is already set"
            );
            return LocationOutcome::NotRequired;
        }

        let Some(code) = self.code.as_deref() else {
            return LocationOutcome::Degraded(
                "location prompt is shown but no location code is configured".to_string(),
            );
        };

        tracing::info!(scope = %self.scope, "location prompt shown — entering location code");

        if let Err(e) = session
            .type_text(&self.scope, &self.input_selector, code)
            .await
        {
            return LocationOutcome::Degraded(format!("could not enter location code: {e}"));
        }

        match &self.confirm {
            Confirm::Apply(selector) => {
                if let Err(e) = session.click(&self.scope, selector).await {
                    return LocationOutcome::Degraded(format!(
                        "could not click apply control: {e}"
                    ));
                }
            }
            Confirm::Suggestion(selector) => {
                let clicked = wait_until(self.probe_timeout, self.poll_interval, || async {
                    session
                        .click_exact_text(&self.scope, selector, code)
                        .await
                        .unwrap_or(false)
                })
                .await;
                if !clicked.is_ready() {
                    return LocationOutcome::Degraded(format!(
                        "no suggestion matching \"{code}\" became clickable"
                    ));
                }
            }
        }

        // The prompt closing is the signal that the page is re-rendering
        // with location-specific content.
        let settled = wait_until(self.settle_timeout, self.poll_interval, || async {
            !session
                .exists(&self.scope, &self.input_selector)
                .await
                .unwrap_or(true)
        })
        .await;
        if !settled.is_ready() {
            tracing::debug!("location prompt still present after settle period — continuing");
        }

        tracing::info!("location code applied");
        LocationOutcome::Applied
    }
}

#[cfg(test)]
#[path = "location_test.rs"]
mod tests;
