//! HTTP client for the Telegram Bot API `sendMessage` method.

use std::time::Duration;

use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};

use restock_core::{AppConfig, Product};

use crate::error::NotifyError;
use crate::message::restock_message;
use crate::retry::retry_with_backoff;

const DEFAULT_BASE_URL: &str = "https://api.telegram.org/";

#[derive(Debug, Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'static str,
}

/// Telegram response envelope. Only the fields needed to judge delivery.
#[derive(Debug, Deserialize)]
struct Envelope {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

/// Sends restock alerts to a single Telegram chat.
///
/// Use [`TelegramNotifier::new`] for production or
/// [`TelegramNotifier::with_base_url`] to point at a mock server in tests.
pub struct TelegramNotifier {
    client: Client,
    chat_id: String,
    endpoint: Url,
    max_retries: u32,
    backoff_base_ms: u64,
}

impl std::fmt::Debug for TelegramNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramNotifier")
            .field("chat_id", &self.chat_id)
            .field("endpoint", &"[redacted]")
            .field("max_retries", &self.max_retries)
            .field("backoff_base_ms", &self.backoff_base_ms)
            .finish_non_exhaustive()
    }
}

impl TelegramNotifier {
    /// Creates a notifier pointed at the production Bot API.
    ///
    /// # Errors
    ///
    /// Returns [`NotifyError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        token: &str,
        chat_id: &str,
        timeout_secs: u64,
        max_retries: u32,
        backoff_base_ms: u64,
    ) -> Result<Self, NotifyError> {
        Self::with_base_url(
            token,
            chat_id,
            timeout_secs,
            max_retries,
            backoff_base_ms,
            DEFAULT_BASE_URL,
        )
    }

    /// Creates a notifier with a custom API base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`NotifyError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`NotifyError::InvalidBaseUrl`] if
    /// `base_url` is not a valid URL.
    pub fn with_base_url(
        token: &str,
        chat_id: &str,
        timeout_secs: u64,
        max_retries: u32,
        backoff_base_ms: u64,
        base_url: &str,
    ) -> Result<Self, NotifyError> {
        if token.trim().is_empty() || chat_id.trim().is_empty() {
            return Err(NotifyError::MissingCredentials);
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("restock/0.1 (stock-alerts)")
            .build()
            .map_err(reqwest::Error::without_url)?;

        // Tokens contain ':' so `Url::join` would read the `bot<token>`
        // segment as a scheme; build the full string instead.
        let normalised = format!("{}/bot{token}/sendMessage", base_url.trim_end_matches('/'));
        let endpoint = Url::parse(&normalised)
            .map_err(|e| NotifyError::InvalidBaseUrl {
                url: base_url.to_owned(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            client,
            chat_id: chat_id.to_owned(),
            endpoint,
            max_retries,
            backoff_base_ms,
        })
    }

    /// Build a notifier from configuration.
    ///
    /// Returns `Ok(None)` when either credential is unset; the caller treats
    /// that as a logged no-op.
    ///
    /// # Errors
    ///
    /// Returns [`NotifyError::Http`] if the HTTP client cannot be constructed.
    pub fn from_config(config: &AppConfig) -> Result<Option<Self>, NotifyError> {
        let (Some(token), Some(chat_id)) = (
            config.telegram_bot_token.as_deref(),
            config.telegram_chat_id.as_deref(),
        ) else {
            return Ok(None);
        };
        Self::new(
            token,
            chat_id,
            config.notify_timeout_secs,
            config.notify_max_retries,
            config.notify_backoff_base_ms,
        )
        .map(Some)
    }

    /// Announce that `product` is back in stock.
    ///
    /// # Errors
    ///
    /// - [`NotifyError::UnexpectedStatus`] on a non-2xx response.
    /// - [`NotifyError::Api`] if Telegram reports `"ok": false`.
    /// - [`NotifyError::Http`] on network failure after all retries.
    pub async fn send_restock_alert(&self, product: &Product) -> Result<(), NotifyError> {
        let text = restock_message(product);
        self.send_message(&text).await?;
        tracing::info!(product = %product.name, "restock notification sent");
        Ok(())
    }

    /// Deliver `text` to the configured chat, retrying transient failures.
    ///
    /// # Errors
    ///
    /// Same as [`Self::send_restock_alert`].
    pub async fn send_message(&self, text: &str) -> Result<(), NotifyError> {
        retry_with_backoff(self.max_retries, self.backoff_base_ms, || {
            self.post_once(text)
        })
        .await
    }

    async fn post_once(&self, text: &str) -> Result<(), NotifyError> {
        let payload = SendMessage {
            chat_id: &self.chat_id,
            text,
            parse_mode: "Markdown",
        };
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&payload)
            .send()
            .await
            .map_err(reqwest::Error::without_url)?;

        let status = response.status();
        let body = response.text().await.map_err(reqwest::Error::without_url)?;

        if !status.is_success() {
            return Err(NotifyError::UnexpectedStatus {
                status: status.as_u16(),
                description: describe(&body),
            });
        }

        let envelope: Envelope = serde_json::from_str(&body).map_err(NotifyError::Deserialize)?;
        if !envelope.ok {
            return Err(NotifyError::Api(
                envelope
                    .description
                    .unwrap_or_else(|| "unknown error".to_string()),
            ));
        }
        Ok(())
    }
}

/// Telegram's `description` field when the body is an error envelope,
/// otherwise the first 200 characters of the raw body.
fn describe(body: &str) -> String {
    serde_json::from_str::<Envelope>(body)
        .ok()
        .and_then(|e| e.description)
        .unwrap_or_else(|| body.chars().take(200).collect())
}
