use thiserror::Error;

/// Errors returned while delivering a notification.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// Bot token or chat id is not configured.
    #[error("telegram credentials are not configured (TELEGRAM_BOT_TOKEN / TELEGRAM_CHAT_ID)")]
    MissingCredentials,

    /// Network or TLS failure from the underlying HTTP client. The request
    /// URL is stripped because it embeds the bot token.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The Bot API answered with a non-2xx status.
    #[error("unexpected HTTP status {status}: {description}")]
    UnexpectedStatus { status: u16, description: String },

    /// The Bot API answered 2xx but reported `"ok": false`.
    #[error("telegram API error: {0}")]
    Api(String),

    /// The configured API base URL is not a valid URL.
    #[error("invalid API base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    /// The response body was not the expected JSON envelope.
    #[error("JSON deserialization error: {0}")]
    Deserialize(#[source] serde_json::Error),
}
