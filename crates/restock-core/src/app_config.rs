use std::path::PathBuf;

/// Which availability rule the extractor applies to a rendered page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetectionRule {
    /// A purchase control matching `purchase_selector` is present and enabled.
    Structural { purchase_selector: String },
    /// `marker` appears in the visible page text.
    TextMarker { marker: String },
}

impl std::fmt::Display for DetectionRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DetectionRule::Structural { purchase_selector } => {
                write!(f, "structural({purchase_selector})")
            }
            DetectionRule::TextMarker { marker } => write!(f, "text(\"{marker}\")"),
        }
    }
}

/// Selectors and bounds for the delivery-location prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationPromptConfig {
    pub input_selector: String,
    pub suggestion_selector: String,
    /// When set the prompt is confirmed with an explicit Apply control
    /// instead of picking a suggestion entry.
    pub apply_selector: Option<String>,
    /// When set the prompt lives inside the iframe matched by this selector.
    pub frame_selector: Option<String>,
    pub probe_timeout_secs: u64,
    pub settle_secs: u64,
}

#[derive(Clone)]
pub struct AppConfig {
    pub telegram_bot_token: Option<String>,
    pub telegram_chat_id: Option<String>,
    pub location_code: Option<String>,
    /// Raw `RESTOCK_PRODUCT_URLS` value; takes precedence over `products_path`.
    pub product_urls: Option<String>,
    pub products_path: PathBuf,
    pub state_path: PathBuf,
    pub log_level: String,
    pub detection: DetectionRule,
    pub location_prompt: LocationPromptConfig,
    pub navigation_timeout_secs: u64,
    pub chrome_executable: Option<PathBuf>,
    pub max_concurrent_checks: usize,
    pub diagnostics_dir: Option<PathBuf>,
    pub notify_timeout_secs: u64,
    pub notify_max_retries: u32,
    pub notify_backoff_base_ms: u64,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field(
                "telegram_bot_token",
                &self.telegram_bot_token.as_ref().map(|_| "[redacted]"),
            )
            .field("telegram_chat_id", &self.telegram_chat_id)
            .field("location_code", &self.location_code)
            .field("product_urls", &self.product_urls)
            .field("products_path", &self.products_path)
            .field("state_path", &self.state_path)
            .field("log_level", &self.log_level)
            .field("detection", &self.detection)
            .field("location_prompt", &self.location_prompt)
            .field("navigation_timeout_secs", &self.navigation_timeout_secs)
            .field("chrome_executable", &self.chrome_executable)
            .field("max_concurrent_checks", &self.max_concurrent_checks)
            .field("diagnostics_dir", &self.diagnostics_dir)
            .field("notify_timeout_secs", &self.notify_timeout_secs)
            .field("notify_max_retries", &self.notify_max_retries)
            .field("notify_backoff_base_ms", &self.notify_backoff_base_ms)
            .finish()
    }
}
