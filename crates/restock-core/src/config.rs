use crate::app_config::{AppConfig, DetectionRule, LocationPromptConfig};
use crate::ConfigError;

pub(crate) const DEFAULT_PURCHASE_SELECTOR: &str = "a.add-to-cart";
pub(crate) const DEFAULT_IN_STOCK_MARKER: &str = "Product Information";
pub(crate) const DEFAULT_LOCATION_INPUT_SELECTOR: &str = "#locationWidgetModal input#search";
pub(crate) const DEFAULT_LOCATION_SUGGESTION_SELECTOR: &str = "#automatic .searchitem-name";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so it can be tested with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    // Blank values count as unset so `FOO=` in a `.env` file disables a setting.
    let optional = |var: &str| -> Option<String> {
        lookup(var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let or_default =
        |var: &str, default: &str| -> String { optional(var).unwrap_or_else(|| default.to_string()) };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<usize>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let telegram_bot_token = optional("TELEGRAM_BOT_TOKEN");
    let telegram_chat_id = optional("TELEGRAM_CHAT_ID");
    let location_code = optional("RESTOCK_PINCODE");
    let product_urls = optional("RESTOCK_PRODUCT_URLS");

    let products_path = PathBuf::from(or_default(
        "RESTOCK_PRODUCTS_PATH",
        "./config/products.yaml",
    ));
    let state_path = PathBuf::from(or_default("RESTOCK_STATE_PATH", "./out_of_stock.txt"));
    let log_level = or_default("RESTOCK_LOG_LEVEL", "info");

    let detection = parse_detection(
        &or_default("RESTOCK_DETECTION", "structural"),
        or_default("RESTOCK_PURCHASE_SELECTOR", DEFAULT_PURCHASE_SELECTOR),
        or_default("RESTOCK_IN_STOCK_MARKER", DEFAULT_IN_STOCK_MARKER),
    )?;

    let location_prompt = LocationPromptConfig {
        input_selector: or_default(
            "RESTOCK_LOCATION_INPUT_SELECTOR",
            DEFAULT_LOCATION_INPUT_SELECTOR,
        ),
        suggestion_selector: or_default(
            "RESTOCK_LOCATION_SUGGESTION_SELECTOR",
            DEFAULT_LOCATION_SUGGESTION_SELECTOR,
        ),
        apply_selector: optional("RESTOCK_LOCATION_APPLY_SELECTOR"),
        frame_selector: optional("RESTOCK_LOCATION_FRAME_SELECTOR"),
        probe_timeout_secs: parse_u64("RESTOCK_LOCATION_WAIT_SECS", "10")?,
        settle_secs: parse_u64("RESTOCK_SETTLE_SECS", "5")?,
    };

    let navigation_timeout_secs = parse_u64("RESTOCK_NAVIGATION_TIMEOUT_SECS", "30")?;
    let chrome_executable = optional("RESTOCK_CHROME_EXECUTABLE").map(PathBuf::from);

    let max_concurrent_checks = parse_usize("RESTOCK_MAX_CONCURRENT_CHECKS", "1")?;
    if max_concurrent_checks == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "RESTOCK_MAX_CONCURRENT_CHECKS".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }

    let diagnostics_dir = optional("RESTOCK_DIAGNOSTICS_DIR").map(PathBuf::from);

    let notify_timeout_secs = parse_u64("RESTOCK_NOTIFY_TIMEOUT_SECS", "30")?;
    let notify_max_retries = parse_u32("RESTOCK_NOTIFY_MAX_RETRIES", "2")?;
    let notify_backoff_base_ms = parse_u64("RESTOCK_NOTIFY_BACKOFF_BASE_MS", "1000")?;

    Ok(AppConfig {
        telegram_bot_token,
        telegram_chat_id,
        location_code,
        product_urls,
        products_path,
        state_path,
        log_level,
        detection,
        location_prompt,
        navigation_timeout_secs,
        chrome_executable,
        max_concurrent_checks,
        diagnostics_dir,
        notify_timeout_secs,
        notify_max_retries,
        notify_backoff_base_ms,
    })
}

/// Parse the `RESTOCK_DETECTION` value into a [`DetectionRule`].
///
/// # Errors
///
/// Returns `ConfigError::InvalidEnvVar` for anything other than `structural`
/// or `text` (case-insensitive).
fn parse_detection(
    s: &str,
    purchase_selector: String,
    marker: String,
) -> Result<DetectionRule, ConfigError> {
    match s.to_ascii_lowercase().as_str() {
        "structural" => Ok(DetectionRule::Structural { purchase_selector }),
        "text" => Ok(DetectionRule::TextMarker { marker }),
        other => Err(ConfigError::InvalidEnvVar {
            var: "RESTOCK_DETECTION".to_string(),
            reason: format!("unknown detection rule '{other}' (expected 'structural' or 'text')"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
