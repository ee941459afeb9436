use std::collections::HashSet;
use std::path::Path;

use serde::Deserialize;

use crate::{AppConfig, ConfigError};

/// A product page being watched. The canonical URL is the stable key used by
/// the dedup store.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Product {
    pub url: String,
    /// Display name, e.g. `"amul-high-protein-plain-lassi-200-ml-or-pack-of-30"`.
    pub name: String,
}

impl Product {
    /// Build a product from its URL, deriving the display name from the last
    /// path segment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidProductUrl`] if the URL is blank or not
    /// an `http(s)` URL.
    pub fn from_url(url: &str) -> Result<Self, ConfigError> {
        let url = url.trim();
        if url.is_empty() {
            return Err(ConfigError::InvalidProductUrl {
                url: url.to_string(),
                reason: "URL is empty".to_string(),
            });
        }
        if !(url.starts_with("https://") || url.starts_with("http://")) {
            return Err(ConfigError::InvalidProductUrl {
                url: url.to_string(),
                reason: "URL must start with http:// or https://".to_string(),
            });
        }
        Ok(Self {
            url: url.to_string(),
            name: display_name(url),
        })
    }
}

impl std::fmt::Display for Product {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}

/// Last non-empty path segment of `url`, ignoring query string and fragment.
/// Falls back to the host when the URL has no path.
fn display_name(url: &str) -> String {
    let without_scheme = url.split_once("://").map_or(url, |(_, rest)| rest);
    let path = without_scheme
        .split(['?', '#'])
        .next()
        .unwrap_or(without_scheme);
    path.split('/')
        .filter(|segment| !segment.is_empty())
        .next_back()
        .unwrap_or(path)
        .to_string()
}

#[derive(Debug, Deserialize)]
pub struct ProductEntry {
    pub url: String,
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ProductsFile {
    pub products: Vec<ProductEntry>,
}

/// Load and validate the product list from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_products(path: &Path) -> Result<Vec<Product>, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ProductsFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let file: ProductsFile = serde_yaml::from_str(&content)?;

    let products = file
        .products
        .into_iter()
        .map(|entry| {
            let mut product = Product::from_url(&entry.url)?;
            if let Some(name) = entry.name.filter(|n| !n.trim().is_empty()) {
                product.name = name.trim().to_string();
            }
            Ok(product)
        })
        .collect::<Result<Vec<_>, ConfigError>>()?;

    validate_products(&products)?;
    Ok(products)
}

/// Parse a comma- or newline-separated list of product URLs.
///
/// # Errors
///
/// Returns `ConfigError` if any URL is invalid, the list is empty, or a URL
/// appears twice.
pub fn parse_product_urls(raw: &str) -> Result<Vec<Product>, ConfigError> {
    let products = raw
        .split([',', '\n'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(Product::from_url)
        .collect::<Result<Vec<_>, ConfigError>>()?;

    validate_products(&products)?;
    Ok(products)
}

/// Resolve the configured product list: `RESTOCK_PRODUCT_URLS` wins over the
/// products file.
///
/// # Errors
///
/// Returns `ConfigError` from whichever source is used.
pub fn products_from_config(config: &AppConfig) -> Result<Vec<Product>, ConfigError> {
    match config.product_urls.as_deref() {
        Some(raw) => parse_product_urls(raw),
        None => load_products(&config.products_path),
    }
}

fn validate_products(products: &[Product]) -> Result<(), ConfigError> {
    if products.is_empty() {
        return Err(ConfigError::Validation(
            "at least one product URL must be configured".to_string(),
        ));
    }

    let mut seen = HashSet::new();
    for product in products {
        if !seen.insert(product.url.as_str()) {
            return Err(ConfigError::Validation(format!(
                "duplicate product URL: '{}'",
                product.url
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
#[path = "products_test.rs"]
mod tests;
