//! Debug evidence captured when a page interaction goes wrong.

use std::path::PathBuf;

use async_trait::async_trait;

/// Receives page evidence keyed by product name. Capture is best effort and
/// never affects the check result.
#[async_trait]
pub trait DiagnosticSink: Send + Sync {
    async fn capture(&self, product_name: &str, screenshot: Option<&[u8]>, html: Option<&str>);
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSink;

#[async_trait]
impl DiagnosticSink for NoopSink {
    async fn capture(&self, _product_name: &str, _screenshot: Option<&[u8]>, _html: Option<&str>) {}
}

/// Writes `<dir>/<name>.png` and `<dir>/<name>.html`, overwriting the
/// previous capture for the same product.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

/// Map a product name to a safe file stem.
pub(crate) fn file_stem(product_name: &str) -> String {
    let stem: String = product_name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if stem.is_empty() {
        "page".to_string()
    } else {
        stem
    }
}

#[async_trait]
impl DiagnosticSink for DirectorySink {
    async fn capture(&self, product_name: &str, screenshot: Option<&[u8]>, html: Option<&str>) {
        if let Err(e) = tokio::fs::create_dir_all(&self.dir).await {
            tracing::warn!(dir = %self.dir.display(), error = %e, "cannot create diagnostics dir");
            return;
        }

        let stem = file_stem(product_name);

        if let Some(bytes) = screenshot {
            let path = self.dir.join(format!("{stem}.png"));
            match tokio::fs::write(&path, bytes).await {
                Ok(()) => tracing::info!(path = %path.display(), "saved debug screenshot"),
                Err(e) => tracing::warn!(path = %path.display(), error = %e, "failed to save screenshot"),
            }
        }

        if let Some(markup) = html {
            let path = self.dir.join(format!("{stem}.html"));
            match tokio::fs::write(&path, markup).await {
                Ok(()) => tracing::info!(path = %path.display(), "saved debug page source"),
                Err(e) => tracing::warn!(path = %path.display(), error = %e, "failed to save page source"),
            }
        }
    }
}

/// Directory sink when a diagnostics dir is configured, otherwise no-op.
#[must_use]
pub fn sink_from_config(config: &restock_core::AppConfig) -> std::sync::Arc<dyn DiagnosticSink> {
    match &config.diagnostics_dir {
        Some(dir) => std::sync::Arc::new(DirectorySink::new(dir.clone())),
        None => std::sync::Arc::new(NoopSink),
    }
}
