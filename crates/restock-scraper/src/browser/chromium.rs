//! Headless Chromium backend built on `chromiumoxide`.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::input::InsertTextParams;
use chromiumoxide::page::ScreenshotParams;
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use super::{script, PageSession, Renderer, Scope};
use crate::error::ScraperError;

/// Upper bound for the browser to exit after a close request.
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

/// Launches a fresh headless Chromium process per [`Renderer::open`] call.
#[derive(Debug, Clone)]
pub struct ChromiumRenderer {
    navigation_timeout: Duration,
    executable: Option<PathBuf>,
}

impl ChromiumRenderer {
    #[must_use]
    pub fn new(navigation_timeout: Duration, executable: Option<PathBuf>) -> Self {
        Self {
            navigation_timeout,
            executable,
        }
    }

    #[must_use]
    pub fn from_config(config: &restock_core::AppConfig) -> Self {
        Self::new(
            Duration::from_secs(config.navigation_timeout_secs),
            config.chrome_executable.clone(),
        )
    }

    fn browser_config(&self) -> Result<BrowserConfig, ScraperError> {
        // Sandboxing is disabled for containers and CI runners, which
        // usually lack the user namespaces Chromium's sandbox needs.
        let mut builder = BrowserConfig::builder()
            .no_sandbox()
            .arg("--disable-dev-shm-usage")
            .arg("--disable-gpu")
            .arg("--no-first-run")
            .window_size(1366, 900)
            .request_timeout(self.navigation_timeout)
            .launch_timeout(self.navigation_timeout);

        if let Some(executable) = &self.executable {
            builder = builder.chrome_executable(executable);
        }

        builder.build().map_err(ScraperError::Launch)
    }
}

#[async_trait]
impl Renderer for ChromiumRenderer {
    async fn open(&self) -> Result<Box<dyn PageSession>, ScraperError> {
        let config = self.browser_config()?;

        let (mut browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| ScraperError::Launch(e.to_string()))?;

        // The handler stream drives the CDP connection; it must be polled for
        // the browser to make progress.
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::debug!(error = %e, "chromium handler event error");
                }
            }
        });

        let page = match browser.new_page("about:blank").await {
            Ok(page) => page,
            Err(e) => {
                shutdown(&mut browser).await;
                handler_task.abort();
                return Err(e.into());
            }
        };

        tracing::debug!("chromium session started");
        Ok(Box::new(ChromiumSession {
            browser: Mutex::new(browser),
            page,
            handler_task,
            navigation_timeout: self.navigation_timeout,
        }))
    }
}

struct ChromiumSession {
    browser: Mutex<Browser>,
    page: Page,
    handler_task: JoinHandle<()>,
    navigation_timeout: Duration,
}

impl ChromiumSession {
    async fn eval_bool(&self, js: String) -> Result<bool, ScraperError> {
        let result = self.page.evaluate(js).await?;
        result
            .into_value::<bool>()
            .map_err(|e| ScraperError::Interaction(format!("unexpected script result: {e}")))
    }
}

#[async_trait]
impl PageSession for ChromiumSession {
    async fn goto(&self, url: &str) -> Result<(), ScraperError> {
        match tokio::time::timeout(self.navigation_timeout, self.page.goto(url)).await {
            Ok(Ok(_)) => Ok(()),
            Ok(Err(e)) => Err(ScraperError::Navigation {
                url: url.to_string(),
                reason: e.to_string(),
            }),
            Err(_) => Err(ScraperError::Timeout {
                operation: format!("navigation to {url}"),
                secs: self.navigation_timeout.as_secs(),
            }),
        }
    }

    async fn exists(&self, scope: &Scope, selector: &str) -> Result<bool, ScraperError> {
        self.eval_bool(script::exists(scope, selector)).await
    }

    async fn type_text(
        &self,
        scope: &Scope,
        selector: &str,
        text: &str,
    ) -> Result<(), ScraperError> {
        if !self.eval_bool(script::focus_and_clear(scope, selector)).await? {
            return Err(ScraperError::Interaction(format!(
                "no input matching \"{selector}\" in {scope}"
            )));
        }
        // Input.insertText goes to the focused element, including inside a
        // same-origin frame, and fires the same input events as typing.
        self.page.execute(InsertTextParams::new(text)).await?;
        self.eval_bool(script::after_typing(scope, selector)).await?;
        Ok(())
    }

    async fn click(&self, scope: &Scope, selector: &str) -> Result<(), ScraperError> {
        if self.eval_bool(script::click(scope, selector)).await? {
            Ok(())
        } else {
            Err(ScraperError::Interaction(format!(
                "no element matching \"{selector}\" in {scope}"
            )))
        }
    }

    async fn click_exact_text(
        &self,
        scope: &Scope,
        selector: &str,
        text: &str,
    ) -> Result<bool, ScraperError> {
        self.eval_bool(script::click_exact_text(scope, selector, text))
            .await
    }

    async fn content(&self) -> Result<String, ScraperError> {
        Ok(self.page.content().await?)
    }

    async fn screenshot(&self) -> Result<Vec<u8>, ScraperError> {
        let params = ScreenshotParams::builder().full_page(true).build();
        Ok(self.page.screenshot(params).await?)
    }

    async fn close(self: Box<Self>) -> Result<(), ScraperError> {
        {
            let mut browser = self.browser.lock().await;
            shutdown(&mut browser).await;
        }
        self.handler_task.abort();
        tracing::debug!("chromium session closed");
        Ok(())
    }
}

impl Drop for ChromiumSession {
    fn drop(&mut self) {
        // Covers early drops (panics, cancelled futures). `Browser` kills its
        // child process on drop; the handler task would otherwise linger.
        self.handler_task.abort();
    }
}

/// Close the browser and wait for its process to exit, killing it if it
/// does not go away within [`SHUTDOWN_TIMEOUT`].
async fn shutdown(browser: &mut Browser) {
    let graceful = tokio::time::timeout(SHUTDOWN_TIMEOUT, async {
        if let Err(e) = browser.close().await {
            tracing::debug!(error = %e, "browser close command failed");
        }
        browser.wait().await
    })
    .await;

    match graceful {
        Ok(Ok(_)) => {}
        Ok(Err(e)) => tracing::warn!(error = %e, "waiting for browser exit failed"),
        Err(_) => {
            tracing::warn!("browser did not exit in time — killing process");
            if let Some(Err(e)) = browser.kill().await {
                tracing::warn!(error = %e, "failed to kill browser process");
            }
        }
    }
}
