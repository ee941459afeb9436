//! Rendering-engine abstraction.
//!
//! [`Renderer`] launches one isolated browser per product check and hands
//! back a [`PageSession`]. Callers must finish with [`PageSession::close`];
//! the Chromium implementation also tears down on drop.

mod chromium;
mod script;

use async_trait::async_trait;

use crate::error::ScraperError;

pub use chromium::ChromiumRenderer;

/// Document context that element lookups run against.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Scope {
    /// The top-level document.
    #[default]
    Document,
    /// The document of the first iframe matching this CSS selector.
    Frame(String),
}

impl Scope {
    #[must_use]
    pub fn from_frame_selector(frame_selector: Option<&str>) -> Self {
        frame_selector.map_or(Scope::Document, |s| Scope::Frame(s.to_string()))
    }
}

impl std::fmt::Display for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Scope::Document => f.write_str("document"),
            Scope::Frame(selector) => write!(f, "frame({selector})"),
        }
    }
}

/// A launched browser engine.
#[async_trait]
pub trait Renderer: Send + Sync {
    /// Start an engine instance with a single blank page.
    async fn open(&self) -> Result<Box<dyn PageSession>, ScraperError>;
}

/// One page in a running engine instance.
///
/// Element lookups never wait; bounded waiting is layered on top with
/// [`crate::wait::wait_until`].
#[async_trait]
pub trait PageSession: Send + Sync {
    /// Navigate and wait for the load event.
    async fn goto(&self, url: &str) -> Result<(), ScraperError>;

    /// `true` if a visible element matching `selector` is in `scope` right now.
    async fn exists(&self, scope: &Scope, selector: &str) -> Result<bool, ScraperError>;

    /// Replace the value of the matching input with `text`, as if typed.
    async fn type_text(&self, scope: &Scope, selector: &str, text: &str)
        -> Result<(), ScraperError>;

    /// Click the first element matching `selector`.
    async fn click(&self, scope: &Scope, selector: &str) -> Result<(), ScraperError>;

    /// Click the first element matching `selector` whose trimmed text equals
    /// `text` exactly. Returns `false` if no such element exists yet.
    async fn click_exact_text(
        &self,
        scope: &Scope,
        selector: &str,
        text: &str,
    ) -> Result<bool, ScraperError>;

    /// Serialized post-script DOM of the top-level document.
    async fn content(&self) -> Result<String, ScraperError>;

    /// Full-page PNG screenshot.
    async fn screenshot(&self) -> Result<Vec<u8>, ScraperError>;

    /// Shut the engine instance down.
    async fn close(self: Box<Self>) -> Result<(), ScraperError>;
}
