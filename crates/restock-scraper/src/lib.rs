pub mod browser;
pub mod checker;
pub mod diagnostics;
pub mod error;
pub mod extract;
pub mod fetcher;
pub mod location;
pub mod wait;

pub use browser::{ChromiumRenderer, PageSession, Renderer, Scope};
pub use checker::StockChecker;
pub use diagnostics::{sink_from_config, DiagnosticSink, DirectorySink, NoopSink};
pub use error::ScraperError;
pub use extract::{
    rule_from_config, AvailabilityRule, PurchaseButtonRule, Signal, TextMarkerRule,
};
pub use fetcher::{PageFetcher, RenderedPage};
pub use location::{LocationOutcome, LocationResolver};
pub use wait::{wait_until, WaitOutcome};
