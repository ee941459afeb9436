//! Durable dedup state for restock alerts.
//!
//! The store is a newline-delimited file listing the product URLs that were
//! unavailable at the end of the last check cycle. It is read once at cycle
//! start and fully rewritten once at cycle end.

mod file;
mod set;

use std::path::PathBuf;

use thiserror::Error;

pub use file::{Snapshot, StateFile};
pub use set::UnavailableSet;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("state file I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
