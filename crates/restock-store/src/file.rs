use std::io::Write;
use std::path::{Path, PathBuf};

use crate::set::UnavailableSet;
use crate::StoreError;

/// The unavailable-set as read at the start of a cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    pub set: UnavailableSet,
    /// `true` when no state file existed yet.
    pub first_run: bool,
}

/// Newline-delimited state file holding the current [`UnavailableSet`].
#[derive(Debug, Clone)]
pub struct StateFile {
    path: PathBuf,
}

impl StateFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the persisted set. A missing file is a first run and yields an
    /// empty set.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the file exists but cannot be read.
    pub fn load(&self) -> Result<Snapshot, StoreError> {
        match std::fs::read_to_string(&self.path) {
            Ok(content) => {
                let set = UnavailableSet::parse(&content);
                tracing::debug!(
                    path = %self.path.display(),
                    entries = set.len(),
                    "loaded unavailable set"
                );
                Ok(Snapshot {
                    set,
                    first_run: false,
                })
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(
                    path = %self.path.display(),
                    "no state file yet — treating as first run"
                );
                Ok(Snapshot {
                    set: UnavailableSet::new(),
                    first_run: true,
                })
            }
            Err(e) => Err(self.io_error(e)),
        }
    }

    /// Replace the persisted set with `set`.
    ///
    /// The content is written to a sibling temp file, flushed, and renamed
    /// over the target so readers never observe a partial write. Missing
    /// parent directories are created.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] on any filesystem failure.
    pub fn save(&self, set: &UnavailableSet) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }

        let tmp_path = self.tmp_path();
        let write = || -> std::io::Result<()> {
            let mut file = std::fs::File::create(&tmp_path)?;
            file.write_all(set.render().as_bytes())?;
            file.sync_all()?;
            std::fs::rename(&tmp_path, &self.path)
        };

        if let Err(e) = write() {
            let _ = std::fs::remove_file(&tmp_path);
            return Err(self.io_error(e));
        }

        tracing::debug!(
            path = %self.path.display(),
            entries = set.len(),
            "persisted unavailable set"
        );
        Ok(())
    }

    /// Delete the state file so the next cycle is a first run.
    /// Returns `true` if a file was removed.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the file exists but cannot be removed.
    pub fn clear(&self) -> Result<bool, StoreError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(self.io_error(e)),
        }
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(std::ffi::OsStr::to_os_string)
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn io_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }
}
