use dubsync_core::MediaError;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::TempDir;

/// Scratch directory owned by a single pipeline run.
///
/// Every intermediate file is allocated through the arena so the directory
/// name, not the segment index alone, keeps concurrent runs apart.
pub struct RunArena {
    root: PathBuf,
    dir: Option<TempDir>,
    assets: Vec<PathBuf>,
    attempts: u32,
    backoff: Duration,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct CleanupReport {
    pub removed: usize,
    pub failed: Vec<PathBuf>,
}

impl CleanupReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

impl RunArena {
    pub fn create(parent: &Path, run_id: &str) -> Result<Self, MediaError> {
        std::fs::create_dir_all(parent)?;
        let dir = tempfile::Builder::new()
            .prefix(&format!("dubsync-{run_id}-"))
            .tempdir_in(parent)?;
        let root = dir.path().to_path_buf();
        tracing::debug!(path = %root.display(), "run arena created");
        Ok(Self {
            root,
            dir: Some(dir),
            assets: Vec::new(),
            attempts: 3,
            backoff: Duration::from_millis(500),
        })
    }

    /// Override the deletion retry policy used by [`cleanup`](Self::cleanup).
    pub fn with_retry(mut self, attempts: u32, backoff: Duration) -> Self {
        self.attempts = attempts.max(1);
        self.backoff = backoff;
        self
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Reserve a file name inside the arena and register it for cleanup.
    pub fn allocate(&mut self, name: &str) -> PathBuf {
        let path = self.root.join(name);
        self.assets.push(path.clone());
        path
    }

    pub fn segment_audio_path(&mut self, index: usize) -> PathBuf {
        self.allocate(&format!("seg_{index:05}.wav"))
    }

    pub fn assets(&self) -> &[PathBuf] {
        &self.assets
    }

    /// Delete every registered asset, retrying on transient failures, then
    /// remove the directory itself. Safe to call more than once.
    pub fn cleanup(&mut self) -> CleanupReport {
        let mut report = CleanupReport::default();
        for asset in self.assets.drain(..) {
            match remove_with_retry(&asset, self.attempts, self.backoff) {
                Ok(()) => report.removed += 1,
                Err(e) => {
                    tracing::warn!(path = %asset.display(), "failed to remove temporary asset: {e}");
                    report.failed.push(asset);
                }
            }
        }
        if let Some(dir) = self.dir.take() {
            if let Err(e) = dir.close() {
                tracing::warn!(path = %self.root.display(), "failed to remove run arena: {e}");
                report.failed.push(self.root.clone());
            }
        }
        tracing::debug!(removed = report.removed, failed = report.failed.len(), "run arena cleaned");
        report
    }
}

impl Drop for RunArena {
    fn drop(&mut self) {
        if self.dir.is_some() || !self.assets.is_empty() {
            let _ = self.cleanup();
        }
    }
}

/// Remove a file, retrying with a linear backoff. A missing file counts as removed.
pub fn remove_with_retry(path: &Path, attempts: u32, backoff: Duration) -> std::io::Result<()> {
    let attempts = attempts.max(1);
    let mut last_err = None;
    for attempt in 1..=attempts {
        match std::fs::remove_file(path) {
            Ok(()) => return Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
            Err(e) => {
                tracing::debug!(path = %path.display(), attempt, "remove failed: {e}");
                last_err = Some(e);
                if attempt < attempts {
                    std::thread::sleep(backoff * attempt);
                }
            }
        }
    }
    Err(last_err.unwrap_or_else(|| std::io::Error::other("remove failed")))
}
