//! Periodic PNG snapshots of the shared surface.
//!
//! A snapshot is written only when the surface generation has moved since
//! the last successful write, and at most once per period.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::canvas::SurfaceBuffer;
use crate::error::{Result, ViewerError};

/// Writes the surface to a PNG file whenever it changes.
pub struct SnapshotWriter {
    surface: Arc<Mutex<SurfaceBuffer>>,
    path: PathBuf,
    last_generation: Option<u64>,
    written: u64,
}

impl SnapshotWriter {
    /// Snapshot `surface` to `path`.
    pub fn new(surface: Arc<Mutex<SurfaceBuffer>>, path: impl Into<PathBuf>) -> Self {
        Self {
            surface,
            path: path.into(),
            last_generation: None,
            written: 0,
        }
    }

    /// Target file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of snapshots written so far.
    pub fn written(&self) -> u64 {
        self.written
    }

    /// Write a snapshot if the surface changed since the last write.
    ///
    /// Returns `true` if a file was written. A failed write is retried on
    /// the next call.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding or writing the PNG fails.
    pub async fn write_if_changed(&mut self) -> Result<bool> {
        let snapshot = {
            let guard = match self.surface.lock() {
                Ok(s) => s,
                Err(p) => p.into_inner(),
            };
            if self.last_generation == Some(guard.generation()) {
                return Ok(false);
            }
            guard.clone()
        };

        let generation = snapshot.generation();
        let target = self.path.clone();
        tokio::task::spawn_blocking(move || snapshot.save_png(&target))
            .await
            .map_err(|e| ViewerError::Io(std::io::Error::other(e)))??;

        self.last_generation = Some(generation);
        self.written += 1;
        debug!(path = %self.path.display(), generation, "snapshot written");
        Ok(true)
    }

    /// Check for changes every `every` until `cancel` fires.
    ///
    /// Returns the total number of snapshots written.
    pub async fn run(mut self, every: Duration, cancel: CancellationToken) -> u64 {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                () = cancel.cancelled() => break,
                _ = ticker.tick() => {}
            }
            if let Err(e) = self.write_if_changed().await {
                warn!(path = %self.path.display(), "snapshot failed: {e}");
            }
        }
        self.written
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::Rgb;

    fn shared(width: u32, height: u32) -> Arc<Mutex<SurfaceBuffer>> {
        Arc::new(Mutex::new(SurfaceBuffer::new(width, height)))
    }

    #[tokio::test]
    async fn writes_once_per_change() {
        let dir = tempfile::tempdir().expect("tempdir");
        let surface = shared(2, 2);
        let mut writer = SnapshotWriter::new(Arc::clone(&surface), dir.path().join("canvas.png"));

        assert!(writer.write_if_changed().await.expect("first write"));
        assert!(!writer.write_if_changed().await.expect("unchanged"));

        surface.lock().expect("lock").fill(Rgb::new(255, 255, 255));
        assert!(writer.write_if_changed().await.expect("changed"));
        assert_eq!(writer.written(), 2);

        let png = image::open(writer.path()).expect("valid png").to_rgba8();
        assert_eq!(png.dimensions(), (2, 2));
        assert_eq!(png.get_pixel(1, 1).0, [255, 255, 255, 255]);
    }

    #[tokio::test]
    async fn failed_write_is_retried() {
        let dir = tempfile::tempdir().expect("tempdir");
        // A directory cannot be overwritten by a file.
        let mut writer = SnapshotWriter::new(shared(1, 1), dir.path());

        assert!(writer.write_if_changed().await.is_err());
        assert!(writer.write_if_changed().await.is_err());
        assert_eq!(writer.written(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn run_skips_unchanged_generations() {
        let dir = tempfile::tempdir().expect("tempdir");
        let surface = shared(2, 2);
        let writer = SnapshotWriter::new(Arc::clone(&surface), dir.path().join("canvas.png"));
        let cancel = CancellationToken::new();
        let task = tokio::spawn(writer.run(Duration::from_secs(1), cancel.clone()));

        // Ticks at 0s, 1s, 2s: only the first sees a new generation.
        tokio::time::sleep(Duration::from_millis(2_500)).await;

        // Two changes inside one period produce one write at 3s.
        {
            let mut guard = surface.lock().expect("lock");
            guard.fill(Rgb::new(255, 0, 0));
            guard.fill(Rgb::new(0, 0, 255));
        }
        tokio::time::sleep(Duration::from_millis(2_000)).await;

        cancel.cancel();
        assert_eq!(task.await.expect("join"), 2);

        let png = image::open(dir.path().join("canvas.png"))
            .expect("valid png")
            .to_rgba8();
        assert_eq!(png.get_pixel(0, 0).0, [0, 0, 255, 255]);
    }
}
