//! Media collaborators of the timeline: duration probing and source handles.
//!
//! **Why**: the timeline never decodes anything itself. It needs exactly two
//! facts from the outside world per file: how long the media is, and a
//! handle the renderer can open it through.
//!
//! # Probing
//!
//! Every probe runs on its own thread and is abandoned after the configured
//! timeout. Batches run on a small rayon pool; results come back in input
//! order no matter which probe finishes first.
//!
//! ```ignore
//! let prober = Prober::new(Arc::new(FfmpegProbe), Duration::from_secs(10), 4);
//! let results = prober.probe_all(&files); // same length and order as files
//! ```

#[cfg(feature = "ffmpeg")]
pub mod ffmpeg;
pub mod handles;

use crossbeam_channel::{bounded, RecvTimeoutError};
use log::{trace, warn};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crate::error::ProbeError;

pub use handles::{HandleAllocator, SourceHandle, UrlAllocator};

/// Supported video file extensions
pub const VIDEO_EXTS: &[&str] = &["mp4", "mov", "avi", "mkv", "webm", "m4v"];

/// A media file offered to the timeline.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaFile {
    /// Display name (file name for files on disk)
    pub name: String,
    pub path: PathBuf,
}

impl MediaFile {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }

    pub fn from_path(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string_lossy().into_owned());
        Self::new(name, path)
    }

    /// Check if file has a known video extension
    pub fn is_video(&self) -> bool {
        self.path
            .extension()
            .and_then(|s| s.to_str())
            .map(|s| VIDEO_EXTS.contains(&s.to_lowercase().as_str()))
            .unwrap_or(false)
    }
}

/// Source of intrinsic media durations.
pub trait MediaProbe: Send + Sync {
    /// Duration in seconds. Validation happens in the caller.
    fn duration(&self, file: &MediaFile) -> Result<f64, ProbeError>;
}

/// Probe backed by a closure (known durations, tests, remote metadata).
pub struct FnProbe<F>(pub F);

impl<F> MediaProbe for FnProbe<F>
where
    F: Fn(&MediaFile) -> Result<f64, ProbeError> + Send + Sync,
{
    fn duration(&self, file: &MediaFile) -> Result<f64, ProbeError> {
        (self.0)(file)
    }
}

/// Reject NaN, infinite and non-positive durations.
pub fn validate_duration(secs: f64) -> Result<f64, ProbeError> {
    if secs.is_finite() && secs > 0.0 {
        Ok(secs)
    } else {
        Err(ProbeError::InvalidDuration(secs))
    }
}

/// Run one probe, giving up after `timeout`.
///
/// The probe thread is detached on timeout; its late result is dropped.
pub fn probe_with_timeout(
    probe: &Arc<dyn MediaProbe>,
    file: &MediaFile,
    timeout: Duration,
) -> Result<f64, ProbeError> {
    let (tx, rx) = bounded(1);
    let worker_probe = Arc::clone(probe);
    let worker_file = file.clone();

    let spawned = thread::Builder::new()
        .name("vseq-probe".to_string())
        .spawn(move || {
            let _ = tx.send(worker_probe.duration(&worker_file));
        });
    if let Err(e) = spawned {
        return Err(ProbeError::Unreadable(format!("Failed to spawn probe thread: {}", e)));
    }

    match rx.recv_timeout(timeout) {
        Ok(result) => {
            let secs = validate_duration(result?)?;
            trace!("Probed {}: {:.3}s", file.name, secs);
            Ok(secs)
        }
        Err(RecvTimeoutError::Timeout) => Err(ProbeError::Timeout(timeout.as_millis() as u64)),
        Err(RecvTimeoutError::Disconnected) => Err(ProbeError::Disconnected),
    }
}

/// Probe runner owned by the timeline.
pub struct Prober {
    probe: Arc<dyn MediaProbe>,
    timeout: Duration,
    pool: Option<rayon::ThreadPool>,
}

impl Prober {
    pub fn new(probe: Arc<dyn MediaProbe>, timeout: Duration, threads: usize) -> Self {
        let pool = if threads > 1 {
            rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .thread_name(|i| format!("vseq-probe-pool-{}", i))
                .build()
                .map_err(|e| warn!("Probe pool unavailable, probing sequentially: {}", e))
                .ok()
        } else {
            None
        };

        Self {
            probe,
            timeout,
            pool,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn probe(&self, file: &MediaFile) -> Result<f64, ProbeError> {
        probe_with_timeout(&self.probe, file, self.timeout)
    }

    /// Probe every file. Output order matches `files`.
    pub fn probe_all(&self, files: &[MediaFile]) -> Vec<Result<f64, ProbeError>> {
        match &self.pool {
            Some(pool) if files.len() > 1 => {
                pool.install(|| files.par_iter().map(|f| self.probe(f)).collect())
            }
            _ => files.iter().map(|f| self.probe(f)).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn probe_from(f: impl Fn(&MediaFile) -> Result<f64, ProbeError> + Send + Sync + 'static) -> Arc<dyn MediaProbe> {
        Arc::new(FnProbe(f))
    }

    #[test]
    fn test_validate_duration() {
        assert_eq!(validate_duration(4.5), Ok(4.5));
        assert!(matches!(validate_duration(0.0), Err(ProbeError::InvalidDuration(_))));
        assert!(matches!(validate_duration(-1.0), Err(ProbeError::InvalidDuration(_))));
        assert!(validate_duration(f64::NAN).is_err());
        assert!(validate_duration(f64::INFINITY).is_err());
    }

    #[test]
    fn test_probe_timeout() {
        let slow = probe_from(|_| {
            thread::sleep(Duration::from_millis(500));
            Ok(3.0)
        });
        let file = MediaFile::new("slow.mp4", "slow.mp4");
        let result = probe_with_timeout(&slow, &file, Duration::from_millis(20));
        assert_eq!(result, Err(ProbeError::Timeout(20)));
    }

    #[test]
    fn test_probe_all_keeps_input_order() {
        // Earlier files finish later
        let probe = probe_from(|f| {
            let secs: f64 = f.name.parse().unwrap();
            thread::sleep(Duration::from_millis((50.0 / secs) as u64));
            Ok(secs)
        });
        let prober = Prober::new(probe, Duration::from_secs(5), 4);
        let files: Vec<MediaFile> = ["1", "2", "5", "10"]
            .iter()
            .map(|n| MediaFile::new(*n, *n))
            .collect();
        let results = prober.probe_all(&files);
        let durations: Vec<f64> = results.into_iter().map(|r| r.unwrap()).collect();
        assert_eq!(durations, vec![1.0, 2.0, 5.0, 10.0]);
    }

    #[test]
    fn test_probe_error_passes_through() {
        let probe = probe_from(|_| Err(ProbeError::Unreadable("corrupt".into())));
        let prober = Prober::new(probe, Duration::from_secs(1), 1);
        let file = MediaFile::new("bad.mov", "bad.mov");
        assert_eq!(prober.probe(&file), Err(ProbeError::Unreadable("corrupt".into())));
    }

    #[test]
    fn test_media_file_from_path() {
        let f = MediaFile::from_path("/tmp/clips/Intro.MP4");
        assert_eq!(f.name, "Intro.MP4");
        assert!(f.is_video());
        assert!(!MediaFile::from_path("notes.txt").is_video());
    }
}
