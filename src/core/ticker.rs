//! Background playback tick for hosts without a render loop.
//!
//! Spawns one named thread that polls `TimelineManager::update()` every
//! interval and hands the locked timeline to an optional callback, which is
//! where a renderer pulls `playhead()` and paints.
//!
//! Stopping (or dropping) the ticker signals the thread and joins it, so no
//! tick can touch the timeline after `stop()` returns. Disposing the
//! timeline ends the thread too; the callback never sees a disposed timeline.
//!
//! # Usage
//! ```ignore
//! let timeline = Arc::new(Mutex::new(TimelineManager::new(&config, probe)));
//! let ticker = PlaybackTicker::spawn_with(Arc::clone(&timeline), config.tick_interval(), |tl| {
//!     let head = tl.playhead();
//!     render(head.clip, head.source_time);
//! })?;
//! timeline.lock().unwrap().play();
//! ```

use crossbeam_channel::{bounded, select, tick, Sender};
use log::{trace, warn};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use super::timeline::TimelineManager;

pub struct PlaybackTicker {
    stop_tx: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl PlaybackTicker {
    pub fn spawn(timeline: Arc<Mutex<TimelineManager>>, interval: Duration) -> std::io::Result<Self> {
        Self::spawn_with(timeline, interval, |_| {})
    }

    /// Spawn with a per-tick callback (called with the timeline locked).
    pub fn spawn_with<F>(
        timeline: Arc<Mutex<TimelineManager>>,
        interval: Duration,
        mut on_tick: F,
    ) -> std::io::Result<Self>
    where
        F: FnMut(&TimelineManager) + Send + 'static,
    {
        let (stop_tx, stop_rx) = bounded::<()>(1);
        let ticks = tick(interval);

        let handle = thread::Builder::new()
            .name("vseq-playback-tick".to_string())
            .spawn(move || {
                trace!("Playback ticker started ({:?})", interval);
                loop {
                    select! {
                        // Message or disconnect both mean stop
                        recv(stop_rx) -> _ => break,
                        recv(ticks) -> _ => {
                            let Ok(mut tl) = timeline.lock() else {
                                warn!("Timeline lock poisoned, stopping ticker");
                                break;
                            };
                            if tl.is_disposed() {
                                trace!("Timeline disposed, stopping ticker");
                                break;
                            }
                            tl.update();
                            on_tick(&tl);
                        }
                    }
                }
                trace!("Playback ticker stopped");
            })?;

        Ok(Self {
            stop_tx: Some(stop_tx),
            handle: Some(handle),
        })
    }

    /// False once stopped or once the thread exited on its own.
    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Cancel the tick and wait for the thread to exit.
    pub fn stop(&mut self) {
        if let Some(tx) = self.stop_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("Playback ticker thread panicked");
            }
        }
    }
}

impl Drop for PlaybackTicker {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TimelineConfig;
    use crate::error::ProbeError;
    use crate::media::{FnProbe, MediaFile};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn shared_timeline() -> Arc<Mutex<TimelineManager>> {
        let config = TimelineConfig {
            tick_interval_ms: 5,
            probe_threads: 1,
            ..TimelineConfig::default()
        };
        let mut tl = TimelineManager::new(&config, Arc::new(FnProbe(|_: &MediaFile| Ok::<f64, ProbeError>(60.0))));
        tl.add_clips(&[MediaFile::new("long.mp4", "long.mp4")], None);
        Arc::new(Mutex::new(tl))
    }

    #[test]
    fn test_ticker_advances_and_stops() {
        let timeline = shared_timeline();
        let ticks = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&ticks);

        timeline.lock().unwrap().play();
        let mut ticker = PlaybackTicker::spawn_with(Arc::clone(&timeline), Duration::from_millis(5), move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        })
        .unwrap();
        assert!(ticker.is_running());

        thread::sleep(Duration::from_millis(200));
        ticker.stop();
        assert!(!ticker.is_running());

        let after_stop = ticks.load(Ordering::SeqCst);
        assert!(after_stop > 0);
        assert!(timeline.lock().unwrap().current_time() > 0.0);

        // Nothing runs after stop()
        thread::sleep(Duration::from_millis(50));
        assert_eq!(ticks.load(Ordering::SeqCst), after_stop);
    }

    #[test]
    fn test_dispose_ends_ticking() {
        let timeline = shared_timeline();
        let ticks = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&ticks);

        timeline.lock().unwrap().play();
        let mut ticker = PlaybackTicker::spawn_with(Arc::clone(&timeline), Duration::from_millis(5), move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        })
        .unwrap();

        thread::sleep(Duration::from_millis(50));
        timeline.lock().unwrap().dispose();
        let at_dispose = ticks.load(Ordering::SeqCst);

        thread::sleep(Duration::from_millis(100));
        assert_eq!(ticks.load(Ordering::SeqCst), at_dispose);
        assert!(!ticker.is_running());

        {
            let mut tl = timeline.lock().unwrap();
            tl.play();
            assert!(!tl.is_playing());
            assert_eq!(tl.update(), None);
        }
        ticker.stop();
    }

    #[test]
    fn test_drop_cancels() {
        let timeline = shared_timeline();
        {
            let _ticker = PlaybackTicker::spawn(Arc::clone(&timeline), Duration::from_millis(5)).unwrap();
        }
        // Ticker thread joined on drop; we hold the only other reference
        assert_eq!(Arc::strong_count(&timeline), 1);
    }
}
