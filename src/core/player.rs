//! Playback state machine with tick-driven timing.
//!
//! **Architecture**: Playback does NOT own the clips or the clock. The
//! timeline passes the current clock reading and total duration into each
//! call, which keeps this type trivially testable.
//!
//! # States
//!
//! ```text
//!            play()
//!   Paused ─────────▶ Playing ──┐ update(): time += elapsed,
//!     ▲                  │      │ wraps to 0 at total duration
//!     └──────────────────┘ ◀────┘
//!           pause()
//! ```
//!
//! Initial state is Paused at time 0. `pause()` keeps the current time.
//! With looping disabled, reaching the end stops at the end and pauses.
//!
//! # Playback Loop
//!
//! `update()` is polled by the host (render loop or `PlaybackTicker`). It
//! advances only once at least one tick interval has elapsed since the
//! previous advance, by the full elapsed time.

use log::{debug, trace};
use serde::Serialize;
use std::time::Duration;

/// Default polling interval of the playback tick
pub const DEFAULT_TICK: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PlaybackState {
    Paused,
    Playing,
}

#[derive(Debug, Clone)]
pub struct Playback {
    state: PlaybackState,
    current_time: f64,
    tick_interval: Duration,
    loop_enabled: bool,
    /// Clock reading of the last advance (None until the first tick)
    last_tick: Option<Duration>,
}

impl Playback {
    pub fn new(tick_interval: Duration, loop_enabled: bool) -> Self {
        Self {
            state: PlaybackState::Paused,
            current_time: 0.0,
            tick_interval,
            loop_enabled,
            last_tick: None,
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state == PlaybackState::Playing
    }

    pub fn current_time(&self) -> f64 {
        self.current_time
    }

    pub fn tick_interval(&self) -> Duration {
        self.tick_interval
    }

    pub fn loop_enabled(&self) -> bool {
        self.loop_enabled
    }

    pub fn set_loop_enabled(&mut self, enabled: bool) {
        self.loop_enabled = enabled;
    }

    /// Start playing. Returns false if already playing.
    pub fn play(&mut self, now: Duration) -> bool {
        if self.is_playing() {
            return false;
        }
        self.state = PlaybackState::Playing;
        self.last_tick = Some(now);
        debug!("Playback started at {:.3}s", self.current_time);
        true
    }

    /// Pause, keeping the current time. Returns false if already paused.
    pub fn pause(&mut self) -> bool {
        if !self.is_playing() {
            return false;
        }
        self.state = PlaybackState::Paused;
        self.last_tick = None;
        debug!("Playback paused at {:.3}s", self.current_time);
        true
    }

    /// Jump to `time`, clamped into `[0, total]`. Playing state is unchanged.
    pub fn seek(&mut self, time: f64, total: f64) -> f64 {
        let total = total.max(0.0);
        self.current_time = if time.is_nan() { 0.0 } else { time.clamp(0.0, total) };
        trace!("Seek to {:.3}s", self.current_time);
        self.current_time
    }

    /// Pull current time back inside `[0, total]` after the timeline shrank.
    pub fn clamp_to(&mut self, total: f64) {
        if self.current_time > total {
            self.current_time = total.max(0.0);
        }
    }

    /// Poll the tick. Returns Some(new_time) when time advanced.
    pub fn update(&mut self, now: Duration, total: f64) -> Option<f64> {
        if !self.is_playing() {
            return None;
        }
        if total <= 0.0 {
            // Nothing to play yet; time spent empty must not count later
            self.last_tick = Some(now);
            return None;
        }

        if let Some(last) = self.last_tick {
            let elapsed = now.saturating_sub(last);
            if elapsed >= self.tick_interval {
                self.last_tick = Some(now);
                return Some(self.advance(elapsed.as_secs_f64(), total));
            }
        } else {
            self.last_tick = Some(now);
        }
        None
    }

    fn advance(&mut self, elapsed: f64, total: f64) -> f64 {
        let next = self.current_time + elapsed;
        if next >= total {
            if self.loop_enabled {
                trace!("Playback loop: {:.3}s -> 0", self.current_time);
                self.current_time = 0.0;
            } else {
                trace!("Reached end, stopping");
                self.current_time = total;
                self.pause();
            }
        } else {
            self.current_time = next;
        }
        self.current_time
    }

    /// Back to the initial state: Paused at 0.
    pub fn reset(&mut self) {
        self.state = PlaybackState::Paused;
        self.current_time = 0.0;
        self.last_tick = None;
    }
}

impl Default for Playback {
    fn default() -> Self {
        Self::new(DEFAULT_TICK, true)
    }
}
