//! TimelineManager - owned state of one editing session.
//!
//! **Architecture**: one explicit object per editor session; no globals.
//! It owns the clip list, the selection, the playback state, and every
//! source handle it allocated. Collaborators are injected:
//!
//! - `MediaProbe` (via `Prober`) - intrinsic durations, bounded by a timeout
//! - `HandleAllocator` - issues/reclaims per-clip source handles
//! - `Clock` - time source for the playback tick
//!
//! **Used by**: editor UI callbacks (trim sliders, drag-reorder, region
//! handles), `PlaybackTicker`, renderers pulling `playhead()` every tick.
//!
//! # Failure Semantics
//!
//! - probe failures skip the file and are listed in `AddReport::skipped`
//! - unknown clip/region ids are no-ops (logged at debug)
//! - trim ranges are clamped, never rejected
//! - only `reorder_clip` returns an error (indices out of range)
//! - after `dispose()` the timeline is inert: `add_clips`, `play` and
//!   `update` do nothing, and a `PlaybackTicker` driving it exits
//!
//! # Layout
//!
//! Offsets are rewritten by `layout::relayout` after every mutation that can
//! move a clip (add, remove, reorder, trim, speed). Recompute is per track,
//! so editing a grid group never shifts clips of another track.

use log::{debug, info, warn};
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use super::clock::{Clock, SystemClock};
use super::layout::{self, TrackKey};
use super::player::{Playback, PlaybackState};
use crate::config::TimelineConfig;
use crate::entities::clip::{Clip, ClipId, GroupId};
use crate::entities::effects::{EffectsPatch, RegionBlur, RegionBlurPatch};
use crate::error::{ProbeError, Result, SequenceError};
use crate::media::{HandleAllocator, MediaFile, MediaProbe, Prober, UrlAllocator};

/// A file that did not become a clip.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedFile {
    pub file: String,
    #[serde(serialize_with = "serialize_reason")]
    pub reason: ProbeError,
}

fn serialize_reason<S: serde::Serializer>(reason: &ProbeError, s: S) -> std::result::Result<S::Ok, S::Error> {
    s.collect_str(reason)
}

/// Partial-success result of `add_clips`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AddReport {
    /// New clip ids, in file order
    pub added: Vec<ClipId>,
    pub skipped: Vec<SkippedFile>,
}

/// What a renderer needs each tick.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Playhead<'a> {
    pub time: f64,
    pub playing: bool,
    pub clip: Option<&'a Clip>,
    /// Source position inside `clip` to display
    pub source_time: Option<f64>,
}

/// Serializable view of the whole timeline.
#[derive(Debug, Serialize)]
pub struct TimelineSnapshot<'a> {
    pub clips: &'a [Clip],
    pub selected: Option<ClipId>,
    pub current_time: f64,
    pub state: PlaybackState,
    pub total_duration: f64,
}

pub struct TimelineManager {
    clips: Vec<Clip>,
    selected: Option<ClipId>,
    playback: Playback,
    clock: Box<dyn Clock>,
    prober: Prober,
    handles: Box<dyn HandleAllocator>,
    trim_epsilon: f64,
    disposed: bool,
}

impl TimelineManager {
    /// New empty timeline with the system clock and URL handles.
    pub fn new(config: &TimelineConfig, probe: Arc<dyn MediaProbe>) -> Self {
        info!(
            "Timeline created (tick {} ms, probe timeout {} ms, {} probe threads)",
            config.tick_interval_ms, config.probe_timeout_ms, config.probe_threads
        );
        Self {
            clips: Vec::new(),
            selected: None,
            playback: Playback::new(config.tick_interval(), config.loop_playback),
            clock: Box::new(SystemClock::new()),
            prober: Prober::new(probe, config.probe_timeout(), config.probe_threads),
            handles: Box::new(UrlAllocator::new()),
            trim_epsilon: config.trim_epsilon(),
            disposed: false,
        }
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn with_handles(mut self, handles: impl HandleAllocator + 'static) -> Self {
        self.handles = Box::new(handles);
        self
    }

    // === Queries ===

    pub fn clips(&self) -> &[Clip] {
        &self.clips
    }

    pub fn clip(&self, id: ClipId) -> Option<&Clip> {
        self.clips.iter().find(|c| c.id == id)
    }

    fn clip_mut(&mut self, id: ClipId) -> Option<&mut Clip> {
        self.clips.iter_mut().find(|c| c.id == id)
    }

    pub fn len(&self) -> usize {
        self.clips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }

    /// Clips of one track, in play order
    pub fn track(&self, key: &TrackKey) -> Vec<&Clip> {
        self.clips.iter().filter(|c| key.matches(c)).collect()
    }

    /// Tracks in lookup order (groups ascending, then ungrouped)
    pub fn tracks(&self) -> Vec<TrackKey> {
        layout::track_keys(&self.clips)
    }

    /// True when any clip sits on a group track
    pub fn is_grid(&self) -> bool {
        self.clips.iter().any(|c| c.group().is_some())
    }

    pub fn total_duration(&self) -> f64 {
        layout::total_duration(&self.clips)
    }

    pub fn current_clip(&self, time: f64) -> Option<&Clip> {
        layout::clip_at(&self.clips, time)
    }

    /// One active clip per track, for side-by-side rendering
    pub fn active_clips(&self, time: f64) -> Vec<&Clip> {
        layout::active_clips(&self.clips, time)
    }

    pub fn current_time(&self) -> f64 {
        self.playback.current_time()
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub fn is_playing(&self) -> bool {
        self.playback.is_playing()
    }

    pub fn playback_state(&self) -> PlaybackState {
        self.playback.state()
    }

    pub fn playhead(&self) -> Playhead<'_> {
        let time = self.current_time();
        let clip = self.current_clip(time);
        Playhead {
            time,
            playing: self.is_playing(),
            clip,
            source_time: clip.and_then(|c| c.source_time_at(time)),
        }
    }

    pub fn snapshot(&self) -> TimelineSnapshot<'_> {
        TimelineSnapshot {
            clips: &self.clips,
            selected: self.selected,
            current_time: self.current_time(),
            state: self.playback_state(),
            total_duration: self.total_duration(),
        }
    }

    // === Selection ===

    pub fn selected(&self) -> Option<ClipId> {
        self.selected
    }

    pub fn selected_clip(&self) -> Option<&Clip> {
        self.selected.and_then(|id| self.clip(id))
    }

    /// Select a clip. Unknown ids clear the selection.
    pub fn select(&mut self, id: Option<ClipId>) {
        self.selected = id.filter(|id| self.clip(*id).is_some());
    }

    // === Clip operations ===

    /// Probe `files` and append one clip per file that probed fine.
    ///
    /// New clips continue `group`'s track, or the ungrouped track when
    /// `group` is None. Failed files are skipped, never fatal.
    pub fn add_clips(&mut self, files: &[MediaFile], group: Option<GroupId>) -> AddReport {
        let mut report = AddReport::default();
        if files.is_empty() {
            return report;
        }
        if self.disposed {
            warn!("add_clips on a disposed timeline, ignoring {} files", files.len());
            return report;
        }

        let results = self.prober.probe_all(files);
        for (file, result) in files.iter().zip(results) {
            match result {
                Ok(duration) => {
                    let handle = self.handles.allocate(file);
                    let clip = Clip::new(file.name.clone(), handle, duration, group.clone());
                    debug!("Added clip {} ({}, {:.3}s)", clip.id, file.name, duration);
                    report.added.push(clip.id);
                    self.clips.push(clip);
                }
                Err(reason) => {
                    warn!("Skipping {}: {}", file.name, reason);
                    report.skipped.push(SkippedFile {
                        file: file.name.clone(),
                        reason,
                    });
                }
            }
        }

        if !report.added.is_empty() {
            self.relayout();
        }
        info!(
            "Added {} of {} files{}",
            report.added.len(),
            files.len(),
            group.map(|g| format!(" to group {}", g)).unwrap_or_default()
        );
        report
    }

    /// Remove a clip and release its handle. Returns false if not found.
    pub fn remove_clip(&mut self, id: ClipId) -> bool {
        let Some(pos) = self.clips.iter().position(|c| c.id == id) else {
            debug!("remove_clip: {} not found", id);
            return false;
        };

        let clip = self.clips.remove(pos);
        self.handles.release(clip.into_source());
        if self.selected == Some(id) {
            self.selected = None;
        }
        self.relayout();
        debug!("Removed clip {}", id);
        true
    }

    /// Move the clip at `from` to position `to` in the flat list.
    pub fn reorder_clip(&mut self, from: usize, to: usize) -> Result<()> {
        let len = self.clips.len();
        if from >= len || to >= len {
            return Err(SequenceError::InvalidArgument(format!(
                "reorder {} -> {} out of range (len {})",
                from, to, len
            )));
        }
        if from == to {
            return Ok(());
        }

        let clip = self.clips.remove(from);
        self.clips.insert(to, clip);
        self.relayout();
        debug!("Reordered clip {} -> {}", from, to);
        Ok(())
    }

    /// Merge `patch` into a clip's effects. Returns false if not found.
    pub fn update_effects(&mut self, id: ClipId, patch: EffectsPatch) -> bool {
        let Some(clip) = self.clip_mut(id) else {
            debug!("update_effects: {} not found", id);
            return false;
        };
        if clip.effects_mut().apply(patch) {
            self.relayout();
        }
        true
    }

    /// Set trim bounds (clamped). Returns false if not found.
    pub fn update_trim(&mut self, id: ClipId, trim_start: Option<f64>, trim_end: Option<f64>) -> bool {
        let epsilon = self.trim_epsilon;
        let Some(clip) = self.clip_mut(id) else {
            debug!("update_trim: {} not found", id);
            return false;
        };
        if clip.set_trim(trim_start, trim_end, epsilon) {
            self.relayout();
        }
        true
    }

    // === Region blurs ===

    /// Attach a region to a clip under a fresh id.
    pub fn add_region_blur(&mut self, clip_id: ClipId, mut region: RegionBlur) -> Option<Uuid> {
        let Some(clip) = self.clip_mut(clip_id) else {
            debug!("add_region_blur: {} not found", clip_id);
            return None;
        };
        region.id = Uuid::new_v4();
        let id = region.id;
        clip.effects_mut().push_region(region);
        Some(id)
    }

    pub fn update_region_blur(&mut self, clip_id: ClipId, region_id: Uuid, patch: RegionBlurPatch) -> bool {
        match self
            .clip_mut(clip_id)
            .and_then(|c| c.effects_mut().region_mut(region_id))
        {
            Some(region) => {
                region.apply(patch);
                true
            }
            None => {
                debug!("update_region_blur: {}/{} not found", clip_id, region_id);
                false
            }
        }
    }

    pub fn remove_region_blur(&mut self, clip_id: ClipId, region_id: Uuid) -> bool {
        let removed = self
            .clip_mut(clip_id)
            .and_then(|c| c.effects_mut().remove_region(region_id))
            .is_some();
        if !removed {
            debug!("remove_region_blur: {}/{} not found", clip_id, region_id);
        }
        removed
    }

    // === Playback ===

    pub fn play(&mut self) {
        if self.disposed {
            debug!("play: timeline disposed");
            return;
        }
        let now = self.clock.now();
        self.playback.play(now);
    }

    pub fn pause(&mut self) {
        self.playback.pause();
    }

    /// Poll the playback tick. Returns Some(new_time) when time advanced.
    pub fn update(&mut self) -> Option<f64> {
        if self.disposed {
            return None;
        }
        let total = self.total_duration();
        let now = self.clock.now();
        self.playback.update(now, total)
    }

    /// Jump to `time`, clamped into `[0, total_duration]`.
    pub fn seek(&mut self, time: f64) -> f64 {
        let total = self.total_duration();
        self.playback.seek(time, total)
    }

    pub fn set_loop_enabled(&mut self, enabled: bool) {
        self.playback.set_loop_enabled(enabled);
    }

    // === Lifecycle ===

    /// Stop playback for good and release every handle. Safe to call twice.
    ///
    /// A `PlaybackTicker` driving this timeline exits on its next tick.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        let count = self.clips.len();
        self.playback.reset();
        for clip in self.clips.drain(..) {
            self.handles.release(clip.into_source());
        }
        self.selected = None;
        info!("Timeline disposed ({} clips released)", count);
    }

    fn relayout(&mut self) {
        layout::relayout(&mut self.clips);
        let total = self.total_duration();
        self.playback.clamp_to(total);
    }
}

impl Drop for TimelineManager {
    fn drop(&mut self) {
        self.dispose();
    }
}
