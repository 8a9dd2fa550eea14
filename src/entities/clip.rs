//! Clip: one media segment placed on the timeline.
//!
//! # Coordinate Systems
//!
//! - `duration` - intrinsic media length in seconds (probed once, never changes)
//! - `trim_start/trim_end` - bounds into the source, `None` = untrimmed edge
//! - `speed` - from the effects bundle (2.0 = plays twice as fast)
//!
//! Computed values:
//! - `play_start()` = `trim_start` or 0
//! - `play_end()` = `trim_end` or `duration`
//! - `effective_duration()` = `(play_end - play_start) / speed`
//! - `start_offset/end_offset` = placement on the clip's track, written by
//!   the layout pass in `core::layout`
//!
//! # Dependencies
//!
//! - `Effects` from `super::effects` - speed and visual parameters
//! - `SourceHandle` from `crate::media` - owned resource handle
//! - Used by: `TimelineManager`, `layout`, renderers via `Playhead`

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use uuid::Uuid;

use super::effects::{clamp_or, Effects};
use crate::media::SourceHandle;

/// Unique clip identifier (generated on add)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClipId(Uuid);

impl ClipId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for ClipId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ClipId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Name of a parallel ("grid") track.
///
/// Ordering is numeric-aware: ids that parse as integers come first in
/// numeric order ("2" before "10"), then all other ids in string order.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupId(String);

impl Ord for GroupId {
    fn cmp(&self, other: &Self) -> Ordering {
        let (a_num, a_str) = self.sort_key();
        let (b_num, b_str) = other.sort_key();
        match (a_num, b_num) {
            (Some(a), Some(b)) => a.cmp(&b).then_with(|| a_str.cmp(b_str)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => a_str.cmp(b_str),
        }
    }
}

impl PartialOrd for GroupId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl GroupId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn sort_key(&self) -> (Option<u64>, &str) {
        (self.0.parse().ok(), &self.0)
    }
}

impl From<&str> for GroupId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for GroupId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Serialize)]
pub struct Clip {
    pub id: ClipId,
    pub name: String,
    /// Owned handle, released by the timeline when the clip goes away.
    source: SourceHandle,
    duration: f64,
    trim_start: Option<f64>,
    trim_end: Option<f64>,
    start_offset: f64,
    end_offset: f64,
    group: Option<GroupId>,
    effects: Effects,
}

impl Clip {
    pub(crate) fn new(
        name: impl Into<String>,
        source: SourceHandle,
        duration: f64,
        group: Option<GroupId>,
    ) -> Self {
        Self {
            id: ClipId::new(),
            name: name.into(),
            source,
            duration,
            trim_start: None,
            trim_end: None,
            start_offset: 0.0,
            end_offset: duration,
            group,
            effects: Effects::default(),
        }
    }

    pub fn source(&self) -> &SourceHandle {
        &self.source
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn trim_start(&self) -> Option<f64> {
        self.trim_start
    }

    pub fn trim_end(&self) -> Option<f64> {
        self.trim_end
    }

    pub fn group(&self) -> Option<&GroupId> {
        self.group.as_ref()
    }

    pub fn effects(&self) -> &Effects {
        &self.effects
    }

    pub(crate) fn effects_mut(&mut self) -> &mut Effects {
        &mut self.effects
    }

    pub fn start_offset(&self) -> f64 {
        self.start_offset
    }

    pub fn end_offset(&self) -> f64 {
        self.end_offset
    }

    /// Source position where playback of this clip begins
    pub fn play_start(&self) -> f64 {
        self.trim_start.unwrap_or(0.0)
    }

    /// Source position where playback of this clip ends
    pub fn play_end(&self) -> f64 {
        self.trim_end.unwrap_or(self.duration)
    }

    /// Time the clip occupies on its track
    pub fn effective_duration(&self) -> f64 {
        (self.play_end() - self.play_start()).max(0.0) / self.effects.speed()
    }

    /// Half-open window test: `[start_offset, end_offset)`
    pub fn contains_time(&self, time: f64) -> bool {
        time >= self.start_offset && time < self.end_offset
    }

    /// Map a timeline time to the source position to display.
    pub fn source_time_at(&self, time: f64) -> Option<f64> {
        if !self.contains_time(time) {
            return None;
        }
        let local = (time - self.start_offset) * self.effects.speed();
        Some((self.play_start() + local).min(self.play_end()))
    }

    /// Set trim bounds. Returns true if anything changed.
    ///
    /// Each given bound is clamped into `[0, duration]`. If the resolved
    /// start is not before the resolved end, start is pulled back to
    /// `end - epsilon` (floored at 0).
    pub(crate) fn set_trim(
        &mut self,
        trim_start: Option<f64>,
        trim_end: Option<f64>,
        epsilon: f64,
    ) -> bool {
        let duration = self.duration;
        let mut start = self.trim_start;
        let mut end = self.trim_end;

        if let Some(s) = trim_start {
            start = Some(clamp_or(s, 0.0, duration, 0.0));
        }
        if let Some(e) = trim_end {
            end = Some(clamp_or(e, 0.0, duration, duration));
        }

        let resolved_start = start.unwrap_or(0.0);
        let resolved_end = end.unwrap_or(duration);
        if resolved_start >= resolved_end {
            if resolved_end > 0.0 {
                start = Some((resolved_end - epsilon).max(0.0));
            } else {
                // Zero-length at the very beginning: open the end instead
                start = Some(0.0);
                end = Some(epsilon.min(duration));
            }
        }

        let changed = start != self.trim_start || end != self.trim_end;
        self.trim_start = start;
        self.trim_end = end;
        changed
    }

    /// Place clip at `start` on its track. Returns the end offset.
    pub(crate) fn place(&mut self, start: f64) -> f64 {
        self.start_offset = start;
        self.end_offset = start + self.effective_duration();
        self.end_offset
    }

    pub(crate) fn into_source(self) -> SourceHandle {
        self.source
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::effects::EffectsPatch;
    use proptest::prelude::*;

    const EPS: f64 = 0.1;

    fn make_clip(duration: f64) -> Clip {
        Clip::new("test.mp4", SourceHandle::new("media://test"), duration, None)
    }

    #[test]
    fn test_effective_duration_trim_and_speed() {
        let mut clip = make_clip(10.0);
        assert_eq!(clip.effective_duration(), 10.0);

        clip.set_trim(Some(2.0), Some(8.0), EPS);
        clip.effects_mut().apply(EffectsPatch::default().speed(2.0));
        assert!((clip.effective_duration() - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_trim_inverted_pulls_start_back() {
        let mut clip = make_clip(10.0);
        clip.set_trim(Some(9.0), Some(5.0), EPS);
        assert_eq!(clip.trim_end(), Some(5.0));
        assert!((clip.trim_start().unwrap() - 4.9).abs() < 1e-9);
    }

    #[test]
    fn test_trim_clamped_to_duration() {
        let mut clip = make_clip(10.0);
        clip.set_trim(Some(-3.0), Some(42.0), EPS);
        assert_eq!(clip.trim_start(), Some(0.0));
        assert_eq!(clip.trim_end(), Some(10.0));
    }

    #[test]
    fn test_trim_end_only_keeps_start() {
        let mut clip = make_clip(10.0);
        clip.set_trim(Some(3.0), None, EPS);
        clip.set_trim(None, Some(7.0), EPS);
        assert_eq!(clip.trim_start(), Some(3.0));
        assert_eq!(clip.trim_end(), Some(7.0));

        // End moved before the existing start
        clip.set_trim(None, Some(1.0), EPS);
        assert_eq!(clip.trim_end(), Some(1.0));
        assert!((clip.trim_start().unwrap() - 0.9).abs() < 1e-9);
    }

    #[test]
    fn test_trim_end_at_zero() {
        let mut clip = make_clip(10.0);
        clip.set_trim(None, Some(0.0), EPS);
        assert_eq!(clip.trim_start(), Some(0.0));
        assert_eq!(clip.trim_end(), Some(EPS));
        assert!(clip.effective_duration() > 0.0);
    }

    #[test]
    fn test_source_time_mapping() {
        let mut clip = make_clip(10.0);
        clip.set_trim(Some(2.0), Some(8.0), EPS);
        clip.effects_mut().apply(EffectsPatch::default().speed(2.0));
        clip.place(4.0);

        assert_eq!(clip.end_offset(), 7.0);
        assert_eq!(clip.source_time_at(4.0), Some(2.0));
        assert_eq!(clip.source_time_at(5.5), Some(5.0));
        assert_eq!(clip.source_time_at(7.0), None);
        assert_eq!(clip.source_time_at(3.9), None);
    }

    #[test]
    fn test_group_order_numeric_aware() {
        let mut ids: Vec<GroupId> = ["b", "10", "2", "a", "1"].into_iter().map(GroupId::from).collect();
        ids.sort();
        let names: Vec<&str> = ids.iter().map(GroupId::as_str).collect();
        assert_eq!(names, vec!["1", "2", "10", "a", "b"]);
    }

    proptest! {
        #[test]
        fn prop_trim_always_valid_and_idempotent(
            duration in 0.5f64..600.0,
            start in -1000.0f64..1000.0,
            end in -1000.0f64..1000.0,
        ) {
            let mut clip = make_clip(duration);
            clip.set_trim(Some(start), Some(end), EPS);

            let s = clip.trim_start().unwrap();
            let e = clip.trim_end().unwrap();
            prop_assert!(s >= 0.0 && e <= duration);
            prop_assert!(s < e);

            // Re-applying the clamped values changes nothing
            prop_assert!(!clip.set_trim(Some(s), Some(e), EPS));
            prop_assert_eq!(clip.trim_start(), Some(s));
            prop_assert_eq!(clip.trim_end(), Some(e));
        }
    }
}
