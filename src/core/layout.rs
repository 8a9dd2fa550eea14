//! Track layout: offsets, total duration and clip lookup by time.
//!
//! Clips live in one flat list. Each clip belongs to a track: its group
//! (parallel "grid" track) or the ungrouped track. Within a track, list
//! order is play order, the first clip starts at 0 and every following clip
//! starts where the previous one ends. Tracks never influence each other.
//!
//! ```text
//! list:   A(g1) B C(g1) D
//! g1:     [A 0..3)[C 3..6)
//! none:   [B 0..4)[D 4..9)        total = max(6, 9) = 9
//! ```
//!
//! Lookup order for "the" current clip is fixed: groups by ascending id,
//! numeric ids by value ("1", "2", "10"), then non-numeric ids in string
//! order, then the ungrouped track.

use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

use crate::entities::clip::{Clip, GroupId};

/// Track identity. Derived `Ord` puts every group before `Ungrouped`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum TrackKey {
    Group(GroupId),
    Ungrouped,
}

impl TrackKey {
    pub fn of(clip: &Clip) -> Self {
        match clip.group() {
            Some(g) => TrackKey::Group(g.clone()),
            None => TrackKey::Ungrouped,
        }
    }

    pub fn matches(&self, clip: &Clip) -> bool {
        match self {
            TrackKey::Group(g) => clip.group() == Some(g),
            TrackKey::Ungrouped => clip.group().is_none(),
        }
    }
}

/// Recompute every clip's offsets, each track independently.
pub fn relayout(clips: &mut [Clip]) {
    let mut track_ends: HashMap<TrackKey, f64> = HashMap::new();
    for clip in clips.iter_mut() {
        let key = TrackKey::of(clip);
        let start = track_ends.get(&key).copied().unwrap_or(0.0);
        let end = clip.place(start);
        track_ends.insert(key, end);
    }
}

/// Summed effective duration per track, in lookup order.
pub fn track_durations(clips: &[Clip]) -> BTreeMap<TrackKey, f64> {
    let mut sums = BTreeMap::new();
    for clip in clips {
        *sums.entry(TrackKey::of(clip)).or_insert(0.0) += clip.effective_duration();
    }
    sums
}

/// Tracks present in `clips`, in lookup order.
pub fn track_keys(clips: &[Clip]) -> Vec<TrackKey> {
    track_durations(clips).into_keys().collect()
}

/// Parallel tracks finish when the longest one does.
pub fn total_duration(clips: &[Clip]) -> f64 {
    track_durations(clips).into_values().fold(0.0, f64::max)
}

/// First clip (in track lookup order) whose window contains `time`.
pub fn clip_at(clips: &[Clip], time: f64) -> Option<&Clip> {
    track_keys(clips).into_iter().find_map(|key| {
        clips
            .iter()
            .find(|c| key.matches(c) && c.contains_time(time))
    })
}

/// At most one clip per track, in lookup order.
pub fn active_clips(clips: &[Clip], time: f64) -> Vec<&Clip> {
    track_keys(clips)
        .into_iter()
        .filter_map(|key| {
            clips
                .iter()
                .find(|c| key.matches(c) && c.contains_time(time))
        })
        .collect()
}
