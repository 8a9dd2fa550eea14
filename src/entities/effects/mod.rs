//! Per-clip effects bundle.
//!
//! Every clip carries one `Effects` value: whole-frame blur, playback speed,
//! transform (scale + position) and an ordered list of region blurs.
//!
//! # Effect Parameters
//!
//! | Field | Range | Default | Notes |
//! |-------|-------|---------|-------|
//! | **blur_radius** | `0..100` | `0` | whole-frame blur in pixels |
//! | **speed** | `0.1..4` | `1` | divides the trimmed duration on the timeline |
//! | **scale** | `0.01..` | `1` | uniform scale factor |
//! | **position_x/y** | any | `0` | offset in frame percent |
//! | **region_blurs** | list | empty | see [`region_blur`] |
//!
//! Values are clamped both on write (`apply`) and on read, so a bundle
//! restored from disk with out-of-range numbers still behaves.
//!
//! # Partial Updates
//!
//! ```ignore
//! let patch = EffectsPatch::default().speed(2.0).blur_radius(4.0);
//! timeline.update_effects(clip_id, patch);
//! ```

pub mod region_blur;

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

pub use region_blur::{BlurShape, RegionBlur, RegionBlurPatch};

pub const SPEED_MIN: f64 = 0.1;
pub const SPEED_MAX: f64 = 4.0;
pub const BLUR_RADIUS_MAX: f64 = 100.0;
pub const SCALE_MIN: f64 = 0.01;

/// Clamp that maps NaN to `fallback` instead of propagating it.
pub(crate) fn clamp_or(value: f64, min: f64, max: f64, fallback: f64) -> f64 {
    if value.is_nan() {
        fallback
    } else {
        value.clamp(min, max)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Effects {
    blur_radius: f64,
    speed: f64,
    scale: f64,
    position_x: f64,
    position_y: f64,
    #[serde(deserialize_with = "deserialize_regions")]
    region_blurs: Vec<RegionBlur>,
}

/// Region ids are unique within one bundle; repeats get a fresh id.
fn with_unique_ids(regions: Vec<RegionBlur>) -> Vec<RegionBlur> {
    let mut seen = HashSet::with_capacity(regions.len());
    regions
        .into_iter()
        .map(|mut region| {
            while !seen.insert(region.id) {
                region.id = Uuid::new_v4();
            }
            region
        })
        .collect()
}

fn deserialize_regions<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<RegionBlur>, D::Error> {
    Vec::<RegionBlur>::deserialize(deserializer).map(with_unique_ids)
}

impl Default for Effects {
    fn default() -> Self {
        Self {
            blur_radius: 0.0,
            speed: 1.0,
            scale: 1.0,
            position_x: 0.0,
            position_y: 0.0,
            region_blurs: Vec::new(),
        }
    }
}

impl Effects {
    pub fn blur_radius(&self) -> f64 {
        clamp_or(self.blur_radius, 0.0, BLUR_RADIUS_MAX, 0.0)
    }

    /// Playback speed multiplier, always inside `SPEED_MIN..=SPEED_MAX`
    pub fn speed(&self) -> f64 {
        clamp_or(self.speed, SPEED_MIN, SPEED_MAX, 1.0)
    }

    pub fn scale(&self) -> f64 {
        clamp_or(self.scale, SCALE_MIN, f64::MAX, 1.0)
    }

    pub fn position(&self) -> (f64, f64) {
        (self.position_x, self.position_y)
    }

    pub fn region_blurs(&self) -> &[RegionBlur] {
        &self.region_blurs
    }

    pub fn region(&self, id: Uuid) -> Option<&RegionBlur> {
        self.region_blurs.iter().find(|r| r.id == id)
    }

    pub fn region_mut(&mut self, id: Uuid) -> Option<&mut RegionBlur> {
        self.region_blurs.iter_mut().find(|r| r.id == id)
    }

    pub(crate) fn push_region(&mut self, region: RegionBlur) {
        self.region_blurs.push(region);
    }

    pub(crate) fn remove_region(&mut self, id: Uuid) -> Option<RegionBlur> {
        let pos = self.region_blurs.iter().position(|r| r.id == id)?;
        Some(self.region_blurs.remove(pos))
    }

    /// Merge `patch` into the bundle. Fields left as `None` are untouched.
    ///
    /// Returns true when the speed changed (the caller must re-run layout).
    pub fn apply(&mut self, patch: EffectsPatch) -> bool {
        let old_speed = self.speed();

        if let Some(v) = patch.blur_radius {
            self.blur_radius = clamp_or(v, 0.0, BLUR_RADIUS_MAX, self.blur_radius());
        }
        if let Some(v) = patch.speed {
            self.speed = clamp_or(v, SPEED_MIN, SPEED_MAX, old_speed);
        }
        if let Some(v) = patch.scale {
            self.scale = clamp_or(v, SCALE_MIN, f64::MAX, self.scale());
        }
        if let Some(v) = patch.position_x.filter(|v| v.is_finite()) {
            self.position_x = v;
        }
        if let Some(v) = patch.position_y.filter(|v| v.is_finite()) {
            self.position_y = v;
        }
        if let Some(regions) = patch.region_blurs {
            self.region_blurs = with_unique_ids(regions);
        }

        self.speed() != old_speed
    }
}

/// Partial effects update; `None` means "leave as is".
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EffectsPatch {
    pub blur_radius: Option<f64>,
    pub speed: Option<f64>,
    pub scale: Option<f64>,
    pub position_x: Option<f64>,
    pub position_y: Option<f64>,
    pub region_blurs: Option<Vec<RegionBlur>>,
}

impl EffectsPatch {
    pub fn blur_radius(mut self, v: f64) -> Self {
        self.blur_radius = Some(v);
        self
    }

    pub fn speed(mut self, v: f64) -> Self {
        self.speed = Some(v);
        self
    }

    pub fn scale(mut self, v: f64) -> Self {
        self.scale = Some(v);
        self
    }

    pub fn position(mut self, x: f64, y: f64) -> Self {
        self.position_x = Some(x);
        self.position_y = Some(y);
        self
    }

    pub fn region_blurs(mut self, regions: Vec<RegionBlur>) -> Self {
        self.region_blurs = Some(regions);
        self
    }
}
