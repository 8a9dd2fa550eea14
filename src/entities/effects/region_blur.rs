//! Region blur masks.
//!
//! A region is a rectangle or a circle in frame percentages (0-100 on both
//! axes) with its own blur intensity. Regions are kept inside the frame:
//! resizing or moving past an edge clamps the box back in.
//!
//! # Geometry
//!
//! ```text
//! (x, y) ───────────┐
//!   │   Rectangle   │ height
//!   └───────────────┘
//!         width
//!
//! Circle: same box, centre = box centre, radius = min(width, height) / 2
//! ```

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::clamp_or;

pub const FRAME_EXTENT: f64 = 100.0;
pub const MIN_REGION_SIZE: f64 = 1.0;
pub const INTENSITY_MAX: f64 = 50.0;
pub const DEFAULT_INTENSITY: f64 = 10.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlurShape {
    Rectangle,
    Circle,
}

/// Deserialization goes through `RegionBlurRepr` so stored values are clamped too.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "RegionBlurRepr")]
pub struct RegionBlur {
    pub id: Uuid,
    shape: BlurShape,
    x: f64,
    y: f64,
    width: f64,
    height: f64,
    intensity: f64,
}

/// Wire form of a region, accepted as-is and clamped on conversion.
#[derive(Deserialize)]
struct RegionBlurRepr {
    id: Uuid,
    shape: BlurShape,
    x: f64,
    y: f64,
    width: f64,
    height: f64,
    #[serde(default = "default_intensity")]
    intensity: f64,
}

fn default_intensity() -> f64 {
    DEFAULT_INTENSITY
}

impl From<RegionBlurRepr> for RegionBlur {
    fn from(r: RegionBlurRepr) -> Self {
        let mut region = Self::new(r.shape, r.x, r.y, r.width, r.height, r.intensity);
        region.id = r.id;
        region
    }
}

impl RegionBlur {
    pub fn new(shape: BlurShape, x: f64, y: f64, width: f64, height: f64, intensity: f64) -> Self {
        let mut region = Self {
            id: Uuid::new_v4(),
            shape,
            x,
            y,
            width,
            height,
            intensity,
        };
        region.clamp();
        region
    }

    pub fn rectangle(x: f64, y: f64, width: f64, height: f64, intensity: f64) -> Self {
        Self::new(BlurShape::Rectangle, x, y, width, height, intensity)
    }

    /// Circle given by centre and radius (percent); stored as its bounding box.
    pub fn circle(cx: f64, cy: f64, radius: f64, intensity: f64) -> Self {
        let d = radius * 2.0;
        Self::new(BlurShape::Circle, cx - radius, cy - radius, d, d, intensity)
    }

    pub fn shape(&self) -> BlurShape {
        self.shape
    }

    /// Bounding box as `(x, y, width, height)`
    pub fn bounds(&self) -> (f64, f64, f64, f64) {
        (self.x, self.y, self.width, self.height)
    }

    pub fn intensity(&self) -> f64 {
        self.intensity
    }

    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Radius for circles, None for rectangles
    pub fn radius(&self) -> Option<f64> {
        match self.shape {
            BlurShape::Circle => Some(self.width.min(self.height) / 2.0),
            BlurShape::Rectangle => None,
        }
    }

    /// Hit test in frame percent coordinates.
    pub fn contains(&self, px: f64, py: f64) -> bool {
        match self.shape {
            BlurShape::Rectangle => {
                px >= self.x && px <= self.x + self.width && py >= self.y && py <= self.y + self.height
            }
            BlurShape::Circle => {
                let (cx, cy) = self.center();
                let r = self.width.min(self.height) / 2.0;
                let (dx, dy) = (px - cx, py - cy);
                dx * dx + dy * dy <= r * r
            }
        }
    }

    pub fn apply(&mut self, patch: RegionBlurPatch) {
        if let Some(shape) = patch.shape {
            self.shape = shape;
        }
        if let Some(v) = patch.x {
            self.x = v;
        }
        if let Some(v) = patch.y {
            self.y = v;
        }
        if let Some(v) = patch.width {
            self.width = v;
        }
        if let Some(v) = patch.height {
            self.height = v;
        }
        if let Some(v) = patch.intensity {
            self.intensity = v;
        }
        self.clamp();
    }

    /// Size first, then position, so the box always fits the frame.
    fn clamp(&mut self) {
        self.width = clamp_or(self.width, MIN_REGION_SIZE, FRAME_EXTENT, MIN_REGION_SIZE);
        self.height = clamp_or(self.height, MIN_REGION_SIZE, FRAME_EXTENT, MIN_REGION_SIZE);
        self.x = clamp_or(self.x, 0.0, FRAME_EXTENT - self.width, 0.0);
        self.y = clamp_or(self.y, 0.0, FRAME_EXTENT - self.height, 0.0);
        self.intensity = clamp_or(self.intensity, 0.0, INTENSITY_MAX, DEFAULT_INTENSITY);
    }
}

/// Partial region update (drag handles move `x`/`y`, resize `width`/`height`).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RegionBlurPatch {
    pub shape: Option<BlurShape>,
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub intensity: Option<f64>,
}

impl RegionBlurPatch {
    pub fn moved_to(x: f64, y: f64) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            ..Default::default()
        }
    }

    pub fn resized_to(width: f64, height: f64) -> Self {
        Self {
            width: Some(width),
            height: Some(height),
            ..Default::default()
        }
    }

    pub fn intensity(mut self, v: f64) -> Self {
        self.intensity = Some(v);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_region_clamped_into_frame() {
        let r = RegionBlur::rectangle(90.0, -10.0, 30.0, 20.0, 80.0);
        assert_eq!(r.bounds(), (70.0, 0.0, 30.0, 20.0));
        assert_eq!(r.intensity(), INTENSITY_MAX);
    }

    #[test]
    fn test_move_past_edge_stays_inside() {
        let mut r = RegionBlur::rectangle(10.0, 10.0, 20.0, 20.0, 5.0);
        r.apply(RegionBlurPatch::moved_to(95.0, 99.0));
        assert_eq!(r.bounds(), (80.0, 80.0, 20.0, 20.0));
    }

    #[test]
    fn test_resize_keeps_position_in_bounds() {
        let mut r = RegionBlur::rectangle(60.0, 50.0, 10.0, 10.0, 5.0);
        r.apply(RegionBlurPatch::resized_to(70.0, 200.0));
        let (x, y, w, h) = r.bounds();
        assert_eq!((w, h), (70.0, 100.0));
        assert_eq!((x, y), (30.0, 0.0));
    }

    #[test]
    fn test_circle_geometry() {
        let c = RegionBlur::circle(50.0, 50.0, 10.0, 20.0);
        assert_eq!(c.shape(), BlurShape::Circle);
        assert_eq!(c.center(), (50.0, 50.0));
        assert_eq!(c.radius(), Some(10.0));
        assert!(c.contains(55.0, 55.0));
        // Inside the bounding box but outside the circle
        assert!(!c.contains(41.0, 41.0));

        let r = RegionBlur::rectangle(40.0, 40.0, 20.0, 20.0, 20.0);
        assert_eq!(r.radius(), None);
        assert!(r.contains(41.0, 41.0));
    }

    #[test]
    fn test_deserialize_clamps_geometry() {
        let json = r#"{
            "id": "6f1c8b1e-2d4a-4c1e-9d8e-1a2b3c4d5e6f",
            "shape": "rectangle",
            "x": 500.0, "y": -40.0, "width": 900.0, "height": 0.0,
            "intensity": 999.0
        }"#;
        let r: RegionBlur = serde_json::from_str(json).unwrap();
        assert_eq!(r.id.to_string(), "6f1c8b1e-2d4a-4c1e-9d8e-1a2b3c4d5e6f");
        assert_eq!(r.bounds(), (0.0, 0.0, FRAME_EXTENT, MIN_REGION_SIZE));
        assert_eq!(r.intensity(), INTENSITY_MAX);
    }

    #[test]
    fn test_serialize_roundtrip_keeps_valid_region() {
        let r = RegionBlur::circle(30.0, 40.0, 5.0, 12.0);
        let back: RegionBlur = serde_json::from_str(&serde_json::to_string(&r).unwrap()).unwrap();
        assert_eq!(back, r);
    }

    #[test]
    fn test_nan_input_falls_back() {
        let r = RegionBlur::rectangle(f64::NAN, 5.0, f64::NAN, 10.0, f64::NAN);
        let (x, _, w, _) = r.bounds();
        assert_eq!(x, 0.0);
        assert_eq!(w, MIN_REGION_SIZE);
        assert_eq!(r.intensity(), DEFAULT_INTENSITY);
    }
}
