//! Entities - clips and their effects.

pub mod clip;
pub mod effects;

pub use clip::{Clip, ClipId, GroupId};
pub use effects::{BlurShape, Effects, EffectsPatch, RegionBlur, RegionBlurPatch};
