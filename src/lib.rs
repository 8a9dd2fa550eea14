//! VSEQ - video sequence timeline model
//!
//! An owned timeline of video clips with trims, speed, transform/blur
//! effects and region blur masks, laid out on one sequential track or on
//! parallel "grid" tracks, with a looping tick-driven playhead.

// Timeline engine (layout, playback, clock, ticker)
pub mod core;

pub mod cli;
pub mod config;
pub mod entities;
pub mod error;
pub mod media;
pub mod paths;
pub mod shell;

pub use crate::core::clock::{Clock, ManualClock, SystemClock};
pub use crate::core::layout::TrackKey;
pub use crate::core::player::PlaybackState;
pub use crate::core::ticker::PlaybackTicker;
pub use crate::core::timeline::{AddReport, Playhead, SkippedFile, TimelineManager, TimelineSnapshot};

pub use config::TimelineConfig;
pub use entities::{BlurShape, Clip, ClipId, Effects, EffectsPatch, GroupId, RegionBlur, RegionBlurPatch};
pub use error::{ProbeError, SequenceError};
pub use media::{HandleAllocator, MediaFile, MediaProbe, SourceHandle};
