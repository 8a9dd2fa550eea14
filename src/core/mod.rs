//! Timeline engine - layout, playback, clock, ticker.
//!
//! These modules are independent of any UI.

pub mod clock;
pub mod layout;
pub mod player;
pub mod ticker;
pub mod timeline;

pub use clock::{Clock, ManualClock, SystemClock};
pub use player::Playback;
pub use ticker::PlaybackTicker;
pub use timeline::TimelineManager;
