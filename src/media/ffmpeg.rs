//! FFmpeg-backed duration probe.
//!
//! Reads the container duration when the demuxer reports one, otherwise
//! falls back to the best video stream's duration in its own time base.

use log::debug;
use playa_ffmpeg as ffmpeg;
use std::sync::Once;

use super::{MediaFile, MediaProbe};
use crate::error::ProbeError;

static FFMPEG_LOG_INIT: Once = Once::new();

fn init_ffmpeg_logging() {
    FFMPEG_LOG_INIT.call_once(|| {
        unsafe {
            // AV_LOG_QUIET = -8 (silence all output including stderr)
            ffmpeg::ffi::av_log_set_level(ffmpeg::ffi::AV_LOG_QUIET);
        }
    });
}

#[derive(Debug, Default, Clone, Copy)]
pub struct FfmpegProbe;

impl MediaProbe for FfmpegProbe {
    fn duration(&self, file: &MediaFile) -> Result<f64, ProbeError> {
        init_ffmpeg_logging();

        let ictx = ffmpeg::format::input(&file.path)
            .map_err(|e| ProbeError::Unreadable(format!("Failed to open video: {}", e)))?;

        let container = ictx.duration();
        if container > 0 {
            let secs = container as f64 / ffmpeg::ffi::AV_TIME_BASE as f64;
            debug!("{}: container duration {:.3}s", file.name, secs);
            return Ok(secs);
        }

        let stream = ictx
            .streams()
            .best(ffmpeg::media::Type::Video)
            .ok_or_else(|| ProbeError::Unreadable("No video stream found".to_string()))?;

        let time_base = stream.time_base();
        if time_base.denominator() == 0 {
            return Err(ProbeError::Unreadable("Stream has no time base".to_string()));
        }
        let secs = stream.duration() as f64 * time_base.numerator() as f64
            / time_base.denominator() as f64;
        debug!("{}: stream duration {:.3}s", file.name, secs);
        Ok(secs)
    }
}
