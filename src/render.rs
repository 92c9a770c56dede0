//! Scrolling spectrogram rendering pipeline
//!
//! The pure pieces (color map, axis mapping) live in leaf modules; the
//! compositor owns the scrolling pixel buffer and the renderer orchestrates
//! one pass per display tick. Nothing in here schedules itself: the host
//! loop (Wayland overlay, offline WAV renderer, or a test) drives
//! [`renderer::Renderer::tick`] at whatever cadence it has.

pub mod axis;
pub mod color;
pub mod compositor;
pub mod overlay;
pub mod renderer;

use crate::config::ConfigError;
use thiserror::Error;

/// Display refresh rate the time axis is calibrated against.
///
/// The overlay loop sleeps ~16ms per pass, so elapsed-time labels assume one
/// composite per 1/60th of a second.
pub const NOMINAL_FRAME_RATE: f32 = 60.0;

/// Rendering error types
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("surface {width}x{height} is too small for the axis margins")]
    SurfaceTooSmall { width: u32, height: u32 },
    #[error("pixel buffer allocation failed for {width}x{height}")]
    BufferAlloc { width: u32, height: u32 },
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Provider of per-tick frequency magnitude snapshots.
///
/// Implementations never block: `latest_frame` returns whatever snapshot is
/// current, or `None` while capture has not produced one yet. The bin count
/// and sample rate are fixed for the life of a source.
pub trait FrameSource {
    /// Number of frequency bins in every frame this source yields.
    fn total_bins(&self) -> usize;

    /// Capture sample rate in Hz. The highest bin maps to half of this.
    fn sample_rate(&self) -> u32;

    /// Most recent magnitude snapshot, one byte per bin, low frequencies
    /// first. `None` means no analysis window has completed yet.
    fn latest_frame(&mut self) -> Option<Vec<u8>>;
}
