//! View control state and configuration validation
//!
//! External controls (the socket, CLI flags) never touch the pipeline
//! directly: they mutate a [`ViewControls`] owned by the renderer between
//! ticks, and each tick reads one consistent snapshot of it. Invalid values
//! are rejected here, at the boundary where they enter.

use crate::render::axis::FrequencyScale;
use thiserror::Error;

/// Slowest permitted scroll, in pixels per frame.
pub const MIN_SPEED: u32 = 1;
/// Fastest permitted scroll, in pixels per frame.
pub const MAX_SPEED: u32 = 10;

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("scroll speed must be between 1 and 10, got {0}")]
    SpeedOutOfRange(u32),
    #[error("speed slider position must be between 1 and 10, got {0}")]
    SliderOutOfRange(u32),
    #[error("spectrogram needs at least 2 frequency bins, got {0}")]
    TooFewBins(usize),
    #[error("fft size must be a power of two between 32 and 32768, got {0}")]
    InvalidFftSize(usize),
    #[error("smoothing factor must be at least 0 and below 1, got {0}")]
    InvalidSmoothing(f32),
    #[error("dB floor {floor} must be below dB ceiling {ceil}")]
    InvalidDbRange { floor: f32, ceil: f32 },
}

/// Scale and scroll-speed state read once at the start of every tick.
#[derive(Debug, Clone)]
pub struct ViewControls {
    scale: FrequencyScale,
    speed: u32,
}

impl ViewControls {
    pub fn new(scale: FrequencyScale, speed: u32) -> Result<Self, ConfigError> {
        if !(MIN_SPEED..=MAX_SPEED).contains(&speed) {
            return Err(ConfigError::SpeedOutOfRange(speed));
        }
        Ok(Self { scale, speed })
    }

    pub fn scale(&self) -> FrequencyScale {
        self.scale
    }

    /// Pixel columns shifted and painted per frame.
    pub fn speed(&self) -> u32 {
        self.speed
    }

    pub fn toggle_scale(&mut self) {
        self.scale = self.scale.toggled();
    }

    pub fn set_speed(&mut self, speed: u32) -> Result<(), ConfigError> {
        if !(MIN_SPEED..=MAX_SPEED).contains(&speed) {
            return Err(ConfigError::SpeedOutOfRange(speed));
        }
        self.speed = speed;
        Ok(())
    }

    /// Apply a speed-slider position.
    ///
    /// Slider position 1 is the slowest setting and 10 the fastest, but the
    /// wire value is inverted before becoming pixels per frame: position `p`
    /// scrolls `11 - p` columns each tick.
    pub fn set_speed_from_slider(&mut self, position: u32) -> Result<(), ConfigError> {
        if !(MIN_SPEED..=MAX_SPEED).contains(&position) {
            return Err(ConfigError::SliderOutOfRange(position));
        }
        self.speed = 11 - position;
        Ok(())
    }
}

impl Default for ViewControls {
    fn default() -> Self {
        Self {
            scale: FrequencyScale::Linear,
            speed: 2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_speed_bounds_are_enforced() {
        assert!(ViewControls::new(FrequencyScale::Linear, 0).is_err());
        assert!(ViewControls::new(FrequencyScale::Linear, 11).is_err());
        assert!(ViewControls::new(FrequencyScale::Linear, 1).is_ok());
        assert!(ViewControls::new(FrequencyScale::Linear, 10).is_ok());

        let mut controls = ViewControls::default();
        assert!(controls.set_speed(0).is_err());
        assert_eq!(controls.speed(), 2);
    }

    #[test]
    fn test_slider_positions_invert_into_speed() {
        let mut controls = ViewControls::default();
        controls.set_speed_from_slider(1).unwrap();
        assert_eq!(controls.speed(), 10);
        controls.set_speed_from_slider(10).unwrap();
        assert_eq!(controls.speed(), 1);

        for position in 1..=10 {
            controls.set_speed_from_slider(position).unwrap();
            assert!((MIN_SPEED..=MAX_SPEED).contains(&controls.speed()));
        }
    }

    #[test]
    fn test_out_of_range_slider_is_rejected() {
        let mut controls = ViewControls::default();
        assert!(controls.set_speed_from_slider(0).is_err());
        assert!(controls.set_speed_from_slider(11).is_err());
        assert_eq!(controls.speed(), 2);
    }

    #[test]
    fn test_scale_toggle_flips_both_ways() {
        let mut controls = ViewControls::default();
        assert_eq!(controls.scale(), FrequencyScale::Linear);
        controls.toggle_scale();
        assert_eq!(controls.scale(), FrequencyScale::Logarithmic);
        controls.toggle_scale();
        assert_eq!(controls.scale(), FrequencyScale::Linear);
    }
}
