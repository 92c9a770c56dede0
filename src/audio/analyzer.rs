//! FFT magnitude analyzer feeding the spectrogram
//!
//! Turns a stream of mono samples into byte-magnitude frames, one per full
//! FFT window:
//! - Hann window to reduce spectral leakage
//! - temporal smoothing against the previous spectrum for stable columns
//! - dB conversion and linear quantization between a floor and a ceiling

use rustfft::{FftPlanner, num_complex::Complex};

use crate::config::ConfigError;

/// Configuration for the spectrum analyzer
#[derive(Debug, Clone)]
pub struct AnalyzerConfig {
    /// FFT window size; yields `fft_size / 2` frequency bins per frame
    pub fft_size: usize,
    /// Temporal smoothing factor (0.0-1.0, higher = more smoothing)
    pub smoothing: f32,
    /// Magnitudes at or below this level map to byte 0
    pub floor_db: f32,
    /// Magnitudes at or above this level map to byte 255
    pub ceil_db: f32,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            fft_size: 2048,
            smoothing: 0.8,
            floor_db: -100.0,
            ceil_db: -30.0,
        }
    }
}

impl AnalyzerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.fft_size.is_power_of_two() || !(32..=32_768).contains(&self.fft_size) {
            return Err(ConfigError::InvalidFftSize(self.fft_size));
        }
        if !(0.0..1.0).contains(&self.smoothing) {
            return Err(ConfigError::InvalidSmoothing(self.smoothing));
        }
        if self.floor_db >= self.ceil_db {
            return Err(ConfigError::InvalidDbRange {
                floor: self.floor_db,
                ceil: self.ceil_db,
            });
        }
        Ok(())
    }

    pub fn total_bins(&self) -> usize {
        self.fft_size / 2
    }
}

/// FFT-based analyzer producing one magnitude frame per full window.
pub struct SpectrumAnalyzer {
    config: AnalyzerConfig,
    sample_buffer: Vec<f32>,
    fft_planner: FftPlanner<f32>,
    window: Vec<f32>,
    smoothed: Vec<f32>,
}

impl SpectrumAnalyzer {
    pub fn new(config: AnalyzerConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        // Hann window to reduce spectral leakage
        let mut window = vec![0.0; config.fft_size];
        for (i, w) in window.iter_mut().enumerate() {
            *w = 0.5
                * (1.0 - (2.0 * std::f32::consts::PI * i as f32 / config.fft_size as f32).cos());
        }

        Ok(Self {
            sample_buffer: Vec::with_capacity(config.fft_size),
            smoothed: vec![0.0; config.total_bins()],
            window,
            fft_planner: FftPlanner::new(),
            config,
        })
    }

    pub fn total_bins(&self) -> usize {
        self.config.total_bins()
    }

    /// Push a single mono sample and optionally return a magnitude frame.
    ///
    /// Returns `Some(frame)` when the FFT window is full and has been
    /// processed, `None` while more samples are needed.
    pub fn push_sample(&mut self, sample: f32) -> Option<Vec<u8>> {
        self.sample_buffer.push(sample);

        if self.sample_buffer.len() >= self.config.fft_size {
            let frame = self.compute_frame();
            self.sample_buffer.clear();
            Some(frame)
        } else {
            None
        }
    }

    fn compute_frame(&mut self) -> Vec<u8> {
        let fft_size = self.config.fft_size;

        let mut windowed: Vec<Complex<f32>> = self
            .sample_buffer
            .iter()
            .zip(self.window.iter())
            .map(|(&s, &w)| Complex::new(s * w, 0.0))
            .collect();

        let fft = self.fft_planner.plan_fft_forward(fft_size);
        fft.process(&mut windowed);

        let amplitude_scale = 2.0 / fft_size as f32;
        let db_span = self.config.ceil_db - self.config.floor_db;

        let mut frame = Vec::with_capacity(self.config.total_bins());
        for (bin, value) in windowed[..self.config.total_bins()].iter().enumerate() {
            let magnitude = value.norm() * amplitude_scale;

            let smoothed = self.config.smoothing * self.smoothed[bin]
                + (1.0 - self.config.smoothing) * magnitude;
            self.smoothed[bin] = smoothed;

            let db = 20.0 * smoothed.max(1e-12).log10();
            let level = ((db - self.config.floor_db) / db_span).clamp(0.0, 1.0);
            frame.push((level * 255.0).round() as u8);
        }

        frame
    }
}
