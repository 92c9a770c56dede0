//! Audio capture for the live spectrogram
//!
//! Provides input-device selection and a cpal capture stream that feeds the
//! spectrum analyzer. Completed magnitude frames are published into a shared
//! snapshot slot; the render loop reads the most recent one each tick
//! without ever blocking on the audio thread.

pub mod analyzer;

use anyhow::{Result, anyhow};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, SampleFormat, Stream, StreamConfig};
use std::sync::{Arc, Mutex};

use self::analyzer::SpectrumAnalyzer;
use crate::render::FrameSource;

/// Audio capture device with configuration
pub struct AudioCapture {
    device: Device,
    config: StreamConfig,
    sample_rate: u32,
}

/// Information about an available audio input device
#[derive(Debug)]
pub struct AudioDeviceInfo {
    pub name: String,
    pub is_default: bool,
    pub supported_sample_rates: Vec<u32>,
    pub supported_formats: Vec<SampleFormat>,
}

impl AudioCapture {
    /// Open the default input device as close to the target sample rate as
    /// it supports.
    pub fn new(target_sample_rate: u32) -> Result<Self> {
        let host = cpal::default_host();
        let device = host
            .default_input_device()
            .ok_or_else(|| anyhow!("No default input device found"))?;

        let config = Self::get_optimal_config(&device, target_sample_rate)?;
        let sample_rate = config.sample_rate.0;

        Ok(Self {
            device,
            config,
            sample_rate,
        })
    }

    /// Find the supported configuration closest to the target sample rate.
    fn get_optimal_config(device: &Device, target_sample_rate: u32) -> Result<StreamConfig> {
        let supported_configs = device.supported_input_configs()?;

        let mut best_config = None;
        let mut best_diff = u32::MAX;

        for config in supported_configs {
            let diff = config.max_sample_rate().0.abs_diff(target_sample_rate);
            if diff < best_diff {
                best_diff = diff;
                best_config = Some(config);
            }
        }

        let config =
            best_config.ok_or_else(|| anyhow!("No suitable audio configuration found"))?;

        // Stay inside the supported range rather than insisting on the
        // exact target.
        let rate = target_sample_rate.clamp(config.min_sample_rate().0, config.max_sample_rate().0);
        Ok(config.with_sample_rate(cpal::SampleRate(rate)).into())
    }

    /// Actual capture sample rate; the Nyquist frequency for axis labels is
    /// half of this.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// List all available audio input devices
    pub fn list_devices() -> Result<Vec<AudioDeviceInfo>> {
        let host = cpal::default_host();
        let devices = host.input_devices()?;
        let default_device = host.default_input_device();

        let mut device_infos = Vec::new();

        for device in devices {
            let name = device.name().unwrap_or("Unknown Device".to_string());
            let is_default = default_device
                .as_ref()
                .map(|d| d.name().unwrap_or_default() == name)
                .unwrap_or(false);

            let mut supported_sample_rates = Vec::new();
            let mut supported_formats = Vec::new();
            for config in device.supported_input_configs()? {
                supported_sample_rates.push(config.max_sample_rate().0);
                supported_formats.push(config.sample_format());
            }

            device_infos.push(AudioDeviceInfo {
                name,
                is_default,
                supported_sample_rates,
                supported_formats,
            });
        }

        Ok(device_infos)
    }

    /// Start capturing and analyzing in the background (non-blocking).
    ///
    /// The returned stream must be kept alive for as long as frames are
    /// wanted; dropping it is the cancellation path. The `MicSource` half
    /// hands the latest completed frame to the render loop.
    pub fn start(&self, mut analyzer: SpectrumAnalyzer) -> Result<(Stream, MicSource)> {
        let total_bins = analyzer.total_bins();
        let slot = Arc::new(Mutex::new(None));
        let slot_writer = slot.clone();
        let channels = (self.config.channels as usize).max(1);

        let stream = self.device.build_input_stream(
            &self.config,
            move |data: &[f32], _: &cpal::InputCallbackInfo| {
                for interleaved in data.chunks_exact(channels) {
                    let sample = interleaved.iter().sum::<f32>() / channels as f32;
                    if let Some(frame) = analyzer.push_sample(sample) {
                        if let Ok(mut latest) = slot_writer.lock() {
                            *latest = Some(frame);
                        }
                    }
                }
            },
            |err| {
                eprintln!("audio: input stream error: {}", err);
            },
            None,
        )?;

        stream.play()?;

        Ok((
            stream,
            MicSource {
                slot,
                total_bins,
                sample_rate: self.sample_rate,
            },
        ))
    }
}

/// Live microphone frame source backed by the capture callback's snapshot
/// slot.
pub struct MicSource {
    slot: Arc<Mutex<Option<Vec<u8>>>>,
    total_bins: usize,
    sample_rate: u32,
}

impl FrameSource for MicSource {
    fn total_bins(&self) -> usize {
        self.total_bins
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn latest_frame(&mut self) -> Option<Vec<u8>> {
        match self.slot.lock() {
            Ok(latest) => latest.clone(),
            Err(_) => None,
        }
    }
}

/// Frame source that never yields, standing in when capture cannot start.
///
/// Keeps the overlay pipeline idle but alive: axes still render over a
/// blank surface.
pub struct SilentSource {
    total_bins: usize,
    sample_rate: u32,
}

impl SilentSource {
    pub fn new(total_bins: usize, sample_rate: u32) -> Self {
        Self {
            total_bins,
            sample_rate,
        }
    }
}

impl FrameSource for SilentSource {
    fn total_bins(&self) -> usize {
        self.total_bins
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn latest_frame(&mut self) -> Option<Vec<u8>> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mic_source_repeats_latest_snapshot() {
        let slot = Arc::new(Mutex::new(None));
        let mut source = MicSource {
            slot: slot.clone(),
            total_bins: 4,
            sample_rate: 44_100,
        };

        assert!(source.latest_frame().is_none());

        *slot.lock().unwrap() = Some(vec![1, 2, 3, 4]);
        // The snapshot stays available every tick until replaced.
        assert_eq!(source.latest_frame(), Some(vec![1, 2, 3, 4]));
        assert_eq!(source.latest_frame(), Some(vec![1, 2, 3, 4]));

        *slot.lock().unwrap() = Some(vec![9, 9, 9, 9]);
        assert_eq!(source.latest_frame(), Some(vec![9, 9, 9, 9]));
    }

    #[test]
    fn test_silent_source_never_yields() {
        let mut source = SilentSource::new(1024, 48_000);
        assert!(source.latest_frame().is_none());
        assert_eq!(source.total_bins(), 1024);
        assert_eq!(source.sample_rate(), 48_000);
    }
}
