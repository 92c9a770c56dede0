//! Offline spectrogram rendering from WAV files
//!
//! Runs the exact live pipeline against a file: decode to mono, analyze,
//! then drive the renderer with one tick per completed analysis window and
//! save the final canvas as PNG.

use anyhow::{Context, Result, bail};
use std::collections::VecDeque;
use std::path::Path;

use crate::audio::analyzer::{AnalyzerConfig, SpectrumAnalyzer};
use crate::config::ViewControls;
use crate::render::FrameSource;
use crate::render::axis::FrequencyScale;
use crate::render::renderer::Renderer;

pub struct RenderOptions {
    pub width: u32,
    pub height: u32,
    pub scale: FrequencyScale,
    pub speed: u32,
    pub analyzer: AnalyzerConfig,
}

/// Replays a pre-computed frame sequence, one frame per tick.
struct ReplaySource {
    frames: VecDeque<Vec<u8>>,
    total_bins: usize,
    sample_rate: u32,
}

impl FrameSource for ReplaySource {
    fn total_bins(&self) -> usize {
        self.total_bins
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn latest_frame(&mut self) -> Option<Vec<u8>> {
        self.frames.pop_front()
    }
}

/// Render a WAV file into a PNG spectrogram.
pub fn render_wav(input: &Path, output: &Path, options: &RenderOptions) -> Result<()> {
    let mut reader = hound::WavReader::open(input)
        .with_context(|| format!("cannot open {}", input.display()))?;
    let sample_rate = reader.spec().sample_rate;
    let samples = decode_mono(&mut reader)?;

    let mut analyzer = SpectrumAnalyzer::new(options.analyzer.clone())?;
    let total_bins = analyzer.total_bins();

    let mut frames = VecDeque::new();
    for sample in samples {
        if let Some(frame) = analyzer.push_sample(sample) {
            frames.push_back(frame);
        }
    }
    if frames.is_empty() {
        bail!(
            "{} is shorter than one analysis window ({} samples)",
            input.display(),
            options.analyzer.fft_size
        );
    }

    let frame_count = frames.len();
    let controls = ViewControls::new(options.scale, options.speed)?;
    let mut renderer = Renderer::new(
        options.width,
        options.height,
        total_bins,
        sample_rate,
        controls,
    )?;

    let mut source = ReplaySource {
        frames,
        total_bins,
        sample_rate,
    };
    for _ in 0..frame_count {
        renderer.tick(&mut source);
    }

    renderer
        .canvas()
        .save_png(output)
        .with_context(|| format!("cannot write {}", output.display()))?;

    eprintln!(
        "rendered {} analysis windows from {} into {}",
        frame_count,
        input.display(),
        output.display()
    );
    Ok(())
}

/// Decode any supported WAV layout into normalized mono samples.
fn decode_mono<R: std::io::Read>(reader: &mut hound::WavReader<R>) -> Result<Vec<f32>> {
    let spec = reader.spec();
    let channels = spec.channels as usize;
    if channels == 0 {
        bail!("wav file reports zero channels");
    }

    let interleaved: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader.samples::<f32>().collect::<Result<_, _>>()?,
        hound::SampleFormat::Int => {
            let full_scale = (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|s| s as f32 / full_scale))
                .collect::<Result<_, _>>()?
        }
    };

    Ok(interleaved
        .chunks(channels)
        .map(|frame| frame.iter().sum::<f32>() / channels as f32)
        .collect())
}
