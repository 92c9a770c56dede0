mod audio;
mod config;
mod control;
mod display;
mod offline;
mod render;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::audio::AudioCapture;
use crate::audio::analyzer::AnalyzerConfig;
use crate::control::{ControlMessage, DEFAULT_SOCKET_PATH};
use crate::display::OverlayOptions;
use crate::offline::RenderOptions;
use crate::render::axis::FrequencyScale;

#[derive(Parser)]
#[command(name = "sonograph")]
#[command(about = "Scrolling live-audio spectrogram overlay for Linux")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the live spectrogram overlay
    Overlay {
        /// Surface width in pixels
        #[arg(long, default_value = "800")]
        width: u32,

        /// Surface height in pixels
        #[arg(long, default_value = "240")]
        height: u32,

        /// Frequency axis scale
        #[arg(long, value_enum, default_value = "linear")]
        scale: ScaleArg,

        /// Scroll speed in pixel columns per frame (1-10)
        #[arg(long, default_value = "2")]
        speed: u32,

        /// FFT window size (power of two)
        #[arg(long, default_value = "2048")]
        fft_size: usize,

        /// Capture sample rate in Hz
        #[arg(long, default_value = "44100")]
        sample_rate: u32,

        /// Control socket path
        #[arg(long, default_value = DEFAULT_SOCKET_PATH)]
        socket_path: String,
    },

    /// Render a WAV file into a PNG spectrogram
    Render {
        /// Input WAV file
        input: PathBuf,

        /// Output PNG file
        output: PathBuf,

        /// Image width in pixels
        #[arg(long, default_value = "1024")]
        width: u32,

        /// Image height in pixels
        #[arg(long, default_value = "512")]
        height: u32,

        /// Frequency axis scale
        #[arg(long, value_enum, default_value = "linear")]
        scale: ScaleArg,

        /// Scroll speed in pixel columns per analysis window (1-10)
        #[arg(long, default_value = "2")]
        speed: u32,

        /// FFT window size (power of two)
        #[arg(long, default_value = "2048")]
        fft_size: usize,
    },

    /// Send a control message to a running overlay
    Ctl {
        #[command(subcommand)]
        action: CtlAction,

        /// Control socket path
        #[arg(long, default_value = DEFAULT_SOCKET_PATH)]
        socket_path: String,
    },

    /// List available audio input devices
    Devices,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum ScaleArg {
    Linear,
    Log,
}

impl From<ScaleArg> for FrequencyScale {
    fn from(arg: ScaleArg) -> Self {
        match arg {
            ScaleArg::Linear => FrequencyScale::Linear,
            ScaleArg::Log => FrequencyScale::Logarithmic,
        }
    }
}

#[derive(Subcommand)]
enum CtlAction {
    /// Toggle between linear and logarithmic frequency scales
    Scale,
    /// Set the speed slider position (1 = slow, 10 = fast)
    Speed { value: u32 },
    /// Stop the overlay
    Quit,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Overlay {
            width,
            height,
            scale,
            speed,
            fft_size,
            sample_rate,
            socket_path,
        } => display::run_overlay(OverlayOptions {
            width,
            height,
            scale: scale.into(),
            speed,
            sample_rate,
            analyzer: AnalyzerConfig {
                fft_size,
                ..AnalyzerConfig::default()
            },
            socket_path,
        }),

        Commands::Render {
            input,
            output,
            width,
            height,
            scale,
            speed,
            fft_size,
        } => offline::render_wav(
            &input,
            &output,
            &RenderOptions {
                width,
                height,
                scale: scale.into(),
                speed,
                analyzer: AnalyzerConfig {
                    fft_size,
                    ..AnalyzerConfig::default()
                },
            },
        ),

        Commands::Ctl {
            action,
            socket_path,
        } => {
            let message = match action {
                CtlAction::Scale => ControlMessage::Scale,
                CtlAction::Speed { value } => ControlMessage::Speed { value },
                CtlAction::Quit => ControlMessage::Quit,
            };
            let path = control::resolve_socket_path(&socket_path);
            control::send_message(&path, &message)?;
            Ok(())
        }

        Commands::Devices => {
            match AudioCapture::list_devices() {
                Ok(devices) => {
                    println!("Available Audio Devices:");
                    println!(
                        "{:<30} {:<10} {:<20} Formats",
                        "Name", "Default", "Sample Rates"
                    );
                    println!("{}", "-".repeat(80));

                    for device in devices {
                        let default_str = if device.is_default { "YES" } else { "NO" };
                        let sample_rates = device
                            .supported_sample_rates
                            .iter()
                            .take(3)
                            .map(|sr| sr.to_string())
                            .collect::<Vec<_>>()
                            .join(", ");

                        let formats = device
                            .supported_formats
                            .iter()
                            .take(2)
                            .map(|f| format!("{:?}", f))
                            .collect::<Vec<_>>()
                            .join(", ");

                        println!(
                            "{:<30} {:<10} {:<20} {}",
                            &device.name[..device.name.len().min(30)],
                            default_str,
                            sample_rates,
                            formats
                        );
                    }
                }
                Err(e) => {
                    eprintln!("Failed to list audio devices: {}", e);
                }
            }
            Ok(())
        }
    }
}
