//! Live spectrogram overlay
//!
//! Wires capture, rendering, and the control socket into a Wayland
//! layer-shell surface and runs the cooperative draw loop: one pass every
//! ~16ms polls controls, ticks the renderer, and presents the canvas.

pub mod wayland;

use anyhow::Result;
use std::time::Duration;
use wayland_client::{Connection, globals::registry_queue_init};

use self::wayland::OverlayApp;
use crate::audio::analyzer::{AnalyzerConfig, SpectrumAnalyzer};
use crate::audio::{AudioCapture, MicSource, SilentSource};
use crate::config::ViewControls;
use crate::control::{ControlListener, resolve_socket_path};
use crate::render::FrameSource;
use crate::render::axis::FrequencyScale;
use crate::render::renderer::Renderer;

pub struct OverlayOptions {
    pub width: u32,
    pub height: u32,
    pub scale: FrequencyScale,
    pub speed: u32,
    pub sample_rate: u32,
    pub analyzer: AnalyzerConfig,
    pub socket_path: String,
}

/// Everything the overlay app drives besides the Wayland surface itself.
pub struct OverlayPipeline {
    pub renderer: Renderer,
    pub source: Box<dyn FrameSource>,
    pub control: ControlListener,
    /// Keeps the capture callback alive; None when capture was unavailable.
    pub capture_stream: Option<cpal::Stream>,
}

/// Run the overlay until cancelled.
pub fn run_overlay(options: OverlayOptions) -> Result<()> {
    let controls = ViewControls::new(options.scale, options.speed)?;
    let analyzer = SpectrumAnalyzer::new(options.analyzer.clone())?;
    let total_bins = analyzer.total_bins();

    // Capture failure is not fatal: the overlay idles over a blank surface
    // until the session is torn down.
    let (capture_stream, source): (Option<cpal::Stream>, Box<dyn FrameSource>) =
        match start_capture(options.sample_rate, analyzer) {
            Ok((stream, source)) => (Some(stream), Box::new(source)),
            Err(e) => {
                eprintln!("overlay: audio capture unavailable, staying idle: {:#}", e);
                (
                    None,
                    Box::new(SilentSource::new(total_bins, options.sample_rate)),
                )
            }
        };

    let renderer = Renderer::new(
        options.width,
        options.height,
        total_bins,
        source.sample_rate(),
        controls,
    )?;

    let socket_path = resolve_socket_path(&options.socket_path);
    let control = ControlListener::bind(&socket_path)?;
    eprintln!("overlay: control socket at {}", socket_path.display());

    // Connect to Wayland
    let conn = Connection::connect_to_env()?;
    let (globals, mut event_queue) = registry_queue_init(&conn)?;
    let qh = event_queue.handle();

    let pipeline = OverlayPipeline {
        renderer,
        source,
        control,
        capture_stream,
    };
    let mut app = OverlayApp::new(globals, &qh, pipeline, options.width, options.height)?;

    app.create_layer_surface(&qh)?;

    // Wait for the first configure event before drawing anything.
    event_queue.blocking_dispatch(&mut app)?;
    event_queue.flush()?;

    loop {
        app.handle_controls();

        if app.should_draw() {
            if let Err(e) = app.draw() {
                eprintln!("overlay: draw failed: {:#}", e);
            }
        }

        event_queue.dispatch_pending(&mut app)?;
        event_queue.flush()?;

        if app.exit {
            break;
        }

        std::thread::sleep(Duration::from_millis(16));
    }

    Ok(())
}

fn start_capture(
    target_sample_rate: u32,
    analyzer: SpectrumAnalyzer,
) -> Result<(cpal::Stream, MicSource)> {
    let capture = AudioCapture::new(target_sample_rate)?;
    capture.start(analyzer)
}
