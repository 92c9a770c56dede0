//! Per-tick orchestration of the spectrogram pipeline
//!
//! One [`Renderer::tick`] = one snapshot of the view controls, at most one
//! composite, and a full overlay redraw. The renderer never schedules
//! itself; whoever owns the frame clock calls `tick` and presents the
//! returned canvas.

use tiny_skia::{Pixmap, PixmapPaint, Transform};

use crate::config::{ConfigError, ViewControls};
use crate::render::axis::FrequencyScale;
use crate::render::compositor::ScrollCompositor;
use crate::render::overlay::{self, FREQ_AXIS_WIDTH, TIME_AXIS_HEIGHT};
use crate::render::{FrameSource, RenderError};

/// Pipeline phase.
///
/// `Idle` until the source yields its first frame: the scroll area stays
/// blank while the axis overlays render normally. Once `Streaming`, the
/// only way out is tearing the whole pipeline down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamPhase {
    Idle,
    Streaming,
}

pub struct Renderer {
    controls: ViewControls,
    compositor: ScrollCompositor,
    canvas: Pixmap,
    nyquist: f32,
    phase: StreamPhase,
}

impl Renderer {
    pub fn new(
        width: u32,
        height: u32,
        total_bins: usize,
        sample_rate: u32,
        controls: ViewControls,
    ) -> Result<Self, RenderError> {
        // The logarithmic scale is one toggle away at any time, so the bin
        // floor holds regardless of the starting scale.
        if total_bins < 2 {
            return Err(ConfigError::TooFewBins(total_bins).into());
        }

        let (area_width, area_height) = scroll_area(width, height)?;
        let compositor = ScrollCompositor::new(area_width, area_height, total_bins)?;
        let canvas = Pixmap::new(width, height).ok_or(RenderError::BufferAlloc { width, height })?;

        let mut renderer = Self {
            controls,
            compositor,
            canvas,
            nyquist: sample_rate as f32 / 2.0,
            phase: StreamPhase::Idle,
        };
        let scale = renderer.controls.scale();
        let speed = renderer.controls.speed();
        renderer.present(scale, speed);
        Ok(renderer)
    }

    pub fn controls(&self) -> &ViewControls {
        &self.controls
    }

    /// External controls mutate through here, between ticks.
    pub fn controls_mut(&mut self) -> &mut ViewControls {
        &mut self.controls
    }

    pub fn phase(&self) -> StreamPhase {
        self.phase
    }

    pub fn canvas(&self) -> &Pixmap {
        &self.canvas
    }

    /// Run one pass: poll the source, composite if a frame is available,
    /// redraw the overlays, and hand back the finished canvas.
    ///
    /// A source with no snapshot yet simply skips compositing for this
    /// tick; the scroll area holds still and no error is raised.
    pub fn tick(&mut self, source: &mut dyn FrameSource) -> &Pixmap {
        let scale = self.controls.scale();
        let speed = self.controls.speed();

        if let Some(frame) = source.latest_frame() {
            if self.phase == StreamPhase::Idle {
                self.phase = StreamPhase::Streaming;
            }
            self.compositor.composite(&frame, scale, speed);
        }

        self.present(scale, speed);
        &self.canvas
    }

    /// Rebuild both buffers at new viewport dimensions.
    ///
    /// The resize is authoritative: scrolled history is discarded and any
    /// not-yet-presented composite output goes with it. Overlays are redrawn
    /// against the new geometry immediately.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), RenderError> {
        let (area_width, area_height) = scroll_area(width, height)?;
        self.compositor.reset(area_width, area_height)?;
        self.canvas = Pixmap::new(width, height).ok_or(RenderError::BufferAlloc { width, height })?;

        let scale = self.controls.scale();
        let speed = self.controls.speed();
        self.present(scale, speed);
        Ok(())
    }

    fn present(&mut self, scale: FrequencyScale, speed: u32) {
        self.canvas.draw_pixmap(
            FREQ_AXIS_WIDTH as i32,
            0,
            self.compositor.pixmap().as_ref(),
            &PixmapPaint::default(),
            Transform::identity(),
            None,
        );
        overlay::draw_frequency_axis(&mut self.canvas, scale, self.nyquist);
        overlay::draw_time_axis(&mut self.canvas, speed);
    }
}

fn scroll_area(width: u32, height: u32) -> Result<(u32, u32), RenderError> {
    if width <= FREQ_AXIS_WIDTH || height <= TIME_AXIS_HEIGHT {
        return Err(RenderError::SurfaceTooSmall { width, height });
    }
    Ok((width - FREQ_AXIS_WIDTH, height - TIME_AXIS_HEIGHT))
}
