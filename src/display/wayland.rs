//! Wayland layer-shell integration for the overlay

use anyhow::Result;
use smithay_client_toolkit::{
    compositor::{CompositorHandler, CompositorState},
    delegate_compositor, delegate_layer, delegate_output, delegate_registry, delegate_seat,
    delegate_shm,
    output::{OutputHandler, OutputState},
    registry::{ProvidesRegistryState, RegistryState},
    registry_handlers,
    seat::{Capability, SeatHandler, SeatState},
    shell::{
        WaylandSurface,
        wlr_layer::{
            Anchor, KeyboardInteractivity, Layer, LayerShell, LayerShellHandler, LayerSurface,
            LayerSurfaceConfigure,
        },
    },
    shm::{Shm, ShmHandler, slot::SlotPool},
};
use std::time::{Duration, Instant};
use wayland_client::{
    Connection, QueueHandle,
    protocol::{wl_output, wl_seat, wl_shm, wl_surface},
};

use crate::control::ControlMessage;
use crate::display::OverlayPipeline;

/// Main overlay application state
pub struct OverlayApp {
    // Registry state
    registry_state: RegistryState,
    seat_state: SeatState,
    output_state: OutputState,
    compositor_state: CompositorState,
    shm: Shm,
    layer_shell: LayerShell,

    // Spectrogram pipeline
    pipeline: OverlayPipeline,

    // Wayland surface
    layer_surface: Option<LayerSurface>,
    pool: Option<SlotPool>,
    width: u32,
    height: u32,
    last_frame: Instant,
    pub exit: bool,
    configured: bool,
}

impl OverlayApp {
    pub fn new(
        globals: wayland_client::globals::GlobalList,
        qh: &QueueHandle<Self>,
        pipeline: OverlayPipeline,
        width: u32,
        height: u32,
    ) -> Result<Self> {
        let registry_state = RegistryState::new(&globals);
        let seat_state = SeatState::new(&globals, qh);
        let output_state = OutputState::new(&globals, qh);
        let compositor_state = CompositorState::bind(&globals, qh)?;
        let shm = Shm::bind(&globals, qh)?;
        let layer_shell = LayerShell::bind(&globals, qh)?;

        Ok(Self {
            registry_state,
            seat_state,
            output_state,
            compositor_state,
            shm,
            layer_shell,
            pipeline,
            layer_surface: None,
            pool: None,
            width,
            height,
            last_frame: Instant::now(),
            exit: false,
            configured: false,
        })
    }

    pub fn create_layer_surface(&mut self, qh: &QueueHandle<Self>) -> Result<()> {
        let surface = self.compositor_state.create_surface(qh);

        let layer_surface = self.layer_shell.create_layer_surface(
            qh,
            surface,
            Layer::Overlay,
            Some("sonograph"),
            None, // None = compositor chooses output
        );

        layer_surface.set_anchor(Anchor::TOP);
        layer_surface.set_keyboard_interactivity(KeyboardInteractivity::None);
        layer_surface.set_size(self.width, self.height);
        layer_surface.set_exclusive_zone(0);

        layer_surface.wl_surface().commit();

        self.layer_surface = Some(layer_surface);

        Ok(())
    }

    /// Apply any pending control messages between ticks.
    pub fn handle_controls(&mut self) {
        for message in self.pipeline.control.poll() {
            match message {
                ControlMessage::Scale => {
                    self.pipeline.renderer.controls_mut().toggle_scale();
                }
                ControlMessage::Speed { value } => {
                    let controls = self.pipeline.renderer.controls_mut();
                    if let Err(e) = controls.set_speed_from_slider(value) {
                        eprintln!("control: {}", e);
                    }
                }
                ControlMessage::Quit => {
                    self.exit = true;
                }
            }
        }
    }

    pub fn should_draw(&self) -> bool {
        // Don't draw until the compositor has sent a configure event.
        self.configured && self.last_frame.elapsed() >= Duration::from_millis(16)
    }

    /// Run one renderer tick and present the canvas through the shm pool.
    pub fn draw(&mut self) -> Result<()> {
        let Some(layer_surface) = &self.layer_surface else {
            return Ok(());
        };

        if self.pool.is_none() {
            let pool = SlotPool::new((self.width * self.height * 4) as usize, &self.shm)?;
            self.pool = Some(pool);
        }

        let canvas = self.pipeline.renderer.tick(self.pipeline.source.as_mut());
        let pixmap_data = canvas.data();

        let pool = self.pool.as_mut().expect("pool initialized above");
        let (buffer, shm_canvas) = pool.create_buffer(
            self.width as i32,
            self.height as i32,
            (self.width * 4) as i32,
            wl_shm::Format::Argb8888,
        )?;

        // tiny-skia hands back RGBA; wl_shm wants little-endian ARGB.
        for i in 0..(self.width * self.height) as usize {
            let idx = i * 4;
            shm_canvas[idx] = pixmap_data[idx + 2];
            shm_canvas[idx + 1] = pixmap_data[idx + 1];
            shm_canvas[idx + 2] = pixmap_data[idx];
            shm_canvas[idx + 3] = pixmap_data[idx + 3];
        }

        layer_surface.wl_surface().attach(Some(buffer.wl_buffer()), 0, 0);
        layer_surface
            .wl_surface()
            .damage_buffer(0, 0, self.width as i32, self.height as i32);
        layer_surface.wl_surface().commit();

        self.last_frame = Instant::now();
        Ok(())
    }
}

// Implement required trait delegates
delegate_compositor!(OverlayApp);
delegate_output!(OverlayApp);
delegate_shm!(OverlayApp);
delegate_seat!(OverlayApp);
delegate_layer!(OverlayApp);
delegate_registry!(OverlayApp);

impl CompositorHandler for OverlayApp {
    fn scale_factor_changed(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        _surface: &wl_surface::WlSurface,
        _new_factor: i32,
    ) {
    }

    fn frame(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        _surface: &wl_surface::WlSurface,
        _time: u32,
    ) {
        if let Err(e) = self.draw() {
            eprintln!("overlay: draw failed: {}", e);
        }
    }

    fn transform_changed(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        _surface: &wl_surface::WlSurface,
        _new_transform: wl_output::Transform,
    ) {
    }

    fn surface_enter(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        _surface: &wl_surface::WlSurface,
        _output: &wl_output::WlOutput,
    ) {
    }

    fn surface_leave(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        _surface: &wl_surface::WlSurface,
        _output: &wl_output::WlOutput,
    ) {
    }
}

impl OutputHandler for OverlayApp {
    fn output_state(&mut self) -> &mut OutputState {
        &mut self.output_state
    }

    fn new_output(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        _output: wl_output::WlOutput,
    ) {
    }

    fn update_output(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        _output: wl_output::WlOutput,
    ) {
    }

    fn output_destroyed(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        _output: wl_output::WlOutput,
    ) {
    }
}

impl LayerShellHandler for OverlayApp {
    fn closed(&mut self, _conn: &Connection, _qh: &QueueHandle<Self>, _layer: &LayerSurface) {
        self.exit = true;
    }

    fn configure(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        _layer: &LayerSurface,
        configure: LayerSurfaceConfigure,
        _serial: u32,
    ) {
        let (width, height) = configure.new_size;
        if width > 0 && height > 0 && (width != self.width || height != self.height) {
            self.width = width;
            self.height = height;
            self.pool = None; // Recreate pool at the new size

            // The new size is authoritative: scrolled history is discarded
            // and overlays come back at the new geometry.
            if let Err(e) = self.pipeline.renderer.resize(width, height) {
                eprintln!("overlay: unusable surface size {}x{}: {}", width, height, e);
                self.exit = true;
                return;
            }
        }

        self.configured = true;

        // Initial draw after configure
        if let Err(e) = self.draw() {
            eprintln!("overlay: draw failed: {}", e);
        }
    }
}

impl SeatHandler for OverlayApp {
    fn seat_state(&mut self) -> &mut SeatState {
        &mut self.seat_state
    }

    fn new_seat(&mut self, _: &Connection, _: &QueueHandle<Self>, _: wl_seat::WlSeat) {}

    fn new_capability(
        &mut self,
        _: &Connection,
        _: &QueueHandle<Self>,
        _: wl_seat::WlSeat,
        _: Capability,
    ) {
    }

    fn remove_capability(
        &mut self,
        _: &Connection,
        _: &QueueHandle<Self>,
        _: wl_seat::WlSeat,
        _: Capability,
    ) {
    }

    fn remove_seat(&mut self, _: &Connection, _: &QueueHandle<Self>, _: wl_seat::WlSeat) {}
}

impl ShmHandler for OverlayApp {
    fn shm_state(&mut self) -> &mut Shm {
        &mut self.shm
    }
}

impl ProvidesRegistryState for OverlayApp {
    fn registry(&mut self) -> &mut RegistryState {
        &mut self.registry_state
    }
    registry_handlers![OutputState, SeatState];
}
