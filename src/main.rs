use std::sync::Arc;
use std::time::Instant;

use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::{DeviceEvent, ElementState, MouseButton, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{CursorGrabMode, Window, WindowId},
};

use glam::Vec2;

use scanview::scan::{ArtificialSource, IngestWorker, SampleLog, ScanMesher, TokenSource};
use scanview::{ScanConfig, ScanError};

mod renderer;

use renderer::{Camera, GpuState};

#[derive(Default)]
struct InputState {
    forward: f32,
    right: f32,
    up: f32,
    mouse_captured: bool,
    mouse_delta: Vec2,
}

struct App {
    config: ScanConfig,

    window: Option<Arc<Window>>,
    gpu: Option<GpuState>,

    camera: Camera,
    input: InputState,

    samples: SampleLog,
    mesher: ScanMesher,
    ingest: Option<IngestWorker>,

    last_frame: Instant,
    frame_count: u32,
    fps_timer: Instant,

    fatal: Option<ScanError>,
}

impl App {
    fn new(config: ScanConfig) -> Self {
        let samples = SampleLog::new();

        Self {
            camera: Camera::from_config(&config),
            mesher: ScanMesher::new(samples.clone(), config.wall_height),
            samples,
            config,

            window: None,
            gpu: None,

            input: InputState::default(),
            ingest: None,

            last_frame: Instant::now(),
            frame_count: 0,
            fps_timer: Instant::now(),

            fatal: None,
        }
    }

    fn init(&mut self, event_loop: &ActiveEventLoop) -> scanview::Result<()> {
        let (width, height) = self.config.window_size;
        let window_attrs = Window::default_attributes()
            .with_title(self.config.window_title.clone())
            .with_inner_size(PhysicalSize::new(width, height))
            .with_resizable(false);

        let window = Arc::new(event_loop.create_window(window_attrs)?);
        let gpu = pollster::block_on(GpuState::new(window.clone(), &self.config))?;

        self.window = Some(window);
        self.gpu = Some(gpu);
        self.spawn_ingest();

        Ok(())
    }

    fn spawn_ingest(&mut self) {
        let samples = self.samples.clone();
        let echo = self.config.echo_samples;

        let worker = if self.config.artificial_input {
            log::info!("feeding artificial input");
            IngestWorker::spawn(ArtificialSource::new(), samples, echo)
        } else {
            log::info!("reading samples from stdin");
            IngestWorker::spawn(TokenSource::stdin(), samples, echo)
        };

        self.ingest = Some(worker);
    }

    fn shutdown(&mut self) {
        if let Some(worker) = self.ingest.take() {
            worker.stop();
            log::info!(
                "ingest stopped: {} samples accepted, {} rejected",
                worker.accepted(),
                worker.rejected()
            );
        }
    }

    fn update(&mut self) {
        let now = Instant::now();
        let dt = now.duration_since(self.last_frame).as_secs_f32();
        self.last_frame = now;

        self.frame_count += 1;
        if self.fps_timer.elapsed().as_secs_f32() >= 5.0 {
            let fps = self.frame_count as f32 / self.fps_timer.elapsed().as_secs_f32();
            log::debug!("{fps:.1} fps, {} samples", self.samples.len());
            self.frame_count = 0;
            self.fps_timer = Instant::now();
        }

        if self.input.mouse_captured {
            self.camera
                .process_keyboard(self.input.forward, self.input.right, self.input.up, dt);
            self.camera.process_mouse_movement(self.input.mouse_delta);
        }
        self.input.mouse_delta = Vec2::ZERO;

        let Some(gpu) = &mut self.gpu else { return };

        if self.mesher.update(gpu) {
            if let Some(window) = &self.window {
                window.set_title(&format!(
                    "{} ({} samples, {} triangles)",
                    self.config.window_title,
                    self.mesher.published_samples(),
                    gpu.wall_buffers.triangle_count()
                ));
            }
        }
    }

    fn render(&mut self, event_loop: &ActiveEventLoop) {
        let Some(gpu) = &mut self.gpu else { return };
        let Some(window) = &self.window else { return };

        let output = match gpu.surface.get_current_texture() {
            Ok(t) => t,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                gpu.resize(gpu.size);
                return;
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("out of GPU memory");
                event_loop.exit();
                return;
            }
            Err(wgpu::SurfaceError::Timeout) => {
                return;
            }
        };

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        gpu.update_camera(&self.camera);

        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Main Encoder"),
            });

        gpu.render_walls(&view, &mut encoder);

        gpu.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        window.request_redraw();
    }

    fn set_mouse_captured(&mut self, captured: bool) {
        self.input.mouse_captured = captured;
        self.input.mouse_delta = Vec2::ZERO;

        let Some(window) = &self.window else { return };
        if captured {
            let grabbed = window
                .set_cursor_grab(CursorGrabMode::Confined)
                .or_else(|_| window.set_cursor_grab(CursorGrabMode::Locked));
            if let Err(e) = grabbed {
                log::debug!("cursor grab unavailable: {e}");
            }
            window.set_cursor_visible(false);
        } else {
            let _ = window.set_cursor_grab(CursorGrabMode::None);
            window.set_cursor_visible(true);
        }
    }

    fn handle_key(&mut self, key: KeyCode, pressed: bool, repeat: bool) {
        let value = if pressed { 1.0 } else { 0.0 };

        match key {
            KeyCode::KeyW => self.input.forward = value,
            KeyCode::KeyS => self.input.forward = -value,
            KeyCode::KeyA => self.input.right = -value,
            KeyCode::KeyD => self.input.right = value,
            KeyCode::KeyE => self.input.up = value,
            KeyCode::ShiftLeft | KeyCode::ControlLeft => self.input.up = -value,
            KeyCode::Space if pressed && !repeat => {
                self.set_mouse_captured(!self.input.mouse_captured);
            }
            KeyCode::Escape if pressed => self.set_mouse_captured(false),
            _ => {}
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        if let Err(e) = self.init(event_loop) {
            log::error!("startup failed: {e}");
            self.fatal = Some(e);
            event_loop.exit();
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                self.shutdown();
                event_loop.exit();
            }

            WindowEvent::Resized(size) => {
                if let Some(gpu) = &mut self.gpu {
                    gpu.resize(size);
                    self.camera
                        .set_aspect(size.width as f32, size.height as f32);
                }
            }

            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(key) = event.physical_key {
                    self.handle_key(key, event.state == ElementState::Pressed, event.repeat);
                }
            }

            WindowEvent::MouseInput {
                button: MouseButton::Right,
                state,
                ..
            } => {
                self.set_mouse_captured(state == ElementState::Pressed);
            }

            WindowEvent::RedrawRequested => {
                self.update();
                self.render(event_loop);
            }

            _ => {}
        }
    }

    fn device_event(&mut self, _: &ActiveEventLoop, _: winit::event::DeviceId, event: DeviceEvent) {
        if let DeviceEvent::MouseMotion { delta } = event {
            if self.input.mouse_captured {
                self.input.mouse_delta.x += delta.0 as f32;
                self.input.mouse_delta.y += delta.1 as f32;
            }
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("scanview=info"))
        .init();

    let config = ScanConfig::from_env()?;
    log::debug!("{config:?}");

    let event_loop = EventLoop::new().map_err(ScanError::from)?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(config);
    event_loop.run_app(&mut app).map_err(ScanError::from)?;
    app.shutdown();

    if let Some(e) = app.fatal.take() {
        return Err(e.into());
    }

    Ok(())
}
