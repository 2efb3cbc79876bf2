//! Application event loop.
//!
//! Owns the window, the GPU context, the scene and the debug panel, and runs
//! the never-ending frame loop. Each frame follows the same order: sample the
//! clock and push it into the flag's time uniform, advance the damped orbit
//! controls, render the scene and the panel, then schedule the next frame.

use std::{iter, sync::Arc};

use instant::Instant;
use winit::{
    application::ApplicationHandler,
    event::{DeviceEvent, DeviceId, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop},
    window::Window,
};

use crate::{assets::Assets, context::Context, panel, pipelines::Pipelines, scene::Scene};

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

pub const WINDOW_TITLE: &str = "coming soon";

/// Startup options, filled in from the CLI on native builds.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Directory (native) or URL prefix (web) the assets are loaded from.
    pub assets_base: String,
    /// Raise the default log level to debug.
    pub verbose: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            assets_base: "assets".to_string(),
            verbose: false,
        }
    }
}

/// Rendered surfaces never exceed twice the logical resolution, whatever the
/// monitor's density. Returns the physical size to configure the surface at.
pub fn clamped_surface_size(width: u32, height: u32, scale_factor: f64) -> (u32, u32) {
    let ratio = scale_factor.min(2.0) / scale_factor;
    (
        (width as f64 * ratio).round() as u32,
        (height as f64 * ratio).round() as u32,
    )
}

/// Everything that exists only after async initialization finished: the GPU
/// context, pipelines, scene and the egui plumbing.
pub struct AppState {
    ctx: Context,
    pipelines: Pipelines,
    scene: Scene,
    egui_ctx: egui::Context,
    egui_state: egui_winit::State,
    egui_renderer: egui_wgpu::Renderer,
    last_time: Instant,
}

impl AppState {
    async fn new(window: Arc<Window>, assets_base: String) -> anyhow::Result<Self> {
        let ctx = Context::new(window.clone()).await?;
        let assets = Assets::load(&assets_base, &ctx.device, &ctx.queue).await;
        let pipelines = Pipelines::new(&ctx.device, &ctx.config, &ctx.camera.bind_group_layout);
        let scene = Scene::build(&ctx.device, &pipelines, &assets);
        log::info!("scene ready with {} object(s)", scene.object_count());

        let egui_ctx = egui::Context::default();
        let egui_state = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(&ctx.device, ctx.config.format, None, 1, false);

        let mut state = Self {
            ctx,
            pipelines,
            scene,
            egui_ctx,
            egui_state,
            egui_renderer,
            last_time: Instant::now(),
        };
        // The context configured the surface at raw physical size; apply the
        // density clamp before the first frame.
        let size = window.inner_size();
        state.resize(size.width, size.height);
        Ok(state)
    }

    fn resize(&mut self, width: u32, height: u32) {
        let (width, height) =
            clamped_surface_size(width, height, self.ctx.window.scale_factor());
        self.ctx.resize(width, height);
    }

    fn pixels_per_point(&self) -> f32 {
        self.ctx.window.scale_factor().min(2.0) as f32
    }

    fn render(&mut self) -> Result<(), wgpu::SurfaceError> {
        let dt = self.last_time.elapsed();
        self.last_time = Instant::now();

        // Clock first, so the flag animates even while the camera idles.
        let elapsed = self.scene.tick();
        log::trace!("frame at t={elapsed:.3}");

        self.ctx
            .camera
            .controller
            .update(&mut self.ctx.camera.camera, dt);

        // Run the panel before uploading uniforms so slider writes land in
        // the same frame.
        let raw_input = self.egui_state.take_egui_input(&self.ctx.window);
        let full_output = self.egui_ctx.run(raw_input, |ctx| {
            panel::draw(ctx, &mut self.scene.state, &mut self.ctx.camera.camera);
        });
        self.egui_state
            .handle_platform_output(&self.ctx.window, full_output.platform_output);

        self.ctx
            .camera
            .uniform
            .update_view_proj(&self.ctx.camera.camera, &self.ctx.projection);
        self.ctx.queue.write_buffer(
            &self.ctx.camera.buffer,
            0,
            bytemuck::cast_slice(&[self.ctx.camera.uniform]),
        );
        self.scene.write_uniforms(&self.ctx.queue);

        let output = self.ctx.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Scene Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.ctx.depth_texture.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            render_pass.set_bind_group(0, &self.ctx.camera.bind_group, &[]);
            self.scene.draw(&mut render_pass, &self.pipelines);
        }

        // Panel on top, in its own pass without depth.
        let pixels_per_point = self.pixels_per_point();
        let clipped = self
            .egui_ctx
            .tessellate(full_output.shapes, pixels_per_point);
        let screen = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [self.ctx.config.width, self.ctx.config.height],
            pixels_per_point,
        };
        for (id, delta) in &full_output.textures_delta.set {
            self.egui_renderer
                .update_texture(&self.ctx.device, &self.ctx.queue, *id, delta);
        }
        self.egui_renderer.update_buffers(
            &self.ctx.device,
            &self.ctx.queue,
            &mut encoder,
            &clipped,
            &screen,
        );
        {
            let render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Panel Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });
            self.egui_renderer
                .render(&mut render_pass.forget_lifetime(), &clipped, &screen);
        }
        for id in &full_output.textures_delta.free {
            self.egui_renderer.free_texture(id);
        }

        self.ctx.queue.submit(iter::once(encoder.finish()));
        output.present();
        Ok(())
    }
}

pub enum AppEvent {
    Initialized(Box<AppState>),
}

impl std::fmt::Debug for AppEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Initialized(_) => f.write_str("Initialized"),
        }
    }
}

pub struct App {
    config: RunConfig,
    proxy: winit::event_loop::EventLoopProxy<AppEvent>,
    state: Option<AppState>,
}

impl App {
    fn new(event_loop: &EventLoop<AppEvent>, config: RunConfig) -> Self {
        Self {
            config,
            proxy: event_loop.create_proxy(),
            state: None,
        }
    }
}

impl ApplicationHandler<AppEvent> for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() {
            return;
        }

        #[allow(unused_mut)]
        let mut window_attributes = Window::default_attributes().with_title(WINDOW_TITLE);

        #[cfg(target_arch = "wasm32")]
        {
            use wasm_bindgen::JsCast;
            use winit::platform::web::WindowAttributesExtWebSys;

            const CANVAS_ID: &str = "canvas";

            let window = web_sys::window().unwrap_throw();
            let document = window.document().unwrap_throw();
            let canvas = document.get_element_by_id(CANVAS_ID).unwrap_throw();
            window_attributes = window_attributes.with_canvas(Some(canvas.unchecked_into()));
        }

        let window = match event_loop.create_window(window_attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                log::error!("could not create a window: {e}");
                event_loop.exit();
                return;
            }
        };

        let assets_base = self.config.assets_base.clone();
        let init_future = AppState::new(window, assets_base);

        #[cfg(not(target_arch = "wasm32"))]
        match pollster::block_on(init_future) {
            Ok(state) => self.state = Some(state),
            Err(e) => {
                log::error!("initialization failed: {e:#}");
                event_loop.exit();
            }
        }

        #[cfg(target_arch = "wasm32")]
        {
            let proxy = self.proxy.clone();
            wasm_bindgen_futures::spawn_local(async move {
                match init_future.await {
                    Ok(state) => {
                        assert!(proxy
                            .send_event(AppEvent::Initialized(Box::new(state)))
                            .is_ok());
                    }
                    Err(e) => log::error!("initialization failed: {e:#}"),
                }
            });
        }
    }

    fn user_event(&mut self, _event_loop: &ActiveEventLoop, event: AppEvent) {
        match event {
            AppEvent::Initialized(state) => {
                // The canvas may have been sized while we were loading.
                let mut state = *state;
                let size = state.ctx.window.inner_size();
                state.resize(size.width, size.height);
                state.ctx.window.request_redraw();
                self.state = Some(state);
            }
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: DeviceId,
        event: DeviceEvent,
    ) {
        let Some(state) = &mut self.state else {
            return;
        };
        if let DeviceEvent::MouseMotion { delta: (dx, dy) } = event {
            state.ctx.camera.controller.handle_mouse(dx, dy);
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        let Some(state) = &mut self.state else {
            if let WindowEvent::CloseRequested = event {
                event_loop.exit();
            }
            return;
        };

        // The panel gets a look at every event; whatever it consumes must
        // not also steer the camera.
        let response = state.egui_state.on_window_event(&state.ctx.window, &event);
        if !response.consumed {
            state.ctx.camera.controller.handle_window_events(&event);
        }
        if response.repaint {
            state.ctx.window.request_redraw();
        }

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => state.resize(size.width, size.height),
            WindowEvent::ScaleFactorChanged { .. } => {
                let size = state.ctx.window.inner_size();
                state.resize(size.width, size.height);
            }
            WindowEvent::RedrawRequested => {
                match state.render() {
                    Ok(()) => {}
                    Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                        let size = state.ctx.window.inner_size();
                        state.resize(size.width, size.height);
                    }
                    Err(wgpu::SurfaceError::OutOfMemory) => {
                        log::error!("out of GPU memory");
                        event_loop.exit();
                    }
                    Err(e) => log::warn!("frame skipped: {e}"),
                }
                // The loop never settles; the next frame is always scheduled.
                state.ctx.window.request_redraw();
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(state) = &self.state {
            state.ctx.window.request_redraw();
        }
    }
}

pub fn run(config: RunConfig) -> anyhow::Result<()> {
    #[cfg(not(target_arch = "wasm32"))]
    {
        let mut builder = env_logger::Builder::from_default_env();
        if config.verbose {
            builder.filter_level(log::LevelFilter::Debug);
        }
        if let Err(e) = builder.try_init() {
            println!("Warning: Could not initialize logger: {}", e);
        }
    }

    #[cfg(target_arch = "wasm32")]
    {
        console_log::init_with_level(log::Level::Info).unwrap_throw();
    }

    let event_loop: EventLoop<AppEvent> = EventLoop::with_user_event().build()?;
    let mut app = App::new(&event_loop, config);
    event_loop.run_app(&mut app)?;

    Ok(())
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn start() {
    if let Err(e) = run(RunConfig::default()) {
        log::error!("event loop failed: {e:#}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_density_is_untouched() {
        assert_eq!(clamped_surface_size(800, 600, 1.0), (800, 600));
        assert_eq!(clamped_surface_size(1600, 1200, 2.0), (1600, 1200));
    }

    #[test]
    fn dense_displays_are_clamped_to_twice_logical() {
        // 3x display reporting 2400x1800 physical for an 800x600 window.
        assert_eq!(clamped_surface_size(2400, 1800, 3.0), (1600, 1200));
    }

    #[test]
    fn clamping_preserves_aspect() {
        let (w, h) = clamped_surface_size(1920, 1080, 2.5);
        let before = 1920.0 / 1080.0;
        let after = w as f32 / h as f32;
        assert!((before - after).abs() < 1e-3);
    }
}
