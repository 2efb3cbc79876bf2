use std::sync::Arc;

use anyhow::Context as _;
use winit::window::Window;

use crate::camera::{self, CameraResources, Projection};
use crate::texture::Texture;

/// Everything the renderer needs that outlives a single frame: the surface,
/// device and queue, the surface configuration, the depth buffer and the
/// camera resources. Passed around explicitly; nothing here is global.
pub struct Context {
    pub window: Arc<Window>,
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    pub depth_texture: Texture,
    pub camera: CameraResources,
    pub projection: Projection,
}

impl Context {
    pub async fn new(window: Arc<Window>) -> anyhow::Result<Self> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            #[cfg(not(target_arch = "wasm32"))]
            backends: wgpu::Backends::PRIMARY,
            #[cfg(target_arch = "wasm32")]
            backends: wgpu::Backends::GL,
            ..Default::default()
        });

        let surface = instance.create_surface(window.clone())?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("no compatible graphics adapter")?;
        log::info!("adapter: {:?}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: None,
                    required_features: wgpu::Features::empty(),
                    // WebGL does not support all of wgpu's features.
                    required_limits: if cfg!(target_arch = "wasm32") {
                        wgpu::Limits::downlevel_webgl2_defaults()
                    } else {
                        wgpu::Limits::default()
                    },
                    memory_hints: Default::default(),
                },
                None,
            )
            .await?;

        let surface_caps = surface.get_capabilities(&adapter);
        // The shaders expect an sRGB surface; a linear one would render dark.
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .unwrap_or(surface_caps.formats[0]);
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: surface_caps.present_modes[0],
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let projection =
            Projection::new(config.width, config.height, cgmath::Deg(75.0), 0.1, 100.0);
        let camera = CameraResources::new(
            &device,
            camera::Camera::new((0.0, 0.0, 2.25)),
            &projection,
        );

        let depth_texture =
            Texture::create_depth_texture(&device, [config.width, config.height], "depth_texture");

        Ok(Self {
            window,
            surface,
            device,
            queue,
            config,
            depth_texture,
            camera,
            projection,
        })
    }

    /// Reconfigure the surface, projection and depth buffer for a new size.
    /// Zero-sized requests (minimized window) are ignored.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);
        self.projection.resize(width, height);
        self.depth_texture =
            Texture::create_depth_texture(&self.device, [width, height], "depth_texture");
    }
}
