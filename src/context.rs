//! GPU device, surface and the per-frame resources shared by all draws.

use std::sync::Arc;

use anyhow::Context as _;
use winit::window::Window;

use crate::{
    camera::CameraResources,
    color::Color,
    config::Viewport,
    data_structures::texture,
    pipelines::{basic::mk_phong_pipeline, light::LightResources},
};

#[derive(Debug)]
pub struct Context {
    pub(crate) window: Arc<Window>,
    pub(crate) depth_texture: texture::Texture,
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    pub camera: CameraResources,
    pub light: LightResources,
    pub pipeline: wgpu::RenderPipeline,
    pub clear_colour: wgpu::Color,
    pub(crate) is_surface_configured: bool,
}

impl Context {
    pub async fn new(window: Arc<Window>) -> anyhow::Result<Self> {
        let size = window.inner_size();

        log::info!("wgpu setup");
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            #[cfg(not(target_arch = "wasm32"))]
            backends: wgpu::Backends::PRIMARY,
            #[cfg(target_arch = "wasm32")]
            backends: wgpu::Backends::GL,
            ..Default::default()
        });

        let surface = instance
            .create_surface(window.clone())
            .context("failed to create a surface for the window")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("no graphics adapter compatible with the surface")?;
        log::info!("device and queue");
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: None,
                required_features: wgpu::Features::empty(),
                // WebGL2 lacks parts of wgpu's default limits
                required_limits: if cfg!(target_arch = "wasm32") {
                    wgpu::Limits::downlevel_webgl2_defaults()
                } else {
                    wgpu::Limits::default()
                },
                memory_hints: Default::default(),
                trace: wgpu::Trace::Off,
            })
            .await
            .context("failed to open the graphics device")?;

        let surface_caps = surface.get_capabilities(&adapter);
        // Colours are converted to linear space before upload, so the surface must be sRGB.
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first().copied())
            .context("surface reports no supported formats")?;
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: surface_caps
                .present_modes
                .first()
                .copied()
                .unwrap_or(wgpu::PresentMode::Fifo),
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };

        let camera = CameraResources::new(&device);
        let light = LightResources::new(&device);

        let depth_texture = texture::Texture::create_depth_texture(
            &device,
            [config.width, config.height],
            "depth_texture",
        );

        let pipeline = mk_phong_pipeline(
            &device,
            config.format,
            &camera.bind_group_layout,
            &light.bind_group_layout,
        );
        log::info!("surface format {:?}, initial size {}x{}", config.format, size.width, size.height);

        let mut ctx = Self {
            window,
            depth_texture,
            surface,
            device,
            queue,
            config,
            camera,
            light,
            pipeline,
            clear_colour: Color::BLACK.into(),
            is_surface_configured: false,
        };
        ctx.resize(Viewport::new(size.width, size.height));
        Ok(ctx)
    }

    pub fn window(&self) -> &Arc<Window> {
        &self.window
    }

    pub fn size(&self) -> Viewport {
        Viewport::new(self.config.width, self.config.height)
    }

    /// Reconfigure the surface and depth buffer. Zero sizes leave the surface
    /// unconfigured until a real size arrives.
    pub fn resize(&mut self, viewport: Viewport) {
        if viewport.is_empty() {
            log::debug!("ignoring empty surface size {}x{}", viewport.width, viewport.height);
            return;
        }
        self.config.width = viewport.width;
        self.config.height = viewport.height;
        self.surface.configure(&self.device, &self.config);
        self.depth_texture = texture::Texture::create_depth_texture(
            &self.device,
            [self.config.width, self.config.height],
            "depth_texture",
        );
        self.is_surface_configured = true;
    }

    /// Configure again with the current size, after a lost or outdated surface.
    pub fn reconfigure(&mut self) {
        let size = self.size();
        self.resize(size);
    }
}
