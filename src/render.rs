//! Renderer abstraction and the wgpu implementation.
//!
//! The scene controller only talks to a [`Renderer`]. [`GpuRenderer`] is the
//! real one; tests substitute a recording double.
//!
//! Meshes that share one `Arc<Geometry>` are drawn with a single instanced
//! draw call. Their transforms and material parameters are packed into one
//! instance buffer that is rewritten every frame.

use std::{collections::HashMap, ops::Range, sync::Arc};

use wgpu::util::DeviceExt;

use crate::{
    camera::PerspectiveCamera,
    color::Color,
    config::Viewport,
    context::Context,
    data_structures::{
        instance::InstanceRaw,
        model::{Geometry, Mesh},
        scene_graph::Scene,
    },
    error::{RenderError, SetupError},
};

/// Output surface the scene controller draws through.
pub trait Renderer {
    fn set_clear_color(&mut self, color: Color);

    fn clear_color(&self) -> Color;

    /// Resize the drawing surface. Empty sizes are ignored.
    fn set_size(&mut self, viewport: Viewport);

    fn size(&self) -> Viewport;

    /// Place the output surface inside the host element matching `selector`.
    fn attach(&mut self, selector: &str) -> Result<(), SetupError>;

    /// Draw `scene` as seen from `camera`.
    fn render(&mut self, scene: &Scene, camera: &PerspectiveCamera) -> Result<(), RenderError>;
}

/// One instanced draw: every instance in `instances` uses `geometry`.
#[derive(Clone, Debug)]
pub struct DrawBatch {
    pub geometry: Arc<Geometry>,
    pub instances: Range<u32>,
}

/// Group meshes by shared geometry, keeping first-seen order, and pack their
/// instance data contiguously per group.
pub fn batch_instances(meshes: &[Mesh]) -> (Vec<InstanceRaw>, Vec<DrawBatch>) {
    let mut groups: Vec<(Arc<Geometry>, Vec<InstanceRaw>)> = Vec::new();
    for mesh in meshes {
        let raw = mesh.transform.to_raw(&mesh.material);
        match groups
            .iter_mut()
            .find(|(geometry, _)| Arc::ptr_eq(geometry, &mesh.geometry))
        {
            Some((_, instances)) => instances.push(raw),
            None => groups.push((mesh.geometry.clone(), vec![raw])),
        }
    }

    let mut raws = Vec::with_capacity(meshes.len());
    let batches = groups
        .into_iter()
        .map(|(geometry, instances)| {
            let start = raws.len() as u32;
            raws.extend(instances);
            DrawBatch {
                geometry,
                instances: start..raws.len() as u32,
            }
        })
        .collect();
    (raws, batches)
}

/// Vertex and index buffers uploaded for one shared geometry.
#[derive(Debug)]
struct GeometryBuffers {
    // Holding the Arc keeps the pointer used as cache key from being reused.
    _geometry: Arc<Geometry>,
    vertex: wgpu::Buffer,
    index: wgpu::Buffer,
    num_indices: u32,
}

impl GeometryBuffers {
    fn new(device: &wgpu::Device, geometry: Arc<Geometry>) -> Self {
        let vertex = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Geometry Vertex Buffer"),
            contents: bytemuck::cast_slice(&geometry.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        // wgpu requires copy sizes aligned to 4 bytes
        let mut indices = geometry.indices.clone();
        if indices.len() % 2 == 1 {
            indices.push(0);
        }
        let index = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Geometry Index Buffer"),
            contents: bytemuck::cast_slice(&indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        Self {
            num_indices: geometry.indices.len() as u32,
            _geometry: geometry,
            vertex,
            index,
        }
    }
}

trait DrawGeometry {
    fn draw_geometry_instanced(&mut self, buffers: &GeometryBuffers, instances: Range<u32>);
}

impl DrawGeometry for wgpu::RenderPass<'_> {
    fn draw_geometry_instanced(&mut self, buffers: &GeometryBuffers, instances: Range<u32>) {
        self.set_vertex_buffer(0, buffers.vertex.slice(..));
        self.set_index_buffer(buffers.index.slice(..), wgpu::IndexFormat::Uint16);
        self.draw_indexed(0..buffers.num_indices, 0, instances);
    }
}

const INITIAL_INSTANCE_CAPACITY: usize = 128;

fn mk_instance_buffer(device: &wgpu::Device, capacity: usize) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Instance Buffer"),
        size: (capacity * std::mem::size_of::<InstanceRaw>()) as wgpu::BufferAddress,
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

#[derive(Debug)]
pub struct GpuRenderer {
    ctx: Context,
    clear_color: Color,
    geometries: HashMap<usize, GeometryBuffers>,
    instance_buffer: wgpu::Buffer,
    instance_capacity: usize,
}

impl GpuRenderer {
    pub fn new(ctx: Context) -> Self {
        let instance_buffer = mk_instance_buffer(&ctx.device, INITIAL_INSTANCE_CAPACITY);
        Self {
            ctx,
            clear_color: Color::BLACK,
            geometries: HashMap::new(),
            instance_buffer,
            instance_capacity: INITIAL_INSTANCE_CAPACITY,
        }
    }

    pub fn context(&self) -> &Context {
        &self.ctx
    }

    fn upload_geometry(&mut self, geometry: &Arc<Geometry>) {
        let key = Arc::as_ptr(geometry) as usize;
        if !self.geometries.contains_key(&key) {
            log::debug!(
                "uploading geometry with {} vertices and {} indices",
                geometry.vertices.len(),
                geometry.indices.len()
            );
            let buffers = GeometryBuffers::new(&self.ctx.device, geometry.clone());
            self.geometries.insert(key, buffers);
        }
    }

    fn upload_instances(&mut self, raws: &[InstanceRaw]) {
        if raws.len() > self.instance_capacity {
            let capacity = raws.len().next_power_of_two();
            log::debug!("growing instance buffer from {} to {}", self.instance_capacity, capacity);
            self.instance_buffer = mk_instance_buffer(&self.ctx.device, capacity);
            self.instance_capacity = capacity;
        }
        if !raws.is_empty() {
            self.ctx
                .queue
                .write_buffer(&self.instance_buffer, 0, bytemuck::cast_slice(raws));
        }
    }
}

impl Renderer for GpuRenderer {
    fn set_clear_color(&mut self, color: Color) {
        self.clear_color = color;
        self.ctx.clear_colour = color.into();
    }

    fn clear_color(&self) -> Color {
        self.clear_color
    }

    fn set_size(&mut self, viewport: Viewport) {
        log::debug!("renderer size {}x{}", viewport.width, viewport.height);
        self.ctx.resize(viewport);
    }

    fn size(&self) -> Viewport {
        self.ctx.size()
    }

    #[cfg(target_arch = "wasm32")]
    fn attach(&mut self, selector: &str) -> Result<(), SetupError> {
        use winit::platform::web::WindowExtWebSys;

        let document = web_sys::window()
            .and_then(|window| window.document())
            .ok_or(SetupError::NoDocument)?;
        let container = document
            .query_selector(selector)
            .map_err(|err| SetupError::Attach(format!("{:?}", err)))?
            .ok_or_else(|| SetupError::ContainerMissing(selector.to_string()))?;
        let canvas = self
            .ctx
            .window
            .canvas()
            .ok_or_else(|| SetupError::Attach("window has no canvas".to_string()))?;
        container
            .append_child(&canvas)
            .map_err(|err| SetupError::Attach(format!("{:?}", err)))?;
        log::debug!("canvas attached to {}", selector);
        Ok(())
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn attach(&mut self, selector: &str) -> Result<(), SetupError> {
        log::debug!("native window, no container needed for {}", selector);
        Ok(())
    }

    fn render(&mut self, scene: &Scene, camera: &PerspectiveCamera) -> Result<(), RenderError> {
        if !self.ctx.is_surface_configured {
            return Ok(());
        }

        let (raws, batches) = batch_instances(scene.meshes());
        for batch in &batches {
            self.upload_geometry(&batch.geometry);
        }
        self.upload_instances(&raws);
        self.ctx.camera.write(&self.ctx.queue, camera);
        self.ctx.light.write(&self.ctx.queue, scene.lights());

        let output = match self.ctx.surface.get_current_texture() {
            Ok(output) => output,
            Err(err @ (wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated)) => {
                self.ctx.reconfigure();
                return Err(err.into());
            }
            Err(err) => return Err(err.into()),
        };
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
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.ctx.clear_colour),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
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

            if !batches.is_empty() {
                render_pass.set_pipeline(&self.ctx.pipeline);
                render_pass.set_bind_group(0, &self.ctx.camera.bind_group, &[]);
                render_pass.set_bind_group(1, &self.ctx.light.bind_group, &[]);
                render_pass.set_vertex_buffer(1, self.instance_buffer.slice(..));
                for batch in batches {
                    let key = Arc::as_ptr(&batch.geometry) as usize;
                    if let Some(buffers) = self.geometries.get(&key) {
                        render_pass.draw_geometry_instanced(buffers, batch.instances);
                    }
                }
            }
        }

        self.ctx.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        Ok(())
    }
}
