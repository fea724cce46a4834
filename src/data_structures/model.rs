//! Geometry, materials and meshes.
//!
//! Geometry and materials are plain CPU-side descriptions. A [`Mesh`] refers to
//! them through `Arc`s, so any number of meshes can share one geometry and one
//! material without copying. The GPU renderer uploads each distinct geometry
//! once and keys it by the `Arc`'s address.

use std::sync::Arc;

use cgmath::Vector3;

use crate::{color::Color, data_structures::instance::Instance};

pub trait Vertex {
    fn desc() -> wgpu::VertexBufferLayout<'static>;
}

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ModelVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

impl Vertex for ModelVertex {
    fn desc() -> wgpu::VertexBufferLayout<'static> {
        use std::mem;
        wgpu::VertexBufferLayout {
            array_stride: mem::size_of::<ModelVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x3,
                },
            ],
        }
    }
}

/// Indexed triangle list.
#[derive(Clone, Debug, PartialEq)]
pub struct Geometry {
    pub vertices: Vec<ModelVertex>,
    pub indices: Vec<u16>,
}

impl Geometry {
    /// Axis-aligned box centred on the origin. Each face has its own four
    /// vertices so normals stay flat.
    pub fn new_box(width: f32, height: f32, depth: f32) -> Self {
        let (hx, hy, hz) = (width / 2.0, height / 2.0, depth / 2.0);
        // (normal, u axis, v axis) per face; corners are normal +- u +- v
        let faces: [([f32; 3], [f32; 3], [f32; 3]); 6] = [
            ([1.0, 0.0, 0.0], [0.0, 0.0, -1.0], [0.0, 1.0, 0.0]),
            ([-1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 0.0]),
            ([0.0, 1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, -1.0]),
            ([0.0, -1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]),
            ([0.0, 0.0, 1.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
            ([0.0, 0.0, -1.0], [-1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
        ];
        let half = Vector3::new(hx, hy, hz);
        let scale = |v: [f32; 3]| Vector3::new(v[0] * half.x, v[1] * half.y, v[2] * half.z);

        let mut vertices = Vec::with_capacity(24);
        let mut indices = Vec::with_capacity(36);
        for (normal, u, v) in faces {
            let (n, u, v) = (scale(normal), scale(u), scale(v));
            let base = vertices.len() as u16;
            for (su, sv) in [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)] {
                vertices.push(ModelVertex {
                    position: (n + u * su + v * sv).into(),
                    normal,
                });
            }
            // counter-clockwise seen from outside
            indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
        }
        Self { vertices, indices }
    }
}

/// Blinn-Phong surface description.
#[derive(Clone, Debug, PartialEq)]
pub struct PhongMaterial {
    pub color: Color,
    pub specular: Color,
    pub shininess: f32,
}

impl PhongMaterial {
    pub fn new(color: Color) -> Self {
        Self {
            color,
            specular: Color::from_hex(0x111111),
            shininess: 30.0,
        }
    }
}

impl Default for PhongMaterial {
    fn default() -> Self {
        Self::new(Color::WHITE)
    }
}

/// A renderable object: shared geometry and material plus its own transform.
#[derive(Clone, Debug)]
pub struct Mesh {
    pub geometry: Arc<Geometry>,
    pub material: Arc<PhongMaterial>,
    pub transform: Instance,
}

impl Mesh {
    pub fn new(geometry: Arc<Geometry>, material: Arc<PhongMaterial>) -> Self {
        Self {
            geometry,
            material,
            transform: Instance::new(),
        }
    }

    pub fn set_position(&mut self, x: f32, y: f32, z: f32) {
        self.transform.position = Vector3::new(x, y, z);
    }

    pub fn position(&self) -> Vector3<f32> {
        self.transform.position
    }
}
