//! Instance transformation data for GPU rendering.
//!
//! Each mesh carries an [`Instance`] (position, Euler rotation, scale). Meshes
//! sharing the same geometry are drawn in one instanced call, with their
//! [`InstanceRaw`] records packed into a single vertex buffer.

use cgmath::{Matrix3, Matrix4, Rad, Vector3};

use crate::data_structures::model::{self, PhongMaterial};

/// Rotation as three independent angles, applied in X, Y, Z order.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rotation {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Rotation {
    pub const ZERO: Rotation = Rotation {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub fn to_matrix(&self) -> Matrix3<f32> {
        Matrix3::from_angle_x(Rad(self.x))
            * Matrix3::from_angle_y(Rad(self.y))
            * Matrix3::from_angle_z(Rad(self.z))
    }
}

impl Default for Rotation {
    fn default() -> Self {
        Self::ZERO
    }
}

/// Per-instance transformation: position, rotation and scale.
#[derive(Clone, Debug, PartialEq)]
pub struct Instance {
    pub position: Vector3<f32>,
    pub rotation: Rotation,
    pub scale: Vector3<f32>,
}

impl Instance {
    /// Create a new instance with identity transformation (no move, rotate, or scale).
    pub fn new() -> Self {
        Self {
            position: Vector3::new(0.0, 0.0, 0.0),
            rotation: Rotation::ZERO,
            scale: Vector3::new(1.0, 1.0, 1.0),
        }
    }

    pub fn to_matrix(&self) -> Matrix4<f32> {
        Matrix4::from_translation(self.position)
            * Matrix4::from(self.rotation.to_matrix())
            * Matrix4::from_nonuniform_scale(self.scale.x, self.scale.y, self.scale.z)
    }

    /// Pack the transform together with the material it is drawn with.
    pub fn to_raw(&self, material: &PhongMaterial) -> InstanceRaw {
        InstanceRaw {
            model: self.to_matrix().into(),
            normal: self.rotation.to_matrix().into(),
            color: material.color.to_linear(),
            shininess: material.shininess,
            specular: material.specular.to_linear(),
        }
    }
}

impl From<Vector3<f32>> for Instance {
    fn from(position: Vector3<f32>) -> Self {
        Instance {
            position,
            ..Default::default()
        }
    }
}

impl Default for Instance {
    fn default() -> Self {
        Self::new()
    }
}

/**
 * The raw instance is the actual data stored on the GPU
 */
#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct InstanceRaw {
    pub(crate) model: [[f32; 4]; 4],
    normal: [[f32; 3]; 3],
    color: [f32; 3],
    shininess: f32,
    specular: [f32; 3],
}

/**
 * Stride layout: model matrix as four vec4s, normal matrix as three vec3s,
 * then the material: linear diffuse colour, shininess and linear specular colour.
 */
impl model::Vertex for InstanceRaw {
    fn desc() -> wgpu::VertexBufferLayout<'static> {
        use std::mem;
        wgpu::VertexBufferLayout {
            array_stride: mem::size_of::<InstanceRaw>() as wgpu::BufferAddress,
            // Advance once per instance instead of once per vertex
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 5,
                    format: wgpu::VertexFormat::Float32x4,
                },
                // A mat4 takes up 4 vertex slots as it is technically 4 vec4s.
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 4]>() as wgpu::BufferAddress,
                    shader_location: 6,
                    format: wgpu::VertexFormat::Float32x4,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 8]>() as wgpu::BufferAddress,
                    shader_location: 7,
                    format: wgpu::VertexFormat::Float32x4,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 12]>() as wgpu::BufferAddress,
                    shader_location: 8,
                    format: wgpu::VertexFormat::Float32x4,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 16]>() as wgpu::BufferAddress,
                    shader_location: 9,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 19]>() as wgpu::BufferAddress,
                    shader_location: 10,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 22]>() as wgpu::BufferAddress,
                    shader_location: 11,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 25]>() as wgpu::BufferAddress,
                    shader_location: 12,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 28]>() as wgpu::BufferAddress,
                    shader_location: 13,
                    format: wgpu::VertexFormat::Float32,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 29]>() as wgpu::BufferAddress,
                    shader_location: 14,
                    format: wgpu::VertexFormat::Float32x3,
                },
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use cgmath::{Transform, Point3};

    use super::*;

    #[test]
    fn identity_instance_leaves_points_alone() {
        let p = Instance::new().to_matrix().transform_point(Point3::new(1.0, 2.0, 3.0));
        assert_eq!(p, Point3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn translation_is_applied_after_rotation() {
        let mut instance = Instance::from(Vector3::new(-225.0, 100.0, 0.0));
        instance.rotation.y = std::f32::consts::FRAC_PI_2;
        let p = instance.to_matrix().transform_point(Point3::new(1.0, 0.0, 0.0));
        assert!((p.x + 225.0).abs() < 1e-4);
        assert!((p.y - 100.0).abs() < 1e-4);
        assert!((p.z + 1.0).abs() < 1e-4);
    }

    #[test]
    fn raw_layout_matches_attribute_offsets() {
        assert_eq!(std::mem::size_of::<InstanceRaw>(), 32 * 4);
    }
}
