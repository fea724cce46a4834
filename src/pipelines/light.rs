use wgpu::util::DeviceExt;

use crate::data_structures::light::Light;

/// Upper bound per light type; must match `MAX_LIGHTS` in `phong.wgsl`.
pub const MAX_LIGHTS: usize = 4;

#[derive(Debug)]
pub struct LightResources {
    pub uniform: LightUniform,
    pub buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
    pub bind_group_layout: wgpu::BindGroupLayout,
}

impl LightResources {
    pub fn new(device: &wgpu::Device) -> Self {
        let uniform = LightUniform::default();
        let buffer = mk_buffer(device, uniform);
        let bind_group_layout = mk_bind_group_layout(device);
        let bind_group = mk_bind_group(device, &bind_group_layout, &buffer);
        Self {
            uniform,
            buffer,
            bind_group,
            bind_group_layout,
        }
    }

    pub fn write(&mut self, queue: &wgpu::Queue, lights: &[Light]) {
        self.uniform = LightUniform::from_lights(lights);
        queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(&[self.uniform]));
    }
}

// Colours are linear and premultiplied by the light's intensity.
// Uniforms require 16 byte (4 float) spacing, hence the explicit padding fields.

#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct PointLightRaw {
    position: [f32; 3],
    distance: f32,
    color: [f32; 3],
    decay: f32,
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct DirectionalLightRaw {
    direction: [f32; 3],
    _padding: u32,
    color: [f32; 3],
    _padding2: u32,
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SpotLightRaw {
    position: [f32; 3],
    distance: f32,
    color: [f32; 3],
    decay: f32,
    direction: [f32; 3],
    cone_cos: f32,
    penumbra_cos: f32,
    _padding: [u32; 3],
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightUniform {
    /// Number of active point, directional and spot lights; the last slot is unused.
    counts: [u32; 4],
    points: [PointLightRaw; MAX_LIGHTS],
    directionals: [DirectionalLightRaw; MAX_LIGHTS],
    spots: [SpotLightRaw; MAX_LIGHTS],
}

impl LightUniform {
    /// Pack `lights` in order. Lights beyond [`MAX_LIGHTS`] of one type are dropped.
    pub fn from_lights(lights: &[Light]) -> Self {
        let mut uniform = Self::default();
        let mut dropped = 0;
        for light in lights {
            match light {
                Light::Point(point) => {
                    let slot = uniform.counts[0] as usize;
                    if slot >= MAX_LIGHTS {
                        dropped += 1;
                        continue;
                    }
                    uniform.points[slot] = PointLightRaw {
                        position: point.position.into(),
                        distance: point.distance,
                        color: point.color.scaled(point.intensity),
                        decay: point.decay,
                    };
                    uniform.counts[0] += 1;
                }
                Light::Directional(directional) => {
                    let slot = uniform.counts[1] as usize;
                    if slot >= MAX_LIGHTS {
                        dropped += 1;
                        continue;
                    }
                    uniform.directionals[slot] = DirectionalLightRaw {
                        direction: directional.direction().into(),
                        color: directional.color.scaled(directional.intensity),
                        ..Default::default()
                    };
                    uniform.counts[1] += 1;
                }
                Light::Spot(spot) => {
                    let slot = uniform.counts[2] as usize;
                    if slot >= MAX_LIGHTS {
                        dropped += 1;
                        continue;
                    }
                    uniform.spots[slot] = SpotLightRaw {
                        position: spot.position.into(),
                        distance: spot.distance,
                        color: spot.color.scaled(spot.intensity),
                        decay: spot.decay,
                        direction: spot.direction().into(),
                        cone_cos: spot.cone_cos(),
                        penumbra_cos: spot.penumbra_cos(),
                        ..Default::default()
                    };
                    uniform.counts[2] += 1;
                }
            }
        }
        if dropped > 0 {
            log::warn!(
                "{} light(s) exceed the limit of {} per type and are not rendered",
                dropped,
                MAX_LIGHTS
            );
        }
        uniform
    }

    pub fn counts(&self) -> [u32; 3] {
        [self.counts[0], self.counts[1], self.counts[2]]
    }
}

pub fn mk_buffer(device: &wgpu::Device, light_uniform: LightUniform) -> wgpu::Buffer {
    device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("Light Uniform Buffer"),
        contents: bytemuck::cast_slice(&[light_uniform]),
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
    })
}

pub fn mk_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }],
        label: Some("light_bind_group_layout"),
    })
}

pub fn mk_bind_group(
    device: &wgpu::Device,
    bind_group_layout: &wgpu::BindGroupLayout,
    light_buffer: &wgpu::Buffer,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        layout: bind_group_layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: light_buffer.as_entire_binding(),
        }],
        label: Some("light_bind_group"),
    })
}
