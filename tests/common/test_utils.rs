#![allow(dead_code)]

use std::cell::Cell;

use box_grid::{
    Color, FrameScheduler, PerspectiveCamera, RenderError, Renderer, Scene, SetupError, Viewport,
    config::CONTAINER_SELECTOR, data_structures::instance::Rotation,
};

/// What the renderer saw in one `render` call.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderCall {
    pub meshes: usize,
    pub lights: usize,
    pub camera_aspect: f32,
    pub camera_position: box_grid::cgmath::Point3<f32>,
    pub first_rotation: Option<Rotation>,
}

/// Renderer double that records every call instead of drawing.
pub struct RecordingRenderer {
    clear_color: Color,
    size: Viewport,
    containers: Vec<String>,
    fail_renders: bool,
    pub attached_to: Option<String>,
    pub size_history: Vec<Viewport>,
    pub renders: Vec<RenderCall>,
}

impl RecordingRenderer {
    /// A host document that has the `#webgl` container.
    pub fn new() -> Self {
        Self {
            clear_color: Color::WHITE,
            size: Viewport::new(0, 0),
            containers: vec![CONTAINER_SELECTOR.to_string()],
            fail_renders: false,
            attached_to: None,
            size_history: Vec::new(),
            renders: Vec::new(),
        }
    }

    /// A host document without any container element.
    pub fn without_container() -> Self {
        Self {
            containers: Vec::new(),
            ..Self::new()
        }
    }

    /// Records calls but reports every render as failed.
    pub fn failing() -> Self {
        Self {
            fail_renders: true,
            ..Self::new()
        }
    }
}

impl Default for RecordingRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for RecordingRenderer {
    fn set_clear_color(&mut self, color: Color) {
        self.clear_color = color;
    }

    fn clear_color(&self) -> Color {
        self.clear_color
    }

    fn set_size(&mut self, viewport: Viewport) {
        self.size = viewport;
        self.size_history.push(viewport);
    }

    fn size(&self) -> Viewport {
        self.size
    }

    fn attach(&mut self, selector: &str) -> Result<(), SetupError> {
        if self.containers.iter().any(|c| c == selector) {
            self.attached_to = Some(selector.to_string());
            Ok(())
        } else {
            Err(SetupError::ContainerMissing(selector.to_string()))
        }
    }

    fn render(&mut self, scene: &Scene, camera: &PerspectiveCamera) -> Result<(), RenderError> {
        self.renders.push(RenderCall {
            meshes: scene.meshes().len(),
            lights: scene.lights().len(),
            camera_aspect: camera.aspect,
            camera_position: camera.position,
            first_rotation: scene.meshes().first().map(|mesh| mesh.transform.rotation),
        });
        if self.fail_renders {
            Err(RenderError::Lost)
        } else {
            Ok(())
        }
    }
}

/// Scheduler double counting how often the next frame was requested.
#[derive(Debug, Default)]
pub struct CountingScheduler {
    requests: Cell<u32>,
}

impl CountingScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn requests(&self) -> u32 {
        self.requests.get()
    }
}

impl FrameScheduler for CountingScheduler {
    fn request_frame(&self) {
        self.requests.set(self.requests.get() + 1);
    }
}

pub fn approx_eq(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-4
}
