//! The box-grid scene and its frame loop.
//!
//! [`SceneController`] owns everything the demo animates: the scene graph
//! with its lights and boxes, the camera and the orbit controls. It is generic
//! over the [`Renderer`] so it can be driven without a GPU.

use std::sync::Arc;

use cgmath::Point3;
use winit::{event::WindowEvent, window::Window};

use crate::{
    camera::PerspectiveCamera,
    config::{
        self, BOX_SIZE, CONTAINER_SELECTOR, DIRECTIONAL_LIGHT_COLOR, GRID_EXTENT, GRID_STEP,
        POINT_LIGHT_COLOR, ROTATION_STEP, SPOT_LIGHT_ANGLE, SPOT_LIGHT_COLOR, SPOT_LIGHT_DECAY,
        SPOT_LIGHT_PENUMBRA, Viewport,
    },
    controls::OrbitControls,
    data_structures::{
        light::{DirectionalLight, PointLight, SpotLight},
        model::{Geometry, Mesh, PhongMaterial},
        scene_graph::{LightHandle, MeshHandle, Scene},
    },
    error::SetupError,
    render::Renderer,
};

/// Schedules the next frame. Requests are idempotent until the frame runs.
pub trait FrameScheduler {
    fn request_frame(&self);
}

impl FrameScheduler for Window {
    fn request_frame(&self) {
        self.request_redraw();
    }
}

pub struct SceneController<R: Renderer> {
    renderer: R,
    scene: Scene,
    camera: PerspectiveCamera,
    controls: OrbitControls,
    geometry: Arc<Geometry>,
    material: Arc<PhongMaterial>,
    boxes: Vec<MeshHandle>,
    lights: Vec<LightHandle>,
    viewport: Viewport,
    running: bool,
    frames: u64,
}

impl<R: Renderer> SceneController<R> {
    /// Configure `renderer`, attach it to the host container and build the scene.
    ///
    /// Fails if a configured colour does not parse or the renderer cannot be
    /// attached, e.g. because the container element does not exist.
    pub fn init(mut renderer: R, viewport: Viewport) -> Result<Self, SetupError> {
        let config = config::scene_config(viewport)?;

        renderer.set_clear_color(config.renderer.clear_color);
        renderer.set_size(Viewport::new(config.renderer.width, config.renderer.height));
        renderer.attach(CONTAINER_SELECTOR)?;

        let mut scene = Scene::new();
        let lights = add_lights(&mut scene);

        let camera = PerspectiveCamera::from_params(&config.camera);

        let geometry = Arc::new(Geometry::new_box(BOX_SIZE, BOX_SIZE, BOX_SIZE));
        let material = Arc::new(PhongMaterial::new(config.material.color));
        let boxes = add_box_grid(&mut scene, &geometry, &material);

        let controls = OrbitControls::new(&camera, viewport);

        log::info!(
            "scene built: {} boxes, {} lights, viewport {}x{}",
            boxes.len(),
            lights.len(),
            viewport.width,
            viewport.height
        );

        Ok(Self {
            renderer,
            scene,
            camera,
            controls,
            geometry,
            material,
            boxes,
            lights,
            viewport,
            running: true,
            frames: 0,
        })
    }

    /// Run one frame: schedule the next one, apply pending camera input,
    /// spin every box and draw.
    pub fn render<S: FrameScheduler + ?Sized>(&mut self, scheduler: &S) {
        if self.running {
            scheduler.request_frame();
        }

        self.controls.update(&mut self.camera);

        self.scene.for_each_mesh_mut(&self.boxes, |mesh| {
            mesh.transform.rotation.x += ROTATION_STEP;
            mesh.transform.rotation.y += ROTATION_STEP;
        });

        if let Err(err) = self.renderer.render(&self.scene, &self.camera) {
            log::error!("Unable to render frame {}: {}", self.frames, err);
        }
        self.frames += 1;
    }

    /// Match the renderer, camera and controls to a new output size.
    pub fn resize(&mut self, viewport: Viewport) {
        if viewport.is_empty() {
            log::debug!("ignoring resize to {}x{}", viewport.width, viewport.height);
            return;
        }
        if viewport == self.viewport {
            return;
        }
        self.viewport = viewport;

        self.renderer.set_size(viewport);

        self.camera.set_aspect(config::camera_params(viewport).aspect);
        self.camera.update_projection_matrix();

        self.controls.set_element_size(viewport);
        log::debug!("resized to {}x{}", viewport.width, viewport.height);
    }

    /// Forward window input to the orbit controls. Returns `true` if it was used.
    pub fn handle_window_event(&mut self, event: &WindowEvent) -> bool {
        self.controls.handle_window_event(event)
    }

    /// Stop requesting frames. A frame in progress still completes.
    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Number of frames rendered so far.
    pub fn frame_count(&self) -> u64 {
        self.frames
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn camera(&self) -> &PerspectiveCamera {
        &self.camera
    }

    pub fn controls(&self) -> &OrbitControls {
        &self.controls
    }

    pub fn controls_mut(&mut self) -> &mut OrbitControls {
        &mut self.controls
    }

    /// Handles of the boxes in creation order.
    pub fn boxes(&self) -> &[MeshHandle] {
        &self.boxes
    }

    pub fn lights(&self) -> &[LightHandle] {
        &self.lights
    }

    pub fn geometry(&self) -> &Arc<Geometry> {
        &self.geometry
    }

    pub fn material(&self) -> &Arc<PhongMaterial> {
        &self.material
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }
}

fn add_lights(scene: &mut Scene) -> Vec<LightHandle> {
    let mut point = PointLight::new(POINT_LIGHT_COLOR, 1.0);
    point.position = Point3::new(200.0, -150.0, 0.0);

    let mut directional = DirectionalLight::new(DIRECTIONAL_LIGHT_COLOR, 1.0);
    directional.position = Point3::new(-1.0, 0.0, 0.0);
    directional.target = Point3::new(0.0, 0.0, 0.0);

    let mut spot = SpotLight::new(SPOT_LIGHT_COLOR, 1.0);
    spot.position = Point3::new(0.0, 40.0, 200.0);
    spot.target = Point3::new(0.0, 0.0, 0.0);
    spot.angle = SPOT_LIGHT_ANGLE;
    spot.penumbra = SPOT_LIGHT_PENUMBRA;
    spot.decay = SPOT_LIGHT_DECAY;
    spot.distance = 0.0;

    vec![scene.add(point), scene.add(directional), scene.add(spot)]
}

/// Lay out the boxes column by column: `x` is the outer loop, `y` the inner one.
fn add_box_grid(
    scene: &mut Scene,
    geometry: &Arc<Geometry>,
    material: &Arc<PhongMaterial>,
) -> Vec<MeshHandle> {
    let offset = (GRID_EXTENT / 2) as f32;
    let mut handles = Vec::new();
    for x in (0..=GRID_EXTENT).step_by(GRID_STEP as usize) {
        for y in (0..=GRID_EXTENT).step_by(GRID_STEP as usize) {
            let mut mesh = Mesh::new(geometry.clone(), material.clone());
            mesh.set_position(x as f32 - offset, y as f32 - offset, 0.0);
            handles.push(scene.add(mesh));
        }
    }
    handles
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_is_ten_by_ten_and_centred() {
        let mut scene = Scene::new();
        let geometry = Arc::new(Geometry::new_box(BOX_SIZE, BOX_SIZE, BOX_SIZE));
        let material = Arc::new(PhongMaterial::default());
        let handles = add_box_grid(&mut scene, &geometry, &material);
        assert_eq!(handles.len(), 100);

        let first = scene.mesh(handles[0]).map(Mesh::position);
        let last = scene.mesh(handles[99]).map(Mesh::position);
        assert_eq!(first, Some(cgmath::Vector3::new(-225.0, -225.0, 0.0)));
        assert_eq!(last, Some(cgmath::Vector3::new(225.0, 225.0, 0.0)));
    }

    #[test]
    fn three_lights_in_fixed_order() {
        let mut scene = Scene::new();
        let handles = add_lights(&mut scene);
        let colours: Vec<u32> = handles
            .iter()
            .filter_map(|handle| scene.light(*handle))
            .map(|light| light.color().to_hex())
            .collect();
        assert_eq!(
            colours,
            vec![POINT_LIGHT_COLOR, DIRECTIONAL_LIGHT_COLOR, SPOT_LIGHT_COLOR]
        );
    }
}
