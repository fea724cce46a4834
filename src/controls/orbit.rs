use std::f32::consts::{PI, TAU};

use cgmath::{InnerSpace, Point3, Vector2, Vector3, Zero};
use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};

use crate::{camera::PerspectiveCamera, config::Viewport};

const EPS: f32 = 1e-6;

/// Pixels of a touchpad scroll that count as one wheel line.
const PIXELS_PER_LINE: f32 = 100.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DragState {
    None,
    Rotate,
    Dolly,
    Pan,
}

/// Radius, polar angle from +Y (`phi`) and azimuth around +Y from +Z (`theta`).
#[derive(Clone, Copy, Debug, PartialEq)]
struct Spherical {
    radius: f32,
    phi: f32,
    theta: f32,
}

impl Spherical {
    fn from_vector(v: Vector3<f32>) -> Self {
        let radius = v.magnitude();
        if radius == 0.0 {
            return Self {
                radius,
                phi: 0.0,
                theta: 0.0,
            };
        }
        Self {
            radius,
            theta: v.x.atan2(v.z),
            phi: (v.y / radius).clamp(-1.0, 1.0).acos(),
        }
    }

    fn to_vector(self) -> Vector3<f32> {
        let sin_phi_radius = self.phi.sin() * self.radius;
        Vector3::new(
            sin_phi_radius * self.theta.sin(),
            self.phi.cos() * self.radius,
            sin_phi_radius * self.theta.cos(),
        )
    }
}

/// Orbits a camera around a target point.
///
/// Left drag rotates, middle drag and the wheel dolly, right drag pans.
/// Input only accumulates deltas; [`OrbitControls::update`] applies them to
/// the camera once per frame.
#[derive(Clone, Debug)]
pub struct OrbitControls {
    pub target: Point3<f32>,
    pub enabled: bool,
    pub enable_damping: bool,
    pub damping_factor: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub pan_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    pub min_polar_angle: f32,
    pub max_polar_angle: f32,
    element: Viewport,
    theta_delta: f32,
    phi_delta: f32,
    scale: f32,
    pan_pixels: Vector2<f32>,
    pan_offset: Vector3<f32>,
    drag: DragState,
    cursor: Option<Vector2<f32>>,
}

impl OrbitControls {
    /// Bind to `camera`, orbiting around the point it currently looks at.
    /// `element` is the size of the surface receiving pointer input.
    pub fn new(camera: &PerspectiveCamera, element: Viewport) -> Self {
        Self {
            target: camera.target,
            enabled: true,
            enable_damping: false,
            damping_factor: 0.05,
            rotate_speed: 1.0,
            zoom_speed: 1.0,
            pan_speed: 1.0,
            min_distance: 0.0,
            max_distance: f32::INFINITY,
            min_polar_angle: 0.0,
            max_polar_angle: PI,
            element,
            theta_delta: 0.0,
            phi_delta: 0.0,
            scale: 1.0,
            pan_pixels: Vector2::zero(),
            pan_offset: Vector3::zero(),
            drag: DragState::None,
            cursor: None,
        }
    }

    pub fn set_element_size(&mut self, element: Viewport) {
        self.element = element;
    }

    pub fn element_size(&self) -> Viewport {
        self.element
    }

    pub fn drag_state(&self) -> DragState {
        self.drag
    }

    pub fn rotate_left(&mut self, angle: f32) {
        self.theta_delta -= angle;
    }

    pub fn rotate_up(&mut self, angle: f32) {
        self.phi_delta -= angle;
    }

    /// Move closer to the target by `steps` wheel lines; negative steps move away.
    pub fn dolly_in(&mut self, steps: f32) {
        self.scale *= self.zoom_scale().powf(steps);
    }

    pub fn dolly_out(&mut self, steps: f32) {
        self.dolly_in(-steps);
    }

    fn zoom_scale(&self) -> f32 {
        0.95_f32.powf(self.zoom_speed)
    }

    fn element_height(&self) -> f32 {
        self.element.height.max(1) as f32
    }

    pub fn rotate_by_pixels(&mut self, dx: f32, dy: f32) {
        let height = self.element_height();
        self.rotate_left(TAU * dx / height * self.rotate_speed);
        self.rotate_up(TAU * dy / height * self.rotate_speed);
    }

    /// Dragging down moves away from the target, dragging up moves closer.
    pub fn dolly_by_pixels(&mut self, dy: f32) {
        if dy > 0.0 {
            self.dolly_out(1.0);
        } else if dy < 0.0 {
            self.dolly_in(1.0);
        }
    }

    /// Screen-space pan, converted to world units on the next update.
    pub fn pan_by_pixels(&mut self, dx: f32, dy: f32) {
        self.pan_pixels += Vector2::new(dx, dy) * self.pan_speed;
    }

    pub fn pointer_down(&mut self, drag: DragState) {
        if self.enabled {
            self.drag = drag;
        }
    }

    pub fn pointer_up(&mut self) {
        self.drag = DragState::None;
    }

    pub fn pointer_move(&mut self, x: f32, y: f32) {
        let position = Vector2::new(x, y);
        if let Some(last) = self.cursor {
            let delta = position - last;
            match self.drag {
                DragState::Rotate => self.rotate_by_pixels(delta.x, delta.y),
                DragState::Dolly => self.dolly_by_pixels(delta.y),
                DragState::Pan => self.pan_by_pixels(delta.x, delta.y),
                DragState::None => (),
            }
        }
        self.cursor = Some(position);
    }

    /// Feed a winit window event. Returns `true` if the event was used.
    pub fn handle_window_event(&mut self, event: &WindowEvent) -> bool {
        if !self.enabled {
            return false;
        }
        match event {
            WindowEvent::MouseInput { state, button, .. } => {
                match (button, state) {
                    (MouseButton::Left, ElementState::Pressed) => self.pointer_down(DragState::Rotate),
                    (MouseButton::Middle, ElementState::Pressed) => self.pointer_down(DragState::Dolly),
                    (MouseButton::Right, ElementState::Pressed) => self.pointer_down(DragState::Pan),
                    (_, ElementState::Released) => self.pointer_up(),
                    _ => return false,
                }
                true
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.pointer_move(position.x as f32, position.y as f32);
                self.drag != DragState::None
            }
            WindowEvent::CursorLeft { .. } => {
                self.cursor = None;
                false
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let lines = match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    MouseScrollDelta::PixelDelta(position) => position.y as f32 / PIXELS_PER_LINE,
                };
                self.dolly_in(lines);
                true
            }
            _ => false,
        }
    }

    fn has_pending_motion(&self) -> bool {
        self.theta_delta.abs() > EPS
            || self.phi_delta.abs() > EPS
            || (self.scale - 1.0).abs() > EPS
            || self.pan_pixels.magnitude2() > EPS
            || self.pan_offset.magnitude2() > EPS * EPS
    }

    fn pan_pixels_to_world(&self, camera: &PerspectiveCamera) -> Vector3<f32> {
        if self.pan_pixels.is_zero() {
            return Vector3::zero();
        }
        let offset = camera.position - self.target;
        // half of the visible height at the target's distance
        let target_distance = offset.magnitude() * (camera.fovy.to_radians() / 2.0).tan();
        let forward = camera.target - camera.position;
        if forward.magnitude2() == 0.0 {
            return Vector3::zero();
        }
        let forward = forward.normalize();
        let right = forward.cross(camera.up);
        if right.magnitude2() == 0.0 {
            return Vector3::zero();
        }
        let right = right.normalize();
        let up = right.cross(forward);
        let height = self.element_height();
        right * (-2.0 * self.pan_pixels.x * target_distance / height)
            + up * (2.0 * self.pan_pixels.y * target_distance / height)
    }

    /// Apply the accumulated input to `camera`. Returns `true` if the camera moved.
    ///
    /// Without pending input the camera is left untouched. With damping
    /// enabled the deltas decay over the following frames instead of being
    /// applied at once.
    pub fn update(&mut self, camera: &mut PerspectiveCamera) -> bool {
        if !self.has_pending_motion() {
            return false;
        }
        self.pan_offset += self.pan_pixels_to_world(camera);
        self.pan_pixels = Vector2::zero();

        let mut spherical = Spherical::from_vector(camera.position - self.target);
        let step = if self.enable_damping {
            self.damping_factor
        } else {
            1.0
        };
        spherical.theta += self.theta_delta * step;
        spherical.phi += self.phi_delta * step;

        let min_phi = self.min_polar_angle.max(EPS);
        let max_phi = self.max_polar_angle.min(PI - EPS);
        spherical.phi = spherical.phi.clamp(min_phi, max_phi);
        spherical.radius = (spherical.radius * self.scale).clamp(self.min_distance, self.max_distance);

        self.target += self.pan_offset * step;

        camera.set_position(self.target + spherical.to_vector());
        camera.look_at(self.target);

        if self.enable_damping {
            self.theta_delta *= 1.0 - self.damping_factor;
            self.phi_delta *= 1.0 - self.damping_factor;
            self.pan_offset *= 1.0 - self.damping_factor;
        } else {
            self.theta_delta = 0.0;
            self.phi_delta = 0.0;
            self.pan_offset = Vector3::zero();
        }
        self.scale = 1.0;
        true
    }
}

#[cfg(test)]
mod tests {
    use cgmath::MetricSpace;

    use super::*;
    use crate::config::{Viewport, camera_params};

    fn setup() -> (PerspectiveCamera, OrbitControls) {
        let viewport = Viewport::new(800, 600);
        let camera = PerspectiveCamera::from_params(&camera_params(viewport));
        let controls = OrbitControls::new(&camera, viewport);
        (camera, controls)
    }

    #[test]
    fn idle_update_leaves_the_camera_alone() {
        let (mut camera, mut controls) = setup();
        let before = camera.position;
        for _ in 0..10 {
            assert!(!controls.update(&mut camera));
        }
        assert_eq!(camera.position, before);
    }

    #[test]
    fn rotation_keeps_the_distance_to_the_target() {
        let (mut camera, mut controls) = setup();
        let radius = camera.position.distance(controls.target);
        controls.rotate_left(0.5);
        controls.rotate_up(0.2);
        assert!(controls.update(&mut camera));
        assert!((camera.position.distance(controls.target) - radius).abs() < 1e-2);
        assert_eq!(camera.target, controls.target);
    }

    #[test]
    fn dolly_in_moves_closer() {
        let (mut camera, mut controls) = setup();
        let radius = camera.position.distance(controls.target);
        controls.dolly_in(3.0);
        controls.update(&mut camera);
        let expected = radius * 0.95_f32.powi(3);
        assert!((camera.position.distance(controls.target) - expected).abs() < 1e-2);
    }

    #[test]
    fn distance_limits_are_enforced() {
        let (mut camera, mut controls) = setup();
        controls.max_distance = 100.0;
        controls.dolly_out(1.0);
        controls.update(&mut camera);
        assert!((camera.position.distance(controls.target) - 100.0).abs() < 1e-3);
    }

    #[test]
    fn polar_angle_never_flips_over_the_pole() {
        let (mut camera, mut controls) = setup();
        controls.rotate_up(10.0);
        controls.update(&mut camera);
        let offset = camera.position - controls.target;
        assert!(offset.y > 0.0);
        assert!(offset.x.is_finite() && offset.z.is_finite());
    }

    #[test]
    fn left_drag_rotates_around_the_target() {
        let (mut camera, mut controls) = setup();
        controls.pointer_move(100.0, 100.0);
        controls.pointer_down(DragState::Rotate);
        controls.pointer_move(160.0, 100.0);
        controls.pointer_up();
        assert!(controls.update(&mut camera));
        assert!(camera.position.x.abs() > 1.0);
    }

    #[test]
    fn middle_drag_dollies_per_move() {
        let (mut camera, mut controls) = setup();
        let radius = camera.position.distance(controls.target);
        controls.pointer_move(100.0, 100.0);
        controls.pointer_down(DragState::Dolly);
        controls.pointer_move(100.0, 110.0);
        controls.pointer_move(100.0, 130.0);
        controls.pointer_up();
        assert!(controls.update(&mut camera));
        let expected = radius / 0.95_f32.powi(2);
        assert!((camera.position.distance(controls.target) - expected).abs() < 1e-2);

        controls.pointer_down(DragState::Dolly);
        controls.pointer_move(100.0, 90.0);
        controls.update(&mut camera);
        assert!((camera.position.distance(controls.target) - expected * 0.95).abs() < 1e-2);
    }

    #[test]
    fn moving_without_a_button_does_nothing() {
        let (mut camera, mut controls) = setup();
        controls.pointer_move(0.0, 0.0);
        controls.pointer_move(50.0, 50.0);
        assert!(!controls.update(&mut camera));
    }

    #[test]
    fn pan_shifts_target_and_camera_together() {
        let (mut camera, mut controls) = setup();
        let offset_before = camera.position - controls.target;
        controls.pan_by_pixels(-40.0, 0.0);
        controls.update(&mut camera);
        assert!(controls.target.x > 0.0);
        let offset_after = camera.position - controls.target;
        assert!((offset_after - offset_before).magnitude() < 1e-2);
    }

    #[test]
    fn damping_spreads_motion_over_frames() {
        let (mut camera, mut controls) = setup();
        controls.enable_damping = true;
        controls.rotate_left(1.0);
        controls.update(&mut camera);
        let first = camera.position;
        assert!(controls.update(&mut camera));
        assert_ne!(camera.position, first);
    }

    #[test]
    fn disabled_controls_ignore_drags() {
        let (_, mut controls) = setup();
        controls.enabled = false;
        controls.pointer_down(DragState::Rotate);
        assert_eq!(controls.drag_state(), DragState::None);
    }
}
