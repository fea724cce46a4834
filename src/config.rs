//! Scene parameters.
//!
//! Every parameter set is a pure function of the current [`Viewport`], so
//! values that depend on the window size (aspect ratio, surface size) are
//! recomputed on each call and never cached.

use std::f32::consts::FRAC_PI_2;

use cgmath::Point3;

use crate::color::{Color, ColorParseError};

/// CSS selector of the element the canvas is attached to on the web.
pub const CONTAINER_SELECTOR: &str = "#webgl";

/// Side length of the box grid. Boxes are placed from `0` to `GRID_EXTENT` inclusive.
pub const GRID_EXTENT: u32 = 450;
pub const GRID_STEP: u32 = 50;
pub const BOX_SIZE: f32 = 50.0;

/// Radians added to the X and Y rotation of every box per frame.
pub const ROTATION_STEP: f32 = 0.01;

pub const POINT_LIGHT_COLOR: u32 = 0xb799ff;
pub const DIRECTIONAL_LIGHT_COLOR: u32 = 0xacbcff;
pub const SPOT_LIGHT_COLOR: u32 = 0xaee2ff;

/// Background colour, in the notation the host page uses.
pub const CLEAR_COLOR: &str = "rgb(0,0,0)";

/// Size of the drawable area in physical pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Width divided by height; `1.0` for a degenerate zero-height viewport.
    pub fn aspect(&self) -> f32 {
        if self.height == 0 {
            1.0
        } else {
            self.width as f32 / self.height as f32
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

impl From<winit::dpi::PhysicalSize<u32>> for Viewport {
    fn from(size: winit::dpi::PhysicalSize<u32>) -> Self {
        Self::new(size.width, size.height)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct CameraParams {
    /// Vertical field of view in degrees.
    pub fovy: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pub position: Point3<f32>,
    pub look_at: Point3<f32>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RendererParams {
    pub clear_color: Color,
    pub width: u32,
    pub height: u32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct MaterialParams {
    pub color: Color,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SceneConfig {
    pub camera: CameraParams,
    pub renderer: RendererParams,
    pub material: MaterialParams,
}

pub fn camera_params(viewport: Viewport) -> CameraParams {
    CameraParams {
        fovy: 60.0,
        aspect: viewport.aspect(),
        near: 0.1,
        far: 1500.0,
        position: Point3::new(0.0, 2.0, 500.0),
        look_at: Point3::new(0.0, 0.0, 0.0),
    }
}

pub fn renderer_params(viewport: Viewport) -> Result<RendererParams, ColorParseError> {
    Ok(RendererParams {
        clear_color: CLEAR_COLOR.parse()?,
        width: viewport.width,
        height: viewport.height,
    })
}

pub fn material_params() -> MaterialParams {
    MaterialParams {
        color: Color::from_hex(0xffffff),
    }
}

pub fn scene_config(viewport: Viewport) -> Result<SceneConfig, ColorParseError> {
    Ok(SceneConfig {
        camera: camera_params(viewport),
        renderer: renderer_params(viewport)?,
        material: material_params(),
    })
}

/// Cone half-angle of the spot light.
pub const SPOT_LIGHT_ANGLE: f32 = FRAC_PI_2;
pub const SPOT_LIGHT_PENUMBRA: f32 = 0.5;
pub const SPOT_LIGHT_DECAY: f32 = 2.0;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aspect_follows_the_viewport_passed_in() {
        let wide = camera_params(Viewport::new(1920, 1080));
        assert!((wide.aspect - 1920.0 / 1080.0).abs() < f32::EPSILON);
        let tall = camera_params(Viewport::new(600, 1200));
        assert!((tall.aspect - 0.5).abs() < f32::EPSILON);
    }

    #[test]
    fn renderer_size_tracks_the_viewport() {
        let params = renderer_params(Viewport::new(800, 600)).expect("clear colour parses");
        assert_eq!((params.width, params.height), (800, 600));
    }

    #[test]
    fn clear_colour_is_parsed_from_css_notation() {
        assert_eq!(CLEAR_COLOR.parse::<Color>(), Ok(Color::BLACK));
        let params = renderer_params(Viewport::new(1, 1)).expect("clear colour parses");
        assert_eq!(params.clear_color, Color::BLACK);
    }

    #[test]
    fn zero_height_does_not_divide_by_zero() {
        assert_eq!(Viewport::new(640, 0).aspect(), 1.0);
        assert!(Viewport::new(640, 0).is_empty());
    }

    #[test]
    fn scene_config_bundles_all_parameter_sets() {
        let config = scene_config(Viewport::new(400, 200)).expect("clear colour parses");
        assert_eq!(config.camera.fovy, 60.0);
        assert_eq!(config.camera.position, Point3::new(0.0, 2.0, 500.0));
        assert_eq!(config.renderer.width, 400);
        assert_eq!(config.material.color, Color::WHITE);
    }
}
