//! box-grid
//!
//! A 10x10 grid of Phong-lit boxes spinning in front of three coloured lights,
//! with an orbit camera. Runs natively in a window and in the browser, where
//! the canvas is placed inside the `#webgl` element.
//!
//! High-level modules
//! - `config`: scene parameters as pure functions of the viewport
//! - `camera`: perspective camera and its uniform
//! - `controls`: orbit controls driven by pointer and wheel input
//! - `data_structures`: scene graph, meshes, lights, instances, textures
//! - `controller`: scene construction, frame loop and resize handling
//! - `render`: the `Renderer` seam and its wgpu implementation
//! - `context`: GPU device, surface and shared resources
//! - `pipelines`: the Phong pipeline and light uniforms
//! - `flow`: the winit event loop
//!

pub mod camera;
pub mod color;
pub mod config;
pub mod context;
pub mod controller;
pub mod controls;
pub mod data_structures;
pub mod error;
pub mod flow;
pub mod pipelines;
pub mod render;

pub use camera::PerspectiveCamera;
pub use cgmath;
pub use color::Color;
pub use config::Viewport;
pub use controller::{FrameScheduler, SceneController};
pub use controls::OrbitControls;
pub use data_structures::scene_graph::{MeshHandle, Scene};
pub use error::{RenderError, SetupError};
pub use render::{GpuRenderer, Renderer};
pub use winit::event::WindowEvent;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

/// Browser entry point.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    flow::run().map_err(|err| JsValue::from_str(&format!("{:#}", err)))
}
