//! Scene data structures: geometry, materials, lights, instances and the scene graph.
//!
//! - `model` contains box geometry, Phong materials and meshes
//! - `light` contains point, directional and spot lights
//! - `instance` holds per-instance transformation data
//! - `scene_graph` holds the lights and meshes of one scene
//! - `texture` wraps the depth buffer

pub mod instance;
pub mod light;
pub mod model;
pub mod scene_graph;
pub mod texture;
