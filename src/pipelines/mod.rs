//! Render pipelines and their uniform resources.
//!
//! - `basic` builds the Blinn-Phong pipeline used for all meshes
//! - `light` packs scene lights into the light uniform

pub mod basic;
pub mod light;
