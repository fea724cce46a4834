//! Camera controls driven by window input.

pub mod orbit;

pub use orbit::{DragState, OrbitControls};
