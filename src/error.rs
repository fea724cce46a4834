//! Error types shared by the controller and the renderers.

use thiserror::Error;

use crate::color::ColorParseError;

/// Failures while building the scene. These abort start-up.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("container element `{0}` not found in the host document")]
    ContainerMissing(String),
    #[error("no host document available")]
    NoDocument,
    #[error("failed to attach the render surface: {0}")]
    Attach(String),
    #[error("invalid scene colour: {0}")]
    Color(#[from] ColorParseError),
}

/// Failures of a single render call. The frame loop logs them and keeps going.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("surface lost")]
    Lost,
    #[error("surface outdated")]
    Outdated,
    #[error("timed out acquiring the next surface texture")]
    Timeout,
    #[error("out of GPU memory")]
    OutOfMemory,
    #[error("{0}")]
    Other(String),
}

impl From<wgpu::SurfaceError> for RenderError {
    fn from(err: wgpu::SurfaceError) -> Self {
        match err {
            wgpu::SurfaceError::Lost => RenderError::Lost,
            wgpu::SurfaceError::Outdated => RenderError::Outdated,
            wgpu::SurfaceError::Timeout => RenderError::Timeout,
            wgpu::SurfaceError::OutOfMemory => RenderError::OutOfMemory,
            other => RenderError::Other(other.to_string()),
        }
    }
}
