//! Error types for studiofx.
//!
//! Nothing here is fatal to the process on its own: render errors are logged
//! and skipped, assistant failures become chat messages. Only the windowed
//! binary turns a [`RunError`] into a non-zero exit.

use thiserror::Error;

/// Errors that can occur while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("Failed to read configuration file: {0}")]
    Io(#[from] std::io::Error),
    /// The file is not valid JSON for [`crate::config::StudioConfig`].
    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),
    /// A value is out of its accepted range.
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Errors raised by a rendering host.
#[derive(Debug, Error)]
pub enum HostError {
    /// Failed to create a surface for rendering.
    #[error("Failed to create GPU surface: {0}")]
    SurfaceCreation(#[from] wgpu::CreateSurfaceError),
    /// No compatible GPU adapter found.
    #[error("No compatible GPU adapter found. Ensure your system has a GPU with WebGPU/Vulkan/Metal/DX12 support.")]
    NoAdapter,
    /// Failed to create GPU device.
    #[error("Failed to create GPU device: {0}")]
    DeviceCreation(#[from] wgpu::RequestDeviceError),
    /// The surface was lost or outdated and must be reconfigured.
    #[error("Render surface lost")]
    SurfaceLost,
    /// The GPU ran out of memory; the host cannot continue.
    #[error("GPU out of memory")]
    OutOfMemory,
    /// Any other presentation failure. The frame is dropped.
    #[error("Render error: {0}")]
    Other(String),
}

impl From<wgpu::SurfaceError> for HostError {
    fn from(e: wgpu::SurfaceError) -> Self {
        match e {
            wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated => HostError::SurfaceLost,
            wgpu::SurfaceError::OutOfMemory => HostError::OutOfMemory,
            other => HostError::Other(other.to_string()),
        }
    }
}

/// Errors that end a `studiofx` run.
#[derive(Debug, Error)]
pub enum RunError {
    /// Failed to create or run the event loop.
    #[error("Failed to create event loop: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),
    /// Failed to create the window.
    #[error("Failed to create window: {0}")]
    Window(#[from] winit::error::OsError),
    /// The rendering host failed beyond recovery.
    #[error("Host error: {0}")]
    Host(#[from] HostError),
    /// The assistant runtime could not start or stdin failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Errors returned by asset generation collaborators.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    /// A single attempt failed.
    #[error("{service} failed: {reason}")]
    Failed { service: String, reason: String },
    /// The collaborator does not offer this operation.
    #[error("{service} does not support {operation}")]
    Unsupported {
        service: String,
        operation: &'static str,
    },
    /// Primary and fallback both failed. Terminal; nothing retries after this.
    #[error("All image generation services failed (primary: {primary}; fallback: {fallback})")]
    Exhausted { primary: String, fallback: String },
}

impl GenerationError {
    pub fn failed(service: impl Into<String>, reason: impl Into<String>) -> Self {
        GenerationError::Failed {
            service: service.into(),
            reason: reason.into(),
        }
    }
}
