//! The boundary between the backdrop engine and whatever draws it.
//!
//! The engine never talks to a GPU directly. Each tick it hands a borrowed
//! [`FrameView`] to a [`RenderHost`]. The bundled host is
//! [`crate::gpu::GpuHost`]; tests use a recording host, and a backdrop with
//! no host at all keeps animating without presenting anything.

use glam::Mat4;

use crate::effects::Segment;
use crate::error::HostError;
use crate::field::Particle;

/// Everything a host needs to draw one frame. Borrowed from the backdrop.
#[derive(Debug, Clone, Copy)]
pub struct FrameView<'a> {
    pub particles: &'a [Particle],
    /// Cloud rotation, applied to particles and segments alike.
    pub model: Mat4,
    pub view_proj: Mat4,
    /// Bolt segments in the cloud's local space. Empty when not visible.
    pub segments: &'a [Segment],
    /// Whether the segment layer is shown this frame.
    pub segments_visible: bool,
}

/// A presentation surface for the backdrop.
pub trait RenderHost {
    /// Upload and draw a frame.
    fn present(&mut self, frame: &FrameView<'_>) -> Result<(), HostError>;

    /// The surface changed size.
    fn resize(&mut self, width: u32, height: u32);

    /// Release the surface. Called exactly once, when the backdrop is unmounted.
    fn detach(&mut self);
}
