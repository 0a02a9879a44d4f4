//! Video compositor facade.

use crate::fault::Fault;
use crate::video::{Plane, VgaMode};

/// Scan-out engine running on its own execution context.
///
/// Planes are owned by the compositor from `add_plane` until `stop_video`
/// returns; `stop_video` drops them.
pub trait VideoController {
    /// Append a plane. The first plane is the primary framebuffer.
    fn add_plane(&mut self, plane: Plane) -> Result<(), Fault>;

    fn start_video(&mut self, mode: &'static VgaMode, baseline: u32, scanline_buffers: u32)
        -> Result<(), Fault>;

    /// Stop scan-out and release all planes. Safe to call when not running.
    fn stop_video(&mut self);
}
