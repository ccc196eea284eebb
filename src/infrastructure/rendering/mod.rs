//! Rendering: GPU data layout, scene tessellation and the WebGPU backend.

pub mod gpu_structures;
pub mod renderer;

use crate::domain::errors::SceneError;
use crate::scene::SurfaceSize;

pub use gpu_structures::*;
pub use renderer::geometry::{FrameGeometry, build_frame, frame_uniforms};
#[cfg(target_arch = "wasm32")]
pub use renderer::WebGpuSceneRenderer;

/// Everything a backend needs to present one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameData {
    pub geometry: FrameGeometry,
    pub uniforms: SceneUniforms,
    /// Linear RGBA
    pub clear_color: [f64; 4],
}

/// Backend bound to one display surface.
///
/// Owned exclusively by the scene core; `dispose` and `detach` are called
/// once, in that order, during teardown.
pub trait SceneRenderer {
    fn viewport(&self) -> SurfaceSize;
    fn set_viewport(&mut self, size: SurfaceSize);
    fn render(&mut self, frame: &FrameData) -> Result<(), SceneError>;
    /// Release GPU buffers, pipelines and the device.
    fn dispose(&mut self);
    /// Remove the output node from the display surface.
    fn detach(&mut self);
}
