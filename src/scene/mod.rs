//! The 3D trading scene: camera, environment, chart group and the lifecycle
//! that ties them to a display surface and the event bus.
//!
//! Host capabilities (surface, frame scheduling, listeners, time) are traits
//! so the same core runs in the browser and under headless tests.

pub mod bootstrap;
pub mod camera;
pub mod chart_builder;
pub mod config;
pub mod environment;

use crate::domain::errors::SceneError;
use crate::infrastructure::rendering::SceneRenderer;

pub use bootstrap::{SceneCore, SceneHandle, initialize_scene, initialize_scene_with_data};
pub use config::SceneConfig;

/// Pixel dimensions of a display surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SurfaceSize {
    pub width: u32,
    pub height: u32,
}

impl SurfaceSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn aspect(&self) -> f32 {
        if self.height == 0 { 1.0 } else { self.width as f32 / self.height as f32 }
    }
}

/// Milliseconds on a monotonic timeline.
pub trait Clock {
    fn now_ms(&self) -> f64;
}

/// Per-frame callback facility (`requestAnimationFrame` in the browser).
pub trait FrameScheduler {
    fn start(&mut self, on_frame: Box<dyn FnMut()>) -> Result<(), SceneError>;
    /// Stop scheduling; the callback is dropped.
    fn cancel(&mut self);
    fn is_running(&self) -> bool;
}

/// A registered host listener that can be removed once.
pub trait ListenerGuard {
    fn remove(self: Box<Self>);
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerInput {
    Drag { dx: f32, dy: f32 },
    Wheel { delta_y: f32 },
}

/// A mounted display surface able to host a renderer's output.
pub trait SceneSurface {
    fn size(&self) -> SurfaceSize;
    /// Hand over the renderer bound to this surface. Only succeeds once.
    fn attach_renderer(&mut self) -> Result<Box<dyn SceneRenderer>, SceneError>;
    fn frame_scheduler(&mut self) -> Result<Box<dyn FrameScheduler>, SceneError>;
    fn watch_resize(
        &mut self,
        on_resize: Box<dyn FnMut(SurfaceSize)>,
    ) -> Result<Box<dyn ListenerGuard>, SceneError>;
    fn watch_pointer(
        &mut self,
        on_pointer: Box<dyn FnMut(PointerInput)>,
    ) -> Result<Box<dyn ListenerGuard>, SceneError>;
}
