//! WebGPU backend for the scene.
//!
//! Tessellation lives in [`geometry`] and runs on every target; the wgpu
//! device, pipelines and buffers only exist in the browser build.

pub mod geometry;

#[cfg(target_arch = "wasm32")]
mod initialization;
#[cfg(target_arch = "wasm32")]
mod render_loop;

#[cfg(target_arch = "wasm32")]
use crate::{
    domain::logging::{LogComponent, get_logger},
    infrastructure::rendering::gpu_structures::{SceneUniforms, SceneVertex},
    scene::SurfaceSize,
};
#[cfg(target_arch = "wasm32")]
use web_sys::HtmlCanvasElement;

#[cfg(target_arch = "wasm32")]
const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth24Plus;

/// Initial vertex capacity of each dynamic buffer; buffers grow on demand.
#[cfg(target_arch = "wasm32")]
const INITIAL_VERTEX_CAPACITY: usize = 16 * 1024;

/// Renderer drawing the scene graph into a canvas with two pipelines:
/// lit triangles (boxes, floor, particles) and unlit lines (grid, curves).
#[cfg(target_arch = "wasm32")]
pub struct WebGpuSceneRenderer {
    canvas: HtmlCanvasElement,
    size: SurfaceSize,

    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,

    triangle_pipeline: wgpu::RenderPipeline,
    line_pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    depth_view: wgpu::TextureView,

    triangle_buffer: wgpu::Buffer,
    triangle_capacity: usize,
    line_buffer: wgpu::Buffer,
    line_capacity: usize,

    disposed: bool,
    frames_presented: u64,
}

#[cfg(target_arch = "wasm32")]
impl WebGpuSceneRenderer {
    pub async fn is_webgpu_supported() -> bool {
        if let Some(window) = web_sys::window() {
            let navigator = window.navigator();
            js_sys::Reflect::has(&navigator, &"gpu".into()).unwrap_or(false)
        } else {
            false
        }
    }
}
