use super::*;
use crate::domain::errors::SceneError;
use crate::infrastructure::rendering::{FrameData, SceneRenderer};
use crate::{log_debug, log_warn};

impl SceneRenderer for WebGpuSceneRenderer {
    fn viewport(&self) -> SurfaceSize {
        self.size
    }

    fn set_viewport(&mut self, size: SurfaceSize) {
        self.reconfigure(size);
    }

    fn render(&mut self, frame: &FrameData) -> Result<(), SceneError> {
        if self.disposed {
            return Ok(());
        }

        let triangles = &frame.geometry.triangles;
        let lines = &frame.geometry.lines;
        self.ensure_capacity(triangles.len(), false);
        self.ensure_capacity(lines.len(), true);

        self.queue.write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&frame.uniforms));
        if !triangles.is_empty() {
            self.queue.write_buffer(&self.triangle_buffer, 0, bytemuck::cast_slice(triangles));
        }
        if !lines.is_empty() {
            self.queue.write_buffer(&self.line_buffer, 0, bytemuck::cast_slice(lines));
        }

        let output = match self.surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Outdated | wgpu::SurfaceError::Lost) => {
                // the next frame renders into a freshly configured surface
                self.surface.configure(&self.device, &self.config);
                return Err(SceneError::Presentation("surface lost, reconfigured".to_string()));
            }
            Err(e) => return Err(SceneError::Presentation(format!("{:?}", e))),
        };
        let view = output.texture.create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor { label: Some("Scene Encoder") });
        {
            let [r, g, b, a] = frame.clear_color;
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Scene Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color { r, g, b, a }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            pass.set_bind_group(0, &self.uniform_bind_group, &[]);
            if !lines.is_empty() {
                pass.set_pipeline(&self.line_pipeline);
                pass.set_vertex_buffer(0, self.line_buffer.slice(..));
                pass.draw(0..lines.len() as u32, 0..1);
            }
            if !triangles.is_empty() {
                pass.set_pipeline(&self.triangle_pipeline);
                pass.set_vertex_buffer(0, self.triangle_buffer.slice(..));
                pass.draw(0..triangles.len() as u32, 0..1);
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        self.frames_presented += 1;
        if self.frames_presented % 600 == 0 {
            log_debug!(
                LogComponent::Infrastructure("WebGpuRenderer"),
                "{} frames presented, {} triangles",
                self.frames_presented,
                frame.geometry.triangle_count()
            );
        }
        Ok(())
    }

    fn dispose(&mut self) {
        if self.disposed {
            log_warn!(LogComponent::Infrastructure("WebGpuRenderer"), "renderer disposed twice");
            return;
        }
        self.disposed = true;
        self.triangle_buffer.destroy();
        self.line_buffer.destroy();
        self.uniform_buffer.destroy();
        self.device.destroy();
        get_logger().info(LogComponent::Infrastructure("WebGpuRenderer"), "GPU resources released");
    }

    fn detach(&mut self) {
        self.canvas.remove();
    }
}
