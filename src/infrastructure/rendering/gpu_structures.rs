use bytemuck::{Pod, Zeroable};

/// World-space vertex shared by the triangle and line pipelines
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct SceneVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    /// Linear RGB plus opacity
    pub color: [f32; 4],
    /// Emissive strength added on top of lighting
    pub emissive: f32,
    /// 1.0 = lit by scene lights, 0.0 = unlit (lines, points, grid)
    pub lit: f32,
}

impl SceneVertex {
    pub fn lit(position: [f32; 3], normal: [f32; 3], color: [f32; 4], emissive: f32) -> Self {
        Self { position, normal, color, emissive, lit: 1.0 }
    }

    pub fn unlit(position: [f32; 3], color: [f32; 4]) -> Self {
        Self { position, normal: [0.0, 1.0, 0.0], color, emissive: 0.0, lit: 0.0 }
    }

    /// Vertex buffer descriptor for wgpu
    pub fn desc<'a>() -> wgpu::VertexBufferLayout<'a> {
        const F32: wgpu::BufferAddress = std::mem::size_of::<f32>() as wgpu::BufferAddress;
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<SceneVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                // position
                wgpu::VertexAttribute { offset: 0, shader_location: 0, format: wgpu::VertexFormat::Float32x3 },
                // normal
                wgpu::VertexAttribute { offset: 3 * F32, shader_location: 1, format: wgpu::VertexFormat::Float32x3 },
                // color
                wgpu::VertexAttribute { offset: 6 * F32, shader_location: 2, format: wgpu::VertexFormat::Float32x4 },
                // emissive
                wgpu::VertexAttribute { offset: 10 * F32, shader_location: 3, format: wgpu::VertexFormat::Float32 },
                // lit
                wgpu::VertexAttribute { offset: 11 * F32, shader_location: 4, format: wgpu::VertexFormat::Float32 },
            ],
        }
    }
}

/// Per-frame uniform block. Every field is a 16-byte row for WGSL layout.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct SceneUniforms {
    pub view_proj: [[f32; 4]; 4],
    /// xyz = camera position
    pub camera_position: [f32; 4],
    /// rgb = ambient colour, a = intensity
    pub ambient: [f32; 4],
    /// xyz = point light position, w = intensity
    pub point_light: [f32; 4],
    /// xyz = direction towards the light, w = intensity
    pub directional_light: [f32; 4],
    /// rgb = fog colour
    pub fog_color: [f32; 4],
    /// x = near, y = far
    pub fog_range: [f32; 4],
}

impl Default for SceneUniforms {
    fn default() -> Self {
        Self {
            view_proj: glam::Mat4::IDENTITY.to_cols_array_2d(),
            camera_position: [0.0, 0.0, 0.0, 1.0],
            ambient: [1.0, 1.0, 1.0, 0.4],
            point_light: [0.0; 4],
            directional_light: [0.0; 4],
            fog_color: [0.0, 0.0, 0.0, 1.0],
            fog_range: [15.0, 30.0, 0.0, 0.0],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_block_is_16_byte_aligned() {
        assert_eq!(std::mem::size_of::<SceneUniforms>() % 16, 0);
        assert_eq!(std::mem::size_of::<SceneVertex>(), 12 * 4);
    }
}
