use super::*;
use crate::domain::errors::SceneError;
use wgpu::util::DeviceExt;

fn graphics_error(stage: &str, detail: impl std::fmt::Debug) -> SceneError {
    let message = format!("{}: {:?}", stage, detail);
    get_logger().error(LogComponent::Infrastructure("WebGpuRenderer"), &message);
    SceneError::GraphicsInitialization(message)
}

impl WebGpuSceneRenderer {
    pub async fn new(canvas: HtmlCanvasElement, size: SurfaceSize) -> Result<Self, SceneError> {
        if size.is_empty() {
            return Err(SceneError::InvalidDimensions { width: size.width, height: size.height });
        }
        canvas.set_width(size.width);
        canvas.set_height(size.height);

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
        let surface = instance
            .create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))
            .map_err(|e| graphics_error("failed to create surface", e))?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| graphics_error("no suitable adapter", e))?;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("Scene Device"),
                required_features: wgpu::Features::empty(),
                required_limits: adapter.limits(),
                memory_hints: wgpu::MemoryHints::default(),
                trace: wgpu::Trace::Off,
            })
            .await
            .map_err(|e| graphics_error("failed to create device", e))?;

        let caps = surface.get_capabilities(&adapter);
        let format = caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| caps.formats.first().copied())
            .ok_or_else(|| graphics_error("surface reports no formats", &caps.formats))?;
        let present_mode = caps.present_modes.first().copied().unwrap_or(wgpu::PresentMode::Fifo);
        let alpha_mode = caps.alpha_modes.first().copied().unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width,
            height: size.height,
            present_mode,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Scene Uniforms"),
            contents: bytemuck::cast_slice(&[SceneUniforms::default()]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let uniform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
            label: Some("scene_uniform_layout"),
        });

        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &uniform_layout,
            entries: &[wgpu::BindGroupEntry { binding: 0, resource: uniform_buffer.as_entire_binding() }],
            label: Some("scene_uniform_bind_group"),
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Scene Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("../scene_shader.wgsl").into()),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Scene Pipeline Layout"),
            bind_group_layouts: &[&uniform_layout],
            push_constant_ranges: &[],
        });

        let triangle_pipeline =
            create_pipeline(&device, &pipeline_layout, &shader, format, wgpu::PrimitiveTopology::TriangleList);
        let line_pipeline =
            create_pipeline(&device, &pipeline_layout, &shader, format, wgpu::PrimitiveTopology::LineList);

        let depth_view = create_depth_view(&device, size);
        let triangle_buffer = create_vertex_buffer(&device, "Triangle Buffer", INITIAL_VERTEX_CAPACITY);
        let line_buffer = create_vertex_buffer(&device, "Line Buffer", INITIAL_VERTEX_CAPACITY);

        get_logger().info(
            LogComponent::Infrastructure("WebGpuRenderer"),
            &format!("WebGPU renderer ready: {}x{}, format {:?}", size.width, size.height, format),
        );

        Ok(Self {
            canvas,
            size,
            surface,
            device,
            queue,
            config,
            triangle_pipeline,
            line_pipeline,
            uniform_buffer,
            uniform_bind_group,
            depth_view,
            triangle_buffer,
            triangle_capacity: INITIAL_VERTEX_CAPACITY,
            line_buffer,
            line_capacity: INITIAL_VERTEX_CAPACITY,
            disposed: false,
            frames_presented: 0,
        })
    }

    pub(super) fn reconfigure(&mut self, size: SurfaceSize) {
        if size.is_empty() || self.disposed {
            return;
        }
        self.size = size;
        self.canvas.set_width(size.width);
        self.canvas.set_height(size.height);
        self.config.width = size.width;
        self.config.height = size.height;
        self.surface.configure(&self.device, &self.config);
        self.depth_view = create_depth_view(&self.device, size);
    }

    /// Grow a dynamic buffer so it fits `needed` vertices.
    pub(super) fn ensure_capacity(&mut self, needed: usize, lines: bool) {
        let (buffer, capacity, label) = if lines {
            (&mut self.line_buffer, &mut self.line_capacity, "Line Buffer")
        } else {
            (&mut self.triangle_buffer, &mut self.triangle_capacity, "Triangle Buffer")
        };
        if needed <= *capacity {
            return;
        }
        let grown = needed.next_power_of_two();
        buffer.destroy();
        *buffer = create_vertex_buffer(&self.device, label, grown);
        *capacity = grown;
    }
}

fn create_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    shader: &wgpu::ShaderModule,
    format: wgpu::TextureFormat,
    topology: wgpu::PrimitiveTopology,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(match topology {
            wgpu::PrimitiveTopology::LineList => "Line Pipeline",
            _ => "Triangle Pipeline",
        }),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some("vs_main"),
            buffers: &[SceneVertex::desc()],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState { count: 1, mask: !0, alpha_to_coverage_enabled: false },
        multiview: None,
        cache: None,
    })
}

fn create_depth_view(device: &wgpu::Device, size: SurfaceSize) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Depth Texture"),
        size: wgpu::Extent3d { width: size.width, height: size.height, depth_or_array_layers: 1 },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    texture.create_view(&wgpu::TextureViewDescriptor::default())
}

fn create_vertex_buffer(device: &wgpu::Device, label: &str, vertices: usize) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some(label),
        size: (std::mem::size_of::<SceneVertex>() * vertices) as u64,
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}
