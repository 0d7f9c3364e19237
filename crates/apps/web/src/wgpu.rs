#[cfg(target_arch = "wasm32")]
mod imp {
    use std::borrow::Cow;
    use wasm_bindgen::JsCast;
    use wasm_bindgen::prelude::*;

    use foundation::math::Vec3;
    use gpu::{MeshVertex, PerspectiveCamera, PointVertex, RenderFrame};

    const MESH_SHADER: &str = r#"
struct Globals {
  view_proj: mat4x4<f32>,
  cam_right: vec4<f32>,
  cam_up: vec4<f32>,
};
@group(0) @binding(0) var<uniform> globals: Globals;

struct VsOut {
  @builtin(position) pos: vec4<f32>,
  @location(0) color: vec4<f32>,
};

@vertex
fn vs_main(@location(0) position: vec3<f32>, @location(1) color: vec4<f32>) -> VsOut {
  var out: VsOut;
  out.pos = globals.view_proj * vec4<f32>(position, 1.0);
  out.color = color;
  return out;
}

@fragment
fn fs_main(in: VsOut) -> @location(0) vec4<f32> {
  return in.color;
}
"#;

    // Camera-facing quads sized in world units; the corner doubles as a
    // disc coordinate for the soft round edge.
    const SPRITE_SHADER: &str = r#"
struct Globals {
  view_proj: mat4x4<f32>,
  cam_right: vec4<f32>,
  cam_up: vec4<f32>,
};
@group(0) @binding(0) var<uniform> globals: Globals;

struct VsOut {
  @builtin(position) pos: vec4<f32>,
  @location(0) color: vec4<f32>,
  @location(1) uv: vec2<f32>,
};

@vertex
fn vs_main(
  @location(0) center: vec3<f32>,
  @location(1) size: f32,
  @location(2) corner: vec2<f32>,
  @location(3) color: vec4<f32>,
) -> VsOut {
  var out: VsOut;
  let offset = (globals.cam_right.xyz * corner.x + globals.cam_up.xyz * corner.y) * size;
  out.pos = globals.view_proj * vec4<f32>(center + offset, 1.0);
  out.color = color;
  out.uv = corner;
  return out;
}

@fragment
fn fs_main(in: VsOut) -> @location(0) vec4<f32> {
  let d = length(in.uv) * 2.0;
  if (d > 1.0) {
    discard;
  }
  let edge = 1.0 - smoothstep(0.6, 1.0, d);
  return vec4<f32>(in.color.rgb, in.color.a * edge);
}
"#;

    #[repr(C)]
    #[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
    struct Globals {
        view_proj: [[f32; 4]; 4],
        cam_right: [f32; 4],
        cam_up: [f32; 4],
    }

    #[derive(Debug)]
    pub struct WgpuContext {
        pub _instance: &'static ::wgpu::Instance,
        pub surface: ::wgpu::Surface<'static>,
        pub device: ::wgpu::Device,
        pub queue: ::wgpu::Queue,
        pub config: ::wgpu::SurfaceConfiguration,
        pub _canvas: web_sys::HtmlCanvasElement,
        pub mesh_pipeline: ::wgpu::RenderPipeline,
        pub sprite_pipeline: ::wgpu::RenderPipeline,
        pub uniform_buffer: ::wgpu::Buffer,
        pub uniform_bind_group: ::wgpu::BindGroup,
        pub depth_view: ::wgpu::TextureView,
        pub mesh_buffer: ::wgpu::Buffer,
        pub mesh_capacity: usize,
        pub sprite_buffer: ::wgpu::Buffer,
        pub sprite_capacity: usize,
    }

    pub async fn init_wgpu_from_canvas_id(canvas_id: &str) -> Result<WgpuContext, JsValue> {
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("window missing"))?;
        let document = window
            .document()
            .ok_or_else(|| JsValue::from_str("document missing"))?;
        let canvas_elem = document
            .get_element_by_id(canvas_id)
            .ok_or_else(|| JsValue::from_str("canvas missing"))?
            .dyn_into::<web_sys::HtmlCanvasElement>()?;

        let width = canvas_elem.width();
        let height = canvas_elem.height();

        // The surface borrows the instance, so the instance lives for the page.
        let instance: &'static ::wgpu::Instance = Box::leak(Box::new(::wgpu::Instance::new(
            &::wgpu::InstanceDescriptor {
                backends: ::wgpu::Backends::BROWSER_WEBGPU | ::wgpu::Backends::GL,
                ..Default::default()
            },
        )));

        let surface = instance
            .create_surface(::wgpu::SurfaceTarget::Canvas(canvas_elem.clone()))
            .map_err(|e| JsValue::from_str(&format!("surface error: {e}")))?;

        let adapter = instance
            .request_adapter(&::wgpu::RequestAdapterOptions {
                power_preference: ::wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| JsValue::from_str(&format!("no suitable GPU adapter: {e}")))?;

        let (device, queue) = adapter
            .request_device(&::wgpu::DeviceDescriptor {
                label: Some("diorama-device"),
                required_features: ::wgpu::Features::empty(),
                required_limits: ::wgpu::Limits::downlevel_webgl2_defaults(),
                ..Default::default()
            })
            .await
            .map_err(|e| JsValue::from_str(&format!("request_device failed: {e}")))?;

        // Palette colours are already sRGB-encoded; write them through as-is.
        let caps = surface.get_capabilities(&adapter);
        let format = caps
            .formats
            .iter()
            .copied()
            .find(|f| !f.is_srgb())
            .unwrap_or(caps.formats[0]);

        let config = ::wgpu::SurfaceConfiguration {
            usage: ::wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: width.max(1),
            height: height.max(1),
            desired_maximum_frame_latency: 2,
            present_mode: ::wgpu::PresentMode::Fifo,
            alpha_mode: caps.alpha_modes[0],
            view_formats: vec![],
        };
        surface.configure(&device, &config);
        let depth_view = create_depth_view(&device, &config);

        let uniform_buffer = device.create_buffer(&::wgpu::BufferDescriptor {
            label: Some("diorama-globals"),
            size: std::mem::size_of::<Globals>() as u64,
            usage: ::wgpu::BufferUsages::UNIFORM | ::wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group_layout =
            device.create_bind_group_layout(&::wgpu::BindGroupLayoutDescriptor {
                label: Some("diorama-globals-layout"),
                entries: &[::wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: ::wgpu::ShaderStages::VERTEX,
                    ty: ::wgpu::BindingType::Buffer {
                        ty: ::wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
            });
        let uniform_bind_group = device.create_bind_group(&::wgpu::BindGroupDescriptor {
            label: Some("diorama-globals-bind-group"),
            layout: &bind_group_layout,
            entries: &[::wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });
        let layout = device.create_pipeline_layout(&::wgpu::PipelineLayoutDescriptor {
            label: Some("diorama-pipeline-layout"),
            bind_group_layouts: &[&bind_group_layout],
            immediate_size: 0,
        });

        let mesh_attributes = [
            ::wgpu::VertexAttribute {
                format: ::wgpu::VertexFormat::Float32x3,
                offset: 0,
                shader_location: 0,
            },
            ::wgpu::VertexAttribute {
                format: ::wgpu::VertexFormat::Float32x4,
                offset: 12,
                shader_location: 1,
            },
        ];
        let mesh_pipeline = create_pipeline(
            &device,
            &layout,
            format,
            "diorama-mesh",
            MESH_SHADER,
            ::wgpu::VertexBufferLayout {
                array_stride: std::mem::size_of::<MeshVertex>() as u64,
                step_mode: ::wgpu::VertexStepMode::Vertex,
                attributes: &mesh_attributes,
            },
            true,
        );

        let sprite_attributes = [
            ::wgpu::VertexAttribute {
                format: ::wgpu::VertexFormat::Float32x3,
                offset: 0,
                shader_location: 0,
            },
            ::wgpu::VertexAttribute {
                format: ::wgpu::VertexFormat::Float32,
                offset: 12,
                shader_location: 1,
            },
            ::wgpu::VertexAttribute {
                format: ::wgpu::VertexFormat::Float32x2,
                offset: 16,
                shader_location: 2,
            },
            ::wgpu::VertexAttribute {
                format: ::wgpu::VertexFormat::Float32x4,
                offset: 24,
                shader_location: 3,
            },
        ];
        let sprite_pipeline = create_pipeline(
            &device,
            &layout,
            format,
            "diorama-sprites",
            SPRITE_SHADER,
            ::wgpu::VertexBufferLayout {
                array_stride: std::mem::size_of::<PointVertex>() as u64,
                step_mode: ::wgpu::VertexStepMode::Vertex,
                attributes: &sprite_attributes,
            },
            false,
        );

        let mesh_capacity = 4096;
        let mesh_buffer = create_vertex_buffer::<MeshVertex>(&device, "diorama-mesh-vertices", mesh_capacity);
        let sprite_capacity = 4096;
        let sprite_buffer =
            create_vertex_buffer::<PointVertex>(&device, "diorama-sprite-vertices", sprite_capacity);

        Ok(WgpuContext {
            _instance: instance,
            surface,
            device,
            queue,
            config,
            _canvas: canvas_elem,
            mesh_pipeline,
            sprite_pipeline,
            uniform_buffer,
            uniform_bind_group,
            depth_view,
            mesh_buffer,
            mesh_capacity,
            sprite_buffer,
            sprite_capacity,
        })
    }

    fn create_depth_view(
        device: &::wgpu::Device,
        config: &::wgpu::SurfaceConfiguration,
    ) -> ::wgpu::TextureView {
        let tex = device.create_texture(&::wgpu::TextureDescriptor {
            label: Some("diorama-depth"),
            size: ::wgpu::Extent3d {
                width: config.width.max(1),
                height: config.height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: ::wgpu::TextureDimension::D2,
            format: ::wgpu::TextureFormat::Depth24PlusStencil8,
            usage: ::wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        tex.create_view(&::wgpu::TextureViewDescriptor::default())
    }

    fn create_vertex_buffer<T>(device: &::wgpu::Device, label: &str, capacity: usize) -> ::wgpu::Buffer {
        device.create_buffer(&::wgpu::BufferDescriptor {
            label: Some(label),
            size: (capacity.max(1) * std::mem::size_of::<T>()) as u64,
            usage: ::wgpu::BufferUsages::VERTEX | ::wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        })
    }

    fn create_pipeline(
        device: &::wgpu::Device,
        layout: &::wgpu::PipelineLayout,
        format: ::wgpu::TextureFormat,
        label: &str,
        source: &str,
        vertex_layout: ::wgpu::VertexBufferLayout<'_>,
        depth_write_enabled: bool,
    ) -> ::wgpu::RenderPipeline {
        let shader = device.create_shader_module(::wgpu::ShaderModuleDescriptor {
            label: Some(label),
            source: ::wgpu::ShaderSource::Wgsl(Cow::Borrowed(source)),
        });
        device.create_render_pipeline(&::wgpu::RenderPipelineDescriptor {
            label: Some(label),
            layout: Some(layout),
            vertex: ::wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[vertex_layout],
            },
            fragment: Some(::wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(::wgpu::ColorTargetState {
                    format,
                    blend: Some(::wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: ::wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: ::wgpu::PrimitiveState {
                topology: ::wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: ::wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: ::wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: Some(::wgpu::DepthStencilState {
                format: ::wgpu::TextureFormat::Depth24PlusStencil8,
                depth_write_enabled,
                depth_compare: ::wgpu::CompareFunction::LessEqual,
                stencil: ::wgpu::StencilState::default(),
                bias: ::wgpu::DepthBiasState::default(),
            }),
            multisample: ::wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        })
    }

    pub fn resize_wgpu(ctx: &mut WgpuContext, width: u32, height: u32) {
        ctx.config.width = width.max(1);
        ctx.config.height = height.max(1);
        ctx.surface.configure(&ctx.device, &ctx.config);
        ctx.depth_view = create_depth_view(&ctx.device, &ctx.config);
    }

    /// Grows the vertex buffers when the frame outgrows them, then uploads.
    fn upload(ctx: &mut WgpuContext, triangles: &[MeshVertex], sprites: &[PointVertex]) {
        if triangles.len() > ctx.mesh_capacity {
            ctx.mesh_capacity = triangles.len().next_power_of_two();
            ctx.mesh_buffer =
                create_vertex_buffer::<MeshVertex>(&ctx.device, "diorama-mesh-vertices", ctx.mesh_capacity);
        }
        if sprites.len() > ctx.sprite_capacity {
            ctx.sprite_capacity = sprites.len().next_power_of_two();
            ctx.sprite_buffer = create_vertex_buffer::<PointVertex>(
                &ctx.device,
                "diorama-sprite-vertices",
                ctx.sprite_capacity,
            );
        }
        if !triangles.is_empty() {
            ctx.queue
                .write_buffer(&ctx.mesh_buffer, 0, bytemuck::cast_slice(triangles));
        }
        if !sprites.is_empty() {
            ctx.queue
                .write_buffer(&ctx.sprite_buffer, 0, bytemuck::cast_slice(sprites));
        }
    }

    fn billboard_axes(camera: &PerspectiveCamera) -> ([f32; 4], [f32; 4]) {
        let forward = (camera.target - camera.position).normalize();
        let right = forward.cross(Vec3::new(0.0, 1.0, 0.0)).normalize();
        let up = right.cross(forward);
        let [rx, ry, rz] = right.to_f32();
        let [ux, uy, uz] = up.to_f32();
        ([rx, ry, rz, 0.0], [ux, uy, uz, 0.0])
    }

    pub fn render_frame(
        ctx: &mut WgpuContext,
        frame: &RenderFrame,
        camera: &PerspectiveCamera,
    ) -> Result<(), JsValue> {
        let (cam_right, cam_up) = billboard_axes(camera);
        let globals = Globals {
            view_proj: frame.view_proj,
            cam_right,
            cam_up,
        };
        ctx.queue
            .write_buffer(&ctx.uniform_buffer, 0, bytemuck::bytes_of(&globals));

        let sprites = frame.point_vertices();
        upload(ctx, &frame.triangles, &sprites);

        let surface_tex = ctx
            .surface
            .get_current_texture()
            .map_err(|e| JsValue::from_str(&format!("surface texture error: {e}")))?;
        let view = surface_tex
            .texture
            .create_view(&::wgpu::TextureViewDescriptor::default());

        let mut encoder = ctx
            .device
            .create_command_encoder(&::wgpu::CommandEncoderDescriptor {
                label: Some("diorama-encoder"),
            });
        {
            let clear = frame.clear_color;
            let mut pass = encoder.begin_render_pass(&::wgpu::RenderPassDescriptor {
                label: Some("diorama-pass"),
                color_attachments: &[Some(::wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    depth_slice: None,
                    ops: ::wgpu::Operations {
                        load: ::wgpu::LoadOp::Clear(::wgpu::Color {
                            r: clear.r as f64,
                            g: clear.g as f64,
                            b: clear.b as f64,
                            a: 1.0,
                        }),
                        store: ::wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(::wgpu::RenderPassDepthStencilAttachment {
                    view: &ctx.depth_view,
                    depth_ops: Some(::wgpu::Operations {
                        load: ::wgpu::LoadOp::Clear(1.0),
                        store: ::wgpu::StoreOp::Store,
                    }),
                    stencil_ops: Some(::wgpu::Operations {
                        load: ::wgpu::LoadOp::Clear(0),
                        store: ::wgpu::StoreOp::Store,
                    }),
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
                multiview_mask: None,
            });

            pass.set_bind_group(0, &ctx.uniform_bind_group, &[]);
            if !frame.triangles.is_empty() {
                pass.set_pipeline(&ctx.mesh_pipeline);
                pass.set_vertex_buffer(0, ctx.mesh_buffer.slice(..));
                pass.draw(0..frame.triangles.len() as u32, 0..1);
            }
            // Sprites after the opaque pass so they blend over it.
            if !sprites.is_empty() {
                pass.set_pipeline(&ctx.sprite_pipeline);
                pass.set_vertex_buffer(0, ctx.sprite_buffer.slice(..));
                pass.draw(0..sprites.len() as u32, 0..1);
            }
        }

        ctx.queue.submit(Some(encoder.finish()));
        surface_tex.present();
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod imp {
    use gpu::{PerspectiveCamera, RenderFrame};
    use wasm_bindgen::prelude::JsValue;

    #[derive(Debug, Default)]
    pub struct WgpuContext;

    pub async fn init_wgpu_from_canvas_id(_canvas_id: &str) -> Result<WgpuContext, JsValue> {
        Err(JsValue::from_str(
            "wgpu initialization is only available on wasm32 targets",
        ))
    }

    pub fn resize_wgpu(_ctx: &mut WgpuContext, _width: u32, _height: u32) {}

    pub fn render_frame(
        _ctx: &mut WgpuContext,
        _frame: &RenderFrame,
        _camera: &PerspectiveCamera,
    ) -> Result<(), JsValue> {
        Err(JsValue::from_str(
            "wgpu rendering is only available on wasm32 targets",
        ))
    }
}

pub use imp::{WgpuContext, init_wgpu_from_canvas_id, render_frame, resize_wgpu};
