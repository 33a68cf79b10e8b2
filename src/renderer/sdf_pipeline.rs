//! SDF-based WebGPU render pipeline
//!
//! Renders the entire scene in fragment shader using signed distance fields.
//! Circles are buffered between `begin_frame` and `render`.

use bytemuck::{Pod, Zeroable};
use glam::Vec2;
use wgpu::util::DeviceExt;

use super::colors::Color;

/// Maximum number of circles per frame (arena + balls)
pub const MAX_CIRCLES: usize = 64;

// ============================================================================
// GPU DATA STRUCTURES (must match shader)
// ============================================================================

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct Globals {
    resolution: [f32; 2],  // offset 0
    view_center: [f32; 2], // offset 8
    view_size: f32,        // offset 16
    circle_count: u32,     // offset 20
    _pad: [u32; 2],        // offset 24 - align background to 16 bytes
    background: [f32; 4],  // offset 32
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable, Debug, PartialEq)]
struct CircleData {
    center: [f32; 2],
    radius: f32,
    stroke: f32, // 0 = filled, else ring width inside the radius
    color: [f32; 4],
}

/// What to do after `render` fails to get a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceRecovery {
    /// Configure the surface again at the current size
    Reconfigure,
    /// Drop this frame and try again next time
    Skip,
}

impl SurfaceRecovery {
    /// Log the failure and pick a recovery
    pub fn for_error(err: &wgpu::SurfaceError) -> Self {
        match err {
            wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated => {
                log::warn!("Render surface lost ({}), reconfiguring", err);
                SurfaceRecovery::Reconfigure
            }
            wgpu::SurfaceError::OutOfMemory => {
                log::error!("Out of memory!");
                SurfaceRecovery::Skip
            }
            _ => {
                log::warn!("Render error: {:?}", err);
                SurfaceRecovery::Skip
            }
        }
    }
}

// ============================================================================
// SDF RENDER STATE
// ============================================================================

pub struct SdfRenderState {
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    pub pipeline: wgpu::RenderPipeline,

    globals_buffer: wgpu::Buffer,
    circles_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,

    pub size: (u32, u32),
    /// World-space point shown at the middle of the canvas
    view_center: Vec2,
    /// World units that fit across the shorter canvas side
    view_size: f32,

    background: Color,
    circles: Vec<CircleData>,
}

impl SdfRenderState {
    pub async fn new(
        surface: wgpu::Surface<'static>,
        adapter: &wgpu::Adapter,
        width: u32,
        height: u32,
        view_center: Vec2,
        view_size: f32,
    ) -> Result<Self, wgpu::RequestDeviceError> {
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("sdf-device"),
                required_features: wgpu::Features::empty(),
                // Fragment-stage storage buffers rule out the WebGL2 limits
                required_limits: wgpu::Limits::downlevel_defaults(),
                memory_hints: Default::default(),
                trace: Default::default(),
                experimental_features: Default::default(),
            })
            .await?;

        let surface_caps = surface.get_capabilities(adapter);
        log::info!("Surface formats: {:?}", surface_caps.formats);

        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .copied()
            .unwrap_or(surface_caps.formats[0]);

        log::info!("Using surface format: {:?}", surface_format);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width,
            height,
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("sdf_shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("sdf_shader.wgsl").into()),
        });

        let globals_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("globals"),
            contents: bytemuck::bytes_of(&Globals {
                resolution: [width as f32, height as f32],
                view_center: view_center.to_array(),
                view_size,
                circle_count: 0,
                _pad: [0; 2],
                background: [0.0, 0.0, 0.0, 1.0],
            }),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let circles_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("circles"),
            size: (std::mem::size_of::<CircleData>() * MAX_CIRCLES) as u64,
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("sdf_bind_group_layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Storage { read_only: true },
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
            ],
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("sdf_bind_group"),
            layout: &bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: globals_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: circles_buffer.as_entire_binding(),
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("sdf_pipeline_layout"),
            bind_group_layouts: &[&bind_group_layout],
            immediate_size: 0,
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("sdf_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[], // No vertex buffers - fullscreen triangle
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: config.format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        Ok(Self {
            surface,
            device,
            queue,
            config,
            pipeline,
            globals_buffer,
            circles_buffer,
            bind_group,
            size: (width, height),
            view_center,
            view_size,
            background: [0.0, 0.0, 0.0, 1.0],
            circles: Vec::with_capacity(MAX_CIRCLES),
        })
    }

    pub fn resize(&mut self, new_width: u32, new_height: u32) {
        if new_width > 0 && new_height > 0 {
            self.size = (new_width, new_height);
            self.config.width = new_width;
            self.config.height = new_height;
            self.surface.configure(&self.device, &self.config);
        }
    }

    /// Start a new frame with the given background
    pub fn begin_frame(&mut self, background: Color) {
        self.background = background;
        self.circles.clear();
    }

    /// Queue a circle; extra circles past `MAX_CIRCLES` are dropped
    pub fn push_circle(&mut self, center: Vec2, radius: f32, color: Color, stroke: Option<f32>) {
        if self.circles.len() >= MAX_CIRCLES {
            log::warn!("Circle limit ({}) reached, dropping draw", MAX_CIRCLES);
            return;
        }
        self.circles.push(CircleData {
            center: center.to_array(),
            radius,
            stroke: stroke.unwrap_or(0.0),
            color,
        });
    }

    /// Upload the queued circles and draw them
    pub fn render(&mut self) -> Result<(), wgpu::SurfaceError> {
        let globals = Globals {
            resolution: [self.size.0 as f32, self.size.1 as f32],
            view_center: self.view_center.to_array(),
            view_size: self.view_size,
            circle_count: self.circles.len() as u32,
            _pad: [0; 2],
            background: self.background,
        };
        self.queue
            .write_buffer(&self.globals_buffer, 0, bytemuck::bytes_of(&globals));
        if !self.circles.is_empty() {
            self.queue
                .write_buffer(&self.circles_buffer, 0, bytemuck::cast_slice(&self.circles));
        }

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("sdf_encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("sdf_render_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            render_pass.set_pipeline(&self.pipeline);
            render_pass.set_bind_group(0, &self.bind_group, &[]);
            render_pass.draw(0..3, 0..1); // Fullscreen triangle
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gpu_layouts_match_shader() {
        // WGSL: Globals is 48 bytes, Circle is 32 bytes (vec4 aligned to 16)
        assert_eq!(std::mem::size_of::<Globals>(), 48);
        assert_eq!(std::mem::size_of::<CircleData>(), 32);
    }

    #[test]
    fn test_lost_surface_is_reconfigured() {
        assert_eq!(
            SurfaceRecovery::for_error(&wgpu::SurfaceError::Lost),
            SurfaceRecovery::Reconfigure
        );
        assert_eq!(
            SurfaceRecovery::for_error(&wgpu::SurfaceError::Outdated),
            SurfaceRecovery::Reconfigure
        );
        assert_eq!(
            SurfaceRecovery::for_error(&wgpu::SurfaceError::Timeout),
            SurfaceRecovery::Skip
        );
        assert_eq!(
            SurfaceRecovery::for_error(&wgpu::SurfaceError::OutOfMemory),
            SurfaceRecovery::Skip
        );
    }
}
