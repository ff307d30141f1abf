//! wgpu point cloud renderer

use std::sync::Arc;

use bytemuck::{Pod, Zeroable};
use depthcloud_core::{Error, PointSet, Result};
use nalgebra::{Matrix4, Vector3};
use wgpu::util::DeviceExt;
use winit::window::Window;

use crate::shaders::POINT_CLOUD_SHADER;
use crate::window::GeometryId;

/// Color of points that carry no color of their own
const DEFAULT_POINT_COLOR: [f32; 3] = [1.0, 1.0, 1.0];

/// Vertex data for point cloud rendering
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct PointVertex {
    pub position: [f32; 3],
    pub color: [f32; 3],
}

impl PointVertex {
    /// Vertex buffer layout descriptor
    pub fn desc<'a>() -> wgpu::VertexBufferLayout<'a> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<PointVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                // Position
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x3,
                },
                // Color
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x3,
                },
            ],
        }
    }

    /// Convert a point set, painting uncolored points white
    pub fn from_point_set(points: &PointSet) -> Vec<PointVertex> {
        points
            .iter()
            .map(|(p, color)| PointVertex {
                position: [p.x, p.y, p.z],
                color: color
                    .map(|c| [c[0] as f32, c[1] as f32, c[2] as f32])
                    .unwrap_or(DEFAULT_POINT_COLOR),
            })
            .collect()
    }
}

/// Camera uniform data
#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct CameraUniform {
    view_proj: [[f32; 4]; 4],
    view_pos: [f32; 3],
    _padding: f32,
}

/// A vertex buffer that grows but never shrinks
struct GpuGeometry {
    buffer: Option<wgpu::Buffer>,
    capacity: usize,
    count: u32,
}

/// Draws any number of point sets into a window surface
pub struct PointCloudRenderer {
    device: wgpu::Device,
    queue: wgpu::Queue,
    surface: wgpu::Surface<'static>,
    surface_config: wgpu::SurfaceConfiguration,
    render_pipeline: wgpu::RenderPipeline,
    camera_buffer: wgpu::Buffer,
    camera_bind_group: wgpu::BindGroup,
    depth_view: wgpu::TextureView,
    geometries: Vec<GpuGeometry>,
    background_color: wgpu::Color,
}

impl PointCloudRenderer {
    /// Create a renderer drawing into `window`
    pub async fn new(window: Arc<Window>, background_color: [f64; 3]) -> Result<Self> {
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let size = window.inner_size();
        let surface = instance
            .create_surface(window)
            .map_err(|e| Error::Visualization(format!("Failed to create surface: {}", e)))?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| Error::Visualization("Failed to find suitable adapter".to_string()))?;

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("depthcloud device"),
                    ..Default::default()
                },
                None,
            )
            .await
            .map_err(|e| Error::Visualization(format!("Failed to create device: {}", e)))?;

        // Decoded colors are already display-referred, so skip the sRGB encode.
        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| !f.is_srgb())
            .or_else(|| surface_caps.formats.first().copied())
            .ok_or_else(|| Error::Visualization("Surface reports no formats".to_string()))?;

        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &surface_config);

        let camera_uniform = CameraUniform {
            view_proj: Matrix4::<f32>::identity().into(),
            view_pos: [0.0, 0.0, 0.0],
            _padding: 0.0,
        };

        let camera_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Camera Buffer"),
            contents: bytemuck::bytes_of(&camera_uniform),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let camera_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
            label: Some("camera_bind_group_layout"),
        });

        let camera_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &camera_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: camera_buffer.as_entire_binding(),
            }],
            label: Some("camera_bind_group"),
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Point Cloud Shader"),
            source: wgpu::ShaderSource::Wgsl(POINT_CLOUD_SHADER.into()),
        });

        let render_pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Point Cloud Render Pipeline Layout"),
            bind_group_layouts: &[&camera_layout],
            push_constant_ranges: &[],
        });

        let render_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Point Cloud Render Pipeline"),
            layout: Some(&render_pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: "vs_main",
                buffers: &[PointVertex::desc()],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: "fs_main",
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_config.format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::PointList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                unclipped_depth: false,
                polygon_mode: wgpu::PolygonMode::Fill,
                conservative: false,
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: wgpu::TextureFormat::Depth32Float,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState {
                count: 1,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            multiview: None,
        });

        let depth_view = create_depth_view(&device, &surface_config);
        let [r, g, b] = background_color;

        Ok(Self {
            device,
            queue,
            surface,
            surface_config,
            render_pipeline,
            camera_buffer,
            camera_bind_group,
            depth_view,
            geometries: Vec::new(),
            background_color: wgpu::Color { r, g, b, a: 1.0 },
        })
    }

    /// Register a new, initially empty geometry slot
    pub fn add_geometry(&mut self) -> GeometryId {
        self.geometries.push(GpuGeometry {
            buffer: None,
            capacity: 0,
            count: 0,
        });
        GeometryId(self.geometries.len() - 1)
    }

    /// Upload `vertices` as the contents of `id`
    pub fn update_geometry(&mut self, id: GeometryId, vertices: &[PointVertex]) -> Result<()> {
        let geometry = self
            .geometries
            .get_mut(id.0)
            .ok_or_else(|| Error::Visualization(format!("Unknown geometry {:?}", id)))?;

        if vertices.len() > geometry.capacity || geometry.buffer.is_none() {
            let buffer = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Point Cloud Vertex Buffer"),
                contents: bytemuck::cast_slice(vertices),
                usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            });
            geometry.buffer = Some(buffer);
            geometry.capacity = vertices.len();
        } else if let Some(buffer) = &geometry.buffer {
            if !vertices.is_empty() {
                self.queue.write_buffer(buffer, 0, bytemuck::cast_slice(vertices));
            }
        }
        geometry.count = vertices.len() as u32;
        Ok(())
    }

    /// Update camera view and projection matrices
    pub fn update_camera(
        &mut self,
        view_matrix: Matrix4<f32>,
        proj_matrix: Matrix4<f32>,
        camera_pos: Vector3<f32>,
    ) {
        let uniform = CameraUniform {
            view_proj: (proj_matrix * view_matrix).into(),
            view_pos: [camera_pos.x, camera_pos.y, camera_pos.z],
            _padding: 0.0,
        };
        self.queue
            .write_buffer(&self.camera_buffer, 0, bytemuck::bytes_of(&uniform));
    }

    /// Resize renderer surface
    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.surface_config.width = new_size.width;
            self.surface_config.height = new_size.height;
            self.surface.configure(&self.device, &self.surface_config);
            self.depth_view = create_depth_view(&self.device, &self.surface_config);
        }
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.surface_config.width as f32 / self.surface_config.height as f32
    }

    /// Draw every geometry and present the frame
    pub fn render(&mut self) -> Result<()> {
        let output = match self.surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.surface.configure(&self.device, &self.surface_config);
                return Ok(());
            }
            Err(e) => {
                return Err(Error::Visualization(format!(
                    "Failed to get surface texture: {}",
                    e
                )))
            }
        };

        let view = output.texture.create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Point Cloud Render Encoder"),
        });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Point Cloud Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.background_color),
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
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            render_pass.set_pipeline(&self.render_pipeline);
            render_pass.set_bind_group(0, &self.camera_bind_group, &[]);
            for geometry in &self.geometries {
                if let (Some(buffer), true) = (&geometry.buffer, geometry.count > 0) {
                    render_pass.set_vertex_buffer(0, buffer.slice(..));
                    render_pass.draw(0..geometry.count, 0..1);
                }
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }
}

fn create_depth_view(
    device: &wgpu::Device,
    config: &wgpu::SurfaceConfiguration,
) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Depth Texture"),
        size: wgpu::Extent3d {
            width: config.width,
            height: config.height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Depth32Float,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    texture.create_view(&wgpu::TextureViewDescriptor::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use depthcloud_core::Point3f;

    #[test]
    fn test_vertices_carry_decoded_colors() {
        let points = PointSet::from_parts(
            vec![Point3f::new(1.0, 2.0, 3.0)],
            vec![[0.5, 0.25, 1.0]],
        )
        .unwrap();
        let vertices = PointVertex::from_point_set(&points);
        assert_eq!(
            vertices,
            vec![PointVertex { position: [1.0, 2.0, 3.0], color: [0.5, 0.25, 1.0] }]
        );
    }

    #[test]
    fn test_uncolored_points_are_white() {
        let vertices = PointVertex::from_point_set(&PointSet::origin());
        assert_eq!(vertices[0].color, DEFAULT_POINT_COLOR);
    }

    #[test]
    fn test_vertex_stride() {
        assert_eq!(std::mem::size_of::<PointVertex>(), 24);
        assert_eq!(PointVertex::desc().array_stride, 24);
    }
}
