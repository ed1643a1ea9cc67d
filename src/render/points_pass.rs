//! Sprite pass for point clouds.
//!
//! Each point is one instance of a four-vertex triangle strip, expanded to a
//! camera-facing quad in the vertex shader. Drawn after opaque meshes with
//! alpha blending and depth testing, without depth writes.

use glam::Vec4;
use rustc_hash::FxHashMap;
use wgpu::util::DeviceExt;

use crate::assets::{AssetServer, TextureHandle};
use crate::render::resources::GpuResources;
use crate::render::uniforms::PointsUniforms;
use crate::resources::PointVertex;
use crate::scene::{NodeHandle, Scene};

const INSTANCE_ATTRIBUTES: [wgpu::VertexAttribute; 3] = wgpu::vertex_attr_array![
    0 => Float32x3,
    1 => Float32,
    2 => Float32x4,
];

struct PointsSlot {
    instances: wgpu::Buffer,
    instance_count: u32,
    uniforms: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    last_used_frame: u64,
}

pub struct PointsDraw {
    node: NodeHandle,
    texture: Option<TextureHandle>,
}

pub struct PointsPass {
    pipeline: wgpu::RenderPipeline,
    object_layout: wgpu::BindGroupLayout,
    slots: FxHashMap<NodeHandle, PointsSlot>,
}

impl PointsPass {
    #[must_use]
    pub fn new(
        device: &wgpu::Device,
        globals_layout: &wgpu::BindGroupLayout,
        texture_layout: &wgpu::BindGroupLayout,
        color_format: wgpu::TextureFormat,
        depth_format: wgpu::TextureFormat,
    ) -> Self {
        let object_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Points Object Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Points Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/points.wgsl").into()),
        });

        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Points Pipeline Layout"),
            bind_group_layouts: &[globals_layout, &object_layout, texture_layout],
            immediate_size: 0,
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Points Pipeline"),
            layout: Some(&layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<PointVertex>() as wgpu::BufferAddress,
                    step_mode: wgpu::VertexStepMode::Instance,
                    attributes: &INSTANCE_ATTRIBUTES,
                }],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: color_format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleStrip,
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: depth_format,
                depth_write_enabled: false,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        Self {
            pipeline,
            object_layout,
            slots: FxHashMap::default(),
        }
    }

    pub fn prepare(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        scene: &Scene,
        assets: &AssetServer,
        resources: &mut GpuResources,
        frame: u64,
    ) -> Vec<PointsDraw> {
        let mut draws = Vec::new();

        for (handle, node) in &scene.nodes {
            if !node.visible {
                continue;
            }
            let Some(points) = node.points.and_then(|k| scene.points.get(k)) else {
                continue;
            };
            if points.is_empty() {
                continue;
            }

            let texture = points
                .material
                .map
                .filter(|&t| resources.prepare_texture(device, queue, assets, t));

            let stale = self
                .slots
                .get(&handle)
                .is_some_and(|slot| slot.instance_count as usize != points.len());
            if stale {
                self.slots.remove(&handle);
            }

            let layout = &self.object_layout;
            let slot = self.slots.entry(handle).or_insert_with(|| {
                let instances = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("Points Instances"),
                    contents: bytemuck::cast_slice(&points.vertices),
                    usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
                });
                let uniforms = device.create_buffer(&wgpu::BufferDescriptor {
                    label: Some("Points Uniforms"),
                    size: std::mem::size_of::<PointsUniforms>() as wgpu::BufferAddress,
                    usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                    mapped_at_creation: false,
                });
                let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
                    label: Some("Points Bind Group"),
                    layout,
                    entries: &[wgpu::BindGroupEntry {
                        binding: 0,
                        resource: uniforms.as_entire_binding(),
                    }],
                });
                PointsSlot {
                    instances,
                    instance_count: points.len() as u32,
                    uniforms,
                    bind_group,
                    last_used_frame: 0,
                }
            });

            slot.last_used_frame = frame;
            let uniforms = PointsUniforms {
                model: node.transform.world_matrix_as_mat4(),
                params: Vec4::new(points.material.size_scale, points.material.alpha_test, 0.0, 0.0),
            };
            queue.write_buffer(&slot.uniforms, 0, bytemuck::bytes_of(&uniforms));

            draws.push(PointsDraw { node: handle, texture });
        }

        self.slots.retain(|_, slot| slot.last_used_frame == frame);
        draws
    }

    pub fn draw(
        &self,
        pass: &mut wgpu::RenderPass<'_>,
        globals: &wgpu::BindGroup,
        resources: &GpuResources,
        draws: &[PointsDraw],
    ) {
        if draws.is_empty() {
            return;
        }
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, globals, &[]);

        for draw in draws {
            let Some(slot) = self.slots.get(&draw.node) else {
                continue;
            };
            pass.set_bind_group(1, &slot.bind_group, &[]);
            pass.set_bind_group(2, resources.texture_bind_group(draw.texture), &[]);
            pass.set_vertex_buffer(0, slot.instances.slice(..));
            pass.draw(0..4, 0..slot.instance_count);
        }
    }
}
