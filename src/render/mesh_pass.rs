//! Opaque mesh pass.
//!
//! One uniform buffer + bind group per mesh node (group 1), holding the
//! model matrix and material factors next to the node's joint palette.
//! Skinned draws read world-space joint matrices from a storage buffer keyed
//! by skeleton; static draws bind a one-matrix placeholder instead.

use glam::{Mat4, Vec4};
use rustc_hash::FxHashMap;
use wgpu::util::DeviceExt;

use crate::assets::{AssetServer, GeometryHandle, TextureHandle};
use crate::render::resources::{GpuResources, MeshVertex};
use crate::render::uniforms::ObjectUniforms;
use crate::scene::{NodeHandle, Scene, SkeletonKey};

struct ObjectSlot {
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    skin: Option<SkeletonKey>,
    last_used_frame: u64,
}

struct JointBuffer {
    buffer: wgpu::Buffer,
    capacity: usize,
}

/// A mesh node resolved for this frame.
pub struct MeshDraw {
    node: NodeHandle,
    geometry: GeometryHandle,
    texture: Option<TextureHandle>,
}

pub struct MeshPass {
    pipeline: wgpu::RenderPipeline,
    object_layout: wgpu::BindGroupLayout,
    objects: FxHashMap<NodeHandle, ObjectSlot>,
    joints: FxHashMap<SkeletonKey, JointBuffer>,
    placeholder_joints: wgpu::Buffer,
}

impl MeshPass {
    #[must_use]
    pub fn new(
        device: &wgpu::Device,
        globals_layout: &wgpu::BindGroupLayout,
        texture_layout: &wgpu::BindGroupLayout,
        color_format: wgpu::TextureFormat,
        depth_format: wgpu::TextureFormat,
    ) -> Self {
        let object_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Mesh Object Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Storage { read_only: true },
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
            ],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Mesh Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/mesh.wgsl").into()),
        });

        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Mesh Pipeline Layout"),
            bind_group_layouts: &[globals_layout, &object_layout, texture_layout],
            immediate_size: 0,
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Mesh Pipeline"),
            layout: Some(&layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[MeshVertex::layout()],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: color_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                // glTF assets are not guaranteed to be consistently wound.
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: depth_format,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        let placeholder_joints = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Placeholder Joints"),
            contents: bytemuck::bytes_of(&Mat4::IDENTITY),
            usage: wgpu::BufferUsages::STORAGE,
        });

        Self {
            pipeline,
            object_layout,
            objects: FxHashMap::default(),
            joints: FxHashMap::default(),
            placeholder_joints,
        }
    }

    /// Uploads everything the visible mesh nodes need and returns the draw
    /// list.
    pub fn prepare(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        scene: &Scene,
        assets: &AssetServer,
        resources: &mut GpuResources,
        frame: u64,
    ) -> Vec<MeshDraw> {
        self.upload_joints(device, queue, scene);

        let mut draws = Vec::new();

        for (handle, node) in &scene.nodes {
            if !node.visible {
                continue;
            }
            let Some(mesh) = node.mesh.and_then(|k| scene.meshes.get(k)) else {
                continue;
            };
            let Some(geometry) = assets.get_geometry(mesh.geometry) else {
                log::warn!("Node '{}' refers to a missing geometry", node.name);
                continue;
            };
            let Some(material) = assets.get_material(mesh.material) else {
                log::warn!("Node '{}' refers to a missing material", node.name);
                continue;
            };

            resources.prepare_geometry(device, mesh.geometry, geometry);
            let texture = material
                .map
                .filter(|&t| resources.prepare_texture(device, queue, assets, t));

            let skin = node
                .skin
                .filter(|k| geometry.is_skinned() && self.joints.contains_key(k));

            let model = node.transform.world_matrix_as_mat4();
            let uniforms = ObjectUniforms {
                model,
                normal_matrix: model.inverse().transpose(),
                base_color: material.color,
                params: Vec4::new(
                    material.roughness,
                    material.metalness,
                    0.0,
                    if skin.is_some() { 1.0 } else { 0.0 },
                ),
            };

            let slot = self.object_slot(device, handle, skin);
            slot.last_used_frame = frame;
            queue.write_buffer(&slot.buffer, 0, bytemuck::bytes_of(&uniforms));

            draws.push(MeshDraw {
                node: handle,
                geometry: mesh.geometry,
                texture,
            });
        }

        self.objects.retain(|_, slot| slot.last_used_frame == frame);
        draws
    }

    pub fn draw(
        &self,
        pass: &mut wgpu::RenderPass<'_>,
        globals: &wgpu::BindGroup,
        resources: &GpuResources,
        draws: &[MeshDraw],
    ) {
        if draws.is_empty() {
            return;
        }
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, globals, &[]);

        for draw in draws {
            let (Some(slot), Some(geometry)) = (self.objects.get(&draw.node), resources.geometry(draw.geometry)) else {
                continue;
            };
            pass.set_bind_group(1, &slot.bind_group, &[]);
            pass.set_bind_group(2, resources.texture_bind_group(draw.texture), &[]);
            pass.set_vertex_buffer(0, geometry.vertex_buffer.slice(..));
            pass.set_index_buffer(geometry.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
            pass.draw_indexed(0..geometry.index_count, 0, 0..1);
        }
    }

    fn upload_joints(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, scene: &Scene) {
        self.joints.retain(|key, _| scene.skeletons.contains_key(*key));

        for (key, skeleton) in &scene.skeletons {
            let matrices = skeleton.joint_matrices();
            if matrices.is_empty() {
                continue;
            }

            let needs_alloc = self.joints.get(&key).is_none_or(|j| j.capacity < matrices.len());
            if needs_alloc {
                let buffer = device.create_buffer(&wgpu::BufferDescriptor {
                    label: Some(&skeleton.name),
                    size: std::mem::size_of_val(matrices) as wgpu::BufferAddress,
                    usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
                    mapped_at_creation: false,
                });
                self.joints.insert(
                    key,
                    JointBuffer {
                        buffer,
                        capacity: matrices.len(),
                    },
                );
                // Bind groups referencing the old buffer are stale.
                self.objects.retain(|_, slot| slot.skin != Some(key));
            }

            if let Some(joints) = self.joints.get(&key) {
                queue.write_buffer(&joints.buffer, 0, bytemuck::cast_slice(matrices));
            }
        }
    }

    fn object_slot(&mut self, device: &wgpu::Device, node: NodeHandle, skin: Option<SkeletonKey>) -> &mut ObjectSlot {
        if self.objects.get(&node).is_some_and(|slot| slot.skin != skin) {
            self.objects.remove(&node);
        }

        let joints = skin
            .and_then(|k| self.joints.get(&k))
            .map_or(&self.placeholder_joints, |j| &j.buffer);
        let layout = &self.object_layout;

        self.objects.entry(node).or_insert_with(|| {
            let buffer = device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("Object Uniforms"),
                size: std::mem::size_of::<ObjectUniforms>() as wgpu::BufferAddress,
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            });
            let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("Object Bind Group"),
                layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: buffer.as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: joints.as_entire_binding(),
                    },
                ],
            });
            ObjectSlot {
                buffer,
                bind_group,
                skin,
                last_used_frame: 0,
            }
        })
    }
}
