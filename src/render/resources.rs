//! GPU-side mirrors of CPU resources.
//!
//! Geometries and textures are uploaded the first time a draw needs them and
//! cached by asset handle. Both are immutable once added to the
//! [`AssetServer`], so an upload never has to be redone; entries whose asset
//! has been removed are dropped by [`GpuResources::prune`].

use bytemuck::{Pod, Zeroable};
use rustc_hash::FxHashMap;
use wgpu::util::DeviceExt;

use crate::assets::{AssetServer, GeometryHandle, TextureHandle};
use crate::resources::{ColorSpace, Geometry, Texture};

/// Interleaved vertex as consumed by `mesh.wgsl`.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
    pub joints: [u32; 4],
    pub weights: [f32; 4],
}

impl MeshVertex {
    pub const ATTRIBUTES: [wgpu::VertexAttribute; 5] = wgpu::vertex_attr_array![
        0 => Float32x3,
        1 => Float32x3,
        2 => Float32x2,
        3 => Uint32x4,
        4 => Float32x4,
    ];

    #[must_use]
    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Self>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }

    /// Interleaves the attribute arrays of `geometry`.
    #[must_use]
    pub fn interleave(geometry: &Geometry) -> Vec<Self> {
        (0..geometry.vertex_count())
            .map(|i| Self {
                position: geometry.positions[i],
                normal: geometry.normals[i],
                uv: geometry.uvs[i],
                joints: geometry
                    .joints
                    .get(i)
                    .map_or([0; 4], |j| j.map(u32::from)),
                weights: geometry.weights.get(i).copied().unwrap_or_default(),
            })
            .collect()
    }
}

pub struct GpuGeometry {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub index_count: u32,
}

pub struct GpuTexture {
    _texture: wgpu::Texture,
    pub bind_group: wgpu::BindGroup,
}

pub struct GpuResources {
    /// Layout of the texture + sampler group shared by all passes.
    pub texture_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    /// Bound where a material has no map.
    white: GpuTexture,

    geometries: FxHashMap<GeometryHandle, GpuGeometry>,
    textures: FxHashMap<TextureHandle, GpuTexture>,
}

impl GpuResources {
    #[must_use]
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue) -> Self {
        let texture_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Texture Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Default Sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::MipmapFilterMode::Linear,
            ..Default::default()
        });

        let white = upload_texture(device, queue, &Texture::white(), &texture_layout, &sampler);

        Self {
            texture_layout,
            sampler,
            white,
            geometries: FxHashMap::default(),
            textures: FxHashMap::default(),
        }
    }

    /// Uploads `geometry` if it is not resident yet.
    pub fn prepare_geometry(&mut self, device: &wgpu::Device, handle: GeometryHandle, geometry: &Geometry) {
        self.geometries.entry(handle).or_insert_with(|| {
            let vertices = MeshVertex::interleave(geometry);
            let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Vertex Buffer"),
                contents: bytemuck::cast_slice(&vertices),
                usage: wgpu::BufferUsages::VERTEX,
            });
            let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Index Buffer"),
                contents: bytemuck::cast_slice(&geometry.indices),
                usage: wgpu::BufferUsages::INDEX,
            });
            GpuGeometry {
                vertex_buffer,
                index_buffer,
                index_count: geometry.indices.len() as u32,
            }
        });
    }

    #[must_use]
    pub fn geometry(&self, handle: GeometryHandle) -> Option<&GpuGeometry> {
        self.geometries.get(&handle)
    }

    /// Uploads the texture behind `handle` if present in `assets`.
    /// Returns whether it is resident afterwards.
    pub fn prepare_texture(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        assets: &AssetServer,
        handle: TextureHandle,
    ) -> bool {
        if self.textures.contains_key(&handle) {
            return true;
        }
        let Some(texture) = assets.get_texture(handle) else {
            return false;
        };
        let gpu = upload_texture(device, queue, texture, &self.texture_layout, &self.sampler);
        self.textures.insert(handle, gpu);
        true
    }

    /// Bind group for `handle`, or the white texture.
    #[must_use]
    pub fn texture_bind_group(&self, handle: Option<TextureHandle>) -> &wgpu::BindGroup {
        handle
            .and_then(|h| self.textures.get(&h))
            .map_or(&self.white.bind_group, |t| &t.bind_group)
    }

    /// Drops GPU copies of assets that no longer exist.
    pub fn prune(&mut self, assets: &AssetServer) {
        self.geometries.retain(|h, _| assets.geometries.contains_key(*h));
        self.textures.retain(|h, _| assets.textures.contains_key(*h));
    }
}

fn upload_texture(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    texture: &Texture,
    layout: &wgpu::BindGroupLayout,
    sampler: &wgpu::Sampler,
) -> GpuTexture {
    let format = match texture.color_space {
        ColorSpace::Srgb => wgpu::TextureFormat::Rgba8UnormSrgb,
        ColorSpace::Linear => wgpu::TextureFormat::Rgba8Unorm,
    };
    let levels = texture.mip_chain();

    let gpu_texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some(&texture.name),
        size: wgpu::Extent3d {
            width: texture.width,
            height: texture.height,
            depth_or_array_layers: 1,
        },
        mip_level_count: levels.len() as u32,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });

    for (level, (width, height, data)) in levels.iter().enumerate() {
        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &gpu_texture,
                mip_level: level as u32,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            data,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * width),
                rows_per_image: Some(*height),
            },
            wgpu::Extent3d {
                width: *width,
                height: *height,
                depth_or_array_layers: 1,
            },
        );
    }

    let view = gpu_texture.create_view(&wgpu::TextureViewDescriptor::default());
    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some(&texture.name),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(&view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(sampler),
            },
        ],
    });

    log::debug!("Uploaded texture '{}' ({}x{}, {} mips)", texture.name, texture.width, texture.height, levels.len());

    GpuTexture {
        _texture: gpu_texture,
        bind_group,
    }
}
