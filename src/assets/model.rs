//! glTF 2.0 / GLB import.
//!
//! Loading is split in two so the expensive half can run on a loader thread:
//!
//! 1. [`ModelData::parse`] decodes the container into plain CPU data
//!    (nodes, geometry, materials, images, skins, clips). It owns no
//!    handles and is `Send`.
//! 2. [`ModelData::instantiate`] runs on the frame thread and inserts that
//!    data into a [`Scene`] and [`AssetServer`], returning the new root.

use std::sync::Arc;

use glam::{Affine3A, Mat4, Quat, Vec3, Vec4};

use crate::animation::binding::TargetPath;
use crate::animation::clip::{AnimationClip, Track, TrackData, TrackMeta};
use crate::animation::tracks::{InterpolationMode, KeyframeTrack};
use crate::assets::{AssetServer, GeometryHandle, MaterialHandle, TextureHandle};
use crate::errors::{Error, Result};
use crate::resources::{Geometry, Material, Mesh, Texture};
use crate::scene::{Node, NodeHandle, Scene, Skeleton, SkeletonKey, Transform, transform_system};

// ============================================================================
// Intermediate data
// ============================================================================

#[derive(Debug, Clone)]
pub struct NodeData {
    pub name: String,
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
    /// Indices into [`ModelData::nodes`].
    pub children: Vec<usize>,
    /// Index into [`ModelData::meshes`].
    pub mesh: Option<usize>,
    /// Index into [`ModelData::skins`].
    pub skin: Option<usize>,
}

impl NodeData {
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            translation: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
            children: Vec::new(),
            mesh: None,
            skin: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PrimitiveData {
    pub geometry: Geometry,
    /// Index into [`ModelData::materials`]; `None` uses a default material.
    pub material: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct MaterialData {
    pub name: String,
    pub base_color: Vec4,
    /// Index into [`ModelData::images`].
    pub base_color_image: Option<usize>,
    pub roughness: f32,
    pub metalness: f32,
}

#[derive(Debug, Clone)]
pub struct SkinData {
    pub name: String,
    /// Indices into [`ModelData::nodes`].
    pub joints: Vec<usize>,
    pub inverse_bind_matrices: Vec<Affine3A>,
}

/// Decoded model, not yet part of any scene.
#[derive(Debug, Clone, Default)]
pub struct ModelData {
    pub name: String,
    pub nodes: Vec<NodeData>,
    /// Top-level nodes of the default scene.
    pub roots: Vec<usize>,
    /// One entry per glTF mesh, each a list of primitives.
    pub meshes: Vec<Vec<PrimitiveData>>,
    pub materials: Vec<MaterialData>,
    /// `None` where the image used a pixel format that is not supported.
    pub images: Vec<Option<Texture>>,
    pub skins: Vec<SkinData>,
    pub clips: Vec<AnimationClip>,
}

/// Result of placing a [`ModelData`] into a scene.
#[derive(Debug, Clone)]
pub struct LoadedModel {
    /// Wrapper node above the model's own roots.
    pub root: NodeHandle,
    pub clips: Vec<Arc<AnimationClip>>,
}

// ============================================================================
// Parsing
// ============================================================================

impl ModelData {
    /// Decodes a self-contained glTF (GLB or embedded buffers).
    pub fn parse(bytes: &[u8], name: &str) -> Result<Self> {
        let (document, buffers, images) = gltf::import_slice(bytes)?;
        let buffer_data = |buffer: gltf::Buffer<'_>| buffers.get(buffer.index()).map(|d| d.0.as_slice());

        let nodes: Vec<NodeData> = document.nodes().map(|node| read_node(&node)).collect();

        let roots = match document.default_scene().or_else(|| document.scenes().next()) {
            Some(scene) => scene.nodes().map(|n| n.index()).collect(),
            None => parentless_nodes(&nodes),
        };

        let meshes = document
            .meshes()
            .map(|mesh| {
                mesh.primitives()
                    .filter_map(|primitive| read_primitive(&primitive, &buffer_data))
                    .collect()
            })
            .collect();

        let materials = document.materials().map(|m| read_material(&m)).collect();

        let images = images
            .into_iter()
            .enumerate()
            .map(|(index, data)| convert_image(index, data))
            .collect();

        let skins = document
            .skins()
            .map(|skin| {
                let reader = skin.reader(buffer_data);
                let inverse_bind_matrices = reader
                    .read_inverse_bind_matrices()
                    .map(|iter| {
                        iter.map(|m| Affine3A::from_mat4(Mat4::from_cols_array_2d(&m)))
                            .collect()
                    })
                    .unwrap_or_default();
                SkinData {
                    name: skin.name().map_or_else(|| format!("skin_{}", skin.index()), str::to_string),
                    joints: skin.joints().map(|j| j.index()).collect(),
                    inverse_bind_matrices,
                }
            })
            .collect();

        let clips = document
            .animations()
            .map(|animation| read_animation(&animation, &nodes, &buffer_data))
            .collect();

        let model = Self {
            name: name.to_string(),
            nodes,
            roots,
            meshes,
            materials,
            images,
            skins,
            clips,
        };

        log::info!(
            "Parsed '{}': {} nodes, {} meshes, {} skins, {} clips",
            model.name,
            model.nodes.len(),
            model.meshes.len(),
            model.skins.len(),
            model.clips.len()
        );

        if model.roots.is_empty() {
            return Err(Error::UnsupportedGltf(format!("'{name}' has no scene nodes")));
        }

        Ok(model)
    }

    /// Finds a clip by exact name.
    #[must_use]
    pub fn clip(&self, name: &str) -> Option<&AnimationClip> {
        self.clips.iter().find(|c| c.name == name)
    }
}

fn node_name(node: &gltf::Node<'_>) -> String {
    node.name().map_or_else(|| format!("node_{}", node.index()), str::to_string)
}

fn read_node(node: &gltf::Node<'_>) -> NodeData {
    let (translation, rotation, scale) = node.transform().decomposed();
    NodeData {
        name: node_name(node),
        translation: Vec3::from_array(translation),
        rotation: Quat::from_array(rotation),
        scale: Vec3::from_array(scale),
        children: node.children().map(|c| c.index()).collect(),
        mesh: node.mesh().map(|m| m.index()),
        skin: node.skin().map(|s| s.index()),
    }
}

fn parentless_nodes(nodes: &[NodeData]) -> Vec<usize> {
    let mut has_parent = vec![false; nodes.len()];
    for node in nodes {
        for &child in &node.children {
            if let Some(flag) = has_parent.get_mut(child) {
                *flag = true;
            }
        }
    }
    (0..nodes.len()).filter(|&i| !has_parent[i]).collect()
}

fn read_primitive<'s, F>(primitive: &gltf::Primitive<'_>, buffer_data: &F) -> Option<PrimitiveData>
where
    F: Clone + for<'b> Fn(gltf::Buffer<'b>) -> Option<&'s [u8]>,
{
    if primitive.mode() != gltf::mesh::Mode::Triangles {
        log::warn!("Skipping primitive with unsupported mode {:?}", primitive.mode());
        return None;
    }

    let reader = primitive.reader(buffer_data.clone());

    let Some(positions) = reader.read_positions() else {
        log::warn!("Skipping primitive without positions");
        return None;
    };
    let positions: Vec<[f32; 3]> = positions.collect();
    let normals: Vec<[f32; 3]> = reader.read_normals().map(|n| n.collect()).unwrap_or_default();
    let uvs: Vec<[f32; 2]> = reader
        .read_tex_coords(0)
        .map(|tc| tc.into_f32().collect())
        .unwrap_or_default();
    let indices: Vec<u32> = match reader.read_indices() {
        Some(indices) => indices.into_u32().collect(),
        None => (0..positions.len() as u32).collect(),
    };

    let mut geometry = Geometry::new(positions, normals, uvs, indices);

    if let (Some(joints), Some(weights)) = (reader.read_joints(0), reader.read_weights(0)) {
        geometry = geometry.with_skin(joints.into_u16().collect(), weights.into_f32().collect());
    }

    Some(PrimitiveData {
        geometry,
        material: primitive.material().index(),
    })
}

fn read_material(material: &gltf::Material<'_>) -> MaterialData {
    let pbr = material.pbr_metallic_roughness();
    MaterialData {
        name: material.name().unwrap_or("material").to_string(),
        base_color: Vec4::from_array(pbr.base_color_factor()),
        base_color_image: pbr.base_color_texture().map(|info| info.texture().source().index()),
        roughness: pbr.roughness_factor(),
        metalness: pbr.metallic_factor(),
    }
}

fn convert_image(index: usize, data: gltf::image::Data) -> Option<Texture> {
    use gltf::image::Format;

    let rgba: Vec<u8> = match data.format {
        Format::R8G8B8A8 => data.pixels,
        Format::R8G8B8 => data
            .pixels
            .chunks_exact(3)
            .flat_map(|c| [c[0], c[1], c[2], 255])
            .collect(),
        Format::R8G8 => data
            .pixels
            .chunks_exact(2)
            .flat_map(|c| [c[0], c[1], 0, 255])
            .collect(),
        Format::R8 => data.pixels.iter().flat_map(|&v| [v, v, v, 255]).collect(),
        other => {
            log::warn!("Image {index}: unsupported pixel format {other:?}, ignored");
            return None;
        }
    };

    if rgba.len() != (data.width * data.height * 4) as usize {
        log::warn!("Image {index}: pixel data does not match {}x{}", data.width, data.height);
        return None;
    }

    Some(Texture::from_rgba8(&format!("image_{index}"), data.width, data.height, rgba))
}

fn read_animation<'s, F>(animation: &gltf::Animation<'_>, nodes: &[NodeData], buffer_data: &F) -> AnimationClip
where
    F: Clone + for<'b> Fn(gltf::Buffer<'b>) -> Option<&'s [u8]>,
{
    use gltf::animation::util::ReadOutputs;

    let clip_name = animation
        .name()
        .map_or_else(|| format!("animation_{}", animation.index()), str::to_string);
    let mut tracks = Vec::new();

    for channel in animation.channels() {
        let target = channel.target();
        let Some(node_name) = nodes.get(target.node().index()).map(|n| n.name.clone()) else {
            continue;
        };

        let interpolation = match channel.sampler().interpolation() {
            gltf::animation::Interpolation::Linear => InterpolationMode::Linear,
            gltf::animation::Interpolation::Step => InterpolationMode::Step,
            gltf::animation::Interpolation::CubicSpline => InterpolationMode::CubicSpline,
        };

        let reader = channel.reader(buffer_data.clone());
        let (Some(inputs), Some(outputs)) = (reader.read_inputs(), reader.read_outputs()) else {
            log::warn!("Clip '{clip_name}': channel on '{node_name}' has no sampler data");
            continue;
        };
        let times: Vec<f32> = inputs.collect();

        let (target_path, data) = match outputs {
            ReadOutputs::Translations(iter) => (
                TargetPath::Translation,
                TrackData::Vector3(KeyframeTrack::new(times, iter.map(Vec3::from_array).collect(), interpolation)),
            ),
            ReadOutputs::Scales(iter) => (
                TargetPath::Scale,
                TrackData::Vector3(KeyframeTrack::new(times, iter.map(Vec3::from_array).collect(), interpolation)),
            ),
            ReadOutputs::Rotations(iter) => (
                TargetPath::Rotation,
                TrackData::Quaternion(KeyframeTrack::new(
                    times,
                    iter.into_f32().map(Quat::from_array).collect(),
                    interpolation,
                )),
            ),
            ReadOutputs::MorphTargetWeights(_) => {
                log::debug!("Clip '{clip_name}': morph weight channel on '{node_name}' ignored");
                continue;
            }
        };

        let well_formed = match &data {
            TrackData::Vector3(track) => track.is_well_formed(),
            TrackData::Quaternion(track) => track.is_well_formed(),
        };
        if !well_formed {
            log::warn!("Clip '{clip_name}': malformed {target_path:?} track on '{node_name}' skipped");
            continue;
        }

        tracks.push(Track {
            meta: TrackMeta {
                node_name,
                target: target_path,
            },
            data,
        });
    }

    AnimationClip::new(clip_name, tracks)
}

// ============================================================================
// Instantiation
// ============================================================================

impl ModelData {
    /// Inserts the model under a fresh top-level node and registers its
    /// resources. World matrices of the new subtree are valid on return.
    pub fn instantiate(self, scene: &mut Scene, assets: &mut AssetServer) -> LoadedModel {
        let textures: Vec<Option<TextureHandle>> = self
            .images
            .into_iter()
            .map(|image| image.map(|t| assets.add_texture(t)))
            .collect();

        let materials: Vec<MaterialHandle> = self
            .materials
            .iter()
            .map(|data| {
                let mut material = Material::new_standard(data.base_color)
                    .with_name(&data.name)
                    .with_roughness(data.roughness)
                    .with_metalness(data.metalness);
                material.map = data
                    .base_color_image
                    .and_then(|i| textures.get(i).copied().flatten());
                assets.add_material(material)
            })
            .collect();

        let mut default_material = None;
        let meshes: Vec<Vec<(GeometryHandle, MaterialHandle)>> = self
            .meshes
            .into_iter()
            .map(|primitives| {
                primitives
                    .into_iter()
                    .map(|primitive| {
                        let material = match primitive.material.and_then(|i| materials.get(i)) {
                            Some(&handle) => handle,
                            None => *default_material
                                .get_or_insert_with(|| assets.add_material(Material::default())),
                        };
                        (assets.add_geometry(primitive.geometry), material)
                    })
                    .collect()
            })
            .collect();

        let root = scene.add_node(Node::new(self.name.as_str()));

        // Nodes start detached; only those reachable from the glTF scene
        // roots end up under `root`.
        let handles: Vec<NodeHandle> = self
            .nodes
            .iter()
            .map(|data| {
                let mut node = Node::new(data.name.as_str());
                node.transform = Transform::from_trs(data.translation, data.rotation, data.scale);
                scene.nodes.insert(node)
            })
            .collect();

        for (index, data) in self.nodes.iter().enumerate() {
            for &child in &data.children {
                if let Some(&child_handle) = handles.get(child) {
                    scene.attach(child_handle, handles[index]);
                }
            }
        }
        for &index in &self.roots {
            if let Some(&handle) = handles.get(index) {
                scene.attach(handle, root);
            }
        }

        let skeletons: Vec<SkeletonKey> = self
            .skins
            .iter()
            .map(|skin| {
                let bones = skin
                    .joints
                    .iter()
                    .filter_map(|&j| handles.get(j).copied())
                    .collect();
                scene.add_skeleton(Skeleton::new(&skin.name, bones, skin.inverse_bind_matrices.clone()))
            })
            .collect();

        for (index, data) in self.nodes.iter().enumerate() {
            let Some(primitives) = data.mesh.and_then(|m| meshes.get(m)) else {
                continue;
            };
            let skin = data.skin.and_then(|s| skeletons.get(s).copied());
            let node_handle = handles[index];

            if let [(geometry, material)] = primitives.as_slice() {
                let key = scene.meshes.insert(Mesh::new(*geometry, *material).with_name(&data.name));
                if let Some(node) = scene.get_node_mut(node_handle) {
                    node.mesh = Some(key);
                    node.skin = skin;
                }
            } else {
                for (i, (geometry, material)) in primitives.iter().enumerate() {
                    let name = format!("{}_primitive_{i}", data.name);
                    let mesh = Mesh::new(*geometry, *material).with_name(&name);
                    let child = scene.add_mesh_to_parent(&name, mesh, node_handle);
                    if let Some(node) = scene.get_node_mut(child) {
                        node.skin = skin;
                    }
                }
            }
        }

        transform_system::update_subtree(&mut scene.nodes, root);
        for key in &skeletons {
            if let Some(skeleton) = scene.skeletons.get_mut(*key) {
                skeleton.compute_joint_matrices(&scene.nodes);
            }
        }

        LoadedModel {
            root,
            clips: self.clips.into_iter().map(Arc::new).collect(),
        }
    }
}
