use glam::{Affine3A, Vec3};
use slotmap::SlotMap;

use crate::assets::AssetServer;
use crate::resources::{BoundingBox, Geometry, Mesh, Points};
use crate::scene::camera::Camera;
use crate::scene::light::Light;
use crate::scene::node::Node;
use crate::scene::skeleton::Skeleton;
use crate::scene::transform::Transform;
use crate::scene::transform_system;
use crate::scene::{CameraKey, LightKey, MeshKey, NodeHandle, PointsKey, SkeletonKey};
use crate::utils::raycast::{Ray, RayHit, intersect_aabb, intersect_triangles};

/// Scene container: node storage plus component pools.
pub struct Scene {
    pub nodes: SlotMap<NodeHandle, Node>,
    pub root_nodes: Vec<NodeHandle>,

    pub meshes: SlotMap<MeshKey, Mesh>,
    pub skeletons: SlotMap<SkeletonKey, Skeleton>,
    pub cameras: SlotMap<CameraKey, Camera>,
    pub lights: SlotMap<LightKey, Light>,
    pub points: SlotMap<PointsKey, Points>,

    /// Node whose camera renders the frame.
    pub active_camera: Option<NodeHandle>,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: SlotMap::with_key(),
            root_nodes: Vec::new(),
            meshes: SlotMap::with_key(),
            skeletons: SlotMap::with_key(),
            cameras: SlotMap::with_key(),
            lights: SlotMap::with_key(),
            points: SlotMap::with_key(),
            active_camera: None,
        }
    }

    // ========================================================================
    // Hierarchy
    // ========================================================================

    /// Inserts a node at the top level.
    pub fn add_node(&mut self, node: Node) -> NodeHandle {
        let handle = self.nodes.insert(node);
        self.root_nodes.push(handle);
        handle
    }

    pub fn add_to_parent(&mut self, child: Node, parent: NodeHandle) -> NodeHandle {
        let handle = self.nodes.insert(child);
        let Some(p) = self.nodes.get_mut(parent) else {
            self.root_nodes.push(handle);
            return handle;
        };
        p.children.push(handle);
        self.nodes[handle].parent = Some(parent);
        handle
    }

    /// Re-parents `child` under `parent`, detaching it from wherever it was.
    pub fn attach(&mut self, child: NodeHandle, parent: NodeHandle) {
        if child == parent || !self.nodes.contains_key(parent) {
            return;
        }
        let Some(old_parent) = self.nodes.get(child).map(|n| n.parent) else {
            return;
        };

        match old_parent {
            Some(old) => {
                if let Some(p) = self.nodes.get_mut(old) {
                    p.children.retain(|&c| c != child);
                }
            }
            None => self.root_nodes.retain(|&r| r != child),
        }

        self.nodes[parent].children.push(child);
        if let Some(node) = self.nodes.get_mut(child) {
            node.parent = Some(parent);
            node.transform.mark_dirty();
        }
    }

    #[inline]
    #[must_use]
    pub fn get_node(&self, handle: NodeHandle) -> Option<&Node> {
        self.nodes.get(handle)
    }

    #[inline]
    pub fn get_node_mut(&mut self, handle: NodeHandle) -> Option<&mut Node> {
        self.nodes.get_mut(handle)
    }

    /// Depth-first search below (and including) `root` for a node named `name`.
    #[must_use]
    pub fn find_node_by_name(&self, root: NodeHandle, name: &str) -> Option<NodeHandle> {
        let mut stack = vec![root];
        while let Some(handle) = stack.pop() {
            let Some(node) = self.nodes.get(handle) else {
                continue;
            };
            if node.name == name {
                return Some(handle);
            }
            stack.extend(node.children.iter().rev().copied());
        }
        None
    }

    /// `root` followed by all of its descendants, depth-first.
    #[must_use]
    pub fn descendants(&self, root: NodeHandle) -> Vec<NodeHandle> {
        let mut out = Vec::new();
        let mut stack = vec![root];
        while let Some(handle) = stack.pop() {
            let Some(node) = self.nodes.get(handle) else {
                continue;
            };
            out.push(handle);
            stack.extend(node.children.iter().rev().copied());
        }
        out
    }

    // ========================================================================
    // Components
    // ========================================================================

    pub fn add_mesh(&mut self, name: &str, mesh: Mesh) -> NodeHandle {
        let key = self.meshes.insert(mesh);
        let mut node = Node::new(name);
        node.mesh = Some(key);
        self.add_node(node)
    }

    pub fn add_mesh_to_parent(&mut self, name: &str, mesh: Mesh, parent: NodeHandle) -> NodeHandle {
        let key = self.meshes.insert(mesh);
        let mut node = Node::new(name);
        node.mesh = Some(key);
        self.add_to_parent(node, parent)
    }

    pub fn add_skeleton(&mut self, skeleton: Skeleton) -> SkeletonKey {
        self.skeletons.insert(skeleton)
    }

    /// Adds a camera node; the first camera added becomes the active one.
    pub fn add_camera(&mut self, name: &str, camera: Camera) -> NodeHandle {
        let key = self.cameras.insert(camera);
        let mut node = Node::new(name);
        node.camera = Some(key);
        let handle = self.add_node(node);
        if self.active_camera.is_none() {
            self.active_camera = Some(handle);
        }
        handle
    }

    pub fn add_light(&mut self, name: &str, light: Light) -> NodeHandle {
        let key = self.lights.insert(light);
        let mut node = Node::new(name);
        node.light = Some(key);
        self.add_node(node)
    }

    pub fn add_points(&mut self, name: &str, points: Points) -> NodeHandle {
        let key = self.points.insert(points);
        let mut node = Node::new(name);
        node.points = Some(key);
        self.add_node(node)
    }

    /// Mutable transform and camera of a camera node.
    pub fn query_camera_bundle(&mut self, handle: NodeHandle) -> Option<(&mut Transform, &mut Camera)> {
        let node = self.nodes.get_mut(handle)?;
        let camera = self.cameras.get_mut(node.camera?)?;
        Some((&mut node.transform, camera))
    }

    #[must_use]
    pub fn active_camera(&self) -> Option<&Camera> {
        let node = self.nodes.get(self.active_camera?)?;
        self.cameras.get(node.camera?)
    }

    pub fn active_camera_mut(&mut self) -> Option<&mut Camera> {
        let node = self.nodes.get(self.active_camera?)?;
        self.cameras.get_mut(node.camera?)
    }

    /// Visible lights paired with their node's world matrix.
    pub fn iter_lights(&self) -> impl Iterator<Item = (&Light, &Affine3A)> {
        self.nodes.values().filter(|n| n.visible).filter_map(|node| {
            let light = self.lights.get(node.light?)?;
            Some((light, &node.transform.world_matrix))
        })
    }

    // ========================================================================
    // Per-frame update
    // ========================================================================

    /// Propagates transforms, then refreshes camera matrices and skinning.
    pub fn update(&mut self) {
        transform_system::update_hierarchy_iterative(&mut self.nodes, &self.root_nodes);
        self.update_cameras();
        self.update_skeletons();
    }

    fn update_cameras(&mut self) {
        for node in self.nodes.values() {
            let Some(key) = node.camera else {
                continue;
            };
            if let Some(camera) = self.cameras.get_mut(key) {
                camera.update_view_projection(&node.transform.world_matrix);
            }
        }
    }

    fn update_skeletons(&mut self) {
        for skeleton in self.skeletons.values_mut() {
            skeleton.compute_joint_matrices(&self.nodes);
        }
    }

    // ========================================================================
    // Queries
    // ========================================================================

    fn mesh_geometry<'a>(&self, handle: NodeHandle, assets: &'a AssetServer) -> Option<&'a Geometry> {
        let mesh = self.nodes.get(handle)?.mesh.and_then(|k| self.meshes.get(k))?;
        assets.get_geometry(mesh.geometry)
    }

    /// World-space vertex positions of a mesh node in its current pose.
    ///
    /// Skinned geometry is deformed with the skeleton's joint palette, which
    /// is already in world space; anything else goes through the node's
    /// world matrix.
    #[must_use]
    pub fn world_positions(&self, handle: NodeHandle, assets: &AssetServer) -> Option<Vec<Vec3>> {
        let node = self.nodes.get(handle)?;
        let geometry = self.mesh_geometry(handle, assets)?;

        let skeleton = node
            .skin
            .and_then(|k| self.skeletons.get(k))
            .filter(|_| geometry.is_skinned());

        let positions = match skeleton {
            Some(skeleton) => geometry
                .positions
                .iter()
                .zip(&geometry.joints)
                .zip(&geometry.weights)
                .map(|((&p, &joints), &weights)| skeleton.skin_position(Vec3::from(p), joints, weights))
                .collect(),
            None => geometry
                .positions
                .iter()
                .map(|&p| node.transform.world_matrix.transform_point3(Vec3::from(p)))
                .collect(),
        };
        Some(positions)
    }

    /// Nearest hit between `ray` and the triangles of the visible meshes
    /// under `root`, skinned meshes in their current pose.
    #[must_use]
    pub fn raycast(&self, root: NodeHandle, ray: &Ray, assets: &AssetServer) -> Option<RayHit> {
        self.descendants(root)
            .into_iter()
            .filter(|&handle| self.nodes.get(handle).is_some_and(|n| n.visible))
            .filter_map(|handle| {
                let geometry = self.mesh_geometry(handle, assets)?;
                let positions = self.world_positions(handle, assets)?;
                let bounds = BoundingBox::from_points(positions.iter().copied())?;
                intersect_aabb(ray, &bounds)?;
                intersect_triangles(ray, &positions, &geometry.indices)
            })
            .min_by(|a, b| a.distance.total_cmp(&b.distance))
    }
}
