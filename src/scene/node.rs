use glam::Affine3A;

use crate::scene::transform::Transform;
use crate::scene::{CameraKey, LightKey, MeshKey, NodeHandle, PointsKey, SkeletonKey};

/// A scene node.
///
/// Nodes form a tree through `parent`/`children`. Components are referenced
/// by key and stored in the owning [`Scene`](crate::scene::Scene).
///
/// The `name` is what animation tracks and bone lookups (`"Head"`) bind to.
#[derive(Debug, Clone)]
pub struct Node {
    pub name: String,

    pub(crate) parent: Option<NodeHandle>,
    pub(crate) children: Vec<NodeHandle>,

    pub transform: Transform,
    pub visible: bool,

    // === Components ===
    pub mesh: Option<MeshKey>,
    /// Skeleton that deforms this node's mesh.
    pub skin: Option<SkeletonKey>,
    pub camera: Option<CameraKey>,
    pub light: Option<LightKey>,
    pub points: Option<PointsKey>,
}

impl Node {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent: None,
            children: Vec::new(),
            transform: Transform::new(),
            visible: true,
            mesh: None,
            skin: None,
            camera: None,
            light: None,
            points: None,
        }
    }

    #[inline]
    #[must_use]
    pub fn parent(&self) -> Option<NodeHandle> {
        self.parent
    }

    #[inline]
    #[must_use]
    pub fn children(&self) -> &[NodeHandle] {
        &self.children
    }

    #[inline]
    #[must_use]
    pub fn world_matrix(&self) -> &Affine3A {
        &self.transform.world_matrix
    }
}

impl Default for Node {
    fn default() -> Self {
        Self::new("")
    }
}
