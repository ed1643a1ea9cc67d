//! Scene Graph
//!
//! Hierarchy and components of the stage:
//! - [`Node`]: named scene node with parent/child links and a [`Transform`]
//! - [`Scene`]: owns nodes and their components (meshes, skeletons, cameras,
//!   lights, point clouds)
//! - [`Camera`]: perspective camera with screen-ray construction
//! - [`Light`]: ambient and directional lights
//! - [`transform_system`]: hierarchy update decoupled from `Scene`

pub mod camera;
pub mod light;
pub mod node;
#[allow(clippy::module_inception)]
pub mod scene;
pub mod skeleton;
pub mod transform;
pub mod transform_system;

pub use camera::Camera;
pub use light::{Light, LightKind};
pub use node::Node;
pub use scene::Scene;
pub use skeleton::Skeleton;
pub use transform::Transform;

use slotmap::new_key_type;

new_key_type! {
    pub struct NodeHandle;
    pub struct MeshKey;
    pub struct CameraKey;
    pub struct LightKey;
    pub struct SkeletonKey;
    pub struct PointsKey;
}
