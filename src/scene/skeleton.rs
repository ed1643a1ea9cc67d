use glam::{Affine3A, Mat4, Vec3};
use slotmap::SlotMap;

use crate::scene::{Node, NodeHandle};

#[derive(Debug, Clone)]
pub struct Skeleton {
    pub name: String,

    /// Ordered bone list; `bones[i]` is joint `i` in the vertex data.
    pub bones: Vec<NodeHandle>,

    /// Mesh space to bone space, one per bone, from the bind pose.
    pub(crate) inverse_bind_matrices: Vec<Affine3A>,

    /// World-space skinning matrices, refreshed each frame.
    pub(crate) joint_matrices: Vec<Mat4>,
}

impl Skeleton {
    /// Missing inverse bind matrices default to identity.
    #[must_use]
    pub fn new(name: &str, bones: Vec<NodeHandle>, mut inverse_bind_matrices: Vec<Affine3A>) -> Self {
        let count = bones.len();
        inverse_bind_matrices.resize(count, Affine3A::IDENTITY);

        Self {
            name: name.to_string(),
            bones,
            inverse_bind_matrices,
            joint_matrices: vec![Mat4::IDENTITY; count],
        }
    }

    #[inline]
    #[must_use]
    pub fn joint_matrices(&self) -> &[Mat4] {
        &self.joint_matrices
    }

    /// Recomputes `bone_world * inverse_bind` for every joint.
    ///
    /// The result is in world space: skinned vertices are not transformed by
    /// the mesh node's own matrix afterwards.
    pub fn compute_joint_matrices(&mut self, nodes: &SlotMap<NodeHandle, Node>) {
        for (i, &bone_handle) in self.bones.iter().enumerate() {
            let Some(bone_node) = nodes.get(bone_handle) else {
                continue;
            };
            let ibm = self.inverse_bind_matrices[i];
            self.joint_matrices[i] = (bone_node.transform.world_matrix * ibm).into();
        }
    }

    /// World position of a vertex under the current pose, blended the same
    /// way the vertex shader blends it.
    #[must_use]
    pub fn skin_position(&self, position: Vec3, joints: [u16; 4], weights: [f32; 4]) -> Vec3 {
        joints
            .iter()
            .zip(weights)
            .filter(|&(_, weight)| weight != 0.0)
            .filter_map(|(&joint, weight)| {
                let matrix = self.joint_matrices.get(usize::from(joint))?;
                Some(matrix.transform_point3(position) * weight)
            })
            .sum()
    }
}
