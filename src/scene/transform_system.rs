//! Transform System
//!
//! Propagates local matrices down the hierarchy. Kept apart from [`Scene`]
//! so callers can borrow the node storage alone.
//!
//! A node's world matrix is recomputed when its own local matrix changed or
//! when any ancestor's world matrix changed this pass; untouched subtrees are
//! skipped.
//!
//! [`Scene`]: crate::scene::Scene

use glam::Affine3A;
use slotmap::SlotMap;

use crate::scene::NodeHandle;
use crate::scene::node::Node;

/// Updates world matrices for every tree rooted at `roots`.
///
/// Iterative depth-first walk, so deep bone chains cannot overflow the stack.
pub fn update_hierarchy_iterative(nodes: &mut SlotMap<NodeHandle, Node>, roots: &[NodeHandle]) {
    let mut stack: Vec<(NodeHandle, Affine3A, bool)> = roots
        .iter()
        .rev()
        .map(|&root| (root, Affine3A::IDENTITY, false))
        .collect();

    while let Some((handle, parent_world, parent_changed)) = stack.pop() {
        let Some(node) = nodes.get_mut(handle) else {
            continue;
        };

        let local_changed = node.transform.update_local_matrix();
        let world_changed = local_changed || parent_changed;
        if world_changed {
            let world = parent_world * node.transform.local_matrix;
            node.transform.set_world_matrix(world);
        }

        let world = node.transform.world_matrix;
        for &child in node.children.iter().rev() {
            stack.push((child, world, world_changed));
        }
    }
}

/// Forces a world-matrix refresh of one subtree.
///
/// The parent's world matrix is taken as already current.
pub fn update_subtree(nodes: &mut SlotMap<NodeHandle, Node>, root: NodeHandle) {
    let parent_world = nodes
        .get(root)
        .and_then(|n| n.parent)
        .and_then(|p| nodes.get(p))
        .map_or(Affine3A::IDENTITY, |p| p.transform.world_matrix);

    let mut stack = vec![(root, parent_world)];
    while let Some((handle, parent_world)) = stack.pop() {
        let Some(node) = nodes.get_mut(handle) else {
            continue;
        };
        node.transform.update_local_matrix();
        let world = parent_world * node.transform.local_matrix;
        node.transform.set_world_matrix(world);

        for &child in &node.children {
            stack.push((child, world));
        }
    }
}
