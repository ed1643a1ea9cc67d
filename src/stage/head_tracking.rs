//! Idle head tracking.
//!
//! While the character idles its head turns toward the pointer. The head
//! bone's local matrix is baked by hand and excluded from automatic
//! recompute, so the clips keep animating the rest of the body while the
//! head holds the tracked pose. Outside `Idle` nothing is baked and the head
//! keeps its last pose.

use glam::Vec2;

use crate::scene::{NodeHandle, Scene};

/// Head rotation about the bone's local X (pitch) and Y (yaw), radians.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeadPose {
    pub pitch: f32,
    pub yaw: f32,
}

/// Linear map from pointer coordinates to a head pose within ±`range`.
///
/// Pointer up tilts the head up (negative pitch), pointer right turns it
/// right.
#[must_use]
pub fn pose_for_pointer(pointer: Vec2, range: f32) -> HeadPose {
    let p = pointer.clamp(Vec2::NEG_ONE, Vec2::ONE);
    HeadPose {
        pitch: -p.y * range,
        yaw: p.x * range,
    }
}

#[derive(Debug, Clone)]
pub struct HeadTracker {
    head: NodeHandle,
    range: f32,
    last_pose: Option<HeadPose>,
}

impl HeadTracker {
    #[must_use]
    pub fn new(head: NodeHandle, range: f32) -> Self {
        Self {
            head,
            range,
            last_pose: None,
        }
    }

    #[inline]
    #[must_use]
    pub fn head(&self) -> NodeHandle {
        self.head
    }

    /// Pose applied by the most recent idle update.
    #[inline]
    #[must_use]
    pub fn last_pose(&self) -> Option<HeadPose> {
        self.last_pose
    }

    /// Runs after the mixer each frame. Only `idle` frames move the head;
    /// roll is taken from whatever the clip wrote.
    pub fn update(&mut self, idle: bool, pointer: Vec2, scene: &mut Scene) {
        let Some(node) = scene.get_node_mut(self.head) else {
            return;
        };
        let transform = &mut node.transform;

        if !idle {
            transform.matrix_auto_update = false;
            return;
        }

        let pose = pose_for_pointer(pointer, self.range);
        let roll = transform.rotation_euler().z;
        transform.set_rotation_euler(pose.pitch, pose.yaw, roll);
        transform.update_matrix();
        transform.matrix_auto_update = false;
        self.last_pose = Some(pose);
    }
}
