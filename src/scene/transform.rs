use glam::{Affine3A, EulerRot, Mat3, Mat4, Quat, Vec3};

/// Position, rotation and scale of a node, with cached matrices.
///
/// The local matrix is only recomposed when one of the public TRS fields
/// differs from the value seen on the previous update (shadow-state check).
///
/// # Manual matrix mode
///
/// With `matrix_auto_update` cleared, [`Transform::update_local_matrix`] no
/// longer recomposes from TRS. The local matrix then only changes through
/// [`Transform::update_matrix`], which bakes the current TRS once. Animation
/// writes to TRS keep landing on the fields but stop reaching the matrix.
#[derive(Debug, Clone)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,

    /// When false, the local matrix is frozen until [`Transform::update_matrix`].
    pub matrix_auto_update: bool,

    pub(crate) local_matrix: Affine3A,
    pub(crate) world_matrix: Affine3A,

    last_position: Vec3,
    last_rotation: Quat,
    last_scale: Vec3,
    force_update: bool,
}

impl Transform {
    #[must_use]
    pub fn new() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
            matrix_auto_update: true,

            local_matrix: Affine3A::IDENTITY,
            world_matrix: Affine3A::IDENTITY,

            last_position: Vec3::ZERO,
            last_rotation: Quat::IDENTITY,
            last_scale: Vec3::ONE,
            force_update: true,
        }
    }

    /// Builds a transform from explicit TRS values.
    #[must_use]
    pub fn from_trs(position: Vec3, rotation: Quat, scale: Vec3) -> Self {
        Self {
            position,
            rotation,
            scale,
            ..Self::new()
        }
    }

    // ========================================================================
    // Shadow State Check
    // ========================================================================

    /// Recomposes the local matrix if TRS changed since the last call.
    ///
    /// Returns whether the local matrix changed, i.e. whether the world
    /// matrix of this node (and its subtree) must be refreshed.
    pub fn update_local_matrix(&mut self) -> bool {
        if !self.matrix_auto_update {
            return std::mem::take(&mut self.force_update);
        }

        let changed = self.position != self.last_position
            || self.rotation != self.last_rotation
            || self.scale != self.last_scale
            || self.force_update;

        if changed {
            self.compose();
        }

        changed
    }

    /// Bakes the current TRS into the local matrix immediately.
    ///
    /// This is the only way to move a node whose `matrix_auto_update` is off.
    pub fn update_matrix(&mut self) {
        self.compose();
        self.force_update = true;
    }

    fn compose(&mut self) {
        self.local_matrix =
            Affine3A::from_scale_rotation_translation(self.scale, self.rotation, self.position);
        self.last_position = self.position;
        self.last_rotation = self.rotation;
        self.last_scale = self.scale;
        self.force_update = false;
    }

    // ========================================================================
    // Getters & Helpers
    // ========================================================================

    /// Sets the rotation from XYZ Euler angles (radians).
    pub fn set_rotation_euler(&mut self, x: f32, y: f32, z: f32) {
        self.rotation = Quat::from_euler(EulerRot::XYZ, x, y, z);
    }

    /// Current rotation as XYZ Euler angles (radians).
    #[must_use]
    pub fn rotation_euler(&self) -> Vec3 {
        let (x, y, z) = self.rotation.to_euler(EulerRot::XYZ);
        Vec3::new(x, y, z)
    }

    #[inline]
    #[must_use]
    pub fn local_matrix(&self) -> &Affine3A {
        &self.local_matrix
    }

    /// World matrix as of the last hierarchy update.
    #[inline]
    #[must_use]
    pub fn world_matrix(&self) -> &Affine3A {
        &self.world_matrix
    }

    #[inline]
    #[must_use]
    pub fn world_matrix_as_mat4(&self) -> Mat4 {
        Mat4::from(self.world_matrix)
    }

    /// World-space translation as of the last hierarchy update.
    #[inline]
    #[must_use]
    pub fn world_position(&self) -> Vec3 {
        self.world_matrix.translation.into()
    }

    pub(crate) fn set_world_matrix(&mut self, mat: Affine3A) {
        self.world_matrix = mat;
    }

    /// Orients the node so that its -Z axis points at `target`.
    ///
    /// `target` and `up` are expressed in the parent's space. Degenerate
    /// configurations (target on the up axis) leave the rotation unchanged.
    pub fn look_at(&mut self, target: Vec3, up: Vec3) {
        let forward = (target - self.position).normalize_or_zero();
        if forward.cross(up).length_squared() < 1e-4 {
            return;
        }

        let right = forward.cross(up).normalize();
        let new_up = right.cross(forward).normalize();

        let rot_mat = Mat3::from_cols(right, new_up, -forward);
        self.rotation = Quat::from_mat3(&rot_mat);
    }

    /// Forces a recompose on the next update.
    pub fn mark_dirty(&mut self) {
        self.force_update = true;
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::new()
    }
}
