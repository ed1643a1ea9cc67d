//! Uniform blocks shared with the WGSL shaders.
//!
//! Every field is a `Mat4` or `Vec4` so the Rust layout matches WGSL's
//! uniform address space without explicit padding.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3, Vec4};

use crate::scene::{LightKind, Scene};

#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct GlobalUniforms {
    pub view_projection: Mat4,
    pub camera_position: Vec4,
    /// Towards the light.
    pub light_direction: Vec4,
    pub light_color: Vec4,
    pub ambient_color: Vec4,
    /// `(width, height, 1 / width, 1 / height)`
    pub viewport: Vec4,
}

impl GlobalUniforms {
    /// Camera and light state of `scene` for a `width` x `height` target.
    #[must_use]
    pub fn from_scene(scene: &Scene, width: u32, height: u32) -> Self {
        let (view_projection, camera_position) = scene
            .active_camera()
            .map_or((Mat4::IDENTITY, Vec3::ZERO), |c| (c.view_projection_matrix(), c.position()));

        let mut ambient = Vec3::ZERO;
        let mut directional: Option<(Vec3, Vec3)> = None;
        for (light, world) in scene.iter_lights() {
            match light.kind {
                LightKind::Ambient => ambient += light.radiance(),
                LightKind::Directional => {
                    // Directional lights shine from their position towards
                    // the origin.
                    let direction = Vec3::from(world.translation).normalize_or(Vec3::Y);
                    match &mut directional {
                        Some((_, color)) => *color += light.radiance(),
                        None => directional = Some((direction, light.radiance())),
                    }
                }
            }
        }
        let (light_direction, light_color) = directional.unwrap_or((Vec3::Y, Vec3::ZERO));

        let w = width.max(1) as f32;
        let h = height.max(1) as f32;

        Self {
            view_projection,
            camera_position: camera_position.extend(1.0),
            light_direction: light_direction.extend(0.0),
            light_color: light_color.extend(1.0),
            ambient_color: ambient.extend(1.0),
            viewport: Vec4::new(w, h, 1.0 / w, 1.0 / h),
        }
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct ObjectUniforms {
    pub model: Mat4,
    pub normal_matrix: Mat4,
    pub base_color: Vec4,
    /// `(roughness, metalness, 0, skinned)`
    pub params: Vec4,
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct PointsUniforms {
    pub model: Mat4,
    /// `(size_scale, alpha_test, 0, 0)`
    pub params: Vec4,
}
