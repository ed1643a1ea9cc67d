//! Click resolution against the character and the platform.

use glam::Vec3;

use crate::utils::raycast::{CylinderVolume, Ray, RayHit};

/// What a click ray landed on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ClickTarget {
    Character,
    /// Nearest point on the platform.
    Ground(Vec3),
    Nothing,
}

/// Resolves a click from the ray's hit on the character's triangles, if
/// any, and the platform volume.
///
/// The character wins even when the platform is hit nearer along the ray.
#[must_use]
pub fn pick(ray: &Ray, character: Option<RayHit>, ground: &CylinderVolume) -> ClickTarget {
    if character.is_some() {
        return ClickTarget::Character;
    }
    match ground.intersect(ray) {
        Some(hit) => ClickTarget::Ground(hit.point),
        None => ClickTarget::Nothing,
    }
}
