//! Walkable area of the platform.

use glam::{Vec2, Vec3};

use crate::stage::settings::PlatformSettings;

/// Disk in the ground plane that every resolved walk target lies in.
///
/// `center` holds world `(x, z)`; heights pass through untouched.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlatformBounds {
    pub center: Vec2,
    pub radius: f32,
}

impl PlatformBounds {
    #[must_use]
    pub fn new(center: Vec2, radius: f32) -> Self {
        Self {
            center,
            radius: radius.max(0.0),
        }
    }

    /// Walkable disk of a platform centred on the world origin.
    #[must_use]
    pub fn from_settings(settings: &PlatformSettings) -> Self {
        Self::new(Vec2::ZERO, settings.walkable_radius())
    }

    #[must_use]
    pub fn contains(&self, point: Vec3) -> bool {
        Vec2::new(point.x, point.z).distance_squared(self.center) <= self.radius * self.radius
    }

    /// Projects a point outside the disk radially onto its edge, keeping the
    /// angle around the center. Points inside are returned unchanged.
    #[must_use]
    pub fn clamp(&self, point: Vec3) -> Vec3 {
        let offset = Vec2::new(point.x, point.z) - self.center;
        if offset.length() <= self.radius {
            return point;
        }
        let angle = offset.y.atan2(offset.x);
        let (sin, cos) = angle.sin_cos();
        Vec3::new(
            self.center.x + cos * self.radius,
            point.y,
            self.center.y + sin * self.radius,
        )
    }
}
