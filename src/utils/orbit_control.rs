use std::f32::consts::PI;

use glam::{Vec2, Vec3};

use crate::resources::input::{Input, MouseButton};
use crate::scene::transform::Transform;

/// Mouse-driven orbit camera around a target point.
///
/// Left drag rotates, right drag pans, the wheel zooms. The camera position
/// is kept in spherical coordinates around `center`: `theta` is the azimuth
/// around +Y measured from +Z, `phi` the polar angle from +Y.
#[derive(Debug, Clone)]
pub struct OrbitControls {
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub pan_speed: f32,
    pub damping_factor: f32,
    pub enable_damping: bool,

    pub min_distance: f32,
    pub max_distance: f32,
    pub min_polar_angle: f32,
    pub max_polar_angle: f32,

    pub center: Vec3,
    pub radius: f32,
    pub theta: f32,
    pub phi: f32,

    rotate_delta: Vec2,
}

impl OrbitControls {
    /// Orbit around `target`, starting from `position`.
    #[must_use]
    pub fn new(position: Vec3, target: Vec3) -> Self {
        let mut controls = Self {
            rotate_speed: 1.0,
            zoom_speed: 0.05,
            pan_speed: 1.0,
            damping_factor: 0.05,
            enable_damping: true,

            min_distance: 0.0,
            max_distance: f32::INFINITY,
            min_polar_angle: 0.0,
            max_polar_angle: PI,

            center: target,
            radius: 1.0,
            theta: 0.0,
            phi: PI * 0.5,

            rotate_delta: Vec2::ZERO,
        };
        controls.set_pose(position, target);
        controls
    }

    #[must_use]
    pub fn with_distance_limits(mut self, min: f32, max: f32) -> Self {
        self.min_distance = min;
        self.max_distance = max;
        self.apply_limits();
        self
    }

    #[must_use]
    pub fn with_polar_limits(mut self, min: f32, max: f32) -> Self {
        self.min_polar_angle = min;
        self.max_polar_angle = max;
        self.apply_limits();
        self
    }

    #[must_use]
    pub fn with_damping(mut self, damping_factor: f32) -> Self {
        self.enable_damping = damping_factor > 0.0;
        self.damping_factor = damping_factor;
        self
    }

    /// Re-derives the spherical state from an explicit camera pose.
    ///
    /// Limits are applied, so the resulting position may differ from
    /// `position`; read it back with [`OrbitControls::position`].
    pub fn set_pose(&mut self, position: Vec3, target: Vec3) {
        self.center = target;
        let offset = position - target;
        self.radius = offset.length().max(f32::EPSILON);
        self.theta = offset.x.atan2(offset.z);
        self.phi = (offset.y / self.radius).clamp(-1.0, 1.0).acos();
        self.apply_limits();
    }

    /// Camera position implied by the current spherical state.
    #[must_use]
    pub fn position(&self) -> Vec3 {
        let (sin_phi, cos_phi) = self.phi.sin_cos();
        let (sin_theta, cos_theta) = self.theta.sin_cos();
        self.center + Vec3::new(sin_phi * sin_theta, cos_phi, sin_phi * cos_theta) * self.radius
    }

    fn apply_limits(&mut self) {
        const EPS: f32 = 0.0001;
        let min_phi = self.min_polar_angle.max(EPS);
        let max_phi = self.max_polar_angle.min(PI - EPS).max(min_phi);
        self.phi = self.phi.clamp(min_phi, max_phi);
        self.radius = self.radius.clamp(self.min_distance, self.max_distance.max(self.min_distance));
    }

    /// Applies this frame's pointer input and writes the camera transform.
    pub fn update(&mut self, transform: &mut Transform, input: &Input, fov_degrees: f32, dt: f32) {
        let screen_height = input.screen_size().y.max(1.0);
        let cursor_delta = input.mouse_delta();

        if input.get_mouse_button(MouseButton::Left) {
            let rotate_per_pixel = 2.0 * PI / screen_height;
            self.rotate_delta -= cursor_delta * rotate_per_pixel * self.rotate_speed;
        }

        if self.enable_damping {
            let retention = (1.0 - self.damping_factor).powf(dt * 60.0);
            let delta_apply = self.rotate_delta * (1.0 - retention);
            self.theta += delta_apply.x;
            self.phi += delta_apply.y;
            self.rotate_delta *= retention;
        } else {
            self.theta += self.rotate_delta.x;
            self.phi += self.rotate_delta.y;
            self.rotate_delta = Vec2::ZERO;
        }

        let scroll = input.scroll_delta().y;
        if scroll != 0.0 {
            let scale = (1.0 - self.zoom_speed).powf(scroll.abs());
            if scroll > 0.0 {
                self.radius *= scale;
            } else {
                self.radius /= scale;
            }
        }

        self.apply_limits();

        if input.get_mouse_button(MouseButton::Right) {
            let half_fov = fov_degrees.to_radians() * 0.5;
            let world_per_pixel = 2.0 * self.radius * half_fov.tan() / screen_height;

            let forward = (self.center - self.position()).normalize_or_zero();
            let right = forward.cross(Vec3::Y).normalize_or_zero();
            let up = right.cross(forward).normalize_or_zero();

            self.center +=
                (right * -cursor_delta.x + up * cursor_delta.y) * world_per_pixel * self.pan_speed;
        }

        transform.position = self.position();
        transform.look_at(self.center, Vec3::Y);
    }
}
