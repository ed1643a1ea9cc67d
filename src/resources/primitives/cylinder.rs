use std::f32::consts::TAU;

use glam::Vec3;

use crate::resources::geometry::Geometry;

#[derive(Debug, Clone, Copy)]
pub struct CylinderOptions {
    pub radius_top: f32,
    pub radius_bottom: f32,
    pub height: f32,
    pub radial_segments: u32,
    /// Skip the two caps.
    pub open_ended: bool,
}

impl Default for CylinderOptions {
    fn default() -> Self {
        Self {
            radius_top: 1.0,
            radius_bottom: 1.0,
            height: 1.0,
            radial_segments: 32,
            open_ended: false,
        }
    }
}

/// Capped cylinder centered on the origin, axis along +Y.
///
/// The side seam is duplicated so UVs wrap cleanly; caps use planar UVs.
#[must_use]
pub fn create_cylinder(options: &CylinderOptions) -> Geometry {
    let segments = options.radial_segments.max(3);
    let half_height = options.height * 0.5;

    let mut positions = Vec::new();
    let mut normals = Vec::new();
    let mut uvs = Vec::new();
    let mut indices = Vec::new();

    // --- Side ---
    let slope = (options.radius_bottom - options.radius_top) / options.height.max(f32::EPSILON);
    for (radius, y, v) in [
        (options.radius_top, half_height, 0.0),
        (options.radius_bottom, -half_height, 1.0),
    ] {
        for x in 0..=segments {
            let u = x as f32 / segments as f32;
            let (sin, cos) = (u * TAU).sin_cos();
            positions.push([radius * sin, y, radius * cos]);
            normals.push(Vec3::new(sin, slope, cos).normalize().to_array());
            uvs.push([u, 1.0 - v]);
        }
    }

    let row_len = segments + 1;
    for x in 0..segments {
        let a = x;
        let b = row_len + x;
        let c = row_len + x + 1;
        let d = x + 1;
        indices.extend_from_slice(&[a, b, d, b, c, d]);
    }

    // --- Caps ---
    if !options.open_ended {
        for (top, radius) in [(true, options.radius_top), (false, options.radius_bottom)] {
            if radius <= 0.0 {
                continue;
            }
            let sign = if top { 1.0 } else { -1.0 };
            let y = half_height * sign;

            let center = positions.len() as u32;
            positions.push([0.0, y, 0.0]);
            normals.push([0.0, sign, 0.0]);
            uvs.push([0.5, 0.5]);

            let ring = positions.len() as u32;
            for x in 0..=segments {
                let (sin, cos) = (x as f32 / segments as f32 * TAU).sin_cos();
                positions.push([radius * sin, y, radius * cos]);
                normals.push([0.0, sign, 0.0]);
                uvs.push([cos * 0.5 + 0.5, sin * 0.5 * sign + 0.5]);
            }

            for x in 0..segments {
                let i = ring + x;
                if top {
                    indices.extend_from_slice(&[i, i + 1, center]);
                } else {
                    indices.extend_from_slice(&[i + 1, i, center]);
                }
            }
        }
    }

    Geometry::new(positions, normals, uvs, indices)
}
