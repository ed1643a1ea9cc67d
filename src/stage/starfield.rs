//! Starfield backdrop: a shell of tinted point sprites around the stage.

use std::f32::consts::TAU;

use rand::{Rng, RngExt};

use crate::resources::PointVertex;
use crate::stage::settings::{STAR_PALETTE, StarfieldSettings};

/// Scatters `settings.count` stars uniformly over a spherical shell.
///
/// Directions are uniform on the sphere (`cos φ` uniform in [-1, 1]); radii,
/// sizes and palette entries are uniform in their ranges.
pub fn generate<R: Rng + ?Sized>(rng: &mut R, settings: &StarfieldSettings) -> Vec<PointVertex> {
    let radius_span = (settings.max_radius - settings.min_radius).max(0.0);
    let size_span = (settings.max_size - settings.min_size).max(0.0);

    (0..settings.count)
        .map(|_| {
            let r = settings.min_radius + rng.random::<f32>() * radius_span;
            let theta = rng.random::<f32>() * TAU;
            let phi = (2.0 * rng.random::<f32>() - 1.0).clamp(-1.0, 1.0).acos();

            let (sin_phi, cos_phi) = phi.sin_cos();
            let (sin_theta, cos_theta) = theta.sin_cos();
            let position = [r * sin_phi * cos_theta, r * sin_phi * sin_theta, r * cos_phi];

            let hex = STAR_PALETTE[rng.random_range(0..STAR_PALETTE.len())];
            let [red, green, blue] = srgb_hex_to_linear(hex);

            PointVertex {
                position,
                size: settings.min_size + rng.random::<f32>() * size_span,
                color: [red, green, blue, 1.0],
            }
        })
        .collect()
}

/// `0xRRGGBB` in sRGB to linear RGB.
#[must_use]
pub fn srgb_hex_to_linear(hex: u32) -> [f32; 3] {
    let channel = |shift: u32| {
        let c = ((hex >> shift) & 0xFF) as f32 / 255.0;
        if c <= 0.04045 {
            c / 12.92
        } else {
            ((c + 0.055) / 1.055).powf(2.4)
        }
    };
    [channel(16), channel(8), channel(0)]
}
