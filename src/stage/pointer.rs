//! Pointer tracking and click detection.

use glam::Vec2;

/// Pixel position to normalized device coordinates: x right and y up, both
/// in [-1, 1] across the viewport.
#[must_use]
pub fn to_ndc(pixel: Vec2, viewport: Vec2) -> Vec2 {
    let size = viewport.max(Vec2::ONE);
    Vec2::new(pixel.x / size.x * 2.0 - 1.0, -(pixel.y / size.y * 2.0 - 1.0))
}

/// Last known pointer position plus the press a click may complete.
#[derive(Debug, Clone)]
pub struct PointerState {
    ndc: Vec2,
    press: Option<Vec2>,
    click_threshold: f32,
}

impl PointerState {
    #[must_use]
    pub fn new(click_threshold: f32) -> Self {
        Self {
            ndc: Vec2::ZERO,
            press: None,
            click_threshold,
        }
    }

    /// Normalized pointer coordinates, clamped to [-1, 1].
    #[inline]
    #[must_use]
    pub fn ndc(&self) -> Vec2 {
        self.ndc
    }

    pub fn set_ndc(&mut self, ndc: Vec2) {
        self.ndc = ndc.clamp(Vec2::NEG_ONE, Vec2::ONE);
    }

    pub fn move_to(&mut self, pixel: Vec2, viewport: Vec2) {
        self.set_ndc(to_ndc(pixel, viewport));
    }

    pub fn press(&mut self, pixel: Vec2) {
        self.press = Some(pixel);
    }

    /// Ends a press. Returns the release position when the pointer travelled
    /// less than the click threshold, i.e. when this was a click rather than
    /// a drag.
    pub fn release(&mut self, pixel: Vec2) -> Option<Vec2> {
        let start = self.press.take()?;
        (start.distance(pixel) < self.click_threshold).then_some(pixel)
    }
}
