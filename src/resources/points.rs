use bytemuck::{Pod, Zeroable};

use crate::assets::TextureHandle;

/// One sprite of a point cloud, laid out for direct upload as an instance.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct PointVertex {
    pub position: [f32; 3],
    /// World-space size, before `PointsMaterial::size_scale`.
    pub size: f32,
    /// Linear RGBA.
    pub color: [f32; 4],
}

#[derive(Debug, Clone)]
pub struct PointsMaterial {
    pub size_scale: f32,
    /// Sprite sampled over each point; its alpha drives `alpha_test`.
    pub map: Option<TextureHandle>,
    /// Fragments with sprite alpha below this are discarded.
    pub alpha_test: f32,
}

impl Default for PointsMaterial {
    fn default() -> Self {
        Self {
            size_scale: 1.0,
            map: None,
            alpha_test: 0.5,
        }
    }
}

/// Point cloud component, drawn as camera-facing sprites whose screen size
/// shrinks with distance.
#[derive(Debug, Clone, Default)]
pub struct Points {
    pub vertices: Vec<PointVertex>,
    pub material: PointsMaterial,
}

impl Points {
    #[must_use]
    pub fn new(vertices: Vec<PointVertex>, material: PointsMaterial) -> Self {
        Self { vertices, material }
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }
}
