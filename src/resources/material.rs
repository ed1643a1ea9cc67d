use glam::Vec4;

use crate::assets::TextureHandle;

/// Metallic-roughness surface description.
///
/// The forward shader treats `roughness`/`metalness` as a cheap specular
/// model: no image-based lighting is involved.
#[derive(Debug, Clone)]
pub struct Material {
    pub name: String,
    /// Linear RGBA base color, multiplied with `map`.
    pub color: Vec4,
    pub map: Option<TextureHandle>,
    pub roughness: f32,
    pub metalness: f32,
}

impl Material {
    #[must_use]
    pub fn new_standard(color: Vec4) -> Self {
        Self {
            name: "Standard".to_string(),
            color,
            map: None,
            roughness: 1.0,
            metalness: 0.0,
        }
    }

    #[must_use]
    pub fn with_name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    #[must_use]
    pub fn with_map(mut self, map: TextureHandle) -> Self {
        self.map = Some(map);
        self
    }

    #[must_use]
    pub fn with_roughness(mut self, roughness: f32) -> Self {
        self.roughness = roughness.clamp(0.0, 1.0);
        self
    }

    #[must_use]
    pub fn with_metalness(mut self, metalness: f32) -> Self {
        self.metalness = metalness.clamp(0.0, 1.0);
        self
    }
}

impl Default for Material {
    fn default() -> Self {
        Self::new_standard(Vec4::ONE)
    }
}
