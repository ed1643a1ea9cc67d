use image::{RgbaImage, imageops::FilterType};

use crate::errors::Result;

/// How texel values are to be interpreted by the sampler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ColorSpace {
    /// Color data (base color maps, sprites).
    #[default]
    Srgb,
    /// Non-color data.
    Linear,
}

/// Decoded RGBA8 image ready for upload.
#[derive(Debug, Clone)]
pub struct Texture {
    pub name: String,
    pub width: u32,
    pub height: u32,
    /// Tightly packed RGBA8, `width * height * 4` bytes.
    pub data: Vec<u8>,
    pub color_space: ColorSpace,
    /// Generate a mip chain on upload.
    pub generate_mipmaps: bool,
}

impl Texture {
    #[must_use]
    pub fn from_rgba8(name: &str, width: u32, height: u32, data: Vec<u8>) -> Self {
        debug_assert_eq!(data.len(), (width * height * 4) as usize);
        Self {
            name: name.to_string(),
            width,
            height,
            data,
            color_space: ColorSpace::Srgb,
            generate_mipmaps: true,
        }
    }

    /// Decodes an encoded image (PNG or JPEG) into RGBA8.
    pub fn decode(name: &str, bytes: &[u8]) -> Result<Self> {
        let image = image::load_from_memory(bytes)?.to_rgba8();
        let (width, height) = image.dimensions();
        Ok(Self::from_rgba8(name, width, height, image.into_raw()))
    }

    /// Single white texel, used where a material has no map.
    #[must_use]
    pub fn white() -> Self {
        let mut tex = Self::from_rgba8("white", 1, 1, vec![255; 4]);
        tex.generate_mipmaps = false;
        tex
    }

    /// White disc with a one-texel soft edge on a transparent background.
    #[must_use]
    pub fn disc_sprite(size: u32) -> Self {
        let size = size.max(2);
        let radius = size as f32 * 0.5;
        let mut data = Vec::with_capacity((size * size * 4) as usize);
        for y in 0..size {
            for x in 0..size {
                let dx = x as f32 + 0.5 - radius;
                let dy = y as f32 + 0.5 - radius;
                let coverage = (radius - (dx * dx + dy * dy).sqrt()).clamp(0.0, 1.0);
                data.extend_from_slice(&[255, 255, 255, (coverage * 255.0).round() as u8]);
            }
        }
        Self::from_rgba8("disc_sprite", size, size, data)
    }

    #[must_use]
    pub fn mip_level_count(&self) -> u32 {
        if self.generate_mipmaps {
            self.width.max(self.height).max(1).ilog2() + 1
        } else {
            1
        }
    }

    /// Full mip chain, level 0 first, each level box-filtered from the source.
    #[must_use]
    pub fn mip_chain(&self) -> Vec<(u32, u32, Vec<u8>)> {
        let mut levels = vec![(self.width, self.height, self.data.clone())];
        let count = self.mip_level_count();
        if count <= 1 {
            return levels;
        }

        let Some(source) = RgbaImage::from_raw(self.width, self.height, self.data.clone()) else {
            return levels;
        };

        for level in 1..count {
            let w = (self.width >> level).max(1);
            let h = (self.height >> level).max(1);
            let scaled = image::imageops::resize(&source, w, h, FilterType::Triangle);
            levels.push((w, h, scaled.into_raw()));
        }
        levels
    }
}
