//! Stage configuration.
//!
//! Every tunable of the interactive scene lives here with its default, so
//! tests can shrink or reshape the stage without touching the logic.

use std::f32::consts::PI;

use glam::Vec3;

pub const PLATFORM_TEXTURE_URL: &str =
    "https://raw.githubusercontent.com/mrdoob/three.js/master/examples/textures/planets/moon_1024.jpg";
pub const STAR_SPRITE_URL: &str = "https://threejs.org/examples/textures/sprites/circle.png";
pub const CHARACTER_MODEL_URL: &str = "https://modelviewer.dev/shared-assets/models/RobotExpressive.glb";

/// Golden star tints, as sRGB hex.
pub const STAR_PALETTE: [u32; 10] = [
    0xFF_D7_00, 0xFF_AA_00, 0xFC_D1_2A, 0xFF_E1_35, 0xFF_CE_00, 0xE1_C6_99, 0xF5_DE_B3, 0xC9_B0_37, 0xE5_E4_E2,
    0xFF_FA_CD,
];

/// Where the stage's assets come from. `None` skips the load entirely.
#[derive(Debug, Clone)]
pub struct AssetUrls {
    pub platform_texture: Option<String>,
    pub star_sprite: Option<String>,
    pub character_model: Option<String>,
}

impl Default for AssetUrls {
    fn default() -> Self {
        Self {
            platform_texture: Some(PLATFORM_TEXTURE_URL.into()),
            star_sprite: Some(STAR_SPRITE_URL.into()),
            character_model: Some(CHARACTER_MODEL_URL.into()),
        }
    }
}

impl AssetUrls {
    /// No remote assets at all; the character is attached by hand.
    #[must_use]
    pub fn none() -> Self {
        Self {
            platform_texture: None,
            star_sprite: None,
            character_model: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CameraSettings {
    /// Vertical field of view in degrees.
    pub fov: f32,
    pub near: f32,
    pub far: f32,
    pub position: Vec3,
    pub target: Vec3,
    pub damping: f32,
    pub min_polar_angle: f32,
    pub max_polar_angle: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    /// Reasserted on every resize.
    pub min_height: f32,
    /// Reasserted on every resize, for the orbit target.
    pub min_target_height: f32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            fov: 35.0,
            near: 0.1,
            far: 1000.0,
            position: Vec3::new(0.0, 2.0, 8.0),
            target: Vec3::new(0.0, 0.5, -2.0),
            damping: 0.05,
            min_polar_angle: PI / 4.0,
            max_polar_angle: PI / 2.5,
            min_distance: 5.0,
            max_distance: 15.0,
            min_height: 2.0,
            min_target_height: 0.5,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PlatformSettings {
    pub radius: f32,
    pub height: f32,
    pub segments: u32,
    pub roughness: f32,
    pub metalness: f32,
    /// Walk targets keep this far from the rim.
    pub edge_margin: f32,
}

impl Default for PlatformSettings {
    fn default() -> Self {
        Self {
            radius: 3.0,
            height: 0.5,
            segments: 32,
            roughness: 0.8,
            metalness: 0.2,
            edge_margin: 1.0,
        }
    }
}

impl PlatformSettings {
    /// Radius of the disk walk targets are clamped into.
    #[must_use]
    pub fn walkable_radius(&self) -> f32 {
        (self.radius - self.edge_margin).max(0.0)
    }
}

#[derive(Debug, Clone)]
pub struct StarfieldSettings {
    pub count: usize,
    pub min_radius: f32,
    pub max_radius: f32,
    pub min_size: f32,
    pub max_size: f32,
    pub alpha_test: f32,
    /// Rotation about +Y, radians per second.
    pub spin_rate: f32,
}

impl Default for StarfieldSettings {
    fn default() -> Self {
        Self {
            count: 2000,
            min_radius: 80.0,
            max_radius: 95.0,
            min_size: 1.5,
            max_size: 3.5,
            alpha_test: 0.5,
            // 0.0005 rad per frame at 60 fps
            spin_rate: 0.03,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CharacterSettings {
    pub position: Vec3,
    pub scale: f32,
    pub head_bone: String,
    pub idle_clip: String,
    pub walk_clip: String,
    /// Cross-fade between clips, in seconds.
    pub fade_duration: f32,
    /// Walk duration per unit of distance, in seconds.
    pub seconds_per_unit: f32,
    /// Largest head pitch/yaw, reached at the pointer's edge, in radians.
    pub head_range: f32,
}

impl Default for CharacterSettings {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, -2.0),
            scale: 0.25,
            head_bone: "Head".into(),
            idle_clip: "Idle".into(),
            walk_clip: "Walking".into(),
            fade_duration: 0.2,
            seconds_per_unit: 0.5,
            head_range: PI / 4.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct StageSettings {
    pub assets: AssetUrls,
    pub camera: CameraSettings,
    pub platform: PlatformSettings,
    pub starfield: StarfieldSettings,
    pub character: CharacterSettings,
    pub ambient_intensity: f32,
    pub sun_intensity: f32,
    pub sun_position: Vec3,
    /// A press and release closer than this (in pixels) is a click.
    pub click_threshold: f32,
}

impl Default for StageSettings {
    fn default() -> Self {
        Self {
            assets: AssetUrls::default(),
            camera: CameraSettings::default(),
            platform: PlatformSettings::default(),
            starfield: StarfieldSettings::default(),
            character: CharacterSettings::default(),
            ambient_intensity: 0.5,
            sun_intensity: 1.0,
            sun_position: Vec3::new(5.0, 5.0, 5.0),
            click_threshold: 4.0,
        }
    }
}

impl StageSettings {
    #[must_use]
    pub fn with_assets(mut self, assets: AssetUrls) -> Self {
        self.assets = assets;
        self
    }

    #[must_use]
    pub fn with_star_count(mut self, count: usize) -> Self {
        self.starfield.count = count;
        self
    }
}
