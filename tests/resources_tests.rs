//! Resource Component Tests
//!
//! Tests for:
//! - Texture: raw RGBA construction, disc sprite coverage, mip chains, decoding
//! - Material: builder clamping and defaults
//! - Points: star vertex layout and sprite material
//! - Input: press/release edges, deltas, per-frame reset

use glam::{Vec2, Vec4};

use robot_stage::resources::{ButtonState, ColorSpace, Input, Material, MouseButton, PointVertex, Points, PointsMaterial, Texture};

// ============================================================================
// Texture
// ============================================================================

#[test]
fn texture_from_rgba8_defaults() {
    let tex = Texture::from_rgba8("checker", 2, 2, vec![0; 16]);
    assert_eq!((tex.width, tex.height), (2, 2));
    assert_eq!(tex.color_space, ColorSpace::Srgb);
    assert!(tex.generate_mipmaps);
}

#[test]
fn white_texture_is_single_opaque_texel() {
    let tex = Texture::white();
    assert_eq!(tex.data, vec![255; 4]);
    assert_eq!(tex.mip_level_count(), 1);
    assert_eq!(tex.mip_chain().len(), 1);
}

#[test]
fn disc_sprite_is_opaque_center_transparent_corners() {
    let tex = Texture::disc_sprite(32);
    let alpha = |x: u32, y: u32| tex.data[((y * tex.width + x) * 4 + 3) as usize];

    assert_eq!(alpha(16, 16), 255);
    assert_eq!(alpha(0, 0), 0);
    assert_eq!(alpha(31, 31), 0);
}

#[test]
fn disc_sprite_has_minimum_size() {
    let tex = Texture::disc_sprite(0);
    assert_eq!((tex.width, tex.height), (2, 2));
}

#[test]
fn mip_chain_halves_to_one_texel() {
    let tex = Texture::from_rgba8("ramp", 8, 4, vec![128; 8 * 4 * 4]);
    assert_eq!(tex.mip_level_count(), 4);

    let chain = tex.mip_chain();
    let sizes: Vec<_> = chain.iter().map(|(w, h, _)| (*w, *h)).collect();
    assert_eq!(sizes, vec![(8, 4), (4, 2), (2, 1), (1, 1)]);
    for (w, h, data) in &chain {
        assert_eq!(data.len(), (w * h * 4) as usize);
    }
}

#[test]
fn decode_png_round_trip() {
    let mut bytes = Vec::new();
    let image = image::RgbaImage::from_pixel(3, 2, image::Rgba([10, 20, 30, 255]));
    image
        .write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
        .unwrap();

    let tex = Texture::decode("tiny.png", &bytes).unwrap();
    assert_eq!((tex.width, tex.height), (3, 2));
    assert_eq!(&tex.data[..4], &[10, 20, 30, 255]);
}

#[test]
fn decode_rejects_garbage() {
    assert!(Texture::decode("broken.png", b"not an image").is_err());
}

// ============================================================================
// Material
// ============================================================================

#[test]
fn material_defaults_are_rough_dielectric() {
    let mat = Material::default();
    assert_eq!(mat.color, Vec4::ONE);
    assert_eq!(mat.roughness, 1.0);
    assert_eq!(mat.metalness, 0.0);
    assert!(mat.map.is_none());
}

#[test]
fn material_builders_clamp_factors() {
    let mat = Material::new_standard(Vec4::new(0.5, 0.5, 0.5, 1.0))
        .with_name("Platform")
        .with_roughness(1.5)
        .with_metalness(-0.5);
    assert_eq!(mat.name, "Platform");
    assert_eq!(mat.roughness, 1.0);
    assert_eq!(mat.metalness, 0.0);
}

// ============================================================================
// Points
// ============================================================================

#[test]
fn point_vertex_is_tightly_packed() {
    assert_eq!(std::mem::size_of::<PointVertex>(), 32);
}

#[test]
fn points_report_length() {
    let star = PointVertex {
        position: [0.0, 90.0, 0.0],
        size: 2.0,
        color: [1.0, 1.0, 1.0, 1.0],
    };
    let points = Points::new(vec![star; 3], PointsMaterial::default());
    assert_eq!(points.len(), 3);
    assert!(!points.is_empty());
    assert!(Points::new(Vec::new(), PointsMaterial::default()).is_empty());
}

// ============================================================================
// Input
// ============================================================================

#[test]
fn input_press_and_release_edges() {
    let mut input = Input::new();
    input.inject_mouse_button(MouseButton::Left, ButtonState::Pressed);
    assert!(input.get_mouse_button(MouseButton::Left));
    assert!(input.get_mouse_button_down(MouseButton::Left));

    input.start_frame();
    assert!(input.get_mouse_button(MouseButton::Left));
    assert!(!input.get_mouse_button_down(MouseButton::Left));

    input.inject_mouse_button(MouseButton::Left, ButtonState::Released);
    assert!(!input.get_mouse_button(MouseButton::Left));
    assert!(input.get_mouse_button_up(MouseButton::Left));
}

#[test]
fn input_release_without_press_is_not_an_edge() {
    let mut input = Input::new();
    input.inject_mouse_button(MouseButton::Right, ButtonState::Released);
    assert!(!input.get_mouse_button_up(MouseButton::Right));
}

#[test]
fn input_accumulates_deltas_until_frame_start() {
    let mut input = Input::new();
    input.inject_mouse_position(10.0, 10.0);
    input.inject_mouse_position(15.0, 12.0);
    input.inject_mouse_position(20.0, 10.0);
    input.inject_scroll(0.0, 1.0);
    input.inject_scroll(0.0, 2.0);

    assert_eq!(input.mouse_delta(), Vec2::new(10.0, 0.0));
    assert_eq!(input.scroll_delta(), Vec2::new(0.0, 3.0));
    assert!(input.cursor_moved());

    input.start_frame();
    assert_eq!(input.mouse_delta(), Vec2::ZERO);
    assert_eq!(input.scroll_delta(), Vec2::ZERO);
    assert!(!input.cursor_moved());
    assert_eq!(input.mouse_position(), Vec2::new(20.0, 10.0));
}

#[test]
fn input_records_screen_size() {
    let mut input = Input::new();
    input.inject_resize(1280, 720);
    assert_eq!(input.screen_size(), Vec2::new(1280.0, 720.0));
}
