//! Geometry and BoundingBox Tests
//!
//! Tests for:
//! - BoundingBox construction from points
//! - Geometry attribute defaults and bounding box computation
//! - Skin attribute validation
//! - Primitive geometry creation (box, cylinder)

use glam::Vec3;

use robot_stage::resources::geometry::{BoundingBox, Geometry};
use robot_stage::resources::primitives::{CylinderOptions, create_box, create_cylinder};

const EPSILON: f32 = 1e-4;

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

fn vec3_approx(a: Vec3, b: Vec3) -> bool {
    approx(a.x, b.x) && approx(a.y, b.y) && approx(a.z, b.z)
}

// ============================================================================
// BoundingBox Tests
// ============================================================================

#[test]
fn bbox_from_points() {
    let bb = BoundingBox::from_points([Vec3::new(1.0, -2.0, 0.0), Vec3::new(-1.0, 3.0, 0.5)]).unwrap();
    assert!(vec3_approx(bb.min, Vec3::new(-1.0, -2.0, 0.0)));
    assert!(vec3_approx(bb.max, Vec3::new(1.0, 3.0, 0.5)));
    assert!(BoundingBox::from_points(std::iter::empty()).is_none());
}

// ============================================================================
// Geometry Tests
// ============================================================================

#[test]
fn geometry_defaults_missing_attributes() {
    let geom = Geometry::new(
        vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
        Vec::new(),
        Vec::new(),
        vec![0, 1, 2],
    );
    assert_eq!(geom.vertex_count(), 3);
    assert_eq!(geom.normals, vec![[0.0, 1.0, 0.0]; 3]);
    assert_eq!(geom.uvs, vec![[0.0, 0.0]; 3]);
    assert!(!geom.is_skinned());

    let bb = geom.bounding_box().unwrap();
    assert!(vec3_approx(bb.max, Vec3::new(1.0, 1.0, 0.0)));
}

#[test]
fn geometry_with_skin_checks_lengths() {
    let positions = vec![[0.0; 3]; 2];
    let skinned = Geometry::new(positions.clone(), Vec::new(), Vec::new(), vec![0, 1, 0])
        .with_skin(vec![[0, 0, 0, 0]; 2], vec![[1.0, 0.0, 0.0, 0.0]; 2]);
    assert!(skinned.is_skinned());

    let mismatched = Geometry::new(positions, Vec::new(), Vec::new(), vec![0, 1, 0])
        .with_skin(vec![[0, 0, 0, 0]; 1], vec![[1.0, 0.0, 0.0, 0.0]; 2]);
    assert!(!mismatched.is_skinned());
}

#[test]
fn geometry_empty_has_no_bounds() {
    let geom = Geometry::new(Vec::new(), Vec::new(), Vec::new(), Vec::new());
    assert!(geom.bounding_box().is_none());
}

// ============================================================================
// Primitive Tests
// ============================================================================

#[test]
fn box_bounding_volume() {
    let geom = create_box(2.0, 4.0, 6.0);
    let bb = geom.bounding_box().unwrap();
    assert!(vec3_approx(bb.min, Vec3::new(-1.0, -2.0, -3.0)));
    assert!(vec3_approx(bb.max, Vec3::new(1.0, 2.0, 3.0)));
}

#[test]
fn box_has_four_vertices_per_face() {
    let geom = create_box(1.0, 1.0, 1.0);
    assert_eq!(geom.vertex_count(), 24);
    assert_eq!(geom.indices.len(), 36);
    assert!(geom.indices.iter().all(|&i| (i as usize) < geom.vertex_count()));
}

#[test]
fn cylinder_dimensions() {
    let geom = create_cylinder(&CylinderOptions {
        radius_top: 3.0,
        radius_bottom: 3.0,
        height: 0.5,
        radial_segments: 32,
        open_ended: false,
    });
    let bb = geom.bounding_box().unwrap();
    assert!(approx(bb.min.y, -0.25) && approx(bb.max.y, 0.25));
    assert!(approx(bb.max.x, 3.0) && approx(bb.min.z, -3.0));
    assert!(geom.indices.iter().all(|&i| (i as usize) < geom.vertex_count()));
}

#[test]
fn cylinder_index_counts() {
    let segments = 16;
    let capped = create_cylinder(&CylinderOptions {
        radial_segments: segments,
        ..Default::default()
    });
    let open = create_cylinder(&CylinderOptions {
        radial_segments: segments,
        open_ended: true,
        ..Default::default()
    });

    let side = (segments * 6) as usize;
    let caps = (segments * 3 * 2) as usize;
    assert_eq!(open.indices.len(), side);
    assert_eq!(capped.indices.len(), side + caps);
}

#[test]
fn cylinder_cap_normals_face_out() {
    let geom = create_cylinder(&CylinderOptions::default());
    for (p, n) in geom.positions.iter().zip(&geom.normals) {
        let is_cap_vertex = (n[1].abs() - 1.0).abs() < EPSILON;
        if is_cap_vertex {
            assert_eq!(p[1].signum(), n[1].signum());
        }
    }
}

#[test]
fn cylinder_clamps_segment_count() {
    let geom = create_cylinder(&CylinderOptions {
        radial_segments: 1,
        open_ended: true,
        ..Default::default()
    });
    assert_eq!(geom.indices.len(), 3 * 6);
}
