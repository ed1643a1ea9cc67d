//! Scene Integration Tests
//!
//! Tests for:
//! - Scene: add nodes, attach/re-parent hierarchy
//! - Node queries: name lookup, subtree collection
//! - Components: cameras (active camera, screen rays), lights, points
//! - Skeletons: joint matrices and CPU skinning
//! - World-space positions and triangle ray casts of static and skinned meshes

use glam::{Affine3A, Mat4, Vec2, Vec3, Vec4};
use robot_stage::assets::AssetServer;
use robot_stage::resources::primitives::create_box;
use robot_stage::resources::{Material, Mesh, PointVertex, Points, PointsMaterial};
use robot_stage::scene::camera::Camera;
use robot_stage::scene::light::{Light, LightKind};
use robot_stage::scene::node::Node;
use robot_stage::scene::{NodeHandle, Scene, Skeleton};
use robot_stage::utils::raycast::Ray;

const EPSILON: f32 = 1e-4;

fn vec3_approx(a: Vec3, b: Vec3) -> bool {
    a.abs_diff_eq(b, EPSILON)
}

// ============================================================================
// Hierarchy
// ============================================================================

#[test]
fn scene_add_node_to_root() {
    let mut scene = Scene::new();
    let handle = scene.add_node(Node::new("A"));
    assert!(scene.root_nodes.contains(&handle));
    assert!(scene.get_node(handle).unwrap().parent().is_none());
}

#[test]
fn scene_add_to_parent() {
    let mut scene = Scene::new();
    let parent = scene.add_node(Node::new("Parent"));
    let child = scene.add_to_parent(Node::new("Child"), parent);

    assert_eq!(scene.get_node(child).unwrap().parent(), Some(parent));
    assert_eq!(scene.get_node(parent).unwrap().children(), &[child]);
    assert!(!scene.root_nodes.contains(&child));
}

#[test]
fn scene_attach_removes_from_old_parent() {
    let mut scene = Scene::new();
    let a = scene.add_node(Node::new("A"));
    let b = scene.add_node(Node::new("B"));
    let child = scene.add_to_parent(Node::new("Child"), a);

    scene.attach(child, b);
    assert!(scene.get_node(a).unwrap().children().is_empty());
    assert_eq!(scene.get_node(b).unwrap().children(), &[child]);
    assert_eq!(scene.get_node(child).unwrap().parent(), Some(b));
}

#[test]
fn scene_attach_root_leaves_root_list() {
    let mut scene = Scene::new();
    let a = scene.add_node(Node::new("A"));
    let b = scene.add_node(Node::new("B"));

    scene.attach(b, a);
    assert_eq!(scene.root_nodes, vec![a]);
}

#[test]
fn scene_attach_to_self_is_noop() {
    let mut scene = Scene::new();
    let a = scene.add_node(Node::new("A"));
    scene.attach(a, a);
    assert!(scene.get_node(a).unwrap().parent().is_none());
    assert!(scene.get_node(a).unwrap().children().is_empty());
}

#[test]
fn scene_attach_updates_world_matrix() {
    let mut scene = Scene::new();
    let parent = scene.add_node(Node::new("Parent"));
    let child = scene.add_node(Node::new("Child"));
    scene.get_node_mut(parent).unwrap().transform.position = Vec3::new(0.0, 5.0, 0.0);
    scene.update();

    scene.attach(child, parent);
    scene.update();
    assert!(vec3_approx(
        scene.get_node(child).unwrap().transform.world_position(),
        Vec3::new(0.0, 5.0, 0.0)
    ));
}

// ============================================================================
// Queries
// ============================================================================

#[test]
fn find_node_by_name_takes_first_depth_first_match() {
    let mut scene = Scene::new();
    let root = scene.add_node(Node::new("Root"));
    let arm = scene.add_to_parent(Node::new("Arm"), root);
    let first = scene.add_to_parent(Node::new("Hand"), arm);
    let _second = scene.add_to_parent(Node::new("Hand"), root);

    assert_eq!(scene.find_node_by_name(root, "Hand"), Some(first));
    assert_eq!(scene.find_node_by_name(root, "Root"), Some(root));
    assert_eq!(scene.find_node_by_name(arm, "Missing"), None);
}

#[test]
fn find_node_by_name_stays_in_subtree() {
    let mut scene = Scene::new();
    let a = scene.add_node(Node::new("A"));
    let _outside = scene.add_node(Node::new("Head"));
    assert_eq!(scene.find_node_by_name(a, "Head"), None);
}

#[test]
fn descendants_are_depth_first_preorder() {
    let mut scene = Scene::new();
    let root = scene.add_node(Node::new("Root"));
    let a = scene.add_to_parent(Node::new("A"), root);
    let a1 = scene.add_to_parent(Node::new("A1"), a);
    let b = scene.add_to_parent(Node::new("B"), root);

    assert_eq!(scene.descendants(root), vec![root, a, a1, b]);
    assert_eq!(scene.descendants(b), vec![b]);
}

// ============================================================================
// Cameras
// ============================================================================

#[test]
fn first_camera_becomes_active() {
    let mut scene = Scene::new();
    let first = scene.add_camera("Main", Camera::new_perspective(35.0, 1.5, 0.1, 100.0));
    let _second = scene.add_camera("Other", Camera::new_perspective(60.0, 1.0, 0.1, 100.0));

    assert_eq!(scene.active_camera, Some(first));
    assert!((scene.active_camera().unwrap().fov_degrees() - 35.0).abs() < EPSILON);
}

#[test]
fn camera_bundle_exposes_transform_and_camera() {
    let mut scene = Scene::new();
    let cam = scene.add_camera("Main", Camera::new_perspective(35.0, 1.0, 0.1, 100.0));
    let plain = scene.add_node(Node::new("Plain"));

    let (transform, camera) = scene.query_camera_bundle(cam).unwrap();
    transform.position = Vec3::new(0.0, 0.0, 10.0);
    camera.set_aspect(2.0);
    assert!(scene.query_camera_bundle(plain).is_none());

    scene.update();
    let camera = scene.active_camera().unwrap();
    assert!(vec3_approx(camera.position(), Vec3::new(0.0, 0.0, 10.0)));
    assert!((camera.aspect - 2.0).abs() < EPSILON);
}

#[test]
fn camera_rejects_invalid_aspect() {
    let mut camera = Camera::new_perspective(35.0, 1.0, 0.1, 100.0);
    camera.set_aspect(0.0);
    camera.set_aspect(f32::NAN);
    assert!((camera.aspect - 1.0).abs() < EPSILON);
}

#[test]
fn screen_ray_through_center_looks_forward() {
    let mut scene = Scene::new();
    let cam = scene.add_camera("Main", Camera::new_perspective(35.0, 1.0, 0.1, 100.0));
    {
        let t = &mut scene.get_node_mut(cam).unwrap().transform;
        t.position = Vec3::new(0.0, 2.0, 8.0);
        t.look_at(Vec3::new(0.0, 2.0, 0.0), Vec3::Y);
    }
    scene.update();

    let ray = scene.active_camera().unwrap().screen_ray(Vec2::ZERO);
    assert!(vec3_approx(ray.direction, Vec3::NEG_Z));
    assert!((ray.origin.z - (8.0 - 0.1)).abs() < 1e-3);

    // Up in NDC is up in the world.
    let up = scene.active_camera().unwrap().screen_ray(Vec2::new(0.0, 0.5));
    assert!(up.direction.y > 0.0);
}

#[test]
fn screen_ray_reprojects_to_same_ndc() {
    let mut scene = Scene::new();
    let cam = scene.add_camera("Main", Camera::new_perspective(35.0, 1.6, 0.1, 100.0));
    {
        let t = &mut scene.get_node_mut(cam).unwrap().transform;
        t.position = Vec3::new(3.0, 4.0, 8.0);
        t.look_at(Vec3::new(0.0, 0.5, -2.0), Vec3::Y);
    }
    scene.update();

    let camera = scene.active_camera().unwrap();
    let ndc = Vec2::new(0.3, -0.6);
    let point = camera.screen_ray(ndc).at(5.0);
    let back = camera.view_projection_matrix().project_point3(point);
    assert!((back.x - ndc.x).abs() < 1e-3 && (back.y - ndc.y).abs() < 1e-3);
}

// ============================================================================
// Lights & points
// ============================================================================

#[test]
fn iter_lights_skips_hidden_nodes() {
    let mut scene = Scene::new();
    scene.add_light("Ambient", Light::new_ambient(Vec3::ONE, 0.5));
    let sun = scene.add_light("Sun", Light::new_directional(Vec3::ONE, 1.0));
    scene.get_node_mut(sun).unwrap().transform.position = Vec3::new(5.0, 5.0, 5.0);
    scene.update();

    let lights: Vec<_> = scene.iter_lights().collect();
    assert_eq!(lights.len(), 2);
    let (_, sun_world) = lights.iter().find(|(l, _)| l.kind == LightKind::Directional).unwrap();
    assert!(vec3_approx(sun_world.translation.into(), Vec3::new(5.0, 5.0, 5.0)));

    scene.get_node_mut(sun).unwrap().visible = false;
    assert_eq!(scene.iter_lights().count(), 1);
}

#[test]
fn light_radiance_scales_color() {
    let light = Light::new_ambient(Vec3::new(1.0, 0.5, 0.0), 0.5);
    assert!(vec3_approx(light.radiance(), Vec3::new(0.5, 0.25, 0.0)));
}

#[test]
fn points_component_is_attached() {
    let mut scene = Scene::new();
    let vertices = vec![
        PointVertex {
            position: [0.0, 0.0, 90.0],
            size: 2.0,
            color: [1.0, 0.8, 0.0, 1.0],
        };
        3
    ];
    let material = PointsMaterial {
        size_scale: 1.0,
        map: None,
        alpha_test: 0.5,
    };
    let node = scene.add_points("Stars", Points::new(vertices, material));

    let key = scene.get_node(node).unwrap().points.unwrap();
    assert_eq!(scene.points[key].len(), 3);
}

// ============================================================================
// Skeletons & bounds
// ============================================================================

#[test]
fn joint_matrices_combine_bone_world_and_inverse_bind() {
    let mut scene = Scene::new();
    let bone = scene.add_node(Node::new("Bone"));
    scene.get_node_mut(bone).unwrap().transform.position = Vec3::new(0.0, 2.0, 0.0);
    let key = scene.add_skeleton(Skeleton::new(
        "Rig",
        vec![bone],
        vec![Affine3A::from_translation(Vec3::new(0.0, -1.0, 0.0))],
    ));
    scene.update();

    let joint = scene.skeletons[key].joint_matrices()[0];
    let expected = Mat4::from_translation(Vec3::new(0.0, 1.0, 0.0));
    assert!(joint.abs_diff_eq(expected, EPSILON));
}

#[test]
fn missing_inverse_bind_matrices_default_to_identity() {
    let mut scene = Scene::new();
    let a = scene.add_node(Node::new("A"));
    let b = scene.add_node(Node::new("B"));
    let skeleton = Skeleton::new("Rig", vec![a, b], Vec::new());
    assert_eq!(skeleton.joint_matrices().len(), 2);

    let key = scene.add_skeleton(skeleton);
    scene.update();
    assert!(scene.skeletons[key].joint_matrices()[1].abs_diff_eq(Mat4::IDENTITY, EPSILON));
}

#[test]
fn skin_position_blends_joint_matrices() {
    let mut scene = Scene::new();
    let a = scene.add_node(Node::new("A"));
    let b = scene.add_node(Node::new("B"));
    scene.get_node_mut(b).unwrap().transform.position = Vec3::new(2.0, 0.0, 0.0);
    let key = scene.add_skeleton(Skeleton::new("Rig", vec![a, b], Vec::new()));
    scene.update();

    let skeleton = &scene.skeletons[key];
    let half = skeleton.skin_position(Vec3::Y, [0, 1, 0, 0], [0.5, 0.5, 0.0, 0.0]);
    assert!(vec3_approx(half, Vec3::new(1.0, 1.0, 0.0)));

    // Out-of-range joints contribute nothing.
    let stray = skeleton.skin_position(Vec3::Y, [7, 0, 0, 0], [1.0, 0.0, 0.0, 0.0]);
    assert!(vec3_approx(stray, Vec3::ZERO));
}

// ============================================================================
// World-space geometry queries
// ============================================================================

fn static_box_scene() -> (Scene, AssetServer, NodeHandle) {
    let mut scene = Scene::new();
    let mut assets = AssetServer::new();
    let geometry = assets.add_geometry(create_box(2.0, 2.0, 2.0));
    let material = assets.add_material(Material::new_standard(Vec4::ONE));

    let root = scene.add_node(Node::new("Root"));
    let mesh = scene.add_mesh_to_parent("Box", Mesh::new(geometry, material), root);
    {
        let root = &mut scene.get_node_mut(root).unwrap().transform;
        root.position = Vec3::new(0.0, 0.0, -2.0);
        root.scale = Vec3::splat(0.5);
    }
    scene.get_node_mut(mesh).unwrap().transform.position = Vec3::new(0.0, 1.0, 0.0);
    scene.update();
    (scene, assets, root)
}

/// Thin skinned column, 0.4 wide and 6 tall, bound entirely to `Hip`.
fn skinned_column_scene() -> (Scene, AssetServer, NodeHandle, NodeHandle) {
    let mut scene = Scene::new();
    let mut assets = AssetServer::new();

    let mut column = create_box(0.4, 6.0, 0.4);
    for p in &mut column.positions {
        p[1] += 3.0;
    }
    let count = column.vertex_count();
    let column = column.with_skin(vec![[0, 0, 0, 0]; count], vec![[1.0, 0.0, 0.0, 0.0]; count]);
    let geometry = assets.add_geometry(column);
    let material = assets.add_material(Material::new_standard(Vec4::ONE));

    let root = scene.add_node(Node::new("Root"));
    let hip = scene.add_to_parent(Node::new("Hip"), root);
    let skin = scene.add_skeleton(Skeleton::new("Rig", vec![hip], Vec::new()));
    let body = scene.add_mesh_to_parent("Body", Mesh::new(geometry, material), root);
    {
        let body = scene.get_node_mut(body).unwrap();
        body.skin = Some(skin);
        // Ignored for skinned draws: joints are already in world space.
        body.transform.position = Vec3::new(50.0, 0.0, 0.0);
    }
    scene.update();
    (scene, assets, root, hip)
}

#[test]
fn world_positions_of_static_mesh() {
    let (scene, assets, root) = static_box_scene();
    let mesh = scene.find_node_by_name(root, "Box").unwrap();
    let positions = scene.world_positions(mesh, &assets).unwrap();

    for p in &positions {
        assert!((-0.5 - EPSILON..=0.5 + EPSILON).contains(&p.x));
        assert!((0.0 - EPSILON..=1.0 + EPSILON).contains(&p.y));
        assert!((-2.5 - EPSILON..=-1.5 + EPSILON).contains(&p.z));
    }
    assert!(scene.world_positions(root, &assets).is_none(), "root has no mesh");
}

#[test]
fn raycast_hits_nearest_face_of_static_mesh() {
    let (scene, assets, root) = static_box_scene();
    let ray = Ray::new(Vec3::new(0.0, 0.5, 5.0), Vec3::NEG_Z);
    let hit = scene.raycast(root, &ray, &assets).unwrap();
    assert!(vec3_approx(hit.point, Vec3::new(0.0, 0.5, -1.5)));
    assert!((hit.distance - 6.5).abs() < EPSILON);
}

#[test]
fn raycast_skips_hidden_meshes() {
    let (mut scene, assets, root) = static_box_scene();
    let mesh = scene.find_node_by_name(root, "Box").unwrap();
    scene.get_node_mut(mesh).unwrap().visible = false;
    let ray = Ray::new(Vec3::new(0.0, 0.5, 5.0), Vec3::NEG_Z);
    assert!(scene.raycast(root, &ray, &assets).is_none());
}

#[test]
fn raycast_without_meshes_is_none() {
    let mut scene = Scene::new();
    let assets = AssetServer::new();
    let root = scene.add_node(Node::new("Empty"));
    scene.add_to_parent(Node::new("Child"), root);
    scene.update();
    let ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::NEG_Z);
    assert!(scene.raycast(root, &ray, &assets).is_none());
}

#[test]
fn raycast_follows_skinned_pose() {
    let (mut scene, assets, root, hip) = skinned_column_scene();
    let level = Ray::new(Vec3::new(0.0, 1.0, 5.0), Vec3::NEG_Z);
    let hit = scene.raycast(root, &level, &assets).unwrap();
    assert!(vec3_approx(hit.point, Vec3::new(0.0, 1.0, 0.2)));

    // Just beside the column: inside any generous box, outside the surface.
    let beside = Ray::new(Vec3::new(0.5, 1.0, 5.0), Vec3::NEG_Z);
    assert!(scene.raycast(root, &beside, &assets).is_none());

    // Moving the bone moves the surface with it.
    scene.get_node_mut(hip).unwrap().transform.position = Vec3::new(0.5, 0.0, 0.0);
    scene.update();
    assert!(scene.raycast(root, &beside, &assets).is_some());
    assert!(scene.raycast(root, &level, &assets).is_none());
}
