//! Stage Interaction Tests
//!
//! Tests for:
//! - Model attachment (idle start, head bone lookup, gesture discovery)
//! - Click routing: character gestures, platform walks, empty space
//! - Character hits against the posed skinned mesh
//! - Walk clamping, facing, wall-clock progress and arrival
//! - Input gating while walking and before the character exists
//! - Head tracking while idle, frozen pose otherwise
//! - Gesture completion returning to Idle exactly once
//! - Resize clamps and asynchronous load outcomes

use glam::{Affine3A, Quat, Vec2, Vec3};
use rand::SeedableRng;
use rand::rngs::StdRng;

use robot_stage::animation::{AnimationClip, InterpolationMode, KeyframeTrack, TargetPath, Track, TrackData, TrackMeta};
use robot_stage::assets::PendingAsset;
use robot_stage::assets::model::{ModelData, NodeData, PrimitiveData, SkinData};
use robot_stage::engine::FrameState;
use robot_stage::errors::Error;
use robot_stage::resources::primitives::create_box;
use robot_stage::resources::{ButtonState, Input, MouseButton};
use robot_stage::stage::settings::AssetUrls;
use robot_stage::stage::{AnimationState, ClickTarget, Stage, StageSettings};

const EPSILON: f32 = 1e-3;
const WIDTH: u32 = 800;
const HEIGHT: u32 = 600;

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

fn vec3_approx(a: Vec3, b: Vec3) -> bool {
    a.abs_diff_eq(b, EPSILON)
}

fn affine_approx(a: &Affine3A, b: &Affine3A) -> bool {
    a.abs_diff_eq(*b, 1e-5)
}

// ============================================================================
// Fixtures
// ============================================================================

fn hold_clip(name: &str, duration: f32) -> AnimationClip {
    hold_node_clip(name, "Body", Vec3::new(0.0, 3.0, 0.0), duration)
}

fn hold_node_clip(name: &str, node: &str, rest: Vec3, duration: f32) -> AnimationClip {
    AnimationClip::new(
        name,
        vec![Track {
            meta: TrackMeta {
                node_name: node.into(),
                target: TargetPath::Translation,
            },
            data: TrackData::Vector3(KeyframeTrack::new(
                vec![0.0, duration],
                vec![rest, rest],
                InterpolationMode::Linear,
            )),
        }],
    )
}

/// A box body with a head bone on top, standing on the model origin.
/// Model space: 6 units tall, so 1.5 units on stage at the default scale.
fn robot_model(gestures: &[&str]) -> ModelData {
    let mut body = NodeData::new("Body");
    body.translation = Vec3::new(0.0, 3.0, 0.0);
    body.mesh = Some(0);
    body.children = vec![1];

    let mut head = NodeData::new("Head");
    head.translation = Vec3::new(0.0, 3.0, 0.0);

    let mut clips = vec![hold_clip("Idle", 2.0), hold_clip("Walking", 1.0)];
    clips.extend(gestures.iter().map(|name| hold_clip(name, 1.0)));

    ModelData {
        name: "Robot".into(),
        nodes: vec![body, head],
        roots: vec![0],
        meshes: vec![vec![PrimitiveData {
            geometry: create_box(2.0, 6.0, 2.0),
            material: None,
        }]],
        clips,
        ..Default::default()
    }
}

fn test_settings() -> StageSettings {
    StageSettings::default()
        .with_assets(AssetUrls::none())
        .with_star_count(64)
}

fn empty_stage() -> Stage {
    let mut stage = Stage::with_rng(test_settings(), StdRng::seed_from_u64(7));
    stage.handle_resize(WIDTH, HEIGHT);
    stage
}

fn robot_stage() -> Stage {
    let mut stage = empty_stage();
    stage.attach_model(robot_model(&["Wave"])).expect("first model attaches");
    stage
}

/// A thin column skinned to a single "Hip" bone at the model origin.
/// Model space: 0.4 wide and 6 tall, so 0.1 by 1.5 on stage.
fn skinned_model() -> ModelData {
    let hip = NodeData::new("Hip");
    let mut body = NodeData::new("Body");
    body.mesh = Some(0);
    body.skin = Some(0);

    let mut column = create_box(0.4, 6.0, 0.4);
    for p in &mut column.positions {
        p[1] += 3.0;
    }
    let count = column.vertex_count();
    let column = column.with_skin(vec![[0, 0, 0, 0]; count], vec![[1.0, 0.0, 0.0, 0.0]; count]);

    let clips = ["Idle", "Walking", "Wave"]
        .into_iter()
        .map(|name| hold_node_clip(name, "Hip", Vec3::ZERO, 1.0))
        .collect();

    ModelData {
        name: "Rig".into(),
        nodes: vec![hip, body],
        roots: vec![0, 1],
        meshes: vec![vec![PrimitiveData {
            geometry: column,
            material: None,
        }]],
        skins: vec![SkinData {
            name: "Rig".into(),
            joints: vec![0],
            inverse_bind_matrices: Vec::new(),
        }],
        clips,
        ..Default::default()
    }
}

/// Normalized device coordinates of a world point as seen by the stage camera.
fn ndc_of(stage: &Stage, world: Vec3) -> Vec2 {
    let camera = stage.scene.active_camera().expect("stage has a camera");
    camera.view_projection_matrix().project_point3(world).truncate()
}

fn head_local(stage: &Stage) -> Affine3A {
    let head = stage.character().unwrap().head_tracker().unwrap().head();
    *stage.scene.get_node(head).unwrap().transform.local_matrix()
}

/// Steps the stage from `from` to `to` seconds at a fixed rate.
fn run(stage: &mut Stage, from: f32, to: f32, dt: f32) -> f32 {
    let steps = ((to - from) / dt).round() as u32;
    let mut now = from;
    for i in 1..=steps {
        now = from + i as f32 * dt;
        stage.advance(now, dt);
    }
    now
}

// ============================================================================
// Construction & attachment
// ============================================================================

#[test]
fn stage_builds_without_character() {
    let stage = empty_stage();
    assert!(stage.character().is_none());
    assert!(!stage.is_loading());
    assert!(!stage.is_walking());

    let stars = stage.scene.get_node(stage.stars()).unwrap();
    let points = stage.scene.points.get(stars.points.unwrap()).unwrap();
    assert_eq!(points.len(), 64);
}

#[test]
fn attach_starts_idle_at_spawn_point() {
    let stage = robot_stage();
    let character = stage.character().unwrap();

    assert_eq!(stage.animation_state(), Some(&AnimationState::Idle));
    assert!(vec3_approx(stage.character_position().unwrap(), Vec3::new(0.0, 0.0, -2.0)));
    assert_eq!(character.animator().gestures(), ["Wave".to_string()]);
    assert!(character.head_tracker().is_some());

    let root = stage.scene.get_node(character.root()).unwrap();
    assert!(vec3_approx(root.transform.scale, Vec3::splat(0.25)));
}

#[test]
fn second_model_is_ignored() {
    let mut stage = robot_stage();
    let first = stage.character().unwrap().root();
    assert!(stage.attach_model(robot_model(&[])).is_none());
    assert_eq!(stage.character().unwrap().root(), first);
}

#[test]
fn missing_head_bone_disables_tracking() {
    let mut stage = empty_stage();
    let mut model = robot_model(&["Wave"]);
    model.nodes[1].name = "Neck".into();
    stage.attach_model(model);
    assert!(stage.character().unwrap().head_tracker().is_none());

    // Still fully interactive.
    stage.advance(0.1, 0.1);
    assert!(stage.walk_to(Vec3::ZERO).is_some());
}

// ============================================================================
// Click routing
// ============================================================================

#[test]
fn click_without_character_is_ignored() {
    let mut stage = empty_stage();
    let ndc = ndc_of(&stage, Vec3::new(1.0, 0.0, 0.0));
    assert_eq!(stage.handle_click(ndc), ClickTarget::Nothing);
    assert!(!stage.is_walking());
}

#[test]
fn click_on_character_plays_gesture() {
    let mut stage = robot_stage();
    let ndc = ndc_of(&stage, Vec3::new(0.0, 0.75, -2.0));

    assert_eq!(stage.handle_click(ndc), ClickTarget::Character);
    assert_eq!(stage.animation_state(), Some(&AnimationState::Gesture("Wave".into())));
    assert!(!stage.is_walking());
}

#[test]
fn click_on_platform_starts_walk() {
    let mut stage = robot_stage();
    let ndc = ndc_of(&stage, Vec3::new(1.0, 0.0, 0.0));

    let ClickTarget::Ground(point) = stage.handle_click(ndc) else {
        panic!("expected a platform hit");
    };
    assert!(vec3_approx(point, Vec3::new(1.0, 0.0, 0.0)), "hit {point:?}");
    assert!(stage.is_walking());
    assert_eq!(stage.animation_state(), Some(&AnimationState::Walking));

    let plan = *stage.character().unwrap().locomotion().active().unwrap();
    assert!(approx(plan.yaw, 1.0_f32.atan2(2.0)));
    assert!(approx(plan.duration, 5.0_f32.sqrt() * 0.5));
}

#[test]
fn click_beside_skinned_character_hits_ground() {
    let mut stage = empty_stage();
    stage.attach_model(skinned_model()).expect("skinned model attaches");

    let ndc = ndc_of(&stage, Vec3::new(0.2, 0.0, -1.8));
    let ClickTarget::Ground(point) = stage.handle_click(ndc) else {
        panic!("expected the ground beside the character");
    };
    assert!(vec3_approx(point, Vec3::new(0.2, 0.0, -1.8)), "hit {point:?}");
    assert!(stage.is_walking());
}

#[test]
fn click_on_skinned_character_plays_gesture() {
    let mut stage = empty_stage();
    stage.attach_model(skinned_model()).expect("skinned model attaches");

    let ndc = ndc_of(&stage, Vec3::new(0.0, 0.75, -2.0));
    assert_eq!(stage.handle_click(ndc), ClickTarget::Character);
    assert_eq!(stage.animation_state(), Some(&AnimationState::Gesture("Wave".into())));
}

#[test]
fn click_into_empty_space_does_nothing() {
    let mut stage = robot_stage();
    let ndc = ndc_of(&stage, Vec3::new(0.0, 0.0, 6.0));
    assert_eq!(stage.handle_click(ndc), ClickTarget::Nothing);
    assert!(!stage.is_walking());
    assert_eq!(stage.animation_state(), Some(&AnimationState::Idle));
}

#[test]
fn press_release_through_input_clicks() {
    let mut stage = robot_stage();
    let ndc = ndc_of(&stage, Vec3::new(1.0, 0.0, 0.0));
    let pixel = Vec2::new(
        (ndc.x + 1.0) * 0.5 * WIDTH as f32,
        (1.0 - ndc.y) * 0.5 * HEIGHT as f32,
    );

    let mut input = Input::new();
    input.inject_resize(WIDTH, HEIGHT);
    input.inject_mouse_position(pixel.x, pixel.y);
    input.inject_mouse_button(MouseButton::Left, ButtonState::Pressed);
    stage.update(&input, &FrameState { time: 0.016, dt: 0.016, frame_count: 1 });
    assert!(!stage.is_walking(), "press alone is not a click");

    input.start_frame();
    input.inject_mouse_position(pixel.x + 1.0, pixel.y);
    input.inject_mouse_button(MouseButton::Left, ButtonState::Released);
    stage.update(&input, &FrameState { time: 0.032, dt: 0.016, frame_count: 2 });
    assert!(stage.is_walking());
}

#[test]
fn drag_is_not_a_click() {
    let mut stage = robot_stage();
    let mut input = Input::new();
    input.inject_resize(WIDTH, HEIGHT);
    input.inject_mouse_position(400.0, 500.0);
    input.inject_mouse_button(MouseButton::Left, ButtonState::Pressed);
    stage.update(&input, &FrameState { time: 0.016, dt: 0.016, frame_count: 1 });

    input.start_frame();
    input.inject_mouse_position(460.0, 500.0);
    input.inject_mouse_button(MouseButton::Left, ButtonState::Released);
    stage.update(&input, &FrameState { time: 0.032, dt: 0.016, frame_count: 2 });

    assert!(!stage.is_walking());
    assert_eq!(stage.animation_state(), Some(&AnimationState::Idle));
}

// ============================================================================
// Walking
// ============================================================================

#[test]
fn zero_distance_walk_completes_immediately() {
    let mut stage = robot_stage();
    let plan = stage.walk_to(Vec3::new(0.0, 0.0, -2.0)).unwrap();

    assert!(approx(plan.duration, 0.0));
    assert!(!stage.is_walking());
    assert_eq!(stage.animation_state(), Some(&AnimationState::Idle));
    assert!(approx(stage.character().unwrap().yaw(), 0.0));
}

#[test]
fn walk_target_is_clamped_to_platform() {
    let mut stage = robot_stage();
    stage.walk_to(Vec3::ZERO).unwrap();
    run(&mut stage, 0.0, 1.2, 0.05);
    assert!(!stage.is_walking());
    assert!(vec3_approx(stage.character_position().unwrap(), Vec3::ZERO));

    let plan = stage.walk_to(Vec3::new(10.0, 5.0, 0.0)).unwrap();
    assert!(vec3_approx(plan.target, Vec3::new(2.0, 0.0, 0.0)), "target {:?}", plan.target);
    assert!(approx(plan.yaw, std::f32::consts::FRAC_PI_2));
    assert!(approx(plan.duration, 1.0));
}

#[test]
fn walk_faces_target_then_resets_facing() {
    let mut stage = robot_stage();
    stage.walk_to(Vec3::new(1.0, 0.0, 0.0)).unwrap();

    let root = stage.character().unwrap().root();
    let expected = Quat::from_rotation_y(1.0_f32.atan2(2.0));
    let rotation = stage.scene.get_node(root).unwrap().transform.rotation;
    assert!(rotation.angle_between(expected) < EPSILON);

    run(&mut stage, 0.0, 1.5, 0.1);
    assert!(!stage.is_walking());
    assert!(vec3_approx(stage.character_position().unwrap(), Vec3::new(1.0, 0.0, 0.0)));
    assert!(approx(stage.character().unwrap().yaw(), 0.0));
    assert_eq!(stage.animation_state(), Some(&AnimationState::Idle));
}

#[test]
fn walk_progress_follows_wall_clock() {
    let mut smooth = robot_stage();
    let mut choppy = robot_stage();
    smooth.walk_to(Vec3::ZERO).unwrap();
    choppy.walk_to(Vec3::ZERO).unwrap();

    run(&mut smooth, 0.0, 0.5, 0.01);
    choppy.advance(0.5, 0.5);

    let a = smooth.character_position().unwrap();
    let b = choppy.character_position().unwrap();
    assert!(vec3_approx(a, b), "{a:?} vs {b:?}");
    assert!(approx(b.z, -1.0));
}

#[test]
fn clicks_are_gated_while_walking() {
    let mut stage = robot_stage();
    stage.walk_to(Vec3::new(1.0, 0.0, 0.0)).unwrap();
    stage.advance(0.1, 0.1);

    let on_character = ndc_of(&stage, stage.character_position().unwrap() + Vec3::Y * 0.75);
    assert_eq!(stage.handle_click(on_character), ClickTarget::Nothing);
    assert!(stage.walk_to(Vec3::new(-1.0, 0.0, 0.0)).is_none());
    assert!(stage.play_gesture().is_none());
    assert_eq!(stage.animation_state(), Some(&AnimationState::Walking));
}

// ============================================================================
// Gestures
// ============================================================================

#[test]
fn gesture_returns_to_idle_once() {
    let mut stage = robot_stage();
    assert_eq!(stage.play_gesture().as_deref(), Some("Wave"));

    let mut idle_transitions = 0;
    let mut previous = stage.animation_state().cloned();
    let mut now = 0.0;
    for _ in 0..40 {
        now += 0.1;
        stage.advance(now, 0.1);
        let state = stage.animation_state().cloned();
        if state != previous && state == Some(AnimationState::Idle) {
            idle_transitions += 1;
        }
        previous = state;
    }
    assert_eq!(idle_transitions, 1);
    assert_eq!(stage.animation_state(), Some(&AnimationState::Idle));

    // A second gesture after the first one finishes behaves the same.
    assert_eq!(stage.play_gesture().as_deref(), Some("Wave"));
    run(&mut stage, now, now + 2.0, 0.1);
    assert_eq!(stage.animation_state(), Some(&AnimationState::Idle));
}

#[test]
fn no_gesture_clips_means_no_gesture() {
    let mut stage = empty_stage();
    stage.attach_model(robot_model(&[]));

    let ndc = ndc_of(&stage, Vec3::new(0.0, 0.75, -2.0));
    assert_eq!(stage.handle_click(ndc), ClickTarget::Character);
    assert_eq!(stage.animation_state(), Some(&AnimationState::Idle));
}

// ============================================================================
// Head tracking
// ============================================================================

#[test]
fn head_follows_pointer_while_idle() {
    let mut stage = robot_stage();
    stage.handle_pointer_move(Vec2::new(0.5, -0.5));
    stage.advance(0.1, 0.1);

    let pose = stage.character().unwrap().head_tracker().unwrap().last_pose().unwrap();
    let range = std::f32::consts::FRAC_PI_4;
    assert!(approx(pose.pitch, 0.5 * range));
    assert!(approx(pose.yaw, 0.5 * range));

    let head = stage.character().unwrap().head_tracker().unwrap().head();
    let transform = &stage.scene.get_node(head).unwrap().transform;
    assert!(!transform.matrix_auto_update);
    let euler = transform.rotation_euler();
    assert!(approx(euler.x, pose.pitch) && approx(euler.y, pose.yaw));
}

#[test]
fn head_is_frozen_outside_idle() {
    let mut stage = robot_stage();
    stage.handle_pointer_move(Vec2::new(0.5, 0.5));
    stage.advance(0.1, 0.1);
    let baked = head_local(&stage);

    stage.walk_to(Vec3::ZERO).unwrap();
    stage.handle_pointer_move(Vec2::new(-1.0, -1.0));
    stage.advance(0.2, 0.1);
    stage.advance(0.3, 0.1);
    assert!(affine_approx(&head_local(&stage), &baked));

    // Back to idle: tracking resumes.
    run(&mut stage, 0.3, 1.5, 0.1);
    assert_eq!(stage.animation_state(), Some(&AnimationState::Idle));
    assert!(!affine_approx(&head_local(&stage), &baked));
}

// ============================================================================
// Viewport
// ============================================================================

#[test]
fn resize_updates_aspect() {
    let mut stage = empty_stage();
    stage.handle_resize(1000, 500);
    let camera = stage.scene.active_camera().unwrap();
    assert!(approx(camera.aspect, 2.0));

    // Degenerate sizes keep the last aspect.
    stage.handle_resize(0, 0);
    assert!(approx(stage.scene.active_camera().unwrap().aspect, 2.0));
}

#[test]
fn resize_raises_low_camera() {
    let mut settings = test_settings();
    settings.camera.position = Vec3::new(0.0, 1.0, 8.0);
    settings.camera.target = Vec3::new(0.0, 0.0, -2.0);
    settings.camera.min_polar_angle = 0.0;
    settings.camera.max_polar_angle = std::f32::consts::PI;

    let mut stage = Stage::with_rng(settings, StdRng::seed_from_u64(1));
    stage.handle_resize(WIDTH, HEIGHT);

    assert!(approx(stage.orbit().center.y, 0.5));
    assert!(approx(stage.orbit().position().y, 2.0));
    let camera = stage.scene.get_node(stage.camera()).unwrap();
    assert!(approx(camera.transform.world_position().y, 2.0));
}

// ============================================================================
// Loading
// ============================================================================

#[test]
fn failed_model_load_leaves_stage_empty() {
    let mut stage = empty_stage();
    stage.set_pending_model(PendingAsset::ready(
        "robot.glb",
        Err(Error::AssetNotFound("robot.glb".into())),
    ));
    assert!(stage.is_loading());

    let mut input = Input::new();
    input.inject_resize(WIDTH, HEIGHT);
    stage.update(&input, &FrameState { time: 0.016, dt: 0.016, frame_count: 1 });

    assert!(!stage.is_loading());
    assert!(stage.character().is_none());
    assert_eq!(stage.handle_click(Vec2::ZERO), ClickTarget::Nothing);
}

#[test]
fn delivered_model_is_attached_on_next_frame() {
    let mut stage = empty_stage();
    stage.set_pending_model(PendingAsset::ready("robot.glb", Ok(robot_model(&["Wave", "Dance"]))));

    let mut input = Input::new();
    input.inject_resize(WIDTH, HEIGHT);
    stage.update(&input, &FrameState { time: 0.016, dt: 0.016, frame_count: 1 });

    let character = stage.character().expect("model attached");
    assert_eq!(character.animator().gestures(), ["Wave".to_string(), "Dance".to_string()]);
    assert_eq!(stage.animation_state(), Some(&AnimationState::Idle));
}
