//! Asset Loading Tests
//!
//! Tests for:
//! - AssetSource: URL and path classification, file names, background file reads
//! - PendingAsset: single delivery, disconnected loaders, file loads
//! - ModelData: glTF parsing (nodes, roots, clips) and error reporting
//! - ModelData::instantiate: wrapper root, hierarchy, meshes, world matrices
//! - AssetServer: handle-addressed storage

use std::path::PathBuf;
use std::time::{Duration, Instant};

use glam::{Vec3, Vec4};

use robot_stage::assets::model::{NodeData, PrimitiveData};
use robot_stage::assets::{AssetServer, AssetSource, ModelData, PendingAsset, load_model};
use robot_stage::errors::Error;
use robot_stage::resources::{Material, Texture};
use robot_stage::resources::primitives::create_box;
use robot_stage::scene::Scene;
use robot_stage::utils::raycast::Ray;

const EPSILON: f32 = 1e-5;

fn vec3_approx(a: Vec3, b: Vec3) -> bool {
    a.abs_diff_eq(b, EPSILON)
}

/// Two nodes, `Robot -> Head`, and a one-second clip moving `Robot` from
/// the origin to `(0, 2, 0)`. Buffers are embedded as a data URI.
const ROBOT_GLTF: &str = r#"{
    "asset": { "version": "2.0" },
    "scene": 0,
    "scenes": [{ "nodes": [0] }],
    "nodes": [
        { "name": "Robot", "translation": [0.0, 1.0, 0.0], "children": [1] },
        { "name": "Head", "translation": [0.0, 2.0, 0.0] }
    ],
    "buffers": [{
        "byteLength": 32,
        "uri": "data:application/octet-stream;base64,AAAAAAAAgD8AAAAAAAAAAAAAAAAAAAAAAAAAQAAAAAA="
    }],
    "bufferViews": [
        { "buffer": 0, "byteOffset": 0, "byteLength": 8 },
        { "buffer": 0, "byteOffset": 8, "byteLength": 24 }
    ],
    "accessors": [
        { "bufferView": 0, "componentType": 5126, "count": 2, "type": "SCALAR", "min": [0.0], "max": [1.0] },
        { "bufferView": 1, "componentType": 5126, "count": 2, "type": "VEC3" }
    ],
    "animations": [{
        "name": "Rise",
        "samplers": [{ "input": 0, "output": 1, "interpolation": "LINEAR" }],
        "channels": [{ "sampler": 0, "target": { "node": 0, "path": "translation" } }]
    }]
}"#;

fn wait_for<T: Send + 'static>(pending: &mut PendingAsset<T>) -> robot_stage::errors::Result<T> {
    let deadline = Instant::now() + Duration::from_secs(5);
    loop {
        if let Some(result) = pending.poll() {
            return result;
        }
        assert!(Instant::now() < deadline, "load of '{}' timed out", pending.label());
        std::thread::sleep(Duration::from_millis(5));
    }
}

// ============================================================================
// AssetSource
// ============================================================================

#[test]
fn source_classifies_urls_and_paths() {
    assert!(matches!(
        AssetSource::parse("https://example.com/models/robot.glb").unwrap(),
        AssetSource::Http(_)
    ));
    assert_eq!(
        AssetSource::parse("assets/robot.glb").unwrap(),
        AssetSource::File(PathBuf::from("assets/robot.glb"))
    );
}

#[test]
fn source_file_name_is_last_segment() {
    let http = AssetSource::parse("https://example.com/models/robot.glb").unwrap();
    assert_eq!(http.file_name(), "robot.glb");

    let file = AssetSource::parse("textures/floor.jpg").unwrap();
    assert_eq!(file.file_name(), "floor.jpg");
}

#[test]
fn source_rejects_malformed_url() {
    assert!(matches!(AssetSource::parse("http://"), Err(Error::UrlParseError(_))));
}

#[test]
fn file_fetch_delivers_bytes_off_thread() {
    let path = std::env::temp_dir().join(format!("robot_stage_fetch_{}.bin", std::process::id()));
    std::fs::write(&path, b"stage bytes").unwrap();

    let (sender, receiver) = flume::bounded(1);
    let caller = std::thread::current().id();
    AssetSource::File(path.clone()).fetch(move |bytes| {
        sender.send((bytes, std::thread::current().id())).unwrap();
    });

    let (bytes, worker) = receiver.recv_timeout(Duration::from_secs(5)).unwrap();
    std::fs::remove_file(&path).ok();
    assert_eq!(bytes.unwrap(), b"stage bytes");
    assert_ne!(worker, caller);
}

#[test]
fn file_fetch_reports_missing_file() {
    let path = std::env::temp_dir().join("robot_stage_no_such_asset.bin");
    let (sender, receiver) = flume::bounded(1);
    AssetSource::File(path).fetch(move |bytes| {
        sender.send(bytes).unwrap();
    });
    let result = receiver.recv_timeout(Duration::from_secs(5)).unwrap();
    assert!(matches!(result, Err(Error::IoError(e)) if e.kind() == std::io::ErrorKind::NotFound));
}

// ============================================================================
// PendingAsset
// ============================================================================

#[test]
fn ready_result_is_delivered_once() {
    let mut pending = PendingAsset::ready("answer", Ok(42));
    assert!(!pending.is_finished());
    assert_eq!(pending.poll().unwrap().unwrap(), 42);
    assert!(pending.is_finished());
    assert!(pending.poll().is_none());
}

#[test]
fn ready_error_is_delivered() {
    let mut pending: PendingAsset<u32> = PendingAsset::ready("missing", Err(Error::AssetNotFound("x".into())));
    assert!(matches!(pending.poll(), Some(Err(Error::AssetNotFound(_)))));
}

#[test]
fn missing_file_reports_io_error() {
    let path = std::env::temp_dir().join("robot_stage_no_such_model.glb");
    let mut pending = load_model(path.to_str().unwrap());
    assert!(matches!(wait_for(&mut pending), Err(Error::IoError(_))));
}

#[test]
fn file_model_loads_in_background() {
    let path = std::env::temp_dir().join(format!("robot_stage_{}.gltf", std::process::id()));
    std::fs::write(&path, ROBOT_GLTF).unwrap();

    let mut pending = load_model(path.to_str().unwrap());
    let model = wait_for(&mut pending).unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(model.nodes.len(), 2);
    assert!(model.clip("Rise").is_some());
}

// ============================================================================
// ModelData parsing
// ============================================================================

#[test]
fn parse_reads_nodes_and_roots() {
    let model = ModelData::parse(ROBOT_GLTF.as_bytes(), "robot").unwrap();

    assert_eq!(model.name, "robot");
    assert_eq!(model.roots, vec![0]);
    assert_eq!(model.nodes[0].name, "Robot");
    assert_eq!(model.nodes[0].children, vec![1]);
    assert!(vec3_approx(model.nodes[1].translation, Vec3::new(0.0, 2.0, 0.0)));
    assert!(model.meshes.is_empty());
}

#[test]
fn parse_reads_animation_clips() {
    let model = ModelData::parse(ROBOT_GLTF.as_bytes(), "robot").unwrap();
    let clip = model.clip("Rise").unwrap();

    assert!((clip.duration - 1.0).abs() < EPSILON);
    assert_eq!(clip.tracks.len(), 1);
    assert_eq!(clip.tracks[0].meta.node_name, "Robot");
}

#[test]
fn parse_rejects_garbage() {
    assert!(ModelData::parse(b"definitely not a model", "junk").is_err());
}

#[test]
fn parse_rejects_model_without_nodes() {
    let empty = r#"{ "asset": { "version": "2.0" } }"#;
    assert!(matches!(
        ModelData::parse(empty.as_bytes(), "empty"),
        Err(Error::UnsupportedGltf(_))
    ));
}

// ============================================================================
// Instantiation
// ============================================================================

#[test]
fn instantiate_wraps_model_in_new_root() {
    let model = ModelData::parse(ROBOT_GLTF.as_bytes(), "robot").unwrap();
    let mut scene = Scene::new();
    let mut assets = AssetServer::new();

    let loaded = model.instantiate(&mut scene, &mut assets);

    let root = scene.get_node(loaded.root).unwrap();
    assert_eq!(root.name, "robot");
    assert!(scene.root_nodes.contains(&loaded.root));

    let robot = scene.find_node_by_name(loaded.root, "Robot").unwrap();
    assert_eq!(scene.get_node(robot).unwrap().parent(), Some(loaded.root));

    let head = scene.find_node_by_name(loaded.root, "Head").unwrap();
    let world = scene.get_node(head).unwrap().transform.world_position();
    assert!(vec3_approx(world, Vec3::new(0.0, 3.0, 0.0)));

    assert_eq!(loaded.clips.len(), 1);
    assert_eq!(loaded.clips[0].name, "Rise");
}

#[test]
fn instantiate_registers_meshes_and_materials() {
    let mut body = NodeData::new("Body");
    body.mesh = Some(0);
    let model = ModelData {
        name: "blocky".into(),
        nodes: vec![body],
        roots: vec![0],
        meshes: vec![vec![
            PrimitiveData {
                geometry: create_box(1.0, 1.0, 1.0),
                material: None,
            },
            PrimitiveData {
                geometry: create_box(2.0, 2.0, 2.0),
                material: None,
            },
        ]],
        ..Default::default()
    };

    let mut scene = Scene::new();
    let mut assets = AssetServer::new();
    let loaded = model.instantiate(&mut scene, &mut assets);

    // Multi-primitive meshes become one child node per primitive.
    let body = scene.find_node_by_name(loaded.root, "Body").unwrap();
    let children = scene.get_node(body).unwrap().children().to_vec();
    assert_eq!(children.len(), 2);
    assert_eq!(scene.meshes.len(), 2);

    let meshes: Vec<_> = children
        .iter()
        .filter_map(|&c| scene.get_node(c).and_then(|n| n.mesh))
        .collect();
    assert_eq!(meshes.len(), 2);

    // Both primitives share one default material.
    let materials: Vec<_> = meshes.iter().map(|&k| scene.meshes[k].material).collect();
    assert_eq!(materials[0], materials[1]);
    assert!(assets.get_material(materials[0]).is_some());

    // The larger primitive's top face is at y = 1.
    let ray = Ray::new(Vec3::new(0.5, 5.0, 0.5), Vec3::NEG_Y);
    let hit = scene.raycast(loaded.root, &ray, &assets).unwrap();
    assert!(vec3_approx(hit.point, Vec3::new(0.5, 1.0, 0.5)));
}

// ============================================================================
// AssetServer
// ============================================================================

#[test]
fn server_stores_and_returns_assets() {
    let mut assets = AssetServer::new();
    let geometry = assets.add_geometry(create_box(1.0, 2.0, 3.0));
    let material = assets.add_material(Material::new_standard(Vec4::new(1.0, 0.0, 0.0, 1.0)));
    let texture = assets.add_texture(Texture::white());

    assert_eq!(assets.get_geometry(geometry).unwrap().vertex_count(), 24);
    assert_eq!(assets.get_material(material).unwrap().color.x, 1.0);
    assert_eq!(assets.get_texture(texture).unwrap().width, 1);
}

#[test]
fn server_material_is_mutable() {
    let mut assets = AssetServer::new();
    let handle = assets.add_material(Material::default());
    assets.get_material_mut(handle).unwrap().roughness = 0.25;
    assert_eq!(assets.get_material(handle).unwrap().roughness, 0.25);
}
