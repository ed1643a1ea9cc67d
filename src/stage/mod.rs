//! Interactive Stage
//!
//! The robot scene on top of the engine: a textured platform, a starfield,
//! and a character that idles, walks to clicked points and plays gestures
//! while its head follows the pointer.
//!
//! [`Stage`] is the single owned context object. The application feeds it
//! input and frame times; everything else (asset arrival, walking, clip
//! blending, head tracking, camera orbit) happens inside [`Stage::update`]
//! on the frame thread.
//!
//! # Frame order
//!
//! 1. Poll finished asset loads and apply them
//! 2. Pointer moves and clicks
//! 3. Orbit camera
//! 4. Walk interpolation, animation mixer, head tracking, starfield spin
//! 5. Transform propagation

pub mod animator;
pub mod head_tracking;
pub mod locomotion;
pub mod picking;
pub mod platform;
pub mod pointer;
pub mod settings;
pub mod starfield;

use glam::{Quat, Vec2, Vec3, Vec4};
use rand::rngs::StdRng;

use crate::assets::{
    AssetServer, MaterialHandle, ModelData, PendingModel, PendingTexture, load_model, load_texture,
};
use crate::engine::FrameState;
use crate::resources::input::{Input, MouseButton};
use crate::resources::primitives::{CylinderOptions, create_cylinder};
use crate::resources::{Material, Mesh, Points, PointsMaterial, Texture};
use crate::scene::{Camera, Light, NodeHandle, Scene};
use crate::utils::orbit_control::OrbitControls;
use crate::utils::raycast::{CylinderVolume, Ray};

pub use animator::{AnimationController, AnimationState};
pub use head_tracking::{HeadPose, HeadTracker, pose_for_pointer};
pub use locomotion::{Locomotion, WalkPlan, WalkProgress};
pub use picking::{ClickTarget, pick};
pub use platform::PlatformBounds;
pub use pointer::{PointerState, to_ndc};
pub use settings::StageSettings;

const STAR_SPRITE_FALLBACK_SIZE: u32 = 64;

/// The loaded character and the controllers driving it.
pub struct Character {
    root: NodeHandle,
    yaw: f32,
    animator: AnimationController,
    locomotion: Locomotion,
    head: Option<HeadTracker>,
}

impl Character {
    #[inline]
    #[must_use]
    pub fn root(&self) -> NodeHandle {
        self.root
    }

    /// Facing about +Y, radians.
    #[inline]
    #[must_use]
    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    #[inline]
    #[must_use]
    pub fn animator(&self) -> &AnimationController {
        &self.animator
    }

    #[inline]
    #[must_use]
    pub fn locomotion(&self) -> &Locomotion {
        &self.locomotion
    }

    #[inline]
    #[must_use]
    pub fn head_tracker(&self) -> Option<&HeadTracker> {
        self.head.as_ref()
    }

    fn set_yaw(&mut self, scene: &mut Scene, yaw: f32) {
        self.yaw = yaw;
        if let Some(node) = scene.get_node_mut(self.root) {
            node.transform.rotation = Quat::from_rotation_y(yaw);
        }
    }

    fn set_position(&self, scene: &mut Scene, position: Vec3) {
        if let Some(node) = scene.get_node_mut(self.root) {
            node.transform.position = position;
        }
    }

    /// Moves along the active walk; on arrival faces forward again and
    /// returns to `Idle`.
    fn step_walk(&mut self, scene: &mut Scene, now: f32) {
        match self.locomotion.advance(now) {
            Some(WalkProgress::Moving(position)) => self.set_position(scene, position),
            Some(WalkProgress::Arrived(position)) => {
                self.set_position(scene, position);
                self.set_yaw(scene, 0.0);
                self.animator.fade_to(AnimationState::Idle);
                log::debug!("Arrived at ({:.2}, {:.2})", position.x, position.z);
            }
            None => {}
        }
    }
}

#[derive(Default)]
struct PendingLoads {
    model: Option<PendingModel>,
    platform_texture: Option<PendingTexture>,
    star_sprite: Option<PendingTexture>,
}

impl PendingLoads {
    fn is_empty(&self) -> bool {
        self.model.is_none() && self.platform_texture.is_none() && self.star_sprite.is_none()
    }
}

pub struct Stage {
    pub scene: Scene,
    pub assets: AssetServer,

    settings: StageSettings,
    camera: NodeHandle,
    orbit: OrbitControls,
    platform: NodeHandle,
    platform_material: MaterialHandle,
    ground: CylinderVolume,
    stars: NodeHandle,
    star_angle: f32,

    pointer: PointerState,
    character: Option<Character>,
    loads: PendingLoads,

    rng: StdRng,
    now: f32,
}

impl Stage {
    /// Builds the static scene: camera, lights, platform and starfield.
    /// Nothing is fetched until [`Stage::start_loading`].
    #[must_use]
    pub fn new(settings: StageSettings) -> Self {
        Self::with_rng(settings, rand::make_rng())
    }

    /// Like [`Stage::new`], with an explicit source for the starfield layout
    /// and gesture picks.
    #[must_use]
    pub fn with_rng(settings: StageSettings, mut rng: StdRng) -> Self {
        let mut scene = Scene::new();
        let mut assets = AssetServer::new();

        // Camera
        let cam = &settings.camera;
        let orbit = OrbitControls::new(cam.position, cam.target)
            .with_distance_limits(cam.min_distance, cam.max_distance)
            .with_polar_limits(cam.min_polar_angle, cam.max_polar_angle)
            .with_damping(cam.damping);
        let camera = scene.add_camera("Camera", Camera::new_perspective(cam.fov, 1.0, cam.near, cam.far));
        if let Some(node) = scene.get_node_mut(camera) {
            node.transform.position = orbit.position();
            node.transform.look_at(orbit.center, Vec3::Y);
        }
        scene.active_camera = Some(camera);

        // Lights
        scene.add_light("Ambient Light", Light::new_ambient(Vec3::ONE, settings.ambient_intensity));
        let sun = scene.add_light("Sun", Light::new_directional(Vec3::ONE, settings.sun_intensity));
        if let Some(node) = scene.get_node_mut(sun) {
            node.transform.position = settings.sun_position;
        }

        // Platform
        let plat = &settings.platform;
        let geometry = assets.add_geometry(create_cylinder(&CylinderOptions {
            radius_top: plat.radius,
            radius_bottom: plat.radius,
            height: plat.height,
            radial_segments: plat.segments,
            open_ended: false,
        }));
        let platform_material = assets.add_material(
            Material::new_standard(Vec4::ONE)
                .with_name("Platform")
                .with_roughness(plat.roughness)
                .with_metalness(plat.metalness),
        );
        let platform = scene.add_mesh("Platform", Mesh::new(geometry, platform_material));
        let platform_center = Vec3::new(0.0, -plat.height * 0.5, 0.0);
        if let Some(node) = scene.get_node_mut(platform) {
            node.transform.position = platform_center;
        }
        let ground = CylinderVolume {
            center: platform_center,
            radius: plat.radius,
            half_height: plat.height * 0.5,
        };

        // Starfield
        let sprite = assets.add_texture(Texture::disc_sprite(STAR_SPRITE_FALLBACK_SIZE));
        let stars = scene.add_points(
            "Starfield",
            Points::new(
                starfield::generate(&mut rng, &settings.starfield),
                PointsMaterial {
                    size_scale: 1.0,
                    map: Some(sprite),
                    alpha_test: settings.starfield.alpha_test,
                },
            ),
        );

        scene.update();

        let pointer = PointerState::new(settings.click_threshold);

        Self {
            scene,
            assets,
            settings,
            camera,
            orbit,
            platform,
            platform_material,
            ground,
            stars,
            star_angle: 0.0,
            pointer,
            character: None,
            loads: PendingLoads::default(),
            rng,
            now: 0.0,
        }
    }

    // ========================================================================
    // Assets
    // ========================================================================

    /// Starts fetching every configured asset in the background.
    pub fn start_loading(&mut self) {
        let urls = &self.settings.assets;
        self.loads.platform_texture = urls.platform_texture.as_deref().map(load_texture);
        self.loads.star_sprite = urls.star_sprite.as_deref().map(load_texture);
        self.loads.model = urls.character_model.as_deref().map(load_model);
    }

    /// Loads handed to the stage directly rather than fetched by it.
    pub fn set_pending_model(&mut self, pending: PendingModel) {
        self.loads.model = Some(pending);
    }

    /// Whether any load is still outstanding.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        !self.loads.is_empty()
    }

    fn poll_loads(&mut self) {
        if let Some(result) = self.loads.platform_texture.as_mut().and_then(PendingTexture::poll) {
            self.loads.platform_texture = None;
            match result {
                Ok(texture) => {
                    let handle = self.assets.add_texture(texture);
                    if let Some(material) = self.assets.get_material_mut(self.platform_material) {
                        material.map = Some(handle);
                    }
                }
                Err(e) => log::warn!("Platform texture unavailable: {e}"),
            }
        }

        if let Some(result) = self.loads.star_sprite.as_mut().and_then(PendingTexture::poll) {
            self.loads.star_sprite = None;
            match result {
                Ok(texture) => {
                    let handle = self.assets.add_texture(texture);
                    let points = self.scene.get_node(self.stars).and_then(|n| n.points);
                    if let Some(points) = points.and_then(|k| self.scene.points.get_mut(k)) {
                        points.material.map = Some(handle);
                    }
                }
                Err(e) => log::warn!("Star sprite unavailable, keeping the generated disc: {e}"),
            }
        }

        if let Some(result) = self.loads.model.as_mut().and_then(PendingModel::poll) {
            self.loads.model = None;
            match result {
                Ok(data) => {
                    self.attach_model(data);
                }
                Err(e) => log::error!("Error loading character: {e}"),
            }
        }
    }

    /// Places a decoded character bundle on the stage and starts idling.
    ///
    /// Replaces nothing: a second call is ignored with a warning.
    pub fn attach_model(&mut self, data: ModelData) -> Option<NodeHandle> {
        if self.character.is_some() {
            log::warn!("Character already loaded; ignoring '{}'", data.name);
            return None;
        }

        let name = data.name.clone();
        let loaded = data.instantiate(&mut self.scene, &mut self.assets);
        let chr = &self.settings.character;

        if let Some(node) = self.scene.get_node_mut(loaded.root) {
            node.transform.position = chr.position;
            node.transform.scale = Vec3::splat(chr.scale);
        }

        let head = self.scene.find_node_by_name(loaded.root, &chr.head_bone);
        if head.is_none() {
            log::warn!("Character has no '{}' bone; head tracking disabled", chr.head_bone);
        }

        let animator = AnimationController::new(
            &loaded.clips,
            loaded.root,
            &self.scene,
            &chr.idle_clip,
            &chr.walk_clip,
            chr.fade_duration,
        );
        let locomotion = Locomotion::new(
            PlatformBounds::from_settings(&self.settings.platform),
            chr.seconds_per_unit,
        );

        log::info!(
            "Character '{name}' ready with {} clips ({} gestures)",
            loaded.clips.len(),
            animator.gestures().len()
        );

        self.character = Some(Character {
            root: loaded.root,
            yaw: 0.0,
            animator,
            locomotion,
            head: head.map(|h| HeadTracker::new(h, chr.head_range)),
        });
        self.scene.update();
        Some(loaded.root)
    }

    // ========================================================================
    // Input
    // ========================================================================

    /// Ray from the camera through a point in normalized device coordinates.
    #[must_use]
    pub fn click_ray(&self, ndc: Vec2) -> Option<Ray> {
        self.scene.active_camera().map(|camera| camera.screen_ray(ndc))
    }

    /// Resolves a click and acts on it: the character plays a gesture, the
    /// platform starts a walk.
    ///
    /// Returns what was acted on; suppressed clicks (no character yet, or a
    /// walk in progress) report [`ClickTarget::Nothing`].
    pub fn handle_click(&mut self, ndc: Vec2) -> ClickTarget {
        let Some(character) = &self.character else {
            return ClickTarget::Nothing;
        };
        if character.locomotion.is_walking() {
            return ClickTarget::Nothing;
        }
        let Some(ray) = self.click_ray(ndc) else {
            return ClickTarget::Nothing;
        };

        let character_hit = self.scene.raycast(character.root, &ray, &self.assets);
        let target = pick(&ray, character_hit, &self.ground);
        match target {
            ClickTarget::Character => {
                self.play_gesture();
            }
            ClickTarget::Ground(point) => {
                self.walk_to(point);
            }
            ClickTarget::Nothing => {}
        }
        target
    }

    pub fn handle_pointer_move(&mut self, ndc: Vec2) {
        self.pointer.set_ndc(ndc);
    }

    /// New viewport size: camera aspect, plus the minimum camera and target
    /// heights. The heights are only ever raised.
    pub fn handle_resize(&mut self, width: u32, height: u32) {
        if width > 0
            && height > 0
            && let Some((_, camera)) = self.scene.query_camera_bundle(self.camera)
        {
            camera.set_aspect(width as f32 / height as f32);
        }

        let cam = &self.settings.camera;
        let mut target = self.orbit.center;
        target.y = target.y.max(cam.min_target_height);
        let mut position = self.orbit.position();
        position.y = position.y.max(cam.min_height);
        self.orbit.set_pose(position, target);

        if let Some(node) = self.scene.get_node_mut(self.camera) {
            node.transform.position = self.orbit.position();
            node.transform.look_at(self.orbit.center, Vec3::Y);
        }
        self.scene.update();
    }

    // ========================================================================
    // Commands
    // ========================================================================

    /// Walks the character toward `target` (clamped into the platform).
    ///
    /// Ignored without a character or while already walking. A walk of zero
    /// length completes immediately.
    pub fn walk_to(&mut self, target: Vec3) -> Option<WalkPlan> {
        let character = self.character.as_mut()?;
        let from = self.scene.get_node(character.root)?.transform.position;

        let plan = character.locomotion.begin(from, target, self.now)?;
        character.set_yaw(&mut self.scene, plan.yaw);
        if plan.duration > 0.0 {
            character.animator.fade_to(AnimationState::Walking);
        }
        character.step_walk(&mut self.scene, self.now);
        Some(plan)
    }

    /// Plays a random gesture and returns its name if one started. Ignored
    /// without a character, while walking, or when the character has no
    /// gesture clips.
    pub fn play_gesture(&mut self) -> Option<String> {
        let character = self.character.as_mut()?;
        if character.locomotion.is_walking() {
            return None;
        }
        character.animator.play_random_gesture(&mut self.rng)
    }

    // ========================================================================
    // Frame
    // ========================================================================

    /// One frame: loads, input, camera, then [`Stage::advance`].
    pub fn update(&mut self, input: &Input, frame: &FrameState) {
        self.now = frame.time;
        self.poll_loads();

        let viewport = input.screen_size();
        let cursor = input.mouse_position();
        if input.cursor_moved() {
            self.pointer.move_to(cursor, viewport);
        }
        if input.get_mouse_button_down(MouseButton::Left) {
            self.pointer.press(cursor);
        }
        if input.get_mouse_button_up(MouseButton::Left)
            && let Some(click) = self.pointer.release(cursor)
        {
            self.handle_click(to_ndc(click, viewport));
        }

        if let Some((transform, camera)) = self.scene.query_camera_bundle(self.camera) {
            let fov = camera.fov_degrees();
            self.orbit.update(transform, input, fov, frame.dt);
        }

        self.advance(frame.time, frame.dt);
    }

    /// Advances everything time-driven to wall-clock time `now`, with `dt`
    /// seconds since the previous frame.
    pub fn advance(&mut self, now: f32, dt: f32) {
        self.now = now;

        if let Some(character) = &mut self.character {
            character.step_walk(&mut self.scene, now);
            character.animator.update(dt, &mut self.scene);
            if let Some(head) = &mut character.head {
                head.update(character.animator.is_idle(), self.pointer.ndc(), &mut self.scene);
            }
        }

        self.star_angle = (self.star_angle + self.settings.starfield.spin_rate * dt) % std::f32::consts::TAU;
        if let Some(node) = self.scene.get_node_mut(self.stars) {
            node.transform.rotation = Quat::from_rotation_y(self.star_angle);
        }

        self.scene.update();
    }

    // ========================================================================
    // Queries
    // ========================================================================

    #[must_use]
    pub fn settings(&self) -> &StageSettings {
        &self.settings
    }

    #[must_use]
    pub fn character(&self) -> Option<&Character> {
        self.character.as_ref()
    }

    #[must_use]
    pub fn animation_state(&self) -> Option<&AnimationState> {
        self.character.as_ref().map(|c| c.animator.state())
    }

    /// The walking flag.
    #[must_use]
    pub fn is_walking(&self) -> bool {
        self.character.as_ref().is_some_and(|c| c.locomotion.is_walking())
    }

    #[must_use]
    pub fn character_position(&self) -> Option<Vec3> {
        let character = self.character.as_ref()?;
        Some(self.scene.get_node(character.root)?.transform.position)
    }

    #[must_use]
    pub fn pointer(&self) -> &PointerState {
        &self.pointer
    }

    #[must_use]
    pub fn camera(&self) -> NodeHandle {
        self.camera
    }

    #[must_use]
    pub fn orbit(&self) -> &OrbitControls {
        &self.orbit
    }

    #[must_use]
    pub fn platform(&self) -> NodeHandle {
        self.platform
    }

    #[must_use]
    pub fn platform_material(&self) -> MaterialHandle {
        self.platform_material
    }

    #[must_use]
    pub fn stars(&self) -> NodeHandle {
        self.stars
    }
}
