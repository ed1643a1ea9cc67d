#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::too_many_arguments)]

pub mod animation;
pub mod app;
pub mod assets;
pub mod engine;
pub mod errors;
pub mod render;
pub mod resources;
pub mod scene;
pub mod stage;
pub mod utils;

pub use animation::{AnimationAction, AnimationClip, AnimationMixer, Binder, LoopMode};
pub use app::{App, AppHandler};
pub use assets::{AssetServer, LoadedModel, ModelData};
pub use engine::{Engine, FrameState};
pub use errors::{Error, Result};
pub use render::{Renderer, RendererSettings, WgpuContext};
pub use resources::primitives::*;
pub use resources::{Geometry, Input, Material, Mesh, Points, Texture};
pub use scene::{Camera, Light, Node, Scene};
pub use stage::{AnimationState, Stage, StageSettings};
pub use utils::orbit_control::OrbitControls;
