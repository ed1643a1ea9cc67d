pub mod fps_counter;
pub mod orbit_control;
pub mod raycast;

pub use fps_counter::FpsCounter;
pub use orbit_control::OrbitControls;
pub use raycast::{CylinderVolume, Ray, RayHit};
