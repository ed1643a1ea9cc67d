//! Core Resources
//!
//! CPU-side data the renderer consumes, independent of any GPU state:
//! - [`Geometry`] / [`BoundingBox`]: indexed triangle data and bounds
//! - [`Material`]: metallic-roughness surface description
//! - [`Texture`]: decoded RGBA8 images
//! - [`Mesh`]: geometry + material pairing
//! - [`Points`]: sprite point clouds
//! - [`Input`]: pointer state fed by the platform layer

pub mod geometry;
pub mod input;
pub mod material;
pub mod mesh;
pub mod points;
pub mod primitives;
pub mod texture;

pub use geometry::{BoundingBox, Geometry};
pub use input::{ButtonState, Input, MouseButton};
pub use material::Material;
pub use mesh::Mesh;
pub use points::{PointVertex, Points, PointsMaterial};
pub use texture::{ColorSpace, Texture};
