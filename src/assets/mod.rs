//! Asset Management
//!
//! - [`AssetServer`]: handle-addressed storage for geometries, materials
//!   and textures
//! - [`io`]: byte sources (HTTP via `ehttp`, local files)
//! - [`pending`]: background loads delivered over a channel
//! - [`model`]: glTF/GLB decoding and scene instantiation

pub mod io;
pub mod model;
pub mod pending;
pub mod server;

pub use io::AssetSource;
pub use model::{LoadedModel, ModelData};
pub use pending::{PendingAsset, PendingModel, PendingTexture, load_model, load_texture};
pub use server::{AssetServer, GeometryHandle, MaterialHandle, TextureHandle};
