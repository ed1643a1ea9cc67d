pub mod box_shape;
pub mod cylinder;

pub use box_shape::create_box;
pub use cylinder::{CylinderOptions, create_cylinder};
