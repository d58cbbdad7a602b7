//! Vector and matrix types used by cameras and the draw façade.
//!
//! Draw space is 2D with the origin at the bottom-left, +X right, +Y up.
//! Matrices are row-major and transform column vectors (`M * p`).

mod matrix;
mod vec;

pub use matrix::{Matrix3, Matrix4};
pub use vec::{Vec2, Vec3};
