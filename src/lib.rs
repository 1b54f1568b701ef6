extern crate nalgebra as na;

pub mod observers;
pub mod postprocessing;
pub mod preprocessing;
pub mod sim;

use na::DMatrix;

/// An N×N field indexed `(x, y)`. Storage is column-major, so the flat
/// offset of `(x, y)` is `x + y * N`.
pub type ScalarField = DMatrix<f32>;

/// An `[x, y]` pair of scalar fields.
pub type VectorField = [ScalarField; 2];
