// Pressure projection: remove the divergent part of a velocity field

use crate::{
    ScalarField, VectorField,
    sim::{
        boundary::{self, BoundaryMode},
        relaxation,
    },
};

/// Compute the scaled divergence `-0.5 · (∂ux/∂x + ∂uy/∂y) / N` at every
/// interior cell using central differences. The boundary ring mirrors its
/// interior neighbours.
pub fn divergence(velocity: &VectorField, div: &mut ScalarField) {
    let [ux, uy] = velocity;
    let n = ux.nrows();
    let n_f = n as f32;

    for j in 1..(n - 1) {
        for i in 1..(n - 1) {
            div[(i, j)] =
                -0.5 * (ux[(i + 1, j)] - ux[(i - 1, j)] + uy[(i, j + 1)] - uy[(i, j - 1)]) / n_f;
        }
    }

    boundary::enforce(BoundaryMode::Scalar, div);
}

/// Make `velocity` (approximately) divergence-free in place.
///
/// Solves `4p - Σp = div` for the pressure with the relaxation solver, starting
/// from zero, then subtracts `0.5 · N · ∇p` from the velocity.
///
/// Parameters
/// - `velocity` - The field to correct
/// - `pressure` - Scratch buffer; holds the solved pressure afterwards
/// - `div` - Scratch buffer; holds the divergence of the input afterwards
/// - `iterations` - Relaxation sweeps for the pressure solve
pub fn project(
    velocity: &mut VectorField,
    pressure: &mut ScalarField,
    div: &mut ScalarField,
    iterations: usize,
) {
    let n = pressure.nrows();
    let half_n = 0.5 * n as f32;

    divergence(velocity, div);

    pressure.fill(0.);
    relaxation::relax(BoundaryMode::Scalar, pressure, div, 1., 4., iterations);

    let [ux, uy] = velocity;
    for j in 1..(n - 1) {
        for i in 1..(n - 1) {
            ux[(i, j)] -= half_n * (pressure[(i + 1, j)] - pressure[(i - 1, j)]);
            uy[(i, j)] -= half_n * (pressure[(i, j + 1)] - pressure[(i, j - 1)]);
        }
    }

    boundary::enforce(BoundaryMode::VelocityX, ux);
    boundary::enforce(BoundaryMode::VelocityY, uy);
}
