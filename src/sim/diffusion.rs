// Implicit diffusion

use crate::{
    ScalarField,
    sim::{boundary::BoundaryMode, relaxation},
};

/// Neighbour count of the five-point stencil. With `c = 1 + 4a` the implicit
/// step conserves the field total away from the walls.
pub const CONSERVATIVE_STENCIL: f32 = 4.;

/// The coupling `a = dt · rate · (N - 2)²` between a cell and each neighbour.
/// `(N - 2)²` rescales the rate to the interior cell spacing.
pub fn coupling(rate: f32, dt: f32, size: usize) -> f32 {
    let interior = (size - 2) as f32;
    dt * rate * interior * interior
}

/// Spread `x0` into `x` over one timestep, solving `(1 + stencil·a)·x - a·Σx = x0`.
///
/// Parameters
/// - `mode` - The boundary condition of the field being diffused
/// - `x` - The output field; its current contents seed the solve
/// - `x0` - The field before diffusion
/// - `rate` - The diffusion rate (viscosity for velocity)
/// - `dt` - The timestep
/// - `stencil` - The diagonal multiplier; `CONSERVATIVE_STENCIL` unless extra damping is wanted
/// - `iterations` - Relaxation sweeps
pub fn diffuse(
    mode: BoundaryMode,
    x: &mut ScalarField,
    x0: &ScalarField,
    rate: f32,
    dt: f32,
    stencil: f32,
    iterations: usize,
) {
    let a = coupling(rate, dt, x.nrows());
    relaxation::relax(mode, x, x0, a, 1. + stencil * a, iterations);
}
