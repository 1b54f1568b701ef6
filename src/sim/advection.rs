// Semi-Lagrangian transport

use crate::{
    ScalarField, VectorField,
    sim::boundary::{self, BoundaryMode},
};

/// Bilinearly sample `field` at a fractional position. The position must
/// already be clamped so that both `floor` and `floor + 1` are on the grid.
fn sample_bilinear(field: &ScalarField, x: f32, y: f32) -> f32 {
    let (i0, j0) = (x.floor(), y.floor());

    let s1 = x - i0;
    let s0 = 1. - s1;
    let t1 = y - j0;
    let t0 = 1. - t1;

    let (i0, j0) = (i0 as usize, j0 as usize);
    let (i1, j1) = (i0 + 1, j0 + 1);

    s0 * (t0 * field[(i0, j0)] + t1 * field[(i0, j1)])
        + s1 * (t0 * field[(i1, j0)] + t1 * field[(i1, j1)])
}

/// Carry `d0` along `velocity` for one timestep, writing the result to `d`.
///
/// Every interior cell looks backwards along its own velocity to find where
/// its contents came from and interpolates `d0` there. The traced position
/// is clamped to `[0.5, N - 1.5]` on both axes so the four samples always
/// lie on the grid. Because the result is a convex blend of existing values
/// it stays bounded for any `dt`.
///
/// Parameters
/// - `mode` - The boundary condition of the transported field
/// - `d` - The output field
/// - `d0` - The field before transport
/// - `velocity` - The velocity doing the transporting
/// - `dt` - The timestep
pub fn advect(
    mode: BoundaryMode,
    d: &mut ScalarField,
    d0: &ScalarField,
    velocity: &VectorField,
    dt: f32,
) {
    let n = d.nrows();
    let dt0 = dt * (n - 2) as f32;
    let (lo, hi) = (0.5, n as f32 - 1.5);

    let [ux, uy] = velocity;

    for j in 1..(n - 1) {
        for i in 1..(n - 1) {
            let x = (i as f32 - dt0 * ux[(i, j)]).clamp(lo, hi);
            let y = (j as f32 - dt0 * uy[(i, j)]).clamp(lo, hi);

            d[(i, j)] = sample_bilinear(d0, x, y);
        }
    }

    boundary::enforce(mode, d);
}
