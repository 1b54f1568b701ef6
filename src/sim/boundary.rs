// Wall conditions on the outer ring of the grid

use crate::ScalarField;

/// Which quantity a field holds; decides the sign used at each wall.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BoundaryMode {
    /// Density, pressure, divergence: zero-gradient on every wall
    Scalar,

    /// Horizontal velocity: cancelled at the left and right walls
    VelocityX,

    /// Vertical velocity: cancelled at the top and bottom walls
    VelocityY,
}

/// Overwrite the four edges and four corners of `field` from their interior
/// neighbours. Interior cells are left untouched.
///
/// Edges normal to the flow component negate the adjacent interior value, so
/// nothing crosses a wall; every other edge mirrors it. Corners take the mean
/// of their two adjacent edge cells once the edges are set.
pub fn enforce(mode: BoundaryMode, field: &mut ScalarField) {
    let n = field.nrows();
    debug_assert_eq!(n, field.ncols());

    let flip_y = if mode == BoundaryMode::VelocityY { -1. } else { 1. };
    let flip_x = if mode == BoundaryMode::VelocityX { -1. } else { 1. };

    // top & bottom rows
    for i in 1..(n - 1) {
        field[(i, 0)] = flip_y * field[(i, 1)];
        field[(i, n - 1)] = flip_y * field[(i, n - 2)];
    }

    // left & right columns
    for j in 1..(n - 1) {
        field[(0, j)] = flip_x * field[(1, j)];
        field[(n - 1, j)] = flip_x * field[(n - 2, j)];
    }

    field[(0, 0)] = 0.5 * (field[(1, 0)] + field[(0, 1)]);
    field[(0, n - 1)] = 0.5 * (field[(1, n - 1)] + field[(0, n - 2)]);
    field[(n - 1, 0)] = 0.5 * (field[(n - 2, 0)] + field[(n - 1, 1)]);
    field[(n - 1, n - 1)] = 0.5 * (field[(n - 2, n - 1)] + field[(n - 1, n - 2)]);
}
