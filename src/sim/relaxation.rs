// Gauss-Seidel relaxation for the implicit diffusion and pressure systems

use crate::{
    ScalarField,
    sim::boundary::{self, BoundaryMode},
};

/// Approximately solve `c·x[i,j] - a·(x[i+1,j] + x[i-1,j] + x[i,j+1] + x[i,j-1]) = x0[i,j]`
/// over every interior cell.
///
/// Each sweep updates `x` in place in row-major order, so a cell sees the
/// values already written earlier in the same sweep. The boundary ring is
/// re-derived after every sweep. Whatever `x` holds on entry is the initial
/// guess.
///
/// Parameters
/// - `mode` - The boundary condition to enforce on `x` between sweeps
/// - `x` - The unknown field, updated in place
/// - `x0` - The right-hand side
/// - `a` - The neighbour coefficient
/// - `c` - The diagonal coefficient; must be non-zero
/// - `iterations` - The number of full sweeps
pub fn relax(
    mode: BoundaryMode,
    x: &mut ScalarField,
    x0: &ScalarField,
    a: f32,
    c: f32,
    iterations: usize,
) {
    debug_assert_ne!(c, 0.);
    debug_assert_eq!(x.shape(), x0.shape());

    let n = x.nrows();
    let c_recip = 1.0 / c;

    for _ in 0..iterations {
        for j in 1..(n - 1) {
            for i in 1..(n - 1) {
                let neighbours = x[(i + 1, j)] + x[(i - 1, j)] + x[(i, j + 1)] + x[(i, j - 1)];
                x[(i, j)] = (x0[(i, j)] + a * neighbours) * c_recip;
            }
        }
        boundary::enforce(mode, x);
    }
}

#[cfg(test)]
mod tests {
    use na::DMatrix;
    use rand::Rng;

    use super::*;

    /// Largest interior violation of the system `relax` approximates
    fn max_residual(x: &ScalarField, x0: &ScalarField, a: f32, c: f32) -> f32 {
        let n = x.nrows();
        let mut worst = 0.0f32;
        for j in 1..(n - 1) {
            for i in 1..(n - 1) {
                let neighbours = x[(i + 1, j)] + x[(i - 1, j)] + x[(i, j + 1)] + x[(i, j - 1)];
                let r = c * x[(i, j)] - a * neighbours - x0[(i, j)];
                worst = worst.max(r.abs());
            }
        }
        worst
    }

    #[test]
    fn test_zero_coupling_copies_rhs() {
        let mut rng = rand::rng();
        let x0: ScalarField = DMatrix::from_fn(7, 7, |_, _| rng.random_range(0.0..50.0));
        let mut x: ScalarField = DMatrix::from_element(7, 7, 123.);

        relax(BoundaryMode::Scalar, &mut x, &x0, 0., 1., 1);

        for j in 1..6 {
            for i in 1..6 {
                assert_eq!(x[(i, j)], x0[(i, j)]);
            }
        }
        assert_eq!(x[(0, 3)], x[(1, 3)]);
    }

    #[test]
    fn test_sweep_reads_values_updated_earlier_in_the_sweep() {
        let mut x0: ScalarField = DMatrix::zeros(5, 5);
        x0[(1, 1)] = 5.;
        let mut x: ScalarField = DMatrix::zeros(5, 5);

        relax(BoundaryMode::Scalar, &mut x, &x0, 1., 5., 1);

        // worked by hand in row-major order, j outer and i inner
        let expected = [
            ((1, 1), 1.),
            ((2, 1), 0.2),
            ((3, 1), 0.04),
            ((1, 2), 0.2),
            ((2, 2), 0.08),
            ((3, 2), 0.024),
            ((1, 3), 0.04),
            ((2, 3), 0.024),
            ((3, 3), 0.0096),
        ];
        for ((i, j), want) in expected {
            assert!(
                (x[(i, j)] - want).abs() < 1e-6,
                "x[({i}, {j})] = {}, expected {want}",
                x[(i, j)]
            );
        }
    }

    #[test]
    fn test_converges_on_diagonally_dominant_system() {
        let mut rng = rand::rng();
        let n = 12;
        let x0: ScalarField = DMatrix::from_fn(n, n, |_, _| rng.random_range(-1.0..1.0));
        let mut x: ScalarField = DMatrix::zeros(n, n);

        let (a, c) = (1., 5.);
        let before = max_residual(&x, &x0, a, c);
        relax(BoundaryMode::Scalar, &mut x, &x0, a, c, 100);
        let after = max_residual(&x, &x0, a, c);

        println!("residual before: {before}, after: {after}");
        assert!(after < 1e-3);
        assert!(after < before);
    }

    #[test]
    fn test_more_sweeps_reduce_residual() {
        let n = 10;
        let mut x0: ScalarField = DMatrix::zeros(n, n);
        x0[(4, 5)] = 1.;

        let (a, c) = (1., 5.);
        let mut one: ScalarField = DMatrix::zeros(n, n);
        let mut many: ScalarField = DMatrix::zeros(n, n);
        relax(BoundaryMode::Scalar, &mut one, &x0, a, c, 1);
        relax(BoundaryMode::Scalar, &mut many, &x0, a, c, 20);

        assert!(max_residual(&many, &x0, a, c) < max_residual(&one, &x0, a, c));
    }
}
