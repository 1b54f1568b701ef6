// Simulation state, forcing, and the per-frame timestep

use na::DMatrix;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::{
    ScalarField, VectorField,
    sim::{
        advection,
        boundary::BoundaryMode,
        diffusion::{self, CONSERVATIVE_STENCIL},
        error::FluidError,
        grid::Grid,
        projection,
    },
};

/// Upper bound on a density cell; an 8-bit intensity convention
pub const MAX_DENSITY: f32 = 255.;

/// Solver constants, fixed once a `Fluid` is built.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct FluidConfig {
    /// Grid side length N, boundary ring included
    pub size: usize,

    /// Gauss-Seidel sweeps per implicit solve
    pub iterations: usize,

    /// Density diffusion rate
    pub diffusion: f32,

    /// Velocity diffusion rate
    pub viscosity: f32,

    /// Timestep
    pub dt: f32,

    /// Diagonal multiplier for density diffusion, `c = 1 + density_stencil · a`.
    /// 4 conserves density; the default of 6 also bleeds some off each step.
    pub density_stencil: f32,
}

impl Default for FluidConfig {
    fn default() -> Self {
        FluidConfig {
            size: 128,
            iterations: 1,
            diffusion: 0.,
            viscosity: 0.,
            dt: 0.2,
            density_stencil: 6.,
        }
    }
}

impl FluidConfig {
    pub fn validate(&self) -> Result<(), FluidError> {
        let bad = |reason: String| Err(FluidError::InvalidConfig(reason));

        if self.size < 3 {
            return bad(format!("size must be at least 3, got {}", self.size));
        }
        if self.iterations == 0 {
            return bad("iterations must be at least 1".to_string());
        }
        for (name, value) in [
            ("diffusion", self.diffusion),
            ("viscosity", self.viscosity),
            ("dt", self.dt),
        ] {
            if !value.is_finite() || value < 0. {
                return bad(format!("{name} must be finite and non-negative, got {value}"));
            }
        }
        if !self.density_stencil.is_finite() || self.density_stencil < 0. {
            return bad(format!(
                "density_stencil must be finite and non-negative, got {}",
                self.density_stencil
            ));
        }

        Ok(())
    }
}

/// A 2D incompressible fluid carrying a dye density.
///
/// Every buffer is N×N and indexed `(x, y)`. Each scratch buffer has a
/// single role so the step sequence reads without aliasing.
pub struct Fluid {
    config: FluidConfig,
    grid: Grid,

    /// The dye density, clamped to `[0, MAX_DENSITY]` by forcing
    density: ScalarField,

    /// Diffused density; the source the advection step samples from
    density_source: ScalarField,

    /// The velocity field
    velocity: VectorField,

    /// Diffused and projected velocity; transports itself during advection
    velocity_source: VectorField,

    /// Pressure solved during projection
    pressure: ScalarField,

    /// Velocity divergence computed during projection
    divergence: ScalarField,
}

impl Fluid {
    /// Create a fluid at rest with no density.
    pub fn new(config: FluidConfig) -> Result<Self, FluidError> {
        config.validate()?;

        let n = config.size;
        let zeros = || -> ScalarField { DMatrix::zeros(n, n) };

        Ok(Fluid {
            grid: Grid::new(n),
            density: zeros(),
            density_source: zeros(),
            velocity: [zeros(), zeros()],
            velocity_source: [zeros(), zeros()],
            pressure: zeros(),
            divergence: zeros(),
            config,
        })
    }

    /// Create a fluid with the default grid and the given rates
    pub fn with_rates(diffusion: f32, viscosity: f32, dt: f32) -> Result<Self, FluidError> {
        Fluid::new(FluidConfig {
            diffusion,
            viscosity,
            dt,
            ..FluidConfig::default()
        })
    }

    pub fn config(&self) -> &FluidConfig {
        &self.config
    }

    pub fn size(&self) -> usize {
        self.grid.size()
    }

    pub fn density(&self) -> &ScalarField {
        &self.density
    }

    pub fn velocity(&self) -> &VectorField {
        &self.velocity
    }

    /// Read the density of one cell
    pub fn density_at(&self, x: i64, y: i64) -> Result<f32, FluidError> {
        let k = self.grid.offset(x, y)?;
        Ok(self.density.as_slice()[k])
    }

    /// Sum of every density cell, boundary ring included
    pub fn total_density(&self) -> f32 {
        self.density.sum()
    }

    /// Largest velocity magnitude on the grid
    pub fn peak_speed(&self) -> f32 {
        self.velocity[0]
            .zip_map(&self.velocity[1], |ux, uy| (ux * ux + uy * uy).sqrt())
            .max()
    }

    /// Add dye at a cell. The result is clamped into `[0, MAX_DENSITY]`, so a
    /// negative amount removes dye down to zero.
    pub fn add_density(&mut self, x: i64, y: i64, amount: f32) -> Result<(), FluidError> {
        let k = self.grid.offset(x, y)?;
        let cell = &mut self.density.as_mut_slice()[k];
        *cell = (*cell + amount).clamp(0., MAX_DENSITY);

        Ok(())
    }

    /// Push the fluid at a cell. Velocity is unbounded.
    pub fn add_velocity(&mut self, x: i64, y: i64, ax: f32, ay: f32) -> Result<(), FluidError> {
        let k = self.grid.offset(x, y)?;
        self.velocity[0].as_mut_slice()[k] += ax;
        self.velocity[1].as_mut_slice()[k] += ay;

        Ok(())
    }

    /// Remove `amount` of dye from every cell, flooring at zero. A negative
    /// amount fades nothing.
    pub fn fade(&mut self, amount: f32) {
        let amount = amount.max(0.);
        self.density.apply(|d| *d = (*d - amount).max(0.));
    }

    /// Advance the fluid by one timestep.
    ///
    /// 1. diffuse velocity into `velocity_source` (viscosity)
    /// 2. project `velocity_source`
    /// 3. advect velocity along `velocity_source`
    /// 4. project velocity
    /// 5. diffuse density into `density_source`
    /// 6. advect density along velocity
    pub fn step(&mut self) {
        let FluidConfig {
            iterations,
            diffusion: diffusion_rate,
            viscosity,
            dt,
            density_stencil,
            ..
        } = self.config;

        let modes = [BoundaryMode::VelocityX, BoundaryMode::VelocityY];

        for (axis, mode) in modes.into_iter().enumerate() {
            diffusion::diffuse(
                mode,
                &mut self.velocity_source[axis],
                &self.velocity[axis],
                viscosity,
                dt,
                CONSERVATIVE_STENCIL,
                iterations,
            );
        }

        projection::project(
            &mut self.velocity_source,
            &mut self.pressure,
            &mut self.divergence,
            iterations,
        );

        for (axis, mode) in modes.into_iter().enumerate() {
            advection::advect(
                mode,
                &mut self.velocity[axis],
                &self.velocity_source[axis],
                &self.velocity_source,
                dt,
            );
        }

        projection::project(
            &mut self.velocity,
            &mut self.pressure,
            &mut self.divergence,
            iterations,
        );

        diffusion::diffuse(
            BoundaryMode::Scalar,
            &mut self.density_source,
            &self.density,
            diffusion_rate,
            dt,
            density_stencil,
            iterations,
        );

        advection::advect(
            BoundaryMode::Scalar,
            &mut self.density,
            &self.density_source,
            &self.velocity,
            dt,
        );

        trace!(
            "Stepped {}x{} fluid by {}; total density {}",
            self.grid.size(),
            self.grid.size(),
            dt,
            self.total_density()
        );
    }
}

#[cfg(test)]
mod tests {
    use rand::Rng;

    use super::*;

    fn small_fluid(size: usize, dt: f32) -> Fluid {
        Fluid::new(FluidConfig {
            size,
            dt,
            ..FluidConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn test_new_fluid_is_empty() {
        let fluid = Fluid::with_rates(0.0001, 0.0002, 0.1).unwrap();

        assert_eq!(fluid.size(), 128);
        assert_eq!(fluid.config().viscosity, 0.0002);
        assert_eq!(fluid.total_density(), 0.);
        assert_eq!(fluid.peak_speed(), 0.);
        assert_eq!(fluid.density().shape(), (128, 128));
    }

    #[test]
    fn test_invalid_configs_are_rejected() {
        let configs = [
            FluidConfig { size: 2, ..FluidConfig::default() },
            FluidConfig { iterations: 0, ..FluidConfig::default() },
            FluidConfig { dt: -0.1, ..FluidConfig::default() },
            FluidConfig { viscosity: f32::NAN, ..FluidConfig::default() },
            FluidConfig { diffusion: f32::INFINITY, ..FluidConfig::default() },
            FluidConfig { density_stencil: -4., ..FluidConfig::default() },
        ];

        for config in configs {
            assert!(
                matches!(Fluid::new(config.clone()), Err(FluidError::InvalidConfig(_))),
                "{config:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_forcing_out_of_range() {
        let mut fluid = small_fluid(8, 0.2);

        assert_eq!(
            fluid.add_density(8, 0, 1.),
            Err(FluidError::OutOfRange { x: 8, y: 0, size: 8 })
        );
        assert!(fluid.add_velocity(-1, 3, 1., 1.).is_err());
        assert!(fluid.density_at(3, 8).is_err());

        // a rejected call leaves the state alone
        assert_eq!(fluid.total_density(), 0.);
        assert_eq!(fluid.peak_speed(), 0.);
    }

    #[test]
    fn test_add_density_saturates() {
        let mut fluid = small_fluid(8, 0.2);

        fluid.add_density(2, 3, 200.).unwrap();
        assert_eq!(fluid.density_at(2, 3), Ok(200.));

        fluid.add_density(2, 3, 200.).unwrap();
        assert_eq!(fluid.density_at(2, 3), Ok(MAX_DENSITY));

        // forcing lands on (x, y), not (y, x)
        assert_eq!(fluid.density_at(3, 2), Ok(0.));
        assert_eq!(fluid.density()[(2, 3)], MAX_DENSITY);
    }

    #[test]
    fn test_add_velocity_accumulates() {
        let mut fluid = small_fluid(8, 0.2);

        fluid.add_velocity(4, 4, 3., -4.).unwrap();
        fluid.add_velocity(4, 4, 3., -4.).unwrap();

        assert_eq!(fluid.velocity()[0][(4, 4)], 6.);
        assert_eq!(fluid.velocity()[1][(4, 4)], -8.);
        assert_eq!(fluid.peak_speed(), 10.);
    }

    #[test]
    fn test_density_stays_bounded_under_forcing() {
        let mut rng = rand::rng();
        let mut fluid = small_fluid(10, 0.2);

        for _ in 0..500 {
            let (x, y) = (rng.random_range(0..10), rng.random_range(0..10));
            fluid.add_density(x, y, rng.random_range(-80.0..120.0)).unwrap();

            if rng.random_bool(0.2) {
                fluid.fade(rng.random_range(-400.0..30.0));
            }

            assert!(
                fluid
                    .density()
                    .iter()
                    .all(|d| (0.0..=MAX_DENSITY).contains(d))
            );
        }
    }

    #[test]
    fn test_negative_forcing_stays_in_range() {
        let mut fluid = small_fluid(6, 0.2);

        fluid.add_density(3, 3, -50.).unwrap();
        assert_eq!(fluid.density_at(3, 3), Ok(0.));

        fluid.add_density(2, 2, 250.).unwrap();
        fluid.fade(-400.);
        assert_eq!(fluid.density_at(2, 2), Ok(250.));
        assert_eq!(fluid.density_at(3, 3), Ok(0.));
        assert_eq!(fluid.density().max(), 250.);

        fluid.add_density(2, 2, -100.).unwrap();
        assert_eq!(fluid.density_at(2, 2), Ok(150.));
    }

    #[test]
    fn test_fade_floors_at_zero() {
        let mut fluid = small_fluid(6, 0.2);
        fluid.add_density(1, 1, 10.).unwrap();
        fluid.add_density(2, 2, 0.25).unwrap();

        fluid.fade(0.5);

        assert_eq!(fluid.density_at(1, 1), Ok(9.5));
        assert_eq!(fluid.density_at(2, 2), Ok(0.));
        assert_eq!(fluid.density_at(0, 0), Ok(0.));
    }

    #[test]
    fn test_single_impulse_scenario() {
        let mut fluid = Fluid::new(FluidConfig {
            size: 8,
            diffusion: 0.,
            viscosity: 0.,
            dt: 0.2,
            ..FluidConfig::default()
        })
        .unwrap();

        fluid.add_density(4, 4, 64.).unwrap();
        fluid.add_velocity(4, 4, 1., 0.).unwrap();
        fluid.step();

        let centre = fluid.density_at(4, 4).unwrap();
        let total = fluid.total_density();
        println!("centre: {centre}, total: {total}");

        assert!(centre < 64.);
        assert!(total > 0.8 * 64. && total <= 64.);
        assert!(fluid.density().iter().all(|d| d.is_finite() && *d >= 0.));
    }

    #[test]
    fn test_drag_carries_density_downstream() {
        let mut fluid = small_fluid(8, 0.2);

        fluid.add_density(4, 4, 64.).unwrap();
        for x in 1..7 {
            fluid.add_velocity(x, 4, 1., 0.).unwrap();
        }
        fluid.step();

        let centre = fluid.density_at(4, 4).unwrap();
        let downstream = fluid.density_at(5, 4).unwrap();
        println!("centre: {centre}, downstream: {downstream}");

        assert!(centre < 64.);
        assert!(downstream > 0.);
        assert!(fluid.density_at(3, 4).unwrap() < downstream);
    }

    #[test]
    fn test_large_timestep_is_stable() {
        let mut rng = rand::rng();
        let mut fluid = Fluid::new(FluidConfig {
            size: 32,
            diffusion: 0.0001,
            viscosity: 0.0001,
            dt: 2.0,
            ..FluidConfig::default()
        })
        .unwrap();

        for _ in 0..60 {
            for _ in 0..5 {
                let (x, y) = (rng.random_range(1..31), rng.random_range(1..31));
                fluid.add_density(x, y, 100.).unwrap();
                fluid
                    .add_velocity(x, y, rng.random_range(-5.0..5.0), rng.random_range(-5.0..5.0))
                    .unwrap();
            }
            fluid.step();
            fluid.fade(0.5);

            assert!(
                fluid
                    .density()
                    .iter()
                    .all(|d| (0.0..=MAX_DENSITY).contains(d))
            );
            assert!(fluid.velocity().iter().all(|u| u.iter().all(|v| v.is_finite())));
        }
    }

    #[test]
    fn test_config_from_json_fills_defaults() {
        let config: FluidConfig = serde_json::from_str(r#"{ "size": 64, "dt": 0.1 }"#).unwrap();

        assert_eq!(config.size, 64);
        assert_eq!(config.dt, 0.1);
        assert_eq!(config.iterations, 1);
        assert_eq!(config.density_stencil, 6.);
    }
}
