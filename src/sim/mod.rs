// Stable-fluids solver and the frame loop that drives it

pub mod advection;
pub mod boundary;
pub mod brush;
pub mod diffusion;
pub mod error;
pub mod fluid;
pub mod grid;
pub mod projection;
pub mod relaxation;
pub mod runner;
pub mod task;

pub use error::FluidError;
pub use fluid::{Fluid, FluidConfig};
