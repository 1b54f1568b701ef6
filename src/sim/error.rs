// Error taxonomy for the solver

use std::{error::Error, fmt};

#[derive(Debug, Clone, PartialEq)]
pub enum FluidError {
    /// Coordinates outside `[0, size - 1]` on either axis
    OutOfRange { x: i64, y: i64, size: usize },

    /// A `FluidConfig` that the solver cannot run with
    InvalidConfig(String),
}

impl fmt::Display for FluidError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FluidError::OutOfRange { x, y, size } => write!(
                f,
                "cell ({x}, {y}) is outside of the {size}x{size} grid"
            ),
            FluidError::InvalidConfig(reason) => write!(f, "invalid fluid config: {reason}"),
        }
    }
}

impl Error for FluidError {}
