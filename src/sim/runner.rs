// Frame loop: forcing, timestep, fade

use tracing::debug;

use crate::{
    ScalarField,
    sim::{brush::Brush, fluid::Fluid},
};

/// One rendered frame of the simulation.
#[derive(Clone, Debug)]
pub struct Frame {
    /// Zero-based frame index
    pub index: usize,

    /// Simulated time at the end of this frame
    pub time: f32,

    /// Density after the step and fade
    pub density: ScalarField,

    pub total_density: f32,
    pub peak_speed: f32,
}

/// Drives a `Fluid` the way a frame loop does: apply the brush, advance one
/// timestep, fade the dye, hand the density to whoever draws it.
pub struct FrameRunner {
    fluid: Fluid,
    brush: Brush,

    /// Dye removed from every cell after each step
    fade: f32,

    /// Number of frames to produce
    frames: usize,

    /// Index of the next frame
    frame: usize,
}

impl FrameRunner {
    pub fn new(fluid: Fluid, brush: Brush, fade: f32, frames: usize) -> Self {
        FrameRunner {
            fluid,
            brush,
            fade,
            frames,
            frame: 0,
        }
    }

    pub fn frame_count(&self) -> usize {
        self.frames
    }
}

impl Iterator for FrameRunner {
    type Item = Frame;

    fn next(&mut self) -> Option<Self::Item> {
        if self.frame >= self.frames {
            return None;
        }

        self.brush.apply(&mut self.fluid, self.frame);
        self.fluid.step();
        self.fluid.fade(self.fade);

        let frame = Frame {
            index: self.frame,
            time: (self.frame + 1) as f32 * self.fluid.config().dt,
            density: self.fluid.density().clone(),
            total_density: self.fluid.total_density(),
            peak_speed: self.fluid.peak_speed(),
        };

        debug!(
            "Frame {}: total density {:.2}, peak speed {:.3}",
            frame.index, frame.total_density, frame.peak_speed
        );

        self.frame += 1;
        Some(frame)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.frames.saturating_sub(self.frame);
        (remaining, Some(remaining))
    }
}
