// Scripted pointer strokes that feed the forcing API

use rand::{Rng, rngs::ThreadRng};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::sim::fluid::Fluid;

fn default_brush_radius() -> i64 {
    3
}

fn default_density() -> f32 {
    64.
}

fn default_velocity_gain() -> f32 {
    1.
}

/// A pointer drag: the pointer moves in a straight line between two display
/// positions while the button is held.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Stroke {
    /// Pointer position (display pixels) on the first frame
    pub from: (f32, f32),

    /// Pointer position (display pixels) on the last frame
    pub to: (f32, f32),

    /// First frame the button is held
    pub start_frame: usize,

    /// Frame the button is released (exclusive)
    pub end_frame: usize,

    /// Half-width, in cells, of the square of cells receiving dye
    #[serde(default = "default_brush_radius")]
    pub brush_radius: i64,

    /// Dye added to each brush cell per frame
    #[serde(default = "default_density")]
    pub density: f32,

    /// Multiplier on the pointer's per-frame cell displacement
    #[serde(default = "default_velocity_gain")]
    pub velocity_gain: f32,

    /// Amplitude of uniform noise added to each pushed velocity component
    #[serde(default)]
    pub jitter: f32,
}

impl Stroke {
    pub fn new(from: (f32, f32), to: (f32, f32), start_frame: usize, end_frame: usize) -> Self {
        Stroke {
            from,
            to,
            start_frame,
            end_frame,
            brush_radius: default_brush_radius(),
            density: default_density(),
            velocity_gain: default_velocity_gain(),
            jitter: 0.,
        }
    }

    pub fn is_active(&self, frame: usize) -> bool {
        (self.start_frame..self.end_frame).contains(&frame)
    }

    /// The pointer position in display pixels, if the stroke is held on `frame`
    pub fn pointer_at(&self, frame: usize) -> Option<(f32, f32)> {
        if !self.is_active(frame) {
            return None;
        }

        let span = (self.end_frame - self.start_frame).saturating_sub(1).max(1) as f32;
        let t = (frame - self.start_frame) as f32 / span;

        Some((
            self.from.0 + t * (self.to.0 - self.from.0),
            self.from.1 + t * (self.to.1 - self.from.1),
        ))
    }
}

/// Replays strokes against a fluid, one frame at a time, the way a pointer
/// held over the display window would.
pub struct Brush {
    strokes: Vec<Stroke>,

    /// Display pixels per grid cell
    scale: f32,

    /// Pointer cell of each stroke on the previous frame it was held
    previous: Vec<Option<(i64, i64)>>,

    rng: ThreadRng,
}

impl Brush {
    pub fn new(strokes: Vec<Stroke>, scale: u32) -> Self {
        let previous = vec![None; strokes.len()];

        Brush {
            strokes,
            scale: scale.max(1) as f32,
            previous,
            rng: rand::rng(),
        }
    }

    /// Map a display position to the grid cell under it
    pub fn cell_under(&self, pointer: (f32, f32)) -> (i64, i64) {
        (
            (pointer.0 / self.scale).floor() as i64,
            (pointer.1 / self.scale).floor() as i64,
        )
    }

    /// Apply every stroke held on `frame`.
    ///
    /// Each stroke deposits dye over its brush square and pushes the fluid at
    /// the pointer cell by the pointer's displacement since the previous
    /// frame. Cells that fall off the grid are skipped.
    pub fn apply(&mut self, fluid: &mut Fluid, frame: usize) {
        for k in 0..self.strokes.len() {
            let Some(pointer) = self.strokes[k].pointer_at(frame) else {
                self.previous[k] = None;
                continue;
            };

            let (cx, cy) = self.cell_under(pointer);
            let (px, py) = self.previous[k].unwrap_or((cx, cy));
            self.previous[k] = Some((cx, cy));

            let stroke = &self.strokes[k];
            let r = stroke.brush_radius;

            for i in -r..=r {
                for j in -r..=r {
                    if let Err(err) = fluid.add_density(cx + i, cy + j, stroke.density) {
                        trace!("Brush clipped: {err}");
                    }
                }
            }

            let (mut ax, mut ay) = (
                stroke.velocity_gain * (cx - px) as f32,
                stroke.velocity_gain * (cy - py) as f32,
            );
            if stroke.jitter > 0. {
                ax += self.rng.random_range(-stroke.jitter..=stroke.jitter);
                ay += self.rng.random_range(-stroke.jitter..=stroke.jitter);
            }

            if let Err(err) = fluid.add_velocity(cx, cy, ax, ay) {
                trace!("Pointer off the grid: {err}");
            }
        }
    }
}
