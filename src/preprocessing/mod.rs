use std::{
    error::Error,
    fs::File,
    io::BufWriter,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::sim::{brush::Stroke, fluid::FluidConfig};

pub mod cli;

fn default_frames() -> usize {
    300
}

fn default_scale() -> u32 {
    4
}

fn default_fade() -> f32 {
    0.5
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ImageStreamSettings {
    pub frames_dir: PathBuf,
    pub retain_frames: bool,
    pub display_video: bool,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub enum InterfaceMode {
    ImageStream(ImageStreamSettings),
    Headless,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct SimulationInput {
    pub mode: InterfaceMode,

    #[serde(default)]
    pub fluid: FluidConfig,

    /// Number of frames to simulate
    #[serde(default = "default_frames")]
    pub frames: usize,

    /// Display pixels per grid cell
    #[serde(default = "default_scale")]
    pub scale: u32,

    /// Dye removed from every cell each frame
    #[serde(default = "default_fade")]
    pub fade: f32,

    #[serde(default)]
    pub strokes: Vec<Stroke>,
}

impl SimulationInput {
    /// A single left-to-right drag through the middle of the display over
    /// the first third of the run.
    pub fn default_strokes(size: usize, scale: u32, frames: usize) -> Vec<Stroke> {
        let extent = (size as u32 * scale) as f32;

        vec![Stroke::new(
            (0.25 * extent, 0.5 * extent),
            (0.75 * extent, 0.5 * extent),
            0,
            (frames / 3).max(1),
        )]
    }

    /// Simulated time covered by the run
    pub fn simulation_time(&self) -> f32 {
        self.frames as f32 * self.fluid.dt
    }

    /// Write the input as pretty JSON so the run can be repeated with `--input-json`
    pub fn save(&self, path: &Path) -> Result<(), Box<dyn Error>> {
        let writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(writer, self)?;

        info!("Saved simulation input to {:?}", path);
        Ok(())
    }

    pub fn log(&self) {
        let mode = match &self.mode {
            InterfaceMode::ImageStream(_) => "image stream",
            InterfaceMode::Headless => "headless",
        };

        info!(
            "Simulation is shown below:\n\n\
        \t mode:        {}\n\
        \t grid:        {} x {} cells\n\
        \t frames:      {} ({} time units)\n\
        \t dt:          {}\n\
        \t diffusion:   {}\n\
        \t viscosity:   {}\n\
        \t iterations:  {}\n\
        \t stencil:     {} (density)\n\
        \t scale:       {} px/cell\n\
        \t fade:        {} /frame\n\
        \t strokes:     {}\n\n\
        ",
            mode,
            self.fluid.size,
            self.fluid.size,
            self.frames,
            self.simulation_time(),
            self.fluid.dt,
            self.fluid.diffusion,
            self.fluid.viscosity,
            self.fluid.iterations,
            self.fluid.density_stencil,
            self.scale,
            self.fade,
            self.strokes.len(),
        );

        if let InterfaceMode::ImageStream(settings) = &self.mode {
            if let Ok(mode_str) = serde_json::to_string_pretty(settings) {
                info!("Mode parameters are:\n\n{}", mode_str);
            }
        }
    }
}
