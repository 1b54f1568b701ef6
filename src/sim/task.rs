/// Task runner for the solver thread

use std::{
    sync::mpsc,
    thread::{self, JoinHandle},
};

use indicatif::{ProgressBar, ProgressStyle};
use tracing::{error, info};

use crate::{
    observers::imgstream::{self, DensityPacket},
    preprocessing::{ImageStreamSettings, InterfaceMode, SimulationInput},
    sim::{
        brush::Brush,
        error::FluidError,
        fluid::Fluid,
        runner::{Frame, FrameRunner},
    },
};

#[derive(Clone, Debug)]
pub struct SimulationOutput {
    /// Number of frames produced
    pub frame_count: usize,

    /// Simulated time covered
    pub elapsed_time: f32,

    /// Total density left after the last frame
    pub final_total_density: f32,
}

fn progress_bar(frames: usize) -> ProgressBar {
    let bar = ProgressBar::new(frames as u64);
    if let Ok(style) = ProgressStyle::with_template(
        "[Elapsed: {elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} frames (Remaining: {eta_precise})",
    ) {
        bar.set_style(style.progress_chars("##-"));
    }
    bar
}

/// Build the fluid, brush, and frame loop described by `simulation_input`
pub fn build_runner(simulation_input: &SimulationInput) -> Result<FrameRunner, FluidError> {
    let fluid = Fluid::new(simulation_input.fluid.clone())?;
    let brush = Brush::new(simulation_input.strokes.clone(), simulation_input.scale);

    Ok(FrameRunner::new(
        fluid,
        brush,
        simulation_input.fade,
        simulation_input.frames,
    ))
}

/// Drain `runner`, calling `on_frame` for each frame, and summarize the run
fn drive(runner: FrameRunner, mut on_frame: impl FnMut(&Frame)) -> SimulationOutput {
    let bar = progress_bar(runner.frame_count());

    let mut output = SimulationOutput {
        frame_count: 0,
        elapsed_time: 0.,
        final_total_density: 0.,
    };

    for frame in runner {
        on_frame(&frame);

        output.frame_count += 1;
        output.elapsed_time = frame.time;
        output.final_total_density = frame.total_density;
        bar.inc(1);
    }
    bar.finish();

    output
}

/// The solver thread task to run in ImageStream mode
pub fn imgstream_task(
    settings: &ImageStreamSettings,
    runner: FrameRunner,
    simulation_input: &SimulationInput,
) -> SimulationOutput {
    let (sender, receiver) = mpsc::channel();

    // spawn image io thread
    let frames_dir = settings.frames_dir.clone();
    let scale = simulation_input.scale;
    let writer = thread::spawn(move || {
        if let Err(err) = imgstream::image_io_loop(receiver, &frames_dir, scale) {
            error!("Frame output failed: {err}");
        }
    });

    let output = drive(runner, |frame| {
        let packet = DensityPacket {
            density: frame.density.clone(),
            i: frame.index,
        };
        // a closed channel means the writer already reported its failure
        _ = sender.send(packet);
    });

    drop(sender);
    if writer.join().is_err() {
        error!("Frame output thread panicked");
    }

    output
}

/// The solver thread task to run in Headless mode
pub fn headless_task(runner: FrameRunner) -> SimulationOutput {
    drive(runner, |_| {})
}

/// Spawns the simulation thread and starts the corresponding task
pub fn spawn_sim_thread(
    simulation_input: SimulationInput,
) -> JoinHandle<Result<SimulationOutput, FluidError>> {
    thread::spawn(move || {
        let runner = build_runner(&simulation_input)?;

        let output = match &simulation_input.mode {
            InterfaceMode::ImageStream(settings) => {
                imgstream_task(settings, runner, &simulation_input)
            }
            InterfaceMode::Headless => headless_task(runner),
        };

        info!(
            "Simulated {} frames ({} time units); {:.2} units of dye remain",
            output.frame_count, output.elapsed_time, output.final_total_density
        );

        Ok(output)
    })
}
