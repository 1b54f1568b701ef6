use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
    process::exit,
    sync::LazyLock,
};

use clap::Parser;
use tracing::{error, info};

use crate::{
    preprocessing::{ImageStreamSettings, InterfaceMode, SimulationInput},
    sim::fluid::FluidConfig,
};

static DEFAULT_FRAMES_PATH: LazyLock<&Path> = LazyLock::new(|| Path::new("sim-frames"));

// Raw, CLI input
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct CliArgs {
    #[arg(long, help = "An input file with pre-loaded parameters.")]
    input_json: Option<PathBuf>,

    #[arg(long, help = "Optional path to save the effective input file to.")]
    pub input_json_savepath: Option<PathBuf>,

    #[arg(
        long,
        help = "The mode to run the simulation in: `video` or `headless`",
        default_value = "video"
    )]
    mode: String,

    #[arg(
        long,
        help = "An optional directory pointing to where frames should be saved."
    )]
    frames_dir: Option<PathBuf>,

    #[arg(
        short,
        long,
        help = "Whether or not frames should be retained after saving.",
        default_value = "false"
    )]
    retain_frames: bool,

    #[arg(
        short,
        long,
        help = "Whether the frame animation should play after solving."
    )]
    display_video: bool,

    #[arg(short = 'n', long, default_value = "128", help = "Grid side length in cells.")]
    size: usize,

    #[arg(long, default_value = "1", help = "Relaxation sweeps per implicit solve.")]
    iterations: usize,

    #[arg(long, default_value = "0.0", help = "Density diffusion rate.")]
    diffusion: f32,

    #[arg(long, default_value = "0.0", help = "Viscosity.")]
    viscosity: f32,

    #[arg(long, default_value = "0.2", help = "Timestep.")]
    dt: f32,

    #[arg(
        long,
        default_value = "6.0",
        help = "Diagonal multiplier for density diffusion; 4 conserves dye."
    )]
    density_stencil: f32,

    #[arg(short, long, default_value = "300", help = "Number of frames to simulate.")]
    frames: usize,

    #[arg(long, default_value = "4", help = "Display pixels per grid cell.")]
    scale: u32,

    #[arg(long, default_value = "0.5", help = "Dye removed from every cell each frame.")]
    fade: f32,

    #[arg(short, long, help = "Log every frame.")]
    pub verbose: bool,
}

impl CliArgs {
    pub fn crate_input(&self) -> SimulationInput {
        // if the input file is supplied, just use that
        if let Some(input_filepath) = &self.input_json {
            if !input_filepath.exists() {
                error!("Input file {:?} does not exist.", input_filepath)
            }
            if input_filepath.is_dir() {
                error!("Input file {:?} is a directory.", input_filepath)
            }

            info!(
                "Using input file {}",
                input_filepath.to_str().unwrap_or("<unknown>")
            );

            let input_file = File::open(input_filepath).unwrap_or_else(|err| {
                error!("Failed to open input file: {:?}", err);
                exit(1);
            });

            let reader = BufReader::new(input_file);
            let mut loaded_input: SimulationInput =
                serde_json::from_reader(reader).unwrap_or_else(|err| {
                    error!("Failed to deserialize input file: {:?}", err);
                    exit(1);
                });

            if loaded_input.strokes.is_empty() {
                loaded_input.strokes = SimulationInput::default_strokes(
                    loaded_input.fluid.size,
                    loaded_input.scale,
                    loaded_input.frames,
                );
            }

            return Self::checked(loaded_input);
        }

        // otherwise, build the input from the other arguments
        let mode = match self.mode.as_str() {
            "video" => {
                let frames_dir = self
                    .frames_dir
                    .as_ref()
                    .map(PathBuf::from)
                    .unwrap_or((*DEFAULT_FRAMES_PATH).into());

                InterfaceMode::ImageStream(ImageStreamSettings {
                    frames_dir,
                    retain_frames: self.retain_frames,
                    display_video: self.display_video,
                })
            }
            "headless" => InterfaceMode::Headless,
            _ => {
                error!(
                    "'{}' is not a valid interface mode. Use --help for info.",
                    self.mode
                );
                exit(1);
            }
        };

        let fluid = FluidConfig {
            size: self.size,
            iterations: self.iterations,
            diffusion: self.diffusion,
            viscosity: self.viscosity,
            dt: self.dt,
            density_stencil: self.density_stencil,
        };

        Self::checked(SimulationInput {
            mode,
            strokes: SimulationInput::default_strokes(fluid.size, self.scale, self.frames),
            fluid,
            frames: self.frames,
            scale: self.scale,
            fade: self.fade,
        })
    }

    /// Reject inputs the solver or the frame writer cannot run with
    fn checked(input: SimulationInput) -> SimulationInput {
        if let Err(err) = input.fluid.validate() {
            error!("{}", err);
            exit(1);
        }
        if input.scale == 0 {
            error!("The display scale must be at least 1 px/cell.");
            exit(1);
        }
        if !input.fade.is_finite() || input.fade < 0. {
            error!("The fade amount must be finite and non-negative.");
            exit(1);
        }

        input
    }
}
