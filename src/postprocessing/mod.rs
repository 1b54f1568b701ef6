// Contains post-processers for the rendered frames

pub mod display;

use crate::{
    preprocessing::{InterfaceMode, SimulationInput},
    sim::task::SimulationOutput,
};
use std::fs;
use tracing::{error, warn};

/// Frame rate of the playback window, matching the interactive frame cap
pub const PLAYBACK_FPS: usize = 60;

pub fn postprocess(sim_input: SimulationInput, sim_output: SimulationOutput) {
    if let InterfaceMode::ImageStream(settings) = sim_input.mode {
        if settings.display_video && sim_output.frame_count > 0 {
            _ = display::play_video(PLAYBACK_FPS, &settings.frames_dir)
                .inspect_err(|err| error!("Playback failed: {:?}", err));
        }

        if !settings.retain_frames {
            _ = fs::remove_dir_all(settings.frames_dir)
                .inspect_err(|err| warn!("Unable to cleanup frames output: {:?}", err));
        }
    };
}
