use std::error::Error;

use clap::Parser;
use tracing::Level;

use stable_fluids_2d::{
    postprocessing,
    preprocessing::cli::CliArgs,
    sim::task,
};

fn main() -> Result<(), Box<dyn Error>> {
    let args = CliArgs::parse();

    tracing_subscriber::fmt()
        .with_max_level(if args.verbose { Level::DEBUG } else { Level::INFO })
        .init();

    let simulation_input = args.crate_input();
    simulation_input.log();

    if let Some(savepath) = &args.input_json_savepath {
        simulation_input.save(savepath)?;
    }

    let output = task::spawn_sim_thread(simulation_input.clone())
        .join()
        .map_err(|_| "simulation thread panicked")??;

    postprocessing::postprocess(simulation_input, output);

    Ok(())
}
