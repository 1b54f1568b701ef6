use plotters::prelude::*;
use std::{error::Error, fs, path::Path, sync::mpsc};
use tracing::debug;

use crate::{ScalarField, observers::colormap::density_color};

#[derive(Clone)]
pub struct DensityPacket {
    pub density: ScalarField,
    pub i: usize,
}

/// Draw a density field to a PNG, one `scale`×`scale` square per cell.
/// Empty cells are left as the blue background.
///
/// Parameters
/// - `density` - The field to draw, indexed `(x, y)`
/// - `scale` - Pixels per cell along each axis
/// - `filename` - The file name within `frames_dir`
/// - `frames_dir` - The output directory
pub fn image_save(
    density: &ScalarField,
    scale: u32,
    filename: &str,
    frames_dir: &Path,
) -> Result<(), Box<dyn Error>> {
    let (width, height) = density.shape();
    let scale = scale.max(1);

    let filename = frames_dir.join(filename);

    let root = BitMapBackend::new(&filename, (width as u32 * scale, height as u32 * scale))
        .into_drawing_area();
    root.fill(&BLUE)?;

    let side = scale as i32;
    for y in 0..height {
        for x in 0..width {
            let d = density[(x, y)];
            if d <= 0. {
                continue;
            }

            let (px, py) = (x as i32 * side, y as i32 * side);
            root.draw(&Rectangle::new(
                [(px, py), (px + side - 1, py + side - 1)],
                density_color(d).filled(),
            ))?;
        }
    }
    root.present()?;

    Ok(())
}

/// Write every inbound density packet to `<i>.png` until the sender hangs up.
pub fn image_io_loop(
    inbound_frames: mpsc::Receiver<DensityPacket>,
    frames_dir: &Path,
    scale: u32,
) -> Result<(), Box<dyn Error>> {
    if frames_dir.exists() {
        fs::remove_dir_all(frames_dir)?;
    }
    fs::create_dir_all(frames_dir)?;

    for inbound in inbound_frames {
        image_save(
            &inbound.density,
            scale,
            format!("{}.png", inbound.i).as_str(),
            frames_dir,
        )?;
    }

    debug!("Frame stream closed");
    Ok(())
}
