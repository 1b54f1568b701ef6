/// Handles video playback post-solve

use std::{
    error::Error,
    fs,
    path::{Path, PathBuf},
    time::{Duration, Instant},
};

use image::{DynamicImage, GenericImageView, imageops::FilterType};
use minifb::{Key, Window, WindowOptions};
use screen_size::get_primary_screen_size as get_screen_size;

/// List the `<index>.png` frames in `frames_dir` in frame order
pub fn frame_paths(frames_dir: &Path) -> Result<Vec<PathBuf>, Box<dyn Error>> {
    let frame_index = |p: &Path| {
        p.file_stem()
            .and_then(|s| s.to_str())
            .and_then(|s| s.parse::<usize>().ok())
    };

    let mut paths: Vec<PathBuf> = fs::read_dir(frames_dir)?
        .filter_map(Result::ok)
        .map(|e| e.path())
        .filter(|p| p.extension().and_then(|e| e.to_str()) == Some("png"))
        .filter(|p| frame_index(p).is_some())
        .collect();

    paths.sort_by_key(|p| frame_index(p).unwrap_or(0));
    Ok(paths)
}

/// Open a window and loop the rendered frames until it is closed or
/// Escape is pressed.
///
/// Parameters
/// - `fps` - The playback frame rate
/// - `frames_dir` - The directory that contains the frames (png images) to animate.
pub fn play_video(fps: usize, frames_dir: &Path) -> Result<(), Box<dyn Error>> {
    let paths = frame_paths(frames_dir)?;
    if paths.is_empty() {
        return Err("no PNG frames found".into());
    }

    // load all frames as DynamicImage
    let originals: Vec<DynamicImage> = paths.iter().map(image::open).collect::<Result<_, _>>()?;

    // determine base dimensions; fall back to the native frame size off-screen
    let (w, h) = originals[0].dimensions();
    let init_w = match get_screen_size() {
        Ok((screen_w, _)) => (screen_w as u32 / 2).max(1),
        Err(_) => w,
    };
    let init_h = (init_w as f32 * (h as f32 / w as f32)) as u32;

    // create window
    let mut window = Window::new(
        "Stable Fluids 2D",
        init_w as usize,
        init_h as usize,
        WindowOptions {
            resize: true,
            ..WindowOptions::default()
        },
    )?;

    let frame_time = Duration::from_secs_f64(1.0 / fps.max(1) as f64);
    let start = Instant::now();

    while window.is_open() && !window.is_key_down(Key::Escape) {
        // get current window size
        let (win_w, win_h) = window.get_size();
        // current frame index
        let elapsed = Instant::now().duration_since(start);
        let tick = (elapsed.as_secs_f64() * fps as f64) as usize;
        let idx = tick % originals.len();

        // resize & convert to RGBA buffer
        let img = originals[idx]
            .resize_exact(win_w as u32, win_h as u32, FilterType::Nearest)
            .to_rgba8();

        let buffer: Vec<u32> = img
            .pixels()
            .map(|px| {
                ((px[3] as u32) << 24)
                    | ((px[0] as u32) << 16)
                    | ((px[1] as u32) << 8)
                    | (px[2] as u32)
            })
            .collect();

        window.update_with_buffer(&buffer, win_w, win_h)?;

        // throttle to fps
        let next = start + frame_time * (tick + 1) as u32;
        if let Some(d) = next.checked_duration_since(Instant::now()) {
            std::thread::sleep(d);
        }
    }

    Ok(())
}
