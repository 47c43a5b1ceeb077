use anyhow::{ensure, Context, Result};
use minifb::{Key, KeyRepeat, MouseMode, Window, WindowOptions};
use std::path::Path;
use std::time::Duration;

use reanalysis_browser::app::{InputEvent, ViewState};
use reanalysis_browser::data::{DataCube, GridFile};
use reanalysis_browser::map::overlay::{BuiltinCoastline, GeoJsonCoastline};
use reanalysis_browser::map::{CoastlineOverlay, CoastlineSource, OverlayCache, HEIGHT, LAT, LON, WIDTH};
use reanalysis_browser::render;
use reanalysis_browser::ui::{StatusReporter, TerminalStatus};

const DEFAULT_DATASET: &str = "data/reanalysis.hgt.grid";
const COASTLINE_GEOJSON: &str = "data/ne_110m_coastline.json";

/// End-of-tick delay capping the frame rate.
const FRAME_DELAY: Duration = Duration::from_millis(5);

fn main() -> Result<()> {
    // No flags; a single optional argument overrides the dataset path.
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_DATASET.to_string());
    let cube = GridFile::open(Path::new(&path))?;
    ensure!(
        cube.lat_len() == LAT && cube.lon_len() == LON,
        "dataset grid is {}x{}, expected {}x{}",
        cube.lat_len(),
        cube.lon_len(),
        LAT,
        LON
    );

    let source: Box<dyn CoastlineSource> = if Path::new(COASTLINE_GEOJSON).exists() {
        Box::new(GeoJsonCoastline::new(COASTLINE_GEOJSON))
    } else {
        eprintln!("Warning: {COASTLINE_GEOJSON} not found, using builtin outlines");
        Box::new(BuiltinCoastline)
    };
    let mut cache = OverlayCache::new();
    let overlay = cache.get_or_build(source.as_ref())?;

    let mut status = TerminalStatus::new();
    run(&cube, overlay, &mut status)
}

/// The render loop. Each tick: drain input, advance time, slice the cube,
/// normalize, colorize, mask, present, report, pace. The window is dropped
/// on every exit path, error or not.
fn run(
    cube: &dyn DataCube,
    overlay: &CoastlineOverlay,
    status: &mut dyn StatusReporter,
) -> Result<()> {
    let mut window = Window::new("reanalysis", WIDTH, HEIGHT, WindowOptions::default())
        .context("creating display window")?;

    let mut canvas = vec![0u32; WIDTH * HEIGHT];
    let mut state = ViewState::new();
    let mut last_pointer: Option<(f32, f32)> = None;

    while state.running {
        let events = poll_events(&window, &mut last_pointer);
        state.handle_events(events);
        if !state.paused {
            state.advance_time();
        }

        let t = state.time_index(cube.time_len());
        let l = state.level_index(cube.level_len());
        let field = cube.slice(t, l)?;

        let normalized = render::normalize(&field);
        render::colorize_into(&normalized, cube.lat_len(), cube.lon_len(), &mut canvas);
        render::apply_mask(&mut canvas, overlay.mask());
        window
            .update_with_buffer(&canvas, WIDTH, HEIGHT)
            .context("presenting frame")?;

        let (i, j) = state.probe_indices(cube.lat_len(), cube.lon_len());
        let value = field[i * cube.lon_len() + j];
        status.report(&cube.time_label(t), value, cube.level_value(l))?;

        std::thread::sleep(FRAME_DELAY);
    }

    Ok(())
}

/// Drain this tick's device input into the core event vocabulary. Pointer
/// motion is emitted only when the position actually changed, so autoplay
/// is not pinned to a resting mouse.
fn poll_events(window: &Window, last_pointer: &mut Option<(f32, f32)>) -> Vec<InputEvent> {
    let mut events = Vec::new();

    if window.is_key_pressed(Key::Space, KeyRepeat::No) {
        events.push(InputEvent::TogglePause);
    }
    if window.is_key_pressed(Key::Equal, KeyRepeat::Yes) {
        events.push(InputEvent::SpeedUp);
    }
    if window.is_key_pressed(Key::Minus, KeyRepeat::Yes) {
        events.push(InputEvent::SpeedDown);
    }
    if window.is_key_pressed(Key::Q, KeyRepeat::No) {
        events.push(InputEvent::Quit);
    }

    if let Some(pos) = window.get_mouse_pos(MouseMode::Clamp) {
        if *last_pointer != Some(pos) {
            *last_pointer = Some(pos);
            events.push(InputEvent::PointerMove {
                x: (pos.0 / WIDTH as f32) as f64,
                y: (pos.1 / HEIGHT as f32) as f64,
            });
        }
    }

    if !window.is_open() {
        events.push(InputEvent::Close);
    }

    events
}
