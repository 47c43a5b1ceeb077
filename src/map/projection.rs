/// Fixed 2.5-degree NCEP reanalysis grid dimensions.
pub const LON: usize = 144;
pub const LAT: usize = 73;

/// Integer upscale factor from grid cells to screen pixels.
pub const SCALE: usize = 10;

/// Canvas dimensions in pixels.
pub const WIDTH: usize = LON * SCALE;
pub const HEIGHT: usize = LAT * SCALE;

/// Project a single geographic coordinate to pixel space, equirectangular.
///
/// Callers supply lon in [-180, 180] and lat in [-90, 90]; there is no
/// wraparound handling or clamping.
pub fn project_point(lon: f64, lat: f64) -> (i32, i32) {
    let x = ((lon + 180.0) / 360.0 * (WIDTH as f64 - 1.0)).round() as i32;
    let y = ((HEIGHT as f64 - 1.0) - (lat + 90.0) / 180.0 * (HEIGHT as f64 - 1.0)).round() as i32;
    (x, y)
}

/// Project a sequence of (lon, lat) pairs to pixel coordinates.
pub fn project(coords: &[(f64, f64)]) -> Vec<(i32, i32)> {
    coords
        .iter()
        .map(|&(lon, lat)| project_point(lon, lat))
        .collect()
}
