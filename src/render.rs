use rayon::prelude::*;

use crate::map::projection::SCALE;

/// Opaque black, the fixed coastline color.
pub const COAST_COLOR: u32 = 0xFF00_0000;

/// Rescale a scalar field to [0, 1].
///
/// Degenerate fields (constant, empty, or without a finite range) come back
/// as all zeros rather than NaN or infinity.
pub fn normalize(field: &[f32]) -> Vec<f32> {
    let mut min = f32::INFINITY;
    let mut max = f32::NEG_INFINITY;
    for &v in field {
        min = min.min(v);
        max = max.max(v);
    }
    if !(max > min) {
        return vec![0.0; field.len()];
    }

    let span = max - min;
    field.iter().map(|&v| (v - min) / span).collect()
}

/// Convert HSV to RGB.
///
/// `h` is hue in degrees (0-360), `s` and `v` in [0, 1].
pub fn hsv_to_rgb(h: f32, s: f32, v: f32) -> (u8, u8, u8) {
    let h = h % 360.0;
    let c = v * s;
    let x = c * (1.0 - ((h / 60.0) % 2.0 - 1.0).abs());
    let m = v - c;

    let (r, g, b) = if h < 60.0 {
        (c, x, 0.0)
    } else if h < 120.0 {
        (x, c, 0.0)
    } else if h < 180.0 {
        (0.0, c, x)
    } else if h < 240.0 {
        (0.0, x, c)
    } else if h < 300.0 {
        (x, 0.0, c)
    } else {
        (c, 0.0, x)
    };

    (
        ((r + m) * 255.0) as u8,
        ((g + m) * 255.0) as u8,
        ((b + m) * 255.0) as u8,
    )
}

/// Pack RGB into the presentation surface's 32-bit layout
/// (alpha-red-green-blue, full alpha).
#[inline]
pub fn pack_argb(r: u8, g: u8, b: u8) -> u32 {
    0xFF00_0000 | (r as u32) << 16 | (g as u32) << 8 | b as u32
}

/// Colorize a normalized `lat x lon` field into the pixel canvas.
///
/// Each value is treated as a hue (saturation 1, value 1) and each source
/// cell becomes a `SCALE x SCALE` block, nearest-neighbor. The canvas must
/// be `lat*SCALE` rows of `lon*SCALE` pixels.
pub fn colorize_into(field: &[f32], lat: usize, lon: usize, canvas: &mut [u32]) {
    if lat == 0 || lon == 0 {
        return;
    }
    debug_assert_eq!(field.len(), lat * lon);
    debug_assert_eq!(canvas.len(), lat * lon * SCALE * SCALE);

    let width = lon * SCALE;
    canvas
        .par_chunks_mut(width)
        .enumerate()
        .for_each(|(y, row)| {
            let base = (y / SCALE).min(lat - 1) * lon;
            for (sx, block) in row.chunks_mut(SCALE).enumerate() {
                let hue = field[base + sx] * 360.0;
                let (r, g, b) = hsv_to_rgb(hue, 1.0, 1.0);
                block.fill(pack_argb(r, g, b));
            }
        });
}

/// Force every masked pixel to the coastline color. Runs after
/// colorization so the coastline stays visible whatever the field shows.
pub fn apply_mask(canvas: &mut [u32], mask: &[bool]) {
    for (pixel, &coast) in canvas.iter_mut().zip(mask) {
        if coast {
            *pixel = COAST_COLOR;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn normalize_maps_extremes_to_unit_interval() {
        let field = [5012.0, 5436.0, 5873.0, 5210.0];
        let normalized = normalize(&field);
        assert!(normalized.iter().all(|&v| (0.0..=1.0).contains(&v)));
        assert_eq!(normalized[0], 0.0); // min
        assert_eq!(normalized[2], 1.0); // max
    }

    #[test]
    fn normalize_constant_field_is_all_zeros() {
        let normalized = normalize(&[5.0; 12]);
        assert_eq!(normalized, vec![0.0; 12]);
        assert!(normalized.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn normalize_empty_field_is_empty() {
        assert!(normalize(&[]).is_empty());
    }

    #[test]
    fn normalize_two_by_two_exactly() {
        let normalized = normalize(&[0.0, 1.0, 2.0, 3.0]);
        assert_eq!(normalized, vec![0.0, 1.0 / 3.0, 2.0 / 3.0, 1.0]);
    }

    #[test]
    fn hsv_primaries() {
        assert_eq!(hsv_to_rgb(0.0, 1.0, 1.0), (255, 0, 0));
        assert_eq!(hsv_to_rgb(120.0, 1.0, 1.0), (0, 255, 0));
        assert_eq!(hsv_to_rgb(240.0, 1.0, 1.0), (0, 0, 255));
    }

    #[test]
    fn packed_pixels_carry_full_alpha() {
        assert_eq!(pack_argb(0, 0, 0), 0xFF00_0000);
        assert_eq!(pack_argb(0x12, 0x34, 0x56), 0xFF12_3456);
    }

    #[test]
    fn colorize_replicates_cells_into_blocks() {
        let field = normalize(&[0.0, 1.0, 2.0, 3.0]);
        let mut canvas = vec![0u32; 2 * 2 * SCALE * SCALE];
        colorize_into(&field, 2, 2, &mut canvas);

        let width = 2 * SCALE;
        // Top-left block is uniform and matches cell (0, 0).
        let expected = canvas[0];
        for y in 0..SCALE {
            for x in 0..SCALE {
                assert_eq!(canvas[y * width + x], expected);
            }
        }
    }

    #[test]
    fn distinct_values_give_distinct_colors_before_masking() {
        let field = normalize(&[0.0, 1.0, 2.0, 3.0]);
        let mut canvas = vec![0u32; 2 * 2 * SCALE * SCALE];
        colorize_into(&field, 2, 2, &mut canvas);

        let colors: HashSet<u32> = canvas.iter().copied().collect();
        assert_eq!(colors.len(), 4);
        assert!(colors.iter().all(|c| c & 0xFF00_0000 == 0xFF00_0000));
    }

    #[test]
    fn full_frame_pipeline_from_synthetic_cube() {
        use crate::data::{DataCube, InMemoryCube};

        // Two time steps, two levels, 2x2 grid; the t=0, l=0 slice is
        // [[0, 1], [2, 3]].
        let data: Vec<f32> = (0..16).map(|i| i as f32).collect();
        let cube = InMemoryCube::new(vec![0, 6], vec![1000.0, 500.0], 2, 2, data).unwrap();

        let field = cube.slice(0, 0).unwrap();
        let normalized = normalize(&field);
        assert_eq!(normalized, vec![0.0, 1.0 / 3.0, 2.0 / 3.0, 1.0]);

        let mut canvas = vec![0u32; 2 * 2 * SCALE * SCALE];
        colorize_into(&normalized, 2, 2, &mut canvas);
        let colors: HashSet<u32> = canvas.iter().copied().collect();
        assert_eq!(colors.len(), 4);

        let mut mask = vec![false; canvas.len()];
        mask[7] = true;
        apply_mask(&mut canvas, &mask);
        assert_eq!(canvas[7], COAST_COLOR);
    }

    #[test]
    fn masked_pixels_become_coast_color_regardless_of_field() {
        let field = normalize(&[0.0, 1.0, 2.0, 3.0]);
        let mut canvas = vec![0u32; 2 * 2 * SCALE * SCALE];
        colorize_into(&field, 2, 2, &mut canvas);

        let mut mask = vec![false; canvas.len()];
        mask[0] = true;
        mask[canvas.len() - 1] = true;
        apply_mask(&mut canvas, &mask);

        assert_eq!(canvas[0], COAST_COLOR);
        assert_eq!(canvas[canvas.len() - 1], COAST_COLOR);
        assert_ne!(canvas[1], COAST_COLOR);
    }
}
