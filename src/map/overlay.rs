use anyhow::{bail, Context, Result};
use geojson::{GeoJson, Geometry, Value};
use std::fs;
use std::path::{Path, PathBuf};

use super::geometry::draw_line;
use super::projection::{project, HEIGHT, WIDTH};

/// A coastline polyline in geographic (lon, lat) coordinates.
pub type Polyline = Vec<(f64, f64)>;

/// Supplier of coastline geometry. The overlay consults it exactly once.
pub trait CoastlineSource {
    fn polylines(&self) -> Result<Vec<Polyline>>;
}

/// Natural Earth coastline GeoJSON on disk.
///
/// Malformed files abort overlay construction: a silently dropped polyline
/// would render a wrong map, so there is no skip-and-continue path here.
pub struct GeoJsonCoastline {
    path: PathBuf,
}

impl GeoJsonCoastline {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl CoastlineSource for GeoJsonCoastline {
    fn polylines(&self) -> Result<Vec<Polyline>> {
        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("reading coastline file {}", self.path.display()))?;
        let geojson: GeoJson = content
            .parse()
            .with_context(|| format!("parsing coastline file {}", self.path.display()))?;

        let mut lines = Vec::new();
        collect_lines(&geojson, &mut lines)?;
        if lines.is_empty() {
            bail!("no line geometry in {}", self.path.display());
        }
        Ok(lines)
    }
}

fn collect_lines(geojson: &GeoJson, lines: &mut Vec<Polyline>) -> Result<()> {
    match geojson {
        GeoJson::FeatureCollection(fc) => {
            for feature in &fc.features {
                if let Some(ref geometry) = feature.geometry {
                    collect_geometry(geometry, lines)?;
                }
            }
        }
        GeoJson::Feature(f) => {
            if let Some(ref geometry) = f.geometry {
                collect_geometry(geometry, lines)?;
            }
        }
        GeoJson::Geometry(geometry) => collect_geometry(geometry, lines)?,
    }
    Ok(())
}

fn collect_geometry(geometry: &Geometry, lines: &mut Vec<Polyline>) -> Result<()> {
    match &geometry.value {
        Value::LineString(coords) => lines.push(to_polyline(coords)?),
        Value::MultiLineString(parts) => {
            for coords in parts {
                lines.push(to_polyline(coords)?);
            }
        }
        Value::Polygon(rings) => {
            if let Some(exterior) = rings.first() {
                lines.push(to_polyline(exterior)?);
            }
        }
        Value::MultiPolygon(polygons) => {
            for rings in polygons {
                if let Some(exterior) = rings.first() {
                    lines.push(to_polyline(exterior)?);
                }
            }
        }
        Value::GeometryCollection(geometries) => {
            for g in geometries {
                collect_geometry(g, lines)?;
            }
        }
        _ => {}
    }
    Ok(())
}

fn to_polyline(coords: &[Vec<f64>]) -> Result<Polyline> {
    coords
        .iter()
        .map(|c| match c.as_slice() {
            [lon, lat, ..] => Ok((*lon, *lat)),
            _ => bail!("malformed coordinate {c:?} in coastline geometry"),
        })
        .collect()
}

/// Simplified continent outlines for when no coastline file is available.
pub struct BuiltinCoastline;

impl CoastlineSource for BuiltinCoastline {
    fn polylines(&self) -> Result<Vec<Polyline>> {
        Ok(vec![
            // North America
            vec![
                (-168.0, 65.0), (-166.0, 60.0), (-141.0, 60.0), (-130.0, 55.0),
                (-125.0, 48.0), (-124.0, 40.0), (-117.0, 32.0), (-110.0, 25.0),
                (-97.0, 25.0), (-97.0, 28.0), (-82.0, 24.0), (-80.0, 25.0),
                (-81.0, 31.0), (-75.0, 35.0), (-70.0, 41.0), (-67.0, 45.0),
                (-65.0, 47.0), (-55.0, 47.0), (-52.0, 47.0), (-55.0, 52.0),
                (-58.0, 55.0), (-64.0, 60.0), (-73.0, 62.0), (-80.0, 63.0),
                (-95.0, 62.0), (-110.0, 68.0), (-130.0, 70.0), (-145.0, 70.0),
                (-168.0, 65.0),
            ],
            // South America
            vec![
                (-80.0, 10.0), (-75.0, 5.0), (-70.0, 5.0), (-60.0, 5.0),
                (-50.0, 0.0), (-35.0, -5.0), (-35.0, -10.0), (-38.0, -15.0),
                (-40.0, -22.0), (-48.0, -25.0), (-55.0, -34.0), (-58.0, -38.0),
                (-65.0, -42.0), (-68.0, -50.0), (-75.0, -52.0), (-75.0, -45.0),
                (-72.0, -40.0), (-72.0, -30.0), (-70.0, -20.0), (-70.0, -15.0),
                (-80.0, -5.0), (-80.0, 0.0), (-80.0, 10.0),
            ],
            // Europe
            vec![
                (-10.0, 36.0), (-5.0, 36.0), (0.0, 38.0), (5.0, 43.0),
                (10.0, 44.0), (15.0, 45.0), (20.0, 40.0), (25.0, 37.0),
                (30.0, 40.0), (35.0, 42.0), (40.0, 43.0), (40.0, 55.0),
                (30.0, 60.0), (25.0, 65.0), (20.0, 70.0), (10.0, 71.0),
                (5.0, 62.0), (5.0, 58.0), (-5.0, 58.0), (-10.0, 52.0),
                (-5.0, 48.0), (-5.0, 43.0), (-10.0, 36.0),
            ],
            // Africa, southern half
            vec![
                (-17.0, 15.0), (-15.0, 10.0), (-10.0, 5.0), (0.0, 5.0),
                (10.0, 5.0), (15.0, 0.0), (20.0, -5.0), (25.0, -10.0),
                (35.0, -20.0), (35.0, -25.0), (30.0, -30.0), (20.0, -35.0),
                (18.0, -35.0), (15.0, -30.0), (10.0, -15.0), (10.0, 0.0),
                (5.0, 5.0), (-5.0, 5.0), (-10.0, 10.0), (-17.0, 15.0),
            ],
            // Africa, northern half and Arabia
            vec![
                (-17.0, 15.0), (-17.0, 20.0), (-15.0, 28.0), (-5.0, 35.0),
                (10.0, 37.0), (20.0, 33.0), (25.0, 32.0), (35.0, 30.0),
                (35.0, 20.0), (42.0, 12.0), (50.0, 12.0), (45.0, 5.0),
                (35.0, -5.0), (35.0, -20.0),
            ],
            // Asia
            vec![
                (35.0, 42.0), (40.0, 43.0), (50.0, 40.0), (55.0, 37.0),
                (60.0, 25.0), (65.0, 25.0), (70.0, 20.0), (75.0, 15.0),
                (80.0, 8.0), (80.0, 15.0), (88.0, 22.0), (92.0, 22.0),
                (95.0, 16.0), (100.0, 14.0), (105.0, 10.0), (110.0, 20.0),
                (115.0, 22.0), (120.0, 22.0), (122.0, 25.0), (125.0, 30.0),
                (130.0, 35.0), (135.0, 35.0), (140.0, 40.0), (145.0, 45.0),
                (145.0, 50.0), (140.0, 55.0), (135.0, 55.0), (130.0, 52.0),
                (130.0, 43.0), (120.0, 40.0), (110.0, 45.0), (90.0, 50.0),
                (70.0, 55.0), (60.0, 55.0), (50.0, 50.0), (40.0, 43.0),
            ],
            // Australia
            vec![
                (115.0, -20.0), (120.0, -18.0), (130.0, -12.0), (140.0, -12.0),
                (145.0, -15.0), (150.0, -25.0), (153.0, -30.0), (150.0, -35.0),
                (145.0, -38.0), (140.0, -38.0), (135.0, -35.0), (130.0, -32.0),
                (125.0, -32.0), (115.0, -35.0), (115.0, -25.0), (115.0, -20.0),
            ],
        ])
    }
}

/// Projected coastline segments plus the pixel mask they cover.
///
/// Built once at startup; immutable and shared read-only by every frame.
pub struct CoastlineOverlay {
    segments: Vec<((i32, i32), (i32, i32))>,
    mask: Vec<bool>,
}

impl CoastlineOverlay {
    /// Project every polyline vertex and rasterize consecutive-vertex pairs
    /// into the coastline mask.
    pub fn build(source: &dyn CoastlineSource) -> Result<Self> {
        let mut segments = Vec::new();
        let mut mask = vec![false; WIDTH * HEIGHT];

        for line in source.polylines()? {
            let pixels = project(&line);
            for pair in pixels.windows(2) {
                let (a, b) = (pair[0], pair[1]);
                segments.push((a, b));
                draw_line(
                    &mut |x, y| {
                        if (0..WIDTH as i32).contains(&x) && (0..HEIGHT as i32).contains(&y) {
                            mask[y as usize * WIDTH + x as usize] = true;
                        }
                    },
                    a.0,
                    a.1,
                    b.0,
                    b.1,
                );
            }
        }

        Ok(Self { segments, mask })
    }

    pub fn segments(&self) -> &[((i32, i32), (i32, i32))] {
        &self.segments
    }

    /// Boolean mask over the canvas, row-major, true on coastline pixels.
    pub fn mask(&self) -> &[bool] {
        &self.mask
    }

    pub fn is_coast(&self, x: usize, y: usize) -> bool {
        x < WIDTH && y < HEIGHT && self.mask[y * WIDTH + x]
    }
}

/// Build-once cache for the overlay. Reprojection is expensive relative to
/// the frame budget and the geometry is static, so the source is consulted
/// a single time for the process lifetime.
#[derive(Default)]
pub struct OverlayCache {
    built: Option<CoastlineOverlay>,
}

impl OverlayCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_build(&mut self, source: &dyn CoastlineSource) -> Result<&CoastlineOverlay> {
        if self.built.is_none() {
            self.built = Some(CoastlineOverlay::build(source)?);
        }
        Ok(self.built.as_ref().expect("overlay cache populated above"))
    }
}
