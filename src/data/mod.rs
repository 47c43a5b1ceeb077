use anyhow::{bail, ensure, Context, Result};
use chrono::{TimeZone, Utc};
use memmap2::Mmap;
use std::fs::File;
use std::path::Path;

pub mod image;
pub mod sound;

/// Read access to a (time, level, lat, lon) cube of geopotential heights.
///
/// The cube is external to the render core: the core only pulls 2D
/// lat x lon slices and axis metadata from it.
pub trait DataCube {
    fn time_len(&self) -> usize;
    fn level_len(&self) -> usize;
    fn lat_len(&self) -> usize;
    fn lon_len(&self) -> usize;
    /// One lat x lon slice, row-major from north to south.
    fn slice(&self, t: usize, l: usize) -> Result<Vec<f32>>;
    /// Pressure level in millibars.
    fn level_value(&self, l: usize) -> f32;
    /// Human-readable timestamp for the status line.
    fn time_label(&self, t: usize) -> String;
}

const MAGIC: &[u8; 4] = b"HGT1";
const HEADER_LEN: usize = 4 + 4 * 4;

/// Memory-mapped gridded dataset file.
///
/// Self-describing little-endian layout: magic `HGT1`; `u32` dims (time,
/// level, lat, lon); time axis as `i64` hours since the Unix epoch; level,
/// lat and lon axes as `f32`; then the `f32` cube in time-major order.
/// Mapping instead of reading keeps startup cheap for multi-gigabyte files:
/// only the pages a frame actually slices are faulted in.
#[derive(Debug)]
pub struct GridFile {
    map: Mmap,
    times: Vec<i64>,
    levels: Vec<f32>,
    lat_len: usize,
    lon_len: usize,
    data_offset: usize,
}

impl GridFile {
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("opening dataset {}", path.display()))?;
        let map = unsafe { Mmap::map(&file) }
            .with_context(|| format!("mapping dataset {}", path.display()))?;

        ensure!(map.len() >= HEADER_LEN, "dataset header truncated");
        ensure!(&map[0..4] == MAGIC, "bad dataset magic, not an HGT1 file");

        let dim = |i: usize| -> Result<usize> {
            let at = 4 + i * 4;
            let raw = u32::from_le_bytes(
                map[at..at + 4].try_into().context("reading dimension")?,
            );
            ensure!(raw > 0, "zero-length dimension in dataset header");
            Ok(raw as usize)
        };
        let (time_len, level_len, lat_len, lon_len) = (dim(0)?, dim(1)?, dim(2)?, dim(3)?);

        let times_at = HEADER_LEN;
        let levels_at = times_at + 8 * time_len;
        let lats_at = levels_at + 4 * level_len;
        let lons_at = lats_at + 4 * lat_len;
        let data_offset = lons_at + 4 * lon_len;
        let expected = data_offset + 4 * time_len * level_len * lat_len * lon_len;
        ensure!(
            map.len() == expected,
            "dataset is {} bytes, header describes {}",
            map.len(),
            expected
        );

        let times = map[times_at..levels_at]
            .chunks_exact(8)
            .map(|c| i64::from_le_bytes(c.try_into().expect("chunk of 8")))
            .collect();
        let levels = map[levels_at..lats_at]
            .chunks_exact(4)
            .map(|c| f32::from_le_bytes(c.try_into().expect("chunk of 4")))
            .collect();

        Ok(Self {
            map,
            times,
            levels,
            lat_len,
            lon_len,
            data_offset,
        })
    }

    /// Write a dataset in the `HGT1` layout; `data` is time-major
    /// `times x levels x lats x lons`.
    pub fn write(
        path: &Path,
        times: &[i64],
        levels: &[f32],
        lats: &[f32],
        lons: &[f32],
        data: &[f32],
    ) -> Result<()> {
        ensure!(
            data.len() == times.len() * levels.len() * lats.len() * lons.len(),
            "data length {} does not match axes",
            data.len()
        );

        let mut bytes = Vec::with_capacity(HEADER_LEN + 4 * data.len());
        bytes.extend_from_slice(MAGIC);
        for len in [times.len(), levels.len(), lats.len(), lons.len()] {
            bytes.extend_from_slice(&(len as u32).to_le_bytes());
        }
        for &t in times {
            bytes.extend_from_slice(&t.to_le_bytes());
        }
        for axis in [levels, lats, lons] {
            for &v in axis {
                bytes.extend_from_slice(&v.to_le_bytes());
            }
        }
        for &v in data {
            bytes.extend_from_slice(&v.to_le_bytes());
        }

        std::fs::write(path, bytes)
            .with_context(|| format!("writing dataset {}", path.display()))
    }
}

impl DataCube for GridFile {
    fn time_len(&self) -> usize {
        self.times.len()
    }

    fn level_len(&self) -> usize {
        self.levels.len()
    }

    fn lat_len(&self) -> usize {
        self.lat_len
    }

    fn lon_len(&self) -> usize {
        self.lon_len
    }

    fn slice(&self, t: usize, l: usize) -> Result<Vec<f32>> {
        if t >= self.times.len() || l >= self.levels.len() {
            bail!("slice ({t}, {l}) out of range");
        }
        let cells = self.lat_len * self.lon_len;
        let start = self.data_offset + 4 * (t * self.levels.len() + l) * cells;
        // The mapped region may not be f32-aligned, so copy out per value.
        Ok(self.map[start..start + 4 * cells]
            .chunks_exact(4)
            .map(|c| f32::from_le_bytes(c.try_into().expect("chunk of 4")))
            .collect())
    }

    fn level_value(&self, l: usize) -> f32 {
        self.levels.get(l).copied().unwrap_or(f32::NAN)
    }

    fn time_label(&self, t: usize) -> String {
        match self.times.get(t) {
            Some(&hours) => format_epoch_hours(hours),
            None => format!("t={t}"),
        }
    }
}

/// Vec-backed cube for tests, benches and synthetic data.
pub struct InMemoryCube {
    times: Vec<i64>,
    levels: Vec<f32>,
    lat_len: usize,
    lon_len: usize,
    data: Vec<f32>,
}

impl InMemoryCube {
    pub fn new(
        times: Vec<i64>,
        levels: Vec<f32>,
        lat_len: usize,
        lon_len: usize,
        data: Vec<f32>,
    ) -> Result<Self> {
        ensure!(
            data.len() == times.len() * levels.len() * lat_len * lon_len,
            "data length {} does not match axes",
            data.len()
        );
        Ok(Self {
            times,
            levels,
            lat_len,
            lon_len,
            data,
        })
    }
}

impl DataCube for InMemoryCube {
    fn time_len(&self) -> usize {
        self.times.len()
    }

    fn level_len(&self) -> usize {
        self.levels.len()
    }

    fn lat_len(&self) -> usize {
        self.lat_len
    }

    fn lon_len(&self) -> usize {
        self.lon_len
    }

    fn slice(&self, t: usize, l: usize) -> Result<Vec<f32>> {
        if t >= self.times.len() || l >= self.levels.len() {
            bail!("slice ({t}, {l}) out of range");
        }
        let cells = self.lat_len * self.lon_len;
        let start = (t * self.levels.len() + l) * cells;
        Ok(self.data[start..start + cells].to_vec())
    }

    fn level_value(&self, l: usize) -> f32 {
        self.levels.get(l).copied().unwrap_or(f32::NAN)
    }

    fn time_label(&self, t: usize) -> String {
        match self.times.get(t) {
            Some(&hours) => format_epoch_hours(hours),
            None => format!("t={t}"),
        }
    }
}

/// Format hours since the Unix epoch as `YYYY-MM-DD HH:MM`.
fn format_epoch_hours(hours: i64) -> String {
    match Utc.timestamp_opt(hours * 3600, 0).single() {
        Some(dt) => dt.format("%Y-%m-%d %H:%M").to_string(),
        None => format!("t+{hours}h"),
    }
}
