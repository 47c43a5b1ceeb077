//! Interactive false-color browser for gridded atmospheric reanalysis data.
//!
//! One latitude/longitude slice of a (time, level, lat, lon) geopotential
//! height cube is rendered per frame as an HSV heat map with a coastline
//! overlay. The mouse scrubs through pressure level (x) and time (y);
//! the keyboard pauses and changes playback speed.

pub mod app;
pub mod data;
pub mod map;
pub mod render;
pub mod ui;
