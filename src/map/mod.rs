pub mod geometry;
pub mod overlay;
pub mod projection;

pub use overlay::{CoastlineOverlay, CoastlineSource, OverlayCache};
pub use projection::{HEIGHT, LAT, LON, SCALE, WIDTH};
