use anyhow::{Context, Result};
use image::RgbaImage;
use std::path::Path;

/// Largest edge of the decoded photo after downscaling.
const MAX_EDGE: u32 = 1000;

/// Load a photo and downscale it to fit within 1000x1000, preserving the
/// aspect ratio. Used for the static illustrative image only; nothing in
/// the render loop depends on this.
pub fn load_photo(path: &Path) -> Result<RgbaImage> {
    let img = image::open(path)
        .with_context(|| format!("opening image {}", path.display()))?;
    Ok(img.thumbnail(MAX_EDGE, MAX_EDGE).to_rgba8())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbImage;

    #[test]
    fn oversized_photo_is_scaled_to_fit() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wide.png");
        RgbImage::from_pixel(2000, 1000, image::Rgb([10, 20, 30]))
            .save(&path)
            .unwrap();

        let photo = load_photo(&path).unwrap();
        assert_eq!((photo.width(), photo.height()), (1000, 500));
    }

    #[test]
    fn small_photo_keeps_its_size() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("small.png");
        RgbImage::from_pixel(64, 48, image::Rgb([1, 2, 3]))
            .save(&path)
            .unwrap();

        let photo = load_photo(&path).unwrap();
        assert_eq!((photo.width(), photo.height()), (64, 48));
    }

    #[test]
    fn missing_photo_is_an_error() {
        assert!(load_photo(Path::new("/nonexistent/photo.jpg")).is_err());
    }
}
