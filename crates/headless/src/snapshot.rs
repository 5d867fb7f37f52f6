//! PNG output of a [`RasterSurface`].
//!
//! Feature-gated behind `png` (default on) so library users that only need
//! the raster can skip the `image` crate.

use crate::raster::RasterSurface;
use glyph_field_core::error::EngineError;
use std::path::Path;

/// Writes the surface as an RGBA PNG.
///
/// Returns `EngineError::Io` on encode or write failure.
pub fn write_png(surface: &RasterSurface, path: &Path) -> Result<(), EngineError> {
    let img = image::RgbaImage::from_raw(surface.width(), surface.height(), surface.to_rgba8())
        .ok_or_else(|| EngineError::Io("RGBA buffer size mismatch".into()))?;
    img.save(path).map_err(|e| EngineError::Io(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use glyph_field_core::{Srgb, Surface, Viewport};

    #[test]
    fn write_png_round_trip() {
        let mut surface = RasterSurface::new(Viewport::new(16.0, 12.0, 2.0).unwrap()).unwrap();
        surface.translate(8.0, 6.0);
        surface.draw_glyph("+", 8.0, Srgb::from_hex("#ffffff").unwrap(), 1.0);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("field.png");

        write_png(&surface, &path).unwrap();

        let img = image::open(&path).unwrap().to_rgba8();
        assert_eq!(img.width(), 32);
        assert_eq!(img.height(), 24);
        assert_eq!(img.get_pixel(16, 12).0, [255, 255, 255, 255]);
        assert_eq!(img.get_pixel(0, 0).0[3], 0);
    }

    #[test]
    fn write_png_to_missing_directory_is_io_error() {
        let surface = RasterSurface::new(Viewport::new(4.0, 4.0, 1.0).unwrap()).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("field.png");
        assert!(matches!(write_png(&surface, &path), Err(EngineError::Io(_))));
    }
}
