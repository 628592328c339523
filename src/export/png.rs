//! PNG import and export of flattened images.

use std::path::Path;

use image::{imageops, imageops::FilterType};

use crate::canvas::PixelBuffer;
use crate::error::{EditError, Result};

/// Write `buffer` to a PNG file, scaled up by an integer factor.
///
/// # Arguments
///
/// * `buffer` - The pixels to write
/// * `path` - Output file path
/// * `scale` - Integer scale factor (1 = no scaling)
pub fn write_png(buffer: &PixelBuffer, path: &Path, scale: u32) -> Result<()> {
    let scale = scale.max(1);
    let mut img = buffer.to_rgba_image();
    if scale > 1 {
        img = imageops::resize(
            &img,
            buffer.width() * scale,
            buffer.height() * scale,
            FilterType::Nearest,
        );
    }

    img.save(path).map_err(|e| EditError::Io {
        path: path.to_path_buf(),
        message: format!("Failed to write PNG: {}", e),
    })?;

    tracing::debug!(path = %path.display(), scale, "wrote png");
    Ok(())
}

/// Load an image file as an RGBA buffer.
pub fn read_png(path: &Path) -> Result<PixelBuffer> {
    if !path.exists() {
        return Err(EditError::Validation {
            path: path.to_path_buf(),
            message: "file not found".to_string(),
            help: None,
        });
    }
    let img = image::open(path).map_err(|e| EditError::Validation {
        path: path.to_path_buf(),
        message: e.to_string(),
        help: Some("Expected a PNG or another image format the editor can decode".to_string()),
    })?;
    PixelBuffer::from_rgba_image(&img.to_rgba8())
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;
    use crate::types::Colour;

    #[test]
    fn test_write_png_simple() {
        let buf = PixelBuffer::from_colours(
            2,
            2,
            vec![Colour::BLACK, Colour::WHITE, Colour::WHITE, Colour::BLACK],
        )
        .unwrap();

        let dir = tempdir().unwrap();
        let path = dir.path().join("test.png");
        write_png(&buf, &path, 1).unwrap();

        let img = image::open(&path).unwrap().to_rgba8();
        assert_eq!(img.width(), 2);
        assert_eq!(img.get_pixel(0, 0).0, [0, 0, 0, 255]);
        assert_eq!(img.get_pixel(1, 0).0, [255, 255, 255, 255]);
    }

    #[test]
    fn test_write_png_scaled() {
        let buf = PixelBuffer::from_colours(2, 1, vec![Colour::RED, Colour::GREEN]).unwrap();
        let dir = tempdir().unwrap();
        let path = dir.path().join("scaled.png");
        write_png(&buf, &path, 2).unwrap();

        let img = image::open(&path).unwrap().to_rgba8();
        assert_eq!((img.width(), img.height()), (4, 2));
        assert_eq!(img.get_pixel(1, 1).0, [255, 0, 0, 255]);
        assert_eq!(img.get_pixel(2, 0).0, [0, 255, 0, 255]);
    }

    #[test]
    fn test_read_round_trip() {
        let mut buf = PixelBuffer::new(3, 2).unwrap();
        buf.set(2, 1, Colour::new(1, 2, 3, 4)).unwrap();
        let dir = tempdir().unwrap();
        let path = dir.path().join("rt.png");
        write_png(&buf, &path, 1).unwrap();
        assert_eq!(read_png(&path).unwrap(), buf);
    }

    #[test]
    fn test_read_missing() {
        let dir = tempdir().unwrap();
        assert!(matches!(
            read_png(&dir.path().join("nope.png")),
            Err(EditError::Validation { .. })
        ));
    }

    #[test]
    fn test_read_garbage() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.png");
        std::fs::write(&path, b"not a png").unwrap();
        assert!(matches!(read_png(&path), Err(EditError::Validation { .. })));
    }
}
