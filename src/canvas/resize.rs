//! Canvas resizing (pad/crop) and image resampling.
//!
//! Canvas resize and crop share one placement routine: content is copied
//! into a fresh transparent buffer at an offset, and anything that falls
//! outside is dropped.

use std::fmt;
use std::str::FromStr;

use image::imageops::{self, FilterType};
use serde::{Deserialize, Serialize};

use crate::error::{EditError, Result};
use crate::types::{Colour, Rect};

use super::PixelBuffer;

/// Which point of the old content stays fixed when the canvas changes size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Anchor {
    #[default]
    TopLeft,
    Top,
    TopRight,
    Left,
    Center,
    Right,
    BottomLeft,
    Bottom,
    BottomRight,
}

impl Anchor {
    pub const ALL: [Anchor; 9] = [
        Anchor::TopLeft,
        Anchor::Top,
        Anchor::TopRight,
        Anchor::Left,
        Anchor::Center,
        Anchor::Right,
        Anchor::BottomLeft,
        Anchor::Bottom,
        Anchor::BottomRight,
    ];

    /// Offset that maps old content coordinates into the resized canvas.
    pub fn offset(self, old: (u32, u32), new: (u32, u32)) -> (i64, i64) {
        let dw = new.0 as i64 - old.0 as i64;
        let dh = new.1 as i64 - old.1 as i64;
        let (fx, fy) = match self {
            Anchor::TopLeft => (0, 0),
            Anchor::Top => (1, 0),
            Anchor::TopRight => (2, 0),
            Anchor::Left => (0, 1),
            Anchor::Center => (1, 1),
            Anchor::Right => (2, 1),
            Anchor::BottomLeft => (0, 2),
            Anchor::Bottom => (1, 2),
            Anchor::BottomRight => (2, 2),
        };
        ((dw * fx).div_euclid(2), (dh * fy).div_euclid(2))
    }

    fn name(self) -> &'static str {
        match self {
            Anchor::TopLeft => "top-left",
            Anchor::Top => "top",
            Anchor::TopRight => "top-right",
            Anchor::Left => "left",
            Anchor::Center => "center",
            Anchor::Right => "right",
            Anchor::BottomLeft => "bottom-left",
            Anchor::Bottom => "bottom",
            Anchor::BottomRight => "bottom-right",
        }
    }
}

impl fmt::Display for Anchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Anchor {
    type Err = EditError;

    fn from_str(s: &str) -> Result<Self> {
        Anchor::ALL
            .into_iter()
            .find(|a| a.name() == s)
            .ok_or_else(|| EditError::Parse {
                message: format!("Unknown anchor: {}", s),
                help: Some(
                    "Use one of top-left, top, top-right, left, center, right, \
                     bottom-left, bottom, bottom-right"
                        .to_string(),
                ),
            })
    }
}

/// Pad or crop `buffer` to `width x height`, keeping content fixed at `anchor`.
/// New area is transparent.
pub fn resize_canvas(buffer: &PixelBuffer, width: u32, height: u32, anchor: Anchor) -> Result<PixelBuffer> {
    buffer.ensure_writable("canvas resize")?;
    let (dx, dy) = anchor.offset(buffer.size(), (width, height));
    place(buffer, width, height, dx, dy)
}

/// Cut `buffer` down to `rect`, which must overlap the buffer.
pub fn crop(buffer: &PixelBuffer, rect: Rect) -> Result<PixelBuffer> {
    buffer.ensure_writable("crop")?;
    if rect.clip(buffer.width(), buffer.height()) != Some(rect) {
        return Err(EditError::InvalidDimensions {
            message: format!(
                "crop {}x{} at ({}, {}) does not fit a {}x{} canvas",
                rect.width,
                rect.height,
                rect.x,
                rect.y,
                buffer.width(),
                buffer.height()
            ),
        });
    }
    place(buffer, rect.width, rect.height, -(rect.x as i64), -(rect.y as i64))
}

/// Resample `buffer` to `width x height`: bilinear when `smooth`, else
/// nearest-neighbour.
pub fn resize_image(buffer: &PixelBuffer, width: u32, height: u32, smooth: bool) -> Result<PixelBuffer> {
    buffer.ensure_writable("image resize")?;
    if width == 0 || height == 0 {
        return Err(EditError::InvalidDimensions {
            message: format!("{}x{} (both sides must be at least 1)", width, height),
        });
    }
    if buffer.size() == (width, height) {
        return Ok(buffer.clone());
    }
    let filter = if smooth {
        FilterType::Triangle
    } else {
        FilterType::Nearest
    };
    let resized = imageops::resize(&buffer.to_rgba_image(), width, height, filter);
    PixelBuffer::from_rgba_image(&resized)
}

/// Copy `buffer` into a new transparent `width x height` buffer so that old
/// pixel (x, y) lands on (x + dx, y + dy).
fn place(buffer: &PixelBuffer, width: u32, height: u32, dx: i64, dy: i64) -> Result<PixelBuffer> {
    let mut out = PixelBuffer::filled(width, height, Colour::TRANSPARENT)?;
    for y in 0..buffer.height() {
        let ty = y as i64 + dy;
        if ty < 0 || ty >= height as i64 {
            continue;
        }
        for x in 0..buffer.width() {
            let tx = x as i64 + dx;
            if tx < 0 || tx >= width as i64 {
                continue;
            }
            out.put(tx as u32, ty as u32, buffer.pixel(x, y));
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn marked(width: u32, height: u32) -> PixelBuffer {
        let mut buf = PixelBuffer::filled(width, height, Colour::BLUE).unwrap();
        buf.set(0, 0, Colour::RED).unwrap();
        buf
    }

    #[test]
    fn test_anchor_offsets() {
        assert_eq!(Anchor::TopLeft.offset((4, 4), (8, 6)), (0, 0));
        assert_eq!(Anchor::Center.offset((4, 4), (8, 6)), (2, 1));
        assert_eq!(Anchor::BottomRight.offset((4, 4), (8, 6)), (4, 2));
        assert_eq!(Anchor::BottomRight.offset((8, 6), (4, 4)), (-4, -2));
    }

    #[test]
    fn test_anchor_parse() {
        assert_eq!("bottom-left".parse::<Anchor>().unwrap(), Anchor::BottomLeft);
        assert!("middle".parse::<Anchor>().is_err());
    }

    #[test]
    fn test_pad_top_left() {
        let out = resize_canvas(&marked(2, 2), 4, 3, Anchor::TopLeft).unwrap();
        assert_eq!(out.size(), (4, 3));
        assert_eq!(out.pixel(0, 0), Colour::RED);
        assert_eq!(out.pixel(1, 1), Colour::BLUE);
        assert_eq!(out.pixel(3, 2), Colour::TRANSPARENT);
    }

    #[test]
    fn test_pad_bottom_right() {
        let out = resize_canvas(&marked(2, 2), 4, 4, Anchor::BottomRight).unwrap();
        assert_eq!(out.pixel(2, 2), Colour::RED);
        assert_eq!(out.pixel(0, 0), Colour::TRANSPARENT);
    }

    #[test]
    fn test_shrink_center() {
        let mut buf = PixelBuffer::new(5, 5).unwrap();
        buf.set(2, 2, Colour::GREEN).unwrap();
        let out = resize_canvas(&buf, 3, 3, Anchor::Center).unwrap();
        assert_eq!(out.pixel(1, 1), Colour::GREEN);
    }

    #[test]
    fn test_crop() {
        let mut buf = PixelBuffer::new(4, 4).unwrap();
        buf.set(2, 1, Colour::RED).unwrap();
        let out = crop(&buf, Rect::new(2, 1, 2, 2)).unwrap();
        assert_eq!(out.size(), (2, 2));
        assert_eq!(out.pixel(0, 0), Colour::RED);
        assert!(crop(&buf, Rect::new(3, 3, 2, 2)).is_err());
    }

    #[test]
    fn test_resize_image_nearest() {
        let out = resize_image(&marked(2, 2), 4, 4, false).unwrap();
        assert_eq!(out.size(), (4, 4));
        assert_eq!(out.pixel(0, 0), Colour::RED);
        assert_eq!(out.pixel(1, 1), Colour::RED);
        assert_eq!(out.pixel(3, 3), Colour::BLUE);
    }

    #[test]
    fn test_resize_image_smooth_blends() {
        let mut buf = PixelBuffer::filled(2, 1, Colour::BLACK).unwrap();
        buf.set(1, 0, Colour::WHITE).unwrap();
        let out = resize_image(&buf, 4, 1, true).unwrap();
        let mid = out.pixel(1, 0);
        assert!(mid.r > 0 && mid.r < 255, "expected a blend, got {}", mid);
    }

    #[test]
    fn test_indexed_cannot_resize() {
        let buf = PixelBuffer::indexed(1, 1, vec![Colour::RED], vec![0]).unwrap();
        assert!(matches!(
            resize_canvas(&buf, 2, 2, Anchor::TopLeft),
            Err(EditError::UnsupportedFormat { .. })
        ));
        assert!(matches!(
            resize_image(&buf, 2, 2, true),
            Err(EditError::UnsupportedFormat { .. })
        ));
    }
}
