//! Pixel storage for a single layer.

use image::RgbaImage;
use serde::{Deserialize, Serialize};

use crate::error::{EditError, Result};
use crate::types::{Colour, Rect};

/// How a buffer stores its pixels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PixelData {
    /// One colour per pixel.
    Rgba(Vec<Colour>),
    /// One palette index per pixel. Read-only except for palette remapping.
    Indexed {
        palette: Vec<Colour>,
        indices: Vec<u8>,
    },
}

/// A dense `width x height` grid of colours, row-major.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    data: PixelData,
}

impl PixelBuffer {
    /// Create a fully transparent RGBA buffer.
    pub fn new(width: u32, height: u32) -> Result<Self> {
        Self::filled(width, height, Colour::TRANSPARENT)
    }

    /// Create an RGBA buffer where every pixel is `colour`.
    pub fn filled(width: u32, height: u32, colour: Colour) -> Result<Self> {
        check_dimensions(width, height)?;
        Ok(Self {
            width,
            height,
            data: PixelData::Rgba(vec![colour; width as usize * height as usize]),
        })
    }

    /// Create an indexed buffer. Every index must address the palette.
    pub fn indexed(width: u32, height: u32, palette: Vec<Colour>, indices: Vec<u8>) -> Result<Self> {
        check_dimensions(width, height)?;
        if indices.len() != width as usize * height as usize {
            return Err(EditError::InvalidDimensions {
                message: format!(
                    "{} indices for a {}x{} image",
                    indices.len(),
                    width,
                    height
                ),
            });
        }
        if palette.is_empty() || palette.len() > 256 {
            return Err(EditError::InvalidDimensions {
                message: format!("palette of {} colours (expected 1-256)", palette.len()),
            });
        }
        if let Some(bad) = indices.iter().find(|&&i| i as usize >= palette.len()) {
            return Err(EditError::InvalidDimensions {
                message: format!("index {} outside a {}-colour palette", bad, palette.len()),
            });
        }
        Ok(Self {
            width,
            height,
            data: PixelData::Indexed { palette, indices },
        })
    }

    /// Build an RGBA buffer from row-major colours.
    pub fn from_colours(width: u32, height: u32, colours: Vec<Colour>) -> Result<Self> {
        check_dimensions(width, height)?;
        if colours.len() != width as usize * height as usize {
            return Err(EditError::InvalidDimensions {
                message: format!("{} pixels for a {}x{} image", colours.len(), width, height),
            });
        }
        Ok(Self {
            width,
            height,
            data: PixelData::Rgba(colours),
        })
    }

    /// Build from parts whose sizes the caller has already checked.
    pub(crate) fn from_parts(width: u32, height: u32, colours: Vec<Colour>) -> Self {
        debug_assert!(width > 0 && height > 0);
        debug_assert_eq!(colours.len(), width as usize * height as usize);
        Self {
            width,
            height,
            data: PixelData::Rgba(colours),
        }
    }

    /// Copy an `image` RGBA buffer.
    pub fn from_rgba_image(img: &RgbaImage) -> Result<Self> {
        let colours = img.pixels().map(|p| Colour::from(*p)).collect();
        Self::from_colours(img.width(), img.height(), colours)
    }

    /// Convert to an `image` RGBA buffer (indexed buffers are expanded).
    pub fn to_rgba_image(&self) -> RgbaImage {
        RgbaImage::from_fn(self.width, self.height, |x, y| self.pixel(x, y).into())
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Dimensions as (width, height).
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn bounds(&self) -> Rect {
        Rect::canvas(self.width, self.height)
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as u32) < self.width && (y as u32) < self.height
    }

    pub fn is_indexed(&self) -> bool {
        matches!(self.data, PixelData::Indexed { .. })
    }

    pub fn data(&self) -> &PixelData {
        &self.data
    }

    /// Palette of an indexed buffer.
    pub fn palette(&self) -> Option<&[Colour]> {
        match &self.data {
            PixelData::Indexed { palette, .. } => Some(palette),
            PixelData::Rgba(_) => None,
        }
    }

    /// Read a pixel, failing if the position is off the buffer.
    pub fn get(&self, x: i32, y: i32) -> Result<Colour> {
        self.check_bounds(x, y)?;
        Ok(self.pixel(x as u32, y as u32))
    }

    /// Write a pixel.
    ///
    /// Fails with `OutOfBounds` for positions off the buffer and
    /// `UnsupportedFormat` for indexed buffers.
    pub fn set(&mut self, x: i32, y: i32, colour: Colour) -> Result<()> {
        self.check_bounds(x, y)?;
        self.ensure_writable("set pixel")?;
        self.put(x as u32, y as u32, colour);
        Ok(())
    }

    /// Fail with `OutOfBounds` unless (x, y) is on the buffer.
    pub fn check_bounds(&self, x: i32, y: i32) -> Result<()> {
        if self.contains(x, y) {
            Ok(())
        } else {
            Err(EditError::OutOfBounds {
                x: x as i64,
                y: y as i64,
                width: self.width,
                height: self.height,
            })
        }
    }

    /// Fail with `UnsupportedFormat` if this buffer cannot be written to.
    pub fn ensure_writable(&self, operation: &str) -> Result<()> {
        if self.is_indexed() {
            Err(EditError::unsupported(operation))
        } else {
            Ok(())
        }
    }

    /// Read a pixel known to be in bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Colour {
        debug_assert!(x < self.width && y < self.height);
        let i = self.index(x, y);
        match &self.data {
            PixelData::Rgba(colours) => colours[i],
            PixelData::Indexed { palette, indices } => palette[indices[i] as usize],
        }
    }

    /// Write a pixel known to be in bounds on an RGBA buffer.
    pub(crate) fn put(&mut self, x: u32, y: u32, colour: Colour) {
        debug_assert!(x < self.width && y < self.height);
        let i = self.index(x, y);
        match &mut self.data {
            PixelData::Rgba(colours) => colours[i] = colour,
            PixelData::Indexed { .. } => {
                debug_assert!(false, "write to indexed buffer bypassed ensure_writable");
            }
        }
    }

    /// Replace one palette entry, returning the previous colour.
    pub fn remap_palette(&mut self, index: u8, colour: Colour) -> Result<Colour> {
        match &mut self.data {
            PixelData::Indexed { palette, .. } => match palette.get_mut(index as usize) {
                Some(slot) => Ok(std::mem::replace(slot, colour)),
                None => Err(EditError::InvalidDimensions {
                    message: format!(
                        "palette index {} outside a {}-colour palette",
                        index,
                        palette.len()
                    ),
                }),
            },
            PixelData::Rgba(_) => Err(EditError::unsupported("palette remap on an RGBA image")),
        }
    }

    /// Iterate all pixels row by row.
    pub fn pixels(&self) -> impl Iterator<Item = Colour> + '_ {
        (0..self.height).flat_map(move |y| (0..self.width).map(move |x| self.pixel(x, y)))
    }

    /// Copy of the pixels under `rect`, which must lie inside the buffer.
    pub fn region(&self, rect: Rect) -> Result<PixelBuffer> {
        let clipped = rect.clip(self.width, self.height);
        if clipped != Some(rect) {
            return Err(EditError::OutOfBounds {
                x: rect.x as i64,
                y: rect.y as i64,
                width: self.width,
                height: self.height,
            });
        }
        let colours = rect
            .points()
            .map(|(x, y)| self.pixel(x as u32, y as u32))
            .collect();
        PixelBuffer::from_colours(rect.width, rect.height, colours)
    }

    /// Flat RGBA bytes, row-major.
    pub fn to_rgba_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.width as usize * self.height as usize * 4);
        for colour in self.pixels() {
            bytes.extend_from_slice(&colour.to_rgba());
        }
        bytes
    }

    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }
}

fn check_dimensions(width: u32, height: u32) -> Result<()> {
    if width == 0 || height == 0 {
        return Err(EditError::InvalidDimensions {
            message: format!("{}x{} (both sides must be at least 1)", width, height),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_colour_indexed() -> PixelBuffer {
        PixelBuffer::indexed(2, 1, vec![Colour::RED, Colour::BLUE], vec![0, 1]).unwrap()
    }

    #[test]
    fn test_new_is_transparent() {
        let buf = PixelBuffer::new(3, 2).unwrap();
        assert_eq!(buf.size(), (3, 2));
        assert!(buf.pixels().all(|c| c == Colour::TRANSPARENT));
    }

    #[test]
    fn test_zero_dimensions_rejected() {
        assert!(matches!(
            PixelBuffer::new(0, 4),
            Err(EditError::InvalidDimensions { .. })
        ));
    }

    #[test]
    fn test_set_and_get() {
        let mut buf = PixelBuffer::new(4, 4).unwrap();
        buf.set(1, 2, Colour::RED).unwrap();
        assert_eq!(buf.get(1, 2).unwrap(), Colour::RED);
        assert_eq!(buf.get(2, 1).unwrap(), Colour::TRANSPARENT);
    }

    #[test]
    fn test_set_out_of_bounds() {
        let mut buf = PixelBuffer::new(4, 4).unwrap();
        assert!(matches!(
            buf.set(4, 0, Colour::RED),
            Err(EditError::OutOfBounds { x: 4, y: 0, .. })
        ));
        assert!(matches!(
            buf.get(-1, 0),
            Err(EditError::OutOfBounds { .. })
        ));
    }

    #[test]
    fn test_indexed_is_read_only() {
        let mut buf = two_colour_indexed();
        assert!(matches!(
            buf.set(0, 0, Colour::GREEN),
            Err(EditError::UnsupportedFormat { .. })
        ));
        assert_eq!(buf.get(0, 0).unwrap(), Colour::RED);
        assert_eq!(buf.get(1, 0).unwrap(), Colour::BLUE);
    }

    #[test]
    fn test_indexed_remap() {
        let mut buf = two_colour_indexed();
        let old = buf.remap_palette(1, Colour::GREEN).unwrap();
        assert_eq!(old, Colour::BLUE);
        assert_eq!(buf.get(1, 0).unwrap(), Colour::GREEN);
        assert!(buf.remap_palette(5, Colour::GREEN).is_err());
    }

    #[test]
    fn test_indexed_validates_indices() {
        assert!(PixelBuffer::indexed(1, 1, vec![Colour::RED], vec![3]).is_err());
        assert!(PixelBuffer::indexed(2, 1, vec![Colour::RED], vec![0]).is_err());
    }

    #[test]
    fn test_region() {
        let mut buf = PixelBuffer::new(4, 4).unwrap();
        buf.set(2, 2, Colour::RED).unwrap();
        let sub = buf.region(Rect::new(1, 1, 2, 2)).unwrap();
        assert_eq!(sub.get(1, 1).unwrap(), Colour::RED);
        assert!(buf.region(Rect::new(3, 3, 2, 2)).is_err());
    }

    #[test]
    fn test_rgba_image_round_trip() {
        let mut buf = PixelBuffer::new(2, 2).unwrap();
        buf.set(0, 1, Colour::new(10, 20, 30, 40)).unwrap();
        let img = buf.to_rgba_image();
        assert_eq!(img.get_pixel(0, 1).0, [10, 20, 30, 40]);
        assert_eq!(PixelBuffer::from_rgba_image(&img).unwrap(), buf);
    }
}
