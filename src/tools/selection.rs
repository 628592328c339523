//! Rectangular selection.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::canvas::PixelBuffer;
use crate::error::{EditError, Result};
use crate::types::Rect;

/// Bounds a selection gesture must respect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionLimits {
    /// Largest requested area, before clipping to the canvas.
    pub max_pixels: u64,
    /// Most unique colours the selected area may contain.
    pub max_colours: usize,
}

impl Default for SelectionLimits {
    fn default() -> Self {
        Self {
            max_pixels: 4096 * 4096,
            max_colours: 256,
        }
    }
}

/// The session's selection. Not part of history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Selection {
    rect: Option<Rect>,
}

impl Selection {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn rect(&self) -> Option<Rect> {
        self.rect
    }

    pub fn is_active(&self) -> bool {
        self.rect.is_some()
    }

    pub fn clear(&mut self) {
        self.rect = None;
    }

    /// Replace the selection with `requested`, clipped to `buffer`.
    ///
    /// On error the previous selection stays in place.
    pub fn select(
        &mut self,
        requested: Rect,
        buffer: &PixelBuffer,
        limits: &SelectionLimits,
    ) -> Result<Option<Rect>> {
        if requested.area() > limits.max_pixels {
            return Err(EditError::SelectionTooLarge {
                pixels: requested.area(),
                max: limits.max_pixels,
            });
        }
        let clipped = requested.clip(buffer.width(), buffer.height());
        if let Some(rect) = clipped {
            check_colours(buffer, rect, limits.max_colours)?;
        }
        self.rect = clipped;
        Ok(clipped)
    }

    /// Set the selection without limit checks, clipped to a `width x height`
    /// canvas. Used after transforms move the selected pixels.
    pub(crate) fn replace(&mut self, rect: Option<Rect>, width: u32, height: u32) {
        self.rect = rect.and_then(|r| r.clip(width, height));
    }
}

fn check_colours(buffer: &PixelBuffer, rect: Rect, max: usize) -> Result<()> {
    let mut seen = HashSet::new();
    for (x, y) in rect.points() {
        seen.insert(buffer.pixel(x as u32, y as u32));
        if seen.len() > max {
            return Err(EditError::TooManyColours { max });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Colour;

    #[test]
    fn test_select_clips_to_canvas() {
        let buf = PixelBuffer::new(10, 10).unwrap();
        let mut sel = Selection::none();
        let rect = sel
            .select(Rect::new(-5, 5, 10, 10), &buf, &SelectionLimits::default())
            .unwrap();
        assert_eq!(rect, Some(Rect::new(0, 5, 5, 5)));
        assert!(sel.is_active());
    }

    #[test]
    fn test_select_outside_canvas_clears() {
        let buf = PixelBuffer::new(10, 10).unwrap();
        let mut sel = Selection::none();
        sel.select(Rect::new(1, 1, 2, 2), &buf, &SelectionLimits::default())
            .unwrap();
        sel.select(Rect::new(20, 20, 2, 2), &buf, &SelectionLimits::default())
            .unwrap();
        assert!(!sel.is_active());
    }

    #[test]
    fn test_too_large_keeps_previous() {
        let buf = PixelBuffer::new(8, 8).unwrap();
        let mut sel = Selection::none();
        sel.select(Rect::new(1, 1, 2, 2), &buf, &SelectionLimits::default())
            .unwrap();
        let err = sel
            .select(Rect::new(0, 0, 5000, 5000), &buf, &SelectionLimits::default())
            .unwrap_err();
        assert!(matches!(
            err,
            EditError::SelectionTooLarge {
                pixels: 25_000_000,
                max: 16_777_216
            }
        ));
        assert_eq!(sel.rect(), Some(Rect::new(1, 1, 2, 2)));
    }

    #[test]
    fn test_too_many_colours() {
        let mut buf = PixelBuffer::new(4, 1).unwrap();
        buf.set(1, 0, Colour::RED).unwrap();
        buf.set(2, 0, Colour::GREEN).unwrap();
        let limits = SelectionLimits {
            max_colours: 2,
            ..SelectionLimits::default()
        };
        let mut sel = Selection::none();
        assert!(sel.select(Rect::new(0, 0, 2, 1), &buf, &limits).is_ok());
        assert!(matches!(
            sel.select(Rect::new(0, 0, 4, 1), &buf, &limits),
            Err(EditError::TooManyColours { max: 2 })
        ));
        assert_eq!(sel.rect(), Some(Rect::new(0, 0, 2, 1)));
    }
}
