//! Transforms applied to the selected pixels.

use serde::{Deserialize, Serialize};

use crate::canvas::{LayerId, PixelBuffer};
use crate::error::Result;
use crate::history::{EditRecorder, PixelEdit};
use crate::types::{Colour, Rect};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Transform {
    Move { dx: i32, dy: i32 },
    Rotate90Cw,
    Rotate90Ccw,
    FlipHorizontal,
    FlipVertical,
    /// Crop the canvas to the selection.
    Crop,
}

impl Transform {
    pub fn label(&self) -> &'static str {
        match self {
            Transform::Move { .. } => "Move selection",
            Transform::Rotate90Cw => "Rotate 90\u{b0} clockwise",
            Transform::Rotate90Ccw => "Rotate 90\u{b0} counter-clockwise",
            Transform::FlipHorizontal => "Flip horizontal",
            Transform::FlipVertical => "Flip vertical",
            Transform::Crop => "Crop",
        }
    }

    /// Where the pixels of `area` end up.
    pub fn target_area(&self, area: Rect) -> Rect {
        match self {
            Transform::Move { dx, dy } => area.translate(*dx, *dy),
            Transform::Rotate90Cw | Transform::Rotate90Ccw => {
                // Keep the centre, swap the sides.
                let x = (2 * area.x as i64 + area.width as i64 - area.height as i64).div_euclid(2);
                let y = (2 * area.y as i64 + area.height as i64 - area.width as i64).div_euclid(2);
                Rect::new(x as i32, y as i32, area.height, area.width)
            }
            Transform::FlipHorizontal | Transform::FlipVertical | Transform::Crop => area,
        }
    }

    /// Local destination of local source pixel (u, v) inside a `w x h` area.
    fn map(&self, u: u32, v: u32, w: u32, h: u32) -> (u32, u32) {
        match self {
            Transform::Rotate90Cw => (h - 1 - v, u),
            Transform::Rotate90Ccw => (v, w - 1 - u),
            Transform::FlipHorizontal => (w - 1 - u, v),
            Transform::FlipVertical => (u, h - 1 - v),
            Transform::Move { .. } | Transform::Crop => (u, v),
        }
    }
}

/// Lift the pixels of `area` and drop them transformed.
///
/// The source area is cleared to transparent first; destination pixels off
/// the canvas are lost. Returns the edit and the area now holding the
/// pixels, unclipped.
pub fn apply_to_area(
    buffer: &PixelBuffer,
    layer: LayerId,
    area: Rect,
    transform: Transform,
) -> Result<(PixelEdit, Rect)> {
    buffer.ensure_writable(transform.label())?;
    let target = transform.target_area(area);
    let Some(source) = area.clip(buffer.width(), buffer.height()) else {
        return Ok((EditRecorder::new(layer).finish(), target));
    };

    let mut recorder = EditRecorder::new(layer);
    for (x, y) in source.points() {
        let (x, y) = (x as u32, y as u32);
        recorder.record(x, y, buffer.pixel(x, y), Colour::TRANSPARENT);
    }

    for (x, y) in source.points() {
        let colour = buffer.pixel(x as u32, y as u32);
        let u = (x - area.x) as u32;
        let v = (y - area.y) as u32;
        let (tu, tv) = transform.map(u, v, area.width, area.height);
        let tx = target.x as i64 + tu as i64;
        let ty = target.y as i64 + tv as i64;
        if tx < 0 || ty < 0 || tx >= buffer.width() as i64 || ty >= buffer.height() as i64 {
            continue;
        }
        let (tx, ty) = (tx as u32, ty as u32);
        recorder.record(tx, ty, buffer.pixel(tx, ty), colour);
    }

    Ok((recorder.finish(), target))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 4x4 canvas with a 2x1 strip at (1,1): red then blue.
    fn strip() -> PixelBuffer {
        let mut buf = PixelBuffer::new(4, 4).unwrap();
        buf.set(1, 1, Colour::RED).unwrap();
        buf.set(2, 1, Colour::BLUE).unwrap();
        buf
    }

    fn after(edit: &PixelEdit, buf: &PixelBuffer, x: u32, y: u32) -> Colour {
        edit.changes()
            .iter()
            .find(|c| c.x == x && c.y == y)
            .map_or(buf.pixel(x, y), |c| c.after)
    }

    #[test]
    fn test_flip_horizontal() {
        let buf = strip();
        let (edit, area) =
            apply_to_area(&buf, LayerId(1), Rect::new(1, 1, 2, 1), Transform::FlipHorizontal)
                .unwrap();
        assert_eq!(area, Rect::new(1, 1, 2, 1));
        assert_eq!(after(&edit, &buf, 1, 1), Colour::BLUE);
        assert_eq!(after(&edit, &buf, 2, 1), Colour::RED);
    }

    #[test]
    fn test_rotate_cw_swaps_sides() {
        let buf = strip();
        let (edit, area) =
            apply_to_area(&buf, LayerId(1), Rect::new(1, 1, 2, 1), Transform::Rotate90Cw).unwrap();
        assert_eq!(area, Rect::new(1, 0, 1, 2));
        // Left end of the strip goes to the top.
        assert_eq!(after(&edit, &buf, 1, 0), Colour::RED);
        assert_eq!(after(&edit, &buf, 1, 1), Colour::BLUE);
        assert_eq!(after(&edit, &buf, 2, 1), Colour::TRANSPARENT);
    }

    #[test]
    fn test_rotate_ccw() {
        let buf = strip();
        let (edit, _) =
            apply_to_area(&buf, LayerId(1), Rect::new(1, 1, 2, 1), Transform::Rotate90Ccw).unwrap();
        assert_eq!(after(&edit, &buf, 1, 0), Colour::BLUE);
        assert_eq!(after(&edit, &buf, 1, 1), Colour::RED);
    }

    #[test]
    fn test_move_clips_at_edge() {
        let buf = strip();
        let (edit, area) = apply_to_area(
            &buf,
            LayerId(1),
            Rect::new(1, 1, 2, 1),
            Transform::Move { dx: 2, dy: 0 },
        )
        .unwrap();
        assert_eq!(area, Rect::new(3, 1, 2, 1));
        assert_eq!(after(&edit, &buf, 3, 1), Colour::RED);
        assert_eq!(after(&edit, &buf, 1, 1), Colour::TRANSPARENT);
        assert_eq!(after(&edit, &buf, 2, 1), Colour::TRANSPARENT);
    }

    #[test]
    fn test_rotate_four_times_is_identity() {
        let mut buf = strip();
        let mut area = Rect::new(0, 0, 3, 3);
        buf.set(0, 0, Colour::GREEN).unwrap();
        let original = buf.clone();
        for _ in 0..4 {
            let (edit, next) = apply_to_area(&buf, LayerId(1), area, Transform::Rotate90Cw).unwrap();
            for c in edit.changes() {
                buf.set(c.x as i32, c.y as i32, c.after).unwrap();
            }
            area = next;
        }
        assert_eq!(buf, original);
    }
}
