//! Brush footprints and stroke interpolation.

use serde::{Deserialize, Serialize};

use crate::types::{Point, Rect};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrushShape {
    #[default]
    Square,
    Circle,
}

/// Shape and thickness of the pen and eraser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Brush {
    pub shape: BrushShape,
    /// Diameter in pixels, at least 1.
    pub size: u32,
}

impl Default for Brush {
    fn default() -> Self {
        Self {
            shape: BrushShape::Square,
            size: 1,
        }
    }
}

impl Brush {
    pub fn new(shape: BrushShape, size: u32) -> Self {
        Self {
            shape,
            size: size.max(1),
        }
    }

    /// Offsets covered by one dab centred on the origin.
    ///
    /// Even sizes lean towards the top-left, so a 2px brush covers the
    /// centre pixel and the ones above and to its left.
    pub fn footprint(&self) -> Vec<(i32, i32)> {
        let size = self.size.max(1) as i32;
        let half = (size - 1) / 2;
        let lo = -(size - 1 - half);
        let hi = half;

        // Circle test against the dab centre in doubled coordinates so even
        // sizes stay symmetric.
        let centre = lo + hi;
        let r2 = size * size;

        let mut offsets = Vec::with_capacity((size * size) as usize);
        for dy in lo..=hi {
            for dx in lo..=hi {
                let inside = match self.shape {
                    BrushShape::Square => true,
                    BrushShape::Circle => {
                        let (ex, ey) = (2 * dx - centre, 2 * dy - centre);
                        ex * ex + ey * ey <= r2
                    }
                };
                if inside {
                    offsets.push((dx, dy));
                }
            }
        }
        offsets
    }
}

/// A Bresenham line from one point to another, both ends included.
///
/// Step `i` is computed directly rather than by walking, so the stretch of a
/// long segment that passes near an area costs only that stretch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Line {
    from: Point,
    /// Steps along the longer axis.
    major: i64,
    minor: i64,
    step_x: i64,
    step_y: i64,
    x_major: bool,
}

impl Line {
    pub fn new(from: Point, to: Point) -> Self {
        let dx = to.x as i64 - from.x as i64;
        let dy = to.y as i64 - from.y as i64;
        let x_major = dx.abs() >= dy.abs();
        let (major, minor) = if x_major {
            (dx.abs(), dy.abs())
        } else {
            (dy.abs(), dx.abs())
        };
        Self {
            from,
            major,
            minor,
            step_x: if dx < 0 { -1 } else { 1 },
            step_y: if dy < 0 { -1 } else { 1 },
            x_major,
        }
    }

    /// Minor-axis steps taken by the time the line reaches step `i`.
    fn minor_steps(&self, i: i64) -> i64 {
        if self.major == 0 {
            return 0;
        }
        let (i, minor, major) = (i as i128, self.minor as i128, self.major as i128);
        ((2 * i * minor + major) / (2 * major)) as i64
    }

    /// The pixel at step `i`; step 0 is the start.
    pub fn at(&self, i: i64) -> Point {
        let n = self.minor_steps(i);
        let (ox, oy) = if self.x_major { (i, n) } else { (n, i) };
        Point::new(
            (self.from.x as i64 + self.step_x * ox) as i32,
            (self.from.y as i64 + self.step_y * oy) as i32,
        )
    }

    pub fn points(self) -> impl Iterator<Item = Point> {
        (0..=self.major).map(move |i| self.at(i))
    }

    /// The pixels lying inside `area` grown by `margin` on every side, in
    /// line order.
    pub fn points_near(self, area: Rect, margin: u32) -> impl Iterator<Item = Point> {
        let margin = margin as i64;
        let xs = (area.x as i64 - margin, area.right() - 1 + margin);
        let ys = (area.y as i64 - margin, area.bottom() - 1 + margin);
        let (major_bounds, minor_bounds, major_origin, minor_origin, major_step, minor_step) =
            if self.x_major {
                (xs, ys, self.from.x, self.from.y, self.step_x, self.step_y)
            } else {
                (ys, xs, self.from.y, self.from.x, self.step_y, self.step_x)
            };

        let (lo, hi) = span(major_origin as i64, major_step, major_bounds, self.major);
        let (n_lo, n_hi) = span(minor_origin as i64, minor_step, minor_bounds, self.minor);
        let (first, last) = if lo > hi || n_lo > n_hi {
            (1, 0)
        } else {
            let first = first_step(lo, hi + 1, |i| self.minor_steps(i) >= n_lo);
            let end = first_step(first, hi + 1, |i| self.minor_steps(i) > n_hi);
            (first, end - 1)
        };
        (first..=last).map(move |i| self.at(i))
    }
}

/// Steps `0..=limit` whose coordinate `origin + step * i` lies within
/// `bounds`, as an inclusive pair that is reversed when there are none.
fn span(origin: i64, step: i64, (lo, hi): (i64, i64), limit: i64) -> (i64, i64) {
    let (a, b) = if step > 0 {
        (lo - origin, hi - origin)
    } else {
        (origin - hi, origin - lo)
    };
    (a.max(0), b.min(limit))
}

/// First `i` in `start..end` for which `pred` holds, or `end`. `pred` must
/// be false then true along the range.
fn first_step(mut start: i64, mut end: i64, pred: impl Fn(i64) -> bool) -> i64 {
    while start < end {
        let mid = start + (end - start) / 2;
        if pred(mid) {
            end = mid;
        } else {
            start = mid + 1;
        }
    }
    start
}
