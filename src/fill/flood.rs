//! Fill region detection.

use crate::canvas::PixelBuffer;
use crate::error::Result;
use crate::types::Rect;

/// Pixels selected for filling, with their bounding box.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FillMask {
    width: u32,
    height: u32,
    bits: Vec<bool>,
    bounds: Option<Rect>,
}

impl FillMask {
    fn empty(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            bits: vec![false; width as usize * height as usize],
            bounds: None,
        }
    }

    fn mark(&mut self, x: u32, y: u32) {
        self.bits[y as usize * self.width as usize + x as usize] = true;
        let point = Rect::new(x as i32, y as i32, 1, 1);
        self.bounds = Some(match self.bounds {
            Some(b) => b.union(&point),
            None => point,
        });
    }

    pub fn contains(&self, x: u32, y: u32) -> bool {
        x < self.width && y < self.height && self.bits[y as usize * self.width as usize + x as usize]
    }

    pub fn bounds(&self) -> Option<Rect> {
        self.bounds
    }

    pub fn is_empty(&self) -> bool {
        self.bounds.is_none()
    }

    pub fn count(&self) -> usize {
        self.bits.iter().filter(|&&b| b).count()
    }

    /// Selected positions, row by row.
    pub fn points(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        let w = self.width as usize;
        self.bits
            .iter()
            .enumerate()
            .filter(|&(_, &b)| b)
            .map(move |(i, _)| ((i % w) as u32, (i / w) as u32))
    }
}

/// Matching area for a fill, clipped to the buffer.
fn fill_area(buffer: &PixelBuffer, limit: Option<Rect>) -> Option<Rect> {
    let canvas = buffer.bounds();
    match limit {
        Some(rect) => rect.intersect(&canvas),
        None => Some(canvas),
    }
}

/// 4-connected region around `seed` whose colours lie within `tolerance` of
/// the seed colour. `limit` (usually the selection) bounds the search; a seed
/// outside it yields an empty mask.
pub fn contiguous(
    buffer: &PixelBuffer,
    seed: (i32, i32),
    tolerance: u8,
    limit: Option<Rect>,
) -> Result<FillMask> {
    let target = buffer.get(seed.0, seed.1)?;
    let (w, h) = buffer.size();
    let mut mask = FillMask::empty(w, h);

    let Some(area) = fill_area(buffer, limit) else {
        return Ok(mask);
    };
    if !area.contains(seed.0, seed.1) {
        return Ok(mask);
    }

    let matches = |x: u32, y: u32| {
        area.contains(x as i32, y as i32) && buffer.pixel(x, y).distance(target) <= tolerance
    };

    let wu = w as usize;
    let mut visited = vec![false; wu * h as usize];
    let mut stack: Vec<usize> = Vec::with_capacity(4096);
    let seed_idx = seed.1 as usize * wu + seed.0 as usize;
    visited[seed_idx] = true;
    stack.push(seed_idx);

    while let Some(idx) = stack.pop() {
        let x = (idx % wu) as u32;
        let y = (idx / wu) as u32;
        mask.mark(x, y);

        let neighbours = [
            (x > 0).then(|| (x - 1, y)),
            (x + 1 < w).then(|| (x + 1, y)),
            (y > 0).then(|| (x, y - 1)),
            (y + 1 < h).then(|| (x, y + 1)),
        ];
        for (nx, ny) in neighbours.into_iter().flatten() {
            let ni = ny as usize * wu + nx as usize;
            if !visited[ni] && matches(nx, ny) {
                visited[ni] = true;
                stack.push(ni);
            }
        }
    }

    Ok(mask)
}

/// Every pixel of the seed colour, connected or not. Fully transparent
/// pixels all count as one colour.
pub fn global(buffer: &PixelBuffer, seed: (i32, i32), limit: Option<Rect>) -> Result<FillMask> {
    let target = buffer.get(seed.0, seed.1)?;
    let (w, h) = buffer.size();
    let mut mask = FillMask::empty(w, h);

    let Some(area) = fill_area(buffer, limit) else {
        return Ok(mask);
    };
    for (x, y) in area.points() {
        let (x, y) = (x as u32, y as u32);
        if buffer.pixel(x, y).distance(target) == 0 {
            mask.mark(x, y);
        }
    }
    Ok(mask)
}
