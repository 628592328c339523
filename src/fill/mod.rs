//! Flood fills.
//!
//! A fill is planned against a buffer without touching it: the region is
//! found first ([`flood`]), then every pixel in it gets a colour from the
//! [`FillSource`]. The result is a [`PixelEdit`] the command log applies in
//! one step, so a failing fill never writes anything.

pub mod flood;
pub mod textured;

pub use flood::FillMask;
pub use textured::{ChannelJitter, HslJitter};

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::canvas::{LayerId, PixelBuffer};
use crate::error::{EditError, Result};
use crate::history::{EditRecorder, PixelEdit};
use crate::types::{Colour, Point, Rect, Swatch};

/// Which pixels a fill reaches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FillMode {
    /// 4-connected region around the seed.
    #[default]
    Contiguous,
    /// Every pixel of exactly the seed colour; tolerance does not apply.
    Global,
}

/// Where filled pixels get their colour.
#[derive(Debug, Clone, PartialEq)]
pub enum FillSource {
    Colour(Colour),
    /// Weighted random draw per pixel, optionally jittered in HSL.
    Swatch { swatch: Swatch, jitter: HslJitter },
}

impl FillSource {
    fn check(&self) -> Result<()> {
        match self {
            FillSource::Swatch { swatch, .. } if !swatch.is_fillable() => {
                Err(EditError::NoFillableColour {
                    swatch: swatch.name.clone(),
                })
            }
            _ => Ok(()),
        }
    }

    fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Colour> {
        match self {
            FillSource::Colour(c) => Ok(*c),
            FillSource::Swatch { swatch, jitter } => {
                let colour = swatch.pick(rng).ok_or_else(|| EditError::NoFillableColour {
                    swatch: swatch.name.clone(),
                })?;
                Ok(jitter.apply(colour, rng))
            }
        }
    }
}

/// Find the region to fill on `buffer`.
pub fn region(
    buffer: &PixelBuffer,
    seed: Point,
    mode: FillMode,
    tolerance: u8,
    selection: Option<Rect>,
) -> Result<FillMask> {
    let seed = (seed.x, seed.y);
    match mode {
        FillMode::Contiguous => flood::contiguous(buffer, seed, tolerance, selection),
        FillMode::Global => flood::global(buffer, seed, selection),
    }
}

/// Plan a fill on one layer.
///
/// Fails before producing anything if the buffer is indexed, the seed lies
/// off the canvas, or the swatch has no drawable colour. An empty edit means
/// the fill would change nothing.
#[allow(clippy::too_many_arguments)]
pub fn plan<R: Rng + ?Sized>(
    buffer: &PixelBuffer,
    layer: LayerId,
    seed: Point,
    mode: FillMode,
    source: &FillSource,
    tolerance: u8,
    selection: Option<Rect>,
    rng: &mut R,
) -> Result<PixelEdit> {
    buffer.ensure_writable("fill")?;
    buffer.check_bounds(seed.x, seed.y)?;
    source.check()?;

    let mask = region(buffer, seed, mode, tolerance, selection)?;
    let mut recorder = EditRecorder::new(layer);
    for (x, y) in mask.points() {
        recorder.record(x, y, buffer.pixel(x, y), source.draw(rng)?);
    }

    let edit = recorder.finish();
    tracing::debug!(
        layer = %layer,
        ?mode,
        region = mask.count(),
        changed = edit.len(),
        "planned fill"
    );
    Ok(edit)
}
