//! Unique colour extraction.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::{Deserialize, Serialize};

use crate::canvas::PixelBuffer;
use crate::error::{EditError, Result};
use crate::types::Colour;

/// Limits on what the scanner accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanLimits {
    /// Largest accepted width or height.
    pub max_dimension: u32,
    pub max_unique_colours: usize,
}

impl Default for ScanLimits {
    fn default() -> Self {
        Self {
            max_dimension: 8192,
            max_unique_colours: 65536,
        }
    }
}

/// How often (in pixels) the scan checks for cancellation.
const CANCEL_CHECK_INTERVAL: usize = 4096;

/// Unique colours of `image` in first-seen (row-major) order.
///
/// Returns `Ok(None)` if `cancel` was raised mid-scan.
pub fn unique_colours(
    image: Option<&PixelBuffer>,
    limits: &ScanLimits,
    cancel: &AtomicBool,
) -> Result<Option<Vec<Colour>>> {
    let image = image.ok_or(EditError::NullImage)?;
    let (width, height) = image.size();
    if width > limits.max_dimension || height > limits.max_dimension {
        return Err(EditError::ImageTooLarge {
            width,
            height,
            max: limits.max_dimension,
        });
    }

    let mut seen = HashSet::new();
    let mut colours = Vec::new();
    for (i, colour) in image.pixels().enumerate() {
        if i % CANCEL_CHECK_INTERVAL == 0 && cancel.load(Ordering::Relaxed) {
            return Ok(None);
        }
        if seen.insert(colour) {
            if colours.len() == limits.max_unique_colours {
                return Err(EditError::TooManyUniqueColours {
                    max: limits.max_unique_colours,
                });
            }
            colours.push(colour);
        }
    }
    Ok(Some(colours))
}
