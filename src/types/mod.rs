//! Core value types for pxedit.
//!
//! - `Colour` - RGBA colour values with compositing and HSL helpers
//! - `Point` / `Rect` - canvas-space geometry
//! - `Swatch` - weighted colour sets for the fill tools

mod colour;
mod rect;
mod swatch;

pub use colour::Colour;
pub use rect::{Point, Rect};
pub use swatch::{Swatch, SwatchEntry};
