//! Pixel buffers, layers and canvas geometry changes.
//!
//! A `LayerStack` owns one `PixelBuffer` per layer. Resizing goes through
//! the functions in [`resize`], which never mutate their input so commands
//! can keep the original buffers for undo.

mod buffer;
mod layer;
pub mod resize;

pub use buffer::{PixelBuffer, PixelData};
pub use layer::{Layer, LayerId, LayerProps, LayerStack};
pub use resize::Anchor;
