//! Auto-swatch: the read-only palette of colours already used in an image.

pub mod scan;
mod worker;

pub use scan::{unique_colours, ScanLimits};
pub use worker::AutoSwatchWorker;
