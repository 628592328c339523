//! Writing documents out: animated GIFs from sprite sheets and flat PNGs.

pub mod animation;
mod gif;
mod png;

pub use animation::{export_animation, AnimationSettings, FrameEncoder};
pub use gif::GifFrameEncoder;
pub use png::{read_png, write_png};
