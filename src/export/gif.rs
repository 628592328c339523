//! Animated GIF output via the `image` crate.

use std::io::Write;

use image::codecs::gif::{GifEncoder, Repeat};
use image::{Delay, Frame};

use crate::canvas::PixelBuffer;
use crate::error::{EditError, Result};

use super::animation::FrameEncoder;

/// Looping GIF encoder.
#[derive(Debug, Clone, Copy)]
pub struct GifFrameEncoder {
    /// Quantizer speed, 1 (best) to 30 (fastest).
    pub speed: i32,
}

impl Default for GifFrameEncoder {
    fn default() -> Self {
        Self { speed: 10 }
    }
}

impl FrameEncoder for GifFrameEncoder {
    fn extension(&self) -> &'static str {
        "gif"
    }

    fn encode(&mut self, frames: &[PixelBuffer], fps: u32, out: &mut dyn Write) -> Result<()> {
        let mut encoder = GifEncoder::new_with_speed(out, self.speed.clamp(1, 30));
        encoder.set_repeat(Repeat::Infinite).map_err(encode_error)?;

        let delay = Delay::from_numer_denom_ms(1000, fps.max(1));
        for frame in frames {
            encoder
                .encode_frame(Frame::from_parts(frame.to_rgba_image(), 0, 0, delay))
                .map_err(encode_error)?;
        }
        Ok(())
    }
}

fn encode_error(e: image::ImageError) -> EditError {
    EditError::Encode {
        message: format!("GIF: {}", e),
    }
}
