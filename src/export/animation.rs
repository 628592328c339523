//! Sprite-sheet animation export.
//!
//! Frames are cut from the flattened image as a run of equal rectangles
//! starting at the origin, left to right, wrapping to the next row when the
//! image edge is reached. Each frame is scaled to the target size and the
//! sequence is handed to a [`FrameEncoder`].

use std::io::{BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::canvas::{resize, PixelBuffer};
use crate::document::Document;
use crate::error::{EditError, Result};
use crate::types::Rect;

/// Where the frames are and how to play them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnimationSettings {
    #[serde(default)]
    pub origin_x: u32,
    #[serde(default)]
    pub origin_y: u32,
    pub frame_width: u32,
    pub frame_height: u32,
    pub frame_count: u32,
    pub target_width: u32,
    pub target_height: u32,
    #[serde(default = "default_fps")]
    pub fps: u32,
    #[serde(default)]
    pub reverse: bool,
}

fn default_fps() -> u32 {
    10
}

impl AnimationSettings {
    /// Frames of `frame_width x frame_height` from the top-left corner,
    /// exported at their own size.
    pub fn new(frame_width: u32, frame_height: u32, frame_count: u32) -> Self {
        Self {
            origin_x: 0,
            origin_y: 0,
            frame_width,
            frame_height,
            frame_count,
            target_width: frame_width,
            target_height: frame_height,
            fps: default_fps(),
            reverse: false,
        }
    }

    fn validate(&self) -> Result<()> {
        let zero = [
            ("frame width", self.frame_width),
            ("frame height", self.frame_height),
            ("frame count", self.frame_count),
            ("output width", self.target_width),
            ("output height", self.target_height),
            ("fps", self.fps),
        ];
        if let Some((name, _)) = zero.iter().find(|(_, v)| *v == 0) {
            return Err(EditError::InvalidDimensions {
                message: format!("{} must be at least 1", name),
            });
        }
        Ok(())
    }

    /// Rectangles of every frame in playback order, checked against a
    /// `width x height` image.
    pub fn frame_rects(&self, width: u32, height: u32) -> Result<Vec<Rect>> {
        self.validate()?;
        let (fw, fh) = (self.frame_width as u64, self.frame_height as u64);
        let (mut x, mut y) = (self.origin_x as u64, self.origin_y as u64);

        let mut rects = Vec::with_capacity(self.frame_count as usize);
        for index in 0..self.frame_count {
            if x + fw > width as u64 && x != self.origin_x as u64 {
                x = self.origin_x as u64;
                y += fh;
            }
            if x + fw > width as u64 || y + fh > height as u64 {
                return Err(EditError::InvalidDimensions {
                    message: format!(
                        "frame {} at ({}, {}) runs past the {}x{} image",
                        index + 1,
                        x,
                        y,
                        width,
                        height
                    ),
                });
            }
            rects.push(Rect::new(x as i32, y as i32, self.frame_width, self.frame_height));
            x += fw;
        }

        if self.reverse {
            rects.reverse();
        }
        Ok(rects)
    }

    /// Cut and scale the frames out of `image`.
    pub fn frames(&self, image: &PixelBuffer) -> Result<Vec<PixelBuffer>> {
        let rects = self.frame_rects(image.width(), image.height())?;
        rects
            .into_iter()
            .map(|rect| {
                let frame = image.region(rect)?;
                if frame.size() == (self.target_width, self.target_height) {
                    Ok(frame)
                } else {
                    resize::resize_image(&frame, self.target_width, self.target_height, false)
                }
            })
            .collect()
    }
}

/// Writes a frame sequence in some animated format.
pub trait FrameEncoder {
    /// File extension this encoder produces, without the dot.
    fn extension(&self) -> &'static str;

    fn encode(&mut self, frames: &[PixelBuffer], fps: u32, out: &mut dyn Write) -> Result<()>;
}

/// Export the document's animation to `path`.
///
/// Everything that can be checked up front is checked before any file is
/// created. Frames are encoded into a temporary file next to `path`, which
/// replaces `path` only once encoding succeeds.
pub fn export_animation(
    doc: &Document,
    path: &Path,
    encoder: &mut dyn FrameEncoder,
) -> Result<usize> {
    let settings = doc.animation.as_ref().ok_or(EditError::NotAnimated)?;

    let extension = encoder.extension();
    let matches = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(extension));
    if !matches {
        return Err(EditError::InvalidPath {
            path: path.to_path_buf(),
            extension: extension.to_string(),
        });
    }

    let frames = settings.frames(&doc.flatten())?;

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let open_failed = |message: String| EditError::OpenFailed {
        path: path.to_path_buf(),
        message,
    };
    let mut staged = tempfile::Builder::new()
        .prefix(".pxedit-export-")
        .suffix(".tmp")
        .tempfile_in(dir)
        .map_err(|e| open_failed(e.to_string()))?;

    {
        let mut out = BufWriter::new(staged.as_file_mut());
        encoder.encode(&frames, settings.fps, &mut out)?;
        out.flush().map_err(|e| EditError::Io {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
    }
    staged
        .persist(path)
        .map_err(|e| open_failed(e.error.to_string()))?;

    tracing::info!(
        path = %path.display(),
        frames = frames.len(),
        fps = settings.fps,
        "exported animation"
    );
    Ok(frames.len())
}
