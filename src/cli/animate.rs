use std::path::PathBuf;

use clap::Args;

use crate::document::Document;
use crate::error::Result;
use crate::export::{export_animation, read_png, AnimationSettings, GifFrameEncoder};
use crate::output::{display_path, plural, Printer};

use super::{parse_dimensions, parse_point};

/// Export frames of a sprite sheet as an animated GIF
#[derive(Args, Debug)]
pub struct AnimateArgs {
    /// Sprite sheet image
    #[arg(required = true)]
    pub file: PathBuf,

    /// Frame size as WxH
    #[arg(long)]
    pub frame: String,

    /// Number of frames
    #[arg(long)]
    pub count: u32,

    /// Top-left corner of the first frame as X,Y
    #[arg(long, default_value = "0,0")]
    pub origin: String,

    /// Output size of each frame as WxH (default: frame size)
    #[arg(long)]
    pub size: Option<String>,

    /// Frames per second
    #[arg(long, default_value_t = 10)]
    pub fps: u32,

    /// Play the frames in reverse order
    #[arg(long)]
    pub reverse: bool,

    /// Output GIF path
    #[arg(short, long)]
    pub output: PathBuf,
}

pub fn run(args: AnimateArgs, printer: &Printer) -> Result<()> {
    let (frame_width, frame_height) = parse_dimensions(&args.frame)?;
    let (origin_x, origin_y) = parse_point(&args.origin)?;
    let (target_width, target_height) = match &args.size {
        Some(size) => parse_dimensions(size)?,
        None => (frame_width, frame_height),
    };

    let mut doc = Document::from_buffer(read_png(&args.file)?);
    doc.animation = Some(AnimationSettings {
        origin_x,
        origin_y,
        frame_width,
        frame_height,
        frame_count: args.count,
        target_width,
        target_height,
        fps: args.fps,
        reverse: args.reverse,
    });

    printer.status(
        "Animating",
        &format!(
            "{} ({} of {}x{})",
            display_path(&args.file),
            plural(args.count as usize, "frame", "frames"),
            frame_width,
            frame_height
        ),
    );
    let frames = export_animation(&doc, &args.output, &mut GifFrameEncoder::default())?;
    printer.success(
        "Exported",
        &format!(
            "{} to {} at {} fps",
            plural(frames, "frame", "frames"),
            printer.cyan(&display_path(&args.output)),
            args.fps
        ),
    );

    Ok(())
}
