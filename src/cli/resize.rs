use std::path::PathBuf;

use clap::{Args, ValueEnum};

use crate::canvas::Anchor;
use crate::config::EditorConfig;
use crate::document::Document;
use crate::error::Result;
use crate::export::{read_png, write_png};
use crate::output::{display_path, Printer};
use crate::session::Session;

use super::parse_dimensions;

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeMode {
    /// Pad or crop the canvas, keeping pixels unscaled
    Canvas,
    /// Resample the pixels to the new size
    Image,
}

/// Resize an image's canvas or resample its pixels
#[derive(Args, Debug)]
pub struct ResizeArgs {
    /// Input image
    #[arg(required = true)]
    pub file: PathBuf,

    /// New size as WxH
    #[arg(long)]
    pub size: String,

    #[arg(long, value_enum, default_value_t = ResizeMode::Canvas)]
    pub mode: ResizeMode,

    /// Fixed point for canvas resizes
    #[arg(long, default_value = "top-left")]
    pub anchor: Anchor,

    /// Bilinear resampling for image resizes (default: nearest neighbour)
    #[arg(long)]
    pub smooth: bool,

    /// Output PNG path
    #[arg(short, long)]
    pub output: PathBuf,
}

pub fn run(args: ResizeArgs, config: &EditorConfig, printer: &Printer) -> Result<()> {
    let (width, height) = parse_dimensions(&args.size)?;
    let image = read_png(&args.file)?;
    let (old_w, old_h) = image.size();

    let mut session = Session::new(Document::from_buffer(image), config.clone());
    match args.mode {
        ResizeMode::Canvas => session.resize_canvas(width, height, args.anchor)?,
        ResizeMode::Image => session.resize_image(width, height, args.smooth)?,
    };

    write_png(&session.document().flatten(), &args.output, 1)?;
    printer.success(
        "Resized",
        &format!(
            "{} {}x{} -> {}x{} ({})",
            display_path(&args.file),
            old_w,
            old_h,
            width,
            height,
            printer.cyan(&display_path(&args.output))
        ),
    );

    Ok(())
}
