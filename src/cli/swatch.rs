use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;

use crate::error::{EditError, Result};
use crate::export::read_png;
use crate::output::{display_path, plural, Printer};
use crate::swatch::AutoSwatchWorker;

/// List the unique colours of an image
#[derive(Args, Debug)]
pub struct SwatchArgs {
    /// Image file to scan
    #[arg(required = true)]
    pub file: PathBuf,

    /// Fail if the image has more unique colours than this
    #[arg(long)]
    pub max: Option<usize>,
}

pub fn run(args: SwatchArgs, config: &crate::config::EditorConfig, printer: &Printer) -> Result<()> {
    let path = &args.file;
    let display = display_path(path);
    let image = read_png(path)?;

    let mut limits = config.swatch;
    if let Some(max) = args.max {
        limits.max_unique_colours = max;
    }

    printer.status("Scanning", &format!("{} ({}x{})", display, image.width(), image.height()));
    let mut worker = AutoSwatchWorker::new(limits);
    worker.request(Some(Arc::new(image)))?;
    let colours = worker.wait().ok_or_else(|| EditError::Encode {
        message: "swatch scan ended without a result".to_string(),
    })??;

    printer.success(
        "Found",
        &format!("{} in {}", plural(colours.len(), "colour", "colours"), display),
    );

    // Swatch lines go to stdout
    for (i, colour) in colours.iter().enumerate() {
        println!("$colour-{}: {}", i + 1, colour);
    }

    Ok(())
}
