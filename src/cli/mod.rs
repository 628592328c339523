pub mod animate;
pub mod completions;
pub mod init;
pub mod resize;
pub mod swatch;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};

use crate::config::EditorConfig;
use crate::error::{EditError, Result};

/// pxedit - layered pixel-art editing engine
#[derive(Parser, Debug)]
#[command(name = "pxedit")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Config file (default: ./pxedit.yaml when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List the unique colours of an image in first-seen order
    Swatch(swatch::SwatchArgs),

    /// Export a sprite-sheet strip as an animated GIF
    Animate(animate::AnimateArgs),

    /// Resize the canvas or resample the image
    Resize(resize::ResizeArgs),

    /// Write a default pxedit.yaml
    Init(init::InitArgs),

    /// Generate shell completions
    Completions(completions::CompletionsArgs),
}

/// Load the config named on the command line, or discover one in the
/// working directory.
pub fn load_config(path: Option<&Path>) -> Result<EditorConfig> {
    match path {
        Some(path) => EditorConfig::load(path),
        None => EditorConfig::discover(Path::new(".")),
    }
}

/// Parse a dimension string like "16x16" into (width, height).
pub(crate) fn parse_dimensions(s: &str) -> Result<(u32, u32)> {
    let parts: Vec<&str> = s.splitn(2, ['x', 'X']).collect();
    if parts.len() != 2 {
        return Err(EditError::Parse {
            message: format!("Invalid dimensions '{}': expected WxH (e.g. 16x16)", s),
            help: Some("Use the format WxH, for example: 16x16, 8x16".to_string()),
        });
    }

    let w: u32 = parts[0].trim().parse().map_err(|_| EditError::Parse {
        message: format!("Invalid width '{}' in dimensions '{}'", parts[0], s),
        help: Some("Width must be a positive integer".to_string()),
    })?;

    let h: u32 = parts[1].trim().parse().map_err(|_| EditError::Parse {
        message: format!("Invalid height '{}' in dimensions '{}'", parts[1], s),
        help: Some("Height must be a positive integer".to_string()),
    })?;

    if w == 0 || h == 0 {
        return Err(EditError::Parse {
            message: format!("Dimensions must be non-zero, got {}x{}", w, h),
            help: Some("Both width and height must be at least 1".to_string()),
        });
    }

    Ok((w, h))
}

/// Parse a position like "8,0" into (x, y).
pub(crate) fn parse_point(s: &str) -> Result<(u32, u32)> {
    let invalid = || EditError::Parse {
        message: format!("Invalid position '{}': expected X,Y (e.g. 0,16)", s),
        help: Some("Both coordinates must be non-negative integers".to_string()),
    };
    let (x, y) = s.split_once(',').ok_or_else(invalid)?;
    let x = x.trim().parse().map_err(|_| invalid())?;
    let y = y.trim().parse().map_err(|_| invalid())?;
    Ok((x, y))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_dimensions() {
        assert_eq!(parse_dimensions("16x16").unwrap(), (16, 16));
        assert_eq!(parse_dimensions("8X24").unwrap(), (8, 24));
    }

    #[test]
    fn test_parse_dimensions_invalid() {
        assert!(parse_dimensions("16").is_err());
        assert!(parse_dimensions("ax4").is_err());
        assert!(parse_dimensions("0x4").is_err());
    }

    #[test]
    fn test_parse_point() {
        assert_eq!(parse_point("3,4").unwrap(), (3, 4));
        assert_eq!(parse_point(" 0 , 16 ").unwrap(), (0, 16));
        assert!(parse_point("3").is_err());
        assert!(parse_point("-1,2").is_err());
    }

    #[test]
    fn test_cli_parses() {
        let cli = Cli::try_parse_from([
            "pxedit", "animate", "walk.png", "--frame", "8x8", "--count", "4", "-o", "walk.gif",
        ])
        .unwrap();
        assert!(matches!(cli.command, Commands::Animate(_)));
    }
}
