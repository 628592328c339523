//! Editing tools.
//!
//! - [`Tool`] - the closed set of tools a session can hold
//! - [`ToolController`] - turns pointer gestures into commands
//! - [`Selection`] - the session's rectangular selection and its limits
//! - [`brush`] - brush footprints and stroke interpolation
//! - [`transform`] - pixel transforms on the selected area

pub mod brush;
mod controller;
mod selection;
pub mod transform;

pub use brush::{Brush, BrushShape};
pub use controller::{Gesture, ToolController, ToolOutcome};
pub use selection::{Selection, SelectionLimits};
pub use transform::Transform;

use std::fmt;

use serde::{Deserialize, Serialize};

/// Flood-fill variants offered by the fill tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FillTool {
    #[default]
    Contiguous,
    /// Every matching pixel, ignoring connectivity.
    Global,
    /// Contiguous region painted from the active swatch.
    Textured,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionTool {
    #[default]
    Marquee,
    /// Drag the selected pixels.
    Move,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    #[default]
    Pen,
    Eraser,
    Eyedropper,
    Fill(FillTool),
    Selection(SelectionTool),
    Note,
}

impl Tool {
    /// Tools whose gesture accumulates pixel writes until release.
    pub fn is_stroke(&self) -> bool {
        matches!(self, Tool::Pen | Tool::Eraser)
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tool::Pen => write!(f, "pen"),
            Tool::Eraser => write!(f, "eraser"),
            Tool::Eyedropper => write!(f, "eyedropper"),
            Tool::Fill(FillTool::Contiguous) => write!(f, "fill"),
            Tool::Fill(FillTool::Global) => write!(f, "global fill"),
            Tool::Fill(FillTool::Textured) => write!(f, "textured fill"),
            Tool::Selection(SelectionTool::Marquee) => write!(f, "marquee"),
            Tool::Selection(SelectionTool::Move) => write!(f, "move"),
            Tool::Note => write!(f, "note"),
        }
    }
}
