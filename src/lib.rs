//! pxedit - layered pixel-art editing engine
//!
//! A document holds a stack of pixel layers plus swatches, notes, guides and
//! animation settings. Every edit is a reversible [`Command`] applied through
//! a [`CommandLog`], so undo and redo always restore exact pixels. A
//! [`Session`] ties the document, history, selection and active tool together.

pub mod canvas;
pub mod cli;
pub mod config;
pub mod document;
pub mod error;
pub mod export;
pub mod fill;
pub mod history;
pub mod output;
pub mod project;
pub mod session;
pub mod swatch;
pub mod tools;
pub mod types;

pub use canvas::{Anchor, Layer, LayerId, LayerProps, LayerStack, PixelBuffer, PixelData};
pub use config::EditorConfig;
pub use document::{Document, Guide, GuideAxis, Note};
pub use error::{EditError, Result};
pub use export::{export_animation, AnimationSettings, FrameEncoder, GifFrameEncoder};
pub use fill::{FillMode, FillSource};
pub use history::{Command, CommandLog, DirtyRegion, PixelEdit};
pub use session::Session;
pub use swatch::{AutoSwatchWorker, ScanLimits};
pub use tools::{Brush, BrushShape, Selection, SelectionLimits, Tool, ToolController, ToolOutcome, Transform};
pub use types::{Colour, Point, Rect, Swatch};
