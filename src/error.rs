use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

/// Main error type for editing operations.
///
/// Every variant is recoverable: the operation that produced it has already
/// been rolled back by the time the caller sees it.
#[derive(Error, Diagnostic, Debug)]
pub enum EditError {
    #[error("Position ({x}, {y}) is outside the {width}x{height} canvas")]
    #[diagnostic(code(pxedit::out_of_bounds))]
    OutOfBounds {
        x: i64,
        y: i64,
        width: u32,
        height: u32,
    },

    #[error("Indexed images are read-only: {operation} is not supported")]
    #[diagnostic(
        code(pxedit::unsupported_format),
        help("Convert the layer to RGBA or remap its palette instead")
    )]
    UnsupportedFormat { operation: String },

    #[error("Selection of {pixels} pixels exceeds the limit of {max}")]
    #[diagnostic(code(pxedit::selection_too_large))]
    SelectionTooLarge { pixels: u64, max: u64 },

    #[error("Selection encloses more than {max} colours")]
    #[diagnostic(code(pxedit::too_many_colours))]
    TooManyColours { max: usize },

    #[error("Swatch '{swatch}' has no colour with a non-zero probability")]
    #[diagnostic(
        code(pxedit::no_fillable_colour),
        help("Give at least one swatch colour a weight above zero")
    )]
    NoFillableColour { swatch: String },

    #[error("A note with the text '{text}' already exists at ({x}, {y})")]
    #[diagnostic(code(pxedit::duplicate_note))]
    DuplicateNote { x: u32, y: u32, text: String },

    #[error("No image to scan")]
    #[diagnostic(code(pxedit::null_image))]
    NullImage,

    #[error("Image of {width}x{height} exceeds the maximum dimension of {max}")]
    #[diagnostic(code(pxedit::image_too_large))]
    ImageTooLarge { width: u32, height: u32, max: u32 },

    #[error("Image has more than {max} unique colours")]
    #[diagnostic(code(pxedit::too_many_unique_colours))]
    TooManyUniqueColours { max: usize },

    #[error("Project has no animation configured")]
    #[diagnostic(
        code(pxedit::not_animated),
        help("Configure frame origin, size and count before exporting")
    )]
    NotAnimated,

    #[error("Invalid dimensions: {message}")]
    #[diagnostic(code(pxedit::invalid_dimensions))]
    InvalidDimensions { message: String },

    #[error("Invalid path {path}: expected a .{extension} file")]
    #[diagnostic(code(pxedit::invalid_path))]
    InvalidPath { path: PathBuf, extension: String },

    #[error("Failed to open {path} for writing: {message}")]
    #[diagnostic(code(pxedit::open_failed))]
    OpenFailed { path: PathBuf, message: String },

    #[error("Invalid input {path}: {message}")]
    #[diagnostic(code(pxedit::validation))]
    Validation {
        path: PathBuf,
        message: String,
        #[help]
        help: Option<String>,
    },

    #[error("Layer {id} does not exist")]
    #[diagnostic(code(pxedit::unknown_layer))]
    UnknownLayer { id: u32 },

    #[error("Cannot remove the only layer")]
    #[diagnostic(code(pxedit::last_layer), help("Add another layer first"))]
    LastLayer,

    #[error("Parse error: {message}")]
    #[diagnostic(code(pxedit::parse))]
    Parse {
        message: String,
        #[help]
        help: Option<String>,
    },

    #[error("IO error with {path}: {message}")]
    #[diagnostic(code(pxedit::io))]
    Io { path: PathBuf, message: String },

    #[error("Encoding failed: {message}")]
    #[diagnostic(code(pxedit::encode))]
    Encode { message: String },
}

impl EditError {
    /// Stable key the UI layer uses to look up a translated message.
    pub fn message_key(&self) -> &'static str {
        match self {
            EditError::OutOfBounds { .. } => "error.out_of_bounds",
            EditError::UnsupportedFormat { .. } => "error.unsupported_format",
            EditError::SelectionTooLarge { .. } => "error.selection_too_large",
            EditError::TooManyColours { .. } => "error.too_many_colours",
            EditError::NoFillableColour { .. } => "error.no_fillable_colour",
            EditError::DuplicateNote { .. } => "error.duplicate_note",
            EditError::NullImage => "error.null_image",
            EditError::ImageTooLarge { .. } => "error.image_too_large",
            EditError::TooManyUniqueColours { .. } => "error.too_many_unique_colours",
            EditError::NotAnimated => "error.not_animated",
            EditError::InvalidDimensions { .. } => "error.invalid_dimensions",
            EditError::InvalidPath { .. } => "error.invalid_path",
            EditError::OpenFailed { .. } => "error.open_failed",
            EditError::Validation { .. } => "error.validation",
            EditError::UnknownLayer { .. } => "error.unknown_layer",
            EditError::LastLayer => "error.last_layer",
            EditError::Parse { .. } => "error.parse",
            EditError::Io { .. } => "error.io",
            EditError::Encode { .. } => "error.encode",
        }
    }

    /// Substitution values for the `%1`, `%2`, ... placeholders of the
    /// message named by [`message_key`](Self::message_key).
    pub fn params(&self) -> Vec<String> {
        match self {
            EditError::OutOfBounds { x, y, width, height } => vec![
                format!("{}, {}", x, y),
                format!("{}x{}", width, height),
            ],
            EditError::UnsupportedFormat { operation } => vec![operation.clone()],
            EditError::SelectionTooLarge { pixels, max } => {
                vec![pixels.to_string(), max.to_string()]
            }
            EditError::TooManyColours { max } => vec![max.to_string()],
            EditError::NoFillableColour { swatch } => vec![swatch.clone()],
            EditError::DuplicateNote { x, y, text } => {
                vec![text.clone(), format!("{}, {}", x, y)]
            }
            EditError::NullImage | EditError::NotAnimated | EditError::LastLayer => vec![],
            EditError::UnknownLayer { id } => vec![id.to_string()],
            EditError::ImageTooLarge { width, height, max } => {
                vec![format!("{}x{}", width, height), max.to_string()]
            }
            EditError::TooManyUniqueColours { max } => vec![max.to_string()],
            EditError::InvalidDimensions { message } => vec![message.clone()],
            EditError::InvalidPath { path, extension } => {
                vec![path.display().to_string(), extension.clone()]
            }
            EditError::OpenFailed { path, message } | EditError::Io { path, message } => {
                vec![path.display().to_string(), message.clone()]
            }
            EditError::Validation { path, message, .. } => {
                vec![path.display().to_string(), message.clone()]
            }
            EditError::Parse { message, .. } | EditError::Encode { message } => {
                vec![message.clone()]
            }
        }
    }

    pub(crate) fn unsupported(operation: impl Into<String>) -> Self {
        EditError::UnsupportedFormat {
            operation: operation.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, EditError>;
