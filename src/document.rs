//! The editable document: layers plus the annotations stored with them.

use serde::{Deserialize, Serialize};

use crate::canvas::{LayerStack, PixelBuffer};
use crate::error::{EditError, Result};
use crate::export::AnimationSettings;
use crate::types::{Point, Swatch};

/// A text annotation pinned to a pixel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub position: Point,
    pub text: String,
}

/// Orientation of a guide line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GuideAxis {
    Horizontal,
    Vertical,
}

/// A guide line at a pixel offset from the top or left edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Guide {
    pub axis: GuideAxis,
    pub offset: u32,
}

/// Everything the command log can change.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub layers: LayerStack,
    pub swatches: Vec<Swatch>,
    pub animation: Option<AnimationSettings>,
    notes: Vec<Note>,
    guides: Vec<Guide>,
}

impl Document {
    /// A blank document with one transparent layer.
    pub fn new(width: u32, height: u32) -> Result<Self> {
        Ok(Self::from_stack(LayerStack::new(width, height)?))
    }

    /// A document whose single layer is `buffer`.
    pub fn from_buffer(buffer: PixelBuffer) -> Self {
        Self::from_stack(LayerStack::with_base(buffer))
    }

    pub fn from_stack(layers: LayerStack) -> Self {
        Self {
            layers,
            swatches: Vec::new(),
            animation: None,
            notes: Vec::new(),
            guides: Vec::new(),
        }
    }

    pub fn width(&self) -> u32 {
        self.layers.width()
    }

    pub fn height(&self) -> u32 {
        self.layers.height()
    }

    pub fn size(&self) -> (u32, u32) {
        self.layers.size()
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn guides(&self) -> &[Guide] {
        &self.guides
    }

    /// Composite of all visible layers.
    pub fn flatten(&self) -> PixelBuffer {
        self.layers.flatten()
    }

    /// Check that a note could be added without changing anything.
    pub fn validate_note(&self, note: &Note) -> Result<()> {
        let Point { x, y } = note.position;
        let (width, height) = self.size();
        if x < 0 || y < 0 || x as u32 >= width || y as u32 >= height {
            return Err(EditError::OutOfBounds {
                x: x as i64,
                y: y as i64,
                width,
                height,
            });
        }
        self.check_unique_note(note)
    }

    /// Reject a note equal to one already attached. Unlike `validate_note`
    /// this accepts positions outside the canvas, which crops leave behind.
    pub fn check_unique_note(&self, note: &Note) -> Result<()> {
        if self.notes.iter().any(|n| n == note) {
            return Err(EditError::DuplicateNote {
                x: note.position.x.max(0) as u32,
                y: note.position.y.max(0) as u32,
                text: note.text.clone(),
            });
        }
        Ok(())
    }

    pub(crate) fn insert_note(&mut self, index: usize, note: Note) {
        let index = index.min(self.notes.len());
        self.notes.insert(index, note);
    }

    pub(crate) fn remove_note(&mut self, index: usize) -> Option<Note> {
        (index < self.notes.len()).then(|| self.notes.remove(index))
    }

    pub(crate) fn insert_guide(&mut self, index: usize, guide: Guide) {
        let index = index.min(self.guides.len());
        self.guides.insert(index, guide);
    }

    pub(crate) fn remove_guide(&mut self, index: usize) -> Option<Guide> {
        (index < self.guides.len()).then(|| self.guides.remove(index))
    }
}
