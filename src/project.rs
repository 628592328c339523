//! Project files: the persisted part of a document, as JSON.
//!
//! History is not saved; a loaded project starts with an empty command log.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::canvas::{Layer, LayerId, LayerStack, PixelBuffer, PixelData};
use crate::document::{Document, Guide, Note};
use crate::error::{EditError, Result};
use crate::export::AnimationSettings;
use crate::types::Swatch;

const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerRecord {
    pub id: u32,
    pub name: String,
    #[serde(default = "default_true")]
    pub visible: bool,
    #[serde(default = "default_opacity")]
    pub opacity: f32,
    pub pixels: PixelData,
}

fn default_true() -> bool {
    true
}

fn default_opacity() -> f32 {
    1.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectFile {
    pub version: u32,
    pub width: u32,
    pub height: u32,
    pub layers: Vec<LayerRecord>,
    #[serde(default)]
    pub guides: Vec<Guide>,
    #[serde(default)]
    pub swatches: Vec<Swatch>,
    #[serde(default)]
    pub notes: Vec<Note>,
    #[serde(default)]
    pub animation: Option<AnimationSettings>,
}

impl ProjectFile {
    pub fn from_document(doc: &Document) -> Self {
        Self {
            version: FORMAT_VERSION,
            width: doc.width(),
            height: doc.height(),
            layers: doc
                .layers
                .iter()
                .map(|l| LayerRecord {
                    id: l.id.0,
                    name: l.name.clone(),
                    visible: l.visible,
                    opacity: l.opacity(),
                    pixels: l.buffer.data().clone(),
                })
                .collect(),
            guides: doc.guides().to_vec(),
            swatches: doc.swatches.clone(),
            notes: doc.notes().to_vec(),
            animation: doc.animation.clone(),
        }
    }

    /// Rebuild a document, validating every layer against the canvas size.
    pub fn into_document(self) -> Result<Document> {
        if self.version > FORMAT_VERSION {
            return Err(EditError::InvalidDimensions {
                message: format!(
                    "project format {} is newer than supported ({})",
                    self.version, FORMAT_VERSION
                ),
            });
        }

        let (width, height) = (self.width, self.height);
        let layers = self
            .layers
            .into_iter()
            .map(|record| {
                let buffer = match record.pixels {
                    PixelData::Rgba(colours) => PixelBuffer::from_colours(width, height, colours)?,
                    PixelData::Indexed { palette, indices } => {
                        PixelBuffer::indexed(width, height, palette, indices)?
                    }
                };
                let mut layer = Layer::new(LayerId(record.id), record.name, buffer);
                layer.visible = record.visible;
                layer.set_opacity(record.opacity);
                Ok(layer)
            })
            .collect::<Result<Vec<_>>>()?;

        let mut ids: Vec<u32> = layers.iter().map(|l| l.id.0).collect();
        ids.sort_unstable();
        if ids.windows(2).any(|w| w[0] == w[1]) {
            return Err(EditError::InvalidDimensions {
                message: "duplicate layer ids".to_string(),
            });
        }

        let mut doc = Document::from_stack(LayerStack::from_layers(layers)?);
        doc.swatches = self.swatches;
        doc.animation = self.animation;
        for note in self.notes {
            doc.check_unique_note(&note)?;
            doc.insert_note(doc.notes().len(), note);
        }
        for guide in self.guides {
            doc.insert_guide(doc.guides().len(), guide);
        }
        Ok(doc)
    }
}

/// Write `doc` to `path` as pretty-printed JSON.
pub fn save(doc: &Document, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(&ProjectFile::from_document(doc)).map_err(|e| {
        EditError::Encode {
            message: format!("Failed to serialize project: {}", e),
        }
    })?;
    fs::write(path, json).map_err(|e| EditError::Io {
        path: path.to_path_buf(),
        message: format!("Failed to write project: {}", e),
    })?;
    tracing::info!(path = %path.display(), layers = doc.layers.len(), "saved project");
    Ok(())
}

/// Read a project file. Any problem with the file is a validation error.
pub fn load(path: &Path) -> Result<Document> {
    let invalid = |message: String, help: Option<&str>| EditError::Validation {
        path: path.to_path_buf(),
        message,
        help: help.map(str::to_string),
    };

    let content = fs::read_to_string(path).map_err(|e| invalid(e.to_string(), None))?;
    let file: ProjectFile = serde_json::from_str(&content)
        .map_err(|e| invalid(e.to_string(), Some("Expected a pxedit JSON project")))?;
    let doc = file
        .into_document()
        .map_err(|e| invalid(e.to_string(), None))?;

    tracing::info!(path = %path.display(), layers = doc.layers.len(), "loaded project");
    Ok(doc)
}
