//! An editing session: one document with its history, selection and tools.
//!
//! Every intent a front end can issue is a method here. Mutating intents
//! either return the region that changed or a typed error, in which case
//! nothing changed.

use std::path::Path;
use std::sync::Arc;

use crate::canvas::{Anchor, Layer, LayerId, LayerProps, PixelBuffer};
use crate::config::EditorConfig;
use crate::document::{Document, Guide, Note};
use crate::error::{EditError, Result};
use crate::export::{self, AnimationSettings, GifFrameEncoder};
use crate::fill::{self, FillMode, FillSource};
use crate::history::{CanvasSnapshot, Command, CommandLog, DirtyRegion};
use crate::tools::{transform, Selection, Tool, ToolController, ToolOutcome, Transform};
use crate::types::{Colour, Point, Rect};

pub struct Session {
    document: Document,
    history: CommandLog,
    selection: Selection,
    controller: ToolController,
    config: EditorConfig,
}

impl Session {
    pub fn new(document: Document, config: EditorConfig) -> Self {
        Self {
            document,
            history: CommandLog::with_limit(config.history_depth),
            selection: Selection::none(),
            controller: ToolController::new(config.brush, config.fill_tolerance, config.seed),
            config,
        }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn history(&self) -> &CommandLog {
        &self.history
    }

    pub fn selection(&self) -> Option<Rect> {
        self.selection.rect()
    }

    pub fn controller(&self) -> &ToolController {
        &self.controller
    }

    /// Tool settings (brush, colours, tolerance, swatch).
    pub fn controller_mut(&mut self) -> &mut ToolController {
        &mut self.controller
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Start over with `document`. History and selection are dropped.
    pub fn replace_document(&mut self, document: Document) {
        self.document = document;
        self.history.clear();
        self.selection.clear();
        self.controller.cancel();
    }

    pub fn is_dirty(&self) -> bool {
        self.history.is_dirty()
    }

    /// Save to a project file and mark the current state clean.
    pub fn save(&mut self, path: &Path) -> Result<()> {
        crate::project::save(&self.document, path)?;
        self.history.mark_saved();
        Ok(())
    }

    // Tools and gestures.

    /// Switch tools, dropping any gesture in progress and the selection.
    pub fn set_tool(&mut self, tool: Tool) {
        self.controller.set_tool(tool);
        self.selection.clear();
    }

    pub fn begin_stroke(&mut self, at: Point) -> Result<DirtyRegion> {
        let outcome = self
            .controller
            .begin(&self.document, self.selection.rect(), at)?;
        self.handle(outcome)
    }

    pub fn move_stroke(&mut self, at: Point) -> Result<DirtyRegion> {
        let outcome = self.controller.drag(&self.document, at)?;
        self.handle(outcome)
    }

    pub fn end_stroke(&mut self, at: Point) -> Result<DirtyRegion> {
        let outcome = self.controller.end(&self.document, at)?;
        self.handle(outcome)
    }

    /// The layer being stroked, with the pending stroke drawn on it.
    pub fn stroke_preview(&self) -> Option<PixelBuffer> {
        self.controller.stroke_preview(&self.document)
    }

    fn handle(&mut self, outcome: ToolOutcome) -> Result<DirtyRegion> {
        match outcome {
            ToolOutcome::Idle | ToolOutcome::Picked(_) => Ok(DirtyRegion::None),
            ToolOutcome::Preview(dirty) => Ok(dirty),
            ToolOutcome::Commit(command) => self.history.apply(&mut self.document, command),
            ToolOutcome::Select(rect) => {
                self.select(rect)?;
                Ok(DirtyRegion::None)
            }
            ToolOutcome::Transform(kind) => self.transform_selection(kind),
        }
    }

    /// Fill from `seed` on the current layer, inside the selection if any.
    pub fn fill(&mut self, seed: Point, mode: FillMode, source: FillSource) -> Result<DirtyRegion> {
        let layer = self.document.layers.current();
        let tolerance = self.controller.tolerance;
        let selection = self.selection.rect();
        let edit = fill::plan(
            &layer.buffer,
            layer.id,
            seed,
            mode,
            &source,
            tolerance,
            selection,
            self.controller.rng(),
        )?;
        if edit.is_empty() {
            return Ok(DirtyRegion::None);
        }
        let label = match source {
            FillSource::Colour(_) => "Fill",
            FillSource::Swatch { .. } => "Textured fill",
        };
        self.commit(label, Command::Pixels {
            label: label.to_string(),
            edit,
        })
    }

    fn commit(&mut self, label: &str, command: Command) -> Result<DirtyRegion> {
        let dirty = self.history.apply(&mut self.document, command)?;
        tracing::debug!(label, "committed");
        Ok(dirty)
    }

    // Selection.

    /// Select `rect`, clipped to the canvas. Fails if the request breaks the
    /// configured limits, keeping the previous selection.
    pub fn select(&mut self, rect: Rect) -> Result<Option<Rect>> {
        let buffer = &self.document.layers.current().buffer;
        self.selection.select(rect, buffer, &self.config.selection)
    }

    pub fn select_all(&mut self) -> Result<Option<Rect>> {
        let (w, h) = self.document.size();
        self.select(Rect::canvas(w, h))
    }

    pub fn deselect(&mut self) {
        self.selection.clear();
    }

    /// Transform the selected pixels of the current layer (or the whole
    /// layer with no selection). Crop needs a selection.
    pub fn transform_selection(&mut self, kind: Transform) -> Result<DirtyRegion> {
        let (w, h) = self.document.size();

        if kind == Transform::Crop {
            let rect = self.selection.rect().ok_or_else(|| EditError::InvalidDimensions {
                message: "crop needs an active selection".to_string(),
            })?;
            let dirty = self.crop(rect)?;
            return Ok(dirty);
        }

        let area = self.selection.rect().unwrap_or(Rect::canvas(w, h));
        let layer = self.document.layers.current();
        let (edit, target) = transform::apply_to_area(&layer.buffer, layer.id, area, kind)?;

        let dirty = if edit.is_empty() {
            DirtyRegion::None
        } else {
            self.history.apply(
                &mut self.document,
                Command::Pixels {
                    label: kind.label().to_string(),
                    edit,
                },
            )?
        };
        if self.selection.is_active() {
            self.selection.replace(Some(target), w, h);
        }
        Ok(dirty)
    }

    /// Shift the contents of every visible layer as one undo step.
    pub fn move_visible_layers(&mut self, dx: i32, dy: i32) -> Result<DirtyRegion> {
        let canvas = Rect::canvas(self.document.width(), self.document.height());
        let kind = Transform::Move { dx, dy };
        let mut steps = Vec::new();
        for layer in self.document.layers.iter().filter(|l| l.visible) {
            let (edit, _) = transform::apply_to_area(&layer.buffer, layer.id, canvas, kind)?;
            if !edit.is_empty() {
                steps.push(Command::Pixels {
                    label: format!("Move {}", layer.name),
                    edit,
                });
            }
        }
        if steps.is_empty() {
            return Ok(DirtyRegion::None);
        }
        self.commit(
            "Move visible layers",
            Command::Macro {
                label: "Move visible layers".to_string(),
                steps,
            },
        )
    }

    // Canvas geometry.

    pub fn resize_canvas(&mut self, width: u32, height: u32, anchor: Anchor) -> Result<DirtyRegion> {
        let command = Command::ResizeCanvas {
            width,
            height,
            anchor,
            before: CanvasSnapshot::capture(&self.document),
        };
        let dirty = self.history.apply(&mut self.document, command)?;
        self.selection.clear();
        Ok(dirty)
    }

    pub fn resize_image(&mut self, width: u32, height: u32, smooth: bool) -> Result<DirtyRegion> {
        let command = Command::ResizeImage {
            width,
            height,
            smooth,
            before: CanvasSnapshot::capture(&self.document),
        };
        let dirty = self.history.apply(&mut self.document, command)?;
        self.selection.clear();
        Ok(dirty)
    }

    /// Crop every layer to `rect`, which must lie inside the canvas.
    pub fn crop(&mut self, rect: Rect) -> Result<DirtyRegion> {
        let command = Command::Crop {
            rect,
            before: CanvasSnapshot::capture(&self.document),
        };
        let dirty = self.history.apply(&mut self.document, command)?;
        self.selection.clear();
        Ok(dirty)
    }

    // Layers.

    /// Add an empty layer above the current one.
    pub fn add_layer(&mut self, name: impl Into<String>) -> Result<LayerId> {
        let (w, h) = self.document.size();
        let id = self.document.layers.next_id();
        let layer = Layer::new(id, name, PixelBuffer::new(w, h)?);
        let previous_current = self.document.layers.current_index();
        self.history.apply(
            &mut self.document,
            Command::AddLayer {
                index: previous_current + 1,
                layer,
                previous_current,
            },
        )?;
        Ok(id)
    }

    /// Copy a layer, placing the copy directly above it.
    pub fn duplicate_layer(&mut self, source: LayerId) -> Result<LayerId> {
        let original = self.document.layers.get(source)?;
        let index = self
            .document
            .layers
            .index_of(source)
            .ok_or(EditError::UnknownLayer { id: source.0 })?;
        let id = self.document.layers.next_id();
        let mut layer = original.clone();
        layer.id = id;
        layer.name = format!("{} copy", original.name);
        let previous_current = self.document.layers.current_index();
        self.history.apply(
            &mut self.document,
            Command::AddLayer {
                index: index + 1,
                layer,
                previous_current,
            },
        )?;
        Ok(id)
    }

    pub fn remove_layer(&mut self, id: LayerId) -> Result<DirtyRegion> {
        let index = self
            .document
            .layers
            .index_of(id)
            .ok_or(EditError::UnknownLayer { id: id.0 })?;
        if self.document.layers.len() == 1 {
            return Err(EditError::LastLayer);
        }
        let layer = self.document.layers.get(id)?.clone();
        let previous_current = self.document.layers.current_index();
        self.history.apply(
            &mut self.document,
            Command::RemoveLayer {
                index,
                layer,
                previous_current,
            },
        )
    }

    pub fn reorder_layer(&mut self, from: usize, to: usize) -> Result<DirtyRegion> {
        if from == to {
            return Ok(DirtyRegion::None);
        }
        let previous_current = self.document.layers.current_index();
        self.history.apply(
            &mut self.document,
            Command::MoveLayer {
                from,
                to,
                previous_current,
            },
        )
    }

    /// Change name, visibility and opacity in one step.
    pub fn set_layer_props(&mut self, id: LayerId, props: LayerProps) -> Result<DirtyRegion> {
        let before = self.document.layers.get(id)?.props();
        if before == props {
            return Ok(DirtyRegion::None);
        }
        self.history.apply(
            &mut self.document,
            Command::SetLayerProps {
                layer: id,
                before,
                after: props,
            },
        )
    }

    pub fn set_layer_visible(&mut self, id: LayerId, visible: bool) -> Result<DirtyRegion> {
        let props = LayerProps {
            visible,
            ..self.document.layers.get(id)?.props()
        };
        self.set_layer_props(id, props)
    }

    pub fn set_layer_opacity(&mut self, id: LayerId, opacity: f32) -> Result<DirtyRegion> {
        let props = LayerProps {
            opacity: if opacity.is_nan() { 1.0 } else { opacity.clamp(0.0, 1.0) },
            ..self.document.layers.get(id)?.props()
        };
        self.set_layer_props(id, props)
    }

    pub fn rename_layer(&mut self, id: LayerId, name: impl Into<String>) -> Result<DirtyRegion> {
        let props = LayerProps {
            name: name.into(),
            ..self.document.layers.get(id)?.props()
        };
        self.set_layer_props(id, props)
    }

    /// Make the layer at `index` the write target. Not an undo step.
    pub fn set_current_layer(&mut self, index: usize) -> Result<()> {
        self.controller.cancel();
        self.document.layers.set_current(index)
    }

    /// Change one palette entry of an indexed layer.
    pub fn remap_palette(&mut self, id: LayerId, index: u8, colour: Colour) -> Result<DirtyRegion> {
        let buffer = &self.document.layers.get(id)?.buffer;
        let palette = buffer
            .palette()
            .ok_or_else(|| EditError::unsupported("palette remap on an RGBA image"))?;
        let before = *palette
            .get(index as usize)
            .ok_or_else(|| EditError::InvalidDimensions {
                message: format!("palette index {} outside a {}-colour palette", index, palette.len()),
            })?;
        self.history.apply(
            &mut self.document,
            Command::RemapPalette {
                layer: id,
                index,
                before,
                after: colour,
            },
        )
    }

    // Notes and guides.

    pub fn add_note(&mut self, position: Point, text: impl Into<String>) -> Result<DirtyRegion> {
        let note = Note {
            position,
            text: text.into(),
        };
        self.document.validate_note(&note)?;
        let index = self.document.notes().len();
        self.history
            .apply(&mut self.document, Command::AddNote { index, note })
    }

    pub fn remove_note(&mut self, index: usize) -> Result<DirtyRegion> {
        let note = self.document.notes().get(index).cloned().ok_or_else(|| {
            EditError::InvalidDimensions {
                message: format!("no note at index {}", index),
            }
        })?;
        self.history
            .apply(&mut self.document, Command::RemoveNote { index, note })
    }

    pub fn add_guide(&mut self, guide: Guide) -> Result<DirtyRegion> {
        let index = self.document.guides().len();
        self.history
            .apply(&mut self.document, Command::AddGuide { index, guide })
    }

    pub fn remove_guide(&mut self, index: usize) -> Result<DirtyRegion> {
        let guide = *self.document.guides().get(index).ok_or_else(|| {
            EditError::InvalidDimensions {
                message: format!("no guide at index {}", index),
            }
        })?;
        self.history
            .apply(&mut self.document, Command::RemoveGuide { index, guide })
    }

    // History.

    /// Undo the last command. `None` when there is nothing to undo.
    pub fn undo(&mut self) -> Option<DirtyRegion> {
        self.controller.cancel();
        let dirty = self.history.undo(&mut self.document)?;
        self.clip_selection();
        Some(dirty)
    }

    /// Redo the next command. `None` when there is nothing to redo.
    pub fn redo(&mut self) -> Option<DirtyRegion> {
        self.controller.cancel();
        let dirty = self.history.redo(&mut self.document)?;
        self.clip_selection();
        Some(dirty)
    }

    fn clip_selection(&mut self) {
        let (w, h) = self.document.size();
        self.selection.replace(self.selection.rect(), w, h);
    }

    // Animation and swatches.

    pub fn set_animation(&mut self, settings: Option<AnimationSettings>) {
        self.document.animation = settings;
    }

    /// Write the configured animation to a GIF at `path`.
    pub fn export_animation(&self, path: &Path) -> Result<usize> {
        export::export_animation(&self.document, path, &mut GifFrameEncoder::default())
    }

    /// Immutable flattened copy for background work such as swatch scans.
    pub fn snapshot(&self) -> Arc<PixelBuffer> {
        Arc::new(self.document.flatten())
    }
}
