//! Invertible commands.
//!
//! A command carries everything it needs to run forward and backward: pixel
//! edits store both colours of every touched pixel, structural edits store
//! their parameters plus a snapshot of what they replace.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::canvas::{resize, Anchor, Layer, LayerId, LayerProps, PixelBuffer};
use crate::document::{Document, Guide, Note};
use crate::error::{EditError, Result};
use crate::types::{Colour, Rect};

/// Area of the document a mutation touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DirtyRegion {
    /// Nothing visible changed.
    #[default]
    None,
    /// Only this rectangle changed.
    Area(Rect),
    /// Redraw everything (size or layer structure changed).
    Canvas,
}

impl DirtyRegion {
    /// Smallest region covering both.
    pub fn merge(self, other: DirtyRegion) -> DirtyRegion {
        match (self, other) {
            (DirtyRegion::Canvas, _) | (_, DirtyRegion::Canvas) => DirtyRegion::Canvas,
            (DirtyRegion::None, r) | (r, DirtyRegion::None) => r,
            (DirtyRegion::Area(a), DirtyRegion::Area(b)) => DirtyRegion::Area(a.union(&b)),
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, DirtyRegion::None)
    }
}

/// One pixel's colour before and after an edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelChange {
    pub x: u32,
    pub y: u32,
    pub before: Colour,
    pub after: Colour,
}

/// A set of pixel changes on one layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelEdit {
    pub layer: LayerId,
    changes: Vec<PixelChange>,
}

impl PixelEdit {
    pub fn layer(&self) -> LayerId {
        self.layer
    }

    pub fn changes(&self) -> &[PixelChange] {
        &self.changes
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Bounding box of all changes.
    pub fn bounds(&self) -> Option<Rect> {
        let first = self.changes.first()?;
        let (mut x0, mut y0, mut x1, mut y1) = (first.x, first.y, first.x, first.y);
        for c in &self.changes {
            x0 = x0.min(c.x);
            y0 = y0.min(c.y);
            x1 = x1.max(c.x);
            y1 = y1.max(c.y);
        }
        Some(Rect::new(x0 as i32, y0 as i32, x1 - x0 + 1, y1 - y0 + 1))
    }

    fn dirty(&self) -> DirtyRegion {
        self.bounds().map_or(DirtyRegion::None, DirtyRegion::Area)
    }

    /// Write `after` (forward) or `before` (backward) colours. Validates every
    /// position first so a failure writes nothing.
    fn write(&self, doc: &mut Document, forward: bool) -> Result<DirtyRegion> {
        let buffer = &mut doc.layers.get_mut(self.layer)?.buffer;
        buffer.ensure_writable("pixel edit")?;
        for c in &self.changes {
            buffer.check_bounds(c.x as i32, c.y as i32)?;
        }
        for c in &self.changes {
            let (expected, colour) = if forward {
                (c.before, c.after)
            } else {
                (c.after, c.before)
            };
            debug_assert_eq!(
                buffer.pixel(c.x, c.y),
                expected,
                "pixel ({}, {}) on layer {} diverged from recorded history",
                c.x,
                c.y,
                self.layer
            );
            buffer.put(c.x, c.y, colour);
        }
        Ok(self.dirty())
    }
}

/// Accumulates pixel writes, keeping the first `before` and the last
/// `after` colour for each position.
#[derive(Debug, Clone)]
pub struct EditRecorder {
    layer: LayerId,
    index: HashMap<(u32, u32), usize>,
    changes: Vec<PixelChange>,
}

impl EditRecorder {
    pub fn new(layer: LayerId) -> Self {
        Self {
            layer,
            index: HashMap::new(),
            changes: Vec::new(),
        }
    }

    pub fn layer(&self) -> LayerId {
        self.layer
    }

    pub fn record(&mut self, x: u32, y: u32, before: Colour, after: Colour) {
        match self.index.get(&(x, y)) {
            Some(&i) => self.changes[i].after = after,
            None => {
                self.index.insert((x, y), self.changes.len());
                self.changes.push(PixelChange {
                    x,
                    y,
                    before,
                    after,
                });
            }
        }
    }

    /// The pending colour at (x, y), if this recorder has touched it.
    pub fn pending(&self, x: u32, y: u32) -> Option<Colour> {
        self.index.get(&(x, y)).map(|&i| self.changes[i].after)
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Iterate pending writes in recording order.
    pub fn changes(&self) -> impl Iterator<Item = &PixelChange> {
        self.changes.iter()
    }

    /// Drop no-op writes and sort row-major.
    pub fn finish(self) -> PixelEdit {
        let mut changes: Vec<PixelChange> = self
            .changes
            .into_iter()
            .filter(|c| c.before != c.after)
            .collect();
        changes.sort_by_key(|c| (c.y, c.x));
        PixelEdit {
            layer: self.layer,
            changes,
        }
    }
}

/// Buffers and size of the whole stack before a geometry change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanvasSnapshot {
    pub width: u32,
    pub height: u32,
    pub buffers: Vec<(LayerId, PixelBuffer)>,
}

impl CanvasSnapshot {
    pub fn capture(doc: &Document) -> Self {
        Self {
            width: doc.width(),
            height: doc.height(),
            buffers: doc
                .layers
                .iter()
                .map(|l| (l.id, l.buffer.clone()))
                .collect(),
        }
    }

    fn restore(&self, doc: &mut Document) -> Result<()> {
        let ids: Vec<LayerId> = doc.layers.iter().map(|l| l.id).collect();
        let snapshot_ids: Vec<LayerId> = self.buffers.iter().map(|(id, _)| *id).collect();
        if ids != snapshot_ids {
            return Err(EditError::InvalidDimensions {
                message: "layer set changed since the snapshot was taken".to_string(),
            });
        }
        doc.layers
            .replace_buffers(self.buffers.iter().map(|(_, b)| b.clone()).collect())
    }
}

/// A reversible document mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Command {
    /// Pixel writes on one layer (strokes, fills, transforms).
    Pixels { label: String, edit: PixelEdit },
    /// Several commands applied and undone as one.
    Macro { label: String, steps: Vec<Command> },
    /// `previous_current` is the write target to restore on undo.
    AddLayer {
        index: usize,
        layer: Layer,
        previous_current: usize,
    },
    RemoveLayer {
        index: usize,
        layer: Layer,
        previous_current: usize,
    },
    MoveLayer {
        from: usize,
        to: usize,
        previous_current: usize,
    },
    SetLayerProps {
        layer: LayerId,
        before: LayerProps,
        after: LayerProps,
    },
    ResizeCanvas {
        width: u32,
        height: u32,
        anchor: Anchor,
        before: CanvasSnapshot,
    },
    ResizeImage {
        width: u32,
        height: u32,
        smooth: bool,
        before: CanvasSnapshot,
    },
    Crop { rect: Rect, before: CanvasSnapshot },
    RemapPalette {
        layer: LayerId,
        index: u8,
        before: Colour,
        after: Colour,
    },
    AddNote { index: usize, note: Note },
    RemoveNote { index: usize, note: Note },
    AddGuide { index: usize, guide: Guide },
    RemoveGuide { index: usize, guide: Guide },
}

impl Command {
    /// Short human-readable description for undo/redo menus.
    pub fn label(&self) -> String {
        match self {
            Command::Pixels { label, .. } | Command::Macro { label, .. } => label.clone(),
            Command::AddLayer { layer, .. } => format!("Add layer '{}'", layer.name),
            Command::RemoveLayer { layer, .. } => format!("Delete layer '{}'", layer.name),
            Command::MoveLayer { .. } => "Reorder layers".to_string(),
            Command::SetLayerProps { after, .. } => format!("Layer properties '{}'", after.name),
            Command::ResizeCanvas { width, height, .. } => {
                format!("Resize canvas to {}x{}", width, height)
            }
            Command::ResizeImage { width, height, .. } => {
                format!("Resize image to {}x{}", width, height)
            }
            Command::Crop { rect, .. } => format!("Crop to {}x{}", rect.width, rect.height),
            Command::RemapPalette { index, .. } => format!("Remap palette entry {}", index),
            Command::AddNote { .. } => "Add note".to_string(),
            Command::RemoveNote { .. } => "Delete note".to_string(),
            Command::AddGuide { .. } => "Add guide".to_string(),
            Command::RemoveGuide { .. } => "Delete guide".to_string(),
        }
    }

    /// Run the forward action. On error the document is unchanged.
    pub fn apply(&self, doc: &mut Document) -> Result<DirtyRegion> {
        match self {
            Command::Pixels { edit, .. } => edit.write(doc, true),

            Command::Macro { steps, .. } => run_steps(doc, steps, true),

            Command::AddLayer { index, layer, .. } => {
                doc.layers.insert(*index, layer.clone())?;
                Ok(DirtyRegion::Canvas)
            }

            Command::RemoveLayer { index, layer, .. } => {
                expect_layer_at(doc, *index, layer.id)?;
                doc.layers.remove(*index)?;
                Ok(DirtyRegion::Canvas)
            }

            Command::MoveLayer { from, to, .. } => {
                doc.layers.reorder(*from, *to)?;
                Ok(DirtyRegion::Canvas)
            }

            Command::SetLayerProps { layer, after, .. } => {
                doc.layers.get_mut(*layer)?.set_props(after);
                Ok(DirtyRegion::Canvas)
            }

            Command::ResizeCanvas {
                width,
                height,
                anchor,
                before,
            } => {
                let buffers = map_buffers(before, |b| resize::resize_canvas(b, *width, *height, *anchor))?;
                before.restore(doc)?;
                doc.layers.replace_buffers(buffers)?;
                Ok(DirtyRegion::Canvas)
            }

            Command::ResizeImage {
                width,
                height,
                smooth,
                before,
            } => {
                let buffers = map_buffers(before, |b| resize::resize_image(b, *width, *height, *smooth))?;
                before.restore(doc)?;
                doc.layers.replace_buffers(buffers)?;
                Ok(DirtyRegion::Canvas)
            }

            Command::Crop { rect, before } => {
                let buffers = map_buffers(before, |b| resize::crop(b, *rect))?;
                before.restore(doc)?;
                doc.layers.replace_buffers(buffers)?;
                Ok(DirtyRegion::Canvas)
            }

            Command::RemapPalette {
                layer, index, after, ..
            } => {
                doc.layers.get_mut(*layer)?.buffer.remap_palette(*index, *after)?;
                Ok(DirtyRegion::Canvas)
            }

            Command::AddNote { index, note } => {
                doc.validate_note(note)?;
                doc.insert_note(*index, note.clone());
                Ok(DirtyRegion::None)
            }

            Command::RemoveNote { index, note } => {
                if doc.notes().get(*index) != Some(note) {
                    return Err(missing("note", *index));
                }
                doc.remove_note(*index);
                Ok(DirtyRegion::None)
            }

            Command::AddGuide { index, guide } => {
                doc.insert_guide(*index, *guide);
                Ok(DirtyRegion::None)
            }

            Command::RemoveGuide { index, guide } => {
                if doc.guides().get(*index) != Some(guide) {
                    return Err(missing("guide", *index));
                }
                doc.remove_guide(*index);
                Ok(DirtyRegion::None)
            }
        }
    }

    /// Run the inverse action. On error the document is unchanged.
    pub fn revert(&self, doc: &mut Document) -> Result<DirtyRegion> {
        match self {
            Command::Pixels { edit, .. } => edit.write(doc, false),

            Command::Macro { steps, .. } => run_steps(doc, steps, false),

            Command::AddLayer {
                index,
                layer,
                previous_current,
            } => {
                expect_layer_at(doc, *index, layer.id)?;
                if *previous_current + 1 >= doc.layers.len() {
                    return Err(missing("layer", *previous_current));
                }
                doc.layers.remove(*index)?;
                doc.layers.set_current(*previous_current)?;
                doc.layers.release_id(layer.id);
                Ok(DirtyRegion::Canvas)
            }

            Command::RemoveLayer {
                index,
                layer,
                previous_current,
            } => {
                if *previous_current > doc.layers.len() {
                    return Err(missing("layer", *previous_current));
                }
                doc.layers.insert(*index, layer.clone())?;
                doc.layers.set_current(*previous_current)?;
                Ok(DirtyRegion::Canvas)
            }

            Command::MoveLayer {
                from,
                to,
                previous_current,
            } => {
                if *previous_current >= doc.layers.len() {
                    return Err(missing("layer", *previous_current));
                }
                doc.layers.reorder(*to, *from)?;
                doc.layers.set_current(*previous_current)?;
                Ok(DirtyRegion::Canvas)
            }

            Command::SetLayerProps { layer, before, .. } => {
                doc.layers.get_mut(*layer)?.set_props(before);
                Ok(DirtyRegion::Canvas)
            }

            Command::ResizeCanvas { before, .. }
            | Command::ResizeImage { before, .. }
            | Command::Crop { before, .. } => {
                before.restore(doc)?;
                Ok(DirtyRegion::Canvas)
            }

            Command::RemapPalette {
                layer, index, before, ..
            } => {
                doc.layers.get_mut(*layer)?.buffer.remap_palette(*index, *before)?;
                Ok(DirtyRegion::Canvas)
            }

            Command::AddNote { index, note } => {
                if doc.notes().get(*index) != Some(note) {
                    return Err(missing("note", *index));
                }
                doc.remove_note(*index);
                Ok(DirtyRegion::None)
            }

            Command::RemoveNote { index, note } => {
                doc.insert_note(*index, note.clone());
                Ok(DirtyRegion::None)
            }

            Command::AddGuide { index, guide } => {
                if doc.guides().get(*index) != Some(guide) {
                    return Err(missing("guide", *index));
                }
                doc.remove_guide(*index);
                Ok(DirtyRegion::None)
            }

            Command::RemoveGuide { index, guide } => {
                doc.insert_guide(*index, *guide);
                Ok(DirtyRegion::None)
            }
        }
    }
}

/// Apply (or revert, in reverse order) a list of steps atomically: if one
/// fails, the ones already run are rolled back.
fn run_steps(doc: &mut Document, steps: &[Command], forward: bool) -> Result<DirtyRegion> {
    let order: Vec<&Command> = if forward {
        steps.iter().collect()
    } else {
        steps.iter().rev().collect()
    };

    let mut dirty = DirtyRegion::None;
    for (done, step) in order.iter().enumerate() {
        let result = if forward {
            step.apply(doc)
        } else {
            step.revert(doc)
        };
        match result {
            Ok(region) => dirty = dirty.merge(region),
            Err(err) => {
                for undo in order[..done].iter().rev() {
                    let rollback = if forward {
                        undo.revert(doc)
                    } else {
                        undo.apply(doc)
                    };
                    debug_assert!(rollback.is_ok(), "macro rollback failed: {:?}", rollback);
                }
                return Err(err);
            }
        }
    }
    Ok(dirty)
}

fn map_buffers(
    snapshot: &CanvasSnapshot,
    f: impl Fn(&PixelBuffer) -> Result<PixelBuffer>,
) -> Result<Vec<PixelBuffer>> {
    snapshot.buffers.iter().map(|(_, b)| f(b)).collect()
}

fn expect_layer_at(doc: &Document, index: usize, id: LayerId) -> Result<()> {
    match doc.layers.at(index) {
        Some(layer) if layer.id == id => Ok(()),
        _ => Err(EditError::UnknownLayer { id: id.0 }),
    }
}

fn missing(what: &str, index: usize) -> EditError {
    EditError::InvalidDimensions {
        message: format!("no matching {} at index {}", what, index),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Point;

    fn doc_with_pixels() -> Document {
        let mut doc = Document::new(4, 4).unwrap();
        let id = doc.layers.current().id;
        doc.layers.get_mut(id).unwrap().buffer.set(0, 0, Colour::RED).unwrap();
        doc
    }

    fn paint(doc: &Document, x: u32, y: u32, colour: Colour) -> Command {
        let layer = doc.layers.current();
        let mut rec = EditRecorder::new(layer.id);
        rec.record(x, y, layer.buffer.pixel(x, y), colour);
        Command::Pixels {
            label: "Paint".to_string(),
            edit: rec.finish(),
        }
    }

    #[test]
    fn test_recorder_keeps_first_before_last_after() {
        let mut rec = EditRecorder::new(LayerId(1));
        rec.record(1, 1, Colour::TRANSPARENT, Colour::RED);
        rec.record(1, 1, Colour::RED, Colour::BLUE);
        let edit = rec.finish();
        assert_eq!(edit.changes().len(), 1);
        assert_eq!(edit.changes()[0].before, Colour::TRANSPARENT);
        assert_eq!(edit.changes()[0].after, Colour::BLUE);
    }

    #[test]
    fn test_recorder_drops_noops() {
        let mut rec = EditRecorder::new(LayerId(1));
        rec.record(0, 0, Colour::RED, Colour::BLUE);
        rec.record(0, 0, Colour::BLUE, Colour::RED);
        assert!(rec.finish().is_empty());
    }

    #[test]
    fn test_pixels_apply_and_revert() {
        let mut doc = doc_with_pixels();
        let cmd = paint(&doc, 2, 3, Colour::GREEN);
        let dirty = cmd.apply(&mut doc).unwrap();
        assert_eq!(dirty, DirtyRegion::Area(Rect::new(2, 3, 1, 1)));
        assert_eq!(doc.layers.current().buffer.pixel(2, 3), Colour::GREEN);
        cmd.revert(&mut doc).unwrap();
        assert_eq!(doc.layers.current().buffer.pixel(2, 3), Colour::TRANSPARENT);
    }

    #[test]
    fn test_pixels_out_of_bounds_writes_nothing() {
        let mut doc = doc_with_pixels();
        let id = doc.layers.current().id;
        let mut rec = EditRecorder::new(id);
        rec.record(1, 1, Colour::TRANSPARENT, Colour::BLUE);
        rec.record(9, 9, Colour::TRANSPARENT, Colour::BLUE);
        let cmd = Command::Pixels {
            label: "bad".to_string(),
            edit: rec.finish(),
        };
        let before = doc.clone();
        assert!(matches!(cmd.apply(&mut doc), Err(EditError::OutOfBounds { .. })));
        assert_eq!(doc, before);
    }

    #[test]
    fn test_macro_rolls_back_on_failure() {
        let mut doc = doc_with_pixels();
        let good = paint(&doc, 1, 1, Colour::BLUE);
        let bad = Command::SetLayerProps {
            layer: LayerId(99),
            before: doc.layers.current().props(),
            after: doc.layers.current().props(),
        };
        let cmd = Command::Macro {
            label: "both".to_string(),
            steps: vec![good, bad],
        };
        let before = doc.clone();
        assert!(cmd.apply(&mut doc).is_err());
        assert_eq!(doc, before);
    }

    #[test]
    fn test_resize_canvas_round_trip() {
        let mut doc = doc_with_pixels();
        let original = doc.clone();
        let cmd = Command::ResizeCanvas {
            width: 6,
            height: 2,
            anchor: Anchor::TopRight,
            before: CanvasSnapshot::capture(&doc),
        };
        cmd.apply(&mut doc).unwrap();
        assert_eq!(doc.size(), (6, 2));
        assert_eq!(doc.layers.current().buffer.pixel(2, 0), Colour::RED);
        cmd.revert(&mut doc).unwrap();
        assert_eq!(doc, original);
    }

    #[test]
    fn test_layer_add_remove() {
        let mut doc = doc_with_pixels();
        let original = doc.clone();
        let id = doc.layers.next_id();
        let layer = Layer::new(id, "Ink", PixelBuffer::new(4, 4).unwrap());
        let add = Command::AddLayer {
            index: 1,
            layer,
            previous_current: 0,
        };
        add.apply(&mut doc).unwrap();
        assert_eq!(doc.layers.len(), 2);
        assert_eq!(doc.layers.current_index(), 1);
        add.revert(&mut doc).unwrap();
        assert_eq!(doc, original);
    }

    #[test]
    fn test_layer_structure_undo_restores_write_target() {
        let mut doc = Document::new(2, 2).unwrap();
        for name in ["b", "c"] {
            let id = doc.layers.next_id();
            let len = doc.layers.len();
            doc.layers.insert(len, Layer::new(id, name, PixelBuffer::new(2, 2).unwrap())).unwrap();
        }
        doc.layers.set_current(0).unwrap();
        let original = doc.clone();

        let moved = Command::MoveLayer {
            from: 2,
            to: 1,
            previous_current: 0,
        };
        moved.apply(&mut doc).unwrap();
        assert_eq!(doc.layers.current_index(), 1);
        moved.revert(&mut doc).unwrap();
        assert_eq!(doc, original);

        let removed = Command::RemoveLayer {
            index: 2,
            layer: doc.layers.at(2).unwrap().clone(),
            previous_current: 0,
        };
        removed.apply(&mut doc).unwrap();
        removed.revert(&mut doc).unwrap();
        assert_eq!(doc, original);
    }

    #[test]
    fn test_note_commands() {
        let mut doc = Document::new(4, 4).unwrap();
        let note = Note {
            position: Point::new(1, 1),
            text: "hinge".to_string(),
        };
        let add = Command::AddNote {
            index: 0,
            note: note.clone(),
        };
        add.apply(&mut doc).unwrap();
        assert!(matches!(add.apply(&mut doc), Err(EditError::DuplicateNote { .. })));
        add.revert(&mut doc).unwrap();
        assert!(doc.notes().is_empty());
    }

    #[test]
    fn test_dirty_merge() {
        let a = DirtyRegion::Area(Rect::new(0, 0, 1, 1));
        let b = DirtyRegion::Area(Rect::new(3, 3, 1, 1));
        assert_eq!(a.merge(b), DirtyRegion::Area(Rect::new(0, 0, 4, 4)));
        assert_eq!(a.merge(DirtyRegion::Canvas), DirtyRegion::Canvas);
        assert_eq!(DirtyRegion::None.merge(a), a);
    }
}
