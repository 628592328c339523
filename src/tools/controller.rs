//! Tool state machine.
//!
//! The controller owns the active tool, its settings and the gesture in
//! progress. Pointer events go in; what comes out is a [`ToolOutcome`] for
//! the session to act on. The controller never mutates the document itself:
//! strokes accumulate in a pending edit that is shown as a preview and only
//! becomes a command on release.

use rand::rngs::SmallRng;
use rand::SeedableRng;

use crate::canvas::PixelBuffer;
use crate::document::{Document, Note};
use crate::error::{EditError, Result};
use crate::fill::{self, FillMode, FillSource, HslJitter};
use crate::history::{Command, DirtyRegion, EditRecorder};
use crate::types::{Colour, Point, Rect, Swatch};

use super::brush::{Brush, Line};
use super::{FillTool, SelectionTool, Tool, Transform};

/// What a pointer event asks the session to do.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolOutcome {
    /// Nothing to do.
    Idle,
    /// The stroke preview changed in this area.
    Preview(DirtyRegion),
    /// Record this command.
    Commit(Command),
    /// Replace the selection with this (unclipped) rectangle.
    Select(Rect),
    /// Apply a transform to the selected pixels.
    Transform(Transform),
    /// The primary colour was picked from the canvas.
    Picked(Colour),
}

/// The gesture currently in progress.
#[derive(Debug, Clone)]
pub enum Gesture {
    Idle,
    Stroke {
        recorder: EditRecorder,
        colour: Colour,
        last: Point,
        clip: Rect,
        /// Brush offsets, fixed for the whole stroke.
        footprint: Vec<(i32, i32)>,
    },
    Marquee { anchor: Point, current: Point },
    Drag { anchor: Point, current: Point },
}

#[derive(Debug, Clone)]
pub struct ToolController {
    tool: Tool,
    gesture: Gesture,
    pub brush: Brush,
    pub primary: Colour,
    pub tolerance: u8,
    /// Swatch used by the textured fill tool.
    pub swatch: Option<Swatch>,
    pub jitter: HslJitter,
    /// Text placed by the note tool.
    pub note_text: String,
    rng: SmallRng,
}

impl ToolController {
    pub fn new(brush: Brush, tolerance: u8, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_os_rng(),
        };
        Self {
            tool: Tool::default(),
            gesture: Gesture::Idle,
            brush,
            primary: Colour::BLACK,
            tolerance,
            swatch: None,
            jitter: HslJitter::default(),
            note_text: String::new(),
            rng,
        }
    }

    pub fn tool(&self) -> Tool {
        self.tool
    }

    pub fn gesture(&self) -> &Gesture {
        &self.gesture
    }

    pub fn rng(&mut self) -> &mut SmallRng {
        &mut self.rng
    }

    /// Switch tools. Any gesture in progress is dropped without a command.
    pub fn set_tool(&mut self, tool: Tool) {
        if !matches!(self.gesture, Gesture::Idle) {
            tracing::debug!(from = %self.tool, to = %tool, "discarding gesture on tool switch");
        }
        self.gesture = Gesture::Idle;
        self.tool = tool;
    }

    /// Drop the gesture in progress.
    pub fn cancel(&mut self) {
        self.gesture = Gesture::Idle;
    }

    /// Pointer pressed at `at`.
    pub fn begin(&mut self, doc: &Document, selection: Option<Rect>, at: Point) -> Result<ToolOutcome> {
        self.gesture = Gesture::Idle;
        match self.tool {
            Tool::Pen | Tool::Eraser => {
                let layer = doc.layers.current();
                layer.buffer.ensure_writable("stroke")?;
                let colour = if self.tool == Tool::Eraser {
                    Colour::TRANSPARENT
                } else {
                    self.primary
                };
                let clip = selection.unwrap_or_else(|| layer.buffer.bounds());
                let mut recorder = EditRecorder::new(layer.id);
                let footprint = self.brush.footprint();
                let dirty = dab(&mut recorder, &layer.buffer, &footprint, [at], colour, clip);
                self.gesture = Gesture::Stroke {
                    recorder,
                    colour,
                    last: at,
                    clip,
                    footprint,
                };
                Ok(ToolOutcome::Preview(dirty))
            }

            Tool::Eyedropper => {
                let colour = doc.flatten().get(at.x, at.y)?;
                self.primary = colour;
                Ok(ToolOutcome::Picked(colour))
            }

            Tool::Fill(kind) => self.fill(doc, selection, at, kind),

            Tool::Selection(SelectionTool::Marquee) => {
                self.gesture = Gesture::Marquee {
                    anchor: at,
                    current: at,
                };
                Ok(ToolOutcome::Idle)
            }

            Tool::Selection(SelectionTool::Move) => {
                self.gesture = Gesture::Drag {
                    anchor: at,
                    current: at,
                };
                Ok(ToolOutcome::Idle)
            }

            Tool::Note => {
                let note = Note {
                    position: at,
                    text: self.note_text.clone(),
                };
                doc.validate_note(&note)?;
                Ok(ToolOutcome::Commit(Command::AddNote {
                    index: doc.notes().len(),
                    note,
                }))
            }
        }
    }

    /// Pointer moved to `at` while pressed.
    pub fn drag(&mut self, doc: &Document, at: Point) -> Result<ToolOutcome> {
        match &mut self.gesture {
            Gesture::Stroke {
                recorder,
                colour,
                last,
                clip,
                footprint,
            } => {
                let buffer = &doc.layers.get(recorder.layer())?.buffer;
                let reach = footprint
                    .iter()
                    .map(|&(dx, dy)| dx.unsigned_abs().max(dy.unsigned_abs()))
                    .max()
                    .unwrap_or(0);
                let path = Line::new(*last, at).points_near(*clip, reach);
                let dirty = dab(recorder, buffer, footprint, path, *colour, *clip);
                *last = at;
                Ok(ToolOutcome::Preview(dirty))
            }
            Gesture::Marquee { current, .. } | Gesture::Drag { current, .. } => {
                *current = at;
                Ok(ToolOutcome::Idle)
            }
            Gesture::Idle => Ok(ToolOutcome::Idle),
        }
    }

    /// Pointer released at `at`.
    pub fn end(&mut self, doc: &Document, at: Point) -> Result<ToolOutcome> {
        if matches!(self.gesture, Gesture::Stroke { .. }) {
            self.drag(doc, at)?;
        }
        match std::mem::replace(&mut self.gesture, Gesture::Idle) {
            Gesture::Stroke { recorder, .. } => {
                let edit = recorder.finish();
                if edit.is_empty() {
                    return Ok(ToolOutcome::Idle);
                }
                let label = if self.tool == Tool::Eraser {
                    "Erase"
                } else {
                    "Pen stroke"
                };
                Ok(ToolOutcome::Commit(Command::Pixels {
                    label: label.to_string(),
                    edit,
                }))
            }
            Gesture::Marquee { anchor, .. } => Ok(ToolOutcome::Select(Rect::from_corners(anchor, at))),
            Gesture::Drag { anchor, .. } => {
                let (dx, dy) = (at.x - anchor.x, at.y - anchor.y);
                if dx == 0 && dy == 0 {
                    Ok(ToolOutcome::Idle)
                } else {
                    Ok(ToolOutcome::Transform(Transform::Move { dx, dy }))
                }
            }
            Gesture::Idle => Ok(ToolOutcome::Idle),
        }
    }

    /// Pending colour at (x, y) while a stroke is in progress.
    pub fn preview_pixel(&self, x: u32, y: u32) -> Option<Colour> {
        match &self.gesture {
            Gesture::Stroke { recorder, .. } => recorder.pending(x, y),
            _ => None,
        }
    }

    /// The stroke layer with the pending stroke drawn on it.
    pub fn stroke_preview(&self, doc: &Document) -> Option<PixelBuffer> {
        let Gesture::Stroke { recorder, .. } = &self.gesture else {
            return None;
        };
        let mut buffer = doc.layers.get(recorder.layer()).ok()?.buffer.clone();
        for change in recorder.changes() {
            buffer.put(change.x, change.y, change.after);
        }
        Some(buffer)
    }

    fn fill(
        &mut self,
        doc: &Document,
        selection: Option<Rect>,
        at: Point,
        kind: FillTool,
    ) -> Result<ToolOutcome> {
        let (mode, source) = match kind {
            FillTool::Contiguous => (FillMode::Contiguous, FillSource::Colour(self.primary)),
            FillTool::Global => (FillMode::Global, FillSource::Colour(self.primary)),
            FillTool::Textured => {
                let swatch = self.swatch.clone().ok_or_else(|| EditError::NoFillableColour {
                    swatch: String::new(),
                })?;
                (
                    FillMode::Contiguous,
                    FillSource::Swatch {
                        swatch,
                        jitter: self.jitter,
                    },
                )
            }
        };
        let layer = doc.layers.current();
        let edit = fill::plan(
            &layer.buffer,
            layer.id,
            at,
            mode,
            &source,
            self.tolerance,
            selection,
            &mut self.rng,
        )?;
        if edit.is_empty() {
            return Ok(ToolOutcome::Idle);
        }
        Ok(ToolOutcome::Commit(Command::Pixels {
            label: Tool::Fill(kind).to_string(),
            edit,
        }))
    }
}

/// Stamp `footprint` at every point of `path`, clipped to `clip` and the
/// buffer.
fn dab(
    recorder: &mut EditRecorder,
    buffer: &PixelBuffer,
    footprint: &[(i32, i32)],
    path: impl IntoIterator<Item = Point>,
    colour: Colour,
    clip: Rect,
) -> DirtyRegion {
    let mut dirty = DirtyRegion::None;
    for centre in path {
        for &(dx, dy) in footprint {
            let p = Point::new(centre.x.saturating_add(dx), centre.y.saturating_add(dy));
            if !clip.contains(p.x, p.y) || !buffer.contains(p.x, p.y) {
                continue;
            }
            let (x, y) = (p.x as u32, p.y as u32);
            recorder.record(x, y, buffer.pixel(x, y), colour);
            dirty = dirty.merge(DirtyRegion::Area(Rect::new(p.x, p.y, 1, 1)));
        }
    }
    dirty
}
