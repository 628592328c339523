//! Layers and the ordered layer stack.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{EditError, Result};
use crate::types::Colour;

use super::PixelBuffer;

/// Session-stable layer identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LayerId(pub u32);

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Display properties of a layer that can change without touching pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerProps {
    pub name: String,
    pub visible: bool,
    pub opacity: f32,
}

/// One named pixel buffer in the stack.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    pub id: LayerId,
    pub name: String,
    pub buffer: PixelBuffer,
    pub visible: bool,
    opacity: f32,
}

impl Layer {
    pub fn new(id: LayerId, name: impl Into<String>, buffer: PixelBuffer) -> Self {
        Self {
            id,
            name: name.into(),
            buffer,
            visible: true,
            opacity: 1.0,
        }
    }

    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    /// Set opacity, clamped to 0..=1.
    pub fn set_opacity(&mut self, opacity: f32) {
        self.opacity = if opacity.is_nan() {
            1.0
        } else {
            opacity.clamp(0.0, 1.0)
        };
    }

    pub fn props(&self) -> LayerProps {
        LayerProps {
            name: self.name.clone(),
            visible: self.visible,
            opacity: self.opacity,
        }
    }

    pub fn set_props(&mut self, props: &LayerProps) {
        self.name = props.name.clone();
        self.visible = props.visible;
        self.set_opacity(props.opacity);
    }
}

/// Ordered layers, bottom first. Never empty; every layer has the same size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerStack {
    layers: Vec<Layer>,
    current: usize,
    next_id: u32,
}

impl LayerStack {
    /// A stack holding one transparent layer.
    pub fn new(width: u32, height: u32) -> Result<Self> {
        let buffer = PixelBuffer::new(width, height)?;
        Ok(Self::with_base(buffer))
    }

    /// A stack holding one layer built from `buffer`.
    pub fn with_base(buffer: PixelBuffer) -> Self {
        Self {
            layers: vec![Layer::new(LayerId(1), "Layer 1", buffer)],
            current: 0,
            next_id: 2,
        }
    }

    /// Rebuild a stack from existing layers (used when loading projects).
    pub fn from_layers(layers: Vec<Layer>) -> Result<Self> {
        let first = layers.first().ok_or_else(|| EditError::InvalidDimensions {
            message: "a project needs at least one layer".to_string(),
        })?;
        let size = first.buffer.size();
        if let Some(odd) = layers.iter().find(|l| l.buffer.size() != size) {
            return Err(EditError::InvalidDimensions {
                message: format!(
                    "layer '{}' is {}x{} but the canvas is {}x{}",
                    odd.name,
                    odd.buffer.width(),
                    odd.buffer.height(),
                    size.0,
                    size.1
                ),
            });
        }
        let next_id = layers.iter().map(|l| l.id.0).max().unwrap_or(0) + 1;
        Ok(Self {
            current: layers.len() - 1,
            layers,
            next_id,
        })
    }

    pub fn width(&self) -> u32 {
        self.layers[0].buffer.width()
    }

    pub fn height(&self) -> u32 {
        self.layers[0].buffer.height()
    }

    pub fn size(&self) -> (u32, u32) {
        self.layers[0].buffer.size()
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn iter(&self) -> impl Iterator<Item = &Layer> {
        self.layers.iter()
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current(&self) -> &Layer {
        &self.layers[self.current]
    }

    /// Make the layer at `index` the default write target.
    pub fn set_current(&mut self, index: usize) -> Result<()> {
        if index >= self.layers.len() {
            return Err(EditError::InvalidDimensions {
                message: format!("layer index {} of {}", index, self.layers.len()),
            });
        }
        self.current = index;
        Ok(())
    }

    pub fn index_of(&self, id: LayerId) -> Option<usize> {
        self.layers.iter().position(|l| l.id == id)
    }

    pub fn get(&self, id: LayerId) -> Result<&Layer> {
        self.layers
            .iter()
            .find(|l| l.id == id)
            .ok_or(EditError::UnknownLayer { id: id.0 })
    }

    pub fn get_mut(&mut self, id: LayerId) -> Result<&mut Layer> {
        self.layers
            .iter_mut()
            .find(|l| l.id == id)
            .ok_or(EditError::UnknownLayer { id: id.0 })
    }

    pub fn at(&self, index: usize) -> Option<&Layer> {
        self.layers.get(index)
    }

    /// Reserve a fresh id for a layer about to be created.
    pub fn allocate_id(&mut self) -> LayerId {
        let id = LayerId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Peek at the id the next `allocate_id` call would hand out.
    pub fn next_id(&self) -> LayerId {
        LayerId(self.next_id)
    }

    /// Hand `id` back after undoing the insert that claimed it. Only the
    /// newest id can be returned; older ones stay retired.
    pub(crate) fn release_id(&mut self, id: LayerId) {
        if id.0 + 1 == self.next_id && self.index_of(id).is_none() {
            self.next_id = id.0;
        }
    }

    pub(crate) fn insert(&mut self, index: usize, layer: Layer) -> Result<()> {
        if index > self.layers.len() {
            return Err(EditError::InvalidDimensions {
                message: format!("insert position {} of {}", index, self.layers.len()),
            });
        }
        if layer.buffer.size() != self.size() {
            return Err(EditError::InvalidDimensions {
                message: format!(
                    "layer is {}x{} but the canvas is {}x{}",
                    layer.buffer.width(),
                    layer.buffer.height(),
                    self.width(),
                    self.height()
                ),
            });
        }
        if self.index_of(layer.id).is_some() {
            return Err(EditError::InvalidDimensions {
                message: format!("layer {} already exists", layer.id),
            });
        }
        self.next_id = self.next_id.max(layer.id.0 + 1);
        self.layers.insert(index, layer);
        self.current = index;
        Ok(())
    }

    pub(crate) fn remove(&mut self, index: usize) -> Result<Layer> {
        if self.layers.len() <= 1 {
            return Err(EditError::LastLayer);
        }
        if index >= self.layers.len() {
            return Err(EditError::InvalidDimensions {
                message: format!("layer index {} of {}", index, self.layers.len()),
            });
        }
        let layer = self.layers.remove(index);
        if index < self.current {
            self.current -= 1;
        }
        self.current = self.current.min(self.layers.len() - 1);
        Ok(layer)
    }

    pub(crate) fn reorder(&mut self, from: usize, to: usize) -> Result<()> {
        let len = self.layers.len();
        if from >= len || to >= len {
            return Err(EditError::InvalidDimensions {
                message: format!("move layer {} to {} of {}", from, to, len),
            });
        }
        let layer = self.layers.remove(from);
        self.layers.insert(to, layer);
        self.current = to;
        Ok(())
    }

    /// Swap every layer's buffer at once. All buffers must share one size.
    pub(crate) fn replace_buffers(&mut self, buffers: Vec<PixelBuffer>) -> Result<()> {
        if buffers.len() != self.layers.len() {
            return Err(EditError::InvalidDimensions {
                message: format!("{} buffers for {} layers", buffers.len(), self.layers.len()),
            });
        }
        if let Some(first) = buffers.first() {
            if buffers.iter().any(|b| b.size() != first.size()) {
                return Err(EditError::InvalidDimensions {
                    message: "layer buffers differ in size".to_string(),
                });
            }
        }
        for (layer, buffer) in self.layers.iter_mut().zip(buffers) {
            layer.buffer = buffer;
        }
        Ok(())
    }

    /// Composite visible layers bottom-to-top into one RGBA buffer.
    pub fn flatten(&self) -> PixelBuffer {
        let (width, height) = self.size();
        let mut out = vec![Colour::TRANSPARENT; width as usize * height as usize];

        for layer in self.layers.iter().filter(|l| l.visible && l.opacity > 0.0) {
            for (dst, src) in out.iter_mut().zip(layer.buffer.pixels()) {
                *dst = src.over(*dst, layer.opacity);
            }
        }

        PixelBuffer::from_parts(width, height, out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(stack: &mut LayerStack, name: &str, colour: Colour) -> Layer {
        let (w, h) = stack.size();
        let id = stack.allocate_id();
        Layer::new(id, name, PixelBuffer::filled(w, h, colour).unwrap())
    }

    #[test]
    fn test_new_stack_has_one_layer() {
        let stack = LayerStack::new(4, 3).unwrap();
        assert_eq!(stack.len(), 1);
        assert_eq!(stack.size(), (4, 3));
        assert_eq!(stack.current().name, "Layer 1");
    }

    #[test]
    fn test_cannot_remove_last_layer() {
        let mut stack = LayerStack::new(2, 2).unwrap();
        assert!(matches!(stack.remove(0), Err(EditError::LastLayer)));
    }

    #[test]
    fn test_insert_rejects_size_mismatch() {
        let mut stack = LayerStack::new(2, 2).unwrap();
        let id = stack.allocate_id();
        let layer = Layer::new(id, "big", PixelBuffer::new(3, 3).unwrap());
        assert!(stack.insert(1, layer).is_err());
    }

    #[test]
    fn test_release_id_only_rewinds_newest() {
        let mut stack = LayerStack::new(1, 1).unwrap();
        let layer = solid(&mut stack, "ink", Colour::RED);
        let id = layer.id;
        stack.insert(1, layer).unwrap();
        stack.release_id(id);
        assert_eq!(stack.next_id(), LayerId(3));

        stack.remove(1).unwrap();
        stack.release_id(LayerId(1));
        assert_eq!(stack.next_id(), LayerId(3));
        stack.release_id(id);
        assert_eq!(stack.next_id(), id);
    }

    #[test]
    fn test_reorder() {
        let mut stack = LayerStack::new(1, 1).unwrap();
        let top = solid(&mut stack, "top", Colour::RED);
        stack.insert(1, top).unwrap();
        stack.reorder(1, 0).unwrap();
        assert_eq!(stack.layers()[0].name, "top");
        assert_eq!(stack.current_index(), 0);
    }

    #[test]
    fn test_flatten_top_wins() {
        let mut stack = LayerStack::new(2, 2).unwrap();
        let bottom = solid(&mut stack, "bottom", Colour::BLUE);
        let top = solid(&mut stack, "top", Colour::RED);
        stack.insert(1, bottom).unwrap();
        stack.insert(2, top).unwrap();
        assert!(stack.flatten().pixels().all(|c| c == Colour::RED));
    }

    #[test]
    fn test_flatten_skips_hidden() {
        let mut stack = LayerStack::new(1, 1).unwrap();
        let mut top = solid(&mut stack, "top", Colour::RED);
        top.visible = false;
        stack.insert(1, top).unwrap();
        assert_eq!(stack.flatten().pixel(0, 0), Colour::TRANSPARENT);
    }

    #[test]
    fn test_flatten_applies_opacity() {
        let mut stack = LayerStack::new(1, 1).unwrap();
        let bottom = solid(&mut stack, "bottom", Colour::BLACK);
        let mut top = solid(&mut stack, "top", Colour::WHITE);
        top.set_opacity(0.5);
        stack.insert(1, bottom).unwrap();
        stack.insert(2, top).unwrap();
        assert_eq!(stack.flatten().pixel(0, 0), Colour::rgb(128, 128, 128));
    }

    #[test]
    fn test_opacity_clamped() {
        let mut layer = Layer::new(LayerId(9), "l", PixelBuffer::new(1, 1).unwrap());
        layer.set_opacity(3.0);
        assert_eq!(layer.opacity(), 1.0);
        layer.set_opacity(-1.0);
        assert_eq!(layer.opacity(), 0.0);
    }
}
