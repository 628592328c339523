//! Named swatches used by the fill tools.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::Colour;

/// One swatch colour and its relative probability for textured fill.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SwatchEntry {
    pub colour: Colour,
    #[serde(default = "default_weight")]
    pub weight: f32,
}

fn default_weight() -> f32 {
    1.0
}

/// A named, ordered set of unique colours.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Swatch {
    pub name: String,
    entries: Vec<SwatchEntry>,
}

impl Swatch {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: Vec::new(),
        }
    }

    /// Build a swatch with every colour at weight 1.
    pub fn from_colours(name: impl Into<String>, colours: impl IntoIterator<Item = Colour>) -> Self {
        let mut swatch = Self::new(name);
        for colour in colours {
            swatch.insert(colour, 1.0);
        }
        swatch
    }

    /// Add a colour, or update its weight if it is already present.
    /// Negative and NaN weights are stored as zero.
    pub fn insert(&mut self, colour: Colour, weight: f32) {
        let weight = if weight.is_finite() { weight.max(0.0) } else { 0.0 };
        match self.entries.iter_mut().find(|e| e.colour == colour) {
            Some(entry) => entry.weight = weight,
            None => self.entries.push(SwatchEntry { colour, weight }),
        }
    }

    pub fn remove(&mut self, colour: Colour) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.colour != colour);
        self.entries.len() != before
    }

    pub fn entries(&self) -> &[SwatchEntry] {
        &self.entries
    }

    pub fn colours(&self) -> impl Iterator<Item = Colour> + '_ {
        self.entries.iter().map(|e| e.colour)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of all positive weights.
    pub fn total_weight(&self) -> f32 {
        self.entries.iter().map(|e| e.weight).sum()
    }

    /// True if at least one colour can be drawn.
    pub fn is_fillable(&self) -> bool {
        self.entries.iter().any(|e| e.weight > 0.0)
    }

    /// Draw a colour proportionally to the weights.
    ///
    /// Returns `None` when no colour has a non-zero weight.
    pub fn pick<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<Colour> {
        let total = self.total_weight();
        if total <= 0.0 {
            return None;
        }
        let mut target = rng.random::<f32>() * total;
        let mut last = None;
        for entry in self.entries.iter().filter(|e| e.weight > 0.0) {
            if target < entry.weight {
                return Some(entry.colour);
            }
            target -= entry.weight;
            last = Some(entry.colour);
        }
        // Float accumulation can leave `target` marginally above zero.
        last
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    use super::*;

    #[test]
    fn test_insert_keeps_colours_unique() {
        let mut swatch = Swatch::new("greens");
        swatch.insert(Colour::GREEN, 1.0);
        swatch.insert(Colour::GREEN, 3.0);
        assert_eq!(swatch.len(), 1);
        assert_eq!(swatch.entries()[0].weight, 3.0);
    }

    #[test]
    fn test_negative_weight_clamped() {
        let mut swatch = Swatch::new("s");
        swatch.insert(Colour::RED, -2.0);
        swatch.insert(Colour::BLUE, f32::NAN);
        assert!(!swatch.is_fillable());
    }

    #[test]
    fn test_pick_none_when_all_zero() {
        let mut swatch = Swatch::new("s");
        swatch.insert(Colour::RED, 0.0);
        let mut rng = SmallRng::seed_from_u64(1);
        assert_eq!(swatch.pick(&mut rng), None);
    }

    #[test]
    fn test_pick_skips_zero_weights() {
        let mut swatch = Swatch::new("s");
        swatch.insert(Colour::RED, 0.0);
        swatch.insert(Colour::BLUE, 2.0);
        let mut rng = SmallRng::seed_from_u64(7);
        for _ in 0..100 {
            assert_eq!(swatch.pick(&mut rng), Some(Colour::BLUE));
        }
    }

    #[test]
    fn test_pick_uses_all_weighted_colours() {
        let swatch = Swatch::from_colours("s", [Colour::RED, Colour::GREEN]);
        let mut rng = SmallRng::seed_from_u64(42);
        let picks: Vec<_> = (0..200).filter_map(|_| swatch.pick(&mut rng)).collect();
        assert!(picks.contains(&Colour::RED));
        assert!(picks.contains(&Colour::GREEN));
    }
}
