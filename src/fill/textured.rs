//! Per-pixel colour variation for textured fills.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::types::Colour;

/// Random offset range for one HSL channel.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelJitter {
    pub enabled: bool,
    pub lower: f32,
    pub upper: f32,
}

impl ChannelJitter {
    pub fn new(lower: f32, upper: f32) -> Self {
        Self {
            enabled: true,
            lower,
            upper,
        }
    }

    /// Draw an offset, or zero when disabled.
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f32 {
        if !self.enabled {
            return 0.0;
        }
        let (lo, hi) = if self.lower <= self.upper {
            (self.lower, self.upper)
        } else {
            (self.upper, self.lower)
        };
        if !(lo.is_finite() && hi.is_finite()) || lo == hi {
            return if lo.is_finite() { lo } else { 0.0 };
        }
        rng.random_range(lo..=hi)
    }
}

/// Hue (degrees), saturation and lightness (fractions) offsets applied to
/// each filled pixel independently.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HslJitter {
    pub hue: ChannelJitter,
    pub saturation: ChannelJitter,
    pub lightness: ChannelJitter,
}

impl HslJitter {
    pub fn is_active(&self) -> bool {
        self.hue.enabled || self.saturation.enabled || self.lightness.enabled
    }

    /// Vary `colour`, keeping its alpha.
    pub fn apply<R: Rng + ?Sized>(&self, colour: Colour, rng: &mut R) -> Colour {
        if !self.is_active() {
            return colour;
        }
        let (h, s, l) = colour.to_hsl();
        Colour::from_hsl(
            h + self.hue.sample(rng),
            s + self.saturation.sample(rng),
            l + self.lightness.sample(rng),
            colour.a,
        )
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    use super::*;

    #[test]
    fn test_inactive_jitter_is_identity() {
        let mut rng = SmallRng::seed_from_u64(1);
        let c = Colour::rgb(12, 200, 99);
        assert_eq!(HslJitter::default().apply(c, &mut rng), c);
    }

    #[test]
    fn test_lightness_offset_direction() {
        let mut rng = SmallRng::seed_from_u64(7);
        let jitter = HslJitter {
            lightness: ChannelJitter::new(0.2, 0.3),
            ..HslJitter::default()
        };
        let base = Colour::rgb(100, 40, 40);
        for _ in 0..20 {
            let out = jitter.apply(base, &mut rng);
            assert!(out.to_hsl().2 > base.to_hsl().2);
            assert_eq!(out.a, 255);
        }
    }

    #[test]
    fn test_reversed_bounds_are_swapped() {
        let mut rng = SmallRng::seed_from_u64(3);
        let ch = ChannelJitter::new(10.0, -10.0);
        for _ in 0..50 {
            let v = ch.sample(&mut rng);
            assert!((-10.0..=10.0).contains(&v));
        }
    }

    #[test]
    fn test_degenerate_range() {
        let mut rng = SmallRng::seed_from_u64(3);
        assert_eq!(ChannelJitter::new(0.5, 0.5).sample(&mut rng), 0.5);
    }
}
