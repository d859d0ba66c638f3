//! Two-colour palettes.
//!
//! Every entity colour is a random linear blend between a palette's base and
//! accent colour, drawn once at creation and redrawn on palette change.

use glam::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Convert a `0xRRGGBB` literal to linear-ish RGB in `[0, 1]`.
pub const fn hex(rgb: u32) -> Vec3 {
    Vec3::new(
        ((rgb >> 16) & 0xff) as f32 / 255.0,
        ((rgb >> 8) & 0xff) as f32 / 255.0,
        (rgb & 0xff) as f32 / 255.0,
    )
}

/// Base/accent colour pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColorPair {
    pub base: Vec3,
    pub accent: Vec3,
}

impl ColorPair {
    pub const fn new(base: Vec3, accent: Vec3) -> Self {
        Self { base, accent }
    }

    /// Colour at blend factor `mix` (0 = base, 1 = accent).
    #[inline]
    pub fn blend(&self, mix: f32) -> Vec3 {
        self.base.lerp(self.accent, mix.clamp(0.0, 1.0))
    }

    /// Colour at a uniformly random blend factor.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec3 {
        self.blend(rng.gen())
    }
}

/// Purple/pink, cyan/green, orange/deep-orange, blue/indigo.
pub const DEFAULT_PALETTES: [ColorPair; 4] = [
    ColorPair::new(hex(0x6c63ff), hex(0xf50057)),
    ColorPair::new(hex(0x00bcd4), hex(0x4caf50)),
    ColorPair::new(hex(0xff9800), hex(0xff5722)),
    ColorPair::new(hex(0x2196f3), hex(0x3f51b5)),
];

/// Ordered palette table with a current selection. Never empty.
#[derive(Debug, Clone, PartialEq)]
pub struct PaletteSet {
    palettes: Vec<ColorPair>,
    current: usize,
}

impl PaletteSet {
    /// A set over `palettes`; an empty list falls back to the defaults.
    pub fn new(palettes: Vec<ColorPair>) -> Self {
        let palettes = if palettes.is_empty() { DEFAULT_PALETTES.to_vec() } else { palettes };
        Self { palettes, current: 0 }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.palettes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.palettes.is_empty()
    }

    #[inline]
    pub fn current_index(&self) -> usize {
        self.current
    }

    #[inline]
    pub fn current(&self) -> ColorPair {
        self.palettes[self.current]
    }

    /// Select the next palette, wrapping around. Returns the new index.
    pub fn cycle(&mut self) -> usize {
        self.current = (self.current + 1) % self.palettes.len();
        self.current
    }

    /// Select palette `index`, or return `None` if it is out of range.
    pub fn select(&mut self, index: usize) -> Option<ColorPair> {
        let pair = *self.palettes.get(index)?;
        self.current = index;
        Some(pair)
    }
}

impl Default for PaletteSet {
    fn default() -> Self {
        Self::new(DEFAULT_PALETTES.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn test_hex_conversion() {
        assert_eq!(hex(0xff0000), Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(hex(0x000000), Vec3::ZERO);
        assert!((hex(0x6c63ff).x - 108.0 / 255.0).abs() < 1e-6);
    }

    #[test]
    fn test_samples_stay_between_endpoints() {
        let pair = DEFAULT_PALETTES[0];
        let mut rng = SmallRng::seed_from_u64(9);
        for _ in 0..100 {
            let c = pair.sample(&mut rng);
            for axis in 0..3 {
                let (a, b) = (pair.base[axis], pair.accent[axis]);
                assert!(c[axis] >= a.min(b) - 1e-6 && c[axis] <= a.max(b) + 1e-6);
            }
        }
    }

    #[test]
    fn test_cycle_wraps_and_select_checks_bounds() {
        let mut set = PaletteSet::default();
        assert_eq!(set.len(), 4);
        for expected in [1, 2, 3, 0] {
            assert_eq!(set.cycle(), expected);
        }
        assert!(set.select(4).is_none());
        assert_eq!(set.current_index(), 0);
        assert_eq!(set.select(2), Some(DEFAULT_PALETTES[2]));
        assert_eq!(set.current_index(), 2);
    }

    #[test]
    fn test_empty_list_uses_defaults() {
        assert_eq!(PaletteSet::new(Vec::new()).len(), DEFAULT_PALETTES.len());
    }
}
