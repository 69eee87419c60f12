//! Per-generation colors.
//!
//! Successive generations rotate the hue by the golden angle, which keeps any
//! run of consecutive generations spread around the color wheel without a
//! fixed palette size. Saturation and lightness are fixed.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Mutex, PoisonError};

use serde::{Deserialize, Serialize};

use crate::graph::ROOT_GENERATION;

/// 360° × (1 − 1/φ).
pub const GOLDEN_ANGLE_DEGREES: f64 = 137.507_764_050_037_85;

/// 24-bit RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// `#rrggbb`.
    pub fn to_hex(self) -> String {
        self.to_string()
    }

    /// Convert HSL (hue in degrees, saturation and lightness in 0..=1).
    pub fn from_hsl(hue: f64, saturation: f64, lightness: f64) -> Self {
        let h = hue.rem_euclid(360.0);
        let s = saturation.clamp(0.0, 1.0);
        let l = lightness.clamp(0.0, 1.0);

        let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
        let x = c * (1.0 - ((h / 60.0) % 2.0 - 1.0).abs());
        let m = l - c / 2.0;

        let (r, g, b) = match (h / 60.0) as u32 {
            0 => (c, x, 0.0),
            1 => (x, c, 0.0),
            2 => (0.0, c, x),
            3 => (0.0, x, c),
            4 => (x, 0.0, c),
            _ => (c, 0.0, x),
        };

        let channel = |v: f64| ((v + m) * 255.0).round().clamp(0.0, 255.0) as u8;
        Self::new(channel(r), channel(g), channel(b))
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Palette parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PaletteConfig {
    /// Hue of the root generation, in degrees.
    pub base_hue: f64,
    pub saturation: f64,
    pub lightness: f64,
    /// Color for generations below the root (the unassigned sentinel).
    pub neutral: Rgb,
}

impl Default for PaletteConfig {
    fn default() -> Self {
        Self {
            base_hue: 217.0,
            saturation: 0.70,
            lightness: 0.55,
            neutral: Rgb::new(0x6b, 0x72, 0x80),
        }
    }
}

/// Memoized generation → color assignment.
///
/// The cache lives as long as the palette and is only cleared by
/// [`reset`](Self::reset). Lookups take `&self`, so one palette can be shared
/// across threads.
#[derive(Debug, Default)]
pub struct GenerationPalette {
    config: PaletteConfig,
    cache: Mutex<HashMap<u32, Rgb>>,
}

impl GenerationPalette {
    pub fn new(config: PaletteConfig) -> Self {
        Self {
            config,
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(PaletteConfig::default())
    }

    pub fn config(&self) -> &PaletteConfig {
        &self.config
    }

    /// Color for a generation.
    pub fn color_for(&self, generation: u32) -> Rgb {
        if generation < ROOT_GENERATION {
            return self.config.neutral;
        }

        // a panicked writer can only have left complete entries behind
        let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        *cache
            .entry(generation)
            .or_insert_with(|| self.compute(generation))
    }

    /// Hue in degrees for a generation. The root generation gets the base hue.
    pub fn hue_for(&self, generation: u32) -> f64 {
        let step = f64::from(generation.saturating_sub(ROOT_GENERATION));
        (self.config.base_hue + step * GOLDEN_ANGLE_DEGREES).rem_euclid(360.0)
    }

    fn compute(&self, generation: u32) -> Rgb {
        Rgb::from_hsl(
            self.hue_for(generation),
            self.config.saturation,
            self.config.lightness,
        )
    }

    /// Number of memoized generations.
    pub fn cached(&self) -> usize {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Drop every memoized color.
    pub fn reset(&self) {
        self.cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_format() {
        assert_eq!(Rgb::new(0x6b, 0x72, 0x80).to_hex(), "#6b7280");
        assert_eq!(Rgb::new(0, 10, 255).to_string(), "#000aff");
    }

    #[test]
    fn test_hsl_primaries() {
        assert_eq!(Rgb::from_hsl(0.0, 1.0, 0.5), Rgb::new(255, 0, 0));
        assert_eq!(Rgb::from_hsl(120.0, 1.0, 0.5), Rgb::new(0, 255, 0));
        assert_eq!(Rgb::from_hsl(240.0, 1.0, 0.5), Rgb::new(0, 0, 255));
        assert_eq!(Rgb::from_hsl(-120.0, 1.0, 0.5), Rgb::new(0, 0, 255));
        assert_eq!(Rgb::from_hsl(42.0, 0.0, 1.0), Rgb::new(255, 255, 255));
    }

    #[test]
    fn test_sentinel_is_neutral() {
        let palette = GenerationPalette::with_defaults();
        assert_eq!(palette.color_for(0).to_hex(), "#6b7280");
        assert_eq!(palette.cached(), 0);
    }

    #[test]
    fn test_root_uses_base_hue() {
        let palette = GenerationPalette::with_defaults();
        assert_eq!(palette.hue_for(ROOT_GENERATION), 217.0);

        let root = palette.color_for(ROOT_GENERATION);
        assert!(root.b > root.g && root.g > root.r, "base hue is blue: {root}");
    }

    #[test]
    fn test_golden_angle_rotation() {
        let palette = GenerationPalette::with_defaults();
        let delta = (palette.hue_for(2) - palette.hue_for(1)).rem_euclid(360.0);
        assert!((delta - GOLDEN_ANGLE_DEGREES).abs() < 1e-9);
    }

    #[test]
    fn test_deterministic_and_memoized() {
        let palette = GenerationPalette::with_defaults();
        let first = palette.color_for(7);
        assert_eq!(palette.color_for(7), first);
        assert_eq!(palette.cached(), 1);

        palette.reset();
        assert_eq!(palette.cached(), 0);
        assert_eq!(palette.color_for(7), first);
        assert_eq!(GenerationPalette::with_defaults().color_for(7), first);
    }

    #[test]
    fn test_consecutive_generations_differ() {
        let palette = GenerationPalette::with_defaults();
        let colors: Vec<Rgb> = (1..=40).map(|g| palette.color_for(g)).collect();
        for pair in colors.windows(2) {
            assert_ne!(pair[0], pair[1]);
        }

        // any two of the first 20 hues are at least 10° apart on the circle
        for a in 1..=20u32 {
            for b in (a + 1)..=20 {
                let d = (palette.hue_for(a) - palette.hue_for(b)).abs();
                assert!(d.min(360.0 - d) > 10.0, "generations {a} and {b} too close");
            }
        }
    }

    #[test]
    fn test_shared_across_threads() {
        let palette = std::sync::Arc::new(GenerationPalette::with_defaults());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let palette = palette.clone();
                std::thread::spawn(move || {
                    (1..=16).map(|g| palette.color_for(g)).collect::<Vec<_>>()
                })
            })
            .collect();
        let results: Vec<Vec<Rgb>> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert!(results.windows(2).all(|w| w[0] == w[1]));
        assert_eq!(palette.cached(), 16);
    }
}
