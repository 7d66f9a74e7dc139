//! Deterministic display colors for token widgets.
//!
//! Every block gets a hue in `[0, 360)`: the definition's `colorSeed` when it
//! sets one, otherwise the CRC32 of the block id. Unknown ids hash the same
//! way, so a token keeps its color whether or not its definition is loaded.

use crc32fast::Hasher;
use serde::{Deserialize, Serialize};

/// Lightness used for widget borders
const BORDER_LIGHTNESS: u8 = 45;

/// Saturation/lightness used when painting token backgrounds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    pub saturation: u8,
    pub lightness: u8,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            saturation: 70,
            lightness: 88,
        }
    }
}

/// HSL color of a token widget
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayColor {
    pub hue: u16,
    pub saturation: u8,
    pub lightness: u8,
}

impl DisplayColor {
    pub fn for_block(block_id: &str, color_seed: Option<u32>, options: &RenderOptions) -> Self {
        Self {
            hue: block_hue(block_id, color_seed),
            saturation: options.saturation,
            lightness: options.lightness,
        }
    }

    pub fn background_css(&self) -> String {
        format!("hsl({}, {}%, {}%)", self.hue, self.saturation, self.lightness)
    }

    pub fn border_css(&self) -> String {
        format!("hsl({}, {}%, {}%)", self.hue, self.saturation, BORDER_LIGHTNESS)
    }
}

/// Hue in `[0, 360)` for a block
pub fn block_hue(block_id: &str, color_seed: Option<u32>) -> u16 {
    let seed = color_seed.unwrap_or_else(|| {
        let mut hasher = Hasher::new();
        hasher.update(block_id.as_bytes());
        hasher.finalize()
    });
    (seed % 360) as u16
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hue_is_stable_and_in_range() {
        for id in ["a", "fade_in", "blk-123", "zzzzzzzzzzzzzzzz"] {
            let hue = block_hue(id, None);
            assert!(hue < 360);
            assert_eq!(hue, block_hue(id, None));
        }
    }

    #[test]
    fn test_seed_overrides_hash() {
        assert_eq!(block_hue("fade_in", Some(120)), 120);
        assert_eq!(block_hue("fade_in", Some(725)), 5);
    }

    #[test]
    fn test_css_strings() {
        let color = DisplayColor::for_block("x", Some(200), &RenderOptions::default());
        assert_eq!(color.background_css(), "hsl(200, 70%, 88%)");
        assert_eq!(color.border_css(), "hsl(200, 70%, 45%)");
    }
}
