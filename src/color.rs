use std::collections::BTreeMap;

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

use crate::data::catalog::AttributeCatalog;

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.45, 0.42);
            let rgb: Srgb = hsl.into_color();
            Color32::from_rgb(
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Bubble colours: attribute key → Color32
// ---------------------------------------------------------------------------

/// Slate blue-grey used for bubbles of unknown attributes.
pub const BUBBLE_DEFAULT: Color32 = Color32::from_rgb(0x60, 0x7D, 0x8B);

/// Gives every attribute of a catalog its own bubble colour.
#[derive(Debug, Clone, Default)]
pub struct BubbleColors {
    mapping: BTreeMap<String, Color32>,
}

impl BubbleColors {
    pub fn new(catalog: &AttributeCatalog) -> Self {
        let keys: Vec<&str> = catalog.pickable_keys().collect();
        let mapping = keys
            .iter()
            .zip(generate_palette(keys.len()))
            .map(|(k, c): (&&str, Color32)| (k.to_string(), c))
            .collect();
        BubbleColors { mapping }
    }

    pub fn color_for(&self, key: &str) -> Color32 {
        self.mapping.get(key).copied().unwrap_or(BUBBLE_DEFAULT)
    }
}
