use std::collections::{BTreeMap, BTreeSet};

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

use crate::data::model::{Field, OwnerDataset};

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
            let hsl = Hsl::new(hue, 0.75, 0.55);
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
// Color mapping: category → Color32
// ---------------------------------------------------------------------------

/// Maps the categories of a colour-encoded field to distinct colours.
///
/// Built from the operating dataset's distinct values rather than the
/// filtered view, so a category keeps its colour while filters change.
#[derive(Debug, Clone)]
pub struct ColorMap {
    pub field: Field,
    mapping: BTreeMap<String, Color32>,
    default_color: Color32,
}

impl ColorMap {
    /// Build a colour map over the given category set.
    pub fn new(field: Field, categories: &BTreeSet<String>) -> Self {
        let palette = generate_palette(categories.len());
        let mapping: BTreeMap<String, Color32> =
            categories.iter().cloned().zip(palette).collect();

        ColorMap {
            field,
            mapping,
            default_color: Color32::GRAY,
        }
    }

    /// Colour map over the field's distinct values in the dataset.
    pub fn for_field(dataset: &OwnerDataset, field: Field) -> Self {
        let categories: BTreeSet<String> = dataset
            .distinct_values(field)
            .map(|values| values.iter().map(|v| v.to_string()).collect())
            .unwrap_or_default();
        ColorMap::new(field, &categories)
    }

    /// Look up the colour for a category key.
    pub fn color_for(&self, key: &str) -> Color32 {
        self.mapping.get(key).copied().unwrap_or(self.default_color)
    }

    /// Return the legend entries (category → colour) for the UI.
    pub fn legend_entries(&self) -> Vec<(String, Color32)> {
        self.mapping.iter().map(|(k, c)| (k.clone(), *c)).collect()
    }
}
