//! Sequential colormaps for density charts
//!
//! Loads palettes from palettes.json (embedded at compile time) and provides
//! case-insensitive access by name. Each palette is a gradient from the color
//! of the lowest count to the color of the highest.

use serde::Deserialize;
use std::collections::HashMap;
use std::sync::OnceLock;
use tracing::{debug, error, warn};

/// Embedded palettes.json content
const PALETTES_JSON: &str = include_str!("../../palettes.json");

/// Palette used when the configured one is unknown
pub const DEFAULT_SEQUENTIAL_PALETTE: &str = "Reds";

/// Gray used when a color cannot be resolved
const FALLBACK_GRAY: [u8; 3] = [128, 128, 128];

/// A single palette definition from palettes.json
#[derive(Debug, Clone, Deserialize)]
pub struct PaletteDefinition {
    pub name: String,
    pub colors: Vec<String>,
}

impl PaletteDefinition {
    fn color_at(&self, index: usize) -> [u8; 3] {
        self.colors
            .get(index)
            .and_then(|c| parse_hex_color(c))
            .unwrap_or(FALLBACK_GRAY)
    }

    /// Interpolate a color from the palette at position t ∈ [0, 1]
    ///
    /// t=0 returns the first color, t=1 returns the last color.
    pub fn interpolate(&self, t: f64) -> [u8; 3] {
        let n = self.colors.len();
        if n == 0 {
            return FALLBACK_GRAY;
        }

        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        if n == 1 {
            return self.color_at(0);
        }

        let pos = t * (n - 1) as f64;
        let idx_low = pos.floor() as usize;
        let idx_high = (idx_low + 1).min(n - 1);
        let frac = pos - idx_low as f64;

        let low = self.color_at(idx_low);
        let high = self.color_at(idx_high);

        let mix = |a: u8, b: u8| (a as f64 * (1.0 - frac) + b as f64 * frac).round() as u8;
        [
            mix(low[0], high[0]),
            mix(low[1], high[1]),
            mix(low[2], high[2]),
        ]
    }
}

/// Registry of all available palettes
#[derive(Debug, Clone, Default)]
pub struct PaletteRegistry {
    /// Palettes by lowercase name
    palettes: HashMap<String, PaletteDefinition>,
}

impl PaletteRegistry {
    /// Load palettes from JSON string
    pub fn from_json(json: &str) -> Result<Self, String> {
        let definitions: Vec<PaletteDefinition> = serde_json::from_str(json)
            .map_err(|e| format!("Failed to parse palettes JSON: {}", e))?;

        let palettes: HashMap<String, PaletteDefinition> = definitions
            .into_iter()
            .map(|def| (def.name.to_lowercase(), def))
            .collect();
        debug!(palettes = palettes.len(), "loaded palette registry");

        Ok(Self { palettes })
    }

    /// Get a palette by name (case-insensitive)
    pub fn get(&self, name: &str) -> Option<&PaletteDefinition> {
        self.palettes.get(&name.to_lowercase())
    }

    /// Get a palette, falling back to the default one
    pub fn sequential_or_default(&self, name: &str) -> Option<&PaletteDefinition> {
        self.get(name).or_else(|| {
            warn!(
                palette = name,
                fallback = DEFAULT_SEQUENTIAL_PALETTE,
                "unknown sequential palette"
            );
            self.get(DEFAULT_SEQUENTIAL_PALETTE)
        })
    }
}

static PALETTE_REGISTRY: OnceLock<PaletteRegistry> = OnceLock::new();

/// Global palette registry, initialized lazily on first access
pub fn palette_registry() -> &'static PaletteRegistry {
    PALETTE_REGISTRY.get_or_init(|| {
        PaletteRegistry::from_json(PALETTES_JSON).unwrap_or_else(|e| {
            error!("failed to load palettes.json: {}", e);
            PaletteRegistry::default()
        })
    })
}

/// Parse a hex color string to RGB array
///
/// Supports `#RRGGBB`, `#RRGGBBAA` (alpha ignored) and the same without `#`.
pub fn parse_hex_color(hex: &str) -> Option<[u8; 3]> {
    let hex = hex.trim().trim_start_matches('#');

    if (hex.len() != 6 && hex.len() != 8) || !hex.is_ascii() {
        warn!(color = hex, "invalid hex color");
        return None;
    }

    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;

    Some([r, g, b])
}

/// Color for a count on a sequential palette, scaled against the maximum count
pub fn sequential_color(palette: &PaletteDefinition, count: usize, max_count: usize) -> [u8; 3] {
    if max_count <= 1 {
        return palette.interpolate(1.0);
    }
    // Counts start at 1 (empty bins are never drawn)
    let t = (count.saturating_sub(1)) as f64 / (max_count - 1) as f64;
    palette.interpolate(t)
}
