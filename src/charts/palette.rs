//! Color palettes and colormaps.
//!
//! Categorical palettes are indexed per hue level and wrap around. Colormaps
//! are anchor lists sampled by linear interpolation at t ∈ [0, 1].

use crate::config::Theme;

pub type Rgb = [u8; 3];

const TAB10: [&str; 10] = [
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
    "#bcbd22", "#17becf",
];

const MUTED: [&str; 10] = [
    "#4878d0", "#ee854a", "#6acc64", "#d65f5f", "#956cb4", "#8c613c", "#dc7ec0", "#797979",
    "#d5bb67", "#82c6e2",
];

const PASTEL: [&str; 10] = [
    "#a1c9f4", "#ffb482", "#8de5a1", "#ff9f9b", "#d0bbff", "#debb9b", "#fab0e4", "#cfcfcf",
    "#fffea3", "#b9f2f0",
];

const BRIGHT: [&str; 10] = [
    "#023eff", "#ff7c00", "#1ac938", "#e8000b", "#8b2be2", "#9f4800", "#f14cc1", "#a3a3a3",
    "#ffc400", "#00d7ff",
];

const VIRIDIS: [&str; 9] = [
    "#440154", "#472d7b", "#3b528b", "#2c728e", "#21918c", "#28ae80", "#5ec962", "#addc30",
    "#fde725",
];

const COOLWARM: [&str; 9] = [
    "#3b4cc0", "#5977e3", "#7b9ff9", "#9ebeff", "#dddcdc", "#f7b89c", "#f49a7b", "#e0654f",
    "#b40426",
];

const BLUES: [&str; 9] = [
    "#f7fbff", "#deebf7", "#c6dbef", "#9ecae1", "#6baed6", "#4292c6", "#2171b5", "#08519c",
    "#08306b",
];

/// Parse a hex color string (`#RRGGBB` or `RRGGBB`).
pub fn parse_hex_color(hex: &str) -> Option<Rgb> {
    let hex = hex.trim_start_matches('#');
    if hex.len() != 6 {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some([r, g, b])
}

fn hex_or_gray(hex: &str) -> Rgb {
    parse_hex_color(hex).unwrap_or([128, 128, 128])
}

/// A continuous colormap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Colormap {
    Viridis,
    Coolwarm,
    Blues,
}

impl Colormap {
    fn anchors(&self) -> &'static [&'static str] {
        match self {
            Colormap::Viridis => &VIRIDIS,
            Colormap::Coolwarm => &COOLWARM,
            Colormap::Blues => &BLUES,
        }
    }

    /// Color at position t; t is clamped to [0, 1].
    pub fn interpolate(&self, t: f64) -> Rgb {
        let anchors = self.anchors();
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        let n = anchors.len();

        let pos = t * (n - 1) as f64;
        let idx_low = pos.floor() as usize;
        let idx_high = (idx_low + 1).min(n - 1);
        let frac = pos - idx_low as f64;

        let low = hex_or_gray(anchors[idx_low]);
        let high = hex_or_gray(anchors[idx_high]);
        [
            (low[0] as f64 * (1.0 - frac) + high[0] as f64 * frac).round() as u8,
            (low[1] as f64 * (1.0 - frac) + high[1] as f64 * frac).round() as u8,
            (low[2] as f64 * (1.0 - frac) + high[2] as f64 * frac).round() as u8,
        ]
    }

    /// `n` discrete colors sampled away from both ends of the map.
    pub fn sample(&self, n: usize) -> Vec<Rgb> {
        (0..n)
            .map(|i| self.interpolate((i + 1) as f64 / (n + 1) as f64))
            .collect()
    }
}

/// Background, ink and categorical colors for one theme.
#[derive(Debug, Clone, PartialEq)]
pub struct ThemeStyle {
    pub background: Rgb,
    pub foreground: Rgb,
    pub grid: Rgb,
    categorical: &'static [&'static str],
}

impl ThemeStyle {
    pub fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Default => Self {
                background: [255, 255, 255],
                foreground: [33, 33, 33],
                grid: [220, 220, 220],
                categorical: &TAB10,
            },
            Theme::Dark => Self {
                background: [38, 40, 44],
                foreground: [230, 230, 230],
                grid: [80, 84, 90],
                categorical: &MUTED,
            },
            Theme::Pastel => Self {
                background: [255, 255, 255],
                foreground: [60, 60, 60],
                grid: [225, 225, 225],
                categorical: &PASTEL,
            },
            Theme::Bright => Self {
                background: [255, 255, 255],
                foreground: [20, 20, 20],
                grid: [215, 215, 215],
                categorical: &BRIGHT,
            },
        }
    }

    /// Color of the `index`-th hue level.
    pub fn color(&self, index: usize) -> Rgb {
        hex_or_gray(self.categorical[index % self.categorical.len()])
    }

    /// Colors for `n` hue levels.
    pub fn colors(&self, n: usize) -> Vec<Rgb> {
        (0..n).map(|i| self.color(i)).collect()
    }
}
