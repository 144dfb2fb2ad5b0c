use crate::ir::{LAYER_COUNT, Layer};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const SCHEME_SET1: [&str; 9] = [
    "#e41a1c", "#377eb8", "#4daf4a", "#984ea3", "#ff7f00", "#ffff33", "#a65628", "#f781bf",
    "#999999",
];

const SCHEME_ACCENT: [&str; 8] = [
    "#7fc97f", "#beaed4", "#fdc086", "#ffff99", "#386cb0", "#f0027f", "#bf5b17", "#666666",
];

const SCHEME_CATEGORY10: [&str; 10] = [
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
    "#bcbd22", "#17becf",
];

const SCHEME_SET2: [&str; 8] = [
    "#66c2a5", "#fc8d62", "#8da0cb", "#e78ac3", "#a6d854", "#ffd92f", "#e5c494", "#b3b3b3",
];

const SCHEME_SET3: [&str; 12] = [
    "#8dd3c7", "#ffffb3", "#bebada", "#fb8072", "#80b1d3", "#fdb462", "#b3de69", "#fccde5",
    "#d9d9d9", "#bc80bd", "#ccebc5", "#ffed6f",
];

const SCHEME_TABLEAU10: [&str; 10] = [
    "#4e79a7", "#f28e2c", "#e15759", "#76b7b2", "#59a14f", "#edc949", "#af7aa1", "#ff9da7",
    "#9c755f", "#bab0ab",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Darkens by `0.7^k`, the usual categorical-scale step.
    pub fn darker(self, k: f32) -> Self {
        let factor = 0.7f32.powf(k);
        let scale = |channel: u8| (channel as f32 * factor).round().clamp(0.0, 255.0) as u8;
        Self::new(scale(self.r), scale(self.g), scale(self.b))
    }

    pub fn with_opacity(self, alpha: f32) -> String {
        format!(
            "rgba({}, {}, {}, {})",
            self.r,
            self.g,
            self.b,
            alpha.clamp(0.0, 1.0)
        )
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl FromStr for Rgb {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s.trim().trim_start_matches('#');
        if !hex.is_ascii() {
            return Err(format!("unsupported color `{s}`"));
        }
        let expanded: String = match hex.len() {
            3 => hex.chars().flat_map(|ch| [ch, ch]).collect(),
            6 => hex.to_string(),
            _ => return Err(format!("unsupported color `{s}`")),
        };
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&expanded[range], 16).map_err(|_| format!("unsupported color `{s}`"))
        };
        Ok(Self::new(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }
}

impl TryFrom<String> for Rgb {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Rgb> for String {
    fn from(color: Rgb) -> Self {
        color.to_string()
    }
}

/// Ordinal colour scale: group `i` gets `colors[i % len]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Palette {
    pub name: String,
    pub colors: Vec<Rgb>,
}

impl Palette {
    fn from_scheme(name: &str, scheme: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            colors: scheme.iter().filter_map(|hex| hex.parse().ok()).collect(),
        }
    }

    pub fn color(&self, ordinal: usize) -> Rgb {
        if self.colors.is_empty() {
            return Rgb::new(0x99, 0x99, 0x99);
        }
        self.colors[ordinal % self.colors.len()]
    }

    pub fn set1() -> Self {
        Self::from_scheme("set1", &SCHEME_SET1)
    }

    pub fn accent() -> Self {
        Self::from_scheme("accent", &SCHEME_ACCENT)
    }

    pub fn category10() -> Self {
        Self::from_scheme("category10", &SCHEME_CATEGORY10)
    }

    pub fn set2() -> Self {
        Self::from_scheme("set2", &SCHEME_SET2)
    }

    pub fn set3() -> Self {
        Self::from_scheme("set3", &SCHEME_SET3)
    }

    pub fn tableau10() -> Self {
        Self::from_scheme("tableau10", &SCHEME_TABLEAU10)
    }

    pub fn by_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "set1" => Some(Self::set1()),
            "accent" => Some(Self::accent()),
            "category10" => Some(Self::category10()),
            "set2" => Some(Self::set2()),
            "set3" => Some(Self::set3()),
            "tableau10" => Some(Self::tableau10()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    pub font_family: String,
    pub font_size: f32,
    pub label_font_size: f32,
    pub background: String,
    pub axis_color: String,
    pub group_fill: String,
    pub group_stroke: String,
    pub mask_color: Rgb,
    pub mask_opacity: f32,
    /// Indexed by layer, not by row.
    pub palettes: [Palette; LAYER_COUNT],
}

impl Theme {
    pub fn classic() -> Self {
        Self {
            font_family: "Inter, Segoe UI, system-ui, -apple-system, sans-serif".to_string(),
            font_size: 12.0,
            label_font_size: 10.0,
            background: "#FFFFFF".to_string(),
            axis_color: "#333333".to_string(),
            group_fill: "rgba(255,255,255,0.1)".to_string(),
            group_stroke: "#FFFFFF".to_string(),
            mask_color: Rgb::WHITE,
            mask_opacity: 0.7,
            palettes: [
                Palette::set1(),
                Palette::accent(),
                Palette::category10(),
                Palette::set2(),
                Palette::set3(),
                Palette::tableau10(),
            ],
        }
    }

    pub fn dark() -> Self {
        Self {
            background: "#111827".to_string(),
            axis_color: "#D1D5DB".to_string(),
            group_fill: "rgba(17,24,39,0.1)".to_string(),
            group_stroke: "#374151".to_string(),
            mask_color: Rgb::new(17, 24, 39),
            mask_opacity: 0.75,
            ..Self::classic()
        }
    }

    pub fn palette(&self, layer: Layer) -> &Palette {
        &self.palettes[layer.index()]
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::classic()
    }
}
