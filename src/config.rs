use crate::ir::{LAYER_COUNT, Layer, LayerOrder};
use crate::theme::{Palette, Rgb, Theme};
use serde::{Deserialize, Serialize};
use std::path::Path;

const INSTANCE_ROOT_LABELS: [&str; 3] = [
    "ns0__artisticFeatureBrocade",
    "ns0__artisticFeatureEmbroidery",
    "ns0__artisticFeatureNewYearPicture",
];

/// Type tags and property keys of the source graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelVocabulary {
    pub instance_roots: Vec<String>,
    pub text: String,
    pub category: String,
    pub sub_subject: String,
    pub subject: String,
    pub category_name_key: String,
    pub display_value_key: String,
    pub description_key: String,
    pub lexicon_key: String,
    pub lexical_density_key: String,
}

impl Default for LabelVocabulary {
    fn default() -> Self {
        Self {
            instance_roots: INSTANCE_ROOT_LABELS
                .iter()
                .map(|label| label.to_string())
                .collect(),
            text: "ns0__artisticFeatureDescription".to_string(),
            category: "ns0__artisticFeatureFeatureType".to_string(),
            sub_subject: "ns0__artisticFeatureSubSubject".to_string(),
            subject: "ns0__artisticFeatureSubject".to_string(),
            category_name_key: "ns1__name".to_string(),
            display_value_key: "rdf__value".to_string(),
            description_key: "ns2__description".to_string(),
            lexicon_key: "ns0__artisticFeaturelexic".to_string(),
            lexical_density_key: "ns0__artisticFeaturelexicalDensity".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutConfig {
    pub width: f32,
    pub height: f32,
    pub padding: f32,
    pub left_extra: f32,
    pub group_padding: f32,
    pub group_gap: f32,
    pub dot_radius: f32,
    pub overlap_gap: f32,
    pub max_node_gap: f32,
    pub layer_names: [String; LAYER_COUNT],
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            width: 1200.0,
            height: 800.0,
            padding: 64.0,
            left_extra: 16.0,
            group_padding: 0.4,
            group_gap: 9.0,
            dot_radius: 2.0,
            overlap_gap: 0.3,
            max_node_gap: 6.0,
            layer_names: Layer::ALL.map(|layer| layer.default_name().to_string()),
        }
    }
}

impl LayoutConfig {
    pub fn row_spacing(&self) -> f32 {
        (self.height - 2.0 * self.padding) / (LAYER_COUNT - 1) as f32
    }

    /// Axis position of a row.
    pub fn row_axis_y(&self, row: usize) -> f32 {
        self.padding + self.row_spacing() * row as f32
    }

    /// Centre line of the dots in a row.
    pub fn row_y(&self, row: usize) -> f32 {
        self.row_axis_y(row) + self.group_padding
    }

    /// Horizontal span a row is centred in.
    pub fn line_start(&self) -> f32 {
        self.padding + self.left_extra
    }

    pub fn line_extent(&self) -> f32 {
        self.width - self.left_extra - 2.0 * self.padding
    }

    pub fn layer_name(&self, layer: Layer) -> &str {
        &self.layer_names[layer.index()]
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    pub background: String,
    pub scale: f32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            background: "#FFFFFF".to_string(),
            scale: 1.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub theme: Theme,
    pub layout: LayoutConfig,
    pub render: RenderConfig,
    pub vocabulary: LabelVocabulary,
    pub layer_order: LayerOrder,
}

impl Default for Config {
    fn default() -> Self {
        let theme = Theme::classic();
        let render = RenderConfig {
            background: theme.background.clone(),
            ..Default::default()
        };
        Self {
            theme,
            layout: LayoutConfig::default(),
            render,
            vocabulary: LabelVocabulary::default(),
            layer_order: LayerOrder::default(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ThemeVariables {
    font_family: Option<String>,
    font_size: Option<f32>,
    label_font_size: Option<f32>,
    background: Option<String>,
    axis_color: Option<String>,
    group_fill: Option<String>,
    group_stroke: Option<String>,
    mask_color: Option<String>,
    mask_opacity: Option<f32>,
    /// Palette names keyed by layer index.
    palettes: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LayoutConfigFile {
    width: Option<f32>,
    height: Option<f32>,
    padding: Option<f32>,
    left_extra: Option<f32>,
    group_padding: Option<f32>,
    group_gap: Option<f32>,
    dot_radius: Option<f32>,
    overlap_gap: Option<f32>,
    max_node_gap: Option<f32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RenderConfigFile {
    background: Option<String>,
    scale: Option<f32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VocabularyFile {
    instance_roots: Option<Vec<String>>,
    text: Option<String>,
    category: Option<String>,
    sub_subject: Option<String>,
    subject: Option<String>,
    category_name_key: Option<String>,
    display_value_key: Option<String>,
    description_key: Option<String>,
    lexicon_key: Option<String>,
    lexical_density_key: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    theme: Option<String>,
    theme_variables: Option<ThemeVariables>,
    layout: Option<LayoutConfigFile>,
    render: Option<RenderConfigFile>,
    vocabulary: Option<VocabularyFile>,
    layer_names: Option<Vec<String>>,
    layer_order: Option<LayerOrder>,
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let contents = std::fs::read_to_string(path)?;
    Ok(parse_config(&contents)?)
}

/// Merges a JSON5 override document over the defaults.
pub fn parse_config(contents: &str) -> crate::error::Result<Config> {
    let mut config = Config::default();
    let parsed: ConfigFile = json5::from_str(contents)?;

    if let Some(theme_name) = parsed.theme.as_deref() {
        if theme_name == "dark" {
            config.theme = Theme::dark();
        } else if theme_name == "classic" || theme_name == "default" {
            config.theme = Theme::classic();
        } else {
            tracing::warn!(theme = theme_name, "unknown theme, keeping classic");
        }
    }

    if let Some(vars) = parsed.theme_variables {
        if let Some(v) = vars.font_family {
            config.theme.font_family = v;
        }
        if let Some(v) = vars.font_size {
            config.theme.font_size = v;
        }
        if let Some(v) = vars.label_font_size {
            config.theme.label_font_size = v;
        }
        if let Some(v) = vars.background {
            config.theme.background = v;
        }
        if let Some(v) = vars.axis_color {
            config.theme.axis_color = v;
        }
        if let Some(v) = vars.group_fill {
            config.theme.group_fill = v;
        }
        if let Some(v) = vars.group_stroke {
            config.theme.group_stroke = v;
        }
        if let Some(v) = vars.mask_color {
            match v.parse::<Rgb>() {
                Ok(color) => config.theme.mask_color = color,
                Err(err) => tracing::warn!(%err, "ignoring maskColor"),
            }
        }
        if let Some(v) = vars.mask_opacity {
            config.theme.mask_opacity = v.clamp(0.0, 1.0);
        }
        if let Some(names) = vars.palettes {
            for (index, name) in names.iter().enumerate().take(LAYER_COUNT) {
                match Palette::by_name(name) {
                    Some(palette) => config.theme.palettes[index] = palette,
                    None => tracing::warn!(palette = %name, "unknown palette"),
                }
            }
        }
    }

    if let Some(layout) = parsed.layout {
        if let Some(v) = layout.width {
            config.layout.width = v;
        }
        if let Some(v) = layout.height {
            config.layout.height = v;
        }
        if let Some(v) = layout.padding {
            config.layout.padding = v;
        }
        if let Some(v) = layout.left_extra {
            config.layout.left_extra = v;
        }
        if let Some(v) = layout.group_padding {
            config.layout.group_padding = v;
        }
        if let Some(v) = layout.group_gap {
            config.layout.group_gap = v;
        }
        if let Some(v) = layout.dot_radius {
            config.layout.dot_radius = v;
        }
        if let Some(v) = layout.overlap_gap {
            config.layout.overlap_gap = v.max(0.0);
        }
        if let Some(v) = layout.max_node_gap {
            config.layout.max_node_gap = v.max(0.0);
        }
    }

    if let Some(names) = parsed.layer_names {
        for (index, name) in names.into_iter().enumerate().take(LAYER_COUNT) {
            config.layout.layer_names[index] = name;
        }
    }

    if let Some(vocab) = parsed.vocabulary {
        if let Some(v) = vocab.instance_roots {
            config.vocabulary.instance_roots = v;
        }
        if let Some(v) = vocab.text {
            config.vocabulary.text = v;
        }
        if let Some(v) = vocab.category {
            config.vocabulary.category = v;
        }
        if let Some(v) = vocab.sub_subject {
            config.vocabulary.sub_subject = v;
        }
        if let Some(v) = vocab.subject {
            config.vocabulary.subject = v;
        }
        if let Some(v) = vocab.category_name_key {
            config.vocabulary.category_name_key = v;
        }
        if let Some(v) = vocab.display_value_key {
            config.vocabulary.display_value_key = v;
        }
        if let Some(v) = vocab.description_key {
            config.vocabulary.description_key = v;
        }
        if let Some(v) = vocab.lexicon_key {
            config.vocabulary.lexicon_key = v;
        }
        if let Some(v) = vocab.lexical_density_key {
            config.vocabulary.lexical_density_key = v;
        }
    }

    if let Some(order) = parsed.layer_order {
        config.layer_order = order;
    }

    config.render.background = config.theme.background.clone();
    if let Some(render) = parsed.render {
        if let Some(v) = render.background {
            config.render.background = v;
        }
        if let Some(v) = render.scale {
            if v > 0.0 {
                config.render.scale = v;
            } else {
                tracing::warn!(scale = v, "ignoring non-positive render scale");
            }
        }
    }

    Ok(config)
}
