#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod diagram;
pub mod error;
pub mod highlight;
pub mod ir;
pub mod layout;
pub mod layout_dump;
pub mod normalize;
pub mod panel;
pub mod render;
pub mod theme;

#[cfg(feature = "cli")]
pub use cli::run;
pub use config::Config;
pub use diagram::Diagram;
pub use error::{Error, LayerOrderError, Result};
pub use highlight::{Emphasis, Focus, FocusTarget, HighlightController, Transition, resolve_focus};
pub use ir::{Layer, LayerOrder, PathId, PathModel};
pub use layout::{Layout, compute_layout};
pub use layout_dump::LayoutDump;

use config::{LabelVocabulary, LayoutConfig};
use theme::Theme;

/// Options for the one-shot entry points.
#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    pub theme: Theme,
    pub layout: LayoutConfig,
    pub vocabulary: LabelVocabulary,
    pub order: LayerOrder,
}

impl RenderOptions {
    pub fn classic() -> Self {
        Self::default()
    }

    pub fn dark() -> Self {
        Self {
            theme: Theme::dark(),
            ..Self::default()
        }
    }

    pub fn with_order(mut self, order: LayerOrder) -> Self {
        self.order = order;
        self
    }

    pub fn into_config(self) -> Config {
        let mut config = Config {
            theme: self.theme,
            layout: self.layout,
            vocabulary: self.vocabulary,
            layer_order: self.order,
            ..Config::default()
        };
        config.render.background = config.theme.background.clone();
        config
    }
}

impl From<Config> for RenderOptions {
    fn from(config: Config) -> Self {
        Self {
            theme: config.theme,
            layout: config.layout,
            vocabulary: config.vocabulary,
            order: config.layer_order,
        }
    }
}

/// Parses query paths and renders the idle diagram as SVG.
pub fn render_with_options(input: &str, options: RenderOptions) -> Result<String> {
    let diagram = Diagram::from_json(input, options.into_config())?;
    Ok(diagram.render_svg(&Emphasis::idle()))
}

/// Parses query paths and returns the renderer contract.
pub fn layout_with_options(input: &str, options: RenderOptions) -> Result<LayoutDump> {
    let diagram = Diagram::from_json(input, options.into_config())?;
    Ok(LayoutDump::from_layout(diagram.layout()))
}
