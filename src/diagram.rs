use crate::config::Config;
use crate::error::Result;
use crate::highlight::Emphasis;
use crate::ir::{LayerOrder, PathId, PathModel, RawPath, parse_raw_paths};
use crate::layout::{Layout, compute_layout};
use crate::normalize::normalize_paths;
use crate::panel::{PathDetails, describe_paths};
use crate::render::render_svg;

/// Raw input plus everything derived from it.
///
/// Changing the paths, the layer order or the viewport rebuilds the path
/// models and the layout from scratch.
#[derive(Debug, Clone)]
pub struct Diagram {
    config: Config,
    raw: Vec<RawPath>,
    paths: Vec<PathModel>,
    layout: Layout,
}

impl Diagram {
    pub fn new(raw: Vec<RawPath>, config: Config) -> Self {
        let (paths, layout) = rebuild(&raw, &config);
        Self {
            config,
            raw,
            paths,
            layout,
        }
    }

    pub fn from_json(input: &str, config: Config) -> Result<Self> {
        Ok(Self::new(parse_raw_paths(input)?, config))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn paths(&self) -> &[PathModel] {
        &self.paths
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn order(&self) -> &LayerOrder {
        &self.config.layer_order
    }

    pub fn set_paths(&mut self, raw: Vec<RawPath>) {
        self.raw = raw;
        self.refresh();
    }

    pub fn set_order(&mut self, order: LayerOrder) {
        if order == self.config.layer_order {
            return;
        }
        tracing::debug!(order = ?order.indices(), "layer order changed");
        self.config.layer_order = order;
        self.refresh();
    }

    pub fn set_viewport(&mut self, width: f32, height: f32) {
        if width == self.config.layout.width && height == self.config.layout.height {
            return;
        }
        self.config.layout.width = width;
        self.config.layout.height = height;
        self.refresh();
    }

    pub fn render_svg(&self, emphasis: &Emphasis) -> String {
        render_svg(&self.layout, &self.config, emphasis)
    }

    pub fn describe(&self, ids: &[PathId], keyword: Option<&str>) -> Vec<PathDetails> {
        describe_paths(
            &self.paths,
            ids,
            &self.config.layer_order,
            &self.config.layout,
            &self.config.vocabulary,
            keyword,
        )
    }

    fn refresh(&mut self) {
        let (paths, layout) = rebuild(&self.raw, &self.config);
        self.paths = paths;
        self.layout = layout;
    }
}

fn rebuild(raw: &[RawPath], config: &Config) -> (Vec<PathModel>, Layout) {
    let paths = normalize_paths(raw, &config.vocabulary);
    let layout = compute_layout(
        &paths,
        &config.layer_order,
        &config.theme,
        &config.layout,
        &config.vocabulary,
    );
    (paths, layout)
}
