use path_layers::highlight::{Emphasis, FocusTarget, HighlightController, Transition, resolve_focus};
use path_layers::ir::{LayerOrder, PathId};
use path_layers::{LayoutDump, RenderOptions, layout_with_options, render_with_options};
use serde::Deserialize;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PathRenderOptions {
    theme: Option<String>,
    font_family: Option<String>,
    font_size: Option<f32>,
    width: Option<f32>,
    height: Option<f32>,
    order: Option<Vec<usize>>,
}

fn parse_options(options_json: Option<String>) -> Result<PathRenderOptions, String> {
    match options_json {
        Some(raw_options) => serde_json::from_str(&raw_options).map_err(|error| error.to_string()),
        None => Ok(PathRenderOptions::default()),
    }
}

fn build_render_options(options: PathRenderOptions) -> Result<RenderOptions, String> {
    let mut render_options = if options.theme.as_deref() == Some("dark") {
        RenderOptions::dark()
    } else {
        RenderOptions::classic()
    };

    if let Some(font_family) = options.font_family {
        render_options.theme.font_family = font_family;
    }
    if let Some(font_size) = options.font_size {
        render_options.theme.font_size = font_size;
    }
    if let Some(width) = options.width {
        render_options.layout.width = width;
    }
    if let Some(height) = options.height {
        render_options.layout.height = height;
    }
    if let Some(order) = options.order {
        render_options.order = LayerOrder::new(&order).map_err(|error| error.to_string())?;
    }

    Ok(render_options)
}

fn to_js(error: impl ToString) -> JsValue {
    JsValue::from_str(&error.to_string())
}

#[wasm_bindgen]
pub fn layout_paths(json: &str, options_json: Option<String>) -> Result<String, JsValue> {
    let options = build_render_options(parse_options(options_json).map_err(to_js)?).map_err(to_js)?;
    let dump = layout_with_options(json, options).map_err(to_js)?;
    serde_json::to_string(&dump).map_err(to_js)
}

#[wasm_bindgen]
pub fn render_paths_svg(json: &str, options_json: Option<String>) -> Result<String, JsValue> {
    let options = build_render_options(parse_options(options_json).map_err(to_js)?).map_err(to_js)?;
    render_with_options(json, options).map_err(to_js)
}

type Observer = Box<dyn FnMut(&[PathId])>;

/// Interactive diagram: rebuilds on input changes and turns pointer focus
/// into JSON transition instructions.
#[wasm_bindgen]
pub struct Diagram {
    inner: path_layers::Diagram,
    controller: HighlightController<Observer>,
    touched: Rc<RefCell<Vec<PathId>>>,
}

impl Diagram {
    fn build(json: &str, options: RenderOptions) -> Result<Self, String> {
        let inner =
            path_layers::Diagram::from_json(json, options.into_config()).map_err(|error| error.to_string())?;
        let touched = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&touched);
        let observer: Observer = Box::new(move |paths: &[PathId]| {
            *sink.borrow_mut() = paths.to_vec();
        });
        let controller = HighlightController::new(inner.config().theme.mask_opacity, observer);
        Ok(Self {
            inner,
            controller,
            touched,
        })
    }

    fn focus(&mut self, target: FocusTarget<'_>) -> Option<Transition> {
        let focus = resolve_focus(self.inner.layout(), target)?;
        Some(self.controller.on_focus(&focus))
    }

    fn reset(&mut self) {
        self.controller.on_unfocus();
        self.touched.borrow_mut().clear();
    }
}

fn transition_json(transition: Option<Transition>) -> Result<String, JsValue> {
    match transition {
        Some(transition) => serde_json::to_string(&transition).map_err(to_js),
        None => Ok("null".to_string()),
    }
}

#[wasm_bindgen]
impl Diagram {
    #[wasm_bindgen(constructor)]
    pub fn new(json: &str, options_json: Option<String>) -> Result<Diagram, JsValue> {
        let options = build_render_options(parse_options(options_json).map_err(to_js)?).map_err(to_js)?;
        Diagram::build(json, options).map_err(to_js)
    }

    pub fn set_order(&mut self, order: Vec<u32>) -> Result<(), JsValue> {
        let indices: Vec<usize> = order.into_iter().map(|index| index as usize).collect();
        let order = LayerOrder::new(&indices).map_err(to_js)?;
        self.reset();
        self.inner.set_order(order);
        Ok(())
    }

    pub fn set_viewport(&mut self, width: f32, height: f32) {
        self.reset();
        self.inner.set_viewport(width, height);
    }

    pub fn layout(&self) -> Result<String, JsValue> {
        serde_json::to_string(&LayoutDump::from_layout(self.inner.layout())).map_err(to_js)
    }

    pub fn render_svg(&self) -> String {
        self.inner.render_svg(&self.controller.emphasis())
    }

    pub fn render_idle_svg(&self) -> String {
        self.inner.render_svg(&Emphasis::idle())
    }

    /// Focuses the `index`-th node drawn in `row`. Returns `null` for unknown targets.
    pub fn focus_node(&mut self, row: usize, index: usize) -> Result<String, JsValue> {
        let node = self
            .inner
            .layout()
            .layers
            .get(row)
            .and_then(|layer| layer.nodes.get(index))
            .map(|node| node.node);
        let transition = node.and_then(|node| self.focus(FocusTarget::Node(node)));
        transition_json(transition)
    }

    pub fn focus_edge(&mut self, identity: &str) -> Result<String, JsValue> {
        let transition = self.focus(FocusTarget::Edge(identity));
        transition_json(transition)
    }

    pub fn focus_group(&mut self, row: usize, index: usize) -> Result<String, JsValue> {
        let transition = self.focus(FocusTarget::Group { row, index });
        transition_json(transition)
    }

    pub fn unfocus(&mut self) -> Result<String, JsValue> {
        let transition = self.controller.on_unfocus();
        serde_json::to_string(&transition).map_err(to_js)
    }

    /// Side-panel cards for the paths touched by the latest focus.
    pub fn focused_paths(&self, keyword: Option<String>) -> Result<String, JsValue> {
        let touched = self.touched.borrow();
        let details = self.inner.describe(&touched, keyword.as_deref());
        serde_json::to_string(&details).map_err(to_js)
    }
}
