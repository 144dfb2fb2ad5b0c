use crate::config::{Config, LayoutConfig, RenderConfig};
use crate::highlight::{Emphasis, RAISED_CLASSES};
use crate::ir::{Layer, class_safe};
use crate::layout::{GroupRect, Layout, PlacedNode, Relation};
use crate::theme::Theme;
use anyhow::Result;
use std::path::Path;

const STYLE: &str = ".relation{fill:none;stroke-opacity:0.6;stroke-width:1}\
.relation.highlighting,.relation.highlighting_group{stroke-opacity:1;stroke-width:1.6}\
.node.highlighting,.node.highlighting_group{stroke:#000;stroke-width:0.6}\
.group-rect.highlighting_group{stroke-width:1.6}\
.mask{pointer-events:none}";

/// Draws the layout. Elements whose tags are emphasised are drawn after the
/// mask so they stay visible above it.
pub fn render_svg(layout: &Layout, config: &Config, emphasis: &Emphasis) -> String {
    let theme = &config.theme;
    let geometry = &config.layout;
    let width = layout.width.max(200.0);
    let height = layout.height.max(200.0);

    let mut svg = String::new();
    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\">",
    ));
    svg.push_str(&format!("<style>{STYLE}</style>"));
    svg.push_str(&format!(
        "<rect width=\"100%\" height=\"100%\" fill=\"{}\"/>",
        escape_xml(&config.render.background)
    ));

    svg.push_str("<defs>");
    for relation in &layout.relations {
        if let Some(gradient) = relation_gradient(layout, relation) {
            svg.push_str(&gradient);
        }
    }
    svg.push_str("</defs>");

    svg.push_str(&row_axes(layout, theme, geometry));

    let mut below = String::new();
    let mut above = String::new();

    for relation in &layout.relations {
        let Some(d) = relation_path(layout, relation) else {
            continue;
        };
        let classes = emphasis.classes_for(std::slice::from_ref(&relation.path_tag));
        let element = format!(
            "<path class=\"relation {}{}\" d=\"{d}\" stroke=\"url(#rlg-{})\"/>",
            relation.path_tag,
            class_suffix(&classes),
            class_safe(&relation.identity)
        );
        target(&classes, &mut below, &mut above).push_str(&element);
    }

    // Labels stay above every rect and dot of their own side of the mask.
    let mut labels_below = String::new();
    let mut labels_above = String::new();

    for layer in &layout.layers {
        for group in &layer.groups {
            let classes = emphasis.classes_for(&group.tags);
            let element = group_rect_svg(group, layer.layer, theme, &classes);
            target(&classes, &mut below, &mut above).push_str(&element);
            let label = group_label_svg(group, theme, &classes);
            target(&classes, &mut labels_below, &mut labels_above).push_str(&label);
        }
        for node in &layer.nodes {
            let classes = emphasis.classes_for(std::slice::from_ref(&node.path_tag));
            let element = node_svg(node, geometry, &classes);
            target(&classes, &mut below, &mut above).push_str(&element);
        }
    }

    svg.push_str(&below);
    svg.push_str(&labels_below);

    svg.push_str(&format!(
        "<rect class=\"mask\" x=\"0\" y=\"0\" width=\"{width}\" height=\"{height}\" fill=\"{}\"/>",
        theme.mask_color.with_opacity(emphasis.mask_opacity)
    ));
    svg.push_str(&above);
    svg.push_str(&labels_above);

    svg.push_str("</svg>");
    svg
}

fn target<'a>(classes: &[&str], below: &'a mut String, above: &'a mut String) -> &'a mut String {
    if classes.is_empty() { below } else { above }
}

fn class_suffix(classes: &[&str]) -> String {
    classes.iter().map(|class| format!(" {class}")).collect()
}

fn relation_gradient(layout: &Layout, relation: &Relation) -> Option<String> {
    let source = layout.node(&relation.source)?;
    let target = layout.node(&relation.target)?;
    Some(format!(
        "<linearGradient id=\"rlg-{}\" gradientUnits=\"userSpaceOnUse\" x1=\"{:.2}\" y1=\"{:.2}\" x2=\"{:.2}\" y2=\"{:.2}\"><stop offset=\"0%\" stop-color=\"{}\"/><stop offset=\"100%\" stop-color=\"{}\"/></linearGradient>",
        class_safe(&relation.identity),
        source.x,
        source.y,
        target.x,
        target.y,
        source.color,
        target.color
    ))
}

/// Vertical cubic link between the two endpoint dots.
fn relation_path(layout: &Layout, relation: &Relation) -> Option<String> {
    let source = layout.node(&relation.source)?;
    let target = layout.node(&relation.target)?;
    let mid = (source.y + target.y) / 2.0;
    Some(format!(
        "M {:.2} {:.2} C {:.2} {mid:.2} {:.2} {mid:.2} {:.2} {:.2}",
        source.x, source.y, source.x, target.x, target.x, target.y
    ))
}

fn row_axes(layout: &Layout, theme: &Theme, config: &LayoutConfig) -> String {
    let mut svg = String::new();
    let start = config.line_start();
    let end = start + config.line_extent();
    for (row, layer) in layout.order.layers().iter().enumerate() {
        let y = config.row_y(row);
        svg.push_str(&format!(
            "<line class=\"row-guide\" x1=\"{start:.2}\" y1=\"{y:.2}\" x2=\"{end:.2}\" y2=\"{y:.2}\" stroke=\"{}\" stroke-opacity=\"0.15\" stroke-width=\"0.5\"/>",
            theme.axis_color
        ));
        svg.push_str(&format!(
            "<text class=\"layer-label\" x=\"{:.2}\" y=\"{y:.2}\" dy=\"0.32em\" text-anchor=\"end\" font-family=\"{}\" font-size=\"{}\" fill=\"{}\">{}</text>",
            start - 8.0,
            escape_xml(&theme.font_family),
            theme.font_size,
            theme.axis_color,
            escape_xml(config.layer_name(*layer))
        ));
    }
    svg
}

// Text rows only outline their groups; other rows fill them.
fn group_rect_svg(group: &GroupRect, layer: Layer, theme: &Theme, classes: &[&str]) -> String {
    let (fill, stroke) = match layer {
        Layer::Text => ("none".to_string(), group.color.to_string()),
        _ => (
            escape_xml(&theme.group_fill),
            group.color.darker(0.5).to_string(),
        ),
    };
    format!(
        "<rect class=\"{} {}{}\" x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" rx=\"1\" fill=\"{fill}\" stroke=\"{stroke}\" stroke-width=\"0.6\"/>",
        RAISED_CLASSES[0],
        group.class_list(),
        class_suffix(classes),
        group.x,
        group.y,
        group.width,
        group.height
    )
}

fn group_label_svg(group: &GroupRect, theme: &Theme, classes: &[&str]) -> String {
    if group.name.is_empty() {
        return String::new();
    }
    format!(
        "<text class=\"{} {}{}\" x=\"{:.2}\" y=\"{:.2}\" text-anchor=\"middle\" font-family=\"{}\" font-size=\"{}\" fill=\"{}\">{}</text>",
        RAISED_CLASSES[1],
        group.class_list(),
        class_suffix(classes),
        group.x + group.width / 2.0,
        group.y - 3.0,
        escape_xml(&theme.font_family),
        theme.label_font_size,
        group.color.darker(1.0),
        escape_xml(&group.name)
    )
}

fn node_svg(node: &PlacedNode, config: &LayoutConfig, classes: &[&str]) -> String {
    format!(
        "<circle class=\"node {}{}\" cx=\"{:.2}\" cy=\"{:.2}\" r=\"{}\" fill=\"{}\"/>",
        node.path_tag,
        class_suffix(classes),
        node.x,
        node.y,
        config.dot_radius,
        node.color
    )
}

pub fn write_output_svg(svg: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, svg)?;
        }
        None => {
            print!("{}", svg);
        }
    }
    Ok(())
}

#[cfg(feature = "png")]
pub fn write_output_png(svg: &str, output: &Path, render_cfg: &RenderConfig, theme: &Theme) -> Result<()> {
    let mut opt = usvg::Options::default();
    opt.font_family = theme
        .font_family
        .split(',')
        .next()
        .map(|family| family.trim().to_string())
        .unwrap_or_else(|| "Inter".to_string());
    opt.fontdb_mut().load_system_fonts();

    let tree = usvg::Tree::from_str(svg, &opt)?;
    let scale = render_cfg.scale.max(0.1);
    let size = tree.size().to_int_size().scale_by(scale).ok_or_else(|| {
        anyhow::anyhow!("Invalid output size at scale {scale}")
    })?;
    let mut pixmap = resvg::tiny_skia::Pixmap::new(size.width(), size.height())
        .ok_or_else(|| anyhow::anyhow!("Failed to allocate pixmap"))?;

    let mut pixmap_mut = pixmap.as_mut();
    resvg::render(
        &tree,
        resvg::tiny_skia::Transform::from_scale(scale, scale),
        &mut pixmap_mut,
    );
    pixmap.save_png(output)?;
    Ok(())
}

#[cfg(not(feature = "png"))]
pub fn write_output_png(_svg: &str, _output: &Path, _render_cfg: &RenderConfig, _theme: &Theme) -> Result<()> {
    Err(anyhow::anyhow!("PNG output requires the `png` feature"))
}

fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagram::Diagram;
    use crate::highlight::{FocusTarget, HighlightController, resolve_focus};

    const INPUT: &str = r#"[
        {"segments": [
            {"start": {"identity": 1, "labels": ["ns0__artisticFeatureBrocade"], "properties": {"ns1__name": "Brocade & Silk"}},
             "end": {"identity": 10, "labels": ["ns0__artisticFeatureDescription"], "properties": {}}},
            {"start": {"identity": 10, "labels": [], "properties": {}},
             "end": {"identity": 40, "labels": ["ns0__artisticFeatureSubject"], "properties": {"rdf__value": "nature"}}}
        ]},
        {"segments": [
            {"start": {"identity": 2, "labels": ["ns0__artisticFeatureEmbroidery"], "properties": {"ns1__name": "Embroidery"}},
             "end": {"identity": 11, "labels": ["ns0__artisticFeatureDescription"], "properties": {}}},
            {"start": {"identity": 11, "labels": [], "properties": {}},
             "end": {"identity": 41, "labels": ["ns0__artisticFeatureSubject"], "properties": {"rdf__value": "water"}}}
        ]}
    ]"#;

    fn class_attributes(svg: &str) -> impl Iterator<Item = &str> {
        svg.split("class=\"")
            .skip(1)
            .filter_map(|rest| rest.split('"').next())
    }

    #[test]
    fn renders_rows_relations_and_groups() {
        let diagram = Diagram::from_json(INPUT, Config::default()).unwrap();
        let svg = diagram.render_svg(&Emphasis::idle());
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("id=\"rlg-1040\""));
        assert!(svg.contains("stroke=\"url(#rlg-1040)\""));
        assert!(svg.contains("class=\"relation pc10_____40\""));
        assert!(svg.contains("Brocade &amp; Silk"));
        assert!(svg.contains(">Subject</text>"));
        assert!(svg.contains("fill=\"rgba(255, 255, 255, 0)\""));
        assert!(class_attributes(&svg).all(|classes| !classes.contains("highlighting")));
    }

    #[test]
    fn emphasised_elements_are_drawn_above_the_mask() {
        let diagram = Diagram::from_json(INPUT, Config::default()).unwrap();
        let mut controller = HighlightController::detached(0.7);
        let focus = resolve_focus(diagram.layout(), FocusTarget::Edge("1141")).unwrap();
        controller.on_focus(&focus);
        let svg = diagram.render_svg(&controller.emphasis());

        let mask = svg.find("class=\"mask\"").unwrap();
        let emphasised = svg.find("class=\"relation pc11_____41 highlighting\"").unwrap();
        let plain = svg.find("class=\"relation pc10_____40\"").unwrap();
        assert!(plain < mask);
        assert!(emphasised > mask);
        assert!(svg.contains("fill=\"rgba(255, 255, 255, 0.7)\""));
    }

    #[test]
    fn focused_group_label_is_drawn_above_the_mask() {
        let diagram = Diagram::from_json(INPUT, Config::default()).unwrap();
        let mut controller = HighlightController::detached(0.7);
        let focus = resolve_focus(diagram.layout(), FocusTarget::Group { row: 0, index: 0 }).unwrap();
        controller.on_focus(&focus);
        let svg = diagram.render_svg(&controller.emphasis());

        let mask = svg.find("class=\"mask\"").unwrap();
        let focused = svg
            .find("class=\"group-label pc10_____40 highlighting_group\"")
            .unwrap();
        let other = svg.find("class=\"group-label pc11_____41\"").unwrap();
        assert!(focused > mask);
        assert!(other < mask);
        assert!(svg[focused..].contains("Brocade &amp; Silk"));
        assert!(class_attributes(&svg).any(|classes| classes == "mask"));
    }

    #[test]
    fn empty_input_renders_axes_only() {
        let diagram = Diagram::from_json("[]", Config::default()).unwrap();
        let svg = diagram.render_svg(&Emphasis::idle());
        assert_eq!(svg.matches("class=\"layer-label\"").count(), 6);
        assert!(!svg.contains("<circle"));
    }
}
