use super::types::{GroupRect, LayerLayout, PlacedNode};
use crate::config::{LabelVocabulary, LayoutConfig};
use crate::ir::{Layer, Node, NodeRef};
use crate::theme::Palette;
use std::collections::HashMap;

/// One node scheduled into a row.
#[derive(Debug, Clone, Copy)]
pub struct LayerEntry<'a> {
    pub node: &'a Node,
    pub node_ref: NodeRef,
    pub index_in_path: usize,
    pub path_tag: &'a str,
}

#[derive(Debug, Clone, Copy)]
pub struct LayerSpec<'a> {
    pub row: usize,
    pub layer: Layer,
    /// Packs group members almost on top of each other.
    pub overlap: bool,
    pub palette: &'a Palette,
}

/// Text nodes group by the name of the instance category that seeded them;
/// every other layer groups by its own display value.
pub fn group_key(node: &Node, layer: Layer, vocabulary: &LabelVocabulary) -> String {
    match layer {
        Layer::Text => node
            .instance
            .as_ref()
            .and_then(|instance| instance.name.clone())
            .unwrap_or_default(),
        _ => node
            .property_text(&vocabulary.display_value_key)
            .unwrap_or_default(),
    }
}

/// Partitions by key, keeping keys and members in first-seen order.
pub fn group_entries<'a, K>(entries: &[LayerEntry<'a>], key: K) -> Vec<(String, Vec<LayerEntry<'a>>)>
where
    K: Fn(&Node) -> String,
{
    let mut groups: Vec<(String, Vec<LayerEntry<'a>>)> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();
    for entry in entries {
        let name = key(entry.node);
        match positions.get(&name) {
            Some(&index) => groups[index].1.push(*entry),
            None => {
                positions.insert(name.clone(), groups.len());
                groups.push((name, vec![*entry]));
            }
        }
    }
    groups
}

/// Horizontal distance between neighbouring dots of a group.
///
/// The even-spread gap divides the room left after padding and group chrome
/// by `nodes - 1`; a single node never divides and takes the maximum gap.
pub fn node_gap(node_count: usize, group_count: usize, overlap: bool, config: &LayoutConfig) -> f32 {
    let even = if node_count <= 1 {
        config.max_node_gap
    } else {
        let groups = group_count as f32;
        let available = config.width
            - (config.padding * 2.0 + config.left_extra)
            - (groups - 1.0).max(0.0) * config.group_gap
            - groups * 2.0 * config.group_padding * 1.5;
        let gap = available / (node_count - 1) as f32;
        if gap.is_finite() {
            gap.max(0.0).min(config.max_node_gap)
        } else {
            0.0
        }
    };
    if overlap {
        config.overlap_gap.min(even)
    } else {
        even
    }
}

fn group_span(members: usize, gap: f32, config: &LayoutConfig) -> f32 {
    2.0 * config.group_padding + members.saturating_sub(1) as f32 * gap + 2.0 * config.dot_radius
}

/// Fits group spans into the row extent. Returns the gap between groups and
/// the horizontal scale applied to every span.
///
/// The configured group gap shrinks first; once it reaches zero the whole
/// row is scaled down uniformly.
pub fn fit_row(spans: &[f32], config: &LayoutConfig) -> (f32, f32) {
    let extent = config.line_extent().max(0.0);
    let total: f32 = spans.iter().sum();
    let joins = spans.len().saturating_sub(1) as f32;
    let group_gap = config.group_gap.max(0.0);

    if total + joins * group_gap <= extent {
        (group_gap, 1.0)
    } else if total <= extent && joins > 0.0 {
        (((extent - total) / joins).max(0.0), 1.0)
    } else if total > 0.0 {
        (0.0, extent / total)
    } else {
        (0.0, 1.0)
    }
}

/// Packs one row: groups left to right separated by `group_gap`, members
/// spaced by the node gap inside each group, the whole line centred and
/// never wider than the row extent.
pub fn layout_layer<K>(
    entries: &[LayerEntry<'_>],
    key: K,
    spec: &LayerSpec<'_>,
    config: &LayoutConfig,
) -> LayerLayout
where
    K: Fn(&Node) -> String,
{
    if entries.is_empty() {
        return LayerLayout::empty(spec.row, spec.layer);
    }

    let groups = group_entries(entries, key);
    let natural_gap = node_gap(entries.len(), groups.len(), spec.overlap, config);
    let spans: Vec<f32> = groups
        .iter()
        .map(|(_, members)| group_span(members.len(), natural_gap, config))
        .collect();
    let (group_gap, scale) = fit_row(&spans, config);
    if scale < 1.0 || group_gap < config.group_gap {
        tracing::debug!(
            row = spec.row,
            groups = groups.len(),
            group_gap,
            scale,
            "compressed row to fit the drawing"
        );
    }

    let gap = natural_gap * scale;
    let padding = config.group_padding * scale;
    let radius = config.dot_radius * scale;
    let y = config.row_y(spec.row);

    let line_width: f32 = spans.iter().map(|span| span * scale).sum::<f32>()
        + group_gap * spans.len().saturating_sub(1) as f32;
    let line_offset = (config.line_extent().max(0.0) - line_width) / 2.0;

    let mut nodes = Vec::with_capacity(entries.len());
    let mut rects = Vec::with_capacity(groups.len());
    let mut cursor = config.line_start();

    for (ordinal, ((name, members), span)) in groups.into_iter().zip(&spans).enumerate() {
        let group_start = cursor + if ordinal == 0 { 0.0 } else { group_gap };
        let width = span * scale;
        let color = spec.palette.color(ordinal);

        for (index, entry) in members.iter().enumerate() {
            nodes.push(PlacedNode {
                node: entry.node_ref,
                identity: entry.node.identity.clone(),
                x: line_offset + group_start + padding + index as f32 * gap + radius,
                y,
                color,
                path_tag: entry.path_tag.to_string(),
                group: ordinal,
                index_in_path: entry.index_in_path,
            });
        }

        rects.push(GroupRect {
            x: line_offset + group_start,
            y: y - config.group_padding - config.dot_radius,
            width,
            height: 2.0 * (config.group_padding + config.dot_radius),
            name,
            color,
            tags: members.iter().map(|entry| entry.path_tag.to_string()).collect(),
            paths: members.iter().map(|entry| entry.node.path).collect(),
        });

        cursor = group_start + width;
    }

    tracing::trace!(
        row = spec.row,
        layer = ?spec.layer,
        nodes = nodes.len(),
        groups = rects.len(),
        gap,
        group_gap,
        "laid out row"
    );

    LayerLayout {
        row: spec.row,
        layer: spec.layer,
        node_gap: gap,
        group_gap,
        nodes,
        groups: rects,
    }
}
