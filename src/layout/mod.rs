mod layer;
mod relations;
pub(crate) mod types;
pub use layer::{LayerEntry, LayerSpec, fit_row, group_entries, group_key, layout_layer, node_gap};
pub use relations::{relation_identity, walk_path};
pub use types::*;

use crate::config::{LabelVocabulary, LayoutConfig};
use crate::ir::{LAYER_COUNT, Layer, LayerOrder, PathModel};
use crate::theme::Theme;
use std::collections::BTreeMap;

/// Full rebuild: walks every path in visitation order, then packs each row.
///
/// Rows are positions in `order`; the palette follows the layer shown in the
/// row. Nothing from a previous rebuild is reused.
pub fn compute_layout(
    paths: &[PathModel],
    order: &LayerOrder,
    theme: &Theme,
    config: &LayoutConfig,
    vocabulary: &LabelVocabulary,
) -> Layout {
    let mut rows: [Vec<LayerEntry<'_>>; LAYER_COUNT] = Default::default();
    let mut relations = Vec::new();
    let mut tag_paths: BTreeMap<String, Vec<_>> = BTreeMap::new();

    for path in paths {
        tag_paths.entry(path.tag.clone()).or_default().push(path.id);
        let walk = walk_path(path, order);
        for step in walk.steps {
            if let Some(node) = path.node(step.node.layer) {
                rows[step.row].push(LayerEntry {
                    node,
                    node_ref: step.node,
                    index_in_path: step.index_in_path,
                    path_tag: &path.tag,
                });
            }
        }
        relations.extend(walk.relations);
    }

    let layers: Vec<LayerLayout> = rows
        .iter()
        .enumerate()
        .map(|(row, entries)| {
            let layer = order.layer_at(row);
            let spec = LayerSpec {
                row,
                layer,
                overlap: layer != Layer::Text,
                palette: theme.palette(layer),
            };
            layout_layer(
                entries,
                |node| group_key(node, layer, vocabulary),
                &spec,
                config,
            )
        })
        .collect();

    let mut node_index = BTreeMap::new();
    for (row, layer) in layers.iter().enumerate() {
        for (index, node) in layer.nodes.iter().enumerate() {
            node_index.insert(node.node, (row, index));
        }
    }

    tracing::info!(
        paths = paths.len(),
        nodes = node_index.len(),
        relations = relations.len(),
        "rebuilt layout"
    );

    Layout {
        width: config.width,
        height: config.height,
        order: *order,
        layers,
        relations,
        node_index,
        tag_paths,
    }
}
