use crate::ir::{LAYER_COUNT, Layer};
use crate::layout::Layout;
use serde::Serialize;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Everything a renderer may read from one rebuild. Per-layer arrays are
/// indexed by layer; `row` on each entry gives its place in the order.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutDump {
    pub width: f32,
    pub height: f32,
    pub order: Vec<usize>,
    pub nodes_by_layer: Vec<Vec<NodeDump>>,
    pub relations: Vec<RelationDump>,
    pub group_rects_by_layer: Vec<Vec<GroupDump>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeDump {
    pub identity: String,
    pub layer: Layer,
    pub row: usize,
    pub path: usize,
    pub x: f32,
    pub y: f32,
    pub color: String,
    pub path_tag: String,
    pub group: usize,
    pub index_in_path: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationDump {
    pub identity: String,
    pub source: String,
    pub target: String,
    pub source_layer: Layer,
    pub target_layer: Layer,
    pub path: usize,
    pub path_tag: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupDump {
    pub name: String,
    pub row: usize,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub color: String,
    pub tags: Vec<String>,
    pub paths: Vec<usize>,
}

impl LayoutDump {
    pub fn from_layout(layout: &Layout) -> Self {
        let mut nodes_by_layer: Vec<Vec<NodeDump>> = (0..LAYER_COUNT).map(|_| Vec::new()).collect();
        let mut group_rects_by_layer: Vec<Vec<GroupDump>> =
            (0..LAYER_COUNT).map(|_| Vec::new()).collect();

        for row in &layout.layers {
            let slot = row.layer.index();
            nodes_by_layer[slot] = row
                .nodes
                .iter()
                .map(|node| NodeDump {
                    identity: node.identity.to_string(),
                    layer: row.layer,
                    row: row.row,
                    path: node.node.path.0,
                    x: node.x,
                    y: node.y,
                    color: node.color.to_string(),
                    path_tag: node.path_tag.clone(),
                    group: node.group,
                    index_in_path: node.index_in_path,
                })
                .collect();
            group_rects_by_layer[slot] = row
                .groups
                .iter()
                .map(|group| GroupDump {
                    name: group.name.clone(),
                    row: row.row,
                    x: group.x,
                    y: group.y,
                    width: group.width,
                    height: group.height,
                    color: group.color.to_string(),
                    tags: group.tags.clone(),
                    paths: group.paths.iter().map(|path| path.0).collect(),
                })
                .collect();
        }

        let relations = layout
            .relations
            .iter()
            .map(|relation| RelationDump {
                identity: relation.identity.clone(),
                source: relation.source_identity.to_string(),
                target: relation.target_identity.to_string(),
                source_layer: relation.source.layer,
                target_layer: relation.target.layer,
                path: relation.path.0,
                path_tag: relation.path_tag.clone(),
            })
            .collect();

        LayoutDump {
            width: layout.width,
            height: layout.height,
            order: layout.order.indices(),
            nodes_by_layer,
            relations,
            group_rects_by_layer,
        }
    }
}

/// Writes the dump as pretty JSON to `path`, or to stdout when absent.
pub fn write_layout_dump(path: Option<&Path>, layout: &Layout) -> anyhow::Result<()> {
    let dump = LayoutDump::from_layout(layout);
    match path {
        Some(path) => {
            let writer = BufWriter::new(File::create(path)?);
            serde_json::to_writer_pretty(writer, &dump)?;
        }
        None => {
            let mut stdout = io::stdout().lock();
            serde_json::to_writer_pretty(&mut stdout, &dump)?;
            writeln!(stdout)?;
        }
    }
    Ok(())
}
