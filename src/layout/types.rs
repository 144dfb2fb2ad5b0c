use crate::ir::{Layer, LayerOrder, NodeIdentity, NodeRef, PathId};
use crate::theme::Rgb;
use serde::Serialize;
use std::collections::BTreeMap;

/// Edge between two consecutive populated slots of one path.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Relation {
    /// Source identity immediately followed by target identity.
    pub identity: String,
    pub source: NodeRef,
    pub target: NodeRef,
    pub source_identity: NodeIdentity,
    pub target_identity: NodeIdentity,
    pub path: PathId,
    pub path_tag: String,
}

/// A node's position within one path walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WalkStep {
    pub node: NodeRef,
    pub row: usize,
    pub index_in_path: usize,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PathWalk {
    pub steps: Vec<WalkStep>,
    pub relations: Vec<Relation>,
}

/// Final geometry of one node, built fresh on every rebuild.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlacedNode {
    pub node: NodeRef,
    pub identity: NodeIdentity,
    pub x: f32,
    pub y: f32,
    pub color: Rgb,
    pub path_tag: String,
    pub group: usize,
    pub index_in_path: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub name: String,
    pub color: Rgb,
    /// Path tags of every member, in member order.
    pub tags: Vec<String>,
    pub paths: Vec<PathId>,
}

impl GroupRect {
    pub fn class_list(&self) -> String {
        self.tags.join(" ")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LayerLayout {
    pub row: usize,
    pub layer: Layer,
    /// Node gap actually applied, after any compression of the row.
    pub node_gap: f32,
    /// Gap actually left between neighbouring group rectangles.
    pub group_gap: f32,
    pub nodes: Vec<PlacedNode>,
    pub groups: Vec<GroupRect>,
}

impl LayerLayout {
    pub fn empty(row: usize, layer: Layer) -> Self {
        Self {
            row,
            layer,
            node_gap: 0.0,
            group_gap: 0.0,
            nodes: Vec::new(),
            groups: Vec::new(),
        }
    }

    /// Width of the packed line: group rectangles plus the gaps between them.
    pub fn line_width(&self) -> f32 {
        let groups: f32 = self.groups.iter().map(|group| group.width).sum();
        groups + self.group_gap * self.groups.len().saturating_sub(1) as f32
    }
}

#[derive(Debug, Clone)]
pub struct Layout {
    pub width: f32,
    pub height: f32,
    pub order: LayerOrder,
    /// Indexed by row (position in `order`).
    pub layers: Vec<LayerLayout>,
    pub relations: Vec<Relation>,
    pub(crate) node_index: BTreeMap<NodeRef, (usize, usize)>,
    pub(crate) tag_paths: BTreeMap<String, Vec<PathId>>,
}

impl Layout {
    pub fn node(&self, node: &NodeRef) -> Option<&PlacedNode> {
        let (row, index) = self.node_index.get(node)?;
        self.layers.get(*row)?.nodes.get(*index)
    }

    pub fn relation(&self, identity: &str) -> Option<&Relation> {
        self.relations
            .iter()
            .find(|relation| relation.identity == identity)
    }

    pub fn group(&self, row: usize, index: usize) -> Option<&GroupRect> {
        self.layers.get(row)?.groups.get(index)
    }

    /// Paths carrying a membership tag; identical paths share one tag.
    pub fn paths_for_tag(&self, tag: &str) -> &[PathId] {
        self.tag_paths.get(tag).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn node_count(&self) -> usize {
        self.layers.iter().map(|layer| layer.nodes.len()).sum()
    }
}
