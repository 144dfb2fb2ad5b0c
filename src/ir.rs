use crate::config::LabelVocabulary;
use crate::error::{LayerOrderError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

pub const LAYER_COUNT: usize = 6;

/// Stable key of a node in the source graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged, from = "IdentityRepr")]
pub enum NodeIdentity {
    Int(i64),
    Str(String),
}

// Graph drivers encode 64-bit integers as two signed 32-bit halves.
#[derive(Deserialize)]
#[serde(untagged)]
enum IdentityRepr {
    Int(i64),
    Split { low: i64, high: i64 },
    Str(String),
}

impl From<IdentityRepr> for NodeIdentity {
    fn from(repr: IdentityRepr) -> Self {
        match repr {
            IdentityRepr::Int(value) => NodeIdentity::Int(value),
            IdentityRepr::Split { low, high } => {
                let low = (low as i32) as u32 as i64;
                NodeIdentity::Int((high << 32) | low)
            }
            IdentityRepr::Str(value) => NodeIdentity::Str(value),
        }
    }
}

impl fmt::Display for NodeIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeIdentity::Int(value) => write!(f, "{value}"),
            NodeIdentity::Str(value) => f.write_str(value),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawNode {
    pub identity: NodeIdentity,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub properties: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawSegment {
    pub start: RawNode,
    pub end: RawNode,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawPath {
    #[serde(default)]
    pub segments: Vec<RawSegment>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawRecord {
    Wrapped { p: RawPath },
    Bare(RawPath),
}

/// Parses query records, accepting both `{"p": {"segments": ..}}` and bare
/// `{"segments": ..}` shapes.
pub fn parse_raw_paths(input: &str) -> Result<Vec<RawPath>> {
    let records: Vec<RawRecord> = serde_json::from_str(input)?;
    Ok(records
        .into_iter()
        .map(|record| match record {
            RawRecord::Wrapped { p } => p,
            RawRecord::Bare(path) => path,
        })
        .collect())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum NodeRole {
    InstanceRoot,
    Category,
    SubSubject,
    Subject,
    Text,
}

/// Maps a label set to exactly one role. Precedence follows the order in
/// which the normalizer tests labels: instance root, category, sub-subject,
/// subject, then text.
pub fn classify(labels: &[String], vocabulary: &LabelVocabulary) -> Option<NodeRole> {
    if is_instance_root(labels, vocabulary) {
        Some(NodeRole::InstanceRoot)
    } else {
        classify_member(labels, vocabulary)
    }
}

pub fn is_instance_root(labels: &[String], vocabulary: &LabelVocabulary) -> bool {
    vocabulary
        .instance_roots
        .iter()
        .any(|root| labels.contains(root))
}

/// Role of a node reached as a segment end. Instance-root labels only matter
/// on segment starts, so they are ignored here.
pub fn classify_member(labels: &[String], vocabulary: &LabelVocabulary) -> Option<NodeRole> {
    let has = |label: &str| labels.iter().any(|l| l == label);
    if has(&vocabulary.category) {
        Some(NodeRole::Category)
    } else if has(&vocabulary.sub_subject) {
        Some(NodeRole::SubSubject)
    } else if has(&vocabulary.subject) {
        Some(NodeRole::Subject)
    } else if has(&vocabulary.text) {
        Some(NodeRole::Text)
    } else {
        None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Layer {
    Text,
    Category,
    SubSubject3,
    SubSubject2,
    SubSubject1,
    Subject,
}

impl Layer {
    pub const ALL: [Layer; LAYER_COUNT] = [
        Layer::Text,
        Layer::Category,
        Layer::SubSubject3,
        Layer::SubSubject2,
        Layer::SubSubject1,
        Layer::Subject,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn default_name(self) -> &'static str {
        match self {
            Layer::Text => "Text",
            Layer::Category => "Text attribute",
            Layer::SubSubject3 => "Level-3 sub-subject",
            Layer::SubSubject2 => "Level-2 sub-subject",
            Layer::SubSubject1 => "Level-1 sub-subject",
            Layer::Subject => "Subject",
        }
    }
}

/// A permutation of the six layers; position in the order is the diagram row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<usize>", into = "Vec<usize>")]
pub struct LayerOrder([Layer; LAYER_COUNT]);

impl LayerOrder {
    pub fn new(indices: &[usize]) -> std::result::Result<Self, LayerOrderError> {
        if indices.len() != LAYER_COUNT {
            return Err(LayerOrderError::Length {
                expected: LAYER_COUNT,
                actual: indices.len(),
            });
        }
        let mut seen = [false; LAYER_COUNT];
        let mut layers = Layer::ALL;
        for (slot, &index) in indices.iter().enumerate() {
            let layer = Layer::from_index(index).ok_or(LayerOrderError::OutOfRange(index))?;
            if seen[index] {
                return Err(LayerOrderError::Duplicate(index));
            }
            seen[index] = true;
            layers[slot] = layer;
        }
        Ok(Self(layers))
    }

    pub fn layers(&self) -> &[Layer; LAYER_COUNT] {
        &self.0
    }

    pub fn layer_at(&self, row: usize) -> Layer {
        self.0[row]
    }

    pub fn row_of(&self, layer: Layer) -> usize {
        self.0
            .iter()
            .position(|candidate| *candidate == layer)
            .unwrap_or(layer.index())
    }

    pub fn indices(&self) -> Vec<usize> {
        self.0.iter().map(|layer| layer.index()).collect()
    }
}

impl Default for LayerOrder {
    fn default() -> Self {
        Self(Layer::ALL)
    }
}

impl TryFrom<Vec<usize>> for LayerOrder {
    type Error = LayerOrderError;

    fn try_from(value: Vec<usize>) -> std::result::Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<LayerOrder> for Vec<usize> {
    fn from(order: LayerOrder) -> Self {
        order.indices()
    }
}

impl FromStr for LayerOrder {
    type Err = LayerOrderError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let indices = s
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(|part| {
                part.parse::<usize>()
                    .map_err(|_| LayerOrderError::Parse(part.to_string()))
            })
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Self::new(&indices)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PathId(pub usize);

/// Identifies one slot of one path; unique across a rebuild.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeRef {
    pub path: PathId,
    pub layer: Layer,
}

/// The instance-category node that seeded a text node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstanceRef {
    pub identity: NodeIdentity,
    pub label: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub identity: NodeIdentity,
    pub labels: Vec<String>,
    pub properties: Map<String, Value>,
    pub role: Option<NodeRole>,
    pub path: PathId,
    pub instance: Option<InstanceRef>,
}

impl Node {
    pub fn from_raw(raw: &RawNode, path: PathId, vocabulary: &LabelVocabulary) -> Self {
        Self {
            identity: raw.identity.clone(),
            labels: raw.labels.clone(),
            properties: raw.properties.clone(),
            role: classify(&raw.labels, vocabulary),
            path,
            instance: None,
        }
    }

    pub fn property_text(&self, key: &str) -> Option<String> {
        property_text(&self.properties, key)
    }

    pub fn property_list(&self, key: &str) -> Vec<String> {
        match self.properties.get(key) {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(value_text)
                .filter(|item| !item.is_empty())
                .collect(),
            Some(other) => value_text(other).into_iter().collect(),
            None => Vec::new(),
        }
    }
}

impl InstanceRef {
    pub fn from_raw(raw: &RawNode, vocabulary: &LabelVocabulary) -> Self {
        let label = raw
            .labels
            .iter()
            .find(|label| vocabulary.instance_roots.contains(label))
            .cloned();
        Self {
            identity: raw.identity.clone(),
            label,
            name: property_text(&raw.properties, &vocabulary.category_name_key),
        }
    }
}

fn property_text(properties: &Map<String, Value>, key: &str) -> Option<String> {
    properties.get(key).and_then(value_text)
}

fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// One query result normalized into the six fixed layer slots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathModel {
    pub id: PathId,
    pub tag: String,
    pub slots: [Option<Node>; LAYER_COUNT],
}

impl PathModel {
    pub fn new(id: PathId, slots: [Option<Node>; LAYER_COUNT]) -> Self {
        let tag = path_tag(&slots);
        Self { id, tag, slots }
    }

    pub fn node(&self, layer: Layer) -> Option<&Node> {
        self.slots[layer.index()].as_ref()
    }

    pub fn populated(&self) -> impl Iterator<Item = (Layer, &Node)> + '_ {
        Layer::ALL
            .into_iter()
            .filter_map(|layer| self.node(layer).map(|node| (layer, node)))
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }
}

/// Class-safe membership tag: `pc` followed by the slot identities joined by
/// `_`, empty slots contributing an empty segment.
pub fn path_tag(slots: &[Option<Node>; LAYER_COUNT]) -> String {
    let parts: Vec<String> = slots
        .iter()
        .map(|slot| {
            slot.as_ref()
                .map(|node| class_safe(&node.identity.to_string()))
                .unwrap_or_default()
        })
        .collect();
    format!("pc{}", parts.join("_"))
}

pub(crate) fn class_safe(raw: &str) -> String {
    raw.chars()
        .map(|ch| if ch.is_ascii_alphanumeric() || ch == '-' { ch } else { '-' })
        .collect()
}
