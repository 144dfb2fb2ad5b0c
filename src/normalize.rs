//! Slots raw query paths into the fixed six-layer [`PathModel`].
//!
//! Each segment is inspected once. A segment whose start node is an
//! instance root seeds the text slot with its end node; otherwise the end
//! node's role decides the slot. Sub-subject nodes are buffered until the
//! subject node arrives and are then written right-aligned into slots 2..=4,
//! so the last sub-subject seen always lands in the level-1 slot.

use crate::config::LabelVocabulary;
use crate::ir::{
    InstanceRef, LAYER_COUNT, Layer, Node, NodeRole, PathId, PathModel, RawPath, classify_member,
    is_instance_root,
};
use tracing::debug;

const SUB_SUBJECT_SLOTS: [Layer; 3] = [Layer::SubSubject3, Layer::SubSubject2, Layer::SubSubject1];

pub fn normalize_paths(raw: &[RawPath], vocabulary: &LabelVocabulary) -> Vec<PathModel> {
    raw.iter()
        .enumerate()
        .map(|(index, path)| normalize_path(PathId(index), path, vocabulary))
        .collect()
}

pub fn normalize_path(id: PathId, raw: &RawPath, vocabulary: &LabelVocabulary) -> PathModel {
    let mut slots: [Option<Node>; LAYER_COUNT] = Default::default();
    let mut sub_subjects: Vec<Node> = Vec::new();

    for segment in &raw.segments {
        if is_instance_root(&segment.start.labels, vocabulary) {
            let mut node = Node::from_raw(&segment.end, id, vocabulary);
            node.instance = Some(InstanceRef::from_raw(&segment.start, vocabulary));
            slots[Layer::Text.index()] = Some(node);
            continue;
        }

        let mut node = Node::from_raw(&segment.end, id, vocabulary);
        node.role = classify_member(&segment.end.labels, vocabulary);
        match node.role {
            Some(NodeRole::Category) => slots[Layer::Category.index()] = Some(node),
            Some(NodeRole::SubSubject) => sub_subjects.push(node),
            Some(NodeRole::Subject) => {
                flush_sub_subjects(&mut slots, &mut sub_subjects);
                slots[Layer::Subject.index()] = Some(node);
            }
            role => {
                debug!(
                    path = id.0,
                    identity = %node.identity,
                    ?role,
                    "dropping unclassified path node"
                );
            }
        }
    }

    if !sub_subjects.is_empty() {
        debug!(
            path = id.0,
            dropped = sub_subjects.len(),
            "path has no subject node, dropping buffered sub-subjects"
        );
    }

    PathModel::new(id, slots)
}

fn flush_sub_subjects(slots: &mut [Option<Node>; LAYER_COUNT], buffer: &mut Vec<Node>) {
    let capacity = SUB_SUBJECT_SLOTS.len();
    if buffer.len() > capacity {
        let overflow = buffer.len() - capacity;
        debug!(overflow, "keeping only the trailing sub-subjects");
        buffer.drain(..overflow);
    }
    let offset = capacity - buffer.len();
    for (index, node) in buffer.drain(..).enumerate() {
        slots[SUB_SUBJECT_SLOTS[offset + index].index()] = Some(node);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{NodeIdentity, RawNode, RawSegment};
    use serde_json::{Map, Value};

    const BROCADE: &str = "ns0__artisticFeatureBrocade";
    const TEXT: &str = "ns0__artisticFeatureDescription";
    const TYPE: &str = "ns0__artisticFeatureFeatureType";
    const SUB: &str = "ns0__artisticFeatureSubSubject";
    const SUBJECT: &str = "ns0__artisticFeatureSubject";

    fn node(id: i64, label: &str) -> RawNode {
        let mut properties = Map::new();
        properties.insert("rdf__value".to_string(), Value::String(format!("v{id}")));
        properties.insert("ns1__name".to_string(), Value::String("Brocade".to_string()));
        RawNode {
            identity: NodeIdentity::Int(id),
            labels: vec![label.to_string()],
            properties,
        }
    }

    fn chain(nodes: &[RawNode]) -> RawPath {
        RawPath {
            segments: nodes
                .windows(2)
                .map(|pair| RawSegment {
                    start: pair[0].clone(),
                    end: pair[1].clone(),
                })
                .collect(),
        }
    }

    fn identities(path: &PathModel) -> Vec<Option<i64>> {
        path.slots
            .iter()
            .map(|slot| {
                slot.as_ref().map(|node| match node.identity {
                    NodeIdentity::Int(value) => value,
                    NodeIdentity::Str(_) => -1,
                })
            })
            .collect()
    }

    #[test]
    fn full_path_fills_every_slot() {
        let raw = chain(&[
            node(1, BROCADE),
            node(10, TEXT),
            node(20, TYPE),
            node(30, SUB),
            node(31, SUB),
            node(32, SUB),
            node(40, SUBJECT),
        ]);
        let path = normalize_path(PathId(0), &raw, &LabelVocabulary::default());
        assert_eq!(
            identities(&path),
            vec![Some(10), Some(20), Some(30), Some(31), Some(32), Some(40)]
        );
        let text = path.node(Layer::Text).unwrap();
        let instance = text.instance.as_ref().unwrap();
        assert_eq!(instance.identity, NodeIdentity::Int(1));
        assert_eq!(instance.name.as_deref(), Some("Brocade"));
        assert_eq!(instance.label.as_deref(), Some(BROCADE));
        assert!(path.populated().all(|(_, node)| node.path == PathId(0)));
        assert_eq!(path.tag, "pc10_20_30_31_32_40");
    }

    #[test]
    fn short_sub_subject_runs_are_right_aligned() {
        let raw = chain(&[
            node(1, BROCADE),
            node(10, TEXT),
            node(20, TYPE),
            node(30, SUB),
            node(40, SUBJECT),
        ]);
        let path = normalize_path(PathId(0), &raw, &LabelVocabulary::default());
        assert_eq!(
            identities(&path),
            vec![Some(10), Some(20), None, None, Some(30), Some(40)]
        );
    }

    #[test]
    fn sub_subject_overflow_keeps_trailing_three() {
        let raw = chain(&[
            node(20, TYPE),
            node(30, SUB),
            node(31, SUB),
            node(32, SUB),
            node(33, SUB),
            node(40, SUBJECT),
        ]);
        let path = normalize_path(PathId(3), &raw, &LabelVocabulary::default());
        assert_eq!(
            identities(&path),
            vec![None, None, Some(31), Some(32), Some(33), Some(40)]
        );
    }

    #[test]
    fn sub_subjects_without_subject_are_dropped() {
        let raw = chain(&[node(1, BROCADE), node(10, TEXT), node(30, SUB)]);
        let path = normalize_path(PathId(0), &raw, &LabelVocabulary::default());
        assert_eq!(
            identities(&path),
            vec![Some(10), None, None, None, None, None]
        );
    }

    #[test]
    fn unclassified_nodes_degrade_the_path() {
        let raw = chain(&[
            node(1, BROCADE),
            node(10, TEXT),
            node(99, "Resource"),
            node(40, SUBJECT),
        ]);
        let path = normalize_path(PathId(0), &raw, &LabelVocabulary::default());
        assert_eq!(
            identities(&path),
            vec![Some(10), None, None, None, None, Some(40)]
        );
    }

    #[test]
    fn instance_labelled_end_node_keeps_its_member_slot() {
        let mut dual = node(20, TYPE);
        dual.labels.push(BROCADE.to_string());
        let raw = chain(&[node(1, BROCADE), node(10, TEXT), node(40, SUBJECT), dual]);
        let path = normalize_path(PathId(0), &raw, &LabelVocabulary::default());
        assert_eq!(
            identities(&path),
            vec![Some(10), Some(20), None, None, None, Some(40)]
        );
        assert_eq!(path.node(Layer::Category).unwrap().role, Some(NodeRole::Category));
    }

    #[test]
    fn empty_path_yields_empty_model() {
        let paths = normalize_paths(&[RawPath::default()], &LabelVocabulary::default());
        assert_eq!(paths.len(), 1);
        assert!(paths[0].is_empty());
        assert_eq!(paths[0].tag, "pc_____");
    }
}
