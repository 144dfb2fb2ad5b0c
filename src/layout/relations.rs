use super::types::{PathWalk, Relation, WalkStep};
use crate::ir::{LayerOrder, NodeRef, PathModel};

/// Walks `path` in visitation order, skipping empty slots, and links each
/// populated slot to the previous one.
pub fn walk_path(path: &PathModel, order: &LayerOrder) -> PathWalk {
    let mut walk = PathWalk::default();
    let mut previous: Option<NodeRef> = None;

    for (row, layer) in order.layers().iter().copied().enumerate() {
        let Some(node) = path.node(layer) else {
            continue;
        };
        let current = NodeRef {
            path: path.id,
            layer,
        };
        walk.steps.push(WalkStep {
            node: current,
            row,
            index_in_path: walk.steps.len(),
        });

        if let Some(source_ref) = previous {
            if let Some(source) = path.node(source_ref.layer) {
                walk.relations.push(Relation {
                    identity: relation_identity(&source.identity, &node.identity),
                    source: source_ref,
                    target: current,
                    source_identity: source.identity.clone(),
                    target_identity: node.identity.clone(),
                    path: path.id,
                    path_tag: path.tag.clone(),
                });
            }
        }
        previous = Some(current);
    }

    walk
}

/// Concatenates both identities without a separator. Distinct pairs that
/// concatenate to the same string are a caller contract violation.
pub fn relation_identity(source: &impl ToString, target: &impl ToString) -> String {
    let mut identity = source.to_string();
    identity.push_str(&target.to_string());
    identity
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LabelVocabulary;
    use crate::ir::{LAYER_COUNT, Layer, Node, NodeIdentity, PathId, RawNode};
    use serde_json::Map;

    fn path_from(ids: [Option<i64>; LAYER_COUNT]) -> PathModel {
        let vocab = LabelVocabulary::default();
        let slots = ids.map(|id| {
            id.map(|id| {
                let raw = RawNode {
                    identity: NodeIdentity::Int(id),
                    labels: Vec::new(),
                    properties: Map::new(),
                };
                Node::from_raw(&raw, PathId(0), &vocab)
            })
        });
        PathModel::new(PathId(0), slots)
    }

    #[test]
    fn skips_empty_slots_without_breaking_the_chain() {
        let path = path_from([Some(1), Some(2), None, Some(3), Some(4), Some(5)]);
        let walk = walk_path(&path, &LayerOrder::default());

        let ids: Vec<&str> = walk.relations.iter().map(|r| r.identity.as_str()).collect();
        assert_eq!(ids, vec!["12", "23", "34", "45"]);
        let indices: Vec<usize> = walk.steps.iter().map(|step| step.index_in_path).collect();
        assert_eq!(indices, vec![0, 1, 2, 3, 4]);
        let rows: Vec<usize> = walk.steps.iter().map(|step| step.row).collect();
        assert_eq!(rows, vec![0, 1, 3, 4, 5]);
        assert_eq!(walk.relations[1].source.layer, Layer::Category);
        assert_eq!(walk.relations[1].target.layer, Layer::SubSubject2);
        assert!(walk.relations.iter().all(|r| r.path_tag == path.tag));
    }

    #[test]
    fn follows_custom_visitation_order() {
        let path = path_from([Some(1), Some(2), None, None, None, Some(6)]);
        let order = LayerOrder::new(&[5, 0, 1, 2, 3, 4]).unwrap();
        let walk = walk_path(&path, &order);

        let ids: Vec<&str> = walk.relations.iter().map(|r| r.identity.as_str()).collect();
        assert_eq!(ids, vec!["61", "12"]);
        assert_eq!(walk.steps[0].node.layer, Layer::Subject);
        assert_eq!(walk.steps[0].row, 0);
    }

    #[test]
    fn single_or_no_populated_slot_emits_no_edges() {
        let lone = path_from([None, None, None, None, None, Some(9)]);
        let walk = walk_path(&lone, &LayerOrder::default());
        assert_eq!(walk.steps.len(), 1);
        assert!(walk.relations.is_empty());

        let empty = path_from([None; LAYER_COUNT]);
        assert_eq!(walk_path(&empty, &LayerOrder::default()), PathWalk::default());
    }
}
