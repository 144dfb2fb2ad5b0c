use crate::config::{LabelVocabulary, LayoutConfig};
use crate::ir::{Layer, LayerOrder, PathId, PathModel};
use serde::Serialize;

/// A run of card text, highlighted when it matches the search keyword.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Span {
    pub text: String,
    pub highlighted: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerCard {
    pub layer: Layer,
    pub title: String,
    pub empty: bool,
    pub text: Vec<Span>,
    /// Category name of the instance that seeded a text node.
    pub instance: Option<String>,
    pub lexicon: Vec<String>,
    pub lexical_density: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PathDetails {
    pub path: PathId,
    pub tag: String,
    pub cards: Vec<LayerCard>,
}

/// One card per layer, in visitation order.
pub fn describe_path(
    path: &PathModel,
    order: &LayerOrder,
    config: &LayoutConfig,
    vocabulary: &LabelVocabulary,
    keyword: Option<&str>,
) -> PathDetails {
    let cards = order
        .layers()
        .iter()
        .map(|&layer| {
            let title = config.layer_name(layer).to_string();
            let Some(node) = path.node(layer) else {
                return LayerCard {
                    layer,
                    title,
                    empty: true,
                    text: Vec::new(),
                    instance: None,
                    lexicon: Vec::new(),
                    lexical_density: None,
                };
            };

            let text_key = match layer {
                Layer::Text => &vocabulary.description_key,
                _ => &vocabulary.display_value_key,
            };
            let text = node.property_text(text_key).unwrap_or_default();
            let (lexicon, lexical_density) = match layer {
                Layer::Text => (
                    node.property_list(&vocabulary.lexicon_key),
                    node.property_text(&vocabulary.lexical_density_key),
                ),
                _ => (Vec::new(), None),
            };

            LayerCard {
                layer,
                title,
                empty: false,
                text: emphasize_keyword(&text, keyword),
                instance: node.instance.as_ref().and_then(|instance| instance.name.clone()),
                lexicon,
                lexical_density,
            }
        })
        .collect();

    PathDetails {
        path: path.id,
        tag: path.tag.clone(),
        cards,
    }
}

/// Details for the paths reported by a focus, skipping unknown ids.
pub fn describe_paths(
    paths: &[PathModel],
    ids: &[PathId],
    order: &LayerOrder,
    config: &LayoutConfig,
    vocabulary: &LabelVocabulary,
    keyword: Option<&str>,
) -> Vec<PathDetails> {
    ids.iter()
        .filter_map(|id| paths.iter().find(|path| path.id == *id))
        .map(|path| describe_path(path, order, config, vocabulary, keyword))
        .collect()
}

/// Splits `text` around literal, case-sensitive occurrences of `keyword`.
pub fn emphasize_keyword(text: &str, keyword: Option<&str>) -> Vec<Span> {
    let plain = |text: &str| Span {
        text: text.to_string(),
        highlighted: false,
    };
    let keyword = match keyword {
        Some(keyword) if !keyword.is_empty() => keyword,
        _ if text.is_empty() => return Vec::new(),
        _ => return vec![plain(text)],
    };

    let mut spans = Vec::new();
    let mut cursor = 0;
    for (start, matched) in text.match_indices(keyword) {
        if start > cursor {
            spans.push(plain(&text[cursor..start]));
        }
        spans.push(Span {
            text: matched.to_string(),
            highlighted: true,
        });
        cursor = start + matched.len();
    }
    if cursor < text.len() {
        spans.push(plain(&text[cursor..]));
    }
    spans
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{InstanceRef, LAYER_COUNT, Node, NodeIdentity};
    use serde_json::{Map, Value, json};

    fn node(id: i64, properties: Value) -> Node {
        let properties: Map<String, Value> = match properties {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        Node {
            identity: NodeIdentity::Int(id),
            labels: Vec::new(),
            properties,
            role: None,
            path: PathId(0),
            instance: None,
        }
    }

    fn sample() -> PathModel {
        let mut text = node(
            10,
            json!({
                "ns2__description": "织金云龙纹，云纹环绕",
                "ns0__artisticFeaturelexic": ["织金", "云纹"],
                "ns0__artisticFeaturelexicalDensity": 0.42
            }),
        );
        text.instance = Some(InstanceRef {
            identity: NodeIdentity::Int(1),
            label: None,
            name: Some("Brocade".to_string()),
        });
        let mut slots: [Option<Node>; LAYER_COUNT] = Default::default();
        slots[0] = Some(text);
        slots[5] = Some(node(40, json!({ "rdf__value": "云纹" })));
        PathModel::new(PathId(0), slots)
    }

    #[test]
    fn cards_follow_visitation_order() {
        let order = LayerOrder::new(&[5, 0, 1, 2, 3, 4]).unwrap();
        let details = describe_path(
            &sample(),
            &order,
            &LayoutConfig::default(),
            &LabelVocabulary::default(),
            None,
        );
        assert_eq!(details.cards.len(), 6);
        assert_eq!(details.cards[0].title, "Subject");
        assert_eq!(details.cards[0].text[0].text, "云纹");
        let text = &details.cards[1];
        assert_eq!(text.layer, Layer::Text);
        assert_eq!(text.instance.as_deref(), Some("Brocade"));
        assert_eq!(text.lexicon, vec!["织金", "云纹"]);
        assert_eq!(text.lexical_density.as_deref(), Some("0.42"));
        assert!(details.cards[2].empty);
    }

    #[test]
    fn keyword_matches_are_highlighted() {
        let spans = emphasize_keyword("织金云龙纹，云纹环绕", Some("云纹"));
        assert_eq!(
            spans,
            vec![
                Span {
                    text: "织金云龙纹，".to_string(),
                    highlighted: false
                },
                Span {
                    text: "云纹".to_string(),
                    highlighted: true
                },
                Span {
                    text: "环绕".to_string(),
                    highlighted: false
                },
            ]
        );
        assert_eq!(emphasize_keyword("Cloud", Some("cloud")).len(), 1);
        assert_eq!(emphasize_keyword("abc", Some("")).len(), 1);
        assert!(emphasize_keyword("", Some("x")).is_empty());
    }

    #[test]
    fn describe_paths_skips_unknown_ids() {
        let paths = vec![sample()];
        let details = describe_paths(
            &paths,
            &[PathId(3), PathId(0)],
            &LayerOrder::default(),
            &LayoutConfig::default(),
            &LabelVocabulary::default(),
            Some("云纹"),
        );
        assert_eq!(details.len(), 1);
        assert!(details[0].cards[0].text.iter().any(|span| span.highlighted));
    }
}
