use std::path::Path;

use path_layers::config::Config;
use path_layers::highlight::{ElementKind, Transition};
use path_layers::ir::{Layer, LayerOrder, NodeRef, PathId};
use path_layers::{Diagram, Emphasis, FocusTarget, HighlightController, LayoutDump, resolve_focus};

fn load_fixture(name: &str) -> Diagram {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name);
    let input = std::fs::read_to_string(&path).expect("fixture read failed");
    Diagram::from_json(&input, Config::default()).expect("fixture parse failed")
}

fn relation_ids(diagram: &Diagram) -> Vec<String> {
    diagram
        .layout()
        .relations
        .iter()
        .map(|relation| relation.identity.clone())
        .collect()
}

#[test]
fn brocade_paths_fill_expected_slots() {
    let diagram = load_fixture("brocade.json");
    assert_eq!(diagram.paths().len(), 3);
    assert_eq!(diagram.paths()[0].tag, "pc101_201__301_302_401");
    assert_eq!(diagram.paths()[1].tag, "pc102_202___303_402");
    assert_eq!(diagram.paths()[2].tag, "pc103_201_301_304_305_401");
    assert_eq!(
        relation_ids(&diagram),
        vec![
            "101201", "201301", "301302", "302401", "102202", "202303", "303402", "103201",
            "201301", "301304", "304305", "305401",
        ]
    );
}

#[test]
fn first_path_walk_matches_the_documented_scenario() {
    let diagram = load_fixture("brocade.json");
    let layout = diagram.layout();
    let indices: Vec<usize> = Layer::ALL
        .iter()
        .filter_map(|&layer| {
            layout.node(&NodeRef {
                path: PathId(0),
                layer,
            })
        })
        .map(|node| node.index_in_path)
        .collect();
    assert_eq!(indices, vec![0, 1, 2, 3, 4]);
    let edges = layout
        .relations
        .iter()
        .filter(|relation| relation.path == PathId(0))
        .count();
    assert_eq!(edges, 4);
}

#[test]
fn groups_merge_shared_values_across_paths() {
    let diagram = load_fixture("brocade.json");
    let layout = diagram.layout();

    let text = &layout.layers[0];
    let names: Vec<&str> = text.groups.iter().map(|group| group.name.as_str()).collect();
    assert_eq!(names, vec!["Song brocade", "Su embroidery", "Taohuawu"]);

    let subject = &layout.layers[5];
    assert_eq!(subject.groups.len(), 2);
    assert_eq!(subject.groups[0].name, "nature");
    assert_eq!(subject.groups[0].paths, vec![PathId(0), PathId(2)]);
    assert_eq!(subject.groups[1].name, "animal");

    for layer in &layout.layers {
        for pair in layer.groups.windows(2) {
            assert!(pair[0].x + pair[0].width <= pair[1].x);
        }
    }
}

#[test]
fn degraded_paths_never_abort_the_rebuild() {
    let diagram = load_fixture("degraded.json");
    assert_eq!(diagram.paths().len(), 4);
    assert_eq!(diagram.paths()[0].tag, "pc104_____402");
    assert!(diagram.paths()[1].is_empty());
    assert!(diagram.paths()[2].is_empty());
    assert_eq!(diagram.paths()[3].tag, "pc__308_309_310_403");
    assert_eq!(
        relation_ids(&diagram),
        vec!["104402", "308309", "309310", "310403"]
    );
}

#[test]
fn reversed_order_flips_rows_and_edges() {
    let mut diagram = load_fixture("brocade.json");
    diagram.set_order(LayerOrder::new(&[5, 4, 3, 2, 1, 0]).unwrap());
    let layout = diagram.layout();
    assert_eq!(layout.layers[0].layer, Layer::Subject);
    assert_eq!(layout.relations[0].identity, "401302");
    assert!(layout.layers[0].nodes[0].y < layout.layers[5].nodes[0].y);
}

#[test]
fn group_focus_reports_member_paths_and_clears() {
    let diagram = load_fixture("brocade.json");
    let mut touched = Vec::new();
    let mut controller = HighlightController::new(0.7, |paths: &[PathId]| touched = paths.to_vec());

    let focus = resolve_focus(diagram.layout(), FocusTarget::Group { row: 1, index: 0 }).unwrap();
    assert_eq!(focus.kind, ElementKind::Group);
    let transition = controller.on_focus(&focus);
    assert!(matches!(transition, Transition::Emphasize { .. }));
    let emphasised = controller.emphasis();
    assert_eq!(emphasised.group_tags.len(), 2);

    let svg = diagram.render_svg(&emphasised);
    assert!(svg.contains("highlighting_group"));

    controller.on_unfocus();
    assert!(controller.emphasis().is_idle());
    drop(controller);
    assert_eq!(touched, vec![PathId(0), PathId(2)]);
}

#[test]
fn side_panel_marks_keyword() {
    let diagram = load_fixture("brocade.json");
    let details = diagram.describe(&[PathId(0)], Some("云纹"));
    let text = &details[0].cards[0];
    assert_eq!(text.instance.as_deref(), Some("Song brocade"));
    assert_eq!(text.lexicon, vec!["织金", "云纹"]);
    assert!(text.text[0].highlighted);
    assert_eq!(text.text[0].text, "云纹");
    assert!(details[0].cards[2].empty);
}

#[test]
fn dump_and_svg_cover_all_fixtures() {
    for name in ["brocade.json", "degraded.json"] {
        let diagram = load_fixture(name);
        let svg = diagram.render_svg(&Emphasis::idle());
        assert!(svg.contains("<svg"), "{name}: missing <svg tag");
        assert!(svg.contains("</svg>"), "{name}: missing </svg tag");

        let dump = LayoutDump::from_layout(diagram.layout());
        let nodes: usize = dump.nodes_by_layer.iter().map(Vec::len).sum();
        assert_eq!(nodes, diagram.layout().node_count(), "{name}: node count");
        assert_eq!(dump.relations.len(), diagram.layout().relations.len());
    }
}

#[test]
fn many_distinct_subjects_stay_inside_the_drawing() {
    let records: Vec<String> = (0..120)
        .map(|i| {
            format!(
                r#"{{"segments": [{{"start": {{"identity": {text}, "labels": ["ns0__artisticFeatureDescription"]}},
                   "end": {{"identity": {subject}, "labels": ["ns0__artisticFeatureSubject"], "properties": {{"rdf__value": "subject {i}"}}}}}}]}}"#,
                text = 1000 + i,
                subject = 5000 + i,
            )
        })
        .collect();
    let input = format!("[{}]", records.join(","));
    let config = Config::default();
    let diagram = Diagram::from_json(&input, config.clone()).expect("generated input parses");

    let subjects = &diagram.layout().layers[5];
    assert_eq!(subjects.groups.len(), 120);
    let first = &subjects.groups[0];
    let last = &subjects.groups[119];
    assert!(first.x >= config.layout.line_start() - 1e-3);
    assert!(last.x + last.width <= config.layout.width);
    assert!(subjects.line_width() <= config.layout.line_extent() + 1e-3);
}
