//! Integration tests for treeflow
//!
//! End-to-end tests that drive a session together with its collaborators.
//!
mod common;
use common::*;
use std::cell::RefCell;
use std::rc::Rc;
use treeflow::collab::{MemoryPersistence, MemoryPreferences, UserPreference};
use treeflow::prelude::*;

const CONFIG_JSON: &str = r#"{
    "layout": { "node_width": 240, "node_height": 120 },
    "animation": { "duration_ms": 100 },
    "placeholder": { "spacing": 30, "debounce_ms": 50 },
    "history": { "max_size": 3 },
    "board_id": "board-7"
}"#;

#[cfg(test)]
mod integration_tests {
    use super::*;

    #[test]
    fn test_config_drives_the_session() {
        let config = EngineConfig::from_json(CONFIG_JSON).expect("valid config");
        assert_eq!(config.board_id.as_deref(), Some("board-7"));
        assert_eq!(config.layout.separation, 1.0);

        let mut session = session_with(root_only(), config);
        let mut now = ms(0);
        for _ in 0..5 {
            let leaf = session
                .graph()
                .nodes
                .iter()
                .filter(|n| !n.is_placeholder())
                .last()
                .map(|n| n.id.clone())
                .unwrap();
            session.click_node(&leaf, now);
            now = session.settle(now, FRAME);
        }

        assert_eq!(session.history().past_len(), 3);
        let graph = session.graph();
        // A straight chain of six workflow nodes, 120 apart.
        let deepest = graph
            .nodes
            .iter()
            .filter(|n| !n.is_placeholder())
            .map(|n| n.position.y)
            .fold(f64::MIN, f64::max);
        assert_eq!(deepest, 5.0 * 120.0);

        let marker = graph.placeholders().next().unwrap();
        assert_eq!(marker.id, "placeholder-main");
        let anchor = graph.node(graph.parent_of(&marker.id).unwrap()).unwrap();
        assert_eq!(anchor.position.y, deepest);
        assert_eq!(marker.position.y, deepest + 400.0 + 30.0);
    }

    #[test]
    fn test_created_nodes_are_persisted_best_effort() {
        let sink = Rc::new(RefCell::new(MemoryPersistence::new()));
        let config = EngineConfig::builder()
            .with_placeholders(false)
            .with_board_id("board-1")
            .build()
            .unwrap();
        let mut session = Session::builder()
            .with_config(config)
            .with_graph(root_only())
            .with_ids(SequentialIds::new("n", 1))
            .with_labels(FixedLabels::new(["🍕 Pizza"]))
            .with_persistence(sink.clone())
            .build();

        session.click_node("A", ms(0));
        session.click_node("n2", ms(0));

        let records = sink.borrow().records().to_vec();
        let saved: Vec<&str> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(saved, vec!["n1", "n2"]);
        assert!(records.iter().all(|r| r.board_id == "board-1"));
        assert_eq!(records[0].data["label"], "🍕 Pizza");
    }

    #[test]
    fn test_persistence_failures_do_not_touch_the_graph() {
        let config = EngineConfig::builder().with_board_id("board-1").build().unwrap();
        let mut session = Session::builder()
            .with_config(config)
            .with_graph(root_only())
            .with_persistence(MemoryPersistence::failing(CollaboratorError::Unavailable(
                "offline".into(),
            )))
            .build();

        assert!(session.click_node("A", ms(0)));
        assert_eq!(session.graph().nodes.len(), 3);
    }

    #[test]
    fn test_nothing_is_persisted_without_a_board() {
        let sink = Rc::new(RefCell::new(MemoryPersistence::new()));
        let mut session = Session::builder()
            .with_graph(root_only())
            .with_persistence(sink.clone())
            .build();
        session.click_node("A", ms(0));
        assert!(sink.borrow().records().is_empty());
    }

    #[test]
    fn test_graph_json_round_trip_through_a_session() {
        let json = r#"{
            "nodes": [
                { "id": "a", "type": "workflow", "position": { "x": 0, "y": 0 }, "label": "Start" },
                { "id": "b", "type": "workflow", "position": { "x": 0, "y": 150 }, "label": "Next" }
            ],
            "edges": [
                { "id": "a=>b", "source": "a", "target": "b", "type": "workflow", "sourceHandle": "bottom" }
            ]
        }"#;
        let graph = Graph::from_json(json).expect("valid graph");
        let mut session = session(graph, false);
        session.click_edge("a=>b", ms(0));
        session.settle(ms(0), FRAME);

        let exported = session.graph().to_json_pretty().unwrap();
        let reloaded = Graph::from_json(&exported).unwrap();
        assert_eq!(&reloaded, session.graph());
        assert_eq!(ids(&reloaded), vec!["a", "n1", "b"]);
        assert_eq!(reloaded.node("b").unwrap().position, Position::new(0.0, 300.0));
    }

    #[test]
    fn test_preference_falls_back_when_signed_out() {
        let mut store = MemoryPreferences::signed_out();
        let mut pref = UserPreference::load(&store, "minimap", PreferenceMode::Hover);
        assert_eq!(pref.mode(), PreferenceMode::Hover);
        assert_eq!(pref.set(&mut store, PreferenceMode::Hidden), PreferenceMode::Hidden);

        let mut signed_in = MemoryPreferences::new();
        pref.set(&mut signed_in, PreferenceMode::Shown);
        let reloaded = UserPreference::load(&signed_in, "minimap", PreferenceMode::Hover);
        assert_eq!(reloaded.mode(), PreferenceMode::Shown);
    }
}
