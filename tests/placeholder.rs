//! Tests for the placeholder manager inside a running session.
mod common;
use common::*;
use treeflow::placeholder::{PlaceholderManager, SizeResolver};
use treeflow::prelude::*;

const MAIN: &str = "placeholder-main";
const DEFAULT_SIZE: Size = Size {
    width: 400.0,
    height: 400.0,
};

fn bottom_of(graph: &Graph, id: &str) -> Position {
    Handle::Bottom.anchor(graph.node(id).unwrap().position, DEFAULT_SIZE)
}

fn placeholder_count(graph: &Graph) -> usize {
    graph.placeholders().count()
}

#[cfg(test)]
mod placeholder_tests {
    use super::*;

    #[test]
    fn test_single_marker_under_the_lowest_node() {
        let mut session = session(root_only(), true);
        session.click_node("A", ms(0));
        let now = session.settle(ms(0), FRAME);

        let graph = session.graph();
        assert_eq!(placeholder_count(graph), 1);
        assert!(graph.node("n2").is_none());
        assert!(graph.edge("n1=>placeholder-main").is_some());

        let marker = graph.node(MAIN).unwrap();
        assert!(marker.draggable);
        let expected = bottom_of(graph, "n1").offset(0.0, 50.0);
        assert_eq!(marker.position, expected);
        assert!(now > ms(200));
    }

    #[test]
    fn test_marker_stays_single_across_edits() {
        let mut session = session(root_only(), true);
        let mut now = ms(0);

        session.click_node("A", now);
        now = session.settle(now, FRAME);
        session.click_edge("A=>n1", now);
        now = session.settle(now, FRAME);
        assert_eq!(placeholder_count(session.graph()), 1);
        assert!(session.graph().edge("n1=>placeholder-main").is_some());

        // Clicking the marker commits it; a fresh marker takes over.
        assert!(session.click_node(MAIN, now));
        assert_eq!(session.graph().node(MAIN).unwrap().kind, NodeKind::Workflow);
        now = session.settle(now, FRAME);

        let graph = session.graph();
        assert_eq!(placeholder_count(graph), 1);
        assert_eq!(session.placeholders().placeholder_id(), "placeholder-main-1");
        assert!(graph.edge("placeholder-main=>placeholder-main-1").is_some());
        assert_tree(graph);

        session.click_node("n3", now);
        session.settle(now, FRAME);
        assert_eq!(placeholder_count(session.graph()), 1);
        assert_tree(session.graph());
    }

    #[test]
    fn test_dragged_offset_survives_anchor_relayout() {
        let mut session = session(chain(&["A", "B"]), true);
        let mut now = session.settle(ms(0), FRAME);

        let start = session.graph().node(MAIN).unwrap().position;
        assert_eq!(start, bottom_of(session.graph(), "B").offset(0.0, 50.0));

        assert!(session.begin_drag(MAIN));
        session.drag_to(MAIN, start.offset(15.0, 10.0), now);
        session.drag_to(MAIN, start.offset(30.0, 20.0), now + FRAME);
        session.end_drag(now + FRAME);
        now = session.settle(now + FRAME, FRAME);

        let offset = session.placeholders().offset(MAIN).copied().unwrap();
        assert_eq!((offset.offset_x, offset.offset_y), (30.0, 70.0));
        assert_eq!(offset.source_handle, Handle::Bottom);
        assert_eq!(session.graph().node(MAIN).unwrap().position, start.offset(30.0, 20.0));

        // A sibling for B moves B sideways; the marker follows B's handle.
        session.click_node("A", now);
        session.settle(now, FRAME);

        let graph = session.graph();
        assert_eq!(graph.node("B").unwrap().position, Position::new(-100.0, 150.0));
        assert!(graph.edge("B=>placeholder-main").is_some());
        assert_eq!(
            graph.node(MAIN).unwrap().position,
            bottom_of(graph, "B").offset(30.0, 70.0)
        );
        assert_eq!(session.placeholders().offset(MAIN).copied().unwrap(), offset);
    }

    #[test]
    fn test_slow_drag_is_recorded_on_release() {
        let mut session = session(chain(&["A", "B"]), true);
        let mut now = session.settle(ms(0), FRAME);
        let start = session.graph().node(MAIN).unwrap().position;

        // Twenty pointer moves of (3, 2), each below the drag threshold.
        assert!(session.begin_drag(MAIN));
        for step in 1..=20 {
            now += FRAME;
            let step = step as f64;
            session.drag_to(MAIN, start.offset(3.0 * step, 2.0 * step), now);
            session.advance(now);
            assert_eq!(
                session.graph().node(MAIN).unwrap().position,
                start.offset(3.0 * step, 2.0 * step)
            );
        }
        assert_eq!(session.end_drag(now).as_deref(), Some(MAIN));
        now = session.settle(now, FRAME);

        let offset = session.placeholders().offset(MAIN).copied().unwrap();
        assert_eq!((offset.offset_x, offset.offset_y), (60.0, 90.0));
        assert_eq!(session.graph().node(MAIN).unwrap().position, start.offset(60.0, 40.0));

        // The new offset follows B through a relayout.
        session.click_node("A", now);
        session.settle(now, FRAME);
        let graph = session.graph();
        assert_eq!(
            graph.node(MAIN).unwrap().position,
            bottom_of(graph, "B").offset(60.0, 90.0)
        );
    }

    #[test]
    fn test_programmatic_moves_are_not_drags() {
        let sizes = SizeResolver::new(Size::new(100.0, 40.0));
        let mut manager = PlaceholderManager::default();

        let graph = manager.update(&chain(&["A", "B"]), &sizes);
        assert!(manager.detect_drags(&graph, &sizes).is_empty());
        let before = *manager.offset(MAIN).unwrap();

        // The anchor is relaid out, then the marker is re-placed relative to it.
        let mut moved = graph.clone();
        moved.nodes[1].position = Position::new(300.0, 450.0);
        assert!(manager.detect_drags(&moved, &sizes).is_empty());
        let replaced = manager.update(&moved, &sizes);
        assert!(manager.detect_drags(&replaced, &sizes).is_empty());

        assert_eq!(*manager.offset(MAIN).unwrap(), before);
        assert_eq!(
            replaced.node(MAIN).unwrap().position,
            Position::new(350.0, 540.0)
        );
    }

    #[test]
    fn test_small_jitter_is_ignored() {
        let sizes = SizeResolver::new(Size::new(100.0, 40.0));
        let mut manager = PlaceholderManager::default();
        let mut graph = manager.update(&chain(&["A", "B"]), &sizes);
        manager.detect_drags(&graph, &sizes);

        let marker = graph.nodes.iter_mut().find(|n| n.id == MAIN).unwrap();
        marker.position = marker.position.offset(3.0, -2.0);
        assert!(manager.detect_drags(&graph, &sizes).is_empty());
    }

    #[test]
    fn test_selection_moves_the_marker() {
        let mut session = session(chain(&["A", "B"]), true);
        let now = session.settle(ms(0), FRAME);
        assert!(session.graph().edge("B=>placeholder-main").is_some());

        session.select(&["A"], now);
        session.settle(now, FRAME);
        let graph = session.graph();
        assert!(graph.node("A").unwrap().selected);
        assert!(graph.edge("A=>placeholder-main").is_some());
        assert!(graph.edge("B=>placeholder-main").is_none());
        assert_eq!(placeholder_count(graph), 1);
    }

    #[test]
    fn test_measured_size_positions_the_marker() {
        let mut session = session(chain(&["A", "B"]), true);
        session.canvas_mut().mount("B", Size::new(100.0, 40.0));
        session.settle(ms(0), FRAME);

        assert_eq!(
            session.graph().node(MAIN).unwrap().position,
            Position::new(50.0, 240.0)
        );
    }

    #[test]
    fn test_disabled_manager_leaves_leaf_markers() {
        let mut session = session(root_only(), false);
        session.click_node("A", ms(0));
        session.settle(ms(0), FRAME);
        assert!(session.graph().node("n2").unwrap().is_placeholder());
        assert!(session.graph().node(MAIN).is_none());
    }
}
