//! Tests for the graph mutation operations.
mod common;
use common::*;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use treeflow::prelude::*;

#[cfg(test)]
mod mutation_tests {
    use super::*;

    #[test]
    fn test_add_child_creates_node_placeholder_and_edges() {
        let mut editor = Editor::new();
        let graph = editor.add_child(&root_only(), "A");

        assert_eq!(ids(&graph), vec!["A", "n1", "n2"]);
        assert_eq!(edge_ids(&graph), vec!["A=>n1", "n1=>n2"]);

        let child = graph.node("n1").unwrap();
        assert_eq!(child.kind, NodeKind::Workflow);
        assert_eq!(child.label, "Node 1");
        assert_eq!(child.position, Position::new(0.0, 150.0));

        let placeholder = graph.node("n2").unwrap();
        assert!(placeholder.is_placeholder());
        assert_eq!(placeholder.label, "+");
        assert_eq!(graph.edge("A=>n1").unwrap().kind, EdgeKind::Workflow);
        assert_eq!(graph.edge("n1=>n2").unwrap().kind, EdgeKind::Placeholder);
    }

    #[test]
    fn test_add_child_drops_existing_placeholder_children() {
        let mut editor = Editor::new();
        let first = editor.add_child(&root_only(), "A");
        // n1 now has placeholder n2; a second child replaces it.
        let second = editor.add_child(&first, "n1");

        assert!(second.node("n2").is_none());
        assert!(second.edge("n1=>n2").is_none());
        assert_eq!(ids(&second), vec!["A", "n1", "n3", "n4"]);
        assert_eq!(edge_ids(&second), vec!["A=>n1", "n1=>n3", "n3=>n4"]);
    }

    #[test]
    fn test_insert_node_splits_edge_and_keeps_order() {
        let mut editor = Editor::new();
        let mut graph = chain(&["A", "B"]);
        graph.edges[0] = Edge::new("A", "B", EdgeKind::Workflow).with_handle(Handle::Right);

        let next = editor.insert_node(&graph, "A=>B");

        assert_eq!(ids(&next), vec!["A", "n1", "B"]);
        assert!(next.edge("A=>B").is_none());
        let upper = next.edge("A=>n1").unwrap();
        let lower = next.edge("n1=>B").unwrap();
        assert_eq!(upper.kind, EdgeKind::Workflow);
        assert_eq!(lower.kind, EdgeKind::Workflow);
        assert_eq!(upper.source_handle, Handle::Right);
        // The new node starts where the target was.
        assert_eq!(next.node("n1").unwrap().position, Position::new(0.0, 150.0));
    }

    #[test]
    fn test_insert_placeholder_then_promote_commits_both_edges() {
        let mut editor = Editor::new();
        let marked = editor.insert_placeholder(&chain(&["A", "B"]), "A=>B");

        assert_eq!(ids(&marked), vec!["A", "n1", "B"]);
        assert!(marked.node("n1").unwrap().is_placeholder());
        assert_eq!(marked.edge("A=>n1").unwrap().kind, EdgeKind::Placeholder);
        assert_eq!(marked.edge("n1=>B").unwrap().kind, EdgeKind::Placeholder);
        // Below A by its height plus the default spacing.
        assert_eq!(marked.node("n1").unwrap().position, Position::new(0.0, 90.0));

        let promoted = editor.promote(&marked, "n1");
        assert_eq!(promoted.node("n1").unwrap().kind, NodeKind::Workflow);
        assert_eq!(promoted.edge("A=>n1").unwrap().kind, EdgeKind::Workflow);
        assert_eq!(promoted.edge("n1=>B").unwrap().kind, EdgeKind::Workflow);
        // n1 already has a real child, so no trailing placeholder is added.
        assert_eq!(promoted.nodes.len(), 3);
        assert_tree(&promoted);
    }

    #[test]
    fn test_add_placeholder_child_replaces_older_markers() {
        let mut editor = Editor::new();
        let graph = editor.add_child(&root_only(), "A");
        let next = editor.apply(&graph, &Mutation::AddPlaceholderChild { node: "n1".into() });

        assert!(next.node("n2").is_none());
        let marker = next.node("n3").unwrap();
        assert!(marker.is_placeholder());
        assert_eq!(marker.position, Position::new(0.0, 150.0 + 40.0 + 50.0));
        assert_eq!(next.edge("n1=>n3").unwrap().kind, EdgeKind::Placeholder);
    }

    #[test]
    fn test_stale_references_are_no_ops() {
        let mut editor = Editor::new();
        let graph = chain(&["A", "B"]);

        assert_eq!(editor.add_child(&graph, "ghost"), graph);
        assert_eq!(editor.insert_node(&graph, "B=>A"), graph);
        assert_eq!(editor.promote(&graph, "ghost"), graph);

        assert_eq!(
            editor.try_apply(&graph, &Mutation::Promote { node: "A".into() }),
            Err(MutationError::NotAPlaceholder("A".into()))
        );
        assert_eq!(
            editor.try_apply(&graph, &Mutation::InsertPlaceholder { edge: "x=>y".into() }),
            Err(MutationError::EdgeNotFound("x=>y".into()))
        );
    }

    #[test]
    fn test_example_scenario_with_undo() {
        let mut editor = Editor::new();
        let mut store = GraphStore::new(root_only());
        let mut history = HistoryManager::default();

        history.take_snapshot(&store);
        let after_add = editor.add_child(store.state(), "A");
        store.set(after_add.clone());

        history.take_snapshot(&store);
        let after_promote = editor.promote(store.state(), "n2");
        store.set(after_promote.clone());

        let c = after_promote.node("n2").unwrap();
        assert_eq!(c.kind, NodeKind::Workflow);
        assert!(after_promote.node("n3").unwrap().is_placeholder());
        assert_eq!(after_promote.edge("n1=>n2").unwrap().kind, EdgeKind::Workflow);
        assert_eq!(after_promote.edge("n2=>n3").unwrap().kind, EdgeKind::Placeholder);

        assert!(history.undo(&mut store));
        assert_eq!(store.state(), &after_add);
        assert!(store.state().node("n2").unwrap().is_placeholder());

        history.finish_restore();
        assert!(history.redo(&mut store));
        assert_eq!(store.state(), &after_promote);
    }

    #[test]
    fn test_random_edit_sequences_preserve_the_tree() {
        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut editor = Editor::new();
            let mut graph = root_only();

            for _ in 0..40 {
                let node = graph.nodes.choose(&mut rng).map(|n| n.id.clone());
                let edge = graph.edges.choose(&mut rng).map(|e| e.id.clone());
                let mutation = match (rand::Rng::random_range(&mut rng, 0..5), node, edge) {
                    (0, Some(node), _) => Mutation::AddChild { node },
                    (1, _, Some(edge)) => Mutation::InsertNode { edge },
                    (2, _, Some(edge)) => Mutation::InsertPlaceholder { edge },
                    (3, Some(node), _) => Mutation::Promote { node },
                    (_, Some(node), _) => Mutation::AddPlaceholderChild { node },
                    _ => continue,
                };
                graph = editor.apply(&graph, &mutation);

                assert_tree(&graph);
                assert_eq!(graph.roots().len(), 1, "seed {seed}: {mutation:?}");
            }
        }
    }
}
