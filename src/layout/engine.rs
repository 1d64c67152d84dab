use super::animation::{AnimationHandle, Transition};
use super::tidy::TidyTree;
use crate::collab::canvas::FitViewOptions;
use crate::graph::{Graph, Node, Position};
use ahash::AHashMap;
use std::time::Duration;
use tracing::debug;

/// What the caller should render after a layout tick.
#[derive(Debug, Clone)]
pub struct LayoutFrame {
    pub positions: AHashMap<String, Position>,
    pub finished: bool,
    /// Set on the final frame of every pass except the very first one.
    pub fit_view: Option<FitViewOptions>,
}

/// Recomputes positions whenever the node count changes and animates towards them.
#[derive(Debug)]
pub struct LayoutEngine {
    tree: TidyTree,
    duration: Duration,
    fit: FitViewOptions,
    animation: AnimationHandle,
    observed_count: Option<usize>,
    initial: bool,
}

impl LayoutEngine {
    pub fn new(tree: TidyTree, duration: Duration, fit: FitViewOptions) -> Self {
        Self {
            tree,
            duration,
            fit,
            animation: AnimationHandle::new(),
            observed_count: None,
            initial: true,
        }
    }

    /// Target positions for every laid-out node, in node order.
    ///
    /// Draggable nodes keep their own position and are not part of the tree.
    pub fn targets(&self, graph: &Graph) -> Vec<(String, Position)> {
        let nodes: Vec<Node> = graph
            .nodes
            .iter()
            .filter(|n| !n.draggable)
            .cloned()
            .collect();
        self.tree.layout(&nodes, &graph.edges)
    }

    /// React to a graph change; a pass only starts when the node count moved.
    pub fn observe(&mut self, graph: &Graph, now: Duration) -> bool {
        let count = graph.nodes.len();
        if self.observed_count == Some(count) {
            return false;
        }
        self.observed_count = Some(count);
        self.relayout(graph, now);
        true
    }

    /// Start a pass from whatever is rendered right now.
    pub fn relayout(&mut self, graph: &Graph, now: Duration) {
        if self.animation.cancel() {
            debug!("Cancelled in-flight layout animation");
        }

        let targets = self.targets(graph);
        if targets.is_empty() {
            return;
        }

        let current = graph.positions();
        let transitions: Vec<Transition> = targets
            .into_iter()
            .map(|(id, to)| Transition {
                from: current.get(&id).copied().unwrap_or(to),
                id,
                to,
            })
            .collect();

        debug!(nodes = transitions.len(), "Starting layout pass");
        self.animation.start(transitions, self.duration, now);
    }

    pub fn is_animating(&self) -> bool {
        self.animation.is_active()
    }

    pub fn cancel(&mut self) -> bool {
        self.animation.cancel()
    }

    pub fn tick(&mut self, now: Duration) -> Option<LayoutFrame> {
        let frame = self.animation.tick(now)?;

        let mut fit_view = None;
        if frame.finished {
            if !self.initial {
                fit_view = Some(self.fit);
            }
            self.initial = false;
            debug!("Layout pass finished");
        }

        Some(LayoutFrame {
            positions: frame.positions.into_iter().collect(),
            finished: frame.finished,
            fit_view,
        })
    }
}
