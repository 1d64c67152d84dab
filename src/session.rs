//! The event loop that ties the store, mutations, history, layout and
//! placeholders together.
//!
//! The host forwards discrete events (clicks, drags, key presses) and calls
//! [`Session::advance`] once per animation frame with the elapsed time. All
//! timers (layout animation, placeholder debounce, history guard) are driven
//! from that single clock, so a session is fully deterministic.

use crate::collab::canvas::{Canvas, HeadlessCanvas};
use crate::collab::persistence::{NodePersistence, persist_best_effort};
use crate::config::EngineConfig;
use crate::graph::{
    Graph, GraphStore, IdGenerator, LabelGenerator, Node, Position, RandomLabels, UuidIds,
};
use crate::history::{HistoryManager, KeyChord, Shortcut};
use crate::layout::LayoutEngine;
use crate::mutation::{Mutation, Mutator};
use crate::placeholder::{
    Debouncer, MeasuredSize, PlaceholderManager, ReportedSize, SizeResolver,
};
use ahash::{AHashMap, AHashSet};
use std::time::Duration;
use tracing::{debug, warn};

/// Upper bound on frames `settle` will run before giving up.
const MAX_SETTLE_FRAMES: usize = 10_000;

pub struct SessionBuilder<C: Canvas = HeadlessCanvas> {
    canvas: C,
    config: EngineConfig,
    graph: Graph,
    ids: Box<dyn IdGenerator>,
    labels: Box<dyn LabelGenerator>,
    persistence: Option<Box<dyn NodePersistence>>,
}

impl SessionBuilder<HeadlessCanvas> {
    pub fn headless() -> Self {
        Self::new(HeadlessCanvas::new())
    }
}

impl<C: Canvas> SessionBuilder<C> {
    pub fn new(canvas: C) -> Self {
        Self {
            canvas,
            config: EngineConfig::default(),
            graph: Graph::default(),
            ids: Box::new(UuidIds),
            labels: Box::new(RandomLabels::new()),
            persistence: None,
        }
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_graph(mut self, graph: Graph) -> Self {
        self.graph = graph;
        self
    }

    pub fn with_ids(mut self, ids: impl IdGenerator + 'static) -> Self {
        self.ids = Box::new(ids);
        self
    }

    pub fn with_labels(mut self, labels: impl LabelGenerator + 'static) -> Self {
        self.labels = Box::new(labels);
        self
    }

    /// Only consulted when the config carries a `board_id`.
    pub fn with_persistence(mut self, sink: impl NodePersistence + 'static) -> Self {
        self.persistence = Some(Box::new(sink));
        self
    }

    /// Build the session; the initial layout pass starts at time zero.
    pub fn build(self) -> Session<C> {
        let config = self.config;
        let layout = LayoutEngine::new(
            config.layout.tree(),
            config.animation.duration(),
            config.animation.fit_view(),
        );
        let mut session = Session {
            store: GraphStore::new(self.graph),
            history: HistoryManager::new(config.history.max_size),
            layout,
            placeholders: PlaceholderManager::new(config.placeholder.settings()),
            debounce: Debouncer::new(config.placeholder.debounce()),
            ids: self.ids,
            labels: self.labels,
            canvas: self.canvas,
            persistence: self.persistence,
            dragging: None,
            config,
        };
        session.graph_changed(Duration::ZERO);
        session
    }
}

pub struct Session<C: Canvas = HeadlessCanvas> {
    config: EngineConfig,
    store: GraphStore,
    history: HistoryManager,
    layout: LayoutEngine,
    placeholders: PlaceholderManager,
    debounce: Debouncer,
    ids: Box<dyn IdGenerator>,
    labels: Box<dyn LabelGenerator>,
    canvas: C,
    persistence: Option<Box<dyn NodePersistence>>,
    dragging: Option<(String, Position)>,
}

impl Session<HeadlessCanvas> {
    pub fn builder() -> SessionBuilder<HeadlessCanvas> {
        SessionBuilder::headless()
    }
}

impl<C: Canvas> Session<C> {
    pub fn graph(&self) -> &Graph {
        self.store.state()
    }

    pub fn store(&self) -> &GraphStore {
        &self.store
    }

    pub fn history(&self) -> &HistoryManager {
        &self.history
    }

    pub fn placeholders(&self) -> &PlaceholderManager {
        &self.placeholders
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn canvas(&self) -> &C {
        &self.canvas
    }

    pub fn canvas_mut(&mut self) -> &mut C {
        &mut self.canvas
    }

    pub fn is_animating(&self) -> bool {
        self.layout.is_animating()
    }

    /// Nothing is scheduled: no animation running and no placeholder update
    /// that could fire. An update held back by an open drag does not count.
    pub fn is_idle(&self) -> bool {
        !self.layout.is_animating() && (self.dragging.is_some() || !self.debounce.is_pending())
    }

    /// Run one undoable mutation. Returns false when it referenced something
    /// that no longer exists, in which case nothing changed.
    pub fn apply(&mut self, mutation: &Mutation, now: Duration) -> bool {
        // A user action is never the restore's own update.
        self.history.finish_restore();
        let current = self.store.snapshot();
        let measured = MeasuredSize::new(&self.canvas);
        let sizes = SizeResolver::new(self.config.placeholder.default_size)
            .with(&ReportedSize)
            .with(&measured);
        let result = Mutator::new(self.ids.as_mut(), self.labels.as_mut(), &sizes)
            .with_spacing(self.config.placeholder.spacing)
            .with_placeholder_label(&self.config.placeholder.label)
            .try_apply(&current, mutation);

        let next = match result {
            Ok(next) => next,
            Err(e) => {
                warn!(mutation = mutation.name(), error = %e, "Ignoring mutation");
                return false;
            }
        };

        self.history.take_snapshot(&self.store);
        let committed: Vec<Node> = next
            .nodes
            .iter()
            .filter(|n| !n.is_placeholder())
            .filter(|n| current.node(&n.id).is_none_or(|before| before.is_placeholder()))
            .cloned()
            .collect();
        debug!(
            mutation = mutation.name(),
            nodes = next.nodes.len(),
            edges = next.edges.len(),
            "Applied mutation"
        );
        self.store.set(next);
        self.persist(&committed);
        self.graph_changed(now);
        true
    }

    /// A click on a node: placeholders are promoted, workflow nodes grow a child.
    pub fn click_node(&mut self, node_id: &str, now: Duration) -> bool {
        let mutation = match self.store.node(node_id) {
            Some(node) if node.is_placeholder() => Mutation::Promote {
                node: node_id.to_string(),
            },
            _ => Mutation::AddChild {
                node: node_id.to_string(),
            },
        };
        self.apply(&mutation, now)
    }

    pub fn click_placeholder(&mut self, node_id: &str, now: Duration) -> bool {
        self.apply(
            &Mutation::Promote {
                node: node_id.to_string(),
            },
            now,
        )
    }

    pub fn click_edge(&mut self, edge_id: &str, now: Duration) -> bool {
        self.apply(
            &Mutation::InsertNode {
                edge: edge_id.to_string(),
            },
            now,
        )
    }

    pub fn undo(&mut self, now: Duration) -> bool {
        if !self.history.undo(&mut self.store) {
            return false;
        }
        self.graph_changed(now);
        true
    }

    pub fn redo(&mut self, now: Duration) -> bool {
        if !self.history.redo(&mut self.store) {
            return false;
        }
        self.graph_changed(now);
        true
    }

    /// Route a key press; returns the shortcut that ran, if any.
    pub fn handle_key(&mut self, chord: &KeyChord, now: Duration) -> Option<Shortcut> {
        if !self.config.history.enable_shortcuts {
            return None;
        }
        let shortcut = Shortcut::from_key(chord)?;
        let ran = match shortcut {
            Shortcut::Undo => self.undo(now),
            Shortcut::Redo => self.redo(now),
        };
        ran.then_some(shortcut)
    }

    /// Make exactly `ids` the selection. Unknown ids are ignored.
    pub fn select<S: AsRef<str>>(&mut self, ids: &[S], now: Duration) {
        let wanted: AHashSet<&str> = ids.iter().map(|id| id.as_ref()).collect();
        let nodes: Vec<Node> = self
            .store
            .nodes()
            .iter()
            .map(|n| Node {
                selected: wanted.contains(n.id.as_str()),
                ..n.clone()
            })
            .collect();
        if nodes.as_slice() == self.store.nodes() {
            return;
        }
        self.store.replace_nodes(nodes);
        self.graph_changed(now);
    }

    /// Start a pointer drag. The pre-drag state becomes an undo point.
    pub fn begin_drag(&mut self, node_id: &str) -> bool {
        let Some(start) = self.store.node(node_id).map(|n| n.position) else {
            warn!(node = node_id, "Drag started on unknown node");
            return false;
        };
        self.history.finish_restore();
        self.history.take_snapshot(&self.store);
        self.dragging = Some((node_id.to_string(), start));
        true
    }

    pub fn drag_to(&mut self, node_id: &str, position: Position, now: Duration) -> bool {
        let Some(node) = self.store.node(node_id) else {
            return false;
        };
        if node.position == position {
            return true;
        }
        let mut moved = AHashMap::new();
        moved.insert(node_id.to_string(), position);
        self.store.apply_positions(&moved);
        self.graph_changed(now);
        true
    }

    pub fn end_drag(&mut self, now: Duration) -> Option<String> {
        let (node_id, start) = self.dragging.take()?;
        if self.config.placeholder.enabled {
            let measured = MeasuredSize::new(&self.canvas);
            let sizes = SizeResolver::new(self.config.placeholder.default_size)
                .with(&ReportedSize)
                .with(&measured);
            self.placeholders.commit_drag(&node_id, start, self.store.state(), &sizes);
        }
        self.graph_changed(now);
        Some(node_id)
    }

    /// One animation frame.
    pub fn advance(&mut self, now: Duration) {
        self.history.finish_restore();

        if let Some(frame) = self.layout.tick(now) {
            self.store.apply_positions(&frame.positions);
            if let Some(fit) = frame.fit_view {
                debug!(duration_ms = fit.duration_ms, padding = fit.padding, "Fitting view");
                self.canvas.fit_view(fit);
            }
            self.observe_placeholders(now);
        }

        // The marker stays where the pointer holds it until the gesture ends.
        if self.config.placeholder.enabled && self.dragging.is_none() && self.debounce.fire(now) {
            self.update_placeholders(now);
        }
    }

    /// Advance in `frame` steps until idle; returns the time reached.
    pub fn settle(&mut self, mut now: Duration, frame: Duration) -> Duration {
        let step = frame.max(Duration::from_millis(1));
        for _ in 0..MAX_SETTLE_FRAMES {
            self.advance(now);
            if self.is_idle() {
                return now;
            }
            now += step;
        }
        warn!("Session did not settle");
        now
    }

    /// Re-run the placeholder update right away instead of waiting for the debounce.
    pub fn flush_placeholders(&mut self, now: Duration) {
        if self.config.placeholder.enabled {
            self.debounce.cancel();
            self.update_placeholders(now);
        }
    }

    fn graph_changed(&mut self, now: Duration) {
        self.layout.observe(self.store.state(), now);
        self.observe_placeholders(now);
    }

    fn observe_placeholders(&mut self, now: Duration) {
        if !self.config.placeholder.enabled {
            return;
        }
        let measured = MeasuredSize::new(&self.canvas);
        let sizes = SizeResolver::new(self.config.placeholder.default_size)
            .with(&ReportedSize)
            .with(&measured);
        self.placeholders.detect_drags(self.store.state(), &sizes);
        self.debounce.schedule(now);
    }

    fn update_placeholders(&mut self, now: Duration) {
        let measured = MeasuredSize::new(&self.canvas);
        let sizes = SizeResolver::new(self.config.placeholder.default_size)
            .with(&ReportedSize)
            .with(&measured);
        let next = self.placeholders.update(self.store.state(), &sizes);
        if &next == self.store.state() {
            return;
        }
        self.store.set(next);
        self.layout.observe(self.store.state(), now);
        self.placeholders.detect_drags(self.store.state(), &sizes);
    }

    fn persist(&mut self, created: &[Node]) {
        let (Some(board_id), Some(sink)) = (&self.config.board_id, self.persistence.as_mut())
        else {
            return;
        };
        if created.is_empty() {
            return;
        }
        persist_best_effort(sink.as_mut(), board_id, created);
    }
}
