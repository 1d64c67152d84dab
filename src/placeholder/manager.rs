use super::size::SizeResolver;
use crate::graph::{Edge, EdgeKind, Graph, Handle, Node, Position, Size};
use crate::mutation::remove_placeholders;
use ahash::{AHashMap, AHashSet};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// A placeholder's position relative to the handle it hangs from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HandleOffset {
    pub offset_x: f64,
    pub offset_y: f64,
    pub source_handle: Handle,
    pub target_width: f64,
    pub target_height: f64,
}

impl HandleOffset {
    pub fn apply(&self, handle_position: Position) -> Position {
        handle_position.offset(self.offset_x, self.offset_y)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlaceholderSettings {
    /// Id of the single managed placeholder.
    pub id: String,
    pub label: String,
    /// Default gap below the bottom handle.
    pub spacing: f64,
    /// Pixel distance that separates a drag from jitter.
    pub drag_threshold: f64,
}

impl Default for PlaceholderSettings {
    fn default() -> Self {
        Self {
            id: "placeholder-main".to_string(),
            label: "+".to_string(),
            spacing: 50.0,
            drag_threshold: 5.0,
        }
    }
}

/// Keeps a single "next insertion point" marker next to the active node.
///
/// The marker's position is remembered relative to a handle of its anchor, so
/// relayouts of the anchor carry the marker along while a manual drag by the
/// user is kept as the new preference.
#[derive(Debug)]
pub struct PlaceholderManager {
    settings: PlaceholderSettings,
    /// Id of the managed marker; changes when a promoted marker claims the old one.
    current_id: String,
    generation: u32,
    offsets: AHashMap<String, HandleOffset>,
    previous: AHashMap<String, Position>,
}

impl Default for PlaceholderManager {
    fn default() -> Self {
        Self::new(PlaceholderSettings::default())
    }
}

impl PlaceholderManager {
    pub fn new(settings: PlaceholderSettings) -> Self {
        Self {
            current_id: settings.id.clone(),
            settings,
            generation: 0,
            offsets: AHashMap::new(),
            previous: AHashMap::new(),
        }
    }

    pub fn settings(&self) -> &PlaceholderSettings {
        &self.settings
    }

    pub fn placeholder_id(&self) -> &str {
        &self.current_id
    }

    /// Pick a new marker id once a workflow node owns the current one.
    /// The stored offset moves along with it.
    fn reclaim_id(&mut self, graph: &Graph) {
        while graph
            .node(&self.current_id)
            .is_some_and(|n| !n.is_placeholder())
        {
            self.generation += 1;
            let next = format!("{}-{}", self.settings.id, self.generation);
            if let Some(offset) = self.offsets.remove(&self.current_id) {
                self.offsets.insert(next.clone(), offset);
            }
            debug!(from = %self.current_id, to = %next, "Placeholder id taken; switching");
            self.current_id = next;
        }
    }

    pub fn offset(&self, placeholder_id: &str) -> Option<&HandleOffset> {
        self.offsets.get(placeholder_id)
    }

    pub fn forget_offset(&mut self, placeholder_id: &str) -> Option<HandleOffset> {
        self.offsets.remove(placeholder_id)
    }

    /// The node the marker should hang from: the first selected workflow node,
    /// otherwise the lowest one on the canvas.
    pub fn target<'g>(&self, graph: &'g Graph) -> Option<&'g Node> {
        let mut workflow = graph.nodes.iter().filter(|n| !n.is_placeholder());
        if let Some(selected) = graph
            .nodes
            .iter()
            .find(|n| !n.is_placeholder() && n.selected)
        {
            return Some(selected);
        }
        let first = workflow.next()?;
        // Strictly greater keeps the earliest node on ties.
        Some(workflow.fold(first, |lowest, n| {
            if n.position.y > lowest.position.y {
                n
            } else {
                lowest
            }
        }))
    }

    pub fn handle_position(node: &Node, handle: Handle, sizes: &SizeResolver<'_>) -> Position {
        handle.anchor(node.position, sizes.resolve(node))
    }

    /// One update cycle: remove every placeholder and, when there is a target,
    /// put the managed one back at `handle + stored offset`.
    pub fn update(&mut self, graph: &Graph, sizes: &SizeResolver<'_>) -> Graph {
        let stale: AHashSet<String> = graph.placeholders().map(|n| n.id.clone()).collect();
        let mut next = remove_placeholders(graph, &stale);

        let Some(target) = self.target(graph) else {
            debug!(removed = %stale.iter().sorted().join(", "), "No placeholder target");
            return next;
        };

        self.reclaim_id(graph);
        let id = self.current_id.clone();
        let offset = match self.offsets.get(&id) {
            Some(offset) => *offset,
            None => {
                let size = sizes.resolve(target);
                let initial = self.initial_offset(size);
                self.offsets.insert(id.clone(), initial);
                initial
            }
        };
        let position = offset.apply(Self::handle_position(target, offset.source_handle, sizes));

        let mut placeholder = Node::placeholder(&id, self.settings.label.as_str(), position);
        placeholder.draggable = true;
        if let Some(existing) = graph.node(&id) {
            placeholder.size = existing.size;
            placeholder.selected = existing.selected;
        }

        debug!(
            anchor = %target.id,
            handle = %offset.source_handle,
            x = position.x,
            y = position.y,
            "Placed placeholder"
        );
        next.nodes.push(placeholder);
        next.edges.push(
            Edge::new(&target.id, &id, EdgeKind::Placeholder).with_handle(offset.source_handle),
        );
        next
    }

    fn initial_offset(&self, target_size: Size) -> HandleOffset {
        HandleOffset {
            offset_x: 0.0,
            offset_y: self.settings.spacing,
            source_handle: Handle::Bottom,
            target_width: target_size.width,
            target_height: target_size.height,
        }
    }

    /// Tell user drags apart from incidental movement and re-record offsets
    /// for the former. Returns the ids whose offset changed.
    ///
    /// A marker counts as dragged when it moved past the threshold since the
    /// last observation and also sits away from where its stored offset would
    /// put it. Movement caused by the anchor's own relayout matches the stored
    /// offset and leaves it untouched.
    pub fn detect_drags(&mut self, graph: &Graph, sizes: &SizeResolver<'_>) -> Vec<String> {
        let threshold = self.settings.drag_threshold;
        let mut dragged = Vec::new();

        for placeholder in graph.placeholders().filter(|n| n.draggable) {
            let Some(edge) = graph.incoming(&placeholder.id) else {
                continue;
            };
            let Some(anchor) = graph.node(&edge.source) else {
                continue;
            };

            let current = placeholder.position;
            let moved = self
                .previous
                .get(&placeholder.id)
                .is_some_and(|prev| current.differs_from(*prev, threshold));
            let expected = self.offsets.get(&placeholder.id).map(|offset| {
                offset.apply(Self::handle_position(anchor, offset.source_handle, sizes))
            });
            let off_expected = expected.is_none_or(|e| current.differs_from(e, threshold));

            if moved && off_expected {
                self.record_offset(&placeholder.id, current, edge, anchor, sizes);
                dragged.push(placeholder.id.clone());
            }

            self.previous.insert(placeholder.id.clone(), current);
        }

        self.previous.retain(|id, _| graph.node(id).is_some());
        dragged
    }

    /// Settle a finished pointer gesture on `placeholder_id`.
    ///
    /// A gesture arrives as many small moves, each below the threshold, so
    /// the final position is measured against where the gesture started.
    /// Returns true when a new offset was recorded.
    pub fn commit_drag(
        &mut self,
        placeholder_id: &str,
        start: Position,
        graph: &Graph,
        sizes: &SizeResolver<'_>,
    ) -> bool {
        let threshold = self.settings.drag_threshold;
        let Some(placeholder) = graph
            .node(placeholder_id)
            .filter(|n| n.is_placeholder() && n.draggable)
        else {
            return false;
        };
        let Some(edge) = graph.incoming(placeholder_id) else {
            return false;
        };
        let Some(anchor) = graph.node(&edge.source) else {
            return false;
        };

        let current = placeholder.position;
        let expected = self.offsets.get(placeholder_id).map(|offset| {
            offset.apply(Self::handle_position(anchor, offset.source_handle, sizes))
        });
        let off_expected = expected.is_none_or(|e| current.differs_from(e, threshold));
        self.previous.insert(placeholder_id.to_string(), current);

        if !current.differs_from(start, threshold) || !off_expected {
            return false;
        }
        self.record_offset(placeholder_id, current, edge, anchor, sizes);
        true
    }

    fn record_offset(
        &mut self,
        placeholder_id: &str,
        current: Position,
        edge: &Edge,
        anchor: &Node,
        sizes: &SizeResolver<'_>,
    ) {
        let handle = edge.source_handle;
        let handle_position = Self::handle_position(anchor, handle, sizes);
        let size = sizes.resolve(anchor);
        let offset = HandleOffset {
            offset_x: current.x - handle_position.x,
            offset_y: current.y - handle_position.y,
            source_handle: handle,
            target_width: size.width,
            target_height: size.height,
        };
        debug!(
            placeholder = placeholder_id,
            offset_x = offset.offset_x,
            offset_y = offset.offset_y,
            "Recorded dragged placeholder offset"
        );
        self.offsets.insert(placeholder_id.to_string(), offset);
    }
}
