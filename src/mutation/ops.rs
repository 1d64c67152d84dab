use super::Mutator;
use crate::error::MutationError;
use crate::graph::{Edge, EdgeKind, Graph, Node, NodeKind};
use ahash::AHashSet;

/// Vertical distance used for the provisional position of freshly created nodes.
pub const CHILD_OFFSET_Y: f64 = 150.0;

impl Mutator<'_> {
    /// Append a workflow child (with its own trailing placeholder) under `node_id`.
    pub fn try_add_child(&mut self, graph: &Graph, node_id: &str) -> Result<Graph, MutationError> {
        let parent = graph
            .node(node_id)
            .ok_or_else(|| MutationError::NodeNotFound(node_id.to_string()))?;

        let child_id = self.ids.next_id();
        let placeholder_id = self.ids.next_id();

        let child_position = parent.position.offset(0.0, CHILD_OFFSET_Y);
        let child = Node::workflow(&child_id, self.labels.next_label(), child_position);
        let placeholder = Node::placeholder(
            &placeholder_id,
            self.placeholder_label.as_str(),
            child_position.offset(0.0, CHILD_OFFSET_Y),
        );

        let stale = placeholder_children(graph, node_id);
        let mut next = remove_placeholders(graph, &stale);
        next.nodes.push(child);
        next.nodes.push(placeholder);
        next.edges.push(Edge::new(node_id, &child_id, EdgeKind::Workflow));
        next.edges.push(Edge::new(&child_id, &placeholder_id, EdgeKind::Placeholder));
        Ok(next)
    }

    /// Replace `edge_id` (S -> T) with S -> new -> T using a workflow node.
    pub fn try_insert_node(&mut self, graph: &Graph, edge_id: &str) -> Result<Graph, MutationError> {
        let edge = graph
            .edge(edge_id)
            .ok_or_else(|| MutationError::EdgeNotFound(edge_id.to_string()))?;
        let target = graph
            .node(&edge.target)
            .ok_or_else(|| MutationError::NodeNotFound(edge.target.clone()))?;

        // Start at the target's spot so the new node does not jump in from the origin.
        let inserted = Node::workflow(self.ids.next_id(), self.labels.next_label(), target.position);
        Ok(splice_into_edge(graph, edge, inserted, EdgeKind::Workflow))
    }

    /// Replace `edge_id` (S -> T) with S -> placeholder -> T.
    pub fn try_insert_placeholder(
        &mut self,
        graph: &Graph,
        edge_id: &str,
    ) -> Result<Graph, MutationError> {
        let edge = graph
            .edge(edge_id)
            .ok_or_else(|| MutationError::EdgeNotFound(edge_id.to_string()))?;
        let source = graph
            .node(&edge.source)
            .ok_or_else(|| MutationError::NodeNotFound(edge.source.clone()))?;
        if graph.node(&edge.target).is_none() {
            return Err(MutationError::NodeNotFound(edge.target.clone()));
        }

        let below_source = source
            .position
            .offset(0.0, self.sizes.resolve(source).height + self.spacing);
        let placeholder = Node::placeholder(
            self.ids.next_id(),
            self.placeholder_label.as_str(),
            below_source,
        );
        Ok(splice_into_edge(graph, edge, placeholder, EdgeKind::Placeholder))
    }

    /// Commit placeholder `node_id` as a workflow node.
    ///
    /// A committed leaf gets a fresh trailing placeholder. A placeholder that
    /// was inserted between two nodes already has a child, so its outgoing
    /// placeholder edges are committed instead.
    pub fn try_promote(&mut self, graph: &Graph, node_id: &str) -> Result<Graph, MutationError> {
        let node = graph
            .node(node_id)
            .ok_or_else(|| MutationError::NodeNotFound(node_id.to_string()))?;
        if node.kind != NodeKind::Placeholder {
            return Err(MutationError::NotAPlaceholder(node_id.to_string()));
        }

        let has_committed_children = graph.children_of(node_id).any(|c| !c.is_placeholder());
        let origin = node.position;
        let label = self.labels.next_label();

        let mut nodes: Vec<Node> = graph
            .nodes
            .iter()
            .map(|n| {
                if n.id == node_id {
                    Node {
                        kind: NodeKind::Workflow,
                        label: label.clone(),
                        draggable: false,
                        ..n.clone()
                    }
                } else {
                    n.clone()
                }
            })
            .collect();

        let mut edges: Vec<Edge> = graph
            .edges
            .iter()
            .map(|e| {
                let commits_incoming = e.target == node_id;
                let commits_outgoing = e.source == node_id
                    && graph.node(&e.target).is_some_and(|t| !t.is_placeholder());
                if commits_incoming || commits_outgoing {
                    Edge {
                        kind: EdgeKind::Workflow,
                        ..e.clone()
                    }
                } else {
                    e.clone()
                }
            })
            .collect();

        if !has_committed_children {
            let placeholder_id = self.ids.next_id();
            nodes.push(Node::placeholder(
                &placeholder_id,
                self.placeholder_label.as_str(),
                origin,
            ));
            edges.push(Edge::new(node_id, &placeholder_id, EdgeKind::Placeholder));
        }

        Ok(Graph { nodes, edges })
    }

    /// Show where the next child of `node_id` will go, replacing older markers.
    pub fn try_add_placeholder_child(
        &mut self,
        graph: &Graph,
        node_id: &str,
    ) -> Result<Graph, MutationError> {
        let parent = graph
            .node(node_id)
            .ok_or_else(|| MutationError::NodeNotFound(node_id.to_string()))?;

        let placeholder_id = self.ids.next_id();
        let below = parent
            .position
            .offset(0.0, self.sizes.resolve(parent).height + self.spacing);
        let placeholder = Node::placeholder(&placeholder_id, self.placeholder_label.as_str(), below);

        let stale = placeholder_children(graph, node_id);
        let mut next = remove_placeholders(graph, &stale);
        next.nodes.push(placeholder);
        next.edges.push(Edge::new(node_id, &placeholder_id, EdgeKind::Placeholder));
        Ok(next)
    }
}

/// Ids of the placeholder nodes directly below `node_id`.
pub(crate) fn placeholder_children(graph: &Graph, node_id: &str) -> AHashSet<String> {
    graph
        .children_of(node_id)
        .filter(|c| c.is_placeholder())
        .map(|c| c.id.clone())
        .collect()
}

/// Drop the given placeholder nodes and their edges.
///
/// Children hanging below a removed placeholder are re-attached to the
/// placeholder's parent with workflow edges, keeping every node single-parent.
pub(crate) fn remove_placeholders(graph: &Graph, removed: &AHashSet<String>) -> Graph {
    if removed.is_empty() {
        return graph.clone();
    }

    let nodes = graph
        .nodes
        .iter()
        .filter(|n| !removed.contains(&n.id))
        .cloned()
        .collect();

    let mut edges: Vec<Edge> = graph
        .edges
        .iter()
        .filter(|e| !removed.contains(&e.source) && !removed.contains(&e.target))
        .cloned()
        .collect();

    for id in graph.nodes.iter().map(|n| &n.id).filter(|id| removed.contains(*id)) {
        // Walk up through chains of removed placeholders to a surviving ancestor.
        // Bounded so a malformed cycle of placeholders cannot spin forever.
        let mut ancestor = graph.parent_of(id);
        for _ in 0..removed.len() {
            match ancestor {
                Some(candidate) if removed.contains(candidate) => {
                    ancestor = graph.parent_of(candidate);
                }
                _ => break,
            }
        }
        let ancestor = ancestor.filter(|a| !removed.contains(*a));
        let Some(ancestor) = ancestor else {
            continue;
        };
        for child in graph.edges.iter().filter(|e| &e.source == id) {
            if removed.contains(&child.target) {
                continue;
            }
            edges.push(Edge::new(ancestor, &child.target, EdgeKind::Workflow));
        }
    }

    Graph { nodes, edges }
}

/// Put `inserted` between the endpoints of `edge`, placing it right before the target in node order.
fn splice_into_edge(graph: &Graph, edge: &Edge, inserted: Node, kind: EdgeKind) -> Graph {
    let inserted_id = inserted.id.clone();

    let mut edges: Vec<Edge> = graph
        .edges
        .iter()
        .filter(|e| e.id != edge.id)
        .cloned()
        .collect();
    edges.push(Edge::new(&edge.source, &inserted_id, kind).with_handle(edge.source_handle));
    edges.push(Edge::new(&inserted_id, &edge.target, kind));

    let mut nodes = graph.nodes.clone();
    let index = graph.node_index(&edge.target).unwrap_or(nodes.len());
    nodes.insert(index, inserted);

    Graph { nodes, edges }
}
