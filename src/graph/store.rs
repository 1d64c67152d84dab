use super::model::{Edge, Graph, Node, Position};
use ahash::AHashMap;

/// Owner of the canonical node/edge lists.
///
/// Every component reads a fresh copy and writes back a full replacement.
/// The revision counter increases on every replacement so observers can tell
/// that the collections changed without diffing them.
#[derive(Debug, Default)]
pub struct GraphStore {
    graph: Graph,
    revision: u64,
}

impl GraphStore {
    pub fn new(graph: Graph) -> Self {
        Self { graph, revision: 0 }
    }

    pub fn state(&self) -> &Graph {
        &self.graph
    }

    pub fn snapshot(&self) -> Graph {
        self.graph.clone()
    }

    pub fn nodes(&self) -> &[Node] {
        &self.graph.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.graph.edges
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.graph.node(id)
    }

    pub fn node_count(&self) -> usize {
        self.graph.nodes.len()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn replace(&mut self, nodes: Vec<Node>, edges: Vec<Edge>) {
        self.set(Graph { nodes, edges });
    }

    pub fn set(&mut self, graph: Graph) {
        self.graph = graph;
        self.revision += 1;
    }

    pub fn replace_nodes(&mut self, nodes: Vec<Node>) {
        let edges = std::mem::take(&mut self.graph.edges);
        self.replace(nodes, edges);
    }

    /// Replace the node list with one where every id in `positions` moved.
    pub fn apply_positions(&mut self, positions: &AHashMap<String, Position>) {
        let nodes = self
            .graph
            .nodes
            .iter()
            .map(|n| match positions.get(&n.id) {
                Some(&position) => Node {
                    position,
                    ..n.clone()
                },
                None => n.clone(),
            })
            .collect();
        self.replace_nodes(nodes);
    }
}
