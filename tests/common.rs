//! Common test utilities for building graphs, mutators and sessions.
use std::time::Duration;
use treeflow::placeholder::SizeResolver;
use treeflow::prelude::*;

/// Length of one simulated animation frame.
#[allow(dead_code)]
pub const FRAME: Duration = Duration::from_millis(16);

/// Size every node resolves to in mutator tests.
#[allow(dead_code)]
pub const NODE_SIZE: Size = Size {
    width: 100.0,
    height: 40.0,
};

#[allow(dead_code)]
pub fn ms(millis: u64) -> Duration {
    Duration::from_millis(millis)
}

/// A graph holding only the workflow root `A` at the origin.
#[allow(dead_code)]
pub fn root_only() -> Graph {
    Graph::new(vec![Node::workflow("A", "A", Position::default())], Vec::new())
}

/// `ids[0] -> ids[1] -> ...` with workflow edges, stacked 150 apart.
#[allow(dead_code)]
pub fn chain(ids: &[&str]) -> Graph {
    let nodes = ids
        .iter()
        .enumerate()
        .map(|(i, id)| Node::workflow(*id, *id, Position::new(0.0, i as f64 * 150.0)))
        .collect();
    let edges = ids
        .windows(2)
        .map(|pair| Edge::new(pair[0], pair[1], EdgeKind::Workflow))
        .collect();
    Graph::new(nodes, edges)
}

/// Runs mutations with predictable ids (`n1`, `n2`, ...) and labels (`Node 1`, ...).
#[allow(dead_code)]
pub struct Editor {
    ids: SequentialIds,
    labels: FixedLabels,
}

#[allow(dead_code)]
impl Editor {
    pub fn new() -> Self {
        Self {
            ids: SequentialIds::new("n", 1),
            labels: FixedLabels::new(Vec::<String>::new()),
        }
    }

    pub fn apply(&mut self, graph: &Graph, mutation: &Mutation) -> Graph {
        let sizes = SizeResolver::new(NODE_SIZE);
        Mutator::new(&mut self.ids, &mut self.labels, &sizes).apply(graph, mutation)
    }

    pub fn try_apply(
        &mut self,
        graph: &Graph,
        mutation: &Mutation,
    ) -> std::result::Result<Graph, MutationError> {
        let sizes = SizeResolver::new(NODE_SIZE);
        Mutator::new(&mut self.ids, &mut self.labels, &sizes).try_apply(graph, mutation)
    }

    pub fn add_child(&mut self, graph: &Graph, node: &str) -> Graph {
        self.apply(graph, &Mutation::AddChild { node: node.into() })
    }

    pub fn promote(&mut self, graph: &Graph, node: &str) -> Graph {
        self.apply(graph, &Mutation::Promote { node: node.into() })
    }

    pub fn insert_node(&mut self, graph: &Graph, edge: &str) -> Graph {
        self.apply(graph, &Mutation::InsertNode { edge: edge.into() })
    }

    pub fn insert_placeholder(&mut self, graph: &Graph, edge: &str) -> Graph {
        self.apply(graph, &Mutation::InsertPlaceholder { edge: edge.into() })
    }
}

/// A headless session over `graph` with sequential ids.
#[allow(dead_code)]
pub fn session(graph: Graph, placeholders: bool) -> Session {
    let config = EngineConfig::builder()
        .with_placeholders(placeholders)
        .build()
        .expect("default config is valid");
    session_with(graph, config)
}

#[allow(dead_code)]
pub fn session_with(graph: Graph, config: EngineConfig) -> Session {
    Session::builder()
        .with_config(config)
        .with_graph(graph)
        .with_ids(SequentialIds::new("n", 1))
        .with_labels(FixedLabels::new(Vec::<String>::new()))
        .build()
}

/// Every node has at most one incoming edge and every edge joins existing nodes.
#[allow(dead_code)]
pub fn assert_tree(graph: &Graph) {
    for edge in &graph.edges {
        assert!(graph.node(&edge.source).is_some(), "dangling source in {}", edge.id);
        assert!(graph.node(&edge.target).is_some(), "dangling target in {}", edge.id);
    }
    for node in &graph.nodes {
        let incoming = graph.edges.iter().filter(|e| e.target == node.id).count();
        assert!(incoming <= 1, "node {} has {} parents", node.id, incoming);
    }
    let mut ids: Vec<&str> = graph.nodes.iter().map(|n| n.id.as_str()).collect();
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), graph.nodes.len(), "duplicate node ids");
}

#[allow(dead_code)]
pub fn ids(graph: &Graph) -> Vec<&str> {
    graph.nodes.iter().map(|n| n.id.as_str()).collect()
}

#[allow(dead_code)]
pub fn edge_ids(graph: &Graph) -> Vec<&str> {
    graph.edges.iter().map(|e| e.id.as_str()).collect()
}
