//! Pure graph transformations triggered by user actions.
//!
//! Every operation reads a `Graph` and returns a new one; nothing is mutated
//! in place. The `try_*` methods report stale references as `MutationError`,
//! the plain methods turn them into a logged no-op.

use crate::error::MutationError;
use crate::graph::{Graph, IdGenerator, LabelGenerator};
use crate::placeholder::size::SizeResolver;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

mod ops;

pub use ops::CHILD_OFFSET_Y;
pub(crate) use ops::remove_placeholders;

/// A user action that reshapes the graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum Mutation {
    /// Click on a workflow node.
    AddChild { node: String },
    /// Click on the button of a connector.
    InsertNode { edge: String },
    /// Mark an insertion point on a connector.
    InsertPlaceholder { edge: String },
    /// Click on a placeholder.
    Promote { node: String },
    /// "Add Child" from a node's context menu.
    AddPlaceholderChild { node: String },
}

impl Mutation {
    pub fn name(&self) -> &'static str {
        match self {
            Mutation::AddChild { .. } => "add-child",
            Mutation::InsertNode { .. } => "insert-node",
            Mutation::InsertPlaceholder { .. } => "insert-placeholder",
            Mutation::Promote { .. } => "promote",
            Mutation::AddPlaceholderChild { .. } => "add-placeholder-child",
        }
    }
}

/// Carries the injected capabilities the operations need.
pub struct Mutator<'a> {
    ids: &'a mut dyn IdGenerator,
    labels: &'a mut dyn LabelGenerator,
    sizes: &'a SizeResolver<'a>,
    spacing: f64,
    placeholder_label: String,
}

impl<'a> Mutator<'a> {
    pub fn new(
        ids: &'a mut dyn IdGenerator,
        labels: &'a mut dyn LabelGenerator,
        sizes: &'a SizeResolver<'a>,
    ) -> Self {
        Self {
            ids,
            labels,
            sizes,
            spacing: 50.0,
            placeholder_label: "+".to_string(),
        }
    }

    /// Gap between a node and a placeholder created below it.
    pub fn with_spacing(mut self, spacing: f64) -> Self {
        self.spacing = spacing;
        self
    }

    pub fn with_placeholder_label(mut self, label: &str) -> Self {
        self.placeholder_label = label.to_string();
        self
    }

    pub fn try_apply(&mut self, graph: &Graph, mutation: &Mutation) -> Result<Graph, MutationError> {
        match mutation {
            Mutation::AddChild { node } => self.try_add_child(graph, node),
            Mutation::InsertNode { edge } => self.try_insert_node(graph, edge),
            Mutation::InsertPlaceholder { edge } => self.try_insert_placeholder(graph, edge),
            Mutation::Promote { node } => self.try_promote(graph, node),
            Mutation::AddPlaceholderChild { node } => self.try_add_placeholder_child(graph, node),
        }
    }

    /// Apply `mutation`; a stale reference leaves the graph unchanged.
    pub fn apply(&mut self, graph: &Graph, mutation: &Mutation) -> Graph {
        match self.try_apply(graph, mutation) {
            Ok(next) => {
                debug!(
                    mutation = mutation.name(),
                    nodes = next.nodes.len(),
                    edges = next.edges.len(),
                    "Applied mutation"
                );
                next
            }
            Err(e) => {
                warn!(mutation = mutation.name(), error = %e, "Ignoring mutation");
                graph.clone()
            }
        }
    }

    pub fn add_child(&mut self, graph: &Graph, node_id: &str) -> Graph {
        self.apply(graph, &Mutation::AddChild { node: node_id.to_string() })
    }

    pub fn insert_node(&mut self, graph: &Graph, edge_id: &str) -> Graph {
        self.apply(graph, &Mutation::InsertNode { edge: edge_id.to_string() })
    }

    pub fn insert_placeholder(&mut self, graph: &Graph, edge_id: &str) -> Graph {
        self.apply(graph, &Mutation::InsertPlaceholder { edge: edge_id.to_string() })
    }

    pub fn promote(&mut self, graph: &Graph, node_id: &str) -> Graph {
        self.apply(graph, &Mutation::Promote { node: node_id.to_string() })
    }

    pub fn add_placeholder_child(&mut self, graph: &Graph, node_id: &str) -> Graph {
        self.apply(graph, &Mutation::AddPlaceholderChild { node: node_id.to_string() })
    }
}
