use crate::error::CollaboratorError;
use crate::graph::{Node, NodeKind, Position, Size};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::cell::RefCell;
use std::rc::Rc;
use tracing::{debug, warn};

/// A created node as handed to the persistence backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeRecord {
    pub board_id: String,
    pub id: String,
    pub node_type: NodeKind,
    pub position: Position,
    pub size: Option<Size>,
    pub data: Value,
}

impl NodeRecord {
    pub fn from_node(board_id: &str, node: &Node) -> Self {
        Self {
            board_id: board_id.to_string(),
            id: node.id.clone(),
            node_type: node.kind,
            position: node.position,
            size: node.size,
            data: json!({ "label": node.label }),
        }
    }
}

/// Stores newly created nodes somewhere durable.
pub trait NodePersistence {
    fn persist_node(&mut self, record: &NodeRecord) -> Result<(), CollaboratorError>;
}

/// Lets the host keep a handle on a sink it lent to a session.
impl<T: NodePersistence> NodePersistence for Rc<RefCell<T>> {
    fn persist_node(&mut self, record: &NodeRecord) -> Result<(), CollaboratorError> {
        self.borrow_mut().persist_node(record)
    }
}

/// Hand `nodes` to `sink` one by one; failures are logged and never propagate.
///
/// Returns how many records were accepted.
pub fn persist_best_effort<'a, I>(
    sink: &mut dyn NodePersistence,
    board_id: &str,
    nodes: I,
) -> usize
where
    I: IntoIterator<Item = &'a Node>,
{
    let mut saved = 0;
    for node in nodes {
        let record = NodeRecord::from_node(board_id, node);
        match sink.persist_node(&record) {
            Ok(()) => {
                debug!(node = %record.id, board = board_id, "Persisted node");
                saved += 1;
            }
            Err(e) => warn!(node = %record.id, board = board_id, error = %e, "Could not persist node"),
        }
    }
    saved
}

/// Keeps every record in memory. Optionally fails every call, for exercising
/// the error path.
#[derive(Debug, Default)]
pub struct MemoryPersistence {
    records: Vec<NodeRecord>,
    failure: Option<CollaboratorError>,
}

impl MemoryPersistence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(error: CollaboratorError) -> Self {
        Self {
            records: Vec::new(),
            failure: Some(error),
        }
    }

    pub fn records(&self) -> &[NodeRecord] {
        &self.records
    }
}

impl NodePersistence for MemoryPersistence {
    fn persist_node(&mut self, record: &NodeRecord) -> Result<(), CollaboratorError> {
        if let Some(e) = &self.failure {
            return Err(e.clone());
        }
        self.records.push(record.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failures_are_swallowed() {
        let nodes = [Node::workflow("a", "A", Position::default())];
        let mut sink = MemoryPersistence::failing(CollaboratorError::Unauthenticated);
        assert_eq!(persist_best_effort(&mut sink, "board-1", &nodes), 0);
        assert!(sink.records().is_empty());
    }

    #[test]
    fn record_carries_label_as_data() {
        let node = Node::workflow("a", "🍕 Pizza", Position::new(1.0, 2.0));
        let record = NodeRecord::from_node("board-1", &node);
        assert_eq!(record.data["label"], "🍕 Pizza");
        assert_eq!(record.node_type, NodeKind::Workflow);
    }
}
