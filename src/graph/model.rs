use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A point on the canvas, in flow coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Linear blend between `self` and `to`; `t` is expected in `[0, 1]`.
    pub fn lerp(self, to: Position, t: f64) -> Position {
        Position {
            x: self.x + (to.x - self.x) * t,
            y: self.y + (to.y - self.y) * t,
        }
    }

    pub fn offset(self, dx: f64, dy: f64) -> Position {
        Position {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// True when either axis differs by more than `threshold`.
    pub fn differs_from(self, other: Position, threshold: f64) -> bool {
        (self.x - other.x).abs() > threshold || (self.y - other.y).abs() > threshold
    }
}

/// Rendered dimensions of a node.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    #[default]
    Workflow,
    Placeholder,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeKind {
    #[default]
    Workflow,
    Placeholder,
}

/// One of the four connection points on a node's bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Handle {
    Top,
    #[default]
    Bottom,
    Left,
    Right,
}

impl Handle {
    /// Midpoint of the matching side of the box at `origin` with `size`.
    pub fn anchor(self, origin: Position, size: Size) -> Position {
        match self {
            Handle::Top => Position::new(origin.x + size.width / 2.0, origin.y),
            Handle::Bottom => Position::new(origin.x + size.width / 2.0, origin.y + size.height),
            Handle::Left => Position::new(origin.x, origin.y + size.height / 2.0),
            Handle::Right => Position::new(origin.x + size.width, origin.y + size.height / 2.0),
        }
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Handle::Top => "top",
            Handle::Bottom => "bottom",
            Handle::Left => "left",
            Handle::Right => "right",
        };
        f.write_str(name)
    }
}

/// A diagram node. Identity is the `id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    pub position: Position,
    pub label: String,
    #[serde(default)]
    pub selected: bool,
    /// Reported size, `None` until the renderer has measured the node.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<Size>,
    /// User-positioned nodes are left alone by the layout engine.
    #[serde(default)]
    pub draggable: bool,
}

impl Node {
    pub fn workflow(id: impl Into<String>, label: impl Into<String>, position: Position) -> Self {
        Self {
            id: id.into(),
            kind: NodeKind::Workflow,
            position,
            label: label.into(),
            selected: false,
            size: None,
            draggable: false,
        }
    }

    pub fn placeholder(id: impl Into<String>, label: impl Into<String>, position: Position) -> Self {
        Self {
            kind: NodeKind::Placeholder,
            ..Self::workflow(id, label, position)
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.kind == NodeKind::Placeholder
    }
}

/// A directed parent -> child connection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    pub id: String,
    pub source: String,
    pub target: String,
    #[serde(rename = "type")]
    pub kind: EdgeKind,
    #[serde(default)]
    pub source_handle: Handle,
}

impl Edge {
    pub fn new(source: impl Into<String>, target: impl Into<String>, kind: EdgeKind) -> Self {
        let source = source.into();
        let target = target.into();
        Self {
            id: Self::id_for(&source, &target),
            source,
            target,
            kind,
            source_handle: Handle::default(),
        }
    }

    pub fn with_handle(mut self, handle: Handle) -> Self {
        self.source_handle = handle;
        self
    }

    /// Edge ids are derived from their endpoints.
    pub fn id_for(source: &str, target: &str) -> String {
        format!("{}=>{}", source, target)
    }

    pub fn is_placeholder(&self) -> bool {
        self.kind == EdgeKind::Placeholder
    }
}

/// The complete node/edge state. Doubles as the immutable history snapshot.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Graph {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

impl Graph {
    pub fn new(nodes: Vec<Node>, edges: Vec<Edge>) -> Self {
        Self { nodes, edges }
    }

    /// Parse a graph from the camelCase JSON shape used by diagram front-ends.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn edge(&self, id: &str) -> Option<&Edge> {
        self.edges.iter().find(|e| e.id == id)
    }

    pub fn node_index(&self, id: &str) -> Option<usize> {
        self.nodes.iter().position(|n| n.id == id)
    }

    /// The unique incoming edge of `id`, if any.
    pub fn incoming(&self, id: &str) -> Option<&Edge> {
        self.edges.iter().find(|e| e.target == id)
    }

    pub fn parent_of(&self, id: &str) -> Option<&str> {
        self.incoming(id).map(|e| e.source.as_str())
    }

    /// Direct children of `id`, in edge order.
    pub fn children_of<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a Node> + 'a {
        self.edges
            .iter()
            .filter(move |e| e.source == id)
            .filter_map(move |e| self.node(&e.target))
    }

    pub fn placeholders(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter().filter(|n| n.is_placeholder())
    }

    pub fn positions(&self) -> AHashMap<String, Position> {
        self.nodes
            .iter()
            .map(|n| (n.id.clone(), n.position))
            .collect()
    }

    /// Count incoming edges per node; used to check the single-parent invariant.
    pub fn in_degrees(&self) -> AHashMap<&str, usize> {
        let mut degrees: AHashMap<&str, usize> =
            self.nodes.iter().map(|n| (n.id.as_str(), 0)).collect();
        for edge in &self.edges {
            *degrees.entry(edge.target.as_str()).or_insert(0) += 1;
        }
        degrees
    }

    /// True when every node has at most one incoming edge.
    pub fn is_forest(&self) -> bool {
        self.in_degrees().values().all(|&d| d <= 1)
    }

    /// Nodes without an incoming edge, in node order.
    pub fn roots(&self) -> Vec<&Node> {
        let degrees = self.in_degrees();
        self.nodes
            .iter()
            .filter(|n| degrees.get(n.id.as_str()).copied().unwrap_or(0) == 0)
            .collect()
    }
}
