use crate::graph::{Position, Size};
use ahash::AHashMap;

/// Current pan and zoom of the rendering surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub x: f64,
    pub y: f64,
    pub zoom: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            zoom: 1.0,
        }
    }
}

impl Viewport {
    /// Convert a screen-space point into flow coordinates.
    pub fn screen_to_flow(&self, screen: Position) -> Position {
        Position::new((screen.x - self.x) / self.zoom, (screen.y - self.y) / self.zoom)
    }

    pub fn flow_to_screen(&self, flow: Position) -> Position {
        Position::new(flow.x * self.zoom + self.x, flow.y * self.zoom + self.y)
    }
}

/// Parameters of a "fit all nodes into view" request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitViewOptions {
    pub duration_ms: u64,
    pub padding: f64,
}

/// The rendering surface the engine drives.
///
/// Node and edge lists live in the `GraphStore`; the canvas only answers
/// measurement and viewport questions and executes view commands.
pub trait Canvas {
    /// On-screen size of a rendered node, `None` when it is not mounted yet.
    fn measured_size(&self, node_id: &str) -> Option<Size>;

    fn viewport(&self) -> Viewport;

    fn fit_view(&mut self, options: FitViewOptions);
}

/// A canvas without a screen: sizes are whatever the caller registered.
#[derive(Debug, Default)]
pub struct HeadlessCanvas {
    sizes: AHashMap<String, Size>,
    viewport: Viewport,
    fit_requests: Vec<FitViewOptions>,
}

impl HeadlessCanvas {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_viewport(viewport: Viewport) -> Self {
        Self {
            viewport,
            ..Self::default()
        }
    }

    /// Register an on-screen size, as a renderer would after mounting a node.
    pub fn mount(&mut self, node_id: impl Into<String>, screen_size: Size) {
        self.sizes.insert(node_id.into(), screen_size);
    }

    pub fn unmount(&mut self, node_id: &str) {
        self.sizes.remove(node_id);
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    pub fn fit_requests(&self) -> &[FitViewOptions] {
        &self.fit_requests
    }
}

impl Canvas for HeadlessCanvas {
    fn measured_size(&self, node_id: &str) -> Option<Size> {
        self.sizes.get(node_id).copied()
    }

    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn fit_view(&mut self, options: FitViewOptions) {
        self.fit_requests.push(options);
    }
}
