use crate::collab::canvas::Canvas;
use crate::graph::{Node, Size};

/// A way of learning how large a node is.
pub trait SizeProvider {
    fn size_of(&self, node: &Node) -> Option<Size>;
}

/// The size the renderer reported back onto the node itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReportedSize;

impl SizeProvider for ReportedSize {
    fn size_of(&self, node: &Node) -> Option<Size> {
        node.size.filter(|s| s.width > 0.0 && s.height > 0.0)
    }
}

/// On-screen measurement from the canvas, converted back to flow units.
pub struct MeasuredSize<'a, C: Canvas + ?Sized> {
    canvas: &'a C,
}

impl<'a, C: Canvas + ?Sized> MeasuredSize<'a, C> {
    pub fn new(canvas: &'a C) -> Self {
        Self { canvas }
    }
}

impl<C: Canvas + ?Sized> SizeProvider for MeasuredSize<'_, C> {
    fn size_of(&self, node: &Node) -> Option<Size> {
        let screen = self.canvas.measured_size(&node.id)?;
        let zoom = self.canvas.viewport().zoom;
        if zoom <= 0.0 {
            return None;
        }
        Some(Size::new(screen.width / zoom, screen.height / zoom))
    }
}

/// Tries each provider in priority order and falls back to a fixed size.
pub struct SizeResolver<'a> {
    providers: Vec<&'a dyn SizeProvider>,
    fallback: Size,
}

impl<'a> SizeResolver<'a> {
    pub fn new(fallback: Size) -> Self {
        Self {
            providers: Vec::new(),
            fallback,
        }
    }

    pub fn with(mut self, provider: &'a dyn SizeProvider) -> Self {
        self.providers.push(provider);
        self
    }

    pub fn resolve(&self, node: &Node) -> Size {
        self.providers
            .iter()
            .find_map(|p| p.size_of(node))
            .unwrap_or(self.fallback)
    }

    pub fn fallback(&self) -> Size {
        self.fallback
    }
}
