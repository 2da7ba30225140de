//! Rendering of the editor document
//!
//! The session calls a [`Renderer`] after every change. [`SvgRenderer`] keeps
//! the latest SVG of the active flow; hosts with their own drawing layer
//! implement the trait themselves.

pub mod config;
pub mod svg;

pub use config::SvgConfig;
pub use svg::{render_flow_svg, render_svg, SvgBuilder};

use crate::geometry::Point;
use crate::model::Document;

/// Receives the document whenever it changes; rendering the same document
/// twice must give the same picture
pub trait Renderer {
    fn render(&mut self, doc: &Document);

    /// Render with the temporary line of a connection being drawn
    fn render_with_preview(&mut self, doc: &Document, preview: Option<(Point, Point)>) {
        let _ = preview;
        self.render(doc);
    }
}

/// Renderer that draws nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct NullRenderer;

impl Renderer for NullRenderer {
    fn render(&mut self, _doc: &Document) {}
}

/// Keeps the most recent SVG of the active flow
#[derive(Debug, Clone, Default)]
pub struct SvgRenderer {
    config: SvgConfig,
    latest: Option<String>,
    frames: usize,
}

impl SvgRenderer {
    pub fn new(config: SvgConfig) -> Self {
        Self {
            config,
            latest: None,
            frames: 0,
        }
    }

    /// The last rendered SVG, if anything was rendered yet
    pub fn latest(&self) -> Option<&str> {
        self.latest.as_deref()
    }

    /// Number of renders performed
    pub fn frames(&self) -> usize {
        self.frames
    }
}

impl Renderer for SvgRenderer {
    fn render(&mut self, doc: &Document) {
        self.render_with_preview(doc, None);
    }

    fn render_with_preview(&mut self, doc: &Document, preview: Option<(Point, Point)>) {
        self.latest = Some(render_svg(doc, &self.config, preview));
        self.frames += 1;
    }
}
