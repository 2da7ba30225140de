//! Flow Architect - the editing core of a user-flow diagram tool
//!
//! A project holds personas, a sitemap of pages and any number of user flows.
//! Each flow is drawn on a pan/zoom canvas as page nodes, routing hubs and
//! labelled connections. This library provides the document model with
//! validated mutators, snapshot undo/redo, the pointer gesture state machine,
//! debounced persistence, JSON import/export and an SVG renderer.
//!
//! # Example
//!
//! ```rust
//! use flow_architect::{EditorConfig, EditorSession, EndpointRef, MemoryStorage, NullRenderer, Point};
//!
//! let mut session = EditorSession::open(EditorConfig::default(), MemoryStorage::new(), NullRenderer);
//! let login = session.add_sitemap_page("Login", None, &[]).unwrap();
//! let home = session.add_sitemap_page("Home", None, &[]).unwrap();
//! let a = session.add_node_to_flow(&login.id, Point::new(100.0, 100.0)).unwrap();
//! let b = session.add_node_to_flow(&home.id, Point::new(400.0, 100.0)).unwrap();
//!
//! let conn = session
//!     .add_connection(&EndpointRef::node(&a.node_id), &EndpointRef::node(&b.node_id), false)
//!     .unwrap();
//! assert_eq!(conn.label, "User action");
//!
//! session.undo();
//! assert!(session.document().active_flow().unwrap().visual_layout.connections.is_empty());
//! ```

pub mod config;
pub mod error;
pub mod geometry;
pub mod history;
pub mod interaction;
pub mod model;
pub mod persistence;
pub mod renderer;
pub mod selection;
pub mod session;

pub use config::{ConfigError, EditorConfig, ElementMetrics};
pub use error::EditorError;
pub use geometry::{BoundingBox, Point, ViewTransform};
pub use history::History;
pub use interaction::{Gesture, HitTarget, Outcome};
pub use model::{
    Connection, Document, EdgeKind, EndpointKind, EndpointRef, GraphError, ItemKind, ItemPatch,
};
pub use persistence::{
    ImportError, JsonFileStorage, ManualClock, MemoryStorage, Storage, StorageError, SystemClock,
};
pub use renderer::{NullRenderer, Renderer, SvgConfig, SvgRenderer};
pub use selection::{InspectorEdit, Selection};
pub use session::{EditorSession, Record};

/// Render a stored project (the JSON a [`JsonFileStorage`] writes) to SVG
///
/// `flow_id` picks the flow to draw; by default the document's active flow.
///
/// # Example
///
/// ```rust
/// use flow_architect::{render_project, Document, SvgConfig};
///
/// let json = serde_json::to_string(&Document::with_initial_flow("flow_1")).unwrap();
/// let svg = render_project(&json, None, &SvgConfig::default()).unwrap();
/// assert!(svg.contains("<svg"));
/// ```
pub fn render_project(
    json: &str,
    flow_id: Option<&str>,
    config: &SvgConfig,
) -> Result<String, EditorError> {
    let mut doc: Document = serde_json::from_str(json)?;
    match flow_id {
        Some(id) => doc
            .set_active_flow(id)
            .map_err(|_| EditorError::UnknownFlow(id.to_string()))?,
        None => doc.ensure_active_flow(),
    }
    Ok(renderer::render_svg(&doc, config, None))
}
