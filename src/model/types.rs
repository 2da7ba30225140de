//! Entity types of the editor document
//!
//! Field names serialize in camelCase so that stored projects and exported
//! files keep the shape used by the web editor.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::geometry::{clamp_zoom, ElementShape, Point};

/// Placeholder action text given to every newly dropped step
pub const DEFAULT_STEP_ACTION: &str = "User interacts with this page.";

/// Label of an edge drawn directly between two pages
pub const USER_ACTION_LABEL: &str = "User action";

/// Label of an edge that leaves or enters a hub
pub const CONDITION_LABEL: &str = "Condition";

pub const DEFAULT_PROJECT_NAME: &str = "Untitled Project";
pub const DEFAULT_PROJECT_DESCRIPTION: &str = "A new user experience plan.";
pub const DEFAULT_FLOW_NAME: &str = "Main Flow";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Persona {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// A page of the sitemap; pages form a tree through `parent_id`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SitemapPage {
    pub id: String,
    pub name: String,
    pub path: String,
    #[serde(default)]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub persona_ids: Vec<String>,
}

/// Derive a page path from its name: `"Order History"` becomes `"/order-history"`
pub fn page_path(name: &str) -> String {
    let slug = name
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-");
    // Leading/trailing whitespace still produces a hyphen, as with a regex replace
    let lead = if name.starts_with(char::is_whitespace) { "-" } else { "" };
    let trail = if name.ends_with(char::is_whitespace) && !slug.is_empty() {
        "-"
    } else {
        ""
    };
    format!("/{}{}{}", lead, slug, trail)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Step {
    pub step_id: String,
    pub page_id: String,
    pub action: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisualNode {
    pub node_id: String,
    pub step_id: String,
    pub x: f64,
    pub y: f64,
}

impl VisualNode {
    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hub {
    pub id: String,
    pub x: f64,
    pub y: f64,
}

impl Hub {
    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// Which table a connection endpoint lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EndpointKind {
    Node,
    Hub,
}

impl EndpointKind {
    pub fn shape(self) -> ElementShape {
        match self {
            EndpointKind::Node => ElementShape::Node,
            EndpointKind::Hub => ElementShape::Hub,
        }
    }
}

/// A reference to a node or hub within one flow
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EndpointRef {
    pub kind: EndpointKind,
    pub id: String,
}

impl EndpointRef {
    pub fn node(id: impl Into<String>) -> Self {
        Self {
            kind: EndpointKind::Node,
            id: id.into(),
        }
    }

    pub fn hub(id: impl Into<String>) -> Self {
        Self {
            kind: EndpointKind::Hub,
            id: id.into(),
        }
    }

    pub fn is_hub(&self) -> bool {
        self.kind == EndpointKind::Hub
    }
}

/// Semantic kind of a connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EdgeKind {
    /// The user moves directly from one page to another
    #[default]
    UserAction,
    /// A branch through a hub
    Condition,
}

impl EdgeKind {
    pub fn for_source(is_hub_source: bool) -> Self {
        if is_hub_source {
            EdgeKind::Condition
        } else {
            EdgeKind::UserAction
        }
    }

    pub fn default_label(self) -> &'static str {
        match self {
            EdgeKind::UserAction => USER_ACTION_LABEL,
            EdgeKind::Condition => CONDITION_LABEL,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connection {
    pub id: String,
    pub from: EndpointRef,
    pub to: EndpointRef,
    pub label: String,
    #[serde(default)]
    pub kind: EdgeKind,
}

impl Connection {
    /// Both ends are page nodes, so a click splits it with a hub
    pub fn is_direct(&self) -> bool {
        !self.from.is_hub() && !self.to.is_hub()
    }
}

/// Nodes, hubs and connections of one flow
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "RawVisualLayout")]
pub struct VisualLayout {
    pub nodes: Vec<VisualNode>,
    pub hubs: Vec<Hub>,
    pub connections: Vec<Connection>,
}

impl VisualLayout {
    pub fn node(&self, node_id: &str) -> Option<&VisualNode> {
        self.nodes.iter().find(|n| n.node_id == node_id)
    }

    pub fn hub(&self, hub_id: &str) -> Option<&Hub> {
        self.hubs.iter().find(|h| h.id == hub_id)
    }

    pub fn connection(&self, connection_id: &str) -> Option<&Connection> {
        self.connections.iter().find(|c| c.id == connection_id)
    }

    /// Look an id up in the node table, then the hub table
    pub fn resolve(&self, element_id: &str) -> Option<EndpointRef> {
        if self.node(element_id).is_some() {
            Some(EndpointRef::node(element_id))
        } else if self.hub(element_id).is_some() {
            Some(EndpointRef::hub(element_id))
        } else {
            None
        }
    }

    /// Top-left corner of the referenced element, if it exists
    pub fn position_of(&self, endpoint: &EndpointRef) -> Option<Point> {
        match endpoint.kind {
            EndpointKind::Node => self.node(&endpoint.id).map(VisualNode::position),
            EndpointKind::Hub => self.hub(&endpoint.id).map(Hub::position),
        }
    }

    pub fn contains(&self, endpoint: &EndpointRef) -> bool {
        self.position_of(endpoint).is_some()
    }

    pub fn has_edge(&self, from: &EndpointRef, to: &EndpointRef) -> bool {
        self.connections
            .iter()
            .any(|c| c.from.id == from.id && c.to.id == to.id)
    }

    /// Connections whose endpoints both resolve, with the endpoint positions
    pub fn live_connections(&self) -> impl Iterator<Item = (&Connection, Point, Point)> + '_ {
        self.connections.iter().filter_map(move |c| {
            let from = self.position_of(&c.from)?;
            let to = self.position_of(&c.to)?;
            Some((c, from, to))
        })
    }

    /// Node handles are only offered once there is something to connect to
    pub fn node_handles_visible(&self) -> bool {
        self.nodes.len() > 1 || !self.hubs.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserFlow {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub persona_id: Option<String>,
    #[serde(default)]
    pub steps: Vec<Step>,
    #[serde(default)]
    pub visual_layout: VisualLayout,
}

impl UserFlow {
    /// An empty flow with no steps
    pub fn empty(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            persona_id: None,
            steps: vec![],
            visual_layout: VisualLayout::default(),
        }
    }

    pub fn step(&self, step_id: &str) -> Option<&Step> {
        self.steps.iter().find(|s| s.step_id == step_id)
    }
}

/// Kind of the currently selected item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Persona,
    Sitemap,
    Node,
    Hub,
    Connection,
}

impl std::fmt::Display for ItemKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ItemKind::Persona => "persona",
            ItemKind::Sitemap => "sitemap",
            ItemKind::Node => "node",
            ItemKind::Hub => "hub",
            ItemKind::Connection => "connection",
        };
        f.write_str(name)
    }
}

/// Pan/zoom state of the canvas
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Canvas {
    pub pan: Point,
    pub zoom: f64,
}

impl Default for Canvas {
    fn default() -> Self {
        Self {
            pan: Point::origin(),
            zoom: 1.0,
        }
    }
}

impl Canvas {
    /// Bring a stored view back into range: zoom at least `min_zoom`, a
    /// non-finite pan back to the origin. Returns whether anything changed.
    pub fn repair(&mut self, min_zoom: f64) -> bool {
        let zoom = clamp_zoom(self.zoom, min_zoom);
        let pan_ok = self.pan.x.is_finite() && self.pan.y.is_finite();
        let changed = zoom != self.zoom || !pan_ok;
        self.zoom = zoom;
        if !pan_ok {
            self.pan = Point::origin();
        }
        changed
    }
}

/// The aggregate root edited by a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub project_name: String,
    #[serde(default)]
    pub project_description: String,
    #[serde(default)]
    pub personas: Vec<Persona>,
    #[serde(default)]
    pub sitemap: Vec<SitemapPage>,
    #[serde(default)]
    pub user_flows: Vec<UserFlow>,
    #[serde(default)]
    pub active_flow_id: Option<String>,
    #[serde(default)]
    pub selected_item_id: Option<String>,
    #[serde(default)]
    pub selected_item_type: Option<ItemKind>,
    #[serde(default)]
    pub canvas: Canvas,
}

impl Document {
    /// A fresh project holding one empty flow named "Main Flow"
    pub fn with_initial_flow(flow_id: impl Into<String>) -> Self {
        let flow = UserFlow::empty(flow_id, DEFAULT_FLOW_NAME);
        Self {
            project_name: DEFAULT_PROJECT_NAME.to_string(),
            project_description: DEFAULT_PROJECT_DESCRIPTION.to_string(),
            personas: vec![],
            sitemap: vec![],
            active_flow_id: Some(flow.id.clone()),
            user_flows: vec![flow],
            selected_item_id: None,
            selected_item_type: None,
            canvas: Canvas::default(),
        }
    }

    pub fn active_flow(&self) -> Option<&UserFlow> {
        let id = self.active_flow_id.as_deref()?;
        self.flow(id)
    }

    pub fn active_flow_mut(&mut self) -> Option<&mut UserFlow> {
        let id = self.active_flow_id.clone()?;
        self.user_flows.iter_mut().find(|f| f.id == id)
    }

    pub fn flow(&self, flow_id: &str) -> Option<&UserFlow> {
        self.user_flows.iter().find(|f| f.id == flow_id)
    }

    pub fn persona(&self, persona_id: &str) -> Option<&Persona> {
        self.personas.iter().find(|p| p.id == persona_id)
    }

    pub fn page(&self, page_id: &str) -> Option<&SitemapPage> {
        self.sitemap.iter().find(|p| p.id == page_id)
    }

    /// Pages directly below `parent_id` (root pages for `None`), in insertion order
    pub fn sitemap_children(&self, parent_id: Option<&str>) -> Vec<&SitemapPage> {
        self.sitemap
            .iter()
            .filter(|p| p.parent_id.as_deref() == parent_id)
            .collect()
    }

    /// Re-point `active_flow_id` at the first flow if it is unset or stale
    pub fn ensure_active_flow(&mut self) {
        let valid = self
            .active_flow_id
            .as_deref()
            .is_some_and(|id| self.flow(id).is_some());
        if !valid {
            self.active_flow_id = self.user_flows.first().map(|f| f.id.clone());
        }
    }

    pub fn clear_selection(&mut self) {
        self.selected_item_id = None;
        self.selected_item_type = None;
    }
}

/// On-disk layout shape; accepts both tagged endpoints and bare id strings
#[derive(Deserialize)]
struct RawVisualLayout {
    #[serde(default)]
    nodes: Vec<VisualNode>,
    #[serde(default)]
    hubs: Vec<Hub>,
    #[serde(default)]
    connections: Vec<RawConnection>,
}

#[derive(Deserialize)]
struct RawConnection {
    id: String,
    from: RawEndpoint,
    to: RawEndpoint,
    #[serde(default)]
    label: Option<String>,
    #[serde(default)]
    kind: Option<EdgeKind>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawEndpoint {
    Tagged(EndpointRef),
    Bare(String),
}

impl From<RawVisualLayout> for VisualLayout {
    fn from(raw: RawVisualLayout) -> Self {
        let mut layout = VisualLayout {
            nodes: raw.nodes,
            hubs: raw.hubs,
            connections: Vec::with_capacity(raw.connections.len()),
        };

        for conn in raw.connections {
            let from = resolve_raw_endpoint(&layout, conn.from);
            let to = resolve_raw_endpoint(&layout, conn.to);
            let kind = conn.kind.unwrap_or_else(|| {
                let condition = from.is_hub() || conn.label.as_deref() == Some(CONDITION_LABEL);
                EdgeKind::for_source(condition)
            });
            let label = conn
                .label
                .unwrap_or_else(|| kind.default_label().to_string());
            layout.connections.push(Connection {
                id: conn.id,
                from,
                to,
                label,
                kind,
            });
        }

        layout
    }
}

fn resolve_raw_endpoint(layout: &VisualLayout, raw: RawEndpoint) -> EndpointRef {
    match raw {
        RawEndpoint::Tagged(endpoint) => endpoint,
        RawEndpoint::Bare(id) => layout.resolve(&id).unwrap_or_else(|| {
            // Dangling: keep the id, renderers skip it
            debug!(id = %id, "connection endpoint does not resolve");
            EndpointRef::node(id)
        }),
    }
}
