//! SVG generation for a flow canvas

use crate::geometry::{BoundingBox, Point};
use crate::model::{Document, EndpointRef, ItemKind, UserFlow};

use super::SvgConfig;

/// Horizontal text alignment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAnchor {
    Start,
    Middle,
}

impl TextAnchor {
    fn as_str(self) -> &'static str {
        match self {
            TextAnchor::Start => "start",
            TextAnchor::Middle => "middle",
        }
    }
}

/// Build SVG elements incrementally
pub struct SvgBuilder {
    config: SvgConfig,
    defs: Vec<String>,
    connections: Vec<String>,
    elements: Vec<String>,
    overlay: Vec<String>,
    transform: Option<String>,
}

impl SvgBuilder {
    /// Create a new SVG builder
    pub fn new(config: SvgConfig) -> Self {
        Self {
            config,
            defs: vec![],
            connections: vec![],
            elements: vec![],
            overlay: vec![],
            transform: None,
        }
    }

    fn prefix(&self) -> String {
        self.config.class_prefix.clone().unwrap_or_default()
    }

    fn class_list(&self, base: &str, classes: &[&str]) -> String {
        let prefix = self.prefix();
        std::iter::once(format!("{prefix}{base}"))
            .chain(classes.iter().map(|c| format!("{prefix}{c}")))
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn indent_str(&self) -> &'static str {
        if self.config.pretty_print {
            "    "
        } else {
            ""
        }
    }

    fn newline(&self) -> &'static str {
        if self.config.pretty_print {
            "\n"
        } else {
            ""
        }
    }

    /// Apply the canvas pan and zoom to everything drawn
    pub fn set_transform(&mut self, pan: Point, zoom: f64) {
        self.transform = Some(format!("translate({} {}) scale({})", pan.x, pan.y, zoom));
    }

    /// Add the arrowhead marker used by connections into pages
    pub fn add_arrow_marker(&mut self) {
        let prefix = self.prefix();
        self.defs.push(format!(
            r#"<marker id="{prefix}arrowhead" markerWidth="10" markerHeight="7" refX="8.5" refY="3.5" orient="auto"><polygon class="{prefix}connection-arrow-head" points="0 0, 10 3.5, 0 7"/></marker>"#
        ));
    }

    pub fn add_rect(&mut self, id: Option<&str>, bounds: &BoundingBox, base: &str, classes: &[&str]) {
        let id_attr = id.map(|i| format!(r#" id="{}""#, escape_xml(i))).unwrap_or_default();
        self.elements.push(format!(
            r#"{}<rect{} class="{}" x="{}" y="{}" width="{}" height="{}" rx="8"/>"#,
            self.indent_str(),
            id_attr,
            self.class_list(base, classes),
            bounds.x,
            bounds.y,
            bounds.width,
            bounds.height,
        ));
    }

    pub fn add_circle(&mut self, id: Option<&str>, center: Point, r: f64, base: &str, classes: &[&str]) {
        let id_attr = id.map(|i| format!(r#" id="{}""#, escape_xml(i))).unwrap_or_default();
        self.elements.push(format!(
            r#"{}<circle{} class="{}" cx="{}" cy="{}" r="{}"/>"#,
            self.indent_str(),
            id_attr,
            self.class_list(base, classes),
            center.x,
            center.y,
            r,
        ));
    }

    pub fn add_text(&mut self, text: &str, at: Point, anchor: TextAnchor, base: &str) {
        self.elements.push(format!(
            r#"{}<text class="{}" x="{}" y="{}" text-anchor="{}">{}</text>"#,
            self.indent_str(),
            self.class_list(base, &[]),
            at.x,
            at.y,
            anchor.as_str(),
            escape_xml(text)
        ));
    }

    /// Add a straight connection with its label lifted above the midpoint
    pub fn add_connection(
        &mut self,
        id: &str,
        from: Point,
        to: Point,
        label: &str,
        marker_end: bool,
        selected: bool,
    ) {
        let prefix = self.prefix();
        let indent = self.indent_str();
        let marker = if marker_end {
            format!(r#" marker-end="url(#{prefix}arrowhead)""#)
        } else {
            String::new()
        };
        let classes: &[&str] = if selected { &["selected"] } else { &[] };
        let mid = from.midpoint(to);

        self.connections.push(format!(
            r#"{indent}<path id="{}" class="{}" d="{}" fill="none"{}/>"#,
            escape_xml(id),
            self.class_list("connection-path", classes),
            path_to_d(&[from, to]),
            marker
        ));
        self.connections.push(format!(
            r#"{indent}<text class="{}" x="{}" y="{}" text-anchor="middle">{}</text>"#,
            self.class_list("connection-label", &[]),
            mid.x,
            mid.y - 8.0,
            escape_xml(label)
        ));
    }

    /// Dashed line for a connection that is still being drawn
    pub fn add_preview_line(&mut self, from: Point, to: Point) {
        self.overlay.push(format!(
            r#"{}<path class="{}" d="{}" fill="none" stroke-dasharray="5 5"/>"#,
            self.indent_str(),
            self.class_list("temp-connection", &[]),
            path_to_d(&[from, to]),
        ));
    }

    /// Build the final SVG string
    pub fn build(self, viewbox: BoundingBox) -> String {
        let padding = self.config.viewbox_padding;
        let nl = self.newline();
        let pad = if self.config.pretty_print { "  " } else { "" };
        let mut svg = String::new();

        if self.config.standalone {
            svg.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
            svg.push_str(nl);
        }

        svg.push_str(&format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="{} {} {} {}">"#,
            viewbox.x - padding,
            viewbox.y - padding,
            viewbox.width + 2.0 * padding,
            viewbox.height + 2.0 * padding
        ));
        svg.push_str(nl);

        if !self.defs.is_empty() {
            svg.push_str(pad);
            svg.push_str("<defs>");
            svg.push_str(nl);
            for def in &self.defs {
                svg.push_str(pad);
                svg.push_str(pad);
                svg.push_str(def);
                svg.push_str(nl);
            }
            svg.push_str(pad);
            svg.push_str("</defs>");
            svg.push_str(nl);
        }

        match &self.transform {
            Some(t) => svg.push_str(&format!(r#"{pad}<g transform="{t}">"#)),
            None => svg.push_str(&format!("{pad}<g>")),
        }
        svg.push_str(nl);

        // Connections sit beneath the elements they join
        for line in self
            .connections
            .iter()
            .chain(&self.elements)
            .chain(&self.overlay)
        {
            svg.push_str(line);
            svg.push_str(nl);
        }

        svg.push_str(pad);
        svg.push_str("</g>");
        svg.push_str(nl);
        svg.push_str("</svg>");
        svg
    }
}

/// Render the active flow of `doc`; an empty canvas when there is none
pub fn render_svg(doc: &Document, config: &SvgConfig, preview: Option<(Point, Point)>) -> String {
    match doc.active_flow() {
        Some(flow) => render_flow_svg(doc, flow, config, preview),
        None => SvgBuilder::new(config.clone()).build(BoundingBox::zero()),
    }
}

/// Render one flow of `doc` with the document's pan and zoom
pub fn render_flow_svg(
    doc: &Document,
    flow: &UserFlow,
    config: &SvgConfig,
    preview: Option<(Point, Point)>,
) -> String {
    let metrics = &config.metrics;
    let layout = &flow.visual_layout;
    let mut builder = SvgBuilder::new(config.clone());
    builder.set_transform(doc.canvas.pan, doc.canvas.zoom);

    let selected = |kind: ItemKind, id: &str| {
        doc.selected_item_type == Some(kind) && doc.selected_item_id.as_deref() == Some(id)
    };
    let mut content: Option<BoundingBox> = None;
    let mut grow = |bounds: BoundingBox| {
        content = Some(match content {
            Some(c) => c.union(&bounds),
            None => bounds,
        });
    };

    let segments: Vec<_> = layout.segments(metrics).collect();
    if segments.iter().any(|(c, _, _)| !c.to.is_hub()) {
        builder.add_arrow_marker();
    }
    for (conn, from, to) in segments {
        builder.add_connection(
            &conn.id,
            from,
            to,
            &conn.label,
            !conn.to.is_hub(),
            selected(ItemKind::Connection, &conn.id),
        );
    }

    let handles = layout.node_handles_visible();
    for node in &layout.nodes {
        let Some(step) = flow.step(&node.step_id) else {
            continue;
        };
        let Some(page) = doc.page(&step.page_id) else {
            continue;
        };
        let endpoint = EndpointRef::node(&node.node_id);
        let Some(bounds) = layout.bounds_of(&endpoint, metrics) else {
            continue;
        };
        let classes: &[&str] = if selected(ItemKind::Node, &node.node_id) {
            &["selected"]
        } else {
            &[]
        };
        builder.add_rect(Some(&node.node_id), &bounds, "node", classes);
        builder.add_text(
            &page.name,
            Point::new(bounds.x + 16.0, bounds.y + 28.0),
            TextAnchor::Start,
            "node-title",
        );
        builder.add_text(
            &step.action,
            Point::new(bounds.x + 16.0, bounds.y + 50.0),
            TextAnchor::Start,
            "node-action",
        );
        if handles {
            if let Some(anchor) = layout.handle_of(&endpoint, metrics) {
                builder.add_circle(None, anchor, metrics.handle_radius, "node-handle", &[]);
            }
        }
        grow(bounds);
    }

    for hub in &layout.hubs {
        let endpoint = EndpointRef::hub(&hub.id);
        let Some(bounds) = layout.bounds_of(&endpoint, metrics) else {
            continue;
        };
        let classes: &[&str] = if selected(ItemKind::Hub, &hub.id) {
            &["selected"]
        } else {
            &[]
        };
        builder.add_circle(Some(&hub.id), bounds.center(), bounds.width / 2.0, "hub", classes);
        builder.add_circle(None, bounds.center(), metrics.handle_radius, "hub-handle", &[]);
        grow(bounds);
    }

    if let Some((from, to)) = preview {
        builder.add_preview_line(from, to);
    }

    // viewBox in canvas space: content bounds after pan/zoom
    let viewbox = content
        .map(|c| {
            let view = doc.view_transform(Point::origin());
            let top_left = view.to_screen(Point::new(c.x, c.y));
            BoundingBox::new(
                top_left.x,
                top_left.y,
                c.width * doc.canvas.zoom,
                c.height * doc.canvas.zoom,
            )
        })
        .unwrap_or_else(BoundingBox::zero);
    builder.build(viewbox)
}

/// Convert a path of points to an SVG path d attribute
fn path_to_d(path: &[Point]) -> String {
    let Some((first, rest)) = path.split_first() else {
        return String::new();
    };
    let mut d = format!("M {} {}", first.x, first.y);
    for point in rest {
        d.push_str(&format!(" L {} {}", point.x, point.y));
    }
    d
}

/// Escape special XML characters
fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{IdGenerator, IdKind};
    use insta::assert_snapshot;

    fn flow_with_two_pages() -> (Document, EndpointRef, EndpointRef) {
        let mut ids = IdGenerator::new();
        let mut doc = Document::with_initial_flow(ids.next_id(IdKind::Flow));
        let login = doc.add_sitemap_page(&mut ids, "Login", None, &[]).unwrap().id;
        let home = doc.add_sitemap_page(&mut ids, "Home & Feed", None, &[]).unwrap().id;
        let a = doc
            .add_node_to_flow(&mut ids, &login, Point::new(0.0, 0.0), Point::origin())
            .unwrap();
        let b = doc
            .add_node_to_flow(&mut ids, &home, Point::new(400.0, 0.0), Point::origin())
            .unwrap();
        let (a, b) = (EndpointRef::node(a.node_id), EndpointRef::node(b.node_id));
        doc.add_connection(&mut ids, &a, &b, false).unwrap();
        (doc, a, b)
    }

    #[test]
    fn test_path_to_d() {
        let d = path_to_d(&[Point::new(0.0, 0.0), Point::new(100.0, 50.5)]);
        assert_snapshot!(d, @"M 0 0 L 100 50.5");
        assert_eq!(path_to_d(&[]), "");
    }

    #[test]
    fn test_escape_xml() {
        assert_eq!(escape_xml("a < b"), "a &lt; b");
        assert_eq!(escape_xml("a & b"), "a &amp; b");
    }

    #[test]
    fn test_render_nodes_and_connection() {
        let (doc, _, _) = flow_with_two_pages();
        let svg = render_svg(&doc, &SvgConfig::default(), None);

        assert!(svg.starts_with("<?xml"));
        assert!(svg.contains("Login"));
        assert!(svg.contains("Home &amp; Feed"));
        assert!(svg.contains("User interacts with this page."));
        assert!(svg.contains(r#"d="M 192 36 L 400 36""#));
        assert!(svg.contains(r#"marker-end="url(#fa-arrowhead)""#));
        // Label sits 8 above the midpoint
        assert!(svg.contains(r#"x="296" y="28""#));
        assert_eq!(svg.matches("fa-node-handle").count(), 2);
    }

    #[test]
    fn test_connection_into_hub_has_no_arrow() {
        let (mut doc, _, _) = flow_with_two_pages();
        let mut ids = IdGenerator::seeded_from(&doc);
        let conn_id = doc.active_flow().unwrap().visual_layout.connections[0].id.clone();
        doc.add_hub_to_connection(&mut ids, &conn_id, Point::new(290.0, 24.0), Point::origin())
            .unwrap();

        let svg = render_svg(&doc, &SvgConfig::default(), None);
        assert_eq!(svg.matches("marker-end").count(), 1);
        assert_eq!(svg.matches(r#"class="fa-hub""#).count(), 1);
    }

    #[test]
    fn test_skips_dangling_and_orphaned() {
        let (mut doc, a, _) = flow_with_two_pages();
        doc.sitemap.clear();
        doc.active_flow_mut().unwrap().visual_layout.connections[0].to = EndpointRef::hub("gone");

        let svg = render_svg(&doc, &SvgConfig::default(), None);
        assert!(!svg.contains(&format!(r#"id="{}""#, a.id)));
        assert!(!svg.contains("fa-connection-path"));
    }

    #[test]
    fn test_transform_and_preview() {
        let (mut doc, _, _) = flow_with_two_pages();
        doc.canvas.pan = Point::new(10.0, 20.0);
        doc.canvas.zoom = 1.5;
        let svg = render_svg(
            &doc,
            &SvgConfig::default(),
            Some((Point::new(192.0, 36.0), Point::new(250.0, 90.0))),
        );
        assert!(svg.contains(r#"transform="translate(10 20) scale(1.5)""#));
        assert!(svg.contains("fa-temp-connection"));
    }

    #[test]
    fn test_no_active_flow_renders_empty_canvas() {
        let mut doc = Document::with_initial_flow("flow_1");
        doc.user_flows.clear();
        let config = SvgConfig::default().with_standalone(false).with_pretty_print(false);
        let svg = render_svg(&doc, &config, None);
        assert_snapshot!(svg, @r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="-40 -40 80 80"><g></g></svg>"#);
    }
}
