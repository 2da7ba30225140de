//! Element bounds and connection segments of a flow layout

use crate::config::ElementMetrics;
use crate::geometry::{connection_endpoints, handle_anchor, BoundingBox, Point};

use super::types::{Connection, EndpointRef, VisualLayout};

impl VisualLayout {
    /// Document-space bounds of an element, if it exists
    pub fn bounds_of(&self, endpoint: &EndpointRef, metrics: &ElementMetrics) -> Option<BoundingBox> {
        let at = self.position_of(endpoint)?;
        Some(metrics.bounds(at.x, at.y, endpoint.kind.shape()))
    }

    /// Start of a connection dragged out of `endpoint`
    pub fn handle_of(&self, endpoint: &EndpointRef, metrics: &ElementMetrics) -> Option<Point> {
        let bounds = self.bounds_of(endpoint, metrics)?;
        Some(handle_anchor(&bounds, endpoint.kind.shape()))
    }

    /// Straight segment a connection is drawn along; `None` when dangling
    pub fn segment_of(&self, conn: &Connection, metrics: &ElementMetrics) -> Option<(Point, Point)> {
        let from = self.bounds_of(&conn.from, metrics)?;
        let to = self.bounds_of(&conn.to, metrics)?;
        Some(connection_endpoints(
            (&from, conn.from.kind.shape()),
            (&to, conn.to.kind.shape()),
        ))
    }

    /// Every connection that can be drawn, with its segment
    pub fn segments<'a>(
        &'a self,
        metrics: &'a ElementMetrics,
    ) -> impl Iterator<Item = (&'a Connection, Point, Point)> + 'a {
        self.connections.iter().filter_map(move |c| {
            let (a, b) = self.segment_of(c, metrics)?;
            Some((c, a, b))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::types::{EdgeKind, Hub, VisualNode};

    fn layout() -> VisualLayout {
        VisualLayout {
            nodes: vec![VisualNode {
                node_id: "n1".into(),
                step_id: "s1".into(),
                x: 100.0,
                y: 100.0,
            }],
            hubs: vec![Hub {
                id: "h1".into(),
                x: 400.0,
                y: 124.0,
            }],
            connections: vec![Connection {
                id: "c1".into(),
                from: EndpointRef::node("n1"),
                to: EndpointRef::hub("h1"),
                label: "Condition".into(),
                kind: EdgeKind::Condition,
            }],
        }
    }

    #[test]
    fn test_segment_node_to_hub() {
        let layout = layout();
        let metrics = ElementMetrics::default();
        let (a, b) = layout.segment_of(&layout.connections[0], &metrics).unwrap();
        assert_eq!(a, Point::new(292.0, 136.0));
        assert_eq!(b, Point::new(412.0, 136.0));
    }

    #[test]
    fn test_missing_element_has_no_bounds() {
        let metrics = ElementMetrics::default();
        assert!(layout().bounds_of(&EndpointRef::node("gone"), &metrics).is_none());
    }
}
