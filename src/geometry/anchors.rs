//! Attachment points for handles and connection endpoints

use super::types::{BoundingBox, Point};

/// Visual shape of a canvas element, as far as anchoring is concerned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementShape {
    /// Page node: directional, connections leave on the right and enter on the left
    Node,
    /// Routing hub: not directional, connections attach at its center
    Hub,
}

/// Attachment edge on a bounding box
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Left,
    Right,
    Center,
}

/// Get the attachment point on a bounding box edge (vertically centered)
pub fn attachment_point(bounds: &BoundingBox, edge: Edge) -> Point {
    let y = bounds.y + bounds.height / 2.0;
    match edge {
        Edge::Left => Point::new(bounds.x, y),
        Edge::Right => Point::new(bounds.right(), y),
        Edge::Center => Point::new(bounds.x + bounds.width / 2.0, y),
    }
}

/// Where a new connection is dragged from
pub fn handle_anchor(bounds: &BoundingBox, shape: ElementShape) -> Point {
    match shape {
        ElementShape::Node => attachment_point(bounds, Edge::Right),
        ElementShape::Hub => attachment_point(bounds, Edge::Center),
    }
}

/// Where an incoming connection terminates
pub fn target_anchor(bounds: &BoundingBox, shape: ElementShape) -> Point {
    match shape {
        ElementShape::Node => attachment_point(bounds, Edge::Left),
        ElementShape::Hub => attachment_point(bounds, Edge::Center),
    }
}

/// Start and end points of a straight connection between two elements
pub fn connection_endpoints(
    from: (&BoundingBox, ElementShape),
    to: (&BoundingBox, ElementShape),
) -> (Point, Point) {
    (handle_anchor(from.0, from.1), target_anchor(to.0, to.1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_handle_is_right_center() {
        let bb = BoundingBox::new(100.0, 100.0, 192.0, 72.0);
        assert_eq!(handle_anchor(&bb, ElementShape::Node), Point::new(292.0, 136.0));
    }

    #[test]
    fn test_hub_handle_is_center() {
        let bb = BoundingBox::new(10.0, 20.0, 24.0, 24.0);
        assert_eq!(handle_anchor(&bb, ElementShape::Hub), Point::new(22.0, 32.0));
    }

    #[test]
    fn test_endpoints_node_to_node() {
        let a = BoundingBox::new(100.0, 100.0, 192.0, 72.0);
        let b = BoundingBox::new(400.0, 100.0, 192.0, 72.0);
        let (start, end) =
            connection_endpoints((&a, ElementShape::Node), (&b, ElementShape::Node));
        assert_eq!(start, Point::new(292.0, 136.0));
        assert_eq!(end, Point::new(400.0, 136.0));
    }

    #[test]
    fn test_endpoints_into_hub_use_center() {
        let a = BoundingBox::new(0.0, 0.0, 192.0, 72.0);
        let hub = BoundingBox::new(300.0, 24.0, 24.0, 24.0);
        let (_, end) = connection_endpoints((&a, ElementShape::Node), (&hub, ElementShape::Hub));
        assert_eq!(end, Point::new(312.0, 36.0));
    }
}
