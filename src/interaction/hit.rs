//! Resolving pointer positions to canvas elements
//!
//! Elements are tested topmost first: handles, then hubs, then nodes (later
//! entries drawn above earlier ones), then connections. Handle and element
//! geometry scales with the canvas; the connection tolerance is in screen
//! pixels.

use crate::config::ElementMetrics;
use crate::geometry::{distance_to_segment, Point};
use crate::model::{Document, EndpointRef, VisualLayout};

/// What lies under the pointer
#[derive(Debug, Clone, PartialEq)]
pub enum HitTarget {
    /// Connection handle of a node or hub
    Handle(EndpointRef),
    /// Body of a node or hub
    Element(EndpointRef),
    Connection(String),
    Empty,
}

impl HitTarget {
    /// The node or hub under the pointer, handle or body alike
    pub fn element(&self) -> Option<&EndpointRef> {
        match self {
            HitTarget::Handle(e) | HitTarget::Element(e) => Some(e),
            _ => None,
        }
    }
}

/// Find the topmost target at `screen` in the active flow
pub fn hit_test(doc: &Document, screen: Point, metrics: &ElementMetrics, origin: Point) -> HitTarget {
    let Some(flow) = doc.active_flow() else {
        return HitTarget::Empty;
    };
    let layout = &flow.visual_layout;
    let view = doc.view_transform(origin);
    let at = view.to_document(screen);

    if let Some(handle) = find_handle(layout, at, metrics) {
        return HitTarget::Handle(handle);
    }
    if let Some(element) = find_element(layout, at, metrics) {
        return HitTarget::Element(element);
    }
    let tolerance = metrics.connection_hit_tolerance / view.zoom;
    if let Some(id) = find_connection(layout, at, tolerance, metrics) {
        return HitTarget::Connection(id);
    }
    HitTarget::Empty
}

fn endpoints(layout: &VisualLayout) -> impl DoubleEndedIterator<Item = EndpointRef> + '_ {
    let nodes = layout.nodes.iter().map(|n| EndpointRef::node(&n.node_id));
    let hubs = layout.hubs.iter().map(|h| EndpointRef::hub(&h.id));
    nodes.chain(hubs)
}

fn find_handle(layout: &VisualLayout, at: Point, metrics: &ElementMetrics) -> Option<EndpointRef> {
    let nodes_have_handles = layout.node_handles_visible();
    endpoints(layout)
        .rev()
        .filter(|e| e.is_hub() || nodes_have_handles)
        .find(|e| {
            layout
                .handle_of(e, metrics)
                .is_some_and(|anchor| anchor.distance(at) <= metrics.handle_radius)
        })
}

fn find_element(layout: &VisualLayout, at: Point, metrics: &ElementMetrics) -> Option<EndpointRef> {
    endpoints(layout).rev().find(|e| {
        layout
            .bounds_of(e, metrics)
            .is_some_and(|bounds| bounds.contains(at))
    })
}

fn find_connection(
    layout: &VisualLayout,
    at: Point,
    tolerance: f64,
    metrics: &ElementMetrics,
) -> Option<String> {
    layout
        .segments(metrics)
        .filter(|(_, a, b)| distance_to_segment(at, *a, *b) <= tolerance)
        .last()
        .map(|(c, _, _)| c.id.clone())
}
