//! Coordinate math for the canvas
//!
//! Pure functions only: converting pointer positions between screen and
//! document space, clamping zoom, and computing the anchor points that
//! connections attach to.

pub mod anchors;
pub mod transform;
pub mod types;

pub use anchors::{
    attachment_point, connection_endpoints, handle_anchor, target_anchor, Edge, ElementShape,
};
pub use transform::{
    clamp_zoom, to_document, to_screen, zoom_by, ViewTransform, MIN_ZOOM, ZOOM_STEP,
};
pub use types::{distance_to_segment, BoundingBox, Point};
