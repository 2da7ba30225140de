//! Screen <-> document coordinate mapping for the pan/zoom canvas.
//!
//! Node and hub positions are stored in *document* coordinates, which do not
//! change when the user pans or zooms. Pointer events arrive in *screen*
//! coordinates (client space). The two are related by
//!
//! ```text
//! doc    = (screen - origin - pan) / zoom
//! screen = doc * zoom + pan + origin
//! ```
//!
//! where `origin` is the top-left corner of the canvas viewport in client
//! space. Drag deltas are divided by the zoom; pan deltas are not.

use super::types::Point;

/// Smallest zoom factor the canvas accepts
pub const MIN_ZOOM: f64 = 0.5;

/// Increment applied by a single zoom-in / zoom-out action
pub const ZOOM_STEP: f64 = 0.1;

/// Convert a screen point to document coordinates
pub fn to_document(screen: Point, origin: Point, pan: Point, zoom: f64) -> Point {
    Point::new(
        (screen.x - origin.x - pan.x) / zoom,
        (screen.y - origin.y - pan.y) / zoom,
    )
}

/// Convert a document point to screen coordinates; inverse of [`to_document`]
pub fn to_screen(doc: Point, origin: Point, pan: Point, zoom: f64) -> Point {
    Point::new(
        doc.x * zoom + pan.x + origin.x,
        doc.y * zoom + pan.y + origin.y,
    )
}

/// Apply `delta` to `current`, never going below [`MIN_ZOOM`]
pub fn zoom_by(current: f64, delta: f64) -> f64 {
    clamp_zoom(current + delta, MIN_ZOOM)
}

/// Clamp a zoom factor to `[min_zoom, +inf)`; non-finite input falls back to `min_zoom`
pub fn clamp_zoom(zoom: f64, min_zoom: f64) -> f64 {
    if zoom.is_finite() {
        zoom.max(min_zoom)
    } else {
        min_zoom
    }
}

/// The pan/zoom state of the canvas together with the viewport origin
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewTransform {
    pub origin: Point,
    pub pan: Point,
    pub zoom: f64,
}

impl ViewTransform {
    pub fn new(origin: Point, pan: Point, zoom: f64) -> Self {
        Self { origin, pan, zoom }
    }

    pub fn identity() -> Self {
        Self::new(Point::origin(), Point::origin(), 1.0)
    }

    pub fn to_document(&self, screen: Point) -> Point {
        to_document(screen, self.origin, self.pan, self.zoom)
    }

    pub fn to_screen(&self, doc: Point) -> Point {
        to_screen(doc, self.origin, self.pan, self.zoom)
    }

    /// Convert a screen-space displacement into a document-space one
    pub fn delta_to_document(&self, delta: Point) -> Point {
        delta.scale(1.0 / self.zoom)
    }

    /// Change the zoom so that the document point under `anchor` stays under it.
    ///
    /// Returns the new `(pan, zoom)` pair.
    pub fn zoom_about(&self, anchor: Point, delta: f64, min_zoom: f64) -> (Point, f64) {
        let before = self.to_document(anchor);
        let zoom = clamp_zoom(self.zoom + delta, min_zoom);
        // screen = doc * zoom + pan + origin, solved for pan
        let pan = Point::new(
            anchor.x - self.origin.x - before.x * zoom,
            anchor.y - self.origin.y - before.y * zoom,
        );
        (pan, zoom)
    }
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self::identity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn test_identity_is_noop() {
        let p = Point::new(123.0, -45.5);
        assert_eq!(to_document(p, Point::origin(), Point::origin(), 1.0), p);
    }

    #[test]
    fn test_to_document_formula() {
        let doc = to_document(
            Point::new(250.0, 170.0),
            Point::new(50.0, 20.0),
            Point::new(100.0, 50.0),
            2.0,
        );
        assert_eq!(doc, Point::new(50.0, 50.0));
    }

    #[test]
    fn test_round_trip_both_directions() {
        let transforms = [
            ViewTransform::new(Point::new(0.0, 0.0), Point::new(0.0, 0.0), 1.0),
            ViewTransform::new(Point::new(12.0, 80.0), Point::new(-340.5, 17.25), 0.5),
            ViewTransform::new(Point::new(300.0, 64.0), Point::new(1e4, -2e3), 3.7),
        ];
        let points = [
            Point::new(0.0, 0.0),
            Point::new(100.0, 100.0),
            Point::new(-512.3, 999.9),
        ];
        for t in transforms {
            for p in points {
                assert!(t.to_document(t.to_screen(p)).approx_eq(p, EPS));
                assert!(t.to_screen(t.to_document(p)).approx_eq(p, EPS));
            }
        }
    }

    #[test]
    fn test_zoom_by_clamps_at_minimum() {
        assert!((zoom_by(1.0, ZOOM_STEP) - 1.1).abs() < EPS);
        assert!((zoom_by(0.6, -ZOOM_STEP) - 0.5).abs() < EPS);
        assert_eq!(zoom_by(0.5, -ZOOM_STEP), MIN_ZOOM);
        assert_eq!(zoom_by(1.0, -10.0), MIN_ZOOM);
    }

    #[test]
    fn test_clamp_zoom_rejects_non_finite() {
        assert_eq!(clamp_zoom(f64::NAN, 0.5), 0.5);
        assert_eq!(clamp_zoom(f64::INFINITY, 0.5), 0.5);
    }

    #[test]
    fn test_delta_is_divided_by_zoom() {
        let t = ViewTransform::new(Point::origin(), Point::new(40.0, 40.0), 2.0);
        assert_eq!(t.delta_to_document(Point::new(20.0, -10.0)), Point::new(10.0, -5.0));
    }

    #[test]
    fn test_zoom_about_keeps_anchor_fixed() {
        let t = ViewTransform::new(Point::new(10.0, 10.0), Point::new(30.0, -20.0), 1.0);
        let anchor = Point::new(400.0, 300.0);
        let before = t.to_document(anchor);

        let (pan, zoom) = t.zoom_about(anchor, 0.5, MIN_ZOOM);
        let after = ViewTransform::new(t.origin, pan, zoom);

        assert_eq!(zoom, 1.5);
        assert!(after.to_document(anchor).approx_eq(before, EPS));
    }
}
