//! Pointer gesture state machine for the flow canvas
//!
//! ```text
//!            down on handle              up over element: add_connection
//!   Idle ───────────────────▶ DrawingConnection ─────────────────────────▶ Idle
//!    │ │     down on element                up elsewhere: abandon
//!    │ └────────────────────▶ DraggingElement ──── up: commit if moved ──▶ Idle
//!    │       down on empty
//!    └──────────────────────▶ Panning ──────────── up ─────────────────────▶ Idle
//! ```
//!
//! Pointer positions are screen coordinates. The machine mutates the document
//! directly and reports through [`Outcome`] whether a history entry is due.

pub mod hit;

use tracing::debug;

use crate::config::ElementMetrics;
use crate::geometry::Point;
use crate::model::{Document, EndpointRef, GraphError, IdGenerator, ItemKind};

pub use hit::{hit_test, HitTarget};

/// What a pointer event did to the document
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Nothing changed
    Unchanged,
    /// The document changed but the change is not an undo step (pan, drag
    /// in progress, selection)
    Transient,
    /// The document changed; the boxed state is the one to return to on undo
    Commit(Box<Document>),
}

impl Outcome {
    pub fn changed(&self) -> bool {
        !matches!(self, Outcome::Unchanged)
    }
}

/// In-flight pointer gesture
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Gesture {
    #[default]
    Idle,
    Panning {
        start: Point,
        initial_pan: Point,
    },
    DraggingElement {
        element: EndpointRef,
        start: Point,
        initial: Point,
        /// Document as it was when the drag began
        snapshot: Box<Document>,
    },
    DrawingConnection {
        source: EndpointRef,
        /// Live pointer position in document coordinates
        pointer: Point,
    },
}

impl Gesture {
    pub fn is_idle(&self) -> bool {
        matches!(self, Gesture::Idle)
    }

    /// Start a gesture according to what was pressed.
    ///
    /// A drag that never saw its pointer-up is rolled back first, so its
    /// move is never left live without a history entry.
    pub fn pointer_down(
        &mut self,
        doc: &mut Document,
        ids: &mut IdGenerator,
        screen: Point,
        target: HitTarget,
        origin: Point,
    ) -> Outcome {
        let rolled_back = matches!(self, Gesture::DraggingElement { .. }) && {
            debug!("pointer down during drag, rolling it back");
            self.cancel(doc).changed()
        };
        match self.start(doc, ids, screen, target, origin) {
            Outcome::Unchanged if rolled_back => Outcome::Transient,
            outcome => outcome,
        }
    }

    fn start(
        &mut self,
        doc: &mut Document,
        ids: &mut IdGenerator,
        screen: Point,
        target: HitTarget,
        origin: Point,
    ) -> Outcome {
        match target {
            HitTarget::Handle(source) => {
                let pointer = doc.view_transform(origin).to_document(screen);
                *self = Gesture::DrawingConnection { source, pointer };
                Outcome::Unchanged
            }
            HitTarget::Element(element) => {
                let initial = doc
                    .active_flow()
                    .and_then(|f| f.visual_layout.position_of(&element));
                match initial {
                    Some(initial) => {
                        *self = Gesture::DraggingElement {
                            element,
                            start: screen,
                            initial,
                            snapshot: Box::new(doc.clone()),
                        };
                    }
                    None => debug!(element = %element.id, "pressed element is not in the active flow"),
                }
                Outcome::Unchanged
            }
            HitTarget::Connection(id) => click_connection(doc, ids, &id, screen, origin),
            HitTarget::Empty => {
                *self = Gesture::Panning {
                    start: screen,
                    initial_pan: doc.canvas.pan,
                };
                Outcome::Unchanged
            }
        }
    }

    pub fn pointer_move(&mut self, doc: &mut Document, screen: Point, origin: Point) -> Outcome {
        match self {
            Gesture::Idle => Outcome::Unchanged,
            Gesture::Panning { start, initial_pan } => {
                doc.canvas.pan = *initial_pan + (screen - *start);
                Outcome::Transient
            }
            Gesture::DraggingElement {
                element,
                start,
                initial,
                ..
            } => {
                let delta = doc.view_transform(origin).delta_to_document(screen - *start);
                match doc.update_element_position(&element.id, *initial + delta) {
                    Ok(_) => Outcome::Transient,
                    Err(e) => {
                        debug!(error = %e, "drag ignored");
                        Outcome::Unchanged
                    }
                }
            }
            Gesture::DrawingConnection { pointer, .. } => {
                *pointer = doc.view_transform(origin).to_document(screen);
                Outcome::Unchanged
            }
        }
    }

    /// Finish the gesture; `target` is what lies under the pointer on release
    pub fn pointer_up(&mut self, doc: &mut Document, ids: &mut IdGenerator, target: &HitTarget) -> Outcome {
        match std::mem::take(self) {
            Gesture::Idle | Gesture::Panning { .. } => Outcome::Unchanged,
            Gesture::DraggingElement { snapshot, .. } => {
                if *doc == *snapshot {
                    Outcome::Unchanged
                } else {
                    Outcome::Commit(snapshot)
                }
            }
            Gesture::DrawingConnection { source, .. } => match target.element() {
                Some(to) => attempt(doc, "add_connection", |d| {
                    d.add_connection(ids, &source, to, source.is_hub())
                }),
                None => {
                    debug!(source = %source.id, "connection abandoned");
                    Outcome::Unchanged
                }
            },
        }
    }

    /// Abort the gesture, undoing any uncommitted drag
    pub fn cancel(&mut self, doc: &mut Document) -> Outcome {
        match std::mem::take(self) {
            Gesture::DraggingElement {
                element, initial, ..
            } => match doc.update_element_position(&element.id, initial) {
                Ok(_) => Outcome::Transient,
                Err(_) => Outcome::Unchanged,
            },
            _ => Outcome::Unchanged,
        }
    }

    /// Temporary line from the source handle to the pointer, in document
    /// coordinates, while a connection is being drawn
    pub fn preview_line(&self, doc: &Document, metrics: &ElementMetrics) -> Option<(Point, Point)> {
        let Gesture::DrawingConnection { source, pointer } = self else {
            return None;
        };
        let start = doc.active_flow()?.visual_layout.handle_of(source, metrics)?;
        Some((start, *pointer))
    }
}

/// Click on a connection: a direct page-to-page edge is split with a hub at
/// the click point, any other edge is selected
pub fn click_connection(
    doc: &mut Document,
    ids: &mut IdGenerator,
    connection_id: &str,
    screen: Point,
    origin: Point,
) -> Outcome {
    let direct = doc
        .active_flow()
        .and_then(|f| f.visual_layout.connection(connection_id))
        .map(|c| c.is_direct());
    match direct {
        Some(true) => attempt(doc, "add_hub_to_connection", |d| {
            d.add_hub_to_connection(ids, connection_id, screen, origin)
        }),
        Some(false) => {
            doc.selected_item_id = Some(connection_id.to_string());
            doc.selected_item_type = Some(ItemKind::Connection);
            Outcome::Transient
        }
        None => {
            debug!(connection = connection_id, "clicked connection not found");
            Outcome::Unchanged
        }
    }
}

/// Run a mutator; on success the prior state becomes the undo point, on
/// failure the document is untouched and the error is dropped
pub(crate) fn attempt<T>(
    doc: &mut Document,
    operation: &'static str,
    f: impl FnOnce(&mut Document) -> Result<T, GraphError>,
) -> Outcome {
    let before = doc.clone();
    match f(doc) {
        Ok(_) => Outcome::Commit(Box::new(before)),
        Err(e) => {
            debug!(operation, error = %e, "ignored");
            Outcome::Unchanged
        }
    }
}
