//! The editor session: one live document plus everything that reacts to it
//!
//! A session owns the document, its undo history, the in-flight gesture, the
//! storage backend and the renderer. Every mutation goes through the session
//! so that history, saving and rendering stay consistent:
//!
//! - a successful recorded mutation pushes the prior state onto the history;
//! - any change restarts the save debounce and re-renders;
//! - a rejected mutation changes nothing and is logged at `debug`.

use time::OffsetDateTime;
use tracing::{debug, error, info, warn};

use crate::config::EditorConfig;
use crate::geometry::{clamp_zoom, Point};
use crate::history::History;
use crate::interaction::{self, hit_test, Gesture, HitTarget, Outcome};
use crate::model::{
    Connection, Document, EndpointRef, GraphError, HubInsertion, IdGenerator, IdKind, ItemKind,
    ItemPatch, Persona, SitemapPage, UserFlow, VisualNode, DEFAULT_PROJECT_NAME,
};
use crate::persistence::{self, Clock, Debouncer, ImportError, Storage, StorageError, SystemClock};
use crate::renderer::Renderer;
use crate::selection::{InspectorEdit, Selection};

/// Whether a mutation becomes an undo step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Record {
    Commit,
    /// Change the document without an undo step, e.g. as part of a larger edit
    Skip,
}

pub struct EditorSession<S: Storage, R: Renderer, C: Clock = SystemClock> {
    config: EditorConfig,
    doc: Document,
    ids: IdGenerator,
    history: History,
    gesture: Gesture,
    saver: Debouncer,
    /// Top-left of the canvas viewport in screen coordinates
    origin: Point,
    storage: S,
    renderer: R,
    clock: C,
}

impl<S: Storage, R: Renderer> EditorSession<S, R, SystemClock> {
    /// Open the stored project using the wall clock
    pub fn open(config: EditorConfig, storage: S, renderer: R) -> Self {
        Self::load(config, storage, renderer, SystemClock::new())
    }
}

impl<S: Storage, R: Renderer, C: Clock> EditorSession<S, R, C> {
    /// Open the stored project; a missing or unreadable one starts a new
    /// project with a single empty flow
    pub fn load(config: EditorConfig, storage: S, renderer: R, clock: C) -> Self {
        let mut ids = IdGenerator::new();
        let doc = match storage.load() {
            Ok(Some(mut doc)) => {
                doc.ensure_active_flow();
                let canvas = doc.canvas;
                if doc.canvas.repair(config.min_zoom) {
                    warn!(zoom = canvas.zoom, pan = ?canvas.pan, "stored view out of range, reset");
                }
                ids.advance_past(&doc);
                info!(project = %doc.project_name, flows = doc.user_flows.len(), "opened project");
                doc
            }
            Ok(None) => {
                info!("no stored project, starting a new one");
                Document::with_initial_flow(ids.next_id(IdKind::Flow))
            }
            Err(e) => {
                warn!(error = %e, "failed to load project, starting a new one");
                Document::with_initial_flow(ids.next_id(IdKind::Flow))
            }
        };

        let mut session = Self {
            history: History::new(config.history_limit),
            saver: Debouncer::new(config.save_debounce),
            config,
            doc,
            ids,
            gesture: Gesture::Idle,
            origin: Point::origin(),
            storage,
            renderer,
            clock,
        };
        session.render();
        session
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn gesture(&self) -> &Gesture {
        &self.gesture
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Tell the session where the canvas viewport sits on screen
    pub fn set_viewport_origin(&mut self, origin: Point) {
        self.origin = origin;
    }

    // Graph mutations

    pub fn add_persona(&mut self, name: &str, description: &str) -> Persona {
        let before = self.doc.clone();
        let persona = self.doc.add_persona(&mut self.ids, name, description);
        self.commit(before);
        persona
    }

    pub fn add_sitemap_page(
        &mut self,
        name: &str,
        parent_id: Option<&str>,
        persona_ids: &[String],
    ) -> Result<SitemapPage, GraphError> {
        self.apply(Record::Commit, "add_sitemap_page", |doc, ids| {
            doc.add_sitemap_page(ids, name, parent_id, persona_ids)
        })
    }

    pub fn add_user_flow(&mut self, name: &str) -> UserFlow {
        let before = self.doc.clone();
        let flow = self.doc.add_user_flow(&mut self.ids, name);
        self.commit(before);
        flow
    }

    /// Switch flows; not an undo step
    pub fn set_active_flow(&mut self, flow_id: &str) -> Result<(), GraphError> {
        self.apply(Record::Skip, "set_active_flow", |doc, _| {
            doc.set_active_flow(flow_id)
        })
    }

    /// Drop a page onto the canvas at a screen position
    pub fn add_node_to_flow(&mut self, page_id: &str, screen: Point) -> Result<VisualNode, GraphError> {
        let origin = self.origin;
        self.apply(Record::Commit, "add_node_to_flow", |doc, ids| {
            doc.add_node_to_flow(ids, page_id, screen, origin)
        })
    }

    pub fn update_element_position(
        &mut self,
        element_id: &str,
        position: Point,
        record: Record,
    ) -> Result<EndpointRef, GraphError> {
        self.apply(record, "update_element_position", |doc, _| {
            doc.update_element_position(element_id, position)
        })
    }

    pub fn add_connection(
        &mut self,
        from: &EndpointRef,
        to: &EndpointRef,
        is_hub_source: bool,
    ) -> Result<Connection, GraphError> {
        self.apply(Record::Commit, "add_connection", |doc, ids| {
            doc.add_connection(ids, from, to, is_hub_source)
        })
    }

    pub fn delete_connection(&mut self, connection_id: &str, record: Record) -> Result<Connection, GraphError> {
        self.apply(record, "delete_connection", |doc, _| {
            let removed = doc.delete_connection(connection_id)?;
            if Selection::of(doc) == Some(Selection::new(connection_id, ItemKind::Connection)) {
                doc.clear_selection();
            }
            Ok(removed)
        })
    }

    /// Split a connection with a hub at a screen position; one undo step
    pub fn add_hub_to_connection(
        &mut self,
        connection_id: &str,
        screen: Point,
    ) -> Result<HubInsertion, GraphError> {
        let origin = self.origin;
        self.apply(Record::Commit, "add_hub_to_connection", |doc, ids| {
            doc.add_hub_to_connection(ids, connection_id, screen, origin)
        })
    }

    pub fn update_item_details(&mut self, id: &str, patch: &ItemPatch) -> Result<(), GraphError> {
        self.apply(Record::Commit, "update_item_details", |doc, _| {
            doc.update_item_details(id, patch)
        })
    }

    // Project details

    /// Rename the project; an empty name falls back to the default
    pub fn rename_project(&mut self, name: &str) {
        let name = name.trim();
        let name = if name.is_empty() { DEFAULT_PROJECT_NAME } else { name };
        if self.doc.project_name == name {
            return;
        }
        let before = self.doc.clone();
        self.doc.project_name = name.to_string();
        self.commit(before);
    }

    /// Not an undo step
    pub fn set_project_description(&mut self, description: &str) {
        if self.doc.project_description != description {
            self.doc.project_description = description.to_string();
            self.touch();
        }
    }

    // Selection and inspector

    pub fn selection(&self) -> Option<Selection> {
        Selection::of(&self.doc)
    }

    pub fn select(&mut self, id: &str, kind: ItemKind) {
        Selection::new(id, kind).apply(&mut self.doc);
        self.touch();
    }

    pub fn clear_selection(&mut self) {
        if Selection::of(&self.doc).is_some() {
            self.doc.clear_selection();
            self.touch();
        }
    }

    /// Apply an inspector edit to the selected item.
    ///
    /// Returns `Ok(false)` when nothing is selected or the selected kind has
    /// no such field.
    pub fn edit_selected(&mut self, edit: &InspectorEdit) -> Result<bool, GraphError> {
        let Some(selection) = self.selection() else {
            return Ok(false);
        };
        let Some(patch) = edit.to_patch(selection.kind) else {
            debug!(kind = %selection.kind, ?edit, "field does not apply to selection");
            return Ok(false);
        };
        self.update_item_details(&selection.id, &patch)?;
        Ok(true)
    }

    /// Delete the selected connection and clear the selection
    pub fn delete_selected_connection(&mut self) -> Result<Option<Connection>, GraphError> {
        match self.selection() {
            Some(Selection {
                id,
                kind: ItemKind::Connection,
            }) => self.delete_connection(&id, Record::Commit).map(Some),
            _ => Ok(None),
        }
    }

    // Canvas

    pub fn zoom_in(&mut self) {
        let zoom = self.doc.canvas.zoom + self.config.zoom_step;
        self.set_zoom(zoom);
    }

    pub fn zoom_out(&mut self) {
        let zoom = self.doc.canvas.zoom - self.config.zoom_step;
        self.set_zoom(zoom);
    }

    /// Zoom by `delta` keeping the document point under `anchor` in place
    pub fn zoom_at(&mut self, anchor: Point, delta: f64) {
        let view = self.doc.view_transform(self.origin);
        let (pan, zoom) = view.zoom_about(anchor, delta, self.config.min_zoom);
        if pan != self.doc.canvas.pan || zoom != self.doc.canvas.zoom {
            self.doc.canvas.pan = pan;
            self.doc.canvas.zoom = zoom;
            self.touch();
        }
    }

    fn set_zoom(&mut self, zoom: f64) {
        let zoom = clamp_zoom(zoom, self.config.min_zoom);
        if zoom != self.doc.canvas.zoom {
            self.doc.canvas.zoom = zoom;
            self.touch();
        }
    }

    // Pointer input

    pub fn pointer_down(&mut self, screen: Point) -> Outcome {
        let target = self.hit_test(screen);
        self.pointer_down_on(screen, target)
    }

    /// Pointer-down where the host has already resolved the target
    pub fn pointer_down_on(&mut self, screen: Point, target: HitTarget) -> Outcome {
        let outcome = self
            .gesture
            .pointer_down(&mut self.doc, &mut self.ids, screen, target, self.origin);
        self.settle(outcome)
    }

    pub fn pointer_move(&mut self, screen: Point) -> Outcome {
        let outcome = self.gesture.pointer_move(&mut self.doc, screen, self.origin);
        self.settle(outcome)
    }

    pub fn pointer_up(&mut self, screen: Point) -> Outcome {
        let target = self.hit_test(screen);
        self.pointer_up_on(&target)
    }

    pub fn pointer_up_on(&mut self, target: &HitTarget) -> Outcome {
        let outcome = self.gesture.pointer_up(&mut self.doc, &mut self.ids, target);
        self.settle(outcome)
    }

    /// Abandon the current gesture without leaving anything behind
    pub fn cancel_gesture(&mut self) -> Outcome {
        let outcome = self.gesture.cancel(&mut self.doc);
        self.settle(outcome)
    }

    /// Click on a connection: split a direct edge, select any other
    pub fn click_connection(&mut self, connection_id: &str, screen: Point) -> Outcome {
        let outcome = interaction::click_connection(
            &mut self.doc,
            &mut self.ids,
            connection_id,
            screen,
            self.origin,
        );
        self.settle(outcome)
    }

    pub fn hit_test(&self, screen: Point) -> HitTarget {
        hit_test(&self.doc, screen, &self.config.metrics, self.origin)
    }

    /// Temporary connection line while one is being drawn
    pub fn preview_line(&self) -> Option<(Point, Point)> {
        self.gesture.preview_line(&self.doc, &self.config.metrics)
    }

    // History

    /// Step back one change; pan and zoom stay where they are
    pub fn undo(&mut self) -> bool {
        match self.history.undo(self.doc.clone()) {
            Some(previous) => {
                self.restore(previous);
                true
            }
            None => false,
        }
    }

    pub fn redo(&mut self) -> bool {
        match self.history.redo(self.doc.clone()) {
            Some(next) => {
                self.restore(next);
                true
            }
            None => false,
        }
    }

    fn restore(&mut self, mut doc: Document) {
        self.gesture = Gesture::Idle;
        doc.canvas = self.doc.canvas;
        if Selection::of(&doc).is_some_and(|s| !s.resolves(&doc)) {
            doc.clear_selection();
        }
        self.doc = doc;
        self.touch();
    }

    // Import / export

    /// Replace the project with an exported file; one undo step
    pub fn import_json(&mut self, input: &str) -> Result<(), ImportError> {
        let imported = persistence::import_json(input)?;
        self.ids.advance_past(&imported);
        self.gesture = Gesture::Idle;
        let before = std::mem::replace(&mut self.doc, imported);
        self.commit(before);
        Ok(())
    }

    pub fn export_json(&self) -> Result<String, serde_json::Error> {
        persistence::export_json(&self.doc, OffsetDateTime::now_utc())
    }

    pub fn export_file_name(&self) -> String {
        persistence::export_file_name(&self.doc.project_name)
    }

    // Saving

    /// Perform the pending save once the document has been quiet long
    /// enough; returns whether a save happened
    pub fn tick(&mut self) -> Result<bool, StorageError> {
        if !self.saver.poll(self.clock.now()) {
            return Ok(false);
        }
        self.save().map(|_| true)
    }

    /// Save now if a save is pending
    pub fn flush(&mut self) -> Result<bool, StorageError> {
        if !self.saver.is_pending() {
            return Ok(false);
        }
        self.saver.cancel();
        self.save().map(|_| true)
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.saver.is_pending()
    }

    fn save(&mut self) -> Result<(), StorageError> {
        match self.storage.save(&self.doc) {
            Ok(()) => {
                debug!(project = %self.doc.project_name, "project saved");
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "failed to save project");
                Err(e)
            }
        }
    }

    // Internals

    /// Run a graph mutation; on success record `before` if asked and anything
    /// changed, on failure leave everything as it was
    fn apply<T>(
        &mut self,
        record: Record,
        operation: &'static str,
        f: impl FnOnce(&mut Document, &mut IdGenerator) -> Result<T, GraphError>,
    ) -> Result<T, GraphError> {
        let before = self.doc.clone();
        match f(&mut self.doc, &mut self.ids) {
            Ok(value) => {
                if self.doc != before {
                    match record {
                        Record::Commit => self.commit(before),
                        Record::Skip => self.touch(),
                    }
                }
                Ok(value)
            }
            Err(e) => {
                debug!(operation, error = %e, "ignored");
                Err(e)
            }
        }
    }

    fn settle(&mut self, outcome: Outcome) -> Outcome {
        match &outcome {
            Outcome::Commit(before) => {
                self.history.commit(before.as_ref().clone());
                self.touch();
            }
            Outcome::Transient => self.touch(),
            // The preview line follows the pointer even though nothing changed
            Outcome::Unchanged => self.render(),
        }
        outcome
    }

    fn commit(&mut self, before: Document) {
        self.history.commit(before);
        self.touch();
    }

    /// The document changed: restart the save debounce and redraw
    fn touch(&mut self) {
        self.saver.touch(self.clock.now());
        self.render();
    }

    fn render(&mut self) {
        let preview = self.gesture.preview_line(&self.doc, &self.config.metrics);
        self.renderer.render_with_preview(&self.doc, preview);
    }
}
