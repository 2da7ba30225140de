//! Invariant-preserving mutators on the document
//!
//! Each mutator validates its request first and only then touches the
//! document, so an `Err` always means "nothing changed". History and
//! persistence are the session's business; nothing here records snapshots.

use crate::geometry::{Point, ViewTransform};

use super::error::GraphError;
use super::ids::{IdGenerator, IdKind};
use super::patch::{ConnectionPatch, ItemPatch, PersonaPatch, SitemapPagePatch};
use super::types::*;

/// Result of splitting a connection with a hub
#[derive(Debug, Clone, PartialEq)]
pub struct HubInsertion {
    pub hub: Hub,
    /// Original source to the new hub
    pub incoming: Connection,
    /// New hub to the original target
    pub outgoing: Connection,
    /// The connection that was replaced
    pub removed: Connection,
}

impl Document {
    /// Pan/zoom of this document combined with the viewport origin
    pub fn view_transform(&self, origin: Point) -> ViewTransform {
        ViewTransform::new(origin, self.canvas.pan, self.canvas.zoom)
    }

    pub fn add_persona(
        &mut self,
        ids: &mut IdGenerator,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Persona {
        let persona = Persona {
            id: ids.next_id(IdKind::Persona),
            name: name.into(),
            description: description.into(),
        };
        self.personas.push(persona.clone());
        persona
    }

    /// Add a page; its path is derived from the name
    pub fn add_sitemap_page(
        &mut self,
        ids: &mut IdGenerator,
        name: &str,
        parent_id: Option<&str>,
        persona_ids: &[String],
    ) -> Result<SitemapPage, GraphError> {
        if let Some(parent) = parent_id {
            if self.page(parent).is_none() {
                return Err(GraphError::invalid_reference("parentId", "page", parent));
            }
        }
        let persona_ids = self.checked_persona_ids(persona_ids)?;

        let page = SitemapPage {
            id: ids.next_id(IdKind::Page),
            name: name.to_string(),
            path: page_path(name),
            parent_id: parent_id.map(String::from),
            description: String::new(),
            persona_ids,
        };
        self.sitemap.push(page.clone());
        Ok(page)
    }

    /// Create an empty flow and make it the active one
    pub fn add_user_flow(&mut self, ids: &mut IdGenerator, name: impl Into<String>) -> UserFlow {
        let flow = UserFlow::empty(ids.next_id(IdKind::Flow), name);
        self.active_flow_id = Some(flow.id.clone());
        self.user_flows.push(flow.clone());
        flow
    }

    pub fn set_active_flow(&mut self, flow_id: &str) -> Result<(), GraphError> {
        if self.flow(flow_id).is_none() {
            return Err(GraphError::not_found("flow", flow_id));
        }
        self.active_flow_id = Some(flow_id.to_string());
        Ok(())
    }

    /// Drop a page onto the active flow at a screen position.
    ///
    /// Creates a step with the placeholder action and a node at the matching
    /// document position.
    pub fn add_node_to_flow(
        &mut self,
        ids: &mut IdGenerator,
        page_id: &str,
        screen: Point,
        origin: Point,
    ) -> Result<VisualNode, GraphError> {
        let at = self.view_transform(origin).to_document(screen);
        if self.active_flow().is_none() {
            return Err(GraphError::NoActiveFlow);
        }
        if self.page(page_id).is_none() {
            return Err(GraphError::invalid_reference("pageId", "page", page_id));
        }

        let step = Step {
            step_id: ids.next_id(IdKind::Step),
            page_id: page_id.to_string(),
            action: DEFAULT_STEP_ACTION.to_string(),
        };
        let node = VisualNode {
            node_id: ids.next_id(IdKind::Node),
            step_id: step.step_id.clone(),
            x: at.x,
            y: at.y,
        };

        let flow = self.active_flow_mut().ok_or(GraphError::NoActiveFlow)?;
        flow.steps.push(step);
        flow.visual_layout.nodes.push(node.clone());
        Ok(node)
    }

    /// Move a node or hub of the active flow to a document position
    pub fn update_element_position(
        &mut self,
        element_id: &str,
        position: Point,
    ) -> Result<EndpointRef, GraphError> {
        let flow = self.active_flow_mut().ok_or(GraphError::NoActiveFlow)?;
        let layout = &mut flow.visual_layout;

        if let Some(node) = layout.nodes.iter_mut().find(|n| n.node_id == element_id) {
            node.x = position.x;
            node.y = position.y;
            return Ok(EndpointRef::node(element_id));
        }
        if let Some(hub) = layout.hubs.iter_mut().find(|h| h.id == element_id) {
            hub.x = position.x;
            hub.y = position.y;
            return Ok(EndpointRef::hub(element_id));
        }
        Err(GraphError::not_found("element", element_id))
    }

    /// Connect two elements of the active flow.
    ///
    /// Hub-sourced connections are labelled "Condition", all others
    /// "User action".
    pub fn add_connection(
        &mut self,
        ids: &mut IdGenerator,
        from: &EndpointRef,
        to: &EndpointRef,
        is_hub_source: bool,
    ) -> Result<Connection, GraphError> {
        let flow = self.active_flow().ok_or(GraphError::NoActiveFlow)?;
        if from.id == to.id {
            return Err(GraphError::SelfLoop {
                id: from.id.clone(),
            });
        }
        let layout = &flow.visual_layout;
        if !layout.contains(from) {
            return Err(GraphError::invalid_reference("from", "element", &from.id));
        }
        if !layout.contains(to) {
            return Err(GraphError::invalid_reference("to", "element", &to.id));
        }
        if layout.has_edge(from, to) {
            return Err(GraphError::duplicate(&from.id, &to.id));
        }

        let conn = new_connection(ids, from.clone(), to.clone(), is_hub_source);
        let flow = self.active_flow_mut().ok_or(GraphError::NoActiveFlow)?;
        flow.visual_layout.connections.push(conn.clone());
        Ok(conn)
    }

    /// Remove a connection; its nodes and steps stay
    pub fn delete_connection(&mut self, connection_id: &str) -> Result<Connection, GraphError> {
        let flow = self.active_flow_mut().ok_or(GraphError::NoActiveFlow)?;
        let connections = &mut flow.visual_layout.connections;
        let index = connections
            .iter()
            .position(|c| c.id == connection_id)
            .ok_or_else(|| GraphError::not_found("connection", connection_id))?;
        Ok(connections.remove(index))
    }

    /// Replace connection A→B with A→H→B through a new hub H at a screen position
    pub fn add_hub_to_connection(
        &mut self,
        ids: &mut IdGenerator,
        connection_id: &str,
        screen: Point,
        origin: Point,
    ) -> Result<HubInsertion, GraphError> {
        let at = self.view_transform(origin).to_document(screen);
        let flow = self.active_flow().ok_or(GraphError::NoActiveFlow)?;
        let layout = &flow.visual_layout;
        let original = layout
            .connection(connection_id)
            .cloned()
            .ok_or_else(|| GraphError::not_found("connection", connection_id))?;
        if !layout.contains(&original.from) {
            return Err(GraphError::invalid_reference("from", "element", &original.from.id));
        }
        if !layout.contains(&original.to) {
            return Err(GraphError::invalid_reference("to", "element", &original.to.id));
        }

        let hub = Hub {
            id: ids.next_id(IdKind::Hub),
            x: at.x,
            y: at.y,
        };
        let hub_ref = EndpointRef::hub(&hub.id);
        let incoming = new_connection(ids, original.from.clone(), hub_ref.clone(), true);
        let outgoing = new_connection(ids, hub_ref, original.to.clone(), true);

        let flow = self.active_flow_mut().ok_or(GraphError::NoActiveFlow)?;
        let layout = &mut flow.visual_layout;
        layout.hubs.push(hub.clone());
        layout.connections.push(incoming.clone());
        layout.connections.push(outgoing.clone());
        layout.connections.retain(|c| c.id != original.id);

        Ok(HubInsertion {
            hub,
            incoming,
            outgoing,
            removed: original,
        })
    }

    /// Merge the fields of `patch` into the entity `id`
    pub fn update_item_details(&mut self, id: &str, patch: &ItemPatch) -> Result<(), GraphError> {
        match patch {
            ItemPatch::Persona(p) => self.patch_persona(id, p),
            ItemPatch::Sitemap(p) => self.patch_page(id, p),
            ItemPatch::Connection(p) => self.patch_connection(id, p),
        }
    }

    fn patch_persona(&mut self, id: &str, patch: &PersonaPatch) -> Result<(), GraphError> {
        let persona = self
            .personas
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| GraphError::not_found("persona", id))?;
        if let Some(name) = &patch.name {
            persona.name = name.clone();
        }
        if let Some(description) = &patch.description {
            persona.description = description.clone();
        }
        Ok(())
    }

    fn patch_page(&mut self, id: &str, patch: &SitemapPagePatch) -> Result<(), GraphError> {
        if self.page(id).is_none() {
            return Err(GraphError::not_found("page", id));
        }
        let persona_ids = match &patch.persona_ids {
            Some(ids) => Some(self.checked_persona_ids(ids)?),
            None => None,
        };
        if let Some(Some(parent)) = &patch.parent_id {
            self.check_reparent(id, parent)?;
        }

        let page = self
            .sitemap
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| GraphError::not_found("page", id))?;
        if let Some(name) = &patch.name {
            page.name = name.clone();
        }
        if let Some(path) = &patch.path {
            page.path = path.clone();
        }
        if let Some(description) = &patch.description {
            page.description = description.clone();
        }
        if let Some(ids) = persona_ids {
            page.persona_ids = ids;
        }
        if let Some(parent) = &patch.parent_id {
            page.parent_id = parent.clone();
        }
        Ok(())
    }

    fn patch_connection(&mut self, id: &str, patch: &ConnectionPatch) -> Result<(), GraphError> {
        let flow = self.active_flow_mut().ok_or(GraphError::NoActiveFlow)?;
        let conn = flow
            .visual_layout
            .connections
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| GraphError::not_found("connection", id))?;
        if let Some(label) = &patch.label {
            conn.label = label.clone();
        }
        Ok(())
    }

    /// Validate persona ids and drop duplicates, keeping first-seen order
    fn checked_persona_ids(&self, persona_ids: &[String]) -> Result<Vec<String>, GraphError> {
        let mut out: Vec<String> = Vec::with_capacity(persona_ids.len());
        for id in persona_ids {
            if self.persona(id).is_none() {
                return Err(GraphError::invalid_reference("personaIds", "persona", id));
            }
            if !out.contains(id) {
                out.push(id.clone());
            }
        }
        Ok(out)
    }

    fn check_reparent(&self, page_id: &str, parent_id: &str) -> Result<(), GraphError> {
        if self.page(parent_id).is_none() {
            return Err(GraphError::invalid_reference("parentId", "page", parent_id));
        }
        // Walk up from the new parent; reaching the page itself means a cycle
        let mut cursor = Some(parent_id);
        let mut steps = 0;
        while let Some(current) = cursor {
            if current == page_id || steps > self.sitemap.len() {
                return Err(GraphError::SitemapCycle {
                    page: page_id.to_string(),
                    parent: parent_id.to_string(),
                });
            }
            cursor = self.page(current).and_then(|p| p.parent_id.as_deref());
            steps += 1;
        }
        Ok(())
    }
}

fn new_connection(
    ids: &mut IdGenerator,
    from: EndpointRef,
    to: EndpointRef,
    is_hub_source: bool,
) -> Connection {
    let kind = EdgeKind::for_source(is_hub_source);
    Connection {
        id: ids.next_id(IdKind::Connection),
        from,
        to,
        label: kind.default_label().to_string(),
        kind,
    }
}
