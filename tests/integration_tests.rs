//! Integration tests for editing a project through a session

use flow_architect::model::{EdgeKind, ItemKind, ItemPatch};
use flow_architect::{
    EditorConfig, EditorSession, EndpointRef, GraphError, InspectorEdit, MemoryStorage,
    NullRenderer, Point, Record,
};
use pretty_assertions::assert_eq;

type Session = EditorSession<MemoryStorage, NullRenderer>;

fn session() -> Session {
    EditorSession::open(EditorConfig::default(), MemoryStorage::new(), NullRenderer)
}

/// Two pages placed side by side on the active flow
fn two_nodes(session: &mut Session) -> (EndpointRef, EndpointRef) {
    let login = session
        .add_sitemap_page("Login", None, &[])
        .expect("Should add page");
    let home = session
        .add_sitemap_page("Home", None, &[])
        .expect("Should add page");
    let a = session
        .add_node_to_flow(&login.id, Point::new(100.0, 100.0))
        .expect("Should place node");
    let b = session
        .add_node_to_flow(&home.id, Point::new(400.0, 100.0))
        .expect("Should place node");
    (EndpointRef::node(a.node_id), EndpointRef::node(b.node_id))
}

#[test]
fn test_new_session_has_one_empty_flow() {
    let session = session();
    let doc = session.document();
    assert_eq!(doc.user_flows.len(), 1);
    let flow = doc.active_flow().expect("Should have an active flow");
    assert!(flow.steps.is_empty());
    assert!(!session.can_undo());
}

#[test]
fn test_add_and_connect_pages() {
    let mut session = session();
    let (a, b) = two_nodes(&mut session);

    let conn = session
        .add_connection(&a, &b, false)
        .expect("Should connect");
    assert_eq!(conn.kind, EdgeKind::UserAction);
    assert_eq!(conn.label, "User action");

    let flow = session.document().active_flow().unwrap();
    assert_eq!(flow.steps.len(), 2);
    assert_eq!(flow.visual_layout.connections.len(), 1);
    assert!(flow
        .steps
        .iter()
        .all(|s| session.document().page(&s.page_id).is_some()));
}

#[test]
fn test_rejected_edits_change_nothing() {
    let mut session = session();
    let (a, b) = two_nodes(&mut session);
    session.add_connection(&a, &b, false).unwrap();
    let before = session.document().clone();
    let undo_depth = session.history().len();

    assert_eq!(
        session.add_connection(&a, &a, false).unwrap_err(),
        GraphError::SelfLoop { id: a.id.clone() }
    );
    assert!(matches!(
        session.add_connection(&a, &b, false),
        Err(GraphError::DuplicateEdge { .. })
    ));
    assert!(matches!(
        session.add_node_to_flow("page_missing", Point::origin()),
        Err(GraphError::InvalidReference { .. })
    ));

    assert_eq!(session.document(), &before);
    assert_eq!(session.history().len(), undo_depth);
}

#[test]
fn test_hub_insertion_is_one_undo_step() {
    let mut session = session();
    let (a, b) = two_nodes(&mut session);
    let conn = session.add_connection(&a, &b, false).unwrap();
    let before = session.document().clone();

    let split = session
        .add_hub_to_connection(&conn.id, Point::new(340.0, 130.0))
        .expect("Should insert hub");
    assert_eq!(split.removed.id, conn.id);
    assert_eq!(split.incoming.from, a);
    assert_eq!(split.outgoing.to, b);
    assert_eq!(split.incoming.kind, EdgeKind::Condition);

    let layout = &session.document().active_flow().unwrap().visual_layout;
    assert_eq!(layout.hubs.len(), 1);
    assert_eq!(layout.connections.len(), 2);
    assert!(layout.connection(&conn.id).is_none());

    assert!(session.undo());
    assert_eq!(session.document(), &before);
    assert!(session.redo());
    let layout = &session.document().active_flow().unwrap().visual_layout;
    assert_eq!(layout.hubs.len(), 1);
}

#[test]
fn test_undo_redo_walks_every_state_exactly() {
    let mut session = session();
    let mut states = vec![session.document().clone()];

    session.add_persona("Member", "Has an account");
    states.push(session.document().clone());
    let login = session.add_sitemap_page("Login", None, &[]).unwrap();
    states.push(session.document().clone());
    let home = session.add_sitemap_page("Home", Some(&login.id), &[]).unwrap();
    states.push(session.document().clone());
    let a = session.add_node_to_flow(&login.id, Point::new(100.0, 100.0)).unwrap();
    states.push(session.document().clone());
    let b = session.add_node_to_flow(&home.id, Point::new(400.0, 100.0)).unwrap();
    states.push(session.document().clone());
    let (a, b) = (EndpointRef::node(a.node_id), EndpointRef::node(b.node_id));
    let conn = session.add_connection(&a, &b, false).unwrap();
    states.push(session.document().clone());
    let split = session
        .add_hub_to_connection(&conn.id, Point::new(340.0, 130.0))
        .unwrap();
    states.push(session.document().clone());
    session
        .update_element_position(&a.id, Point::new(50.0, 60.0), Record::Commit)
        .unwrap();
    states.push(session.document().clone());
    session
        .update_item_details(&split.incoming.id, &ItemPatch::connection_label("Valid credentials"))
        .unwrap();
    states.push(session.document().clone());

    for expected in states.iter().rev().skip(1) {
        assert!(session.undo());
        assert_eq!(session.document(), expected);
    }
    assert!(!session.undo());

    for expected in states.iter().skip(1) {
        assert!(session.redo());
        assert_eq!(session.document(), expected);
    }
    assert!(!session.can_redo());
}

#[test]
fn test_undo_keeps_pan_and_zoom() {
    let mut session = session();
    session.add_persona("Shopper", "Buys things");
    session.zoom_in();
    let zoom = session.document().canvas.zoom;

    assert!(session.undo());
    assert!(session.document().personas.is_empty());
    assert_eq!(session.document().canvas.zoom, zoom);
}

#[test]
fn test_new_edit_clears_redo() {
    let mut session = session();
    session.add_persona("A", "");
    session.add_persona("B", "");
    session.undo();
    assert!(session.can_redo());

    session.add_persona("C", "");
    assert!(!session.can_redo());
    let names: Vec<_> = session
        .document()
        .personas
        .iter()
        .map(|p| p.name.as_str())
        .collect();
    assert_eq!(names, vec!["A", "C"]);
}

#[test]
fn test_history_is_capped() {
    let mut session = EditorSession::open(
        EditorConfig::default().with_history_limit(3),
        MemoryStorage::new(),
        NullRenderer,
    );
    for i in 0..5 {
        session.add_persona(&format!("P{i}"), "");
    }
    let mut steps = 0;
    while session.undo() {
        steps += 1;
    }
    assert_eq!(steps, 3);
    assert_eq!(session.document().personas.len(), 2);
}

#[test]
fn test_inspector_edits_selected_connection() {
    let mut session = session();
    let (a, b) = two_nodes(&mut session);
    let conn = session.add_connection(&a, &b, false).unwrap();

    session.select(&conn.id, ItemKind::Connection);
    let applied = session
        .edit_selected(&InspectorEdit::Label("Submit".into()))
        .expect("Should edit");
    assert!(applied);
    let layout = &session.document().active_flow().unwrap().visual_layout;
    assert_eq!(layout.connection(&conn.id).unwrap().label, "Submit");

    // Connections have no description field
    let applied = session
        .edit_selected(&InspectorEdit::Description("ignored".into()))
        .unwrap();
    assert!(!applied);

    let removed = session.delete_selected_connection().unwrap();
    assert_eq!(removed.map(|c| c.id), Some(conn.id));
    assert!(session.selection().is_none());
}

#[test]
fn test_page_personas_are_validated() {
    let mut session = session();
    let admin = session.add_persona("Admin", "");
    let page = session.add_sitemap_page("Settings", None, &[]).unwrap();

    session
        .update_item_details(&page.id, &ItemPatch::page_personas(vec![admin.id.clone()]))
        .expect("Should link persona");
    assert_eq!(
        session.document().page(&page.id).unwrap().persona_ids,
        vec![admin.id]
    );

    let err = session
        .update_item_details(&page.id, &ItemPatch::page_personas(vec!["persona_404".into()]))
        .unwrap_err();
    assert!(matches!(err, GraphError::InvalidReference { .. }));
}

#[test]
fn test_flow_switch_is_not_an_undo_step() {
    let mut session = session();
    let first = session.document().active_flow_id.clone().unwrap();
    let second = session.add_user_flow("Checkout");
    assert_eq!(session.document().active_flow_id.as_deref(), Some(second.id.as_str()));
    let depth = session.history().len();

    session.set_active_flow(&first).unwrap();
    assert_eq!(session.history().len(), depth);
    assert!(session.set_active_flow("flow_missing").is_err());
    assert_eq!(session.document().active_flow_id.as_deref(), Some(first.as_str()));
}

#[test]
fn test_positions_without_history() {
    let mut session = session();
    let (a, _) = two_nodes(&mut session);
    let depth = session.history().len();

    session
        .update_element_position(&a.id, Point::new(5.0, 5.0), Record::Skip)
        .unwrap();
    assert_eq!(session.history().len(), depth);
    let node = session.document().active_flow().unwrap().visual_layout.node(&a.id).unwrap();
    assert_eq!(node.position(), Point::new(5.0, 5.0));
}
