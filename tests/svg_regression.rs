//! SVG output of stored projects

use flow_architect::{render_project, EditorError, SvgConfig};

const PROJECT: &str = r#"{
    "projectName": "Checkout",
    "sitemap": [
        {"id": "page_1", "name": "Cart", "path": "/cart"},
        {"id": "page_2", "name": "Payment", "path": "/payment"}
    ],
    "userFlows": [
        {
            "id": "flow_1",
            "name": "Main Flow",
            "steps": [
                {"stepId": "step_1", "pageId": "page_1", "action": "Review items"},
                {"stepId": "step_2", "pageId": "page_2", "action": "Pay"}
            ],
            "visualLayout": {
                "nodes": [
                    {"nodeId": "vis_node_1", "stepId": "step_1", "x": 100, "y": 100},
                    {"nodeId": "vis_node_2", "stepId": "step_2", "x": 400, "y": 100}
                ],
                "hubs": [{"id": "hub_1", "x": 346, "y": 136}],
                "connections": [
                    {"id": "conn_1", "from": {"kind": "node", "id": "vis_node_1"},
                     "to": {"kind": "hub", "id": "hub_1"}, "label": "Condition", "kind": "condition"},
                    {"id": "conn_2", "from": {"kind": "hub", "id": "hub_1"},
                     "to": {"kind": "node", "id": "vis_node_2"}, "label": "Logged in", "kind": "condition"},
                    {"id": "conn_3", "from": {"kind": "node", "id": "vis_node_1"},
                     "to": {"kind": "node", "id": "vis_node_404"}, "label": "Dangling"}
                ]
            }
        },
        {"id": "flow_2", "name": "Empty"}
    ],
    "activeFlowId": "flow_1",
    "selectedItemId": "conn_2",
    "selectedItemType": "connection"
}"#;

fn line_with<'a>(svg: &'a str, needle: &str) -> &'a str {
    svg.lines()
        .find(|l| l.contains(needle))
        .unwrap_or_else(|| panic!("no line containing {needle}"))
}

#[test]
fn test_nodes_show_page_and_action() {
    let svg = render_project(PROJECT, None, &SvgConfig::default()).unwrap();
    assert!(line_with(&svg, r#"id="vis_node_1""#).contains(r#"x="100" y="100" width="192" height="72""#));
    assert!(svg.contains(">Cart</text>"));
    assert!(svg.contains(">Review items</text>"));
    assert!(svg.contains(">Payment</text>"));
}

#[test]
fn test_hub_edges_and_arrows() {
    let svg = render_project(PROJECT, None, &SvgConfig::default()).unwrap();

    let into_hub = line_with(&svg, r#"id="conn_1""#);
    assert!(into_hub.contains(r#"d="M 292 136 L 358 148""#));
    assert!(!into_hub.contains("marker-end"));

    let out_of_hub = line_with(&svg, r#"id="conn_2""#);
    assert!(out_of_hub.contains(r#"d="M 358 148 L 400 136""#));
    assert!(out_of_hub.contains(r#"marker-end="url(#fa-arrowhead)""#));
    assert!(out_of_hub.contains("fa-selected"));

    assert!(line_with(&svg, r#"id="hub_1""#).contains(r#"cx="358" cy="148" r="12""#));
}

#[test]
fn test_dangling_connection_is_skipped() {
    let svg = render_project(PROJECT, None, &SvgConfig::default()).unwrap();
    assert!(!svg.contains("conn_3"));
    assert!(!svg.contains("Dangling"));
}

#[test]
fn test_render_other_flow() {
    let svg = render_project(PROJECT, Some("flow_2"), &SvgConfig::default()).unwrap();
    assert!(!svg.contains("vis_node_1"));

    let err = render_project(PROJECT, Some("flow_3"), &SvgConfig::default()).unwrap_err();
    assert_eq!(err.to_string(), "flow 'flow_3' not found");
    assert!(matches!(err, EditorError::UnknownFlow(_)));
}

#[test]
fn test_compact_output_without_prefix() {
    let config = SvgConfig::new()
        .with_pretty_print(false)
        .with_standalone(false)
        .without_class_prefix();
    let svg = render_project(PROJECT, None, &config).unwrap();
    assert!(svg.starts_with("<svg"));
    assert_eq!(svg.lines().count(), 1);
    assert!(svg.contains(r#"class="node""#));
    assert!(svg.contains(r#"marker-end="url(#arrowhead)""#));
}
