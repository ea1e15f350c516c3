//! Query and connectivity tests for focal-dom
//!
//! Exercises selector queries against a small page and the attachment
//! rules the focus layer relies on.

use focal_dom::{Document, ElementGeometry, ListenerKind, NodeId};

fn build_page() -> (Document, NodeId, Vec<NodeId>) {
    let mut doc = Document::new("https://focal.test/");
    let body = doc.body();
    let dialog = doc
        .append_element(body, "div", &[("id", "dialog"), ("role", "dialog")])
        .unwrap();

    let link = doc.append_element(dialog, "a", &[("href", "#help")]).unwrap();
    let input = doc.append_element(dialog, "input", &[("type", "text")]).unwrap();
    let disabled = doc.append_element(dialog, "button", &[("disabled", "")]).unwrap();
    let ok = doc
        .append_element(dialog, "button", &[("id", "modal-primary-action")])
        .unwrap();
    let cancel = doc.append_element(dialog, "button", &[("class", "secondary")]).unwrap();

    (doc, dialog, vec![link, input, disabled, ok, cancel])
}

// ============================================================================
// SELECTOR QUERIES
// ============================================================================

#[test]
fn test_query_selector_by_attribute() {
    let (doc, _, nodes) = build_page();
    assert_eq!(doc.query_selector("button[id='modal-primary-action']"), Some(nodes[3]));
    assert_eq!(doc.query_selector("#modal-primary-action"), Some(nodes[3]));
    assert_eq!(doc.query_selector(".secondary"), Some(nodes[4]));
    assert_eq!(doc.query_selector("#missing"), None);
}

#[test]
fn test_query_selector_all_document_order() {
    let (doc, dialog, nodes) = build_page();
    let selector = "button:not([disabled]), a[href], input:not([disabled])";
    let found = doc.query_selector_all(dialog, selector);
    assert_eq!(found, vec![nodes[0], nodes[1], nodes[3], nodes[4]]);
}

#[test]
fn test_query_scoped_to_root() {
    let (mut doc, dialog, _) = build_page();
    let body = doc.body();
    doc.append_element(body, "button", &[("id", "outside")]).unwrap();

    let inside = doc.query_selector_all(dialog, "button");
    assert_eq!(inside.len(), 3);
    assert!(doc.query_selector_all(body, "button").len() > inside.len());
}

// ============================================================================
// CONNECTIVITY & GEOMETRY
// ============================================================================

#[test]
fn test_detached_nodes_keep_identity() {
    let (mut doc, dialog, nodes) = build_page();
    doc.remove(dialog).unwrap();

    assert!(!doc.is_connected(nodes[3]));
    assert!(doc.contains(dialog, nodes[3]));
    assert_eq!(doc.query_selector("#modal-primary-action"), None);

    let body = doc.body();
    doc.append_child(body, dialog).unwrap();
    assert!(doc.is_connected(nodes[3]));
}

#[test]
fn test_explicit_geometry_overrides_nominal() {
    let (mut doc, _, nodes) = build_page();
    doc.set_geometry(nodes[4], ElementGeometry::sized(0.0, 0.0)).unwrap();
    assert!(!doc.is_rendered(nodes[4]));
    assert!(doc.is_rendered(nodes[3]));
}

// ============================================================================
// LISTENERS
// ============================================================================

#[test]
fn test_document_listener_count() {
    let doc = Document::default();
    let first = doc.listen(ListenerKind::KeyDown);
    let second = doc.listen(ListenerKind::KeyDown);
    assert_eq!(doc.listener_count(ListenerKind::KeyDown), 2);

    drop(first);
    assert_eq!(doc.listener_count(ListenerKind::KeyDown), 1);
    drop(second);
    assert_eq!(doc.listener_count(ListenerKind::KeyDown), 0);
}
