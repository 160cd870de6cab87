//! Edge case tests for genx-dom

use genx_dom::{Document, DomError, MutationObserverInit, NodeId, ReadyState};

#[test]
fn test_unknown_nodes() {
    let mut doc = Document::new("about:blank");
    let bogus = NodeId::from_raw(9999);
    assert!(doc.element(bogus).is_none());
    assert!(matches!(doc.set_attribute(bogus, "a", "b"), Err(DomError::UnknownNode(_))));
    assert!(matches!(doc.observe(bogus, MutationObserverInit::everything()), Err(DomError::UnknownNode(_))));
    assert!(!NodeId::NONE.is_valid());
}

#[test]
fn test_attribute_on_text_node() {
    let mut doc = Document::new("about:blank");
    let text = doc.create_text("x");
    assert!(matches!(doc.set_attribute(text, "a", "b"), Err(DomError::NotAnElement(_))));
}

#[test]
fn test_character_data_on_element() {
    let mut doc = Document::new("about:blank");
    let body = doc.body();
    assert!(matches!(doc.set_character_data(body, "x"), Err(DomError::NotCharacterData(_))));
}

#[test]
fn test_cycles_rejected() {
    let mut doc = Document::new("about:blank");
    let body = doc.body();
    let html = doc.document_element();
    assert!(matches!(doc.append_child(body, html), Err(DomError::HierarchyRequest { .. })));
    assert!(matches!(doc.append_child(body, body), Err(DomError::HierarchyRequest { .. })));
}

#[test]
fn test_remove_absent_attribute_is_silent() {
    let mut doc = Document::new("about:blank");
    let body = doc.body();
    let observer = doc.observe(body, MutationObserverInit::everything()).unwrap();
    assert_eq!(doc.remove_attribute(body, "fx-format").unwrap(), None);
    assert!(doc.take_records(observer).unwrap().is_empty());
}

#[test]
fn test_detached_mutations_unobserved() {
    let mut doc = Document::new("about:blank");
    let body = doc.body();
    let observer = doc.observe(body, MutationObserverInit::everything()).unwrap();
    let loose = doc.create_element("div");
    doc.set_attribute(loose, "fx-format", "number").unwrap();
    assert!(!doc.observers().has_pending(observer));
}

#[test]
fn test_attribute_filter_exact_names() {
    let mut doc = Document::new("about:blank");
    let body = doc.body();
    let observer = doc
        .observe(body, MutationObserverInit {
            attributes: true,
            subtree: true,
            attribute_filter: Some(vec!["fx-format".into()]),
            ..Default::default()
        })
        .unwrap();
    doc.set_attribute(body, "fx-format-x", "1").unwrap();
    doc.set_attribute(body, "fx-format", "1").unwrap();
    assert_eq!(doc.take_records(observer).unwrap().len(), 1);
}

#[test]
fn test_on_ready_when_already_ready() {
    let mut doc = Document::new("about:blank");
    let ran = std::rc::Rc::new(std::cell::Cell::new(false));
    let flag = ran.clone();
    doc.on_ready(move |_| flag.set(true));
    assert!(ran.get());
}

#[test]
fn test_ready_state_transitions_fire_once() {
    let mut doc = Document::loading("about:blank");
    let count = std::rc::Rc::new(std::cell::Cell::new(0));
    let c = count.clone();
    doc.on_ready(move |_| c.set(c.get() + 1));

    doc.set_ready_state(ReadyState::Loading);
    assert_eq!(count.get(), 0);
    doc.set_ready_state(ReadyState::Interactive);
    doc.set_ready_state(ReadyState::Complete);
    assert_eq!(count.get(), 1);
}

#[test]
fn test_take_records_unknown_observer() {
    let mut doc = Document::new("about:blank");
    let body = doc.body();
    let observer = doc.observe(body, MutationObserverInit::everything()).unwrap();
    assert!(doc.observers_mut().remove(observer));
    assert!(matches!(doc.take_records(observer), Err(DomError::UnknownObserver(_))));
}

#[test]
fn test_empty_document() {
    let doc = Document::empty("about:blank");
    assert_eq!(doc.tree().len(), 1);
    assert!(!doc.body().is_valid());
    assert_eq!(doc.elements(doc.root()).count(), 0);
}
