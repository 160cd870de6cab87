//! Test fixtures

use genx_dom::{Document, NodeId};

/// A `<div>` under body carrying `attrs`
pub(crate) fn fixture(attrs: &[(&str, &str)]) -> (Document, NodeId) {
    let mut doc = Document::new("about:blank");
    let div = doc.create_element("div");
    let body = doc.body();
    doc.append_child(body, div).unwrap();
    for (name, value) in attrs {
        doc.set_attribute(div, name, value).unwrap();
    }
    (doc, div)
}
