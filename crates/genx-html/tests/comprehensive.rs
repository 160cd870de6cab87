//! Comprehensive tests for genx-html
//!
//! Markup with every genX notation must survive ingestion intact.

use genx_html::{HtmlParser, parse};

#[test]
fn test_attribute_values_verbatim() {
    let doc = parse(
        r#"<div id="a"
               fx-opts='{"format":"currency","currency":"USD"}'
               fx-format="currency:USD:2"
               class="card fmt-currency-USD-2"></div>"#,
    )
    .unwrap();
    let el = doc.element(doc.get_element_by_id("a").unwrap()).unwrap();

    assert_eq!(el.get_attribute("fx-opts"), Some(r#"{"format":"currency","currency":"USD"}"#));
    assert_eq!(el.get_attribute("fx-format"), Some("currency:USD:2"));
    assert_eq!(el.classes().collect::<Vec<_>>(), vec!["card", "fmt-currency-USD-2"]);
}

#[test]
fn test_entities_decoded() {
    let doc = parse(r#"<div id="a" fx-opts="{&quot;symbol&quot;:&quot;&amp;&quot;}"></div>"#).unwrap();
    let el = doc.element(doc.get_element_by_id("a").unwrap()).unwrap();
    assert_eq!(el.get_attribute("fx-opts"), Some(r#"{"symbol":"&"}"#));
}

#[test]
fn test_attribute_names_lowercased() {
    let doc = parse(r#"<DIV ID="a" FX-Format="number"></DIV>"#).unwrap();
    let el = doc.element(doc.get_element_by_id("a").unwrap()).unwrap();
    assert_eq!(el.tag_name(), "div");
    assert_eq!(el.get_attribute("fx-format"), Some("number"));
}

#[test]
fn test_document_structure() {
    let doc = parse("<title>t</title><p>x</p>").unwrap();
    assert!(doc.document_element().is_valid());
    assert!(doc.head().is_valid());
    assert!(doc.body().is_valid());
    assert_eq!(doc.element(doc.body()).unwrap().tag_name(), "body");
}

#[test]
fn test_parsing_records_nothing() {
    let mut doc = parse("<p>a</p>").unwrap();
    let root = doc.root();
    let observer = doc.observe(root, genx_dom::MutationObserverInit::everything()).unwrap();
    assert!(doc.take_records(observer).unwrap().is_empty());
}

#[test]
fn test_url_kept() {
    let doc = HtmlParser::new()
        .parse_with_url("<p>a</p>", "https://example.test/page")
        .unwrap();
    assert_eq!(doc.url(), "https://example.test/page");
}
