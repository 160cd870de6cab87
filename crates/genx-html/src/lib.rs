//! genX HTML ingestion
//!
//! Builds a [`genx_dom::Document`] from markup using html5ever, so hosts
//! and tests can describe annotated elements as plain HTML.

mod parser;

pub use genx_dom::Document;
pub use parser::HtmlParser;

/// Parse an HTML string into a loaded document
pub fn parse(html: &str) -> Result<Document, HtmlError> {
    HtmlParser::new().parse(html)
}

/// HTML ingestion error
#[derive(Debug, thiserror::Error)]
pub enum HtmlError {
    #[error("Failed to read HTML input: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to build document: {0}")]
    Dom(#[from] genx_dom::DomError),
}
